//! Normalization options and configuration.

use chrono::{DateTime, Utc};

use crate::model::MetadataMap;

/// Options for a normalization run.
///
/// None of these influence identifiers or the semantic hash.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Overrides the extractor's version string as `parser_version`
    pub parser_version: Option<String>,

    /// Run configuration recorded as `config_used`
    pub run_config: MetadataMap,

    /// Pinned processing timestamp (defaults to the current time)
    pub processing_timestamp: Option<DateTime<Utc>>,

    /// Whether batch normalization uses the rayon pool
    pub parallel: bool,
}

impl NormalizeOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the parser version.
    pub fn with_parser_version(mut self, version: impl Into<String>) -> Self {
        self.parser_version = Some(version.into());
        self
    }

    /// Replace the run configuration.
    pub fn with_run_config(mut self, config: MetadataMap) -> Self {
        self.run_config = config;
        self
    }

    /// Add one run configuration entry.
    pub fn with_config_value(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.run_config.insert(key.into(), value.into());
        self
    }

    /// Pin the processing timestamp.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.processing_timestamp = Some(timestamp);
        self
    }

    /// Enable or disable parallel batch processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel batch processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Timestamp to stamp on the document.
    pub(crate) fn timestamp(&self) -> DateTime<Utc> {
        self.processing_timestamp.unwrap_or_else(Utc::now)
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            parser_version: None,
            run_config: MetadataMap::new(),
            processing_timestamp: None,
            parallel: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_options_builder() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let options = NormalizeOptions::new()
            .with_parser_version("engine-2.0")
            .with_config_value("ocr", true)
            .with_timestamp(ts)
            .sequential();

        assert_eq!(options.parser_version.as_deref(), Some("engine-2.0"));
        assert_eq!(options.run_config["ocr"], true);
        assert_eq!(options.timestamp(), ts);
        assert!(!options.parallel);
    }

    #[test]
    fn test_defaults() {
        let options = NormalizeOptions::default();
        assert!(options.parallel);
        assert!(options.run_config.is_empty());
        assert!(options.processing_timestamp.is_none());
    }
}
