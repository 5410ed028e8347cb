//! layoutir CLI - canonical layout IR tool

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;

use layoutir::{
    from_json, semantic_diff, semantic_hash, to_json, BlockType, Document, JsonFormat, Manifest,
    MetadataMap, NormalizeOptions, Normalizer, RawDocument, StabilityContract,
};

/// IR file name inside an output directory.
const IR_FILE: &str = "ir.json";

/// Manifest file name inside an output directory.
const MANIFEST_FILE: &str = "manifest.json";

#[derive(Parser)]
#[command(name = "layoutir")]
#[command(version)]
#[command(about = "Normalize extracted document layouts into canonical IR", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize raw extraction elements (JSON) into canonical IR
    Normalize {
        /// Raw elements file produced by an extraction engine
        #[arg(value_name = "ELEMENTS")]
        elements: PathBuf,

        /// Source document the elements were extracted from (defaults to ELEMENTS)
        #[arg(short, long, value_name = "FILE")]
        source: Option<PathBuf>,

        /// Output directory for ir.json, manifest.json and image assets
        /// (IR printed to stdout if not specified)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Parser version recorded in the IR
        #[arg(long, env = "LAYOUTIR_PARSER_VERSION")]
        parser_version: Option<String>,

        /// Run configuration entry (KEY=VALUE, VALUE parsed as JSON if possible)
        #[arg(long = "config", value_name = "KEY=VALUE")]
        config: Vec<String>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Skip writing manifest.json
        #[arg(long)]
        no_manifest: bool,
    },

    /// Print the semantic hash of an IR file
    Hash {
        /// IR JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Compare two IR files semantically
    Diff {
        /// Left IR JSON file
        #[arg(value_name = "LEFT")]
        left: PathBuf,

        /// Right IR JSON file
        #[arg(value_name = "RIGHT")]
        right: PathBuf,
    },

    /// Show IR document information
    Info {
        /// IR JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Print the active stability contract and its fingerprint
    Contract,

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Normalize {
            elements,
            source,
            output,
            parser_version,
            config,
            compact,
            no_manifest,
        } => cmd_normalize(
            &elements,
            source.as_deref(),
            output.as_deref(),
            parser_version,
            &config,
            compact,
            !no_manifest,
        ),
        Commands::Hash { input } => cmd_hash(&input),
        Commands::Diff { left, right } => cmd_diff(&left, &right),
        Commands::Info { input } => cmd_info(&input),
        Commands::Contract => cmd_contract(),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_normalize(
    elements: &Path,
    source: Option<&Path>,
    output: Option<&Path>,
    parser_version: Option<String>,
    config: &[String],
    compact: bool,
    write_manifest: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let raw: RawDocument = serde_json::from_str(&fs::read_to_string(elements)?)?;
    let source = source.unwrap_or(elements);
    log::debug!(
        "Loaded {} raw blocks from {}; source {}",
        raw.blocks.len(),
        elements.display(),
        source.display()
    );

    let run_config = parse_config(config)?;
    let mut options = NormalizeOptions::new().with_run_config(run_config.clone());
    if let Some(version) = parser_version {
        options = options.with_parser_version(version);
    }

    let normalizer = Normalizer::open(source, concat!("layoutir/", env!("CARGO_PKG_VERSION")))?;
    let mut doc = normalizer.normalize(raw, &options);

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let Some(output_dir) = output else {
        println!("{}", to_json(&doc, format)?);
        return Ok(());
    };

    fs::create_dir_all(output_dir)?;

    let staged = doc.take_staged_images();
    if !staged.is_empty() {
        fs::create_dir_all(output_dir.join("assets").join("images"))?;
    }
    for image in &staged {
        let relative = image.relative_path();
        log::debug!("Writing image {} to {}", image.image_id, relative);
        fs::write(output_dir.join(&relative), &image.data)?;
        doc.set_image_path(&image.image_id, relative);
    }

    log::debug!("Writing IR to {}", output_dir.join(IR_FILE).display());
    fs::write(output_dir.join(IR_FILE), to_json(&doc, format)?)?;

    if write_manifest {
        let manifest = Manifest::for_document(&doc, run_config, BTreeMap::new())
            .with_output("ir", IR_FILE);
        fs::write(
            output_dir.join(MANIFEST_FILE),
            serde_json::to_string_pretty(&manifest)?,
        )?;
    }

    println!("{} {}", "Document".green().bold(), doc.document_id);
    println!("\n{}", "Output files:".green().bold());
    println!("  {} {}", "├─".dimmed(), IR_FILE);
    if write_manifest {
        println!("  {} {}", "├─".dimmed(), MANIFEST_FILE);
    }
    println!("  {} assets/images/ ({} images)", "└─".dimmed(), staged.len());

    Ok(())
}

fn cmd_hash(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let doc = read_ir(input)?;
    println!("{}", semantic_hash(&doc)?);
    Ok(())
}

fn cmd_diff(left: &Path, right: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let left_doc = read_ir(left)?;
    let right_doc = read_ir(right)?;

    match semantic_diff(&left_doc, &right_doc)? {
        None => {
            println!("{}", "Semantically equal".green().bold());
            Ok(())
        }
        Some(mismatch) => {
            println!("{}", "Documents differ".yellow().bold());
            println!("{}: {}", "Line".bold(), mismatch.line);
            println!("  {} {}", "-".red(), mismatch.left);
            println!("  {} {}", "+".green(), mismatch.right);
            std::process::exit(1);
        }
    }
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let doc = read_ir(input)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Document ID".bold(), doc.document_id);
    println!("{}: {}", "Schema".bold(), doc.schema_version);
    println!("{}: {}", "Parser".bold(), doc.parser_version);
    println!("{}: {}", "Pages".bold(), doc.metadata.page_count);
    if let Some(ref title) = doc.metadata.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref author) = doc.metadata.author {
        println!("{}: {}", "Author".bold(), author);
    }

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "Blocks".bold(), doc.block_count());
    for block_type in BlockType::ALL {
        let count = doc.blocks_of_type(block_type).count();
        if count > 0 {
            println!("  {}: {}", block_type, count);
        }
    }
    println!("{}: {}", "Relationships".bold(), doc.relationships.len());

    let discrepancies = doc
        .blocks
        .iter()
        .filter(|b| {
            b.ordering_metadata
                .and_then(|m| m.order_discrepancy)
                .unwrap_or(false)
        })
        .count();
    println!("{}: {}", "Order discrepancies".bold(), discrepancies);
    println!("{}: {}", "Semantic hash".bold(), semantic_hash(&doc)?);

    Ok(())
}

fn cmd_contract() -> Result<(), Box<dyn std::error::Error>> {
    let contract = StabilityContract::current();
    println!("{}", serde_json::to_string_pretty(contract)?);
    println!();
    println!("{}: {}", "Fingerprint".bold(), contract.fingerprint()?);
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "layoutir".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Canonical layout IR tool");
    println!();
    println!(
        "Schema version: {}",
        StabilityContract::current().schema_version
    );
    println!("License: MIT");
}

fn read_ir(path: &Path) -> Result<Document, Box<dyn std::error::Error>> {
    log::debug!("Reading IR from {}", path.display());
    let json = fs::read_to_string(path)?;
    Ok(from_json(&json)?)
}

fn parse_config(entries: &[String]) -> Result<MetadataMap, Box<dyn std::error::Error>> {
    let mut config = MetadataMap::new();
    for entry in entries {
        let (key, value) = entry
            .split_once('=')
            .ok_or_else(|| format!("Invalid config entry '{}', expected KEY=VALUE", entry))?;
        let value = serde_json::from_str(value)
            .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
        config.insert(key.trim().to_string(), value);
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_values() {
        let entries = vec![
            "ocr=true".to_string(),
            "dpi=300".to_string(),
            "engine=docling".to_string(),
        ];
        let config = parse_config(&entries).unwrap();
        assert_eq!(config["ocr"], true);
        assert_eq!(config["dpi"], 300);
        assert_eq!(config["engine"], "docling");
    }

    #[test]
    fn test_parse_config_rejects_missing_separator() {
        let entries = vec!["ocr".to_string()];
        assert!(parse_config(&entries).is_err());
    }

    #[test]
    fn test_read_ir_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.pdf");
        fs::write(&source, b"%PDF-1.4 test").unwrap();

        let mut raw = RawDocument::new(1);
        raw.blocks
            .push(layoutir::RawBlock::new("Hello", "paragraph", 1, 0));
        let doc = Normalizer::open(&source, "v1")
            .unwrap()
            .normalize(raw, &NormalizeOptions::default());

        let ir = dir.path().join(IR_FILE);
        fs::write(&ir, to_json(&doc, JsonFormat::Pretty).unwrap()).unwrap();

        let loaded = read_ir(&ir).unwrap();
        assert_eq!(semantic_hash(&loaded).unwrap(), semantic_hash(&doc).unwrap());
    }

    #[test]
    fn test_normalize_writes_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut raw = RawDocument::new(1);
        raw.blocks
            .push(layoutir::RawBlock::new("Hello", "paragraph", 1, 0));
        raw.images.push(layoutir::RawImage::new(1, b"\x89PNG fake".to_vec(), "png", 1));
        let elements = dir.path().join("elements.json");
        fs::write(&elements, serde_json::to_string(&raw).unwrap()).unwrap();

        let out = dir.path().join("out");
        let config = vec!["ocr=false".to_string()];
        cmd_normalize(&elements, None, Some(&out), None, &config, true, true).unwrap();

        let doc = read_ir(&out.join(IR_FILE)).unwrap();
        assert_eq!(doc.block_count(), 2);
        assert_eq!(doc.config_used["ocr"], false);
        assert!(out.join(MANIFEST_FILE).exists());

        let image = doc.blocks[1].image_data.as_ref().unwrap();
        let path = image.extracted_path.as_deref().unwrap();
        assert!(out.join(path).exists());
    }
}
