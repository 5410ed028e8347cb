//! Spatial ordering validation.
//!
//! The extractor's `order` is authoritative. This module derives a second,
//! geometry-based reading order and records where the two disagree, without
//! ever reordering blocks or touching `order`.
//!
//! Spatial order sorts blocks that carry a bounding box by
//!
//! 1. page number;
//! 2. top edge `y0`, rounded to the contract precision;
//! 3. left edge `x0`, rounded the same way;
//! 4. block type priority from the contract;
//! 5. `order`.
//!
//! Blocks without a bounding box follow, in their input order.

use std::cmp::Ordering;

use crate::model::{Block, OrderingMetadata};
use crate::stability::{truncate_chars, StabilityContract};

/// Number of discrepancies written to the debug log.
const LOGGED_SAMPLES: usize = 3;

/// Characters of block content shown in a logged sample.
const SAMPLE_CONTENT_CHARS: usize = 30;

/// Summary of one validation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderingReport {
    /// Blocks examined
    pub total: usize,
    /// Blocks that carried a bounding box
    pub with_bbox: usize,
    /// Blocks whose spatial position differs from `order`
    pub discrepancies: usize,
}

impl OrderingReport {
    /// Check if any block disagreed.
    pub fn has_discrepancies(&self) -> bool {
        self.discrepancies > 0
    }
}

/// Compares canonical order against geometry.
#[derive(Debug, Clone, Copy)]
pub struct OrderingValidator {
    contract: &'static StabilityContract,
}

impl OrderingValidator {
    /// Create a validator bound to the current contract.
    pub fn new() -> Self {
        Self {
            contract: StabilityContract::current(),
        }
    }

    /// Spatial position of every block, indexed like `blocks`.
    pub fn compute_spatial_order(&self, blocks: &[Block]) -> Vec<u32> {
        let (mut placed, unplaced): (Vec<usize>, Vec<usize>) =
            (0..blocks.len()).partition(|&i| blocks[i].bbox.is_some());

        let keys: Vec<SpatialKey> = blocks.iter().map(|b| self.spatial_key(b)).collect();
        placed.sort_by(|&a, &b| keys[a].compare(&keys[b]));

        let mut spatial = vec![0u32; blocks.len()];
        for (position, idx) in placed.into_iter().chain(unplaced).enumerate() {
            spatial[idx] = position as u32;
        }
        spatial
    }

    /// Annotate every block with its ordering metadata.
    ///
    /// Never permutes `blocks` and never changes `order`.
    pub fn validate_and_annotate(&self, blocks: &mut [Block]) -> OrderingReport {
        let spatial = self.compute_spatial_order(blocks);
        let mut report = OrderingReport {
            total: blocks.len(),
            with_bbox: blocks.iter().filter(|b| b.has_bbox()).count(),
            discrepancies: 0,
        };

        let mut samples = Vec::new();
        for (block, &spatial_order) in blocks.iter_mut().zip(&spatial) {
            let discrepancy = spatial_order != block.order;
            block.ordering_metadata = Some(OrderingMetadata {
                docling_order: block.order,
                spatial_order: Some(spatial_order),
                order_discrepancy: Some(discrepancy),
            });

            if discrepancy {
                report.discrepancies += 1;
                if samples.len() < LOGGED_SAMPLES {
                    samples.push(format!(
                        "{} order={} spatial={} content={:?}",
                        block.block_id,
                        block.order,
                        spatial_order,
                        truncate_chars(&block.content, SAMPLE_CONTENT_CHARS)
                    ));
                }
            }
        }

        if report.has_discrepancies() {
            log::warn!(
                "Ordering validation: {} of {} blocks differ from spatial order; extraction order kept",
                report.discrepancies,
                report.total
            );
            for sample in samples {
                log::debug!("  order mismatch: {}", sample);
            }
        } else {
            log::info!("Ordering validation passed for {} blocks", report.total);
        }

        report
    }

    fn spatial_key(&self, block: &Block) -> SpatialKey {
        let round = |v: f64| self.contract.round_coordinate(v);
        let (y, x) = block
            .bbox
            .map(|r| (round(r.y0), round(r.x0)))
            .unwrap_or_default();
        SpatialKey {
            page: block.page_number,
            y,
            x,
            priority: self.contract.type_priority(block.block_type),
            order: block.order,
        }
    }
}

/// Sort key of one block, rounded once up front.
struct SpatialKey {
    page: u32,
    y: f64,
    x: f64,
    priority: u8,
    order: u32,
}

impl SpatialKey {
    fn compare(&self, other: &Self) -> Ordering {
        self.page
            .cmp(&other.page)
            .then_with(|| self.y.total_cmp(&other.y))
            .then_with(|| self.x.total_cmp(&other.x))
            .then_with(|| self.priority.cmp(&other.priority))
            .then_with(|| self.order.cmp(&other.order))
    }
}

impl Default for OrderingValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlockType, BoundingBox};

    fn block(id: &str, block_type: BlockType, page: u32, order: u32, bbox: Option<(f64, f64)>) -> Block {
        let mut b = Block::new(id, block_type, page, id, order);
        b.bbox = bbox.map(|(x0, y0)| BoundingBox::new(x0, y0, x0 + 10.0, y0 + 10.0));
        b
    }

    #[test]
    fn test_agreeing_orders() {
        let mut blocks = vec![
            block("a", BlockType::Paragraph, 1, 0, Some((0.0, 0.0))),
            block("b", BlockType::Paragraph, 1, 1, Some((0.0, 20.0))),
            block("c", BlockType::Paragraph, 2, 2, Some((0.0, 0.0))),
        ];
        let report = OrderingValidator::new().validate_and_annotate(&mut blocks);
        assert!(!report.has_discrepancies());
        assert_eq!(report.with_bbox, 3);
        for b in &blocks {
            let meta = b.ordering_metadata.unwrap();
            assert_eq!(meta.docling_order, b.order);
            assert_eq!(meta.order_discrepancy, Some(false));
        }
    }

    #[test]
    fn test_discrepancy_is_annotated_not_fixed() {
        let mut blocks = vec![
            block("low", BlockType::Paragraph, 1, 0, Some((0.0, 500.0))),
            block("high", BlockType::Paragraph, 1, 1, Some((0.0, 10.0))),
        ];
        let report = OrderingValidator::new().validate_and_annotate(&mut blocks);
        assert_eq!(report.discrepancies, 2);
        assert_eq!(blocks[0].block_id, "low");
        assert_eq!(blocks[0].order, 0);
        assert_eq!(blocks[0].ordering_metadata.unwrap().spatial_order, Some(1));
        assert_eq!(blocks[1].ordering_metadata.unwrap().spatial_order, Some(0));
    }

    #[test]
    fn test_blocks_without_bbox_follow() {
        let blocks = vec![
            block("none", BlockType::Paragraph, 1, 0, None),
            block("p2", BlockType::Paragraph, 2, 1, Some((0.0, 0.0))),
            block("p1", BlockType::Paragraph, 1, 2, Some((0.0, 0.0))),
        ];
        let spatial = OrderingValidator::new().compute_spatial_order(&blocks);
        assert_eq!(spatial, vec![2, 1, 0]);
    }

    #[test]
    fn test_type_priority_breaks_ties() {
        let blocks = vec![
            block("para", BlockType::Paragraph, 1, 0, Some((5.0, 5.0))),
            block("head", BlockType::Heading, 1, 1, Some((5.0, 5.0))),
        ];
        let spatial = OrderingValidator::new().compute_spatial_order(&blocks);
        assert_eq!(spatial, vec![1, 0]);
    }

    #[test]
    fn test_order_is_final_tiebreak() {
        let blocks = vec![
            block("second", BlockType::Paragraph, 1, 7, Some((1.0, 1.0))),
            block("first", BlockType::Paragraph, 1, 3, Some((1.0, 1.0))),
        ];
        let spatial = OrderingValidator::new().compute_spatial_order(&blocks);
        assert_eq!(spatial, vec![1, 0]);
    }

    #[test]
    fn test_rounding_makes_near_coordinates_equal() {
        // x0 10.00005 and 10.00004 both round to 10.0, so the type priority decides.
        let blocks = vec![
            block("para", BlockType::Paragraph, 1, 0, Some((10.00005, 5.0))),
            block("head", BlockType::Heading, 1, 1, Some((10.00004, 5.0))),
        ];
        let spatial = OrderingValidator::new().compute_spatial_order(&blocks);
        assert_eq!(spatial, vec![1, 0]);
    }

    #[test]
    fn test_key_precedence_across_pages() {
        let blocks = vec![
            block("c", BlockType::Paragraph, 1, 0, Some((50.0, 10.0))),
            block("a", BlockType::Table, 1, 1, Some((0.0, 10.0))),
            block("d", BlockType::Paragraph, 2, 2, Some((0.0, 0.0))),
            block("e", BlockType::Paragraph, 1, 3, None),
            block("b", BlockType::Heading, 1, 4, Some((50.0, 10.0))),
        ];
        let validator = OrderingValidator::new();
        let spatial = validator.compute_spatial_order(&blocks);
        assert_eq!(spatial, vec![2, 0, 3, 4, 1]);
        assert_eq!(validator.compute_spatial_order(&blocks), spatial);
    }

    #[test]
    fn test_empty_input() {
        let mut blocks: Vec<Block> = Vec::new();
        let report = OrderingValidator::new().validate_and_annotate(&mut blocks);
        assert_eq!(report, OrderingReport::default());
    }
}
