//! Heading hierarchy.

use crate::model::{Block, Relationship};

/// Build `parent_child` edges from the heading structure.
///
/// Walks `blocks` in order with a stack of open `(block_id, level)` headings.
/// A heading at level `L` closes every open heading with level `>= L`, is
/// attached to the heading left on top, and is then opened itself. Every
/// other block is attached to the heading on top of the stack, if any.
/// Headings without a usable level behave like ordinary blocks.
///
/// Sets `parent_id` on each attached block.
pub fn build_relationships(blocks: &mut [Block]) -> Vec<Relationship> {
    let mut relationships = Vec::new();
    let mut stack: Vec<(String, u8)> = Vec::new();

    for block in blocks.iter_mut() {
        if let Some(level) = block.heading_level() {
            while stack.last().is_some_and(|(_, open)| *open >= level) {
                stack.pop();
            }
            attach(block, stack.last(), &mut relationships);
            stack.push((block.block_id.clone(), level));
        } else {
            attach(block, stack.last(), &mut relationships);
        }
    }

    relationships
}

fn attach(block: &mut Block, parent: Option<&(String, u8)>, relationships: &mut Vec<Relationship>) {
    if let Some((parent_id, _)) = parent {
        block.parent_id = Some(parent_id.clone());
        relationships.push(Relationship::parent_child(parent_id.clone(), block.block_id.clone()));
    }
}
