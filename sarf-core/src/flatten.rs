//! Expansion of composite lexical entries into their leaves

use std::sync::Arc;

use crate::error::{MorphError, Result};
use crate::lexicon::{LexicalEntry, Lexicon, Part};

/// Nesting depth beyond which an entry graph is considered cyclic
pub const MAX_SEGMENT_DEPTH: usize = 8;

/// A leaf entry together with the word slot it fills
#[derive(Debug, Clone)]
pub struct Leaf {
    pub entry: Arc<LexicalEntry>,
    pub part: Part,
}

/// Flatten `entry` into its leaves, in order
///
/// An unsegmented entry yields itself as a single STEM leaf. A segment
/// inside a PREFIX or SUFFIX slot keeps that slot even if it declares a
/// different part of its own.
pub fn flatten(lexicon: &dyn Lexicon, entry: &Arc<LexicalEntry>, capacity: usize) -> Result<Vec<Leaf>> {
    let mut leaves = Vec::new();
    let mut stack = vec![(entry.clone(), Part::Stem, 0usize)];

    while let Some((node, part, depth)) = stack.pop() {
        if node.is_leaf() {
            if leaves.len() >= capacity {
                return Err(MorphError::capacity("flattened entries", capacity));
            }
            leaves.push(Leaf { entry: node, part });
            continue;
        }

        if depth >= MAX_SEGMENT_DEPTH {
            return Err(MorphError::InternalInconsistency(format!(
                "entry {} nests deeper than {MAX_SEGMENT_DEPTH} levels",
                entry.id
            )));
        }

        // reversed so the first segment is popped first
        for seg in node.segments.iter().rev() {
            let child = lexicon.require_entry(seg.entry)?;
            let child_part = match part {
                Part::Prefix | Part::Suffix => part,
                _ => seg.part,
            };
            stack.push((child, child_part, depth + 1));
        }
    }

    Ok(leaves)
}
