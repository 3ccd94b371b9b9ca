//! Placeholders for blocks that are rendered outside the text flow.

use folio_core::Block;

/// Opaque handle of a reserved placeholder, unique within one assembly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttachmentHandle(pub u32);

/// A reserved region awaiting externally rendered content.
///
/// Created once during assembly and never mutated afterwards; the painting
/// layer swaps real content into the region identified by `handle`.
#[derive(Clone, Debug, PartialEq)]
pub struct AttachmentRecord {
    /// Position of the owning top-level block.
    pub block_index: usize,
    pub block: Block,
    pub handle: AttachmentHandle,
    /// Height of the placeholder line, in points.
    pub reserved_height: f32,
    /// Buffer offset of the anchor character.
    pub anchor_offset: usize,
}

/// Collects attachment records in document order.
#[derive(Clone, Debug, Default)]
pub struct AttachmentRegistry {
    records: Vec<AttachmentRecord>,
}

impl AttachmentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a placeholder of `height` for `block`, anchored at `anchor_offset`.
    pub fn reserve(
        &mut self,
        block_index: usize,
        block: &Block,
        height: f32,
        anchor_offset: usize,
    ) -> AttachmentHandle {
        debug_assert!(height > 0.0, "placeholder height must be positive");
        let handle = AttachmentHandle(self.records.len() as u32);
        self.records.push(AttachmentRecord {
            block_index,
            block: block.clone(),
            handle,
            reserved_height: height.max(1.0),
            anchor_offset,
        });
        handle
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<AttachmentRecord> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_sequential_and_resolvable() {
        let mut registry = AttachmentRegistry::new();
        let a = registry.reserve(0, &Block::ThematicBreak, 24.0, 0);
        let b = registry.reserve(
            3,
            &Block::DiagramBlock {
                code: "graph TD; A-->B".into(),
            },
            240.0,
            10,
        );
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);

        let records = registry.into_records();
        let record = &records[b.0 as usize];
        assert_eq!(record.handle, b);
        assert_eq!(record.block_index, 3);
        assert_eq!(record.reserved_height, 240.0);
        assert_eq!(record.anchor_offset, 10);
    }
}
