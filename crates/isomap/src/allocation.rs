//! Global tile id allocation across bound tilesets
//!
//! Each binding receives a contiguous block of global ids. Blocks are laid out
//! by layer priority, then by source file name, then by full source path, so
//! the table only depends on the set of bindings and not on bind order.

use std::ops::Range;
use std::path::PathBuf;

use isomap_core::LayerType;
use serde::Serialize;
use uuid::Uuid;

use crate::binding::LayerTilesetBinding;

/// The block of global ids assigned to one binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocationEntry {
    pub binding_id: Uuid,
    pub layer_type: LayerType,
    pub source_path: PathBuf,
    /// First global id of the block
    pub offset: u32,
    pub count: u32,
}

impl AllocationEntry {
    /// Global ids covered by this entry
    pub fn range(&self) -> Range<u32> {
        self.offset..self.offset + self.count
    }

    /// Translate a palette id to a global id; 0 stays 0, unknown ids are `None`
    pub fn global_id(&self, local: u32) -> Option<u32> {
        match local {
            0 => Some(0),
            _ if local <= self.count => Some(self.offset + local - 1),
            _ => None,
        }
    }
}

/// Ordered allocation of global ids, covering `1..=total_count()` without overlap
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GlobalAllocationTable {
    entries: Vec<AllocationEntry>,
    total: u32,
}

impl GlobalAllocationTable {
    /// Lay out the given bindings in the global id namespace
    pub fn allocate<'a>(bindings: impl IntoIterator<Item = &'a LayerTilesetBinding>) -> Self {
        let mut sorted: Vec<&LayerTilesetBinding> = bindings.into_iter().collect();
        sorted.sort_by(|a, b| {
            a.layer_type
                .cmp(&b.layer_type)
                .then_with(|| a.file_name().cmp(&b.file_name()))
                .then_with(|| a.source_path.cmp(&b.source_path))
        });

        let mut offset = 1u32;
        let entries: Vec<AllocationEntry> = sorted
            .into_iter()
            .map(|binding| {
                let entry = AllocationEntry {
                    binding_id: binding.id,
                    layer_type: binding.layer_type,
                    source_path: binding.source_path.clone(),
                    offset,
                    count: binding.tile_count(),
                };
                offset += entry.count;
                entry
            })
            .collect();

        log::debug!(
            "allocated {} global ids across {} tilesets",
            offset - 1,
            entries.len()
        );
        Self {
            entries,
            total: offset - 1,
        }
    }

    /// Entries in allocation order
    pub fn entries(&self) -> &[AllocationEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &AllocationEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of global ids allocated
    pub fn total_count(&self) -> u32 {
        self.total
    }

    pub fn entry_for(&self, binding_id: Uuid) -> Option<&AllocationEntry> {
        self.entries.iter().find(|entry| entry.binding_id == binding_id)
    }

    /// Entry for a layer type (the first one, if several share it)
    pub fn entry_for_layer(&self, layer_type: LayerType) -> Option<&AllocationEntry> {
        self.entries.iter().find(|entry| entry.layer_type == layer_type)
    }

    /// Translate a binding's palette id to its global id
    pub fn global_id(&self, binding_id: Uuid, local: u32) -> Option<u32> {
        self.entry_for(binding_id)?.global_id(local)
    }

    /// Find the entry and palette id behind a global id
    pub fn resolve(&self, global: u32) -> Option<(&AllocationEntry, u32)> {
        if global == 0 || global > self.total {
            return None;
        }
        let idx = self.entries.partition_point(|entry| entry.offset + entry.count <= global);
        let entry = self.entries.get(idx)?;
        entry
            .range()
            .contains(&global)
            .then(|| (entry, global - entry.offset + 1))
    }
}
