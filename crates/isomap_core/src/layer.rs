//! Layer types and tile layer grids

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// The kind of a map layer.
///
/// Variants are declared in export priority order, so the derived `Ord` is the
/// order in which tilesets are laid out in the global id namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerType {
    Collision,
    Background,
    Object,
    Event,
    Enemy,
    Npc,
}

impl LayerType {
    /// All layer types in priority order
    pub const ALL: [LayerType; 6] = [
        LayerType::Collision,
        LayerType::Background,
        LayerType::Object,
        LayerType::Event,
        LayerType::Enemy,
        LayerType::Npc,
    ];

    /// Position in the export order (lower comes first)
    pub fn priority(&self) -> u8 {
        *self as u8
    }

    /// Get the display name of this layer type
    pub fn name(&self) -> &'static str {
        match self {
            LayerType::Collision => "collision",
            LayerType::Background => "background",
            LayerType::Object => "object",
            LayerType::Event => "event",
            LayerType::Enemy => "enemy",
            LayerType::Npc => "npc",
        }
    }

    /// Parse a layer name, accepting "primary" as an alias for the background layer
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "collision" => Some(LayerType::Collision),
            "background" | "primary" => Some(LayerType::Background),
            "object" => Some(LayerType::Object),
            "event" => Some(LayerType::Event),
            "enemy" => Some(LayerType::Enemy),
            "npc" => Some(LayerType::Npc),
            _ => None,
        }
    }
}

/// Mapping from palette ids before a renumbering to ids after it.
///
/// Old ids that no longer exist map to 0 (empty). Ids beyond the mapping are
/// passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GidRemap {
    targets: Vec<u32>,
}

impl GidRemap {
    /// Create from a table where `targets[old - 1]` is the new id
    pub fn new(targets: Vec<u32>) -> Self {
        Self { targets }
    }

    /// A mapping that leaves `count` ids untouched
    pub fn identity(count: u32) -> Self {
        Self::new((1..=count).collect())
    }

    /// Translate an old id
    pub fn map(&self, gid: u32) -> u32 {
        if gid == 0 {
            return 0;
        }
        self.targets
            .get(gid as usize - 1)
            .copied()
            .unwrap_or(gid)
    }

    /// Check if no id changes
    pub fn is_identity(&self) -> bool {
        self.targets
            .iter()
            .enumerate()
            .all(|(i, &target)| target as usize == i + 1)
    }

    /// Number of old ids covered
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// A grid of palette-local tile ids for one layer (0 = empty)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileLayer {
    pub layer_type: LayerType,
    width: u32,
    height: u32,
    cells: Vec<u32>,
}

impl TileLayer {
    /// Create an empty layer
    pub fn new(layer_type: LayerType, width: u32, height: u32) -> Self {
        Self {
            layer_type,
            width,
            height,
            cells: vec![0; width as usize * height as usize],
        }
    }

    /// Wrap existing row-major cell data
    pub fn from_cells(
        layer_type: LayerType,
        width: u32,
        height: u32,
        cells: Vec<u32>,
    ) -> Result<Self, CoreError> {
        if cells.len() != width as usize * height as usize {
            return Err(CoreError::InvalidInput(format!(
                "{} layer data has {} cells, expected {width}x{height}",
                layer_type.name(),
                cells.len()
            )));
        }
        Ok(Self {
            layer_type,
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major cell data
    pub fn cells(&self) -> &[u32] {
        &self.cells
    }

    fn index(&self, x: u32, y: u32) -> Result<usize, CoreError> {
        if x >= self.width || y >= self.height {
            return Err(CoreError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok((y * self.width + x) as usize)
    }

    /// Get the id at a cell, `None` outside the layer
    pub fn get(&self, x: u32, y: u32) -> Option<u32> {
        self.index(x, y).ok().map(|idx| self.cells[idx])
    }

    /// Set the id at a cell, returning the previous id
    pub fn set(&mut self, x: u32, y: u32, gid: u32) -> Result<u32, CoreError> {
        let idx = self.index(x, y)?;
        Ok(std::mem::replace(&mut self.cells[idx], gid))
    }

    /// Fill every cell with one id
    pub fn fill(&mut self, gid: u32) {
        self.cells.fill(gid);
    }

    /// Reset every cell to empty
    pub fn clear(&mut self) {
        self.fill(0);
    }

    /// Iterate over non-empty cells as (x, y, gid)
    pub fn occupied(&self) -> impl Iterator<Item = (u32, u32, u32)> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &gid)| gid != 0)
            .map(move |(i, &gid)| (i as u32 % width, i as u32 / width, gid))
    }

    /// Highest id referenced by the layer (0 if empty)
    pub fn max_gid(&self) -> u32 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    /// Retarget cells after a palette renumbering, returning how many changed
    pub fn apply_remap(&mut self, remap: &GidRemap) -> usize {
        let mut changed = 0;
        for cell in &mut self.cells {
            let mapped = remap.map(*cell);
            if mapped != *cell {
                *cell = mapped;
                changed += 1;
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order() {
        let mut types = vec![
            LayerType::Npc,
            LayerType::Object,
            LayerType::Collision,
            LayerType::Enemy,
            LayerType::Background,
            LayerType::Event,
        ];
        types.sort();
        assert_eq!(types, LayerType::ALL.to_vec());
        assert!(LayerType::Collision.priority() < LayerType::Background.priority());
    }

    #[test]
    fn test_from_name() {
        assert_eq!(LayerType::from_name("primary"), Some(LayerType::Background));
        assert_eq!(LayerType::from_name(" NPC "), Some(LayerType::Npc));
        assert_eq!(LayerType::from_name("decor"), None);
    }

    #[test]
    fn test_new_tile_layer() {
        let layer = TileLayer::new(LayerType::Background, 10, 10);

        assert_eq!(layer.cells().len(), 100);
        assert!(layer.cells().iter().all(|&gid| gid == 0));
        assert_eq!(layer.occupied().count(), 0);
    }

    #[test]
    fn test_set_and_get() {
        let mut layer = TileLayer::new(LayerType::Object, 4, 3);
        assert_eq!(layer.set(3, 2, 7), Ok(0));
        assert_eq!(layer.set(3, 2, 9), Ok(7));
        assert_eq!(layer.get(3, 2), Some(9));
        assert_eq!(layer.get(4, 0), None);
        assert!(matches!(
            layer.set(0, 3, 1),
            Err(CoreError::OutOfBounds { x: 0, y: 3, .. })
        ));
        assert_eq!(layer.occupied().collect::<Vec<_>>(), vec![(3, 2, 9)]);
    }

    #[test]
    fn test_from_cells_size_mismatch() {
        assert!(TileLayer::from_cells(LayerType::Event, 2, 2, vec![0, 1, 2]).is_err());
    }

    #[test]
    fn test_apply_remap() {
        let mut layer =
            TileLayer::from_cells(LayerType::Background, 3, 2, vec![0, 1, 2, 3, 4, 9]).unwrap();
        // id 2 removed, 3 and 4 shift down
        let remap = GidRemap::new(vec![1, 0, 2, 3]);
        let changed = layer.apply_remap(&remap);

        assert_eq!(changed, 3);
        assert_eq!(layer.cells(), &[0, 1, 0, 2, 3, 9]);
        assert!(!remap.is_identity());
        assert!(GidRemap::identity(4).is_identity());
    }
}
