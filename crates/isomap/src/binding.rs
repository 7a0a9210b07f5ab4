//! Per-layer tileset bindings

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use isomap_core::{Bitmap, LayerType, TilesetGeometry};
use isomap_segment::{BrushPalette, DetectionCache, DetectionSettings};
use uuid::Uuid;

use crate::IsoMapError;

/// One map layer type paired with a tileset bitmap and its brush palette
#[derive(Debug, Clone)]
pub struct LayerTilesetBinding {
    pub id: Uuid,
    pub layer_type: LayerType,
    pub geometry: TilesetGeometry,
    pub source_path: PathBuf,
    pub palette: BrushPalette,
}

impl LayerTilesetBinding {
    /// Create a binding around an existing palette
    pub fn new(
        layer_type: LayerType,
        palette: BrushPalette,
        geometry: TilesetGeometry,
        source_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            layer_type,
            geometry,
            source_path: source_path.into(),
            palette,
        }
    }

    pub fn bitmap(&self) -> &Bitmap {
        self.palette.bitmap()
    }

    /// Number of palette entries
    pub fn tile_count(&self) -> u32 {
        self.palette.len() as u32
    }

    /// File name of the source path, used to order bindings of the same layer type
    pub fn file_name(&self) -> String {
        file_name(&self.source_path)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// The set of bindings for one map, keyed by layer type
#[derive(Debug, Default)]
pub struct TilesetBindings {
    bindings: BTreeMap<LayerType, LayerTilesetBinding>,
    cache: DetectionCache,
}

impl TilesetBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a tileset to a layer, detecting its sprite regions.
    ///
    /// Replaces any existing binding for the layer type and returns it.
    pub fn bind(
        &mut self,
        layer_type: LayerType,
        bitmap: Bitmap,
        geometry: TilesetGeometry,
        source_path: impl Into<PathBuf>,
        settings: DetectionSettings,
    ) -> Result<Option<LayerTilesetBinding>, IsoMapError> {
        let palette = self.cache.palette(&bitmap, &settings)?;
        Ok(self.insert(LayerTilesetBinding::new(
            layer_type,
            palette,
            geometry,
            source_path,
        )))
    }

    /// Bind a classic grid tileset, one palette entry per non-empty cell
    pub fn bind_grid(
        &mut self,
        layer_type: LayerType,
        bitmap: Bitmap,
        geometry: TilesetGeometry,
        source_path: impl Into<PathBuf>,
        settings: DetectionSettings,
    ) -> Result<Option<LayerTilesetBinding>, IsoMapError> {
        let palette = BrushPalette::from_grid(bitmap, settings, &geometry)?;
        Ok(self.insert(LayerTilesetBinding::new(
            layer_type,
            palette,
            geometry,
            source_path,
        )))
    }

    /// Insert a prepared binding, returning the one it replaces
    pub fn insert(&mut self, binding: LayerTilesetBinding) -> Option<LayerTilesetBinding> {
        let layer_type = binding.layer_type;
        log::info!(
            "bound {} to the {} layer with {} tiles",
            binding.source_path.display(),
            layer_type.name(),
            binding.tile_count()
        );
        let previous = self.bindings.insert(layer_type, binding);
        if let Some(old) = &previous {
            log::info!(
                "replaced {} on the {} layer",
                old.source_path.display(),
                layer_type.name()
            );
            self.release_bitmap(old.bitmap().id());
        }
        previous
    }

    /// Remove the binding for a layer type
    pub fn unbind(&mut self, layer_type: LayerType) -> Option<LayerTilesetBinding> {
        let removed = self.bindings.remove(&layer_type)?;
        log::info!(
            "unbound {} from the {} layer",
            removed.source_path.display(),
            layer_type.name()
        );
        self.release_bitmap(removed.bitmap().id());
        Some(removed)
    }

    /// Drop cached detection for a bitmap no binding uses any more
    fn release_bitmap(&mut self, bitmap_id: Uuid) {
        let in_use = self
            .bindings
            .values()
            .any(|binding| binding.bitmap().id() == bitmap_id);
        if !in_use {
            self.cache.invalidate(bitmap_id);
        }
    }

    /// Re-run detection on a bound tileset with new settings
    pub fn redetect(
        &mut self,
        layer_type: LayerType,
        settings: DetectionSettings,
    ) -> Result<usize, IsoMapError> {
        let binding = self
            .bindings
            .get_mut(&layer_type)
            .ok_or(IsoMapError::BindingNotFound(layer_type))?;
        let palette = self.cache.palette(binding.palette.bitmap(), &settings)?;
        let count = palette.len();
        binding.palette = palette;
        log::info!(
            "re-detected {} tiles on the {} layer",
            count,
            layer_type.name()
        );
        Ok(count)
    }

    pub fn get(&self, layer_type: LayerType) -> Option<&LayerTilesetBinding> {
        self.bindings.get(&layer_type)
    }

    pub fn get_mut(&mut self, layer_type: LayerType) -> Option<&mut LayerTilesetBinding> {
        self.bindings.get_mut(&layer_type)
    }

    /// Find a binding by id
    pub fn by_id(&self, id: Uuid) -> Option<&LayerTilesetBinding> {
        self.bindings.values().find(|binding| binding.id == id)
    }

    /// The palette of a bound layer
    pub fn palette_mut(&mut self, layer_type: LayerType) -> Result<&mut BrushPalette, IsoMapError> {
        self.bindings
            .get_mut(&layer_type)
            .map(|binding| &mut binding.palette)
            .ok_or(IsoMapError::BindingNotFound(layer_type))
    }

    /// Bindings in layer priority order
    pub fn iter(&self) -> impl Iterator<Item = &LayerTilesetBinding> {
        self.bindings.values()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(squares: u32) -> Bitmap {
        let (w, h) = (32 * squares, 32);
        let mut alpha = vec![0u8; (w * h) as usize];
        for i in 0..squares {
            for y in 4..20 {
                for x in (i * 32 + 4)..(i * 32 + 20) {
                    alpha[(y * w + x) as usize] = 255;
                }
            }
        }
        Bitmap::from_alpha(w, h, &alpha).unwrap()
    }

    fn geometry(bitmap: &Bitmap) -> TilesetGeometry {
        TilesetGeometry::from_image_size(bitmap.width(), bitmap.height(), 32, 32, 0, 0).unwrap()
    }

    #[test]
    fn test_bind_detects_palette() {
        let mut bindings = TilesetBindings::new();
        let bitmap = sheet(3);
        let geo = geometry(&bitmap);
        let replaced = bindings
            .bind(LayerType::Object, bitmap, geo, "tiles/props.png", DetectionSettings::default())
            .unwrap();

        assert!(replaced.is_none());
        let binding = bindings.get(LayerType::Object).unwrap();
        assert_eq!(binding.tile_count(), 3);
        assert_eq!(binding.file_name(), "props.png");
        assert_eq!(bindings.by_id(binding.id).unwrap().layer_type, LayerType::Object);
    }

    #[test]
    fn test_rebind_replaces() {
        let mut bindings = TilesetBindings::new();
        let first = sheet(2);
        let second = sheet(4);
        let settings = DetectionSettings::default();

        let geo = geometry(&first);
        bindings.bind(LayerType::Background, first, geo, "a.png", settings).unwrap();
        let geo = geometry(&second);
        let old = bindings
            .bind(LayerType::Background, second, geo, "b.png", settings)
            .unwrap()
            .unwrap();

        assert_eq!(old.source_path, PathBuf::from("a.png"));
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings.get(LayerType::Background).unwrap().tile_count(), 4);
    }

    #[test]
    fn test_unbind() {
        let mut bindings = TilesetBindings::new();
        let bitmap = sheet(1);
        let geo = geometry(&bitmap);
        bindings
            .bind(LayerType::Npc, bitmap, geo, "npc.png", DetectionSettings::default())
            .unwrap();

        assert!(bindings.unbind(LayerType::Npc).is_some());
        assert!(bindings.unbind(LayerType::Npc).is_none());
        assert!(bindings.is_empty());
    }

    #[test]
    fn test_shared_bitmap_on_two_layers() {
        let mut bindings = TilesetBindings::new();
        let bitmap = sheet(2);
        let geo = geometry(&bitmap);
        let settings = DetectionSettings::default();
        bindings
            .bind(LayerType::Enemy, bitmap.clone(), geo, "mobs.png", settings)
            .unwrap();
        bindings.bind(LayerType::Npc, bitmap, geo, "mobs.png", settings).unwrap();

        let enemy = bindings.get(LayerType::Enemy).unwrap();
        let npc = bindings.get(LayerType::Npc).unwrap();
        assert!(enemy.bitmap().shares_pixels_with(npc.bitmap()));
        assert_ne!(enemy.id, npc.id);
    }

    #[test]
    fn test_redetect_and_missing_binding() {
        let mut bindings = TilesetBindings::new();
        let bitmap = sheet(2);
        let geo = geometry(&bitmap);
        bindings
            .bind(LayerType::Object, bitmap, geo, "p.png", DetectionSettings::default())
            .unwrap();

        let strict = DetectionSettings::default().with_min_size(20);
        assert_eq!(bindings.redetect(LayerType::Object, strict).unwrap(), 0);
        assert!(matches!(
            bindings.redetect(LayerType::Event, strict),
            Err(IsoMapError::BindingNotFound(LayerType::Event))
        ));
        assert!(bindings.palette_mut(LayerType::Collision).is_err());
    }

    #[test]
    fn test_bind_grid() {
        let mut bindings = TilesetBindings::new();
        let bitmap = sheet(3);
        let geo = geometry(&bitmap);
        bindings
            .bind_grid(LayerType::Collision, bitmap, geo, "grid.png", DetectionSettings::default())
            .unwrap();
        assert_eq!(bindings.get(LayerType::Collision).unwrap().tile_count(), 3);
    }

    #[test]
    fn test_iter_in_priority_order() {
        let mut bindings = TilesetBindings::new();
        let settings = DetectionSettings::default();
        for layer in [LayerType::Npc, LayerType::Collision, LayerType::Object] {
            let bitmap = sheet(1);
            let geo = geometry(&bitmap);
            bindings.bind(layer, bitmap, geo, "t.png", settings).unwrap();
        }
        let order: Vec<LayerType> = bindings.iter().map(|b| b.layer_type).collect();
        assert_eq!(order, vec![LayerType::Collision, LayerType::Object, LayerType::Npc]);
    }
}
