use isomap::types::{Bitmap, LayerType, TileLayer, TilesetGeometry};
use isomap::segment::{BrushPalette, DetectionSettings, SegmentError};
use isomap::{ExportPlan, TilesetBindings};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// A sheet of 12x12 squares on a 20px pitch
fn square_sheet(columns: u32, rows: u32) -> Bitmap {
    let (w, h) = (columns * 20, rows * 20);
    let mut alpha = vec![0u8; (w * h) as usize];
    for row in 0..rows {
        for col in 0..columns {
            for y in row * 20 + 4..row * 20 + 16 {
                for x in col * 20 + 4..col * 20 + 16 {
                    alpha[(y * w + x) as usize] = 255;
                }
            }
        }
    }
    Bitmap::from_alpha(w, h, &alpha).unwrap()
}

fn assert_contiguous(palette: &BrushPalette) {
    let gids: Vec<u32> = palette.iter().map(|(gid, _)| gid).collect();
    let expected: Vec<u32> = (1..=palette.len() as u32).collect();
    assert_eq!(gids, expected);

    let bounds = palette.bitmap().rect();
    for (_, region) in palette.iter() {
        assert!(bounds.contains_rect(&region.rect()));
    }
}

#[test]
fn random_operations_keep_ids_contiguous() {
    let bitmap = square_sheet(6, 3);
    let mut palette = BrushPalette::detect(bitmap, DetectionSettings::default()).unwrap();
    assert_eq!(palette.len(), 18);

    let mut layer = TileLayer::new(LayerType::Object, 8, 8);
    for (i, gid) in (1..=18).enumerate() {
        layer.set(i as u32 % 8, i as u32 / 8, gid).unwrap();
    }

    let mut rng = SmallRng::seed_from_u64(0x150_3a9);
    for _ in 0..300 {
        let len = palette.len();
        let before = palette.snapshot();
        let result = match rng.gen_range(0..5) {
            0 => {
                let count = rng.gen_range(0..4);
                let ids: Vec<u32> = (0..count)
                    .map(|_| rng.gen_range(1..=len as u32 + 1))
                    .collect();
                palette.merge(&ids)
            }
            1 => palette.separate(rng.gen_range(1..=len as u32 + 1)),
            2 if len > 4 => palette.remove(rng.gen_range(1..=len as u32 + 1)),
            _ => palette.reorder(rng.gen_range(0..=len), rng.gen_range(0..=len)),
        };

        match result {
            Ok(change) => {
                if let Some(remap) = change.remap() {
                    assert_eq!(remap.len(), len);
                    layer.apply_remap(remap);
                } else {
                    assert_eq!(palette.snapshot(), before);
                }
            }
            Err(SegmentError::NotFound(_)) | Err(SegmentError::IndexOutOfRange { .. }) => {
                assert_eq!(palette.snapshot(), before);
            }
            Err(e) => panic!("unexpected error: {e}"),
        }

        assert_contiguous(&palette);
        assert!(layer.max_gid() as usize <= palette.len());
    }
}

#[test]
fn merge_then_export_with_remapped_layer() {
    let bitmap = square_sheet(4, 1);
    let geometry = TilesetGeometry::from_image_size(80, 20, 20, 20, 0, 0).unwrap();
    let mut bindings = TilesetBindings::new();
    bindings
        .bind(
            LayerType::Object,
            bitmap,
            geometry,
            "tiles/crates.png",
            DetectionSettings::default(),
        )
        .unwrap();

    let mut layer = TileLayer::new(LayerType::Object, 4, 1);
    for x in 0..4 {
        layer.set(x, 0, x + 1).unwrap();
    }

    let palette = bindings.palette_mut(LayerType::Object).unwrap();
    assert!(palette.merge(&[1]).unwrap().is_unchanged());
    let change = palette.merge(&[2, 3]).unwrap();
    assert_eq!(palette.len(), 3);

    // Without the remap the old id 4 is stale
    let plan = ExportPlan::build(&bindings);
    assert!(plan.layer_cells(&layer).is_err());

    layer.apply_remap(change.remap().unwrap());
    assert_eq!(layer.cells(), &[1, 2, 2, 3]);

    let plan = ExportPlan::build(&bindings);
    assert_eq!(plan.layer_cells(&layer).unwrap(), vec![1, 2, 2, 3]);

    let mut out = Vec::new();
    plan.write_tile_records(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "img=tiles/crates.png",
            "tile=1,3,3,14,14,7,0",
            "tile=2,23,3,34,14,17,0",
            "tile=3,63,3,14,14,7,0",
        ]
    );
}
