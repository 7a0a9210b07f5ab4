//! Split strategies for components the classifier rejects as single sprites
//!
//! Every strategy assigns the component's pixels to buckets and emits the
//! tight bounds of each non-empty bucket, padded and clamped like detection
//! results. Pieces below the minimum size are dropped; if nothing usable is
//! left the original bounds are kept.

use isomap_core::PixelRect;

use crate::classify::{Axis, SplitDecision};
use crate::components::{meets_min_size, Component};
use crate::settings::DetectionSettings;

/// Running bounds of one bucket
#[derive(Debug, Clone, Copy)]
struct Bucket {
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
}

impl Bucket {
    fn new(x: u32, y: u32) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    fn add(&mut self, x: u32, y: u32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    fn rect(&self) -> PixelRect {
        PixelRect::from_extents(self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

/// Apply `decision` to a component, returning padded region bounds.
///
/// `area` is the rectangle results are clamped to (normally the bitmap).
pub fn split_component(
    component: &Component,
    decision: SplitDecision,
    area: &PixelRect,
    settings: &DetectionSettings,
) -> Vec<PixelRect> {
    let buckets = match decision {
        SplitDecision::Keep => return vec![component.bounds],
        SplitDecision::SplitGrid(axis) => grid_buckets(component, axis, settings),
        SplitDecision::SplitAtGaps(axis) => gap_buckets(component, axis),
        SplitDecision::SplitByDensity => density_buckets(component, settings),
    };

    let pieces: Vec<PixelRect> = buckets
        .into_iter()
        .flatten()
        .map(|bucket| bucket.rect().padded(settings.padding, area))
        .filter(|rect| meets_min_size(rect, settings.min_size))
        .collect();

    if pieces.is_empty() {
        log::warn!(
            "{:?} of component at ({}, {}) produced no usable regions, keeping it whole",
            decision,
            component.content.x,
            component.content.y
        );
        return vec![component.bounds];
    }
    log::debug!(
        "{:?} split component at ({}, {}) into {} regions",
        decision,
        component.content.x,
        component.content.y,
        pieces.len()
    );
    pieces
}

fn collect(
    component: &Component,
    bucket_count: usize,
    bucket_of: impl Fn(u32, u32) -> Option<usize>,
) -> Vec<Option<Bucket>> {
    let mut buckets: Vec<Option<Bucket>> = vec![None; bucket_count];
    for &(x, y) in &component.pixels {
        let Some(idx) = bucket_of(x, y) else {
            continue;
        };
        match &mut buckets[idx] {
            Some(bucket) => bucket.add(x, y),
            slot => *slot = Some(Bucket::new(x, y)),
        }
    }
    buckets
}

/// Tile-sized strips along `axis`
fn grid_buckets(component: &Component, axis: Axis, settings: &DetectionSettings) -> Vec<Option<Bucket>> {
    let content = component.content;
    let tile = settings.tile_size;
    match axis {
        Axis::Horizontal => {
            let strips = content.width.div_ceil(tile.width) as usize;
            collect(component, strips, |x, _| {
                Some(((x - content.x) / tile.width) as usize)
            })
        }
        Axis::Vertical => {
            let strips = content.height.div_ceil(tile.height) as usize;
            collect(component, strips, |_, y| {
                Some(((y - content.y) / tile.height) as usize)
            })
        }
    }
}

/// Segments between sparse columns (or rows) of the component
fn gap_buckets(component: &Component, axis: Axis) -> Vec<Option<Bucket>> {
    let content = component.content;
    let (length, cross) = match axis {
        Axis::Horizontal => (content.width, content.height),
        Axis::Vertical => (content.height, content.width),
    };

    let mut profile = vec![0u32; length as usize];
    for &(x, y) in &component.pixels {
        let i = match axis {
            Axis::Horizontal => x - content.x,
            Axis::Vertical => y - content.y,
        };
        profile[i as usize] += 1;
    }

    let segments = gap_segments(&profile, cross, component.density());
    let segment_count = segments.iter().flatten().max().map_or(0, |&s| s + 1);
    collect(component, segment_count, |x, y| {
        let i = match axis {
            Axis::Horizontal => x - content.x,
            Axis::Vertical => y - content.y,
        };
        segments[i as usize]
    })
}

/// Assign each profile index to a segment, `None` for cut indices.
///
/// An index is a cut when its density is below 30% of `average` and both
/// neighbours contain pixels.
fn gap_segments(profile: &[u32], cross: u32, average: f64) -> Vec<Option<usize>> {
    let threshold = 0.3 * average;
    let is_cut = |i: usize| {
        if i == 0 || i + 1 >= profile.len() {
            return false;
        }
        let density = profile[i] as f64 / cross as f64;
        density < threshold && profile[i - 1] > 0 && profile[i + 1] > 0
    };

    let mut segments = Vec::with_capacity(profile.len());
    let mut current = 0usize;
    let mut in_segment = false;
    for i in 0..profile.len() {
        if is_cut(i) {
            if in_segment {
                current += 1;
                in_segment = false;
            }
            segments.push(None);
        } else {
            in_segment = true;
            segments.push(Some(current));
        }
    }
    segments
}

/// One bucket per cell of a `min(tile width, tile height)` grid
fn density_buckets(component: &Component, settings: &DetectionSettings) -> Vec<Option<Bucket>> {
    let content = component.content;
    let cell = settings.tile_size.min_side();
    let columns = content.width.div_ceil(cell);
    let rows = content.height.div_ceil(cell);
    collect(component, (columns * rows) as usize, |x, y| {
        let col = (x - content.x) / cell;
        let row = (y - content.y) / cell;
        Some((row * columns + col) as usize)
    })
}
