//! Shape heuristics deciding whether a component is kept whole or split
//!
//! Classification runs an ordered list of [`ShapeRule`]s over the component's
//! [`ShapeMetrics`]; the first rule that returns a decision wins and
//! [`SplitDecision::Keep`] is the fallback.

use isomap_core::TileSize;
use serde::{Deserialize, Serialize};

use crate::components::Component;

/// Number of bands used when checking a wall's thickness for consistency
const WALL_SEGMENTS: usize = 5;
/// Maximum relative standard deviation of band spans for a wall
const WALL_MAX_REL_STD_DEV: f64 = 0.3;
/// Minimum fraction of bands that must contain pixels for a wall
const WALL_MIN_POPULATED: f64 = 0.7;
/// Maximum relative standard deviation of column densities for a uniform floor
const FLOOR_MAX_REL_STD_DEV: f64 = 0.15;

/// Direction along which a component is cut
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Cut into side-by-side strips along the x axis
    Horizontal,
    /// Cut into stacked strips along the y axis
    Vertical,
}

/// What to do with a detected component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SplitDecision {
    Keep,
    SplitGrid(Axis),
    SplitAtGaps(Axis),
    SplitByDensity,
}

/// Geometry and pixel distribution of a component's tight bounds
#[derive(Debug, Clone)]
pub struct ShapeMetrics {
    pub width: u32,
    pub height: u32,
    pub density: f64,
    /// Opaque pixels per row of the tight bounds
    pub row_counts: Vec<u32>,
    /// Opaque pixels per column of the tight bounds
    pub column_counts: Vec<u32>,
    /// Leftmost/rightmost opaque x per row (relative)
    row_extents: Vec<Option<(u32, u32)>>,
    /// Topmost/bottommost opaque y per column (relative)
    column_extents: Vec<Option<(u32, u32)>>,
}

impl ShapeMetrics {
    pub fn from_component(component: &Component) -> Self {
        let content = component.content;
        let (width, height) = (content.width, content.height);
        let mut row_counts = vec![0u32; height as usize];
        let mut column_counts = vec![0u32; width as usize];
        let mut row_extents: Vec<Option<(u32, u32)>> = vec![None; height as usize];
        let mut column_extents: Vec<Option<(u32, u32)>> = vec![None; width as usize];

        for &(x, y) in &component.pixels {
            let (rx, ry) = (x - content.x, y - content.y);
            row_counts[ry as usize] += 1;
            column_counts[rx as usize] += 1;
            extend(&mut row_extents[ry as usize], rx);
            extend(&mut column_extents[rx as usize], ry);
        }

        Self {
            width,
            height,
            density: component.density(),
            row_counts,
            column_counts,
            row_extents,
            column_extents,
        }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Axis along the longer side
    pub fn longer_axis(&self) -> Axis {
        if self.width >= self.height {
            Axis::Horizontal
        } else {
            Axis::Vertical
        }
    }

    /// Check if either wall rule matches
    pub fn is_wall(&self, tile: &TileSize) -> bool {
        is_vertical_wall(self, tile) || is_horizontal_wall(self, tile)
    }
}

fn extend(extent: &mut Option<(u32, u32)>, value: u32) {
    *extent = Some(match *extent {
        Some((lo, hi)) => (lo.min(value), hi.max(value)),
        None => (value, value),
    });
}

/// A named classification rule
#[derive(Clone, Copy)]
pub struct ShapeRule {
    pub name: &'static str,
    pub apply: fn(&ShapeMetrics, &TileSize) -> Option<SplitDecision>,
}

/// Rules in evaluation order
pub const RULES: &[ShapeRule] = &[
    ShapeRule {
        name: "floor_pattern",
        apply: floor_pattern,
    },
    ShapeRule {
        name: "vertical_wall",
        apply: vertical_wall,
    },
    ShapeRule {
        name: "horizontal_wall",
        apply: horizontal_wall,
    },
    ShapeRule {
        name: "periodic_gaps",
        apply: periodic_gaps,
    },
    ShapeRule {
        name: "sparse_large",
        apply: sparse_large,
    },
    ShapeRule {
        name: "oversized",
        apply: oversized,
    },
];

/// Classify a component against the base tile size
pub fn classify(component: &Component, tile: &TileSize) -> SplitDecision {
    classify_metrics(&ShapeMetrics::from_component(component), tile).1
}

/// Run the rule list, returning the matching rule's name and its decision
pub fn classify_metrics(metrics: &ShapeMetrics, tile: &TileSize) -> (&'static str, SplitDecision) {
    RULES
        .iter()
        .find_map(|rule| (rule.apply)(metrics, tile).map(|decision| (rule.name, decision)))
        .unwrap_or(("default", SplitDecision::Keep))
}

// ─── Rules ──────────────────────────────────────────────────────────────────

/// Wide shapes that read as a row of floor tiles
pub fn floor_pattern(m: &ShapeMetrics, tile: &TileSize) -> Option<SplitDecision> {
    let tw = tile.width as f64;
    let th = tile.height as f64;
    if m.width as f64 <= 1.3 * tw {
        return None;
    }
    let thin = m.height as f64 <= 0.6 * th;
    (thin || has_uniform_columns(m, tile) || has_diamond_profile(m))
        .then_some(SplitDecision::SplitGrid(Axis::Horizontal))
}

/// Tall shapes of consistent width stay whole
pub fn vertical_wall(m: &ShapeMetrics, tile: &TileSize) -> Option<SplitDecision> {
    is_vertical_wall(m, tile).then_some(SplitDecision::Keep)
}

/// Long shapes of consistent height stay whole
pub fn horizontal_wall(m: &ShapeMetrics, tile: &TileSize) -> Option<SplitDecision> {
    is_horizontal_wall(m, tile).then_some(SplitDecision::Keep)
}

/// Dense blocks joined by sparse bridges are cut at the bridges
pub fn periodic_gaps(m: &ShapeMetrics, tile: &TileSize) -> Option<SplitDecision> {
    if m.is_wall(tile) || m.density <= 0.0 {
        return None;
    }
    let axis = m.longer_axis();
    let (profile, step, cross) = match axis {
        Axis::Horizontal => (&m.column_counts, tile.width, m.height),
        Axis::Vertical => (&m.row_counts, tile.height, m.width),
    };
    if profile.len() as f64 <= 1.5 * step as f64 {
        return None;
    }

    let mut seen_dense = false;
    let mut gap_after_dense = false;
    for window in profile.chunks(step as usize) {
        let filled: u64 = window.iter().map(|&c| c as u64).sum();
        let density = filled as f64 / (window.len() as u64 * cross as u64) as f64;
        if density > 0.7 * m.density {
            if gap_after_dense {
                return Some(SplitDecision::SplitAtGaps(axis));
            }
            seen_dense = true;
        } else if density < 0.3 * m.density && seen_dense {
            gap_after_dense = true;
        }
    }
    None
}

/// Large, mostly empty boxes are clusters of small sprites
pub fn sparse_large(m: &ShapeMetrics, tile: &TileSize) -> Option<SplitDecision> {
    (m.density < 0.4 && m.area() > 2 * tile.area()).then_some(SplitDecision::SplitByDensity)
}

/// Anything much larger than a tile that is not solid gets cut into tiles
pub fn oversized(m: &ShapeMetrics, tile: &TileSize) -> Option<SplitDecision> {
    let too_big = m.width as f64 > 1.8 * tile.width as f64
        || m.height as f64 > 1.8 * tile.height as f64;
    (too_big && m.density < 0.8 && !m.is_wall(tile))
        .then(|| SplitDecision::SplitGrid(m.longer_axis()))
}

// ─── Shape predicates ───────────────────────────────────────────────────────

pub fn is_vertical_wall(m: &ShapeMetrics, tile: &TileSize) -> bool {
    let (w, h) = (m.width as f64, m.height as f64);
    let (consistent, populated) = band_consistency(&m.row_extents);
    let slab = h / w >= 1.5 && m.density >= 0.5 && consistent && populated >= WALL_MIN_POPULATED;
    let pillar =
        h > 1.5 * tile.height as f64 && w <= 1.2 * tile.width as f64 && m.density > 0.6;
    slab || pillar
}

pub fn is_horizontal_wall(m: &ShapeMetrics, tile: &TileSize) -> bool {
    let (w, h) = (m.width as f64, m.height as f64);
    let (consistent, populated) = band_consistency(&m.column_extents);
    w / h >= 2.0
        && m.density >= 0.6
        && h >= 0.7 * tile.height as f64
        && consistent
        && populated >= WALL_MIN_POPULATED
}

/// Tile-width columns all carry about the same pixel density
fn has_uniform_columns(m: &ShapeMetrics, tile: &TileSize) -> bool {
    let densities: Vec<f64> = m
        .column_counts
        .chunks(tile.width as usize)
        .map(|chunk| {
            let filled: u64 = chunk.iter().map(|&c| c as u64).sum();
            filled as f64 / (chunk.len() as u64 * m.height as u64) as f64
        })
        .collect();
    densities.len() >= 2
        && densities.iter().all(|&d| d > 0.0)
        && relative_std_dev(&densities) <= FLOOR_MAX_REL_STD_DEV
}

/// Rows in the middle third are denser than the outer fifths
fn has_diamond_profile(m: &ShapeMetrics) -> bool {
    let rows = m.row_counts.len();
    if rows < 5 {
        return false;
    }
    let fifth = (rows / 5).max(1);
    let mean = |slice: &[u32]| slice.iter().map(|&c| c as f64).sum::<f64>() / slice.len() as f64;
    let top = mean(&m.row_counts[..fifth]);
    let bottom = mean(&m.row_counts[rows - fifth..]);
    let middle = mean(&m.row_counts[rows / 3..(2 * rows).div_ceil(3)]);
    middle > 1.25 * top && middle > 1.25 * bottom
}

/// Split `extents` into bands and compare the span of each band.
///
/// Returns whether the populated spans are consistent and the fraction of
/// bands that contain any pixel.
fn band_consistency(extents: &[Option<(u32, u32)>]) -> (bool, f64) {
    let bands = WALL_SEGMENTS.min(extents.len());
    if bands == 0 {
        return (false, 0.0);
    }
    let mut spans = Vec::with_capacity(bands);
    for band in 0..bands {
        let start = band * extents.len() / bands;
        let end = (band + 1) * extents.len() / bands;
        let span = extents[start..end]
            .iter()
            .flatten()
            .fold(None, |acc: Option<(u32, u32)>, &(lo, hi)| {
                Some(match acc {
                    Some((a, b)) => (a.min(lo), b.max(hi)),
                    None => (lo, hi),
                })
            });
        if let Some((lo, hi)) = span {
            spans.push((hi - lo + 1) as f64);
        }
    }
    let populated = spans.len() as f64 / bands as f64;
    let consistent = !spans.is_empty() && relative_std_dev(&spans) <= WALL_MAX_REL_STD_DEV;
    (consistent, populated)
}

fn relative_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::INFINITY;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    if mean <= 0.0 {
        return f64::INFINITY;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt() / mean
}
