//! Fill colors: by file type, or through a shared churn/recency scale.

use indexmap::IndexMap;

use crate::model::Node;
use crate::options::ColorEncoding;
use crate::palette::{Color, ColorTable};

/// Extreme leaf metrics dropped from each end of the sorted list before taking the domain.
pub const FREQUENCY_TRIM: usize = 2;
pub const RECENCY_TRIM: usize = 8;

const FREQUENCY_RAMP: [Color; 5] = [
    Color::rgb(0xf4, 0xf4, 0xf4),
    Color::rgb(0xf3, 0xe3, 0xc6),
    Color::rgb(0xf5, 0xb9, 0x71),
    Color::rgb(0xf0, 0x8a, 0x4b),
    Color::rgb(0xd9, 0x46, 0x2b),
];

const RECENCY_RAMP: [Color; 5] = [
    Color::rgb(0xf4, 0xf4, 0xf4),
    Color::rgb(0xdd, 0xe8, 0xf3),
    Color::rgb(0xa9, 0xc8, 0xea),
    Color::rgb(0x5b, 0x94, 0xd6),
    Color::rgb(0x1f, 0x5f, 0xbf),
];

/// Piecewise-linear map from a metric domain onto five evenly spaced control colors.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    domain: Option<(f64, f64)>,
    ramp: [Color; 5],
}

impl ColorScale {
    /// Sorts `values`, trims `trim` from each end (when enough remain) and spans the rest.
    pub fn from_metrics(mut values: Vec<f64>, trim: usize, ramp: [Color; 5]) -> Self {
        values.retain(|v| v.is_finite());
        values.sort_by(f64::total_cmp);
        let kept = if values.len() > 2 * trim {
            &values[trim..values.len() - trim]
        } else {
            &values[..]
        };
        let domain = match (kept.first(), kept.last()) {
            (Some(&lo), Some(&hi)) => Some((lo, hi)),
            _ => None,
        };
        Self { domain, ramp }
    }

    pub fn for_encoding(root: &Node, encoding: ColorEncoding) -> Option<Self> {
        let (trim, ramp) = match encoding {
            ColorEncoding::Type => return None,
            ColorEncoding::NumberOfChanges => (FREQUENCY_TRIM, FREQUENCY_RAMP),
            ColorEncoding::LastChange => (RECENCY_TRIM, RECENCY_RAMP),
        };
        let mut values = Vec::new();
        root.visit(&mut |n| {
            if n.is_leaf() {
                if let Some(v) = metric(n, encoding) {
                    values.push(v);
                }
            }
        });
        Some(Self::from_metrics(values, trim, ramp))
    }

    pub fn domain(&self) -> Option<(f64, f64)> {
        self.domain
    }

    pub fn low(&self) -> Color {
        self.ramp[0]
    }

    pub fn high(&self) -> Color {
        self.ramp[self.ramp.len() - 1]
    }

    /// Values outside the domain clamp to the end colors; a missing value gets the low end.
    pub fn color_for(&self, value: Option<f64>) -> Color {
        let (Some(v), Some((lo, hi))) = (value, self.domain) else {
            return self.low();
        };
        let t = if hi > lo {
            ((v - lo) / (hi - lo)).clamp(0.0, 1.0)
        } else if v > lo {
            1.0
        } else {
            0.0
        };
        let segments = (self.ramp.len() - 1) as f64;
        let pos = t * segments;
        let idx = (pos.floor() as usize).min(self.ramp.len() - 2);
        self.ramp[idx].lerp(self.ramp[idx + 1], pos - idx as f64)
    }
}

/// The node's own metric under `encoding`. Directory metrics come aggregated from upstream.
pub fn metric(node: &Node, encoding: ColorEncoding) -> Option<f64> {
    match encoding {
        ColorEncoding::Type => None,
        ColorEncoding::NumberOfChanges => Some(node.commit_count as f64),
        ColorEncoding::LastChange => node.last_commit,
    }
}

/// Color of the most frequent known extension among direct children; ties go to the first seen.
fn dominant_child_color(node: &Node, table: &ColorTable) -> Color {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for child in &node.children {
        if let Some(ext) = child.extension.as_deref() {
            if table.contains(ext) {
                *counts.entry(ext).or_default() += 1;
            }
        }
    }
    let mut best: Option<(&str, usize)> = None;
    for (ext, count) in counts {
        if best.is_none_or(|(_, c)| count > c) {
            best = Some((ext, count));
        }
    }
    table.color_or_default(best.map(|(ext, _)| ext))
}

pub fn color_of(
    node: &Node,
    encoding: ColorEncoding,
    table: &ColorTable,
    scale: Option<&ColorScale>,
) -> Color {
    match (encoding, scale) {
        (ColorEncoding::Type, _) | (_, None) => {
            if node.is_leaf() {
                table.color_or_default(node.extension.as_deref())
            } else {
                dominant_child_color(node, table)
            }
        }
        (_, Some(scale)) => scale.color_for(metric(node, encoding)),
    }
}

/// Colors every node in place. The shared scale is finalized before the first node is colored.
pub fn assign_colors(
    root: &mut Node,
    encoding: ColorEncoding,
    table: &ColorTable,
) -> Option<ColorScale> {
    let scale = ColorScale::for_encoding(root, encoding);
    root.visit_mut(&mut |n| n.color = color_of(n, encoding, table, scale.as_ref()));
    scale
}
