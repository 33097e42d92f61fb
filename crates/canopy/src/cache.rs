//! Positions and sort orders remembered between layout passes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::pack::PackedNode;

/// A remembered center. Either axis may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[Option<f64>; 2]", into = "[Option<f64>; 2]")]
pub struct CachedPosition {
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl CachedPosition {
    pub fn new(x: f64, y: f64) -> Self {
        let finite = |v: f64| v.is_finite().then_some(v);
        Self {
            x: finite(x),
            y: finite(y),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.x.is_some() && self.y.is_some()
    }

    /// Shifts whichever axes are present.
    pub fn shifted(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x.map(|x| x + dx),
            y: self.y.map(|y| y + dy),
        }
    }
}

impl From<[Option<f64>; 2]> for CachedPosition {
    fn from([x, y]: [Option<f64>; 2]) -> Self {
        Self { x, y }
    }
}

impl From<CachedPosition> for [Option<f64>; 2] {
    fn from(value: CachedPosition) -> Self {
        [value.x, value.y]
    }
}

/// Path-keyed memory of the previous pass.
///
/// Only the top-level driver writes it: it is rebuilt from scratch out of the final tree at the
/// end of every pass and read at the start of the next.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutCache {
    pub positions: IndexMap<String, CachedPosition>,
    pub sort_orders: IndexMap<String, f64>,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() && self.sort_orders.is_empty()
    }

    pub fn position(&self, path: &str) -> Option<CachedPosition> {
        self.positions.get(path).copied()
    }

    /// Snapshot of every non-root node in `root`, in pre-order.
    pub fn from_tree(root: &PackedNode) -> Self {
        let mut cache = Self::default();
        for child in &root.children {
            child.visit(&mut |n| {
                cache
                    .positions
                    .insert(n.path.clone(), CachedPosition::new(n.x, n.y));
                cache.sort_orders.insert(n.path.clone(), n.sort_order);
            });
        }
        cache
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
