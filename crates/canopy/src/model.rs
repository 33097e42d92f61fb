//! Input tree and the augmented node tree built from it.

use chrono::{DateTime, NaiveDate};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::palette::{Color, ColorTable};

/// Path of the synthetic node grouping the root's loose files.
pub const LOOSE_FILES_PATH: &str = "<loose-files>";
pub const LOOSE_FILES_LABEL: &str = "loose files";

/// Image/font-like files carry no meaningful weight; they all get [`ASSET_WEIGHT`].
const ASSET_EXTENSIONS: &[&str] = &["woff", "woff2", "ttf", "otf", "png", "jpg", "svg"];
const ASSET_WEIGHT: f64 = 100.0;
const KNOWN_EXTENSION_CAP: f64 = 15000.0;
const UNKNOWN_EXTENSION_CAP: f64 = 9000.0;
const MIN_WEIGHT: f64 = 1.0;

/// New entries in a sibling set that was seen before sort after everything cached.
pub const NEW_NODE_ORDER: f64 = -10_000_000.0;
/// `public/` directories are mostly static assets; push them to the end.
pub const PUBLIC_DIR_ORDER: f64 = -1_000_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// RFC 3339 timestamp, or a bare `YYYY-MM-DD` date.
    pub date: String,
}

impl Commit {
    /// Milliseconds since the epoch, or `None` when the date does not parse.
    pub fn timestamp_millis(&self) -> Option<f64> {
        let date = self.date.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
            return Some(dt.timestamp_millis() as f64);
        }
        let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
        Some(day.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis() as f64)
    }
}

/// One entry of the walked file tree, as produced upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEntry {
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub children: Vec<RawEntry>,
    /// Newest first.
    #[serde(default)]
    pub commits: Vec<Commit>,
}

impl RawEntry {
    /// Follows single-child chains down to the entry that survives collapsing.
    fn collapsed(&self) -> &RawEntry {
        let mut entry = self;
        while let [only] = entry.children.as_slice() {
            entry = only;
        }
        entry
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub path: String,
    pub label: String,
    pub extension: Option<String>,
    /// Packer weight.
    pub size: f64,
    pub sort_order: f64,
    pub color: Color,
    pub commit_count: usize,
    /// Newest commit, in epoch milliseconds.
    pub last_commit: Option<f64>,
    /// Set only on the synthetic loose-files bucket.
    pub synthetic: bool,
    pub children: Vec<Node>,
}

impl Node {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Pre-order visit of this node and all descendants.
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a Node)) {
        f(self);
        for child in &self.children {
            child.visit(f);
        }
    }

    pub fn visit_mut(&mut self, f: &mut impl FnMut(&mut Node)) {
        f(self);
        for child in &mut self.children {
            child.visit_mut(f);
        }
    }

    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Node::node_count).sum::<usize>()
    }
}

/// Lowercased suffix after the last dot; dotfiles and dotless names have none.
pub fn extension_of(name: &str) -> Option<String> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn leaf_weight(bytes: u64, extension: Option<&str>, palette: &ColorTable) -> f64 {
    let weight = match extension {
        Some(ext) if ASSET_EXTENSIONS.contains(&ext) => return ASSET_WEIGHT,
        Some(ext) if palette.contains(ext) => (bytes as f64).min(KNOWN_EXTENSION_CAP),
        _ => (bytes as f64).min(UNKNOWN_EXTENSION_CAP),
    };
    weight.max(MIN_WEIGHT)
}

struct Builder<'a> {
    cached_sort_orders: &'a IndexMap<String, f64>,
    palette: &'a ColorTable,
}

impl Builder<'_> {
    fn siblings_seen(&self, siblings: &[RawEntry]) -> bool {
        siblings
            .iter()
            .any(|s| self.cached_sort_orders.contains_key(&s.collapsed().path))
    }

    fn build(&self, raw: &RawEntry, sibling_index: usize, siblings_seen: bool) -> Node {
        let mut entry = raw;
        let mut label = raw.name.clone();
        while let [only] = entry.children.as_slice() {
            label = format!("{label}/{}", only.name);
            entry = only;
        }

        let children_seen = self.siblings_seen(&entry.children);
        let children = entry
            .children
            .iter()
            .enumerate()
            .map(|(i, child)| self.build(child, i, children_seen))
            .collect::<Vec<_>>();

        let extension = if children.is_empty() {
            extension_of(&entry.name)
        } else {
            None
        };
        let size = if children.is_empty() {
            leaf_weight(entry.size, extension.as_deref(), self.palette) + sibling_index as f64
        } else {
            children.iter().map(|c| c.size).sum()
        };

        let sort_order = if let Some(&cached) = self.cached_sort_orders.get(&entry.path) {
            cached
        } else if siblings_seen {
            NEW_NODE_ORDER
        } else if !children.is_empty() && raw.name == "public" {
            PUBLIC_DIR_ORDER
        } else {
            size - sibling_index as f64
        };

        Node {
            path: entry.path.clone(),
            label,
            extension,
            size,
            sort_order,
            color: self.palette.default_color(),
            commit_count: entry.commits.len(),
            last_commit: entry.commits.first().and_then(Commit::timestamp_millis),
            synthetic: false,
            children,
        }
    }

    fn loose_files_bucket(&self, files: Vec<Node>, sibling_index: usize) -> Node {
        let size = files.iter().map(|f| f.size).sum();
        let sort_order = self
            .cached_sort_orders
            .get(LOOSE_FILES_PATH)
            .copied()
            .unwrap_or(size - sibling_index as f64);
        Node {
            path: LOOSE_FILES_PATH.to_string(),
            label: LOOSE_FILES_LABEL.to_string(),
            extension: None,
            size,
            sort_order,
            color: self.palette.default_color(),
            commit_count: 0,
            last_commit: None,
            synthetic: true,
            children: files,
        }
    }
}

/// Builds the augmented tree.
///
/// The root is never collapsed. Its leaf children move into one synthetic bucket appended after
/// the directories.
pub fn build_tree(
    raw: &RawEntry,
    cached_sort_orders: &IndexMap<String, f64>,
    palette: &ColorTable,
) -> Node {
    let builder = Builder {
        cached_sort_orders,
        palette,
    };

    let seen = builder.siblings_seen(&raw.children);
    let (mut dirs, files): (Vec<Node>, Vec<Node>) = raw
        .children
        .iter()
        .enumerate()
        .map(|(i, child)| builder.build(child, i, seen))
        .partition(|n| !n.is_leaf());

    if !files.is_empty() {
        let index = dirs.len();
        dirs.push(builder.loose_files_bucket(files, index));
    }

    Node {
        path: raw.path.clone(),
        label: raw.name.clone(),
        extension: None,
        size: dirs.iter().map(|c| c.size).sum(),
        sort_order: 0.0,
        color: palette.default_color(),
        commit_count: raw.commits.len(),
        last_commit: raw.commits.first().and_then(Commit::timestamp_millis),
        synthetic: false,
        children: dirs,
    }
}
