#![forbid(unsafe_code)]

//! Cache-stable circle-packing layout for file trees.
//!
//! `canopy` turns a file tree annotated with sizes and commit history into nested circles: it
//! builds a weighted, ordered node tree, colors it, packs it, then relaxes each sibling group
//! toward the positions remembered from the previous run so the picture stays recognizable as
//! the repository changes. Rendering is left to the caller.

pub mod cache;
pub mod color;
pub mod error;
pub mod model;
pub mod options;
pub mod output;
pub mod pack;
pub mod palette;
pub mod reflow;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use cache::{CachedPosition, LayoutCache};
pub use color::{ColorScale, assign_colors, color_of};
pub use error::{Error, Result};
pub use model::{Commit, Node, RawEntry, build_tree};
pub use options::{ColorEncoding, LayoutOptions};
pub use output::LayoutNode;
pub use pack::{Canvas, PackedNode, pack};
pub use palette::{Color, ColorTable};

/// Result of one full layout pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub width: f64,
    pub height: f64,
    pub nodes: Vec<LayoutNode>,
    /// Feed this into the next pass to keep positions stable.
    pub cache: LayoutCache,
    pub highlighted_paths: Vec<String>,
    /// Nodes dropped by the `max_nodes` cap.
    pub truncated: usize,
}

/// Headless layout entry point.
pub fn layout(raw: &RawEntry, cache: &LayoutCache, options: &LayoutOptions) -> Result<Layout> {
    options.validate()?;
    let table = ColorTable::with_overrides(&options.color_overrides);

    let mut tree = build_tree(raw, &cache.sort_orders, &table);
    debug!(nodes = tree.node_count(), "built node tree");

    let scale = assign_colors(&mut tree, options.color_encoding, &table);
    if let Some((lo, hi)) = scale.as_ref().and_then(ColorScale::domain) {
        debug!(encoding = %options.color_encoding, lo, hi, "color scale domain");
    }

    let canvas = Canvas {
        width: options.width,
        height: options.height * pack::HEIGHT_HEADROOM,
    };
    let mut root = pack(tree, canvas);
    debug!(radius = root.r, "packed");

    reflow::reflow(&mut root, cache, canvas, options.max_depth);
    let mut max_shift = 0.0_f64;
    root.visit(&mut |n| max_shift = max_shift.max(n.displacement()));
    pack::refit_to_children(&mut root);
    let next_cache = LayoutCache::from_tree(&root);
    debug!(
        entries = next_cache.positions.len(),
        max_shift, "reflowed"
    );

    output::normalize(&mut root, options.width, options.height);
    let (nodes, truncated) = output::flatten(&root, options.max_depth, options.max_nodes);
    if truncated > 0 {
        debug!(
            kept = nodes.len(),
            truncated,
            "node cap reached, dropping the depth-first tail"
        );
    }

    Ok(Layout {
        width: options.width,
        height: options.height,
        nodes,
        cache: next_cache,
        highlighted_paths: options.highlighted_paths.clone(),
        truncated,
    })
}
