//! Final coordinates and the flat node list handed to renderers.

use serde::{Deserialize, Serialize};

use crate::pack::PackedNode;
use crate::palette::Color;

/// One drawable circle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutNode {
    pub path: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    pub color: Color,
    pub x: f64,
    pub y: f64,
    pub r: f64,
    pub depth: usize,
    pub has_children: bool,
}

impl LayoutNode {
    fn from_packed(node: &PackedNode) -> Self {
        Self {
            path: node.path.clone(),
            label: node.label.clone(),
            extension: node.extension.clone(),
            color: node.color,
            x: node.x,
            y: node.y,
            r: node.r,
            depth: node.depth,
            has_children: !node.is_leaf(),
        }
    }
}

/// Scales (never up) and centers the tree so the depth-1 circles fit `width` x `height`.
pub fn normalize(root: &mut PackedNode, width: f64, height: f64) {
    let Some((min_x, min_y, max_x, max_y)) = bounds(&root.children) else {
        root.x = width / 2.0;
        root.y = height / 2.0;
        return;
    };
    let (bw, bh) = (max_x - min_x, max_y - min_y);
    let mut scale = 1.0_f64;
    if bw > 0.0 {
        scale = scale.min(width / bw);
    }
    if bh > 0.0 {
        scale = scale.min(height / bh);
    }
    let (cx, cy) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
    let (ox, oy) = (width / 2.0, height / 2.0);
    root.visit_mut(&mut |n| {
        n.x = ox + (n.x - cx) * scale;
        n.y = oy + (n.y - cy) * scale;
        n.r *= scale;
    });
}

fn bounds(nodes: &[PackedNode]) -> Option<(f64, f64, f64, f64)> {
    nodes.iter().fold(None, |acc, n| {
        let b = (n.x - n.r, n.y - n.r, n.x + n.r, n.y + n.r);
        Some(match acc {
            None => b,
            Some((a, c, d, e)) => (a.min(b.0), c.min(b.1), d.max(b.2), e.max(b.3)),
        })
    })
}

/// Depth-first list of everything worth drawing, parents before children.
///
/// The root, synthetic nodes (but not their children) and nodes deeper than `max_depth` are
/// left out. Returns the list truncated to `max_nodes` and the number of entries dropped.
pub fn flatten(root: &PackedNode, max_depth: usize, max_nodes: usize) -> (Vec<LayoutNode>, usize) {
    let mut nodes = Vec::new();
    for child in &root.children {
        push_node(child, max_depth, &mut nodes);
    }
    let dropped = nodes.len().saturating_sub(max_nodes);
    nodes.truncate(max_nodes);
    (nodes, dropped)
}

fn push_node(node: &PackedNode, max_depth: usize, out: &mut Vec<LayoutNode>) {
    if node.depth > max_depth {
        return;
    }
    if !node.synthetic {
        out.push(LayoutNode::from_packed(node));
    }
    for child in &node.children {
        push_node(child, max_depth, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(
        path: &str,
        depth: usize,
        x: f64,
        y: f64,
        r: f64,
        children: Vec<PackedNode>,
    ) -> PackedNode {
        PackedNode {
            path: path.to_string(),
            label: path.to_string(),
            extension: None,
            size: 1.0,
            sort_order: 0.0,
            color: Color::DEFAULT_GRAY,
            synthetic: false,
            depth,
            x,
            y,
            r,
            original_x: x,
            original_y: y,
            children,
        }
    }

    #[test]
    fn normalize_shrinks_and_centers_depth_one() {
        let mut root = node(
            "",
            0,
            0.0,
            0.0,
            0.0,
            vec![
                node("a", 1, 0.0, 0.0, 100.0, Vec::new()),
                node("b", 1, 1800.0, 0.0, 100.0, Vec::new()),
            ],
        );
        normalize(&mut root, 1000.0, 1000.0);

        let (a, b) = (&root.children[0], &root.children[1]);
        assert!((a.x - a.r - 0.0).abs() < 1e-9);
        assert!((b.x + b.r - 1000.0).abs() < 1e-9);
        assert!((a.y - 500.0).abs() < 1e-9);
        assert!((a.r - 50.0).abs() < 1e-9);
    }

    #[test]
    fn normalize_never_scales_up() {
        let mut root = node("", 0, 0.0, 0.0, 0.0, vec![node("a", 1, 10.0, 10.0, 5.0, Vec::new())]);
        normalize(&mut root, 1000.0, 1000.0);
        assert_eq!(root.children[0].r, 5.0);
        assert_eq!((root.children[0].x, root.children[0].y), (500.0, 500.0));
    }

    #[test]
    fn flatten_skips_synthetic_and_deep_nodes() {
        let deep = node("d/e/f", 3, 0.0, 0.0, 1.0, Vec::new());
        let dir = node("d/e", 2, 0.0, 0.0, 2.0, vec![deep]);
        let top = node("d", 1, 0.0, 0.0, 3.0, vec![dir]);
        let loose = node("x.rs", 2, 0.0, 0.0, 1.0, Vec::new());
        let mut bucket = node("<loose>", 1, 0.0, 0.0, 3.0, vec![loose]);
        bucket.synthetic = true;
        let root = node("", 0, 0.0, 0.0, 10.0, vec![top, bucket]);

        let (nodes, dropped) = flatten(&root, 2, 10);
        let paths = nodes.iter().map(|n| n.path.as_str()).collect::<Vec<_>>();
        assert_eq!(paths, ["d", "d/e", "x.rs"]);
        assert_eq!(dropped, 0);
        assert!(nodes[0].has_children);

        let (nodes, dropped) = flatten(&root, 2, 2);
        assert_eq!(nodes.len(), 2);
        assert_eq!(dropped, 1);
    }
}
