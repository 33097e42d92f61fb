//! First-pass geometry: hierarchical circle packing over the ordered node tree.
//!
//! Two bottom-up passes, then one top-down pass. The first bottom-up pass packs siblings
//! without padding only to learn the root radius, which fixes the scale `k` between packer
//! units and canvas units. The second pass repacks with padding expressed in canvas units, and
//! the top-down pass turns parent-relative offsets into absolute canvas coordinates.

use coral::{Circle, Lcg, pack_siblings};

use crate::model::Node;
use crate::palette::Color;

/// Vertical headroom given to packing and reflow; the output is normalized back afterwards.
pub const HEIGHT_HEADROOM: f64 = 1.3;

pub const ROOT_PADDING: f64 = 0.0;
/// Between siblings of a group holding more than one file.
pub const FILE_CLUMP_PADDING: f64 = 5.0;
/// Between siblings of a group of directories.
pub const GROUP_PADDING: f64 = 13.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

impl Canvas {
    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackedNode {
    pub path: String,
    pub label: String,
    pub extension: Option<String>,
    pub size: f64,
    pub sort_order: f64,
    pub color: Color,
    pub synthetic: bool,
    pub depth: usize,
    pub x: f64,
    pub y: f64,
    pub r: f64,
    /// Raw packer output, before any reflow movement.
    pub original_x: f64,
    pub original_y: f64,
    pub children: Vec<PackedNode>,
}

impl PackedNode {
    fn from_node(node: Node, depth: usize) -> Self {
        let mut children = node
            .children
            .into_iter()
            .map(|c| PackedNode::from_node(c, depth + 1))
            .collect::<Vec<_>>();
        // Larger sort order first; stable so ties keep input order.
        children.sort_by(|a, b| b.sort_order.total_cmp(&a.sort_order));
        Self {
            path: node.path,
            label: node.label,
            extension: node.extension,
            size: node.size,
            sort_order: node.sort_order,
            color: node.color,
            synthetic: node.synthetic,
            depth,
            x: 0.0,
            y: 0.0,
            r: 0.0,
            original_x: 0.0,
            original_y: 0.0,
            children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn circle(&self) -> Circle {
        Circle::new(self.x, self.y, self.r)
    }

    /// How far reflow moved this node from where the packer put it.
    pub fn displacement(&self) -> f64 {
        (self.x - self.original_x).hypot(self.y - self.original_y)
    }

    /// Moves this node and its whole subtree.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        self.x += dx;
        self.y += dy;
        for child in &mut self.children {
            child.translate(dx, dy);
        }
    }

    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a PackedNode)) {
        f(self);
        for child in &self.children {
            child.visit(f);
        }
    }

    pub fn visit_mut(&mut self, f: &mut impl FnMut(&mut PackedNode)) {
        f(self);
        for child in &mut self.children {
            child.visit_mut(f);
        }
    }
}

/// Padding around the children of `node`, in canvas units.
pub fn sibling_padding(node: &PackedNode) -> f64 {
    if node.depth == 0 {
        return ROOT_PADDING;
    }
    let files = node.children.iter().filter(|c| c.is_leaf()).count();
    if files > 1 {
        FILE_CLUMP_PADDING
    } else {
        GROUP_PADDING
    }
}

fn set_leaf_radii(node: &mut PackedNode) {
    if node.is_leaf() {
        node.r = node.size.max(0.0).sqrt();
    }
    for child in &mut node.children {
        set_leaf_radii(child);
    }
}

fn pack_children(
    node: &mut PackedNode,
    padding: &impl Fn(&PackedNode) -> f64,
    k: f64,
    rng: &mut Lcg,
) {
    for child in &mut node.children {
        pack_children(child, padding, k, rng);
    }
    if node.children.is_empty() {
        return;
    }

    let pad = padding(node) * k;
    let mut circles = node
        .children
        .iter()
        .map(|c| Circle::new(c.x, c.y, c.r + pad))
        .collect::<Vec<_>>();
    let enclosing = pack_siblings(&mut circles, rng);
    for (child, c) in node.children.iter_mut().zip(&circles) {
        child.x = c.x;
        child.y = c.y;
    }
    node.r = enclosing + pad;
}

fn to_absolute(node: &mut PackedNode, k: f64) {
    for child in &mut node.children {
        child.r *= k;
        child.x = node.x + k * child.x;
        child.y = node.y + k * child.y;
        to_absolute(child, k);
    }
}

/// Packs the colored tree into `canvas`, root centered, children ordered by sort order.
pub fn pack(root: Node, canvas: Canvas) -> PackedNode {
    let mut root = PackedNode::from_node(root, 0);
    let mut rng = Lcg::default();
    let side = canvas.width.min(canvas.height);

    set_leaf_radii(&mut root);
    pack_children(&mut root, &|_| 0.0, 1.0, &mut rng);
    let k = if root.r > 0.0 { root.r / side } else { 1.0 };
    pack_children(&mut root, &sibling_padding, k, &mut rng);

    let (cx, cy) = canvas.center();
    root.x = cx;
    root.y = cy;
    let k = if root.r > 0.0 { side / (2.0 * root.r) } else { 1.0 };
    root.r *= k;
    to_absolute(&mut root, k);

    root.visit_mut(&mut |n| {
        n.original_x = n.x;
        n.original_y = n.y;
    });
    root
}

/// Shrinks or grows `node` to the smallest circle enclosing its children.
pub fn refit_to_children(node: &mut PackedNode) {
    let circles = node.children.iter().map(PackedNode::circle).collect::<Vec<_>>();
    if let Some(c) = coral::enclose(&circles, &mut Lcg::default()) {
        node.x = c.x;
        node.y = c.y;
        node.r = c.r;
    }
}
