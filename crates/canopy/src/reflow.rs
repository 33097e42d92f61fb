//! Second-pass geometry: per sibling group relaxation toward remembered positions.
//!
//! Each sibling group is simulated as a small particle system. Bodies are seeded from the cache,
//! pulled toward their cached axes and the group's anchor, and kept apart by position-based
//! collision. Every collision pass is followed by clamping to the canvas and projecting back
//! inside the parent circle. The loop always runs [`TICKS`] ticks, then collision-only repair
//! passes run until no sibling overlaps remain or [`REPAIR_PASSES`] is spent.
//!
//! Groups are processed top-down: the root's children first, then (recursively) the children of
//! any sibling large enough to be worth relaxing. Everything below a relaxed sibling moves rigidly
//! with it.

use coral::{Circle, Lcg, SpatialGrid};
use indexmap::IndexMap;

use crate::cache::{CachedPosition, LayoutCache};
use crate::pack::{Canvas, PackedNode};

pub const TICKS: usize = 300;
pub const ALPHA_MIN: f64 = 0.001;
pub const VELOCITY_DECAY: f64 = 0.4;

/// Centroid pull toward the canvas center, scaled by alpha.
pub const CANVAS_PULL: f64 = 0.05;
/// Deepest group still pulled toward the canvas center.
pub const CANVAS_PULL_MAX_DEPTH: usize = 2;
/// Centroid pull toward the parent circle's center, scaled by alpha.
pub const PARENT_PULL: f64 = 0.3;
/// Axis pull when the other axis is cached too.
pub const ANCHORED_AXIS_PULL: f64 = 0.5;
pub const FREE_AXIS_PULL: f64 = 0.1;

pub const COLLIDE_PASSES: usize = 2;
/// Upper bound on force-free collision passes after the last tick.
pub const REPAIR_PASSES: usize = 200;
/// Sibling spacing for depth-1 groups, falling linearly to [`DEEPEST_GROUP_PADDING`].
pub const SHALLOWEST_GROUP_PADDING: f64 = 8.0;
pub const DEEPEST_GROUP_PADDING: f64 = 3.0;
/// Extra room kept around nodes that have children.
pub const DESCENDANT_CLEARANCE: f64 = 2.0;
/// Containment margin skew between the upper and lower half of the parent circle.
pub const CONTAINMENT_SKEW: f64 = 0.25;

/// Groups with more children than this are relaxed on their own.
pub const RECURSE_ABOVE: usize = 4;

const EPSILON: f64 = 1e-6;
const JIGGLE: f64 = 1e-3;

/// Sibling spacing for a group whose members sit at `depth`.
pub fn group_padding(depth: usize, max_depth: usize) -> f64 {
    if max_depth <= 1 {
        return SHALLOWEST_GROUP_PADDING;
    }
    let t = (depth.saturating_sub(1) as f64 / (max_depth - 1) as f64).clamp(0.0, 1.0);
    SHALLOWEST_GROUP_PADDING + (DEEPEST_GROUP_PADDING - SHALLOWEST_GROUP_PADDING) * t
}

#[derive(Debug, Clone, Copy)]
struct Body {
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
    r: f64,
    clearance: f64,
    target: Option<CachedPosition>,
}

impl Body {
    fn seed(node: &PackedNode, cached: Option<CachedPosition>) -> Self {
        let (x, y) = match cached {
            Some(c) => (c.x.unwrap_or(node.x), c.y.unwrap_or(node.y)),
            None => (node.x, node.y),
        };
        Self {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            r: node.r,
            clearance: if node.is_leaf() { 0.0 } else { DESCENDANT_CLEARANCE },
            target: cached,
        }
    }

    fn reach(&self) -> f64 {
        self.r + self.clearance
    }

    fn circle(&self) -> Circle {
        Circle::new(self.x, self.y, self.r)
    }

    fn attract(&mut self, mid: (f64, f64), alpha: f64) {
        let cached = self.target.unwrap_or_default();
        let (tx, sx) = match cached.x {
            Some(x) if cached.y.is_some() => (x, ANCHORED_AXIS_PULL),
            Some(x) => (x, FREE_AXIS_PULL),
            None => (mid.0, FREE_AXIS_PULL),
        };
        let (ty, sy) = match cached.y {
            Some(y) if cached.x.is_some() => (y, ANCHORED_AXIS_PULL),
            Some(y) => (y, FREE_AXIS_PULL),
            None => (mid.1, FREE_AXIS_PULL),
        };
        self.vx += (tx - self.x) * sx * alpha;
        self.vy += (ty - self.y) * sy * alpha;
    }
}

/// Spacing rules for one group, tightened so the incoming arrangement always satisfies them.
#[derive(Debug, Clone, Copy)]
struct Spacing {
    padding: f64,
    clearance_scale: f64,
    margin_cap: f64,
}

impl Spacing {
    fn separation(&self, a: &Body, b: &Body) -> f64 {
        a.r + b.r + self.padding + (a.clearance + b.clearance) * self.clearance_scale
    }

    fn margin(&self, body: &Body, theta: f64) -> f64 {
        let base = self.padding / 2.0;
        let margin = if body.clearance > 0.0 {
            base * (1.0 + CONTAINMENT_SKEW * theta.sin())
        } else {
            base
        };
        margin.min(self.margin_cap).max(0.0)
    }
}

/// Relaxes the whole tree below `root`, reading (never writing) `cache`.
pub fn reflow(root: &mut PackedNode, cache: &LayoutCache, canvas: Canvas, max_depth: usize) {
    let view = root
        .children
        .iter()
        .filter_map(|c| cache.position(&c.path).map(|p| (c.path.clone(), p)))
        .collect::<IndexMap<_, _>>();
    reflow_level(&mut root.children, &view, cache, canvas, max_depth, None);
}

fn reflow_level(
    siblings: &mut [PackedNode],
    view: &IndexMap<String, CachedPosition>,
    cache: &LayoutCache,
    canvas: Canvas,
    max_depth: usize,
    parent: Option<Circle>,
) {
    let before = siblings.iter().map(|s| (s.x, s.y)).collect::<Vec<_>>();
    relax_group(siblings, view, canvas, max_depth, parent);

    for (sibling, (bx, by)) in siblings.iter_mut().zip(before) {
        let (dx, dy) = (sibling.x - bx, sibling.y - by);
        for child in &mut sibling.children {
            child.translate(dx, dy);
        }
        if sibling.children.len() > RECURSE_ABOVE && sibling.depth <= max_depth {
            let child_view = nested_view(sibling, cache);
            let circle = sibling.circle();
            reflow_level(
                &mut sibling.children,
                &child_view,
                cache,
                canvas,
                max_depth,
                Some(circle),
            );
        }
    }
}

/// Cache view for the children of `node`, shifted by how far `node` moved since it was cached.
fn nested_view(node: &PackedNode, cache: &LayoutCache) -> IndexMap<String, CachedPosition> {
    let shift = cache.position(&node.path).and_then(|c| match (c.x, c.y) {
        (Some(x), Some(y)) => Some((node.x - x, node.y - y)),
        _ => None,
    });
    node.children
        .iter()
        .map(|child| {
            let seeded = match (shift, cache.position(&child.path)) {
                (Some((dx, dy)), Some(cached)) => cached.shifted(dx, dy),
                _ => CachedPosition::new(child.x, child.y),
            };
            (child.path.clone(), seeded)
        })
        .collect()
}

/// Moves the nodes of one sibling group (not their descendants) to relaxed positions.
pub fn relax_group(
    nodes: &mut [PackedNode],
    view: &IndexMap<String, CachedPosition>,
    canvas: Canvas,
    max_depth: usize,
    parent: Option<Circle>,
) {
    let Some(first) = nodes.first() else {
        return;
    };
    let depth = first.depth;
    let mut bodies = nodes
        .iter()
        .map(|n| Body::seed(n, view.get(&n.path).copied()))
        .collect::<Vec<_>>();
    let seeds = bodies.iter().map(|b| (b.x, b.y)).collect::<Vec<_>>();
    let spacing = spacing_for(nodes, depth, max_depth, parent);
    tracing::trace!(
        depth,
        bodies = bodies.len(),
        padding = spacing.padding,
        contained = parent.is_some(),
        "reflow group"
    );

    let mid = canvas.center();
    let cell = 2.0
        * bodies
            .iter()
            .map(Body::reach)
            .fold(0.0_f64, f64::max)
        + spacing.padding;
    let mut grid = SpatialGrid::new(cell);
    let mut scratch = Vec::new();
    let mut rng = Lcg::default();

    let alpha_decay = 1.0 - ALPHA_MIN.powf(1.0 / TICKS as f64);
    let mut alpha = 1.0;
    for _ in 0..TICKS {
        alpha -= alpha * alpha_decay;

        for body in &mut bodies {
            body.attract(mid, alpha);
            body.vx *= 1.0 - VELOCITY_DECAY;
            body.vy *= 1.0 - VELOCITY_DECAY;
            body.x += body.vx;
            body.y += body.vy;
        }
        if depth <= CANVAS_PULL_MAX_DEPTH {
            pull_centroid(&mut bodies, mid, CANVAS_PULL * alpha);
        }
        if let Some(p) = parent {
            pull_centroid(&mut bodies, (p.x, p.y), PARENT_PULL * alpha);
        }
        for _ in 0..COLLIDE_PASSES {
            collide(&mut bodies, &spacing, &mut grid, &mut scratch, &mut rng);
            confine(&mut bodies, canvas, parent, &spacing);
        }
    }

    let mut repairs = 0;
    while repairs < REPAIR_PASSES && !conflicts(&circles_of(&bodies), parent.as_ref()).is_empty()
    {
        collide(&mut bodies, &spacing, &mut grid, &mut scratch, &mut rng);
        confine(&mut bodies, canvas, parent, &spacing);
        repairs += 1;
    }
    if repairs > 0 {
        tracing::trace!(depth, repairs, "reflow repair passes");
    }

    settle(nodes, &seeds, &bodies, parent);
}

fn circles_of(bodies: &[Body]) -> Vec<Circle> {
    bodies.iter().map(Body::circle).collect()
}

fn spacing_for(
    nodes: &[PackedNode],
    depth: usize,
    max_depth: usize,
    parent: Option<Circle>,
) -> Spacing {
    let padding = group_padding(depth, max_depth);
    let mut spacing = Spacing {
        padding,
        clearance_scale: 1.0,
        margin_cap: f64::INFINITY,
    };
    let Some(p) = parent else {
        return spacing;
    };

    // Inside a parent there is no room to grow, so never ask for more than the packer left.
    let clearance = |n: &PackedNode| if n.is_leaf() { 0.0 } else { DESCENDANT_CLEARANCE };
    let reach = nodes.iter().map(|n| n.r + clearance(n)).fold(0.0_f64, f64::max);
    let mut grid = SpatialGrid::new(2.0 * reach + padding);
    let circles = nodes.iter().map(PackedNode::circle).collect::<Vec<_>>();
    grid.rebuild(circles.iter());
    let mut scratch = Vec::new();
    let mut scale = 1.0_f64;
    for (i, c) in circles.iter().enumerate() {
        spacing.margin_cap = spacing.margin_cap.min(p.r - c.distance_to(&p) - c.r);
        grid.neighbours(c, &mut scratch);
        for &j in scratch.iter().filter(|&&j| j > i) {
            let other = &circles[j];
            let gap = c.distance_to(other) - c.r - other.r;
            let wanted = padding + clearance(&nodes[i]) + clearance(&nodes[j]);
            if wanted > 0.0 && gap < wanted {
                scale = scale.min(gap.max(0.0) / wanted);
            }
        }
    }
    spacing.margin_cap = spacing.margin_cap.max(0.0);
    spacing.padding *= scale;
    spacing.clearance_scale = scale;
    spacing
}

fn pull_centroid(bodies: &mut [Body], target: (f64, f64), strength: f64) {
    if bodies.is_empty() || strength == 0.0 {
        return;
    }
    let n = bodies.len() as f64;
    let (sx, sy) = bodies
        .iter()
        .fold((0.0, 0.0), |(sx, sy), b| (sx + b.x, sy + b.y));
    let dx = (target.0 - sx / n) * strength;
    let dy = (target.1 - sy / n) * strength;
    for body in bodies {
        body.x += dx;
        body.y += dy;
    }
}

fn collide(
    bodies: &mut [Body],
    spacing: &Spacing,
    grid: &mut SpatialGrid,
    scratch: &mut Vec<usize>,
    rng: &mut Lcg,
) {
    let circles = circles_of(bodies);
    grid.rebuild(circles.iter());

    for i in 0..bodies.len() {
        grid.neighbours(&circles[i], scratch);
        for &j in scratch.iter() {
            if j <= i {
                continue;
            }
            let (a, b) = (bodies[i], bodies[j]);
            let min = spacing.separation(&a, &b);
            let (mut dx, mut dy) = (b.x - a.x, b.y - a.y);
            let mut dist = dx.hypot(dy);
            if dist >= min {
                continue;
            }
            if dist < EPSILON {
                let angle = rng.next_f64() * std::f64::consts::TAU;
                dx = angle.cos() * JIGGLE;
                dy = angle.sin() * JIGGLE;
                dist = JIGGLE;
            }

            let (wa, wb) = (a.r * a.r, b.r * b.r);
            let share_a = if wa + wb > 0.0 { wb / (wa + wb) } else { 0.5 };
            let push = (min - dist) / dist;
            bodies[i].x -= dx * push * share_a;
            bodies[i].y -= dy * push * share_a;
            bodies[j].x += dx * push * (1.0 - share_a);
            bodies[j].y += dy * push * (1.0 - share_a);
        }
    }
}

fn confine(bodies: &mut [Body], canvas: Canvas, parent: Option<Circle>, spacing: &Spacing) {
    for body in bodies {
        clamp_to_canvas(body, canvas);
        if let Some(p) = &parent {
            contain(body, p, spacing);
        }
    }
}

fn clamp_to_canvas(body: &mut Body, canvas: Canvas) {
    let fit = |v: f64, r: f64, extent: f64| {
        if 2.0 * r >= extent {
            extent / 2.0
        } else {
            v.clamp(r, extent - r)
        }
    };
    body.x = fit(body.x, body.r, canvas.width);
    body.y = fit(body.y, body.r, canvas.height);
}

fn contain(body: &mut Body, parent: &Circle, spacing: &Spacing) {
    if body.r >= parent.r {
        body.x = parent.x;
        body.y = parent.y;
        return;
    }
    let (dx, dy) = (body.x - parent.x, body.y - parent.y);
    let dist = dx.hypot(dy);
    let limit = (parent.r - body.r - spacing.margin(body, dy.atan2(dx))).max(0.0);
    if dist > limit {
        let scale = limit / dist;
        body.x = parent.x + dx * scale;
        body.y = parent.y + dy * scale;
    }
}

/// Writes relaxed positions back.
///
/// A body that still overlaps a sibling or escapes the parent falls back to its seed (the cached
/// position when there is one), and from there to its incoming position. Only bodies involved in
/// a conflict fall back, so the rest of the group keeps its relaxed arrangement. Incoming
/// positions never conflict with each other, which bounds the loop.
fn settle(
    nodes: &mut [PackedNode],
    seeds: &[(f64, f64)],
    bodies: &[Body],
    parent: Option<Circle>,
) {
    let candidate = |i: usize, level: u8| -> Circle {
        let (x, y) = match level {
            0 => (bodies[i].x, bodies[i].y),
            1 => seeds[i],
            _ => (nodes[i].x, nodes[i].y),
        };
        Circle::new(x, y, nodes[i].r)
    };
    let mut levels = vec![0_u8; nodes.len()];
    let mut circles = circles_of(bodies);
    loop {
        let stepped = conflicts(&circles, parent.as_ref())
            .into_iter()
            .filter(|&i| levels[i] < 2)
            .collect::<Vec<_>>();
        if stepped.is_empty() {
            break;
        }
        for i in stepped {
            levels[i] += 1;
            circles[i] = candidate(i, levels[i]);
        }
    }

    let fell_back = levels.iter().filter(|&&l| l > 0).count();
    if fell_back > 0 {
        tracing::trace!(fell_back, bodies = nodes.len(), "reflow fell back");
    }
    for (node, c) in nodes.iter_mut().zip(circles) {
        node.x = c.x;
        node.y = c.y;
    }
}

/// Indices of circles that overlap a sibling or poke out of `parent`.
fn conflicts(circles: &[Circle], parent: Option<&Circle>) -> Vec<usize> {
    let mut hit = vec![false; circles.len()];
    if let Some(p) = parent {
        for (i, c) in circles.iter().enumerate() {
            if c.distance_to(p) + c.r > p.r + EPSILON {
                hit[i] = true;
            }
        }
    }
    let max_r = circles.iter().map(|c| c.r).fold(0.0_f64, f64::max);
    let mut grid = SpatialGrid::new(2.0 * max_r + EPSILON);
    grid.rebuild(circles.iter());
    let mut scratch = Vec::new();
    for (i, c) in circles.iter().enumerate() {
        grid.neighbours(c, &mut scratch);
        for &j in scratch.iter().filter(|&&j| j > i) {
            if c.distance_to(&circles[j]) < c.r + circles[j].r - EPSILON {
                hit[i] = true;
                hit[j] = true;
            }
        }
    }
    hit.iter()
        .enumerate()
        .filter_map(|(i, &h)| h.then_some(i))
        .collect()
}
