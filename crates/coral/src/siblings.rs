//! Front-chain sibling packing.
//!
//! Circles are placed one at a time tangent to a pair of circles on the "front chain" (the
//! outer boundary of what has been placed so far). The pair is the one whose weighted midpoint
//! is closest to the origin, which keeps the cluster round. Input order matters: callers sort
//! siblings before packing.

use crate::circle::Circle;
use crate::enclose::enclose;
use crate::lcg::Lcg;

/// Packs `circles` in place around the origin and returns the radius of the enclosing circle.
///
/// On return the enclosing circle is centered at the origin. Radii are never modified.
pub fn pack_siblings(circles: &mut [Circle], rng: &mut Lcg) -> f64 {
    let n = circles.len();
    if n == 0 {
        return 0.0;
    }

    circles[0].x = 0.0;
    circles[0].y = 0.0;
    if n == 1 {
        return circles[0].r;
    }

    circles[0].x = -circles[1].r;
    circles[1].x = circles[0].r;
    circles[1].y = 0.0;
    if n == 2 {
        return circles[0].r + circles[1].r;
    }

    place(circles, 1, 0, 2);

    // Doubly linked front chain over circle indices.
    let mut next = vec![usize::MAX; n];
    let mut prev = vec![usize::MAX; n];
    let (mut a, mut b) = (0usize, 1usize);
    let c0 = 2usize;
    next[a] = b;
    prev[c0] = b;
    next[b] = c0;
    prev[a] = c0;
    next[c0] = a;
    prev[b] = a;

    let mut i = 3;
    'pack: while i < n {
        place(circles, a, b, i);
        let c = i;

        // Find the closest intersecting circle on the front chain, measuring closeness by
        // accumulated radius along the chain in both directions.
        let mut j = next[b];
        let mut k = prev[a];
        let mut sj = circles[b].r;
        let mut sk = circles[a].r;
        loop {
            if sj <= sk {
                if circles[j].intersects(&circles[c]) {
                    b = j;
                    next[a] = b;
                    prev[b] = a;
                    continue 'pack;
                }
                sj += circles[j].r;
                j = next[j];
            } else {
                if circles[k].intersects(&circles[c]) {
                    a = k;
                    next[a] = b;
                    prev[b] = a;
                    continue 'pack;
                }
                sk += circles[k].r;
                k = prev[k];
            }
            if j == next[k] {
                break;
            }
        }

        // Insert c between a and b.
        prev[c] = a;
        next[c] = b;
        next[a] = c;
        prev[b] = c;
        b = c;

        // Re-pick the chain pair closest to the origin.
        let mut best = score(circles, &next, a);
        let mut cur = next[c];
        while cur != b {
            let s = score(circles, &next, cur);
            if s < best {
                a = cur;
                best = s;
            }
            cur = next[cur];
        }
        b = next[a];
        i += 1;
    }

    let mut chain = vec![circles[b]];
    let mut cur = next[b];
    while cur != b {
        chain.push(circles[cur]);
        cur = next[cur];
    }
    let Some(e) = enclose(&chain, rng) else {
        return 0.0;
    };

    for c in circles.iter_mut() {
        c.translate(-e.x, -e.y);
    }
    e.r
}

/// Places circle `c` tangent to both `a` and `b`, on the counter-clockwise side of `b → a`.
fn place(circles: &mut [Circle], b: usize, a: usize, c: usize) {
    let (ca, cb) = (circles[a], circles[b]);
    let cr = circles[c].r;
    let dx = cb.x - ca.x;
    let dy = cb.y - ca.y;
    let d2 = dx * dx + dy * dy;
    if d2 > 0.0 {
        let a2 = (ca.r + cr) * (ca.r + cr);
        let b2 = (cb.r + cr) * (cb.r + cr);
        if a2 > b2 {
            let x = (d2 + b2 - a2) / (2.0 * d2);
            let y = (b2 / d2 - x * x).max(0.0).sqrt();
            circles[c].x = cb.x - x * dx - y * dy;
            circles[c].y = cb.y - x * dy + y * dx;
        } else {
            let x = (d2 + a2 - b2) / (2.0 * d2);
            let y = (a2 / d2 - x * x).max(0.0).sqrt();
            circles[c].x = ca.x + x * dx - y * dy;
            circles[c].y = ca.y + x * dy + y * dx;
        }
    } else {
        circles[c].x = ca.x + cr;
        circles[c].y = ca.y;
    }
}

fn score(circles: &[Circle], next: &[usize], node: usize) -> f64 {
    let a = circles[node];
    let b = circles[next[node]];
    let ab = a.r + b.r;
    if ab <= 0.0 {
        return a.x * a.x + a.y * a.y;
    }
    let dx = (a.x * b.r + b.x * a.r) / ab;
    let dy = (a.y * b.r + b.y * a.r) / ab;
    dx * dx + dy * dy
}
