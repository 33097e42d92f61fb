//! Smallest circle enclosing a set of circles.
//!
//! Welzl-style incremental search: walk a shuffled copy of the input and, whenever a circle
//! falls outside the current candidate, rebuild the candidate from a basis of at most three
//! circles that must touch it. The shuffle makes the expected running time linear.

use crate::circle::Circle;
use crate::lcg::Lcg;

/// Returns `None` for an empty input.
pub fn enclose(circles: &[Circle], rng: &mut Lcg) -> Option<Circle> {
    let mut shuffled = circles.to_vec();
    rng.shuffle(&mut shuffled);

    let mut basis: Vec<Circle> = Vec::new();
    let mut current: Option<Circle> = None;
    let mut i = 0;
    while i < shuffled.len() {
        let p = shuffled[i];
        match current {
            Some(e) if e.encloses_weak(&p) => i += 1,
            _ => {
                basis = extend_basis(&basis, p);
                current = Some(enclose_basis(&basis));
                i = 0;
            }
        }
    }
    current
}

fn extend_basis(basis: &[Circle], p: Circle) -> Vec<Circle> {
    if encloses_weak_all(&p, basis) {
        return vec![p];
    }

    for &b in basis {
        if p.encloses_not(&b) && encloses_weak_all(&enclose_basis2(&b, &p), basis) {
            return vec![b, p];
        }
    }

    for i in 0..basis.len().saturating_sub(1) {
        for j in (i + 1)..basis.len() {
            let (bi, bj) = (basis[i], basis[j]);
            if enclose_basis2(&bi, &bj).encloses_not(&p)
                && enclose_basis2(&bi, &p).encloses_not(&bj)
                && enclose_basis2(&bj, &p).encloses_not(&bi)
                && encloses_weak_all(&enclose_basis3(&bi, &bj, &p), basis)
            {
                return vec![bi, bj, p];
            }
        }
    }

    // Only reachable through floating-point degeneracy; restarting from `p` still terminates
    // because the outer loop rescans everything against the new candidate.
    vec![p]
}

fn encloses_weak_all(a: &Circle, basis: &[Circle]) -> bool {
    basis.iter().all(|b| a.encloses_weak(b))
}

fn enclose_basis(basis: &[Circle]) -> Circle {
    match basis {
        [a] => *a,
        [a, b] => enclose_basis2(a, b),
        [a, b, c] => enclose_basis3(a, b, c),
        _ => Circle::default(),
    }
}

fn enclose_basis2(a: &Circle, b: &Circle) -> Circle {
    let x21 = b.x - a.x;
    let y21 = b.y - a.y;
    let r21 = b.r - a.r;
    let l = x21.hypot(y21);
    if l == 0.0 {
        return if a.r >= b.r { *a } else { *b };
    }
    Circle::new(
        (a.x + b.x + x21 / l * r21) / 2.0,
        (a.y + b.y + y21 / l * r21) / 2.0,
        (l + a.r + b.r) / 2.0,
    )
}

fn enclose_basis3(a: &Circle, b: &Circle, c: &Circle) -> Circle {
    let (x1, y1, r1) = (a.x, a.y, a.r);
    let (x2, y2, r2) = (b.x, b.y, b.r);
    let (x3, y3, r3) = (c.x, c.y, c.r);
    let a2 = x1 - x2;
    let a3 = x1 - x3;
    let b2 = y1 - y2;
    let b3 = y1 - y3;
    let c2 = r2 - r1;
    let c3 = r3 - r1;
    let d1 = x1 * x1 + y1 * y1 - r1 * r1;
    let d2 = d1 - x2 * x2 - y2 * y2 + r2 * r2;
    let d3 = d1 - x3 * x3 - y3 * y3 + r3 * r3;
    let ab = a3 * b2 - a2 * b3;
    if ab == 0.0 {
        // Collinear centers: the pairwise circle over the two farthest members wins.
        return [enclose_basis2(a, b), enclose_basis2(a, c), enclose_basis2(b, c)]
            .into_iter()
            .fold(Circle::default(), |best, e| if e.r > best.r { e } else { best });
    }
    let xa = (b2 * d3 - b3 * d2) / (ab * 2.0) - x1;
    let xb = (b3 * c2 - b2 * c3) / ab;
    let ya = (a3 * d2 - a2 * d3) / (ab * 2.0) - y1;
    let yb = (a2 * c3 - a3 * c2) / ab;
    let qa = xb * xb + yb * yb - 1.0;
    let qb = 2.0 * (r1 + xa * xb + ya * yb);
    let qc = xa * xa + ya * ya - r1 * r1;
    let r = -(if qa.abs() > 1e-6 {
        (qb + (qb * qb - 4.0 * qa * qc).max(0.0).sqrt()) / (2.0 * qa)
    } else {
        qc / qb
    });
    Circle::new(x1 + xa + xb * r, y1 + ya + yb * r, r)
}
