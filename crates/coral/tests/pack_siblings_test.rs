use coral::{Circle, Lcg, enclose, pack_siblings};

fn assert_no_overlap(circles: &[Circle]) {
    for (i, a) in circles.iter().enumerate() {
        for b in &circles[i + 1..] {
            let d = a.distance_to(b);
            assert!(
                d + 1e-6 >= a.r + b.r,
                "circles overlap: {a:?} vs {b:?} (distance {d})"
            );
        }
    }
}

#[test]
fn pack_siblings_handles_small_inputs() {
    let mut rng = Lcg::default();
    assert_eq!(pack_siblings(&mut [], &mut rng), 0.0);

    let mut one = [Circle::new(10.0, 10.0, 3.0)];
    assert_eq!(pack_siblings(&mut one, &mut rng), 3.0);
    assert_eq!((one[0].x, one[0].y), (0.0, 0.0));

    let mut two = [Circle::new(0.0, 0.0, 1.0), Circle::new(0.0, 0.0, 2.0)];
    assert_eq!(pack_siblings(&mut two, &mut rng), 3.0);
    assert_no_overlap(&two);
}

#[test]
fn pack_siblings_is_overlap_free_and_enclosed() {
    let mut circles = (0..60)
        .map(|i| Circle::new(0.0, 0.0, 1.0 + (i % 7) as f64))
        .collect::<Vec<_>>();
    let r = pack_siblings(&mut circles, &mut Lcg::default());

    assert_no_overlap(&circles);
    let outer = Circle::new(0.0, 0.0, r);
    for c in &circles {
        assert!(
            outer.distance_to(c) + c.r <= r + 1e-6,
            "circle {c:?} escapes enclosing radius {r}"
        );
    }
}

#[test]
fn pack_siblings_is_deterministic() {
    let input = (0..25)
        .map(|i| Circle::new(0.0, 0.0, (i as f64).sqrt() + 1.0))
        .collect::<Vec<_>>();

    let mut a = input.clone();
    let mut b = input;
    let ra = pack_siblings(&mut a, &mut Lcg::default());
    let rb = pack_siblings(&mut b, &mut Lcg::default());
    assert_eq!(ra.to_bits(), rb.to_bits());
    assert_eq!(a, b);
}

#[test]
fn enclose_contains_every_input_circle() {
    let circles = [
        Circle::new(0.0, 0.0, 1.0),
        Circle::new(10.0, 0.0, 2.0),
        Circle::new(3.0, 7.0, 0.5),
        Circle::new(-4.0, 2.0, 1.5),
    ];
    let e = enclose(&circles, &mut Lcg::default()).expect("non-empty input");
    for c in &circles {
        assert!(e.distance_to(c) + c.r <= e.r + 1e-6);
    }
    assert!(enclose(&[], &mut Lcg::default()).is_none());
}
