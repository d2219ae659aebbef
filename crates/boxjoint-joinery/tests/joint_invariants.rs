use boxjoint_core::{is_simple, signed_area, JointError, Point};
use boxjoint_joinery::{
    assemble, outward_normal_for, render_edge, EdgeFamily, EdgeKey, EdgePairRegistry, EdgeRun,
    JointDepths, JointParams, RectPanelBuilder, Side,
};

fn mate_123() -> (EdgePairRegistry, boxjoint_joinery::Mate) {
    let mut registry = EdgePairRegistry::new(JointParams::new(3.0, 0.2, 0.15));
    let mate = registry
        .register(
            EdgeFamily::Outer,
            EdgeKey::new("A", "top"),
            123.0,
            EdgeKey::new("B", "top"),
            123.0,
        )
        .unwrap();
    (registry, mate)
}

#[test]
fn mated_edges_share_segments_and_endpoints() {
    let (registry, mate) = mate_123();
    let pair = registry.get(mate.a.pair).unwrap();
    let dir = Point::new(1.0, 0.0);
    let normal = outward_normal_for(dir);

    let a = render_edge(Point::ORIGIN, dir, normal, &pair.plan, registry.depths(), mate.a.inverted())
        .unwrap();
    let b = render_edge(Point::ORIGIN, dir, normal, &pair.plan, registry.depths(), mate.b.inverted())
        .unwrap();

    assert_eq!(a.len(), b.len());
    assert_eq!(a.len(), 3 * pair.plan.count as usize);
    assert_eq!(a.last(), Some(&Point::new(123.0, 0.0)));
    assert_eq!(b.last(), Some(&Point::new(123.0, 0.0)));

    let depths = registry.depths();
    for (i, (pa, pb)) in a.chunks(3).zip(b.chunks(3)).enumerate() {
        // Same baseline end point on both sides.
        assert_eq!(pa[2], pb[2], "segment {i}");
        // One side protrudes by the tab depth, the other recedes by the slot depth.
        let (tab, slot) = if pa[0].y < 0.0 { (pa, pb) } else { (pb, pa) };
        assert!((tab[0].y + depths.tab).abs() < 1e-12, "segment {i}");
        assert!((slot[0].y - depths.slot).abs() < 1e-12, "segment {i}");
    }
}

#[test]
fn drawn_depth_rule() {
    let d = JointDepths::drawn(3.0, 0.2, 0.2);
    assert!((d.tab - 3.0).abs() < 1e-12);
    assert!((d.slot - 3.0).abs() < 1e-12);

    let d = JointDepths::drawn(3.0, 0.2, 0.15);
    assert!((d.slot - 2.95).abs() < 1e-12);
}

/// Bottom plus four full-height walls, wired the way a closed-top-less box is.
fn open_box(registry: &mut EdgePairRegistry) -> Vec<boxjoint_joinery::PanelSpec> {
    let (w, d, h) = (106.0, 66.0, 53.0);
    let outer = |r: &mut EdgePairRegistry, a: (&str, &str), b: (&str, &str), len: f64| {
        r.register(EdgeFamily::Outer, EdgeKey::new(a.0, a.1), len, EdgeKey::new(b.0, b.1), len)
            .unwrap()
    };
    let back = outer(registry, ("BOTTOM", "top"), ("BACK", "bottom"), w);
    let front = outer(registry, ("BOTTOM", "bottom"), ("FRONT", "bottom"), w);
    let left = outer(registry, ("BOTTOM", "left"), ("LEFT", "bottom"), d);
    let right = outer(registry, ("BOTTOM", "right"), ("RIGHT", "bottom"), d);
    let vertical = |r: &mut EdgePairRegistry, a: (&str, &str), b: (&str, &str)| {
        r.register(EdgeFamily::Vertical, EdgeKey::new(a.0, a.1), h, EdgeKey::new(b.0, b.1), h)
            .unwrap()
    };
    let back_left = vertical(registry, ("BACK", "left"), ("LEFT", "right"));
    let back_right = vertical(registry, ("BACK", "right"), ("RIGHT", "left"));
    let front_left = vertical(registry, ("FRONT", "left"), ("LEFT", "left"));
    let front_right = vertical(registry, ("FRONT", "right"), ("RIGHT", "right"));

    vec![
        RectPanelBuilder::new("BOTTOM", w, d)
            .joint(Side::Top, back.a)
            .joint(Side::Bottom, front.a)
            .joint(Side::Left, left.a)
            .joint(Side::Right, right.a)
            .build()
            .unwrap(),
        RectPanelBuilder::new("BACK", w, h)
            .joint(Side::Bottom, back.b)
            .joint(Side::Left, back_left.a)
            .joint(Side::Right, back_right.a)
            .build()
            .unwrap(),
        RectPanelBuilder::new("FRONT", w, h)
            .joint(Side::Bottom, front.b)
            .joint(Side::Left, front_left.a)
            .joint(Side::Right, front_right.a)
            .build()
            .unwrap(),
        RectPanelBuilder::new("LEFT", d, h)
            .joint(Side::Bottom, left.b)
            .joint(Side::Right, back_left.b)
            .joint(Side::Left, front_left.b)
            .build()
            .unwrap(),
        RectPanelBuilder::new("RIGHT", d, h)
            .joint(Side::Bottom, right.b)
            .joint(Side::Left, back_right.b)
            .joint(Side::Right, front_right.b)
            .build()
            .unwrap(),
    ]
}

#[test]
fn open_box_assembles_into_simple_outlines() {
    let mut registry = EdgePairRegistry::new(JointParams::default());
    let specs = open_box(&mut registry);
    registry.verify_bindings(&specs).unwrap();

    for spec in &specs {
        let panel = assemble(spec, &registry).unwrap();
        assert!(panel.outline.len() >= 4, "{}", panel.name);
        assert!(signed_area(&panel.outline).abs() > 1e-6, "{}", panel.name);
        assert!(is_simple(&panel.outline), "{} self-intersects", panel.name);
        assert_ne!(panel.outline.first(), panel.outline.last());
    }
}

#[test]
fn verify_bindings_rejects_double_binding() {
    let mut registry = EdgePairRegistry::new(JointParams::default());
    let mut specs = open_box(&mut registry);
    let left = registry.pairs()[2].clone();

    // Bind the BOTTOM side of the left pair a second time from another panel.
    specs.push(
        RectPanelBuilder::new("BOTTOM", 20.0, left.length())
            .joint(
                Side::Left,
                boxjoint_joinery::JointRef {
                    pair: left.id,
                    side: boxjoint_joinery::MateSide::A,
                },
            )
            .build()
            .unwrap(),
    );
    let err = registry.verify_bindings(&specs).unwrap_err();
    assert!(matches!(err, JointError::TopologyMismatch(_)), "{err}");
}

#[test]
fn verify_bindings_rejects_missing_side() {
    let mut registry = EdgePairRegistry::new(JointParams::default());
    let mut specs = open_box(&mut registry);
    specs.retain(|s| s.name != "FRONT");
    let err = registry.verify_bindings(&specs).unwrap_err();
    assert!(matches!(err, JointError::UnboundPair(_)), "{err}");
}

#[test]
fn lowered_front_uses_split_runs() {
    let (d, h, front_h) = (66.0, 53.0, 30.0);
    let mut registry = EdgePairRegistry::new(JointParams::default());
    let mate = registry
        .register(
            EdgeFamily::Vertical,
            EdgeKey::new("FRONT", "left"),
            front_h,
            EdgeKey::new("LEFT", "left.0"),
            front_h,
        )
        .unwrap();
    let front = RectPanelBuilder::new("FRONT", 106.0, front_h)
        .joint(Side::Left, mate.a)
        .build()
        .unwrap();
    let left = RectPanelBuilder::new("LEFT", d, h)
        .runs(
            Side::Left,
            vec![EdgeRun::jointed(front_h, mate.b), EdgeRun::plain(h - front_h)],
        )
        .build()
        .unwrap();

    registry.verify_bindings(&[front.clone(), left.clone()]).unwrap();
    let panel = assemble(&left, &registry).unwrap();
    assert!(is_simple(&panel.outline));
    // The plain run reaches the top-left corner untouched.
    assert!(panel.outline.contains(&Point::new(0.0, 0.0)));
}
