//! Effect pipeline tests on a rendered score.

mod common;

use pretty_assertions::assert_eq;
use scorefx::{Effect, Error, GroupId, MutationKind, NodeId, Phase, Scene};

use common::{duet_scene, init_logger};

fn snapshot(scene: &Scene) -> Vec<(NodeId, Vec<(String, String)>)> {
    let doc = scene.document();
    doc.descendants(doc.root())
        .into_iter()
        .map(|id| {
            let attrs = doc.attributes(id).map(|(k, v)| (k.to_string(), v.to_string())).collect();
            (id, attrs)
        })
        .collect()
}

fn group(scene: &Scene, id: &str) -> GroupId {
    scene.find_group(id).unwrap_or_else(|| panic!("no group {id}"))
}

#[test]
fn rendered_score_exposes_every_note_as_a_group() {
    init_logger();
    let scene = duet_scene();
    let ids: Vec<&str> = scene.note_groups().iter().map(|g| g.id()).collect();
    assert_eq!(
        ids,
        vec!["n0-0-0", "n0-0-1", "n0-0-2", "n0-0-3", "n0-0-4", "n0-1-0", "n0-1-1", "n0-1-2"]
    );
    assert_eq!(scene.phase(), Phase::Rendered);
    assert!(scene.to_svg_string().contains("Mutation Study"));
}

#[test]
fn recolor_touches_only_stroke_and_fill_of_target_paths() {
    init_logger();
    let mut scene = duet_scene();
    let targets = [group(&scene, "n0-0-0"), group(&scene, "n0-0-1"), group(&scene, "n0-1-1")];
    let target_nodes: Vec<NodeId> = targets.iter().map(|&t| scene.group(t).unwrap().node()).collect();
    let before = snapshot(&scene);

    scene.apply_named("recolor", "#ff0000", "unused", &targets).unwrap();

    let doc = scene.document();
    let recolored: Vec<NodeId> = target_nodes
        .iter()
        .flat_map(|&n| doc.elements_by_tag(n, "path"))
        .collect();
    assert!(recolored.len() >= 3);

    for ((id, old), (_, new)) in before.iter().zip(snapshot(&scene)) {
        if recolored.contains(id) {
            let expected: Vec<(String, String)> = old
                .iter()
                .map(|(k, v)| match k.as_str() {
                    "stroke" | "fill" => (k.clone(), "#ff0000".to_string()),
                    _ => (k.clone(), v.clone()),
                })
                .collect();
            assert_eq!(new, expected);
        } else {
            assert_eq!(&new, old);
        }
    }
}

#[test]
fn applying_twice_equals_applying_once() {
    init_logger();
    let effects = [
        Effect::Recolor("blue".into()),
        Effect::Opacity(0.4),
        Effect::StrokeWidth(2.5),
        Effect::Rotate(15.0),
        Effect::Blur(3.0),
        Effect::Erode(1.0),
        Effect::DropShadow { dx: 2.0, dy: 2.0, color: Some("red".into()) },
        Effect::Waves(8.0),
    ];
    for effect in effects {
        let mut scene = duet_scene();
        scene.init_scope("fx").unwrap();
        let targets = scene.group_ids();

        scene.apply(&effect, "fx", &targets).unwrap();
        let once = scene.to_svg_string();
        scene.apply(&effect, "fx", &targets).unwrap();
        assert_eq!(scene.to_svg_string(), once, "{:?} is not idempotent", effect);
    }
}

#[test]
fn rotating_a_rest_rotates_its_root() {
    init_logger();
    let mut scene = duet_scene();
    let rest = group(&scene, "n0-0-1");
    let (node, stem) = {
        let g = scene.group(rest).unwrap();
        assert!(g.is_rest());
        (g.node(), g.stem())
    };
    assert_eq!(stem, None);
    let (cx, cy) = scene.document().bbox(node).unwrap().center();

    scene.apply_named("rotate", "30", "fx", &[rest]).unwrap();

    let transform = scene.document().attribute(node, "transform").unwrap();
    assert_eq!(
        transform,
        format!("rotate(30 {} {})", scorefx::svg::fmt_num(cx), scorefx::svg::fmt_num(cy))
    );
}

#[test]
fn rotating_a_note_rotates_its_stem_only() {
    init_logger();
    let mut scene = duet_scene();
    let note = group(&scene, "n0-0-0");
    let (node, stem) = {
        let g = scene.group(note).unwrap();
        (g.node(), g.stem().unwrap())
    };

    scene.apply(&Effect::Rotate(-20.0), "fx", &[note]).unwrap();

    let doc = scene.document();
    assert!(doc.attribute(stem, "transform").unwrap().starts_with("rotate(-20 "));
    assert_eq!(doc.attribute(node, "transform"), None);
}

#[test]
fn filter_effect_before_init_fails_without_mutation() {
    init_logger();
    let mut scene = duet_scene();
    let targets = scene.group_ids();
    let before = scene.to_svg_string();

    let err = scene.apply(&Effect::Blur(4.0), "never", &targets).unwrap_err();
    assert!(matches!(err, Error::NotFound(ref s) if s == "never"));
    assert_eq!(scene.to_svg_string(), before);
    assert_eq!(scene.phase(), Phase::Rendered);
}

#[test]
fn blur_stage_is_shared_by_every_group_in_scope() {
    init_logger();
    let mut scene = duet_scene();
    scene.init_scope("s").unwrap();
    let a = group(&scene, "n0-0-0");
    let b = group(&scene, "n0-1-0");

    scene.apply(&Effect::Blur(0.0), "s", &[a]).unwrap();
    scene.apply(&Effect::Blur(5.0), "s", &[b]).unwrap();

    let doc = scene.document();
    let blur = scene.filter_node("s-blur").unwrap();
    assert_eq!(doc.attribute(blur, "stdDeviation"), Some("5"));
    for id in [a, b] {
        let node = scene.group(id).unwrap().node();
        assert_eq!(doc.attribute(node, "filter"), Some("url(#s-filter)"));
    }
    assert_eq!(doc.elements_by_tag(doc.root(), "filter").len(), 1);
    assert_eq!(doc.elements_by_tag(doc.root(), "feGaussianBlur").len(), 1);
    assert_eq!(scene.phase(), Phase::Active);
}

#[test]
fn filter_effects_compose_through_one_reference() {
    init_logger();
    let mut scene = duet_scene();
    scene.init_scope("s").unwrap();
    let target = [group(&scene, "n0-0-2")];

    scene.apply_named("blur", "2", "s", &target).unwrap();
    scene.apply_named("displacement", "12", "s", &target).unwrap();
    scene.apply_named("drop-shadow", "2, 3, #00ff00", "s", &target).unwrap();
    scene.apply_named("erode", "-1", "s", &target).unwrap();

    let doc = scene.document();
    let node = scene.group(target[0]).unwrap().node();
    assert_eq!(doc.attribute(node, "filter"), Some("url(#s-filter)"));
    let shadow = scene.filter_node("s-shadow").unwrap();
    assert_eq!(doc.attribute(shadow, "dx"), Some("2"));
    assert_eq!(doc.attribute(shadow, "dy"), Some("3"));
    assert_eq!(doc.attribute(shadow, "flood-color"), Some("#00ff00"));
    assert_eq!(doc.attribute(scene.filter_node("s-waves").unwrap(), "scale"), Some("12"));
    assert_eq!(doc.attribute(scene.filter_node("s-erode").unwrap(), "radius"), Some("0 0"));
}

#[test]
fn unknown_effect_changes_nothing() {
    init_logger();
    let mut scene = duet_scene();
    let before = scene.to_svg_string();
    let targets = scene.group_ids();
    let err = scene.apply_named("sparkle", "1", "fx", &targets).unwrap_err();
    assert!(matches!(err, Error::UnknownEffect(_)));
    assert_eq!(scene.to_svg_string(), before);
}

#[test]
fn malformed_parameters_degrade_quietly() {
    init_logger();
    let mut scene = duet_scene();
    let target = [group(&scene, "n0-0-0")];
    let node = scene.group(target[0]).unwrap().node();

    scene.apply_named("opacity", "lots", "fx", &target).unwrap();
    assert_eq!(scene.document().attribute(node, "opacity"), Some("1"));

    let before = scene.to_svg_string();
    scene.apply_named("recolor", "  ", "fx", &target).unwrap();
    assert_eq!(scene.to_svg_string(), before);
}

#[test]
fn lyric_markers_select_mutated_notes() {
    init_logger();
    let scene = duet_scene();
    let inserted: Vec<&str> = scene
        .groups_marked(MutationKind::Insertion)
        .into_iter()
        .map(|g| scene.group(g).unwrap().id())
        .collect();
    assert_eq!(inserted, vec!["n0-0-0"]);

    let deleted = scene.groups_marked(MutationKind::Deletion);
    assert_eq!(scene.group(deleted[0]).unwrap().id(), "n0-0-4");
    assert!(scene.groups_marked(MutationKind::Cure).is_empty());
}

#[test]
fn effects_apply_to_whole_time_slices() {
    init_logger();
    let mut scene = duet_scene();
    let chord = scene
        .staff_entries()
        .iter()
        .position(|e| e.measure == 0 && e.beat == 2.0)
        .unwrap();
    assert_eq!(scene.staff_entries()[chord].groups().count(), 2);

    scene.apply_to_entry(&Effect::Opacity(0.5), "fx", chord).unwrap();
    for id in ["n0-0-2", "n0-0-3"] {
        let node = scene.group(group(&scene, id)).unwrap().node();
        assert_eq!(scene.document().attribute(node, "opacity"), Some("0.5"));
    }
    let other = scene.group(group(&scene, "n0-0-0")).unwrap().node();
    assert_eq!(scene.document().attribute(other, "opacity"), None);
}

#[test]
fn teardown_then_reinit_starts_clean() {
    init_logger();
    let mut scene = duet_scene();
    scene.init_scope("s").unwrap();
    scene.teardown();
    assert!(scene.note_groups().is_empty());
    scene.init_scope("s").unwrap();
    assert_eq!(scene.phase(), Phase::FiltersInitialized);
}
