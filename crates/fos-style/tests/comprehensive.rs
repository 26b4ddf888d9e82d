//! Comprehensive tests for fos-style
//!
//! Cascade ordering, variables, inheritance and propagation scope.

use fos_style::{
    Color, Declaration, ElementId, PropertyValue, Rule, StyleDiagnostic, StyleEngine, StyleSheet,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn engine() -> StyleEngine {
    init_tracing();
    let mut engine = StyleEngine::new();
    engine.register_property("width", PropertyValue::Float(1.0), false).unwrap();
    engine.register_property("color", PropertyValue::Color(Color::BLACK), true).unwrap();
    engine.register_property("font-size", PropertyValue::Float(12.0), true).unwrap();
    engine.register_property("--a", PropertyValue::Float(-1.0), false).unwrap();
    engine.register_property("--b", PropertyValue::Float(-2.0), false).unwrap();
    engine
}

fn float(value: f32) -> Option<PropertyValue> {
    Some(PropertyValue::Float(value))
}

#[test]
fn test_default_fallback() {
    let mut engine = engine();
    let root = engine.create_element("Panel");
    let child = engine.create_element("Label");
    engine.on_attach(child, root).unwrap();

    for binding in engine.registry().iter() {
        for element in [root, child] {
            assert_eq!(
                engine.resolved_value(element, &binding.key).as_ref(),
                Some(&binding.default_value),
                "{} on {}",
                binding.key,
                element
            );
        }
    }
}

#[test]
fn test_id_beats_class_regardless_of_order() {
    for id_first in [true, false] {
        let mut engine = engine();
        let element = engine.create_element("Panel");
        engine.set_element_id(element, Some("e".into())).unwrap();
        engine.add_class(element, "c").unwrap();

        let by_id = Rule::new("#e").with(Declaration::value("width", 10.0f32));
        let by_class = Rule::new(".c").with(Declaration::value("width", 20.0f32));
        let (first, second) = if id_first { (by_id, by_class) } else { (by_class, by_id) };
        engine.add_stylesheet(StyleSheet::new().with_rule(first));
        engine.add_stylesheet(StyleSheet::new().with_rule(second));

        assert_eq!(engine.resolved_value(element, "width"), float(10.0));
    }
}

#[test]
fn test_later_declaration_wins_ties() {
    let mut engine = engine();
    let element = engine.create_element("Panel");
    engine.add_class(element, "c").unwrap();
    engine.add_stylesheet(
        StyleSheet::new()
            .with_rule(Rule::new(".c").with(Declaration::value("width", 1.5f32)))
            .with_rule(Rule::new(".c").with(Declaration::value("width", 2.5f32))),
    );
    assert_eq!(engine.resolved_value(element, "width"), float(2.5));

    // Same weight across sheets: the later sheet wins
    engine.add_stylesheet(
        StyleSheet::new().with_rule(Rule::new(".c").with(Declaration::value("width", 3.5f32))),
    );
    assert_eq!(engine.resolved_value(element, "width"), float(3.5));
}

#[test]
fn test_exact_beats_inherited() {
    let mut engine = engine();
    let root = engine.create_element("Panel");
    engine.set_element_id(root, Some("root".into())).unwrap();
    let child = engine.create_element("Label");
    engine.add_class(child, "low").unwrap();
    engine.on_attach(child, root).unwrap();

    engine.add_stylesheet(
        StyleSheet::new()
            .with_rule(Rule::new("#root").with(Declaration::value("font-size", 30.0f32)))
            .with_rule(Rule::new(".low").with(Declaration::value("font-size", 9.0f32))),
    );

    assert_eq!(engine.resolved_value(root, "font-size"), float(30.0));
    assert_eq!(engine.resolved_value(child, "font-size"), float(9.0));

    let trace = engine.cascade_trace(child, "font-size");
    assert_eq!(trace.len(), 2);
    assert!(trace[0].exact_match);
    assert!(!trace[1].exact_match);
    assert!(trace[1].weight > trace[0].weight);
}

#[test]
fn test_ancestor_rule_skips_non_inheritable() {
    let mut engine = engine();
    let root = engine.create_element("Panel");
    engine.set_element_id(root, Some("root".into())).unwrap();
    let child = engine.create_element("Label");
    engine.on_attach(child, root).unwrap();

    engine.add_stylesheet(
        StyleSheet::new().with_rule(
            Rule::new("#root")
                .with(Declaration::value("width", 50.0f32))
                .with(Declaration::value("color", Color::WHITE)),
        ),
    );

    assert_eq!(engine.resolved_value(child, "width"), float(1.0));
    assert_eq!(
        engine.resolved_value(child, "color"),
        Some(PropertyValue::Color(Color::WHITE))
    );
    assert!(engine.cascade_trace(child, "width").is_empty());
}

#[test]
fn test_variable_chaining() {
    let mut engine = engine();
    let element = engine.create_element("Panel");
    engine.add_stylesheet(
        StyleSheet::new().with_rule(
            Rule::new("Panel")
                .with(Declaration::variable("--a", "--b"))
                .with(Declaration::value("--b", 5.0f32))
                .with(Declaration::variable("width", "--a")),
        ),
    );

    assert_eq!(engine.resolved_value(element, "--a"), float(5.0));
    assert_eq!(engine.resolved_value(element, "width"), float(5.0));
    assert!(engine.take_diagnostics().is_empty());
}

#[test]
fn test_variable_cycle_is_safe() {
    let mut engine = engine();
    let element = engine.create_element("Panel");
    engine.add_stylesheet(
        StyleSheet::new().with_rule(
            Rule::new("Panel")
                .with(Declaration::variable("--a", "--b"))
                .with(Declaration::variable("--b", "--a")),
        ),
    );

    assert_eq!(engine.resolved_value(element, "--a"), float(-1.0));
    assert_eq!(engine.resolved_value(element, "--b"), float(-2.0));

    let diagnostics = engine.take_diagnostics();
    assert!(!diagnostics.is_empty());
    assert!(diagnostics.iter().all(|d| matches!(d, StyleDiagnostic::VariableCycle { .. })));
    assert!(diagnostics.iter().all(|d| d.element() == element));
    assert!(engine.take_diagnostics().is_empty());
}

#[test]
fn test_inherited_placeholder_defers_locally() {
    let mut engine = engine();
    let root = engine.create_element("Panel");
    engine
        .set_inline_style(root, vec![Declaration::value("font-size", 40.0f32)])
        .unwrap();
    let element = engine.create_element("Label");
    engine.set_element_id(element, Some("e".into())).unwrap();
    engine.add_class(element, "c").unwrap();
    engine.on_attach(element, root).unwrap();

    engine.add_stylesheet(
        StyleSheet::new()
            .with_rule(Rule::new("#e").with(Declaration::inherited("font-size")))
            .with_rule(Rule::new(".c").with(Declaration::value("font-size", 14.0f32))),
    );

    assert_eq!(engine.resolved_value(element, "font-size"), float(14.0));
}

#[test]
fn test_inherited_placeholder_alone_uses_fallback() {
    let mut engine = engine();
    let root = engine.create_element("Panel");
    engine
        .set_inline_style(root, vec![Declaration::value("font-size", 40.0f32)])
        .unwrap();
    let element = engine.create_element("Label");
    engine.on_attach(element, root).unwrap();
    engine
        .set_inline_style(element, vec![Declaration::inherited("font-size")])
        .unwrap();

    assert_eq!(engine.resolved_value(element, "font-size"), float(40.0));
}

#[test]
fn test_initial_resets_inheritance() {
    let mut engine = engine();
    let root = engine.create_element("Panel");
    engine
        .set_inline_style(root, vec![Declaration::value("font-size", 40.0f32)])
        .unwrap();
    let element = engine.create_element("Label");
    engine.on_attach(element, root).unwrap();
    assert_eq!(engine.resolved_value(element, "font-size"), float(40.0));

    engine.add_stylesheet(
        StyleSheet::new().with_rule(Rule::new("Label").with(Declaration::initial("font-size"))),
    );
    assert_eq!(engine.resolved_value(element, "font-size"), float(12.0));
}

fn build_tree(engine: &mut StyleEngine) -> Vec<ElementId> {
    // root -> n -> (n1 -> n11), s -> s1
    let ids: Vec<ElementId> = ["Root", "Node", "Node", "Node", "Sibling", "Node"]
        .into_iter()
        .map(|name| engine.create_element(name))
        .collect();
    engine.on_attach(ids[1], ids[0]).unwrap();
    engine.on_attach(ids[2], ids[1]).unwrap();
    engine.on_attach(ids[3], ids[2]).unwrap();
    engine.on_attach(ids[4], ids[0]).unwrap();
    engine.on_attach(ids[5], ids[4]).unwrap();
    ids
}

#[test]
fn test_propagation_scope() {
    let mut engine = engine();
    let ids = build_tree(&mut engine);
    let before: Vec<u64> = ids.iter().map(|id| engine.recompute_count(*id).unwrap()).collect();
    let values_before: Vec<_> = ids.iter().map(|id| engine.resolved_style(*id).cloned()).collect();

    let sheet = StyleSheet::new().with_rule(Rule::new("Node").with(Declaration::value("width", 7.0f32)));
    engine.on_stylesheet_assigned(ids[1], Some(sheet)).unwrap();

    let after: Vec<u64> = ids.iter().map(|id| engine.recompute_count(*id).unwrap()).collect();
    // n and its descendants
    for i in [1, 2, 3] {
        assert_eq!(after[i], before[i] + 1, "element {i}");
        assert_eq!(engine.resolved_value(ids[i], "width"), float(7.0));
    }
    // root and the sibling subtree
    for i in [0, 4, 5] {
        assert_eq!(after[i], before[i], "element {i}");
        assert_eq!(engine.resolved_style(ids[i]).cloned(), values_before[i]);
    }
}

#[test]
fn test_class_change_scope() {
    let mut engine = engine();
    let ids = build_tree(&mut engine);
    let before: Vec<u64> = ids.iter().map(|id| engine.recompute_count(*id).unwrap()).collect();

    engine.add_class(ids[4], "wide").unwrap();
    let after: Vec<u64> = ids.iter().map(|id| engine.recompute_count(*id).unwrap()).collect();
    assert_eq!(&after[..4], &before[..4]);
    assert_eq!(after[4], before[4] + 1);
    assert_eq!(after[5], before[5] + 1);

    // No-op mutation does not restyle
    engine.add_class(ids[4], "wide").unwrap();
    assert_eq!(engine.recompute_count(ids[4]), Some(after[4]));
}

#[test]
fn test_pseudo_blend_boundary() {
    let mut engine = engine();
    let button = engine.create_element("Button");
    engine.add_stylesheet(
        StyleSheet::new()
            .with_rule(
                Rule::new("Button")
                    .with(Declaration::value("width", 10.0f32))
                    .with(Declaration::value("color", Color::BLACK)),
            )
            .with_rule(
                Rule::new("Button:hover")
                    .with(Declaration::value("width", 30.0f32))
                    .with(Declaration::value("color", Color::WHITE)),
            ),
    );
    engine.register_pseudo_state(button, "hover").unwrap();

    engine.set_pseudo_state(button, "hover", true, 0.0).unwrap();
    let base = engine.resolved_style(button).unwrap().values().clone();
    assert_eq!(engine.combined_style(button).unwrap(), base);

    engine.set_pseudo_state(button, "hover", true, 1.0).unwrap();
    assert_eq!(engine.resolved_value(button, "width"), float(30.0));
    assert_eq!(
        engine.resolved_value(button, "color"),
        Some(PropertyValue::Color(Color::WHITE))
    );

    engine.set_pseudo_state(button, "hover", true, 0.25).unwrap();
    assert_eq!(engine.resolved_value(button, "width"), float(15.0));

    engine.set_pseudo_state(button, "hover", false, 1.0).unwrap();
    assert_eq!(engine.resolved_value(button, "width"), float(10.0));
}

#[test]
fn test_pseudo_class_set_by_host() {
    let mut engine = engine();
    let button = engine.create_element("Button");
    engine.add_stylesheet(
        StyleSheet::new().with_rule(Rule::new("Button:focus").with(Declaration::value("width", 3.0f32))),
    );
    assert_eq!(engine.resolved_value(button, "width"), float(1.0));
    engine.set_pseudo_class(button, "focus", true).unwrap();
    assert_eq!(engine.resolved_value(button, "width"), float(3.0));
    engine.set_pseudo_class(button, "focus", false).unwrap();
    assert_eq!(engine.resolved_value(button, "width"), float(1.0));
}
