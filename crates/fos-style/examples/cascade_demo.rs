//! Cascade demo
//!
//! Builds a small element tree, loads a JSON sheet and prints resolved
//! values. Run with `RUST_LOG=fos_style=debug` to see cascade logging.

use fos_style::{Color, Declaration, PropertyValue, StyleEngine, StyleSheet};
use tracing_subscriber::EnvFilter;

const THEME: &str = r#"{
    "isReadOnly": true,
    "rules": [
        { "selector": "*",
          "properties": [
            { "key": "--accent", "value": { "color": { "r": 0.2, "g": 0.4, "b": 0.9 } } }
          ] },
        { "selector": "Window",
          "properties": [
            { "key": "font-size", "value": { "float": 14.0 } }
          ] },
        { "selector": "Window > Button",
          "properties": [
            { "key": "background", "value": { "variableRef": "--accent" } },
            { "key": "cursor", "value": { "enum": "pointer" } }
          ] },
        { "selector": "Button:hover",
          "properties": [
            { "key": "background", "value": { "color": { "r": 1.0, "g": 1.0, "b": 1.0 } } }
          ] },
        { "selector": ".title",
          "properties": [
            { "key": "font-size", "value": { "float": 20.0 } }
          ] }
    ]
}"#;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut engine = StyleEngine::new();
    engine.register_property("--accent", PropertyValue::Color(Color::BLACK), false)?;
    engine.register_property("background", PropertyValue::Color(Color::TRANSPARENT), false)?;
    engine.register_property("font-size", PropertyValue::Float(12.0), true)?;
    engine.register_property("cursor", PropertyValue::Enum("arrow".into()), false)?;

    let window = engine.create_element("Window");
    let title = engine.create_element("Label");
    let button = engine.create_element("Button");
    engine.on_attach(title, window)?;
    engine.on_attach(button, window)?;
    engine.add_class(title, "title")?;

    engine.add_stylesheet(StyleSheet::from_json(THEME)?);

    for (name, id) in [("window", window), ("title", title), ("button", button)] {
        let style = engine.combined_style(id).unwrap_or_default();
        let mut keys: Vec<_> = style.keys().collect();
        keys.sort();
        println!("{name}:");
        for key in keys {
            println!("  {key} = {}", style[key]);
        }
    }

    engine.set_pseudo_state(button, "hover", true, 0.5)?;
    if let Some(background) = engine.resolved_value(button, "background") {
        println!("button background at hover 0.5 = {background}");
    }

    engine.set_inline_style(button, vec![Declaration::value("font-size", 9.0f32)])?;
    if let Some(size) = engine.resolved_value(button, "font-size") {
        println!("button font-size with inline override = {size}");
    }

    let stats = engine.stats();
    println!(
        "recomputed {} elements in {} passes, match cache {}/{} hits",
        stats.elements_recomputed,
        stats.recompute_passes,
        stats.match_cache_hits,
        stats.match_cache_hits + stats.match_cache_misses
    );

    for diagnostic in engine.take_diagnostics() {
        println!("diagnostic: {diagnostic}");
    }
    Ok(())
}
