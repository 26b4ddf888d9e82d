//! Pseudo-State Blending
//!
//! A pseudo sub-style holds the values an element would take with one
//! pseudo-class active (e.g. `hover`). Its blend factor fades between the
//! base value and the pseudo value; kinds without interpolation switch at
//! the configured threshold.

use std::collections::HashMap;

use crate::values::PropertyValue;

/// Named pseudo sub-style of one element
#[derive(Debug, Clone, PartialEq)]
pub struct PseudoStyle {
    pub name: String,
    pub enabled: bool,
    /// Blend factor in [0, 1]
    pub blend: f32,
    /// Keys declared by rules that require this pseudo-class
    pub(crate) values: HashMap<String, PropertyValue>,
}

impl PseudoStyle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: false,
            blend: 0.0,
            values: HashMap::new(),
        }
    }

    /// Whether this sub-style contributes to the combined style
    #[inline]
    pub fn is_active(&self) -> bool {
        self.enabled && self.blend > 0.0
    }

    pub fn set_blend(&mut self, blend: f32) {
        self.blend = clamp_blend(blend);
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.values.get(key)
    }

    pub fn values(&self) -> &HashMap<String, PropertyValue> {
        &self.values
    }
}

/// Clamp to [0, 1], non-finite input becomes 0
pub fn clamp_blend(blend: f32) -> f32 {
    if blend.is_finite() { blend.clamp(0.0, 1.0) } else { 0.0 }
}

/// Blend one value towards a pseudo value
pub fn blend_value(
    base: &PropertyValue,
    pseudo: &PropertyValue,
    blend: f32,
    threshold: f32,
) -> PropertyValue {
    base.interpolate(pseudo, blend).unwrap_or_else(|| {
        if blend >= threshold {
            pseudo.clone()
        } else {
            base.clone()
        }
    })
}

/// Value of `key` after applying active sub-styles in order
pub fn combined_value(
    base: Option<&PropertyValue>,
    styles: &[PseudoStyle],
    key: &str,
    threshold: f32,
) -> Option<PropertyValue> {
    let mut current = base.cloned();
    for style in styles.iter().filter(|s| s.is_active()) {
        let Some(pseudo) = style.values.get(key) else {
            continue;
        };
        current = Some(match current {
            Some(value) => blend_value(&value, pseudo, style.blend, threshold),
            None => pseudo.clone(),
        });
    }
    current
}

/// Whole combined map: base values with active sub-styles merged in order
pub fn combine(
    base: &HashMap<String, PropertyValue>,
    styles: &[PseudoStyle],
    threshold: f32,
) -> HashMap<String, PropertyValue> {
    let mut result = base.clone();
    for style in styles.iter().filter(|s| s.is_active()) {
        for (key, pseudo) in &style.values {
            let blended = match result.get(key) {
                Some(value) => blend_value(value, pseudo, style.blend, threshold),
                None => pseudo.clone(),
            };
            result.insert(key.clone(), blended);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::Color;

    fn hover(blend: f32) -> PseudoStyle {
        let mut style = PseudoStyle::new("hover");
        style.enabled = true;
        style.set_blend(blend);
        style.values.insert("tint".into(), PropertyValue::Color(Color::WHITE));
        style.values.insert("cursor".into(), PropertyValue::Enum("pointer".into()));
        style
    }

    fn base() -> HashMap<String, PropertyValue> {
        HashMap::from([
            ("tint".to_string(), PropertyValue::Color(Color::BLACK)),
            ("cursor".to_string(), PropertyValue::Enum("arrow".into())),
            ("width".to_string(), PropertyValue::Float(10.0)),
        ])
    }

    #[test]
    fn test_blend_boundaries() {
        let zero = combine(&base(), &[hover(0.0)], 0.5);
        assert_eq!(zero, base());

        let full = combine(&base(), &[hover(1.0)], 0.5);
        assert_eq!(full["tint"], PropertyValue::Color(Color::WHITE));
        assert_eq!(full["cursor"], PropertyValue::Enum("pointer".into()));
        assert_eq!(full["width"], PropertyValue::Float(10.0));
    }

    #[test]
    fn test_discrete_threshold() {
        let below = combine(&base(), &[hover(0.4)], 0.5);
        assert_eq!(below["cursor"], PropertyValue::Enum("arrow".into()));
        let at = combine(&base(), &[hover(0.5)], 0.5);
        assert_eq!(at["cursor"], PropertyValue::Enum("pointer".into()));
        assert_eq!(at["tint"], PropertyValue::Color(Color::rgb(0.5, 0.5, 0.5)));
    }

    #[test]
    fn test_disabled_ignored() {
        let mut style = hover(1.0);
        style.enabled = false;
        assert_eq!(combine(&base(), &[style], 0.5), base());
    }

    #[test]
    fn test_combined_value_matches_combine() {
        let styles = [hover(0.25)];
        let map = combine(&base(), &styles, 0.5);
        let b = base();
        for key in ["tint", "cursor", "width"] {
            assert_eq!(
                combined_value(b.get(key), &styles, key, 0.5).as_ref(),
                map.get(key)
            );
        }
    }

    #[test]
    fn test_clamp_blend() {
        assert_eq!(clamp_blend(2.0), 1.0);
        assert_eq!(clamp_blend(-1.0), 0.0);
        assert_eq!(clamp_blend(f32::NAN), 0.0);
    }
}
