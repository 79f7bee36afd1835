//! Build configuration: options, extra attributes, fan-out sets, callbacks
//! and missing-value sentinels.
//!
//! A [`BuildSpec`] is assembled once and then passed by reference into every
//! build. It is `Send + Sync` whenever the entity type is, so concurrent
//! builds can share one spec.

use std::collections::HashMap;

use entityset_model::{FieldType, Value};

use crate::callback::{Callback, CallbackKind};
use crate::error::{BuildError, Result};
use crate::options::BuildOptions;

/// A synthetic column independent of any entity field.
pub struct ExtraAttribute<E> {
    pub name: String,
    pub default: Option<Value>,
    pub callback: Option<Callback<E>>,
}

impl<E> Clone for ExtraAttribute<E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            default: self.default.clone(),
            callback: self.callback.clone(),
        }
    }
}

impl<E> std::fmt::Debug for ExtraAttribute<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtraAttribute")
            .field("name", &self.name)
            .field("default", &self.default)
            .field("callback", &self.callback)
            .finish()
    }
}

/// Synthetic columns derived from one source field, in registration order.
pub struct FanOutSet<E> {
    pub source_field: String,
    pub attributes: Vec<(String, Callback<E>)>,
}

impl<E> FanOutSet<E> {
    fn new(source_field: String) -> Self {
        Self {
            source_field,
            attributes: Vec::new(),
        }
    }

    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|(name, _)| name.as_str())
    }

    pub fn callback(&self, attribute: &str) -> Option<&Callback<E>> {
        self.attributes
            .iter()
            .find(|(name, _)| name == attribute)
            .map(|(_, callback)| callback)
    }
}

impl<E> Clone for FanOutSet<E> {
    fn clone(&self) -> Self {
        Self {
            source_field: self.source_field.clone(),
            attributes: self.attributes.clone(),
        }
    }
}

impl<E> std::fmt::Debug for FanOutSet<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanOutSet")
            .field("source_field", &self.source_field)
            .field("attributes", &self.attributes)
            .finish()
    }
}

/// Everything a build needs besides the entity type and the entities.
pub struct BuildSpec<E> {
    options: BuildOptions,
    extras: Vec<ExtraAttribute<E>>,
    fan_outs: Vec<FanOutSet<E>>,
    field_callbacks: HashMap<String, Callback<E>>,
    type_callbacks: HashMap<FieldType, Callback<E>>,
    missing_values: HashMap<String, Value>,
}

impl<E> Default for BuildSpec<E> {
    fn default() -> Self {
        Self::new(BuildOptions::default())
    }
}

impl<E> BuildSpec<E> {
    pub fn new(options: BuildOptions) -> Self {
        Self {
            options,
            extras: Vec::new(),
            fan_outs: Vec::new(),
            field_callbacks: HashMap::new(),
            type_callbacks: HashMap::new(),
            missing_values: HashMap::new(),
        }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut BuildOptions {
        &mut self.options
    }

    /// Registers an extra column. Re-registering a name replaces the
    /// definition but keeps its position.
    pub fn register_extra(
        &mut self,
        name: impl Into<String>,
        default: Option<Value>,
        callback: Option<Callback<E>>,
    ) -> &mut Self {
        let extra = ExtraAttribute {
            name: name.into(),
            default,
            callback,
        };
        match self.extras.iter_mut().find(|existing| existing.name == extra.name) {
            Some(existing) => *existing = extra,
            None => self.extras.push(extra),
        }
        self
    }

    /// Adds a synthetic column derived from `source_field`.
    pub fn register_fan_out(
        &mut self,
        source_field: impl Into<String>,
        attribute: impl Into<String>,
        callback: Callback<E>,
    ) -> &mut Self {
        let source_field = source_field.into();
        let attribute = attribute.into();
        let index = match self
            .fan_outs
            .iter()
            .position(|set| set.source_field == source_field)
        {
            Some(index) => index,
            None => {
                self.fan_outs.push(FanOutSet::new(source_field));
                self.fan_outs.len() - 1
            }
        };
        let set = &mut self.fan_outs[index];
        match set.attributes.iter_mut().find(|(name, _)| *name == attribute) {
            Some(entry) => entry.1 = callback,
            None => set.attributes.push((attribute, callback)),
        }
        self
    }

    /// Registers a sentinel: a raw value that marks the named field or
    /// attribute missing.
    pub fn register_missing_value(
        &mut self,
        name: impl Into<String>,
        sentinel: impl Into<Value>,
    ) -> &mut Self {
        self.missing_values.insert(name.into(), sentinel.into());
        self
    }

    pub fn register_field_callback(
        &mut self,
        field: impl Into<String>,
        callback: Callback<E>,
    ) -> &mut Self {
        self.field_callbacks.insert(field.into(), callback);
        self
    }

    pub fn register_type_callback(&mut self, field_type: FieldType, callback: Callback<E>) -> &mut Self {
        self.type_callbacks.insert(field_type, callback);
        self
    }

    /// Shorthand for a callback on every field referencing `entity`.
    pub fn register_entity_callback(
        &mut self,
        entity: impl Into<String>,
        callback: Callback<E>,
    ) -> &mut Self {
        self.register_type_callback(FieldType::Entity(entity.into()), callback)
    }

    /// Default value and callback of an extra attribute.
    pub fn lookup(&self, name: &str) -> Option<(Option<&Value>, Option<&Callback<E>>)> {
        self.extra(name)
            .map(|extra| (extra.default.as_ref(), extra.callback.as_ref()))
    }

    pub fn extra(&self, name: &str) -> Option<&ExtraAttribute<E>> {
        self.extras.iter().find(|extra| extra.name == name)
    }

    pub fn extras(&self) -> &[ExtraAttribute<E>] {
        &self.extras
    }

    pub fn has_fan_out(&self, source_field: &str) -> bool {
        self.fan_out(source_field).is_some()
    }

    pub fn fan_out(&self, source_field: &str) -> Option<&FanOutSet<E>> {
        self.fan_outs
            .iter()
            .find(|set| set.source_field == source_field)
    }

    pub fn fan_outs(&self) -> &[FanOutSet<E>] {
        &self.fan_outs
    }

    /// Callback for a field: registered by field name first, then by the
    /// field's declared type.
    pub fn callback_for_field(&self, name: &str, field_type: &FieldType) -> Option<&Callback<E>> {
        self.field_callbacks
            .get(name)
            .or_else(|| self.type_callbacks.get(field_type))
    }

    pub fn missing_value(&self, name: &str) -> Option<&Value> {
        self.missing_values.get(name)
    }

    /// True when `raw` equals the sentinel registered for `name`.
    pub fn is_missing_value(&self, name: &str, raw: &Value) -> bool {
        self.missing_values
            .get(name)
            .is_some_and(|sentinel| sentinel.matches(raw))
    }

    /// Checks every registered callback has a kind its slot can run.
    pub fn validate(&self) -> Result<()> {
        for (field, callback) in &self.field_callbacks {
            expect_value_callback(&format!("field {field}"), callback)?;
        }
        for (field_type, callback) in &self.type_callbacks {
            expect_value_callback(&format!("type {field_type}"), callback)?;
        }
        for extra in &self.extras {
            if let Some(callback) = &extra.callback {
                expect_value_callback(&format!("extra attribute {}", extra.name), callback)?;
            }
        }
        for set in &self.fan_outs {
            for (attribute, callback) in &set.attributes {
                if callback.kind() != CallbackKind::FanOut {
                    return Err(BuildError::CallbackKind {
                        target: format!("fan-out attribute {attribute}"),
                        expected: CallbackKind::FanOut.as_str(),
                        found: callback.kind().as_str(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn expect_value_callback<E>(target: &str, callback: &Callback<E>) -> Result<()> {
    if callback.kind() == CallbackKind::FanOut {
        return Err(BuildError::CallbackKind {
            target: target.to_string(),
            expected: "numeric or textual",
            found: CallbackKind::FanOut.as_str(),
        });
    }
    Ok(())
}

impl<E> Clone for BuildSpec<E> {
    fn clone(&self) -> Self {
        Self {
            options: self.options.clone(),
            extras: self.extras.clone(),
            fan_outs: self.fan_outs.clone(),
            field_callbacks: self.field_callbacks.clone(),
            type_callbacks: self.type_callbacks.clone(),
            missing_values: self.missing_values.clone(),
        }
    }
}

impl<E> std::fmt::Debug for BuildSpec<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildSpec")
            .field("options", &self.options)
            .field("extras", &self.extras)
            .field("fan_outs", &self.fan_outs)
            .field("field_callbacks", &self.field_callbacks.keys().collect::<Vec<_>>())
            .field("type_callbacks", &self.type_callbacks.keys().collect::<Vec<_>>())
            .field("missing_values", &self.missing_values)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label() -> Callback<()> {
        Callback::textual(|_, _, _| Ok(Some("x".into())))
    }

    #[test]
    fn re_registering_keeps_position() {
        let mut spec: BuildSpec<()> = BuildSpec::default();
        spec.register_extra("a", None, None)
            .register_extra("b", None, None)
            .register_extra("a", Some(Value::from(1)), None);
        let names: Vec<&str> = spec.extras().iter().map(|extra| extra.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(spec.lookup("a").unwrap().0, Some(&Value::Integer(1)));
        assert!(spec.lookup("c").is_none());
    }

    #[test]
    fn field_callbacks_win_over_type_callbacks() {
        let mut spec: BuildSpec<()> = BuildSpec::default();
        spec.register_entity_callback("Country", label());
        spec.register_field_callback(
            "birthplace",
            Callback::numeric(|_, _, _| Ok(Some(1.0))),
        );
        let country = FieldType::Entity("Country".into());
        assert!(spec.callback_for_field("birthplace", &country).unwrap().is_numeric());
        assert_eq!(
            spec.callback_for_field("residence", &country).unwrap().kind(),
            CallbackKind::Textual
        );
        assert!(spec.callback_for_field("residence", &FieldType::Text).is_none());
    }

    #[test]
    fn fan_out_sets_group_by_source() {
        let mut spec: BuildSpec<()> = BuildSpec::default();
        let fan = || Callback::<()>::fan_out(|_, _, _, _| Ok(None));
        spec.register_fan_out("address", "city", fan())
            .register_fan_out("owner", "owner_name", fan())
            .register_fan_out("address", "zip", fan());
        assert_eq!(spec.fan_outs().len(), 2);
        let address: Vec<&str> = spec.fan_out("address").unwrap().attribute_names().collect();
        assert_eq!(address, ["city", "zip"]);
        assert!(spec.has_fan_out("owner"));
        assert!(!spec.has_fan_out("city"));
    }

    #[test]
    fn validate_rejects_misplaced_callbacks() {
        let mut spec: BuildSpec<()> = BuildSpec::default();
        spec.register_fan_out("address", "city", label());
        assert!(matches!(
            spec.validate(),
            Err(BuildError::CallbackKind { expected: "fan-out", .. })
        ));

        let mut spec: BuildSpec<()> = BuildSpec::default();
        spec.register_field_callback("name", Callback::fan_out(|_, _, _, _| Ok(None)));
        assert!(matches!(
            spec.validate(),
            Err(BuildError::CallbackKind { found: "fan-out", .. })
        ));
    }

    #[test]
    fn sentinels_compare_numerically() {
        let mut spec: BuildSpec<()> = BuildSpec::default();
        spec.register_missing_value("age", -1);
        assert!(spec.is_missing_value("age", &Value::Float(-1.0)));
        assert!(!spec.is_missing_value("age", &Value::Integer(3)));
        assert!(!spec.is_missing_value("height", &Value::Integer(-1)));
    }
}
