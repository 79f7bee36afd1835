//! Value-producing callbacks.
//!
//! A [`Callback`] is a tagged union of three closure shapes. Numeric and
//! textual callbacks derive one value from `(entity, name, raw value)`; the
//! entity is absent when the callback runs over a referenced entity during
//! domain resolution. Fan-out callbacks derive one synthetic column from a
//! source field value.
//!
//! # Example
//!
//! ```ignore
//! use entityset_core::Callback;
//!
//! let upper = Callback::textual(|_entity: Option<&Record>, _name, value| {
//!     Ok(value.as_text().map(str::to_uppercase))
//! });
//! ```

use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use entityset_model::Value;

/// Derives a number for a cell.
pub type NumericFn<E> = dyn Fn(Option<&E>, &str, &Value) -> Result<Option<f64>> + Send + Sync;

/// Derives a string for a cell.
pub type TextualFn<E> = dyn Fn(Option<&E>, &str, &Value) -> Result<Option<String>> + Send + Sync;

/// Derives one synthetic column from `(entity, attribute, source field, value)`.
pub type FanOutFn<E> = dyn Fn(&E, &str, &str, &Value) -> Result<Option<String>> + Send + Sync;

/// Kind of a callback, used when validating registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackKind {
    Numeric,
    Textual,
    FanOut,
}

impl CallbackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallbackKind::Numeric => "numeric",
            CallbackKind::Textual => "textual",
            CallbackKind::FanOut => "fan-out",
        }
    }
}

impl fmt::Display for CallbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a numeric or textual callback.
#[derive(Debug, Clone, PartialEq)]
pub enum CallbackOutput {
    Number(f64),
    Text(String),
    /// The callback produced no value.
    Nothing,
}

pub enum Callback<E> {
    Numeric(Arc<NumericFn<E>>),
    Textual(Arc<TextualFn<E>>),
    FanOut(Arc<FanOutFn<E>>),
}

impl<E> Callback<E> {
    pub fn numeric<F>(callback: F) -> Self
    where
        F: Fn(Option<&E>, &str, &Value) -> Result<Option<f64>> + Send + Sync + 'static,
    {
        Callback::Numeric(Arc::new(callback))
    }

    pub fn textual<F>(callback: F) -> Self
    where
        F: Fn(Option<&E>, &str, &Value) -> Result<Option<String>> + Send + Sync + 'static,
    {
        Callback::Textual(Arc::new(callback))
    }

    pub fn fan_out<F>(callback: F) -> Self
    where
        F: Fn(&E, &str, &str, &Value) -> Result<Option<String>> + Send + Sync + 'static,
    {
        Callback::FanOut(Arc::new(callback))
    }

    pub fn kind(&self) -> CallbackKind {
        match self {
            Callback::Numeric(_) => CallbackKind::Numeric,
            Callback::Textual(_) => CallbackKind::Textual,
            Callback::FanOut(_) => CallbackKind::FanOut,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Callback::Numeric(_))
    }

    /// Runs a numeric or textual callback. Fan-out callbacks need a source
    /// field and an entity; calling one here is an error.
    pub fn call(&self, entity: Option<&E>, name: &str, value: &Value) -> Result<CallbackOutput> {
        match self {
            Callback::Numeric(callback) => {
                Ok(callback(entity, name, value)?.map_or(CallbackOutput::Nothing, CallbackOutput::Number))
            }
            Callback::Textual(callback) => {
                Ok(callback(entity, name, value)?.map_or(CallbackOutput::Nothing, CallbackOutput::Text))
            }
            Callback::FanOut(_) => {
                anyhow::bail!("fan-out callback cannot produce a value for {name} on its own")
            }
        }
    }

    /// Runs a fan-out callback for one synthetic column.
    pub fn call_fan_out(
        &self,
        entity: &E,
        attribute: &str,
        source_field: &str,
        value: &Value,
    ) -> Result<Option<String>> {
        match self {
            Callback::FanOut(callback) => callback(entity, attribute, source_field, value),
            other => anyhow::bail!(
                "{} callback registered for fan-out column {attribute}",
                other.kind()
            ),
        }
    }
}

impl<E> Clone for Callback<E> {
    fn clone(&self) -> Self {
        match self {
            Callback::Numeric(callback) => Callback::Numeric(Arc::clone(callback)),
            Callback::Textual(callback) => Callback::Textual(Arc::clone(callback)),
            Callback::FanOut(callback) => Callback::FanOut(Arc::clone(callback)),
        }
    }
}

impl<E> fmt::Debug for Callback<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback::{:?}", self.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_textual_results_are_tagged() {
        let double: Callback<()> =
            Callback::numeric(|_, _, value| Ok(value.as_f64().map(|number| number * 2.0)));
        assert_eq!(
            double.call(None, "age", &Value::Integer(21)).unwrap(),
            CallbackOutput::Number(42.0)
        );
        assert_eq!(
            double.call(None, "age", &Value::Null).unwrap(),
            CallbackOutput::Nothing
        );

        let name: Callback<()> = Callback::textual(|_, field, _| Ok(Some(field.to_string())));
        assert_eq!(
            name.call(None, "country", &Value::Null).unwrap(),
            CallbackOutput::Text("country".into())
        );
    }

    #[test]
    fn fan_out_callbacks_need_a_source() {
        let callback: Callback<()> = Callback::fan_out(|_, _, _, _| Ok(None));
        assert!(callback.call(None, "x", &Value::Null).is_err());
        assert_eq!(callback.call_fan_out(&(), "x", "src", &Value::Null).unwrap(), None);

        let textual: Callback<()> = Callback::textual(|_, _, _| Ok(None));
        assert!(textual.call_fan_out(&(), "x", "src", &Value::Null).is_err());
    }
}
