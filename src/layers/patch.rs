//! Partial layer updates
//!
//! A patch is a set of camelCase field values shallow-merged into a layer:
//! every key replaces the layer's top-level field of the same name, nested
//! objects (`position`, `size`, `animation`) included.

use serde::Serialize;
use serde_json::{Map, Value};

use super::model::Layer;
use crate::error::{MontageError, Result};

/// Fields that identify a layer and therefore cannot be patched.
const IMMUTABLE_FIELDS: [&str; 2] = ["id", "type"];

/// A partial set of layer fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LayerPatch {
    fields: Map<String, Value>,
}

impl LayerPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any earlier value for the same key.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Parse a patch from a JSON object such as `{"opacity": 0.5}`.
    pub fn from_json(json: &str) -> Result<Self> {
        match serde_json::from_str::<Value>(json)? {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(MontageError::InvalidUpdate {
                reason: format!("patch must be a JSON object, got {}", other),
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Merge this patch into `layer`, returning the updated copy.
    ///
    /// The original layer is left untouched. Unknown fields, attempts to
    /// change `id` or `type`, and results that break the frame or opacity
    /// invariants are rejected.
    pub fn apply(&self, layer: &Layer) -> Result<Layer> {
        let mut object = match serde_json::to_value(layer)? {
            Value::Object(object) => object,
            _ => {
                return Err(MontageError::InvalidUpdate {
                    reason: "layer did not serialize to an object".to_string(),
                })
            }
        };

        for (field, value) in &self.fields {
            if IMMUTABLE_FIELDS.contains(&field.as_str()) {
                return Err(MontageError::InvalidUpdate {
                    reason: format!("field '{}' cannot be changed", field),
                });
            }
            if !object.contains_key(field) {
                return Err(MontageError::InvalidUpdate {
                    reason: format!("{} layers have no field '{}'", layer.kind(), field),
                });
            }
            object.insert(field.clone(), value.clone());
        }

        let updated: Layer =
            serde_json::from_value(Value::Object(object)).map_err(|e| MontageError::InvalidUpdate {
                reason: e.to_string(),
            })?;
        updated.validate()?;
        Ok(updated)
    }
}
