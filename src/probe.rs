//! Capability-probing adapter over heterogeneous host objects.
//!
//! Host runtimes expose panorama and overlay properties through an
//! inconsistent capability set: direct fields on the object, a fallible
//! accessor method, or neither. Rather than repeating the multi-tier fallback
//! at every call site, the probing lives in one seam: [`Probe::try_get`]
//! answers "this property, or absent" and swallows anything the host throws.
//!
//! The crate ships one binding, JSON documents via [`serde_json::Value`],
//! which is also how tours arrive from the player's serialized content tree.
//! A binding over a live runtime implements [`Probe`] with its own
//! accessor-catch semantics; everything above this module is agnostic.

use serde_json::Value;

/// Read access to a host object's named properties.
///
/// `try_get` must never panic: a missing property, a wrong shape, or a host
/// accessor throwing all degrade to `None`.
pub trait Probe {
    fn try_get(&self, name: &str) -> Option<Value>;

    /// String property, trimmed. Non-string values degrade to absent.
    fn get_str(&self, name: &str) -> Option<String> {
        self.try_get(name)
            .and_then(|v| v.as_str().map(|s| s.trim().to_string()))
            .filter(|s| !s.is_empty())
    }

    /// Boolean property. Absent or non-boolean is `false`.
    fn get_bool(&self, name: &str) -> bool {
        self.try_get(name)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    /// Unsigned integer property.
    fn get_usize(&self, name: &str) -> Option<usize> {
        self.try_get(name)
            .and_then(|v| v.as_u64())
            .map(|n| n as usize)
    }

    /// Nested object property (e.g. an overlay's `data` sub-object).
    fn get_object(&self, name: &str) -> Option<Value> {
        self.try_get(name).filter(Value::is_object)
    }

    /// Array property.
    fn get_array(&self, name: &str) -> Option<Vec<Value>> {
        self.try_get(name)
            .and_then(|v| v.as_array().cloned())
            .filter(|a| !a.is_empty())
    }

    /// String-array property, skipping non-string entries.
    fn get_str_array(&self, name: &str) -> Vec<String> {
        self.try_get(name)
            .and_then(|v| v.as_array().cloned())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Does the object expose this property at all (any non-null value)?
    fn has(&self, name: &str) -> bool {
        self.try_get(name).is_some_and(|v| !v.is_null())
    }
}

impl Probe for Value {
    fn try_get(&self, name: &str) -> Option<Value> {
        match self {
            Value::Object(map) => map.get(name).filter(|v| !v.is_null()).cloned(),
            _ => None,
        }
    }
}
