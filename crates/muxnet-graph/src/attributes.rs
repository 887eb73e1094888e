//! Typed attribute registry.
//!
//! Attribute names are declared once per scope with a fixed value type;
//! every write is validated against the declaration. There is no dynamic,
//! reflection-style lookup: an undeclared name is an error, not an
//! implicit schema extension.

use std::collections::HashMap;

use crate::error::StoreError;
use crate::model::{AttrScope, AttrType, AttrValue};

/// Registry of `(scope, name) → type` declarations.
#[derive(Debug, Clone, Default)]
pub struct AttrRegistry {
    defs: HashMap<(AttrScope, String), AttrType>,
}

impl AttrRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an attribute. Fails if the same name is already declared
    /// at this scope, regardless of type.
    pub fn declare(
        &mut self,
        scope: AttrScope,
        name: &str,
        ty: AttrType,
    ) -> Result<(), StoreError> {
        let key = (scope, name.to_owned());
        if self.defs.contains_key(&key) {
            return Err(StoreError::DuplicateAttribute { scope, name: name.to_owned() });
        }
        self.defs.insert(key, ty);
        Ok(())
    }

    /// Declared type of an attribute, if any.
    pub fn attr_type(&self, scope: AttrScope, name: &str) -> Option<AttrType> {
        self.defs.get(&(scope, name.to_owned())).copied()
    }

    /// Validate a value against the declaration for `(scope, name)`.
    ///
    /// Errors if the attribute was never declared or the value's variant
    /// does not match the declared type.
    pub fn check(
        &self,
        scope: AttrScope,
        name: &str,
        value: &AttrValue,
    ) -> Result<(), StoreError> {
        let expected = self
            .attr_type(scope, name)
            .ok_or_else(|| StoreError::UnknownAttribute { scope, name: name.to_owned() })?;
        let got = value.attr_type();
        if got != expected {
            return Err(StoreError::AttrTypeMismatch { name: name.to_owned(), expected, got });
        }
        Ok(())
    }

    /// All declarations at a scope, sorted by name.
    pub fn declared(&self, scope: AttrScope) -> Vec<(String, AttrType)> {
        let mut out: Vec<(String, AttrType)> = self
            .defs
            .iter()
            .filter(|((s, _), _)| *s == scope)
            .map(|((_, n), t)| (n.clone(), *t))
            .collect();
        out.sort();
        out
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
