//! Property handles.

use crate::value::Value;
use crate::errors;
use crate::realm::Realm;
use crate::step::Step;

/// What a [`Reference`] lets through.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Access {
    /// Every operation goes to the base value.
    Open,
    /// Reads go through; writes fail closed.
    ReadOnly,
    /// Reads, writes and deletes all fail closed.
    Sealed,
}

/// A resolved property handle: a base value, a name, and the access the
/// base granted when the handle was taken.
#[derive(Clone, Debug)]
pub struct Reference {
    base: Value,
    name: String,
    access: Access,
}

impl Reference {
    pub(crate) fn open(base: Value, name: &str) -> Self {
        Self::with_access(base, name, Access::Open)
    }

    pub(crate) fn read_only(base: Value, name: &str) -> Self {
        Self::with_access(base, name, Access::ReadOnly)
    }

    pub(crate) fn sealed(base: Value, name: &str) -> Self {
        Self::with_access(base, name, Access::Sealed)
    }

    fn with_access(base: Value, name: &str, access: Access) -> Self {
        Reference {
            base,
            name: name.to_string(),
            access,
        }
    }

    pub fn base(&self) -> &Value {
        &self.base
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn access(&self) -> Access {
        self.access
    }

    pub fn get(&self, realm: &Realm) -> Step<Value> {
        if self.access == Access::Sealed {
            tracing::debug!(property = %self.name, "protected read denied");
            return Step::throw(errors::protected_read(realm, &self.name));
        }
        self.base.member(&self.name, realm)
    }

    pub fn set(&self, value: Value, realm: &Realm) -> Step<()> {
        if self.access != Access::Open {
            tracing::debug!(property = %self.name, "protected write denied");
            return Step::throw(errors::protected_write(realm, &self.name));
        }
        self.base.put(&self.name, value, realm)
    }

    pub fn delete(&self, realm: &Realm) -> Step<bool> {
        if self.access == Access::Sealed {
            tracing::debug!(property = %self.name, "protected delete denied");
            return Step::throw(errors::protected_delete(realm, &self.name));
        }
        self.base.delete(&self.name, realm)
    }
}
