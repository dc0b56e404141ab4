use std::fmt;
use std::rc::Rc;

use super::{host_call, host_delete, host_get, host_set, HostObject};
use crate::realm::Realm;
use crate::step::Step;
use crate::value::Value;

/// Unrestricted wrapper over a host object.
///
/// Property results come back through [`Realm::from_native`], so nested
/// host objects are bridged the same way.
pub struct BridgeValue {
    realm: Realm,
    native: Rc<dyn HostObject>,
}

impl BridgeValue {
    pub(crate) fn new(realm: Realm, native: Rc<dyn HostObject>) -> Self {
        BridgeValue { realm, native }
    }

    pub fn native(&self) -> &Rc<dyn HostObject> {
        &self.native
    }

    pub fn realm(&self) -> &Realm {
        &self.realm
    }

    /// Absent properties read as `undefined`.
    pub fn member(&self, name: &str) -> Step<Value> {
        if !self.native.has_property(name) {
            return Step::ready(Value::Undefined);
        }
        host_get(
            Rc::clone(&self.native),
            name.to_string(),
            self.realm.clone(),
            |value, realm| realm.from_native(value),
        )
    }

    pub fn put(&self, name: &str, value: &Value) -> Step<()> {
        host_set(
            Rc::clone(&self.native),
            name.to_string(),
            value.to_native(),
            self.realm.clone(),
        )
    }

    pub fn delete(&self, name: &str) -> Step<bool> {
        host_delete(Rc::clone(&self.native), name.to_string(), self.realm.clone())
    }

    pub fn call(&self, this: &Value, args: &[Value]) -> Step<Value> {
        host_call(
            Rc::clone(&self.native),
            this,
            args,
            self.realm.clone(),
            |value, realm| realm.from_native(value),
        )
    }

    pub fn debug_string(&self) -> String {
        self.native.display()
    }
}

impl fmt::Debug for BridgeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BridgeValue")
            .field(&self.native.display())
            .finish()
    }
}
