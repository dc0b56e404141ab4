//! Allow-list guarded host objects.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashSet;

use super::{host_call, host_delete, host_get, host_set, ApiPolicy, HostObject, HostValue, Reference};
use crate::errors;
use crate::realm::{NewPropertyPolicy, Realm};
use crate::step::Step;
use crate::value::Value;

/// A host object seen through its [`ApiPolicy`].
///
/// Existing properties are readable only when allow-listed for reading and
/// writable or deletable only when allow-listed for writing. Absent
/// properties read as `undefined`. Writes that create a property follow
/// the realm's [`NewPropertyPolicy`].
pub struct SmartLink {
    realm: Realm,
    native: Rc<dyn HostObject>,
    /// Properties the script created, tracked under
    /// [`NewPropertyPolicy::TrackCreated`]. A name is added once the host
    /// accepts the write and removed once the host deletes it.
    created: Rc<RefCell<FxHashSet<String>>>,
}

impl SmartLink {
    pub(crate) fn new(realm: Realm, native: Rc<dyn HostObject>) -> Self {
        SmartLink {
            realm,
            native,
            created: Rc::default(),
        }
    }

    /// Introduce a host value into the sandbox.
    ///
    /// `undefined` and primitives map directly; host objects resolve, in
    /// order, to a well-known value registered on the realm, the value a
    /// bookmark stands for, or the realm's cached link. Arrays are linked
    /// element by element.
    pub fn make(native: HostValue, realm: &Realm) -> Value {
        match native {
            HostValue::Undefined => Value::Undefined,
            HostValue::Object(object) => {
                if let Some(value) = realm.lookup_well_known(&object) {
                    return value;
                }
                if let Some(value) = object.bookmarked_value() {
                    return value;
                }
                realm.link(object)
            }
            HostValue::Array(items) => Value::array(
                items
                    .into_iter()
                    .map(|item| SmartLink::make(item, realm))
                    .collect(),
            ),
            primitive => realm.from_native(primitive),
        }
    }

    pub fn native(&self) -> &Rc<dyn HostObject> {
        &self.native
    }

    pub fn realm(&self) -> &Realm {
        &self.realm
    }

    pub fn policy(&self) -> Option<ApiPolicy> {
        self.native.api_policy()
    }

    fn created_by_script(&self, name: &str) -> bool {
        self.realm.config().new_properties == NewPropertyPolicy::TrackCreated
            && self.created.borrow().contains(name)
    }

    pub fn allows_read(&self, name: &str) -> bool {
        self.policy().is_some_and(|policy| policy.allows_read(name)) || self.created_by_script(name)
    }

    pub fn allows_write(&self, name: &str) -> bool {
        self.policy().is_some_and(|policy| policy.allows_write(name)) || self.created_by_script(name)
    }

    pub fn member(&self, name: &str) -> Step<Value> {
        if !self.native.has_property(name) {
            return Step::ready(Value::Undefined);
        }
        if !self.allows_read(name) {
            tracing::debug!(property = name, native = %self.native.display(), "protected read denied");
            return Step::throw(errors::protected_read(&self.realm, name));
        }
        host_get(
            Rc::clone(&self.native),
            name.to_string(),
            self.realm.clone(),
            SmartLink::make,
        )
    }

    pub fn put(&self, name: &str, value: &Value) -> Step<()> {
        let creates = !self.native.has_property(name);
        if !creates && !self.allows_write(name) {
            tracing::debug!(property = name, native = %self.native.display(), "protected write denied");
            return Step::throw(errors::protected_write(&self.realm, name));
        }
        let step = host_set(
            Rc::clone(&self.native),
            name.to_string(),
            value.to_native(),
            self.realm.clone(),
        );
        if !creates || self.realm.config().new_properties != NewPropertyPolicy::TrackCreated {
            return step;
        }
        let created = Rc::clone(&self.created);
        let name = name.to_string();
        step.map(move |()| {
            created.borrow_mut().insert(name);
        })
    }

    pub fn delete(&self, name: &str) -> Step<bool> {
        if !self.native.has_property(name) {
            return Step::ready(true);
        }
        if !self.allows_write(name) {
            tracing::debug!(property = name, native = %self.native.display(), "protected delete denied");
            return Step::throw(errors::protected_delete(&self.realm, name));
        }
        let created = Rc::clone(&self.created);
        let owned = name.to_string();
        host_delete(Rc::clone(&self.native), name.to_string(), self.realm.clone()).map(
            move |deleted| {
                if deleted {
                    created.borrow_mut().remove(&owned);
                }
                deleted
            },
        )
    }

    /// A handle on `name` that enforces this link's policy: unreadable
    /// existing properties give a handle that refuses everything, readable
    /// but unwritable ones a handle that refuses writes.
    pub fn reference(self: &Rc<Self>, name: &str) -> Reference {
        let base = Value::Link(Rc::clone(self));
        if !self.native.has_property(name) {
            Reference::open(base, name)
        } else if !self.allows_read(name) {
            Reference::sealed(base, name)
        } else if !self.allows_write(name) {
            Reference::read_only(base, name)
        } else {
            Reference::open(base, name)
        }
    }

    pub fn call(&self, this: &Value, args: &[Value]) -> Step<Value> {
        host_call(
            Rc::clone(&self.native),
            this,
            args,
            self.realm.clone(),
            SmartLink::make,
        )
    }

    /// The native's textual form and its readable names. Nothing outside
    /// the allow-list is shown.
    pub fn debug_string(&self) -> String {
        let props = self
            .policy()
            .and_then(|policy| policy.read_list().map(|list| list.join(",")))
            .unwrap_or_default();
        format!("[SmartLink: {}, props: {props}]", self.native.display())
    }
}

impl fmt::Debug for SmartLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.debug_string())
    }
}
