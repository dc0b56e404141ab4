//! Centralized constructors for script-visible failures.
//!
//! Every message a script can observe through a thrown `TypeError` is built
//! here, so the wording stays consistent across the value model and the
//! bridge.

use crate::completion::Completion;
use crate::realm::Realm;

pub fn protected_read(realm: &Realm, name: &str) -> Completion {
    Completion::type_error(realm, format!("Can't read protected property: {name}"))
}

pub fn protected_write(realm: &Realm, name: &str) -> Completion {
    Completion::type_error(realm, format!("Can't write to protected property: {name}"))
}

pub fn protected_delete(realm: &Realm, name: &str) -> Completion {
    Completion::type_error(realm, format!("Can't delete protected property: {name}"))
}

/// Member access on a value that has no structure.
pub fn cannot_access_member(realm: &Realm, name: &str, target: &str) -> Completion {
    Completion::type_error(
        realm,
        format!("Can't access member {name} of that type: {target}"),
    )
}

pub fn not_callable(realm: &Realm, target: &str) -> Completion {
    Completion::type_error(realm, format!("{target} is not a function"))
}

pub fn not_constructor(realm: &Realm, target: &str) -> Completion {
    Completion::type_error(realm, format!("{target} is not a constructor"))
}

pub fn no_primitive(realm: &Realm) -> Completion {
    Completion::type_error(realm, "Cannot convert object to primitive value")
}
