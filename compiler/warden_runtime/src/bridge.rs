//! Host objects inside the sandbox.
//!
//! Two wrappers bring a host object into the script:
//!
//! - [`BridgeValue`]: unrestricted pass-through, used for values the
//!   embedding trusts (errors raised by the runtime itself, objects handed
//!   over through [`Value::from_native`]).
//! - [`SmartLink`]: every read, write and delete of an existing property is
//!   checked against the object's [`ApiPolicy`]. [`SmartLink::make`] is the
//!   single entry point for untrusted host values.
//!
//! Every host access checkpoints first, so the driver gets control back
//! before the host runs.

mod bookmark;
mod bridge_value;
mod error_object;
mod host;
mod policy;
mod reference;
mod smart_link;

pub use bookmark::create_native_bookmark;
pub use bridge_value::BridgeValue;
pub use error_object::ErrorObject;
pub use host::{HostError, HostFault, HostObject, HostValue};
pub use policy::ApiPolicy;
pub use reference::{Access, Reference};
pub use smart_link::SmartLink;

use std::rc::Rc;

use crate::completion::Completion;
use crate::realm::Realm;
use crate::step::{checkpoint, Step};
use crate::value::Value;

/// Converts a host result back into a script value.
type Wrap = fn(HostValue, &Realm) -> Value;

/// The primitive a host object coerces to: its declared primitive value,
/// or its textual form.
pub(crate) fn host_primitive(native: &dyn HostObject) -> Value {
    native
        .primitive_value()
        .and_then(|value| Value::from_native(value, None).ok())
        .filter(Value::is_primitive)
        .unwrap_or_else(|| Value::string(native.display()))
}

fn host_get(native: Rc<dyn HostObject>, name: String, realm: Realm, wrap: Wrap) -> Step<Value> {
    checkpoint().and_then(move |()| match native.get_property(&name) {
        Ok(value) => Step::ready(wrap(value, &realm)),
        Err(error) => Step::throw(Completion::from_host_error(&realm, &error)),
    })
}

fn host_set(native: Rc<dyn HostObject>, name: String, value: HostValue, realm: Realm) -> Step<()> {
    checkpoint().and_then(move |()| match native.set_property(&name, value) {
        Ok(()) => Step::ready(()),
        Err(error) => Step::throw(Completion::from_host_error(&realm, &error)),
    })
}

fn host_delete(native: Rc<dyn HostObject>, name: String, realm: Realm) -> Step<bool> {
    checkpoint().and_then(move |()| match native.delete_property(&name) {
        Ok(deleted) => Step::ready(deleted),
        Err(error) => Step::throw(Completion::from_host_error(&realm, &error)),
    })
}

fn host_call(
    native: Rc<dyn HostObject>,
    this: &Value,
    args: &[Value],
    realm: Realm,
    wrap: Wrap,
) -> Step<Value> {
    if !native.is_callable() {
        return Step::throw(crate::errors::not_callable(&realm, &native.display()));
    }
    let this = this.to_native();
    let args: Vec<HostValue> = args.iter().map(Value::to_native).collect();
    checkpoint().and_then(move |()| match native.call(this, args) {
        Ok(value) => Step::ready(wrap(value, &realm)),
        Err(error) => Step::throw(Completion::from_host_error(&realm, &error)),
    })
}
