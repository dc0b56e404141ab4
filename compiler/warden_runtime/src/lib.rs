//! Warden Runtime - Values, completions and the host bridge.
//!
//! This crate defines what a script expression can evaluate to and how those
//! values behave, without owning the statement/expression evaluator itself.
//!
//! # Suspension
//!
//! Every operation that could re-enter script code or touch a host object
//! returns a [`Step`] instead of a plain value. A step is either finished or
//! suspended on a [`Request`] that the embedding answers through a
//! [`Handler`]. The [`Driver`] pumps steps to completion and is the single
//! place where cancellation and step budgets are enforced.
//!
//! # Abrupt Completion
//!
//! Script-visible failures never use Rust panics or `Result` errors: they are
//! [`Completion`] records of kind [`CompletionType::Throw`]. Host-level
//! integration defects use [`HostFault`] instead.
//!
//! # Sandboxing
//!
//! Host objects enter the script either as unrestricted [`BridgeValue`]s or
//! as [`SmartLink`]s guarded by an [`ApiPolicy`] allow-list. Both are cached
//! per [`Realm`] by native identity, weakly.

mod bridge;
mod completion;
mod driver;
pub mod errors;
mod realm;
mod step;
mod value;

#[cfg(test)]
mod test_helpers;

pub use bridge::{
    create_native_bookmark, Access, ApiPolicy, BridgeValue, ErrorObject, HostError, HostFault,
    HostObject, HostValue, Reference, SmartLink,
};
pub use completion::{Completion, CompletionType};
pub use driver::{CancellationToken, Driver, DriverConfig, DriverError};
pub use realm::{NewPropertyPolicy, Realm, SandboxConfig};
pub use step::{checkpoint, Flow, Handler, Request, Resume, Step};
pub use value::{
    number_to_string, string_to_number, to_int32, to_integer, to_uint32, ArrayValue, FunctionData,
    ObjectValue, PreferredType, Value,
};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing unless `RUST_LOG` is set, and only ever runs once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
