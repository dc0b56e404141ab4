//! Fixtures shared by the unit tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::{
    ApiPolicy, Completion, Driver, Flow, HostError, HostObject, HostValue, Request, Step, Value,
};

type HostFn = fn(HostValue, Vec<HostValue>) -> Result<HostValue, HostError>;

/// A host object backed by a property map.
#[derive(Default)]
pub(crate) struct FakeHost {
    label: String,
    props: RefCell<FxHashMap<String, HostValue>>,
    policy: Option<ApiPolicy>,
    function: Option<HostFn>,
    primitive: Option<HostValue>,
    /// Reject every `set_property`.
    read_only: bool,
}

impl FakeHost {
    pub(crate) fn new(label: &str) -> Self {
        FakeHost {
            label: label.to_string(),
            ..Self::default()
        }
    }

    pub(crate) fn with(self, name: &str, value: impl Into<HostValue>) -> Self {
        self.define(name, value);
        self
    }

    /// Create or replace a property from the host side.
    pub(crate) fn define(&self, name: &str, value: impl Into<HostValue>) {
        self.props.borrow_mut().insert(name.to_string(), value.into());
    }

    pub(crate) fn with_value(self, name: &str, value: HostValue) -> Self {
        self.props.borrow_mut().insert(name.to_string(), value);
        self
    }

    pub(crate) fn policy(mut self, policy: ApiPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    pub(crate) fn function(mut self, function: HostFn) -> Self {
        self.function = Some(function);
        self
    }

    pub(crate) fn primitive(mut self, value: HostValue) -> Self {
        self.primitive = Some(value);
        self
    }

    pub(crate) fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub(crate) fn shared(self) -> Rc<dyn HostObject> {
        Rc::new(self)
    }
}

impl HostObject for FakeHost {
    fn display(&self) -> String {
        self.label.clone()
    }

    fn has_property(&self, name: &str) -> bool {
        self.props.borrow().contains_key(name)
    }

    fn get_property(&self, name: &str) -> Result<HostValue, HostError> {
        Ok(self
            .props
            .borrow()
            .get(name)
            .cloned()
            .unwrap_or(HostValue::Undefined))
    }

    fn set_property(&self, name: &str, value: HostValue) -> Result<(), HostError> {
        if self.read_only {
            return Err(HostError::ReadOnly {
                name: name.to_string(),
            });
        }
        self.props.borrow_mut().insert(name.to_string(), value);
        Ok(())
    }

    fn delete_property(&self, name: &str) -> Result<bool, HostError> {
        Ok(self.props.borrow_mut().remove(name).is_some())
    }

    fn is_callable(&self) -> bool {
        self.function.is_some()
    }

    fn call(&self, this: HostValue, args: Vec<HostValue>) -> Result<HostValue, HostError> {
        match self.function {
            Some(function) => function(this, args),
            None => Err(HostError::NotCallable {
                native: self.label.clone(),
            }),
        }
    }

    fn api_policy(&self) -> Option<ApiPolicy> {
        self.policy.clone()
    }

    fn primitive_value(&self) -> Option<HostValue> {
        self.primitive.clone()
    }
}

/// Resolve `step`, answering checkpoints. Script calls are not expected.
pub(crate) fn run<T: 'static>(step: Step<T>) -> Flow<T> {
    run_with(step, |request| match request {
        Request::Checkpoint => Step::ready(Value::Undefined),
        Request::Call { callee, .. } => panic!("unexpected call to {}", callee.debug_string()),
    })
}

/// Resolve `step` with a custom request handler.
pub(crate) fn run_with<T: 'static>(
    step: Step<T>,
    mut handler: impl FnMut(Request) -> Step<Value>,
) -> Flow<T> {
    Driver::new().run(step, &mut handler).unwrap()
}

/// Resolve a step that must succeed.
pub(crate) fn value<T: 'static>(step: Step<T>) -> T {
    match run(step) {
        Ok(value) => value,
        Err(completion) => panic!("unexpected {completion}"),
    }
}

/// The rendered error of a step that must throw.
pub(crate) fn thrown<T: 'static>(step: Step<T>) -> String {
    match run(step) {
        Ok(_) => panic!("expected a throw"),
        Err(completion) => message_of(&completion),
    }
}

pub(crate) fn message_of(completion: &Completion) -> String {
    assert!(completion.is_throw(), "expected a throw, got {completion}");
    completion.value().debug_string()
}
