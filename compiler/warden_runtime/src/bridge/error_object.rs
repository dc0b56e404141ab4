//! Error objects raised by the runtime itself.

use super::{ApiPolicy, HostError, HostObject, HostValue};

/// A script-visible error with a `name` and a `message`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorObject {
    name: String,
    message: String,
}

impl ErrorObject {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        ErrorObject {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new("TypeError", message)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl HostObject for ErrorObject {
    fn display(&self) -> String {
        if self.message.is_empty() {
            self.name.clone()
        } else {
            format!("{}: {}", self.name, self.message)
        }
    }

    fn has_property(&self, name: &str) -> bool {
        matches!(name, "name" | "message")
    }

    fn get_property(&self, name: &str) -> Result<HostValue, HostError> {
        Ok(match name {
            "name" => HostValue::String(self.name.clone()),
            "message" => HostValue::String(self.message.clone()),
            _ => HostValue::Undefined,
        })
    }

    fn api_policy(&self) -> Option<ApiPolicy> {
        Some(ApiPolicy::new().properties(["name", "message"]))
    }
}
