//! Bookmarks: host callables that stand in for script values.
//!
//! Some host APIs only accept native callables. A bookmark satisfies that
//! shape while remembering the script value it was minted for, so the value
//! comes back unchanged when the host hands the bookmark back.

use std::rc::Rc;

use super::{HostError, HostObject, HostValue};
use crate::value::Value;

struct Bookmark {
    value: Value,
}

impl HostObject for Bookmark {
    fn display(&self) -> String {
        self.value.debug_string()
    }

    fn has_property(&self, _name: &str) -> bool {
        false
    }

    fn get_property(&self, _name: &str) -> Result<HostValue, HostError> {
        Ok(HostValue::Undefined)
    }

    fn is_callable(&self) -> bool {
        true
    }

    /// Bookmarks are placeholders and must never actually run.
    fn call(&self, _this: HostValue, _args: Vec<HostValue>) -> Result<HostValue, HostError> {
        Err(HostError::BookmarkInvoked {
            value: self.value.debug_string(),
        })
    }

    fn bookmarked_value(&self) -> Option<Value> {
        Some(self.value.clone())
    }
}

/// Mint a bookmark for `value`.
pub fn create_native_bookmark(value: &Value) -> Rc<dyn HostObject> {
    Rc::new(Bookmark {
        value: value.clone(),
    })
}
