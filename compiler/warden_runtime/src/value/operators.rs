//! Operators defined generically over the coercions.
//!
//! Comparisons and arithmetic coerce both sides with ToNumber (left first)
//! and use `f64` semantics. Bitwise operators and shifts go through
//! ToInt32/ToUint32; shift counts are masked to five bits.

use super::number::{self, string_to_number};
use super::object;
use super::{PreferredType, Value};
use crate::errors;
use crate::realm::Realm;
use crate::step::Step;

fn numeric_pair(left: &Value, right: &Value, realm: &Realm) -> Step<(f64, f64)> {
    let right = right.clone();
    let realm = realm.clone();
    left.to_number(&realm)
        .and_then(move |a| right.to_number(&realm).map(move |b| (a, b)))
}

fn numeric(left: &Value, right: &Value, realm: &Realm, op: fn(f64, f64) -> f64) -> Step<Value> {
    numeric_pair(left, right, realm).map(move |(a, b)| Value::Number(op(a, b)))
}

fn compare(left: &Value, right: &Value, realm: &Realm, op: fn(f64, f64) -> bool) -> Step<Value> {
    numeric_pair(left, right, realm).map(move |(a, b)| Value::Boolean(op(a, b)))
}

fn int32(left: &Value, right: &Value, realm: &Realm, op: fn(i32, i32) -> i32) -> Step<Value> {
    numeric_pair(left, right, realm).map(move |(a, b)| {
        Value::Number(f64::from(op(number::to_int32(a), number::to_int32(b))))
    })
}

fn shift_count(n: f64) -> u32 {
    number::to_uint32(n) & 31
}

impl Value {
    pub fn gt(&self, other: &Value, realm: &Realm) -> Step<Value> {
        compare(self, other, realm, |a, b| a > b)
    }

    pub fn lt(&self, other: &Value, realm: &Realm) -> Step<Value> {
        compare(self, other, realm, |a, b| a < b)
    }

    pub fn gte(&self, other: &Value, realm: &Realm) -> Step<Value> {
        compare(self, other, realm, |a, b| a >= b)
    }

    pub fn lte(&self, other: &Value, realm: &Realm) -> Step<Value> {
        compare(self, other, realm, |a, b| a <= b)
    }

    pub fn subtract(&self, other: &Value, realm: &Realm) -> Step<Value> {
        numeric(self, other, realm, |a, b| a - b)
    }

    pub fn multiply(&self, other: &Value, realm: &Realm) -> Step<Value> {
        numeric(self, other, realm, |a, b| a * b)
    }

    pub fn divide(&self, other: &Value, realm: &Realm) -> Step<Value> {
        numeric(self, other, realm, |a, b| a / b)
    }

    /// `%`: truncated remainder, sign of the dividend.
    pub fn remainder(&self, other: &Value, realm: &Realm) -> Step<Value> {
        numeric(self, other, realm, |a, b| a % b)
    }

    /// `+`: string concatenation when either primitive is a string,
    /// numeric addition otherwise.
    pub fn add(&self, other: &Value, realm: &Realm) -> Step<Value> {
        let other = other.clone();
        let realm = realm.clone();
        self.to_primitive(PreferredType::Default, &realm)
            .and_then(move |left| {
                other
                    .to_primitive(PreferredType::Default, &realm)
                    .map(move |right| (left, right, realm))
            })
            .and_then(|(left, right, realm)| {
                if matches!(left, Value::String(_)) || matches!(right, Value::String(_)) {
                    left.to_string_value(&realm).and_then(move |l| {
                        right
                            .to_string_value(&realm)
                            .map(move |r| Value::string(format!("{l}{r}")))
                    })
                } else {
                    numeric(&left, &right, &realm, |a, b| a + b)
                }
            })
    }

    pub fn negate(&self, realm: &Realm) -> Step<Value> {
        self.to_number(realm).map(|n| Value::Number(-n))
    }

    pub fn unary_plus(&self, realm: &Realm) -> Step<Value> {
        self.to_number_value(realm)
    }

    pub fn bit_not(&self, realm: &Realm) -> Step<Value> {
        self.to_int32(realm).map(|n| Value::Number(f64::from(!n)))
    }

    pub fn bit_and(&self, other: &Value, realm: &Realm) -> Step<Value> {
        int32(self, other, realm, |a, b| a & b)
    }

    pub fn bit_or(&self, other: &Value, realm: &Realm) -> Step<Value> {
        int32(self, other, realm, |a, b| a | b)
    }

    pub fn bit_xor(&self, other: &Value, realm: &Realm) -> Step<Value> {
        int32(self, other, realm, |a, b| a ^ b)
    }

    /// `<<`
    pub fn shift_left(&self, other: &Value, realm: &Realm) -> Step<Value> {
        numeric_pair(self, other, realm).map(|(a, b)| {
            Value::Number(f64::from(number::to_int32(a).wrapping_shl(shift_count(b))))
        })
    }

    /// `>>`, sign-propagating.
    pub fn shift_right(&self, other: &Value, realm: &Realm) -> Step<Value> {
        numeric_pair(self, other, realm).map(|(a, b)| {
            Value::Number(f64::from(number::to_int32(a) >> shift_count(b)))
        })
    }

    /// `>>>`, zero-filling.
    pub fn shift_right_unsigned(&self, other: &Value, realm: &Realm) -> Step<Value> {
        numeric_pair(self, other, realm).map(|(a, b)| {
            Value::Number(f64::from(number::to_uint32(a) >> shift_count(b)))
        })
    }

    /// `===`
    pub fn strict_equals(&self, other: &Value) -> Step<Value> {
        Step::ready(Value::Boolean(self.strict_eq(other)))
    }

    /// `!==`, the negation of [`Value::strict_equals`].
    pub fn strict_not_equals(&self, other: &Value) -> Step<Value> {
        self.strict_equals(other).and_then(|result| result.not())
    }

    /// `==`
    pub fn loose_equals(&self, other: &Value, realm: &Realm) -> Step<Value> {
        self.loose_eq(other, realm).map(Value::Boolean)
    }

    /// `!=`, the negation of [`Value::loose_equals`].
    pub fn loose_not_equals(&self, other: &Value, realm: &Realm) -> Step<Value> {
        self.loose_equals(other, realm).and_then(|result| result.not())
    }

    /// Abstract equality.
    fn loose_eq(&self, other: &Value, realm: &Realm) -> Step<bool> {
        match (self, other) {
            (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => Step::ready(true),
            (Value::Undefined | Value::Null, _) | (_, Value::Undefined | Value::Null) => {
                Step::ready(false)
            }
            (Value::Number(a), Value::Number(b)) => Step::ready(a == b),
            (Value::String(a), Value::String(b)) => Step::ready(a == b),
            (Value::Boolean(a), Value::Boolean(b)) => Step::ready(a == b),
            (Value::Number(a), Value::String(b)) => Step::ready(*a == string_to_number(b)),
            (Value::String(a), Value::Number(b)) => Step::ready(string_to_number(a) == *b),
            (Value::Boolean(b), _) => Value::from(f64::from(u8::from(*b))).loose_eq(other, realm),
            (_, Value::Boolean(b)) => self.loose_eq(&Value::from(f64::from(u8::from(*b))), realm),
            (left, right) if !left.is_primitive() && !right.is_primitive() => {
                Step::ready(left.same_ref(right))
            }
            (object, primitive) if !object.is_primitive() => {
                let primitive = primitive.clone();
                let realm = realm.clone();
                object
                    .to_primitive(PreferredType::Default, &realm)
                    .and_then(move |converted| converted.loose_eq(&primitive, &realm))
            }
            (primitive, object) => {
                let primitive = primitive.clone();
                let realm = realm.clone();
                object
                    .to_primitive(PreferredType::Default, &realm)
                    .and_then(move |converted| primitive.loose_eq(&converted, &realm))
            }
        }
    }

    /// The receiver for `new callee(...)`: a fresh object inheriting from
    /// the callee's `prototype` when that is an object.
    pub fn make_this_for_new(&self, realm: &Realm) -> Step<Value> {
        match self {
            Value::Object(callee) if callee.borrow().is_function() => {
                let prototype = object::lookup(callee, "prototype").filter(|p| !p.is_primitive());
                Step::ready(Value::object_with_prototype(prototype))
            }
            Value::Bridge(_) | Value::Link(_) if self.is_callable() => Step::ready(Value::object()),
            _ => Step::throw(errors::not_constructor(realm, &self.debug_string())),
        }
    }

    /// Point this object's prototype at `prototype`. Refused (returning
    /// `false`) for non-objects and when it would create a cycle.
    pub fn set_prototype(&self, prototype: Option<Value>) -> bool {
        let Value::Object(object) = self else {
            return false;
        };
        if let Some(Value::Object(proto)) = &prototype {
            if object::chain_contains(proto, object) {
                return false;
            }
        }
        object.borrow_mut().prototype = prototype;
        true
    }
}
