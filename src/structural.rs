//! Structural (field-introspection) encoding
//!
//! Values are written as plain objects of their named fields with no type
//! discriminators. Reading populates a default instance of the requested type
//! with the stored fields it recognises, so a different but field-compatible
//! type reads back with missing fields defaulted instead of failing.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{DecodeError, EncodeError, token_kind};
use crate::finite::ensure_finite;
use crate::poly::strip_type_hints;

/// Encode a value as an object of its fields
///
/// Primitives and bare lists are rejected rather than written as `{}`.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Value, EncodeError> {
    ensure_finite(value)?;
    let mut token = serde_json::to_value(value)?;
    if !token.is_object() {
        return Err(EncodeError::NotAnObject(token_kind(&token)));
    }
    strip_type_hints(&mut token);
    Ok(token)
}

/// Read a stored object token as `T`
///
/// A token that deserializes as `T` is taken as is. Otherwise the stored
/// fields are laid over `T::default()`, first taking every stored field and
/// then, if that still doesn't deserialize, only fields whose JSON kind
/// matches the default's.
pub fn decode<T>(token: &Value) -> Result<T, DecodeError>
where
    T: Serialize + DeserializeOwned + Default,
{
    if !token.is_object() {
        return Err(DecodeError::NotAnObject(token_kind(token)));
    }
    if let Ok(value) = T::deserialize(token) {
        return Ok(value);
    }

    let defaults = serde_json::to_value(T::default())?;
    let mut target = defaults.clone();
    populate(&mut target, token, Mismatch::TakeStored);
    if let Ok(value) = T::deserialize(&target) {
        return Ok(value);
    }

    let mut target = defaults;
    populate(&mut target, token, Mismatch::KeepDefault);
    Ok(T::deserialize(&target)?)
}

/// What to do when a stored field's JSON kind differs from the default's
#[derive(Clone, Copy, PartialEq, Eq)]
enum Mismatch {
    TakeStored,
    KeepDefault,
}

/// Lay `source` over `target`: objects merge key by key, stored keys the
/// default lacks are added, everything else is replaced per `mismatch`
fn populate(target: &mut Value, source: &Value, mismatch: Mismatch) {
    if let (Value::Object(fields), Value::Object(stored)) = (&mut *target, source) {
        for (name, stored_field) in stored {
            match fields.get_mut(name) {
                Some(field) => populate(field, stored_field, mismatch),
                None => {
                    fields.insert(name.clone(), stored_field.clone());
                }
            }
        }
        return;
    }
    // Option fields default to null and take whatever was stored
    if target.is_null() || mismatch == Mismatch::TakeStored || same_kind(target, source) {
        *target = source.clone();
    }
}

fn same_kind(target: &Value, source: &Value) -> bool {
    match (target, source) {
        (Value::Number(t), Value::Number(s)) => t.is_f64() || !s.is_f64(),
        (Value::Bool(_), Value::Bool(_))
        | (Value::String(_), Value::String(_))
        | (Value::Array(_), Value::Array(_)) => true,
        _ => false,
    }
}
