//! Non-finite float detection
//!
//! `serde_json` writes NaN and infinities as `null`, which would silently
//! lose the value. [`ensure_finite`] walks a value through a no-op serializer
//! first and reports the first non-finite float it meets.

use std::fmt::Display;

use serde::Serialize;
use serde::ser;

use crate::error::EncodeError;

/// Fail with [`EncodeError::NonFinite`] if `value` contains NaN or an infinity
///
/// Errors raised by the value's own `Serialize` impl are ignored here; the
/// real encode reports them.
pub fn ensure_finite<T: Serialize + ?Sized>(value: &T) -> Result<(), EncodeError> {
    match value.serialize(FiniteCheck) {
        Err(Walk::NonFinite(x)) => Err(EncodeError::NonFinite(x)),
        _ => Ok(()),
    }
}

#[derive(Debug, thiserror::Error)]
enum Walk {
    #[error("non-finite float {0}")]
    NonFinite(f64),
    #[error("{0}")]
    Other(String),
}

impl ser::Error for Walk {
    fn custom<T: Display>(msg: T) -> Self {
        Walk::Other(msg.to_string())
    }
}

#[derive(Clone, Copy)]
struct FiniteCheck;

fn float(x: f64) -> Result<(), Walk> {
    if x.is_finite() { Ok(()) } else { Err(Walk::NonFinite(x)) }
}

impl ser::Serializer for FiniteCheck {
    type Ok = ();
    type Error = Walk;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_bool(self, _: bool) -> Result<(), Walk> {
        Ok(())
    }

    fn serialize_i8(self, _: i8) -> Result<(), Walk> {
        Ok(())
    }

    fn serialize_i16(self, _: i16) -> Result<(), Walk> {
        Ok(())
    }

    fn serialize_i32(self, _: i32) -> Result<(), Walk> {
        Ok(())
    }

    fn serialize_i64(self, _: i64) -> Result<(), Walk> {
        Ok(())
    }

    fn serialize_i128(self, _: i128) -> Result<(), Walk> {
        Ok(())
    }

    fn serialize_u8(self, _: u8) -> Result<(), Walk> {
        Ok(())
    }

    fn serialize_u16(self, _: u16) -> Result<(), Walk> {
        Ok(())
    }

    fn serialize_u32(self, _: u32) -> Result<(), Walk> {
        Ok(())
    }

    fn serialize_u64(self, _: u64) -> Result<(), Walk> {
        Ok(())
    }

    fn serialize_u128(self, _: u128) -> Result<(), Walk> {
        Ok(())
    }

    fn serialize_f32(self, v: f32) -> Result<(), Walk> {
        float(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<(), Walk> {
        float(v)
    }

    fn serialize_char(self, _: char) -> Result<(), Walk> {
        Ok(())
    }

    fn serialize_str(self, _: &str) -> Result<(), Walk> {
        Ok(())
    }

    fn serialize_bytes(self, _: &[u8]) -> Result<(), Walk> {
        Ok(())
    }

    fn serialize_none(self) -> Result<(), Walk> {
        Ok(())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<(), Walk> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<(), Walk> {
        Ok(())
    }

    fn serialize_unit_struct(self, _: &'static str) -> Result<(), Walk> {
        Ok(())
    }

    fn serialize_unit_variant(self, _: &'static str, _: u32, _: &'static str) -> Result<(), Walk> {
        Ok(())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        value: &T,
    ) -> Result<(), Walk> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        value: &T,
    ) -> Result<(), Walk> {
        value.serialize(self)
    }

    fn serialize_seq(self, _: Option<usize>) -> Result<Self, Walk> {
        Ok(self)
    }

    fn serialize_tuple(self, _: usize) -> Result<Self, Walk> {
        Ok(self)
    }

    fn serialize_tuple_struct(self, _: &'static str, _: usize) -> Result<Self, Walk> {
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self, Walk> {
        Ok(self)
    }

    fn serialize_map(self, _: Option<usize>) -> Result<Self, Walk> {
        Ok(self)
    }

    fn serialize_struct(self, _: &'static str, _: usize) -> Result<Self, Walk> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self, Walk> {
        Ok(self)
    }
}

impl ser::SerializeSeq for FiniteCheck {
    type Ok = ();
    type Error = Walk;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Walk> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), Walk> {
        Ok(())
    }
}

impl ser::SerializeTuple for FiniteCheck {
    type Ok = ();
    type Error = Walk;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Walk> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), Walk> {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for FiniteCheck {
    type Ok = ();
    type Error = Walk;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Walk> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), Walk> {
        Ok(())
    }
}

impl ser::SerializeTupleVariant for FiniteCheck {
    type Ok = ();
    type Error = Walk;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Walk> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), Walk> {
        Ok(())
    }
}

impl ser::SerializeMap for FiniteCheck {
    type Ok = ();
    type Error = Walk;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), Walk> {
        key.serialize(*self)
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Walk> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), Walk> {
        Ok(())
    }
}

impl ser::SerializeStruct for FiniteCheck {
    type Ok = ();
    type Error = Walk;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        _: &'static str,
        value: &T,
    ) -> Result<(), Walk> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), Walk> {
        Ok(())
    }
}

impl ser::SerializeStructVariant for FiniteCheck {
    type Ok = ();
    type Error = Walk;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        _: &'static str,
        value: &T,
    ) -> Result<(), Walk> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), Walk> {
        Ok(())
    }
}
