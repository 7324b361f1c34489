//! Polymorphic values and the `$type` discriminator
//!
//! Rust has no runtime subtypes, so a polymorphic slot is modelled as an enum
//! family (see [`polymorphic!`](crate::polymorphic)) wrapped in [`Poly`].
//! Serializing a [`Poly`] writes the variant's fields and prepends a
//! `"$type"` key only when the variant is not the family's declared base type.
//! Deserializing reads the discriminator (or assumes the base type when it is
//! missing) and dispatches to the matching variant.

use std::fmt;
use std::ops::{Deref, DerefMut};

use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Object key holding the runtime type discriminator
pub const TYPE_KEY: &str = "$type";

/// Identity of a concrete save type, written as `"<namespace>.<Name>, <module>"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeTag {
    /// Rust module path of the type (`::` separated)
    pub namespace: &'static str,
    /// Type name without path
    pub name: &'static str,
    /// Crate (package) that defines the type
    pub module: &'static str,
}

impl TypeTag {
    pub const fn new(namespace: &'static str, name: &'static str, module: &'static str) -> Self {
        Self {
            namespace,
            name,
            module,
        }
    }

    /// Whether a stored discriminator string names this type
    pub fn matches(&self, discriminator: &str) -> bool {
        self.to_string() == discriminator.trim()
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut segments = self.namespace.split("::").filter(|s| !s.is_empty());
        if let Some(first) = segments.next() {
            f.write_str(first)?;
            for segment in segments {
                write!(f, ".{segment}")?;
            }
            f.write_str(".")?;
        }
        write!(f, "{}, {}", self.name, self.module)
    }
}

/// A concrete type that can appear inside a polymorphic family
///
/// Usually implemented with [`save_type!`](crate::save_type).
pub trait SaveType {
    const TYPE_TAG: TypeTag;
}

/// An enum family of save types sharing one declared base type
///
/// Usually implemented with [`polymorphic!`](crate::polymorphic).
pub trait Polymorphic: Sized {
    /// The declared type; values of exactly this type carry no discriminator
    const BASE: TypeTag;

    /// Tag of the concrete variant held
    fn runtime_tag(&self) -> TypeTag;

    /// Variant's own fields, without any discriminator
    fn to_fields(&self) -> serde_json::Result<Value>;

    /// Rebuild the variant named by `discriminator` from its fields
    fn from_fields(discriminator: &str, fields: Value) -> serde_json::Result<Self>;
}

/// Serde adapter for a [`Polymorphic`] family
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Poly<T>(pub T);

impl<T> Poly<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> From<T> for Poly<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl<T> Deref for Poly<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Poly<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T: Polymorphic> Serialize for Poly<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = self.0.to_fields().map_err(S::Error::custom)?;
        let tag = self.0.runtime_tag();
        if tag == T::BASE {
            return fields.serialize(serializer);
        }

        let Value::Object(fields) = fields else {
            return Err(S::Error::custom(format!(
                "polymorphic value {tag} must serialize as an object"
            )));
        };
        let mut tagged = Map::with_capacity(fields.len() + 1);
        tagged.insert(TYPE_KEY.to_string(), Value::String(tag.to_string()));
        tagged.extend(fields);
        tagged.serialize(serializer)
    }
}

impl<'de, T: Polymorphic> Deserialize<'de> for Poly<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut token = Value::deserialize(deserializer)?;
        let discriminator = match token.as_object_mut().and_then(|o| o.shift_remove(TYPE_KEY)) {
            Some(Value::String(discriminator)) => discriminator,
            Some(other) => {
                return Err(D::Error::custom(format!(
                    "`{TYPE_KEY}` must be a string, got {other}"
                )));
            }
            None => T::BASE.to_string(),
        };
        T::from_fields(&discriminator, token)
            .map(Poly)
            .map_err(D::Error::custom)
    }
}

/// Remove every discriminator key from a token tree
pub(crate) fn strip_type_hints(token: &mut Value) {
    match token {
        Value::Object(map) => {
            map.shift_remove(TYPE_KEY);
            map.values_mut().for_each(strip_type_hints);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_type_hints),
        _ => {}
    }
}

/// Implement [`SaveType`] for one or more types, tagged with the calling
/// module's path and package name
#[macro_export]
macro_rules! save_type {
    ($($ty:ident),+ $(,)?) => {$(
        impl $crate::SaveType for $ty {
            const TYPE_TAG: $crate::TypeTag =
                $crate::TypeTag::new(module_path!(), stringify!($ty), env!("CARGO_PKG_NAME"));
        }
    )+};
}

/// Declare an enum family over [`SaveType`]s and implement [`Polymorphic`]
///
/// ```ignore
/// polymorphic! {
///     #[derive(Debug, Clone, PartialEq)]
///     pub enum AnyAnimal: Animal {
///         Animal(Animal),
///         Dog(Dog),
///         Cat(Cat),
///     }
/// }
/// ```
#[macro_export]
macro_rules! polymorphic {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $base:ty {
            $($variant:ident($ty:ty)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $($variant($ty)),+
        }

        impl $crate::Polymorphic for $name {
            const BASE: $crate::TypeTag = <$base as $crate::SaveType>::TYPE_TAG;

            fn runtime_tag(&self) -> $crate::TypeTag {
                match self {
                    $(Self::$variant(_) => <$ty as $crate::SaveType>::TYPE_TAG),+
                }
            }

            fn to_fields(&self) -> $crate::__private::serde_json::Result<$crate::__private::serde_json::Value> {
                match self {
                    $(Self::$variant(value) => {
                        $crate::__private::ensure_finite(value).map_err(
                            <$crate::__private::serde_json::Error as $crate::__private::serde::ser::Error>::custom,
                        )?;
                        $crate::__private::serde_json::to_value(value)
                    }),+
                }
            }

            fn from_fields(
                discriminator: &str,
                fields: $crate::__private::serde_json::Value,
            ) -> $crate::__private::serde_json::Result<Self> {
                $(
                    if <$ty as $crate::SaveType>::TYPE_TAG.matches(discriminator) {
                        return $crate::__private::serde_json::from_value(fields).map(Self::$variant);
                    }
                )+
                Err(<$crate::__private::serde_json::Error as $crate::__private::serde::de::Error>::custom(
                    format!("unknown type discriminator `{discriminator}`"),
                ))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Shape {
        sides: u32,
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Circle {
        radius: f32,
    }

    crate::save_type!(Shape, Circle);

    crate::polymorphic! {
        #[derive(Debug, Clone, PartialEq)]
        enum AnyShape: Shape {
            Shape(Shape),
            Circle(Circle),
        }
    }

    #[test]
    fn test_tag_display_uses_dotted_namespace() {
        let tag = TypeTag::new("game::saves", "Dog", "zoo");
        assert_eq!(tag.to_string(), "game.saves.Dog, zoo");
        assert!(tag.matches("game.saves.Dog, zoo"));
        assert!(!tag.matches("game.saves.Cat, zoo"));
    }

    #[test]
    fn test_base_variant_has_no_discriminator() {
        let token = serde_json::to_value(Poly(AnyShape::Shape(Shape { sides: 4 }))).unwrap();
        assert_eq!(token, serde_json::json!({ "sides": 4 }));
    }

    #[test]
    fn test_derived_variant_discriminator_comes_first() {
        let token = serde_json::to_value(Poly(AnyShape::Circle(Circle { radius: 2.0 }))).unwrap();
        let keys: Vec<_> = token.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec![TYPE_KEY.to_string(), "radius".to_string()]);
        assert_eq!(token[TYPE_KEY], Circle::TYPE_TAG.to_string());

        let back: Poly<AnyShape> = serde_json::from_value(token).unwrap();
        assert_eq!(back.0, AnyShape::Circle(Circle { radius: 2.0 }));
    }

    #[test]
    fn test_missing_discriminator_reads_base() {
        let back: Poly<AnyShape> = serde_json::from_value(serde_json::json!({ "sides": 3 })).unwrap();
        assert_eq!(back.0, AnyShape::Shape(Shape { sides: 3 }));
    }

    #[test]
    fn test_unknown_discriminator_fails() {
        let token = serde_json::json!({ "$type": "nowhere.Blob, x", "sides": 3 });
        assert!(serde_json::from_value::<Poly<AnyShape>>(token).is_err());
    }

    #[test]
    fn test_strip_type_hints_is_recursive() {
        let mut token = serde_json::json!({
            "$type": "a.B, c",
            "items": [{ "$type": "a.D, c", "x": 1 }],
        });
        strip_type_hints(&mut token);
        assert_eq!(token, serde_json::json!({ "items": [{ "x": 1 }] }));
    }
}
