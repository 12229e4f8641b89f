//! Values the firmware may leave out.
//!
//! The basic-data report has no null token: a metric is simply missing (or
//! unparsable) when the related feature is off. `Nullable` keeps that apart
//! from a metric that is present and zero.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A value plus a presence flag.
///
/// When absent the stored value is always `T::default()` and is never handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Nullable<T> {
    value: T,
    valid: bool,
}

impl<T: Default> Nullable<T> {
    /// A present value (zero included).
    pub fn new(value: T) -> Self {
        Self { value, valid: true }
    }

    /// An absent value.
    pub fn null() -> Self {
        Self {
            value: T::default(),
            valid: false,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn is_null(&self) -> bool {
        !self.valid
    }

    pub fn get(&self) -> Option<&T> {
        self.valid.then_some(&self.value)
    }

    pub fn into_option(self) -> Option<T> {
        if self.valid { Some(self.value) } else { None }
    }
}

impl<T: Default> From<Option<T>> for Nullable<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::new(v),
            None => Self::null(),
        }
    }
}

impl<T: Default> From<Nullable<T>> for Option<T> {
    fn from(value: Nullable<T>) -> Self {
        value.into_option()
    }
}

impl<T: fmt::Display> fmt::Display for Nullable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.valid {
            write!(f, "{}", self.value)
        } else {
            write!(f, "not set")
        }
    }
}

impl<T: Serialize> Serialize for Nullable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.valid {
            serializer.serialize_some(&self.value)
        } else {
            serializer.serialize_none()
        }
    }
}

impl<'de, T: Deserialize<'de> + Default> Deserialize<'de> for Nullable<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Nullable::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presence() {
        let present = Nullable::new(42);
        assert!(present.is_valid());
        assert_eq!(present.get(), Some(&42));

        let zero = Nullable::new(0);
        assert!(zero.is_valid());
        assert!(!zero.is_null());
        assert_eq!(zero.into_option(), Some(0));

        let absent: Nullable<i32> = Nullable::null();
        assert!(absent.is_null());
        assert_eq!(absent.get(), None);
        assert_eq!(absent, Nullable::default());
    }

    #[test]
    fn test_display() {
        assert_eq!(Nullable::new(123.45).to_string(), "123.45");
        assert_eq!(Nullable::new(0.0).to_string(), "0");
        assert_eq!(Nullable::<f64>::null().to_string(), "not set");
        assert_eq!(Nullable::new(String::new()).to_string(), "");
    }

    #[test]
    fn test_serialize() {
        assert_eq!(serde_json::to_string(&Nullable::new(42)).unwrap(), "42");
        assert_eq!(serde_json::to_string(&Nullable::new(0)).unwrap(), "0");
        assert_eq!(serde_json::to_string(&Nullable::<i32>::null()).unwrap(), "null");
        assert_eq!(serde_json::to_string(&Nullable::new(-123.45)).unwrap(), "-123.45");
        assert_eq!(
            serde_json::to_string(&Nullable::new(String::new())).unwrap(),
            "\"\""
        );
    }

    #[test]
    fn test_deserialize() {
        let v: Nullable<i32> = serde_json::from_str("0").unwrap();
        assert_eq!(v, Nullable::new(0));
        let v: Nullable<i32> = serde_json::from_str("null").unwrap();
        assert_eq!(v, Nullable::null());
        let v: Nullable<bool> = serde_json::from_str("false").unwrap();
        assert_eq!(v, Nullable::new(false));
        assert!(serde_json::from_str::<Nullable<i32>>("\"nope\"").is_err());
    }

    #[test]
    fn test_json_roundtrip_keeps_zero_apart_from_absent() {
        for original in [Nullable::new(123.45), Nullable::new(0.0), Nullable::null()] {
            let json = serde_json::to_string(&original).unwrap();
            let back: Nullable<f64> = serde_json::from_str(&json).unwrap();
            assert_eq!(back, original);
        }
    }

    #[test]
    fn test_in_struct() {
        #[derive(Debug, Serialize, Deserialize)]
        struct Sample {
            id: u32,
            name: Nullable<String>,
            value: Nullable<f64>,
        }

        let parsed: Sample =
            serde_json::from_str(r#"{"id":1,"name":"test","value":null}"#).unwrap();
        assert_eq!(parsed.id, 1);
        assert_eq!(parsed.name, Nullable::new("test".to_string()));
        assert!(parsed.value.is_null());

        let json = serde_json::to_string(&parsed).unwrap();
        assert_eq!(json, r#"{"id":1,"name":"test","value":null}"#);
    }
}
