//! Payload values carried by events.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A payload value.
///
/// Values are untyped on the wire and interpreted against the event's
/// [`FieldClass`](super::FieldClass): an integer is also the value of an
/// enumeration or a bit array, `null` is an absent option, and a variant
/// is a single-entry map from the selected option name to its value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Absent option.
    Absent,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer too large for `i64`.
    UInt(u64),
    /// Floating point number.
    Real(f64),
    /// Text.
    String(String),
    /// Array elements.
    Array(Vec<FieldValue>),
    /// Named members, in order.
    Structure(Fields),
}

impl FieldValue {
    /// Structure value from `(name, value)` pairs.
    pub fn structure<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = (S, FieldValue)>,
        S: Into<String>,
    {
        Self::Structure(Fields(
            members
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        ))
    }

    /// Variant value selecting `option`.
    pub fn variant(option: impl Into<String>, value: FieldValue) -> Self {
        Self::structure([(option.into(), value)])
    }

    /// Short name of the value kind, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Absent => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) | Self::UInt(_) => "integer",
            Self::Real(_) => "real",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Structure(_) => "structure",
        }
    }

    /// Integer value widened to `i128`.
    pub fn as_integer(&self) -> Option<i128> {
        match self {
            Self::Int(v) => Some(i128::from(*v)),
            Self::UInt(v) => Some(i128::from(*v)),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("none"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Real(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v:?}"),
            Self::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Structure(fields) => write!(f, "{fields}"),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        i64::try_from(v).map_or(Self::UInt(v), Self::Int)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(items: Vec<T>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }
}

/// Ordered structure members.
///
/// Serialized as a map that keeps declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fields(pub Vec<(String, FieldValue)>);

impl Fields {
    /// Look up a member by name.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if there are no members.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl fmt::Display for Fields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        f.write_str("}")
    }
}

impl Serialize for Fields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Fields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldsVisitor;

        impl<'de> Visitor<'de> for FieldsVisitor {
            type Value = Fields;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of structure members")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Fields, A::Error> {
                let mut fields = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, value)) = access.next_entry::<String, FieldValue>()? {
                    fields.push((name, value));
                }
                Ok(Fields(fields))
            }
        }

        deserializer.deserialize_map(FieldsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untagged_yaml_values() {
        let yaml = r#"
id: 291
ok: true
ratio: 0.5
label: brake
data: [1, 2, 3]
ext: ~
big: 18446744073709551615
"#;
        let value: FieldValue = serde_yaml::from_str(yaml).unwrap();
        let FieldValue::Structure(fields) = &value else {
            panic!("expected a structure, got {value:?}");
        };

        let names: Vec<&str> = fields.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["id", "ok", "ratio", "label", "data", "ext", "big"]);
        assert_eq!(fields.get("id"), Some(&FieldValue::Int(291)));
        assert_eq!(fields.get("ok"), Some(&FieldValue::Bool(true)));
        assert_eq!(fields.get("ratio"), Some(&FieldValue::Real(0.5)));
        assert_eq!(fields.get("data"), Some(&FieldValue::from(vec![1i64, 2, 3])));
        assert_eq!(fields.get("ext"), Some(&FieldValue::Absent));
        assert_eq!(fields.get("big"), Some(&FieldValue::UInt(u64::MAX)));
    }

    #[test]
    fn member_order_survives_json() {
        let value = FieldValue::structure([("z", 1i64.into()), ("a", 2i64.into())]);
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"z":1,"a":2}"#);
        let back: FieldValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn display_summary() {
        let value = FieldValue::structure([
            ("x", FieldValue::Int(1)),
            ("name", FieldValue::from("can0")),
            ("data", FieldValue::from(vec![1u64, 2])),
            ("ext", FieldValue::Absent),
        ]);
        assert_eq!(
            value.to_string(),
            r#"{x: 1, name: "can0", data: [1, 2], ext: none}"#
        );
    }

    #[test]
    fn unsigned_conversion_prefers_int() {
        assert_eq!(FieldValue::from(5u64), FieldValue::Int(5));
        assert_eq!(FieldValue::from(u64::MAX), FieldValue::UInt(u64::MAX));
        assert_eq!(FieldValue::UInt(u64::MAX).as_integer(), Some(u64::MAX as i128));
    }
}
