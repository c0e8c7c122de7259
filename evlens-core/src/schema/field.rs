//! Field classes: the declared shape of event payloads.

use serde::{Deserialize, Serialize};

/// Declared class of a payload field.
///
/// Serialized with a `type` tag, e.g.
///
/// ```yaml
/// type: structure
/// members:
///   - name: x
///     class: { type: integer, signed: true }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldClass {
    /// Boolean.
    Bool,
    /// Fixed-length bit array.
    BitArray {
        /// Number of bits (1..=64).
        length: u32,
    },
    /// Integer.
    Integer {
        /// Signed or unsigned.
        #[serde(default)]
        signed: bool,
    },
    /// Floating point number.
    Real {
        /// Double or single precision.
        #[serde(default = "default_true")]
        double: bool,
    },
    /// Text.
    String,
    /// Integer with labelled value ranges.
    Enumeration {
        /// Signed or unsigned.
        #[serde(default)]
        signed: bool,
        /// Labels and their ranges.
        #[serde(default)]
        mappings: Vec<EnumMapping>,
    },
    /// Array with a length fixed by the schema.
    StaticArray {
        /// Element class.
        element: Box<FieldClass>,
        /// Number of elements.
        length: usize,
    },
    /// Array whose length is known only per event.
    DynamicArray {
        /// Element class.
        element: Box<FieldClass>,
    },
    /// Ordered named members.
    Structure {
        /// Members in declaration order.
        #[serde(default)]
        members: Vec<StructMember>,
    },
    /// A field that may be absent.
    Option {
        /// Class of the present value.
        inner: Box<FieldClass>,
    },
    /// One of several named alternatives.
    Variant {
        /// Alternatives in declaration order.
        options: Vec<VariantOption>,
    },
}

fn default_true() -> bool {
    true
}

impl FieldClass {
    /// Signed integer class.
    pub fn signed_int() -> Self {
        Self::Integer { signed: true }
    }

    /// Unsigned integer class.
    pub fn unsigned_int() -> Self {
        Self::Integer { signed: false }
    }

    /// Structure class from `(name, class)` pairs.
    pub fn structure<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = (S, FieldClass)>,
        S: Into<String>,
    {
        Self::Structure {
            members: members
                .into_iter()
                .map(|(name, class)| StructMember::new(name, class))
                .collect(),
        }
    }

    /// Name shown in the tree's "Type" column.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool => "Boolean",
            Self::BitArray { .. } => "Bit array",
            Self::Integer { signed: true } => "Signed integer",
            Self::Integer { signed: false } => "Unsigned integer",
            Self::Real { double: true } => "Double-precision real",
            Self::Real { double: false } => "Single-precision real",
            Self::String => "String",
            Self::Enumeration { signed: true, .. } => "Signed enumeration",
            Self::Enumeration { signed: false, .. } => "Unsigned enumeration",
            Self::StaticArray { .. } => "Static array",
            Self::DynamicArray { .. } => "Dynamic array",
            Self::Structure { .. } => "Structure",
            Self::Option { .. } => "Option",
            Self::Variant { .. } => "Variant",
        }
    }

    /// Check if the class has no children in the schema tree.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Self::Bool | Self::BitArray { .. } | Self::Integer { .. } | Self::Real { .. } | Self::String
        )
    }

    /// Number of tree nodes this class expands into, itself included.
    ///
    /// Dynamic arrays count one template child.
    pub fn node_count(&self) -> usize {
        1 + match self {
            Self::Enumeration { mappings, .. } => mappings.len(),
            Self::StaticArray { element, length } => element.node_count() * length,
            Self::DynamicArray { element } | Self::Option { inner: element } => {
                element.node_count()
            }
            Self::Structure { members } => members.iter().map(|m| m.class.node_count()).sum(),
            Self::Variant { options } => options.iter().map(|o| o.class.node_count()).sum(),
            _ => 0,
        }
    }
}

/// Named member of a structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructMember {
    /// Member name.
    pub name: String,
    /// Member class.
    pub class: FieldClass,
}

impl StructMember {
    /// Create a member.
    pub fn new(name: impl Into<String>, class: FieldClass) -> Self {
        Self {
            name: name.into(),
            class,
        }
    }
}

/// Label of an enumeration and the inclusive integer ranges it covers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumMapping {
    /// Label.
    pub label: String,
    /// Inclusive `[lower, upper]` ranges.
    pub ranges: Vec<(i64, i64)>,
}

impl EnumMapping {
    /// Create a mapping covering a single value.
    pub fn single(label: impl Into<String>, value: i64) -> Self {
        Self {
            label: label.into(),
            ranges: vec![(value, value)],
        }
    }

    /// Check if `value` falls in one of the ranges.
    pub fn contains(&self, value: i128) -> bool {
        self.ranges
            .iter()
            .any(|&(lower, upper)| i128::from(lower) <= value && value <= i128::from(upper))
    }
}

/// Named alternative of a variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantOption {
    /// Option name.
    pub name: String,
    /// Option class.
    pub class: FieldClass,
}

impl VariantOption {
    /// Create an option.
    pub fn new(name: impl Into<String>, class: FieldClass) -> Self {
        Self {
            name: name.into(),
            class,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_shape() {
        let yaml = r#"
type: structure
members:
  - name: id
    class: { type: integer }
  - name: state
    class:
      type: enumeration
      mappings:
        - { label: IDLE, ranges: [[0, 0]] }
        - { label: BUSY, ranges: [[1, 3]] }
  - name: data
    class:
      type: dynamic_array
      element: { type: integer }
"#;
        let class: FieldClass = serde_yaml::from_str(yaml).unwrap();
        let FieldClass::Structure { members } = &class else {
            panic!("expected a structure, got {class:?}");
        };
        assert_eq!(members.len(), 3);
        assert_eq!(members[0].class, FieldClass::unsigned_int());
        assert_eq!(members[1].class.type_name(), "Unsigned enumeration");
        assert_eq!(class.node_count(), 1 + 1 + 3 + 2);
    }

    #[test]
    fn real_defaults_to_double() {
        let class: FieldClass = serde_json::from_str(r#"{"type":"real"}"#).unwrap();
        assert_eq!(class, FieldClass::Real { double: true });
    }

    #[test]
    fn enum_mapping_ranges() {
        let mapping = EnumMapping {
            label: "LOW".into(),
            ranges: vec![(0, 9), (100, 100)],
        };
        assert!(mapping.contains(0));
        assert!(mapping.contains(9));
        assert!(mapping.contains(100));
        assert!(!mapping.contains(10));
        assert!(!mapping.contains(-1));
    }

    #[test]
    fn node_counts() {
        let point = FieldClass::structure([
            ("x", FieldClass::signed_int()),
            ("y", FieldClass::signed_int()),
        ]);
        assert_eq!(point.node_count(), 3);

        let array = FieldClass::StaticArray {
            element: Box::new(point),
            length: 4,
        };
        assert_eq!(array.node_count(), 13);
        assert!(!array.is_scalar());
        assert!(FieldClass::String.is_scalar());
    }
}
