//! Trace schema model.
//!
//! A producer declares its event types as [`EventSchema`]s when a stream
//! begins. Each schema's payload is a [`FieldClass`] tree; every event then
//! carries a [`FieldValue`] shaped after it.

mod field;
mod value;

pub use field::{EnumMapping, FieldClass, StructMember, VariantOption};
pub use value::{FieldValue, Fields};

use crate::tree::NodeLabel;
use crate::types::SchemaId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// An event type declared by the producer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSchema {
    /// Schema ID referenced by events.
    pub id: SchemaId,
    /// Event name.
    pub name: String,
    /// Payload class, usually a structure.
    pub payload: FieldClass,
}

impl EventSchema {
    /// Create a schema.
    pub fn new(id: impl Into<SchemaId>, name: impl Into<String>, payload: FieldClass) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            payload,
        }
    }
}

/// Data of one schema tree node.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    /// Member, label or event name.
    pub name: Arc<str>,
    /// Field class type name.
    pub type_name: &'static str,
}

impl SchemaNode {
    /// Create a node label.
    pub fn new(name: impl Into<Arc<str>>, type_name: &'static str) -> Self {
        Self {
            name: name.into(),
            type_name,
        }
    }
}

impl NodeLabel for SchemaNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &str {
        self.type_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_schema_from_yaml() {
        let yaml = r#"
id: 1
name: Foo
payload:
  type: structure
  members:
    - { name: x, class: { type: integer, signed: true } }
    - { name: y, class: { type: integer, signed: true } }
"#;
        let schema: EventSchema = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(schema.id, SchemaId::new(1));
        assert_eq!(
            schema,
            EventSchema::new(
                1,
                "Foo",
                FieldClass::structure([
                    ("x", FieldClass::signed_int()),
                    ("y", FieldClass::signed_int()),
                ]),
            )
        );
    }
}
