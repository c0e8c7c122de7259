//! Schema walker: builds the tree subtree of an event schema and routes
//! payload values to its nodes.
//!
//! Walking a [`FieldClass`] opens one tree node per class and returns a
//! [`Binding`] that mirrors the subtree. At event time the binding first
//! checks the payload shape, then records each value into the live state of
//! its node.

use evlens_core::error::Result;
use evlens_core::schema::{EnumMapping, FieldClass, FieldValue, Fields, SchemaNode};
use evlens_core::table::Scalar;
use evlens_core::tree::{FlatTree, LiveValue};
use evlens_core::types::NodeHandle;
use std::collections::HashSet;
use std::sync::Arc;

/// Type name of enumeration label nodes.
const LABEL_TYPE: &str = "Mapping";

/// Name of the element template node of a dynamic array.
const TEMPLATE_NAME: &str = "[]";

/// Name of the inner node of an option.
const OPTION_INNER_NAME: &str = "value";

/// Stands in for an optional member left out of a structure payload.
static ABSENT: FieldValue = FieldValue::Absent;

/// A payload value that contradicts its schema.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Mismatch {
    /// Path segments, innermost first.
    segments: Vec<String>,
    /// What was expected versus found.
    pub(crate) cause: String,
}

impl Mismatch {
    fn new(cause: impl Into<String>) -> Self {
        Self {
            segments: Vec::new(),
            cause: cause.into(),
        }
    }

    fn expected(what: &str, found: &FieldValue) -> Self {
        Self::new(format!("expected {what}, found {}", found.kind()))
    }

    fn within(mut self, segment: String) -> Self {
        self.segments.push(segment);
        self
    }

    /// Location of the offending value, e.g. `$.frame.data[3]`.
    pub(crate) fn path(&self) -> String {
        let mut path = String::from("$");
        for segment in self.segments.iter().rev() {
            if !segment.starts_with('[') {
                path.push('.');
            }
            path.push_str(segment);
        }
        path
    }
}

type CheckResult = std::result::Result<(), Mismatch>;

/// Scalar field kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScalarKind {
    Bool,
    Bits { length: u32 },
    Integer { signed: bool },
    Real,
    String,
}

impl ScalarKind {
    fn check(self, value: &FieldValue) -> CheckResult {
        match (self, value) {
            (Self::Bool, FieldValue::Bool(_)) => Ok(()),
            (Self::Bool, other) => Err(Mismatch::expected("bool", other)),
            (Self::Bits { length }, value) => {
                let raw = value
                    .as_integer()
                    .ok_or_else(|| Mismatch::expected("bit array", value))?;
                let limit = 1i128 << length.min(64);
                if raw < 0 || raw >= limit {
                    return Err(Mismatch::new(format!(
                        "value {raw} does not fit in {length} bits"
                    )));
                }
                Ok(())
            }
            (Self::Integer { signed }, value) => check_integer(signed, value),
            (Self::Real, FieldValue::Real(_) | FieldValue::Int(_) | FieldValue::UInt(_)) => Ok(()),
            (Self::Real, other) => Err(Mismatch::expected("real", other)),
            (Self::String, FieldValue::String(_)) => Ok(()),
            (Self::String, other) => Err(Mismatch::expected("string", other)),
        }
    }

    fn to_scalar(self, value: &FieldValue) -> Option<Scalar> {
        Some(match (self, value) {
            (Self::Bool, FieldValue::Bool(v)) => Scalar::Bool(*v),
            (Self::Bits { .. }, value) => Scalar::Bits(u64::try_from(value.as_integer()?).ok()?),
            (Self::Integer { signed }, value) => integer_scalar(signed, value)?,
            (Self::Real, FieldValue::Real(v)) => Scalar::Real(*v),
            (Self::Real, FieldValue::Int(v)) => Scalar::Real(*v as f64),
            (Self::Real, FieldValue::UInt(v)) => Scalar::Real(*v as f64),
            (Self::String, FieldValue::String(v)) => Scalar::from(v.as_str()),
            _ => return None,
        })
    }
}

fn check_integer(signed: bool, value: &FieldValue) -> CheckResult {
    let raw = value
        .as_integer()
        .ok_or_else(|| Mismatch::expected("integer", value))?;
    let in_range = if signed {
        i64::try_from(raw).is_ok()
    } else {
        u64::try_from(raw).is_ok()
    };
    if !in_range {
        let kind = if signed { "signed" } else { "unsigned" };
        return Err(Mismatch::new(format!("value {raw} out of {kind} 64-bit range")));
    }
    Ok(())
}

fn integer_scalar(signed: bool, value: &FieldValue) -> Option<Scalar> {
    let raw = value.as_integer()?;
    Some(if signed {
        Scalar::Int(i64::try_from(raw).ok()?)
    } else {
        Scalar::UInt(u64::try_from(raw).ok()?)
    })
}

/// One enumeration label node.
#[derive(Debug, Clone)]
pub(crate) struct LabelBinding {
    node: NodeHandle,
    label: Arc<str>,
    mapping: EnumMapping,
}

/// Payload router for one schema subtree.
///
/// Mirrors the field class it was built from; every variant knows the tree
/// node it writes to.
#[derive(Debug, Clone)]
pub(crate) enum Binding {
    /// Leaf holding the last scalar.
    Scalar {
        /// Tree node.
        node: NodeHandle,
        /// Scalar kind.
        kind: ScalarKind,
    },
    /// Enumeration with one child per label.
    Enumeration {
        /// Tree node.
        node: NodeHandle,
        /// Signed or unsigned raw value.
        signed: bool,
        /// Label children.
        labels: Vec<LabelBinding>,
    },
    /// Static array with one child per element.
    StaticArray {
        /// Tree node.
        node: NodeHandle,
        /// Element children.
        elements: Vec<Binding>,
    },
    /// Dynamic array with a single element template child.
    DynamicArray {
        /// Tree node.
        node: NodeHandle,
        /// Template child every element is applied through.
        element: Box<Binding>,
    },
    /// Structure with one child per member.
    Structure {
        /// Tree node.
        node: NodeHandle,
        /// Member names and children, in declaration order.
        members: Vec<(String, Binding)>,
    },
    /// Option with one inner child.
    Option {
        /// Tree node.
        node: NodeHandle,
        /// Inner child.
        inner: Box<Binding>,
    },
    /// Variant with one child per option.
    Variant {
        /// Tree node.
        node: NodeHandle,
        /// Option names and children, in declaration order.
        options: Vec<(Arc<str>, Binding)>,
    },
}

impl Binding {
    /// Append the subtree of `class` under the innermost open node of `tree`.
    pub(crate) fn build(tree: &mut FlatTree<SchemaNode>, name: &str, class: &FieldClass) -> Result<Self> {
        let node = tree.begin_node(SchemaNode::new(name, class.type_name()))?;

        let binding = match class {
            FieldClass::Bool => Self::Scalar {
                node,
                kind: ScalarKind::Bool,
            },
            FieldClass::BitArray { length } => Self::Scalar {
                node,
                kind: ScalarKind::Bits { length: *length },
            },
            FieldClass::Integer { signed } => Self::Scalar {
                node,
                kind: ScalarKind::Integer { signed: *signed },
            },
            FieldClass::Real { .. } => Self::Scalar {
                node,
                kind: ScalarKind::Real,
            },
            FieldClass::String => Self::Scalar {
                node,
                kind: ScalarKind::String,
            },
            FieldClass::Enumeration { signed, mappings } => {
                let mut labels = Vec::with_capacity(mappings.len());
                for mapping in mappings {
                    let label: Arc<str> = Arc::from(mapping.label.as_str());
                    let child = tree.begin_node(SchemaNode::new(Arc::clone(&label), LABEL_TYPE))?;
                    tree.end_node(child)?;
                    labels.push(LabelBinding {
                        node: child,
                        label,
                        mapping: mapping.clone(),
                    });
                }
                Self::Enumeration {
                    node,
                    signed: *signed,
                    labels,
                }
            }
            FieldClass::StaticArray { element, length } => {
                let elements = (0..*length)
                    .map(|i| Self::build(tree, &format!("[{i}]"), element))
                    .collect::<Result<Vec<_>>>()?;
                Self::StaticArray { node, elements }
            }
            FieldClass::DynamicArray { element } => Self::DynamicArray {
                node,
                element: Box::new(Self::build(tree, TEMPLATE_NAME, element)?),
            },
            FieldClass::Structure { members } => {
                let members = members
                    .iter()
                    .map(|m| -> Result<(String, Self)> {
                        Ok((m.name.clone(), Self::build(tree, &m.name, &m.class)?))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Self::Structure { node, members }
            }
            FieldClass::Option { inner } => Self::Option {
                node,
                inner: Box::new(Self::build(tree, OPTION_INNER_NAME, inner)?),
            },
            FieldClass::Variant { options } => {
                let options = options
                    .iter()
                    .map(|o| -> Result<(Arc<str>, Self)> {
                        Ok((Arc::from(o.name.as_str()), Self::build(tree, &o.name, &o.class)?))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Self::Variant { node, options }
            }
        };

        tree.end_node(node)?;
        Ok(binding)
    }

    /// Tree node of this binding.
    pub(crate) fn node(&self) -> NodeHandle {
        match self {
            Self::Scalar { node, .. }
            | Self::Enumeration { node, .. }
            | Self::StaticArray { node, .. }
            | Self::DynamicArray { node, .. }
            | Self::Structure { node, .. }
            | Self::Option { node, .. }
            | Self::Variant { node, .. } => *node,
        }
    }

    /// Check that `value` has the shape this binding was built for.
    pub(crate) fn check(&self, value: &FieldValue) -> std::result::Result<(), Mismatch> {
        match self {
            Self::Scalar { kind, .. } => kind.check(value),
            Self::Enumeration { signed, .. } => check_integer(*signed, value),
            Self::StaticArray { elements, .. } => {
                let FieldValue::Array(items) = value else {
                    return Err(Mismatch::expected("array", value));
                };
                if items.len() != elements.len() {
                    return Err(Mismatch::new(format!(
                        "expected {} elements, found {}",
                        elements.len(),
                        items.len()
                    )));
                }
                for (i, (element, item)) in elements.iter().zip(items).enumerate() {
                    element.check(item).map_err(|m| m.within(format!("[{i}]")))?;
                }
                Ok(())
            }
            Self::DynamicArray { element, .. } => {
                let FieldValue::Array(items) = value else {
                    return Err(Mismatch::expected("array", value));
                };
                for (i, item) in items.iter().enumerate() {
                    element.check(item).map_err(|m| m.within(format!("[{i}]")))?;
                }
                Ok(())
            }
            Self::Structure { members, .. } => {
                let FieldValue::Structure(fields) = value else {
                    return Err(Mismatch::expected("structure", value));
                };
                let mut seen = HashSet::with_capacity(fields.len());
                if let Some((repeated, _)) = fields.iter().find(|(name, _)| !seen.insert(*name)) {
                    return Err(Mismatch::new("member given more than once").within(repeated.to_string()));
                }
                for (name, member) in members {
                    let field = member
                        .member_value(fields, name)
                        .ok_or_else(|| Mismatch::new(format!("missing member '{name}'")))?;
                    member.check(field).map_err(|m| m.within(name.clone()))?;
                }
                if let Some((extra, _)) = fields
                    .iter()
                    .find(|(name, _)| !members.iter().any(|(m, _)| m.as_str() == *name))
                {
                    return Err(Mismatch::new(format!("unexpected member '{extra}'")));
                }
                Ok(())
            }
            Self::Option { inner, .. } => match value {
                FieldValue::Absent => Ok(()),
                present => inner
                    .check(present)
                    .map_err(|m| m.within(OPTION_INNER_NAME.to_string())),
            },
            Self::Variant { options, .. } => {
                let (name, inner) = selected(value)
                    .ok_or_else(|| Mismatch::expected("single-entry variant selection", value))?;
                let (_, option) = options
                    .iter()
                    .find(|(option, _)| &**option == name)
                    .ok_or_else(|| Mismatch::new(format!("unknown variant option '{name}'")))?;
                option.check(inner).map_err(|m| m.within(name.to_string()))
            }
        }
    }

    /// Value of structure member `name`. Optional members may be left out.
    fn member_value<'a>(&self, fields: &'a Fields, name: &str) -> Option<&'a FieldValue> {
        match (fields.get(name), self) {
            (Some(field), _) => Some(field),
            (None, Self::Option { .. }) => Some(&ABSENT),
            (None, _) => None,
        }
    }

    /// Record `value` into the live state of this subtree.
    ///
    /// Expects a value that passed [`check`](Self::check); parts that do not
    /// fit are skipped.
    pub(crate) fn apply(&self, tree: &FlatTree<SchemaNode>, value: &FieldValue) -> Result<()> {
        match self {
            Self::Scalar { node, kind } => {
                if let Some(scalar) = kind.to_scalar(value) {
                    tree.update_state(*node, |state| state.record(LiveValue::Scalar(scalar)))?;
                }
            }
            Self::Enumeration {
                node,
                signed,
                labels,
            } => {
                let Some(raw) = integer_scalar(*signed, value) else {
                    return Ok(());
                };
                let wide = value.as_integer().unwrap_or_default();
                let mut matching = Vec::new();
                for label in labels.iter().filter(|l| l.mapping.contains(wide)) {
                    tree.update_state(label.node, |state| state.bump())?;
                    matching.push(Arc::clone(&label.label));
                }
                tree.update_state(*node, |state| {
                    state.record(LiveValue::Enum {
                        raw,
                        labels: matching,
                    })
                })?;
            }
            Self::StaticArray { node, elements } => {
                let FieldValue::Array(items) = value else {
                    return Ok(());
                };
                tree.update_state(*node, |state| state.record(LiveValue::Length(items.len())))?;
                for (element, item) in elements.iter().zip(items) {
                    element.apply(tree, item)?;
                }
            }
            Self::DynamicArray { node, element } => {
                let FieldValue::Array(items) = value else {
                    return Ok(());
                };
                tree.update_state(*node, |state| state.record(LiveValue::Length(items.len())))?;
                for item in items {
                    element.apply(tree, item)?;
                }
            }
            Self::Structure { node, members } => {
                let FieldValue::Structure(fields) = value else {
                    return Ok(());
                };
                tree.update_state(*node, |state| state.bump())?;
                for (name, member) in members {
                    if let Some(field) = member.member_value(fields, name) {
                        member.apply(tree, field)?;
                    }
                }
            }
            Self::Option { node, inner } => {
                let present = !matches!(value, FieldValue::Absent);
                tree.update_state(*node, |state| state.record(LiveValue::Present(present)))?;
                if present {
                    inner.apply(tree, value)?;
                }
            }
            Self::Variant { node, options } => {
                let Some((name, inner)) = selected(value) else {
                    return Ok(());
                };
                let Some((rank, (option_name, option))) = options
                    .iter()
                    .enumerate()
                    .find(|(_, (option, _))| &**option == name)
                else {
                    return Ok(());
                };
                tree.update_state(*node, |state| {
                    state.record(LiveValue::Selected {
                        rank,
                        name: Arc::clone(option_name),
                    })
                })?;
                option.apply(tree, inner)?;
            }
        }
        Ok(())
    }
}

/// The `(option, value)` pair of a variant selection.
fn selected(value: &FieldValue) -> Option<(&str, &FieldValue)> {
    match value {
        FieldValue::Structure(fields) if fields.len() == 1 => fields.iter().next(),
        _ => None,
    }
}
