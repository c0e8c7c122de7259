//! Live per-node state shown in the tree's "Count" and "Last Value" columns.

use crate::table::Scalar;
use std::fmt;
use std::sync::Arc;

/// The latest value recorded for a schema node.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LiveValue {
    /// Nothing received yet.
    #[default]
    Empty,
    /// A scalar field value.
    Scalar(Scalar),
    /// An enumeration value and the labels whose ranges contain it.
    Enum {
        /// Raw integer value.
        raw: Scalar,
        /// Matching mapping labels, in declaration order.
        labels: Vec<Arc<str>>,
    },
    /// Observed length of a dynamic array.
    Length(usize),
    /// The option of a variant that was selected.
    Selected {
        /// Rank of the selected option among the variant's children.
        rank: usize,
        /// Name of the selected option.
        name: Arc<str>,
    },
    /// Whether an optional field carried a value.
    Present(bool),
}

impl fmt::Display for LiveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Scalar(value) => write!(f, "{value}"),
            Self::Enum { raw, labels } if labels.is_empty() => write!(f, "{raw}"),
            Self::Enum { raw, labels } => {
                write!(f, "{raw} (")?;
                for (i, label) in labels.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str(label)?;
                }
                f.write_str(")")
            }
            Self::Length(len) => write!(f, "[{len}]"),
            Self::Selected { rank, name } => write!(f, "{name} (#{rank})"),
            Self::Present(true) => f.write_str("present"),
            Self::Present(false) => f.write_str("absent"),
        }
    }
}

/// Live state of one tree node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeState {
    /// How many values this node has received.
    pub count: u64,
    /// The last value received.
    pub value: LiveValue,
}

impl NodeState {
    /// Record a new value and count it.
    pub fn record(&mut self, value: LiveValue) {
        self.count += 1;
        self.value = value;
    }

    /// Count a hit without changing the value.
    pub fn bump(&mut self) {
        self.count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_counts_and_replaces() {
        let mut state = NodeState::default();
        state.record(LiveValue::Scalar(Scalar::Int(1)));
        state.record(LiveValue::Scalar(Scalar::Int(2)));
        state.bump();

        assert_eq!(state.count, 3);
        assert_eq!(state.value, LiveValue::Scalar(Scalar::Int(2)));
    }

    #[test]
    fn display() {
        assert_eq!(LiveValue::Empty.to_string(), "");
        assert_eq!(
            LiveValue::Enum {
                raw: Scalar::UInt(2),
                labels: vec![Arc::from("RUNNING"), Arc::from("ACTIVE")],
            }
            .to_string(),
            "2 (RUNNING, ACTIVE)"
        );
        assert_eq!(
            LiveValue::Enum {
                raw: Scalar::Int(-1),
                labels: Vec::new(),
            }
            .to_string(),
            "-1"
        );
        assert_eq!(LiveValue::Length(4).to_string(), "[4]");
        assert_eq!(
            LiveValue::Selected {
                rank: 1,
                name: Arc::from("ext"),
            }
            .to_string(),
            "ext (#1)"
        );
        assert_eq!(LiveValue::Present(false).to_string(), "absent");
    }
}
