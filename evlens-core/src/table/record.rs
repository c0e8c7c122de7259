//! Fixed-shape records and their scalar cells.

use std::fmt;
use std::sync::Arc;

/// A typed scalar cell of a record.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    UInt(u64),
    /// Floating point number.
    Real(f64),
    /// Text.
    Str(Arc<str>),
    /// Raw bit array, least significant bit first.
    Bits(u64),
}

impl Scalar {
    /// Get a short name of the scalar type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::UInt(_) => "uint",
            Self::Real(_) => "real",
            Self::Str(_) => "string",
            Self::Bits(_) => "bits",
        }
    }

    /// Convert to i64 if the value is integral and fits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::UInt(v) | Self::Bits(v) => i64::try_from(*v).ok(),
            Self::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Real(v) => write!(f, "{v}"),
            Self::Str(v) => f.write_str(v),
            Self::Bits(v) => write!(f, "{v:#x}"),
        }
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u64> for Scalar {
    fn from(v: u64) -> Self {
        Self::UInt(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Self::Str(Arc::from(v))
    }
}

impl From<Arc<str>> for Scalar {
    fn from(v: Arc<str>) -> Self {
        Self::Str(v)
    }
}

/// A fixed-shape tuple of scalar fields.
///
/// The column list is agreed when the table is created and becomes the
/// table's headers.
pub trait Record: Send + Sync + 'static {
    /// Column names, in column order.
    const COLUMNS: &'static [&'static str];

    /// Get the value of column `index`, or `None` past the last column.
    fn column(&self, index: usize) -> Option<Scalar>;
}

/// One row of the event log: clock snapshot, event name and a rendered
/// payload summary.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRow {
    /// Default clock snapshot value of the event.
    pub clock: u64,
    /// Event (schema) name.
    pub name: Arc<str>,
    /// Human-readable payload.
    pub payload: String,
}

impl EventRow {
    /// Create a new event row.
    pub fn new(clock: u64, name: Arc<str>, payload: impl Into<String>) -> Self {
        Self {
            clock,
            name,
            payload: payload.into(),
        }
    }
}

impl Record for EventRow {
    const COLUMNS: &'static [&'static str] = &["Timestamp", "Event", "Payload"];

    fn column(&self, index: usize) -> Option<Scalar> {
        match index {
            0 => Some(Scalar::UInt(self.clock)),
            1 => Some(Scalar::Str(Arc::clone(&self.name))),
            2 => Some(Scalar::from(self.payload.as_str())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_display() {
        assert_eq!(Scalar::Bool(true).to_string(), "true");
        assert_eq!(Scalar::Int(-4).to_string(), "-4");
        assert_eq!(Scalar::Real(1.5).to_string(), "1.5");
        assert_eq!(Scalar::from("can0").to_string(), "can0");
        assert_eq!(Scalar::Bits(255).to_string(), "0xff");
    }

    #[test]
    fn scalar_as_i64() {
        assert_eq!(Scalar::UInt(5).as_i64(), Some(5));
        assert_eq!(Scalar::UInt(u64::MAX).as_i64(), None);
        assert_eq!(Scalar::Real(1.0).as_i64(), None);
    }

    #[test]
    fn event_row_columns() {
        let row = EventRow::new(1234, Arc::from("EngineData"), "{rpm: 3000}");
        assert_eq!(EventRow::COLUMNS.len(), 3);
        assert_eq!(row.column(0), Some(Scalar::UInt(1234)));
        assert_eq!(row.column(1).unwrap().to_string(), "EngineData");
        assert_eq!(row.column(2).unwrap().to_string(), "{rpm: 3000}");
        assert_eq!(row.column(3), None);
    }
}
