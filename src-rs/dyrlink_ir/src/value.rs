//! Field values carried by records and resolved devices.

use std::fmt;

use crate::device::{DeviceKey, DeviceRef};

/// A single field value.
///
/// Records supply numbers, strings and short numeric sequences (curve
/// points). Resolution additionally produces device references, from find
/// relations, and the explicit absent value, from allow-absent relations and
/// nullifying transforms.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A numeric scalar.
    Number(f64),
    /// A string, such as a machine identifier.
    String(String),
    /// An ordered numeric sequence in which individual points may be unset.
    Sequence(Vec<Option<f64>>),
    /// A reference to a resolved device.
    Device(DeviceRef),
    /// No value.
    Absent,
}

/// The kind of a [`Value`], used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// A numeric scalar.
    Number,
    /// A string.
    String,
    /// A numeric sequence.
    Sequence,
    /// A device reference.
    Device,
    /// The absent value.
    Absent,
}

impl Value {
    /// Creates a sequence value with every point set.
    #[must_use]
    pub fn sequence(points: impl IntoIterator<Item = f64>) -> Self {
        Self::Sequence(points.into_iter().map(Some).collect())
    }

    /// Returns the kind of this value.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Number(_) => ValueKind::Number,
            Self::String(_) => ValueKind::String,
            Self::Sequence(_) => ValueKind::Sequence,
            Self::Device(_) => ValueKind::Device,
            Self::Absent => ValueKind::Absent,
        }
    }

    /// Returns whether this is the absent value.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Returns the device reference if this is a device value.
    #[must_use]
    pub const fn as_device(&self) -> Option<&DeviceRef> {
        match self {
            Self::Device(device) => Some(device),
            Self::Number(_) | Self::String(_) | Self::Sequence(_) | Self::Absent => None,
        }
    }

    /// Compares two values the way predicate clauses compare them.
    ///
    /// Numbers compare numerically. Strings compare numerically when both
    /// parse as numbers and by their trimmed text otherwise. A string compared
    /// with a number matches when it parses to the same number, since machine
    /// identifiers appear as `'1'`, `'01'` and `1` in dynamic data. The absent
    /// value matches nothing, not even itself.
    #[must_use]
    pub fn loosely_equals(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(lhs), Self::Number(rhs)) => lhs == rhs,
            (Self::String(lhs), Self::String(rhs)) => match (parse_number(lhs), parse_number(rhs)) {
                (Some(lhs), Some(rhs)) => lhs == rhs,
                (Some(_) | None, Some(_) | None) => lhs.trim() == rhs.trim(),
            },
            (Self::Number(number), Self::String(string))
            | (Self::String(string), Self::Number(number)) => {
                parse_number(string).is_some_and(|parsed| parsed == *number)
            }
            (Self::Sequence(lhs), Self::Sequence(rhs)) => lhs == rhs,
            (Self::Device(lhs), Self::Device(rhs)) => lhs == rhs,
            (Self::Absent, _) | (_, Self::Absent) => false,
            (
                Self::Number(_) | Self::String(_) | Self::Sequence(_) | Self::Device(_),
                Self::Number(_) | Self::String(_) | Self::Sequence(_) | Self::Device(_),
            ) => false,
        }
    }

    /// Converts this value into the device key it refers to.
    ///
    /// Scalars become single-component keys. Numbers, and strings that parse
    /// as numbers, render in their shortest integral form so that `5`, `5.0`
    /// and `'05'` name the same key. A device reference yields the referenced
    /// key. Sequences and the absent value cannot be keys.
    #[must_use]
    pub fn to_key(&self) -> Option<DeviceKey> {
        match self {
            Self::Number(number) => Some(DeviceKey::new(format_number(*number))),
            Self::String(string) => Some(DeviceKey::new(
                parse_number(string).map_or_else(|| string.trim().to_string(), format_number),
            )),
            Self::Device(device) => Some(device.key().clone()),
            Self::Sequence(_) | Self::Absent => None,
        }
    }
}

/// Parses a string holding a finite number.
fn parse_number(string: &str) -> Option<f64> {
    string
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Number => "number",
            Self::String => "string",
            Self::Sequence => "sequence",
            Self::Device => "device reference",
            Self::Absent => "absent value",
        };
        f.write_str(kind)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => f.write_str(&format_number(*number)),
            Self::String(string) => write!(f, "'{string}'"),
            Self::Sequence(points) => {
                let points = points
                    .iter()
                    .map(|point| point.map_or_else(|| "-".to_string(), format_number))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "[{points}]")
            }
            Self::Device(device) => write!(f, "{device}"),
            Self::Absent => f.write_str("-"),
        }
    }
}

impl From<f64> for Value {
    fn from(number: f64) -> Self {
        Self::Number(number)
    }
}

impl From<&str> for Value {
    fn from(string: &str) -> Self {
        Self::String(string.to_string())
    }
}

impl From<DeviceRef> for Value {
    fn from(device: DeviceRef) -> Self {
        Self::Device(device)
    }
}

#[expect(
    clippy::float_cmp,
    reason = "integral check on a value that came from user data"
)]
fn format_number(number: f64) -> String {
    if number.is_finite() && number.trunc() == number && number.abs() < 1e15 {
        format!("{number:.0}")
    } else {
        number.to_string()
    }
}
