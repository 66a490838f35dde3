//! The transform sub-language.
//!
//! Output rules may post-process their source value with a small expression
//! in the single variable `x`. The accepted shapes are deliberately few:
//!
//! | text | operator |
//! |---|---|
//! | `x` | [`Transform::Identity`] |
//! | `x * k`, `k * x`, `x / k`, `-x` | [`Transform::ScaleBy`] |
//! | `x + k`, `x - k` | [`Transform::Offset`] |
//! | `1 / x` | [`Transform::Reciprocal`] |
//! | `nullify_zero(x)` | [`Transform::NullifyZero`] |
//!
//! Expressions are parsed once, when a rule set is registered. Anything else
//! is rejected with a [`TransformError`].

use std::fmt;

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, multispace0, one_of},
    combinator::{all_consuming, map, opt, value},
    error::Error as NomError,
    number::complete::double,
    sequence::delimited,
};

use dyrlink_ir::{Value, ValueKind};
use dyrlink_shared::error::{AsDyrlinkError, Context};

/// A transform operator applied to an output value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Transform {
    /// Returns the value unchanged.
    #[default]
    Identity,
    /// Multiplies by a constant.
    ScaleBy(f64),
    /// Adds a constant.
    Offset(f64),
    /// Takes the reciprocal.
    Reciprocal,
    /// Replaces zero with the absent value.
    NullifyZero,
}

impl Transform {
    /// Parses a transform expression.
    ///
    /// # Errors
    ///
    /// Returns a `TransformError` if the text is not one of the accepted
    /// expression shapes.
    pub fn parse(text: &str) -> Result<Self, TransformError> {
        let (_, shape) = all_consuming(shape).parse(text).map_err(|error| {
            let remaining = match &error {
                nom::Err::Error(error) | nom::Err::Failure(error) => error.input,
                nom::Err::Incomplete(_) => "",
            };
            TransformError::syntax(text, text.len() - remaining.len())
        })?;

        Self::from_shape(text, shape)
    }

    fn from_shape(text: &str, shape: Shape<'_>) -> Result<Self, TransformError> {
        match shape {
            Shape::Variable => Ok(Self::Identity),
            Shape::Negated => Ok(Self::ScaleBy(-1.0)),
            Shape::VariableOp('*', constant) | Shape::ConstantOp(constant, '*') => {
                Ok(Self::ScaleBy(constant))
            }
            Shape::VariableOp('/', constant) if constant == 0.0 => {
                Err(TransformError::unsupported(text, "division by zero"))
            }
            Shape::VariableOp('/', constant) => Ok(Self::ScaleBy(constant.recip())),
            Shape::VariableOp('+', constant) => Ok(Self::Offset(constant)),
            Shape::VariableOp('-', constant) => Ok(Self::Offset(-constant)),
            Shape::ConstantOp(constant, '/') if constant == 1.0 => Ok(Self::Reciprocal),
            Shape::ConstantOp(_, _) => Err(TransformError::unsupported(
                text,
                "only `k * x` and `1 / x` may have the constant on the left",
            )),
            Shape::Call(name) if name == "nullify_zero" => Ok(Self::NullifyZero),
            Shape::Call(name) => Err(TransformError::unknown_function(text, name)),
            Shape::VariableOp(op, _) => Err(TransformError::unsupported(
                text,
                format!("unexpected operator `{op}`"),
            )),
        }
    }

    /// Applies the transform to a value.
    ///
    /// The absent value passes through every transform unchanged. Scalar
    /// operators apply elementwise to sequences, leaving unset points unset.
    ///
    /// # Errors
    ///
    /// Returns a `TransformError` if a non-identity transform is applied to
    /// a string or device reference, or if `Reciprocal` meets a zero.
    pub fn apply(self, input: Value) -> Result<Value, TransformError> {
        match (self, input) {
            (Self::Identity, input) => Ok(input),
            (_, Value::Absent) => Ok(Value::Absent),
            (Self::NullifyZero, Value::Number(number)) => Ok(if number == 0.0 {
                Value::Absent
            } else {
                Value::Number(number)
            }),
            (Self::NullifyZero, Value::Sequence(points)) => Ok(Value::Sequence(
                points
                    .into_iter()
                    .map(|point| point.filter(|point| *point != 0.0))
                    .collect(),
            )),
            (_, Value::Number(number)) => self.apply_scalar(number).map(Value::Number),
            (_, Value::Sequence(points)) => points
                .into_iter()
                .map(|point| point.map(|point| self.apply_scalar(point)).transpose())
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Sequence),
            (_, input @ (Value::String(_) | Value::Device(_))) => {
                Err(TransformError::type_mismatch(self, input.kind()))
            }
        }
    }

    fn apply_scalar(self, number: f64) -> Result<f64, TransformError> {
        match self {
            Self::Identity | Self::NullifyZero => Ok(number),
            Self::ScaleBy(factor) => Ok(number * factor),
            Self::Offset(offset) => Ok(number + offset),
            Self::Reciprocal if number == 0.0 => Err(TransformError::division_by_zero(self)),
            Self::Reciprocal => Ok(number.recip()),
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => write!(f, "x"),
            Self::ScaleBy(factor) => write!(f, "x * {factor}"),
            Self::Offset(offset) if *offset < 0.0 => write!(f, "x - {}", -offset),
            Self::Offset(offset) => write!(f, "x + {offset}"),
            Self::Reciprocal => write!(f, "1 / x"),
            Self::NullifyZero => write!(f, "nullify_zero(x)"),
        }
    }
}

/// The syntactic shape of a transform expression, before validation.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Shape<'a> {
    Variable,
    Negated,
    VariableOp(char, f64),
    ConstantOp(f64, char),
    Call(&'a str),
}

type ParseResult<'a, O> = IResult<&'a str, O, NomError<&'a str>>;

fn ws<'a, O, P>(inner: P) -> impl Parser<&'a str, Output = O, Error = NomError<&'a str>>
where
    P: Parser<&'a str, Output = O, Error = NomError<&'a str>>,
{
    delimited(multispace0, inner, multispace0)
}

fn variable(input: &str) -> ParseResult<'_, ()> {
    value((), ws(tag("x"))).parse(input)
}

fn shape(input: &str) -> ParseResult<'_, Shape<'_>> {
    alt((call, constant_op, negated, variable_op)).parse(input)
}

fn call(input: &str) -> ParseResult<'_, Shape<'_>> {
    let identifier = take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_');
    map(
        (ws(identifier), ws(char('(')), variable, ws(char(')'))),
        |(name, _, (), _)| Shape::Call(name),
    )
    .parse(input)
}

fn constant_op(input: &str) -> ParseResult<'_, Shape<'_>> {
    map((ws(double), ws(one_of("*/")), variable), |(constant, op, ())| {
        Shape::ConstantOp(constant, op)
    })
    .parse(input)
}

fn negated(input: &str) -> ParseResult<'_, Shape<'_>> {
    value(Shape::Negated, (ws(char('-')), variable)).parse(input)
}

fn variable_op(input: &str) -> ParseResult<'_, Shape<'_>> {
    map(
        (variable, opt((ws(one_of("*/+-")), ws(double)))),
        |((), op)| match op {
            Some((op, constant)) => Shape::VariableOp(op, constant),
            None => Shape::Variable,
        },
    )
    .parse(input)
}

/// An error raised while parsing or applying a transform.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformError {
    /// The expression could not be parsed.
    Syntax {
        /// The expression text
        text: String,
        /// The byte offset at which parsing stopped
        offset: usize,
    },
    /// The expression calls a function that is not a transform operator.
    UnknownFunction {
        /// The expression text
        text: String,
        /// The name of the function
        name: String,
    },
    /// The expression parses but has no corresponding operator.
    Unsupported {
        /// The expression text
        text: String,
        /// Why the expression is not supported
        reason: String,
    },
    /// The transform cannot be applied to a value of this kind.
    TypeMismatch {
        /// The transform being applied
        transform: Transform,
        /// The kind of the value it was applied to
        kind: ValueKind,
    },
    /// The transform divided by zero.
    DivisionByZero {
        /// The transform being applied
        transform: Transform,
    },
}

impl TransformError {
    /// Creates a new syntax error.
    #[must_use]
    pub fn syntax(text: impl Into<String>, offset: usize) -> Self {
        Self::Syntax {
            text: text.into(),
            offset,
        }
    }

    /// Creates a new unknown function error.
    #[must_use]
    pub fn unknown_function(text: impl Into<String>, name: impl Into<String>) -> Self {
        Self::UnknownFunction {
            text: text.into(),
            name: name.into(),
        }
    }

    /// Creates a new unsupported expression error.
    #[must_use]
    pub fn unsupported(text: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unsupported {
            text: text.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new type mismatch error.
    #[must_use]
    pub const fn type_mismatch(transform: Transform, kind: ValueKind) -> Self {
        Self::TypeMismatch { transform, kind }
    }

    /// Creates a new division by zero error.
    #[must_use]
    pub const fn division_by_zero(transform: Transform) -> Self {
        Self::DivisionByZero { transform }
    }
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax { text, offset } => {
                write!(f, "invalid transform `{text}` at offset {offset}")
            }
            Self::UnknownFunction { text, name } => {
                write!(f, "unknown transform function `{name}` in `{text}`")
            }
            Self::Unsupported { text, reason } => {
                write!(f, "unsupported transform `{text}`: {reason}")
            }
            Self::TypeMismatch { transform, kind } => {
                write!(f, "transform `{transform}` cannot be applied to a {kind}")
            }
            Self::DivisionByZero { transform } => {
                write!(f, "transform `{transform}` divided by zero")
            }
        }
    }
}

impl AsDyrlinkError for TransformError {
    fn message(&self) -> String {
        self.to_string()
    }

    fn context(&self) -> Vec<Context> {
        match self {
            Self::Syntax { .. } | Self::UnknownFunction { .. } | Self::Unsupported { .. } => {
                vec![Context::Help(
                    "supported transforms are `x * k`, `x / k`, `x + k`, `x - k`, `-x`, `1 / x` and `nullify_zero(x)`"
                        .to_string(),
                )]
            }
            Self::TypeMismatch { .. } | Self::DivisionByZero { .. } => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_identity() {
        assert_eq!(Transform::parse("x"), Ok(Transform::Identity));
        assert_eq!(Transform::parse("  x "), Ok(Transform::Identity));
    }

    #[test]
    fn parse_scale() {
        assert_eq!(Transform::parse("x * 2"), Ok(Transform::ScaleBy(2.0)));
        assert_eq!(Transform::parse("2*x"), Ok(Transform::ScaleBy(2.0)));
        assert_eq!(Transform::parse("x / 4"), Ok(Transform::ScaleBy(0.25)));
        assert_eq!(Transform::parse("-x"), Ok(Transform::ScaleBy(-1.0)));
        assert_eq!(Transform::parse("-0.5 * x"), Ok(Transform::ScaleBy(-0.5)));
    }

    #[test]
    fn parse_offset() {
        assert_eq!(Transform::parse("x + 1.5"), Ok(Transform::Offset(1.5)));
        assert_eq!(Transform::parse("x - 1"), Ok(Transform::Offset(-1.0)));
    }

    #[test]
    fn parse_reciprocal_and_nullify() {
        assert_eq!(Transform::parse("1 / x"), Ok(Transform::Reciprocal));
        assert_eq!(
            Transform::parse("nullify_zero( x )"),
            Ok(Transform::NullifyZero)
        );
    }

    #[test]
    fn parse_rejects_other_shapes() {
        assert!(matches!(
            Transform::parse("x ** 2"),
            Err(TransformError::Syntax { .. })
        ));
        assert!(matches!(
            Transform::parse("lambda x: x"),
            Err(TransformError::Syntax { .. })
        ));
        assert!(matches!(
            Transform::parse("y * 2"),
            Err(TransformError::Syntax { .. })
        ));
        assert!(matches!(
            Transform::parse("sqrt(x)"),
            Err(TransformError::UnknownFunction { .. })
        ));
        assert!(matches!(
            Transform::parse("2 / x"),
            Err(TransformError::Unsupported { .. })
        ));
        assert!(matches!(
            Transform::parse("x / 0"),
            Err(TransformError::Unsupported { .. })
        ));
        assert!(matches!(
            Transform::parse(""),
            Err(TransformError::Syntax { .. })
        ));
    }

    #[test]
    fn syntax_error_reports_offset() {
        let error = Transform::parse("x * 2 + 1").expect_err("chained operators are rejected");
        assert_eq!(error, TransformError::syntax("x * 2 + 1", 6));
    }

    #[test]
    fn scale_multiplies_number() {
        let result = Transform::ScaleBy(2.0).apply(Value::Number(3.5));
        assert_eq!(result, Ok(Value::Number(7.0)));
    }

    #[test]
    fn nullify_zero_replaces_sentinels_in_sequence() {
        let input = Value::sequence([0.0, 2.0, 0.0, 4.0]);
        let result = Transform::NullifyZero.apply(input);
        assert_eq!(
            result,
            Ok(Value::Sequence(vec![None, Some(2.0), None, Some(4.0)]))
        );
    }

    #[test]
    fn nullify_zero_on_scalar() {
        assert_eq!(
            Transform::NullifyZero.apply(Value::Number(0.0)),
            Ok(Value::Absent)
        );
        assert_eq!(
            Transform::NullifyZero.apply(Value::Number(3.0)),
            Ok(Value::Number(3.0))
        );
    }

    #[test]
    fn scalar_transforms_apply_elementwise() {
        let input = Value::Sequence(vec![Some(1.0), None, Some(3.0)]);
        let result = Transform::Offset(1.0).apply(input);
        assert_eq!(
            result,
            Ok(Value::Sequence(vec![Some(2.0), None, Some(4.0)]))
        );
    }

    #[test]
    fn absent_passes_through() {
        assert_eq!(
            Transform::Reciprocal.apply(Value::Absent),
            Ok(Value::Absent)
        );
    }

    #[test]
    fn identity_accepts_any_kind() {
        let input = Value::from("1");
        assert_eq!(Transform::Identity.apply(input.clone()), Ok(input));
    }

    #[test]
    fn string_input_is_a_type_mismatch() {
        let result = Transform::ScaleBy(2.0).apply(Value::from("1"));
        assert_eq!(
            result,
            Err(TransformError::type_mismatch(
                Transform::ScaleBy(2.0),
                ValueKind::String
            ))
        );
    }

    #[test]
    fn reciprocal_of_zero_fails() {
        let result = Transform::Reciprocal.apply(Value::Number(0.0));
        assert_eq!(
            result,
            Err(TransformError::division_by_zero(Transform::Reciprocal))
        );
    }

    #[test]
    fn display_round_trips_through_parse() {
        for transform in [
            Transform::Identity,
            Transform::ScaleBy(2.0),
            Transform::Offset(-1.0),
            Transform::Reciprocal,
            Transform::NullifyZero,
        ] {
            assert_eq!(Transform::parse(&transform.to_string()), Ok(transform));
        }
    }
}
