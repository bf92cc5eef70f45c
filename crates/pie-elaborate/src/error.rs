//! The closed set of ways a program can fail to elaborate. Every variant
//! carries a human-readable payload rather than raw [`pie_core::Value`]s -
//! values are read back into core syntax and rendered before they're
//! wrapped up here, so an error can be displayed without re-entering the
//! evaluator.

use std::error::Error;
use std::fmt;

use pie_core::Symbol;

#[derive(Debug, Clone, PartialEq)]
pub enum ElabError {
    /// A name was used that `Γ` doesn't bind.
    Unbound(Symbol),
    /// `define` (or a datatype's own recursive reference) named something
    /// with no preceding `claim`.
    MissingClaim(Symbol),
    /// A name was claimed, defined, or declared as a datatype/constructor
    /// more than once.
    DuplicateName(Symbol),
    /// An expression was used where a type was expected, but `isType`
    /// couldn't classify it as one.
    NotAType(String),
    /// `check` found the expression's own shape incompatible with the
    /// expected type outright (no hope of definitional equality rescuing
    /// it - e.g. a pair literal checked against `Nat`).
    TypeMismatch { expected: String, found: String },
    /// `synth` was asked to synthesize a type for a form that never
    /// synthesizes (i.e. `The` was required but is absent).
    CannotSynth(String),
    /// An eliminator's target had the wrong type-former shape, e.g.
    /// `car` applied to something not of `Sigma` type.
    ShapeMismatch { expected: &'static str, found: String },
    /// A constructor or datatype application had the wrong number of
    /// arguments for its declaration.
    ArityError { name: Symbol, expected: usize, found: usize },
    /// Two values that were expected to be definitionally equal (as
    /// decided by read-back plus alpha-equivalence) were not.
    NotStructurallyEquiv { at_type: String, lhs: String, rhs: String },
    /// Two core terms that were expected to be alpha-equivalent were not
    /// (used for comparing pattern shapes, not value equality).
    NotAlphaEquiv(String),
    /// A `match` pattern does not have the shape its declared scrutinee
    /// type requires.
    PatternIllTyped(String),
    /// A `match`'s arms do not cover every constructor of the scrutinee's
    /// datatype.
    NonExhaustiveMatch(Symbol),
    /// A `match` successfully elaborated, but reducing it at run time got
    /// stuck on a neutral target with no applicable arm recorded for the
    /// shape it might eventually take.
    StuckMatch,
    /// A `data` declaration's own telescopes or constructor result indices
    /// are themselves ill-typed.
    DatatypeIllFormed(String),
}

impl fmt::Display for ElabError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElabError::Unbound(name) => write!(f, "unbound name: {}", name),
            ElabError::MissingClaim(name) => write!(f, "{} has no claim in scope", name),
            ElabError::DuplicateName(name) => write!(f, "{} is already bound", name),
            ElabError::NotAType(found) => write!(f, "not a type: {}", found),
            ElabError::TypeMismatch { expected, found } => {
                write!(f, "type mismatch: expected {}, found an expression of shape {}", expected, found)
            },
            ElabError::CannotSynth(found) => write!(f, "cannot synthesize a type for: {}", found),
            ElabError::ShapeMismatch { expected, found } => {
                write!(f, "expected a {} type, found {}", expected, found)
            },
            ElabError::ArityError { name, expected, found } => {
                write!(f, "{} expects {} arguments, found {}", name, expected, found)
            },
            ElabError::NotStructurallyEquiv { at_type, lhs, rhs } => {
                write!(f, "{} and {} are not the same {}", lhs, rhs, at_type)
            },
            ElabError::NotAlphaEquiv(found) => write!(f, "not alpha-equivalent: {}", found),
            ElabError::PatternIllTyped(found) => write!(f, "ill-typed pattern: {}", found),
            ElabError::NonExhaustiveMatch(name) => write!(f, "match does not cover every constructor of {}", name),
            ElabError::StuckMatch => write!(f, "match got stuck on a neutral scrutinee"),
            ElabError::DatatypeIllFormed(found) => write!(f, "ill-formed datatype declaration: {}", found),
        }
    }
}

impl Error for ElabError {}

impl From<pie_core::CoreError> for ElabError {
    fn from(src: pie_core::CoreError) -> ElabError {
        match src {
            pie_core::CoreError::Unbound(name) => ElabError::Unbound(name),
            pie_core::CoreError::IllTyped(where_) => ElabError::DatatypeIllFormed(where_.to_string()),
            pie_core::CoreError::StuckMatch => ElabError::StuckMatch,
        }
    }
}

impl From<pie_core::PatternError> for ElabError {
    fn from(src: pie_core::PatternError) -> ElabError {
        ElabError::PatternIllTyped(src.to_string())
    }
}
