use std::error::Error;
use std::fmt;

use crate::ident::Symbol;

/// Errors that can arise while running the evaluator or read-back.
///
/// These are *not* part of the user-facing error taxonomy: a well-typed core
/// term, evaluated in a well-formed environment, never produces one of these.
/// Seeing one means the checker let an ill-formed core term through, which is
/// a bug in the elaborator rather than a mistake in the user's program.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A variable was looked up in an environment that does not bind it.
    Unbound(Symbol),
    /// An eliminator was applied to a value whose head shape doesn't match
    /// any of the cases the eliminator's evaluation rule understands.
    IllTyped(&'static str),
    /// A `match` reduced its scrutinee down to a canonical value that none of
    /// its arms admit. Unlike `IllTyped`, this is not necessarily an
    /// elaborator bug: coverage checking only looks at the scrutinee's
    /// declared datatype, so a match can pass coverage and still get stuck
    /// reducing a particular index-narrowed canonical form at run time.
    StuckMatch,
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::Unbound(name) => write!(f, "unbound variable during evaluation: {}", name),
            CoreError::IllTyped(where_) => {
                write!(f, "ill-typed core term (internal bug) in {}", where_)
            },
            CoreError::StuckMatch => write!(f, "match got stuck: no arm admits the scrutinee's reduced form"),
        }
    }
}

impl Error for CoreError {}
