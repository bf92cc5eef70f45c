//! Top-level forms: the handful of things a program is a sequence of.
//! There is no file format and no parser here - a driver builds these
//! directly - but the shape mirrors what a textual Pie program's toplevel
//! forms would be.

use pie_core::Symbol;

use crate::expr::RcExpr;

/// One constructor clause of a `data` declaration: `(NAME (NAME expr)*
/// (DNAME expr*))`, where `DNAME` names the datatype the constructor belongs
/// to and must match the enclosing `data` form's own name.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceConstructor {
    pub name: Symbol,
    pub args: Vec<(Symbol, RcExpr)>,
    /// The `DNAME` the constructor's result type names. Elaboration rejects
    /// the declaration if this isn't the owning datatype's own name.
    pub result_type_name: Symbol,
    /// The index values this constructor's result type instantiates the
    /// datatype's index telescope with.
    pub result_indices: Vec<RcExpr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Toplevel {
    /// `(claim name ty)`: declares `name`'s type without giving a value.
    Claim(Symbol, RcExpr),
    /// `(define name e)`: gives the value for a name already claimed.
    Define(Symbol, RcExpr),
    /// `(data Name (params...) (indices...) (constructors...))`.
    Data {
        name: Symbol,
        params: Vec<(Symbol, RcExpr)>,
        indices: Vec<(Symbol, RcExpr)>,
        constructors: Vec<SurfaceConstructor>,
    },
    /// `(check-same ty lhs rhs)`: asserts `lhs` and `rhs` are definitionally
    /// equal at type `ty`, the closest thing this kernel has to a toplevel
    /// "run the checker and report" command.
    CheckSame { ty: RcExpr, lhs: RcExpr, rhs: RcExpr },
}
