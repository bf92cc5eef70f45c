//! The surface expression language: what a user (or, in this kernel's case,
//! a driver calling in from outside) writes down before elaboration turns
//! it into core syntax.
//!
//! Surface expressions carry no type information of their own - that's the
//! elaborator's job. `Pattern` is reused verbatim from `pie_core` rather
//! than duplicated here: surface and core patterns have exactly the same
//! shape, and elaborating a `match` arm only ever rewrites its body, never
//! its pattern.

use std::rc::Rc;

use pie_core::{Pattern, Symbol};

#[derive(Debug, Clone, PartialEq)]
pub struct RcExpr(pub Rc<Expr>);

impl From<Expr> for RcExpr {
    fn from(src: Expr) -> RcExpr {
        RcExpr(Rc::new(src))
    }
}

impl std::ops::Deref for RcExpr {
    type Target = Expr;

    fn deref(&self) -> &Expr {
        &self.0
    }
}

impl RcExpr {
    pub fn as_ref(&self) -> &Expr {
        &self.0
    }
}

/// A single `match` arm in the surface syntax: `(pattern body)`.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceArm {
    pub pattern: Pattern,
    pub body: RcExpr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Var(Symbol),
    /// `(the ty e)`, the type ascription that seeds bidirectional checking
    /// whenever a type can't otherwise be synthesized.
    The(RcExpr, RcExpr),

    U,
    Atom,
    Tick(Symbol),

    Arrow(Vec<RcExpr>, RcExpr),
    Pi(Vec<(Symbol, RcExpr)>, RcExpr),
    Lambda(Vec<Symbol>, RcExpr),
    App(RcExpr, Vec<RcExpr>),

    Pair(RcExpr, RcExpr),
    Sigma(Vec<(Symbol, RcExpr)>, RcExpr),
    Cons(RcExpr, RcExpr),
    Car(RcExpr),
    Cdr(RcExpr),

    Nat,
    Zero,
    Add1(RcExpr),
    /// An unelaborated Nat literal, e.g. `4`. Elaborates to nested `add1`s.
    NatLit(u64),
    WhichNat(RcExpr, RcExpr, RcExpr),
    IterNat(RcExpr, RcExpr, RcExpr),
    RecNat(RcExpr, RcExpr, RcExpr),
    IndNat(RcExpr, RcExpr, RcExpr, RcExpr),

    List(RcExpr),
    Nil,
    ListCons(RcExpr, RcExpr),
    RecList(RcExpr, RcExpr, RcExpr),
    IndList(RcExpr, RcExpr, RcExpr, RcExpr),

    Vec(RcExpr, RcExpr),
    VecNil,
    VecCons(RcExpr, RcExpr),
    Head(RcExpr),
    Tail(RcExpr),
    IndVec(RcExpr, RcExpr, RcExpr, RcExpr, RcExpr),

    Equal(RcExpr, RcExpr, RcExpr),
    Same(RcExpr),
    Symm(RcExpr),
    Cong(RcExpr, RcExpr),
    Replace(RcExpr, RcExpr, RcExpr),
    Trans(RcExpr, RcExpr),
    IndEqual(RcExpr, RcExpr, RcExpr),

    Either(RcExpr, RcExpr),
    Left(RcExpr),
    Right(RcExpr),
    IndEither(RcExpr, RcExpr, RcExpr, RcExpr),

    Trivial,
    Sole,
    Absurd,
    IndAbsurd(RcExpr, RcExpr),

    /// Applying a datatype or constructor name to arguments surfaces
    /// identically to ordinary application; the elaborator decides which
    /// one it is by looking the head name up in `Σ`.
    Match(RcExpr, Vec<SurfaceArm>),
}
