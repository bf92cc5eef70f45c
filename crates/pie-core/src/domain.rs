//! The semantic domain.
//!
//! Values are what core terms evaluate to. They are either *canonical*
//! (headed by a type or value former) or *neutral* (stuck on a variable or
//! some other unresolvable elimination).

use std::fmt;
use std::rc::Rc;

use crate::context::Rho;
use crate::core::RcCore;
use crate::data::RcDataDecl;
use crate::error::CoreError;
use crate::ident::Symbol;
use crate::pattern::Arm;

/// A closure pairs a core term with the environment it should be evaluated
/// in once its bound variable is supplied. Cloning a closure is cheap: the
/// environment is a persistent `im::Vector` and the term is reference
/// counted.
///
/// `Const` and `Native` are closures with no corresponding surface binder:
/// `Const` ignores its argument outright, and `Native` computes its result
/// directly from Rust values instead of evaluating a core body. The
/// evaluator reaches for these only when it has to annotate the neutral form
/// of a dependent eliminator (`ind-Nat`, `ind-List`, `ind-Vec`, `ind-Either`)
/// with a motive-derived type that was never written down as surface syntax,
/// so there is no core term to close over.
#[derive(Clone)]
pub enum Closure {
    Core { var: Symbol, body: RcCore, rho: Rho },
    Const(RcValue),
    Native(Rc<dyn Fn(RcValue) -> Result<RcValue, CoreError>>),
}

impl Closure {
    pub fn new(var: Symbol, body: RcCore, rho: Rho) -> Closure {
        Closure::Core { var, body, rho }
    }

    pub fn constant(value: RcValue) -> Closure {
        Closure::Const(value)
    }

    pub fn native(f: impl Fn(RcValue) -> Result<RcValue, CoreError> + 'static) -> Closure {
        Closure::Native(Rc::new(f))
    }

    /// Evaluate the closure's body under its captured environment, extended
    /// by binding the closure's variable to `arg`.
    pub fn instantiate(&self, arg: RcValue) -> Result<RcValue, CoreError> {
        match self {
            Closure::Core { var, body, rho } => {
                let rho = rho.extend(var.clone(), arg);
                body.eval(&rho)
            },
            Closure::Const(value) => Ok(value.clone()),
            Closure::Native(f) => f(arg),
        }
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Closure::Core { var, body, .. } => {
                write!(f, "Closure::Core({:?}, {:?})", var, body)
            },
            Closure::Const(value) => write!(f, "Closure::Const({:?})", value),
            Closure::Native(_) => write!(f, "Closure::Native(..)"),
        }
    }
}

impl PartialEq for Closure {
    fn eq(&self, other: &Closure) -> bool {
        match (self, other) {
            (
                Closure::Core { var: v1, body: b1, rho: r1 },
                Closure::Core { var: v2, body: b2, rho: r2 },
            ) => v1 == v2 && b1 == b2 && r1 == r2,
            (Closure::Const(a), Closure::Const(b)) => a == b,
            (Closure::Native(a), Closure::Native(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RcValue(pub Rc<Value>);

impl From<Value> for RcValue {
    fn from(src: Value) -> RcValue {
        RcValue(Rc::new(src))
    }
}

impl std::ops::Deref for RcValue {
    type Target = Value;

    fn deref(&self) -> &Value {
        &self.0
    }
}

impl RcValue {
    pub fn as_ref(&self) -> &Value {
        &self.0
    }

    /// Construct the neutral value standing for a free/bound variable of the
    /// given type - this is how claims, lambda parameters, and pattern
    /// variables are represented symbolically during elaboration.
    pub fn var(name: Symbol, ty: impl Into<RcType>) -> RcValue {
        RcValue::from(Value::Neutral(
            RcNeutral::from(Neutral::Var(name)),
            ty.into(),
        ))
    }
}

/// Alias used where a value is known to classify another value.
pub type Type = Value;
pub type RcType = RcValue;

/// A value paired with the type it was read back at - sufficient to drive
/// type-directed (eta-expanding) read-back unambiguously.
#[derive(Debug, Clone, PartialEq)]
pub struct Normal {
    pub value: RcValue,
    pub ty: RcType,
}

impl Normal {
    pub fn new(value: RcValue, ty: RcType) -> Normal {
        Normal { value, ty }
    }
}

/// Values in weak-head normal form: either a neutral (stuck) computation, or
/// a value headed by a type former or introduction rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A stuck computation, annotated with the type it would have if it
    /// could reduce further (invariant I1).
    Neutral(RcNeutral, RcType),

    // -- type formers --------------------------------------------------
    Universe,
    Atom,
    Nat,
    Trivial,
    Absurd,
    List(RcValue),
    Vec(RcValue, RcValue),
    Sigma(Symbol, RcValue, Closure),
    Pi(Symbol, RcValue, Closure),
    Either(RcValue, RcValue),
    Equal(RcValue, RcValue, RcValue),
    Datatype(RcDataDecl, Vec<RcValue>, Vec<RcValue>),

    // -- introduction forms ----------------------------------------------
    Zero,
    Add1(RcValue),
    Nil,
    ListCons(RcValue, RcValue),
    VecNil,
    VecCons(RcValue, RcValue),
    Same(RcValue),
    Inl(RcValue),
    Inr(RcValue),
    Tick(Symbol),
    Sole,
    Lambda(Symbol, Closure),
    Cons(RcValue, RcValue),
    /// A user datatype constructor applied to its arguments, tagged with the
    /// owning datatype and the parameter values it was built at.
    Constr(Symbol, Vec<RcValue>, RcDataDecl, Vec<RcValue>),
}

impl Value {
    pub fn var(name: Symbol, ty: impl Into<RcType>) -> Value {
        Value::Neutral(RcNeutral::from(Neutral::Var(name)), ty.into())
    }

    pub fn is_type_former(&self) -> bool {
        matches!(
            self,
            Value::Universe
                | Value::Atom
                | Value::Nat
                | Value::Trivial
                | Value::Absurd
                | Value::List(_)
                | Value::Vec(_, _)
                | Value::Sigma(_, _, _)
                | Value::Pi(_, _, _)
                | Value::Either(_, _)
                | Value::Equal(_, _, _)
                | Value::Datatype(_, _, _)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RcNeutral(pub Rc<Neutral>);

impl From<Neutral> for RcNeutral {
    fn from(src: Neutral) -> RcNeutral {
        RcNeutral(Rc::new(src))
    }
}

impl std::ops::Deref for RcNeutral {
    type Target = Neutral;

    fn deref(&self) -> &Neutral {
        &self.0
    }
}

/// Stuck eliminations. Each eliminator gets its own constructor here (rather
/// than a single generic "stuck application") so read-back can faithfully
/// reconstruct the exact surrounding syntax it was blocked on - see DESIGN.md
/// for why this is preferred over a unified representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Neutral {
    Var(Symbol),
    App(RcNeutral, Normal),
    Car(RcNeutral),
    Cdr(RcNeutral),

    WhichNat { target: RcNeutral, base_ty: Normal, base: Normal, step: Normal },
    IterNat { target: RcNeutral, base_ty: Normal, base: Normal, step: Normal },
    RecNat { target: RcNeutral, base_ty: Normal, base: Normal, step: Normal },
    IndNat { target: RcNeutral, motive: Normal, base: Normal, step: Normal },

    RecList { target: RcNeutral, base_ty: Normal, base: Normal, step: Normal },
    IndList { target: RcNeutral, motive: Normal, base: Normal, step: Normal },

    Head(RcNeutral),
    Tail(RcNeutral),
    IndVec { len: Normal, target: RcNeutral, motive: Normal, base: Normal, step: Normal },

    Symm(RcNeutral),
    Cong { target: RcNeutral, func: Normal },
    Replace { target: RcNeutral, motive: Normal, base: Normal },
    /// Both sides of `trans` are stuck.
    TransLL(RcNeutral, RcNeutral),
    /// The left side of `trans` is stuck, the right is canonical `same`.
    TransL(RcNeutral, Normal),
    /// The right side of `trans` is stuck, the left is canonical `same`.
    TransR(Normal, RcNeutral),
    IndEqual { target: RcNeutral, motive: Normal, base: Normal },

    IndEither { target: RcNeutral, motive: Normal, base_l: Normal, base_r: Normal },
    IndAbsurd { target: RcNeutral, motive: Normal },

    Match { target: RcNeutral, arms: Rc<Vec<Arm>>, motive: Normal },
}
