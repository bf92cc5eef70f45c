//! The core term language and its evaluator.
//!
//! Every core term is well-typed by construction (the checker only ever
//! emits terms that came from an accepted `synth`/`check` judgement).
//! `eval` is therefore total modulo the environment actually binding every
//! free variable - failing that is the one legitimate runtime error,
//! `CoreError::Unbound`. Anything else going wrong in `eval` signals an
//! elaborator bug, not a user mistake.

use std::fmt;
use std::rc::Rc;

use crate::context::{Renamings, Rho};
use crate::data::RcDataDecl;
use crate::domain::{Closure, Neutral, Normal, RcNeutral, RcValue, Value};
use crate::error::CoreError;
use crate::ident::Symbol;
use crate::pattern::Arm;

#[derive(Debug, Clone, PartialEq)]
pub struct RcCore(pub Rc<Core>);

impl From<Core> for RcCore {
    fn from(src: Core) -> RcCore {
        RcCore(Rc::new(src))
    }
}

impl std::ops::Deref for RcCore {
    type Target = Core;

    fn deref(&self) -> &Core {
        &self.0
    }
}

impl RcCore {
    pub fn as_ref(&self) -> &Core {
        &self.0
    }
}

/// The core syntax: every constructor of the theory, post-elaboration.
#[derive(Debug, Clone, PartialEq)]
pub enum Core {
    Var(Symbol),
    Universe,
    Atom,
    Tick(Symbol),

    Pi(Symbol, RcCore, RcCore),
    Lambda(Symbol, RcCore),
    App(RcCore, RcCore),

    Sigma(Symbol, RcCore, RcCore),
    Cons(RcCore, RcCore),
    Car(RcCore),
    Cdr(RcCore),

    Nat,
    Zero,
    Add1(RcCore),
    WhichNat { target: RcCore, base_ty: RcCore, base: RcCore, step: RcCore },
    IterNat { target: RcCore, base_ty: RcCore, base: RcCore, step: RcCore },
    RecNat { target: RcCore, base_ty: RcCore, base: RcCore, step: RcCore },
    IndNat { target: RcCore, motive: RcCore, base: RcCore, step: RcCore },

    List(RcCore),
    Nil,
    ListCons(RcCore, RcCore),
    RecList { target: RcCore, base_ty: RcCore, base: RcCore, step: RcCore },
    IndList { target: RcCore, motive: RcCore, base: RcCore, step: RcCore },

    Vec(RcCore, RcCore),
    VecNil,
    VecCons(RcCore, RcCore),
    Head(RcCore),
    Tail(RcCore),
    IndVec { len: RcCore, target: RcCore, motive: RcCore, base: RcCore, step: RcCore },

    Equal(RcCore, RcCore, RcCore),
    Same(RcCore),
    Symm(RcCore),
    Cong(RcCore, RcCore),
    Replace { target: RcCore, motive: RcCore, base: RcCore },
    Trans(RcCore, RcCore),
    IndEqual { target: RcCore, motive: RcCore, base: RcCore },

    Either(RcCore, RcCore),
    Inl(RcCore),
    Inr(RcCore),
    IndEither { target: RcCore, motive: RcCore, base_l: RcCore, base_r: RcCore },

    Trivial,
    Sole,
    Absurd,
    IndAbsurd(RcCore, RcCore),

    /// `D p i`, an application of a user datatype to its parameters and
    /// indices.
    Datatype { name: Symbol, params: Vec<RcCore>, indices: Vec<RcCore>, decl: RcDataDecl },
    /// `Cᵢ args`, an application of a user constructor to its arguments.
    Constr { name: Symbol, args: Vec<RcCore>, datatype: Symbol, decl: RcDataDecl },

    Match { target: RcCore, arms: Vec<Arm>, motive: RcCore },
}

// ---------------------------------------------------------------------
// helpers for building synthetic (never-written-down) function types
// ---------------------------------------------------------------------

pub fn pi_native(dom: RcValue, f: impl Fn(RcValue) -> Result<RcValue, CoreError> + 'static) -> RcValue {
    RcValue::from(Value::Pi(Symbol::new("_"), dom, Closure::native(f)))
}

pub fn pi_const(dom: RcValue, codom: RcValue) -> RcValue {
    RcValue::from(Value::Pi(Symbol::new("_"), dom, Closure::constant(codom)))
}

pub fn step_ty_nat(motive: RcValue) -> RcValue {
    let motive = motive.clone();
    pi_native(RcValue::from(Value::Nat), move |n: RcValue| {
        let m_n = do_app(motive.clone(), n.clone())?;
        let m_np1 = do_app(motive.clone(), RcValue::from(Value::Add1(n)))?;
        Ok(pi_const(m_n, m_np1))
    })
}

pub fn step_ty_list(elem_ty: RcValue, motive: RcValue) -> RcValue {
    let list_ty = RcValue::from(Value::List(elem_ty.clone()));
    pi_native(elem_ty, move |e: RcValue| {
        let list_ty = list_ty.clone();
        let motive = motive.clone();
        Ok(pi_native(list_ty, move |es: RcValue| {
            let m_es = do_app(motive.clone(), es.clone())?;
            let m_cons = do_app(motive.clone(), RcValue::from(Value::ListCons(e.clone(), es)))?;
            Ok(pi_const(m_es, m_cons))
        }))
    })
}

pub fn step_ty_vec(elem_ty: RcValue, motive: RcValue) -> RcValue {
    pi_native(RcValue::from(Value::Nat), move |k: RcValue| {
        let elem_ty = elem_ty.clone();
        let motive = motive.clone();
        let vec_ty_here = RcValue::from(Value::Vec(elem_ty.clone(), k.clone()));
        Ok(pi_native(elem_ty, move |e: RcValue| {
            let motive = motive.clone();
            let k = k.clone();
            let vec_ty_here = vec_ty_here.clone();
            Ok(pi_native(vec_ty_here, move |es: RcValue| {
                let m_here = do_app(do_app(motive.clone(), k.clone())?, es.clone())?;
                let next_len = RcValue::from(Value::Add1(k.clone()));
                let next_vec = RcValue::from(Value::VecCons(e.clone(), es));
                let m_next = do_app(do_app(motive.clone(), next_len)?, next_vec)?;
                Ok(pi_const(m_here, m_next))
            }))
        }))
    })
}

pub fn either_base_ty(side_ty: RcValue, motive: RcValue, inject: fn(RcValue) -> Value) -> RcValue {
    pi_native(side_ty, move |v: RcValue| do_app(motive.clone(), RcValue::from(inject(v))))
}

// ---------------------------------------------------------------------
// application / projection, shared between `eval` and the synthetic
// closures above
// ---------------------------------------------------------------------

pub fn do_app(f: RcValue, arg: RcValue) -> Result<RcValue, CoreError> {
    match f.as_ref() {
        Value::Lambda(_, closure) => closure.instantiate(arg),
        Value::Neutral(neutral, ty) => match ty.as_ref() {
            Value::Pi(_, dom, codomain) => {
                let result_ty = codomain.instantiate(arg.clone())?;
                Ok(RcValue::from(Value::Neutral(
                    RcNeutral::from(Neutral::App(neutral.clone(), Normal::new(arg, dom.clone()))),
                    result_ty,
                )))
            },
            _ => Err(CoreError::IllTyped("app")),
        },
        _ => Err(CoreError::IllTyped("app")),
    }
}

pub fn do_car(pair: RcValue) -> Result<RcValue, CoreError> {
    match pair.as_ref() {
        Value::Cons(a, _) => Ok(a.clone()),
        Value::Neutral(neutral, ty) => match ty.as_ref() {
            Value::Sigma(_, a_ty, _) => Ok(RcValue::from(Value::Neutral(
                RcNeutral::from(Neutral::Car(neutral.clone())),
                a_ty.clone(),
            ))),
            _ => Err(CoreError::IllTyped("car")),
        },
        _ => Err(CoreError::IllTyped("car")),
    }
}

pub fn do_cdr(pair: RcValue) -> Result<RcValue, CoreError> {
    match pair.as_ref() {
        Value::Cons(_, b) => Ok(b.clone()),
        Value::Neutral(neutral, ty) => match ty.as_ref() {
            Value::Sigma(_, _, b_ty) => {
                let a = do_car(pair.clone())?;
                let result_ty = b_ty.instantiate(a)?;
                Ok(RcValue::from(Value::Neutral(
                    RcNeutral::from(Neutral::Cdr(neutral.clone())),
                    result_ty,
                )))
            },
            _ => Err(CoreError::IllTyped("cdr")),
        },
        _ => Err(CoreError::IllTyped("cdr")),
    }
}

fn do_iter_nat(target: RcValue, base_ty: RcValue, base: RcValue, step: RcValue) -> Result<RcValue, CoreError> {
    match target.as_ref() {
        Value::Zero => Ok(base),
        Value::Add1(n) => {
            let rec = do_iter_nat(n.clone(), base_ty.clone(), base.clone(), step.clone())?;
            do_app(step, rec)
        },
        Value::Neutral(neutral, _) => Ok(RcValue::from(Value::Neutral(
            RcNeutral::from(Neutral::IterNat {
                target: neutral.clone(),
                base_ty: Normal::new(base_ty.clone(), RcValue::from(Value::Universe)),
                base: Normal::new(base, base_ty.clone()),
                step: Normal::new(step, pi_const(base_ty.clone(), base_ty.clone())),
            }),
            base_ty,
        ))),
        _ => Err(CoreError::IllTyped("iter-Nat")),
    }
}

fn do_rec_nat(target: RcValue, base_ty: RcValue, base: RcValue, step: RcValue) -> Result<RcValue, CoreError> {
    match target.as_ref() {
        Value::Zero => Ok(base),
        Value::Add1(n) => {
            let rec = do_rec_nat(n.clone(), base_ty.clone(), base.clone(), step.clone())?;
            do_app(do_app(step, n.clone())?, rec)
        },
        Value::Neutral(neutral, _) => {
            let step_ty = pi_native(RcValue::from(Value::Nat), {
                let base_ty = base_ty.clone();
                move |_n| Ok(pi_const(base_ty.clone(), base_ty.clone()))
            });
            Ok(RcValue::from(Value::Neutral(
                RcNeutral::from(Neutral::RecNat {
                    target: neutral.clone(),
                    base_ty: Normal::new(base_ty.clone(), RcValue::from(Value::Universe)),
                    base: Normal::new(base, base_ty.clone()),
                    step: Normal::new(step, step_ty),
                }),
                base_ty,
            )))
        },
        _ => Err(CoreError::IllTyped("rec-Nat")),
    }
}

fn do_ind_nat(target: RcValue, motive: RcValue, base: RcValue, step: RcValue) -> Result<RcValue, CoreError> {
    match target.as_ref() {
        Value::Zero => Ok(base),
        Value::Add1(n) => {
            let rec = do_ind_nat(n.clone(), motive.clone(), base.clone(), step.clone())?;
            do_app(do_app(step, n.clone())?, rec)
        },
        Value::Neutral(neutral, _) => {
            let motive_ty = pi_const(RcValue::from(Value::Nat), RcValue::from(Value::Universe));
            let base_ty = do_app(motive.clone(), RcValue::from(Value::Zero))?;
            Ok(RcValue::from(Value::Neutral(
                RcNeutral::from(Neutral::IndNat {
                    target: neutral.clone(),
                    motive: Normal::new(motive.clone(), motive_ty),
                    base: Normal::new(base, base_ty),
                    step: Normal::new(step, step_ty_nat(motive.clone())),
                }),
                do_app(motive, target.clone())?,
            )))
        },
        _ => Err(CoreError::IllTyped("ind-Nat")),
    }
}

fn do_rec_list(target: RcValue, elem_ty: RcValue, base_ty: RcValue, base: RcValue, step: RcValue) -> Result<RcValue, CoreError> {
    match target.as_ref() {
        Value::Nil => Ok(base),
        Value::ListCons(e, es) => {
            let rec = do_rec_list(es.clone(), elem_ty.clone(), base_ty.clone(), base.clone(), step.clone())?;
            do_app(do_app(do_app(step.clone(), e.clone())?, es.clone())?, rec)
        },
        Value::Neutral(neutral, _) => {
            let step_ty = pi_native(elem_ty.clone(), {
                let elem_ty = elem_ty.clone();
                let base_ty = base_ty.clone();
                move |_e| {
                    let list_ty = RcValue::from(Value::List(elem_ty.clone()));
                    Ok(pi_const(list_ty, pi_const(base_ty.clone(), base_ty.clone())))
                }
            });
            Ok(RcValue::from(Value::Neutral(
                RcNeutral::from(Neutral::RecList {
                    target: neutral.clone(),
                    base_ty: Normal::new(base_ty.clone(), RcValue::from(Value::Universe)),
                    base: Normal::new(base, base_ty.clone()),
                    step: Normal::new(step, step_ty),
                }),
                base_ty,
            )))
        },
        _ => Err(CoreError::IllTyped("rec-List")),
    }
}

fn do_ind_list(target: RcValue, elem_ty: RcValue, motive: RcValue, base: RcValue, step: RcValue) -> Result<RcValue, CoreError> {
    match target.as_ref() {
        Value::Nil => Ok(base),
        Value::ListCons(e, es) => {
            let rec = do_ind_list(es.clone(), elem_ty.clone(), motive.clone(), base.clone(), step.clone())?;
            do_app(do_app(do_app(step.clone(), e.clone())?, es.clone())?, rec)
        },
        Value::Neutral(neutral, _) => {
            let list_ty = RcValue::from(Value::List(elem_ty.clone()));
            let motive_ty = pi_const(list_ty, RcValue::from(Value::Universe));
            let base_ty = do_app(motive.clone(), RcValue::from(Value::Nil))?;
            Ok(RcValue::from(Value::Neutral(
                RcNeutral::from(Neutral::IndList {
                    target: neutral.clone(),
                    motive: Normal::new(motive.clone(), motive_ty),
                    base: Normal::new(base, base_ty),
                    step: Normal::new(step, step_ty_list(elem_ty, motive.clone())),
                }),
                do_app(motive, target.clone())?,
            )))
        },
        _ => Err(CoreError::IllTyped("ind-List")),
    }
}

fn do_head(target: RcValue) -> Result<RcValue, CoreError> {
    match target.as_ref() {
        Value::VecCons(e, _) => Ok(e.clone()),
        Value::Neutral(neutral, ty) => match ty.as_ref() {
            Value::Vec(elem_ty, _) => Ok(RcValue::from(Value::Neutral(
                RcNeutral::from(Neutral::Head(neutral.clone())),
                elem_ty.clone(),
            ))),
            _ => Err(CoreError::IllTyped("head")),
        },
        _ => Err(CoreError::IllTyped("head")),
    }
}

fn do_tail(target: RcValue) -> Result<RcValue, CoreError> {
    match target.as_ref() {
        Value::VecCons(_, es) => Ok(es.clone()),
        Value::Neutral(neutral, ty) => match ty.as_ref() {
            Value::Vec(elem_ty, len) => match len.as_ref() {
                Value::Add1(k) => Ok(RcValue::from(Value::Neutral(
                    RcNeutral::from(Neutral::Tail(neutral.clone())),
                    RcValue::from(Value::Vec(elem_ty.clone(), k.clone())),
                ))),
                _ => Err(CoreError::IllTyped("tail")),
            },
            _ => Err(CoreError::IllTyped("tail")),
        },
        _ => Err(CoreError::IllTyped("tail")),
    }
}

#[allow(clippy::too_many_arguments)]
fn do_ind_vec(
    len: RcValue,
    target: RcValue,
    elem_ty: RcValue,
    motive: RcValue,
    base: RcValue,
    step: RcValue,
) -> Result<RcValue, CoreError> {
    match target.as_ref() {
        Value::VecNil => Ok(base),
        Value::VecCons(e, es) => {
            let k = match len.as_ref() {
                Value::Add1(k) => k.clone(),
                _ => return Err(CoreError::IllTyped("ind-Vec")),
            };
            let rec = do_ind_vec(k.clone(), es.clone(), elem_ty.clone(), motive.clone(), base.clone(), step.clone())?;
            do_app(do_app(do_app(do_app(step.clone(), k)?, e.clone())?, es.clone())?, rec)
        },
        Value::Neutral(neutral, _) => {
            let motive_ty = pi_native(RcValue::from(Value::Nat), {
                let elem_ty = elem_ty.clone();
                move |n: RcValue| Ok(pi_const(RcValue::from(Value::Vec(elem_ty.clone(), n)), RcValue::from(Value::Universe)))
            });
            let base_ty = do_app(do_app(motive.clone(), RcValue::from(Value::Zero))?, RcValue::from(Value::VecNil))?;
            Ok(RcValue::from(Value::Neutral(
                RcNeutral::from(Neutral::IndVec {
                    len: Normal::new(len.clone(), RcValue::from(Value::Nat)),
                    target: neutral.clone(),
                    motive: Normal::new(motive.clone(), motive_ty),
                    base: Normal::new(base, base_ty),
                    step: Normal::new(step, step_ty_vec(elem_ty, motive.clone())),
                }),
                do_app(do_app(motive, len)?, target.clone())?,
            )))
        },
        _ => Err(CoreError::IllTyped("ind-Vec")),
    }
}

fn do_symm(target: RcValue) -> Result<RcValue, CoreError> {
    match target.as_ref() {
        Value::Same(w) => Ok(RcValue::from(Value::Same(w.clone()))),
        Value::Neutral(neutral, ty) => match ty.as_ref() {
            Value::Equal(a, x, y) => Ok(RcValue::from(Value::Neutral(
                RcNeutral::from(Neutral::Symm(neutral.clone())),
                RcValue::from(Value::Equal(a.clone(), y.clone(), x.clone())),
            ))),
            _ => Err(CoreError::IllTyped("symm")),
        },
        _ => Err(CoreError::IllTyped("symm")),
    }
}

fn do_cong(target: RcValue, func: RcValue, func_ty: RcValue) -> Result<RcValue, CoreError> {
    match target.as_ref() {
        Value::Same(w) => Ok(RcValue::from(Value::Same(do_app(func, w.clone())?))),
        Value::Neutral(neutral, ty) => match ty.as_ref() {
            Value::Equal(_, x, y) => {
                let fx = do_app(func.clone(), x.clone())?;
                let fy = do_app(func.clone(), y.clone())?;
                let result_ty = match func_ty.as_ref() {
                    Value::Pi(_, _, codomain) => codomain.instantiate(x.clone())?,
                    _ => return Err(CoreError::IllTyped("cong")),
                };
                Ok(RcValue::from(Value::Neutral(
                    RcNeutral::from(Neutral::Cong { target: neutral.clone(), func: Normal::new(func, func_ty) }),
                    RcValue::from(Value::Equal(result_ty, fx, fy)),
                )))
            },
            _ => Err(CoreError::IllTyped("cong")),
        },
        _ => Err(CoreError::IllTyped("cong")),
    }
}

fn do_replace(target: RcValue, motive: RcValue, base: RcValue, motive_ty: RcValue) -> Result<RcValue, CoreError> {
    match target.as_ref() {
        Value::Same(_) => Ok(base),
        Value::Neutral(neutral, ty) => match ty.as_ref() {
            Value::Equal(_, _, to) => Ok(RcValue::from(Value::Neutral(
                RcNeutral::from(Neutral::Replace {
                    target: neutral.clone(),
                    motive: Normal::new(motive.clone(), motive_ty),
                    base: Normal::new(base, do_app(motive.clone(), to.clone())?),
                }),
                do_app(motive, to.clone())?,
            ))),
            _ => Err(CoreError::IllTyped("replace")),
        },
        _ => Err(CoreError::IllTyped("replace")),
    }
}

fn do_trans(left: RcValue, right: RcValue, a: RcValue, x: RcValue, z: RcValue) -> Result<RcValue, CoreError> {
    let eq_ty = RcValue::from(Value::Equal(a, x, z));
    match (left.as_ref(), right.as_ref()) {
        (Value::Same(w), Value::Same(_)) => Ok(RcValue::from(Value::Same(w.clone()))),
        (Value::Neutral(l, _), Value::Neutral(r, _)) => Ok(RcValue::from(Value::Neutral(
            RcNeutral::from(Neutral::TransLL(l.clone(), r.clone())),
            eq_ty,
        ))),
        (Value::Neutral(l, _), Value::Same(_)) => Ok(RcValue::from(Value::Neutral(
            RcNeutral::from(Neutral::TransL(l.clone(), Normal::new(right.clone(), eq_ty.clone()))),
            eq_ty,
        ))),
        (Value::Same(_), Value::Neutral(r, _)) => Ok(RcValue::from(Value::Neutral(
            RcNeutral::from(Neutral::TransR(Normal::new(left.clone(), eq_ty.clone()), r.clone())),
            eq_ty,
        ))),
        _ => Err(CoreError::IllTyped("trans")),
    }
}

fn do_ind_equal(target: RcValue, motive: RcValue, base: RcValue, motive_ty: RcValue) -> Result<RcValue, CoreError> {
    match target.as_ref() {
        Value::Same(_) => Ok(base),
        Value::Neutral(neutral, ty) => match ty.as_ref() {
            Value::Equal(_, _, to) => Ok(RcValue::from(Value::Neutral(
                RcNeutral::from(Neutral::IndEqual {
                    target: neutral.clone(),
                    motive: Normal::new(motive.clone(), motive_ty),
                    base: Normal::new(base, do_app(do_app(motive.clone(), to.clone())?, target.clone())?),
                }),
                do_app(do_app(motive, to.clone())?, target.clone())?,
            ))),
            _ => Err(CoreError::IllTyped("ind-=")),
        },
        _ => Err(CoreError::IllTyped("ind-=")),
    }
}

fn do_ind_either(
    target: RcValue,
    left_ty: RcValue,
    right_ty: RcValue,
    motive: RcValue,
    base_l: RcValue,
    base_r: RcValue,
) -> Result<RcValue, CoreError> {
    match target.as_ref() {
        Value::Inl(v) => do_app(base_l, v.clone()),
        Value::Inr(v) => do_app(base_r, v.clone()),
        Value::Neutral(neutral, _) => {
            let either_ty = RcValue::from(Value::Either(left_ty.clone(), right_ty.clone()));
            let motive_ty = pi_const(either_ty, RcValue::from(Value::Universe));
            Ok(RcValue::from(Value::Neutral(
                RcNeutral::from(Neutral::IndEither {
                    target: neutral.clone(),
                    motive: Normal::new(motive.clone(), motive_ty),
                    base_l: Normal::new(base_l, either_base_ty(left_ty, motive.clone(), Value::Inl)),
                    base_r: Normal::new(base_r, either_base_ty(right_ty, motive.clone(), Value::Inr)),
                }),
                do_app(motive, target.clone())?,
            )))
        },
        _ => Err(CoreError::IllTyped("ind-Either")),
    }
}

fn do_ind_absurd(target: RcValue, motive: RcValue) -> Result<RcValue, CoreError> {
    match target.as_ref() {
        Value::Neutral(neutral, ty) => match ty.as_ref() {
            Value::Absurd => Ok(RcValue::from(Value::Neutral(
                RcNeutral::from(Neutral::IndAbsurd {
                    target: neutral.clone(),
                    motive: Normal::new(motive.clone(), RcValue::from(Value::Universe)),
                }),
                motive,
            ))),
            _ => Err(CoreError::IllTyped("ind-Absurd")),
        },
        _ => Err(CoreError::IllTyped("ind-Absurd")),
    }
}

/// Reduce a `match`. On a canonical target, picks the first admitting arm
/// and evaluates its body under the bindings the pattern introduces. On a
/// neutral target, the whole match is stuck and becomes a neutral form that
/// carries the arms and motive verbatim.
fn do_match(target: RcValue, arms: &[Arm], motive: RcValue, rho: &Rho) -> Result<RcValue, CoreError> {
    match target.as_ref() {
        Value::Neutral(neutral, _) => Ok(RcValue::from(Value::Neutral(
            RcNeutral::from(Neutral::Match {
                target: neutral.clone(),
                arms: Rc::new(arms.to_vec()),
                motive: Normal::new(motive.clone(), RcValue::from(Value::Universe)),
            }),
            motive,
        ))),
        _ => {
            for arm in arms {
                if arm.pattern.admits(&target) {
                    let arm_rho = arm.pattern.extend_rho(rho, &target);
                    return arm.body.eval(&arm_rho);
                }
            }
            Err(CoreError::StuckMatch)
        },
    }
}

impl Core {
    /// Evaluate this core term to a value under environment `rho`.
    pub fn eval(&self, rho: &Rho) -> Result<RcValue, CoreError> {
        use Core::*;

        Ok(match self {
            Var(name) => rho.lookup(name).ok_or_else(|| CoreError::Unbound(name.clone()))?,
            Universe => RcValue::from(Value::Universe),
            Atom => RcValue::from(Value::Atom),
            Tick(name) => RcValue::from(Value::Tick(name.clone())),

            Pi(x, a, b) => RcValue::from(Value::Pi(x.clone(), a.eval(rho)?, Closure::new(x.clone(), b.clone(), rho.clone()))),
            Lambda(x, body) => RcValue::from(Value::Lambda(x.clone(), Closure::new(x.clone(), body.clone(), rho.clone()))),
            App(f, a) => do_app(f.eval(rho)?, a.eval(rho)?)?,

            Sigma(x, a, b) => RcValue::from(Value::Sigma(x.clone(), a.eval(rho)?, Closure::new(x.clone(), b.clone(), rho.clone()))),
            Cons(a, b) => RcValue::from(Value::Cons(a.eval(rho)?, b.eval(rho)?)),
            Car(p) => do_car(p.eval(rho)?)?,
            Cdr(p) => do_cdr(p.eval(rho)?)?,

            Nat => RcValue::from(Value::Nat),
            Zero => RcValue::from(Value::Zero),
            Add1(n) => RcValue::from(Value::Add1(n.eval(rho)?)),
            WhichNat { target, base_ty, base, step } => {
                let t = target.eval(rho)?;
                let bt = base_ty.eval(rho)?;
                let b = base.eval(rho)?;
                let s = step.eval(rho)?;
                match t.as_ref() {
                    Value::Zero => b,
                    Value::Add1(n) => do_app(s, n.clone())?,
                    Value::Neutral(neutral, _) => RcValue::from(Value::Neutral(
                        RcNeutral::from(Neutral::WhichNat {
                            target: neutral.clone(),
                            base_ty: Normal::new(bt.clone(), RcValue::from(Value::Universe)),
                            base: Normal::new(b, bt.clone()),
                            step: Normal::new(s, pi_const(RcValue::from(Value::Nat), bt.clone())),
                        }),
                        bt,
                    )),
                    _ => return Err(CoreError::IllTyped("which-Nat")),
                }
            },
            IterNat { target, base_ty, base, step } => {
                do_iter_nat(target.eval(rho)?, base_ty.eval(rho)?, base.eval(rho)?, step.eval(rho)?)?
            },
            RecNat { target, base_ty, base, step } => {
                do_rec_nat(target.eval(rho)?, base_ty.eval(rho)?, base.eval(rho)?, step.eval(rho)?)?
            },
            IndNat { target, motive, base, step } => {
                do_ind_nat(target.eval(rho)?, motive.eval(rho)?, base.eval(rho)?, step.eval(rho)?)?
            },

            List(elem) => RcValue::from(Value::List(elem.eval(rho)?)),
            Nil => RcValue::from(Value::Nil),
            ListCons(e, es) => RcValue::from(Value::ListCons(e.eval(rho)?, es.eval(rho)?)),
            RecList { target, base_ty, base, step } => {
                let t = target.eval(rho)?;
                let elem_ty = match elem_ty_of_list(&t) {
                    Some(ty) => ty,
                    None => RcValue::from(Value::Atom), // unreachable for well-typed input
                };
                do_rec_list(t, elem_ty, base_ty.eval(rho)?, base.eval(rho)?, step.eval(rho)?)?
            },
            IndList { target, motive, base, step } => {
                let t = target.eval(rho)?;
                let elem_ty = match elem_ty_of_list(&t) {
                    Some(ty) => ty,
                    None => RcValue::from(Value::Atom),
                };
                do_ind_list(t, elem_ty, motive.eval(rho)?, base.eval(rho)?, step.eval(rho)?)?
            },

            Vec(elem, len) => RcValue::from(Value::Vec(elem.eval(rho)?, len.eval(rho)?)),
            VecNil => RcValue::from(Value::VecNil),
            VecCons(e, es) => RcValue::from(Value::VecCons(e.eval(rho)?, es.eval(rho)?)),
            Head(v) => do_head(v.eval(rho)?)?,
            Tail(v) => do_tail(v.eval(rho)?)?,
            IndVec { len, target, motive, base, step } => {
                let target_v = target.eval(rho)?;
                let elem_ty = elem_ty_of_vec(&target_v).unwrap_or_else(|| RcValue::from(Value::Atom));
                do_ind_vec(len.eval(rho)?, target_v, elem_ty, motive.eval(rho)?, base.eval(rho)?, step.eval(rho)?)?
            },

            Equal(a, x, y) => RcValue::from(Value::Equal(a.eval(rho)?, x.eval(rho)?, y.eval(rho)?)),
            Same(w) => RcValue::from(Value::Same(w.eval(rho)?)),
            Symm(w) => do_symm(w.eval(rho)?)?,
            Cong(target, func) => {
                let target_v = target.eval(rho)?;
                let func_v = func.eval(rho)?;
                let func_ty = pi_ty_of(&func_v);
                do_cong(target_v, func_v, func_ty)?
            },
            Replace { target, motive, base } => {
                let motive_v = motive.eval(rho)?;
                let motive_ty = motive_ty_for(&target.eval(rho)?, &motive_v);
                do_replace(target.eval(rho)?, motive_v, base.eval(rho)?, motive_ty)?
            },
            Trans(l, r) => {
                let lv = l.eval(rho)?;
                let rv = r.eval(rho)?;
                let (a, x) = equal_endpoints_from(&lv).unwrap_or((RcValue::from(Value::Universe), RcValue::from(Value::Universe)));
                let z = equal_right_endpoint_from(&rv).unwrap_or_else(|| x.clone());
                do_trans(lv, rv, a, x, z)?
            },
            IndEqual { target, motive, base } => {
                let motive_v = motive.eval(rho)?;
                let motive_ty = motive_ty_for(&target.eval(rho)?, &motive_v);
                do_ind_equal(target.eval(rho)?, motive_v, base.eval(rho)?, motive_ty)?
            },

            Either(a, b) => RcValue::from(Value::Either(a.eval(rho)?, b.eval(rho)?)),
            Inl(v) => RcValue::from(Value::Inl(v.eval(rho)?)),
            Inr(v) => RcValue::from(Value::Inr(v.eval(rho)?)),
            IndEither { target, motive, base_l, base_r } => {
                let target_v = target.eval(rho)?;
                let (left_ty, right_ty) = either_sides_of(&target_v).unwrap_or((
                    RcValue::from(Value::Atom),
                    RcValue::from(Value::Atom),
                ));
                do_ind_either(target_v, left_ty, right_ty, motive.eval(rho)?, base_l.eval(rho)?, base_r.eval(rho)?)?
            },

            Trivial => RcValue::from(Value::Trivial),
            Sole => RcValue::from(Value::Sole),
            Absurd => RcValue::from(Value::Absurd),
            IndAbsurd(target, motive) => do_ind_absurd(target.eval(rho)?, motive.eval(rho)?)?,

            Datatype { name: _, params, indices, decl } => {
                let param_vals = params.iter().map(|p| p.eval(rho)).collect::<Result<Vec<_>, _>>()?;
                let index_vals = indices.iter().map(|i| i.eval(rho)).collect::<Result<Vec<_>, _>>()?;
                RcValue::from(Value::Datatype(decl.clone(), param_vals, index_vals))
            },
            Constr { name, args, datatype: _, decl } => {
                let arg_vals = args.iter().map(|a| a.eval(rho)).collect::<Result<Vec<_>, _>>()?;
                // The datatype's parameter values are threaded in through
                // `rho` by the constructor's own enclosing lambdas, which
                // bind exactly the datatype's parameter names.
                let param_vals = decl
                    .params
                    .iter()
                    .map(|(n, _)| rho.lookup(n).ok_or_else(|| CoreError::Unbound(n.clone())))
                    .collect::<Result<Vec<_>, _>>()?;
                RcValue::from(Value::Constr(name.clone(), arg_vals, decl.clone(), param_vals))
            },

            Match { target, arms, motive } => {
                do_match(target.eval(rho)?, arms, motive.eval(rho)?, rho)?
            },
        })
    }

    /// Structural equality modulo renaming of bound variables.
    pub fn alpha_equiv(&self, other: &Core, renamings: &Renamings) -> bool {
        use Core::*;

        match (self, other) {
            (Var(l), Var(r)) => renamings.same_var(l, r),
            (Universe, Universe) | (Atom, Atom) | (Nat, Nat) | (Nil, Nil) | (VecNil, VecNil) => true,
            (Trivial, Trivial) | (Sole, Sole) | (Absurd, Absurd) | (Zero, Zero) => true,
            (Tick(l), Tick(r)) => l == r,

            (Pi(x1, a1, b1), Pi(x2, a2, b2)) | (Sigma(x1, a1, b1), Sigma(x2, a2, b2)) => {
                a1.alpha_equiv(a2, renamings) && {
                    let renamings = renamings.extend(x1, x2);
                    b1.alpha_equiv(b2, &renamings)
                }
            },
            (Lambda(x1, b1), Lambda(x2, b2)) => {
                let renamings = renamings.extend(x1, x2);
                b1.alpha_equiv(b2, &renamings)
            },
            (App(f1, a1), App(f2, a2)) => f1.alpha_equiv(f2, renamings) && a1.alpha_equiv(a2, renamings),

            (Cons(a1, b1), Cons(a2, b2)) | (ListCons(a1, b1), ListCons(a2, b2)) | (VecCons(a1, b1), VecCons(a2, b2)) => {
                a1.alpha_equiv(a2, renamings) && b1.alpha_equiv(b2, renamings)
            },
            (Car(a), Car(b)) | (Cdr(a), Cdr(b)) | (Add1(a), Add1(b)) | (Head(a), Head(b)) | (Tail(a), Tail(b)) => {
                a.alpha_equiv(b, renamings)
            },

            (List(a), List(b)) => a.alpha_equiv(b, renamings),
            (Vec(a1, b1), Vec(a2, b2)) => a1.alpha_equiv(a2, renamings) && b1.alpha_equiv(b2, renamings),

            (
                WhichNat { target: t1, base_ty: bt1, base: b1, step: s1 },
                WhichNat { target: t2, base_ty: bt2, base: b2, step: s2 },
            )
            | (
                IterNat { target: t1, base_ty: bt1, base: b1, step: s1 },
                IterNat { target: t2, base_ty: bt2, base: b2, step: s2 },
            )
            | (
                RecNat { target: t1, base_ty: bt1, base: b1, step: s1 },
                RecNat { target: t2, base_ty: bt2, base: b2, step: s2 },
            )
            | (
                RecList { target: t1, base_ty: bt1, base: b1, step: s1 },
                RecList { target: t2, base_ty: bt2, base: b2, step: s2 },
            ) => {
                t1.alpha_equiv(t2, renamings)
                    && bt1.alpha_equiv(bt2, renamings)
                    && b1.alpha_equiv(b2, renamings)
                    && s1.alpha_equiv(s2, renamings)
            },

            (
                IndNat { target: t1, motive: m1, base: b1, step: s1 },
                IndNat { target: t2, motive: m2, base: b2, step: s2 },
            )
            | (
                IndList { target: t1, motive: m1, base: b1, step: s1 },
                IndList { target: t2, motive: m2, base: b2, step: s2 },
            ) => {
                t1.alpha_equiv(t2, renamings)
                    && m1.alpha_equiv(m2, renamings)
                    && b1.alpha_equiv(b2, renamings)
                    && s1.alpha_equiv(s2, renamings)
            },

            (
                IndVec { len: l1, target: t1, motive: m1, base: b1, step: s1 },
                IndVec { len: l2, target: t2, motive: m2, base: b2, step: s2 },
            ) => {
                l1.alpha_equiv(l2, renamings)
                    && t1.alpha_equiv(t2, renamings)
                    && m1.alpha_equiv(m2, renamings)
                    && b1.alpha_equiv(b2, renamings)
                    && s1.alpha_equiv(s2, renamings)
            },

            (Equal(a1, x1, y1), Equal(a2, x2, y2)) => {
                a1.alpha_equiv(a2, renamings) && x1.alpha_equiv(x2, renamings) && y1.alpha_equiv(y2, renamings)
            },
            (Same(a), Same(b)) | (Symm(a), Symm(b)) => a.alpha_equiv(b, renamings),
            (Cong(t1, f1), Cong(t2, f2)) => t1.alpha_equiv(t2, renamings) && f1.alpha_equiv(f2, renamings),
            (Replace { target: t1, motive: m1, base: b1 }, Replace { target: t2, motive: m2, base: b2 }) => {
                t1.alpha_equiv(t2, renamings) && m1.alpha_equiv(m2, renamings) && b1.alpha_equiv(b2, renamings)
            },
            (Trans(l1, r1), Trans(l2, r2)) => l1.alpha_equiv(l2, renamings) && r1.alpha_equiv(r2, renamings),
            (IndEqual { target: t1, motive: m1, base: b1 }, IndEqual { target: t2, motive: m2, base: b2 }) => {
                t1.alpha_equiv(t2, renamings) && m1.alpha_equiv(m2, renamings) && b1.alpha_equiv(b2, renamings)
            },

            (Either(a1, b1), Either(a2, b2)) => a1.alpha_equiv(a2, renamings) && b1.alpha_equiv(b2, renamings),
            (Inl(a), Inl(b)) | (Inr(a), Inr(b)) => a.alpha_equiv(b, renamings),
            (
                IndEither { target: t1, motive: m1, base_l: l1, base_r: r1 },
                IndEither { target: t2, motive: m2, base_l: l2, base_r: r2 },
            ) => {
                t1.alpha_equiv(t2, renamings)
                    && m1.alpha_equiv(m2, renamings)
                    && l1.alpha_equiv(l2, renamings)
                    && r1.alpha_equiv(r2, renamings)
            },
            (IndAbsurd(t1, m1), IndAbsurd(t2, m2)) => t1.alpha_equiv(t2, renamings) && m1.alpha_equiv(m2, renamings),

            (
                Datatype { name: n1, params: p1, indices: i1, .. },
                Datatype { name: n2, params: p2, indices: i2, .. },
            ) => {
                n1 == n2
                    && p1.len() == p2.len()
                    && i1.len() == i2.len()
                    && p1.iter().zip(p2).all(|(a, b)| a.alpha_equiv(b, renamings))
                    && i1.iter().zip(i2).all(|(a, b)| a.alpha_equiv(b, renamings))
            },
            (
                Constr { name: n1, args: a1, datatype: d1, .. },
                Constr { name: n2, args: a2, datatype: d2, .. },
            ) => {
                n1 == n2 && d1 == d2 && a1.len() == a2.len() && a1.iter().zip(a2).all(|(a, b)| a.alpha_equiv(b, renamings))
            },

            (Match { target: t1, arms: arms1, motive: m1 }, Match { target: t2, arms: arms2, motive: m2 }) => {
                t1.alpha_equiv(t2, renamings)
                    && m1.alpha_equiv(m2, renamings)
                    && arms1.len() == arms2.len()
                    && arms1.iter().zip(arms2).all(|(a, b)| a.alpha_equiv(b, renamings))
            },

            _ => false,
        }
    }
}

impl RcCore {
    pub fn alpha_equiv(&self, other: &RcCore, renamings: &Renamings) -> bool {
        self.0.alpha_equiv(&other.0, renamings)
    }

    pub fn eval(&self, rho: &Rho) -> Result<RcValue, CoreError> {
        self.0.eval(rho)
    }
}

fn elem_ty_of_list(v: &RcValue) -> Option<RcValue> {
    match v.as_ref() {
        Value::Neutral(_, ty) => match ty.as_ref() {
            Value::List(e) => Some(e.clone()),
            _ => None,
        },
        _ => None,
    }
}

fn elem_ty_of_vec(v: &RcValue) -> Option<RcValue> {
    match v.as_ref() {
        Value::Neutral(_, ty) => match ty.as_ref() {
            Value::Vec(e, _) => Some(e.clone()),
            _ => None,
        },
        _ => None,
    }
}

fn either_sides_of(v: &RcValue) -> Option<(RcValue, RcValue)> {
    match v.as_ref() {
        Value::Neutral(_, ty) => match ty.as_ref() {
            Value::Either(a, b) => Some((a.clone(), b.clone())),
            _ => None,
        },
        _ => None,
    }
}

fn equal_endpoints_from(v: &RcValue) -> Option<(RcValue, RcValue)> {
    match v.as_ref() {
        Value::Neutral(_, ty) => match ty.as_ref() {
            Value::Equal(a, x, _) => Some((a.clone(), x.clone())),
            _ => None,
        },
        Value::Same(_) => None,
        _ => None,
    }
}

/// The trailing endpoint (the `y` in `Equal(A, x, y)`) of a neutral value's
/// annotated equality type - the counterpart to `equal_endpoints_from`'s
/// leading pair, needed by `trans` to read off its right proof's far end.
fn equal_right_endpoint_from(v: &RcValue) -> Option<RcValue> {
    match v.as_ref() {
        Value::Neutral(_, ty) => match ty.as_ref() {
            Value::Equal(_, _, y) => Some(y.clone()),
            _ => None,
        },
        Value::Same(_) => None,
        _ => None,
    }
}

/// The `Pi` type of a function value, when it can be recovered without a
/// type-checking context (i.e. the function is itself neutral). `cong`'s
/// core term always carries an already-elaborated function whose checker-
/// recorded type would normally be threaded in here too; reaching for the
/// neutral annotation is the fallback `eval` has available.
fn pi_ty_of(v: &RcValue) -> RcValue {
    match v.as_ref() {
        Value::Neutral(_, ty) if matches!(ty.as_ref(), Value::Pi(_, _, _)) => ty.clone(),
        _ => RcValue::from(Value::Universe),
    }
}

fn motive_ty_for(target: &RcValue, _motive: &RcValue) -> RcValue {
    match target.as_ref() {
        Value::Neutral(_, ty) => match ty.as_ref() {
            Value::Equal(a, _, _) => pi_const(a.clone(), RcValue::from(Value::Universe)),
            _ => RcValue::from(Value::Universe),
        },
        _ => RcValue::from(Value::Universe),
    }
}

impl fmt::Display for Core {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Core::*;
        match self {
            Var(name) => write!(f, "{}", name),
            Universe => write!(f, "U"),
            Atom => write!(f, "Atom"),
            Tick(name) => write!(f, "'{}", name),
            Nat => write!(f, "Nat"),
            Zero => write!(f, "zero"),
            Nil => write!(f, "nil"),
            VecNil => write!(f, "vecnil"),
            Trivial => write!(f, "Trivial"),
            Sole => write!(f, "sole"),
            Absurd => write!(f, "Absurd"),
            Add1(n) => write!(f, "(add1 {})", n.as_ref()),
            Pi(x, a, b) => write!(f, "(Π (({} {})) {})", x, a.as_ref(), b.as_ref()),
            Lambda(x, body) => write!(f, "(λ ({}) {})", x, body.as_ref()),
            App(g, a) => write!(f, "({} {})", g.as_ref(), a.as_ref()),
            Sigma(x, a, b) => write!(f, "(Σ (({} {})) {})", x, a.as_ref(), b.as_ref()),
            Cons(a, b) => write!(f, "(cons {} {})", a.as_ref(), b.as_ref()),
            Car(p) => write!(f, "(car {})", p.as_ref()),
            Cdr(p) => write!(f, "(cdr {})", p.as_ref()),
            Datatype { name, params, indices, .. } => {
                write!(f, "({}", name)?;
                for p in params.iter().chain(indices.iter()) {
                    write!(f, " {}", p.as_ref())?;
                }
                write!(f, ")")
            },
            Constr { name, args, .. } => {
                write!(f, "({}", name)?;
                for a in args {
                    write!(f, " {}", a.as_ref())?;
                }
                write!(f, ")")
            },
            Match { target, .. } => write!(f, "(match {} ...)", target.as_ref()),
            _ => write!(f, "<core term>"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::context::Renamings;

    fn id_lambda(x: &str) -> RcCore {
        RcCore::from(Core::Lambda(Symbol::new(x), RcCore::from(Core::Var(Symbol::new(x)))))
    }

    #[test]
    fn applying_identity_to_zero_evaluates_to_zero() {
        let app = Core::App(id_lambda("x"), RcCore::from(Core::Zero));
        let value = app.eval(&Rho::new()).expect("identity applied to zero should not get stuck");
        assert_eq!(value, RcValue::from(Value::Zero));
    }

    #[test]
    fn identity_lambdas_with_different_bound_names_are_alpha_equivalent() {
        let left = id_lambda("x");
        let right = id_lambda("y");
        assert!(left.alpha_equiv(&right, &Renamings::new()));
    }

    #[test]
    fn lambdas_with_different_bodies_are_not_alpha_equivalent() {
        let left = id_lambda("x");
        let const_zero = RcCore::from(Core::Lambda(Symbol::new("x"), RcCore::from(Core::Zero)));
        assert!(!left.alpha_equiv(&const_zero, &Renamings::new()));
    }

    #[test]
    fn eval_of_an_unbound_variable_is_an_unbound_error() {
        let term = Core::Var(Symbol::new("nowhere"));
        assert_eq!(term.eval(&Rho::new()), Err(CoreError::Unbound(Symbol::new("nowhere"))));
    }
}
