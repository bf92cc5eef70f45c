//! Type-directed read-back: turning a [`Value`] back into a [`Core`] term,
//! eta-expanding function and pair values along the way. Two values read
//! back to alpha-equivalent core terms at the same type exactly when they
//! are definitionally equal - this is the whole of how the checker decides
//! equality (see `isType`/`check`'s use of these two entry points).

use crate::context::{Bound, Rho};
use crate::core::{do_app, do_car, do_cdr, Core, RcCore};
use crate::domain::{Normal, RcNeutral, RcValue, Value};
use crate::error::CoreError;

/// Read back a value known to classify other values - i.e. a type - into
/// its core syntax.
///
/// A neutral value can itself be used as a type (an application of an
/// as-yet-unevaluated type family, say); it is accepted here exactly when
/// its own annotated type is `U`, in which case read-back falls through to
/// [`read_back_neutral`] rather than failing. Anything else neutral-shaped
/// but not annotated `U` is rejected: it is a value, not a type.
pub fn read_back_type(bound: &Bound, ty: &RcValue) -> Result<RcCore, CoreError> {
    match ty.as_ref() {
        Value::Universe => Ok(RcCore::from(Core::Universe)),
        Value::Nat => Ok(RcCore::from(Core::Nat)),
        Value::Atom => Ok(RcCore::from(Core::Atom)),
        Value::Trivial => Ok(RcCore::from(Core::Trivial)),
        Value::Absurd => Ok(RcCore::from(Core::Absurd)),

        Value::List(elem) => Ok(RcCore::from(Core::List(read_back_type(bound, elem)?))),
        Value::Vec(elem, len) => {
            let elem_core = read_back_type(bound, elem)?;
            let len_core = read_back(bound, &RcValue::from(Value::Nat), len)?;
            Ok(RcCore::from(Core::Vec(elem_core, len_core)))
        },
        Value::Either(a, b) => {
            Ok(RcCore::from(Core::Either(read_back_type(bound, a)?, read_back_type(bound, b)?)))
        },
        Value::Equal(a, x, y) => {
            let a_core = read_back_type(bound, a)?;
            let x_core = read_back(bound, a, x)?;
            let y_core = read_back(bound, a, y)?;
            Ok(RcCore::from(Core::Equal(a_core, x_core, y_core)))
        },

        Value::Pi(x, dom, codomain) => {
            let fresh = bound.fresh(x);
            let dom_core = read_back_type(bound, dom)?;
            let var = RcValue::var(fresh.clone(), dom.clone());
            let body_val = codomain.instantiate(var)?;
            let body_core = read_back_type(&bound.extend(fresh.clone()), &body_val)?;
            Ok(RcCore::from(Core::Pi(fresh, dom_core, body_core)))
        },
        Value::Sigma(x, a_ty, b_ty) => {
            let fresh = bound.fresh(x);
            let a_core = read_back_type(bound, a_ty)?;
            let var = RcValue::var(fresh.clone(), a_ty.clone());
            let b_val = b_ty.instantiate(var)?;
            let b_core = read_back_type(&bound.extend(fresh.clone()), &b_val)?;
            Ok(RcCore::from(Core::Sigma(fresh, a_core, b_core)))
        },

        Value::Datatype(decl, params, indices) => {
            let mut local_rho = Rho::new();
            let mut param_cores = Vec::with_capacity(params.len());
            for ((name, ty_core), val) in decl.params.iter().zip(params.iter()) {
                let ty_val = ty_core.eval(&local_rho)?;
                param_cores.push(read_back(bound, &ty_val, val)?);
                local_rho = local_rho.extend(name.clone(), val.clone());
            }
            let mut index_cores = Vec::with_capacity(indices.len());
            for ((name, ty_core), val) in decl.indices.iter().zip(indices.iter()) {
                let ty_val = ty_core.eval(&local_rho)?;
                index_cores.push(read_back(bound, &ty_val, val)?);
                local_rho = local_rho.extend(name.clone(), val.clone());
            }
            Ok(RcCore::from(Core::Datatype {
                name: decl.name.clone(),
                params: param_cores,
                indices: index_cores,
                decl: decl.clone(),
            }))
        },

        Value::Neutral(neutral, ann_ty) => match ann_ty.as_ref() {
            Value::Universe => read_back_neutral(bound, neutral),
            _ => Err(CoreError::IllTyped("read_back_type: neutral value is not a type")),
        },

        _ => Err(CoreError::IllTyped("read_back_type: not a type former")),
    }
}

/// Read back `value` into core syntax, given that it has type `ty`.
/// Function and pair values are eta-expanded unconditionally, which is what
/// makes the resulting core term a canonical representative for
/// definitional equality rather than merely *a* representative.
pub fn read_back(bound: &Bound, ty: &RcValue, value: &RcValue) -> Result<RcCore, CoreError> {
    match ty.as_ref() {
        Value::Universe => read_back_type(bound, value),

        Value::Nat => match value.as_ref() {
            Value::Zero => Ok(RcCore::from(Core::Zero)),
            Value::Add1(n) => Ok(RcCore::from(Core::Add1(read_back(bound, ty, n)?))),
            Value::Neutral(neutral, _) => read_back_neutral(bound, neutral),
            _ => Err(CoreError::IllTyped("read_back: expected Nat")),
        },
        Value::Atom => match value.as_ref() {
            Value::Tick(name) => Ok(RcCore::from(Core::Tick(name.clone()))),
            Value::Neutral(neutral, _) => read_back_neutral(bound, neutral),
            _ => Err(CoreError::IllTyped("read_back: expected Atom")),
        },
        Value::Trivial => Ok(RcCore::from(Core::Sole)),
        Value::Absurd => match value.as_ref() {
            Value::Neutral(neutral, _) => read_back_neutral(bound, neutral),
            _ => Err(CoreError::IllTyped("read_back: expected Absurd, which has no canonical values")),
        },

        Value::List(elem_ty) => match value.as_ref() {
            Value::Nil => Ok(RcCore::from(Core::Nil)),
            Value::ListCons(e, es) => {
                let e_core = read_back(bound, elem_ty, e)?;
                let es_core = read_back(bound, ty, es)?;
                Ok(RcCore::from(Core::ListCons(e_core, es_core)))
            },
            Value::Neutral(neutral, _) => read_back_neutral(bound, neutral),
            _ => Err(CoreError::IllTyped("read_back: expected List")),
        },
        Value::Vec(elem_ty, len) => match value.as_ref() {
            Value::VecNil => Ok(RcCore::from(Core::VecNil)),
            Value::VecCons(e, es) => {
                let k = match len.as_ref() {
                    Value::Add1(k) => k.clone(),
                    _ => return Err(CoreError::IllTyped("read_back: vec-cons at non-add1 length")),
                };
                let e_core = read_back(bound, elem_ty, e)?;
                let tail_ty = RcValue::from(Value::Vec(elem_ty.clone(), k));
                let es_core = read_back(bound, &tail_ty, es)?;
                Ok(RcCore::from(Core::VecCons(e_core, es_core)))
            },
            Value::Neutral(neutral, _) => read_back_neutral(bound, neutral),
            _ => Err(CoreError::IllTyped("read_back: expected Vec")),
        },

        Value::Pi(x, dom, codomain) => {
            let fresh = bound.fresh(x);
            let var = RcValue::var(fresh.clone(), dom.clone());
            let result = do_app(value.clone(), var.clone())?;
            let body_ty = codomain.instantiate(var)?;
            let body_core = read_back(&bound.extend(fresh.clone()), &body_ty, &result)?;
            Ok(RcCore::from(Core::Lambda(fresh, body_core)))
        },
        Value::Sigma(_, a_ty, b_ty) => {
            let car_v = do_car(value.clone())?;
            let cdr_v = do_cdr(value.clone())?;
            let b_val = b_ty.instantiate(car_v.clone())?;
            let a_core = read_back(bound, a_ty, &car_v)?;
            let b_core = read_back(bound, &b_val, &cdr_v)?;
            Ok(RcCore::from(Core::Cons(a_core, b_core)))
        },

        Value::Either(a_ty, b_ty) => match value.as_ref() {
            Value::Inl(v) => Ok(RcCore::from(Core::Inl(read_back(bound, a_ty, v)?))),
            Value::Inr(v) => Ok(RcCore::from(Core::Inr(read_back(bound, b_ty, v)?))),
            Value::Neutral(neutral, _) => read_back_neutral(bound, neutral),
            _ => Err(CoreError::IllTyped("read_back: expected Either")),
        },
        Value::Equal(a_ty, _, _) => match value.as_ref() {
            Value::Same(w) => Ok(RcCore::from(Core::Same(read_back(bound, a_ty, w)?))),
            Value::Neutral(neutral, _) => read_back_neutral(bound, neutral),
            _ => Err(CoreError::IllTyped("read_back: expected Same")),
        },

        Value::Datatype(decl, _, _) => match value.as_ref() {
            Value::Constr(ctor_name, args, ctor_decl, params) => {
                let ctor = ctor_decl
                    .constructor(ctor_name)
                    .ok_or(CoreError::IllTyped("read_back: unknown constructor"))?;
                let mut local_rho = Rho::new();
                for ((name, _), val) in decl.params.iter().zip(params.iter()) {
                    local_rho = local_rho.extend(name.clone(), val.clone());
                }
                let mut arg_cores = Vec::with_capacity(args.len());
                for ((name, arg_ty_core), val) in ctor.args.iter().zip(args.iter()) {
                    let arg_ty_val = arg_ty_core.eval(&local_rho)?;
                    arg_cores.push(read_back(bound, &arg_ty_val, val)?);
                    local_rho = local_rho.extend(name.clone(), val.clone());
                }
                Ok(RcCore::from(Core::Constr {
                    name: ctor_name.clone(),
                    args: arg_cores,
                    datatype: decl.name.clone(),
                    decl: ctor_decl.clone(),
                }))
            },
            Value::Neutral(neutral, _) => read_back_neutral(bound, neutral),
            _ => Err(CoreError::IllTyped("read_back: expected a constructor application")),
        },

        // The type itself is stuck; a well-typed value classified by it is
        // necessarily neutral too.
        Value::Neutral(_, _) => match value.as_ref() {
            Value::Neutral(neutral, _) => read_back_neutral(bound, neutral),
            _ => Err(CoreError::IllTyped("read_back: non-neutral value at a neutral type")),
        },

        _ => Err(CoreError::IllTyped("read_back: not a recognized type")),
    }
}

fn read_back_normal(bound: &Bound, normal: &Normal) -> Result<RcCore, CoreError> {
    read_back(bound, &normal.ty, &normal.value)
}

/// Reconstruct the core spine of a stuck computation. Each eliminator's
/// neutral carries exactly the [`Normal`]s (or further neutrals) it needs
/// to read back its own arguments - this is why `Neutral` has one
/// constructor per eliminator rather than one generic "stuck" case: each
/// case here can just destructure and recurse, with no need to recover a
/// lost eliminator tag.
fn read_back_neutral(bound: &Bound, neutral: &RcNeutral) -> Result<RcCore, CoreError> {
    use crate::domain::Neutral::*;

    match neutral.as_ref() {
        Var(name) => Ok(RcCore::from(Core::Var(name.clone()))),
        App(f, arg) => Ok(RcCore::from(Core::App(read_back_neutral(bound, f)?, read_back_normal(bound, arg)?))),
        Car(p) => Ok(RcCore::from(Core::Car(read_back_neutral(bound, p)?))),
        Cdr(p) => Ok(RcCore::from(Core::Cdr(read_back_neutral(bound, p)?))),

        WhichNat { target, base_ty, base, step } => Ok(RcCore::from(Core::WhichNat {
            target: read_back_neutral(bound, target)?,
            base_ty: read_back_normal(bound, base_ty)?,
            base: read_back_normal(bound, base)?,
            step: read_back_normal(bound, step)?,
        })),
        IterNat { target, base_ty, base, step } => Ok(RcCore::from(Core::IterNat {
            target: read_back_neutral(bound, target)?,
            base_ty: read_back_normal(bound, base_ty)?,
            base: read_back_normal(bound, base)?,
            step: read_back_normal(bound, step)?,
        })),
        RecNat { target, base_ty, base, step } => Ok(RcCore::from(Core::RecNat {
            target: read_back_neutral(bound, target)?,
            base_ty: read_back_normal(bound, base_ty)?,
            base: read_back_normal(bound, base)?,
            step: read_back_normal(bound, step)?,
        })),
        IndNat { target, motive, base, step } => Ok(RcCore::from(Core::IndNat {
            target: read_back_neutral(bound, target)?,
            motive: read_back_normal(bound, motive)?,
            base: read_back_normal(bound, base)?,
            step: read_back_normal(bound, step)?,
        })),

        RecList { target, base_ty, base, step } => Ok(RcCore::from(Core::RecList {
            target: read_back_neutral(bound, target)?,
            base_ty: read_back_normal(bound, base_ty)?,
            base: read_back_normal(bound, base)?,
            step: read_back_normal(bound, step)?,
        })),
        IndList { target, motive, base, step } => Ok(RcCore::from(Core::IndList {
            target: read_back_neutral(bound, target)?,
            motive: read_back_normal(bound, motive)?,
            base: read_back_normal(bound, base)?,
            step: read_back_normal(bound, step)?,
        })),

        Head(v) => Ok(RcCore::from(Core::Head(read_back_neutral(bound, v)?))),
        Tail(v) => Ok(RcCore::from(Core::Tail(read_back_neutral(bound, v)?))),
        IndVec { len, target, motive, base, step } => Ok(RcCore::from(Core::IndVec {
            len: read_back_normal(bound, len)?,
            target: read_back_neutral(bound, target)?,
            motive: read_back_normal(bound, motive)?,
            base: read_back_normal(bound, base)?,
            step: read_back_normal(bound, step)?,
        })),

        Symm(w) => Ok(RcCore::from(Core::Symm(read_back_neutral(bound, w)?))),
        Cong { target, func } => {
            Ok(RcCore::from(Core::Cong(read_back_neutral(bound, target)?, read_back_normal(bound, func)?)))
        },
        Replace { target, motive, base } => Ok(RcCore::from(Core::Replace {
            target: read_back_neutral(bound, target)?,
            motive: read_back_normal(bound, motive)?,
            base: read_back_normal(bound, base)?,
        })),
        TransLL(l, r) => Ok(RcCore::from(Core::Trans(read_back_neutral(bound, l)?, read_back_neutral(bound, r)?))),
        TransL(l, right) => {
            Ok(RcCore::from(Core::Trans(read_back_neutral(bound, l)?, read_back_normal(bound, right)?)))
        },
        TransR(left, r) => {
            Ok(RcCore::from(Core::Trans(read_back_normal(bound, left)?, read_back_neutral(bound, r)?)))
        },
        IndEqual { target, motive, base } => Ok(RcCore::from(Core::IndEqual {
            target: read_back_neutral(bound, target)?,
            motive: read_back_normal(bound, motive)?,
            base: read_back_normal(bound, base)?,
        })),

        IndEither { target, motive, base_l, base_r } => Ok(RcCore::from(Core::IndEither {
            target: read_back_neutral(bound, target)?,
            motive: read_back_normal(bound, motive)?,
            base_l: read_back_normal(bound, base_l)?,
            base_r: read_back_normal(bound, base_r)?,
        })),
        IndAbsurd { target, motive } => Ok(RcCore::from(Core::IndAbsurd(
            read_back_neutral(bound, target)?,
            read_back_normal(bound, motive)?,
        ))),

        Match { target, arms, motive } => Ok(RcCore::from(Core::Match {
            target: read_back_neutral(bound, target)?,
            arms: arms.as_ref().clone(),
            motive: read_back_normal(bound, motive)?,
        })),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::domain::Closure;
    use crate::ident::Symbol;

    #[test]
    fn reading_back_two_add1s_over_zero_reproduces_the_literal() {
        let two = RcValue::from(Value::Add1(RcValue::from(Value::Add1(RcValue::from(Value::Zero)))));
        let core = read_back(&Bound::new(), &RcValue::from(Value::Nat), &two).expect("2 : Nat reads back");
        assert_eq!(core, RcCore::from(Core::Add1(RcCore::from(Core::Add1(RcCore::from(Core::Zero))))));
    }

    #[test]
    fn reading_back_a_neutral_variable_as_a_type_recovers_its_name() {
        let bound = Bound::new();
        let neutral_nat = RcValue::var(Symbol::new("n"), RcValue::from(Value::Universe));
        let core = read_back_type(&bound, &neutral_nat).expect("a U-annotated neutral reads back as a type");
        assert_eq!(core, RcCore::from(Core::Var(Symbol::new("n"))));
    }

    #[test]
    fn a_neutral_function_eta_expands_into_a_lambda() {
        let dom = RcValue::from(Value::Nat);
        let codomain = Closure::Const(dom.clone());
        let ty = RcValue::from(Value::Pi(Symbol::new("x"), dom.clone(), codomain));
        let f = RcValue::var(Symbol::new("f"), ty.clone());

        let core = read_back(&Bound::new(), &ty, &f).expect("a neutral Pi value eta-expands");
        match core.as_ref() {
            Core::Lambda(_, body) => match body.as_ref() {
                Core::App(head, arg) => {
                    assert_eq!(head.as_ref(), &Core::Var(Symbol::new("f")));
                    assert!(matches!(arg.as_ref(), Core::Var(_)));
                },
                other => panic!("expected the eta-expanded body to be an application, found {:?}", other),
            },
            other => panic!("expected a lambda, found {:?}", other),
        }
    }
}
