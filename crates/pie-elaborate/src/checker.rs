//! The bidirectional type checker: `synth`, `check`, and `is_type`.
//!
//! `synth` is used for expressions whose type is unambiguous from their own
//! shape (variables, eliminators, type formers, `the`-ascriptions).
//! `check` is used for introduction forms whose type can't be recovered
//! from the expression alone (lambdas, pairs, `nil`, `same`, ...) - it
//! either has a dedicated rule for the expected type's shape, or falls back
//! to `synth` plus a definitional-equality check.

use pie_core::{
    do_app, do_car, either_base_ty, pi_const, pi_native, step_ty_list, step_ty_nat, step_ty_vec, Core, Gamma, RcCore,
    RcType, RcValue, Rho, Symbol, Value,
};
use pie_surface::Expr;

use crate::equality::{show_type, show_value, types_equal, values_equal};
use crate::error::ElabError;
use crate::matching::check_match;
use crate::telescope::elab_telescope;

/// Split `(f a b c)`-shaped application trees into a head and a flat
/// argument list; anything else is its own head with no arguments.
fn spine(expr: &Expr) -> (&Expr, Vec<pie_surface::RcExpr>) {
    match expr {
        Expr::App(f, args) => (f.as_ref(), args.clone()),
        other => (other, Vec::new()),
    }
}

/// Classify expressions that denote a type, elaborating them to core
/// syntax. Distinct from `check(expr, Universe)` only in that it also
/// accepts the type-former syntax directly, without requiring a `the`
/// ascription - exactly as `isType` is specified to behave.
pub fn is_type(gamma: &Gamma, expr: &Expr) -> Result<RcCore, ElabError> {
    match expr {
        Expr::U => Ok(RcCore::from(Core::Universe)),
        Expr::Atom => Ok(RcCore::from(Core::Atom)),
        Expr::Nat => Ok(RcCore::from(Core::Nat)),
        Expr::Trivial => Ok(RcCore::from(Core::Trivial)),
        Expr::Absurd => Ok(RcCore::from(Core::Absurd)),

        Expr::List(elem) => Ok(RcCore::from(Core::List(is_type(gamma, elem)?))),
        Expr::Vec(elem, len) => {
            let elem_core = is_type(gamma, elem)?;
            let len_core = check(gamma, len, &RcValue::from(Value::Nat))?;
            Ok(RcCore::from(Core::Vec(elem_core, len_core)))
        },
        Expr::Either(a, b) => Ok(RcCore::from(Core::Either(is_type(gamma, a)?, is_type(gamma, b)?))),
        Expr::Equal(a, x, y) => {
            let a_core = is_type(gamma, a)?;
            let a_val = a_core.eval(&gamma.to_rho())?;
            let x_core = check(gamma, x, &a_val)?;
            let y_core = check(gamma, y, &a_val)?;
            Ok(RcCore::from(Core::Equal(a_core, x_core, y_core)))
        },

        Expr::Arrow(doms, codomain) => {
            // desugars to a right-nested non-dependent Pi
            let mut gamma = gamma.clone();
            let mut cores = Vec::with_capacity(doms.len());
            for dom in doms {
                let dom_core = is_type(&gamma, dom)?;
                let dom_val = dom_core.eval(&gamma.to_rho())?;
                let fresh = gamma.fresh(&Symbol::new("_"));
                gamma = gamma.add_hastype(fresh, dom_val);
                cores.push(dom_core);
            }
            let codomain_core = is_type(&gamma, codomain)?;
            Ok(cores.into_iter().rev().fold(codomain_core, |body, dom_core| {
                RcCore::from(Core::Pi(Symbol::new("_"), dom_core, body))
            }))
        },
        Expr::Pi(binders, codomain) => {
            let mut gamma = gamma.clone();
            let mut names_and_cores = Vec::with_capacity(binders.len());
            for (name, ty) in binders {
                let ty_core = is_type(&gamma, ty)?;
                let ty_val = ty_core.eval(&gamma.to_rho())?;
                gamma = gamma.add_hastype(name.clone(), ty_val);
                names_and_cores.push((name.clone(), ty_core));
            }
            let codomain_core = is_type(&gamma, codomain)?;
            Ok(names_and_cores.into_iter().rev().fold(codomain_core, |body, (name, ty_core)| {
                RcCore::from(Core::Pi(name, ty_core, body))
            }))
        },
        Expr::Sigma(binders, codomain) => {
            let mut gamma = gamma.clone();
            let mut names_and_cores = Vec::with_capacity(binders.len());
            for (name, ty) in binders {
                let ty_core = is_type(&gamma, ty)?;
                let ty_val = ty_core.eval(&gamma.to_rho())?;
                gamma = gamma.add_hastype(name.clone(), ty_val);
                names_and_cores.push((name.clone(), ty_core));
            }
            let codomain_core = is_type(&gamma, codomain)?;
            Ok(names_and_cores.into_iter().rev().fold(codomain_core, |body, (name, ty_core)| {
                RcCore::from(Core::Sigma(name, ty_core, body))
            }))
        },

        _ => {
            let (head, args) = spine(expr);
            if let Expr::Var(name) = head {
                if let Some(decl) = gamma.lookup_data(name) {
                    let total = decl.params.len() + decl.indices.len();
                    if args.len() != total {
                        return Err(ElabError::ArityError { name: name.clone(), expected: total, found: args.len() });
                    }
                    let (param_args, index_args) = args.split_at(decl.params.len());
                    let (param_cores, _, rho_after_params) = elab_telescope(gamma, &Rho::new(), &decl.params, param_args)?;
                    let (index_cores, _, _) = elab_telescope(gamma, &rho_after_params, &decl.indices, index_args)?;
                    return Ok(RcCore::from(Core::Datatype {
                        name: name.clone(),
                        params: param_cores,
                        indices: index_cores,
                        decl: decl.clone(),
                    }));
                }
            }

            // Fall back to synth and require the result classifies as U.
            let (core, ty) = synth(gamma, expr)?;
            match ty.as_ref() {
                Value::Universe => Ok(core),
                _ => Err(ElabError::NotAType(format!("{}", expr_shape(expr)))),
            }
        },
    }
}

/// Synthesize a core term and its type for expressions whose shape
/// determines their type unambiguously.
pub fn synth(gamma: &Gamma, expr: &Expr) -> Result<(RcCore, RcType), ElabError> {
    match expr {
        Expr::Var(name) => {
            let ty = gamma.lookup_type(name).ok_or_else(|| ElabError::Unbound(name.clone()))?;
            Ok((RcCore::from(Core::Var(name.clone())), ty))
        },
        Expr::The(ty, e) => {
            let ty_core = is_type(gamma, ty)?;
            let ty_val = ty_core.eval(&gamma.to_rho())?;
            let e_core = check(gamma, e, &ty_val)?;
            Ok((e_core, ty_val))
        },

        Expr::U => Ok((RcCore::from(Core::Universe), RcValue::from(Value::Universe))),
        Expr::Atom => Ok((RcCore::from(Core::Atom), RcValue::from(Value::Universe))),
        Expr::Nat => Ok((RcCore::from(Core::Nat), RcValue::from(Value::Universe))),
        Expr::Trivial => Ok((RcCore::from(Core::Trivial), RcValue::from(Value::Universe))),
        Expr::Absurd => Ok((RcCore::from(Core::Absurd), RcValue::from(Value::Universe))),
        Expr::List(_) | Expr::Vec(_, _) | Expr::Either(_, _) | Expr::Equal(_, _, _) | Expr::Arrow(_, _) | Expr::Pi(_, _) | Expr::Sigma(_, _) => {
            let core = is_type(gamma, expr)?;
            Ok((core, RcValue::from(Value::Universe)))
        },

        Expr::Tick(name) => Ok((RcCore::from(Core::Tick(name.clone())), RcValue::from(Value::Atom))),
        Expr::Zero => Ok((RcCore::from(Core::Zero), RcValue::from(Value::Nat))),
        Expr::NatLit(n) => Ok((nat_lit_core(*n), RcValue::from(Value::Nat))),
        Expr::Add1(n) => {
            let n_core = check(gamma, n, &RcValue::from(Value::Nat))?;
            Ok((RcCore::from(Core::Add1(n_core)), RcValue::from(Value::Nat)))
        },
        Expr::Sole => Ok((RcCore::from(Core::Sole), RcValue::from(Value::Trivial))),

        Expr::Car(pair) => {
            let (pair_core, pair_ty) = synth(gamma, pair)?;
            match pair_ty.as_ref() {
                Value::Sigma(_, a_ty, _) => Ok((RcCore::from(Core::Car(pair_core)), a_ty.clone())),
                _ => Err(ElabError::ShapeMismatch { expected: "Sigma", found: show_type(&pair_ty) }),
            }
        },
        Expr::Cdr(pair) => {
            let (pair_core, pair_ty) = synth(gamma, pair)?;
            match pair_ty.as_ref() {
                Value::Sigma(_, _, b_ty) => {
                    let pair_val = pair_core.eval(&gamma.to_rho())?;
                    let car_val = do_car(pair_val)?;
                    let result_ty = b_ty.instantiate(car_val)?;
                    Ok((RcCore::from(Core::Cdr(pair_core)), result_ty))
                },
                _ => Err(ElabError::ShapeMismatch { expected: "Sigma", found: show_type(&pair_ty) }),
            }
        },

        Expr::Head(v) => {
            let (v_core, v_ty) = synth(gamma, v)?;
            match v_ty.as_ref() {
                Value::Vec(elem_ty, _) => Ok((RcCore::from(Core::Head(v_core)), elem_ty.clone())),
                _ => Err(ElabError::ShapeMismatch { expected: "Vec", found: show_type(&v_ty) }),
            }
        },
        Expr::Tail(v) => {
            let (v_core, v_ty) = synth(gamma, v)?;
            match v_ty.as_ref() {
                Value::Vec(elem_ty, len) => match len.as_ref() {
                    Value::Add1(k) => Ok((RcCore::from(Core::Tail(v_core)), RcValue::from(Value::Vec(elem_ty.clone(), k.clone())))),
                    _ => Err(ElabError::ShapeMismatch { expected: "Vec of add1 length", found: show_type(&v_ty) }),
                },
                _ => Err(ElabError::ShapeMismatch { expected: "Vec", found: show_type(&v_ty) }),
            }
        },

        Expr::WhichNat(target, base, step) => {
            let target_core = check(gamma, target, &RcValue::from(Value::Nat))?;
            let (base_core, base_ty) = synth(gamma, base)?;
            let step_ty = pi_const(RcValue::from(Value::Nat), base_ty.clone());
            let step_core = check(gamma, step, &step_ty)?;
            let base_ty_core = pie_core::read_back_type(&pie_core::Bound::new(), &base_ty)?;
            Ok((
                RcCore::from(Core::WhichNat { target: target_core, base_ty: base_ty_core, base: base_core, step: step_core }),
                base_ty,
            ))
        },
        Expr::IterNat(target, base, step) => {
            let target_core = check(gamma, target, &RcValue::from(Value::Nat))?;
            let (base_core, base_ty) = synth(gamma, base)?;
            let step_ty = pi_const(base_ty.clone(), base_ty.clone());
            let step_core = check(gamma, step, &step_ty)?;
            let base_ty_core = pie_core::read_back_type(&pie_core::Bound::new(), &base_ty)?;
            Ok((
                RcCore::from(Core::IterNat { target: target_core, base_ty: base_ty_core, base: base_core, step: step_core }),
                base_ty,
            ))
        },
        Expr::RecNat(target, base, step) => {
            let target_core = check(gamma, target, &RcValue::from(Value::Nat))?;
            let (base_core, base_ty) = synth(gamma, base)?;
            let step_ty = pi_native(RcValue::from(Value::Nat), {
                let base_ty = base_ty.clone();
                move |_n| Ok(pi_const(base_ty.clone(), base_ty.clone()))
            });
            let step_core = check(gamma, step, &step_ty)?;
            let base_ty_core = pie_core::read_back_type(&pie_core::Bound::new(), &base_ty)?;
            Ok((
                RcCore::from(Core::RecNat { target: target_core, base_ty: base_ty_core, base: base_core, step: step_core }),
                base_ty,
            ))
        },
        Expr::IndNat(target, motive, base, step) => {
            let target_core = check(gamma, target, &RcValue::from(Value::Nat))?;
            let target_val = target_core.eval(&gamma.to_rho())?;
            let motive_ty = pi_const(RcValue::from(Value::Nat), RcValue::from(Value::Universe));
            let motive_core = check(gamma, motive, &motive_ty)?;
            let motive_val = motive_core.eval(&gamma.to_rho())?;
            let base_ty = do_app(motive_val.clone(), RcValue::from(Value::Zero))?;
            let base_core = check(gamma, base, &base_ty)?;
            let step_core = check(gamma, step, &step_ty_nat(motive_val.clone()))?;
            let result_ty = do_app(motive_val, target_val)?;
            Ok((RcCore::from(Core::IndNat { target: target_core, motive: motive_core, base: base_core, step: step_core }), result_ty))
        },

        Expr::RecList(target, base, step) => {
            let (target_core, target_ty) = synth(gamma, target)?;
            let elem_ty = match target_ty.as_ref() {
                Value::List(elem) => elem.clone(),
                _ => return Err(ElabError::ShapeMismatch { expected: "List", found: show_type(&target_ty) }),
            };
            let (base_core, base_ty) = synth(gamma, base)?;
            let list_ty = RcValue::from(Value::List(elem_ty.clone()));
            let step_ty = pi_native(elem_ty, {
                let list_ty = list_ty.clone();
                let base_ty = base_ty.clone();
                move |_e| Ok(pi_const(list_ty.clone(), pi_const(base_ty.clone(), base_ty.clone())))
            });
            let step_core = check(gamma, step, &step_ty)?;
            let base_ty_core = pie_core::read_back_type(&pie_core::Bound::new(), &base_ty)?;
            Ok((
                RcCore::from(Core::RecList { target: target_core, base_ty: base_ty_core, base: base_core, step: step_core }),
                base_ty,
            ))
        },
        Expr::IndList(target, motive, base, step) => {
            let (target_core, target_ty) = synth(gamma, target)?;
            let elem_ty = match target_ty.as_ref() {
                Value::List(elem) => elem.clone(),
                _ => return Err(ElabError::ShapeMismatch { expected: "List", found: show_type(&target_ty) }),
            };
            let target_val = target_core.eval(&gamma.to_rho())?;
            let list_ty = RcValue::from(Value::List(elem_ty.clone()));
            let motive_ty = pi_const(list_ty, RcValue::from(Value::Universe));
            let motive_core = check(gamma, motive, &motive_ty)?;
            let motive_val = motive_core.eval(&gamma.to_rho())?;
            let base_ty = do_app(motive_val.clone(), RcValue::from(Value::Nil))?;
            let base_core = check(gamma, base, &base_ty)?;
            let step_core = check(gamma, step, &step_ty_list(elem_ty, motive_val.clone()))?;
            let result_ty = do_app(motive_val, target_val)?;
            Ok((RcCore::from(Core::IndList { target: target_core, motive: motive_core, base: base_core, step: step_core }), result_ty))
        },

        Expr::IndVec(len, target, motive, base, step) => {
            let len_core = check(gamma, len, &RcValue::from(Value::Nat))?;
            let len_val = len_core.eval(&gamma.to_rho())?;
            let (target_core, target_ty) = synth(gamma, target)?;
            let elem_ty = match target_ty.as_ref() {
                Value::Vec(elem, _) => elem.clone(),
                _ => return Err(ElabError::ShapeMismatch { expected: "Vec", found: show_type(&target_ty) }),
            };
            let target_val = target_core.eval(&gamma.to_rho())?;
            let motive_ty = pi_native(RcValue::from(Value::Nat), {
                let elem_ty = elem_ty.clone();
                move |n: RcValue| Ok(pi_const(RcValue::from(Value::Vec(elem_ty.clone(), n)), RcValue::from(Value::Universe)))
            });
            let motive_core = check(gamma, motive, &motive_ty)?;
            let motive_val = motive_core.eval(&gamma.to_rho())?;
            let base_ty = do_app(do_app(motive_val.clone(), RcValue::from(Value::Zero))?, RcValue::from(Value::VecNil))?;
            let base_core = check(gamma, base, &base_ty)?;
            let step_core = check(gamma, step, &step_ty_vec(elem_ty, motive_val.clone()))?;
            let result_ty = do_app(do_app(motive_val, len_val)?, target_val)?;
            Ok((
                RcCore::from(Core::IndVec { len: len_core, target: target_core, motive: motive_core, base: base_core, step: step_core }),
                result_ty,
            ))
        },

        Expr::Symm(w) => {
            let (w_core, w_ty) = synth(gamma, w)?;
            match w_ty.as_ref() {
                Value::Equal(a, x, y) => Ok((RcCore::from(Core::Symm(w_core)), RcValue::from(Value::Equal(a.clone(), y.clone(), x.clone())))),
                _ => Err(ElabError::ShapeMismatch { expected: "=", found: show_type(&w_ty) }),
            }
        },
        Expr::Cong(target, func) => {
            let (target_core, target_ty) = synth(gamma, target)?;
            let (a, x, y) = match target_ty.as_ref() {
                Value::Equal(a, x, y) => (a.clone(), x.clone(), y.clone()),
                _ => return Err(ElabError::ShapeMismatch { expected: "=", found: show_type(&target_ty) }),
            };
            let (func_core, func_ty) = synth(gamma, func)?;
            let (dom, codomain) = match func_ty.as_ref() {
                Value::Pi(_, dom, codomain) => (dom.clone(), codomain.clone()),
                _ => return Err(ElabError::ShapeMismatch { expected: "Pi", found: show_type(&func_ty) }),
            };
            if !types_equal(&a, &dom)? {
                return Err(ElabError::TypeMismatch { expected: show_type(&dom), found: show_type(&a) });
            }
            let func_val = func_core.eval(&gamma.to_rho())?;
            let fx = do_app(func_val.clone(), x)?;
            let fy = do_app(func_val.clone(), y)?;
            let result_ty = codomain.instantiate(fx.clone())?;
            Ok((RcCore::from(Core::Cong(target_core, func_core)), RcValue::from(Value::Equal(result_ty, fx, fy))))
        },
        Expr::Trans(l, r) => {
            let (l_core, l_ty) = synth(gamma, l)?;
            let (r_core, r_ty) = synth(gamma, r)?;
            let (a, x, _) = match l_ty.as_ref() {
                Value::Equal(a, x, y) => (a.clone(), x.clone(), y.clone()),
                _ => return Err(ElabError::ShapeMismatch { expected: "=", found: show_type(&l_ty) }),
            };
            let (a2, _, z) = match r_ty.as_ref() {
                Value::Equal(a, x, y) => (a.clone(), x.clone(), y.clone()),
                _ => return Err(ElabError::ShapeMismatch { expected: "=", found: show_type(&r_ty) }),
            };
            if !types_equal(&a, &a2)? {
                return Err(ElabError::TypeMismatch { expected: show_type(&a), found: show_type(&a2) });
            }
            Ok((RcCore::from(Core::Trans(l_core, r_core)), RcValue::from(Value::Equal(a, x, z))))
        },
        Expr::Replace(target, motive, base) => {
            let (target_core, target_ty) = synth(gamma, target)?;
            let (a, from, to) = match target_ty.as_ref() {
                Value::Equal(a, x, y) => (a.clone(), x.clone(), y.clone()),
                _ => return Err(ElabError::ShapeMismatch { expected: "=", found: show_type(&target_ty) }),
            };
            let motive_ty = pi_const(a, RcValue::from(Value::Universe));
            let motive_core = check(gamma, motive, &motive_ty)?;
            let motive_val = motive_core.eval(&gamma.to_rho())?;
            let base_ty = do_app(motive_val.clone(), from)?;
            let base_core = check(gamma, base, &base_ty)?;
            let result_ty = do_app(motive_val, to)?;
            Ok((RcCore::from(Core::Replace { target: target_core, motive: motive_core, base: base_core }), result_ty))
        },
        Expr::IndEqual(target, motive, base) => {
            let (target_core, target_ty) = synth(gamma, target)?;
            let (a, from, to) = match target_ty.as_ref() {
                Value::Equal(a, x, y) => (a.clone(), x.clone(), y.clone()),
                _ => return Err(ElabError::ShapeMismatch { expected: "=", found: show_type(&target_ty) }),
            };
            // motive : Pi (x : A) (_ : from = x) . U
            let motive_ty = pi_native(a.clone(), {
                let a = a.clone();
                let from = from.clone();
                move |x: RcValue| Ok(pi_const(RcValue::from(Value::Equal(a.clone(), from.clone(), x)), RcValue::from(Value::Universe)))
            });
            let motive_core = check(gamma, motive, &motive_ty)?;
            let motive_val = motive_core.eval(&gamma.to_rho())?;
            let target_val = target_core.eval(&gamma.to_rho())?;
            let base_ty = do_app(do_app(motive_val.clone(), from.clone())?, RcValue::from(Value::Same(from)))?;
            let base_core = check(gamma, base, &base_ty)?;
            let result_ty = do_app(do_app(motive_val, to)?, target_val)?;
            Ok((RcCore::from(Core::IndEqual { target: target_core, motive: motive_core, base: base_core }), result_ty))
        },

        Expr::IndEither(target, motive, base_l, base_r) => {
            let (target_core, target_ty) = synth(gamma, target)?;
            let (left_ty, right_ty) = match target_ty.as_ref() {
                Value::Either(a, b) => (a.clone(), b.clone()),
                _ => return Err(ElabError::ShapeMismatch { expected: "Either", found: show_type(&target_ty) }),
            };
            let target_val = target_core.eval(&gamma.to_rho())?;
            let either_ty = RcValue::from(Value::Either(left_ty.clone(), right_ty.clone()));
            let motive_ty = pi_const(either_ty, RcValue::from(Value::Universe));
            let motive_core = check(gamma, motive, &motive_ty)?;
            let motive_val = motive_core.eval(&gamma.to_rho())?;
            let base_l_core = check(gamma, base_l, &either_base_ty(left_ty, motive_val.clone(), Value::Inl))?;
            let base_r_core = check(gamma, base_r, &either_base_ty(right_ty, motive_val.clone(), Value::Inr))?;
            let result_ty = do_app(motive_val, target_val)?;
            Ok((RcCore::from(Core::IndEither { target: target_core, motive: motive_core, base_l: base_l_core, base_r: base_r_core }), result_ty))
        },
        Expr::IndAbsurd(target, motive) => {
            let target_core = check(gamma, target, &RcValue::from(Value::Absurd))?;
            let motive_core = is_type(gamma, motive)?;
            let motive_val = motive_core.eval(&gamma.to_rho())?;
            Ok((RcCore::from(Core::IndAbsurd(target_core, motive_core)), motive_val))
        },

        Expr::App(f, args) => synth_app(gamma, f, args),

        Expr::Match(target, arms) => crate::matching::synth_match(gamma, target, arms),

        other => Err(ElabError::CannotSynth(format!("{}", expr_shape(other)))),
    }
}

fn synth_app(gamma: &Gamma, f: &pie_surface::RcExpr, args: &[pie_surface::RcExpr]) -> Result<(RcCore, RcType), ElabError> {
    if let Expr::Var(name) = f.as_ref() {
        if let Some((_, decl)) = gamma.lookup_constructor(name) {
            return Err(ElabError::CannotSynth(format!(
                "{} (a constructor of {} must be checked against its datatype)",
                name, decl.name
            )));
        }
    }

    let (mut f_core, mut f_ty) = synth(gamma, f.as_ref())?;
    for arg in args {
        match f_ty.as_ref() {
            Value::Pi(_, dom, codomain) => {
                let arg_core = check(gamma, arg, dom)?;
                let arg_val = arg_core.eval(&gamma.to_rho())?;
                f_ty = codomain.instantiate(arg_val)?;
                f_core = RcCore::from(Core::App(f_core, arg_core));
            },
            _ => return Err(ElabError::ShapeMismatch { expected: "Pi", found: show_type(&f_ty) }),
        }
    }
    Ok((f_core, f_ty))
}

fn nat_lit_core(n: u64) -> RcCore {
    let mut core = RcCore::from(Core::Zero);
    for _ in 0..n {
        core = RcCore::from(Core::Add1(core));
    }
    core
}

fn expr_shape(expr: &Expr) -> String {
    format!("{:?}", std::mem::discriminant(expr))
}

/// Check `expr` against `expected`, either via a dedicated introduction
/// rule for `expected`'s shape, or by synthesizing and comparing.
pub fn check(gamma: &Gamma, expr: &Expr, expected: &RcType) -> Result<RcCore, ElabError> {
    match expr {
        Expr::Lambda(xs, body) => check_lambda(gamma, xs, body, expected),

        Expr::Pair(a, b) | Expr::Cons(a, b) => match expected.as_ref() {
            Value::Sigma(_, a_ty, b_ty) => {
                let a_core = check(gamma, a, a_ty)?;
                let a_val = a_core.eval(&gamma.to_rho())?;
                let b_ty_val = b_ty.instantiate(a_val)?;
                let b_core = check(gamma, b, &b_ty_val)?;
                Ok(RcCore::from(Core::Cons(a_core, b_core)))
            },
            _ => Err(ElabError::TypeMismatch { expected: show_type(expected), found: "a pair".to_string() }),
        },

        Expr::Zero => match expected.as_ref() {
            Value::Nat => Ok(RcCore::from(Core::Zero)),
            _ => check_via_synth(gamma, expr, expected),
        },
        Expr::Add1(n) => match expected.as_ref() {
            Value::Nat => Ok(RcCore::from(Core::Add1(check(gamma, n, expected)?))),
            _ => check_via_synth(gamma, expr, expected),
        },
        Expr::NatLit(lit) => match expected.as_ref() {
            Value::Nat => Ok(nat_lit_core(*lit)),
            _ => check_via_synth(gamma, expr, expected),
        },

        Expr::Nil => match expected.as_ref() {
            Value::List(_) => Ok(RcCore::from(Core::Nil)),
            _ => Err(ElabError::TypeMismatch { expected: show_type(expected), found: "nil".to_string() }),
        },
        Expr::ListCons(e, es) => match expected.as_ref() {
            Value::List(elem_ty) => {
                let e_core = check(gamma, e, elem_ty)?;
                let es_core = check(gamma, es, expected)?;
                Ok(RcCore::from(Core::ListCons(e_core, es_core)))
            },
            _ => Err(ElabError::TypeMismatch { expected: show_type(expected), found: "a list cons".to_string() }),
        },

        Expr::VecNil => match expected.as_ref() {
            Value::Vec(_, len) => match len.as_ref() {
                Value::Zero => Ok(RcCore::from(Core::VecNil)),
                _ => Err(ElabError::TypeMismatch { expected: show_type(expected), found: "vecnil".to_string() }),
            },
            _ => Err(ElabError::TypeMismatch { expected: show_type(expected), found: "vecnil".to_string() }),
        },
        Expr::VecCons(e, es) => match expected.as_ref() {
            Value::Vec(elem_ty, len) => match len.as_ref() {
                Value::Add1(k) => {
                    let e_core = check(gamma, e, elem_ty)?;
                    let tail_ty = RcValue::from(Value::Vec(elem_ty.clone(), k.clone()));
                    let es_core = check(gamma, es, &tail_ty)?;
                    Ok(RcCore::from(Core::VecCons(e_core, es_core)))
                },
                _ => Err(ElabError::TypeMismatch { expected: show_type(expected), found: "vec::".to_string() }),
            },
            _ => Err(ElabError::TypeMismatch { expected: show_type(expected), found: "vec::".to_string() }),
        },

        Expr::Same(w) => match expected.as_ref() {
            Value::Equal(a, x, y) => {
                let w_core = check(gamma, w, a)?;
                let w_val = w_core.eval(&gamma.to_rho())?;
                if !values_equal(a, &w_val, x)? || !values_equal(a, &w_val, y)? {
                    return Err(ElabError::NotStructurallyEquiv {
                        at_type: show_type(a),
                        lhs: show_value(a, x),
                        rhs: show_value(a, y),
                    });
                }
                Ok(RcCore::from(Core::Same(w_core)))
            },
            _ => Err(ElabError::TypeMismatch { expected: show_type(expected), found: "same".to_string() }),
        },

        Expr::Left(v) => match expected.as_ref() {
            Value::Either(a, _) => Ok(RcCore::from(Core::Inl(check(gamma, v, a)?))),
            _ => Err(ElabError::TypeMismatch { expected: show_type(expected), found: "left".to_string() }),
        },
        Expr::Right(v) => match expected.as_ref() {
            Value::Either(_, b) => Ok(RcCore::from(Core::Inr(check(gamma, v, b)?))),
            _ => Err(ElabError::TypeMismatch { expected: show_type(expected), found: "right".to_string() }),
        },

        Expr::Sole => match expected.as_ref() {
            Value::Trivial => Ok(RcCore::from(Core::Sole)),
            _ => check_via_synth(gamma, expr, expected),
        },

        Expr::Match(target, arms) => check_match(gamma, target, arms, expected),

        _ => {
            let (head, args) = spine(expr);
            if let Expr::Var(name) = head {
                if let Value::Datatype(decl, params, indices) = expected.as_ref() {
                    if decl.constructor(name).is_some() {
                        return check_constructor(gamma, name, &args, decl, params, indices);
                    }
                }
            }
            check_via_synth(gamma, expr, expected)
        },
    }
}

fn check_via_synth(gamma: &Gamma, expr: &Expr, expected: &RcType) -> Result<RcCore, ElabError> {
    let (core, found_ty) = synth(gamma, expr)?;
    if types_equal(expected, &found_ty)? {
        Ok(core)
    } else {
        Err(ElabError::TypeMismatch { expected: show_type(expected), found: show_type(&found_ty) })
    }
}

fn check_lambda(gamma: &Gamma, xs: &[Symbol], body: &pie_surface::RcExpr, expected: &RcType) -> Result<RcCore, ElabError> {
    match xs.split_first() {
        None => check(gamma, body, expected),
        Some((x, rest)) => match expected.as_ref() {
            Value::Pi(_, dom, codomain) => {
                let var = RcValue::var(x.clone(), dom.clone());
                let gamma = gamma.add_hastype(x.clone(), dom.clone());
                let codomain_val = codomain.instantiate(var)?;
                let rest_expr: Expr = if rest.is_empty() {
                    body.as_ref().clone()
                } else {
                    Expr::Lambda(rest.to_vec(), body.clone())
                };
                let body_core = check(&gamma, &rest_expr, &codomain_val)?;
                Ok(RcCore::from(Core::Lambda(x.clone(), body_core)))
            },
            _ => Err(ElabError::TypeMismatch { expected: show_type(expected), found: "a function".to_string() }),
        },
    }
}

/// Check a bare (already-spined) application of a user constructor against
/// an expected `Datatype` value. The constructor's own parameters are taken
/// from the expected type, not re-supplied at the call site: `(cons 2 3)`
/// never spells out `Pair`'s own element types, and neither do this
/// kernel's datatype constructors.
fn check_constructor(
    gamma: &Gamma,
    ctor_name: &Symbol,
    args: &[pie_surface::RcExpr],
    decl: &pie_core::RcDataDecl,
    params: &[RcValue],
    indices: &[RcValue],
) -> Result<RcCore, ElabError> {
    let ctor = decl.constructor(ctor_name).ok_or_else(|| ElabError::Unbound(ctor_name.clone()))?;
    if ctor.args.len() != args.len() {
        return Err(ElabError::ArityError { name: ctor_name.clone(), expected: ctor.args.len(), found: args.len() });
    }

    let mut prefix_rho = Rho::new();
    for ((name, _), val) in decl.params.iter().zip(params.iter()) {
        prefix_rho = prefix_rho.extend(name.clone(), val.clone());
    }

    let (arg_cores, _arg_vals, rho_after_args) = elab_telescope(gamma, &prefix_rho, &ctor.args, args)?;

    let result_index_vals: Vec<RcValue> =
        ctor.result_indices.iter().map(|c| c.eval(&rho_after_args)).collect::<Result<_, _>>()?;

    let mut idx_rho = prefix_rho;
    for ((idx_name, idx_ty_core), (expected_idx, found_idx)) in
        decl.indices.iter().zip(indices.iter().zip(result_index_vals.iter()))
    {
        let idx_ty_val = idx_ty_core.eval(&idx_rho)?;
        if !values_equal(&idx_ty_val, expected_idx, found_idx)? {
            return Err(ElabError::NotStructurallyEquiv {
                at_type: show_type(&idx_ty_val),
                lhs: show_value(&idx_ty_val, expected_idx),
                rhs: show_value(&idx_ty_val, found_idx),
            });
        }
        idx_rho = idx_rho.extend(idx_name.clone(), expected_idx.clone());
    }

    Ok(RcCore::from(Core::Constr {
        name: ctor_name.clone(),
        args: arg_cores,
        datatype: decl.name.clone(),
        decl: decl.clone(),
    }))
}
