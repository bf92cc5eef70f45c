//! Elaborating `match`: checking the scrutinee synthesizes a type `match`
//! knows how to branch over (an `Atom`, a `Sigma`, or a user datatype),
//! checking each arm's pattern against that type, and checking coverage.
//!
//! Two entry points mirror the bidirectional split everywhere else in this
//! kernel: [`check_match`] is used when the result type is already known
//! (the common case - a `match` nested inside a checked lambda body), and
//! [`synth_match`] derives it from the first arm's body, for a bare `match`
//! with no surrounding expected type to check against.

use pie_core::{read_back_type, Arm as CoreArm, Bound, Core, Gamma, Pattern, RcCore, RcType, Value};
use pie_surface::{RcExpr, SurfaceArm};

use crate::checker::{check, synth};
use crate::equality::show_type;
use crate::error::ElabError;

pub fn check_match(
    gamma: &Gamma,
    target: &RcExpr,
    arms: &[SurfaceArm],
    expected: &RcType,
) -> Result<RcCore, ElabError> {
    let (target_core, target_ty) = synth(gamma, target.as_ref())?;
    log::trace!("check-match: scrutinee synthesized {}", show_type(&target_ty));
    check_coverage(&target_ty, arms)?;

    let mut core_arms = Vec::with_capacity(arms.len());
    for arm in arms {
        let (arm_gamma, _bound_as) = arm.pattern.extend_gamma(gamma, &target_ty)?;
        let body_core = check(&arm_gamma, arm.body.as_ref(), expected)?;
        core_arms.push(CoreArm { pattern: arm.pattern.clone(), body: body_core });
    }

    let motive_core = read_back_type(&Bound::new(), expected)?;
    Ok(RcCore::from(Core::Match { target: target_core, arms: core_arms, motive: motive_core }))
}

/// `match` used where no expected type is available: the first arm's body
/// is synthesized to fix the result type, and every later arm is checked
/// against it (spec §4.6, steps 1-2).
pub fn synth_match(gamma: &Gamma, target: &RcExpr, arms: &[SurfaceArm]) -> Result<(RcCore, RcType), ElabError> {
    let (target_core, target_ty) = synth(gamma, target.as_ref())?;
    check_coverage(&target_ty, arms)?;

    let (first, rest) = arms
        .split_first()
        .ok_or_else(|| ElabError::CannotSynth("match with no arms has no body to synthesize a type from".to_string()))?;

    let (first_gamma, _) = first.pattern.extend_gamma(gamma, &target_ty)?;
    let (first_body_core, result_ty) = synth(&first_gamma, first.body.as_ref())?;

    let mut core_arms = Vec::with_capacity(arms.len());
    core_arms.push(CoreArm { pattern: first.pattern.clone(), body: first_body_core });
    for arm in rest {
        let (arm_gamma, _) = arm.pattern.extend_gamma(gamma, &target_ty)?;
        let body_core = check(&arm_gamma, arm.body.as_ref(), &result_ty)?;
        core_arms.push(CoreArm { pattern: arm.pattern.clone(), body: body_core });
    }

    let motive_core = read_back_type(&Bound::new(), &result_ty)?;
    Ok((RcCore::from(Core::Match { target: target_core, arms: core_arms, motive: motive_core }), result_ty))
}

/// Coverage admits different shapes of pattern depending on the scrutinee's
/// type, per spec §4.6:
///
/// - `Atom`: any mix of `_`, a variable, or a tick literal; an open set, no
///   exhaustiveness is enforced at elaboration time (a non-matching value is
///   instead a run-time `StuckMatch`).
/// - `Sigma`: exactly one `cons` pattern, plus any number of wildcards.
/// - a user datatype `D`: every constructor of `D` must be named by some
///   arm's pattern, unless some arm is a wildcard.
fn check_coverage(ty: &RcType, arms: &[SurfaceArm]) -> Result<(), ElabError> {
    match ty.as_ref() {
        Value::Atom => {
            for arm in arms {
                match &arm.pattern {
                    Pattern::Var(_) | Pattern::Hole | Pattern::Tick(_) => {},
                    other => {
                        return Err(ElabError::PatternIllTyped(format!(
                            "{:?} cannot match an Atom scrutinee",
                            other
                        )))
                    },
                }
            }
            Ok(())
        },

        Value::Sigma(_, _, _) => {
            let cons_count = arms.iter().filter(|a| matches!(a.pattern, Pattern::Cons(_, _))).count();
            for arm in arms {
                if !matches!(arm.pattern, Pattern::Cons(_, _) | Pattern::Var(_) | Pattern::Hole) {
                    return Err(ElabError::PatternIllTyped(format!(
                        "{:?} cannot match a Sigma scrutinee (only cons patterns and wildcards can)",
                        arm.pattern
                    )));
                }
            }
            if cons_count != 1 {
                return Err(ElabError::PatternIllTyped(format!(
                    "a Sigma match requires exactly one cons pattern, found {}",
                    cons_count
                )));
            }
            Ok(())
        },

        Value::Datatype(decl, _, _) => {
            let mut covered = std::collections::HashSet::new();
            let mut has_catchall = false;
            for arm in arms {
                match &arm.pattern {
                    Pattern::Ctor(name, _) => {
                        if decl.constructor(name).is_none() {
                            return Err(ElabError::PatternIllTyped(format!(
                                "{} is not a constructor of {}",
                                name, decl.name
                            )));
                        }
                        covered.insert(name.clone());
                    },
                    Pattern::Hole | Pattern::Var(_) => has_catchall = true,
                    other => {
                        return Err(ElabError::PatternIllTyped(format!(
                            "{:?} cannot match a value of datatype {}",
                            other, decl.name
                        )))
                    },
                }
            }
            if has_catchall {
                return Ok(());
            }
            for ctor in &decl.constructors {
                if !covered.contains(&ctor.name) {
                    return Err(ElabError::NonExhaustiveMatch(ctor.name.clone()));
                }
            }
            Ok(())
        },

        _ => Err(ElabError::ShapeMismatch { expected: "Atom, Sigma, or a datatype", found: show_type(ty) }),
    }
}
