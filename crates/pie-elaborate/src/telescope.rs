//! Elaborating a sequence of surface expressions against a declaration's
//! telescope, threading each entry's evaluated value forward so later,
//! dependent entries can be typed.

use pie_core::{RcCore, RcValue, Rho, Telescope};
use pie_surface::RcExpr;

use crate::checker::check;
use crate::error::ElabError;
use pie_core::Gamma;

/// Check `args` one-by-one against `telescope`'s types, evaluating each
/// under `prefix_rho` extended by every earlier entry in the telescope.
/// Returns the elaborated core arguments, their values, and the final
/// environment (useful to callers that need to keep typing more terms
/// against the same running bindings, e.g. a constructor's result
/// indices).
pub fn elab_telescope(
    gamma: &Gamma,
    prefix_rho: &Rho,
    telescope: &Telescope,
    args: &[RcExpr],
) -> Result<(Vec<RcCore>, Vec<RcValue>, Rho), ElabError> {
    let mut local_rho = prefix_rho.clone();
    let mut cores = Vec::with_capacity(args.len());
    let mut vals = Vec::with_capacity(args.len());
    for ((name, ty_core), arg) in telescope.iter().zip(args.iter()) {
        let ty_val = ty_core.eval(&local_rho)?;
        let arg_core = check(gamma, arg, &ty_val)?;
        let arg_val = arg_core.eval(&gamma.to_rho())?;
        local_rho = local_rho.extend(name.clone(), arg_val.clone());
        cores.push(arg_core);
        vals.push(arg_val);
    }
    Ok((cores, vals, local_rho))
}
