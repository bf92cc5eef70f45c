//! Threading `Σ` across a sequence of top-level forms: `claim`, `define`,
//! `data`, and `check-same`. This is the thinnest possible batch driver -
//! just enough to run the scenarios in a test suite - not a REPL or a file
//! format; there is no parser behind it and no I/O happens here.

use std::rc::Rc;

use pie_core::{Core, DataDecl, Gamma, RcCore, RcDataDecl, Sigma, Symbol, Telescope};
use pie_surface::{SurfaceConstructor, Toplevel};

use crate::checker::{check, is_type};
use crate::equality::{show_type, show_value, values_equal};
use crate::error::ElabError;

/// `(claim name ty)`: elaborate `ty` against `U`, and record `name : ty` in
/// `Σ`, so long as `name` isn't already bound to anything.
pub fn elaborate_claim(sigma: &Sigma, name: &Symbol, ty_expr: &pie_surface::RcExpr) -> Result<Sigma, ElabError> {
    if sigma.has(name) {
        return Err(ElabError::DuplicateName(name.clone()));
    }
    let gamma = Gamma::from_sigma(sigma);
    let ty_core = is_type(&gamma, ty_expr.as_ref())?;
    let ty_val = ty_core.eval(&gamma.to_rho())?;
    log::debug!("claim {} : {}", name, show_type(&ty_val));
    Ok(sigma.claim(name.clone(), ty_val))
}

/// `(define name e)`: `name` must already have a `Claim` in `Σ` with no
/// matching `Define` yet (invariant I2). `e` is checked against that claimed
/// type and the resulting value recorded.
pub fn elaborate_define(sigma: &Sigma, name: &Symbol, expr: &pie_surface::RcExpr) -> Result<Sigma, ElabError> {
    let ty = sigma.lookup_type(name).ok_or_else(|| ElabError::MissingClaim(name.clone()))?;
    if matches!(sigma.lookup(name), Some(pie_core::SigmaEntry::Define(_))) {
        return Err(ElabError::DuplicateName(name.clone()));
    }
    let gamma = Gamma::from_sigma(sigma);
    let e_core = check(&gamma, expr.as_ref(), &ty)?;
    let e_val = e_core.eval(&gamma.to_rho())?;
    log::debug!("define {} = {}", name, show_value(&ty, &e_val));
    Ok(sigma.define(name.clone(), e_val))
}

/// `(check-same ty lhs rhs)`: elaborate `ty`, check both sides against it,
/// and confirm the resulting values are definitionally equal. Carries no Σ
/// extension of its own - it's the kernel's only "run and report" command.
pub fn check_same(
    sigma: &Sigma,
    ty_expr: &pie_surface::RcExpr,
    lhs: &pie_surface::RcExpr,
    rhs: &pie_surface::RcExpr,
) -> Result<(), ElabError> {
    let gamma = Gamma::from_sigma(sigma);
    let ty_core = is_type(&gamma, ty_expr.as_ref())?;
    let ty_val = ty_core.eval(&gamma.to_rho())?;
    let lhs_core = check(&gamma, lhs.as_ref(), &ty_val)?;
    let rhs_core = check(&gamma, rhs.as_ref(), &ty_val)?;
    let lhs_val = lhs_core.eval(&gamma.to_rho())?;
    let rhs_val = rhs_core.eval(&gamma.to_rho())?;
    if values_equal(&ty_val, &lhs_val, &rhs_val)? {
        log::debug!("check-same: {} and {} agree at {}", show_value(&ty_val, &lhs_val), show_value(&ty_val, &rhs_val), show_type(&ty_val));
        Ok(())
    } else {
        Err(ElabError::NotStructurallyEquiv {
            at_type: show_type(&ty_val),
            lhs: show_value(&ty_val, &lhs_val),
            rhs: show_value(&ty_val, &rhs_val),
        })
    }
}

/// Elaborate one telescope entry at a time, checking each type against `U`
/// in a `Gamma` extended left-to-right by the entries already seen, so that
/// later entries may depend on earlier ones.
fn elaborate_telescope_decl(gamma: &Gamma, entries: &[(Symbol, pie_surface::RcExpr)]) -> Result<(Telescope, Gamma), ElabError> {
    let mut gamma = gamma.clone();
    let mut cores = Vec::with_capacity(entries.len());
    for (name, ty_expr) in entries {
        let ty_core = is_type(&gamma, ty_expr.as_ref())?;
        let ty_val = ty_core.eval(&gamma.to_rho())?;
        gamma = gamma.add_hastype(name.clone(), ty_val);
        cores.push((name.clone(), ty_core));
    }
    Ok((Telescope::new(cores), gamma))
}

fn var_cores(telescope: &Telescope) -> Vec<RcCore> {
    telescope.iter().map(|(name, _)| RcCore::from(Core::Var(name.clone()))).collect()
}

fn pi_chain(telescope: &Telescope, body: RcCore) -> RcCore {
    telescope.iter().rev().fold(body, |body, (name, ty_core)| RcCore::from(Core::Pi(name.clone(), ty_core.clone(), body)))
}

fn lambda_chain(telescope: &Telescope, body: RcCore) -> RcCore {
    telescope.iter().rev().fold(body, |body, (name, _)| RcCore::from(Core::Lambda(name.clone(), body)))
}

/// `(data D params indices constructors)`, per the two-step emission order:
/// a `Claim`/`Define` pair for each constructor, then a `Claim`/`Define`
/// pair for `D` itself.
///
/// Constructor arguments may not refer back to `D`: building each
/// constructor's function type requires the *complete* `DataDecl` (to tag
/// `Core::Constr`/`Core::Datatype` nodes with it), but the complete
/// `DataDecl` can't exist until every constructor's telescope has already
/// been elaborated. There's no interior mutability here to tie that knot,
/// so this driver only supports non-recursive datatypes - this is recorded
/// as a deliberate scope decision, not an oversight.
pub fn elaborate_data(
    sigma: &Sigma,
    name: &Symbol,
    params: &[(Symbol, pie_surface::RcExpr)],
    indices: &[(Symbol, pie_surface::RcExpr)],
    constructors: &[SurfaceConstructor],
) -> Result<Sigma, ElabError> {
    if sigma.has(name) {
        return Err(ElabError::DuplicateName(name.clone()));
    }

    let gamma0 = Gamma::from_sigma(sigma);
    let (param_telescope, gamma_params) = elaborate_telescope_decl(&gamma0, params)?;
    let (index_telescope, _gamma_indices) = elaborate_telescope_decl(&gamma_params, indices)?;

    let mut seen_ctor_names = std::collections::HashSet::new();
    let mut ctor_decls = Vec::with_capacity(constructors.len());

    for ctor in constructors {
        if ctor.result_type_name != *name {
            return Err(ElabError::DatatypeIllFormed(format!(
                "constructor {} names result type {}, not the owning datatype {}",
                ctor.name, ctor.result_type_name, name
            )));
        }
        if !seen_ctor_names.insert(ctor.name.clone()) {
            return Err(ElabError::DuplicateName(ctor.name.clone()));
        }
        if sigma.has(&ctor.name) {
            return Err(ElabError::DuplicateName(ctor.name.clone()));
        }

        let (arg_telescope, gamma_args) = elaborate_telescope_decl(&gamma_params, &ctor.args)?;
        if ctor.result_indices.len() != index_telescope.len() {
            return Err(ElabError::ArityError {
                name: ctor.name.clone(),
                expected: index_telescope.len(),
                found: ctor.result_indices.len(),
            });
        }
        let mut result_index_cores = Vec::with_capacity(ctor.result_indices.len());
        let mut idx_rho = gamma_args.to_rho();
        for ((idx_name, idx_ty_core), idx_expr) in index_telescope.iter().zip(ctor.result_indices.iter()) {
            let idx_ty_val = idx_ty_core.eval(&idx_rho)?;
            let idx_core = check(&gamma_args, idx_expr.as_ref(), &idx_ty_val)?;
            let idx_val = idx_core.eval(&gamma_args.to_rho())?;
            idx_rho = idx_rho.extend(idx_name.clone(), idx_val);
            result_index_cores.push(idx_core);
        }

        ctor_decls.push(pie_core::ConstructorDecl { name: ctor.name.clone(), args: arg_telescope, result_indices: result_index_cores });
    }

    let decl: RcDataDecl = Rc::new(DataDecl {
        name: name.clone(),
        params: param_telescope.clone(),
        indices: index_telescope.clone(),
        constructors: ctor_decls.clone(),
    });

    let mut sigma = sigma.clone();

    for ctor_decl in &ctor_decls {
        let result_ty_core = RcCore::from(Core::Datatype {
            name: name.clone(),
            params: var_cores(&param_telescope),
            indices: ctor_decl.result_indices.clone(),
            decl: decl.clone(),
        });
        let claim_ty_core = pi_chain(&param_telescope, pi_chain(&ctor_decl.args, result_ty_core));
        let claim_ty_val = claim_ty_core.eval(&gamma0.to_rho())?;

        let constr_core = RcCore::from(Core::Constr {
            name: ctor_decl.name.clone(),
            args: var_cores(&ctor_decl.args),
            datatype: name.clone(),
            decl: decl.clone(),
        });
        let define_core = lambda_chain(&param_telescope, lambda_chain(&ctor_decl.args, constr_core));
        let define_val = define_core.eval(&sigma.to_rho())?;

        log::debug!("data {}: constructor {} : {}", name, ctor_decl.name, show_type(&claim_ty_val));
        sigma = sigma.claim(ctor_decl.name.clone(), claim_ty_val);
        sigma = sigma.define(ctor_decl.name.clone(), define_val);
    }

    let datatype_ty_core = pi_chain(&param_telescope, pi_chain(&index_telescope, RcCore::from(Core::Universe)));
    let datatype_ty_val = datatype_ty_core.eval(&gamma0.to_rho())?;

    let datatype_body_core = RcCore::from(Core::Datatype {
        name: name.clone(),
        params: var_cores(&param_telescope),
        indices: var_cores(&index_telescope),
        decl: decl.clone(),
    });
    let datatype_define_core = lambda_chain(&param_telescope, lambda_chain(&index_telescope, datatype_body_core));
    let datatype_define_val = datatype_define_core.eval(&sigma.to_rho())?;

    log::debug!("data {} : {}", name, show_type(&datatype_ty_val));
    sigma = sigma.claim(name.clone(), datatype_ty_val);
    sigma = sigma.define(name.clone(), datatype_define_val);
    sigma = sigma.data(name.clone(), decl);

    Ok(sigma)
}

/// Dispatch one top-level form, threading `Σ` through it.
pub fn elaborate_toplevel(sigma: &Sigma, form: &Toplevel) -> Result<Sigma, ElabError> {
    match form {
        Toplevel::Claim(name, ty) => elaborate_claim(sigma, name, ty),
        Toplevel::Define(name, expr) => elaborate_define(sigma, name, expr),
        Toplevel::Data { name, params, indices, constructors } => elaborate_data(sigma, name, params, indices, constructors),
        Toplevel::CheckSame { ty, lhs, rhs } => {
            check_same(sigma, ty, lhs, rhs)?;
            Ok(sigma.clone())
        },
    }
}
