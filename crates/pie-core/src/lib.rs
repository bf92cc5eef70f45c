//! The core syntax, semantic domain, and normalization-by-evaluation kernel
//! of the Pie language: everything downstream of elaboration that never
//! needs to see surface syntax again.

pub mod context;
pub mod core;
pub mod data;
pub mod domain;
pub mod error;
pub mod ident;
pub mod pattern;
pub mod readback;

pub use crate::context::{Bound, Gamma, Renamings, Rho, Sigma, SigmaEntry};
pub use crate::core::{
    do_app, do_car, do_cdr, either_base_ty, pi_const, pi_native, step_ty_list, step_ty_nat, step_ty_vec, Core, RcCore,
};
pub use crate::data::{ConstructorDecl, DataDecl, RcDataDecl, Telescope};
pub use crate::domain::{Closure, Neutral, Normal, RcNeutral, RcType, RcValue, Type, Value};
pub use crate::error::CoreError;
pub use crate::ident::Symbol;
pub use crate::pattern::{Arm, Pattern, PatternError};
pub use crate::readback::{read_back, read_back_type};
