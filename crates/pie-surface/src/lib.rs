//! The surface syntax of the Pie language: the expression and toplevel-form
//! ASTs that elaboration consumes. No lexer or parser lives here - callers
//! build these trees directly.

pub mod expr;
pub mod pretty;
pub mod toplevel;

pub use crate::expr::{Expr, RcExpr, SurfaceArm};
pub use crate::toplevel::{SurfaceConstructor, Toplevel};
