//! Elaboration of Pie's surface syntax into its core syntax, by bidirectional
//! type checking against the normalization-by-evaluation kernel in
//! `pie-core`.

pub mod checker;
pub mod equality;
pub mod error;
pub mod matching;
pub mod telescope;
pub mod toplevel;

pub use crate::checker::{check, is_type, synth};
pub use crate::equality::{show_type, show_value, types_equal, values_equal};
pub use crate::error::ElabError;
pub use crate::matching::{check_match, synth_match};
pub use crate::telescope::elab_telescope;
pub use crate::toplevel::{check_same, elaborate_claim, elaborate_data, elaborate_define, elaborate_toplevel};
