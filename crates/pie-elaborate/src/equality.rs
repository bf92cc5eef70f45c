//! Deciding definitional equality: read both sides back to core syntax at
//! the relevant type and compare up to alpha-equivalence. This is the only
//! notion of equality the checker ever uses - there is no separate
//! "conversion" judgement.

use pie_core::{read_back, read_back_type, Bound, CoreError, RcType, RcValue, Renamings};

pub fn types_equal(a: &RcType, b: &RcType) -> Result<bool, CoreError> {
    let bound = Bound::new();
    let ca = read_back_type(&bound, a)?;
    let cb = read_back_type(&bound, b)?;
    Ok(ca.alpha_equiv(&cb, &Renamings::new()))
}

pub fn values_equal(ty: &RcType, a: &RcValue, b: &RcValue) -> Result<bool, CoreError> {
    let bound = Bound::new();
    let ca = read_back(&bound, ty, a)?;
    let cb = read_back(&bound, ty, b)?;
    Ok(ca.alpha_equiv(&cb, &Renamings::new()))
}

/// Render a type for an error message, falling back to a placeholder if
/// read-back itself fails (which would mean the type was never well-formed
/// to begin with).
pub fn show_type(ty: &RcType) -> String {
    read_back_type(&Bound::new(), ty).map(|c| c.to_string()).unwrap_or_else(|_| "<ill-formed type>".to_string())
}

pub fn show_value(ty: &RcType, v: &RcValue) -> String {
    read_back(&Bound::new(), ty, v).map(|c| c.to_string()).unwrap_or_else(|_| "<ill-formed value>".to_string())
}
