//! Integration tests for the Pie language kernel live under `tests/` in
//! this crate; there's nothing here to re-export.
