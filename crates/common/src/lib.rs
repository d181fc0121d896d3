//! Ambient helpers shared by the QRS client crates: logging bootstrap and
//! `.env` loading.

pub mod env;
pub mod utils;
