//! Wire protocol, domain values and error taxonomy shared by the study coach client crates.

pub mod domain;
pub mod error;
pub mod protocol;
