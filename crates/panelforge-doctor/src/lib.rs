#![forbid(unsafe_code)]

//! `panelforge-doctor`: inspect template catalogs, replay editing scripts
//! and validate saved pages from the command line.

pub mod cli;
pub mod error;
pub mod replay;
pub mod templates;
pub mod util;
pub mod validate;

pub use cli::run_from_env;
pub use error::{DoctorError, Result};
