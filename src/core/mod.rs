//! Core types shared across the installer.
//!
//! Currently this is the error system: the [`PrimerError`] taxonomy that the
//! self-update pipeline dispatches on, and the [`ErrorContext`] wrapper used
//! by `main` to render failures with suggestions.

pub mod error;

pub use error::{ErrorContext, PrimerError, user_friendly_error};
