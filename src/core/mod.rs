//! Core types shared by every stage of the updater.
//!
//! Currently this is the error layer: [`UpdateError`] for typed pipeline
//! failures and [`ErrorContext`] / [`user_friendly_error`] for presenting them
//! from the host binary.

pub mod error;

pub use error::{ErrorContext, UpdateError, user_friendly_error};
