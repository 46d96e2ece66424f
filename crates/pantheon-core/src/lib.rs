//! Core types and trait definitions for the Pantheon knowledge base.
//!
//! This crate is deliberately free of database dependencies. It describes the
//! schema model (identifiers, status enumerations, create inputs), the
//! report rows returned by reads, and the boundary types every operation
//! resolves into.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod model;
pub mod outcome;
pub mod report;
pub mod service;

pub use error::{Error, Result};
pub use outcome::{Failure, FailureKind, Outcome, Report};
