//! Deploygate Testing Infrastructure
//!
//! Fixtures, property strategies and repository wrappers shared by the
//! deploygate crates' test suites.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! deploygate-testkit = { path = "../deploygate-testkit" }
//! ```

pub mod counting;
pub mod fixtures;
pub mod strategies;

pub use counting::{CallCounts, CountingRepository};
pub use fixtures::*;
