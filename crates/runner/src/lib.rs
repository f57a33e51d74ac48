//! Per-test sandbox.
//!
//! [`Sandbox::run`] sequences one test execution: merge configuration,
//! resolve the emulated SDK, resolve the manifest bundle, enter a fresh shadow
//! scope, run the body, and reset all shadow state on the way out.

mod error;
mod sandbox;

pub use error::{Result, SandboxError};
pub use sandbox::{Sandbox, TestContext};
