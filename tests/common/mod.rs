//! Common test utilities for keysearch integration tests

#[allow(dead_code)]
pub mod fixtures;
#[allow(dead_code)]
pub mod wait;

#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use wait::*;
