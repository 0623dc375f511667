//! Hardware Abstraction Layer implementations.
//!
//! This module contains concrete implementations of the traits defined in
//! [`crate::traits`]:
//!
//! - `mock`: scripted devices for tests and the desktop simulator
//! - `host`: clock and delay backed by `std::time`
//!
//! A bridge onto real hub hardware would live here as another submodule.

pub mod host;
pub mod mock;

pub use host::*;
pub use mock::*;
