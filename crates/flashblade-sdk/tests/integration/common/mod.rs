//! Common test utilities and fixtures.


pub use fixtures::*;
