//! Authenticated REST API client.
//!
//! The [`domain`] module holds the request wrapper, the error taxonomy, and
//! typed resource methods. [`outbound`] provides reqwest, storage, and
//! notification adapters for the domain ports. [`config`] loads settings
//! through OrthoConfig.

pub mod config;
pub mod domain;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
