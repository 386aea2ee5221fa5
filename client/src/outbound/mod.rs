//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **http**: reqwest-backed `HttpTransport`
//! - **storage**: in-memory and JSON-file `KeyValueStore`s
//! - **notifier**: tracing-backed `Notifier`
//!
//! Adapters translate between domain types and infrastructure types. They
//! contain no business logic.

pub mod http;
pub mod notifier;
pub mod storage;

pub use notifier::TracingNotifier;
