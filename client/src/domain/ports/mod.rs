//! Domain ports and supporting types for the hexagonal boundary.

mod http_transport;
mod key_value_store;
mod notifier;
mod unauthorized_handler;

pub use http_transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError};
#[cfg(test)]
pub use key_value_store::MockKeyValueStore;
pub use key_value_store::{KeyValueStore, StoreError};
pub use notifier::{Notifier, Severity};
#[cfg(test)]
pub use unauthorized_handler::MockUnauthorizedHandler;
pub use unauthorized_handler::{NoopUnauthorizedHandler, UnauthorizedHandler};
