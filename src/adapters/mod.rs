// Adapters layer: concrete implementations of the domain ports (http upload, tracing, patch selection).

pub mod http;
pub mod observer;
pub mod selector;

pub use http::ImportClient;
pub use observer::TracingObserver;
pub use selector::{AllSelector, NamedSelector};

#[cfg(feature = "cli")]
pub use selector::InteractiveSelector;
