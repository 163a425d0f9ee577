mod metrics;
mod models;
mod repository;

// Publicly expose the Metrics abstraction
pub use metrics::{Metrics, MetricsPtr};

// Publicly expose the storage boundary and its models
pub use models::{Identity, StoredCredential};
pub use repository::{IdentityStore, IdentityStorePtr};
