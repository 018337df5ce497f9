// Adapters layer: concrete record stores and file storage behind the domain ports.

pub mod memory;
pub mod rest;
pub mod storage;

pub use memory::{Dataset, InMemoryStore};
pub use rest::RestStore;
pub use storage::LocalStorage;
