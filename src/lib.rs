//! Modulewise Composable Registry
//!
//! A lazy dependency injection registry of plain values,
//! factories, services, and computed entries.

pub use error::{Error, Result};
pub use loader::{RegistryBuilder, load_values};
pub use registry::{Iter, Registry};
pub use types::{Definition, Kind, Resolver, Value};

pub mod error;
pub mod loader;
pub mod registry;
pub mod types;
