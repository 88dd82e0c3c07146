pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::adapters::couch::CouchStore;
pub use crate::adapters::defaults::{BundledSpecSource, StaticSpecSource};
pub use crate::config::AppConfig;
pub use crate::core::bootstrap::{BootstrapResult, Bootstrapper};
pub use crate::utils::error::{BootstrapError, Result, StoreError};
