//! # trove-config
//!
//! Typed configuration for the trove GraphQL query service: paging limits,
//! endpoint declarations, the search collaborator and logging.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use trove_config::ConfigLoader;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::load_from_file("trove.toml").await?;
//!     println!("default page size: {}", config.paging.default_limit);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod components;
mod config;
mod error;
mod loader;

#[cfg(feature = "test-utils")]
mod test_utils;

pub use components::*;
pub use config::*;
pub use error::*;
pub use loader::*;

#[cfg(feature = "test-utils")]
pub use test_utils::*;
