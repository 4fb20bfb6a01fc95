// Copyright (C) 2026  winnyboy5
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//! Configuration management system for MediaGit Core
//!
//! This crate provides a comprehensive configuration management system with support for
//! multiple formats (TOML, YAML, JSON), environment variable overrides, validation,
//! and migration capabilities.
//!
//! # Features
//!
//! - Multi-format configuration support (TOML, YAML, JSON)
//! - Environment variable overrides with `MEDIAGIT_` prefix
//! - Comprehensive configuration validation with detailed error messages
//! - Configuration migration framework for version upgrades
//! - Support for storage backends (filesystem, S3, Azure, GCS, multi-backend)
//! - Performance tuning options (caching, connection pooling, timeouts)
//! - Security settings (TLS, encryption, rate limiting, CORS)
//! - Observability configuration (logging, metrics, tracing)
//!
//! # Example
//!
//! ```no_run
//! use mediagit_config::ConfigLoader;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let loader = ConfigLoader::new();
//!     let config = loader.load_with_overrides("config.toml").await?;
//!
//!     println!("Loaded configuration for: {}", config.app.name);
//!     println!("Running on: {}:{}", config.app.host, config.app.port);
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod loader;
pub mod migration;
pub mod schema;
pub mod validation;

// Re-export commonly used items
pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigFormat, ConfigLoader};
pub use migration::{ConfigMigration, MigrationManager, MigrationV0ToV1, CONFIG_VERSION};
pub use schema::*;
pub use validation::Validator;
