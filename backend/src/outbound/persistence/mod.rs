//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports backed by
//! PostgreSQL via `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types. No business logic resides here.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Strongly typed errors**: Diesel and pool failures are mapped to the
//!   port error enums.
//!
//! # Example
//!
//! ```no_run
//! use listings::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! # async fn connect() -> Result<(), listings::outbound::persistence::PoolError> {
//! let pool = DbPool::new(PoolConfig::new("host=localhost user=postgres")).await?;
//! let repo = DieselUserRepository::new(pool);
//! # let _ = repo;
//! # Ok(())
//! # }
//! ```

pub(crate) mod diesel_helpers;
mod diesel_property_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;
mod settings;

pub use diesel_property_repository::DieselPropertyRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
pub use settings::DatabaseSettings;
