//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! policy file / site config blob (JSON or TOML)
//!     → loader.rs (decode into WindowConfig entries)
//!     → RolloutManager::update
//!         → validation.rs (build Schedule, collect all errors)
//!         → atomic swap of Arc<Schedule>
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new policy
//!     → RolloutManager::update (no-op if structurally equal)
//! ```
//!
//! # Design Decisions
//! - Policy is immutable once applied; changes require a full rebuild
//! - Scheduler settings have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{ConfigError, PolicyFormat};
pub use schema::{PolicyDocument, SchedulerConfig, WindowConfig};
