//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load settings → Create manager → Apply policy → Start watcher
//!
//! Shutdown (shutdown.rs):
//!     Ctrl-C → broadcast → loops exit → watcher dropped
//! ```

pub mod shutdown;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{Services, StartupError};
