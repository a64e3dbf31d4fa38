//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (JSON)
//!     → loader.rs (read & deserialize)
//!     → ConfigSnapshot (typed, immutable)
//!     → store.rs (atomic snapshot swap, shared via Arc to all readers)
//!
//! On change:
//!     watcher.rs polls the file's modification marker
//!     → sets the pending-change flag
//!     → next emit call reloads inline
//!     → atomic swap of Arc<ConfigSnapshot>, generation + 1
//!     → per-call-site caches refresh lazily against the new generation
//! ```
//!
//! # Design Decisions
//! - Snapshots are immutable once loaded; changes require a full reload
//! - All fields have defaults to allow minimal configs
//! - Destination path and remote URL are sticky across reloads

pub mod loader;
pub mod schema;
pub mod store;
pub mod watcher;

pub use loader::ConfigError;
pub use schema::ConfigSnapshot;
pub use store::ConfigStore;
pub use watcher::ChangeDetector;
