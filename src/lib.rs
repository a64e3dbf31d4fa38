//! Self-reconfiguring logging engine.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌────────────────────────────────────────────────┐
//!                    │                    LOGGER                       │
//!                    │                                                 │
//!   emit calls       │  ┌──────────┐   ┌───────────┐   ┌───────────┐  │
//!   ─────────────────┼─▶│ callsite │──▶│  gating   │──▶│   sink    │──┼──▶ console
//!                    │  │flag cache│   │(threshold │   │ (1 shared │  │──▶ file
//!                    │  └────┬─────┘   │ or flags) │   │   lock)   │  │──▶ remote
//!                    │       │         └───────────┘   └─────┬─────┘  │
//!                    │       │ generation                    │ stats  │
//!                    │  ┌────┴─────┐   ┌───────────┐   ┌─────┴─────┐  │
//!   config file ─────┼─▶│  config  │◀──│  change   │   │   stats   │  │
//!   (JSON)           │  │  store   │   │ detector  │   │ collector │  │
//!                    │  └──────────┘   │ (5s poll) │   └───────────┘  │
//!                    │                 └───────────┘                  │
//!                    └────────────────────────────────────────────────┘
//! ```
//!
//! The configuration file controls verbosity, per-component and per-unit
//! debug flags, and expert bitmasks; all of them can change while the
//! process runs. A background detector polls the file's modification marker
//! and raises a flag; the next emitted record applies the reload inline, so
//! reload latency is bounded by the time until the next emit, not by the
//! poll interval. Output destinations are fixed at the first successful
//! open and survive every reload.

pub mod callsite;
pub mod config;
pub mod level;
pub mod logger;
pub mod sink;

mod macros;

pub use callsite::{CallSiteFlags, CallSiteKey};
pub use config::loader::ConfigError;
pub use config::schema::ConfigSnapshot;
pub use level::Severity;
pub use logger::stats::StatsSnapshot;
pub use logger::Logger;
