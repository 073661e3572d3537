//! Primer - project scaffolding and self-updating installer
//!
//! Primer does two things: it scaffolds a new project by downloading and
//! extracting a versioned release archive, and it updates its own executable
//! in place. The second is the interesting part — a downloaded candidate is
//! validated, the current binary is backed up, and the swap is sequenced so
//! that a failure at any step leaves the original executable intact and
//! runnable.
//!
//! # Architecture Overview
//!
//! The self-update protocol is a strict pipeline driven by a single
//! orchestrator:
//!
//! ```text
//! fetch → validate → backup → swap → cleanup
//!                       ↓ (on any recoverable failure)
//!                    rollback
//! ```
//!
//! Transport and validation failures roll back; permission failures abort
//! before anything destructive has happened and are reported with guidance.
//! See [`update::pipeline`] for the state machine and [`core::error`] for
//! the error taxonomy.
//!
//! # Core Modules
//!
//! - [`cli`] - Command-line interface (`new`, `self-update`)
//! - [`config`] - Startup configuration: paths, endpoints, file slots
//! - [`core`] - Error types and user-facing error rendering
//! - [`fetch`] - Single-attempt HTTP artifact fetching
//! - [`update`] - The self-update subsystem: pipeline, backup, validation,
//!   version cache
//!
//! # Supporting Modules
//!
//! - [`requirements`] - Pre-flight environment probes
//! - [`scaffold`] - Archive extraction, template rendering, file generation
//! - [`utils`] - Writability probes, permission-preserving file operations,
//!   progress bars
//!
//! # Command-Line Usage
//!
//! ```bash
//! # Scaffold a project from the latest release
//! primer new my-app
//!
//! # Pin a scaffold version
//! primer new my-app --version 1.2.0
//!
//! # Update primer itself
//! primer self-update
//!
//! # Check without installing
//! primer self-update --check
//!
//! # Reinstall even when already current
//! primer self-update --force-update
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod fetch;
pub mod requirements;
pub mod scaffold;
pub mod update;
pub mod utils;
