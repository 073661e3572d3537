//! Cross-platform utilities and helpers
//!
//! This module provides utility functions for file operations and user
//! interface elements like progress bars. All utilities are designed to work
//! consistently across Windows, macOS, and Linux.
//!
//! # Modules
//!
//! - [`fs`] - File system operations: writability probes and
//!   permission-preserving copies
//! - [`progress`] - Progress bars for long-running downloads

pub mod fs;
pub mod progress;

pub use fs::{copy_preserving_permissions, is_writable_dir, is_writable_file, write_executable};
pub use progress::download_bar;
