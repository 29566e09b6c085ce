//! Error catalog and definitions for Unit Test Runner
//!
//! Module-level failures are `thiserror` enums next to the code that raises
//! them (`TranslateError`, `ComposeError`, `ConfigError`, `RunStoreError`).
//! Each of them maps onto a stable [`ErrorCode`] from the catalog so the CLI
//! can print a code plus remediation steps.
//!
//! # Error Code Ranges
//!
//! | Range      | Category    | Description                              |
//! |------------|-------------|------------------------------------------|
//! | E001-E099  | Config      | Settings file and environment problems   |
//! | E100-E199  | Resolution  | Test-target resolution and composition   |
//! | E200-E299  | Execution   | Launching the composed test command      |
//! | E500-E599  | Internal    | Internal/unexpected errors               |

pub mod catalog;

pub use catalog::{ErrorCategory, ErrorCode, ErrorEntry};
