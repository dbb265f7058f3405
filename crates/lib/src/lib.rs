//! jake-lib: Core types and logic for jake
//!
//! This crate provides the build graph behind the `jake` command:
//! - `Config`: the parsed `jake.yml`, with normalized keys
//! - `Buildable`: lazily computed, memoized source and code variants
//! - `Package` / `Bundle`: file-backed units and aggregations of units
//! - `Build`: name resolution, freshness checks and artifact writing
//! - `HelperScope`: the per-build Lua state a `Jakefile` registers into

pub mod build;
pub mod buildable;
pub mod config;
pub mod consts;
pub mod error;
pub mod fs;
pub mod lua;
pub mod template;
pub mod transform;
pub mod util;

pub use build::{Build, CheckReport, RunReport, Target, TargetOutcome, TargetStatus};
pub use buildable::{Buildable, Bundle, Package};
pub use config::{Config, Layout};
pub use error::{ConfigError, Error, Result};
