//! File storage primitives for resume-tailor
//!
//! Every piece of local state the tool owns (the version log, the job queue,
//! the local document store, `config.toml`) is rewritten wholesale on each
//! change. This crate provides the pieces that make those rewrites safe:
//!
//! - [`NormalizedPath`]: forward-slash path handling at I/O boundaries
//! - [`io::write_atomic`]: temp-file-then-rename writes under an advisory lock
//! - [`ConfigStore`]: extension-detected TOML/JSON load and save

pub mod config;
pub mod error;
pub mod io;
pub mod path;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use io::RobustnessConfig;
pub use path::NormalizedPath;
