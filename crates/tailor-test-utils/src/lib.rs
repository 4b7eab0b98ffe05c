//! Shared test utilities for the resume-tailor workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`doubles`]: in-memory collaborators with scripted behavior
//! - [`project`]: [`project::TestProject`] builder for an initialized `.tailor` directory

pub mod doubles;
pub mod project;

pub use doubles::{
    InMemoryDocumentService, ProbeBehavior, ScriptedGenerator, StaticJobSource, StaticProbe,
};
pub use project::TestProject;
