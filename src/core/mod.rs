//! Core domain models
//!
//! Work items, command steps, IO modes, template substitution and the
//! workspace configuration they are resolved against.

pub mod config;
pub mod context;
pub mod item;
pub mod language;
pub mod paths;
pub mod pipeline;
pub mod step;
pub mod workspace;

pub use context::*;
pub use item::*;
pub use pipeline::*;
pub use step::*;
pub use workspace::*;
