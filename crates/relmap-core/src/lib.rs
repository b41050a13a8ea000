//! Relmap Core - Mapping compiler, constraint aggregation, and registry.
//!
//! This crate turns declarative type metadata into compiled mapping
//! descriptors ready for a persistence layer to consume.

pub mod builder;
pub mod compiler;
pub mod constraints;
pub mod error;
pub mod registry;
pub mod resolver;

pub use builder::{build_descriptor, BuiltDescriptor};
pub use compiler::{CompileReport, Compiler};
pub use constraints::aggregate_unique_constraints;
pub use error::{CompileError, UniqueFlagConflict};
pub use registry::{BeginOutcome, DescriptorRegistry};
pub use resolver::{resolve_property, FieldResolution};

/// Re-export the declaration model and descriptor contract.
pub use relmap_model as model;
