//! Relmap declaration model and mapping descriptor contract.
//!
//! This crate defines the shared data contract between the mapping
//! compiler and every consumer of compiled descriptors.
//!
//! # Modules
//!
//! - [`types`] - Scalar and value types, cardinalities, node roles
//! - [`property`] - Property declarations and relation hints
//! - [`declaration`] - Type declarations
//! - [`set`] - The declaration arena for one compilation pass
//! - [`descriptor`] - Compiled mapping descriptors (output contract)
//! - [`error`] - Declaration model error types
//!
//! Declarations are immutable input: they are constructed once from an
//! external source (builders or [`set::DeclarationSet::from_json`]) and
//! are never mutated by compilation. Descriptors serialize to a stable
//! camelCase JSON contract for the persistence engine and schema
//! tooling.

pub mod declaration;
pub mod descriptor;
pub mod error;
pub mod property;
pub mod set;
pub mod types;

pub use error::ModelError;

// Re-export commonly used types at crate root
pub use declaration::TypeDeclaration;
pub use descriptor::{
    CascadePolicy, ColumnMapping, CycleGuard, ForeignKeyMapping, JoinTableMapping,
    MappingDescriptor, RelationMapping, RelationShape, PK_COLUMN, SOURCE_PK_COLUMN,
    TARGET_PK_COLUMN,
};
pub use property::{PropertyDeclaration, RelationHint};
pub use set::DeclarationSet;
pub use types::{Cardinality, NodeRole, ScalarType, ValueType};
