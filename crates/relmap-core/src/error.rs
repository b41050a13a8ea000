//! Compiler error types.

use relmap_model::ModelError;
use thiserror::Error;

/// Errors raised while compiling a type declaration into a mapping
/// descriptor.
///
/// Structural errors abort compilation of the specific type and carry
/// full context; nothing partial is ever published for a failed type.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Declaration model error (dangling links, hierarchy cycles, parse
    /// failures).
    #[error(transparent)]
    Model(#[from] ModelError),

    /// A relation or value-type reference names an undeclared type code.
    #[error("unknown type {type_code} referenced by {referenced_by}.{property}")]
    UnknownType {
        /// The missing type code.
        type_code: String,
        /// The type owning the referencing property.
        referenced_by: String,
        /// The referencing property.
        property: String,
    },

    /// A relation declaration is structurally invalid.
    #[error("malformed relation on {type_code}.{property}: {reason}")]
    MalformedRelation {
        /// The type owning the relation property.
        type_code: String,
        /// The relation property.
        property: String,
        /// What is wrong with the declaration.
        reason: String,
    },

    /// The requested type does not own a physical table.
    #[error("type {type_code} is not persistable and owns no descriptor")]
    NotPersistable {
        /// The non-persistable type code.
        type_code: String,
    },

    /// The type failed compilation earlier; the failure is terminal.
    #[error("compilation of {type_code} already failed: {reason}")]
    CompilationFailed {
        /// The failed type code.
        type_code: String,
        /// The original failure.
        reason: String,
    },
}

impl CompileError {
    /// Shorthand for a malformed-relation error.
    pub(crate) fn malformed(
        type_code: impl Into<String>,
        property: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CompileError::MalformedRelation {
            type_code: type_code.into(),
            property: property.into(),
            reason: reason.into(),
        }
    }
}

/// Warning emitted when two levels of an ancestor chain declare the
/// same property with conflicting unique flags.
///
/// The declaration closest to the leaf always wins; the conflict is
/// reported but never blocks compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueFlagConflict {
    /// The conflicting property name.
    pub property: String,
    /// The type whose flag wins (closest to the leaf).
    pub declared_on: String,
    /// The ancestor whose flag is shadowed.
    pub inherited_from: String,
    /// The winning unique flag.
    pub winning_unique: bool,
}

impl std::fmt::Display for UniqueFlagConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "property {} on {} shadows a conflicting unique flag from {} (unique = {} wins)",
            self.property, self.declared_on, self.inherited_from, self.winning_unique
        )
    }
}
