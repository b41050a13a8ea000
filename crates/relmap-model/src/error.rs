//! Declaration model error types.

use thiserror::Error;

/// Errors raised while constructing or walking the declaration model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A lookup names a type code absent from the set.
    #[error("unknown type code {type_code}")]
    UnknownType {
        /// The missing type code.
        type_code: String,
    },

    /// A super-type link names a type code absent from the set.
    #[error("type {type_code} extends unknown super type {super_type}")]
    UnknownSuperType {
        /// The declaring type.
        type_code: String,
        /// The dangling super-type code.
        super_type: String,
    },

    /// The super-type chain revisits a type code.
    #[error("cyclic type hierarchy detected at {type_code}")]
    CyclicHierarchy {
        /// The type at which the cycle was detected.
        type_code: String,
    },

    /// Two properties of one type share a name.
    #[error("type {type_code} declares property {property} more than once")]
    DuplicateProperty {
        /// The declaring type.
        type_code: String,
        /// The duplicated property name.
        property: String,
    },

    /// A relation descriptor names a property the type does not declare.
    #[error("type {type_code} declares a relation on unknown property {property}")]
    UnknownRelationProperty {
        /// The declaring type.
        type_code: String,
        /// The missing property name.
        property: String,
    },

    /// Declaration source could not be parsed.
    #[error("declaration parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
