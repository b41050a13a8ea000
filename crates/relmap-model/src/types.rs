//! Core type definitions for the declaration model.

use serde::{Deserialize, Serialize};

/// Scalar data types a column can store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScalarType {
    /// Boolean value.
    Bool,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 32-bit floating point.
    Float32,
    /// 64-bit floating point.
    Float64,
    /// UTF-8 string.
    String,
    /// Binary data.
    Bytes,
    /// Timestamp (microseconds since Unix epoch).
    Timestamp,
    /// UUID (128-bit identifier).
    Uuid,
}

/// Value types - flat representation without recursion.
///
/// Note: Nested optional/collection types are not supported to avoid
/// recursive type issues. Nullability lives on the owning property, not
/// on the value type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueType {
    /// A scalar value.
    Scalar(ScalarType),
    /// A reference to another declared type.
    #[serde(rename_all = "camelCase")]
    Reference {
        /// Type code of the referenced type.
        type_code: String,
    },
    /// A collection of scalar values.
    ScalarCollection(ScalarType),
    /// A mapping of scalar keys to scalar values.
    ScalarMap {
        /// Key type.
        key: ScalarType,
        /// Value type.
        value: ScalarType,
    },
    /// A collection of references to another declared type.
    #[serde(rename_all = "camelCase")]
    ReferenceCollection {
        /// Type code of the referenced type.
        type_code: String,
    },
}

/// Cardinality of a declared relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cardinality {
    /// One-to-one relation (unique foreign key).
    OneToOne,
    /// One-to-many relation (owned by the many side).
    OneToMany,
    /// Many-to-one relation (foreign key on this side).
    ManyToOne,
    /// Many-to-many relation (requires a join table).
    ManyToMany,
}

/// Which side of a symmetric relation a field represents.
///
/// Only meaningful for ManyToMany and OneToMany; it breaks the
/// join-column symmetry so that a single join table serves both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeRole {
    /// The end that owns the default join-column assignment.
    Source,
    /// The end with the swapped join-column assignment.
    Target,
}

impl ValueType {
    /// Create a scalar value type.
    pub fn scalar(scalar: ScalarType) -> Self {
        ValueType::Scalar(scalar)
    }

    /// Create a reference value type.
    pub fn reference(type_code: impl Into<String>) -> Self {
        ValueType::Reference {
            type_code: type_code.into(),
        }
    }

    /// Create a collection-of-references value type.
    pub fn reference_collection(type_code: impl Into<String>) -> Self {
        ValueType::ReferenceCollection {
            type_code: type_code.into(),
        }
    }

    /// Create a collection-of-scalars value type.
    pub fn scalar_collection(scalar: ScalarType) -> Self {
        ValueType::ScalarCollection(scalar)
    }

    /// Create a scalar map value type.
    pub fn scalar_map(key: ScalarType, value: ScalarType) -> Self {
        ValueType::ScalarMap { key, value }
    }

    /// Get the referenced type code if this type points at another entity.
    pub fn referenced_type(&self) -> Option<&str> {
        match self {
            ValueType::Reference { type_code } | ValueType::ReferenceCollection { type_code } => {
                Some(type_code)
            }
            _ => None,
        }
    }

    /// Check if this type is multi-valued.
    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            ValueType::ScalarCollection(_)
                | ValueType::ScalarMap { .. }
                | ValueType::ReferenceCollection { .. }
        )
    }

    /// Get the inner scalar type if this is a scalar-based type.
    pub fn scalar_type(&self) -> Option<ScalarType> {
        match self {
            ValueType::Scalar(s) | ValueType::ScalarCollection(s) => Some(*s),
            _ => None,
        }
    }
}

impl std::fmt::Display for Cardinality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cardinality::OneToOne => write!(f, "one-to-one"),
            Cardinality::OneToMany => write!(f, "one-to-many"),
            Cardinality::ManyToOne => write!(f, "many-to-one"),
            Cardinality::ManyToMany => write!(f, "many-to-many"),
        }
    }
}

impl NodeRole {
    /// Get the opposite role.
    pub fn opposite(&self) -> NodeRole {
        match self {
            NodeRole::Source => NodeRole::Target,
            NodeRole::Target => NodeRole::Source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_builders() {
        let scalar = ValueType::scalar(ScalarType::String);
        assert!(!scalar.is_collection());
        assert!(scalar.referenced_type().is_none());
        assert_eq!(scalar.scalar_type(), Some(ScalarType::String));

        let reference = ValueType::reference("User");
        assert_eq!(reference.referenced_type(), Some("User"));
        assert!(!reference.is_collection());

        let refs = ValueType::reference_collection("Group");
        assert_eq!(refs.referenced_type(), Some("Group"));
        assert!(refs.is_collection());
    }

    #[test]
    fn test_scalar_collections_are_multi_valued() {
        assert!(ValueType::scalar_collection(ScalarType::Int64).is_collection());
        assert!(ValueType::scalar_map(ScalarType::String, ScalarType::String).is_collection());
    }

    #[test]
    fn test_node_role_opposite() {
        assert_eq!(NodeRole::Source.opposite(), NodeRole::Target);
        assert_eq!(NodeRole::Target.opposite(), NodeRole::Source);
    }

    #[test]
    fn test_node_role_serialization() {
        assert_eq!(
            serde_json::to_string(&NodeRole::Source).unwrap(),
            "\"SOURCE\""
        );
        assert_eq!(
            serde_json::to_string(&NodeRole::Target).unwrap(),
            "\"TARGET\""
        );
    }
}
