//! Property declarations and relation hints.

use super::types::{Cardinality, NodeRole, ValueType};
use serde::{Deserialize, Serialize};

/// A property declaration within a type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDeclaration {
    /// Property name (unique within the owning type).
    pub name: String,
    /// Semantic value type.
    pub value_type: ValueType,
    /// Whether the property participates in the table-level unique constraint.
    #[serde(default)]
    pub unique: bool,
    /// Whether the property accepts null values.
    #[serde(default)]
    pub nullable: bool,
    /// Optional relation annotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<RelationHint>,
}

/// A relation annotation on a property whose value type references
/// another declared type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationHint {
    /// Declared cardinality.
    pub cardinality: Cardinality,
    /// Which side of a symmetric relation this field represents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_role: Option<NodeRole>,
    /// Identifier shared by both ends of a bidirectional relation;
    /// names the physical join artifact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation_name: Option<String>,
    /// Name of the inverse-owning field on the related type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapped_by: Option<String>,
}

impl PropertyDeclaration {
    /// Create a new non-nullable, non-unique property.
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            unique: false,
            nullable: false,
            relation: None,
        }
    }

    /// Mark the property as unique.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Mark the property as nullable.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Attach a relation hint.
    pub fn with_relation(mut self, relation: RelationHint) -> Self {
        self.relation = Some(relation);
        self
    }
}

impl RelationHint {
    /// Create a one-to-one relation hint.
    pub fn one_to_one() -> Self {
        Self {
            cardinality: Cardinality::OneToOne,
            node_role: None,
            relation_name: None,
            mapped_by: None,
        }
    }

    /// Create a one-to-many relation hint mapped by the owning field
    /// on the related type.
    pub fn one_to_many(mapped_by: impl Into<String>) -> Self {
        Self {
            cardinality: Cardinality::OneToMany,
            node_role: None,
            relation_name: None,
            mapped_by: Some(mapped_by.into()),
        }
    }

    /// Create a many-to-one relation hint.
    pub fn many_to_one() -> Self {
        Self {
            cardinality: Cardinality::ManyToOne,
            node_role: None,
            relation_name: None,
            mapped_by: None,
        }
    }

    /// Create a many-to-many relation hint for the given join artifact
    /// name and node role.
    pub fn many_to_many(relation_name: impl Into<String>, node_role: NodeRole) -> Self {
        Self {
            cardinality: Cardinality::ManyToMany,
            node_role: Some(node_role),
            relation_name: Some(relation_name.into()),
            mapped_by: None,
        }
    }

    /// Set the node role.
    pub fn with_node_role(mut self, node_role: NodeRole) -> Self {
        self.node_role = Some(node_role);
        self
    }

    /// Set the shared relation name.
    pub fn with_relation_name(mut self, relation_name: impl Into<String>) -> Self {
        self.relation_name = Some(relation_name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScalarType;

    #[test]
    fn test_property_builder() {
        let prop = PropertyDeclaration::new("isoCode", ValueType::scalar(ScalarType::String))
            .unique()
            .nullable();

        assert_eq!(prop.name, "isoCode");
        assert!(prop.unique);
        assert!(prop.nullable);
        assert!(prop.relation.is_none());
    }

    #[test]
    fn test_relation_hint_constructors() {
        let m2m = RelationHint::many_to_many("user_group_rel", NodeRole::Source);
        assert_eq!(m2m.cardinality, Cardinality::ManyToMany);
        assert_eq!(m2m.node_role, Some(NodeRole::Source));
        assert_eq!(m2m.relation_name.as_deref(), Some("user_group_rel"));

        let o2m = RelationHint::one_to_many("owner");
        assert_eq!(o2m.cardinality, Cardinality::OneToMany);
        assert_eq!(o2m.mapped_by.as_deref(), Some("owner"));

        let m2o = RelationHint::many_to_one();
        assert_eq!(m2o.cardinality, Cardinality::ManyToOne);
        assert!(m2o.node_role.is_none());
    }

    #[test]
    fn test_property_with_relation() {
        let prop = PropertyDeclaration::new("groups", ValueType::reference_collection("UserGroup"))
            .with_relation(RelationHint::many_to_many("user_group_rel", NodeRole::Source));

        assert!(prop.relation.is_some());
        assert_eq!(prop.value_type.referenced_type(), Some("UserGroup"));
    }

    #[test]
    fn test_defaults_omitted_in_json() {
        let prop = PropertyDeclaration::new("name", ValueType::scalar(ScalarType::String));
        let json = serde_json::to_value(&prop).unwrap();

        assert_eq!(json["unique"], false);
        assert_eq!(json["nullable"], false);
        assert!(json.get("relation").is_none());
    }
}
