//! Compiled mapping descriptors - the physical persistence shape of a type.

use serde::{Deserialize, Serialize};

use super::types::{ScalarType, ValueType};

/// Name of the synthetic identity column every persistable row carries.
pub const PK_COLUMN: &str = "pk";

/// Join column holding the source-side key in a join table.
pub const SOURCE_PK_COLUMN: &str = "source_pk";

/// Join column holding the target-side key in a join table.
pub const TARGET_PK_COLUMN: &str = "target_pk";

/// The compiled, physical persistence shape of one persistable type.
///
/// One descriptor exists per persistable type declaration; abstract
/// bases contribute columns to their descendants' descriptors but own
/// none themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingDescriptor {
    /// Type code this descriptor was compiled from.
    pub type_code: String,
    /// Physical table name.
    pub table_name: String,
    /// Plain columns in deterministic declaration order.
    pub columns: Vec<ColumnMapping>,
    /// One mapping per relation-shaped property.
    pub relation_mappings: Vec<RelationMapping>,
    /// Table-level unique constraints as column-name sets.
    pub unique_constraints: Vec<Vec<String>>,
}

/// A plain column derived from a non-relation property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMapping {
    /// Column name (the property name).
    pub name: String,
    /// Stored scalar type.
    pub ty: ScalarType,
    /// Whether the column accepts null.
    pub nullable: bool,
    /// Whether the column participates in the aggregated unique constraint.
    pub part_of_unique_constraint: bool,
}

/// The physical mapping of one relation-shaped property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationMapping {
    /// Name of the declaring property.
    pub property_name: String,
    /// Physical shape and its join metadata.
    #[serde(flatten)]
    pub shape: RelationShape,
    /// Cascade policy applied to the relation.
    pub cascade: CascadePolicy,
    /// Synthetic ordering column for stable iteration of multi-valued
    /// relations; absent for single-valued shapes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordering_column: Option<String>,
    /// Serialization strategy preventing recursion across mutually
    /// referencing entities; absent when no cross-entity reference exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle_guard: Option<CycleGuard>,
}

/// Physical shape of a relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "camelCase")]
pub enum RelationShape {
    /// A shared join table between two entity tables.
    #[serde(rename_all = "camelCase")]
    JoinTable {
        /// Join table layout.
        join_table: JoinTableMapping,
    },
    /// Collection owned by the other side of the relation.
    #[serde(rename_all = "camelCase")]
    InverseCollection {
        /// Owning many-to-one field on the related type.
        mapped_by: String,
        /// Type code of the related type.
        target: String,
    },
    /// Single column storing the referenced row's key.
    #[serde(rename_all = "camelCase")]
    ForeignKeyColumn {
        /// Foreign-key column layout.
        column: ForeignKeyMapping,
    },
    /// Table-less multi-valued attribute owned by the parent row.
    #[serde(rename_all = "camelCase")]
    ElementCollection {
        /// Element value type.
        element: ValueType,
    },
}

/// Layout of a many-to-many join table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinTableMapping {
    /// Join table name (the shared relation name).
    pub table: String,
    /// Column holding this side's row key.
    pub join_column: String,
    /// Column holding the opposite side's row key.
    pub inverse_join_column: String,
    /// Referenced column on both entity tables.
    pub referenced_column: String,
}

/// Layout of a foreign-key column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKeyMapping {
    /// Foreign-key column name (the property name).
    pub column: String,
    /// Type code of the referenced type.
    pub referenced_type: String,
    /// Referenced column on the target table.
    pub referenced_column: String,
    /// Whether the column accepts null.
    pub nullable: bool,
    /// Whether the column carries a single-column unique constraint,
    /// forcing the relation into a de-facto one-to-one.
    pub unique: bool,
}

/// Cascade policy for a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CascadePolicy {
    /// Delete and update propagate across the relation.
    All,
    /// No propagation.
    None,
}

/// Serialization strategy that breaks recursion between mutually
/// referencing entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CycleGuard {
    /// Serialize the referenced object by key only, never embedding
    /// its own relations.
    #[serde(rename = "reference-only")]
    ReferenceOnly,
    /// Serialize collection members by key only.
    #[serde(rename = "reference-collection")]
    ReferenceCollection,
}

impl JoinTableMapping {
    /// Create the join table layout for the given node-role column
    /// assignment.
    pub fn new(
        table: impl Into<String>,
        join_column: impl Into<String>,
        inverse_join_column: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            join_column: join_column.into(),
            inverse_join_column: inverse_join_column.into(),
            referenced_column: PK_COLUMN.to_string(),
        }
    }
}

impl MappingDescriptor {
    /// Serialize the descriptor to the external JSON contract.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Get a relation mapping by property name.
    pub fn get_relation(&self, property_name: &str) -> Option<&RelationMapping> {
        self.relation_mappings
            .iter()
            .find(|r| r.property_name == property_name)
    }

    /// Get a plain column by name.
    pub fn get_column(&self, name: &str) -> Option<&ColumnMapping> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn join_table_mapping() -> RelationMapping {
        RelationMapping {
            property_name: "groups".to_string(),
            shape: RelationShape::JoinTable {
                join_table: JoinTableMapping::new(
                    "user_group_rel",
                    SOURCE_PK_COLUMN,
                    TARGET_PK_COLUMN,
                ),
            },
            cascade: CascadePolicy::All,
            ordering_column: Some(PK_COLUMN.to_string()),
            cycle_guard: Some(CycleGuard::ReferenceCollection),
        }
    }

    #[test]
    fn test_descriptor_lookups() {
        let descriptor = MappingDescriptor {
            type_code: "User".to_string(),
            table_name: "User".to_string(),
            columns: vec![ColumnMapping {
                name: "name".to_string(),
                ty: ScalarType::String,
                nullable: false,
                part_of_unique_constraint: false,
            }],
            relation_mappings: vec![join_table_mapping()],
            unique_constraints: vec![],
        };

        assert!(descriptor.get_column("name").is_some());
        assert!(descriptor.get_column("groups").is_none());
        assert!(descriptor.get_relation("groups").is_some());
    }

    #[test]
    fn test_relation_mapping_json_contract() {
        let json = serde_json::to_value(join_table_mapping()).unwrap();

        assert_eq!(json["propertyName"], "groups");
        assert_eq!(json["shape"], "joinTable");
        assert_eq!(json["joinTable"]["table"], "user_group_rel");
        assert_eq!(json["joinTable"]["joinColumn"], "source_pk");
        assert_eq!(json["joinTable"]["inverseJoinColumn"], "target_pk");
        assert_eq!(json["joinTable"]["referencedColumn"], "pk");
        assert_eq!(json["cascade"], "all");
        assert_eq!(json["orderingColumn"], "pk");
        assert_eq!(json["cycleGuard"], "reference-collection");
    }

    #[test]
    fn test_foreign_key_json_contract() {
        let mapping = RelationMapping {
            property_name: "country".to_string(),
            shape: RelationShape::ForeignKeyColumn {
                column: ForeignKeyMapping {
                    column: "country".to_string(),
                    referenced_type: "Country".to_string(),
                    referenced_column: PK_COLUMN.to_string(),
                    nullable: true,
                    unique: false,
                },
            },
            cascade: CascadePolicy::All,
            ordering_column: None,
            cycle_guard: Some(CycleGuard::ReferenceOnly),
        };

        let json = serde_json::to_value(&mapping).unwrap();
        assert_eq!(json["shape"], "foreignKeyColumn");
        assert_eq!(json["column"]["referencedType"], "Country");
        assert_eq!(json["cycleGuard"], "reference-only");
        assert!(json.get("orderingColumn").is_none());
    }

    #[test]
    fn test_descriptor_json_roundtrip() {
        let descriptor = MappingDescriptor {
            type_code: "Country".to_string(),
            table_name: "Country".to_string(),
            columns: vec![ColumnMapping {
                name: "isoCode".to_string(),
                ty: ScalarType::String,
                nullable: false,
                part_of_unique_constraint: true,
            }],
            relation_mappings: vec![],
            unique_constraints: vec![vec!["isoCode".to_string()]],
        };

        let json = descriptor.to_json().unwrap();
        let decoded: MappingDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(descriptor, decoded);
    }
}
