//! Relation resolution - deciding the physical shape of one property.
//!
//! The decision table is evaluated in a fixed order, first match wins:
//! explicit relation hint, implicit single reference, implicit scalar
//! collection, plain column. Resolution only ever reads the referenced
//! type's *declaration* (code, persistability, properties), never its
//! compiled descriptor, so mutually referencing types resolve without
//! recursion.

use relmap_model::{
    Cardinality, ColumnMapping, CascadePolicy, CycleGuard, DeclarationSet, ForeignKeyMapping,
    JoinTableMapping, NodeRole, PropertyDeclaration, RelationHint, RelationMapping, RelationShape,
    TypeDeclaration, ValueType, PK_COLUMN, SOURCE_PK_COLUMN, TARGET_PK_COLUMN,
};
use tracing::debug;

use crate::error::CompileError;

/// Physical resolution of a single property.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldResolution {
    /// The property maps to a plain column.
    Column(ColumnMapping),
    /// The property maps to a relation.
    Relation(RelationMapping),
}

/// Resolve one property of `owner` into its physical shape.
///
/// A property carrying a relation hint never receives a plain column
/// mapping; relation shape and column shape are mutually exclusive.
pub fn resolve_property(
    set: &DeclarationSet,
    owner: &TypeDeclaration,
    property: &PropertyDeclaration,
) -> Result<FieldResolution, CompileError> {
    if let Some(hint) = &property.relation {
        return resolve_hinted(set, owner, property, hint).map(FieldResolution::Relation);
    }

    match &property.value_type {
        // Implicit many-to-one from a bare reference field.
        ValueType::Reference { type_code } => {
            let target = related_declaration(set, owner, property, type_code)?;
            if !target.persistable {
                return Err(CompileError::malformed(
                    &owner.type_code,
                    &property.name,
                    format!(
                        "implicit reference to non-persistable type {}; abstract bases own no table",
                        target.type_code
                    ),
                ));
            }
            debug!(
                owner = %owner.type_code,
                property = %property.name,
                target = %target.type_code,
                "resolved implicit many-to-one"
            );
            Ok(FieldResolution::Relation(foreign_key_mapping(
                property,
                &target.type_code,
                false,
            )))
        }

        // Owned multi-valued attribute scoped to the parent row.
        ValueType::ScalarCollection(_) | ValueType::ScalarMap { .. } => {
            Ok(FieldResolution::Relation(RelationMapping {
                property_name: property.name.clone(),
                shape: RelationShape::ElementCollection {
                    element: property.value_type.clone(),
                },
                cascade: CascadePolicy::All,
                ordering_column: None,
                cycle_guard: None,
            }))
        }

        // An entity collection without a hint cannot be mapped: a plain
        // column would break exclusivity, an element collection would
        // lose the cross-entity reference.
        ValueType::ReferenceCollection { type_code } => Err(CompileError::malformed(
            &owner.type_code,
            &property.name,
            format!("collection of {type_code} requires an explicit relation declaration"),
        )),

        ValueType::Scalar(scalar) => Ok(FieldResolution::Column(ColumnMapping {
            name: property.name.clone(),
            ty: *scalar,
            nullable: property.nullable,
            part_of_unique_constraint: property.unique,
        })),
    }
}

fn resolve_hinted(
    set: &DeclarationSet,
    owner: &TypeDeclaration,
    property: &PropertyDeclaration,
    hint: &RelationHint,
) -> Result<RelationMapping, CompileError> {
    match hint.cardinality {
        Cardinality::ManyToMany => resolve_many_to_many(set, owner, property, hint),
        Cardinality::OneToMany => resolve_one_to_many(set, owner, property, hint),
        Cardinality::ManyToOne => {
            let target = referenced_entity(set, owner, property)?;
            Ok(foreign_key_mapping(property, &target.type_code, false))
        }
        // Fallback for declared relations: a foreign key with implied
        // uniqueness on the owning side.
        Cardinality::OneToOne => {
            let target = referenced_entity(set, owner, property)?;
            Ok(foreign_key_mapping(property, &target.type_code, true))
        }
    }
}

fn resolve_many_to_many(
    set: &DeclarationSet,
    owner: &TypeDeclaration,
    property: &PropertyDeclaration,
    hint: &RelationHint,
) -> Result<RelationMapping, CompileError> {
    let node_role = hint.node_role.ok_or_else(|| {
        CompileError::malformed(
            &owner.type_code,
            &property.name,
            "many-to-many relation requires a node role",
        )
    })?;
    let relation_name = hint.relation_name.as_deref().ok_or_else(|| {
        CompileError::malformed(
            &owner.type_code,
            &property.name,
            "many-to-many relation requires a relation name",
        )
    })?;

    let target = referenced_collection_entity(set, owner, property)?;
    check_opposite_relation_name(owner, property, relation_name, target)?;

    // The target role swaps the default join-column assignment so that
    // a single join table serves both ends.
    let join_table = match node_role {
        NodeRole::Source => {
            JoinTableMapping::new(relation_name, SOURCE_PK_COLUMN, TARGET_PK_COLUMN)
        }
        NodeRole::Target => {
            JoinTableMapping::new(relation_name, TARGET_PK_COLUMN, SOURCE_PK_COLUMN)
        }
    };

    debug!(
        owner = %owner.type_code,
        property = %property.name,
        table = %join_table.table,
        role = ?node_role,
        "resolved many-to-many join table"
    );

    Ok(RelationMapping {
        property_name: property.name.clone(),
        shape: RelationShape::JoinTable { join_table },
        cascade: CascadePolicy::All,
        ordering_column: Some(PK_COLUMN.to_string()),
        cycle_guard: Some(CycleGuard::ReferenceCollection),
    })
}

fn resolve_one_to_many(
    set: &DeclarationSet,
    owner: &TypeDeclaration,
    property: &PropertyDeclaration,
    hint: &RelationHint,
) -> Result<RelationMapping, CompileError> {
    let mapped_by = hint.mapped_by.as_deref().ok_or_else(|| {
        CompileError::malformed(
            &owner.type_code,
            &property.name,
            "one-to-many relation requires a mapped-by field",
        )
    })?;

    let target = referenced_collection_entity(set, owner, property)?;
    let owning = target.get_property(mapped_by).ok_or_else(|| {
        CompileError::malformed(
            &owner.type_code,
            &property.name,
            format!("mapped-by field {mapped_by} does not exist on {}", target.type_code),
        )
    })?;

    // The inverse side must be owned by a many-to-one field (declared
    // or implicit) pointing back at us.
    let owns_inverse = match &owning.relation {
        Some(inverse) => inverse.cardinality == Cardinality::ManyToOne,
        None => owning.value_type.referenced_type() == Some(owner.type_code.as_str()),
    };
    if !owns_inverse {
        return Err(CompileError::malformed(
            &owner.type_code,
            &property.name,
            format!(
                "mapped-by field {}.{} is not an owning many-to-one",
                target.type_code, mapped_by
            ),
        ));
    }

    Ok(RelationMapping {
        property_name: property.name.clone(),
        shape: RelationShape::InverseCollection {
            mapped_by: mapped_by.to_string(),
            target: target.type_code.clone(),
        },
        cascade: CascadePolicy::All,
        ordering_column: Some(PK_COLUMN.to_string()),
        cycle_guard: Some(CycleGuard::ReferenceCollection),
    })
}

/// Both ends of a bidirectional many-to-many must agree on the join
/// artifact name.
fn check_opposite_relation_name(
    owner: &TypeDeclaration,
    property: &PropertyDeclaration,
    relation_name: &str,
    target: &TypeDeclaration,
) -> Result<(), CompileError> {
    for opposite in target.relation_properties() {
        let Some(hint) = opposite.relation.as_ref() else {
            continue;
        };
        if hint.cardinality != Cardinality::ManyToMany {
            continue;
        }
        if opposite.value_type.referenced_type() != Some(owner.type_code.as_str()) {
            continue;
        }
        if let Some(their_name) = hint.relation_name.as_deref() {
            if their_name != relation_name {
                return Err(CompileError::malformed(
                    &owner.type_code,
                    &property.name,
                    format!(
                        "relation name {relation_name} does not match {their_name} declared on {}.{}",
                        target.type_code, opposite.name
                    ),
                ));
            }
        }
    }
    Ok(())
}

/// Foreign-key mapping shared by explicit and implicit many-to-one and
/// by the one-to-one fallback. Unique foreign keys are never nullable.
fn foreign_key_mapping(
    property: &PropertyDeclaration,
    target: &str,
    force_unique: bool,
) -> RelationMapping {
    let unique = force_unique || property.unique;
    RelationMapping {
        property_name: property.name.clone(),
        shape: RelationShape::ForeignKeyColumn {
            column: ForeignKeyMapping {
                column: property.name.clone(),
                referenced_type: target.to_string(),
                referenced_column: PK_COLUMN.to_string(),
                nullable: property.nullable && !unique,
                unique,
            },
        },
        cascade: CascadePolicy::All,
        ordering_column: None,
        cycle_guard: Some(CycleGuard::ReferenceOnly),
    }
}

/// Resolve the single-valued reference target of a hinted relation.
fn referenced_entity<'a>(
    set: &'a DeclarationSet,
    owner: &TypeDeclaration,
    property: &PropertyDeclaration,
) -> Result<&'a TypeDeclaration, CompileError> {
    let type_code = match &property.value_type {
        ValueType::Reference { type_code } => type_code,
        _ => {
            return Err(CompileError::malformed(
                &owner.type_code,
                &property.name,
                "single-valued relation requires a single entity reference",
            ))
        }
    };
    let target = related_declaration(set, owner, property, type_code)?;
    if !target.persistable {
        return Err(CompileError::malformed(
            &owner.type_code,
            &property.name,
            format!(
                "relation targets non-persistable type {}; abstract bases own no table",
                target.type_code
            ),
        ));
    }
    Ok(target)
}

/// Resolve the collection reference target of a hinted multi-valued
/// relation.
fn referenced_collection_entity<'a>(
    set: &'a DeclarationSet,
    owner: &TypeDeclaration,
    property: &PropertyDeclaration,
) -> Result<&'a TypeDeclaration, CompileError> {
    match &property.value_type {
        ValueType::ReferenceCollection { type_code } => {
            let target = related_declaration(set, owner, property, type_code)?;
            if !target.persistable {
                return Err(CompileError::malformed(
                    &owner.type_code,
                    &property.name,
                    format!(
                        "relation targets non-persistable type {}; abstract bases own no table",
                        target.type_code
                    ),
                ));
            }
            Ok(target)
        }
        _ => Err(CompileError::malformed(
            &owner.type_code,
            &property.name,
            "multi-valued relation requires a collection of entity references",
        )),
    }
}

fn related_declaration<'a>(
    set: &'a DeclarationSet,
    owner: &TypeDeclaration,
    property: &PropertyDeclaration,
    type_code: &str,
) -> Result<&'a TypeDeclaration, CompileError> {
    set.get(type_code).ok_or_else(|| CompileError::UnknownType {
        type_code: type_code.to_string(),
        referenced_by: owner.type_code.clone(),
        property: property.name.clone(),
    })
}
