//! Descriptor assembly - one complete mapping per persistable type.

use std::collections::HashSet;

use relmap_model::{ColumnMapping, DeclarationSet, MappingDescriptor, RelationMapping, RelationShape};
use tracing::debug;

use crate::constraints::aggregate_unique_constraints;
use crate::error::{CompileError, UniqueFlagConflict};
use crate::resolver::{resolve_property, FieldResolution};

/// A fully assembled descriptor plus the non-fatal findings collected
/// while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltDescriptor {
    /// The compiled descriptor.
    pub descriptor: MappingDescriptor,
    /// Warnings that did not block compilation.
    pub warnings: Vec<UniqueFlagConflict>,
}

/// Build the mapping descriptor for one persistable type.
///
/// Column order is deterministic and stable across recompilation: own
/// properties first in source order, then inherited properties walking
/// the ancestor chain outward. A property redeclared by a descendant
/// contributes exactly one column, at its closest-to-leaf position.
/// Any failure discards all work for the type; partial descriptors are
/// never produced.
pub fn build_descriptor(
    set: &DeclarationSet,
    type_code: &str,
) -> Result<BuiltDescriptor, CompileError> {
    let chain = set.ancestor_chain(type_code)?;
    let leaf = chain[0];

    if !leaf.persistable {
        return Err(CompileError::NotPersistable {
            type_code: leaf.type_code.clone(),
        });
    }

    let (unique_fields, warnings) = aggregate_unique_constraints(set, type_code)?;

    let mut seen: HashSet<&str> = HashSet::new();
    let mut columns: Vec<ColumnMapping> = Vec::new();
    let mut relation_mappings: Vec<RelationMapping> = Vec::new();

    for &decl in &chain {
        for property in &decl.properties {
            if !seen.insert(property.name.as_str()) {
                continue;
            }

            match resolve_property(set, decl, property)? {
                FieldResolution::Column(mut column) => {
                    column.part_of_unique_constraint =
                        unique_fields.iter().any(|f| f == &column.name);
                    columns.push(column);
                }
                FieldResolution::Relation(mapping) => relation_mappings.push(mapping),
            }
        }
    }

    let mut unique_constraints: Vec<Vec<String>> = Vec::new();
    if !unique_fields.is_empty() {
        unique_constraints.push(unique_fields);
    }
    // Unique foreign keys force a de-facto one-to-one through an
    // additional single-column constraint.
    for mapping in &relation_mappings {
        if let RelationShape::ForeignKeyColumn { column } = &mapping.shape {
            if column.unique {
                let single = vec![column.column.clone()];
                if !unique_constraints.contains(&single) {
                    unique_constraints.push(single);
                }
            }
        }
    }

    debug!(
        type_code,
        columns = columns.len(),
        relations = relation_mappings.len(),
        constraints = unique_constraints.len(),
        "assembled mapping descriptor"
    );

    Ok(BuiltDescriptor {
        descriptor: MappingDescriptor {
            type_code: leaf.type_code.clone(),
            table_name: leaf.type_code.clone(),
            columns,
            relation_mappings,
            unique_constraints,
        },
        warnings,
    })
}
