//! Unique-constraint aggregation over an ancestor chain.

use std::collections::HashMap;

use relmap_model::DeclarationSet;
use tracing::warn;

use crate::error::{CompileError, UniqueFlagConflict};

/// Aggregate the unique fields declared anywhere in a type's ancestor
/// chain into one canonical column-name set.
///
/// The chain is walked leaf to root; a property name already seen
/// (because a descendant redeclared it) is never added twice, and the
/// declaration closest to the leaf decides the flag. Conflicting flags
/// between levels produce a warning, never an error.
///
/// The result is attached only to the descriptor being compiled: a
/// persistable ancestor compiled in its own right aggregates from its
/// own level upward and never sees constraints added by subclasses.
pub fn aggregate_unique_constraints(
    set: &DeclarationSet,
    type_code: &str,
) -> Result<(Vec<String>, Vec<UniqueFlagConflict>), CompileError> {
    let chain = set.ancestor_chain(type_code)?;

    let mut winners: HashMap<&str, (bool, &str)> = HashMap::new();
    let mut unique_fields: Vec<String> = Vec::new();
    let mut warnings: Vec<UniqueFlagConflict> = Vec::new();

    for decl in &chain {
        for property in &decl.properties {
            match winners.get(property.name.as_str()) {
                None => {
                    winners.insert(property.name.as_str(), (property.unique, decl.type_code.as_str()));
                    if property.unique {
                        unique_fields.push(property.name.clone());
                    }
                }
                Some(&(winning_unique, declared_on)) => {
                    if winning_unique != property.unique {
                        let conflict = UniqueFlagConflict {
                            property: property.name.clone(),
                            declared_on: declared_on.to_string(),
                            inherited_from: decl.type_code.clone(),
                            winning_unique,
                        };
                        warn!(%conflict, "conflicting unique flags in ancestor chain");
                        warnings.push(conflict);
                    }
                }
            }
        }
    }

    Ok((unique_fields, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use relmap_model::{PropertyDeclaration, ScalarType, TypeDeclaration, ValueType};

    fn prop(name: &str, unique: bool) -> PropertyDeclaration {
        let p = PropertyDeclaration::new(name, ValueType::scalar(ScalarType::String));
        if unique {
            p.unique()
        } else {
            p
        }
    }

    #[test]
    fn test_union_over_chain_dedupes_redeclared_fields() {
        // A -> B -> C, C most derived; x unique on A, y unique on both
        // B and C. Aggregate for C is exactly {x, y}.
        let set = DeclarationSet::new()
            .with_type(TypeDeclaration::abstract_base("A").with_property(prop("x", true)))
            .with_type(
                TypeDeclaration::abstract_base("B")
                    .extends("A")
                    .with_property(prop("y", true)),
            )
            .with_type(
                TypeDeclaration::new("C")
                    .extends("B")
                    .with_property(prop("y", true)),
            );

        let (fields, warnings) = aggregate_unique_constraints(&set, "C").unwrap();
        assert_eq!(fields, vec!["y".to_string(), "x".to_string()]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_descendant_flag_wins_with_warning() {
        let set = DeclarationSet::new()
            .with_type(TypeDeclaration::abstract_base("Principal").with_property(prop("id", true)))
            .with_type(
                TypeDeclaration::new("Guest")
                    .extends("Principal")
                    .with_property(prop("id", false)),
            );

        let (fields, warnings) = aggregate_unique_constraints(&set, "Guest").unwrap();
        assert!(fields.is_empty());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].property, "id");
        assert_eq!(warnings[0].declared_on, "Guest");
        assert_eq!(warnings[0].inherited_from, "Principal");
        assert!(!warnings[0].winning_unique);
    }

    #[test]
    fn test_persistable_ancestor_aggregates_own_level_only() {
        let set = DeclarationSet::new()
            .with_type(TypeDeclaration::new("Base").with_property(prop("code", true)))
            .with_type(
                TypeDeclaration::new("Derived")
                    .extends("Base")
                    .with_property(prop("slug", true)),
            );

        let (base_fields, _) = aggregate_unique_constraints(&set, "Base").unwrap();
        assert_eq!(base_fields, vec!["code".to_string()]);

        let (derived_fields, _) = aggregate_unique_constraints(&set, "Derived").unwrap();
        assert_eq!(derived_fields, vec!["slug".to_string(), "code".to_string()]);
    }

    #[test]
    fn test_unknown_type_propagates() {
        let set = DeclarationSet::new();
        assert!(aggregate_unique_constraints(&set, "Ghost").is_err());
    }
}
