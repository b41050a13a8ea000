//! Declaration set - the arena of type declarations for one compilation pass.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::declaration::TypeDeclaration;
use super::error::ModelError;
use super::property::RelationHint;
use super::types::{Cardinality, NodeRole};

/// The complete set of type declarations for a compilation pass.
///
/// Declarations are addressed by type code; the ancestor chain is an
/// explicit parent-link list walked by name, so chain traversal never
/// follows object pointers and terminates at the root (or fails on a
/// cycle). The set is read-only input for the lifetime of a pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeclarationSet {
    /// Declarations keyed by type code.
    types: HashMap<String, TypeDeclaration>,
}

/// Raw per-type shape of the external declaration source.
///
/// Relation descriptors arrive as a separate list keyed by property
/// name and are folded into the owning property on load.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTypeDeclaration {
    persistable: bool,
    #[serde(default)]
    super_type: Option<String>,
    #[serde(default)]
    properties: Vec<super::property::PropertyDeclaration>,
    #[serde(default)]
    relations: Vec<RawRelationDescriptor>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRelationDescriptor {
    property_name: String,
    cardinality: Cardinality,
    #[serde(default)]
    node_role: Option<NodeRole>,
    #[serde(default)]
    relation_name: Option<String>,
    #[serde(default, rename = "mappedByField")]
    mapped_by_field: Option<String>,
}

impl DeclarationSet {
    /// Create an empty declaration set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a type declaration, replacing any previous declaration with
    /// the same type code.
    pub fn with_type(mut self, decl: TypeDeclaration) -> Self {
        self.types.insert(decl.type_code.clone(), decl);
        self
    }

    /// Get a declaration by type code.
    pub fn get(&self, type_code: &str) -> Option<&TypeDeclaration> {
        self.types.get(type_code)
    }

    /// Check if a type code is declared.
    pub fn contains(&self, type_code: &str) -> bool {
        self.types.contains_key(type_code)
    }

    /// Number of declared types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Type codes of all persistable declarations, sorted for
    /// deterministic iteration.
    pub fn persistable_codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self
            .types
            .values()
            .filter(|d| d.persistable)
            .map(|d| d.type_code.as_str())
            .collect();
        codes.sort_unstable();
        codes
    }

    /// Walk the ancestor chain of a type, leaf first, ending at the
    /// root of the hierarchy.
    ///
    /// Fails if a super-type link dangles or if the chain revisits a
    /// type code.
    pub fn ancestor_chain(&self, type_code: &str) -> Result<Vec<&TypeDeclaration>, ModelError> {
        let mut chain: Vec<&TypeDeclaration> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut current = Some(type_code);

        while let Some(code) = current {
            let decl = self.types.get(code).ok_or_else(|| match chain.last() {
                Some(prev) => ModelError::UnknownSuperType {
                    type_code: prev.type_code.clone(),
                    super_type: code.to_string(),
                },
                None => ModelError::UnknownType {
                    type_code: code.to_string(),
                },
            })?;

            if !seen.insert(&decl.type_code) {
                return Err(ModelError::CyclicHierarchy {
                    type_code: decl.type_code.clone(),
                });
            }

            chain.push(decl);
            current = decl.super_type.as_deref();
        }

        Ok(chain)
    }

    /// Validate the whole set: every super link resolves, no hierarchy
    /// cycles, property names unique within each type.
    pub fn validate(&self) -> Result<(), ModelError> {
        for decl in self.types.values() {
            self.ancestor_chain(&decl.type_code)?;

            let mut names: HashSet<&str> = HashSet::new();
            for property in &decl.properties {
                if !names.insert(&property.name) {
                    return Err(ModelError::DuplicateProperty {
                        type_code: decl.type_code.clone(),
                        property: property.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Load a declaration set from the external JSON contract: a
    /// mapping from type code to declared shape, with relation
    /// descriptors listed separately per type.
    pub fn from_json(source: &str) -> Result<Self, ModelError> {
        let raw: HashMap<String, RawTypeDeclaration> = serde_json::from_str(source)?;
        let mut set = DeclarationSet::new();

        for (type_code, raw_decl) in raw {
            let mut decl = TypeDeclaration {
                type_code: type_code.clone(),
                persistable: raw_decl.persistable,
                super_type: raw_decl.super_type,
                properties: raw_decl.properties,
            };

            for relation in raw_decl.relations {
                let property = decl
                    .properties
                    .iter_mut()
                    .find(|p| p.name == relation.property_name)
                    .ok_or_else(|| ModelError::UnknownRelationProperty {
                        type_code: type_code.clone(),
                        property: relation.property_name.clone(),
                    })?;

                property.relation = Some(RelationHint {
                    cardinality: relation.cardinality,
                    node_role: relation.node_role,
                    relation_name: relation.relation_name,
                    mapped_by: relation.mapped_by_field,
                });
            }

            set.types.insert(type_code, decl);
        }

        Ok(set)
    }
}
