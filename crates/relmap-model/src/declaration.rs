//! Type declarations.

use super::property::PropertyDeclaration;
use serde::{Deserialize, Serialize};

/// A declared entity shape, persistable or abstract.
///
/// Declarations form a single-rooted ancestor chain through
/// `super_type` links; there is no multiple inheritance. A declaration
/// is constructed once from source metadata and is immutable for the
/// lifetime of a compilation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDeclaration {
    /// Unique type code.
    pub type_code: String,
    /// Whether this type owns a physical table. Abstract bases only
    /// contribute fields to their descendants.
    pub persistable: bool,
    /// Type code of the parent declaration, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub super_type: Option<String>,
    /// Property declarations in source order.
    #[serde(default)]
    pub properties: Vec<PropertyDeclaration>,
}

impl TypeDeclaration {
    /// Create a new persistable type declaration.
    pub fn new(type_code: impl Into<String>) -> Self {
        Self {
            type_code: type_code.into(),
            persistable: true,
            super_type: None,
            properties: Vec::new(),
        }
    }

    /// Create a new abstract (non-persistable) type declaration.
    pub fn abstract_base(type_code: impl Into<String>) -> Self {
        Self {
            type_code: type_code.into(),
            persistable: false,
            super_type: None,
            properties: Vec::new(),
        }
    }

    /// Set the parent type.
    pub fn extends(mut self, super_type: impl Into<String>) -> Self {
        self.super_type = Some(super_type.into());
        self
    }

    /// Add a property.
    pub fn with_property(mut self, property: PropertyDeclaration) -> Self {
        self.properties.push(property);
        self
    }

    /// Add multiple properties.
    pub fn with_properties(
        mut self,
        properties: impl IntoIterator<Item = PropertyDeclaration>,
    ) -> Self {
        self.properties.extend(properties);
        self
    }

    /// Get a property by name.
    pub fn get_property(&self, name: &str) -> Option<&PropertyDeclaration> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Iterate over properties carrying a relation hint.
    pub fn relation_properties(&self) -> impl Iterator<Item = &PropertyDeclaration> {
        self.properties.iter().filter(|p| p.relation.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::RelationHint;
    use crate::types::{ScalarType, ValueType};

    #[test]
    fn test_declaration_builder() {
        let decl = TypeDeclaration::new("Country")
            .with_property(
                PropertyDeclaration::new("isoCode", ValueType::scalar(ScalarType::String)).unique(),
            )
            .with_property(PropertyDeclaration::new(
                "name",
                ValueType::scalar(ScalarType::String),
            ));

        assert_eq!(decl.type_code, "Country");
        assert!(decl.persistable);
        assert!(decl.super_type.is_none());
        assert_eq!(decl.properties.len(), 2);
        assert!(decl.get_property("isoCode").is_some());
        assert!(decl.get_property("missing").is_none());
    }

    #[test]
    fn test_abstract_base() {
        let decl = TypeDeclaration::abstract_base("Principal").with_property(
            PropertyDeclaration::new("id", ValueType::scalar(ScalarType::String)).unique(),
        );

        assert!(!decl.persistable);
    }

    #[test]
    fn test_extends() {
        let decl = TypeDeclaration::new("User").extends("Principal");
        assert_eq!(decl.super_type.as_deref(), Some("Principal"));
    }

    #[test]
    fn test_relation_properties_filter() {
        let decl = TypeDeclaration::new("User")
            .with_property(PropertyDeclaration::new(
                "name",
                ValueType::scalar(ScalarType::String),
            ))
            .with_property(
                PropertyDeclaration::new("groups", ValueType::reference_collection("UserGroup"))
                    .with_relation(RelationHint::one_to_many("owner")),
            );

        let relations: Vec<_> = decl.relation_properties().collect();
        assert_eq!(relations.len(), 1);
        assert_eq!(relations[0].name, "groups");
    }
}
