//! Entity type registry: type name → label, parameter schema and builder.
//!
//! Populated once at startup and shared read-only (`Arc<TypeRegistry>`)
//! with every store that needs it.

use std::collections::HashMap;
use std::sync::Arc;

use shared::{ParamRecord, ParamSchema, SceneNodeData};

/// Failure inside a builder. The store keeps the previous node when this happens.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
    #[error("missing parameter '{0}'")]
    MissingParam(String),
    #[error("parameter '{name}' is not a {expected}")]
    WrongKind { name: String, expected: &'static str },
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("entity type '{0}' is already registered")]
    Duplicate(String),
    #[error("entity type name must not be empty")]
    EmptyTypeName,
}

/// Pure function turning a full parameter record into a detached node tree
pub type Builder = Arc<dyn Fn(&ParamRecord) -> Result<SceneNodeData, BuildError> + Send + Sync>;

pub struct EntityTypeDescriptor {
    pub type_name: String,
    pub label: String,
    pub schema: ParamSchema,
    builder: Builder,
}

impl EntityTypeDescriptor {
    pub fn build(&self, params: &ParamRecord) -> Result<SceneNodeData, BuildError> {
        (self.builder)(params)
    }

    pub fn default_params(&self) -> ParamRecord {
        self.schema.defaults()
    }
}

impl std::fmt::Debug for EntityTypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityTypeDescriptor")
            .field("type_name", &self.type_name)
            .field("label", &self.label)
            .field("params", &self.schema.len())
            .finish()
    }
}

#[derive(Default, Debug)]
pub struct TypeRegistry {
    descriptors: Vec<EntityTypeDescriptor>,
    index: HashMap<String, usize>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in entity type
    pub fn with_builtin_types() -> Self {
        let mut registry = Self::new();
        crate::build::register_builtin_types(&mut registry);
        registry
    }

    /// Register a type. A duplicate name is rejected and the existing
    /// descriptor is kept.
    pub fn register<F>(
        &mut self,
        type_name: &str,
        label: &str,
        schema: ParamSchema,
        builder: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(&ParamRecord) -> Result<SceneNodeData, BuildError> + Send + Sync + 'static,
    {
        if type_name.is_empty() {
            tracing::warn!("rejected entity type with empty name");
            return Err(RegistryError::EmptyTypeName);
        }
        if self.index.contains_key(type_name) {
            tracing::warn!("entity type '{}' already registered, keeping the first", type_name);
            return Err(RegistryError::Duplicate(type_name.to_string()));
        }

        self.index
            .insert(type_name.to_string(), self.descriptors.len());
        self.descriptors.push(EntityTypeDescriptor {
            type_name: type_name.to_string(),
            label: label.to_string(),
            schema,
            builder: Arc::new(builder),
        });
        tracing::debug!("registered entity type '{}'", type_name);
        Ok(())
    }

    pub fn get(&self, type_name: &str) -> Option<&EntityTypeDescriptor> {
        self.index.get(type_name).map(|&i| &self.descriptors[i])
    }

    pub fn has(&self, type_name: &str) -> bool {
        self.index.contains_key(type_name)
    }

    /// Descriptors in registration order
    pub fn values(&self) -> std::slice::Iter<'_, EntityTypeDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn default_params(&self, type_name: &str) -> Option<ParamRecord> {
        self.get(type_name).map(|d| d.default_params())
    }
}
