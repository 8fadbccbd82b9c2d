//! Memoization key of a mapping.

use crate::config::MappingConfiguration;
use mapforge_types::TypeDatabase;
use mapforge_types::TypeId;
use mapforge_types::queries::strip_annotations;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// `(source, target, configuration)` identity of a mapping.
///
/// With `include_nullability == false` nullable annotations are stripped
/// when the key is created, so `string?` and `string` produce equal keys.
/// Value type nullables (`int?`) stay distinct either way.
#[derive(Clone, Debug)]
pub struct TypeMappingKey {
    source: TypeId,
    target: TypeId,
    config: Arc<MappingConfiguration>,
    include_nullability: bool,
}

impl TypeMappingKey {
    pub fn new(
        db: &dyn TypeDatabase,
        source: TypeId,
        target: TypeId,
        config: Arc<MappingConfiguration>,
        include_nullability: bool,
    ) -> Self {
        let (source, target) = if include_nullability {
            (source, target)
        } else {
            (strip_annotations(db, source), strip_annotations(db, target))
        };
        Self {
            source,
            target,
            config,
            include_nullability,
        }
    }

    pub fn source(&self) -> TypeId {
        self.source
    }

    pub fn target(&self) -> TypeId {
        self.target
    }

    pub fn config(&self) -> &Arc<MappingConfiguration> {
        &self.config
    }

    pub fn include_nullability(&self) -> bool {
        self.include_nullability
    }
}

impl PartialEq for TypeMappingKey {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
            && self.target == other.target
            && (Arc::ptr_eq(&self.config, &other.config) || self.config == other.config)
    }
}

impl Eq for TypeMappingKey {}

impl Hash for TypeMappingKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
        self.target.hash(state);
        self.config.hash(state);
    }
}
