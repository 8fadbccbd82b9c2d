//! User declared mapping methods and their registration.
//!
//! Hosts describe a mapper as a `MapperDeclaration`: the mapper-wide
//! configuration, the object factories and every mapping method in
//! declaration order. Registration turns each method into a user mapping in
//! the collection before any other mapping is resolved, so that nested
//! resolutions find user implementations first.

use crate::collection::{BodyRequest, MappingCollectionAddResult};
use crate::config::{MapperConfiguration, MappingConfiguration, MethodConfiguration};
use crate::context::MapperState;
use crate::error::EngineError;
use crate::factories::ObjectFactory;
use crate::key::TypeMappingKey;
use crate::mapping::{InlineBody, MappingFlags, MappingId, MappingKind};
use mapforge_common::SymbolLocation;
use mapforge_common::diagnostic_codes::DUPLICATE_DEFAULT_MAPPING;
use mapforge_types::TypeId;
use std::sync::Arc;
use tracing::{debug, trace};

/// A mapper class and everything declared on it.
#[derive(Clone, Debug, Default)]
pub struct MapperDeclaration {
    pub name: String,
    pub location: SymbolLocation,
    pub config: MapperConfiguration,
    pub methods: Vec<MethodDeclaration>,
    pub object_factories: Vec<ObjectFactory>,
}

impl MapperDeclaration {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            location: SymbolLocation::new(name),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: MapperConfiguration) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn method(mut self, method: MethodDeclaration) -> Self {
        self.methods.push(method);
        self
    }

    #[must_use]
    pub fn factory(mut self, factory: ObjectFactory) -> Self {
        self.object_factories.push(factory);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MethodKind {
    /// Implemented by the user. `body` is the single expression body when
    /// the method has one, used to inline the method into projections.
    Implemented { body: Option<InlineBody> },
    /// `partial Target Map(Source source)`
    Partial,
    /// `partial void Map(Source source, Target target)`
    PartialExistingTarget,
    /// `partial object Map(object source, Type targetType)`
    PartialRuntimeTargetType,
    /// `partial Expression<Func<Source, Target>> Projection()`
    PartialProjection,
}

#[derive(Clone, Debug)]
pub struct MethodDeclaration {
    pub name: String,
    /// Defaults to a child of the mapper location.
    pub location: Option<SymbolLocation>,
    pub source: TypeId,
    pub target: TypeId,
    pub kind: MethodKind,
    /// `Some(true)` marks the default mapping of its type pair,
    /// `Some(false)` makes the method reachable by name only.
    pub is_default: Option<bool>,
    /// Never picked up automatically; the method is still generated.
    pub ignore: bool,
    /// Name other declarations reference the method by. Defaults to the
    /// method name.
    pub reference_name: Option<String>,
    pub overrides: MethodConfiguration,
    /// Imported from another mapper; duplicates are tolerated.
    pub external: bool,
}

impl MethodDeclaration {
    pub fn new(name: &str, source: TypeId, target: TypeId, kind: MethodKind) -> Self {
        Self {
            name: name.to_string(),
            location: None,
            source,
            target,
            kind,
            is_default: None,
            ignore: false,
            reference_name: None,
            overrides: MethodConfiguration::default(),
            external: false,
        }
    }

    pub fn partial(name: &str, source: TypeId, target: TypeId) -> Self {
        Self::new(name, source, target, MethodKind::Partial)
    }

    pub fn implemented(name: &str, source: TypeId, target: TypeId) -> Self {
        Self::new(name, source, target, MethodKind::Implemented { body: None })
    }

    #[must_use]
    pub fn with_body(mut self, body: InlineBody) -> Self {
        self.kind = MethodKind::Implemented { body: Some(body) };
        self
    }

    #[must_use]
    pub fn with_overrides(mut self, overrides: MethodConfiguration) -> Self {
        self.overrides = overrides;
        self
    }

    #[must_use]
    pub fn default_mapping(mut self, is_default: bool) -> Self {
        self.is_default = Some(is_default);
        self
    }

    #[must_use]
    pub fn ignored(mut self) -> Self {
        self.ignore = true;
        self
    }

    #[must_use]
    pub fn named(mut self, name: &str) -> Self {
        self.reference_name = Some(name.to_string());
        self
    }

    #[must_use]
    pub fn external(mut self) -> Self {
        self.external = true;
        self
    }

    #[must_use]
    pub fn at(mut self, location: SymbolLocation) -> Self {
        self.location = Some(location);
        self
    }
}

/// A registered user mapping and the declaration it came from.
#[derive(Clone, Debug)]
pub struct UserMapping {
    pub mapping: MappingId,
    pub location: SymbolLocation,
}

/// Register every method of `mapper` in declaration order. Partial methods
/// are queued for their bodies.
pub(crate) fn register_user_mappings(
    state: &mut MapperState<'_>,
    mapper: &MapperDeclaration,
) -> Result<Vec<UserMapping>, EngineError> {
    for method in &mapper.methods {
        state.names.reserve(&method.name);
    }

    let mut registered = Vec::with_capacity(mapper.methods.len());
    for method in &mapper.methods {
        let location = method
            .location
            .clone()
            .unwrap_or_else(|| mapper.location.child(&method.name));
        let config = Arc::new(state.defaults.with_overrides(&method.overrides));
        let (kind, flags) = user_kind(method, &config);
        let id = state.mappings.push(method.source, method.target, kind, flags);
        state.mappings.set_method_name(id, method.name.clone())?;

        let is_default = match method.kind {
            // Not usable from other mappings.
            MethodKind::PartialRuntimeTargetType | MethodKind::PartialProjection => Some(false),
            MethodKind::Implemented { .. } if !state.defaults.auto_user_mappings => {
                method.is_default.or(Some(false))
            }
            _ => method.is_default,
        };
        let name = method.reference_name.as_deref().unwrap_or(&method.name);
        let result = if method.ignore {
            MappingCollectionAddResult::NotAddedIgnored
        } else {
            let key = TypeMappingKey::new(
                state.db,
                method.source,
                method.target,
                Arc::clone(&state.defaults),
                true,
            );
            state
                .mappings
                .add_user_mapping(id, key, method.external, is_default, Some(name))
        };
        debug!(
            method = %method.name,
            mapping_id = id.0,
            ?result,
            "register user mapping"
        );
        if result == MappingCollectionAddResult::NotAddedDuplicatedDefault {
            let args = vec![state.type_name(method.source), state.type_name(method.target)];
            state.report(DUPLICATE_DEFAULT_MAPPING, &location, args);
        }

        if state.mappings.get(id).is_some_and(|m| m.needs_body()) {
            let request = BodyRequest {
                config,
                location: location.clone(),
                owner: Some(id),
            };
            state.mappings.enqueue_to_build_body(id, request);
        }
        registered.push(UserMapping { mapping: id, location });
    }
    trace!(count = registered.len(), "user mappings registered");
    Ok(registered)
}

fn user_kind(method: &MethodDeclaration, config: &Arc<MappingConfiguration>) -> (MappingKind, MappingFlags) {
    let base = MappingFlags::USER | MappingFlags::METHOD;
    let callable = base | MappingFlags::CALLABLE_BY_OTHERS;
    match &method.kind {
        MethodKind::Implemented { body } => (
            MappingKind::UserImplemented {
                method: method.name.clone(),
                inline_body: body.clone(),
            },
            callable,
        ),
        MethodKind::Partial => (
            MappingKind::UserNewInstance {
                delegate: None,
                config: Arc::clone(config),
            },
            callable,
        ),
        MethodKind::PartialExistingTarget => (
            MappingKind::UserExistingTarget {
                delegate: None,
                config: Arc::clone(config),
            },
            callable | MappingFlags::EXISTING_TARGET,
        ),
        MethodKind::PartialRuntimeTargetType => (MappingKind::RuntimeTargetType { arms: None }, base),
        MethodKind::PartialProjection => (
            MappingKind::UserProjection {
                element: None,
                config: Arc::clone(config),
            },
            base,
        ),
    }
}
