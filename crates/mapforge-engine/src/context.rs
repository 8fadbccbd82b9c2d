//! Resolution contexts.
//!
//! `MapperState` is the per-mapper owner of everything mutable: the mapping
//! collection, the name builder, the diagnostics and the inline scopes.
//! `MappingContext` is the short-lived borrower one strategy sees: the
//! current source and target, the active configuration, the declaration
//! diagnostics are bound to, and the mode (standard or expression
//! restricted). Nested resolutions reborrow the state through
//! [`MappingContext::with_types`].

use crate::collection::{BodyRequest, MappingCollection};
use crate::config::{MappingConfiguration, MappingConversionType};
use crate::factories::ObjectFactoryRegistry;
use crate::inline::{self, InlineScope, InlineScopeId, InlineScopeKind};
use crate::key::TypeMappingKey;
use crate::mapping::{Mapping, MappingFlags, MappingId, MappingKind};
use crate::names::UniqueNameBuilder;
use crate::strategies;
use mapforge_common::{Diagnostic, DiagnosticCollector, DiagnosticSink, SymbolLocation};
use mapforge_types::queries::simple_name;
use mapforge_types::{TypeDatabase, TypeFormatter, TypeId};
use std::sync::Arc;
use tracing::{debug, trace};

/// Why a requested mapping could not be produced.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Unresolved {
    /// No strategy applies.
    NoStrategy,
    /// Expression mode nested the same type pair too often.
    RecursionLimit { depth: u32 },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ContextMode {
    Standard,
    Inline(InlineScopeId),
}

// =============================================================================
// MapperState
// =============================================================================

/// Mutable state of one mapper build.
pub struct MapperState<'a> {
    pub(crate) db: &'a dyn TypeDatabase,
    pub(crate) mappings: MappingCollection,
    pub(crate) names: UniqueNameBuilder,
    pub(crate) diagnostics: DiagnosticCollector,
    pub(crate) factories: ObjectFactoryRegistry,
    pub(crate) defaults: Arc<MappingConfiguration>,
    pub(crate) inline_scopes: Vec<InlineScope>,
}

impl<'a> MapperState<'a> {
    pub fn new(
        db: &'a dyn TypeDatabase,
        defaults: Arc<MappingConfiguration>,
        factories: ObjectFactoryRegistry,
    ) -> Self {
        Self {
            db,
            mappings: MappingCollection::new(),
            names: UniqueNameBuilder::new(),
            diagnostics: DiagnosticCollector::new(),
            factories,
            defaults,
            inline_scopes: Vec::new(),
        }
    }

    pub fn db(&self) -> &'a dyn TypeDatabase {
        self.db
    }

    pub fn mappings(&self) -> &MappingCollection {
        &self.mappings
    }

    pub fn mappings_mut(&mut self) -> &mut MappingCollection {
        &mut self.mappings
    }

    pub fn names_mut(&mut self) -> &mut UniqueNameBuilder {
        &mut self.names
    }

    pub fn defaults(&self) -> &Arc<MappingConfiguration> {
        &self.defaults
    }

    pub fn diagnostics(&self) -> &DiagnosticCollector {
        &self.diagnostics
    }

    pub fn into_parts(self) -> (MappingCollection, DiagnosticCollector) {
        (self.mappings, self.diagnostics)
    }

    pub fn report(&mut self, code: u32, location: &SymbolLocation, args: Vec<String>) {
        let diagnostic = Diagnostic::new(code, location.clone(), args);
        debug!(
            code = diagnostic.display_code(),
            symbol = %location.symbol,
            message = %diagnostic.message_text,
            "report diagnostic"
        );
        self.diagnostics.report(diagnostic);
    }

    pub fn type_name(&self, id: TypeId) -> String {
        TypeFormatter::new(self.db).format(id)
    }

    /// Standard context for a top-level request.
    pub fn context(
        &mut self,
        source: TypeId,
        target: TypeId,
        config: Arc<MappingConfiguration>,
        location: SymbolLocation,
    ) -> MappingContext<'_, 'a> {
        MappingContext {
            state: self,
            source,
            target,
            config,
            location,
            user_mapping: None,
            mode: ContextMode::Standard,
        }
    }

    /// Context for building the body of a queued mapping.
    pub fn body_context(&mut self, id: MappingId, request: BodyRequest) -> Option<MappingContext<'_, 'a>> {
        let (source, target) = {
            let mapping = self.mappings.get(id)?;
            (mapping.source, mapping.target)
        };
        Some(MappingContext {
            state: self,
            source,
            target,
            config: request.config,
            location: request.location,
            user_mapping: request.owner,
            mode: ContextMode::Standard,
        })
    }

    /// Give a method mapping its generated name if it has none yet.
    pub(crate) fn ensure_method_name(&mut self, id: MappingId) {
        let Some(mapping) = self.mappings.get(id) else {
            return;
        };
        if !mapping.is_method() || mapping.is_user() || mapping.method_name.is_some() {
            return;
        }
        let base = format!("MapTo{}", simple_name(self.db, mapping.target));
        let name = self.names.new_name(&base);
        if let Err(err) = self.mappings.set_method_name(id, name.clone()) {
            debug!(mapping_id = id.0, error = %err, "method name not assigned");
            return;
        }
        trace!(mapping_id = id.0, name = %name, "assigned method name");
    }
}

// =============================================================================
// MappingContext
// =============================================================================

pub struct MappingContext<'s, 'a> {
    pub(crate) state: &'s mut MapperState<'a>,
    pub source: TypeId,
    pub target: TypeId,
    pub config: Arc<MappingConfiguration>,
    location: SymbolLocation,
    /// User declared mapping this resolution runs for, if any.
    user_mapping: Option<MappingId>,
    mode: ContextMode,
}

impl<'s, 'a> MappingContext<'s, 'a> {
    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn db(&self) -> &'a dyn TypeDatabase {
        self.state.db
    }

    pub fn mappings(&self) -> &MappingCollection {
        &self.state.mappings
    }

    pub fn mapping(&self, id: MappingId) -> Option<&Mapping> {
        self.state.mappings.get(id)
    }

    pub fn is_synthetic(&self, id: MappingId) -> bool {
        self.mapping(id).is_some_and(Mapping::is_synthetic)
    }

    pub fn factories(&self) -> &ObjectFactoryRegistry {
        &self.state.factories
    }

    pub fn location(&self) -> &SymbolLocation {
        &self.location
    }

    pub fn user_mapping(&self) -> Option<MappingId> {
        self.user_mapping
    }

    pub fn mode(&self) -> ContextMode {
        self.mode
    }

    pub fn is_inline(&self) -> bool {
        matches!(self.mode, ContextMode::Inline(_))
    }

    pub fn is_conversion_enabled(&self, kind: MappingConversionType) -> bool {
        self.config.is_conversion_enabled(kind)
    }

    /// Configuration of member and element resolutions: the mapper
    /// defaults, without any method overrides.
    pub fn nested_config(&self) -> Arc<MappingConfiguration> {
        Arc::clone(&self.state.defaults)
    }

    pub fn type_name(&self, id: TypeId) -> String {
        self.state.type_name(id)
    }

    pub fn report(&mut self, code: u32, args: Vec<String>) {
        self.state.report(code, &self.location, args);
    }

    pub fn key(&self, source: TypeId, target: TypeId, config: Arc<MappingConfiguration>) -> TypeMappingKey {
        TypeMappingKey::new(self.state.db, source, target, config, true)
    }

    // =========================================================================
    // Nested contexts
    // =========================================================================

    /// Context for a nested request that shares this one's state.
    pub fn with_types(
        &mut self,
        source: TypeId,
        target: TypeId,
        config: Arc<MappingConfiguration>,
    ) -> MappingContext<'_, 'a> {
        MappingContext {
            state: &mut *self.state,
            source,
            target,
            config,
            location: self.location.clone(),
            user_mapping: self.user_mapping,
            mode: self.mode,
        }
    }

    pub(crate) fn with_mode(&mut self, mode: ContextMode) -> MappingContext<'_, 'a> {
        MappingContext {
            state: &mut *self.state,
            source: self.source,
            target: self.target,
            config: Arc::clone(&self.config),
            location: self.location.clone(),
            user_mapping: self.user_mapping,
            mode,
        }
    }

    // =========================================================================
    // Allocation
    // =========================================================================

    /// Allocate a mapping from the current source to the current target.
    pub fn push_mapping(&mut self, kind: MappingKind, flags: MappingFlags) -> MappingId {
        self.push_mapping_for(self.source, self.target, kind, flags)
    }

    pub fn push_mapping_for(
        &mut self,
        source: TypeId,
        target: TypeId,
        kind: MappingKind,
        mut flags: MappingFlags,
    ) -> MappingId {
        if self.is_inline() {
            flags |= MappingFlags::INLINE;
        } else if kind.needs_method() {
            flags |= MappingFlags::METHOD;
        }
        self.state.mappings.push(source, target, kind, flags)
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Memo-only lookup under the nested configuration.
    pub fn find_mapping(&mut self, source: TypeId, target: TypeId) -> Option<MappingId> {
        let key = self.key(source, target, self.nested_config());
        match self.mode {
            ContextMode::Standard => self.state.mappings.find(&key),
            ContextMode::Inline(scope) => inline::find(self, scope, &key),
        }
    }

    /// Look up or build a mapping under the nested configuration.
    pub fn find_or_build_mapping(&mut self, source: TypeId, target: TypeId) -> Option<MappingId> {
        let config = self.nested_config();
        self.try_find_or_build(source, target, config).ok()
    }

    pub fn find_or_build_mapping_with_config(
        &mut self,
        source: TypeId,
        target: TypeId,
        config: Arc<MappingConfiguration>,
    ) -> Option<MappingId> {
        self.try_find_or_build(source, target, config).ok()
    }

    /// Look up or build; on a miss the strategy chain runs, a reusable result
    /// is registered as the default for its key, and a pending body is
    /// queued. The shell is registered before its body is built, so a
    /// recursive type graph finds it instead of resolving again.
    pub fn try_find_or_build(
        &mut self,
        source: TypeId,
        target: TypeId,
        config: Arc<MappingConfiguration>,
    ) -> Result<MappingId, Unresolved> {
        if let ContextMode::Inline(scope) = self.mode {
            return inline::find_or_build(self, scope, source, target, config);
        }
        let key = self.key(source, target, Arc::clone(&config));
        if let Some(id) = self.state.mappings.find(&key) {
            return Ok(id);
        }
        debug!(
            source = %self.type_name(source),
            target = %self.type_name(target),
            "resolving mapping"
        );
        let id = {
            let mut nested = self.with_types(source, target, Arc::clone(&config));
            strategies::build_new_instance(&mut nested).ok_or(Unresolved::NoStrategy)?
        };
        self.register(id, key, config);
        Ok(id)
    }

    /// Build a mapping without consulting or updating the default table.
    /// Used for the delegate of a user declared method, which must not find
    /// the user method itself.
    pub fn build_delegate_mapping(
        &mut self,
        source: TypeId,
        target: TypeId,
        config: Arc<MappingConfiguration>,
        owner: MappingId,
    ) -> Option<MappingId> {
        let id = {
            let mut nested = self.with_types(source, target, Arc::clone(&config));
            nested.user_mapping = Some(owner);
            strategies::build_new_instance(&mut nested)?
        };
        self.enqueue_if_pending(id, config, Some(owner));
        Some(id)
    }

    /// Build a named mapping that is neither looked up in nor added to the
    /// default table. The base arm of a derived type switch uses it, since
    /// its key is the key of the user method the switch belongs to.
    pub fn build_unregistered_mapping(
        &mut self,
        source: TypeId,
        target: TypeId,
        config: Arc<MappingConfiguration>,
    ) -> Option<MappingId> {
        let id = {
            let mut nested = self.with_types(source, target, Arc::clone(&config));
            nested.user_mapping = None;
            strategies::build_new_instance(&mut nested)?
        };
        self.state.ensure_method_name(id);
        self.enqueue_if_pending(id, config, None);
        Some(id)
    }

    /// Look up or build a mapping into an existing target instance.
    pub fn find_or_build_existing_target_mapping(&mut self, source: TypeId, target: TypeId) -> Option<MappingId> {
        let config = self.nested_config();
        self.find_or_build_existing_target_mapping_with_config(source, target, config)
    }

    /// Existing target mappings need statements and are never built in
    /// expression mode.
    pub fn find_or_build_existing_target_mapping_with_config(
        &mut self,
        source: TypeId,
        target: TypeId,
        config: Arc<MappingConfiguration>,
    ) -> Option<MappingId> {
        if self.is_inline() {
            return None;
        }
        let key = self.key(source, target, Arc::clone(&config));
        if let Some(id) = self.state.mappings.find_existing_target(&key) {
            return Some(id);
        }
        let id = {
            let mut nested = self.with_types(source, target, Arc::clone(&config));
            strategies::build_existing_target(&mut nested)?
        };
        self.register(id, key, config);
        Some(id)
    }

    pub fn build_existing_target_delegate(
        &mut self,
        source: TypeId,
        target: TypeId,
        config: Arc<MappingConfiguration>,
        owner: MappingId,
    ) -> Option<MappingId> {
        let id = {
            let mut nested = self.with_types(source, target, Arc::clone(&config));
            nested.user_mapping = Some(owner);
            strategies::build_existing_target(&mut nested)?
        };
        self.enqueue_if_pending(id, config, Some(owner));
        Some(id)
    }

    /// Build `source → target` in a fresh expression-restricted scope.
    pub fn build_inline_mapping(
        &mut self,
        kind: InlineScopeKind,
        source: TypeId,
        target: TypeId,
        config: Arc<MappingConfiguration>,
    ) -> Result<MappingId, Unresolved> {
        let max_depth = config.projection_max_depth;
        let scope = InlineScopeId(self.state.inline_scopes.len() as u32);
        self.state.inline_scopes.push(InlineScope::new(kind, max_depth));
        trace!(scope = scope.0, ?kind, max_depth, "open inline scope");
        let mut inline = self.with_mode(ContextMode::Inline(scope));
        inline.try_find_or_build(source, target, config)
    }

    fn register(&mut self, id: MappingId, key: TypeMappingKey, config: Arc<MappingConfiguration>) {
        let reusable = self
            .mapping(id)
            .is_some_and(|m| m.callable_by_other_mappings() && !m.is_user());
        if reusable {
            self.state.mappings.try_add_as_default(id, key);
        }
        self.state.ensure_method_name(id);
        self.enqueue_if_pending(id, config, None);
    }

    fn enqueue_if_pending(&mut self, id: MappingId, config: Arc<MappingConfiguration>, owner: Option<MappingId>) {
        if self.mapping(id).is_some_and(Mapping::needs_body) {
            let request = BodyRequest {
                config,
                location: self.location.clone(),
                owner,
            };
            self.state.mappings.enqueue_to_build_body(id, request);
        }
    }
}
