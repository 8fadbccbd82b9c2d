//! Memoization table and mapping arena of one mapper.
//!
//! Owns every `Mapping` built for a mapper declaration and the indices over
//! them:
//! - default mappings by `TypeMappingKey`, one table for new-instance
//!   mappings and one for existing-target mappings
//! - user mappings by name, with ambiguity tracking
//! - the FIFO queue of mappings whose body still has to be built
//!
//! All mutation goes through this API; strategies and body builders never
//! touch the tables directly.

use crate::config::MappingConfiguration;
use crate::error::EngineError;
use crate::key::TypeMappingKey;
use crate::mapping::{Mapping, MappingBody, MappingFlags, MappingId, MappingKind};
use indexmap::IndexMap;
use mapforge_common::SymbolLocation;
use mapforge_common::limits::INITIAL_MAPPING_CAPACITY;
use mapforge_types::TypeId;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::trace;

/// Result of registering a mapping.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MappingCollectionAddResult {
    Added,
    /// Not registered as a default, by request.
    NotAddedIgnored,
    /// A default already exists for the key.
    NotAddedDuplicated,
    /// Another mapping was already explicitly marked as the default.
    NotAddedDuplicatedDefault,
}

/// Everything needed to build a queued body.
#[derive(Clone, Debug)]
pub struct BodyRequest {
    pub config: Arc<MappingConfiguration>,
    /// Declaration diagnostics of this body are reported against.
    pub location: SymbolLocation,
    /// User mapping the body is built for, when it is a method delegate.
    pub owner: Option<MappingId>,
}

#[derive(Clone, Debug)]
struct NamedMapping {
    mapping: MappingId,
    ambiguous: bool,
}

#[derive(Debug, Default)]
struct MappingTable {
    defaults: FxHashMap<TypeMappingKey, MappingId>,
    explicit_default_keys: FxHashSet<TypeMappingKey>,
    /// Unmarked user mappings that lost against an existing default.
    duplicated_non_default: IndexMap<TypeMappingKey, Vec<MappingId>>,
    used_keys: FxHashSet<TypeMappingKey>,
}

impl MappingTable {
    fn find(&mut self, key: &TypeMappingKey) -> Option<MappingId> {
        let found = self.defaults.get(key).copied();
        if found.is_some() && !self.used_keys.contains(key) {
            self.used_keys.insert(key.clone());
        }
        found
    }

    fn try_add_as_default(&mut self, key: TypeMappingKey, id: MappingId) -> MappingCollectionAddResult {
        if self.defaults.contains_key(&key) {
            return MappingCollectionAddResult::NotAddedDuplicated;
        }
        self.defaults.insert(key, id);
        MappingCollectionAddResult::Added
    }

    fn add_user_mapping(
        &mut self,
        key: TypeMappingKey,
        id: MappingId,
        ignore_duplicates: bool,
        is_default: Option<bool>,
    ) -> MappingCollectionAddResult {
        match is_default {
            Some(true) => {
                if !self.explicit_default_keys.insert(key.clone()) {
                    return MappingCollectionAddResult::NotAddedDuplicatedDefault;
                }
                self.defaults.insert(key, id);
                MappingCollectionAddResult::Added
            }
            Some(false) => MappingCollectionAddResult::NotAddedIgnored,
            None => {
                if !self.defaults.contains_key(&key) {
                    self.defaults.insert(key, id);
                    return MappingCollectionAddResult::Added;
                }
                if ignore_duplicates {
                    return MappingCollectionAddResult::NotAddedIgnored;
                }
                self.duplicated_non_default.entry(key).or_default().push(id);
                MappingCollectionAddResult::NotAddedDuplicated
            }
        }
    }

    fn used_duplicates(&self) -> Vec<(MappingId, Vec<MappingId>)> {
        self.duplicated_non_default
            .iter()
            .filter(|(key, _)| {
                self.used_keys.contains(*key) && !self.explicit_default_keys.contains(*key)
            })
            .filter_map(|(key, losers)| Some((*self.defaults.get(key)?, losers.clone())))
            .collect()
    }
}

#[derive(Debug)]
pub struct MappingCollection {
    mappings: Vec<Mapping>,
    new_instance: MappingTable,
    existing_target: MappingTable,
    named: IndexMap<String, NamedMapping>,
    body_queue: VecDeque<(MappingId, BodyRequest)>,
}

impl Default for MappingCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl MappingCollection {
    pub fn new() -> Self {
        Self {
            mappings: Vec::with_capacity(INITIAL_MAPPING_CAPACITY),
            new_instance: MappingTable::default(),
            existing_target: MappingTable::default(),
            named: IndexMap::new(),
            body_queue: VecDeque::new(),
        }
    }

    // =========================================================================
    // Arena
    // =========================================================================

    /// Allocate a new mapping shell.
    pub fn push(
        &mut self,
        source: TypeId,
        target: TypeId,
        kind: MappingKind,
        flags: MappingFlags,
    ) -> MappingId {
        let id = MappingId(self.mappings.len() as u32);
        trace!(mapping_id = id.0, kind = kind.name(), "allocated mapping");
        self.mappings.push(Mapping {
            id,
            source,
            target,
            kind,
            flags,
            method_name: None,
        });
        id
    }

    pub fn get(&self, id: MappingId) -> Option<&Mapping> {
        self.mappings.get(id.0 as usize)
    }

    pub fn try_get(&self, id: MappingId) -> Result<&Mapping, EngineError> {
        self.get(id).ok_or(EngineError::UnknownMapping(id))
    }

    pub fn get_mut(&mut self, id: MappingId) -> Result<&mut Mapping, EngineError> {
        self.mappings
            .get_mut(id.0 as usize)
            .ok_or(EngineError::UnknownMapping(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mapping> {
        self.mappings.iter()
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn set_method_name(&mut self, id: MappingId, name: String) -> Result<(), EngineError> {
        self.get_mut(id)?.method_name = Some(name);
        Ok(())
    }

    /// Store the body built in the second pass.
    pub fn complete_body(&mut self, id: MappingId, body: MappingBody) -> Result<(), EngineError> {
        let mapping = self.get_mut(id)?;
        match (&mut mapping.kind, body) {
            (
                MappingKind::NewInstanceObject { body: slot }
                | MappingKind::ExistingTargetObject { body: slot },
                MappingBody::Object(body),
            ) => *slot = Some(body),
            (MappingKind::Tuple { body: slot }, MappingBody::Tuple(body)) => *slot = Some(body),
            (
                MappingKind::ForEachAdd { body: slot, .. }
                | MappingKind::DictionaryForEachSet { body: slot, .. },
                MappingBody::Loop(body),
            ) => *slot = Some(body),
            (MappingKind::RuntimeTargetType { arms }, MappingBody::RuntimeArms(built)) => {
                *arms = Some(built);
            }
            (
                MappingKind::UserNewInstance { delegate, .. }
                | MappingKind::UserExistingTarget { delegate, .. },
                MappingBody::Delegate(built),
            ) => *delegate = built,
            (MappingKind::UserProjection { element, .. }, MappingBody::Delegate(built)) => {
                *element = built;
            }
            (kind, body) => {
                let expected = match body {
                    MappingBody::Object(_) => "object",
                    MappingBody::Tuple(_) => "tuple",
                    MappingBody::Loop(_) => "loop",
                    MappingBody::RuntimeArms(_) => "runtime target",
                    MappingBody::Delegate(_) => "delegate",
                };
                trace!(mapping_id = id.0, kind = kind.name(), expected, "body kind mismatch");
                return Err(EngineError::BodyKindMismatch { id, expected });
            }
        }
        mapping.flags |= MappingFlags::BODY_BUILT;
        Ok(())
    }

    // =========================================================================
    // Default mappings
    // =========================================================================

    /// Default new-instance mapping for `key`. Marks the key as used.
    pub fn find(&mut self, key: &TypeMappingKey) -> Option<MappingId> {
        self.new_instance.find(key)
    }

    /// Default existing-target mapping for `key`. Marks the key as used.
    pub fn find_existing_target(&mut self, key: &TypeMappingKey) -> Option<MappingId> {
        self.existing_target.find(key)
    }

    pub fn try_add_as_default(&mut self, id: MappingId, key: TypeMappingKey) -> MappingCollectionAddResult {
        let existing = self
            .get(id)
            .is_some_and(Mapping::is_existing_target);
        let result = if existing {
            self.existing_target.try_add_as_default(key, id)
        } else {
            self.new_instance.try_add_as_default(key, id)
        };
        trace!(mapping_id = id.0, ?result, "register default mapping");
        result
    }

    /// Register a user declared mapping.
    ///
    /// - `is_default == Some(true)`: the default for its key; a second
    ///   explicit default is rejected
    /// - `Some(false)`: reachable by name only
    /// - `None`: the default if none exists yet, otherwise kept as a
    ///   duplicate that is reported if the key is ever used
    pub fn add_user_mapping(
        &mut self,
        id: MappingId,
        key: TypeMappingKey,
        ignore_duplicates: bool,
        is_default: Option<bool>,
        name: Option<&str>,
    ) -> MappingCollectionAddResult {
        if let Some(name) = name {
            self.add_named(name, id);
        }
        let existing = self
            .get(id)
            .is_some_and(Mapping::is_existing_target);
        let table = if existing {
            &mut self.existing_target
        } else {
            &mut self.new_instance
        };
        let result = table.add_user_mapping(key, id, ignore_duplicates, is_default);
        trace!(mapping_id = id.0, ?result, ?is_default, "register user mapping");
        result
    }

    fn add_named(&mut self, name: &str, id: MappingId) {
        let previous = self.named.get(name).map(|entry| entry.mapping);
        match previous {
            None => {
                self.named.insert(
                    name.to_string(),
                    NamedMapping {
                        mapping: id,
                        ambiguous: false,
                    },
                );
            }
            Some(previous) if previous != id => {
                if let Some(entry) = self.named.get_mut(name) {
                    entry.ambiguous = true;
                }
            }
            Some(_) => {}
        }
    }

    /// Named user mapping and whether the name is ambiguous.
    pub fn find_named(&self, name: &str) -> (Option<MappingId>, bool) {
        match self.named.get(name) {
            Some(entry) => (Some(entry.mapping), entry.ambiguous),
            None => (None, false),
        }
    }

    /// Duplicated unmarked user mappings whose key was looked up, as
    /// `(chosen default, losers)`, in registration order.
    pub fn used_duplicated_non_default_mappings(&self) -> Vec<(MappingId, Vec<MappingId>)> {
        let mut result = self.new_instance.used_duplicates();
        result.extend(self.existing_target.used_duplicates());
        result
    }

    // =========================================================================
    // Body queue
    // =========================================================================

    pub fn enqueue_to_build_body(&mut self, id: MappingId, request: BodyRequest) {
        trace!(mapping_id = id.0, queued = self.body_queue.len() + 1, "enqueue body");
        self.body_queue.push_back((id, request));
    }

    /// Take everything currently queued. Bodies built from the result may
    /// enqueue more; callers loop until the queue stays empty.
    pub fn dequeue_mappings_to_build_body(&mut self) -> Vec<(MappingId, BodyRequest)> {
        self.body_queue.drain(..).collect()
    }

    pub fn has_pending_bodies(&self) -> bool {
        !self.body_queue.is_empty()
    }
}
