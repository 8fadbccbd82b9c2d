//! User declared object factories.
//!
//! A factory replaces `new T()` when the engine needs a fresh target
//! instance: for object member mappings and for collection population
//! loops. Factories are matched on the exact non-nullable target type; one
//! taking the source as parameter wins over a parameterless one.

use mapforge_types::TypeDatabase;
use mapforge_types::TypeId;
use mapforge_types::queries::{is_derived_from, non_nullable};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FactoryId(pub u32);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectFactory {
    pub method: String,
    pub target: TypeId,
    /// Parameter type when the factory receives the mapping source.
    pub source: Option<TypeId>,
}

#[derive(Clone, Debug, Default)]
pub struct ObjectFactoryRegistry {
    factories: Vec<ObjectFactory>,
}

impl ObjectFactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, factory: ObjectFactory) -> FactoryId {
        let id = FactoryId(self.factories.len() as u32);
        self.factories.push(factory);
        id
    }

    pub fn get(&self, id: FactoryId) -> Option<&ObjectFactory> {
        self.factories.get(id.0 as usize)
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Factory able to create `target` for a value of `source`.
    pub fn find(&self, db: &dyn TypeDatabase, source: TypeId, target: TypeId) -> Option<FactoryId> {
        let target = non_nullable(db, target);
        let mut parameterless = None;
        for (index, factory) in self.factories.iter().enumerate() {
            if non_nullable(db, factory.target) != target {
                continue;
            }
            match factory.source {
                Some(param) if is_derived_from(db, source, param) => {
                    return Some(FactoryId(index as u32));
                }
                Some(_) => {}
                None => {
                    if parameterless.is_none() {
                        parameterless = Some(FactoryId(index as u32));
                    }
                }
            }
        }
        parameterless
    }
}
