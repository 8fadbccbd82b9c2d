//! Mapping resolution and construction engine.
//!
//! Given a mapper declaration (user methods plus configuration) and a view of
//! the host's types, the engine decides for every required `(source, target)`
//! pair *how* to convert: direct assignment, casts, parse calls, enum
//! conversions, collection loops, object member mappings and so on. The
//! result is a graph of `Mapping`s in a per-mapper `MappingCollection`, each
//! lowered to a neutral IR the emitter turns into code.
//!
//! Pipeline (see [`descriptor`]):
//! 1. user methods are registered as user mappings
//! 2. every partial method's body is built; bodies resolve nested pairs
//!    through the strategy chain, new shells are queued
//! 3. the body queue is drained until empty
//! 4. methods are lowered to IR
//!
//! Key properties:
//! - a pair is resolved once per configuration (`TypeMappingKey`), so
//!   recursive type graphs terminate on the memoized shell
//! - expression-restricted scopes (queryable projections) build everything
//!   inline and never produce statements
//! - expected failures are diagnostics, never errors

pub mod body;
pub mod cancellation;
pub mod collection;
pub mod config;
pub mod context;
pub mod descriptor;
pub mod emit;
pub mod error;
pub mod factories;
pub mod inline;
mod inline_rewrite;
pub mod key;
pub mod mapping;
pub mod members;
pub mod names;
pub mod recursion;
pub mod strategies;
pub mod user_mappings;

pub use cancellation::CancellationToken;
pub use collection::{BodyRequest, MappingCollection, MappingCollectionAddResult};
pub use config::{
    EnumMappingStrategy, EnumNamingStrategy, MapperConfiguration, MappingConfiguration,
    MappingConversionType, MemberMappingConfig, MethodConfiguration, PropertyNameMappingStrategy,
    RequiredMappingStrategy,
};
pub use context::{ContextMode, MapperState, MappingContext, Unresolved};
pub use descriptor::{MapperDescriptor, MapperDescriptorBuilder, MethodDescriptor};
pub use emit::{CodePrinter, Expr, MappingBuilder, MethodSignature, Stmt};
pub use error::{ConfigError, EngineError};
pub use factories::{FactoryId, ObjectFactory, ObjectFactoryRegistry};
pub use inline::InlineScopeKind;
pub use inline_rewrite::InlineFailure;
pub use key::TypeMappingKey;
pub use mapping::{InlineBody, Mapping, MappingFlags, MappingId, MappingKind};
pub use members::{MemberPath, MemberPathCandidateBuilder};
pub use names::UniqueNameBuilder;
pub use recursion::{RecursionGuard, RecursionProfile, RecursionResult};
pub use user_mappings::{MapperDeclaration, MethodDeclaration, MethodKind};

#[cfg(test)]
#[path = "../tests/test_support.rs"]
mod test_support;
#[cfg(test)]
#[path = "../tests/key_tests.rs"]
mod key_tests;
#[cfg(test)]
#[path = "../tests/collection_tests.rs"]
mod collection_tests;
#[cfg(test)]
#[path = "../tests/config_tests.rs"]
mod config_tests;
#[cfg(test)]
#[path = "../tests/names_tests.rs"]
mod names_tests;
#[cfg(test)]
#[path = "../tests/recursion_tests.rs"]
mod recursion_tests;
#[cfg(test)]
#[path = "../tests/member_matching_tests.rs"]
mod member_matching_tests;
#[cfg(test)]
#[path = "../tests/strategy_tests.rs"]
mod strategy_tests;
#[cfg(test)]
#[path = "../tests/inline_tests.rs"]
mod inline_tests;
#[cfg(test)]
#[path = "../tests/ir_tests.rs"]
mod ir_tests;
#[cfg(test)]
#[path = "../tests/descriptor_tests.rs"]
mod descriptor_tests;
