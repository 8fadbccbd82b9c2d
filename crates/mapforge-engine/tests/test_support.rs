//! Shared helpers for engine tests.

use super::*;
use mapforge_common::SymbolLocation;
use mapforge_types::{TypeDatabase, TypeId};
use std::sync::{Arc, Once};
use tracing_subscriber::EnvFilter;

/// Install a test-captured subscriber once per test binary when `MAPFORGE_LOG` is
/// set, e.g. `MAPFORGE_LOG=mapforge_engine=trace`.
pub(crate) fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let Ok(directives) = std::env::var("MAPFORGE_LOG") else {
            return;
        };
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::builder().parse_lossy(directives))
            .with_test_writer()
            .try_init();
    });
}

pub(crate) fn state(db: &dyn TypeDatabase) -> MapperState<'_> {
    state_with(db, &MapperConfiguration::default())
}

pub(crate) fn state_with<'a>(db: &'a dyn TypeDatabase, config: &MapperConfiguration) -> MapperState<'a> {
    init_tracing();
    MapperState::new(
        db,
        Arc::new(MappingConfiguration::from_mapper(config)),
        ObjectFactoryRegistry::new(),
    )
}

/// Resolve `source → target` the way a member of a user mapping would.
pub(crate) fn resolve(state: &mut MapperState<'_>, source: TypeId, target: TypeId) -> Option<MappingId> {
    let config = Arc::clone(state.defaults());
    let mut ctx = state.context(source, target, config, SymbolLocation::new("TestMapper.Map"));
    ctx.find_or_build_mapping(source, target)
}

/// Build every queued body.
pub(crate) fn drain(state: &mut MapperState<'_>) {
    while state.mappings().has_pending_bodies() {
        for (id, request) in state.mappings_mut().dequeue_mappings_to_build_body() {
            let mut ctx = state.body_context(id, request).expect("queued mapping exists");
            body::build_body(&mut ctx, id).expect("body builds");
        }
    }
}

pub(crate) fn kind(state: &MapperState<'_>, id: MappingId) -> MappingKind {
    state.mappings().get(id).expect("mapping exists").kind.clone()
}

pub(crate) fn render_expression(state: &MapperState<'_>, id: MappingId) -> String {
    let factories = ObjectFactoryRegistry::new();
    let mut builder = MappingBuilder::new(state.db(), state.mappings(), &factories);
    builder.build_expression(id, Expr::ident("source")).to_string()
}

pub(crate) fn render_method(state: &MapperState<'_>, id: MappingId) -> String {
    let factories = ObjectFactoryRegistry::new();
    let mut builder = MappingBuilder::new(state.db(), state.mappings(), &factories);
    let body = builder.build_method_body(id);
    body.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")
}

pub(crate) fn diagnostic_count(state: &MapperState<'_>, code: u32) -> usize {
    state.diagnostics().count(code)
}
