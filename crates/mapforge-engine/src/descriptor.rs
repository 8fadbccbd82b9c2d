//! Per-mapper build pipeline.
//!
//! ```text
//! MapperDeclaration
//!   -> register user mappings (declaration order)
//!   -> drain the body queue until empty (cancellation checked per item)
//!   -> report used duplicated user mappings
//!   -> lower every method mapping into IR
//!   -> MapperDescriptor
//! ```
//!
//! Each mapper owns its collection, names and diagnostics; nothing is
//! shared between two builds except the read-only type database.

use crate::body;
use crate::cancellation::CancellationToken;
use crate::collection::MappingCollection;
use crate::config::MappingConfiguration;
use crate::context::MapperState;
use crate::emit::build::{SOURCE_PARAM, TARGET_PARAM, TARGET_TYPE_PARAM};
use crate::emit::{CodePrinter, MappingBuilder, MethodSignature, Stmt};
use crate::error::EngineError;
use crate::factories::ObjectFactoryRegistry;
use crate::mapping::{Mapping, MappingId, MappingKind};
use crate::user_mappings::{MapperDeclaration, UserMapping, register_user_mappings};
use indexmap::IndexSet;
use mapforge_common::Diagnostic;
use mapforge_common::diagnostic_codes::AMBIGUOUS_USER_MAPPINGS;
use mapforge_types::{TypeDatabase, TypeFormatter};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// A method of the generated mapper.
#[derive(Clone, Debug)]
pub struct MethodDescriptor {
    pub mapping: MappingId,
    pub signature: MethodSignature,
    /// Declared by the user, as opposed to a generated helper.
    pub user_defined: bool,
    /// Empty for user implemented methods.
    pub body: Vec<Stmt>,
}

impl MethodDescriptor {
    pub fn name(&self) -> &str {
        &self.signature.name
    }

    /// Whether code has to be generated for this method.
    pub fn is_generated(&self) -> bool {
        !self.body.is_empty()
    }
}

/// Everything the emitter needs for one mapper.
#[derive(Debug)]
pub struct MapperDescriptor {
    pub name: String,
    pub mappings: MappingCollection,
    /// User methods in declaration order, then helpers in discovery order.
    pub methods: Vec<MethodDescriptor>,
    pub diagnostics: Vec<Diagnostic>,
}

impl MapperDescriptor {
    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.name() == name)
    }

    pub fn diagnostic_count(&self, code: u32) -> usize {
        self.diagnostics.iter().filter(|d| d.code == code).count()
    }

    /// C# preview of the generated partial class.
    pub fn render(&self) -> String {
        let mut printer = CodePrinter::new();
        let generated: Vec<_> = self.methods.iter().filter(|m| m.is_generated()).collect();
        printer.print_class(&self.name, |printer| {
            for (i, method) in generated.iter().enumerate() {
                if i > 0 {
                    printer.print_blank_line();
                }
                printer.print_method(&method.signature, &method.body);
            }
        });
        printer.finish()
    }
}

pub struct MapperDescriptorBuilder<'a> {
    state: MapperState<'a>,
    declaration: &'a MapperDeclaration,
}

impl<'a> MapperDescriptorBuilder<'a> {
    pub fn new(db: &'a dyn TypeDatabase, declaration: &'a MapperDeclaration) -> Result<Self, EngineError> {
        declaration.config.validate()?;
        let defaults = Arc::new(MappingConfiguration::from_mapper(&declaration.config));
        let mut factories = ObjectFactoryRegistry::new();
        for factory in &declaration.object_factories {
            factories.register(factory.clone());
        }
        Ok(Self {
            state: MapperState::new(db, defaults, factories),
            declaration,
        })
    }

    pub fn build(mut self, cancellation: &CancellationToken) -> Result<MapperDescriptor, EngineError> {
        debug!(
            mapper = %self.declaration.name,
            methods = self.declaration.methods.len(),
            "build mapper"
        );
        let users = register_user_mappings(&mut self.state, self.declaration)?;
        self.build_bodies(cancellation)?;
        self.report_used_duplicates(&users);
        let methods = self.build_methods(&users);

        let (mappings, diagnostics) = self.state.into_parts();
        debug!(
            mapper = %self.declaration.name,
            mappings = mappings.len(),
            methods = methods.len(),
            diagnostics = diagnostics.len(),
            "mapper built"
        );
        Ok(MapperDescriptor {
            name: self.declaration.name.clone(),
            mappings,
            methods,
            diagnostics: diagnostics.into_diagnostics(),
        })
    }

    /// Building a body may queue more bodies; drain until the queue stays
    /// empty.
    fn build_bodies(&mut self, cancellation: &CancellationToken) -> Result<(), EngineError> {
        let mut built = 0usize;
        while self.state.mappings.has_pending_bodies() {
            for (id, request) in self.state.mappings.dequeue_mappings_to_build_body() {
                cancellation.check()?;
                let mut ctx = self
                    .state
                    .body_context(id, request)
                    .ok_or(EngineError::UnknownMapping(id))?;
                body::build_body(&mut ctx, id)?;
                built += 1;
            }
        }
        trace!(built, "body queue drained");
        Ok(())
    }

    fn report_used_duplicates(&mut self, users: &[UserMapping]) {
        let locations: FxHashMap<MappingId, _> = users
            .iter()
            .map(|user| (user.mapping, user.location.clone()))
            .collect();
        for (chosen, losers) in self.state.mappings.used_duplicated_non_default_mappings() {
            let Some(mapping) = self.state.mappings.get(chosen) else {
                continue;
            };
            let args = vec![
                self.state.type_name(mapping.source),
                self.state.type_name(mapping.target),
                mapping.method_name.clone().unwrap_or_default(),
            ];
            for loser in losers {
                if let Some(location) = locations.get(&loser) {
                    self.state.report(AMBIGUOUS_USER_MAPPINGS, location, args.clone());
                }
            }
        }
    }

    /// User methods, then every named helper reachable from them.
    fn build_methods(&self, users: &[UserMapping]) -> Vec<MethodDescriptor> {
        let mappings = &self.state.mappings;
        let mut order: IndexSet<MappingId> = users.iter().map(|u| u.mapping).collect();
        let mut next = 0;
        while let Some(&id) = order.get_index(next) {
            next += 1;
            let Some(mapping) = mappings.get(id) else {
                continue;
            };
            // Unnamed mappings are expanded in place but may reference helpers.
            for dependency in mapping.dependencies() {
                if mappings.get(dependency).is_some_and(|m| !m.is_user()) {
                    order.insert(dependency);
                }
            }
        }

        let db = self.state.db;
        let mut builder = MappingBuilder::new(db, mappings, &self.state.factories);
        order
            .into_iter()
            .filter_map(|id| mappings.get(id))
            .filter(|m| m.is_method() && m.method_name.is_some())
            .map(|mapping| MethodDescriptor {
                mapping: mapping.id,
                signature: signature(db, mapping),
                user_defined: mapping.is_user(),
                body: builder.build_method_body(mapping.id),
            })
            .collect()
    }
}

fn signature(db: &dyn TypeDatabase, mapping: &Mapping) -> MethodSignature {
    let formatter = TypeFormatter::new(db);
    let source = formatter.format(mapping.source);
    let target = formatter.format(mapping.target);
    let modifiers = if mapping.is_user() { "public partial" } else { "private" };
    let (return_type, parameters) = match &mapping.kind {
        MappingKind::RuntimeTargetType { .. } => (
            target,
            vec![
                (source, SOURCE_PARAM.to_string()),
                ("System.Type".to_string(), TARGET_TYPE_PARAM.to_string()),
            ],
        ),
        MappingKind::UserProjection { .. } => (
            format!("System.Linq.Expressions.Expression<System.Func<{source}, {target}>>"),
            Vec::new(),
        ),
        _ if mapping.is_existing_target() => (
            "void".to_string(),
            vec![
                (source, SOURCE_PARAM.to_string()),
                (target, TARGET_PARAM.to_string()),
            ],
        ),
        _ => (target, vec![(source, SOURCE_PARAM.to_string())]),
    };
    MethodSignature {
        modifiers: modifiers.to_string(),
        name: mapping.method_name.clone().unwrap_or_default(),
        return_type,
        parameters,
    }
}
