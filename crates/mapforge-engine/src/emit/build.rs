//! Lowering of built mappings into IR.
//!
//! Mappings flagged `METHOD` are referenced by a call to their generated
//! method; everything else, including every mapping of an expression
//! scope, is expanded inline at the use site.

use super::ir::{BinaryOp, Expr, Pattern, Stmt, SwitchArm};
use crate::collection::MappingCollection;
use crate::factories::ObjectFactoryRegistry;
use crate::mapping::{
    CollectMethod, CollectionCreation, DateTimeTarget, DerivedArm, InsertMethod, LoopBody, Mapping,
    MappingId, MappingKind, MemberAssignment, MemberNullHandling, MemberValue, NullFallbackValue,
    ObjectBody, ObjectCreation, SourceValue, SpanAccess, TupleBody,
};
use crate::members::path::{MemberPath, is_nullable_in_mode};
use crate::names::UniqueNameBuilder;
use mapforge_common::Atom;
use mapforge_types::queries::{accepts_null, array_element, is_nullable, is_value_type, non_nullable};
use mapforge_types::{TypeDatabase, TypeFormatter, TypeId};
use tracing::trace;

pub const SOURCE_PARAM: &str = "source";
pub const TARGET_PARAM: &str = "target";
pub const TARGET_TYPE_PARAM: &str = "targetType";

const ARGUMENT_NULL: &str = "System.ArgumentNullException";
const ARGUMENT_OUT_OF_RANGE: &str = "System.ArgumentOutOfRangeException";
const ARGUMENT: &str = "System.ArgumentException";
const NOT_IMPLEMENTED: &str = "System.NotImplementedException";

pub struct MappingBuilder<'m> {
    db: &'m dyn TypeDatabase,
    mappings: &'m MappingCollection,
    factories: &'m ObjectFactoryRegistry,
    /// Locals and lambda parameters of the method being built.
    names: UniqueNameBuilder,
}

impl<'m> MappingBuilder<'m> {
    pub fn new(
        db: &'m dyn TypeDatabase,
        mappings: &'m MappingCollection,
        factories: &'m ObjectFactoryRegistry,
    ) -> Self {
        Self {
            db,
            mappings,
            factories,
            names: method_scope(),
        }
    }

    fn type_name(&self, id: TypeId) -> String {
        TypeFormatter::new(self.db).format(id)
    }

    fn atom(&self, atom: Atom) -> String {
        self.db.resolve_atom(atom).to_string()
    }

    fn enum_member(&self, enum_type: TypeId, member: Atom) -> Expr {
        Expr::ident(self.type_name(non_nullable(self.db, enum_type))).member(self.atom(member))
    }

    fn fresh(&mut self, base: &str) -> String {
        self.names.new_name(base)
    }

    // =========================================================================
    // Methods
    // =========================================================================

    /// Statements of the generated method of `id`. Parameters are `source`,
    /// `target` for existing target mappings and `targetType` for runtime
    /// target type mappings.
    pub fn build_method_body(&mut self, id: MappingId) -> Vec<Stmt> {
        self.names = method_scope();
        let Some(mapping) = self.mappings.get(id) else {
            return Vec::new();
        };
        trace!(mapping_id = id.0, kind = mapping.kind.name(), "build method body");
        let source = Expr::ident(SOURCE_PARAM);
        let target = Expr::ident(TARGET_PARAM);
        match &mapping.kind {
            MappingKind::UserImplemented { .. } => Vec::new(),
            MappingKind::UserNewInstance { delegate, .. } => match delegate {
                Some(delegate) => self.delegate_body(*delegate, source),
                None => not_implemented(),
            },
            MappingKind::UserExistingTarget { delegate, .. } => match delegate {
                Some(delegate) => self.existing_statements(*delegate, source, target, true),
                None => not_implemented(),
            },
            MappingKind::UserProjection { element, .. } => match element {
                Some(element) => {
                    let param = self.fresh("x");
                    let body = self.build_expression(*element, Expr::ident(&param));
                    vec![Stmt::Return(Some(Expr::lambda(param, body)))]
                }
                None => not_implemented(),
            },
            _ if mapping.is_existing_target() => self.existing_body(mapping, source, target),
            _ => self.new_instance_body(mapping, source),
        }
    }

    /// Body of a user method that delegates to `delegate`: the delegate's
    /// own method body when it has one but no name, else a call.
    fn delegate_body(&mut self, delegate: MappingId, source: Expr) -> Vec<Stmt> {
        match self.mappings.get(delegate) {
            Some(mapping) if mapping.is_method() && mapping.method_name.is_none() => {
                self.new_instance_body(mapping, source)
            }
            Some(_) => vec![Stmt::Return(Some(self.build_expression(delegate, source)))],
            None => not_implemented(),
        }
    }

    fn new_instance_body(&mut self, mapping: &Mapping, source: Expr) -> Vec<Stmt> {
        match &mapping.kind {
            MappingKind::NewInstanceObject { body: Some(body) } => {
                self.object_statements(mapping, body, source)
            }
            MappingKind::ForEachAdd {
                element,
                body: Some(body),
            } => self.loop_statements(mapping, body, source, None, |builder, item| {
                vec![builder.build_expression(*element, item)]
            }),
            MappingKind::DictionaryForEachSet {
                key,
                value,
                body: Some(body),
            } => self.loop_statements(mapping, body, source, None, |builder, item| {
                vec![
                    builder.build_expression(*key, item.clone().member("Key")),
                    builder.build_expression(*value, item.member("Value")),
                ]
            }),
            MappingKind::ArrayForLoop { element } => self.array_loop_statements(mapping, *element, source),
            MappingKind::Derived { arms, fallback } => {
                vec![Stmt::Return(Some(self.derived_switch(mapping, arms, *fallback, source)))]
            }
            MappingKind::RuntimeTargetType { arms } => {
                let arms = arms.as_deref().unwrap_or_default();
                vec![Stmt::Return(Some(self.runtime_switch(mapping, arms, source)))]
            }
            MappingKind::Queryable { element } => {
                let param = self.fresh("x");
                let body = self.build_expression(*element, Expr::ident(&param));
                let select = Expr::static_call(
                    "System.Linq.Queryable.Select",
                    vec![source, Expr::lambda(param, body)],
                );
                vec![Stmt::Return(Some(select))]
            }
            _ => vec![Stmt::Return(Some(self.lower(mapping, source)))],
        }
    }

    fn existing_body(&mut self, mapping: &Mapping, source: Expr, target: Expr) -> Vec<Stmt> {
        match &mapping.kind {
            MappingKind::ExistingTargetObject { body: Some(body) } => {
                self.assignment_statements(mapping, &body.assignments, &source, &target)
            }
            MappingKind::ExistingTargetNullGuard { inner } => {
                let inner = self.existing_statements(*inner, source.clone(), target, false);
                vec![Stmt::If {
                    condition: source.is_not_null(),
                    then: inner,
                    otherwise: Vec::new(),
                }]
            }
            MappingKind::ForEachAdd {
                element,
                body: Some(body),
            } => self.loop_statements(mapping, body, source, Some(target), |builder, item| {
                vec![builder.build_expression(*element, item)]
            }),
            MappingKind::DictionaryForEachSet {
                key,
                value,
                body: Some(body),
            } => self.loop_statements(mapping, body, source, Some(target), |builder, item| {
                vec![
                    builder.build_expression(*key, item.clone().member("Key")),
                    builder.build_expression(*value, item.member("Value")),
                ]
            }),
            _ => Vec::new(),
        }
    }

    /// Statements mapping `source` into the instance `target` through `id`.
    /// `expand` inlines the body even if `id` has a method of its own.
    fn existing_statements(&mut self, id: MappingId, source: Expr, target: Expr, expand: bool) -> Vec<Stmt> {
        let Some(mapping) = self.mappings.get(id) else {
            return Vec::new();
        };
        match &mapping.method_name {
            Some(name) if mapping.is_method() && !expand => {
                vec![Stmt::Expr(Expr::static_call(name.clone(), vec![source, target]))]
            }
            _ => self.existing_body(mapping, source, target),
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    /// Expression converting `source` with mapping `id`.
    pub fn build_expression(&mut self, id: MappingId, source: Expr) -> Expr {
        let Some(mapping) = self.mappings.get(id) else {
            return source;
        };
        match &mapping.method_name {
            Some(name) if mapping.is_method() => Expr::static_call(name.clone(), vec![source]),
            _ => self.lower(mapping, source),
        }
    }

    fn lower(&mut self, mapping: &Mapping, source: Expr) -> Expr {
        let target_name = self.type_name(non_nullable(self.db, mapping.target));
        match &mapping.kind {
            MappingKind::Direct => source,
            MappingKind::NullDelegate {
                inner,
                source_nullable,
                fallback,
            } => self.null_delegate(mapping, *inner, *source_nullable, *fallback, source),
            MappingKind::Cast { .. } => Expr::cast(self.type_name(mapping.target), source),
            MappingKind::Parse => Expr::ident(target_name).call("Parse", vec![source]),
            MappingKind::Constructor => Expr::new_object(target_name, vec![source]),
            MappingKind::ToStringCall { format, provider } => {
                let mut args = Vec::new();
                if let Some(format) = format {
                    args.push(Expr::string(format));
                }
                if let Some(provider) = provider {
                    args.push(Expr::ident(provider.clone()));
                }
                source.call("ToString", args)
            }
            MappingKind::DateTimeConversion { target } => {
                let owner = match target {
                    DateTimeTarget::DateOnly => "System.DateOnly",
                    DateTimeTarget::TimeOnly => "System.TimeOnly",
                };
                Expr::ident(owner).call("FromDateTime", vec![source])
            }
            MappingKind::EnumByValue {
                check_defined,
                fallback,
            } => self.enum_by_value(mapping, *check_defined, *fallback, source),
            MappingKind::EnumByName { arms, fallback } => {
                let arms = arms
                    .iter()
                    .map(|(from, to)| SwitchArm {
                        pattern: Pattern::Constant(self.enum_member(mapping.source, *from)),
                        guard: None,
                        value: self.enum_member(mapping.target, *to),
                    })
                    .collect();
                let otherwise = match fallback {
                    Some(member) => self.enum_member(mapping.target, *member),
                    None => out_of_range(&source, &self.type_name(mapping.source)),
                };
                switch(source, arms, otherwise)
            }
            MappingKind::EnumToString { arms } => {
                if arms.is_empty() {
                    return source.call("ToString", Vec::new());
                }
                let arms = arms
                    .iter()
                    .map(|(member, text)| SwitchArm {
                        pattern: Pattern::Constant(self.enum_member(mapping.source, *member)),
                        guard: None,
                        value: Expr::string(text),
                    })
                    .collect();
                let otherwise = source.clone().call("ToString", Vec::new());
                switch(source, arms, otherwise)
            }
            MappingKind::StringToEnum {
                arms,
                ignore_case,
                fallback,
                use_parse,
            } => self.string_to_enum(mapping, arms, *ignore_case, *fallback, *use_parse, source),
            MappingKind::Tuple { body } => self.tuple_literal(mapping, body.as_ref(), source),
            MappingKind::NewInstanceObject { body: Some(body) } => self.object_creation(mapping, body, &source),
            MappingKind::Derived { arms, fallback } => self.derived_conditional(mapping, arms, *fallback, source),
            MappingKind::ArrayClone => Expr::cast(self.type_name(mapping.target), source.call("Clone", Vec::new())),
            MappingKind::LinqSelect { element, collect } => {
                let selected = self.select(*element, source);
                match collect {
                    Some(collect) => collect_call(*collect, selected),
                    None => selected,
                }
            }
            MappingKind::EnumerableConstructor { element } => {
                let selected = self.select(*element, source);
                Expr::new_object(target_name, vec![selected])
            }
            MappingKind::ToDictionary { key, value, collect } => {
                let key_param = self.fresh("x");
                let key_body = self.build_expression(*key, Expr::ident(&key_param).member("Key"));
                let value_param = self.fresh("x");
                let value_body = self.build_expression(*value, Expr::ident(&value_param).member("Value"));
                source.call(
                    collect.method_name(),
                    vec![
                        Expr::lambda(key_param, key_body),
                        Expr::lambda(value_param, value_body),
                    ],
                )
            }
            MappingKind::SpanAccess { access } => match access {
                SpanAccess::ToArray => source.call("ToArray", Vec::new()),
                SpanAccess::Span => source.member("Span"),
            },
            MappingKind::Chain { steps } => steps
                .iter()
                .fold(source, |value, step| self.build_expression(*step, value)),
            MappingKind::Inlined { body } => body.expr.substitute(&body.parameter, &source),
            MappingKind::UserImplemented { method, .. } => Expr::static_call(method.clone(), vec![source]),
            _ => match &mapping.method_name {
                Some(name) => Expr::static_call(name.clone(), vec![source]),
                None => source,
            },
        }
    }

    fn null_delegate(
        &mut self,
        mapping: &Mapping,
        inner: MappingId,
        source_nullable: bool,
        fallback: NullFallbackValue,
        source: Expr,
    ) -> Expr {
        if !source_nullable {
            return self.build_expression(inner, source);
        }
        let inner_synthetic = self.mappings.get(inner).is_some_and(Mapping::is_synthetic);
        let fallback_expr = self.fallback_expr(fallback, mapping.target, &source);
        if inner_synthetic {
            if accepts_null(self.db, mapping.target) {
                return source;
            }
            return Expr::binary(BinaryOp::Coalesce, source, fallback_expr);
        }
        let value = if is_value_type(self.db, non_nullable(self.db, mapping.source)) {
            source.clone().member("Value")
        } else {
            source.clone()
        };
        let mapped = self.build_expression(inner, value);
        Expr::conditional(source.is_null(), fallback_expr, mapped)
    }

    fn fallback_expr(&self, fallback: NullFallbackValue, target: TypeId, source: &Expr) -> Expr {
        match fallback {
            NullFallbackValue::Default => Expr::Default,
            NullFallbackValue::EmptyString => Expr::string(""),
            NullFallbackValue::CreateInstance => {
                Expr::new_object(self.type_name(non_nullable(self.db, target)), Vec::new())
            }
            NullFallbackValue::ThrowArgumentNull => {
                Expr::throw(ARGUMENT_NULL, vec![source.clone().name_of()])
            }
        }
    }

    fn enum_by_value(&self, mapping: &Mapping, check_defined: bool, fallback: Option<Atom>, source: Expr) -> Expr {
        let target_name = self.type_name(non_nullable(self.db, mapping.target));
        let cast = Expr::cast(target_name.clone(), source.clone());
        if !check_defined || (mapping.is_inline() && fallback.is_none()) {
            return cast;
        }
        let defined = Expr::static_call(
            "System.Enum.IsDefined",
            vec![Expr::TypeOf(target_name), cast.clone()],
        );
        let otherwise = match fallback {
            Some(member) => self.enum_member(mapping.target, member),
            None => out_of_range(&source, &self.type_name(mapping.source)),
        };
        Expr::conditional(defined, cast, otherwise)
    }

    fn string_to_enum(
        &self,
        mapping: &Mapping,
        arms: &[(String, Atom)],
        ignore_case: bool,
        fallback: Option<Atom>,
        use_parse: bool,
        source: Expr,
    ) -> Expr {
        let target_name = self.type_name(non_nullable(self.db, mapping.target));
        if use_parse {
            let mut args = vec![Expr::TypeOf(target_name.clone()), source];
            if ignore_case {
                args.push(Expr::literal("true"));
            }
            return Expr::cast(target_name, Expr::static_call("System.Enum.Parse", args));
        }
        let arms = arms
            .iter()
            .map(|(text, member)| {
                let value = self.enum_member(mapping.target, *member);
                if ignore_case {
                    SwitchArm {
                        pattern: Pattern::Discard,
                        guard: Some(source.clone().call(
                            "Equals",
                            vec![
                                Expr::string(text),
                                Expr::ident("System.StringComparison.OrdinalIgnoreCase"),
                            ],
                        )),
                        value,
                    }
                } else {
                    SwitchArm {
                        pattern: Pattern::Constant(Expr::string(text)),
                        guard: None,
                        value,
                    }
                }
            })
            .collect();
        let otherwise = match fallback {
            Some(member) => self.enum_member(mapping.target, member),
            None => Expr::cast(
                target_name.clone(),
                Expr::static_call(
                    "System.Enum.Parse",
                    vec![Expr::TypeOf(target_name), source.clone(), Expr::literal(ignore_case.to_string())],
                ),
            ),
        };
        switch(source, arms, otherwise)
    }

    fn select(&mut self, element: MappingId, source: Expr) -> Expr {
        if self.mappings.get(element).is_some_and(Mapping::is_synthetic) {
            return source;
        }
        let param = self.fresh("x");
        let body = self.build_expression(element, Expr::ident(&param));
        source.call("Select", vec![Expr::lambda(param, body)])
    }

    // =========================================================================
    // Derived and runtime type switches
    // =========================================================================

    fn derived_switch(&mut self, mapping: &Mapping, arms: &[DerivedArm], fallback: Option<MappingId>, source: Expr) -> Expr {
        let mut switch_arms = Vec::with_capacity(arms.len() + 1);
        for arm in arms {
            let binding = self.fresh("x");
            let value = self.build_expression(arm.mapping, Expr::ident(&binding));
            switch_arms.push(SwitchArm {
                pattern: Pattern::Type {
                    type_name: self.type_name(non_nullable(self.db, arm.source)),
                    binding: Some(binding),
                },
                guard: None,
                value,
            });
        }
        let otherwise = match fallback {
            Some(fallback) => self.build_expression(fallback, source.clone()),
            None => Expr::throw(
                ARGUMENT,
                vec![
                    Expr::string(&format!(
                        "Cannot map {} to {} as there is no known derived type mapping",
                        self.type_name(mapping.source),
                        self.type_name(mapping.target)
                    )),
                    source.clone().name_of(),
                ],
            ),
        };
        switch(source, switch_arms, otherwise)
    }

    /// Expression mode has no switch: `source is A ? map((A)source) : ...`.
    fn derived_conditional(
        &mut self,
        mapping: &Mapping,
        arms: &[DerivedArm],
        fallback: Option<MappingId>,
        source: Expr,
    ) -> Expr {
        let mut result = match fallback {
            Some(fallback) => self.build_expression(fallback, source.clone()),
            None => Expr::Default,
        };
        for arm in arms.iter().rev() {
            let arm_type = self.type_name(non_nullable(self.db, arm.source));
            let narrowed = Expr::cast(arm_type.clone(), source.clone());
            let value = self.build_expression(arm.mapping, narrowed);
            let test = Expr::Is {
                expr: Box::new(source.clone()),
                pattern: Box::new(Pattern::Type {
                    type_name: arm_type,
                    binding: None,
                }),
            };
            let value = Expr::cast(self.type_name(mapping.target), value);
            result = Expr::conditional(test, value, result);
        }
        result
    }

    fn runtime_switch(&mut self, mapping: &Mapping, arms: &[DerivedArm], source: Expr) -> Expr {
        let target_type = Expr::ident(TARGET_TYPE_PARAM);
        let mut switch_arms = Vec::with_capacity(arms.len() + 2);
        for arm in arms {
            let binding = self.fresh("x");
            let value = self.build_expression(arm.mapping, Expr::ident(&binding));
            let guard = target_type.clone().call(
                "IsAssignableFrom",
                vec![Expr::TypeOf(self.type_name(non_nullable(self.db, arm.target)))],
            );
            switch_arms.push(SwitchArm {
                pattern: Pattern::Type {
                    type_name: self.type_name(non_nullable(self.db, arm.source)),
                    binding: Some(binding),
                },
                guard: Some(guard),
                value: Expr::cast(self.type_name(mapping.target), value),
            });
        }
        let null_value = if accepts_null(self.db, mapping.source) {
            Expr::Default
        } else {
            Expr::throw(ARGUMENT_NULL, vec![source.clone().name_of()])
        };
        switch_arms.push(SwitchArm {
            pattern: Pattern::Null,
            guard: None,
            value: null_value,
        });
        let otherwise = Expr::throw(
            ARGUMENT,
            vec![
                Expr::string("Cannot map the runtime type to the requested target type as there is no known type mapping"),
                source.clone().name_of(),
            ],
        );
        switch(source, switch_arms, otherwise)
    }

    // =========================================================================
    // Objects and tuples
    // =========================================================================

    fn object_statements(&mut self, mapping: &Mapping, body: &ObjectBody, source: Expr) -> Vec<Stmt> {
        if body.creation == ObjectCreation::Unavailable {
            return vec![Stmt::Throw {
                type_name: NOT_IMPLEMENTED.to_string(),
                args: vec![Expr::string(&format!(
                    "No accessible constructor found for {}",
                    self.type_name(mapping.target)
                ))],
            }];
        }
        let target = Expr::ident(TARGET_PARAM);
        let creation = self.object_creation(mapping, body, &source);
        let mut statements = vec![Stmt::Local {
            name: TARGET_PARAM.to_string(),
            value: creation,
        }];
        statements.extend(self.assignment_statements(mapping, &body.assignments, &source, &target));
        statements.push(Stmt::Return(Some(target)));
        statements
    }

    /// `new T(args) { initializers }`, or the factory call. In expression
    /// mode all members are initializers.
    fn object_creation(&mut self, mapping: &Mapping, body: &ObjectBody, source: &Expr) -> Expr {
        let upgrade = mapping.is_inline();
        let mut initializers = Vec::with_capacity(body.initializers.len());
        for assignment in &body.initializers {
            let [name] = assignment.target.as_slice() else {
                continue;
            };
            let (value, _) = self.member_value(&assignment.value, source, upgrade);
            initializers.push((self.atom(*name), value));
        }
        match &body.creation {
            ObjectCreation::Factory { factory } => {
                let Some(factory) = self.factories.get(*factory) else {
                    return Expr::Default;
                };
                let args = if factory.source.is_some() {
                    vec![source.clone()]
                } else {
                    Vec::new()
                };
                Expr::static_call(factory.method.clone(), args)
            }
            ObjectCreation::Constructor { args } => {
                let args = args
                    .iter()
                    .map(|arg| self.member_value(&arg.value, source, upgrade).0)
                    .collect();
                Expr::New {
                    type_name: self.type_name(non_nullable(self.db, mapping.target)),
                    args,
                    initializers,
                }
            }
            ObjectCreation::Unavailable | ObjectCreation::Existing => Expr::Default,
        }
    }

    fn assignment_statements(
        &mut self,
        mapping: &Mapping,
        assignments: &[MemberAssignment],
        source: &Expr,
        target: &Expr,
    ) -> Vec<Stmt> {
        let upgrade = mapping.is_inline();
        let mut statements = Vec::with_capacity(assignments.len());
        for assignment in assignments {
            let member = assignment
                .target
                .iter()
                .fold(target.clone(), |expr, name| expr.member(self.atom(*name)));
            if assignment.existing {
                let (value_source, condition) = self.member_source(&assignment.value, source, upgrade);
                let Some(id) = assignment.value.mapping else {
                    continue;
                };
                let inner = self.existing_statements(id, value_source, member, false);
                statements.extend(guarded(condition, inner));
                continue;
            }
            let (value, condition) = self.member_value(&assignment.value, source, upgrade);
            let assign = Stmt::Assign { target: member, value };
            statements.extend(guarded(condition, vec![assign]));
        }
        statements
    }

    fn tuple_literal(&mut self, mapping: &Mapping, body: Option<&TupleBody>, source: Expr) -> Expr {
        let Some(body) = body else {
            return Expr::Default;
        };
        let upgrade = mapping.is_inline();
        let elements = body
            .elements
            .iter()
            .map(|element| {
                let name = element.name.map(|n| self.atom(n));
                (name, self.member_value(&element.value, &source, upgrade).0)
            })
            .collect();
        Expr::Tuple(elements)
    }

    // =========================================================================
    // Member values
    // =========================================================================

    fn path_expr(&self, root: &Expr, path: &MemberPath, len: usize) -> Expr {
        path.segments[..len.min(path.segments.len())]
            .iter()
            .fold(root.clone(), |expr, segment| expr.member(self.atom(segment.name)))
    }

    /// Null checks required before `value` can be read, joined with `&&`.
    fn null_condition(&self, value: &MemberValue, root: &Expr, upgrade: bool) -> Option<Expr> {
        let SourceValue::Path(path) = &value.source else {
            return None;
        };
        let mut lengths = path.nullable_prefixes(self.db, upgrade);
        if !path.is_root() && self.reads_non_nullable(value, path, upgrade) {
            lengths.push(path.segments.len());
        }
        lengths
            .into_iter()
            .map(|len| self.path_expr(root, path, len).is_not_null())
            .reduce(|left, right| Expr::binary(BinaryOp::And, left, right))
    }

    /// Whether the value mapping expects the non-nullable form of a
    /// nullable leaf.
    fn reads_non_nullable(&self, value: &MemberValue, path: &MemberPath, upgrade: bool) -> bool {
        let leaf = path.member_type();
        let mapping_source = value
            .mapping
            .and_then(|id| self.mappings.get(id))
            .map_or(leaf, |m| m.source);
        is_nullable_in_mode(self.db, leaf, upgrade) && !is_nullable(self.db, mapping_source)
    }

    /// Source expression fed to the value mapping and the guard condition
    /// of a skip-if-null assignment.
    fn member_source(&self, value: &MemberValue, root: &Expr, upgrade: bool) -> (Expr, Option<Expr>) {
        match &value.source {
            SourceValue::Constant(text) => (Expr::literal(text.clone()), None),
            SourceValue::Path(path) => {
                let mut access = self.path_expr(root, path, path.segments.len());
                let leaf = path.member_type();
                if self.reads_non_nullable(value, path, upgrade) && is_value_type(self.db, non_nullable(self.db, leaf)) {
                    access = access.member("Value");
                }
                let condition = match value.null_handling {
                    MemberNullHandling::SkipIfNull => self.null_condition(value, root, upgrade),
                    _ => None,
                };
                (access, condition)
            }
        }
    }

    /// Converted value of a member and, for skip-if-null handling, the
    /// condition guarding its assignment.
    fn member_value(&mut self, value: &MemberValue, root: &Expr, upgrade: bool) -> (Expr, Option<Expr>) {
        let (access, condition) = self.member_source(value, root, upgrade);
        let mapped = match value.mapping {
            Some(id) => self.build_expression(id, access),
            None => access,
        };
        let target = value
            .mapping
            .and_then(|id| self.mappings.get(id))
            .map_or(TypeId::OBJECT, |m| m.target);
        let guarded = match value.null_handling {
            MemberNullHandling::None | MemberNullHandling::SkipIfNull => mapped,
            MemberNullHandling::Coalesce(fallback) => match self.null_condition(value, root, upgrade) {
                Some(check) => {
                    let fallback = self.fallback_expr(fallback, target, root);
                    Expr::conditional(check, mapped, fallback)
                }
                None => mapped,
            },
            MemberNullHandling::Throw => match self.null_condition(value, root, upgrade) {
                Some(check) => {
                    let name = match &value.source {
                        SourceValue::Path(path) => self.path_expr(root, path, path.segments.len()),
                        SourceValue::Constant(_) => root.clone(),
                    };
                    Expr::conditional(check, mapped, Expr::throw(ARGUMENT_NULL, vec![name.name_of()]))
                }
                None => mapped,
            },
        };
        (guarded, condition)
    }

    // =========================================================================
    // Loops
    // =========================================================================

    /// `foreach` population of a new (`target == None`) or existing
    /// collection. `values` yields the arguments of the insert call.
    fn loop_statements(
        &mut self,
        mapping: &Mapping,
        body: &LoopBody,
        source: Expr,
        target: Option<Expr>,
        values: impl FnOnce(&mut Self, Expr) -> Vec<Expr>,
    ) -> Vec<Stmt> {
        let mut statements = Vec::new();
        let existing = target.is_some();
        let target = match target {
            Some(target) => target,
            None => {
                let creation = match &body.creation {
                    CollectionCreation::New { type_id } => {
                        Expr::new_object(self.type_name(*type_id), Vec::new())
                    }
                    CollectionCreation::Factory { factory } => match self.factories.get(*factory) {
                        Some(factory) if factory.source.is_some() => {
                            Expr::static_call(factory.method.clone(), vec![source.clone()])
                        }
                        Some(factory) => Expr::static_call(factory.method.clone(), Vec::new()),
                        None => Expr::Default,
                    },
                    CollectionCreation::Existing => Expr::Default,
                };
                statements.push(Stmt::Local {
                    name: TARGET_PARAM.to_string(),
                    value: creation,
                });
                Expr::ident(TARGET_PARAM)
            }
        };

        if let Some(count) = body.ensure_capacity {
            let mut capacity = source.clone().member(count);
            if existing {
                capacity = Expr::binary(BinaryOp::Add, target.clone().member("Count"), capacity);
            }
            statements.push(Stmt::Expr(target.clone().call("EnsureCapacity", vec![capacity])));
        }

        let item = self.fresh("item");
        let args = values(self, Expr::ident(&item));
        let insert = match (body.insert, args.as_slice()) {
            (InsertMethod::Indexer, [key, value]) => Stmt::Assign {
                target: Expr::Index {
                    target: Box::new(target.clone()),
                    index: Box::new(key.clone()),
                },
                value: value.clone(),
            },
            (method, _) => Stmt::Expr(target.clone().call(method.method_name(), args)),
        };
        statements.push(Stmt::ForEach {
            item,
            source,
            body: vec![insert],
        });
        if !existing {
            statements.push(Stmt::Return(Some(target)));
        }
        trace!(mapping_id = mapping.id.0, "loop body");
        statements
    }

    fn array_loop_statements(&mut self, mapping: &Mapping, element: MappingId, source: Expr) -> Vec<Stmt> {
        let element_type = array_element(self.db, non_nullable(self.db, mapping.target))
            .map_or_else(|| "object".to_string(), |e| self.type_name(e));
        let target = Expr::ident(TARGET_PARAM);
        let index = self.fresh("i");
        let length = source.clone().member("Length");
        let read = Expr::Index {
            target: Box::new(source),
            index: Box::new(Expr::ident(&index)),
        };
        let value = self.build_expression(element, read);
        vec![
            Stmt::Local {
                name: TARGET_PARAM.to_string(),
                value: Expr::New {
                    type_name: format!("{element_type}[]"),
                    args: vec![length.clone()],
                    initializers: Vec::new(),
                },
            },
            Stmt::For {
                index: index.clone(),
                length,
                body: vec![Stmt::Assign {
                    target: Expr::Index {
                        target: Box::new(target.clone()),
                        index: Box::new(Expr::ident(index)),
                    },
                    value,
                }],
            },
            Stmt::Return(Some(target)),
        ]
    }
}

fn method_scope() -> UniqueNameBuilder {
    let mut names = UniqueNameBuilder::new();
    names.reserve(SOURCE_PARAM);
    names.reserve(TARGET_PARAM);
    names.reserve(TARGET_TYPE_PARAM);
    names
}

fn not_implemented() -> Vec<Stmt> {
    vec![Stmt::Throw {
        type_name: NOT_IMPLEMENTED.to_string(),
        args: Vec::new(),
    }]
}

fn guarded(condition: Option<Expr>, statements: Vec<Stmt>) -> Vec<Stmt> {
    match condition {
        Some(condition) => vec![Stmt::If {
            condition,
            then: statements,
            otherwise: Vec::new(),
        }],
        None => statements,
    }
}

fn switch(subject: Expr, mut arms: Vec<SwitchArm>, otherwise: Expr) -> Expr {
    arms.push(SwitchArm {
        pattern: Pattern::Discard,
        guard: None,
        value: otherwise,
    });
    Expr::Switch {
        subject: Box::new(subject),
        arms,
    }
}

fn out_of_range(source: &Expr, source_type: &str) -> Expr {
    Expr::throw(
        ARGUMENT_OUT_OF_RANGE,
        vec![
            source.clone().name_of(),
            source.clone(),
            Expr::string(&format!("The value of enum {source_type} is not supported")),
        ],
    )
}

fn collect_call(collect: CollectMethod, sequence: Expr) -> Expr {
    if collect.is_extension() {
        sequence.call(collect.method_name(), Vec::new())
    } else {
        Expr::static_call(collect.method_name(), vec![sequence])
    }
}
