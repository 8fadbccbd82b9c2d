use super::value::{Placement, TargetSlot, ValueOverrides, member_value, report_unresolved};
use crate::context::MappingContext;
use crate::mapping::{MappingId, TupleBody, TupleElementValue};
use crate::members::matcher::MemberMatcher;
use crate::members::path::{MemberPath, PathSegment};
use mapforge_common::diagnostic_codes::REQUIRED_MEMBER_NOT_MAPPED;
use mapforge_types::queries::{non_nullable, tuple_elements};
use tracing::trace;

/// Fill each target element from the source element with the same name,
/// the same `ItemN` position, or for object sources the matching member.
pub(super) fn build(ctx: &mut MappingContext<'_, '_>, id: MappingId) -> TupleBody {
    let db = ctx.db();
    let source = non_nullable(db, ctx.source);
    let target = non_nullable(db, ctx.target);
    let Some(target_elements) = tuple_elements(db, target) else {
        return TupleBody { elements: Vec::new() };
    };
    let source_elements = tuple_elements(db, source);
    let matcher = MemberMatcher::new(db, source, ctx.config.ignore_member_case());

    let mut elements = Vec::with_capacity(target_elements.len());
    for (index, element) in target_elements.iter().enumerate() {
        let positional = format!("Item{}", index + 1);
        let name = element
            .name
            .map_or_else(|| positional.clone(), |n| db.resolve_atom(n).to_string());

        let path = match &source_elements {
            Some(source_elements) => {
                let by_name = element.name.and_then(|wanted| {
                    source_elements
                        .iter()
                        .position(|s| s.name == Some(wanted))
                });
                let index = by_name.or((index < source_elements.len()).then_some(index));
                index.map(|i| {
                    let source_element = &source_elements[i];
                    MemberPath {
                        root: source,
                        segments: vec![PathSegment {
                            name: source_element
                                .name
                                .unwrap_or_else(|| db.intern_string(&format!("Item{}", i + 1))),
                            type_id: source_element.type_id,
                            readable: true,
                        }],
                    }
                })
            }
            None => matcher.find_source_path(&name),
        };

        let Some(path) = path.filter(MemberPath::is_readable) else {
            let args = vec![name, ctx.type_name(target), ctx.type_name(source)];
            ctx.report(REQUIRED_MEMBER_NOT_MAPPED, args);
            continue;
        };
        let source_type = path.member_type();
        let slot = TargetSlot {
            name: &name,
            type_id: element.type_id,
            placement: Placement::Initializer,
        };
        match member_value(ctx, path, &slot, &ValueOverrides::default()) {
            Ok(value) => elements.push(TupleElementValue {
                name: element.name,
                value,
            }),
            Err(reason) => report_unresolved(ctx, reason, source_type, element.type_id, &name),
        }
    }
    trace!(mapping_id = id.0, elements = elements.len(), "tuple body");
    TupleBody { elements }
}
