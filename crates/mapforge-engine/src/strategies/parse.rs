use crate::config::MappingConversionType;
use crate::context::MappingContext;
use crate::mapping::{MappingFlags, MappingId, MappingKind};
use mapforge_types::queries::{constructors_of, has_parse_method, is_abstract, is_enum, is_string};

/// `string` to a type with a static `Parse(string)`.
pub(super) fn build_parse(ctx: &mut MappingContext<'_, '_>) -> Option<MappingId> {
    if !ctx.is_conversion_enabled(MappingConversionType::PARSE_METHOD) {
        return None;
    }
    let db = ctx.db();
    if !is_string(db, ctx.source) || is_enum(db, ctx.target) || !has_parse_method(db, ctx.target) {
        return None;
    }
    Some(ctx.push_mapping(MappingKind::Parse, MappingFlags::CALLABLE_BY_OTHERS))
}

/// `new T(source)` through a constructor taking exactly the source type.
pub(super) fn build_constructor(ctx: &mut MappingContext<'_, '_>) -> Option<MappingId> {
    if !ctx.is_conversion_enabled(MappingConversionType::CONSTRUCTOR) {
        return None;
    }
    let db = ctx.db();
    if is_abstract(db, ctx.target) {
        return None;
    }
    let source = ctx.source;
    let applies = constructors_of(db, ctx.target)
        .iter()
        .any(|ctor| matches!(ctor.params.as_slice(), [param] if param.type_id == source));
    if !applies {
        return None;
    }
    Some(ctx.push_mapping(MappingKind::Constructor, MappingFlags::CALLABLE_BY_OTHERS))
}
