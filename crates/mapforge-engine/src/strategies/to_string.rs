use crate::config::MappingConversionType;
use crate::context::MappingContext;
use crate::mapping::{MappingFlags, MappingId, MappingKind};
use mapforge_types::TypeId;

/// `source.ToString(format, provider)`.
pub(super) fn build(ctx: &mut MappingContext<'_, '_>) -> Option<MappingId> {
    if ctx.target != TypeId::STRING || ctx.source == TypeId::STRING {
        return None;
    }
    if !ctx.is_conversion_enabled(MappingConversionType::TO_STRING_METHOD) {
        return None;
    }
    let kind = MappingKind::ToStringCall {
        format: ctx.config.string_format.clone(),
        provider: ctx.config.format_provider.clone(),
    };
    Some(ctx.push_mapping(kind, MappingFlags::CALLABLE_BY_OTHERS))
}
