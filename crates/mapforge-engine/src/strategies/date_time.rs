use crate::config::MappingConversionType;
use crate::context::MappingContext;
use crate::mapping::{DateTimeTarget, MappingFlags, MappingId, MappingKind};
use mapforge_types::TypeId;

/// `DateOnly.FromDateTime(source)` and `TimeOnly.FromDateTime(source)`.
pub(super) fn build(ctx: &mut MappingContext<'_, '_>) -> Option<MappingId> {
    if ctx.source != TypeId::DATE_TIME {
        return None;
    }
    let target = match ctx.target {
        TypeId::DATE_ONLY
            if ctx.is_conversion_enabled(MappingConversionType::DATE_TIME_TO_DATE_ONLY) =>
        {
            DateTimeTarget::DateOnly
        }
        TypeId::TIME_ONLY
            if ctx.is_conversion_enabled(MappingConversionType::DATE_TIME_TO_TIME_ONLY) =>
        {
            DateTimeTarget::TimeOnly
        }
        _ => return None,
    };
    Some(ctx.push_mapping(
        MappingKind::DateTimeConversion { target },
        MappingFlags::CALLABLE_BY_OTHERS,
    ))
}
