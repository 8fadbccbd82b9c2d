//! Sequence to sequence mappings.
//!
//! Preference order, first match wins:
//! 1. a cast, when the source already implements the target interface and
//!    the elements need no mapping
//! 2. `Array.Clone()` for deep cloned arrays of immutable elements
//! 3. in expression mode, `Select` plus a collect call
//! 4. a `for` loop between arrays
//! 5. `Select` plus a collect call (`ToArray`, `ToList`, ...)
//! 6. a collection constructor taking the mapped sequence
//! 7. `foreach` + `Add` into a new instance

use crate::config::MappingConversionType;
use crate::context::MappingContext;
use crate::mapping::{CollectMethod, MappingFlags, MappingId, MappingKind};
use mapforge_types::collections::{can_create_empty, implements_collection_interface};
use mapforge_types::queries::is_immutable;
use mapforge_types::{CollectionInfo, CollectionType, collection_info};

pub(super) fn build(ctx: &mut MappingContext<'_, '_>) -> Option<MappingId> {
    if !ctx.is_conversion_enabled(MappingConversionType::ENUMERABLE) {
        return None;
    }
    let db = ctx.db();
    let source = collection_info(db, ctx.source).filter(CollectionInfo::is_enumerable)?;
    let target = collection_info(db, ctx.target)?;
    if target.is_dictionary() || target.is_span() || target.is_memory() || target.is_queryable() {
        return None;
    }
    if source.is_span() || source.is_memory() {
        return None;
    }

    let element = ctx.find_or_build_mapping(source.element, target.element)?;
    let element_synthetic = ctx.is_synthetic(element);
    let deep = ctx.config.use_deep_cloning;

    if element_synthetic && !deep && implements_collection_interface(db, ctx.source, ctx.target) {
        return Some(ctx.push_mapping(
            MappingKind::Cast { explicit: false },
            MappingFlags::CALLABLE_BY_OTHERS,
        ));
    }

    if deep
        && source.is_array()
        && target.is_array()
        && source.element == target.element
        && is_immutable(db, source.element)
    {
        return Some(ctx.push_mapping(MappingKind::ArrayClone, MappingFlags::CALLABLE_BY_OTHERS));
    }

    if ctx.is_inline() {
        let collect = collect_method(target.collection_type);
        if collect.is_none() && target.collection_type != CollectionType::Enumerable {
            return None;
        }
        return Some(ctx.push_mapping(
            MappingKind::LinqSelect { element, collect },
            MappingFlags::CALLABLE_BY_OTHERS,
        ));
    }

    if source.is_array() && target.is_array() && !element_synthetic {
        return Some(ctx.push_mapping(
            MappingKind::ArrayForLoop { element },
            MappingFlags::CALLABLE_BY_OTHERS,
        ));
    }

    if let Some(collect) = collect_method(target.collection_type) {
        return Some(ctx.push_mapping(
            MappingKind::LinqSelect {
                element,
                collect: Some(collect),
            },
            MappingFlags::CALLABLE_BY_OTHERS,
        ));
    }

    match target.collection_type {
        // Lazy `Select`, nothing to materialize.
        CollectionType::Enumerable => Some(ctx.push_mapping(
            MappingKind::LinqSelect {
                element,
                collect: None,
            },
            MappingFlags::CALLABLE_BY_OTHERS,
        )),
        CollectionType::Stack | CollectionType::Queue | CollectionType::SortedSet => Some(ctx.push_mapping(
            MappingKind::EnumerableConstructor { element },
            MappingFlags::CALLABLE_BY_OTHERS,
        )),
        _ => {
            let creatable = ctx.factories().find(db, ctx.source, ctx.target).is_some()
                || can_create_empty(db, &target);
            (target.has_add_method && creatable).then(|| {
                ctx.push_mapping(
                    MappingKind::ForEachAdd {
                        element,
                        body: None,
                    },
                    MappingFlags::CALLABLE_BY_OTHERS,
                )
            })
        }
    }
}

/// Collect call that materializes a `Select` into `target`, if one exists.
pub(crate) const fn collect_method(target: CollectionType) -> Option<CollectMethod> {
    Some(match target {
        CollectionType::Array => CollectMethod::ToArray,
        CollectionType::List
        | CollectionType::IList
        | CollectionType::ReadOnlyList
        | CollectionType::Collection
        | CollectionType::ReadOnlyCollection => CollectMethod::ToList,
        CollectionType::HashSet | CollectionType::ISet | CollectionType::ReadOnlySet => {
            CollectMethod::ToHashSet
        }
        CollectionType::ImmutableArray => CollectMethod::ToImmutableArray,
        CollectionType::ImmutableList => CollectMethod::ToImmutableList,
        CollectionType::ImmutableHashSet => CollectMethod::ToImmutableHashSet,
        CollectionType::ImmutableSortedSet => CollectMethod::ToImmutableSortedSet,
        CollectionType::ImmutableQueue => CollectMethod::ImmutableQueueCreateRange,
        CollectionType::ImmutableStack => CollectMethod::ImmutableStackCreateRange,
        _ => return None,
    })
}
