//! Mapper configuration.
//!
//! Three layers:
//! - `MapperConfiguration`: mapper-wide defaults, decoded from JSON by hosts
//!   that keep settings in a file (camelCase keys, every field optional)
//! - `MethodConfiguration`: per-method overrides attached to one user
//!   declaration (ignored members, explicit member paths, constants, ...)
//! - `MappingConfiguration`: the resolved, hashable value one resolution
//!   request runs under; part of every `TypeMappingKey`
//!
//! Nested resolutions (members, elements) always run under the mapper
//! defaults, so method overrides never leak into shared helper mappings.

use crate::error::ConfigError;
use crate::members::candidates::pascal_case_chunks;
use bitflags::bitflags;
use mapforge_common::limits::DEFAULT_PROJECTION_MAX_RECURSION_DEPTH;
use mapforge_types::TypeId;
use serde::{Deserialize, Serialize};

// =============================================================================
// Enums
// =============================================================================

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EnumMappingStrategy {
    #[default]
    ByValue,
    ByName,
    /// Cast by value, then verify the result is a defined member.
    ByValueCheckDefined,
}

/// Naming applied to enum member names when converting to and from strings.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EnumNamingStrategy {
    #[default]
    MemberName,
    CamelCase,
    PascalCase,
    SnakeCase,
    UpperSnakeCase,
    KebabCase,
    UpperKebabCase,
    LowerCase,
    UpperCase,
}

impl EnumNamingStrategy {
    pub fn apply(self, name: &str) -> String {
        let words = || pascal_case_chunks(name);
        match self {
            Self::MemberName => name.to_string(),
            Self::CamelCase => {
                let mut chars = name.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
                    None => String::new(),
                }
            }
            Self::PascalCase => {
                let mut chars = name.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                    None => String::new(),
                }
            }
            Self::SnakeCase => words().join("_").to_ascii_lowercase(),
            Self::UpperSnakeCase => words().join("_").to_ascii_uppercase(),
            Self::KebabCase => words().join("-").to_ascii_lowercase(),
            Self::UpperKebabCase => words().join("-").to_ascii_uppercase(),
            Self::LowerCase => name.to_ascii_lowercase(),
            Self::UpperCase => name.to_ascii_uppercase(),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyNameMappingStrategy {
    #[default]
    CaseSensitive,
    CaseInsensitive,
}

/// Which unmapped members are reported.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RequiredMappingStrategy {
    #[default]
    Both,
    Source,
    Target,
    None,
}

impl RequiredMappingStrategy {
    pub const fn reports_source(self) -> bool {
        matches!(self, Self::Both | Self::Source)
    }

    pub const fn reports_target(self) -> bool {
        matches!(self, Self::Both | Self::Target)
    }
}

bitflags! {
    /// Conversions the strategy chain may use.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct MappingConversionType: u32 {
        const CONSTRUCTOR = 1 << 0;
        const IMPLICIT_CAST = 1 << 1;
        const EXPLICIT_CAST = 1 << 2;
        const PARSE_METHOD = 1 << 3;
        const TO_STRING_METHOD = 1 << 4;
        const STRING_TO_ENUM = 1 << 5;
        const ENUM_TO_STRING = 1 << 6;
        const ENUM_TO_ENUM = 1 << 7;
        const DATE_TIME_TO_DATE_ONLY = 1 << 8;
        const DATE_TIME_TO_TIME_ONLY = 1 << 9;
        const QUERYABLE = 1 << 10;
        const ENUMERABLE = 1 << 11;
        const DICTIONARY = 1 << 12;
        const SPAN = 1 << 13;
        const MEMORY = 1 << 14;
        const TUPLE = 1 << 15;
        const ENUM_UNDERLYING_TYPE = 1 << 16;
    }
}

impl Default for MappingConversionType {
    fn default() -> Self {
        Self::all()
    }
}

// =============================================================================
// MapperConfiguration
// =============================================================================

/// Mapper-wide defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MapperConfiguration {
    pub enum_mapping_strategy: EnumMappingStrategy,
    pub enum_mapping_ignore_case: bool,
    pub enum_naming_strategy: EnumNamingStrategy,
    pub use_deep_cloning: bool,
    pub enabled_conversions: MappingConversionType,
    /// Throw when a nullable source is mapped to a non-nullable target at
    /// method level. Otherwise a fallback value is used.
    pub throw_on_mapping_null_mismatch: bool,
    /// Throw when a nullable member is mapped to a non-nullable member.
    pub throw_on_member_mapping_null_mismatch: bool,
    /// Assign `null` to nullable target members instead of skipping them.
    pub allow_null_member_assignment: bool,
    pub prefer_parameterless_constructors: bool,
    pub member_name_mapping_strategy: PropertyNameMappingStrategy,
    pub required_mapping_strategy: RequiredMappingStrategy,
    /// Treat every user implemented method as a user mapping.
    pub auto_user_mappings: bool,
    pub string_format: Option<String>,
    pub format_provider: Option<String>,
    pub projection_max_recursion_depth: u32,
}

impl Default for MapperConfiguration {
    fn default() -> Self {
        Self {
            enum_mapping_strategy: EnumMappingStrategy::default(),
            enum_mapping_ignore_case: false,
            enum_naming_strategy: EnumNamingStrategy::default(),
            use_deep_cloning: false,
            enabled_conversions: MappingConversionType::all(),
            throw_on_mapping_null_mismatch: true,
            throw_on_member_mapping_null_mismatch: false,
            allow_null_member_assignment: true,
            prefer_parameterless_constructors: true,
            member_name_mapping_strategy: PropertyNameMappingStrategy::default(),
            required_mapping_strategy: RequiredMappingStrategy::default(),
            auto_user_mappings: true,
            string_format: None,
            format_provider: None,
            projection_max_recursion_depth: DEFAULT_PROJECTION_MAX_RECURSION_DEPTH,
        }
    }
}

impl MapperConfiguration {
    /// Decode from JSON. Missing keys take their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.projection_max_recursion_depth == 0 {
            return Err(ConfigError::InvalidValue {
                field: "projectionMaxRecursionDepth",
                message: "must be at least 1".to_string(),
            });
        }
        if self.format_provider.as_deref().is_some_and(str::is_empty) {
            return Err(ConfigError::InvalidValue {
                field: "formatProvider",
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

// =============================================================================
// MethodConfiguration
// =============================================================================

/// `source path → target path`, optionally through a named user mapping.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MemberMappingConfig {
    pub source: Vec<String>,
    pub target: Vec<String>,
    pub use_mapping: Option<String>,
    pub string_format: Option<String>,
}

impl MemberMappingConfig {
    /// Paths are dot separated: `MemberMappingConfig::new("Customer.Id", "CustomerId")`.
    pub fn new(source: &str, target: &str) -> Self {
        Self {
            source: split_path(source),
            target: split_path(target),
            use_mapping: None,
            string_format: None,
        }
    }

    #[must_use]
    pub fn using(mut self, name: &str) -> Self {
        self.use_mapping = Some(name.to_string());
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: &str) -> Self {
        self.string_format = Some(format.to_string());
        self
    }
}

/// Constant assigned to a target member. `value` is the literal as it
/// appears in generated code.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MemberValueConfig {
    pub target: Vec<String>,
    pub value: String,
    pub value_type: TypeId,
}

fn split_path(path: &str) -> Vec<String> {
    path.split('.')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Overrides attached to a single user declaration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MethodConfiguration {
    pub enum_mapping_strategy: Option<EnumMappingStrategy>,
    pub enum_mapping_ignore_case: Option<bool>,
    pub enum_naming_strategy: Option<EnumNamingStrategy>,
    pub enum_fallback: Option<String>,
    pub enum_values: Vec<(String, String)>,
    pub ignored_enum_sources: Vec<String>,
    pub ignored_enum_targets: Vec<String>,
    pub use_deep_cloning: Option<bool>,
    pub required_mapping_strategy: Option<RequiredMappingStrategy>,
    pub string_format: Option<String>,
    pub format_provider: Option<String>,
    pub ignored_source_members: Vec<String>,
    pub ignored_target_members: Vec<String>,
    pub member_mappings: Vec<MemberMappingConfig>,
    pub constants: Vec<MemberValueConfig>,
    pub derived_types: Vec<(TypeId, TypeId)>,
}

impl MethodConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn ignore_target(mut self, name: &str) -> Self {
        self.ignored_target_members.push(name.to_string());
        self
    }

    #[must_use]
    pub fn ignore_source(mut self, name: &str) -> Self {
        self.ignored_source_members.push(name.to_string());
        self
    }

    #[must_use]
    pub fn map_member(mut self, member: MemberMappingConfig) -> Self {
        self.member_mappings.push(member);
        self
    }

    #[must_use]
    pub fn constant(mut self, target: &str, value: &str, value_type: TypeId) -> Self {
        self.constants.push(MemberValueConfig {
            target: split_path(target),
            value: value.to_string(),
            value_type,
        });
        self
    }

    #[must_use]
    pub fn derived(mut self, source: TypeId, target: TypeId) -> Self {
        self.derived_types.push((source, target));
        self
    }

    #[must_use]
    pub fn enum_strategy(mut self, strategy: EnumMappingStrategy) -> Self {
        self.enum_mapping_strategy = Some(strategy);
        self
    }

    #[must_use]
    pub fn enum_value(mut self, source: &str, target: &str) -> Self {
        self.enum_values.push((source.to_string(), target.to_string()));
        self
    }

    #[must_use]
    pub fn enum_fallback(mut self, target: &str) -> Self {
        self.enum_fallback = Some(target.to_string());
        self
    }
}

// =============================================================================
// MappingConfiguration
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EnumConfiguration {
    pub strategy: EnumMappingStrategy,
    pub ignore_case: bool,
    pub naming: EnumNamingStrategy,
    /// Target member used when a source value has no counterpart.
    pub fallback: Option<String>,
    pub explicit_values: Vec<(String, String)>,
    pub ignored_source: Vec<String>,
    pub ignored_target: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct MemberConfiguration {
    pub ignored_source: Vec<String>,
    pub ignored_target: Vec<String>,
    pub explicit: Vec<MemberMappingConfig>,
    pub constants: Vec<MemberValueConfig>,
}

impl MemberConfiguration {
    pub fn is_empty(&self) -> bool {
        self.ignored_source.is_empty()
            && self.ignored_target.is_empty()
            && self.explicit.is_empty()
            && self.constants.is_empty()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NullHandling {
    pub throw_on_mapping_null_mismatch: bool,
    pub throw_on_member_null_mismatch: bool,
    pub allow_null_member_assignment: bool,
}

/// Resolved configuration of one resolution request.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MappingConfiguration {
    pub enums: EnumConfiguration,
    pub use_deep_cloning: bool,
    pub enabled_conversions: MappingConversionType,
    pub null_handling: NullHandling,
    pub prefer_parameterless_constructors: bool,
    pub member_name_matching: PropertyNameMappingStrategy,
    pub required_mapping_strategy: RequiredMappingStrategy,
    pub auto_user_mappings: bool,
    pub string_format: Option<String>,
    pub format_provider: Option<String>,
    pub projection_max_depth: u32,
    pub members: MemberConfiguration,
    pub derived_types: Vec<(TypeId, TypeId)>,
}

impl Default for MappingConfiguration {
    fn default() -> Self {
        Self::from_mapper(&MapperConfiguration::default())
    }
}

impl MappingConfiguration {
    pub fn from_mapper(mapper: &MapperConfiguration) -> Self {
        Self {
            enums: EnumConfiguration {
                strategy: mapper.enum_mapping_strategy,
                ignore_case: mapper.enum_mapping_ignore_case,
                naming: mapper.enum_naming_strategy,
                fallback: None,
                explicit_values: Vec::new(),
                ignored_source: Vec::new(),
                ignored_target: Vec::new(),
            },
            use_deep_cloning: mapper.use_deep_cloning,
            enabled_conversions: mapper.enabled_conversions,
            null_handling: NullHandling {
                throw_on_mapping_null_mismatch: mapper.throw_on_mapping_null_mismatch,
                throw_on_member_null_mismatch: mapper.throw_on_member_mapping_null_mismatch,
                allow_null_member_assignment: mapper.allow_null_member_assignment,
            },
            prefer_parameterless_constructors: mapper.prefer_parameterless_constructors,
            member_name_matching: mapper.member_name_mapping_strategy,
            required_mapping_strategy: mapper.required_mapping_strategy,
            auto_user_mappings: mapper.auto_user_mappings,
            string_format: mapper.string_format.clone(),
            format_provider: mapper.format_provider.clone(),
            projection_max_depth: mapper.projection_max_recursion_depth.max(1),
            members: MemberConfiguration::default(),
            derived_types: Vec::new(),
        }
    }

    /// Layer method overrides on top of these settings.
    #[must_use]
    pub fn with_overrides(&self, method: &MethodConfiguration) -> Self {
        let mut config = self.clone();
        if let Some(strategy) = method.enum_mapping_strategy {
            config.enums.strategy = strategy;
        }
        if let Some(ignore_case) = method.enum_mapping_ignore_case {
            config.enums.ignore_case = ignore_case;
        }
        if let Some(naming) = method.enum_naming_strategy {
            config.enums.naming = naming;
        }
        if method.enum_fallback.is_some() {
            config.enums.fallback = method.enum_fallback.clone();
        }
        config.enums.explicit_values.extend(method.enum_values.iter().cloned());
        config
            .enums
            .ignored_source
            .extend(method.ignored_enum_sources.iter().cloned());
        config
            .enums
            .ignored_target
            .extend(method.ignored_enum_targets.iter().cloned());
        if let Some(deep) = method.use_deep_cloning {
            config.use_deep_cloning = deep;
        }
        if let Some(strategy) = method.required_mapping_strategy {
            config.required_mapping_strategy = strategy;
        }
        if method.string_format.is_some() {
            config.string_format = method.string_format.clone();
        }
        if method.format_provider.is_some() {
            config.format_provider = method.format_provider.clone();
        }
        config
            .members
            .ignored_source
            .extend(method.ignored_source_members.iter().cloned());
        config
            .members
            .ignored_target
            .extend(method.ignored_target_members.iter().cloned());
        config
            .members
            .explicit
            .extend(method.member_mappings.iter().cloned());
        config
            .members
            .constants
            .extend(method.constants.iter().cloned());
        config
            .derived_types
            .extend(method.derived_types.iter().copied());
        config
    }

    #[must_use]
    pub fn with_string_format(&self, format: Option<String>) -> Self {
        let mut config = self.clone();
        config.string_format = format;
        config
    }

    /// The same settings without derived type pairs, used for the base
    /// arm of a derived type switch.
    #[must_use]
    pub fn without_derived_types(&self) -> Self {
        let mut config = self.clone();
        config.derived_types.clear();
        config
    }

    pub fn is_conversion_enabled(&self, kind: MappingConversionType) -> bool {
        self.enabled_conversions.contains(kind)
    }

    pub fn ignore_member_case(&self) -> bool {
        self.member_name_matching == PropertyNameMappingStrategy::CaseInsensitive
    }
}
