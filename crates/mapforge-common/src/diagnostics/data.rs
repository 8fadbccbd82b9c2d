//! Diagnostic message table.
//!
//! Codes are stable: hosts suppress diagnostics by code, so never renumber.

use super::{DiagnosticCategory, DiagnosticMessage};

pub mod diagnostic_codes {
    pub const COULD_NOT_CREATE_MAPPING: u32 = 1;
    pub const NULLABLE_SOURCE_TYPE_TO_NON_NULLABLE_TARGET_TYPE: u32 = 2;
    pub const NULLABLE_SOURCE_VALUE_TO_NON_NULLABLE_TARGET_VALUE: u32 = 3;
    pub const SOURCE_MEMBER_NOT_FOUND: u32 = 4;
    pub const SOURCE_MEMBER_NOT_MAPPED: u32 = 5;
    pub const REQUIRED_MEMBER_NOT_MAPPED: u32 = 6;
    pub const NO_CONSTRUCTOR_FOUND: u32 = 7;
    pub const CANNOT_MAP_TO_READ_ONLY_MEMBER: u32 = 8;
    pub const CANNOT_MAP_FROM_WRITE_ONLY_MEMBER: u32 = 9;
    pub const ENUM_SOURCE_VALUE_NOT_MAPPED: u32 = 10;
    pub const ENUM_TARGET_VALUE_NOT_MAPPED: u32 = 11;
    pub const ENUM_BY_NAME_NOT_SUPPORTED_IN_PROJECTION: u32 = 12;
    pub const DUPLICATE_DEFAULT_MAPPING: u32 = 13;
    pub const AMBIGUOUS_USER_MAPPINGS: u32 = 14;
    pub const REFERENCED_MAPPING_NOT_FOUND: u32 = 15;
    pub const REFERENCED_MAPPING_AMBIGUOUS: u32 = 16;
    pub const REFERENCE_LOOP_IN_CTOR_MAPPING: u32 = 17;
    pub const REFERENCE_LOOP_IN_INIT_ONLY_MAPPING: u32 = 18;
    pub const DERIVED_SOURCE_TYPE_NOT_ASSIGNABLE: u32 = 19;
    pub const DERIVED_TARGET_TYPE_NOT_ASSIGNABLE: u32 = 20;
    pub const DERIVED_SOURCE_TYPE_DUPLICATED: u32 = 21;
    pub const PROJECTION_MAX_RECURSION_DEPTH_REACHED: u32 = 22;
    pub const PROJECTION_USER_MAPPING_CANNOT_INLINE: u32 = 23;
    pub const CONFIGURED_SOURCE_MEMBER_NOT_FOUND: u32 = 24;
    pub const CONFIGURED_TARGET_MEMBER_NOT_FOUND: u32 = 25;
    pub const IGNORED_MEMBER_NOT_FOUND: u32 = 26;
    pub const CONSTANT_VALUE_TYPE_MISMATCH: u32 = 27;
    pub const ENUM_FALLBACK_VALUE_INVALID: u32 = 28;
    pub const EXISTING_TARGET_MAPPING_NOT_SUPPORTED: u32 = 29;
    pub const RUNTIME_TARGET_TYPE_WITHOUT_MAPPINGS: u32 = 30;
}

use diagnostic_codes::*;

pub static DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = &[
    DiagnosticMessage {
        code: COULD_NOT_CREATE_MAPPING,
        category: DiagnosticCategory::Error,
        message: "The mapping from {0} to {1} could not be created",
    },
    DiagnosticMessage {
        code: NULLABLE_SOURCE_TYPE_TO_NON_NULLABLE_TARGET_TYPE,
        category: DiagnosticCategory::Message,
        message: "Mapping the nullable source of type {0} to target of type {1} which is not nullable",
    },
    DiagnosticMessage {
        code: NULLABLE_SOURCE_VALUE_TO_NON_NULLABLE_TARGET_VALUE,
        category: DiagnosticCategory::Message,
        message: "Mapping the nullable source member {0} to target member {1} which is not nullable",
    },
    DiagnosticMessage {
        code: SOURCE_MEMBER_NOT_FOUND,
        category: DiagnosticCategory::Warning,
        message: "The member {0} on the mapping target type {1} was not found on the mapping source type {2}",
    },
    DiagnosticMessage {
        code: SOURCE_MEMBER_NOT_MAPPED,
        category: DiagnosticCategory::Message,
        message: "The member {0} on the mapping source type {1} is not mapped to any member on the mapping target type {2}",
    },
    DiagnosticMessage {
        code: REQUIRED_MEMBER_NOT_MAPPED,
        category: DiagnosticCategory::Error,
        message: "Required member {0} on mapping target type {1} was not found on the mapping source type {2}",
    },
    DiagnosticMessage {
        code: NO_CONSTRUCTOR_FOUND,
        category: DiagnosticCategory::Error,
        message: "{0} has no accessible constructor with mappable arguments",
    },
    DiagnosticMessage {
        code: CANNOT_MAP_TO_READ_ONLY_MEMBER,
        category: DiagnosticCategory::Warning,
        message: "Cannot map to read only member {0} on {1}",
    },
    DiagnosticMessage {
        code: CANNOT_MAP_FROM_WRITE_ONLY_MEMBER,
        category: DiagnosticCategory::Warning,
        message: "Cannot map from write only member {0} on {1}",
    },
    DiagnosticMessage {
        code: ENUM_SOURCE_VALUE_NOT_MAPPED,
        category: DiagnosticCategory::Warning,
        message: "Enum member {0} on {1} not found on target enum {2}",
    },
    DiagnosticMessage {
        code: ENUM_TARGET_VALUE_NOT_MAPPED,
        category: DiagnosticCategory::Message,
        message: "Enum member {0} on {1} not found on source enum {2}",
    },
    DiagnosticMessage {
        code: ENUM_BY_NAME_NOT_SUPPORTED_IN_PROJECTION,
        category: DiagnosticCategory::Warning,
        message: "The enum mapping strategy ByName cannot be used in projection mappings, mapping {0} to {1} by value instead",
    },
    DiagnosticMessage {
        code: DUPLICATE_DEFAULT_MAPPING,
        category: DiagnosticCategory::Error,
        message: "Only one user mapping from {0} to {1} can be marked as default",
    },
    DiagnosticMessage {
        code: AMBIGUOUS_USER_MAPPINGS,
        category: DiagnosticCategory::Warning,
        message: "Multiple user mappings from {0} to {1} without a default, {2} is used",
    },
    DiagnosticMessage {
        code: REFERENCED_MAPPING_NOT_FOUND,
        category: DiagnosticCategory::Error,
        message: "The referenced mapping named {0} was not found",
    },
    DiagnosticMessage {
        code: REFERENCED_MAPPING_AMBIGUOUS,
        category: DiagnosticCategory::Error,
        message: "The referenced mapping name {0} is ambiguous",
    },
    DiagnosticMessage {
        code: REFERENCE_LOOP_IN_CTOR_MAPPING,
        category: DiagnosticCategory::Error,
        message: "{0} maps to itself through the constructor parameter {1}, the reference loop cannot be resolved",
    },
    DiagnosticMessage {
        code: REFERENCE_LOOP_IN_INIT_ONLY_MAPPING,
        category: DiagnosticCategory::Error,
        message: "{0} maps to itself through the init only member {1}, the reference loop cannot be resolved",
    },
    DiagnosticMessage {
        code: DERIVED_SOURCE_TYPE_NOT_ASSIGNABLE,
        category: DiagnosticCategory::Error,
        message: "Derived source type {0} is not assignable to the source type {1}",
    },
    DiagnosticMessage {
        code: DERIVED_TARGET_TYPE_NOT_ASSIGNABLE,
        category: DiagnosticCategory::Error,
        message: "Derived target type {0} is not assignable to the target type {1}",
    },
    DiagnosticMessage {
        code: DERIVED_SOURCE_TYPE_DUPLICATED,
        category: DiagnosticCategory::Warning,
        message: "Derived source type {0} is specified multiple times, only the first is used",
    },
    DiagnosticMessage {
        code: PROJECTION_MAX_RECURSION_DEPTH_REACHED,
        category: DiagnosticCategory::Warning,
        message: "The maximum projection recursion depth of {0} was reached for {1}, member {2} is not mapped",
    },
    DiagnosticMessage {
        code: PROJECTION_USER_MAPPING_CANNOT_INLINE,
        category: DiagnosticCategory::Warning,
        message: "The user implemented mapping {0} cannot be inlined into the projection and is invoked instead",
    },
    DiagnosticMessage {
        code: CONFIGURED_SOURCE_MEMBER_NOT_FOUND,
        category: DiagnosticCategory::Error,
        message: "The configured source member {0} was not found on {1}",
    },
    DiagnosticMessage {
        code: CONFIGURED_TARGET_MEMBER_NOT_FOUND,
        category: DiagnosticCategory::Error,
        message: "The configured target member {0} was not found on {1}",
    },
    DiagnosticMessage {
        code: IGNORED_MEMBER_NOT_FOUND,
        category: DiagnosticCategory::Warning,
        message: "The ignored member {0} was not found on {1}",
    },
    DiagnosticMessage {
        code: CONSTANT_VALUE_TYPE_MISMATCH,
        category: DiagnosticCategory::Error,
        message: "The constant value {0} cannot be assigned to member {1} of type {2}",
    },
    DiagnosticMessage {
        code: ENUM_FALLBACK_VALUE_INVALID,
        category: DiagnosticCategory::Error,
        message: "The fallback value {0} is not a member of {1}",
    },
    DiagnosticMessage {
        code: EXISTING_TARGET_MAPPING_NOT_SUPPORTED,
        category: DiagnosticCategory::Error,
        message: "The existing target mapping from {0} to {1} is not supported",
    },
    DiagnosticMessage {
        code: RUNTIME_TARGET_TYPE_WITHOUT_MAPPINGS,
        category: DiagnosticCategory::Warning,
        message: "The runtime target type mapping {0} has no applicable mappings",
    },
];
