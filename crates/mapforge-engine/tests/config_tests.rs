use super::*;
use mapforge_common::limits::DEFAULT_PROJECTION_MAX_RECURSION_DEPTH;

#[test]
fn test_defaults() {
    let config = MapperConfiguration::default();
    assert_eq!(config.enum_mapping_strategy, EnumMappingStrategy::ByValue);
    assert!(config.throw_on_mapping_null_mismatch);
    assert!(!config.throw_on_member_mapping_null_mismatch);
    assert!(config.allow_null_member_assignment);
    assert!(config.auto_user_mappings);
    assert_eq!(config.enabled_conversions, MappingConversionType::all());
    assert_eq!(config.projection_max_recursion_depth, DEFAULT_PROJECTION_MAX_RECURSION_DEPTH);
}

#[test]
fn test_from_json_uses_camel_case_and_defaults() {
    let config = MapperConfiguration::from_json(
        r#"{
            "enumMappingStrategy": "byName",
            "enumMappingIgnoreCase": true,
            "enumNamingStrategy": "snakeCase",
            "useDeepCloning": true,
            "throwOnMappingNullMismatch": false,
            "memberNameMappingStrategy": "caseInsensitive",
            "requiredMappingStrategy": "target",
            "stringFormat": "N2",
            "projectionMaxRecursionDepth": 3
        }"#,
    )
    .expect("valid configuration");

    assert_eq!(config.enum_mapping_strategy, EnumMappingStrategy::ByName);
    assert!(config.enum_mapping_ignore_case);
    assert_eq!(config.enum_naming_strategy, EnumNamingStrategy::SnakeCase);
    assert!(config.use_deep_cloning);
    assert!(!config.throw_on_mapping_null_mismatch);
    assert_eq!(config.member_name_mapping_strategy, PropertyNameMappingStrategy::CaseInsensitive);
    assert_eq!(config.required_mapping_strategy, RequiredMappingStrategy::Target);
    assert_eq!(config.string_format.as_deref(), Some("N2"));
    assert_eq!(config.projection_max_recursion_depth, 3);
    assert!(config.auto_user_mappings);
    assert_eq!(config.format_provider, None);
}

#[test]
fn test_from_json_rejects_zero_depth() {
    let err = MapperConfiguration::from_json(r#"{ "projectionMaxRecursionDepth": 0 }"#)
        .expect_err("zero depth is invalid");
    assert!(matches!(
        err,
        ConfigError::InvalidValue {
            field: "projectionMaxRecursionDepth",
            ..
        }
    ));
}

#[test]
fn test_from_json_rejects_empty_format_provider() {
    let err = MapperConfiguration::from_json(r#"{ "formatProvider": "" }"#)
        .expect_err("empty provider is invalid");
    assert!(err.to_string().contains("formatProvider"));
}

#[test]
fn test_from_json_rejects_unknown_enum_value() {
    let err = MapperConfiguration::from_json(r#"{ "enumMappingStrategy": "byMagic" }"#)
        .expect_err("unknown strategy");
    assert!(matches!(err, ConfigError::Json(_)));
}

#[test]
fn test_method_overrides_layer_on_mapper_defaults() {
    let mapper = MapperConfiguration {
        use_deep_cloning: true,
        string_format: Some("N0".to_string()),
        ..MapperConfiguration::default()
    };
    let defaults = MappingConfiguration::from_mapper(&mapper);
    let overrides = MethodConfiguration {
        enum_mapping_strategy: Some(EnumMappingStrategy::ByName),
        string_format: Some("C".to_string()),
        ..MethodConfiguration::default()
    }
    .ignore_target("Secret")
    .enum_value("Red", "Rot");

    let config = defaults.with_overrides(&overrides);
    assert_eq!(config.enums.strategy, EnumMappingStrategy::ByName);
    assert_eq!(config.string_format.as_deref(), Some("C"));
    assert!(config.use_deep_cloning);
    assert_eq!(config.members.ignored_target, ["Secret"]);
    assert_eq!(config.enums.explicit_values, [("Red".to_string(), "Rot".to_string())]);

    assert_eq!(defaults.with_overrides(&MethodConfiguration::new()), defaults);
}

#[test]
fn test_enum_naming_strategies() {
    assert_eq!(EnumNamingStrategy::MemberName.apply("DarkBlue"), "DarkBlue");
    assert_eq!(EnumNamingStrategy::CamelCase.apply("DarkBlue"), "darkBlue");
    assert_eq!(EnumNamingStrategy::SnakeCase.apply("DarkBlue"), "dark_blue");
    assert_eq!(EnumNamingStrategy::UpperSnakeCase.apply("DarkBlue"), "DARK_BLUE");
    assert_eq!(EnumNamingStrategy::KebabCase.apply("DarkBlue"), "dark-blue");
    assert_eq!(EnumNamingStrategy::UpperCase.apply("DarkBlue"), "DARKBLUE");
}

#[test]
fn test_conversion_toggles() {
    let mapper = MapperConfiguration {
        enabled_conversions: MappingConversionType::all() - MappingConversionType::PARSE_METHOD,
        ..MapperConfiguration::default()
    };
    let config = MappingConfiguration::from_mapper(&mapper);
    assert!(!config.is_conversion_enabled(MappingConversionType::PARSE_METHOD));
    assert!(config.is_conversion_enabled(MappingConversionType::EXPLICIT_CAST));
}
