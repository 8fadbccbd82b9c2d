use super::*;

#[test]
fn test_format_message_replaces_placeholders() {
    let text = format_message("The mapping from {0} to {1} could not be created", &["A", "B"]);
    assert_eq!(text, "The mapping from A to B could not be created");
}

#[test]
fn test_diagnostic_codes_are_unique() {
    let mut codes: Vec<u32> = diagnostics::DIAGNOSTIC_MESSAGES
        .iter()
        .map(|m| m.code)
        .collect();
    let total = codes.len();
    codes.sort_unstable();
    codes.dedup();
    assert_eq!(codes.len(), total);
}

#[test]
fn test_diagnostic_new_looks_up_category() {
    let diagnostic = Diagnostic::new(
        diagnostic_codes::DUPLICATE_DEFAULT_MAPPING,
        SymbolLocation::new("CarMapper.Map"),
        vec!["Car".to_string(), "CarDto".to_string()],
    );

    assert!(diagnostic.is_error());
    assert_eq!(diagnostic.display_code(), "MAP013");
    assert_eq!(
        diagnostic.message_text,
        "Only one user mapping from Car to CarDto can be marked as default"
    );
}

#[test]
fn test_diagnostic_collector_preserves_order() {
    let mut collector = DiagnosticCollector::new();
    collector.report(Diagnostic::new(
        diagnostic_codes::SOURCE_MEMBER_NOT_MAPPED,
        SymbolLocation::new("M.First"),
        vec!["A".into(), "B".into(), "C".into()],
    ));
    collector.report(Diagnostic::new(
        diagnostic_codes::COULD_NOT_CREATE_MAPPING,
        SymbolLocation::new("M.Second"),
        vec!["A".into(), "B".into()],
    ));

    let symbols: Vec<&str> = collector
        .diagnostics()
        .iter()
        .map(|d| d.location.symbol.as_str())
        .collect();
    assert_eq!(symbols, ["M.First", "M.Second"]);
    assert!(collector.has_errors());
    assert_eq!(collector.count(diagnostic_codes::COULD_NOT_CREATE_MAPPING), 1);
}

#[test]
fn test_diagnostic_serializes_without_empty_args() {
    let diagnostic = Diagnostic::new(
        diagnostic_codes::NO_CONSTRUCTOR_FOUND,
        SymbolLocation::new("M.Map"),
        Vec::new(),
    );
    let json = serde_json::to_value(&diagnostic).expect("diagnostic serializes");
    assert!(json.get("args").is_none());
    assert_eq!(json["location"]["symbol"], "M.Map");
}
