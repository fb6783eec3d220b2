use nova_config::json_schema;

#[test]
fn json_schema_documents_the_lambda_default() {
    let schema = json_schema();
    let value = serde_json::to_value(schema).expect("schema serializes");

    let solve_lambdas = value
        .pointer("/definitions/TypeckConfig/properties/solve_lambdas")
        .expect("solve_lambdas schema property exists");
    assert_eq!(
        solve_lambdas.get("default").and_then(|v| v.as_bool()),
        Some(true)
    );
    assert_eq!(
        solve_lambdas.get("type").and_then(|v| v.as_str()),
        Some("boolean")
    );
}

#[test]
fn json_schema_rejects_unknown_sections() {
    let schema = json_schema();
    let value = serde_json::to_value(schema).expect("schema serializes");

    assert_eq!(
        value.get("additionalProperties").and_then(|v| v.as_bool()),
        Some(false)
    );
    let cache = value
        .pointer("/definitions/CacheConfig")
        .expect("cache section is described");
    assert_eq!(
        cache.get("additionalProperties").and_then(|v| v.as_bool()),
        Some(false)
    );
}

#[test]
fn json_schema_describes_logging_level_as_a_string() {
    let schema = json_schema();
    let value = serde_json::to_value(schema).expect("schema serializes");

    let level = value
        .pointer("/definitions/LoggingConfig/properties/level")
        .expect("level schema property exists");
    assert_eq!(level.get("type").and_then(|v| v.as_str()), Some("string"));
}
