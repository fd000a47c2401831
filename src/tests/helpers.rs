//! Shared test utilities

use crate::{
    config::ValidatorConfig,
    issues::{ErrorCode, Issue},
    schema::HedSchema,
    validation::HedValidator,
};

const TEST_SCHEMA: &str = include_str!("../../tests/data/test_schema.json");

/// Initialize logging for tests
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// The fixture schema used across the crate's tests.
pub fn test_schema() -> HedSchema {
    init_logging();
    HedSchema::from_json_str(TEST_SCHEMA).unwrap()
}

pub fn codes(issues: &[Issue]) -> Vec<ErrorCode> {
    issues.iter().map(|issue| issue.code.clone()).collect()
}

/// Validate with default settings and return only the codes.
pub fn validate_codes(schema: &HedSchema, hed_string: &str) -> Vec<ErrorCode> {
    let validator = HedValidator::new(schema, ValidatorConfig::default()).unwrap();
    codes(&validator.validate_string(hed_string))
}
