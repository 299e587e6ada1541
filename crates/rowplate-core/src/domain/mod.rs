// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for rowplate.
//!
//! Pure rules and values: templates, parameters, the replacement table,
//! placeholder substitution and validation findings. No I/O happens here;
//! randomness, fake data and transports are reached through the ports in
//! `crate::application`.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: domain logic is synchronous
//! - **No I/O**: no filesystem, network, or clock access
//! - **Immutable values**: all domain objects are Clone + PartialEq
//!
// Public API - what the world sees
pub mod error;
pub mod http;
pub mod param;
pub mod placeholder;
pub mod replacements;
pub mod report;
pub mod row_table;
pub mod template;
pub mod value_objects;

mod validation;

// Re-exports for convenience
pub use error::{DomainError, ErrorCategory};
pub use http::{Request, Response};
pub use param::{Param, ParamSet};
pub use replacements::{CSV_KEY_PREFIX, INDEX0_KEY, INDEX1_KEY, Replacements};
pub use report::{SizeThreshold, ValidationReport};
pub use row_table::{MAX_ROWS, RowTable};
pub use template::{Batch, LineTemplate, RequestTemplate};
pub use validation::DomainValidator;
pub use value_objects::{CellDelimiter, Encoding, HttpMethod, LineSeparator, ParamType};

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    // ========================================================================
    // Value Object Tests
    // ========================================================================

    #[test]
    fn param_type_parses_loosely() {
        assert_eq!(ParamType::from_str("uuid").unwrap(), ParamType::Uuid);
        assert_eq!(
            ParamType::from_str("password-base64").unwrap(),
            ParamType::PasswordBase64
        );
        assert!(ParamType::from_str("dice").is_err());
    }

    #[test]
    fn only_constant_and_choice_are_user_supplied() {
        let user: Vec<ParamType> = ParamType::ALL
            .into_iter()
            .filter(|t| t.is_user_supplied())
            .collect();
        assert_eq!(user, vec![ParamType::Constant, ParamType::Choice]);
        assert!(ParamType::ALL.iter().all(|t| t.is_volatile() != t.is_user_supplied()));
    }

    #[test]
    fn encodings_produce_expected_bytes() {
        assert_eq!(Encoding::Utf8.encode("é"), vec![0xC3, 0xA9]);
        assert_eq!(Encoding::Utf16Le.encode("A"), vec![0x41, 0x00]);
        assert_eq!(Encoding::Utf16Be.encode("A"), vec![0x00, 0x41]);
        assert_eq!(Encoding::Utf16Le.bom(), &[0xFF, 0xFE]);
        assert_eq!(Encoding::from_str("utf_16be").unwrap(), Encoding::Utf16Be);
    }

    #[test]
    fn line_separators() {
        assert_eq!(LineSeparator::Windows.chars(), "\r\n");
        assert_eq!(LineSeparator::from_str("CR").unwrap(), LineSeparator::Mac);
    }

    #[test]
    fn http_methods_round_trip_through_strings() {
        for method in ["GET", "post", "Put", "PATCH", "delete", "HEAD", "options"] {
            let parsed = HttpMethod::from_str(method).unwrap();
            assert_eq!(parsed.as_str(), method.to_ascii_uppercase());
        }
        assert!(HttpMethod::from_str("FETCH").is_err());
    }

    // ========================================================================
    // Template + Table Tests
    // ========================================================================

    #[test]
    fn row_keys_never_collide_with_param_names() {
        for key in [INDEX0_KEY, INDEX1_KEY, "_csv0"] {
            assert!(Param::new(key, ParamType::Constant).is_err());
        }
    }

    #[test]
    fn insert_scenario_renders_first_row() {
        let template = LineTemplate::builder()
            .name("insert")
            .pattern("INSERT INTO ${table} (name, qty) VALUES ('${_csv0}', ${_csv1});")
            .param(Param::constant("table", "fruit").unwrap())
            .build()
            .unwrap();
        let table = RowTable::parse("apple,8\nbanana,3", CellDelimiter::Any);

        let mut values = Replacements::new();
        values.insert("table", "fruit");
        values.put_index(0);
        values.put_row(table.row(0).unwrap());

        assert_eq!(
            values.render(&template.pattern),
            "INSERT INTO fruit (name, qty) VALUES ('apple', 8);"
        );
    }

    #[test]
    fn domain_validator_delegates_to_templates() {
        let mut template = RequestTemplate::builder()
            .name("r")
            .uri("http://localhost")
            .build()
            .unwrap();
        assert!(DomainValidator::validate_request_template(&template).is_ok());

        template.uri = "  ".into();
        assert_eq!(
            DomainValidator::validate_request_template(&template),
            Err(DomainError::MissingRequiredField { field: "uri" })
        );
    }
}
