//! Param Resolver - turns named parameters into placeholder values.
//!
//! Two resolution moments:
//! 1. Once per run: user-supplied values (`Constant`, `Choice`)
//! 2. Once per unit: engine-generated values, via [`ParamResolver::refresh`]

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use rand::Rng;
use rand::distr::Alphanumeric;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    application::ports::FakeDataProvider,
    domain::{Param, ParamSet, ParamType, Replacements},
    error::{RowplateError, RowplateResult},
};

/// Constant values of a run plus whether any of them is blank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstantParams {
    pub values: Replacements,
    pub any_blank: bool,
}

#[derive(Clone)]
pub struct ParamResolver {
    faker: Arc<dyn FakeDataProvider>,
}

impl ParamResolver {
    pub fn new(faker: Arc<dyn FakeDataProvider>) -> Self {
        Self { faker }
    }

    /// Copy `Constant`/`Choice` values; missing values become empty strings.
    pub fn resolve_constant_params(&self, params: &ParamSet) -> ConstantParams {
        let mut resolved = ConstantParams::default();
        for param in params.iter().filter(|p| p.kind.is_user_supplied()) {
            let value = param.user_value();
            if value.trim().is_empty() {
                debug!(param = %param.name, "blank parameter value");
                resolved.any_blank = true;
            }
            resolved.values.insert(param.name.clone(), value);
        }
        resolved
    }

    /// Recompute every engine-generated value, overwriting earlier ones.
    pub fn resolve_volatile_params(&self, params: &ParamSet, values: &mut Replacements) {
        for param in params.iter().filter(|p| p.kind.is_volatile()) {
            values.insert(param.name.clone(), self.generate(param));
        }
    }

    /// Fresh volatile values for the next unit.
    pub fn refresh(&self, params: &ParamSet, values: &mut Replacements) {
        self.resolve_volatile_params(params, values);
    }

    /// Constants plus a first set of volatile values.
    pub fn resolve_all(&self, params: &ParamSet) -> ConstantParams {
        let mut resolved = self.resolve_constant_params(params);
        self.resolve_volatile_params(params, &mut resolved.values);
        resolved
    }

    /// Value of a single parameter, generating it when volatile.
    pub fn resolve_param(&self, param: &Param) -> String {
        if param.kind.is_user_supplied() {
            param.user_value()
        } else {
            self.generate(param)
        }
    }

    /// Reject fake-data expressions the provider cannot evaluate.
    pub fn check_expressions(&self, params: &ParamSet) -> RowplateResult<()> {
        for param in params.iter().filter(|p| p.kind == ParamType::Datafaker) {
            self.faker
                .validate(param.fake_expression())
                .map_err(|e| invalid_expression(param, &e))?;
        }
        Ok(())
    }

    fn generate(&self, param: &Param) -> String {
        match param.kind {
            ParamType::Datafaker => {
                let expression = param.fake_expression();
                self.faker.evaluate(expression).unwrap_or_else(|e| {
                    warn!(param = %param.name, %expression, error = %e, "fake data evaluation failed");
                    String::new()
                })
            }
            ParamType::Password => generate_password(param.password_length()),
            ParamType::PasswordBase64 => STANDARD.encode(generate_password(param.password_length())),
            ParamType::Timestamp => chrono::Utc::now().timestamp_millis().to_string(),
            ParamType::Uuid => Uuid::new_v4().to_string(),
            ParamType::Constant | ParamType::Choice => param.user_value(),
        }
    }
}

impl std::fmt::Debug for ParamResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParamResolver").finish_non_exhaustive()
    }
}

fn invalid_expression(param: &Param, cause: &RowplateError) -> RowplateError {
    crate::domain::DomainError::InvalidParam {
        name: param.name.clone(),
        reason: cause.to_string(),
    }
    .into()
}

/// Random string over `[a-zA-Z0-9]`.
pub fn generate_password(length: usize) -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
