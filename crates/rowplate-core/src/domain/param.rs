//! Named template parameters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;
use crate::domain::value_objects::ParamType;

pub const MIN_PASSWORD_LENGTH: usize = 4;
pub const MAX_PASSWORD_LENGTH: usize = 128;
pub const DEFAULT_PASSWORD_LENGTH: usize = 16;

/// Expression used for a fake-data parameter that has no option.
pub const DEFAULT_FAKE_EXPRESSION: &str = "#{color.name}";

// ============================================================================
// Param
// ============================================================================

/// A user-defined, template-scoped value referenced as `${name}`.
///
/// `option` is type-specific: the fake-data expression, the password
/// length, or the comma/semicolon separated choice list. `value` is the
/// user value for `Constant` and `Choice`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: ParamType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Param {
    pub fn new(name: impl Into<String>, kind: ParamType) -> Result<Self, DomainError> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self {
            name,
            kind,
            option: None,
            value: None,
        })
    }

    pub fn constant(name: impl Into<String>, value: impl Into<String>) -> Result<Self, DomainError> {
        Ok(Self::new(name, ParamType::Constant)?.with_value(value))
    }

    pub fn with_option(mut self, option: impl Into<String>) -> Self {
        self.option = Some(option.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Name and option rules that need no collaborator.
    ///
    /// Fake-data expressions are checked separately against the provider.
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_name(&self.name)?;
        if self.kind == ParamType::Choice && self.value.is_none() && self.choices().is_empty() {
            return Err(DomainError::InvalidParam {
                name: self.name.clone(),
                reason: "a choice parameter needs a value or a non-empty option list".into(),
            });
        }
        Ok(())
    }

    /// Length for `Password`/`PasswordBase64`, clamped to the allowed range.
    pub fn password_length(&self) -> usize {
        self.option
            .as_deref()
            .and_then(|o| o.trim().parse::<usize>().ok())
            .map_or(DEFAULT_PASSWORD_LENGTH, |n| {
                n.clamp(MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH)
            })
    }

    pub fn fake_expression(&self) -> &str {
        self.option
            .as_deref()
            .filter(|o| !o.trim().is_empty())
            .unwrap_or(DEFAULT_FAKE_EXPRESSION)
    }

    /// Non-blank entries of the choice list, in declaration order.
    pub fn choices(&self) -> Vec<&str> {
        self.option
            .as_deref()
            .map(|o| {
                o.split([',', ';'])
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Value of a user-supplied parameter.
    ///
    /// A choice without a selected value falls back to the first entry.
    pub fn user_value(&self) -> String {
        match (&self.value, self.kind) {
            (Some(v), _) => v.clone(),
            (None, ParamType::Choice) => self.choices().first().map(|c| c.to_string()).unwrap_or_default(),
            (None, _) => String::new(),
        }
    }
}

/// Names match `[a-zA-Z0-9_-]+` and must not start with `_`.
pub fn validate_name(name: &str) -> Result<(), DomainError> {
    let invalid = |reason: &str| DomainError::InvalidParamName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("name cannot be empty"));
    }
    if name.starts_with('_') {
        return Err(invalid("names starting with '_' are reserved"));
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
    {
        return Err(invalid(&format!("character '{c}' is not allowed")));
    }
    Ok(())
}

// ============================================================================
// ParamSet
// ============================================================================

/// Parameters unique by (case-sensitive) name, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Param>", into = "Vec<Param>")]
pub struct ParamSet {
    params: BTreeMap<String, Param>,
}

impl ParamSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, param: Param) -> Result<(), DomainError> {
        if self.params.contains_key(&param.name) {
            return Err(DomainError::DuplicateParam { name: param.name });
        }
        self.params.insert(param.name.clone(), param);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Param> {
        self.params.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Param> {
        self.params.get_mut(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Param> {
        self.params.values()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        self.iter().try_for_each(Param::validate)
    }

    /// Override the value of a user-supplied parameter.
    pub fn set_value(&mut self, name: &str, value: impl Into<String>) -> Result<(), DomainError> {
        let param = self
            .params
            .get_mut(name)
            .ok_or_else(|| DomainError::InvalidParam {
                name: name.to_string(),
                reason: "no such parameter in this template".into(),
            })?;
        if param.kind.is_volatile() {
            return Err(DomainError::InvalidParam {
                name: name.to_string(),
                reason: format!("{} values are generated for every row", param.kind),
            });
        }
        param.value = Some(value.into());
        Ok(())
    }
}

impl TryFrom<Vec<Param>> for ParamSet {
    type Error = DomainError;

    fn try_from(params: Vec<Param>) -> Result<Self, Self::Error> {
        let mut set = Self::new();
        for param in params {
            set.insert(param)?;
        }
        Ok(set)
    }
}

impl From<ParamSet> for Vec<Param> {
    fn from(set: ParamSet) -> Self {
        set.params.into_values().collect()
    }
}

impl<'a> IntoIterator for &'a ParamSet {
    type Item = &'a Param;
    type IntoIter = std::collections::btree_map::Values<'a, String, Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_reserved_and_malformed_names() {
        assert!(Param::new("_csv0", ParamType::Constant).is_err());
        assert!(Param::new("", ParamType::Constant).is_err());
        assert!(Param::new("my param", ParamType::Constant).is_err());
        assert!(Param::new("my_param-2", ParamType::Constant).is_ok());
    }

    #[test]
    fn password_length_is_clamped() {
        let p = Param::new("pw", ParamType::Password).unwrap();
        assert_eq!(p.password_length(), DEFAULT_PASSWORD_LENGTH);
        assert_eq!(p.clone().with_option("2").password_length(), MIN_PASSWORD_LENGTH);
        assert_eq!(p.clone().with_option("500").password_length(), MAX_PASSWORD_LENGTH);
        assert_eq!(p.clone().with_option("abc").password_length(), DEFAULT_PASSWORD_LENGTH);
        assert_eq!(p.with_option(" 32 ").password_length(), 32);
    }

    #[test]
    fn choice_falls_back_to_first_option() {
        let p = Param::new("env", ParamType::Choice)
            .unwrap()
            .with_option("dev; test,prod");
        assert_eq!(p.choices(), vec!["dev", "test", "prod"]);
        assert_eq!(p.user_value(), "dev");
        assert_eq!(p.with_value("prod").user_value(), "prod");
    }

    #[test]
    fn choice_without_options_or_value_is_invalid() {
        let p = Param::new("env", ParamType::Choice).unwrap();
        assert!(matches!(p.validate(), Err(DomainError::InvalidParam { .. })));
    }

    #[test]
    fn fake_expression_defaults() {
        let p = Param::new("color", ParamType::Datafaker).unwrap();
        assert_eq!(p.fake_expression(), DEFAULT_FAKE_EXPRESSION);
        assert_eq!(p.with_option("#{name.first_name}").fake_expression(), "#{name.first_name}");
    }

    #[test]
    fn set_is_unique_and_ordered() {
        let mut set = ParamSet::new();
        set.insert(Param::constant("b", "2").unwrap()).unwrap();
        set.insert(Param::constant("a", "1").unwrap()).unwrap();
        set.insert(Param::constant("B", "3").unwrap()).unwrap();

        let err = set.insert(Param::constant("a", "again").unwrap()).unwrap_err();
        assert_eq!(err, DomainError::DuplicateParam { name: "a".into() });

        let names: Vec<&str> = set.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["B", "a", "b"]);
    }

    #[test]
    fn overrides_only_user_values() {
        let mut set = ParamSet::new();
        set.insert(Param::constant("table", "fruit").unwrap()).unwrap();
        set.insert(Param::new("id", ParamType::Uuid).unwrap()).unwrap();

        set.set_value("table", "veg").unwrap();
        assert_eq!(set.get("table").map(Param::user_value), Some("veg".to_string()));
        assert!(set.set_value("id", "x").is_err());
        assert!(set.set_value("missing", "x").is_err());
    }

    #[test]
    fn set_deserialization_rejects_duplicates() {
        let params = vec![
            Param::constant("a", "1").unwrap(),
            Param::constant("a", "2").unwrap(),
        ];
        assert!(ParamSet::try_from(params).is_err());
    }
}
