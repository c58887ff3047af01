use thiserror::Error;

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required field: {field}. {hint}")]
    MissingRequired { field: String, hint: String },

    #[error("Invalid value for field '{field}': '{value}'. Expected: {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Configuration validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    /// Create a missing required field error
    pub fn missing_required(field: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::MissingRequired {
            field: field.into(),
            hint: hint.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }

    /// Create a validation failed error
    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }
}

/// Trait for validating configuration values
pub trait ConfigValidator<T: ?Sized> {
    /// Validate a configuration value
    fn validate(&self, field: &str, value: &T) -> Result<(), ConfigError>;
}

/// Inclusive numeric range validator
pub struct RangeValidator<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd + Copy + std::fmt::Display> ConfigValidator<T> for RangeValidator<T> {
    fn validate(&self, field: &str, value: &T) -> Result<(), ConfigError> {
        if *value < self.min || *value > self.max {
            return Err(ConfigError::invalid_value(
                field,
                value.to_string(),
                format!("value between {} and {}", self.min, self.max),
            ));
        }
        Ok(())
    }
}

/// String length validator
pub struct LengthValidator {
    pub min_length: usize,
    pub max_length: Option<usize>,
}

impl LengthValidator {
    pub fn min(min_length: usize) -> Self {
        Self {
            min_length,
            max_length: None,
        }
    }

    pub fn range(min_length: usize, max_length: usize) -> Self {
        Self {
            min_length,
            max_length: Some(max_length),
        }
    }
}

impl ConfigValidator<str> for LengthValidator {
    fn validate(&self, field: &str, value: &str) -> Result<(), ConfigError> {
        if value.len() < self.min_length {
            return Err(ConfigError::invalid_value(
                field,
                value,
                format!("string with at least {} characters", self.min_length),
            ));
        }

        if let Some(max_length) = self.max_length {
            if value.len() > max_length {
                return Err(ConfigError::invalid_value(
                    field,
                    value,
                    format!("string with at most {} characters", max_length),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_validator() {
        let validator = RangeValidator { min: 1u16, max: 10 };

        assert!(validator.validate("retries", &1).is_ok());
        assert!(validator.validate("retries", &10).is_ok());
        assert!(validator.validate("retries", &0).is_err());
        assert!(validator.validate("retries", &11).is_err());
    }

    #[test]
    fn test_length_validator() {
        let validator = LengthValidator::range(3, 10);

        assert!(validator.validate("message", "hello").is_ok());
        assert!(validator.validate("message", "hi").is_err()); // Too short
        assert!(validator.validate("message", "this is too long").is_err()); // Too long
    }

    #[test]
    fn test_length_validator_names_field() {
        let err = LengthValidator::min(1).validate("message", "").unwrap_err();
        assert!(err.to_string().contains("'message'"));
    }
}
