use std::collections::HashSet;
use thiserror::Error;

use crate::config::{GenerationSettings, OutputSettings, Settings};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Duplicate entry: {0}")]
    Duplicate(String),
}

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = Self::validate_generation(&settings.generation) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_output(&settings.output) {
            errors.extend(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_generation(generation: &GenerationSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if generation.max_depth == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "generation.max_depth".to_string(),
                reason: "Max depth must be greater than 0".to_string(),
            });
        }

        for (i, entry) in generation.overrides.iter().enumerate() {
            if entry.path.trim().is_empty() {
                errors.push(ValidationError::MissingField(format!(
                    "generation.overrides[{}].path",
                    i
                )));
            }
        }

        let mut seen_lengths = HashSet::new();
        for (i, entry) in generation.array_lengths.iter().enumerate() {
            if entry.path.trim().is_empty() {
                errors.push(ValidationError::MissingField(format!(
                    "generation.array_lengths[{}].path",
                    i
                )));
                continue;
            }
            if !seen_lengths.insert(entry.path.as_str()) {
                errors.push(ValidationError::Duplicate(format!(
                    "Array length path '{}'",
                    entry.path
                )));
            }
            if entry.min > entry.max {
                errors.push(ValidationError::InvalidValue {
                    field: format!("generation.array_lengths.{}", entry.path),
                    reason: format!("min ({}) is greater than max ({})", entry.min, entry.max),
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_output(output: &OutputSettings) -> Result<(), Vec<ValidationError>> {
        if output.count == 0 {
            return Err(vec![ValidationError::InvalidValue {
                field: "output.count".to_string(),
                reason: "Count must be greater than 0".to_string(),
            }]);
        }
        Ok(())
    }
}
