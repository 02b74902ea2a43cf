//! Generation error types

use thiserror::Error;

/// Errors raised while generating a value.
///
/// Only a broken schema fails loudly; every other gap degrades to a
/// best-effort value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// A named generator path does not name an invocable provider method
    #[error("Unresolvable generator path '{path}': no such faker method")]
    UnresolvableGeneratorPath { path: String },

    /// Two merged sub-schemas declare different types
    #[error("Incompatible composition types: conflicting types '{first}' and '{second}'")]
    IncompatibleCompositionTypes { first: String, second: String },
}

/// Tag identifying a [`GenerationError`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationErrorKind {
    UnresolvableGeneratorPath,
    IncompatibleCompositionTypes,
}

impl GenerationError {
    pub fn kind(&self) -> GenerationErrorKind {
        match self {
            Self::UnresolvableGeneratorPath { .. } => GenerationErrorKind::UnresolvableGeneratorPath,
            Self::IncompatibleCompositionTypes { .. } => {
                GenerationErrorKind::IncompatibleCompositionTypes
            }
        }
    }
}
