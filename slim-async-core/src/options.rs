//! Middleware configuration
//!
//! Without [`Options`] the middleware reads explicit `types` arrays from each
//! descriptor. With options it derives the three action types from a prefix
//! and the configured suffixes.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Prefix-mode configuration.
///
/// Suffixes are checked lazily: a missing suffix is reported as
/// [`ValidationError::InvalidOptions`] when the first prefixed descriptor is
/// handled. `InvalidOptions` covers missing suffixes only; a suffix of the
/// wrong JSON type is rejected earlier, as a `serde_json::Error` from
/// [`Options::from_json`].
///
/// # Example
///
/// ```
/// use slim_async_core::Options;
///
/// let options = Options::from_json(
///     r#"{ "pendingSuffix": "_P", "successSuffix": "_S", "errorSuffix": "_E" }"#,
/// )
/// .unwrap();
/// assert!(options.is_fsa_compliant);
/// assert_eq!(options.pending_suffix.as_deref(), Some("_P"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    pub pending_suffix: Option<String>,
    pub success_suffix: Option<String>,
    pub error_suffix: Option<String>,
    /// Emit flux-standard actions (`true`) or flattened ones (`false`).
    #[serde(rename = "isFSACompliant")]
    pub is_fsa_compliant: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            pending_suffix: None,
            success_suffix: None,
            error_suffix: None,
            is_fsa_compliant: true,
        }
    }
}

impl Options {
    /// Options with all three suffixes set.
    pub fn new(
        pending_suffix: impl Into<String>,
        success_suffix: impl Into<String>,
        error_suffix: impl Into<String>,
    ) -> Self {
        Self {
            pending_suffix: Some(pending_suffix.into()),
            success_suffix: Some(success_suffix.into()),
            error_suffix: Some(error_suffix.into()),
            is_fsa_compliant: true,
        }
    }

    /// `_PENDING`, `_SUCCESS` and `_ERROR`.
    pub fn conventional() -> Self {
        Self::new("_PENDING", "_SUCCESS", "_ERROR")
    }

    /// Parse camelCase JSON options.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn fsa_compliant(mut self, compliant: bool) -> Self {
        self.is_fsa_compliant = compliant;
        self
    }

    pub(crate) fn suffixes(&self) -> Result<Suffixes<'_>, ValidationError> {
        match (
            self.pending_suffix.as_deref(),
            self.success_suffix.as_deref(),
            self.error_suffix.as_deref(),
        ) {
            (Some(pending), Some(success), Some(error)) => Ok(Suffixes {
                pending,
                success,
                error,
            }),
            _ => Err(ValidationError::InvalidOptions),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Suffixes<'a> {
    pub pending: &'a str,
    pub success: &'a str,
    pub error: &'a str,
}

/// How a middleware instance finds the three action types. Fixed at
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Addressing {
    /// Explicit `types` arrays.
    Types,
    /// `typePrefix` (or `type`) plus configured suffixes.
    Prefix(Options),
}

impl Addressing {
    pub fn is_prefix(&self) -> bool {
        matches!(self, Addressing::Prefix(_))
    }
}

/// Shape of emitted actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Emission {
    /// `{type, payload, error?, meta?}`; non-conforming actions go to `next`.
    #[default]
    Standard,
    /// Payload fields merged next to `type`.
    Flattened,
}

impl Emission {
    pub(crate) fn for_addressing(addressing: &Addressing) -> Self {
        match addressing {
            Addressing::Prefix(options) if !options.is_fsa_compliant => Emission::Flattened,
            _ => Emission::Standard,
        }
    }
}

/// What to do with a descriptor that has no truthy `callAPI`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingCallApi {
    /// Pass it to `next` untouched.
    #[default]
    Forward,
    /// In types mode, validate it and fail with `InvalidCallApi`.
    /// Prefix mode forwards regardless.
    Reject,
}
