//! Descriptor validation

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::descriptor::{AsyncAction, CallApi, Field, FormatData, ShouldCallApi};
use crate::error::ValidationError;
use crate::options::{Addressing, Suffixes};

/// The pending, success and error action types of one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionTypes {
    pub pending: String,
    pub success: String,
    pub error: String,
}

impl ActionTypes {
    pub fn new(
        pending: impl Into<String>,
        success: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            pending: pending.into(),
            success: success.into(),
            error: error.into(),
        }
    }

    fn from_prefix(prefix: &str, suffixes: Suffixes<'_>) -> Self {
        Self {
            pending: format!("{prefix}{}", suffixes.pending),
            success: format!("{prefix}{}", suffixes.success),
            error: format!("{prefix}{}", suffixes.error),
        }
    }

    fn from_types(types: Option<&Value>) -> Result<Self, ValidationError> {
        match types {
            Some(Value::Array(types)) => match types.as_slice() {
                [Value::String(pending), Value::String(success), Value::String(error)] => {
                    Ok(Self::new(pending, success, error))
                }
                _ => Err(ValidationError::InvalidTypes),
            },
            _ => Err(ValidationError::InvalidTypes),
        }
    }
}

/// A descriptor with every default filled in and every field checked.
pub struct Validated<S> {
    pub types: ActionTypes,
    pub call_api: CallApi,
    pub format_data: FormatData,
    pub should_call_api: ShouldCallApi<S>,
    pub payload: Map<String, Value>,
    pub meta: Map<String, Value>,
}

impl<S> std::fmt::Debug for Validated<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validated")
            .field("types", &self.types)
            .field("payload", &self.payload)
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

/// Check a descriptor against the addressing mode, returning the first
/// violation.
///
/// Order: suffixes (prefix mode), `types` or prefix, `callAPI`, `formatData`,
/// `shouldCallAPI`, `payload`, `meta`. Absent optional fields get their
/// defaults (identity, always-true, `{}`) before being checked.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use slim_async_core::{validate, Addressing, AsyncAction, ValidationError};
///
/// let action: AsyncAction<()> = AsyncAction::new()
///     .types(["A_PENDING", "A_SUCCESS"])
///     .call_api(|| async { Ok(json!({})) });
/// assert_eq!(
///     validate(&action, &Addressing::Types).unwrap_err(),
///     ValidationError::InvalidTypes
/// );
/// ```
pub fn validate<S: 'static>(
    action: &AsyncAction<S>,
    addressing: &Addressing,
) -> Result<Validated<S>, ValidationError> {
    let types = match addressing {
        Addressing::Types => ActionTypes::from_types(action.types_value())?,
        Addressing::Prefix(options) => {
            let suffixes = options.suffixes()?;
            match action.prefix_value() {
                Some(Value::String(prefix)) => ActionTypes::from_prefix(prefix, suffixes),
                _ => return Err(ValidationError::InvalidType),
            }
        }
    };

    let call_api = match &action.call_api {
        Some(Field::Func(call_api)) => call_api.clone(),
        _ => return Err(ValidationError::InvalidCallApi),
    };

    let format_data: FormatData = match &action.format_data {
        None => Arc::new(|response: Value| response),
        Some(Field::Func(format_data)) => format_data.clone(),
        Some(Field::Data(_)) => return Err(ValidationError::InvalidFormatData),
    };

    let should_call_api: ShouldCallApi<S> = match &action.should_call_api {
        None => Arc::new(|_: &S| true),
        Some(Field::Func(should_call_api)) => should_call_api.clone(),
        Some(Field::Data(_)) => return Err(ValidationError::InvalidShouldCallApi),
    };

    let payload = object_or_default(action.payload.as_ref(), ValidationError::InvalidPayload)?;
    let meta = object_or_default(action.meta.as_ref(), ValidationError::InvalidMeta)?;

    Ok(Validated {
        types,
        call_api,
        format_data,
        should_call_api,
        payload,
        meta,
    })
}

fn object_or_default(
    value: Option<&Value>,
    error: ValidationError,
) -> Result<Map<String, Value>, ValidationError> {
    match value {
        None => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(_) => Err(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;
    use serde_json::json;

    fn valid() -> AsyncAction<()> {
        AsyncAction::new()
            .types(["REQUEST_PENDING", "REQUEST_SUCCEEDED", "REQUEST_FAILED"])
            .call_api(|| async { Ok(json!({})) })
    }

    fn prefixed() -> AsyncAction<()> {
        AsyncAction::new()
            .kind("REQUEST_DATA")
            .call_api(|| async { Ok(json!({})) })
    }

    fn err(action: &AsyncAction<()>, addressing: &Addressing) -> ValidationError {
        validate(action, addressing).unwrap_err()
    }

    #[test]
    fn test_defaults_are_filled() {
        let validated = validate(&valid(), &Addressing::Types).unwrap();
        assert_eq!(
            validated.types,
            ActionTypes::new("REQUEST_PENDING", "REQUEST_SUCCEEDED", "REQUEST_FAILED")
        );
        assert!(validated.payload.is_empty());
        assert!(validated.meta.is_empty());
        assert!((validated.should_call_api)(&()));
        assert_eq!((validated.format_data)(json!({ "a": 1 })), json!({ "a": 1 }));
    }

    #[test]
    fn test_types_must_be_three_strings() {
        let types = &Addressing::Types;
        assert_eq!(
            err(&valid().set("types", json!(["A", "B", null])), types),
            ValidationError::InvalidTypes
        );
        assert_eq!(
            err(&valid().types(["A", "B"]), types),
            ValidationError::InvalidTypes
        );
        assert_eq!(
            err(&valid().types(["A", "B", "C", "D"]), types),
            ValidationError::InvalidTypes
        );
        assert_eq!(
            err(&valid().set("types", json!("A")), types),
            ValidationError::InvalidTypes
        );
    }

    #[test]
    fn test_types_checked_before_call_api() {
        let action = valid().types(["A"]).set("callAPI", json!(5));
        assert_eq!(err(&action, &Addressing::Types), ValidationError::InvalidTypes);
    }

    #[test]
    fn test_call_api_must_be_function() {
        let types = &Addressing::Types;
        assert_eq!(
            err(&valid().set("callAPI", json!("url")), types),
            ValidationError::InvalidCallApi
        );
        assert_eq!(err(&valid().unset("callAPI"), types), ValidationError::InvalidCallApi);
    }

    #[test]
    fn test_optional_function_slots() {
        let types = &Addressing::Types;
        assert_eq!(
            err(&valid().set("formatData", Value::Null), types),
            ValidationError::InvalidFormatData
        );
        assert_eq!(
            err(&valid().set("shouldCallAPI", json!(true)), types),
            ValidationError::InvalidShouldCallApi
        );
    }

    #[test]
    fn test_payload_and_meta_must_be_objects() {
        let types = &Addressing::Types;
        assert_eq!(
            err(&valid().payload(Value::Null), types),
            ValidationError::InvalidPayload
        );
        assert_eq!(
            err(&valid().payload(json!([1, 2])), types),
            ValidationError::InvalidPayload
        );
        assert_eq!(err(&valid().meta(json!(3)), types), ValidationError::InvalidMeta);
    }

    #[test]
    fn test_prefix_derives_types() {
        let addressing = Addressing::Prefix(Options::new("_P", "_S", "_E"));
        let validated = validate(&prefixed().type_prefix("FETCH"), &addressing).unwrap();
        assert_eq!(validated.types, ActionTypes::new("FETCH_P", "FETCH_S", "FETCH_E"));
    }

    #[test]
    fn test_prefix_falls_back_to_type() {
        let addressing = Addressing::Prefix(Options::conventional());
        let validated = validate(&prefixed(), &addressing).unwrap();
        assert_eq!(validated.types.pending, "REQUEST_DATA_PENDING");
        assert_eq!(validated.types.error, "REQUEST_DATA_ERROR");
    }

    #[test]
    fn test_prefix_must_be_string() {
        let addressing = Addressing::Prefix(Options::conventional());
        assert_eq!(
            err(&prefixed().set("type", json!({})), &addressing),
            ValidationError::InvalidType
        );
    }

    #[test]
    fn test_options_checked_before_prefix() {
        let addressing = Addressing::Prefix(Options::default());
        assert_eq!(err(&prefixed(), &addressing), ValidationError::InvalidOptions);
        assert_eq!(
            err(&prefixed().set("type", json!({})), &addressing),
            ValidationError::InvalidOptions
        );
    }
}
