//! The uniform response wrapper returned by every Bot API method.
//!
//! # Design
//! `Envelope<T>` is a pure deserialization target. The only rule it enforces is
//! that `result` is meaningful only when `ok` is true: a failed envelope always
//! carries `result: None`, even if the body included something under `result`.
//! A successful envelope whose `result` does not match `T` fails the whole
//! parse.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ApiFailure;

/// Response wrapper: success flag, error details, advisory hints and payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<ResponseParameters>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
}

/// Hints that help a caller recover from a failed request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseParameters {
    /// The group was migrated to a supergroup with this identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migrate_to_chat_id: Option<i64>,
    /// Seconds to wait before repeating a request that hit flood control.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<i64>,
}

impl<T> Envelope<T> {
    pub fn retry_after(&self) -> Option<i64> {
        self.parameters.as_ref().and_then(|p| p.retry_after)
    }

    pub fn migrate_to_chat_id(&self) -> Option<i64> {
        self.parameters.as_ref().and_then(|p| p.migrate_to_chat_id)
    }

    /// Convert into the payload, or an `ApiFailure` describing why there is none.
    pub fn into_result(self) -> Result<T, ApiFailure> {
        let retry_after = self.retry_after();
        let migrate_to_chat_id = self.migrate_to_chat_id();
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            (ok, _) => Err(ApiFailure {
                error_code: self.error_code,
                description: self.description.unwrap_or_else(|| {
                    if ok {
                        "missing result".to_string()
                    } else {
                        "unknown error".to_string()
                    }
                }),
                retry_after,
                migrate_to_chat_id,
            }),
        }
    }
}

#[derive(Deserialize)]
struct RawEnvelope {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    parameters: Option<ResponseParameters>,
    #[serde(default)]
    result: Option<serde_json::Value>,
}

impl<'de, T> Deserialize<'de> for Envelope<T>
where
    T: DeserializeOwned,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawEnvelope::deserialize(deserializer)?;
        let result = match (raw.ok, raw.result) {
            (true, Some(value)) => Some(
                serde_json::from_value(value)
                    .map_err(|e| D::Error::custom(format!("invalid result: {e}")))?,
            ),
            _ => None,
        };
        Ok(Envelope {
            ok: raw.ok,
            description: raw.description,
            error_code: raw.error_code,
            parameters: raw.parameters,
            result,
        })
    }
}
