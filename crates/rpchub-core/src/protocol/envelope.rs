//! JSON-RPC 2.0 envelopes.
//!
//! `params`, `result`, and event `data` are held as `RawValue` so the resolved
//! handler decides how (and whether) to parse them.

use std::fmt;

use serde::de::{self, Deserializer};
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use serde_json::Value;

use crate::error::{HubError, Result};

/// Literal protocol tag. Only `"2.0"` deserializes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Version;

impl Version {
    pub const TAG: &'static str = "2.0";
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(Self::TAG)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let tag = String::deserialize(d)?;
        if tag == Self::TAG {
            Ok(Version)
        } else {
            Err(de::Error::custom(format!(
                "unsupported jsonrpc version {tag:?}, expected \"2.0\""
            )))
        }
    }
}

/// Correlation token. Opaque; echoed back verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    Num(i64),
    Str(String),
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Num(n) => write!(f, "{n}"),
            Id::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id::Str(s.to_owned())
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Id::Str(s)
    }
}

impl From<i64> for Id {
    fn from(n: i64) -> Self {
        Id::Num(n)
    }
}

/// Request envelope.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Request {
    pub jsonrpc: Version,
    pub id: Id,
    pub method: String,
    /// Raw params, parsed lazily by the handler's parser.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Box<RawValue>>,
}

impl Request {
    /// Build a request from typed params.
    pub fn new<P: Serialize>(id: impl Into<Id>, method: impl Into<String>, params: &P) -> Result<Self> {
        let params = serde_json::value::to_raw_value(params)
            .map_err(|e| HubError::InvalidRequest(format!("params encode failed: {e}")))?;
        Ok(Self {
            jsonrpc: Version,
            id: id.into(),
            method: method.into(),
            params: Some(params),
        })
    }
}

/// Error object carried by an error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Exactly one of result or error.
#[derive(Debug)]
pub enum Outcome {
    Result(Box<RawValue>),
    Error(ErrorObject),
}

/// Response envelope. `id` is `None` only when the request could not be
/// correlated (serialized as `null`).
#[derive(Debug)]
pub struct Response {
    pub jsonrpc: Version,
    pub id: Option<Id>,
    pub outcome: Outcome,
}

impl Response {
    pub fn result(id: Id, result: Box<RawValue>) -> Self {
        Self {
            jsonrpc: Version,
            id: Some(id),
            outcome: Outcome::Result(result),
        }
    }

    pub fn error(id: Option<Id>, error: ErrorObject) -> Self {
        Self {
            jsonrpc: Version,
            id,
            outcome: Outcome::Error(error),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, Outcome::Error(_))
    }

    /// Error object, if this is an error response.
    pub fn error_object(&self) -> Option<&ErrorObject> {
        match &self.outcome {
            Outcome::Error(e) => Some(e),
            Outcome::Result(_) => None,
        }
    }

    /// Raw result, if this is a success response.
    pub fn result_raw(&self) -> Option<&RawValue> {
        match &self.outcome {
            Outcome::Result(r) => Some(r),
            Outcome::Error(_) => None,
        }
    }
}

impl Serialize for Response {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        let mut st = s.serialize_struct("Response", 3)?;
        st.serialize_field("jsonrpc", &self.jsonrpc)?;
        st.serialize_field("id", &self.id)?;
        match &self.outcome {
            Outcome::Result(r) => st.serialize_field("result", r)?,
            Outcome::Error(e) => st.serialize_field("error", e)?,
        }
        st.end()
    }
}

// `result: null` is a legitimate result, so presence is tracked separately
// from the value.
fn present_raw<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<Box<RawValue>>, D::Error> {
    Box::<RawValue>::deserialize(d).map(Some)
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct WireResponse {
    jsonrpc: Version,
    id: Option<Id>,
    #[serde(default, deserialize_with = "present_raw")]
    result: Option<Box<RawValue>>,
    #[serde(default)]
    error: Option<ErrorObject>,
}

impl<'de> Deserialize<'de> for Response {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let wire = WireResponse::deserialize(d)?;
        let outcome = match (wire.result, wire.error) {
            (Some(r), None) => Outcome::Result(r),
            (None, Some(e)) => Outcome::Error(e),
            (Some(_), Some(_)) => {
                return Err(de::Error::custom("response carries both result and error"))
            }
            (None, None) => {
                return Err(de::Error::custom("response carries neither result nor error"))
            }
        };
        Ok(Response {
            jsonrpc: wire.jsonrpc,
            id: wire.id,
            outcome,
        })
    }
}

/// Push-only event envelope. No id, no response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Event {
    pub event: String,
    pub data: Box<RawValue>,
}

impl Event {
    pub fn new<T: Serialize>(event: impl Into<String>, data: &T) -> Result<Self> {
        let event = event.into();
        let data = serde_json::value::to_raw_value(data)
            .map_err(|e| HubError::Internal(format!("event {event} data encode failed: {e}")))?;
        Ok(Self { event, data })
    }
}
