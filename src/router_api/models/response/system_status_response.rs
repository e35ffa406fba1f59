use crate::router_api::models::signal_strength::{SignalReading, SignalStrength};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

/// Reply to `GetSystemStatus`.
///
/// The body must be a JSON object; arrays and scalars fail the decode. Members
/// with an unexpected shape are treated as missing.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(try_from = "Value")]
pub struct SystemStatusResponse {
    pub result: Option<SystemStatus>,
    pub error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct ResponseMembers {
    #[serde(default, deserialize_with = "lenient_object")]
    result: Option<SystemStatus>,
    #[serde(default, deserialize_with = "lenient_object")]
    error: Option<JsonRpcError>,
}

impl TryFrom<Value> for SystemStatusResponse {
    type Error = serde_json::Error;

    fn try_from(body: Value) -> Result<Self, Self::Error> {
        let kind = match &body {
            Value::Object(_) => {
                let ResponseMembers { result, error } = serde_json::from_value(body)?;
                return Ok(Self { result, error });
            }
            Value::Array(_) => "an array",
            Value::Null => "null",
            Value::Bool(_) => "a boolean",
            Value::Number(_) => "a number",
            Value::String(_) => "a string",
        };
        Err(serde::de::Error::custom(format!(
            "expected a JSON object, found {}",
            kind
        )))
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct SystemStatus {
    #[serde(rename = "SignalStrength", default, deserialize_with = "lenient")]
    pub signal_strength: Option<SignalStrength>,
    #[serde(rename = "NetworkName", default, deserialize_with = "lenient")]
    pub network_name: Option<String>,
    #[serde(rename = "NetworkType", default, deserialize_with = "lenient")]
    pub network_type: Option<i64>,
    #[serde(rename = "ConnectionStatus", default, deserialize_with = "lenient")]
    pub connection_status: Option<i64>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct JsonRpcError {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

impl SystemStatusResponse {
    pub fn reading(&self) -> SignalReading {
        SignalReading(
            self.result
                .as_ref()
                .and_then(|status| status.signal_strength.clone()),
        )
    }
}

/// Accepts only JSON objects; serde would otherwise fill structs from arrays by position.
fn lenient_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(value @ Value::Object(_)) => Ok(decode_or_warn(value)),
        Some(other) => {
            warn!("Ignoring non-object member in router reply: {}", other);
            Ok(None)
        }
        None => Ok(None),
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(decode_or_warn))
}

fn decode_or_warn<T: DeserializeOwned>(value: Value) -> Option<T> {
    match serde_json::from_value(value.clone()) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            warn!("Ignoring unexpected value {} in router reply: {}", value, e);
            None
        }
    }
}
