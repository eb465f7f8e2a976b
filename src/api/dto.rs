//! Wire types shared by the server and the widget client.

use std::collections::HashMap;

use axum::{
    Form,
    body::Bytes,
    extract::{FromRequest, Request},
    http::header,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::ApiError;
use crate::model::{InventoryRecord, Slots};

/// Body of `POST /api/config`.
#[derive(Debug, Deserialize)]
pub struct ConfigRequest {
    #[serde(rename = "widgetID", default, deserialize_with = "widget_id")]
    pub widget_id: Option<String>,
    #[serde(rename = "vagasTotais", default, deserialize_with = "slots")]
    pub total: Slots,
    #[serde(rename = "vendasReais", default, deserialize_with = "slots")]
    pub sold: Slots,
}

/// Reads JSON or form-encoded bodies. An empty body is an empty object, so a
/// request without fields reaches the widget id check.
impl<S: Send + Sync> FromRequest<S> for ConfigRequest {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

        let fields = if is_form {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            Value::Object(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, Value::String(value)))
                    .collect(),
            )
        } else {
            let bytes = Bytes::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            if bytes.iter().all(u8::is_ascii_whitespace) {
                Value::Object(Map::new())
            } else {
                serde_json::from_slice(&bytes)
                    .map_err(|e| ApiError::bad_request(format!("malformed JSON body: {e}")))?
            }
        };

        serde_json::from_value(fields)
            .map_err(|e| ApiError::bad_request(format!("invalid config body: {e}")))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigResponse {
    pub message: String,
    pub data: InventoryRecord,
}

/// Body of a successful `GET /api/status/{widgetID}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(rename = "vagasRestantes")]
    pub remaining: Slots,
    #[serde(rename = "vagasTotais")]
    pub total: Slots,
    #[serde(rename = "lastUpdated")]
    pub last_updated: String,
}

/// Coerce a JSON value to a slot count the way `parseInt` would, with
/// anything unparseable mapping to 0.
pub fn coerce_slots(value: &Value) -> Slots {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as Slots))
            .unwrap_or(0),
        Value::String(s) => leading_integer(s),
        _ => 0,
    }
}

/// Parse the optional sign and digits at the start of `s`.
fn leading_integer(s: &str) -> Slots {
    let s = s.trim_start();
    let sign_len = usize::from(s.starts_with(['+', '-']));
    let digits = s[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    let end = sign_len + digits;
    if digits == 0 {
        return 0;
    }
    s[..end].parse().unwrap_or_else(|_| {
        // saturate on overflow
        if s.starts_with('-') { Slots::MIN } else { Slots::MAX }
    })
}

fn slots<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Slots, D::Error> {
    Value::deserialize(deserializer).map(|value| coerce_slots(&value))
}

/// Falsy ids (`""`, `0`, `false`, `null`) are missing, as are arrays and
/// objects. Other scalars are stringified.
fn widget_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let id = match Value::deserialize(deserializer)? {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    };
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerces_numbers() {
        assert_eq!(coerce_slots(&json!(42)), 42);
        assert_eq!(coerce_slots(&json!(-3)), -3);
        assert_eq!(coerce_slots(&json!(9.9)), 9);
        assert_eq!(coerce_slots(&json!(-9.9)), -9);
    }

    #[test]
    fn coerces_strings_like_parse_int() {
        assert_eq!(coerce_slots(&json!("100")), 100);
        assert_eq!(coerce_slots(&json!("  12abc")), 12);
        assert_eq!(coerce_slots(&json!("-7")), -7);
        assert_eq!(coerce_slots(&json!("+8")), 8);
        assert_eq!(coerce_slots(&json!("3.75")), 3);
        assert_eq!(coerce_slots(&json!("abc")), 0);
        assert_eq!(coerce_slots(&json!("-")), 0);
        assert_eq!(coerce_slots(&json!("")), 0);
    }

    #[test]
    fn overflowing_strings_saturate() {
        assert_eq!(coerce_slots(&json!("99999999999999999999")), Slots::MAX);
        assert_eq!(coerce_slots(&json!("-99999999999999999999")), Slots::MIN);
    }

    #[test]
    fn non_numeric_values_coerce_to_zero() {
        assert_eq!(coerce_slots(&json!(null)), 0);
        assert_eq!(coerce_slots(&json!(true)), 0);
        assert_eq!(coerce_slots(&json!([1])), 0);
        assert_eq!(coerce_slots(&json!({ "n": 1 })), 0);
    }

    #[test]
    fn config_request_reads_wire_names() {
        let request: ConfigRequest = serde_json::from_value(json!({
            "widgetID": "w1",
            "vagasTotais": "100",
            "vendasReais": 50,
        }))
        .unwrap();

        assert_eq!(request.widget_id.as_deref(), Some("w1"));
        assert_eq!(request.total, 100);
        assert_eq!(request.sold, 50);
    }

    #[test]
    fn config_request_tolerates_missing_fields() {
        let request: ConfigRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(request.widget_id, None);
        assert_eq!(request.total, 0);
        assert_eq!(request.sold, 0);
    }

    #[test]
    fn empty_or_null_widget_id_is_missing() {
        let empty: ConfigRequest = serde_json::from_value(json!({ "widgetID": "" })).unwrap();
        let null: ConfigRequest = serde_json::from_value(json!({ "widgetID": null })).unwrap();
        let numeric: ConfigRequest = serde_json::from_value(json!({ "widgetID": 7 })).unwrap();

        assert_eq!(empty.widget_id, None);
        assert_eq!(null.widget_id, None);
        assert_eq!(numeric.widget_id.as_deref(), Some("7"));
    }

    #[test]
    fn falsy_widget_ids_are_missing() {
        for id in [json!(0), json!(0.0), json!(-0.0), json!(false), json!(null), json!("")] {
            let request: ConfigRequest =
                serde_json::from_value(json!({ "widgetID": id.clone() })).unwrap();
            assert_eq!(request.widget_id, None, "widgetID {id}");
        }

        let truthy: ConfigRequest = serde_json::from_value(json!({ "widgetID": true })).unwrap();
        assert_eq!(truthy.widget_id.as_deref(), Some("true"));
    }

    #[test]
    fn status_response_uses_wire_names() {
        let response = StatusResponse {
            remaining: 5,
            total: 10,
            last_updated: "2026-01-01T00:00:00.000Z".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "vagasRestantes": 5,
                "vagasTotais": 10,
                "lastUpdated": "2026-01-01T00:00:00.000Z",
            })
        );
    }
}
