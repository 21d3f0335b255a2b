//! Response envelope decoding
//!
//! The backend wraps most collections in `{"success", "message", "data"}` but
//! the collection sits at a different place per endpoint, and a few endpoints
//! return a bare array. [`CollectionShape`] names where to look;
//! [`decode_collection`] turns a body into items, an application-level
//! failure, or a [`DecodeError`] for malformed payloads.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Where the collection lives inside a response body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionShape {
    /// The body itself is the array
    Bare,
    /// `data` is the array
    Data,
    /// `data.<field>` is the array
    DataField(&'static str),
}

/// A well-formed body: either the collection or a backend-flagged failure
#[derive(Debug, Clone, PartialEq)]
pub enum Payload<T> {
    Items(Vec<T>),
    Failure(String),
}

/// The body could not be interpreted as the expected collection
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("response body is empty or not JSON")]
    MissingBody,

    #[error("expected an array at `{location}`")]
    NotAnArray { location: String },

    #[error("missing `{location}` in response")]
    Missing { location: String },

    #[error("invalid item in collection: {0}")]
    Item(#[from] serde_json::Error),
}

const DEFAULT_FAILURE_MESSAGE: &str = "request failed";

/// Decode a collection from a successful (2xx) response body
pub fn decode_collection<T: DeserializeOwned>(
    body: Option<&Value>,
    shape: CollectionShape,
) -> Result<Payload<T>, DecodeError> {
    let body = body.ok_or(DecodeError::MissingBody)?;

    if shape != CollectionShape::Bare {
        if let Some(false) = body.get("success").and_then(Value::as_bool) {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .unwrap_or(DEFAULT_FAILURE_MESSAGE);
            return Ok(Payload::Failure(message.to_string()));
        }
    }

    let (collection, location) = match shape {
        CollectionShape::Bare => (Some(body), "$".to_string()),
        CollectionShape::Data => (body.get("data"), "data".to_string()),
        CollectionShape::DataField(field) => (
            body.get("data").and_then(|data| data.get(field)),
            format!("data.{field}"),
        ),
    };

    match collection {
        None => Err(DecodeError::Missing { location }),
        // An explicit null collection means "nothing to show"
        Some(Value::Null) => Ok(Payload::Items(Vec::new())),
        Some(value @ Value::Array(_)) => {
            let items = Vec::<T>::deserialize(value)?;
            Ok(Payload::Items(items))
        }
        Some(_) => Err(DecodeError::NotAnArray { location }),
    }
}

/// Best-effort human message for a non-2xx response
///
/// Prefers FastAPI's `detail`, then the envelope's `message`.
pub fn error_message(status: u16, body: Option<&Value>) -> String {
    let from_body = body.and_then(|b| {
        b.get("detail")
            .and_then(Value::as_str)
            .or_else(|| b.get("message").and_then(Value::as_str))
    });
    match from_body {
        Some(message) if !message.is_empty() => format!("HTTP {status}: {message}"),
        _ => format!("HTTP {status}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: i64,
        name: String,
    }

    #[test]
    fn test_decode_data_field() {
        let body = json!({
            "success": true,
            "message": "获取科室列表成功",
            "data": {
                "departments": [{"id": 1, "name": "内科"}, {"id": 2, "name": "外科"}],
                "hospital_id": 7
            }
        });
        let payload: Payload<Item> =
            decode_collection(Some(&body), CollectionShape::DataField("departments")).unwrap();
        assert_eq!(
            payload,
            Payload::Items(vec![
                Item { id: 1, name: "内科".into() },
                Item { id: 2, name: "外科".into() },
            ])
        );
    }

    #[test]
    fn test_decode_data_array() {
        let body = json!({"success": true, "data": [{"id": 3, "name": "a"}], "total": 1});
        let payload: Payload<Item> = decode_collection(Some(&body), CollectionShape::Data).unwrap();
        assert!(matches!(payload, Payload::Items(ref items) if items.len() == 1));
    }

    #[test]
    fn test_decode_bare_array() {
        let body = json!([{"id": 1, "name": "x"}]);
        let payload: Payload<Item> = decode_collection(Some(&body), CollectionShape::Bare).unwrap();
        assert!(matches!(payload, Payload::Items(ref items) if items[0].id == 1));
    }

    #[test]
    fn test_success_false_is_failure() {
        let body = json!({"success": false, "message": "用户不存在", "data": null});
        let payload: Payload<Item> = decode_collection(Some(&body), CollectionShape::Data).unwrap();
        assert_eq!(payload, Payload::Failure("用户不存在".into()));
    }

    #[test]
    fn test_success_false_without_message() {
        let body = json!({"success": false});
        let payload: Payload<Item> = decode_collection(Some(&body), CollectionShape::Data).unwrap();
        assert_eq!(payload, Payload::Failure(DEFAULT_FAILURE_MESSAGE.into()));
    }

    #[test]
    fn test_null_collection_is_empty() {
        let body = json!({"success": true, "data": {"doctors": null}});
        let payload: Payload<Item> =
            decode_collection(Some(&body), CollectionShape::DataField("doctors")).unwrap();
        assert_eq!(payload, Payload::Items(vec![]));
    }

    #[test]
    fn test_missing_data_is_malformed() {
        let body = json!({"success": true, "message": "ok"});
        let err = decode_collection::<Item>(Some(&body), CollectionShape::DataField("doctors"))
            .unwrap_err();
        assert!(matches!(err, DecodeError::Missing { ref location } if location == "data.doctors"));
    }

    #[test]
    fn test_object_instead_of_array_is_malformed() {
        let body = json!({"data": {"doctors": {"id": 1}}});
        let err = decode_collection::<Item>(Some(&body), CollectionShape::DataField("doctors"))
            .unwrap_err();
        assert!(matches!(err, DecodeError::NotAnArray { .. }));
    }

    #[test]
    fn test_bad_item_is_malformed() {
        let body = json!([{"id": "not-a-number", "name": "x"}]);
        let err = decode_collection::<Item>(Some(&body), CollectionShape::Bare).unwrap_err();
        assert!(matches!(err, DecodeError::Item(_)));
    }

    #[test]
    fn test_missing_body() {
        let err = decode_collection::<Item>(None, CollectionShape::Bare).unwrap_err();
        assert!(matches!(err, DecodeError::MissingBody));
    }

    #[test]
    fn test_error_message_prefers_detail() {
        let body = json!({"detail": "医院不存在"});
        assert_eq!(error_message(404, Some(&body)), "HTTP 404: 医院不存在");
        assert_eq!(error_message(502, None), "HTTP 502");
    }
}
