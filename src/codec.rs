//! Envelope codec: request bodies out, `data`/`errors` envelopes in.
//!
//! Stateless. The client uses [`encode`] and [`decode`]; [`decode_request`] is the
//! server-side inverse of [`encode`], handy for mock endpoints.

use crate::graphql::GraphQlErrors;
use crate::request::Request;
use crate::{Error, Result};
use bytes::Bytes;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::ser::Error as _;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Media type sent as both `Content-Type` and `Accept`.
pub const JSON_MEDIA_TYPE: &str = "application/json; charset=utf-8";

#[derive(Serialize)]
struct WireRequest<'a> {
    query: &'a str,
    variables: &'a Map<String, Value>,
}

#[derive(Deserialize)]
struct OwnedWireRequest {
    query: String,
    #[serde(default)]
    variables: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
#[serde(bound = "T: DeserializeOwned")]
struct Envelope<T> {
    #[serde(default)]
    data: Option<T>,
    #[serde(default)]
    errors: Option<GraphQlErrors>,
}

/// Serialize a request as `{"query": ..., "variables": {...}}`.
///
/// `variables` is always present; it is an empty object when none were set. A variable
/// that was set to a value with no JSON form fails the whole encoding.
pub fn encode(request: &Request) -> Result<Bytes> {
    if let Some((key, reason)) = request.rejected_variable() {
        return Err(Error::Encoding(serde_json::Error::custom(format!(
            "variable {:?}: {}",
            key, reason
        ))));
    }
    let empty = Map::new();
    let body = WireRequest {
        query: request.query(),
        variables: request.variables().unwrap_or(&empty),
    };
    serde_json::to_vec(&body)
        .map(Bytes::from)
        .map_err(Error::Encoding)
}

/// Decode a response envelope.
///
/// When `holder` is given and the envelope carries a non-null `data`, the holder is
/// overwritten with the decoded payload, even if `errors` is non-empty. Without a holder
/// the payload is parsed and discarded. Only the first JSON value in `body` is read.
pub fn decode<T>(body: &[u8], holder: Option<&mut T>) -> Result<GraphQlErrors>
where
    T: DeserializeOwned,
{
    match holder {
        Some(holder) => {
            let envelope: Envelope<T> = read_first_value(body)?;
            if let Some(data) = envelope.data {
                *holder = data;
            }
            Ok(envelope.errors.unwrap_or_default())
        }
        None => {
            let envelope: Envelope<IgnoredAny> = read_first_value(body)?;
            Ok(envelope.errors.unwrap_or_default())
        }
    }
}

/// Decode a request body produced by [`encode`].
///
/// An empty `variables` object maps back to a request with no variables set.
pub fn decode_request(body: &[u8]) -> Result<Request> {
    let wire: OwnedWireRequest = read_first_value(body)?;
    let variables = wire.variables.filter(|vars| !vars.is_empty());
    Ok(Request::from_parts(wire.query, variables))
}

fn read_first_value<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let mut de = serde_json::Deserializer::from_slice(body);
    T::deserialize(&mut de).map_err(Error::Decoding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Payload {
        test: String,
    }

    #[test]
    fn encode_without_variables_fills_empty_object() {
        let body = encode(&Request::new("query { test }")).unwrap();
        let v: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(v, json!({"query": "query { test }", "variables": {}}));
    }

    #[test]
    fn encode_carries_variables() {
        let req = Request::builder("query($id: ID!) { node(id: $id) { id } }")
            .variable("id", "abc")
            .variable("nested", json!({"list": [1, 2.5, null, "x"]}))
            .header("X-Not-In-Body", "1")
            .build();
        let v: Value = serde_json::from_slice(&encode(&req).unwrap()).unwrap();
        assert_eq!(v["variables"]["id"], json!("abc"));
        assert_eq!(v["variables"]["nested"]["list"], json!([1, 2.5, null, "x"]));
        assert_eq!(v.as_object().unwrap().len(), 2);
    }

    #[test]
    fn encode_fails_on_non_finite_variable() {
        let mut req = Request::new("q");
        req.set_variable("ok", 1);
        req.set_variable("x", f64::NAN);

        let err = encode(&req).unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));
        assert_eq!(
            err.to_string(),
            "encode body: variable \"x\": unsupported value: NaN"
        );
    }

    #[test]
    fn request_round_trips_through_codec() {
        let mut req = Request::new("mutation { save }");
        req.set_variable("flag", true);
        req.set_variable("count", 3);

        let decoded = decode_request(&encode(&req).unwrap()).unwrap();
        assert_eq!(decoded.query(), req.query());
        assert_eq!(decoded.variables(), req.variables());

        let bare = decode_request(&encode(&Request::new("q")).unwrap()).unwrap();
        assert!(bare.variables().is_none());
    }

    #[test]
    fn decode_fills_holder() {
        let mut out = Payload::default();
        let errors = decode(br#"{"data":{"test":"value in response"}}"#, Some(&mut out)).unwrap();
        assert!(errors.is_empty());
        assert_eq!(out.test, "value in response");
    }

    #[test]
    fn decode_partial_data_with_errors() {
        let body = br#"{"data":{"test":"partial"},"errors":[{"message":"first"},{"message":"second"}]}"#;
        let mut out = Payload::default();
        let errors = decode(body, Some(&mut out)).unwrap();
        assert_eq!(out.test, "partial");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].message, "first");
        assert_eq!(errors[1].message, "second");
    }

    #[test]
    fn decode_without_holder_discards_payload() {
        let errors = decode::<Value>(br#"{"data":{"anything":[1,2,3]}}"#, None).unwrap();
        assert!(errors.is_empty());
    }

    #[test]
    fn decode_tolerates_missing_fields() {
        let mut out = Payload {
            test: "untouched".into(),
        };
        assert!(decode(b"{}", Some(&mut out)).unwrap().is_empty());
        assert!(decode(br#"{"data":null,"errors":null}"#, Some(&mut out))
            .unwrap()
            .is_empty());
        assert_eq!(out.test, "untouched");
    }

    #[test]
    fn decode_tolerates_null_optional_error_fields() {
        let body = br#"{"errors":[{"message":"x","locations":null,"path":null,"extensions":null}]}"#;
        let errors = decode::<Value>(body, None).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "x");
        assert!(errors[0].locations.is_empty());
        assert!(errors[0].path.is_empty());
        assert!(errors[0].extensions.is_empty());
    }

    #[test]
    fn decode_ignores_trailing_bytes() {
        let errors = decode::<Value>(b"{\"errors\":[{\"message\":\"x\"}]}\ngarbage", None).unwrap();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn decode_empty_body_is_eof() {
        let err = decode::<Value>(b"", None).unwrap_err();
        assert!(matches!(err, Error::Decoding(_)));
        assert!(err.to_string().starts_with("decoding response: EOF"));
    }

    #[test]
    fn decode_type_mismatch_is_decoding_error() {
        let mut out = Payload::default();
        let err = decode(br#"{"data":{"test":42}}"#, Some(&mut out)).unwrap_err();
        assert!(matches!(err, Error::Decoding(_)));
    }
}
