use serde::Serialize;
use serde_json::Value;

use super::error::{CodecError, RemoteError};

/// A JSON-RPC 2.0 request envelope.
///
/// Built fresh for every call with a client-scoped monotonic id. `params`
/// passes through structurally: absent, a positional array, or a keyed
/// object.
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl RpcRequest {
    pub fn new(version: &str, id: u64, method: &str, params: Option<Value>) -> Self {
        Self {
            jsonrpc: version.to_string(),
            id,
            method: method.to_string(),
            params,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(self)
            .map_err(|e| CodecError::Malformed(format!("request encoding failed: {e}")))
    }
}

/// A decoded JSON-RPC response: exactly one of result or error.
#[derive(Debug)]
pub struct RpcResponse {
    /// Echoed request id, kept for order-sanity checking.
    pub id: Option<Value>,
    pub payload: RpcPayload,
}

#[derive(Debug)]
pub enum RpcPayload {
    /// Opaque result document; `null` is a valid result.
    Result(Value),
    /// Protocol-level error object reported by the server.
    Error(RemoteError),
}

/// Decodes response bytes into an [`RpcResponse`].
///
/// A `null` `error` member counts as absent (servers routinely emit
/// `"error": null` next to a result). Bytes that are not JSON, not an
/// object, or carry neither member fail with [`CodecError::Malformed`].
pub fn decode_response(bytes: &[u8]) -> Result<RpcResponse, CodecError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| CodecError::Malformed(format!("invalid JSON: {e}")))?;

    let Value::Object(map) = value else {
        return Err(CodecError::Malformed("response is not a JSON object".to_string()));
    };

    let id = map.get("id").cloned();

    if let Some(error) = map.get("error").filter(|v| !v.is_null()) {
        let remote: RemoteError = serde_json::from_value(error.clone())
            .map_err(|e| CodecError::Malformed(format!("unparseable error member: {e}")))?;
        return Ok(RpcResponse {
            id,
            payload: RpcPayload::Error(remote),
        });
    }

    match map.get("result") {
        Some(result) => Ok(RpcResponse {
            id,
            payload: RpcPayload::Result(result.clone()),
        }),
        None => Err(CodecError::Malformed(
            "response carries neither result nor error".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_encodes_envelope_fields() {
        let request = RpcRequest::new(
            "2.0",
            7,
            "Users.get",
            Some(json!({"query": {"limit": 10}})),
        );
        let bytes = request.to_bytes().unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["id"], 7);
        assert_eq!(value["method"], "Users.get");
        assert_eq!(value["params"]["query"]["limit"], 10);
    }

    #[test]
    fn absent_params_are_omitted_from_the_wire() {
        let bytes = RpcRequest::new("2.0", 1, "Server.getInfo", None)
            .to_bytes()
            .unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(value.get("params").is_none());
    }

    #[test]
    fn positional_params_pass_through() {
        let bytes = RpcRequest::new("2.0", 2, "Math.add", Some(json!([1, 2, 3])))
            .to_bytes()
            .unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["params"], json!([1, 2, 3]));
    }

    #[test]
    fn result_payload_is_returned_unmodified() {
        let result = json!({
            "serverInfo": {"product": "Directory", "version": "1.0"},
            "counters": [1, 2, {"nested": null}],
        });
        let body = json!({"jsonrpc": "2.0", "id": 1, "result": result}).to_string();

        let response = decode_response(body.as_bytes()).unwrap();

        match response.payload {
            RpcPayload::Result(value) => assert_eq!(value, result),
            RpcPayload::Error(e) => panic!("unexpected error: {e}"),
        }
    }

    #[test]
    fn null_result_is_a_valid_result() {
        let response = decode_response(br#"{"jsonrpc":"2.0","id":1,"result":null}"#).unwrap();
        assert!(matches!(response.payload, RpcPayload::Result(Value::Null)));
    }

    #[test]
    fn error_member_decodes_to_remote_error() {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 3,
            "error": {"code": 1002, "message": "Access denied.", "data": {"detail": "x"}},
        })
        .to_string();

        let response = decode_response(body.as_bytes()).unwrap();

        match response.payload {
            RpcPayload::Error(remote) => {
                assert_eq!(remote.code, 1002);
                assert_eq!(remote.message, "Access denied.");
                assert_eq!(remote.data, Some(json!({"detail": "x"})));
            }
            RpcPayload::Result(v) => panic!("unexpected result: {v}"),
        }
    }

    #[test]
    fn null_error_member_counts_as_absent() {
        let response =
            decode_response(br#"{"jsonrpc":"2.0","id":1,"result":42,"error":null}"#).unwrap();
        match response.payload {
            RpcPayload::Result(value) => assert_eq!(value, json!(42)),
            RpcPayload::Error(e) => panic!("unexpected error: {e}"),
        }
    }

    #[test]
    fn missing_both_members_is_malformed() {
        let err = decode_response(br#"{"jsonrpc":"2.0","id":1}"#).unwrap_err();
        assert!(matches!(err, CodecError::Malformed(_)));
    }

    #[test]
    fn invalid_json_is_malformed() {
        assert!(matches!(
            decode_response(b"<html>504</html>"),
            Err(CodecError::Malformed(_))
        ));
    }

    #[test]
    fn non_object_response_is_malformed() {
        assert!(matches!(
            decode_response(b"[1,2,3]"),
            Err(CodecError::Malformed(_))
        ));
    }
}
