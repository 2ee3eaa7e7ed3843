//! Encode/decode entry points for the wire payloads.
//!
//! Both directions are pure functions over byte slices so they can be called
//! concurrently from any number of sessions. A frame that fails to decode is
//! reported with its raw text attached; the session turns that into a
//! terminal failure rather than a crash.

use crate::api::{ChatChunk, ChatRequest};
use crate::error::SparkError;

/// Serialize an outbound request to its single wire frame.
pub fn encode(request: &ChatRequest) -> Result<Vec<u8>, SparkError> {
    serde_json::to_vec(request).map_err(SparkError::Serialization)
}

/// Deserialize one inbound frame into a typed chunk.
pub fn decode(frame: &[u8]) -> Result<ChatChunk, SparkError> {
    let text = String::from_utf8_lossy(frame);
    serde_json::from_str(&text).map_err(|err| SparkError::Protocol {
        code: None,
        message: format!("failed to decode chunk: {err}"),
        raw: Some(text.into_owned()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{
        ChatMessage, ChatParameter, MessageBlock, RequestHeader, RequestParameter, RequestPayload,
        Role,
    };
    use serde_json::{json, Value};

    fn simple_request(temperature: Option<f32>, max_tokens: Option<u32>) -> ChatRequest {
        ChatRequest {
            header: RequestHeader {
                app_id: Some("771fe687".to_string()),
                uid: Some("1".to_string()),
            },
            parameter: RequestParameter {
                chat: ChatParameter {
                    domain: "generalv3.5".to_string(),
                    temperature,
                    max_tokens,
                },
            },
            payload: RequestPayload {
                message: MessageBlock {
                    text: vec![ChatMessage::user("hello")],
                },
                functions: None,
            },
        }
    }

    #[test]
    fn encode_emits_exact_request_shape() {
        let bytes = encode(&simple_request(Some(0.5), Some(1024))).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(
            value,
            json!({
                "header": {"app_id": "771fe687", "uid": "1"},
                "parameter": {"chat": {
                    "domain": "generalv3.5",
                    "temperature": 0.5,
                    "max_tokens": 1024
                }},
                "payload": {"message": {"text": [
                    {"content": "hello", "role": "user"}
                ]}}
            })
        );
    }

    #[test]
    fn encode_omits_unset_fields() {
        let bytes = encode(&simple_request(None, None)).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();

        let chat = &value["parameter"]["chat"];
        assert!(chat.get("temperature").is_none());
        assert!(chat.get("max_tokens").is_none());
        assert!(value["payload"].get("functions").is_none());
        assert_eq!(chat["domain"], "generalv3.5");
    }

    #[test]
    fn decode_reads_a_full_chunk() {
        let frame = json!({
            "header": {"code": 0, "sid": "cht000b2e1d@dx18", "status": 1},
            "payload": {
                "choices": {
                    "status": 2,
                    "seq": 4,
                    "text": [{"content": "done", "role": "assistant", "index": 0}]
                },
                "usage": {"text": {
                    "question_tokens": 2,
                    "prompt_tokens": 6,
                    "completion_tokens": 40,
                    "total_tokens": 46
                }}
            }
        });
        let chunk = decode(frame.to_string().as_bytes()).unwrap();

        assert_eq!(chunk.header.code, 0);
        assert_eq!(chunk.header.sid, "cht000b2e1d@dx18");
        let payload = chunk.payload.unwrap();
        assert!(payload.choices.is_terminal());
        assert_eq!(payload.choices.seq, 4);
        assert_eq!(payload.choices.text[0].content, "done");
        assert_eq!(payload.choices.text[0].role, Some(Role::Assistant));
        assert_eq!(payload.usage.unwrap().text.total_tokens, 46);
    }

    #[test]
    fn decode_ignores_unknown_fields_at_any_level() {
        let bare = json!({
            "header": {"code": 0, "sid": "s", "status": 1},
            "payload": {"choices": {"status": 0, "seq": 0, "text": [{"content": "hi"}]}}
        });
        let mut extended = bare.clone();
        extended["trace_id"] = json!("abc123");
        extended["header"]["region"] = json!("cn-east");
        extended["payload"]["choices"]["text"][0]["confidence"] = json!(0.99);

        let plain = decode(bare.to_string().as_bytes()).unwrap();
        let tolerant = decode(extended.to_string().as_bytes()).unwrap();

        let plain_choices = plain.payload.unwrap().choices;
        let tolerant_choices = tolerant.payload.unwrap().choices;
        assert_eq!(plain_choices.seq, tolerant_choices.seq);
        assert_eq!(plain_choices.status, tolerant_choices.status);
        assert_eq!(plain_choices.text[0].content, tolerant_choices.text[0].content);
    }

    #[test]
    fn decode_preserves_unrecognized_roles() {
        let frame = json!({
            "header": {"code": 0, "sid": "s", "status": 1},
            "payload": {"choices": {
                "status": 1,
                "seq": 1,
                "text": [{"content": "x", "role": "tool", "index": 0}]
            }}
        });
        let chunk = decode(frame.to_string().as_bytes()).unwrap();

        let text = &chunk.payload.unwrap().choices.text[0];
        assert_eq!(text.role, Some(Role::Other("tool".to_string())));
    }

    #[test]
    fn decode_failure_keeps_the_raw_frame() {
        let err = decode(b"{\"header\": nonsense").unwrap_err();
        match err {
            SparkError::Protocol { code, raw, .. } => {
                assert_eq!(code, None);
                assert_eq!(raw.as_deref(), Some("{\"header\": nonsense"));
            }
            other => panic!("expected protocol error, got {other:?}"),
        }
    }

    #[test]
    fn role_serializes_as_plain_strings() {
        assert_eq!(serde_json::to_value(Role::System).unwrap(), json!("system"));
        assert_eq!(serde_json::to_value(Role::User).unwrap(), json!("user"));
        assert_eq!(
            serde_json::to_value(Role::Other("observer".to_string())).unwrap(),
            json!("observer")
        );
    }
}
