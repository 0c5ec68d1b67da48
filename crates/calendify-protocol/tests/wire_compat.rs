// Wire format checks. Clients depend on these shapes.

use calendify_core::CalendifyError;
use calendify_protocol::frames::{EventFrame, InboundFrame, ResFrame};
use calendify_protocol::handshake::{AuthPayload, ConnectParams, HelloOk};
use calendify_protocol::methods;

#[test]
fn req_frame_round_trip() {
    let json = r#"{"type":"req","id":"abc-123","method":"schedules.getById","params":{"id":"s-1"}}"#;
    let frame: InboundFrame = serde_json::from_str(json).unwrap();
    assert_eq!(frame.frame_type, "req");

    let req = frame.into_req().unwrap();
    assert_eq!(req.method, methods::SCHEDULES_GET_BY_ID);
    assert_eq!(req.id, "abc-123");
    assert_eq!(req.params.unwrap()["id"], "s-1");
}

#[test]
fn res_ok_serialization() {
    let res = ResFrame::ok("req-1", serde_json::json!({"pong": true}));
    let json = serde_json::to_string(&res).unwrap();

    assert!(json.contains(r#""type":"res""#));
    assert!(json.contains(r#""ok":true"#));
    assert!(json.contains(r#""pong":true"#));
    // error field must be absent on success
    assert!(!json.contains(r#""error""#));
}

#[test]
fn res_err_serialization() {
    let res = ResFrame::err("req-2", "AUTH_FAILED", "bad token");
    let json = serde_json::to_string(&res).unwrap();

    assert!(json.contains(r#""ok":false"#));
    assert!(json.contains(r#""AUTH_FAILED""#));
    // payload must be absent on error
    assert!(!json.contains(r#""payload""#));
}

#[test]
fn res_from_error_uses_wire_code() {
    let res = ResFrame::from_error("req-3", &CalendifyError::not_found("Store", "st-9"));
    assert!(!res.ok);
    assert_eq!(res.error_code(), Some("NOT_FOUND"));
    assert_eq!(res.error.unwrap().message, "Store not found: st-9");
}

#[test]
fn unencodable_payload_is_a_serialization_error() {
    // JSON object keys must be strings
    let mut by_pair = std::collections::BTreeMap::new();
    by_pair.insert(vec![1u8, 2], "shift");

    let res = ResFrame::ok("req-4", by_pair);
    assert!(!res.ok);
    assert!(res.payload.is_none());
    assert_eq!(res.error_code(), Some("SERIALIZATION_ERROR"));

    let json = serde_json::to_value(&res).unwrap();
    assert_eq!(json["ok"], false);
    assert_eq!(json["id"], "req-4");
}

#[test]
fn event_frame_with_seq() {
    let ev = EventFrame::new("tick", serde_json::json!({"ts": 1234567890})).with_seq(42);
    let json = serde_json::to_string(&ev).unwrap();

    assert!(json.contains(r#""type":"event""#));
    assert!(json.contains(r#""event":"tick""#));
    assert!(json.contains(r#""seq":42"#));
}

#[test]
fn connect_params_token_auth() {
    let json = r#"{"auth":{"mode":"token","token":"secret-123"}}"#;
    let params: ConnectParams = serde_json::from_str(json).unwrap();

    match params.auth {
        AuthPayload::Token { ref token } => assert_eq!(token, "secret-123"),
        _ => panic!("expected token auth"),
    }
}

#[test]
fn connect_params_proxy_and_none_auth() {
    let params: ConnectParams =
        serde_json::from_str(r#"{"auth":{"mode":"trusted-proxy"}}"#).unwrap();
    assert!(matches!(params.auth, AuthPayload::TrustedProxy));

    let params: ConnectParams = serde_json::from_str(r#"{"auth":{"mode":"none"}}"#).unwrap();
    assert!(matches!(params.auth, AuthPayload::None));
}

#[test]
fn hello_ok_is_camel_case() {
    let hello = HelloOk {
        protocol: 1,
        server: calendify_protocol::handshake::ServerInfo {
            name: "calendify".into(),
            version: "0.1.0".into(),
            node_id: "test".into(),
        },
        user_id: "u-1".into(),
        methods: methods::ALL.iter().map(|m| m.to_string()).collect(),
        policy: Default::default(),
    };
    let json = serde_json::to_string(&hello).unwrap();
    assert!(json.contains(r#""protocol":1"#));
    assert!(json.contains(r#""userId":"u-1""#));
    assert!(json.contains(r#""maxMessageSize""#));
    assert!(json.contains(r#""nodeId":"test""#));
}

#[test]
fn inbound_frame_rejects_non_req() {
    let json = r#"{"type":"event","event":"tick","payload":{}}"#;
    let frame: InboundFrame = serde_json::from_str(json).unwrap();
    assert!(frame.into_req().is_none(), "event frame must not parse as req");
}
