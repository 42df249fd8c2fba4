#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::time::Duration;

use rpchub_core::error::HubError;
use rpchub_gateway::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
gateway:
  listen: "0.0.0.0:8080"
hub:
  outbound_queu: 16 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert!(matches!(err, HubError::Config(_)), "got {err:?}");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.gateway.ws_path, "/v1/ws");
    assert_eq!(cfg.gateway.rpc_path, "/v1/rpc");
    assert_eq!(cfg.hub.tick_interval_ms, 0);
    assert!(!cfg.docs.enabled);

    let s = cfg.hub.settings();
    assert_eq!(s.outbound_queue, 256);
    assert_eq!(s.event_buffer, 1024);
    assert_eq!(s.handler_timeout, Duration::from_secs(30));
    assert_eq!(s.max_body_bytes, 1024 * 1024);
    assert!(!s.ordered_dispatch);
}

#[test]
fn overrides_are_applied() {
    let ok = r#"
version: 1
gateway:
  listen: "127.0.0.1:9000"
  ws_path: "/ws"
  rpc_path: "/rpc"
hub:
  outbound_queue: 8
  handler_timeout_ms: 250
  ordered_dispatch: true
  tick_interval_ms: 500
docs:
  enabled: true
  output: "out/catalog.json"
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    let s = cfg.hub.settings();
    assert_eq!(s.outbound_queue, 8);
    assert_eq!(s.handler_timeout, Duration::from_millis(250));
    assert!(s.ordered_dispatch);
    assert_eq!(cfg.docs.output, "out/catalog.json");
}

#[test]
fn unsupported_version_fails() {
    assert!(config::load_from_str("version: 2\n").is_err());
}

#[test]
fn out_of_range_values_fail() {
    for bad in [
        "version: 1\nhub:\n  outbound_queue: 0\n",
        "version: 1\nhub:\n  handler_timeout_ms: 5\n",
        "version: 1\nhub:\n  ping_interval_ms: 20000\n  idle_timeout_ms: 20000\n",
        "version: 1\nhub:\n  tick_interval_ms: 10\n",
        "version: 1\ngateway:\n  ws_path: \"/same\"\n  rpc_path: \"/same\"\n",
        "version: 1\ngateway:\n  ws_path: \"ws\"\n",
    ] {
        let err = config::load_from_str(bad).expect_err(bad);
        assert!(matches!(err, HubError::Config(_)), "{bad}: got {err:?}");
    }
}

#[test]
fn missing_file_is_config_error() {
    let err = config::load_from_file("/definitely/not/here.yaml").expect_err("must fail");
    assert!(err.to_string().contains("read config"));
}
