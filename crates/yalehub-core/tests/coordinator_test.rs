#![allow(clippy::unwrap_used, clippy::float_cmp)]
// Integration tests for `Coordinator` against a wiremock Yale cloud.

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use yalehub_api::{ArmStatus, Credentials};
use yalehub_core::{
    ConnectionState, ContactState, Coordinator, DoorState, LockReading, LockState, PanelConfig,
    RefreshError, SmokeState,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn config(server: &MockServer) -> PanelConfig {
    PanelConfig {
        timeout: Duration::from_secs(5),
        poll_interval_secs: 1,
        ..PanelConfig::new(
            format!("{}/yapi", server.uri()).parse().unwrap(),
            "user@example.com",
            SecretString::from("secret".to_string()),
        )
    }
}

fn ok(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "result": true,
        "message": "OK!",
        "data": data,
    }))
}

async fn mount_token(server: &MockServer, expected_logins: u64) {
    Mock::given(method("POST"))
        .and(path("/yapi/o/token/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "token-abc",
            "token_type": "Bearer",
            "expires_in": 36000
        })))
        .expect(expected_logins)
        .mount(server)
        .await;
}

async fn mount_panel(server: &MockServer) {
    let routes = [
        ("/yapi/api/panel/mode/", json!([{ "area": "1", "mode": "home" }])),
        (
            "/yapi/api/panel/cycle/",
            json!({
                "device_status": [
                    {
                        "type": "device_type.door_lock", "area": "1", "no": "1",
                        "address": "RF:01", "name": "Front door",
                        "status1": "device_status.lock", "minigw_lock_status": "00"
                    },
                    {
                        "type": "device_type.door_contact", "area": "1", "no": "2",
                        "address": "RF:02", "name": "Back door",
                        "status1": "device_status.dc_open"
                    },
                    {
                        "type": "device_type.temperature_sensor", "area": "1", "no": "3",
                        "address": "RF:03", "name": "Lounge",
                        "status1": "", "status_temp": "21.5"
                    },
                    {
                        "type": "device_type.smoke_detector", "area": "2", "no": "4",
                        "address": "RF:04", "name": "Hallway", "status1": ""
                    },
                    {
                        "type": "device_type.pir", "area": "1", "no": "5",
                        "address": "RF:05", "name": "Landing", "status1": ""
                    }
                ]
            }),
        ),
        ("/yapi/api/panel/status/", json!({ "acfail": "main.normal" })),
        ("/yapi/api/panel/online/", json!("online")),
        ("/yapi/api/panel/info/", json!({ "mac": "00:11:22:33:44:55" })),
        (
            "/yapi/api/event/report/",
            json!([
                {
                    "time": "2024/06/15 10:29:00", "type": "device_type.smoke_detector",
                    "area": "2", "event_type": "1111"
                }
            ]),
        ),
        ("/yapi/api/auth/check/", json!({ "token_time": "2024-06-15 10:30:00" })),
    ];

    for (route, data) in routes {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ok(data))
            .mount(server)
            .await;
    }
}

// ── Refresh tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_refresh_publishes_snapshot() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    mount_panel(&server).await;

    let coordinator = Coordinator::new(config(&server));
    assert!(coordinator.snapshot().is_none());

    let snapshot = coordinator.refresh().await.unwrap();

    assert_eq!(snapshot.arm_status, ArmStatus::Home);
    assert!(snapshot.is_online());
    assert_eq!(snapshot.device_count(), 4);
    assert_eq!(
        coordinator.lock_state("RF:01"),
        Some(LockReading {
            state: LockState::Locked,
            secondary: Some(DoorState::Unknown),
        })
    );
    assert_eq!(coordinator.contact_state("RF:02"), Some(ContactState::Open));
    assert_eq!(coordinator.temperature("RF:03"), Some(21.5));
    assert_eq!(coordinator.smoke_state("RF:04"), Some(SmokeState::On));
    assert!(coordinator.lock_state("RF:05").is_none());
    assert_eq!(coordinator.locks().len(), 1);
    assert_eq!(coordinator.contacts()[0].device.name.as_deref(), Some("Back door"));
    assert_eq!(
        *coordinator.connection_state().borrow(),
        ConnectionState::Connected
    );
}

#[tokio::test]
async fn test_subscribers_see_new_snapshot() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    mount_panel(&server).await;

    let coordinator = Coordinator::new(config(&server));
    let mut rx = coordinator.subscribe();

    coordinator.refresh().await.unwrap();

    assert!(rx.has_changed().unwrap());
    let seen = rx.borrow_and_update().clone().unwrap();
    assert_eq!(seen.temperature("RF:03"), Some(21.5));
}

#[tokio::test]
async fn test_login_reused_across_refreshes() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    mount_panel(&server).await;

    let coordinator = Coordinator::new(config(&server));
    let first = coordinator.refresh().await.unwrap();
    let second = coordinator.refresh().await.unwrap();

    assert_eq!(*first, *second);
}

#[tokio::test]
async fn test_reauthenticate_forces_new_login() {
    let server = MockServer::start().await;
    mount_token(&server, 2).await;
    mount_panel(&server).await;

    let coordinator = Coordinator::new(config(&server));
    coordinator.refresh().await.unwrap();

    let credentials = Credentials {
        username: "user@example.com".into(),
        password: SecretString::from("rotated".to_string()),
        client_token: None,
    };
    coordinator.reauthenticate(Some(credentials)).await.unwrap();
    coordinator.refresh().await.unwrap();
}

// ── Failure tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_rejected_login_is_auth_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/yapi/o/token/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": "invalid_grant" })))
        .mount(&server)
        .await;

    let coordinator = Coordinator::new(config(&server));
    let err = coordinator.refresh().await.unwrap_err();

    assert!(matches!(err, RefreshError::AuthFailure { .. }));
    assert!(coordinator.snapshot().is_none());
    assert_eq!(
        *coordinator.connection_state().borrow(),
        ConnectionState::AuthFailed
    );
}

#[tokio::test]
async fn test_expired_token_logs_in_again() {
    let server = MockServer::start().await;
    mount_token(&server, 2).await;
    mount_panel(&server).await;

    let coordinator = Coordinator::new(config(&server));
    coordinator.refresh().await.unwrap();

    Mock::given(method("GET"))
        .and(path("/yapi/api/panel/mode/"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;

    let snapshot = coordinator.refresh().await.unwrap();

    assert_eq!(snapshot.arm_status, ArmStatus::Home);
    assert_eq!(
        *coordinator.connection_state().borrow(),
        ConnectionState::Connected
    );
}

#[tokio::test]
async fn test_refused_relogin_is_auth_failure() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    mount_panel(&server).await;

    let coordinator = Coordinator::new(config(&server));
    let published = coordinator.refresh().await.unwrap();

    server.reset().await;
    Mock::given(method("POST"))
        .and(path("/yapi/o/token/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "error": "invalid_grant" })))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = coordinator.refresh().await.unwrap_err();
    assert!(matches!(err, RefreshError::AuthFailure { .. }));
    assert_eq!(
        *coordinator.connection_state().borrow(),
        ConnectionState::AuthFailed
    );
    assert_eq!(*coordinator.snapshot().unwrap(), *published);

    // The rejected session was dropped, so the next cycle tries to log in.
    let err = coordinator.refresh().await.unwrap_err();
    assert!(err.requires_reauth());
}

#[tokio::test]
async fn test_fresh_session_rejected_is_auth_failure() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let coordinator = Coordinator::new(config(&server));
    let err = coordinator.refresh().await.unwrap_err();

    assert!(matches!(err, RefreshError::AuthFailure { .. }));
}

#[tokio::test]
async fn test_server_error_keeps_previous_snapshot() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    mount_panel(&server).await;

    let coordinator = Coordinator::new(config(&server));
    let published = coordinator.refresh().await.unwrap();

    server.reset().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let err = coordinator.refresh().await.unwrap_err();
    assert!(matches!(err, RefreshError::TransientFailure { .. }));
    assert!(err.is_retryable());

    let retained = coordinator.snapshot().unwrap();
    assert_eq!(*retained, *published);
    assert_eq!(
        *coordinator.connection_state().borrow(),
        ConnectionState::Degraded {
            consecutive_failures: 1
        }
    );

    coordinator.refresh().await.unwrap_err();
    assert_eq!(
        *coordinator.connection_state().borrow(),
        ConnectionState::Degraded {
            consecutive_failures: 2
        }
    );
}

#[tokio::test]
async fn test_request_timeout_is_transient() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("GET"))
        .respond_with(ok(json!([])).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let coordinator = Coordinator::new(PanelConfig {
        timeout: Duration::from_millis(200),
        ..config(&server)
    });
    let err = coordinator.refresh().await.unwrap_err();

    match err {
        RefreshError::TransientFailure { ref message } => {
            assert!(message.contains("timed out"), "unexpected message: {message}");
        }
        other => panic!("expected TransientFailure, got: {other:?}"),
    }
    assert_eq!(
        *coordinator.connection_state().borrow(),
        ConnectionState::Degraded {
            consecutive_failures: 1
        }
    );
}

#[tokio::test]
async fn test_envelope_rejection_is_transient() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": false,
            "message": "panel offline",
            "data": null
        })))
        .mount(&server)
        .await;

    let coordinator = Coordinator::new(config(&server));
    let err = coordinator.refresh().await.unwrap_err();

    assert!(matches!(err, RefreshError::TransientFailure { .. }));
    assert!(coordinator.snapshot().is_none());
}

// ── Poll loop tests ─────────────────────────────────────────────────

#[tokio::test]
async fn test_start_and_stop() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    mount_panel(&server).await;

    let coordinator = Coordinator::new(config(&server));
    coordinator.start().await.unwrap();

    assert!(coordinator.snapshot().is_some());
    assert!(coordinator.is_polling().await);

    coordinator.stop().await;

    assert!(!coordinator.is_polling().await);
    assert_eq!(
        *coordinator.connection_state().borrow(),
        ConnectionState::Stopped
    );
}

#[tokio::test]
async fn test_start_with_rejected_login_does_not_poll() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/yapi/o/token/"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let coordinator = Coordinator::new(config(&server));
    let err = coordinator.start().await.unwrap_err();

    assert!(err.requires_reauth());
    assert!(!coordinator.is_polling().await);
}

#[tokio::test]
async fn test_reauthenticate_resumes_polling_after_auth_failure() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    mount_panel(&server).await;

    let coordinator = Coordinator::new(config(&server));
    let mut state = coordinator.connection_state();
    coordinator.start().await.unwrap();

    server.reset().await;
    Mock::given(method("POST"))
        .and(path("/yapi/o/token/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    tokio::time::timeout(
        Duration::from_secs(5),
        state.wait_for(|s| *s == ConnectionState::AuthFailed),
    )
    .await
    .unwrap()
    .unwrap();
    tokio::time::timeout(Duration::from_secs(5), async {
        while coordinator.is_polling().await {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .unwrap();

    server.reset().await;
    mount_token(&server, 1).await;
    mount_panel(&server).await;

    coordinator.reauthenticate(None).await.unwrap();

    assert!(coordinator.is_polling().await);
    assert_eq!(
        *coordinator.connection_state().borrow(),
        ConnectionState::Connected
    );

    coordinator.stop().await;
    assert!(!coordinator.is_polling().await);
}
