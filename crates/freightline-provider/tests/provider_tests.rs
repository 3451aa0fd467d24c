//! Provider boundary tests: wire shapes, URL building, and the event
//! channel contract.

use freightline_provider::*;

fn sample_user() -> ProviderUser {
    serde_json::from_value(serde_json::json!({
        "id": "u1",
        "aud": "authenticated",
        "email": "ana@acme.co",
        "email_confirmed_at": "2026-01-10T12:00:00Z",
        "user_metadata": {"full_name": "Ana Díaz", "onboarding_completed": true},
        "created_at": "2026-01-01T00:00:00Z"
    }))
    .unwrap()
}

// ── Wire shapes ─────────────────────────────────────────────────

#[test]
fn provider_user_parses_the_full_record() {
    let user = sample_user();
    assert_eq!(user.email.as_deref(), Some("ana@acme.co"));
    assert!(user.email_confirmed_at.is_some());
    let metadata = user.user_metadata.unwrap();
    assert_eq!(
        metadata.get("full_name").and_then(|v| v.as_str()),
        Some("Ana Díaz")
    );
}

#[test]
fn session_parses_from_a_token_grant_response() {
    let session: ProviderSession = serde_json::from_value(serde_json::json!({
        "access_token": "tok",
        "token_type": "bearer",
        "expires_in": 3600,
        "expires_at": 1767225600i64,
        "refresh_token": "ref",
        "user": {"id": "u1", "email": "ana@acme.co"}
    }))
    .unwrap();
    assert_eq!(session.access_token, "tok");
    assert_eq!(session.user.id, "u1");
    assert!(session.user.user_metadata.is_none());
}

#[test]
fn session_serde_round_trip_is_verbatim() {
    let session = ProviderSession {
        access_token: "tok".into(),
        token_type: "bearer".into(),
        expires_in: Some(3600),
        expires_at: Some(1_767_225_600),
        refresh_token: None,
        user: sample_user(),
    };
    let raw = serde_json::to_string(&session).unwrap();
    let back: ProviderSession = serde_json::from_str(&raw).unwrap();
    assert_eq!(back, session);
}

#[test]
fn otp_body_carries_the_create_user_flag() {
    let body = OtpBody {
        email: "ana@acme.co".into(),
        create_user: true,
        data: MetadataMap::new(),
    };
    let json = serde_json::to_value(&body).unwrap();
    assert_eq!(json["create_user"], true);
    assert!(json.get("data").is_none());
}

#[test]
fn user_attributes_skip_absent_fields() {
    let attrs = UserAttributes {
        password: Some("nueva-clave-07".into()),
        ..Default::default()
    };
    let json = serde_json::to_value(&attrs).unwrap();
    assert!(json.get("email").is_none());
    assert!(json.get("data").is_none());
    assert_eq!(json["password"], "nueva-clave-07");
}

// ── URL building ────────────────────────────────────────────────

#[test]
fn authorize_url_encodes_every_parameter() {
    let client = ProviderClient::new(ProviderOptions {
        base_url: "https://project.example.co".into(),
        anon_key: "anon".into(),
        ..Default::default()
    });
    let url = client
        .authorize_url(
            OAuthParams::new(OAuthProvider::Github)
                .redirect_to("https://app.freightline.co/dashboard?returnUrl=/fleet")
                .query_param("access_type", "offline"),
        )
        .unwrap();
    assert!(url.contains("provider=github"));
    assert!(url.contains("returnUrl%3D%2Ffleet"));
    assert!(url.contains("access_type=offline"));
}

// ── Events ──────────────────────────────────────────────────────

#[tokio::test]
async fn event_queue_preserves_order_and_payloads() {
    let events = AuthEvents::new();
    let mut rx = events.take_receiver().unwrap();

    events.emit(
        AuthChangeEvent::SignedIn,
        Some(ProviderSession {
            access_token: "tok".into(),
            token_type: "bearer".into(),
            expires_in: None,
            expires_at: None,
            refresh_token: None,
            user: sample_user(),
        }),
    );
    events.emit(AuthChangeEvent::SignedOut, None);

    let first = rx.recv().await.unwrap();
    assert_eq!(first.event, AuthChangeEvent::SignedIn);
    assert_eq!(
        first.session.unwrap().user.email.as_deref(),
        Some("ana@acme.co")
    );

    let second = rx.recv().await.unwrap();
    assert_eq!(second.event, AuthChangeEvent::SignedOut);
    assert!(second.session.is_none());
}

#[test]
fn event_kind_serializes_screaming_snake() {
    let raw = serde_json::to_string(&AuthChangeEvent::InitialSession).unwrap();
    assert_eq!(raw, "\"INITIAL_SESSION\"");
    let raw = serde_json::to_string(&AuthChangeEvent::PasswordRecovery).unwrap();
    assert_eq!(raw, "\"PASSWORD_RECOVERY\"");
}
