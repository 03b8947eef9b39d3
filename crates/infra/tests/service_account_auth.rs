//! Service-account token exchange against a mocked OAuth endpoint.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::TimeZone;
use chrono_tz::Europe::Paris;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use rendezvous_core::FreeBusyProvider;
use rendezvous_domain::{RendezvousError, TimeInterval};
use rendezvous_infra::{
    AccessTokenProvider, GoogleCalendarAdapter, HttpClient, ServiceAccountKey,
    ServiceAccountTokenProvider,
};
use serde::Deserialize;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CLIENT_EMAIL: &str = "scheduler@rendezvous-tests.iam.gserviceaccount.com";

#[derive(Debug, Deserialize)]
struct Claims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn provider(server: &MockServer) -> ServiceAccountTokenProvider {
    let mut key = ServiceAccountKey::from_file(&fixture("service_account.json")).unwrap();
    key.token_uri = format!("{}/token", server.uri());
    ServiceAccountTokenProvider::new(key, HttpClient::new().unwrap()).unwrap()
}

async fn mount_token_endpoint(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains(
            "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29.fresh",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn assertion_from(body: &[u8]) -> String {
    let form = String::from_utf8(body.to_vec()).unwrap();
    let raw = form
        .split('&')
        .find_map(|pair| pair.strip_prefix("assertion="))
        .expect("assertion field");
    urlencoding::decode(raw).unwrap().into_owned()
}

#[tokio::test]
async fn exchanges_signed_assertion_for_access_token() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;

    let provider = provider(&server);
    assert_eq!(provider.client_email(), CLIENT_EMAIL);
    assert_eq!(provider.access_token().await.unwrap(), "ya29.fresh");

    let received = server.received_requests().await.unwrap();
    let assertion = assertion_from(&received[0].body);

    let header = decode_header(&assertion).unwrap();
    assert_eq!(header.alg, Algorithm::RS256);
    assert_eq!(header.kid.as_deref(), Some("test-key-1"));

    let public_pem = std::fs::read(fixture("service_account_public.pem")).unwrap();
    let token_uri = format!("{}/token", server.uri());
    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&[token_uri.as_str()]);
    validation.set_issuer(&[CLIENT_EMAIL]);

    let claims = decode::<Claims>(
        &assertion,
        &DecodingKey::from_rsa_pem(&public_pem).unwrap(),
        &validation,
    )
    .unwrap()
    .claims;

    assert_eq!(claims.iss, CLIENT_EMAIL);
    assert_eq!(claims.aud, token_uri);
    assert_eq!(claims.scope, "https://www.googleapis.com/auth/calendar");
    assert_eq!(claims.exp - claims.iat, 3600);
}

#[tokio::test]
async fn token_is_cached_between_calls() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;

    let provider = provider(&server);
    assert_eq!(provider.access_token().await.unwrap(), "ya29.fresh");
    assert_eq!(provider.access_token().await.unwrap(), "ya29.fresh");
}

#[tokio::test]
async fn custom_scope_is_signed_into_assertion() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;

    let provider =
        provider(&server).with_scope("https://www.googleapis.com/auth/calendar.events");
    provider.access_token().await.unwrap();

    let received = server.received_requests().await.unwrap();
    let assertion = assertion_from(&received[0].body);

    let public_pem = std::fs::read(fixture("service_account_public.pem")).unwrap();
    let mut validation = Validation::new(Algorithm::RS256);
    validation.validate_aud = false;
    let claims = decode::<Claims>(
        &assertion,
        &DecodingKey::from_rsa_pem(&public_pem).unwrap(),
        &validation,
    )
    .unwrap()
    .claims;
    assert_eq!(claims.scope, "https://www.googleapis.com/auth/calendar.events");
}

#[tokio::test]
async fn rejected_grant_is_permission_denied() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid JWT Signature."
        })))
        .mount(&server)
        .await;

    let err = provider(&server).access_token().await.unwrap_err();
    match err {
        RendezvousError::PermissionDenied(msg) => assert!(msg.contains("invalid_grant")),
        other => panic!("expected permission error, got {other:?}"),
    }
}

#[tokio::test]
async fn token_endpoint_outage_is_transient() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = provider(&server).access_token().await.unwrap_err();
    assert!(matches!(err, RendezvousError::Transient(_)));
}

#[tokio::test]
async fn adapter_sends_exchanged_token() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/calendar/v3/freeBusy"))
        .and(header("authorization", "Bearer ya29.fresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "calendars": { "primary": { "busy": [] } } })),
        )
        .expect(2)
        .mount(&server)
        .await;

    let adapter = GoogleCalendarAdapter::new(
        HttpClient::new().unwrap(),
        Arc::new(provider(&server)),
        "primary",
        Paris,
    )
    .with_base_url(format!("{}/calendar/v3", server.uri()));

    let start = Paris.with_ymd_and_hms(2024, 1, 11, 14, 30, 0).unwrap();
    let interval = TimeInterval::starting_at(start, chrono::Duration::minutes(30)).unwrap();

    assert!(adapter.busy_blocks(&interval).await.unwrap().is_empty());
    assert!(adapter.busy_blocks(&interval).await.unwrap().is_empty());
}
