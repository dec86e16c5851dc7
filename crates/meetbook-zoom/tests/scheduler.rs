//! End-to-end scheduler tests against a mock Zoom API.

use chrono::{NaiveDate, TimeZone, Utc};
use meetbook_core::MeetingRequest;
use meetbook_zoom::{BookingOutcome, Stage, ZoomAccount, ZoomConfig, ZoomError, ZoomScheduler};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn account(name: &str) -> ZoomAccount {
    ZoomAccount::new(
        format!("{name}@example.com"),
        format!("id-{name}"),
        "secret",
        format!("acc-{name}"),
    )
}

fn scheduler_for(server: &MockServer, accounts: Vec<ZoomAccount>) -> ZoomScheduler {
    let config = ZoomConfig::new(accounts)
        .with_api_base(format!("{}/v2", server.uri()))
        .with_token_url(format!("{}/oauth/token", server.uri()));
    ZoomScheduler::new(config).expect("valid config")
}

/// Mounts a token exchange answering only for the given account id.
async fn mount_token(server: &MockServer, name: &str) {
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains(format!("acc-{name}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": format!("tok-{name}"),
            "expires_in": 3600,
        })))
        .mount(server)
        .await;
}

async fn mount_meeting_list(server: &MockServer, name: &str, meetings: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/v2/users/{name}@example.com/meetings")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "meetings": meetings })),
        )
        .mount(server)
        .await;
}

fn request_at_ten() -> MeetingRequest {
    MeetingRequest::new(
        "Team Sync",
        Utc.with_ymd_and_hms(2030, 5, 20, 10, 0, 0).unwrap(),
        60,
    )
}

fn requested_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 5, 20).unwrap()
}

#[tokio::test]
async fn books_on_a_free_account() {
    let server = MockServer::start().await;
    mount_token(&server, "a").await;
    mount_meeting_list(&server, "a", json!([])).await;
    Mock::given(method("POST"))
        .and(path("/v2/users/a@example.com/meetings"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 123456789u64,
            "topic": "Team Sync",
            "join_url": "https://zoom.us/j/123456789",
            "host_email": "a@example.com",
        })))
        .mount(&server)
        .await;

    let scheduler = scheduler_for(&server, vec![account("a")]);
    let outcome = scheduler
        .book_meeting(&request_at_ten(), requested_date())
        .await
        .expect("booking");

    let booked = outcome.booked().expect("should be booked");
    assert_eq!(booked.account, "a@example.com");
    assert_eq!(booked.details.id, 123456789);
    assert_eq!(booked.details.join_url, "https://zoom.us/j/123456789");
}

#[tokio::test]
async fn token_is_exchanged_once_and_cached() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-a",
            "expires_in": 3600,
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_meeting_list(&server, "a", json!([])).await;
    Mock::given(method("POST"))
        .and(path("/v2/users/a@example.com/meetings"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 1u64,
            "topic": "x",
            "join_url": "https://zoom.us/j/1",
        })))
        .mount(&server)
        .await;

    let scheduler = scheduler_for(&server, vec![account("a")]);
    for _ in 0..2 {
        let outcome = scheduler
            .book_meeting(&request_at_ten(), requested_date())
            .await
            .expect("booking");
        assert!(outcome.booked().is_some());
    }
    // The expect(1) on the token mock verifies the cache on drop.
}

#[tokio::test]
async fn first_fit_skips_the_busy_account() {
    let server = MockServer::start().await;
    mount_token(&server, "a").await;
    mount_token(&server, "b").await;
    // Account a hosts a meeting half an hour into the requested slot.
    mount_meeting_list(
        &server,
        "a",
        json!([{ "start_time": "2030-05-20T10:30:00Z", "duration": 30 }]),
    )
    .await;
    mount_meeting_list(&server, "b", json!([])).await;
    Mock::given(method("POST"))
        .and(path("/v2/users/a@example.com/meetings"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/users/b@example.com/meetings"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 42u64,
            "topic": "Team Sync",
            "join_url": "https://zoom.us/j/42",
        })))
        .mount(&server)
        .await;

    let scheduler = scheduler_for(&server, vec![account("a"), account("b")]);
    let outcome = scheduler
        .book_meeting(&request_at_ten(), requested_date())
        .await
        .expect("booking");

    assert_eq!(outcome.booked().expect("booked").account, "b@example.com");
}

#[tokio::test]
async fn rejected_creation_falls_through_to_the_next_account() {
    let server = MockServer::start().await;
    mount_token(&server, "a").await;
    mount_token(&server, "b").await;
    mount_meeting_list(&server, "a", json!([])).await;
    mount_meeting_list(&server, "b", json!([])).await;
    Mock::given(method("POST"))
        .and(path("/v2/users/a@example.com/meetings"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "message": "no dice" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/users/b@example.com/meetings"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 7u64,
            "topic": "Team Sync",
            "join_url": "https://zoom.us/j/7",
        })))
        .mount(&server)
        .await;

    let scheduler = scheduler_for(&server, vec![account("a"), account("b")]);
    let outcome = scheduler
        .book_meeting(&request_at_ten(), requested_date())
        .await
        .expect("booking");

    assert_eq!(outcome.booked().expect("booked").account, "b@example.com");
}

#[tokio::test]
async fn exhausted_pool_reports_diagnostics_and_alternatives() {
    let server = MockServer::start().await;
    mount_token(&server, "a").await;
    // One standing meeting at 10:00 for an hour blocks the morning slots.
    mount_meeting_list(
        &server,
        "a",
        json!([{ "start_time": "2030-05-20T10:00:00Z", "duration": 60 }]),
    )
    .await;

    let scheduler = scheduler_for(&server, vec![account("a")]);
    let outcome = scheduler
        .book_meeting(&request_at_ten(), requested_date())
        .await
        .expect("booking");

    let BookingOutcome::Unavailable {
        alternatives,
        diagnostics,
    } = outcome
    else {
        panic!("expected unavailable outcome");
    };

    assert_eq!(diagnostics.len(), 1);
    let failure = diagnostics.iter().next().expect("one failure");
    assert_eq!(failure.account, "a@example.com");
    assert_eq!(failure.stage, Stage::Availability);

    // The padded window blocks every slot from 09:00 through 11:30; the rest
    // of the day stays open.
    assert_eq!(alternatives.first().map(String::as_str), Some("12:00"));
    assert_eq!(alternatives.last().map(String::as_str), Some("21:30"));
    assert_eq!(alternatives.len(), 20);
}

#[tokio::test]
async fn failed_token_exchange_is_diagnosed_not_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
        .mount(&server)
        .await;

    let scheduler = scheduler_for(&server, vec![account("a")]);
    let outcome = scheduler
        .book_meeting(&request_at_ten(), requested_date())
        .await
        .expect("pool exhaustion is not an error");

    let BookingOutcome::Unavailable { diagnostics, .. } = outcome else {
        panic!("expected unavailable outcome");
    };
    // One failure from the booking walk plus the grid scan finding nothing.
    assert!(diagnostics.iter().any(|f| f.stage == Stage::Token));
}

#[tokio::test]
async fn delete_probes_accounts_until_one_owns_the_meeting() {
    let server = MockServer::start().await;
    mount_token(&server, "a").await;
    mount_token(&server, "b").await;
    Mock::given(method("DELETE"))
        .and(path("/v2/meetings/123456789"))
        .and(header("authorization", "Bearer tok-a"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v2/meetings/123456789"))
        .and(header("authorization", "Bearer tok-b"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let scheduler = scheduler_for(&server, vec![account("a"), account("b")]);
    let owner = scheduler
        .delete_meeting("https://us04web.zoom.us/j/123456789?pwd=abc")
        .await
        .expect("delete");

    assert_eq!(owner, "b@example.com");
}

#[tokio::test]
async fn delete_fails_when_no_account_owns_the_meeting() {
    let server = MockServer::start().await;
    mount_token(&server, "a").await;
    Mock::given(method("DELETE"))
        .and(path("/v2/meetings/123456789"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let scheduler = scheduler_for(&server, vec![account("a")]);
    let err = scheduler
        .delete_meeting("https://zoom.us/j/123456789")
        .await
        .expect_err("nothing to delete");

    match err {
        ZoomError::AllAccountsFailed(diag) => {
            assert_eq!(diag.len(), 1);
            assert!(diag.to_string().contains("meeting not owned"));
        }
        other => panic!("unexpected error: {other}"),
    }
}
