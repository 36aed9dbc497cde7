use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pickup_watcher::fetcher::AvailabilityFetcher;
use pickup_watcher::plugins::notifiers::{Credential, LineNotifier};
use pickup_watcher::{Monitor, MonitorSettings, TracingSink, WatchList};

use super::*;

const FULFILLMENT_PATH: &str = "/tw/shop/fulfillment-messages";
const NOTIFY_PATH: &str = "/api/notify";

fn fetcher(server: &MockServer, timeout: Duration) -> AvailabilityFetcher {
    let endpoint = format!("{}{}", server.uri(), FULFILLMENT_PATH);
    AvailabilityFetcher::with_timeout(endpoint, "R713", timeout).unwrap()
}

fn notifier(server: &MockServer) -> LineNotifier {
    LineNotifier::with_endpoint(
        format!("{}{}", server.uri(), NOTIFY_PATH),
        Credential::new("integration-token").unwrap(),
    )
}

async fn mount_availability(server: &MockServer, code: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(FULFILLMENT_PATH))
        .and(query_param("parts.0", code))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn notify_requests(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == NOTIFY_PATH)
        .count()
}

#[tokio::test]
async fn test_watch_session_against_mock_services() {
    let server = MockServer::start().await;
    mount_availability(
        &server,
        "A/A",
        ResponseTemplate::new(200).set_body_json(available_payload("A/A", "Taipei 101")),
    )
    .await;
    mount_availability(
        &server,
        "B/A",
        ResponseTemplate::new(200).set_body_json(unavailable_payload("B/A")),
    )
    .await;
    Mock::given(method("POST"))
        .and(path(NOTIFY_PATH))
        .and(header("authorization", "Bearer integration-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": 200, "message": "ok"})),
        )
        .mount(&server)
        .await;

    let monitor = Monitor::new(
        shared(fetcher(&server, Duration::from_secs(5))),
        shared(notifier(&server)),
        shared(TracingSink),
        MonitorSettings::default(),
    );
    let server = &server;
    let handle = monitor.spawn(WatchList::new(vec![phone("A/A", "Black"), phone("B/A", "Blue")]));

    let delivered = wait_for_condition(
        move || async move { notify_requests(server).await >= 2 },
        5,
    )
    .await;
    assert!(delivered, "expected the session start and in-stock notifications");

    let stats = handle.stop().await.unwrap();
    assert_eq!(stats.passes, 1);
    assert_eq!(stats.in_stock, 1);
    assert_eq!(stats.notifications_sent, 2);

    let requests = server.received_requests().await.unwrap();
    let bodies: Vec<String> = requests
        .iter()
        .filter(|request| request.url.path() == NOTIFY_PATH)
        .map(|request| String::from_utf8_lossy(&request.body).to_string())
        .collect();
    assert!(bodies[0].starts_with("message=Watcher+started"));
    assert!(bodies[1].contains("Taipei+101"));
}

#[tokio::test]
async fn test_rejected_notifications_are_counted_and_skipped() {
    let server = MockServer::start().await;
    for code in ["A/A", "B/A"] {
        mount_availability(
            &server,
            code,
            ResponseTemplate::new(200).set_body_json(available_payload(code, "Xinyi A13")),
        )
        .await;
    }
    Mock::given(method("POST"))
        .and(path(NOTIFY_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let monitor = Monitor::new(
        shared(fetcher(&server, Duration::from_secs(5))),
        shared(notifier(&server)),
        shared(TracingSink),
        MonitorSettings::default(),
    );
    let server = &server;
    let handle = monitor.spawn(WatchList::new(vec![phone("A/A", "Black"), phone("B/A", "Blue")]));

    let attempted = wait_for_condition(
        move || async move { notify_requests(server).await >= 3 },
        5,
    )
    .await;
    assert!(attempted);

    let stats = handle.stop().await.unwrap();
    assert_eq!(stats.passes, 1);
    assert_eq!(stats.checks, 2);
    assert_eq!(stats.in_stock, 2);
    assert_eq!(stats.notifications_sent, 0);
    assert_eq!(stats.notifications_failed, 3);
}

#[tokio::test]
async fn test_timed_out_fetch_does_not_block_other_models() {
    let server = MockServer::start().await;
    mount_availability(
        &server,
        "A/A",
        ResponseTemplate::new(200)
            .set_body_json(available_payload("A/A", "Taipei 101"))
            .set_delay(Duration::from_secs(3)),
    )
    .await;
    mount_availability(
        &server,
        "B/A",
        ResponseTemplate::new(200).set_body_json(available_payload("B/A", "Xinyi A13")),
    )
    .await;
    Mock::given(method("POST"))
        .and(path(NOTIFY_PATH))
        .and(body_string_contains("message="))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let monitor = Monitor::new(
        shared(fetcher(&server, Duration::from_millis(500))),
        shared(notifier(&server)),
        shared(TracingSink),
        MonitorSettings::default(),
    );
    let server = &server;
    let handle = monitor.spawn(WatchList::new(vec![phone("A/A", "Black"), phone("B/A", "Blue")]));

    let notified = wait_for_condition(
        move || async move { notify_requests(server).await >= 2 },
        5,
    )
    .await;
    assert!(notified);

    let stats = handle.stop().await.unwrap();
    assert_eq!(stats.fetch_failures, 1);
    assert_eq!(stats.in_stock, 1);
    assert_eq!(stats.notifications_sent, 2);
}
