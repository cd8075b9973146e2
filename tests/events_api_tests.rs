use afisha::events::api::{APIError, EventRepository, EventsAPI};
use afisha::events::model::EventId;
use afisha::feed::date_key::DateKey;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serves `body` with `status` to every connection and records request lines
async fn serve(status: &'static str, body: &'static str) -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = requests.clone();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };

            let mut buffer = vec![0; 4096];
            let read = socket.read(&mut buffer).await.unwrap_or(0);
            let request = String::from_utf8_lossy(&buffer[..read]);

            if let Some(line) = request.lines().next() {
                recorded.lock().unwrap().push(line.to_string());
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );

            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (base_url, requests)
}

fn date() -> DateKey {
    DateKey::from_ymd(2025, 3, 10).unwrap()
}

#[test_log::test(tokio::test)]
async fn should_fetch_events_by_date() {
    let (base_url, requests) = serve(
        "200 OK",
        r##"[{"event_id": 1, "date": "2025-03-10T12:00:00", "price": 0, "title": "Expo", "category_name": "выставка", "location_name": "Манеж", "img_path": "expo.jpg"}]"##,
    )
    .await;

    let events = EventsAPI::new(&base_url, 0)
        .fetch_events_by_date(date())
        .await
        .unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].title, "Expo");
    assert!(events[0].is_free());
    assert_eq!(
        requests.lock().unwrap().first().map(String::as_str),
        Some("GET /api/v1/events/by-date?search_date=2025-03-10 HTTP/1.1")
    );
}

#[test_log::test(tokio::test)]
async fn non_success_status_should_be_rejected() {
    let (base_url, _) = serve("404 Not Found", r##"{"detail": "Not Found"}"##).await;

    let result = EventsAPI::new(&base_url, 0)
        .fetch_events_by_date(date())
        .await;

    assert_eq!(result, Err(APIError::Status(404)));
}

#[test_log::test(tokio::test)]
async fn malformed_payload_should_be_rejected() {
    let (base_url, _) = serve("200 OK", r##"{"events": "#, "##).await;

    let result = EventsAPI::new(&base_url, 0)
        .fetch_events_by_date(date())
        .await;

    assert!(matches!(result, Err(APIError::InvalidResponse(_))), "{:?}", result);
}

#[test_log::test(tokio::test)]
async fn unreachable_server_should_be_a_network_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let result = EventsAPI::new(&base_url, 0)
        .fetch_events_by_date(date())
        .await;

    assert!(
        result.as_ref().is_err_and(APIError::is_network_failure),
        "{:?}",
        result
    );
}

#[test_log::test(tokio::test)]
async fn should_fetch_event_details() {
    let (base_url, requests) = serve(
        "200 OK",
        r##"{"event_id": 17, "title": "Expo", "description": "<b>Большая</b> выставка", "images": ["1.jpg", "2.jpg"]}"##,
    )
    .await;

    let details = EventsAPI::new(&base_url, 0)
        .fetch_event_details(EventId(17), date())
        .await
        .unwrap();

    assert_eq!(details.description, "Большая выставка");
    assert_eq!(details.images.len(), 2);
    assert_eq!(
        details.images[0].url(&base_url),
        format!("{}/static/images/1.jpg", base_url)
    );
    assert_eq!(
        requests.lock().unwrap().first().map(String::as_str),
        Some("GET /api/v1/events/17?search_date=2025-03-10 HTTP/1.1")
    );
}
