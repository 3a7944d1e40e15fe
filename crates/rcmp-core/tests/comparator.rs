use std::time::Duration;

use rcmp_core::compare::{CompareOptions, Comparator, VerdictFailure};
use rcmp_core::config::RoutingConfig;
use rcmp_core::http::HttpClient;
use rcmp_core::query::{Backend, BuiltQuery, QueryBuilder, TimeWindow};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn make_query(server: &MockServer) -> BuiltQuery {
    let window = TimeWindow::ending_at(1_700_000_300, 300).unwrap();
    let builder = QueryBuilder::new(
        &format!("{}/render", server.uri()),
        RoutingConfig::default(),
        window,
    )
    .unwrap();
    builder.build("cpu", "server.*.cpu")
}

fn make_comparator(timeout: Duration) -> Comparator {
    let client = HttpClient::builder().timeout(timeout).build().unwrap();
    Comparator::new(client, CompareOptions::default())
}

async fn mount_backend(server: &MockServer, marker: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/render"))
        .and(query_param("process", marker))
        .and(query_param("target", "server.*.cpu"))
        .and(query_param("format", "json"))
        .respond_with(template)
        .mount(server)
        .await;
}

#[tokio::test]
async fn identical_series_are_equivalent() {
    let server = MockServer::start().await;
    let body = r#"{"series":[1,2,3]}"#;
    mount_backend(&server, "none", ResponseTemplate::new(200).set_body_string(body)).await;
    mount_backend(&server, "any", ResponseTemplate::new(200).set_body_string(body)).await;

    let verdict = make_comparator(Duration::from_secs(5))
        .compare_query(&make_query(&server))
        .await;

    assert!(verdict.equivalent, "unexpected failure: {:?}", verdict.failure);
    assert!(verdict.diff_report.is_none());
}

#[tokio::test]
async fn modified_value_reports_the_changed_index() {
    let server = MockServer::start().await;
    mount_backend(
        &server,
        "none",
        ResponseTemplate::new(200).set_body_string(r#"{"series":[1,2,3]}"#),
    )
    .await;
    mount_backend(
        &server,
        "any",
        ResponseTemplate::new(200).set_body_string(r#"{"series":[1,2,4]}"#),
    )
    .await;

    let verdict = make_comparator(Duration::from_secs(5))
        .compare_query(&make_query(&server))
        .await;

    assert!(!verdict.equivalent);
    assert_eq!(verdict.failure, Some(VerdictFailure::Divergence { changes: 1 }));
    let report = verdict.diff_report.expect("diff should be rendered");
    assert!(report.contains("series"), "report was:\n{report}");
    assert!(report.contains("2: 3 => 4"), "report was:\n{report}");
}

#[tokio::test]
async fn reference_timeout_is_a_transport_failure() {
    let server = MockServer::start().await;
    mount_backend(
        &server,
        "none",
        ResponseTemplate::new(200)
            .set_body_string("[1]")
            .set_delay(Duration::from_millis(1500)),
    )
    .await;
    mount_backend(&server, "any", ResponseTemplate::new(200).set_body_string("[1]")).await;

    let verdict = make_comparator(Duration::from_millis(300))
        .compare_query(&make_query(&server))
        .await;

    assert!(!verdict.equivalent);
    assert!(verdict.diff_report.is_none());
    match verdict.failure {
        Some(VerdictFailure::Transport { errors }) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].backend, Backend::Reference);
            assert_eq!(errors[0].message, "request timed out");
        }
        other => panic!("expected transport failure, got {other:?}"),
    }
}

#[tokio::test]
async fn server_error_status_is_a_transport_failure() {
    let server = MockServer::start().await;
    mount_backend(&server, "none", ResponseTemplate::new(200).set_body_string("[1]")).await;
    mount_backend(
        &server,
        "any",
        ResponseTemplate::new(500).set_body_string("render failed"),
    )
    .await;

    let verdict = make_comparator(Duration::from_secs(5))
        .compare_query(&make_query(&server))
        .await;

    match verdict.failure {
        Some(VerdictFailure::Transport { errors }) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].backend, Backend::Candidate);
            assert!(errors[0].message.starts_with("HTTP 500"));
            assert!(errors[0].message.contains("render failed"));
        }
        other => panic!("expected transport failure, got {other:?}"),
    }
}

#[tokio::test]
async fn invalid_json_is_a_parse_failure_with_bodies() {
    let server = MockServer::start().await;
    mount_backend(&server, "none", ResponseTemplate::new(200).set_body_string("[1]")).await;
    mount_backend(
        &server,
        "any",
        ResponseTemplate::new(200).set_body_string("not json"),
    )
    .await;

    let verdict = make_comparator(Duration::from_secs(5))
        .compare_query(&make_query(&server))
        .await;

    assert!(matches!(verdict.failure, Some(VerdictFailure::Parse { .. })));
    let bodies = verdict.bodies.expect("raw bodies should be attached");
    assert_eq!(bodies.reference, "[1]");
    assert_eq!(bodies.candidate, "not json");
}

#[tokio::test]
async fn compare_by_urls_names_the_verdict() {
    let server = MockServer::start().await;
    let body = r#"{"series":[1,2,3]}"#;
    mount_backend(&server, "none", ResponseTemplate::new(200).set_body_string(body)).await;
    mount_backend(&server, "any", ResponseTemplate::new(200).set_body_string(body)).await;
    let query = make_query(&server);

    let verdict = make_comparator(Duration::from_secs(5))
        .compare("by-url", &query.reference_url, &query.candidate_url)
        .await;

    assert!(verdict.equivalent, "unexpected failure: {:?}", verdict.failure);
    assert_eq!(verdict.name, "by-url");
    assert_eq!(verdict.reference_url, query.reference_url);
    assert_eq!(verdict.candidate_url, query.candidate_url);
}

#[tokio::test]
async fn unreachable_backends_fail_both_sides() {
    let verdict = make_comparator(Duration::from_secs(2))
        .compare(
            "cpu",
            "http://127.0.0.1:9/render?process=none",
            "http://127.0.0.1:9/render?process=any",
        )
        .await;

    match verdict.failure {
        Some(VerdictFailure::Transport { errors }) => assert_eq!(errors.len(), 2),
        other => panic!("expected transport failure, got {other:?}"),
    }
}
