//! Submit, poll and aggregate flows against an in-process pool

use crate::common::{fake_service, local_service, mount_clean_checker, mount_page, FakePool};
use serde_json::json;
use sitelint::{JobError, TaskState};
use std::sync::Arc;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_link_extraction_end_to_end() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/blog",
        r#"<html><body>
            <a href="/a">A</a>
            <a>no href</a>
            <a href="http://ext.com/b">B</a>
        </body></html>"#,
    )
    .await;

    let (service, _store) = local_service(&server.uri());
    let report = service
        .extract_links(&format!("{}/blog", server.uri()))
        .await
        .unwrap();

    assert_eq!(report.status, TaskState::Finished);
    assert_eq!(report.size, 2);

    // Newest first, so document order comes back reversed
    let links: Vec<(&str, &str)> = report
        .results
        .iter()
        .map(|l| (l.text.as_str(), l.url.as_str()))
        .collect();
    let expected_a = format!("{}/a", server.uri());
    assert_eq!(links, vec![("B", "http://ext.com/b"), ("A", expected_a.as_str())]);
    assert!(report.results.iter().all(|l| l.job_id == report.job_id));
}

#[tokio::test]
async fn test_grammar_error_on_second_line() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/page",
        "<html><title></title>\n<p>This are bad</p>",
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/v2/check"))
        .and(body_string_contains("text=This+are+bad"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "matches": [{
                "message": "The verb 'are' does not agree with 'This'.",
                "sentence": "This are bad",
                "offset": 5,
                "length": 3,
                "replacements": [
                    {"value": "is"}, {"value": "was"}, {"value": "were"},
                    {"value": "be"}, {"value": "seems"}, {"value": "looks"}
                ]
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (service, _store) = local_service(&server.uri());
    let report = service
        .check_page(&format!("{}/page", server.uri()), None)
        .await
        .unwrap();

    assert_eq!(report.size, 1);
    let error = &report.results[0];
    assert_eq!(error.error_line_number, 2);
    assert_eq!(error.error_term, "are");
    assert_eq!(error.error_sentence, "This are bad");
    assert_eq!(error.possible_corrections, vec!["is", "was", "were", "be", "seems"]);
    assert_eq!(error.page_url, format!("{}/page", server.uri()));
}

#[tokio::test]
async fn test_clean_page_has_empty_report() {
    let server = MockServer::start().await;
    mount_page(&server, "/clean", "<p>All good here.</p>\n<p>Nothing to see.</p>").await;
    mount_clean_checker(&server).await;

    let (service, _store) = local_service(&server.uri());
    let report = service
        .check_page(&format!("{}/clean", server.uri()), Some("en-us"))
        .await
        .unwrap();

    assert_eq!(report.status, TaskState::Finished);
    assert_eq!(report.size, 0);
    let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(value["results"], json!([]));
    assert_eq!(value["size"], 0);
}

#[tokio::test]
async fn test_report_serialization_is_repeatable() {
    let server = MockServer::start().await;
    mount_page(&server, "/p", r#"<a href="/1">one</a><a href="/2">two</a>"#).await;

    let (service, _store) = local_service(&server.uri());
    let report = service
        .extract_links(&format!("{}/p", server.uri()))
        .await
        .unwrap();

    let first = service
        .aggregator()
        .link_report(report.job_id, TaskState::Finished)
        .unwrap()
        .to_json()
        .unwrap();
    let second = service
        .aggregator()
        .link_report(report.job_id, TaskState::Finished)
        .unwrap()
        .to_json()
        .unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_unfetchable_page_is_worker_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (service, _store) = local_service(&server.uri());
    let result = service
        .check_page(&format!("{}/gone", server.uri()), None)
        .await;

    match result {
        Err(JobError::WorkerFailure { job_id, .. }) => {
            let report = service
                .aggregator()
                .error_report(job_id, TaskState::Failed)
                .unwrap();
            assert_eq!(report.status, TaskState::Failed);
            assert_eq!(report.size, 0);
        }
        other => panic!("expected worker failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_concurrent_jobs_stay_separate() {
    let server = MockServer::start().await;
    mount_page(&server, "/one", r#"<a href="/x">x</a>"#).await;
    mount_page(&server, "/two", r#"<a href="/y">y</a><a href="/z">z</a>"#).await;

    let (service, _store) = local_service(&server.uri());
    let one_url = format!("{}/one", server.uri());
    let two_url = format!("{}/two", server.uri());
    let (one, two) = tokio::join!(service.extract_links(&one_url), service.extract_links(&two_url));
    let (one, two) = (one.unwrap(), two.unwrap());

    assert_ne!(one.job_id, two.job_id);
    assert_eq!(one.size, 1);
    assert_eq!(two.size, 2);
}

#[tokio::test]
async fn test_decoupled_link_flow() {
    let server = MockServer::start().await;
    mount_page(&server, "/page", r#"<a href="/only">Only</a>"#).await;

    let (service, _store) = local_service(&server.uri());
    let submission = service
        .submit_links(&format!("{}/page", server.uri()))
        .await
        .unwrap();

    let mut report = service
        .link_results(&submission.handle, submission.job_id)
        .await
        .unwrap();
    for _ in 0..200 {
        if report.is_ready() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        report = service
            .link_results(&submission.handle, submission.job_id)
            .await
            .unwrap();
    }

    assert_eq!(report.status, TaskState::Finished);
    assert_eq!(report.results[0].text, "Only");
}

#[tokio::test]
async fn test_missing_url_dispatches_nothing() {
    let pool = Arc::new(FakePool::reporting("finished"));
    let (service, _store) = fake_service(pool.clone());

    let result = service.check_page("", None).await;

    assert!(matches!(result, Err(JobError::InvalidParameters(_))));
    assert_eq!(pool.scheduled_count(), 0);
}

#[tokio::test]
async fn test_unreachable_pool() {
    let (service, _store) = fake_service(Arc::new(FakePool::unreachable()));

    let result = service.extract_links("http://x.com/").await;

    assert!(matches!(result, Err(JobError::DispatchUnavailable(_))));
}

#[tokio::test]
async fn test_discarded_task_is_unknown() {
    let (service, _store) = fake_service(Arc::new(FakePool::reporting("")));

    let result = service.check_page("http://x.com/", None).await;

    assert!(matches!(result, Err(JobError::UnknownTask { task_id }) if task_id == "fake-1"));
}

#[tokio::test]
async fn test_stuck_task_times_out() {
    let (service, _store) = fake_service(Arc::new(FakePool::reporting("running")));

    let result = service.check_page("http://x.com/", None).await;

    assert!(matches!(result, Err(JobError::PollTimeout { .. })));
}
