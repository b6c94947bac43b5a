use bibliofetch::domain::{Integrity, RetryOutcome};
use bibliofetch::{AcquisitionError, AcquisitionService, BookRequest, Config};
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// Helper to build a results page with the catalog's table markup
fn results_page(rows: &[(&str, &str, &str, &str)]) -> String {
    let body: String = rows
        .iter()
        .map(|(id, author, title, link)| {
            format!(
                "<tr><td>{id}</td><td><a href=\"search.php?req={author}\">{author}</a></td>\
                 <td><a href=\"book/index.php?md5={id}\" id=\"{id}\">{title}</a></td>\
                 <td>Publisher</td><td>2005</td><td>120</td><td>English</td><td>1 Mb</td><td>pdf</td>\
                 <td><a href=\"{link}\">[1]</a></td><td><a href=\"http://unused\">[2]</a></td></tr>"
            )
        })
        .collect();
    format!(
        "<html><body>\
         <table width=\"100%\" cellspacing=\"1\" cellpadding=\"1\" rules=\"rows\" class=\"c\" align=\"center\">\
         <tr><td>ID</td><td>Author(s)</td><td>Title</td><td>Publisher</td><td>Year</td><td>Pages</td>\
         <td>Language</td><td>Size</td><td>Extension</td><td>Mirrors</td></tr>{body}</table></body></html>"
    )
}

// Helper to create a service pointed at the mock server
fn test_service(server: &MockServer, output_dir: &std::path::Path) -> AcquisitionService {
    let config = Config::default()
        .with_base_url(&server.uri())
        .with_output_dir(output_dir)
        .with_threshold(70);
    AcquisitionService::new(config).expect("Failed to build service")
}

#[tokio::test]
async fn test_art_of_war_end_to_end() {
    let server = MockServer::start().await;
    let out = tempfile::tempdir().expect("Failed to create temp dir");
    let payload = vec![7u8; 4096];
    let link11 = format!("{}/ads.php?md5=11", server.uri());
    let link12 = format!("{}/ads.php?md5=12", server.uri());

    Mock::given(method("GET"))
        .and(path("/search.php"))
        .and(query_param("req", "The Art of War"))
        .respond_with(ResponseTemplate::new(200).set_body_string(results_page(&[
            ("11", "Jamie Oliver", "Cooking for Beginners", link11.as_str()),
            ("12", "Sun Tzu", "The Art of War", link12.as_str()),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/ads.php"))
        .and(query_param("md5", "12"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "<html><body><h2><a href=\"{}/main/12/The%20Art%20of%20War.pdf\">GET</a></h2></body></html>",
            server.uri()
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex("^/main/12/"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(payload.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let service = test_service(&server, out.path());
    let request = BookRequest::new("The Art of War", "Sun Tzu").unwrap();
    let reports = service.acquire_all(&[request], None).await;

    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    match &report.outcome {
        Ok(RetryOutcome::Accepted { records, .. }) => {
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].id, "12");
        }
        other => panic!("expected Accepted, got {:?}", other),
    }

    assert_eq!(report.downloads.len(), 1);
    let outcome = report.downloads[0].result.as_ref().expect("download failed");
    assert_eq!(outcome.bytes_expected, payload.len() as u64);
    assert_eq!(outcome.bytes_written, payload.len() as u64);
    assert_eq!(outcome.integrity, Integrity::Verified);
    assert_eq!(
        outcome.file_path,
        out.path().join("The Art of War").join("The Art of War.pdf")
    );
    assert_eq!(std::fs::read(&outcome.file_path).unwrap(), payload);
}

#[tokio::test]
async fn test_batch_continues_after_failures() {
    let server = MockServer::start().await;
    let out = tempfile::tempdir().expect("Failed to create temp dir");
    let link31 = format!("{}/ads.php?md5=31", server.uri());

    // First book: catalog is down
    Mock::given(method("GET"))
        .and(path("/search.php"))
        .and(query_param("req", "Broken Search Title"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    // Second book: page without the results table
    Mock::given(method("GET"))
        .and(path("/search.php"))
        .and(query_param("req", "Dune"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>Too many requests</body></html>"))
        .mount(&server)
        .await;

    // Third book: match, but the intermediate page has no GET anchor
    Mock::given(method("GET"))
        .and(path("/search.php"))
        .and(query_param("req", "On War"))
        .respond_with(ResponseTemplate::new(200).set_body_string(results_page(&[(
            "31",
            "Clausewitz, Carl von",
            "On War",
            link31.as_str(),
        )])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/ads.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<a href=\"/x\">Mirror down</a>"))
        .mount(&server)
        .await;

    let service = test_service(&server, out.path());
    let requests = vec![
        BookRequest::new("Broken Search Title", "Anyone").unwrap(),
        BookRequest::new("Dune", "Frank Herbert").unwrap(),
        BookRequest::new("On War", "Carl von Clausewitz").unwrap(),
    ];
    let reports = service.acquire_all(&requests, None).await;

    assert_eq!(reports.len(), 3);
    assert!(matches!(reports[0].outcome, Err(AcquisitionError::Transport(_))));
    assert!(matches!(reports[1].outcome, Err(AcquisitionError::MalformedResponse(_))));
    assert!(matches!(reports[2].outcome, Ok(RetryOutcome::Accepted { .. })));
    assert!(matches!(
        reports[2].downloads[0].result,
        Err(AcquisitionError::NoDownloadLink)
    ));
}

#[tokio::test]
async fn test_exhausted_search_shortens_title() {
    let server = MockServer::start().await;
    let out = tempfile::tempdir().expect("Failed to create temp dir");

    Mock::given(method("GET"))
        .and(path("/search.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string(results_page(&[(
            "1",
            "Jamie Oliver",
            "Cooking for Beginners",
            "http://unused/1",
        )])))
        .expect(3)
        .mount(&server)
        .await;

    let service = test_service(&server, out.path());
    let request = BookRequest::new("The Art of War Illustrated Edition", "Sun Tzu").unwrap();
    let reports = service.acquire_all(&[request], None).await;

    match &reports[0].outcome {
        Ok(RetryOutcome::Exhausted { attempt }) => {
            assert_eq!(attempt.attempt_index, 3);
            assert_eq!(attempt.current_title_query, "The Art of");
        }
        other => panic!("expected Exhausted, got {:?}", other),
    }
    assert!(reports[0].downloads.is_empty());

    let summary = bibliofetch::services::summarize(&reports);
    assert!(summary.contains("NoMatch"));
}

#[tokio::test]
async fn test_record_without_link_is_not_fetched() {
    let server = MockServer::start().await;
    let out = tempfile::tempdir().expect("Failed to create temp dir");

    let page = results_page(&[("5", "Sun Tzu", "The Art of War", "PLACEHOLDER")])
        .replace("<a href=\"PLACEHOLDER\">[1]</a>", "");
    Mock::given(method("GET"))
        .and(path("/search.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .mount(&server)
        .await;

    let service = test_service(&server, out.path());
    let request = BookRequest::new("The Art of War", "Sun Tzu").unwrap();
    let reports = service.acquire_all(&[request], None).await;

    assert_eq!(reports[0].downloads.len(), 1);
    assert!(matches!(
        reports[0].downloads[0].result,
        Err(AcquisitionError::NoDownloadLink)
    ));
}

#[tokio::test]
async fn test_two_accepted_records_land_in_separate_files() {
    let server = MockServer::start().await;
    let out = tempfile::tempdir().expect("Failed to create temp dir");
    let link1 = format!("{}/ads.php?md5=1", server.uri());
    let link2 = format!("{}/ads.php?md5=2", server.uri());

    Mock::given(method("GET"))
        .and(path("/search.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string(results_page(&[
            ("1", "Sun Tzu", "The Art of War", link1.as_str()),
            ("2", "Sun Tzu", "The Art of War", link2.as_str()),
        ])))
        .mount(&server)
        .await;

    for md5 in ["1", "2"] {
        Mock::given(method("GET"))
            .and(path("/ads.php"))
            .and(query_param("md5", md5))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                "<html><body><a href=\"/get.php?md5={}\">GET</a></body></html>",
                md5
            )))
            .mount(&server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path("/get.php"))
        .and(query_param("md5", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8; 100]))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/get.php"))
        .and(query_param("md5", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![2u8; 200]))
        .mount(&server)
        .await;

    let service = test_service(&server, out.path());
    let request = BookRequest::new("The Art of War", "Sun Tzu").unwrap();
    let reports = service.acquire_all(&[request], None).await;

    let downloads = &reports[0].downloads;
    assert_eq!(downloads.len(), 2);
    let first = downloads[0].result.as_ref().expect("first download failed");
    let second = downloads[1].result.as_ref().expect("second download failed");

    assert_ne!(first.file_path, second.file_path);
    assert_eq!(std::fs::read(&first.file_path).unwrap(), vec![1u8; 100]);
    assert_eq!(std::fs::read(&second.file_path).unwrap(), vec![2u8; 200]);
}
