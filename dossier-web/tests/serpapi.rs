use dossier_web::{SearchError, SerpApiLocator, SourceLocator};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn locator_for(server: &MockServer) -> SerpApiLocator {
    SerpApiLocator::with_endpoint("serp-key".into(), &server.uri()).expect("locator builds")
}

#[tokio::test]
async fn returns_organic_results_in_rank_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("q", "test topic"))
        .and(query_param("num", "3"))
        .and(query_param("engine", "google"))
        .and(query_param("api_key", "serp-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "search_metadata": {"status": "Success"},
            "organic_results": [
                {"position": 1, "title": "T1", "link": "https://one.example/a"},
                {"position": 2, "title": "T2", "link": "https://two.example/b"},
                {"position": 3, "title": "T3", "link": "https://three.example/c"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let got = locator_for(&server).locate("test topic", 3).await.unwrap();

    let titles: Vec<_> = got.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, ["T1", "T2", "T3"]);
    assert_eq!(got[1].link, "https://two.example/b");
}

#[tokio::test]
async fn extra_results_are_dropped_and_missing_fields_are_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "organic_results": [
                {"title": "only title"},
                {"link": "https://b.example"},
                {"title": "third", "link": "https://c.example"}
            ]
        })))
        .mount(&server)
        .await;

    let got = locator_for(&server).locate("q", 2).await.unwrap();

    assert_eq!(got.len(), 2);
    assert_eq!(got[0].title, "only title");
    assert_eq!(got[0].link, "");
    assert_eq!(got[1].title, "");
    assert_eq!(got[1].link, "https://b.example");
}

#[tokio::test]
async fn zero_count_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let got = locator_for(&server).locate("q", 0).await.unwrap();
    assert!(got.is_empty());
}

#[tokio::test]
async fn no_results_error_is_an_empty_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": "Google hasn't returned any results for this query."
        })))
        .mount(&server)
        .await;

    let got = locator_for(&server).locate("zzqx", 5).await.unwrap();
    assert!(got.is_empty());
}

#[tokio::test]
async fn provider_error_in_body_fails_the_lookup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": "Your account has run out of searches."
        })))
        .mount(&server)
        .await;

    let err = locator_for(&server).locate("q", 5).await.unwrap_err();
    match err {
        SearchError::Provider(msg) => assert!(msg.contains("run out of searches")),
        other => panic!("expected provider error, got {other:?}"),
    }
}

#[tokio::test]
async fn http_failure_is_reported_with_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "Invalid API key."})),
        )
        .mount(&server)
        .await;

    let err = locator_for(&server).locate("q", 5).await.unwrap_err();
    assert!(matches!(err, SearchError::Http(_)), "got {err:?}");
    assert!(err.to_string().contains("Invalid API key"));
}
