//! Full router wired as in production, against a wiremock Elasticsearch


use axum::http::StatusCode;
use serde_json::{Value, json};
use test_utils::{KIBANA, TestResult, get, http_app, json_body, post_json};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn hits(index: &str, sources: &[Value]) -> Value {
    let hits: Vec<Value> = sources
        .iter()
        .enumerate()
        .map(|(i, source)| {
            json!({ "_index": index, "_id": i.to_string(), "_score": 1.0, "_source": source })
        })
        .collect();
    let total = hits.len();
    json!({
        "took": 2,
        "timed_out": false,
        "hits": { "total": { "value": total, "relation": "eq" }, "hits": hits }
    })
}

#[tokio::test]
async fn test_repo_search_with_configured_permitted_set() -> TestResult {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/.code-repository/_search"))
        .and(body_string_contains(KIBANA))
        .respond_with(ResponseTemplate::new(200).set_body_json(hits(
            ".code-repository",
            &[json!({ "repository": { "uri": KIBANA, "name": "kibana", "org": "elastic" } })],
        )))
        .expect(1)
        .mount(&server)
        .await;

    let app = http_app(&server.uri(), Some(vec![KIBANA.to_string()]))?;
    let response = get(app, "/api/code/search/repo?q=kibana").await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await?;
    assert_eq!(body["total"], 1);
    assert_eq!(body["page"], 1);
    assert_eq!(body["repositories"][0]["uri"], KIBANA);
    assert_eq!(body["repositories"][0]["name"], "kibana");
    Ok(())
}

#[tokio::test]
async fn test_permitted_set_is_read_from_references_index() -> TestResult {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/.code-references/_search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(hits(
            ".code-references",
            &[json!({ "uri": KIBANA }), json!({ "uri": KIBANA }), json!({ "other": 1 })],
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/.code-commit-*/_search"))
        .and(body_string_contains(KIBANA))
        .respond_with(ResponseTemplate::new(200).set_body_json(hits(".code-commit-1", &[])))
        .expect(1)
        .mount(&server)
        .await;

    let app = http_app(&server.uri(), None)?;
    let response = get(app, "/api/code/search/commit?q=fix").await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await?;
    assert_eq!(body["commits"], json!([]));
    Ok(())
}

#[tokio::test]
async fn test_cluster_error_becomes_search_exception() -> TestResult {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/.code-symbol-*/_search"))
        .respond_with(ResponseTemplate::new(500).set_body_string("shard failure"))
        .mount(&server)
        .await;

    let app = http_app(&server.uri(), Some(vec![KIBANA.to_string()]))?;
    let response = get(app, "/api/code/search/symbol?q=Node").await?;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await?;
    assert_eq!(body["message"], "Search Exception");
    assert!(!body.to_string().contains("shard failure"));
    Ok(())
}

#[tokio::test]
async fn test_snippet_lines_are_sliced_from_the_document() -> TestResult {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/.code-document-*/_search"))
        .and(body_string_contains("src/server.ts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(hits(
            ".code-document-kibana",
            &[json!({
                "repoUri": KIBANA,
                "path": "src/server.ts",
                "language": "typescript",
                "content": "line one\nline two\nline three\nline four"
            })],
        )))
        .mount(&server)
        .await;

    let app = http_app(&server.uri(), Some(vec![KIBANA.to_string()]))?;
    let response = post_json(
        app,
        "/api/code/integration/snippets",
        &json!({
            "requests": [{
                "repoUris": [KIBANA],
                "stacktraceItems": [{ "filePath": "src/server.ts", "lineNumStart": 2, "lineNumEnd": 3 }]
            }]
        }),
    )
    .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await?;
    let snippet = &body[0][0][0];
    assert_eq!(snippet["uri"], KIBANA);
    assert_eq!(snippet["lineNumStart"], 2);
    assert_eq!(snippet["lineNumEnd"], 3);
    assert_eq!(snippet["content"], "line two\nline three");
    Ok(())
}

#[tokio::test]
async fn test_health_reports_cluster_connectivity() -> TestResult {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "tagline": "You Know, for Search" })))
        .mount(&server)
        .await;

    let healthy = json_body(get(http_app(&server.uri(), None)?, "/health").await?).await?;
    assert_eq!(healthy["status"], "healthy");
    assert_eq!(healthy["elasticsearch"], "connected");

    let response = get(http_app("http://127.0.0.1:1", None)?, "/health").await?;
    assert_eq!(response.status(), StatusCode::OK);
    let degraded = json_body(response).await?;
    assert_eq!(degraded["status"], "degraded");
    assert_eq!(degraded["elasticsearch"], "unavailable");
    assert_eq!(degraded["service"], "codescope-api");
    Ok(())
}
