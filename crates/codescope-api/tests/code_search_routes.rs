//! Code search routes through the full router


use axum::http::StatusCode;
use codescope_search::model::{
    RepositoryHit, RepositorySearchResult, SearchRequest, SymbolHit, SymbolSearchResult,
};
use codescope_search::test_mocks::MockSearchClient;
use test_utils::{
    BEATS, ELASTICSEARCH, KIBANA, TestResult, app_with_failing_scope, get, json_body, mock_app,
    permitted,
};

const GET_ROUTES: [&str; 7] = [
    "/api/code/search/repo",
    "/api/code/suggestions/repo",
    "/api/code/search/doc",
    "/api/code/suggestions/doc",
    "/api/code/search/symbol",
    "/api/code/suggestions/symbol",
    "/api/code/search/commit",
];

fn scope_of(clients: &MockSearchClient) -> Option<Vec<String>> {
    clients
        .calls()
        .first()
        .map(|call| call.request.repo_scope().to_vec())
}

#[tokio::test]
async fn test_every_route_answers_with_permitted_scope() -> TestResult {
    for route in GET_ROUTES {
        let clients = MockSearchClient::new();
        let response = get(mock_app(clients.clone()), &format!("{route}?q=foo")).await?;

        assert_eq!(response.status(), StatusCode::OK, "route {route}");
        assert!(response.headers().contains_key("x-correlation-id"));
        assert_eq!(scope_of(&clients), Some(permitted()), "route {route}");
    }
    Ok(())
}

#[tokio::test]
async fn test_client_failure_is_search_exception_everywhere() -> TestResult {
    for route in GET_ROUTES {
        let clients = MockSearchClient::new().with_search_failure();
        let response = get(mock_app(clients), &format!("{route}?q=foo")).await?;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR, "route {route}");
        let body = json_body(response).await?;
        assert_eq!(body["message"], "Search Exception");
        assert_eq!(body["error"], "SEARCH_EXCEPTION");
    }
    Ok(())
}

#[tokio::test]
async fn test_scope_failure_is_search_exception_everywhere() -> TestResult {
    for route in GET_ROUTES {
        let clients = MockSearchClient::new();
        let response = get(app_with_failing_scope(clients.clone()), route).await?;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR, "route {route}");
        let body = json_body(response).await?;
        assert_eq!(body["message"], "Search Exception");
        assert!(clients.calls().is_empty(), "route {route} reached the client");
    }
    Ok(())
}

#[tokio::test]
async fn test_symbol_search_and_suggest_are_identical() -> TestResult {
    let clients = MockSearchClient::new().with_symbols(SymbolSearchResult {
        symbols: vec![SymbolHit {
            qname: "org.elasticsearch.Node".to_string(),
            kind: Some("Class".to_string()),
            repo_uri: ELASTICSEARCH.to_string(),
            file_path: Some("server/Node.java".to_string()),
        }],
        ..SymbolSearchResult::default()
    });

    let search = json_body(get(mock_app(clients.clone()), "/api/code/search/symbol?q=Node").await?).await?;
    let suggest =
        json_body(get(mock_app(clients.clone()), "/api/code/suggestions/symbol?q=Node").await?).await?;

    assert_eq!(search, suggest);
    assert_eq!(search["symbols"][0]["qname"], "org.elasticsearch.Node");
    assert!(clients.calls().iter().all(|call| call.operation == "symbol.suggest"));
    Ok(())
}

#[tokio::test]
async fn test_page_parameter_falls_back_to_first_page() -> TestResult {
    let clients = MockSearchClient::new().with_repositories(RepositorySearchResult {
        total: 1,
        repositories: vec![RepositoryHit {
            uri: KIBANA.to_string(),
            name: "kibana".to_string(),
            org: Some("elastic".to_string()),
            url: None,
        }],
        ..RepositorySearchResult::default()
    });

    let third = json_body(get(mock_app(clients.clone()), "/api/code/search/repo?q=k&p=3").await?).await?;
    assert_eq!(third["page"], 3);

    let junk = json_body(get(mock_app(clients.clone()), "/api/code/search/repo?q=k&p=abc").await?).await?;
    assert_eq!(junk["page"], 1);

    let zero = json_body(get(mock_app(clients), "/api/code/search/repo?q=k&p=0").await?).await?;
    assert_eq!(zero["page"], 1);
    Ok(())
}

#[tokio::test]
async fn test_doc_search_decodes_double_encoded_repos() -> TestResult {
    let clients = MockSearchClient::new();
    get(
        mock_app(clients.clone()),
        "/api/code/search/doc?q=main&langs=typescript,,javascript&repos=a%252Cb",
    )
    .await?;

    match clients.calls().first().map(|call| &call.request) {
        Some(SearchRequest::Document(request)) => {
            assert_eq!(request.repo_filters, vec!["a".to_string(), "b".to_string()]);
            assert_eq!(
                request.lang_filters,
                vec!["typescript".to_string(), "javascript".to_string()]
            );
        }
        other => return Err(format!("unexpected request {other:?}").into()),
    }
    Ok(())
}

#[tokio::test]
async fn test_repeated_repo_scope_is_a_list() -> TestResult {
    let clients = MockSearchClient::new();
    get(
        mock_app(clients.clone()),
        "/api/code/search/commit?q=fix&repoScope=github.com/elastic/beats&repoScope=github.com/elastic/kibana&repoScope=github.com/other/secret",
    )
    .await?;

    // Permitted order is kept, unknown repositories never appear
    assert_eq!(scope_of(&clients), Some(vec![KIBANA.to_string(), BEATS.to_string()]));
    Ok(())
}

#[tokio::test]
async fn test_single_repo_scope_splits_on_commas() -> TestResult {
    let clients = MockSearchClient::new();
    get(
        mock_app(clients.clone()),
        "/api/code/search/repo?repoScope=github.com/elastic/elasticsearch,github.com/elastic/kibana",
    )
    .await?;

    assert_eq!(
        scope_of(&clients),
        Some(vec![KIBANA.to_string(), ELASTICSEARCH.to_string()])
    );
    Ok(())
}

#[tokio::test]
async fn test_disjoint_scope_still_reaches_the_client() -> TestResult {
    let clients = MockSearchClient::new();
    let response = get(
        mock_app(clients.clone()),
        "/api/code/search/repo?repoScope=github.com/other/secret",
    )
    .await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(scope_of(&clients), Some(Vec::new()));
    Ok(())
}

#[tokio::test]
async fn test_correlation_id_is_echoed() -> TestResult {
    let app = mock_app(MockSearchClient::new());
    let response = tower::ServiceExt::oneshot(
        app,
        axum::http::Request::builder()
            .uri("/api/code/search/repo?q=a")
            .header("x-correlation-id", "2f1e9a4c-59c4-4f6e-8d2b-0c6f5a9e7b31")
            .body(axum::body::Body::empty())?,
    )
    .await?;

    assert_eq!(
        response
            .headers()
            .get("x-correlation-id")
            .and_then(|v| v.to_str().ok()),
        Some("2f1e9a4c-59c4-4f6e-8d2b-0c6f5a9e7b31")
    );
    Ok(())
}
