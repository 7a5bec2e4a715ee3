mod common;

use reqwest::{StatusCode, redirect::Policy};
use serde_json::Value;

use common::{app_with, healthy_checks, settings};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(settings: labor_api::settings::Settings) -> Self {
        // Same router as prod, but bound to an ephemeral port.
        let app = app_with(settings, healthy_checks(), axum::Router::new());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(Policy::none())
        .build()
        .unwrap()
}

#[tokio::test]
async fn status_and_info_over_http() {
    let server = TestServer::spawn(settings(&[])).await;
    let client = client();

    let res = client
        .get(format!("{}/status", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "Healthy");
    assert_eq!(body["details"][0]["service"], "sql");

    let res = client
        .get(format!("{}/api/info", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["name"], "Labor");
}

#[tokio::test]
async fn documentation_requires_the_shared_credential() {
    let server = TestServer::spawn(settings(&[
        ("SWAGGERSETTINGS__ENABLED", "true"),
        ("SWAGGERSETTINGS__USERNAME", "alice"),
        ("SWAGGERSETTINGS__PASSWORD", "secret"),
    ]))
    .await;
    let client = client();
    let url = format!("{}/swagger/v1/swagger.json", server.base_url);

    let res = client.get(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.headers()["www-authenticate"], "Basic");

    let res = client
        .get(&url)
        .basic_auth("alice", Some("wrong"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(&url)
        .basic_auth("alice", Some("secret"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["openapi"], "3.0.1");
}

#[tokio::test]
async fn browser_and_api_clients_get_their_own_error_shapes() {
    let server = TestServer::spawn(settings(&[])).await;
    let client = client();

    let res = client
        .get(format!("{}/rota/missing", server.base_url))
        .header("accept", "text/html")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(res.text().await.unwrap().contains("<h1>404</h1>"));

    let res = client
        .get(format!("{}/api/missing", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.headers()["content-type"], "application/problem+json");
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["instance"], "/api/missing");
    assert!(body["traceId"].is_string());
}
