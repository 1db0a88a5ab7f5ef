#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use movie_service::config::{MongoConfig, MovieConfig, StoreBackend, StoreConfig};
use movie_service::services::{demo_movies, DocumentStore};
use movie_service::{build_router, AppState, Application};
use secrecy::Secret;
use service_core::config as core_config;
use std::sync::Arc;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    /// Base URL of the spawned server, e.g. `http://127.0.0.1:41234`.
    pub address: String,
    pub port: u16,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("Response body is not JSON")
    }
}

impl TestApp {
    /// App over a fresh in-memory store, seeded with the demo catalogue.
    pub async fn spawn() -> Self {
        Self::spawn_with_seed(true).await
    }

    /// Builds the application the way `main` does, on the in-memory backend
    /// and a random port, and serves it in the background.
    pub async fn spawn_with_seed(seed_demo_data: bool) -> Self {
        let config = MovieConfig {
            common: core_config::Config {
                port: 0,
                ..core_config::Config::default()
            },
            mongodb: MongoConfig {
                uri: Secret::new("mongodb://localhost:27017".to_string()),
                database: "movie_test".to_string(),
            },
            store: StoreConfig {
                backend: StoreBackend::Memory,
                seed_demo_data,
            },
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);
        let state = app.state().clone();

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to accept connections.
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }

        TestApp {
            router: build_router(state.clone()),
            state,
            address,
            port,
        }
    }

    /// App over a caller-supplied store, without binding a listener.
    pub async fn with_store(store: Arc<dyn DocumentStore>) -> Self {
        let state = AppState::new(store);
        state
            .movies
            .initialize()
            .await
            .expect("Failed to initialize movie collection");
        state
            .movies
            .seed(&demo_movies())
            .await
            .expect("Failed to seed demo movies");

        TestApp {
            router: build_router(state.clone()),
            state,
            address: String::new(),
            port: 0,
        }
    }

    pub async fn request(&self, method: Method, uri: &str) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        TestResponse {
            status,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri).await
    }

    pub async fn put(&self, uri: &str) -> TestResponse {
        self.request(Method::PUT, uri).await
    }

    pub async fn post(&self, uri: &str) -> TestResponse {
        self.request(Method::POST, uri).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.request(Method::DELETE, uri).await
    }
}
