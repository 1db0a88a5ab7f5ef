mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn get_seeded_movie() {
    let app = TestApp::spawn().await;

    let response = app.get("/movie/indianajones").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json(),
        json!({"movie_id": "indianajones", "title": "Indiana Jones"})
    );
}

#[tokio::test]
async fn get_unknown_movie_returns_404() {
    let app = TestApp::spawn().await;

    let response = app.get("/movie/unknown").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json()["success"], false);
}

#[tokio::test]
async fn put_then_get_returns_same_title() {
    let app = TestApp::spawn().await;

    let response = app.put("/movie/alien?title=Alien&rating=8,9").await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["success"], true);
    assert!(body["id"].as_str().is_some());
    assert_eq!(
        body["movie"],
        json!({"movie_id": "alien", "title": "Alien", "rating": [8, 9]})
    );

    let response = app.get("/movie/alien").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["title"], "Alien");
}

#[tokio::test]
async fn put_without_ratings_starts_empty() {
    let app = TestApp::spawn().await;

    let response = app.put("/movie/alien?title=Alien").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["movie"]["rating"], json!([]));

    let response = app.get("/getRating/alien").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json(),
        json!({"movie_id": "alien", "rating_avg": 0.0})
    );
}

#[tokio::test]
async fn put_existing_movie_returns_409() {
    let app = TestApp::spawn().await;

    let response = app.put("/movie/starwars?title=Star%20Wars%20II").await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.json()["success"], false);

    let response = app.get("/movie/starwars").await;
    assert_eq!(response.json()["title"], "Star Wars");
}

#[tokio::test]
async fn put_requires_title() {
    let app = TestApp::spawn().await;

    let response = app.put("/movie/alien").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app.put("/movie/alien?title=").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app.get("/movie/alien").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn put_rejects_malformed_ratings() {
    let app = TestApp::spawn().await;

    let response = app.put("/movie/alien?title=Alien&rating=8,high").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["success"], false);
}

#[tokio::test]
async fn rate_movie_appends_in_order() {
    let app = TestApp::spawn().await;

    for rating in [7, 2] {
        let response = app
            .post(&format!("/rateMovie/indianajones?rating={}", rating))
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json()["success"], true);
    }

    let movie = app.state.movies.get_movie("indianajones").await.unwrap();
    assert_eq!(movie.rating, vec![4, 6, 3, 9, 7, 2]);
}

#[tokio::test]
async fn rate_movie_returns_updated_movie() {
    let app = TestApp::spawn().await;

    let response = app.post("/rateMovie/starwars?rating=5").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["movie"]["rating"], json!([1, 5, 9, 10, 5]));
}

#[tokio::test]
async fn rate_unknown_movie_returns_404() {
    let app = TestApp::spawn().await;

    let response = app.post("/rateMovie/unknown?rating=5").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rate_movie_validates_rating() {
    let app = TestApp::spawn().await;

    for uri in [
        "/rateMovie/starwars",
        "/rateMovie/starwars?rating=abc",
        "/rateMovie/starwars?rating=11",
        "/rateMovie/starwars?rating=-1",
    ] {
        let response = app.post(uri).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{}", uri);
    }

    let movie = app.state.movies.get_movie("starwars").await.unwrap();
    assert_eq!(movie.rating, vec![1, 5, 9, 10]);
}

#[tokio::test]
async fn concurrent_ratings_are_all_kept() {
    let app = TestApp::spawn().await;

    let app_ref = &app;
    let requests = (0..20).map(move |i| {
        let uri = format!("/rateMovie/starwars?rating={}", i % 11);
        async move { app_ref.post(&uri).await }
    });
    for response in futures::future::join_all(requests).await {
        assert_eq!(response.status, StatusCode::OK);
    }

    let movie = app.state.movies.get_movie("starwars").await.unwrap();
    assert_eq!(movie.rating.len(), 24);
}

#[tokio::test]
async fn get_rating_averages_seeded_movies() {
    let app = TestApp::spawn().await;

    let response = app.get("/getRating/indianajones").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json(),
        json!({"movie_id": "indianajones", "rating_avg": 5.5})
    );

    let response = app.get("/getRating/starwars").await;
    assert_eq!(response.json()["rating_avg"], 6.25);
}

#[tokio::test]
async fn get_rating_unknown_movie_returns_404() {
    let app = TestApp::spawn().await;

    let response = app.get("/getRating/unknown").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_movie_removes_it() {
    let app = TestApp::spawn().await;

    let response = app.delete("/movie/starwars").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Deleted 1"));

    let response = app.get("/movie/starwars").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_unknown_movie_still_succeeds() {
    let app = TestApp::spawn().await;

    let response = app.delete("/movie/unknown").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Deleted 0"));
}

#[tokio::test]
async fn delete_with_mismatched_title_keeps_movie() {
    let app = TestApp::spawn().await;

    let response = app.delete("/movie/starwars?title=Alien").await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.get("/movie/starwars").await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.delete("/movie/starwars?title=Star%20Wars").await;
    assert_eq!(response.status, StatusCode::OK);
    let response = app.get("/movie/starwars").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn oversized_movie_id_is_rejected() {
    let app = TestApp::spawn().await;

    let response = app.get(&format!("/movie/{}", "x".repeat(129))).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
