//! Movie catalogue and rating handlers.
//!
//! Parameters are validated by the extractors before any store call; all
//! failures render through `AppError`.

use axum::{extract::State, http::StatusCode, Json};
use service_core::error::AppError;

use crate::{
    dtos::{
        DeleteMovieQuery, MovieMutationResponse, MoviePath, MovieSummary, PutMovieQuery,
        RateMovieQuery,
    },
    models::{Movie, RatingAverage},
    startup::AppState,
    utils::{ValidatedPath, ValidatedQuery},
};

/// `GET /movie/:movie_id`
pub async fn get_movie(
    State(state): State<AppState>,
    ValidatedPath(path): ValidatedPath<MoviePath>,
) -> Result<Json<MovieSummary>, AppError> {
    let movie = state.movies.get_movie(&path.movie_id).await?;
    Ok(Json(MovieSummary::from(movie)))
}

/// `PUT /movie/:movie_id?title=..&rating=4,6,3`
pub async fn put_movie(
    State(state): State<AppState>,
    ValidatedPath(path): ValidatedPath<MoviePath>,
    ValidatedQuery(query): ValidatedQuery<PutMovieQuery>,
) -> Result<Json<MovieMutationResponse>, AppError> {
    let movie = Movie::new(path.movie_id, query.title.clone(), query.ratings()?);

    tracing::info!(
        movie_id = %movie.movie_id,
        ratings = movie.rating.len(),
        "Creating movie"
    );

    let id = state.movies.put_movie(movie.clone()).await?;

    Ok(Json(MovieMutationResponse {
        success: true,
        id: Some(id),
        movie,
    }))
}

/// `DELETE /movie/:movie_id[?title=..]`
pub async fn delete_movie(
    State(state): State<AppState>,
    ValidatedPath(path): ValidatedPath<MoviePath>,
    ValidatedQuery(query): ValidatedQuery<DeleteMovieQuery>,
) -> Result<(StatusCode, String), AppError> {
    let deleted = state
        .movies
        .delete_movie(&path.movie_id, query.title.as_deref())
        .await?;

    Ok((
        StatusCode::OK,
        format!("Deleted {} movie(s) with movie_id {}", deleted, path.movie_id),
    ))
}

/// `POST /rateMovie/:movie_id?rating=7`
pub async fn rate_movie(
    State(state): State<AppState>,
    ValidatedPath(path): ValidatedPath<MoviePath>,
    ValidatedQuery(query): ValidatedQuery<RateMovieQuery>,
) -> Result<Json<MovieMutationResponse>, AppError> {
    tracing::info!(movie_id = %path.movie_id, rating = query.rating, "Rating movie");

    let movie = state.movies.rate_movie(&path.movie_id, query.rating).await?;

    Ok(Json(MovieMutationResponse {
        success: true,
        id: None,
        movie,
    }))
}

/// `GET /getRating/:movie_id`
pub async fn get_rating(
    State(state): State<AppState>,
    ValidatedPath(path): ValidatedPath<MoviePath>,
) -> Result<Json<RatingAverage>, AppError> {
    let average = state.movies.rating_average(&path.movie_id).await?;
    Ok(Json(average))
}
