use crate::models::{Movie, MAX_RATING, MIN_RATING};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct MoviePath {
    #[validate(length(min = 1, max = 128, message = "movie_id must be 1-128 characters"))]
    pub movie_id: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PutMovieQuery {
    #[validate(length(min = 1, max = 256, message = "title must be 1-256 characters"))]
    pub title: String,
    /// Comma-separated initial ratings, e.g. `4,6,3,9`.
    #[serde(default)]
    pub rating: Option<String>,
}

impl PutMovieQuery {
    pub fn ratings(&self) -> Result<Vec<i32>, AppError> {
        parse_ratings(self.rating.as_deref())
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct DeleteMovieQuery {
    #[validate(length(min = 1, max = 256, message = "title must be 1-256 characters"))]
    pub title: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RateMovieQuery {
    #[validate(range(min = 0, max = 10, message = "rating must be between 0 and 10"))]
    pub rating: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MovieSummary {
    pub movie_id: String,
    pub title: String,
}

impl From<Movie> for MovieSummary {
    fn from(movie: Movie) -> Self {
        Self {
            movie_id: movie.movie_id,
            title: movie.title,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MovieMutationResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub movie: Movie,
}

/// Parses `4,6,3,9` (brackets tolerated). Absent or blank input is an empty list.
pub fn parse_ratings(raw: Option<&str>) -> Result<Vec<i32>, AppError> {
    let raw = raw
        .unwrap_or_default()
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .trim();
    if raw.is_empty() {
        return Ok(Vec::new());
    }

    raw.split(',')
        .map(|part| {
            let part = part.trim();
            let rating: i32 = part.parse().map_err(|_| {
                AppError::BadRequest(anyhow::anyhow!(
                    "Invalid rating '{}': ratings must be integers",
                    part
                ))
            })?;
            if !(MIN_RATING..=MAX_RATING).contains(&rating) {
                return Err(AppError::BadRequest(anyhow::anyhow!(
                    "Invalid rating {}: must be between {} and {}",
                    rating,
                    MIN_RATING,
                    MAX_RATING
                )));
            }
            Ok(rating)
        })
        .collect()
}
