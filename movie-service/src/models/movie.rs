use serde::{Deserialize, Serialize};

/// Collection holding one document per movie.
pub const MOVIE_COLLECTION: &str = "movie";

pub const MIN_RATING: i32 = 0;
pub const MAX_RATING: i32 = 10;

/// A movie document. `movie_id` is unique within the collection.
///
/// The store's own `_id` is not part of the model; unknown fields are
/// ignored on read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub movie_id: String,
    pub title: String,
    #[serde(default)]
    pub rating: Vec<i32>,
}

impl Movie {
    pub fn new(movie_id: impl Into<String>, title: impl Into<String>, rating: Vec<i32>) -> Self {
        Self {
            movie_id: movie_id.into(),
            title: title.into(),
            rating,
        }
    }

    pub fn average_rating(&self) -> f64 {
        rating_average(&self.rating)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RatingAverage {
    pub movie_id: String,
    pub rating_avg: f64,
}

/// Arithmetic mean of `ratings`. An unrated movie averages `0.0`.
pub fn rating_average(ratings: &[i32]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
    sum as f64 / ratings.len() as f64
}
