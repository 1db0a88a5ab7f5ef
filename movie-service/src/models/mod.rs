pub mod movie;

pub use movie::{
    rating_average, Movie, RatingAverage, MAX_RATING, MIN_RATING, MOVIE_COLLECTION,
};
