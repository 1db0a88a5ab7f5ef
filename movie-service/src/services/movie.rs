use crate::models::{Movie, RatingAverage, MOVIE_COLLECTION};
use crate::services::metrics::record_rating;
use crate::services::store::{DocumentStore, StoreError};
use mongodb::bson::{self, doc, Document};
use service_core::error::AppError;
use std::sync::Arc;

/// Movie catalogue and rating operations over a `DocumentStore`.
#[derive(Clone)]
pub struct MovieService {
    store: Arc<dyn DocumentStore>,
}

fn id_filter(movie_id: &str) -> Document {
    doc! { "movie_id": movie_id }
}

fn not_found(movie_id: &str) -> AppError {
    AppError::NotFound(anyhow::anyhow!("Movie not found: {}", movie_id))
}

fn decode(document: Document) -> Result<Movie, AppError> {
    bson::from_document(document).map_err(|e| AppError::from(StoreError::from(e)))
}

impl MovieService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Ensures `movie_id` is unique across the collection.
    ///
    /// Fails with a `ConfigError` when the collection already holds several
    /// documents for one `movie_id`; those must be removed before startup.
    pub async fn initialize(&self) -> Result<(), AppError> {
        match self
            .store
            .ensure_unique_index(MOVIE_COLLECTION, "movie_id")
            .await
        {
            Ok(()) => {}
            Err(StoreError::DuplicateKey(detail)) => {
                tracing::error!(
                    collection = MOVIE_COLLECTION,
                    detail = %detail,
                    "Cannot create unique movie_id index: the collection holds duplicate movies. \
                     Keep one document per movie_id (or drop the collection) and restart"
                );
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "collection '{}' holds duplicate movie_id values ({}); keep one document per movie_id before starting",
                    MOVIE_COLLECTION,
                    detail
                )));
            }
            Err(e) => return Err(e.into()),
        }
        tracing::info!("Movie collection indexes initialized");
        Ok(())
    }

    /// Inserts each movie that is not already present. Returns how many were inserted.
    pub async fn seed(&self, movies: &[Movie]) -> Result<usize, AppError> {
        let mut inserted = 0;
        for movie in movies {
            let existing = self
                .store
                .find(MOVIE_COLLECTION, id_filter(&movie.movie_id))
                .await?;
            if !existing.is_empty() {
                continue;
            }

            let document = bson::to_document(movie).map_err(StoreError::from)?;
            match self.store.insert(MOVIE_COLLECTION, document).await {
                Ok(_) => inserted += 1,
                // Another instance seeded it between the find and the insert.
                Err(StoreError::DuplicateKey(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }
        tracing::info!(inserted, "Seeded movie catalogue");
        Ok(inserted)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_movie(&self, movie_id: &str) -> Result<Movie, AppError> {
        let documents = self
            .store
            .find(MOVIE_COLLECTION, id_filter(movie_id))
            .await?;

        match documents.into_iter().next() {
            Some(document) => decode(document),
            None => Err(not_found(movie_id)),
        }
    }

    /// Creates a movie. An existing `movie_id` is a conflict, never a second document.
    #[tracing::instrument(skip(self, movie), fields(movie_id = %movie.movie_id))]
    pub async fn put_movie(&self, movie: Movie) -> Result<String, AppError> {
        let document = bson::to_document(&movie).map_err(StoreError::from)?;

        let id = self
            .store
            .insert(MOVIE_COLLECTION, document)
            .await
            .map_err(|e| match e {
                StoreError::DuplicateKey(_) => AppError::Conflict(anyhow::anyhow!(
                    "Movie already exists: {}",
                    movie.movie_id
                )),
                other => other.into(),
            })?;

        tracing::info!(id = %id, "Movie created");
        Ok(id)
    }

    /// Removes the movie, optionally only when its title also matches.
    /// Deleting a movie that does not exist succeeds with a count of zero.
    #[tracing::instrument(skip(self))]
    pub async fn delete_movie(&self, movie_id: &str, title: Option<&str>) -> Result<u64, AppError> {
        let mut filter = id_filter(movie_id);
        if let Some(title) = title {
            filter.insert("title", title);
        }

        let deleted = self.store.remove(MOVIE_COLLECTION, filter).await?;
        tracing::info!(deleted, "Movie delete completed");
        Ok(deleted)
    }

    /// Appends `rating` in a single atomic `$push`, so concurrent ratings of
    /// the same movie are never lost.
    #[tracing::instrument(skip(self))]
    pub async fn rate_movie(&self, movie_id: &str, rating: i32) -> Result<Movie, AppError> {
        let updated = self
            .store
            .update(
                MOVIE_COLLECTION,
                id_filter(movie_id),
                doc! { "$push": { "rating": rating } },
            )
            .await?
            .ok_or_else(|| not_found(movie_id))?;

        record_rating(rating);
        decode(updated)
    }

    #[tracing::instrument(skip(self))]
    pub async fn rating_average(&self, movie_id: &str) -> Result<RatingAverage, AppError> {
        let movie = self.get_movie(movie_id).await?;
        Ok(RatingAverage {
            rating_avg: movie.average_rating(),
            movie_id: movie.movie_id,
        })
    }
}

/// Catalogue inserted on first start when demo seeding is enabled.
pub fn demo_movies() -> Vec<Movie> {
    vec![
        Movie::new("indianajones", "Indiana Jones", vec![4, 6, 3, 9]),
        Movie::new("starwars", "Star Wars", vec![1, 5, 9, 10]),
    ]
}
