//! `RtApi` trait definition.
#![allow(clippy::future_not_send)]

use std::collections::BTreeMap;

use crate::error::Result;

use super::params::{DvdList, ListParams, MovieList, ReviewParams, SearchParams};
use super::types::{RtCast, RtClip, RtMovie, RtReview};

/// Rotten Tomatoes API trait.
///
/// Abstracts API operations for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(RtApi: Send)]
pub trait LocalRtApi {
    /// Fetches a movie list (box office, in theaters, opening, upcoming).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the vendor reports an error.
    async fn movie_list(&self, list: MovieList, params: &ListParams) -> Result<Vec<RtMovie>>;

    /// Fetches a DVD list (top rentals, current, new, upcoming).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the vendor reports an error.
    async fn dvd_list(&self, list: DvdList, params: &ListParams) -> Result<Vec<RtMovie>>;

    /// Fetches detailed movie information.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the vendor reports an error.
    async fn movie_info(&self, movie_id: u64) -> Result<RtMovie>;

    /// Fetches the full cast of a movie.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the vendor reports an error.
    async fn movie_cast(&self, movie_id: u64) -> Result<Vec<RtCast>>;

    /// Fetches trailers and clips of a movie.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the vendor reports an error.
    async fn movie_clips(&self, movie_id: u64) -> Result<Vec<RtClip>>;

    /// Fetches critic reviews of a movie.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the vendor reports an error.
    async fn movie_reviews(&self, movie_id: u64, params: &ReviewParams) -> Result<Vec<RtReview>>;

    /// Fetches movies similar to the given one (`limit` 0 = vendor default).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the vendor reports an error.
    async fn movie_similar(&self, movie_id: u64, limit: u32) -> Result<Vec<RtMovie>>;

    /// Looks up a movie by an external ID (e.g. an IMDb ID with `id_type` "imdb").
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is blank, the request fails, or the vendor
    /// reports an error.
    async fn movie_alias(&self, id: &str, id_type: &str) -> Result<RtMovie>;

    /// Searches movies by title.
    ///
    /// # Errors
    ///
    /// Returns an error if the query is blank, the request fails, or the
    /// vendor reports an error.
    async fn search_movies(&self, params: &SearchParams) -> Result<Vec<RtMovie>>;

    /// Lists the top-level list directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the vendor reports an error.
    async fn lists_directory(&self) -> Result<BTreeMap<String, String>>;

    /// Lists the available movie lists.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the vendor reports an error.
    async fn movie_lists_directory(&self) -> Result<BTreeMap<String, String>>;

    /// Lists the available DVD lists.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the vendor reports an error.
    async fn dvd_lists_directory(&self) -> Result<BTreeMap<String, String>>;
}
