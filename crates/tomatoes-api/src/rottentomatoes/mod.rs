//! Rotten Tomatoes public API (v1.0) client.

pub mod api;
pub mod client;
pub mod params;
pub mod rate_limiter;
pub mod response;
pub mod types;

pub use api::{LocalRtApi, RtApi};
pub use client::{DEFAULT_RETRY_DELAY, DEFAULT_RETRY_LIMIT, RtClient, RtClientBuilder};
pub use params::{
    ApiProperties, DvdList, LIMIT_MAX, ListParams, MovieList, ReviewParams, ReviewType,
    SearchParams, build_url,
};
pub use rate_limiter::RequestThrottler;
pub use response::{QUERY_LIMIT_MESSAGE, VendorError};
pub use types::{RtCast, RtClip, RtListWrapper, RtMovie, RtPerson, RtRatings, RtReview};
