//! `RtClient` - Rotten Tomatoes API client implementation.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::instrument;
use url::Url;

use crate::error::{Error, Result};

use super::api::LocalRtApi;
use super::params::{
    ApiProperties, DvdList, ListParams, MovieList, PROPERTY_ID, PROPERTY_LIMIT, PROPERTY_TYPE,
    ReviewParams, SearchParams, build_url, normalize_alias_id, redact_api_key, validate_limit,
};
use super::rate_limiter::RequestThrottler;
use super::response::{VendorError, ensure_valid, is_query_limit_error, map_response};
use super::types::{RtCast, RtClip, RtListWrapper, RtMovie, RtReview};

/// Default base URL for the public API v1.0.
const DEFAULT_BASE_URL: &str = "http://api.rottentomatoes.com/api/public/v1.0/";

/// Default User-Agent.
const DEFAULT_USER_AGENT: &str = concat!("tomatoes-api/", env!("CARGO_PKG_VERSION"));

/// Base delay between query-limit retries; attempt `n` sleeps `n` times this.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Default number of query-limit retries.
pub const DEFAULT_RETRY_LIMIT: u32 = 5;

/// Characters of a non-JSON error body kept in [`Error::Http`].
const ERROR_BODY_PREVIEW: usize = 200;

const URL_LISTS_DIRECTORY: &str = "/lists";
const URL_MOVIE_LISTS_DIRECTORY: &str = "/lists/movies";
const URL_DVD_LISTS_DIRECTORY: &str = "/lists/dvds";
const URL_MOVIE_INFO: &str = "/movies/{movie-id}";
const URL_CAST_INFO: &str = "/movies/{movie-id}/cast";
const URL_MOVIE_CLIPS: &str = "/movies/{movie-id}/clips";
const URL_MOVIE_REVIEWS: &str = "/movies/{movie-id}/reviews";
const URL_MOVIE_SIMILAR: &str = "/movies/{movie-id}/similar";
const URL_MOVIE_ALIAS: &str = "/movie_alias";
const URL_MOVIES_SEARCH: &str = "/movies";

/// Error body of a non-success response.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Rotten Tomatoes API client.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct RtClient {
    /// HTTP client.
    http_client: Client,
    /// Base URL for API requests (always ends with `/`).
    base_url: Url,
    /// API key sent as the `apikey` query parameter.
    api_key: String,
    /// Request throttle shared by every call on this client.
    throttler: Arc<Mutex<RequestThrottler>>,
    /// Base delay between query-limit retries.
    retry_delay: Duration,
    /// Maximum number of query-limit retries.
    retry_limit: u32,
}

/// Builder for `RtClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct RtClientBuilder {
    base_url: Option<Url>,
    api_key: Option<String>,
    user_agent: Option<String>,
    connect_timeout: Option<Duration>,
    timeout: Option<Duration>,
    proxy: Option<(String, u16)>,
    proxy_auth: Option<(String, String)>,
    throttle: Option<(usize, Duration)>,
    retry_delay: Option<Duration>,
    retry_limit: Option<u32>,
}

impl RtClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            user_agent: None,
            connect_timeout: None,
            timeout: None,
            proxy: None,
            proxy_auth: None,
            throttle: None,
            retry_delay: None,
            retry_limit: None,
        }
    }

    /// Overrides the base URL (for wiremock in tests).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the API key (required).
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the User-Agent (default: `tomatoes-api/<version>`).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the TCP connect timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the total request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Routes every request through an HTTP proxy.
    #[must_use]
    pub fn proxy(mut self, host: impl Into<String>, port: u16) -> Self {
        self.proxy = Some((host.into(), port));
        self
    }

    /// Sets basic-auth credentials for the proxy.
    #[must_use]
    pub fn proxy_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.proxy_auth = Some((username.into(), password.into()));
        self
    }

    /// Sets the throttle window (default: 5 calls per second).
    #[must_use]
    pub const fn throttle(mut self, max_calls: usize, interval: Duration) -> Self {
        self.throttle = Some((max_calls, interval));
        self
    }

    /// Sets the base delay between query-limit retries (default: 500ms).
    #[must_use]
    pub const fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = Some(delay);
        self
    }

    /// Sets the number of query-limit retries (default: 5, `0` disables).
    #[must_use]
    pub const fn retry_limit(mut self, limit: u32) -> Self {
        self.retry_limit = Some(limit);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - [`Error::NoApiKey`] if `api_key` is unset or blank.
    /// - [`Error::InvalidParameter`] if the throttle window or proxy is invalid.
    /// - [`Error::InvalidUrl`] if the base URL cannot be a base.
    /// - [`Error::Connection`] if `reqwest::Client` build fails.
    pub fn build(self) -> Result<RtClient> {
        let api_key = self
            .api_key
            .map(|k| String::from(k.trim()))
            .filter(|k| !k.is_empty())
            .ok_or(Error::NoApiKey)?;

        let mut base_url = match self.base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_BASE_URL)
                .map_err(|e| Error::InvalidUrl(format!("{DEFAULT_BASE_URL}: {e}")))?,
        };
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidUrl(format!("{base_url} cannot be a base URL")));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let throttler = match self.throttle {
            Some((max_calls, interval)) => RequestThrottler::new(max_calls, interval)?,
            None => RequestThrottler::default_limits(),
        };

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| String::from(DEFAULT_USER_AGENT));
        let mut http = Client::builder().user_agent(&user_agent).gzip(true);
        if let Some(timeout) = self.connect_timeout {
            http = http.connect_timeout(timeout);
        }
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }
        if let Some((host, port)) = self.proxy {
            let proxy_url = format!("http://{host}:{port}");
            let mut proxy = reqwest::Proxy::all(&proxy_url)
                .map_err(|e| Error::InvalidParameter(format!("proxy {proxy_url}: {e}")))?;
            if let Some((username, password)) = self.proxy_auth {
                proxy = proxy.basic_auth(&username, &password);
            }
            http = http.proxy(proxy);
        }
        let http_client = http.build().map_err(|source| Error::Connection {
            path: String::from(base_url.path()),
            source: source.without_url(),
        })?;

        Ok(RtClient {
            http_client,
            base_url,
            api_key,
            throttler: Arc::new(Mutex::new(throttler)),
            retry_delay: self.retry_delay.unwrap_or(DEFAULT_RETRY_DELAY),
            retry_limit: self.retry_limit.unwrap_or(DEFAULT_RETRY_LIMIT),
        })
    }
}

impl RtClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> RtClientBuilder {
        RtClientBuilder::new()
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base delay between query-limit retries.
    #[must_use]
    pub const fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Maximum number of query-limit retries.
    #[must_use]
    pub const fn retry_limit(&self) -> u32 {
        self.retry_limit
    }

    /// Sends a throttled GET request and maps the JSON body to `T`.
    ///
    /// Retries up to `retry_limit` times when the vendor answers with
    /// HTTP 429 or its query-limit error message, sleeping
    /// `retry_delay * attempt` before each retry.
    #[instrument(skip_all)]
    async fn get_response<T>(&self, props: &ApiProperties, movie_id: Option<u64>) -> Result<T>
    where
        T: DeserializeOwned + VendorError,
    {
        let url = build_url(&self.base_url, &self.api_key, props, movie_id)?;
        let path = String::from(url.path());

        let mut retries = 0u32;
        loop {
            self.throttler.lock().await.wait().await;

            tracing::debug!(url = %redact_api_key(&url), "Rotten Tomatoes API request");

            let response = self
                .http_client
                .get(url.clone())
                .send()
                .await
                .map_err(|source| Error::Connection {
                    path: path.clone(),
                    source: source.without_url(),
                })?;
            let status = response.status();
            let body = response.text().await.map_err(|source| Error::Connection {
                path: path.clone(),
                source: source.without_url(),
            })?;

            if status == StatusCode::NOT_FOUND {
                return Err(Error::NotFound { path });
            }

            if status != StatusCode::TOO_MANY_REQUESTS {
                if status.is_success() {
                    let parsed: T = map_response(&body, &path)?;
                    if !parsed.error().is_some_and(is_query_limit_error) {
                        return ensure_valid(parsed);
                    }
                } else {
                    match vendor_error_message(&body) {
                        Some(message) if is_query_limit_error(&message) => {}
                        Some(message) => return Err(Error::Api(message)),
                        None => {
                            return Err(Error::Http {
                                path,
                                status: status.as_u16(),
                                body: body.chars().take(ERROR_BODY_PREVIEW).collect(),
                            });
                        }
                    }
                }
            }

            retries = retries.saturating_add(1);
            let delay = self.retry_delay.saturating_mul(retries);
            if retries > self.retry_limit {
                return Err(Error::QueryLimitExceeded {
                    retries: self.retry_limit,
                    last_delay: self.retry_delay.saturating_mul(self.retry_limit),
                });
            }
            tracing::warn!(
                retry = retries,
                max_retries = self.retry_limit,
                delay_ms = delay.as_millis(),
                "Rotten Tomatoes query limit hit. Retrying..."
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Fetches a list wrapper for an endpoint without a movie ID.
    async fn get_wrapper(&self, props: &ApiProperties) -> Result<RtListWrapper> {
        self.get_response(props, None).await
    }
}

/// Extracts a non-blank `error` field from a JSON error body.
fn vendor_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|e| !e.trim().is_empty())
}

impl LocalRtApi for RtClient {
    #[instrument(skip_all, fields(list = %list))]
    async fn movie_list(&self, list: MovieList, params: &ListParams) -> Result<Vec<RtMovie>> {
        let props = params.to_properties(list.path(), list.is_paged());
        Ok(self.get_wrapper(&props).await?.movies)
    }

    #[instrument(skip_all, fields(list = %list))]
    async fn dvd_list(&self, list: DvdList, params: &ListParams) -> Result<Vec<RtMovie>> {
        let props = params.to_properties(list.path(), list.is_paged());
        Ok(self.get_wrapper(&props).await?.movies)
    }

    #[instrument(skip_all, fields(movie_id = movie_id))]
    async fn movie_info(&self, movie_id: u64) -> Result<RtMovie> {
        let props = ApiProperties::for_path(URL_MOVIE_INFO);
        self.get_response(&props, Some(movie_id)).await
    }

    #[instrument(skip_all, fields(movie_id = movie_id))]
    async fn movie_cast(&self, movie_id: u64) -> Result<Vec<RtCast>> {
        let props = ApiProperties::for_path(URL_CAST_INFO);
        let wrapper: RtListWrapper = self.get_response(&props, Some(movie_id)).await?;
        Ok(wrapper.cast)
    }

    #[instrument(skip_all, fields(movie_id = movie_id))]
    async fn movie_clips(&self, movie_id: u64) -> Result<Vec<RtClip>> {
        let props = ApiProperties::for_path(URL_MOVIE_CLIPS);
        let wrapper: RtListWrapper = self.get_response(&props, Some(movie_id)).await?;
        Ok(wrapper.clips)
    }

    #[instrument(skip_all, fields(movie_id = movie_id))]
    async fn movie_reviews(&self, movie_id: u64, params: &ReviewParams) -> Result<Vec<RtReview>> {
        let props = params.to_properties(URL_MOVIE_REVIEWS);
        let wrapper: RtListWrapper = self.get_response(&props, Some(movie_id)).await?;
        Ok(wrapper.reviews)
    }

    #[instrument(skip_all, fields(movie_id = movie_id))]
    async fn movie_similar(&self, movie_id: u64, limit: u32) -> Result<Vec<RtMovie>> {
        let mut props = ApiProperties::for_path(URL_MOVIE_SIMILAR);
        props.insert_opt(PROPERTY_LIMIT, validate_limit(limit));
        let wrapper: RtListWrapper = self.get_response(&props, Some(movie_id)).await?;
        Ok(wrapper.movies)
    }

    #[instrument(skip_all)]
    async fn movie_alias(&self, id: &str, id_type: &str) -> Result<RtMovie> {
        let id = normalize_alias_id(id, id_type);
        if id.is_empty() {
            return Err(Error::InvalidParameter(String::from(
                "alias ID must not be blank",
            )));
        }
        let mut props = ApiProperties::for_path(URL_MOVIE_ALIAS);
        props
            .insert(PROPERTY_ID, id)
            .insert(PROPERTY_TYPE, id_type.trim().to_ascii_lowercase());
        self.get_response(&props, None).await
    }

    #[instrument(skip_all)]
    async fn search_movies(&self, params: &SearchParams) -> Result<Vec<RtMovie>> {
        let props = params.to_properties(URL_MOVIES_SEARCH)?;
        Ok(self.get_wrapper(&props).await?.movies)
    }

    #[instrument(skip_all)]
    async fn lists_directory(&self) -> Result<BTreeMap<String, String>> {
        let props = ApiProperties::for_path(URL_LISTS_DIRECTORY);
        Ok(self.get_wrapper(&props).await?.links)
    }

    #[instrument(skip_all)]
    async fn movie_lists_directory(&self) -> Result<BTreeMap<String, String>> {
        let props = ApiProperties::for_path(URL_MOVIE_LISTS_DIRECTORY);
        Ok(self.get_wrapper(&props).await?.links)
    }

    #[instrument(skip_all)]
    async fn dvd_lists_directory(&self) -> Result<BTreeMap<String, String>> {
        let props = ApiProperties::for_path(URL_DVD_LISTS_DIRECTORY);
        Ok(self.get_wrapper(&props).await?.links)
    }
}
