//! Request parameters, property validation, and URL construction.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::error::{Error, Result};

/// Property key holding the endpoint path.
pub const PROPERTY_URL: &str = "url";
/// Maximum number of results for limit-based lists.
pub const PROPERTY_LIMIT: &str = "limit";
/// Results per page for paged lists.
pub const PROPERTY_PAGE_LIMIT: &str = "page_limit";
/// Page number for paged lists.
pub const PROPERTY_PAGE: &str = "page";
/// Two-letter country code.
pub const PROPERTY_COUNTRY: &str = "country";
/// Review filter (`all`, `top_critic`, `dvd`).
pub const PROPERTY_REVIEW_TYPE: &str = "review_type";
/// External movie ID for `movie_alias`.
pub const PROPERTY_ID: &str = "id";
/// External ID type for `movie_alias`.
pub const PROPERTY_TYPE: &str = "type";
/// Search query.
pub const PROPERTY_QUERY: &str = "q";

/// Placeholder replaced by the numeric movie ID.
const MOVIE_ID_TOKEN: &str = "{movie-id}";

/// Query parameter carrying the API key.
const API_KEY_PARAM: &str = "apikey";

/// Upper bound for `limit` and `page_limit`.
pub const LIMIT_MAX: u32 = 50;

/// String-keyed request properties.
///
/// The `url` entry holds the endpoint path; every other entry becomes a
/// query parameter. Blank keys and blank values are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiProperties {
    entries: BTreeMap<String, String>,
}

impl ApiProperties {
    /// Creates properties for the given endpoint path.
    #[must_use]
    pub fn for_path(path: &str) -> Self {
        let mut props = Self::default();
        props.insert(PROPERTY_URL, path);
        props
    }

    /// Inserts a property, ignoring blank keys or values.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        let value = value.into();
        if !key.trim().is_empty() && !value.trim().is_empty() {
            self.entries.insert(String::from(key), value);
        }
        self
    }

    /// Inserts a property when a value is present.
    pub fn insert_opt(&mut self, key: &str, value: Option<String>) -> &mut Self {
        if let Some(v) = value {
            self.insert(key, v);
        }
        self
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Number of stored properties (including `url`).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no property is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Query parameters, i.e. every property except `url`.
    fn query_params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != PROPERTY_URL)
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Validates a result limit: `0` means unset, values above 50 are clamped.
#[must_use]
pub fn validate_limit(limit: u32) -> Option<String> {
    if limit == 0 {
        return None;
    }
    Some(limit.min(LIMIT_MAX).to_string())
}

/// Validates a page size. Same bounds as [`validate_limit`].
#[must_use]
pub fn validate_page_limit(page_limit: u32) -> Option<String> {
    validate_limit(page_limit)
}

/// Validates a page number: `0` means unset.
#[must_use]
pub fn validate_page(page: u32) -> Option<String> {
    (page > 0).then(|| page.to_string())
}

/// Truncates a country code to its first two characters.
#[must_use]
pub fn validate_country(country: &str) -> Option<String> {
    let code: String = country.trim().chars().take(2).collect();
    (!code.is_empty()).then_some(code)
}

/// Strips the `tt` prefix from IMDb IDs; other ID types pass through.
#[must_use]
pub fn normalize_alias_id(id: &str, id_type: &str) -> String {
    let id = id.trim();
    if id_type.eq_ignore_ascii_case("imdb")
        && let Some(prefix) = id.get(..2)
        && prefix.eq_ignore_ascii_case("tt")
    {
        return String::from(id.get(2..).unwrap_or_default());
    }
    String::from(id)
}

/// Builds the request URL.
///
/// `base` must end with a `/`. The endpoint path in the `url` property is
/// joined onto it with a `.json` suffix, `{movie-id}` is substituted when
/// `movie_id` is given, and the API key plus every other property are
/// appended as query parameters.
///
/// # Errors
///
/// Returns [`Error::InvalidUrl`] if the API key or the `url` property is
/// blank, if a `{movie-id}` placeholder is left unresolved, or if the
/// resulting URL cannot be parsed.
pub fn build_url(
    base: &Url,
    api_key: &str,
    props: &ApiProperties,
    movie_id: Option<u64>,
) -> Result<Url> {
    if api_key.trim().is_empty() {
        return Err(Error::InvalidUrl(String::from("missing API key")));
    }

    let path = props
        .get(PROPERTY_URL)
        .ok_or_else(|| Error::InvalidUrl(String::from("no URL specified")))?;

    let path = match movie_id {
        Some(id) => path.replace(MOVIE_ID_TOKEN, &id.to_string()),
        None => String::from(path),
    };
    if path.contains(MOVIE_ID_TOKEN) {
        return Err(Error::InvalidUrl(format!("movie ID required for {path}")));
    }

    let relative = format!("{}.json", path.trim_start_matches('/'));
    let mut url = base
        .join(&relative)
        .map_err(|e| Error::InvalidUrl(format!("{relative}: {e}")))?;

    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        pairs.append_pair(API_KEY_PARAM, api_key);
        for (key, value) in props.query_params() {
            pairs.append_pair(key, value);
        }
    }

    Ok(url)
}

/// Renders a URL with the API key masked, for logging.
#[must_use]
pub fn redact_api_key(url: &Url) -> String {
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == API_KEY_PARAM {
                String::from("***")
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}

// --- Lists ---

/// Movie lists (`lists/movies/*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovieList {
    /// Top box office earners.
    BoxOffice,
    /// Movies currently in theaters (paged).
    InTheaters,
    /// Movies opening this week.
    Opening,
    /// Upcoming theatrical releases (paged).
    Upcoming,
}

impl MovieList {
    /// Every movie list.
    pub const ALL: [Self; 4] = [Self::BoxOffice, Self::InTheaters, Self::Opening, Self::Upcoming];

    /// Endpoint path.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::BoxOffice => "/lists/movies/box_office",
            Self::InTheaters => "/lists/movies/in_theaters",
            Self::Opening => "/lists/movies/opening",
            Self::Upcoming => "/lists/movies/upcoming",
        }
    }

    /// Whether the list takes `page`/`page_limit` instead of `limit`.
    #[must_use]
    pub const fn is_paged(self) -> bool {
        matches!(self, Self::InTheaters | Self::Upcoming)
    }

    /// CLI-style name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BoxOffice => "box-office",
            Self::InTheaters => "in-theaters",
            Self::Opening => "opening",
            Self::Upcoming => "upcoming",
        }
    }
}

/// DVD lists (`lists/dvds/*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DvdList {
    /// Top DVD rentals.
    TopRentals,
    /// Current DVD releases (paged).
    CurrentReleases,
    /// New DVD releases (paged).
    NewReleases,
    /// Upcoming DVD releases (paged).
    Upcoming,
}

impl DvdList {
    /// Every DVD list.
    pub const ALL: [Self; 4] = [
        Self::TopRentals,
        Self::CurrentReleases,
        Self::NewReleases,
        Self::Upcoming,
    ];

    /// Endpoint path.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::TopRentals => "/lists/dvds/top_rentals",
            Self::CurrentReleases => "/lists/dvds/current_releases",
            Self::NewReleases => "/lists/dvds/new_releases",
            Self::Upcoming => "/lists/dvds/upcoming",
        }
    }

    /// Whether the list takes `page`/`page_limit` instead of `limit`.
    #[must_use]
    pub const fn is_paged(self) -> bool {
        !matches!(self, Self::TopRentals)
    }

    /// CLI-style name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TopRentals => "top-rentals",
            Self::CurrentReleases => "current-releases",
            Self::NewReleases => "new-releases",
            Self::Upcoming => "upcoming",
        }
    }
}

/// Accepts both `box-office` and `box_office` spellings.
fn normalize_name(s: &str) -> String {
    s.trim().to_ascii_lowercase().replace('_', "-")
}

impl FromStr for MovieList {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = normalize_name(s);
        Self::ALL
            .into_iter()
            .find(|l| l.as_str() == name)
            .ok_or_else(|| Error::InvalidParameter(format!("unknown movie list: {s}")))
    }
}

impl FromStr for DvdList {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = normalize_name(s);
        Self::ALL
            .into_iter()
            .find(|l| l.as_str() == name)
            .ok_or_else(|| Error::InvalidParameter(format!("unknown DVD list: {s}")))
    }
}

impl fmt::Display for MovieList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for DvdList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters for list endpoints.
///
/// Limit-based lists read `limit`; paged lists read `page` and
/// `page_limit`. A value of `0` leaves the parameter unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    /// Two-letter country code (default: vendor's `us`).
    pub country: Option<String>,
    /// Maximum results for limit-based lists (1-50).
    pub limit: u32,
    /// Page number for paged lists.
    pub page: u32,
    /// Results per page for paged lists (1-50).
    pub page_limit: u32,
}

impl ListParams {
    /// Creates empty list parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the country code.
    #[must_use]
    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Sets the result limit.
    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Sets the page number.
    #[must_use]
    pub const fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Sets the page size.
    #[must_use]
    pub const fn page_limit(mut self, page_limit: u32) -> Self {
        self.page_limit = page_limit;
        self
    }

    /// Converts to request properties for a list endpoint.
    pub(crate) fn to_properties(&self, path: &str, paged: bool) -> ApiProperties {
        let mut props = ApiProperties::for_path(path);
        props.insert_opt(
            PROPERTY_COUNTRY,
            self.country.as_deref().and_then(validate_country),
        );
        if paged {
            props.insert_opt(PROPERTY_PAGE, validate_page(self.page));
            props.insert_opt(PROPERTY_PAGE_LIMIT, validate_page_limit(self.page_limit));
        } else {
            props.insert_opt(PROPERTY_LIMIT, validate_limit(self.limit));
        }
        props
    }
}

// --- Reviews ---

/// Review filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewType {
    /// All reviews.
    All,
    /// Top critics only.
    TopCritic,
    /// DVD reviews.
    Dvd,
}

impl ReviewType {
    /// Wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::TopCritic => "top_critic",
            Self::Dvd => "dvd",
        }
    }
}

impl FromStr for ReviewType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_name(s).as_str() {
            "all" => Ok(Self::All),
            "top-critic" => Ok(Self::TopCritic),
            "dvd" => Ok(Self::Dvd),
            _ => Err(Error::InvalidParameter(format!("unknown review type: {s}"))),
        }
    }
}

/// Parameters for `movies/{id}/reviews`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewParams {
    /// Review filter (default: vendor's `top_critic`).
    pub review_type: Option<ReviewType>,
    /// Results per page (1-50).
    pub page_limit: u32,
    /// Page number.
    pub page: u32,
    /// Two-letter country code.
    pub country: Option<String>,
}

impl ReviewParams {
    /// Creates empty review parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the review filter.
    #[must_use]
    pub const fn review_type(mut self, review_type: ReviewType) -> Self {
        self.review_type = Some(review_type);
        self
    }

    /// Sets the page size.
    #[must_use]
    pub const fn page_limit(mut self, page_limit: u32) -> Self {
        self.page_limit = page_limit;
        self
    }

    /// Sets the page number.
    #[must_use]
    pub const fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Sets the country code.
    #[must_use]
    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub(crate) fn to_properties(&self, path: &str) -> ApiProperties {
        let mut props = ApiProperties::for_path(path);
        props
            .insert_opt(
                PROPERTY_REVIEW_TYPE,
                self.review_type.map(|t| String::from(t.as_str())),
            )
            .insert_opt(PROPERTY_PAGE_LIMIT, validate_page_limit(self.page_limit))
            .insert_opt(PROPERTY_PAGE, validate_page(self.page))
            .insert_opt(
                PROPERTY_COUNTRY,
                self.country.as_deref().and_then(validate_country),
            );
        props
    }
}

// --- Search ---

/// Parameters for the `movies` search endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    /// Free-text query (required).
    pub query: String,
    /// Results per page (1-50).
    pub page_limit: u32,
    /// Page number.
    pub page: u32,
}

impl SearchParams {
    /// Creates search params with the given query.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            page_limit: 0,
            page: 0,
        }
    }

    /// Sets the page size.
    #[must_use]
    pub const fn page_limit(mut self, page_limit: u32) -> Self {
        self.page_limit = page_limit;
        self
    }

    /// Sets the page number.
    #[must_use]
    pub const fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub(crate) fn to_properties(&self, path: &str) -> Result<ApiProperties> {
        if self.query.trim().is_empty() {
            return Err(Error::InvalidParameter(String::from(
                "search query must not be blank",
            )));
        }
        let mut props = ApiProperties::for_path(path);
        props
            .insert(PROPERTY_QUERY, self.query.trim())
            .insert_opt(PROPERTY_PAGE_LIMIT, validate_page_limit(self.page_limit))
            .insert_opt(PROPERTY_PAGE, validate_page(self.page));
        Ok(props)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use super::*;

    fn base() -> Url {
        Url::parse("http://api.rottentomatoes.com/api/public/v1.0/").unwrap()
    }

    #[test]
    fn test_validate_limit() {
        // Arrange & Act & Assert
        assert_eq!(validate_limit(0), None);
        assert_eq!(validate_limit(1).as_deref(), Some("1"));
        assert_eq!(validate_limit(50).as_deref(), Some("50"));
        assert_eq!(validate_limit(51).as_deref(), Some("50"));
        assert_eq!(validate_page_limit(500).as_deref(), Some("50"));
    }

    #[test]
    fn test_validate_page() {
        // Arrange & Act & Assert
        assert_eq!(validate_page(0), None);
        assert_eq!(validate_page(7).as_deref(), Some("7"));
    }

    #[test]
    fn test_validate_country_truncates() {
        // Arrange & Act & Assert
        assert_eq!(validate_country("usa").as_deref(), Some("us"));
        assert_eq!(validate_country("uk").as_deref(), Some("uk"));
        assert_eq!(validate_country(""), None);
        assert_eq!(validate_country("日本国").as_deref(), Some("日本"));
    }

    #[test]
    fn test_properties_skip_blank_values() {
        // Arrange
        let mut props = ApiProperties::default();

        // Act
        props.insert("country", "").insert("", "us").insert("page", "2");

        // Assert
        assert_eq!(props.len(), 1);
        assert_eq!(props.get("page"), Some("2"));
    }

    #[test]
    fn test_build_url_list() {
        // Arrange
        let props = ListParams::new()
            .country("us")
            .limit(5)
            .to_properties(MovieList::BoxOffice.path(), false);

        // Act
        let url = build_url(&base(), "key123", &props, None).unwrap();

        // Assert
        assert_eq!(
            url.as_str(),
            "http://api.rottentomatoes.com/api/public/v1.0/lists/movies/box_office.json?apikey=key123&country=us&limit=5"
        );
    }

    #[test]
    fn test_build_url_substitutes_movie_id() {
        // Arrange
        let props = ApiProperties::for_path("/movies/{movie-id}/cast");

        // Act
        let url = build_url(&base(), "key", &props, Some(770_672_122)).unwrap();

        // Assert
        assert_eq!(url.path(), "/api/public/v1.0/movies/770672122/cast.json");
    }

    #[test]
    fn test_build_url_unresolved_movie_id() {
        // Arrange
        let props = ApiProperties::for_path("/movies/{movie-id}");

        // Act
        let result = build_url(&base(), "key", &props, None);

        // Assert
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_build_url_missing_api_key() {
        // Arrange
        let props = ApiProperties::for_path("/lists");

        // Act
        let result = build_url(&base(), "  ", &props, None);

        // Assert
        assert!(result.unwrap_err().to_string().contains("missing API key"));
    }

    #[test]
    fn test_build_url_missing_path() {
        // Arrange
        let mut props = ApiProperties::default();
        props.insert(PROPERTY_PAGE, "1");

        // Act
        let result = build_url(&base(), "key", &props, None);

        // Assert
        assert!(result.unwrap_err().to_string().contains("no URL specified"));
    }

    #[test]
    fn test_build_url_encodes_query_once() {
        // Arrange
        let props = SearchParams::new("Fast & Furious")
            .page_limit(10)
            .to_properties("/movies")
            .unwrap();

        // Act
        let url = build_url(&base(), "key", &props, None).unwrap();

        // Assert
        assert_eq!(url.query(), Some("apikey=key&page_limit=10&q=Fast+%26+Furious"));
        let q: Vec<_> = url.query_pairs().filter(|(k, _)| k == "q").collect();
        assert_eq!(q[0].1, "Fast & Furious");
    }

    #[test]
    fn test_search_blank_query_rejected() {
        // Arrange
        let params = SearchParams::new("   ");

        // Act
        let result = params.to_properties("/movies");

        // Assert
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn test_list_properties_paged_ignore_limit() {
        // Arrange
        let params = ListParams::new().limit(10).page(2).page_limit(60);

        // Act
        let paged = params.to_properties(MovieList::InTheaters.path(), true);
        let limited = params.to_properties(MovieList::BoxOffice.path(), false);

        // Assert
        assert_eq!(paged.get(PROPERTY_LIMIT), None);
        assert_eq!(paged.get(PROPERTY_PAGE), Some("2"));
        assert_eq!(paged.get(PROPERTY_PAGE_LIMIT), Some("50"));
        assert_eq!(limited.get(PROPERTY_LIMIT), Some("10"));
        assert_eq!(limited.get(PROPERTY_PAGE), None);
    }

    #[test]
    fn test_review_properties() {
        // Arrange
        let params = ReviewParams::new()
            .review_type(ReviewType::TopCritic)
            .page(1)
            .country("gbr");

        // Act
        let props = params.to_properties("/movies/{movie-id}/reviews");

        // Assert
        assert_eq!(props.get(PROPERTY_REVIEW_TYPE), Some("top_critic"));
        assert_eq!(props.get(PROPERTY_PAGE), Some("1"));
        assert_eq!(props.get(PROPERTY_PAGE_LIMIT), None);
        assert_eq!(props.get(PROPERTY_COUNTRY), Some("gb"));
    }

    #[test]
    fn test_normalize_alias_id() {
        // Arrange & Act & Assert
        assert_eq!(normalize_alias_id("tt0083658", "imdb"), "0083658");
        assert_eq!(normalize_alias_id("TT0083658", "IMDB"), "0083658");
        assert_eq!(normalize_alias_id("0083658", "imdb"), "0083658");
        assert_eq!(normalize_alias_id("tt0083658", "other"), "tt0083658");
        assert_eq!(normalize_alias_id("t", "imdb"), "t");
    }

    #[test]
    fn test_list_names_parse() {
        // Arrange & Act & Assert
        assert_eq!("box-office".parse::<MovieList>().unwrap(), MovieList::BoxOffice);
        assert_eq!("in_theaters".parse::<MovieList>().unwrap(), MovieList::InTheaters);
        assert_eq!("top-rentals".parse::<DvdList>().unwrap(), DvdList::TopRentals);
        assert!("nope".parse::<DvdList>().is_err());
        assert_eq!("top_critic".parse::<ReviewType>().unwrap(), ReviewType::TopCritic);
    }

    #[test]
    fn test_paging_flags() {
        // Arrange & Act & Assert
        assert!(!MovieList::BoxOffice.is_paged());
        assert!(!MovieList::Opening.is_paged());
        assert!(MovieList::Upcoming.is_paged());
        assert!(!DvdList::TopRentals.is_paged());
        assert!(DvdList::NewReleases.is_paged());
    }

    #[test]
    fn test_redact_api_key() {
        // Arrange
        let url = build_url(&base(), "secret", &ApiProperties::for_path("/lists"), None).unwrap();

        // Act
        let redacted = redact_api_key(&url);

        // Assert
        assert!(!redacted.contains("secret"));
        assert!(redacted.contains("apikey=***") || redacted.contains("apikey=%2A%2A%2A"));
    }
}
