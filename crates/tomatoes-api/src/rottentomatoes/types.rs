//! Rotten Tomatoes API response types.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use super::response::VendorError;

/// Unknown JSON properties kept for diagnostics.
pub type ExtraFields = BTreeMap<String, serde_json::Value>;

// --- Lenient numbers ---

/// The vendor sends some numeric fields as numbers, numeric strings or `""`.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(u64),
    Text(String),
}

/// Decodes an optional number that may arrive as a string; `""` is absent.
fn lenient_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let raw = Option::<NumberOrString>::deserialize(deserializer)?;
    Ok(match raw {
        Some(NumberOrString::Number(n)) => u32::try_from(n).ok(),
        Some(NumberOrString::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

/// Decodes an entity ID that may arrive as a string; `""` and `null` are `0`.
fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let raw = Option::<NumberOrString>::deserialize(deserializer)?;
    match raw {
        Some(NumberOrString::Number(n)) => Ok(n),
        Some(NumberOrString::Text(s)) if s.trim().is_empty() => Ok(0),
        Some(NumberOrString::Text(s)) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid id: {s}"))),
        None => Ok(0),
    }
}

// --- Movie ---

/// A movie, either standalone (`movies/{id}`, `movie_alias`) or as a list entry.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RtMovie {
    /// Rotten Tomatoes movie ID.
    #[serde(deserialize_with = "lenient_id")]
    pub id: u64,
    /// Title.
    pub title: String,
    /// Release year.
    #[serde(deserialize_with = "lenient_u32")]
    pub year: Option<u32>,
    /// MPAA rating (e.g. "PG-13").
    pub mpaa_rating: Option<String>,
    /// Runtime in minutes.
    #[serde(deserialize_with = "lenient_u32")]
    pub runtime: Option<u32>,
    /// Critics consensus blurb.
    pub critics_consensus: Option<String>,
    /// Release dates keyed by medium (`theater`, `dvd`).
    pub release_dates: BTreeMap<String, String>,
    /// Critic and audience ratings.
    pub ratings: RtRatings,
    /// Synopsis.
    pub synopsis: Option<String>,
    /// Poster URLs keyed by size (`thumbnail`, `profile`, `detailed`, `original`).
    pub posters: BTreeMap<String, String>,
    /// Leading cast members.
    pub abridged_cast: Vec<RtCast>,
    /// Directors.
    pub abridged_directors: Vec<RtPerson>,
    /// External IDs keyed by source (e.g. `imdb`).
    pub alternate_ids: BTreeMap<String, String>,
    /// Related API links.
    pub links: BTreeMap<String, String>,
    /// Genres (detailed info only).
    pub genres: Vec<String>,
    /// Studio (detailed info only).
    pub studio: Option<String>,
    /// Link template returned by some endpoints.
    pub link_template: Option<String>,
    /// Vendor error message; blank on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Properties not modelled above.
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl RtMovie {
    /// IMDb ID with the `tt` prefix, if known.
    #[must_use]
    pub fn imdb_id(&self) -> Option<String> {
        self.alternate_ids
            .get("imdb")
            .filter(|id| !id.trim().is_empty())
            .map(|id| format!("tt{}", id.trim()))
    }

    /// Theatrical release date.
    #[must_use]
    pub fn theater_release(&self) -> Option<NaiveDate> {
        self.release_date("theater")
    }

    /// DVD release date.
    #[must_use]
    pub fn dvd_release(&self) -> Option<NaiveDate> {
        self.release_date("dvd")
    }

    fn release_date(&self, medium: &str) -> Option<NaiveDate> {
        self.release_dates
            .get(medium)
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
    }
}

impl VendorError for RtMovie {
    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn unknown_fields(&self) -> Vec<&str> {
        self.extra.keys().map(String::as_str).collect()
    }
}

/// Critic and audience ratings. Scores of `-1` mean "not yet rated".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RtRatings {
    /// Critics rating ("Certified Fresh", "Fresh", "Rotten").
    pub critics_rating: Option<String>,
    /// Tomatometer (0-100, or -1).
    pub critics_score: Option<i32>,
    /// Audience rating ("Upright", "Spilled").
    pub audience_rating: Option<String>,
    /// Audience score (0-100, or -1).
    pub audience_score: Option<i32>,
}

impl RtRatings {
    /// Tomatometer, `None` when unrated.
    #[must_use]
    pub fn tomatometer(&self) -> Option<u8> {
        self.critics_score.and_then(|s| u8::try_from(s).ok())
    }
}

/// A cast member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RtCast {
    /// Person ID.
    #[serde(deserialize_with = "lenient_id")]
    pub id: u64,
    /// Actor name.
    pub name: String,
    /// Characters played.
    pub characters: Vec<String>,
}

/// A person referenced by name only (directors).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RtPerson {
    /// Name.
    pub name: String,
}

/// A trailer or clip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RtClip {
    /// Clip title.
    pub title: String,
    /// Duration in seconds.
    #[serde(deserialize_with = "lenient_u32")]
    pub duration: Option<u32>,
    /// Thumbnail URL.
    pub thumbnail: Option<String>,
    /// Links (`alternate` points at the player page).
    pub links: BTreeMap<String, String>,
}

/// A critic review.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RtReview {
    /// Critic name.
    pub critic: String,
    /// Review date (YYYY-MM-DD).
    pub date: Option<String>,
    /// Score as given by the critic (e.g. "4/5").
    pub original_score: Option<String>,
    /// "fresh" or "rotten".
    pub freshness: Option<String>,
    /// Publication.
    pub publication: Option<String>,
    /// Quote.
    pub quote: Option<String>,
    /// Links (`review` points at the full text).
    pub links: BTreeMap<String, String>,
}

impl RtReview {
    /// Whether the review is marked fresh.
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        self.freshness
            .as_deref()
            .is_some_and(|f| f.eq_ignore_ascii_case("fresh"))
    }
}

// --- Wrapper ---

/// Envelope shared by every list-style response.
///
/// Only the field relevant to the endpoint is populated; the others
/// stay empty.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RtListWrapper {
    /// Total number of results across pages.
    #[serde(deserialize_with = "lenient_u32")]
    pub total: Option<u32>,
    /// Movie results.
    pub movies: Vec<RtMovie>,
    /// Links (pagination or list directory).
    pub links: BTreeMap<String, String>,
    /// Cast results.
    pub cast: Vec<RtCast>,
    /// Clip results.
    pub clips: Vec<RtClip>,
    /// Review results.
    pub reviews: Vec<RtReview>,
    /// Link template.
    pub link_template: Option<String>,
    /// Vendor error message; blank on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Properties not modelled above.
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl VendorError for RtListWrapper {
    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn unknown_fields(&self) -> Vec<&str> {
        self.extra.keys().map(String::as_str).collect()
    }
}
