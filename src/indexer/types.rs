//! Core types for the indexer system
//!
//! The show/episode types are a narrow view of the host's data model: only the
//! fields a torrent search needs are carried here.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::services::text_utils::sanitize_scene_name;

/// A show as seen by an indexer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowInfo {
    /// Display name as stored by the host
    pub name: String,
    /// Whether episodes are identified by broadcast date instead of SxxEyy
    pub air_by_date: bool,
}

impl ShowInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            air_by_date: false,
        }
    }

    pub fn air_by_date(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            air_by_date: true,
        }
    }

    /// Scene-normalized name with spaces instead of dots, as used in search terms
    pub fn search_name(&self) -> String {
        sanitize_scene_name(&self.name).replace('.', " ")
    }
}

/// A single episode of a show
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeInfo {
    pub show: ShowInfo,
    pub season: u32,
    pub episode: u32,
    pub airdate: Option<NaiveDate>,
}

/// What the host wants to find, before it is turned into provider requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTarget {
    /// A whole season (backlog)
    Season { show: ShowInfo, season: u32 },
    /// A single episode
    Episode(EpisodeInfo),
}

/// A structured search request for a single provider query
///
/// Exactly one shape is active per request. `show_name` is already
/// scene-sanitized (spaces, not dots).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SearchRequest {
    BySeason {
        show_name: String,
        season: u32,
    },
    ByEpisode {
        show_name: String,
        season: u32,
        episode: u32,
    },
    /// Not supported by every provider; see the provider's query builder
    ByAirDate {
        show_name: String,
        date: NaiveDate,
    },
}

impl SearchRequest {
    pub fn show_name(&self) -> &str {
        match self {
            SearchRequest::BySeason { show_name, .. }
            | SearchRequest::ByEpisode { show_name, .. }
            | SearchRequest::ByAirDate { show_name, .. } => show_name,
        }
    }

    pub fn season(&self) -> Option<u32> {
        match self {
            SearchRequest::BySeason { season, .. } | SearchRequest::ByEpisode { season, .. } => {
                Some(*season)
            }
            SearchRequest::ByAirDate { .. } => None,
        }
    }

    pub fn episode(&self) -> Option<u32> {
        match self {
            SearchRequest::ByEpisode { episode, .. } => Some(*episode),
            _ => None,
        }
    }

    pub fn air_date(&self) -> Option<NaiveDate> {
        match self {
            SearchRequest::ByAirDate { date, .. } => Some(*date),
            _ => None,
        }
    }
}

impl std::fmt::Display for SearchRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchRequest::BySeason { show_name, season } => {
                write!(f, "{} S{:02}", show_name, season)
            }
            SearchRequest::ByEpisode {
                show_name,
                season,
                episode,
            } => write!(f, "{} S{:02}E{:02}", show_name, season, episode),
            SearchRequest::ByAirDate { show_name, date } => {
                write!(f, "{} {}", show_name, date.format("%Y-%m-%d"))
            }
        }
    }
}

/// A candidate release parsed from a feed
///
/// Both fields are non-empty; items that fail this are dropped by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    /// Release title
    pub title: String,
    /// Download link (torrent file)
    pub download_url: String,
}

impl FeedItem {
    pub fn new(title: impl Into<String>, download_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            download_url: download_url.into(),
        }
    }
}

/// Quality classification owned by the host
///
/// The indexer only hands over the raw item title; the returned value is
/// opaque to it.
pub trait QualityClassifier: Send + Sync {
    type Quality;

    fn name_quality(&self, name: &str, anime: bool) -> Self::Quality;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_name_uses_spaces() {
        let show = ShowInfo::new("Marvel's Agents of S.H.I.E.L.D.");
        assert_eq!(show.search_name(), "Marvels Agents of S H I E L D");
    }

    #[test]
    fn test_request_accessors() {
        let req = SearchRequest::ByEpisode {
            show_name: "James May".to_string(),
            season: 2,
            episode: 6,
        };
        assert_eq!(req.show_name(), "James May");
        assert_eq!(req.season(), Some(2));
        assert_eq!(req.episode(), Some(6));
        assert_eq!(req.air_date(), None);
        assert_eq!(req.to_string(), "James May S02E06");

        let date = NaiveDate::from_ymd_opt(2012, 9, 17).unwrap();
        let req = SearchRequest::ByAirDate {
            show_name: "The Daily Show".to_string(),
            date,
        };
        assert_eq!(req.season(), None);
        assert_eq!(req.air_date(), Some(date));
        assert_eq!(req.to_string(), "The Daily Show 2012-09-17");
    }
}
