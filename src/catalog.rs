//! Catalogue screens and their caching policy
//!
//! Each tab of the client maps to one backend list, one cache key, and one TTL tier:
//! categories and formations are reference data kept for a day, the ranking changes
//! often and is kept for minutes.

use crate::fetch::FetchOptions;

pub const CATEGORIES_KEY: &str = "categories";
pub const FORMATIONS_KEY: &str = "formations";
pub const RANKING_KEY: &str = "classement";

/// Preference key remembering the last opened tab
pub const LAST_TAB_PREF: &str = "last_tab";

/// A catalogue list shown by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    Categories,
    Formations,
    Ranking,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Categories, Tab::Formations, Tab::Ranking];

    /// Parses a tab name, accepting French and English aliases
    pub fn from_str(s: &str) -> Option<Tab> {
        match s.trim().to_lowercase().as_str() {
            "categories" | "catégories" | "cat" => Some(Tab::Categories),
            "formations" | "formation" | "courses" => Some(Tab::Formations),
            "classement" | "ranking" | "rank" => Some(Tab::Ranking),
            _ => None,
        }
    }

    /// Stable identifier, used for preferences and the CLI
    pub fn as_str(self) -> &'static str {
        match self {
            Tab::Categories => "categories",
            Tab::Formations => "formations",
            Tab::Ranking => "classement",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tab::Categories => "Catégories",
            Tab::Formations => "Formations",
            Tab::Ranking => "Classement",
        }
    }

    pub fn cache_key(self) -> &'static str {
        match self {
            Tab::Categories => CATEGORIES_KEY,
            Tab::Formations => FORMATIONS_KEY,
            Tab::Ranking => RANKING_KEY,
        }
    }

    pub fn fetch_options(self) -> FetchOptions {
        match self {
            Tab::Categories => {
                FetchOptions::reference_data().error_title("Catégories indisponibles")
            }
            Tab::Formations => {
                FetchOptions::reference_data().error_title("Formations indisponibles")
            }
            Tab::Ranking => FetchOptions::user_data().error_title("Classement indisponible"),
        }
    }

    pub fn next(self) -> Tab {
        match self {
            Tab::Categories => Tab::Formations,
            Tab::Formations => Tab::Ranking,
            Tab::Ranking => Tab::Categories,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Tab::Categories => 0,
            Tab::Formations => 1,
            Tab::Ranking => 2,
        }
    }
}
