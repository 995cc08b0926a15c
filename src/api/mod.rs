//! Wizi Learn backend data types and HTTP client
//!
//! The backend serves JSON lists either bare or wrapped in a `{ "data": [...] }`
//! envelope; both shapes are accepted.

pub mod client;

pub use client::{ApiError, WiziClient};

use serde::{Deserialize, Serialize};

/// A formation category (e.g. "Bureautique", "Langues")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    #[serde(alias = "nom")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Display color as sent by the backend (hex string)
    #[serde(default, alias = "couleur")]
    pub color: Option<String>,
}

/// A formation a stagiaire can follow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Formation {
    pub id: u64,
    #[serde(alias = "title")]
    pub titre: String,
    #[serde(default)]
    pub categorie: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Duration label, e.g. "12h"
    #[serde(default)]
    pub duree: Option<String>,
}

/// The stagiaire a ranking line refers to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedStagiaire {
    pub id: u64,
    pub prenom: String,
}

/// One line of the global ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub rang: u32,
    pub stagiaire: RankedStagiaire,
    #[serde(alias = "totalPoints")]
    pub points: u32,
}
