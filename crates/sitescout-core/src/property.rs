//! Candidate property model shared by the collector and the ranking pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Broad use class of a commercial parcel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyType {
    Retail,
    Office,
    Land,
    Industrial,
    MixedUse,
    Unknown,
}

impl PropertyType {
    /// Map free-text listing categories onto a property type.
    ///
    /// Matching is case-insensitive and substring based; anything unrecognised
    /// becomes [`PropertyType::Unknown`].
    #[must_use]
    pub fn from_listing_label(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        if label.contains("mixed") {
            PropertyType::MixedUse
        } else if label.contains("office") {
            PropertyType::Office
        } else if ["retail", "storefront", "restaurant"]
            .iter()
            .any(|k| label.contains(k))
        {
            PropertyType::Retail
        } else if ["industrial", "flex", "warehouse"]
            .iter()
            .any(|k| label.contains(k))
        {
            PropertyType::Industrial
        } else if label.contains("land") || label.contains("lot") {
            PropertyType::Land
        } else {
            PropertyType::Unknown
        }
    }
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyType::Retail => write!(f, "RETAIL"),
            PropertyType::Office => write!(f, "OFFICE"),
            PropertyType::Land => write!(f, "LAND"),
            PropertyType::Industrial => write!(f, "INDUSTRIAL"),
            PropertyType::MixedUse => write!(f, "MIXED_USE"),
            PropertyType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Commercial listing sites whose scraped inventory lands in the listings store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingSite {
    Crexi,
    LoopNet,
    CommercialCafe,
}

impl ListingSite {
    /// Short lowercase key used to namespace listing ids.
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            ListingSite::Crexi => "crexi",
            ListingSite::LoopNet => "loopnet",
            ListingSite::CommercialCafe => "commercialcafe",
        }
    }
}

impl std::fmt::Display for ListingSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListingSite::Crexi => write!(f, "Crexi"),
            ListingSite::LoopNet => write!(f, "LoopNet"),
            ListingSite::CommercialCafe => write!(f, "CommercialCafe"),
        }
    }
}

/// Where a candidate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "site", rename_all = "snake_case")]
pub enum PropertySource {
    GovernmentRecord,
    ListingSite(ListingSite),
}

impl PropertySource {
    #[must_use]
    pub fn is_listing(self) -> bool {
        matches!(self, PropertySource::ListingSite(_))
    }

    #[must_use]
    pub fn listing_site(self) -> Option<ListingSite> {
        match self {
            PropertySource::ListingSite(site) => Some(site),
            PropertySource::GovernmentRecord => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    VacantProperty,
    VacantLand,
    TaxDelinquent,
    Foreclosure,
    AbsenteeOwner,
    LongTermOwner,
    ActiveListing,
}

impl SignalType {
    /// Signals that count as explicit vacancy evidence.
    #[must_use]
    pub fn is_vacancy(self) -> bool {
        matches!(self, SignalType::VacantProperty | SignalType::VacantLand)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalStrength {
    Low,
    Medium,
    High,
}

/// A short tagged observation about a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpportunitySignal {
    pub signal_type: SignalType,
    pub description: String,
    pub strength: SignalStrength,
}

impl OpportunitySignal {
    #[must_use]
    pub fn new(signal_type: SignalType, description: impl Into<String>, strength: SignalStrength) -> Self {
        Self {
            signal_type,
            description: description.into(),
            strength,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A candidate site assembled for one search request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProperty {
    /// Source-scoped identity (parcel number or listing id).
    pub id: String,
    pub address: String,
    pub coordinates: Option<Coordinates>,
    pub property_type: PropertyType,
    pub source: PropertySource,
    pub building_sqft: Option<f64>,
    pub lot_acres: Option<f64>,
    /// Free-text land-use description from the assessor or listing copy.
    pub land_use: Option<String>,
    pub signals: Vec<OpportunitySignal>,
}

impl CandidateProperty {
    #[must_use]
    pub fn is_listing(&self) -> bool {
        self.source.is_listing()
    }

    #[must_use]
    pub fn has_signal(&self, signal_type: SignalType) -> bool {
        self.signals.iter().any(|s| s.signal_type == signal_type)
    }

    #[must_use]
    pub fn has_vacancy_signal(&self) -> bool {
        self.signals.iter().any(|s| s.signal_type.is_vacancy())
    }

    /// Lowercased land-use text, empty when none was recorded.
    #[must_use]
    pub fn land_use_lower(&self) -> String {
        self.land_use.as_deref().unwrap_or_default().to_lowercase()
    }
}

/// Rejected [`GeoBounds`] input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid bounds: {0}")]
pub struct BoundsError(pub String);

/// Rectangular latitude/longitude search viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl GeoBounds {
    /// Build validated bounds.
    ///
    /// # Errors
    ///
    /// Returns [`BoundsError`] if any edge is non-finite or a min exceeds its max.
    pub fn new(min_lat: f64, max_lat: f64, min_lng: f64, max_lng: f64) -> Result<Self, BoundsError> {
        let bounds = Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        };
        bounds.validate()?;
        Ok(bounds)
    }

    /// Check the min <= max invariant on both axes.
    ///
    /// # Errors
    ///
    /// Returns [`BoundsError`] describing the first violated edge.
    pub fn validate(&self) -> Result<(), BoundsError> {
        let edges = [self.min_lat, self.max_lat, self.min_lng, self.max_lng];
        if edges.iter().any(|v| !v.is_finite()) {
            return Err(BoundsError("all edges must be finite".to_string()));
        }
        if self.min_lat > self.max_lat {
            return Err(BoundsError(format!(
                "min_lat {} exceeds max_lat {}",
                self.min_lat, self.max_lat
            )));
        }
        if self.min_lng > self.max_lng {
            return Err(BoundsError(format!(
                "min_lng {} exceeds max_lng {}",
                self.min_lng, self.max_lng
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn center(&self) -> Coordinates {
        Coordinates {
            lat: (self.min_lat + self.max_lat) / 2.0,
            lng: (self.min_lng + self.max_lng) / 2.0,
        }
    }

    #[must_use]
    pub fn contains(&self, point: Coordinates) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.lat)
            && (self.min_lng..=self.max_lng).contains(&point.lng)
    }
}

/// An active listing as persisted by the scraper jobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedListing {
    pub id: String,
    pub site: ListingSite,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Category exactly as shown on the listing site.
    pub property_type: String,
    pub building_sqft: Option<f64>,
    pub lot_acres: Option<f64>,
    pub description: Option<String>,
    pub asking_price: Option<f64>,
    pub listing_url: Option<String>,
    pub last_seen_at: DateTime<Utc>,
}
