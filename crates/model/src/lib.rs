//! Core domain model for luxrec lighting recommendations.
//!
//! This crate defines the fundamental types used throughout the system:
//! - `RoomParameters`: The engineering constraints of a room to be lit
//! - `FixtureRecord`: One catalog row describing a lighting fixture
//! - `CandidateConfiguration`: A fixture joined with a room and the derived
//!   engineering quantities
//! - `IlluminationLevel`: Under-lit / nominal / over-lit classification

use serde::{Deserialize, Serialize};

/// Lighting adequacy of a candidate configuration relative to the room's
/// target illuminance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IlluminationLevel {
    /// Achieved illuminance below 80% of target
    UnderLit,
    /// Achieved illuminance within the accepted band around target
    Nominal,
    /// Achieved illuminance above 120% of target
    OverLit,
}

impl IlluminationLevel {
    /// Get a human-readable label for this level.
    pub fn label(&self) -> &'static str {
        match self {
            Self::UnderLit => "under-lit",
            Self::Nominal => "nominal",
            Self::OverLit => "over-lit",
        }
    }
}

/// Engineering constraints of a room, either supplied directly or extracted
/// from a free-text request.
///
/// Immutable once produced. All numeric fields are finite and positive;
/// device-rating fields stay within their defined ranges (CRI 0-100,
/// IP 0-69, CCT 1000-10000 K). Producers clamp or fall back to the
/// documented defaults rather than propagate invalid values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomParameters {
    /// Canonical room-type label from the closed lexicon
    #[serde(default = "default_room_type")]
    pub room_type: String,

    /// Floor area in square meters
    #[serde(default = "default_area_m2")]
    pub area_m2: f64,

    /// Ceiling height in meters
    #[serde(default = "default_ceiling_height_m")]
    pub ceiling_height_m: f64,

    /// Target illuminance on the work plane, in lux
    #[serde(default = "default_target_illuminance_lux")]
    pub target_illuminance_lux: u32,

    /// Minimum acceptable Color Rendering Index
    #[serde(default = "default_min_cri")]
    pub min_cri: u8,

    /// Preferred correlated color temperature, in Kelvin
    #[serde(default = "default_cct_preference_k")]
    pub cct_preference_k: u32,

    /// Minimum acceptable Ingress Protection rating
    #[serde(default = "default_min_ip_rating")]
    pub min_ip_rating: u8,

    /// Budget in integer currency units
    #[serde(default = "default_budget")]
    pub budget: u64,
}

fn default_room_type() -> String {
    "office".to_string()
}

fn default_area_m2() -> f64 {
    20.0
}

fn default_ceiling_height_m() -> f64 {
    3.0
}

fn default_target_illuminance_lux() -> u32 {
    400
}

fn default_min_cri() -> u8 {
    80
}

fn default_cct_preference_k() -> u32 {
    4000
}

fn default_min_ip_rating() -> u8 {
    40
}

fn default_budget() -> u64 {
    100_000
}

impl Default for RoomParameters {
    fn default() -> Self {
        Self {
            room_type: default_room_type(),
            area_m2: default_area_m2(),
            ceiling_height_m: default_ceiling_height_m(),
            target_illuminance_lux: default_target_illuminance_lux(),
            min_cri: default_min_cri(),
            cct_preference_k: default_cct_preference_k(),
            min_ip_rating: default_min_ip_rating(),
            budget: default_budget(),
        }
    }
}

impl RoomParameters {
    pub fn with_area(mut self, area_m2: f64) -> Self {
        self.area_m2 = area_m2;
        self
    }

    pub fn with_budget(mut self, budget: u64) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_target_illuminance(mut self, lux: u32) -> Self {
        self.target_illuminance_lux = lux;
        self
    }

    /// Clamp every field into its valid range, substituting the documented
    /// default for non-finite or non-positive physical dimensions.
    pub fn normalized(mut self) -> Self {
        if !self.area_m2.is_finite() || self.area_m2 <= 0.0 {
            self.area_m2 = default_area_m2();
        }
        if !self.ceiling_height_m.is_finite() || self.ceiling_height_m <= 0.0 {
            self.ceiling_height_m = default_ceiling_height_m();
        }
        if self.budget == 0 {
            self.budget = default_budget();
        }
        self.min_cri = self.min_cri.min(100);
        self.min_ip_rating = self.min_ip_rating.min(69);
        self.cct_preference_k = self.cct_preference_k.clamp(1_000, 10_000);
        self
    }
}

/// One row of the fixture catalog.
///
/// This is the canonical representation loaded once at process start and
/// owned exclusively by the catalog store; everything downstream borrows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureRecord {
    /// Manufacturer brand name
    pub brand: String,

    /// Product series within the brand
    pub series: String,

    /// Fixture form factor (panel, downlight, highbay, ...)
    pub fixture_type: String,

    /// Rated power draw, in watts
    pub wattage_w: f64,

    /// Rated luminous flux, in lumens
    pub luminous_flux_lm: f64,

    /// Unit price in currency units
    pub price: f64,

    /// Default correlated color temperature, in Kelvin
    pub cct_k: u32,

    /// Color Rendering Index
    pub cri: u8,

    /// Ingress Protection rating
    pub ip_rating: u8,

    /// Rated lifetime, in hours
    pub lifetime_h: u32,

    /// Beam opening angle, in degrees
    pub beam_angle_deg: f64,
}

impl FixtureRecord {
    /// Create a minimal record for testing.
    pub fn new(brand: impl Into<String>, fixture_type: impl Into<String>) -> Self {
        Self {
            brand: brand.into(),
            series: String::new(),
            fixture_type: fixture_type.into(),
            wattage_w: 36.0,
            luminous_flux_lm: 3600.0,
            price: 1000.0,
            cct_k: 4000,
            cri: 80,
            ip_rating: 40,
            lifetime_h: 50_000,
            beam_angle_deg: 120.0,
        }
    }

    /// Luminous efficacy in lm/W, or 0 for a zero-wattage record.
    pub fn efficacy_lm_per_w(&self) -> f64 {
        if self.wattage_w > 0.0 {
            self.luminous_flux_lm / self.wattage_w
        } else {
            0.0
        }
    }
}

/// One fixture paired with one room, plus the derived engineering
/// quantities and the model score.
///
/// Transient: constructed, scored, ranked and discarded per request;
/// never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateConfiguration {
    /// The catalog fixture this candidate is built from
    pub fixture: FixtureRecord,

    /// Number of fixtures needed to reach the target illuminance (>= 1)
    pub required_fixture_count: u32,

    /// Total power draw of the installation, in watts
    pub total_power_w: f64,

    /// Total cost of the installation, in currency units
    pub total_cost: f64,

    /// Illuminance the installation achieves on the work plane, in lux
    pub achieved_illuminance_lux: f64,

    /// Classification against the room's target illuminance
    pub illumination_level: IlluminationLevel,

    /// Total cost as a percentage of the room budget
    pub budget_fraction_pct: f64,

    /// Desirability score from the external scoring function
    pub predicted_score: f64,
}
