//! Facility domain types.
//!
//! A [`FacilityRecord`] is one row of the source dataset after normalization.
//! Records are immutable once loaded; user interaction only ever filters them.

use serde::{Deserialize, Serialize};

/// Sentinel name for rows without any usable name column.
pub const UNKNOWN_NAME: &str = "未知机构";

/// Display category of a facility, derived from its raw type string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Designated for 港澳药械通 / elderly medical vouchers
    PolicyDesignated,
    /// Public tertiary (三甲) hospital without a policy designation
    TierAOnly,
    /// Private hospitals, clinics, everything else
    Other,
}

impl Category {
    /// Human-readable label used in knowledge text and popups.
    pub fn label(&self) -> &'static str {
        match self {
            Category::PolicyDesignated => "港澳指定医院",
            Category::TierAOnly => "公立三甲医院",
            Category::Other => "私立/诊所",
        }
    }

    /// Marker color on the map. Total and deterministic.
    pub fn marker_color(&self) -> MarkerColor {
        match self {
            Category::PolicyDesignated => MarkerColor::Red,
            Category::TierAOnly => MarkerColor::Blue,
            Category::Other => MarkerColor::Green,
        }
    }
}

/// Map marker color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerColor {
    Red,
    Blue,
    Green,
}

impl MarkerColor {
    pub fn hex(&self) -> &'static str {
        match self {
            MarkerColor::Red => "#FF0000",
            MarkerColor::Blue => "#0000FF",
            MarkerColor::Green => "#00FF00",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            MarkerColor::Red => "🔴",
            MarkerColor::Blue => "🔵",
            MarkerColor::Green => "🟢",
        }
    }
}

/// What the latest user utterance asked the map to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterCategory {
    TierA,
    PolicyDesignated,
    PrivateOrClinic,
    /// No filter applied; the full dataset is shown
    #[default]
    None,
}

impl FilterCategory {
    /// The record category this filter selects, or `None` for "show all".
    pub fn category(&self) -> Option<Category> {
        match self {
            FilterCategory::TierA => Some(Category::TierAOnly),
            FilterCategory::PolicyDesignated => Some(Category::PolicyDesignated),
            FilterCategory::PrivateOrClinic => Some(Category::Other),
            FilterCategory::None => None,
        }
    }

    /// Banner shown above the map while a filter is active.
    pub fn tip(&self) -> Option<&'static str> {
        match self {
            FilterCategory::TierA => Some("🔵 已筛选：三甲医院"),
            FilterCategory::PolicyDesignated => Some("🔴 已筛选：港澳指定医院"),
            FilterCategory::PrivateOrClinic => Some("🟢 已筛选：私立/诊所"),
            FilterCategory::None => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, FilterCategory::None)
    }
}

/// One normalized row of the facility dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityRecord {
    pub name: String,

    /// Both coordinates are needed for the record to appear on the map.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    pub category: Category,

    /// Raw type string as found in the source, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Grounding line handed to the language model verbatim.
    pub knowledge_text: String,
}

impl FacilityRecord {
    pub fn marker_color(&self) -> MarkerColor {
        self.category.marker_color()
    }

    /// `(lat, lon)` when both coordinates are present.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}
