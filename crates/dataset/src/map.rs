//! What the browser map consumes.
//!
//! Tile rendering happens client-side; this module only decides which
//! markers exist, where they sit, what color they are and what the map
//! should say when there is nothing to show.

use baymed_core::{Category, FacilityRecord, FilterCategory};
use serde::Serialize;

use crate::loader::DataStatus;

/// Map center used when no marker has coordinates (Shenzhen Civic Center).
pub const DEFAULT_CENTER: (f64, f64) = (22.5431, 114.0579);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub category: Category,
    /// Hex color, e.g. `#FF0000`
    pub color: &'static str,
    pub popup: String,
}

impl MapMarker {
    /// `None` when the record lacks either coordinate.
    pub fn from_record(record: &FacilityRecord) -> Option<Self> {
        let (latitude, longitude) = record.coordinates()?;
        let mut popup = format!("{}\n{}", record.name, record.category.label());
        if let Some(address) = &record.address {
            popup.push('\n');
            popup.push_str(address);
        }
        Some(Self {
            name: record.name.clone(),
            latitude,
            longitude,
            category: record.category,
            color: record.marker_color().hex(),
            popup,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub emoji: &'static str,
    pub color: &'static str,
    pub label: &'static str,
}

/// Why the map is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MapNotice {
    /// The source file could not be read
    DataUnavailable,
    /// Data is fine, the current filter just selects nothing
    NoResults,
}

impl MapNotice {
    pub fn message(&self) -> &'static str {
        match self {
            MapNotice::DataUnavailable => "数据加载失败，地图暂无数据",
            MapNotice::NoResults => "筛选结果为空",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center: (f64, f64),
    pub markers: Vec<MapMarker>,
    pub legend: Vec<LegendEntry>,
    pub filter: FilterCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tip: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<MapNotice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice_message: Option<&'static str>,
}

impl MapView {
    /// Project already-filtered `records` into a view.
    pub fn build(records: &[FacilityRecord], filter: FilterCategory, status: &DataStatus) -> Self {
        let markers: Vec<MapMarker> = records.iter().filter_map(MapMarker::from_record).collect();

        let notice = if !status.is_available() {
            Some(MapNotice::DataUnavailable)
        } else if markers.is_empty() {
            Some(MapNotice::NoResults)
        } else {
            None
        };

        Self {
            center: center_of(&markers),
            markers,
            legend: legend(),
            filter,
            tip: filter.tip(),
            notice,
            notice_message: notice.map(|n| n.message()),
        }
    }
}

/// Fixed legend, in display order.
pub fn legend() -> Vec<LegendEntry> {
    [Category::PolicyDesignated, Category::TierAOnly, Category::Other]
        .into_iter()
        .map(|c| LegendEntry {
            emoji: c.marker_color().emoji(),
            color: c.marker_color().hex(),
            label: c.label(),
        })
        .collect()
}

fn center_of(markers: &[MapMarker]) -> (f64, f64) {
    if markers.is_empty() {
        return DEFAULT_CENTER;
    }
    let n = markers.len() as f64;
    let lat = markers.iter().map(|m| m.latitude).sum::<f64>() / n;
    let lon = markers.iter().map(|m| m.longitude).sum::<f64>() / n;
    (lat, lon)
}
