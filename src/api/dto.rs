//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use serde::{Deserialize, Serialize};

use crate::chart::{InteractionState, Placement, Toggle, TooltipPhase};
use crate::dataset::{format_time, Category, RaceRecord};
use crate::session::{PassOutcome, SceneSummary};

// ============================================
// CHART DTOs
// ============================================

/// Host resize event
#[derive(Debug, Deserialize)]
pub struct ResizeRequest {
    pub width: f64,
    pub height: f64,
}

/// Result of a pipeline pass
#[derive(Debug, Serialize)]
pub struct PassResponse {
    pub outcome: PassOutcome,
    pub scene: SceneSummary,
}

/// One normalized record
#[derive(Debug, Serialize)]
pub struct RecordView {
    pub name: String,
    pub nationality: String,
    pub place: u32,
    pub year: i32,
    /// Finish time as `MM:SS`
    pub time: String,
    pub category: Category,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub doping: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl From<&RaceRecord> for RecordView {
    fn from(record: &RaceRecord) -> Self {
        Self {
            name: record.name.clone(),
            nationality: record.nationality.clone(),
            place: record.place,
            year: record.calendar_year(),
            time: format_time(&record.time),
            category: record.category(),
            doping: record.doping.clone(),
            url: record.url.clone(),
        }
    }
}

/// Records of the last rendered pass
#[derive(Debug, Serialize)]
pub struct RecordsResponse {
    pub count: usize,
    pub records: Vec<RecordView>,
}

// ============================================
// INTERACTION DTOs
// ============================================

/// Legend click result
#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub category: Category,
    pub active: bool,
    /// Markers whose visibility flipped
    pub markers: usize,
}

impl From<Toggle> for ToggleResponse {
    fn from(toggle: Toggle) -> Self {
        Self {
            category: toggle.category,
            active: toggle.active,
            markers: toggle.markers,
        }
    }
}

/// Tooltip state
#[derive(Debug, Serialize)]
pub struct TooltipResponse {
    pub phase: TooltipPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hovered: Option<usize>,
    pub opacity: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<Placement>,
}

impl TooltipResponse {
    pub fn from_state(state: &InteractionState, now: std::time::Instant) -> Self {
        let visible = state.phase() != TooltipPhase::Hidden;
        Self {
            phase: state.phase(),
            hovered: state.hovered(),
            opacity: state.opacity(now),
            lines: state
                .content()
                .filter(|_| visible)
                .map(|c| c.lines.clone())
                .unwrap_or_default(),
            placement: state.placement().copied().filter(|_| visible),
        }
    }
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health status
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy" once a chart is on the page, "degraded" otherwise
    pub status: String,
    pub dataset: String,
    pub rendered: bool,
    pub markers: usize,
    pub uptime_seconds: u64,
    pub version: String,
}
