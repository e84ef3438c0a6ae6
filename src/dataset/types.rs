//! Core data types for the race dataset
//!
//! - `RawRecord`: one entry exactly as the dataset endpoint serves it
//! - `RaceRecord`: the normalized, immutable record the chart works with
//! - `Category`: doping-status group used for color, legend and filtering

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A race result as found in the remote JSON payload
///
/// Field names are fixed by the external dataset and case-sensitive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawRecord {
    /// Finish time, "MM:SS"
    #[serde(rename = "Time")]
    pub time: String,
    /// Finish time in seconds (informational, the chart uses `time`)
    #[serde(rename = "Seconds", default, skip_serializing_if = "Option::is_none")]
    pub seconds: Option<u32>,
    /// Calendar year of the race
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Nationality")]
    pub nationality: String,
    /// Finishing rank
    #[serde(rename = "Place")]
    pub place: u32,
    /// Allegation description, empty when there is none
    #[serde(rename = "Doping", default)]
    pub doping: String,
    /// Reference link for the allegation
    #[serde(rename = "URL", default)]
    pub url: String,
}

/// A normalized race result
///
/// `year` is anchored to January 1 of the race year and `time` to the
/// fixed reference date 1970-01-01, so only minutes and seconds matter
/// when comparing finish times.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RaceRecord {
    pub name: String,
    pub nationality: String,
    pub place: u32,
    pub year: NaiveDateTime,
    pub time: NaiveDateTime,
    pub doping: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl RaceRecord {
    /// Doping-status group of this record
    pub fn category(&self) -> Category {
        if self.doping.is_empty() {
            Category::NoDoping
        } else {
            Category::Doping
        }
    }

    /// Calendar year as an integer
    pub fn calendar_year(&self) -> i32 {
        self.year.year()
    }

    /// Whether an allegation text is attached
    pub fn has_allegation(&self) -> bool {
        !self.doping.is_empty()
    }
}

/// Doping-status category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Doping,
    NoDoping,
}

impl Category {
    /// Legend order
    pub const ALL: [Category; 2] = [Category::Doping, Category::NoDoping];

    /// Class carried by the legend entry
    pub fn legend_class(&self) -> &'static str {
        match self {
            Category::Doping => "doping",
            Category::NoDoping => "no-doping",
        }
    }

    /// Class carried by the markers of this category
    pub fn marker_class(&self) -> &'static str {
        match self {
            Category::Doping => "red",
            Category::NoDoping => "green",
        }
    }

    /// Fill color for markers and legend swatch
    pub fn fill(&self) -> &'static str {
        self.marker_class()
    }

    /// Legend label
    pub fn label(&self) -> &'static str {
        match self {
            Category::Doping => "Cyclists with doping allegations",
            Category::NoDoping => "Cyclists without allegations",
        }
    }

    /// Parse from the legend class name
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "doping" | "red" => Some(Category::Doping),
            "no-doping" | "nodoping" | "green" => Some(Category::NoDoping),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.legend_class())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_record_deserialization() {
        let json = r#"{
            "Time": "36:50",
            "Place": 1,
            "Seconds": 2210,
            "Name": "Marco Pantani",
            "Year": 1995,
            "Nationality": "ITA",
            "Doping": "Alleged drug use during 1995 due to high hematocrit levels",
            "URL": "https://en.wikipedia.org/wiki/Marco_Pantani#Alleged_drug_use"
        }"#;

        let raw: RawRecord = serde_json::from_str(json).unwrap();
        assert_eq!(raw.time, "36:50");
        assert_eq!(raw.place, 1);
        assert_eq!(raw.year, 1995);
        assert_eq!(raw.seconds, Some(2210));
        assert!(raw.doping.starts_with("Alleged"));
    }

    #[test]
    fn test_raw_record_optional_fields() {
        let json = r#"{"Time": "39:01", "Place": 30, "Name": "Nairo Quintana",
                       "Year": 2015, "Nationality": "COL"}"#;

        let raw: RawRecord = serde_json::from_str(json).unwrap();
        assert!(raw.doping.is_empty());
        assert!(raw.url.is_empty());
        assert_eq!(raw.seconds, None);
    }

    #[test]
    fn test_raw_record_field_names_are_case_sensitive() {
        let json = r#"{"time": "39:01", "place": 30, "name": "x", "year": 2015, "nationality": "COL"}"#;
        assert!(serde_json::from_str::<RawRecord>(json).is_err());
    }

    #[test]
    fn test_category_classes() {
        assert_eq!(Category::Doping.legend_class(), "doping");
        assert_eq!(Category::Doping.marker_class(), "red");
        assert_eq!(Category::NoDoping.legend_class(), "no-doping");
        assert_eq!(Category::NoDoping.marker_class(), "green");
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!(Category::parse("doping"), Some(Category::Doping));
        assert_eq!(Category::parse("No-Doping"), Some(Category::NoDoping));
        assert_eq!(Category::parse("green"), Some(Category::NoDoping));
        assert_eq!(Category::parse("purple"), None);
    }
}
