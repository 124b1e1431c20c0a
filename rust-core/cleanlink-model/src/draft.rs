// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Report drafts and their pre-submit validation.
//!
//! Validation collects every failing field in one pass so a form can mark
//! all of them at once; the client refuses to submit a draft that fails.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationErrors;

pub const TITLE_MIN_CHARS: usize = 5;
pub const TITLE_MAX_CHARS: usize = 120;
pub const DESCRIPTION_MIN_CHARS: usize = 10;
pub const DESCRIPTION_MAX_CHARS: usize = 2000;
pub const MAX_IMAGES: usize = 5;

/// Kind of issue a citizen can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportCategory {
    Pothole,
    Garbage,
    Flooding,
    Streetlight,
    Graffiti,
    Other,
}

impl ReportCategory {
    pub const ALL: [ReportCategory; 6] = [
        ReportCategory::Pothole,
        ReportCategory::Garbage,
        ReportCategory::Flooding,
        ReportCategory::Streetlight,
        ReportCategory::Graffiti,
        ReportCategory::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReportCategory::Pothole => "pothole",
            ReportCategory::Garbage => "garbage",
            ReportCategory::Flooding => "flooding",
            ReportCategory::Streetlight => "streetlight",
            ReportCategory::Graffiti => "graffiti",
            ReportCategory::Other => "other",
        }
    }
}

impl fmt::Display for ReportCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| format!("unknown category '{s}'"))
    }
}

/// Report form contents before submission.
///
/// `category` stays a string here because it comes straight from a form
/// field; [`ReportDraft::validate`] checks it against [`ReportCategory`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportDraft {
    pub title: String,
    pub description: String,
    pub category: String,
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image_urls: Vec<String>,
}

impl ReportDraft {
    /// Check every field and return all failures together.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let title = self.title.trim().chars().count();
        if title == 0 {
            errors.push("title", "is required");
        } else if title < TITLE_MIN_CHARS {
            errors.push("title", format!("must be at least {TITLE_MIN_CHARS} characters"));
        } else if title > TITLE_MAX_CHARS {
            errors.push("title", format!("must be at most {TITLE_MAX_CHARS} characters"));
        }

        let description = self.description.trim().chars().count();
        if description < DESCRIPTION_MIN_CHARS {
            errors.push(
                "description",
                format!("must be at least {DESCRIPTION_MIN_CHARS} characters"),
            );
        } else if description > DESCRIPTION_MAX_CHARS {
            errors.push(
                "description",
                format!("must be at most {DESCRIPTION_MAX_CHARS} characters"),
            );
        }

        if self.category.trim().is_empty() {
            errors.push("category", "is required");
        } else if let Err(msg) = self.category.parse::<ReportCategory>() {
            errors.push("category", msg);
        }

        if self.region.trim().is_empty() {
            errors.push("region", "is required");
        }

        if let Some(lat) = self.latitude {
            if !(-90.0..=90.0).contains(&lat) {
                errors.push("latitude", "must be between -90 and 90");
            }
        }
        if let Some(lon) = self.longitude {
            if !(-180.0..=180.0).contains(&lon) {
                errors.push("longitude", "must be between -180 and 180");
            }
        }

        if self.image_urls.len() > MAX_IMAGES {
            errors.push("image_urls", format!("at most {MAX_IMAGES} images allowed"));
        } else if self
            .image_urls
            .iter()
            .any(|u| !(u.starts_with("http://") || u.starts_with("https://")))
        {
            errors.push("image_urls", "must be http(s) URLs");
        }

        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn valid_draft() -> ReportDraft {
        ReportDraft {
            title: "Pothole on Main St".into(),
            description: "Deep pothole next to the bus stop, two cars damaged.".into(),
            category: "pothole".into(),
            region: "Springfield".into(),
            latitude: Some(39.78),
            longitude: Some(-89.65),
            image_urls: vec!["https://cdn.example.org/a.jpg".into()],
        }
    }

    #[test]
    fn test_valid_draft_passes() {
        assert!(valid_draft().validate().is_ok());
    }

    #[test]
    fn test_collects_all_field_errors() {
        let draft = ReportDraft {
            title: "   ".into(),
            description: "short".into(),
            category: "volcano".into(),
            region: "".into(),
            latitude: Some(120.0),
            longitude: Some(-200.0),
            image_urls: vec!["ftp://x".into()],
        };
        let errors = draft.validate().unwrap_err();
        assert_eq!(errors.for_field("title"), Some("is required"));
        assert!(errors.for_field("description").is_some());
        assert_eq!(errors.for_field("category"), Some("unknown category 'volcano'"));
        assert_eq!(errors.for_field("region"), Some("is required"));
        assert!(errors.for_field("latitude").is_some());
        assert!(errors.for_field("longitude").is_some());
        assert_eq!(errors.for_field("image_urls"), Some("must be http(s) URLs"));
        assert_eq!(errors.len(), 7);
    }

    #[test]
    fn test_title_bounds() {
        let mut draft = valid_draft();
        draft.title = "Hole".into();
        assert!(draft.validate().unwrap_err().for_field("title").is_some());
        draft.title = "x".repeat(TITLE_MAX_CHARS + 1);
        assert!(draft.validate().unwrap_err().for_field("title").is_some());
        draft.title = "x".repeat(TITLE_MAX_CHARS);
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_too_many_images() {
        let mut draft = valid_draft();
        draft.image_urls = vec!["https://cdn.example.org/a.jpg".to_string(); MAX_IMAGES + 1];
        assert_eq!(
            draft.validate().unwrap_err().for_field("image_urls"),
            Some("at most 5 images allowed")
        );
    }

    #[test]
    fn test_category_parse_is_case_insensitive() {
        assert_eq!("Flooding".parse::<ReportCategory>(), Ok(ReportCategory::Flooding));
        assert!("".parse::<ReportCategory>().is_err());
    }

    proptest! {
        #[test]
        fn prop_coordinates_in_range_never_flagged(lat in -90.0f64..=90.0, lon in -180.0f64..=180.0) {
            let mut draft = valid_draft();
            draft.latitude = Some(lat);
            draft.longitude = Some(lon);
            prop_assert!(draft.validate().is_ok());
        }
    }
}
