use serde::{Deserialize, Serialize};

use crate::models::profile::{Profile, DEFAULT_HEADLINE};
use crate::models::records::ProfileRecords;
use crate::models::section::Section;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum CompletenessStatus {
    Complete,
    Good,
    Partial,
    Sparse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletenessItem {
    pub key: String,
    pub weight: u8,
    pub satisfied: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletenessReport {
    /// 0 – 100
    pub score: u8,
    pub status: CompletenessStatus,
    pub items: Vec<CompletenessItem>,
    pub recommendations: Vec<String>,
}

enum Check {
    Photo,
    Headline,
    Website,
    Section(Section),
}

/// Weights sum to 100.
const CHECKS: &[(&str, u8, Check)] = &[
    ("photo", 10, Check::Photo),
    ("headline", 10, Check::Headline),
    ("experience", 25, Check::Section(Section::Experience)),
    ("courses", 15, Check::Section(Section::Courses)),
    ("awards", 10, Check::Section(Section::Awards)),
    ("academic_products", 10, Check::Section(Section::AcademicProducts)),
    ("work_products", 10, Check::Section(Section::WorkProducts)),
    ("website", 10, Check::Website),
];

pub fn compute_completeness_report(
    profile: &Profile,
    records: &ProfileRecords,
) -> CompletenessReport {
    let mut items = Vec::with_capacity(CHECKS.len());
    let mut recommendations = Vec::new();
    let mut score: u32 = 0;

    for (key, weight, check) in CHECKS {
        let satisfied = match check {
            Check::Photo => profile.photo.is_some(),
            Check::Headline => {
                let headline = profile.headline.trim();
                !headline.is_empty() && headline != DEFAULT_HEADLINE
            }
            Check::Website => profile.website.is_some(),
            Check::Section(section) => records.visible_count(*section) > 0,
        };

        if satisfied {
            score += u32::from(*weight);
        } else {
            recommendations.push(match check {
                Check::Photo => "Upload a profile photo".to_string(),
                Check::Headline => "Write a headline that describes your profile".to_string(),
                Check::Website => "Add a personal website or portfolio link".to_string(),
                Check::Section(section) => format!(
                    "Add at least one visible record to {}",
                    section.heading().to_lowercase()
                ),
            });
        }

        items.push(CompletenessItem {
            key: key.to_string(),
            weight: *weight,
            satisfied,
        });
    }

    let score = score.min(100) as u8;
    let status = match score {
        s if s >= 90 => CompletenessStatus::Complete,
        s if s >= 60 => CompletenessStatus::Good,
        s if s >= 30 => CompletenessStatus::Partial,
        _ => CompletenessStatus::Sparse,
    };

    CompletenessReport {
        score,
        status,
        items,
        recommendations,
    }
}
