use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::UnknownVariant;

/// The six record sections of a CV, in the order they are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Experience,
    Awards,
    Courses,
    AcademicProducts,
    WorkProducts,
    MiscListings,
}

impl Section {
    /// Fixed print order. Sections are never reordered per profile.
    pub const ALL: [Section; 6] = [
        Section::Experience,
        Section::Awards,
        Section::Courses,
        Section::AcademicProducts,
        Section::WorkProducts,
        Section::MiscListings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Experience => "experience",
            Section::Awards => "awards",
            Section::Courses => "courses",
            Section::AcademicProducts => "academic_products",
            Section::WorkProducts => "work_products",
            Section::MiscListings => "misc_listings",
        }
    }

    /// Heading printed above the section in the generated document.
    pub fn heading(&self) -> &'static str {
        match self {
            Section::Experience => "WORK EXPERIENCE",
            Section::Awards => "AWARDS",
            Section::Courses => "COURSES",
            Section::AcademicProducts => "ACADEMIC PRODUCTS",
            Section::WorkProducts => "WORK PRODUCTS",
            Section::MiscListings => "MISCELLANEOUS LISTINGS",
        }
    }

    /// Backing table in the relational store.
    pub fn table(&self) -> &'static str {
        match self {
            Section::Experience => "work_experiences",
            Section::Awards => "awards",
            Section::Courses => "courses",
            Section::AcademicProducts => "academic_products",
            Section::WorkProducts => "work_products",
            Section::MiscListings => "misc_listings",
        }
    }
}

impl FromStr for Section {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Section::ALL
            .into_iter()
            .find(|s| s.as_str() == value)
            .ok_or_else(|| UnknownVariant::new("section", value.to_string()))
    }
}

/// Per-profile switches deciding which sections are eligible for the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct SectionToggles {
    #[sqlx(rename = "show_experience")]
    pub experience: bool,
    #[sqlx(rename = "show_awards")]
    pub awards: bool,
    #[sqlx(rename = "show_courses")]
    pub courses: bool,
    #[sqlx(rename = "show_academic_products")]
    pub academic_products: bool,
    #[sqlx(rename = "show_work_products")]
    pub work_products: bool,
    #[sqlx(rename = "show_misc_listings")]
    pub misc_listings: bool,
}

impl Default for SectionToggles {
    fn default() -> Self {
        Self::all(true)
    }
}

impl SectionToggles {
    pub fn all(enabled: bool) -> Self {
        SectionToggles {
            experience: enabled,
            awards: enabled,
            courses: enabled,
            academic_products: enabled,
            work_products: enabled,
            misc_listings: enabled,
        }
    }

    pub fn is_enabled(&self, section: Section) -> bool {
        match section {
            Section::Experience => self.experience,
            Section::Awards => self.awards,
            Section::Courses => self.courses,
            Section::AcademicProducts => self.academic_products,
            Section::WorkProducts => self.work_products,
            Section::MiscListings => self.misc_listings,
        }
    }

    pub fn with(mut self, section: Section, enabled: bool) -> Self {
        match section {
            Section::Experience => self.experience = enabled,
            Section::Awards => self.awards = enabled,
            Section::Courses => self.courses = enabled,
            Section::AcademicProducts => self.academic_products = enabled,
            Section::WorkProducts => self.work_products = enabled,
            Section::MiscListings => self.misc_listings = enabled,
        }
        self
    }
}

/// A caller's per-request section choice. Any flag left unset falls back
/// to the profile's stored toggle.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct SectionSelection {
    pub experience: Option<bool>,
    pub awards: Option<bool>,
    pub courses: Option<bool>,
    pub academic_products: Option<bool>,
    pub work_products: Option<bool>,
    pub misc_listings: Option<bool>,
}

impl SectionSelection {
    pub fn resolve(&self, stored: SectionToggles) -> SectionToggles {
        SectionToggles {
            experience: self.experience.unwrap_or(stored.experience),
            awards: self.awards.unwrap_or(stored.awards),
            courses: self.courses.unwrap_or(stored.courses),
            academic_products: self.academic_products.unwrap_or(stored.academic_products),
            work_products: self.work_products.unwrap_or(stored.work_products),
            misc_listings: self.misc_listings.unwrap_or(stored.misc_listings),
        }
    }
}
