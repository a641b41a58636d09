use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::section::SectionToggles;
use crate::models::UnknownVariant;

pub const DEFAULT_HEADLINE: &str = "My Professional Profile";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

impl TryFrom<String> for Sex {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "male" => Ok(Sex::Male),
            "female" => Ok(Sex::Female),
            _ => Err(UnknownVariant::new("sex", value)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CivilStatus {
    Single,
    Married,
    Divorced,
    Widowed,
    CommonLaw,
}

impl CivilStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CivilStatus::Single => "single",
            CivilStatus::Married => "married",
            CivilStatus::Divorced => "divorced",
            CivilStatus::Widowed => "widowed",
            CivilStatus::CommonLaw => "common_law",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CivilStatus::Single => "Single",
            CivilStatus::Married => "Married",
            CivilStatus::Divorced => "Divorced",
            CivilStatus::Widowed => "Widowed",
            CivilStatus::CommonLaw => "Common-law union",
        }
    }
}

impl TryFrom<String> for CivilStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "single" => Ok(CivilStatus::Single),
            "married" => Ok(CivilStatus::Married),
            "divorced" => Ok(CivilStatus::Divorced),
            "widowed" => Ok(CivilStatus::Widowed),
            "common_law" => Ok(CivilStatus::CommonLaw),
            _ => Err(UnknownVariant::new("civil_status", value)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DrivingLicense {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    #[default]
    None,
}

impl DrivingLicense {
    pub fn as_str(&self) -> &'static str {
        match self {
            DrivingLicense::A => "A",
            DrivingLicense::B => "B",
            DrivingLicense::C => "C",
            DrivingLicense::D => "D",
            DrivingLicense::E => "E",
            DrivingLicense::F => "F",
            DrivingLicense::G => "G",
            DrivingLicense::None => "None",
        }
    }

    pub fn label(&self) -> String {
        match self {
            DrivingLicense::None => "None".to_string(),
            other => format!("Type {}", other.as_str()),
        }
    }
}

impl TryFrom<String> for DrivingLicense {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "A" => Ok(DrivingLicense::A),
            "B" => Ok(DrivingLicense::B),
            "C" => Ok(DrivingLicense::C),
            "D" => Ok(DrivingLicense::D),
            "E" => Ok(DrivingLicense::E),
            "F" => Ok(DrivingLicense::F),
            "G" => Ok(DrivingLicense::G),
            "None" => Ok(DrivingLicense::None),
            _ => Err(UnknownVariant::new("driving_license", value)),
        }
    }
}

/// The single owning record per user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub headline: String,
    pub first_names: String,
    pub last_names: String,
    pub nationality: String,
    pub birth_place: String,
    /// Nullable in storage for rows imported before the field was required.
    pub birth_date: Option<NaiveDate>,
    pub national_id: String,
    #[sqlx(try_from = "String")]
    pub sex: Sex,
    #[sqlx(try_from = "String")]
    pub civil_status: CivilStatus,
    #[sqlx(try_from = "String")]
    pub driving_license: DrivingLicense,
    pub landline_phone: String,
    pub mobile_phone: String,
    pub work_address: String,
    pub home_address: String,
    pub website: Option<String>,
    pub photo: Option<String>,
    pub slug: String,
    #[sqlx(flatten)]
    pub sections: SectionToggles,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_names.trim(), self.last_names.trim())
            .trim()
            .to_string()
    }
}

/// Metadata of an uploaded file. Only the name and size travel through this
/// service; the bytes live in external storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadMeta {
    pub file_name: String,
    pub size_bytes: u64,
}

/// Request body for creating a profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProfile {
    pub user_id: Uuid,
    #[serde(default = "default_headline")]
    pub headline: String,
    pub first_names: String,
    pub last_names: String,
    #[serde(default)]
    pub nationality: String,
    #[serde(default)]
    pub birth_place: String,
    pub birth_date: NaiveDate,
    pub national_id: String,
    pub sex: Sex,
    pub civil_status: CivilStatus,
    #[serde(default)]
    pub driving_license: DrivingLicense,
    #[serde(default)]
    pub landline_phone: String,
    #[serde(default)]
    pub mobile_phone: String,
    #[serde(default)]
    pub work_address: String,
    pub home_address: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub photo: Option<UploadMeta>,
    #[serde(default)]
    pub sections: SectionToggles,
}

fn default_headline() -> String {
    DEFAULT_HEADLINE.to_string()
}

impl NewProfile {
    /// Materializes the stored profile row. `suffix` disambiguates the slug.
    pub fn into_profile(self, id: Uuid, suffix: &str, now: DateTime<Utc>) -> Profile {
        let slug = make_slug(&self.first_names, &self.last_names, suffix);
        Profile {
            id,
            user_id: self.user_id,
            headline: self.headline.trim().to_string(),
            first_names: self.first_names.trim().to_string(),
            last_names: self.last_names.trim().to_string(),
            nationality: self.nationality.trim().to_string(),
            birth_place: self.birth_place.trim().to_string(),
            birth_date: Some(self.birth_date),
            national_id: self.national_id.trim().to_string(),
            sex: self.sex,
            civil_status: self.civil_status,
            driving_license: self.driving_license,
            landline_phone: self.landline_phone.trim().to_string(),
            mobile_phone: self.mobile_phone.trim().to_string(),
            work_address: self.work_address.trim().to_string(),
            home_address: self.home_address.trim().to_string(),
            website: self
                .website
                .map(|w| w.trim().to_string())
                .filter(|w| !w.is_empty()),
            photo: self.photo.map(|p| p.file_name),
            slug,
            sections: self.sections,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Builds `first-last-suffix` with the name part slugified to ASCII.
pub fn make_slug(first_names: &str, last_names: &str, suffix: &str) -> String {
    let mut slug = slug::slugify(format!("{first_names} {last_names}"));
    if !suffix.is_empty() {
        if !slug.is_empty() {
            slug.push('-');
        }
        slug.push_str(suffix);
    }
    slug
}
