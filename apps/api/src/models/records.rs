use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::profile::UploadMeta;
use crate::models::section::Section;
use crate::models::UnknownVariant;

/// Common view over every child record set of a profile.
pub trait CvRecord {
    fn id(&self) -> Uuid;
    fn is_visible(&self) -> bool;
    /// Instant the record is ordered by (newest first). Dated records sort
    /// from the start of their day; undated ones by creation time.
    fn sort_key(&self) -> NaiveDateTime;
    /// Insertion time, used to break ties between equal sort keys.
    fn created_at(&self) -> DateTime<Utc>;
}

macro_rules! impl_cv_record {
    ($ty:ty, |$r:ident| $sort:expr) => {
        impl CvRecord for $ty {
            fn id(&self) -> Uuid {
                self.id
            }
            fn is_visible(&self) -> bool {
                self.visible
            }
            fn sort_key(&self) -> NaiveDateTime {
                let $r = self;
                $sort
            }
            fn created_at(&self) -> DateTime<Utc> {
                self.created_at
            }
        }
    };
}

fn start_of(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

// ────────────────────────────────────────────────────────────────────────────
// Enumerations
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AwardKind {
    Academic,
    Public,
    Private,
}

impl AwardKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AwardKind::Academic => "academic",
            AwardKind::Public => "public",
            AwardKind::Private => "private",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AwardKind::Academic => "Academic",
            AwardKind::Public => "Public",
            AwardKind::Private => "Private",
        }
    }
}

impl TryFrom<String> for AwardKind {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "academic" => Ok(AwardKind::Academic),
            "public" => Ok(AwardKind::Public),
            "private" => Ok(AwardKind::Private),
            _ => Err(UnknownVariant::new("award kind", value)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingCondition {
    Good,
    Fair,
}

impl ListingCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingCondition::Good => "good",
            ListingCondition::Fair => "fair",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ListingCondition::Good => "Good",
            ListingCondition::Fair => "Fair",
        }
    }
}

impl TryFrom<String> for ListingCondition {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "good" => Ok(ListingCondition::Good),
            "fair" => Ok(ListingCondition::Fair),
            _ => Err(UnknownVariant::new("listing condition", value)),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stored records
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkExperience {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub position: String,
    pub company: String,
    pub location: String,
    pub company_email: String,
    pub company_website: Option<String>,
    pub contact_name: String,
    pub contact_phone: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub description: String,
    pub certificate: Option<String>,
    pub visible: bool,
    pub created_at: DateTime<Utc>,
}

impl_cv_record!(WorkExperience, |r| start_of(r.start_date));

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Award {
    pub id: Uuid,
    pub profile_id: Uuid,
    #[sqlx(try_from = "String")]
    pub kind: AwardKind,
    pub awarded_on: NaiveDate,
    pub description: String,
    pub sponsor: String,
    pub contact_name: String,
    pub contact_phone: String,
    pub certificate: Option<String>,
    pub visible: bool,
    pub created_at: DateTime<Utc>,
}

impl_cv_record!(Award, |r| start_of(r.awarded_on));

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_hours: i32,
    pub description: String,
    pub sponsor: String,
    pub contact_name: String,
    pub contact_phone: String,
    pub sponsor_email: String,
    pub certificate: Option<String>,
    pub visible: bool,
    pub created_at: DateTime<Utc>,
}

impl_cv_record!(Course, |r| start_of(r.start_date));

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AcademicProduct {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub name: String,
    /// Comma-separated tags.
    pub classifier: String,
    pub description: String,
    pub visible: bool,
    pub created_at: DateTime<Utc>,
}

impl_cv_record!(AcademicProduct, |r| r.created_at.naive_utc());

impl AcademicProduct {
    pub fn tags(&self) -> Vec<&str> {
        self.classifier
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkProduct {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub name: String,
    pub produced_on: NaiveDate,
    pub description: String,
    pub visible: bool,
    pub created_at: DateTime<Utc>,
}

impl_cv_record!(WorkProduct, |r| start_of(r.produced_on));

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MiscListing {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub name: String,
    #[sqlx(try_from = "String")]
    pub condition: ListingCondition,
    pub description: String,
    pub price_cents: i64,
    pub published_on: NaiveDate,
    pub image: Option<String>,
    pub visible: bool,
    pub created_at: DateTime<Utc>,
}

impl_cv_record!(MiscListing, |r| start_of(r.published_on));

/// All child records of one profile, grouped by section.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileRecords {
    pub experience: Vec<WorkExperience>,
    pub awards: Vec<Award>,
    pub courses: Vec<Course>,
    pub academic_products: Vec<AcademicProduct>,
    pub work_products: Vec<WorkProduct>,
    pub misc_listings: Vec<MiscListing>,
}

impl ProfileRecords {
    pub fn push(&mut self, record: StoredRecord) {
        match record {
            StoredRecord::Experience(r) => self.experience.push(r),
            StoredRecord::Awards(r) => self.awards.push(r),
            StoredRecord::Courses(r) => self.courses.push(r),
            StoredRecord::AcademicProducts(r) => self.academic_products.push(r),
            StoredRecord::WorkProducts(r) => self.work_products.push(r),
            StoredRecord::MiscListings(r) => self.misc_listings.push(r),
        }
    }

    /// Number of visible records in a section.
    pub fn visible_count(&self, section: Section) -> usize {
        fn count<R: CvRecord>(records: &[R]) -> usize {
            records.iter().filter(|r| r.is_visible()).count()
        }
        match section {
            Section::Experience => count(&self.experience),
            Section::Awards => count(&self.awards),
            Section::Courses => count(&self.courses),
            Section::AcademicProducts => count(&self.academic_products),
            Section::WorkProducts => count(&self.work_products),
            Section::MiscListings => count(&self.misc_listings),
        }
    }
}

/// A freshly built record, tagged with its section.
#[derive(Debug, Clone)]
pub enum StoredRecord {
    Experience(WorkExperience),
    Awards(Award),
    Courses(Course),
    AcademicProducts(AcademicProduct),
    WorkProducts(WorkProduct),
    MiscListings(MiscListing),
}

impl StoredRecord {
    pub fn id(&self) -> Uuid {
        match self {
            StoredRecord::Experience(r) => r.id,
            StoredRecord::Awards(r) => r.id,
            StoredRecord::Courses(r) => r.id,
            StoredRecord::AcademicProducts(r) => r.id,
            StoredRecord::WorkProducts(r) => r.id,
            StoredRecord::MiscListings(r) => r.id,
        }
    }

    pub fn section(&self) -> Section {
        match self {
            StoredRecord::Experience(_) => Section::Experience,
            StoredRecord::Awards(_) => Section::Awards,
            StoredRecord::Courses(_) => Section::Courses,
            StoredRecord::AcademicProducts(_) => Section::AcademicProducts,
            StoredRecord::WorkProducts(_) => Section::WorkProducts,
            StoredRecord::MiscListings(_) => Section::MiscListings,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Request bodies
// ────────────────────────────────────────────────────────────────────────────

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWorkExperience {
    pub position: String,
    pub company: String,
    pub location: String,
    #[serde(default)]
    pub company_email: String,
    #[serde(default)]
    pub company_website: Option<String>,
    #[serde(default)]
    pub contact_name: String,
    #[serde(default)]
    pub contact_phone: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub description: String,
    #[serde(default)]
    pub certificate: Option<UploadMeta>,
    #[serde(default = "default_true")]
    pub visible: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAward {
    pub kind: AwardKind,
    pub awarded_on: NaiveDate,
    pub description: String,
    pub sponsor: String,
    #[serde(default)]
    pub contact_name: String,
    #[serde(default)]
    pub contact_phone: String,
    #[serde(default)]
    pub certificate: Option<UploadMeta>,
    #[serde(default = "default_true")]
    pub visible: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCourse {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_hours: i32,
    pub description: String,
    pub sponsor: String,
    #[serde(default)]
    pub contact_name: String,
    #[serde(default)]
    pub contact_phone: String,
    #[serde(default)]
    pub sponsor_email: String,
    #[serde(default)]
    pub certificate: Option<UploadMeta>,
    #[serde(default = "default_true")]
    pub visible: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAcademicProduct {
    pub name: String,
    pub classifier: String,
    pub description: String,
    #[serde(default = "default_true")]
    pub visible: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWorkProduct {
    pub name: String,
    pub produced_on: NaiveDate,
    pub description: String,
    #[serde(default = "default_true")]
    pub visible: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMiscListing {
    pub name: String,
    pub condition: ListingCondition,
    pub description: String,
    pub price_cents: i64,
    /// Defaults to the day the listing is saved.
    #[serde(default)]
    pub published_on: Option<NaiveDate>,
    #[serde(default)]
    pub image: Option<UploadMeta>,
    #[serde(default = "default_true")]
    pub visible: bool,
}

/// Request body for adding a record to any section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "section", rename_all = "snake_case")]
pub enum NewRecord {
    Experience(NewWorkExperience),
    Awards(NewAward),
    Courses(NewCourse),
    AcademicProducts(NewAcademicProduct),
    WorkProducts(NewWorkProduct),
    MiscListings(NewMiscListing),
}

fn trimmed(s: &str) -> String {
    s.trim().to_string()
}

fn trimmed_opt(s: &Option<String>) -> Option<String> {
    s.as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl NewRecord {
    pub fn section(&self) -> Section {
        match self {
            NewRecord::Experience(_) => Section::Experience,
            NewRecord::Awards(_) => Section::Awards,
            NewRecord::Courses(_) => Section::Courses,
            NewRecord::AcademicProducts(_) => Section::AcademicProducts,
            NewRecord::WorkProducts(_) => Section::WorkProducts,
            NewRecord::MiscListings(_) => Section::MiscListings,
        }
    }

    /// Builds the stored form of the record. `today` fills defaulted dates.
    pub fn build(
        &self,
        id: Uuid,
        profile_id: Uuid,
        created_at: DateTime<Utc>,
        today: NaiveDate,
    ) -> StoredRecord {
        match self {
            NewRecord::Experience(r) => StoredRecord::Experience(WorkExperience {
                id,
                profile_id,
                position: trimmed(&r.position),
                company: trimmed(&r.company),
                location: trimmed(&r.location),
                company_email: trimmed(&r.company_email),
                company_website: trimmed_opt(&r.company_website),
                contact_name: trimmed(&r.contact_name),
                contact_phone: trimmed(&r.contact_phone),
                start_date: r.start_date,
                end_date: r.end_date,
                description: trimmed(&r.description),
                certificate: r.certificate.as_ref().map(|c| c.file_name.clone()),
                visible: r.visible,
                created_at,
            }),
            NewRecord::Awards(r) => StoredRecord::Awards(Award {
                id,
                profile_id,
                kind: r.kind,
                awarded_on: r.awarded_on,
                description: trimmed(&r.description),
                sponsor: trimmed(&r.sponsor),
                contact_name: trimmed(&r.contact_name),
                contact_phone: trimmed(&r.contact_phone),
                certificate: r.certificate.as_ref().map(|c| c.file_name.clone()),
                visible: r.visible,
                created_at,
            }),
            NewRecord::Courses(r) => StoredRecord::Courses(Course {
                id,
                profile_id,
                name: trimmed(&r.name),
                start_date: r.start_date,
                end_date: r.end_date,
                total_hours: r.total_hours,
                description: trimmed(&r.description),
                sponsor: trimmed(&r.sponsor),
                contact_name: trimmed(&r.contact_name),
                contact_phone: trimmed(&r.contact_phone),
                sponsor_email: trimmed(&r.sponsor_email),
                certificate: r.certificate.as_ref().map(|c| c.file_name.clone()),
                visible: r.visible,
                created_at,
            }),
            NewRecord::AcademicProducts(r) => StoredRecord::AcademicProducts(AcademicProduct {
                id,
                profile_id,
                name: trimmed(&r.name),
                classifier: trimmed(&r.classifier),
                description: trimmed(&r.description),
                visible: r.visible,
                created_at,
            }),
            NewRecord::WorkProducts(r) => StoredRecord::WorkProducts(WorkProduct {
                id,
                profile_id,
                name: trimmed(&r.name),
                produced_on: r.produced_on,
                description: trimmed(&r.description),
                visible: r.visible,
                created_at,
            }),
            NewRecord::MiscListings(r) => StoredRecord::MiscListings(MiscListing {
                id,
                profile_id,
                name: trimmed(&r.name),
                condition: r.condition,
                description: trimmed(&r.description),
                price_cents: r.price_cents,
                published_on: r.published_on.unwrap_or(today),
                image: r.image.as_ref().map(|i| i.file_name.clone()),
                visible: r.visible,
                created_at,
            }),
        }
    }
}
