//! Field-level checks run before any profile or record is persisted.
//!
//! Every check appends to a list of `FieldError`s instead of returning early,
//! so a caller sees all problems with a submission at once. A field reports at
//! most one message. Any error blocks the save.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use crate::models::profile::{NewProfile, UploadMeta};
use crate::models::records::{
    NewAcademicProduct, NewAward, NewCourse, NewMiscListing, NewRecord, NewWorkExperience,
    NewWorkProduct,
};
use crate::profile::dates::age_on;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        FieldError {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

const MIN_AGE: i32 = 15;
const MAX_AGE: i32 = 100;
const NATIONAL_ID_DIGITS: usize = 10;
/// Seven significant digits with two decimals: 99 999.99.
const MAX_PRICE_CENTS: i64 = 9_999_999;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];
const CERTIFICATE_EXTENSIONS: &[&str] = &["pdf", "jpg", "jpeg", "png"];

const MB: u64 = 1024 * 1024;

/// Size ceilings for uploaded files, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_image_bytes: u64,
    pub max_certificate_bytes: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        UploadLimits {
            max_image_bytes: 5 * MB,
            max_certificate_bytes: 10 * MB,
        }
    }
}

impl UploadLimits {
    /// `None` when either limit does not fit in a byte count.
    pub fn from_megabytes(image_mb: u64, certificate_mb: u64) -> Option<Self> {
        Some(UploadLimits {
            max_image_bytes: image_mb.checked_mul(MB)?,
            max_certificate_bytes: certificate_mb.checked_mul(MB)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Image,
    Certificate,
}

/// Checks an upload's extension and size. Returns the message to report on failure.
pub fn validate_upload(
    meta: &UploadMeta,
    kind: UploadKind,
    limits: &UploadLimits,
) -> Result<(), String> {
    let (allowed, max_bytes) = match kind {
        UploadKind::Image => (IMAGE_EXTENSIONS, limits.max_image_bytes),
        UploadKind::Certificate => (CERTIFICATE_EXTENSIONS, limits.max_certificate_bytes),
    };

    let extension = meta
        .file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    if !allowed.contains(&extension.as_str()) {
        return Err(format!(
            "file type '{}' is not allowed; expected one of: {}",
            extension,
            allowed.join(", ")
        ));
    }
    if meta.size_bytes == 0 {
        return Err("file is empty".to_string());
    }
    if meta.size_bytes > max_bytes {
        return Err(format!(
            "file exceeds the {} MB limit",
            max_bytes.div_ceil(MB)
        ));
    }
    Ok(())
}

/// Checks a start/end pair: the start must not be in the future and, when
/// present, the end must be neither in the future nor before the start.
pub fn validate_date_range(
    start: NaiveDate,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<(), Vec<FieldError>> {
    let mut checker = Checker::new(today, UploadLimits::default());
    checker.date_range("start_date", start, "end_date", end);
    checker.finish()
}

pub fn validate_profile(
    profile: &NewProfile,
    today: NaiveDate,
    limits: &UploadLimits,
) -> Result<(), Vec<FieldError>> {
    let mut c = Checker::new(today, *limits);

    c.required("headline", &profile.headline, 50);
    c.required("first_names", &profile.first_names, 60);
    c.required("last_names", &profile.last_names, 60);
    c.optional("nationality", &profile.nationality, 20);
    c.optional("birth_place", &profile.birth_place, 60);
    c.birth_date("birth_date", profile.birth_date);
    c.national_id("national_id", &profile.national_id);
    c.optional("landline_phone", &profile.landline_phone, 15);
    c.optional("mobile_phone", &profile.mobile_phone, 15);
    c.optional("work_address", &profile.work_address, 50);
    c.required("home_address", &profile.home_address, 50);
    c.url("website", profile.website.as_deref(), 60);
    c.upload("photo", profile.photo.as_ref(), UploadKind::Image);

    c.finish()
}

pub fn validate_record(
    record: &NewRecord,
    today: NaiveDate,
    limits: &UploadLimits,
) -> Result<(), Vec<FieldError>> {
    let mut c = Checker::new(today, *limits);
    match record {
        NewRecord::Experience(r) => check_experience(&mut c, r),
        NewRecord::Awards(r) => check_award(&mut c, r),
        NewRecord::Courses(r) => check_course(&mut c, r),
        NewRecord::AcademicProducts(r) => check_academic_product(&mut c, r),
        NewRecord::WorkProducts(r) => check_work_product(&mut c, r),
        NewRecord::MiscListings(r) => check_misc_listing(&mut c, r),
    }
    c.finish()
}

fn check_experience(c: &mut Checker, r: &NewWorkExperience) {
    c.required("position", &r.position, 100);
    c.required("company", &r.company, 50);
    c.required("location", &r.location, 50);
    c.email("company_email", &r.company_email, 100);
    c.url("company_website", r.company_website.as_deref(), 100);
    c.optional("contact_name", &r.contact_name, 100);
    c.optional("contact_phone", &r.contact_phone, 60);
    c.date_range("start_date", r.start_date, "end_date", r.end_date);
    c.required("description", &r.description, usize::MAX);
    c.upload("certificate", r.certificate.as_ref(), UploadKind::Certificate);
}

fn check_award(c: &mut Checker, r: &NewAward) {
    c.not_future("awarded_on", r.awarded_on);
    c.required("description", &r.description, usize::MAX);
    c.required("sponsor", &r.sponsor, 100);
    c.optional("contact_name", &r.contact_name, 100);
    c.optional("contact_phone", &r.contact_phone, 60);
    c.upload("certificate", r.certificate.as_ref(), UploadKind::Certificate);
}

fn check_course(c: &mut Checker, r: &NewCourse) {
    c.required("name", &r.name, 100);
    c.date_range("start_date", r.start_date, "end_date", Some(r.end_date));
    if r.total_hours < 1 {
        c.push("total_hours", "must be at least 1 hour");
    }
    c.required("description", &r.description, usize::MAX);
    c.required("sponsor", &r.sponsor, 100);
    c.optional("contact_name", &r.contact_name, 100);
    c.optional("contact_phone", &r.contact_phone, 60);
    c.email("sponsor_email", &r.sponsor_email, 60);
    c.upload("certificate", r.certificate.as_ref(), UploadKind::Certificate);
}

fn check_academic_product(c: &mut Checker, r: &NewAcademicProduct) {
    c.required("name", &r.name, 100);
    if r.classifier.split(',').all(|t| t.trim().is_empty()) {
        c.push("classifier", "at least one comma-separated tag is required");
    }
    c.required("description", &r.description, usize::MAX);
}

fn check_work_product(c: &mut Checker, r: &NewWorkProduct) {
    c.required("name", &r.name, 100);
    c.not_future("produced_on", r.produced_on);
    c.required("description", &r.description, usize::MAX);
}

fn check_misc_listing(c: &mut Checker, r: &NewMiscListing) {
    c.required("name", &r.name, 100);
    c.required("description", &r.description, usize::MAX);
    if r.price_cents < 0 {
        c.push("price_cents", "price cannot be negative");
    } else if r.price_cents > MAX_PRICE_CENTS {
        c.push("price_cents", "price cannot exceed 99999.99");
    }
    c.upload("image", r.image.as_ref(), UploadKind::Image);
}

// ────────────────────────────────────────────────────────────────────────────
// Checker
// ────────────────────────────────────────────────────────────────────────────

struct Checker {
    today: NaiveDate,
    limits: UploadLimits,
    errors: Vec<FieldError>,
}

impl Checker {
    fn new(today: NaiveDate, limits: UploadLimits) -> Self {
        Checker {
            today,
            limits,
            errors: Vec::new(),
        }
    }

    fn push(&mut self, field: &str, message: impl Into<String>) {
        if self.errors.iter().any(|e| e.field == field) {
            return;
        }
        self.errors.push(FieldError::new(field, message));
    }

    fn finish(self) -> Result<(), Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }

    fn required(&mut self, field: &str, value: &str, max_chars: usize) {
        if value.trim().is_empty() {
            self.push(field, "this field is required");
        } else {
            self.optional(field, value, max_chars);
        }
    }

    fn optional(&mut self, field: &str, value: &str, max_chars: usize) {
        let len = value.trim().chars().count();
        if len > max_chars {
            self.push(
                field,
                format!("must be at most {max_chars} characters (got {len})"),
            );
        }
    }

    fn not_future(&mut self, field: &str, date: NaiveDate) {
        if date > self.today {
            self.push(field, "date cannot be in the future");
        }
    }

    fn date_range(
        &mut self,
        start_field: &str,
        start: NaiveDate,
        end_field: &str,
        end: Option<NaiveDate>,
    ) {
        self.not_future(start_field, start);
        if let Some(end) = end {
            if end > self.today {
                self.push(end_field, "end date cannot be in the future");
            } else if end < start {
                self.push(end_field, "end date cannot be before the start date");
            }
        }
    }

    fn birth_date(&mut self, field: &str, birth: NaiveDate) {
        if birth > self.today {
            self.push(field, "birth date cannot be in the future");
            return;
        }
        let age = age_on(birth, self.today);
        if !(MIN_AGE..=MAX_AGE).contains(&age) {
            self.push(
                field,
                format!("age must be between {MIN_AGE} and {MAX_AGE} years (got {age})"),
            );
        }
    }

    fn national_id(&mut self, field: &str, value: &str) {
        let value = value.trim();
        if value.len() != NATIONAL_ID_DIGITS || !value.chars().all(|c| c.is_ascii_digit()) {
            self.push(
                field,
                format!("must be exactly {NATIONAL_ID_DIGITS} digits"),
            );
        }
    }

    /// Blank is accepted; a non-blank value must be a valid address with a
    /// dot-atom local part and a dotted domain.
    fn email(&mut self, field: &str, value: &str, max_chars: usize) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        self.optional(field, value, max_chars);
        if !is_email(value) {
            self.push(field, "enter a valid email address");
        }
    }

    fn url(&mut self, field: &str, value: Option<&str>, max_chars: usize) {
        let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return;
        };
        self.optional(field, value, max_chars);
        match url::Url::parse(value) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => {}
            _ => self.push(field, "enter a valid http(s) URL"),
        }
    }

    fn upload(&mut self, field: &str, meta: Option<&UploadMeta>, kind: UploadKind) {
        if let Some(meta) = meta {
            if let Err(message) = validate_upload(meta, kind, &self.limits) {
                self.push(field, message);
            }
        }
    }
}

/// HTML5 email syntax, without empty dot-separated local atoms and
/// single-label domains.
fn is_email(value: &str) -> bool {
    if !value.to_owned().validate_email() {
        return false;
    }
    let Some((local, domain)) = value.rsplit_once('@') else {
        return false;
    };
    local.split('.').all(|atom| !atom.is_empty())
        && domain
            .rsplit_once('.')
            .is_some_and(|(_, tld)| tld.len() >= 2)
}
