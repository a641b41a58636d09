//! In-memory `ProfileRepository` used by handler and generation tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::{NewProfile, Profile};
use crate::models::records::{NewRecord, ProfileRecords};
use crate::models::section::{Section, SectionToggles};
use crate::profile::store::{slug_suffix, ProfileRepository};
use crate::profile::validation::FieldError;

#[derive(Default)]
struct Inner {
    profiles: HashMap<Uuid, Profile>,
    records: HashMap<Uuid, ProfileRecords>,
    /// Monotonic insertion clock so `created_at` never ties.
    ticks: i64,
}

impl Inner {
    fn next_instant(&mut self) -> DateTime<Utc> {
        self.ticks += 1;
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_else(Utc::now)
            + Duration::milliseconds(self.ticks)
    }
}

#[derive(Default)]
pub struct InMemoryProfileRepository {
    inner: Mutex<Inner>,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a profile row as-is, bypassing validation. Lets tests seed
    /// rows that the API itself would refuse (e.g. a missing birth date).
    pub fn seed_profile(&self, profile: Profile) {
        let mut inner = self.inner.lock().unwrap();
        inner.records.entry(profile.id).or_default();
        inner.profiles.insert(profile.id, profile);
    }

    pub fn record_count(&self, profile_id: Uuid) -> usize {
        let inner = self.inner.lock().unwrap();
        inner
            .records
            .get(&profile_id)
            .map(|r| {
                r.experience.len()
                    + r.awards.len()
                    + r.courses.len()
                    + r.academic_products.len()
                    + r.work_products.len()
                    + r.misc_listings.len()
            })
            .unwrap_or(0)
    }
}

macro_rules! with_section {
    ($records:expr, $section:expr, |$list:ident| $body:expr) => {
        match $section {
            Section::Experience => {
                let $list = &mut $records.experience;
                $body
            }
            Section::Awards => {
                let $list = &mut $records.awards;
                $body
            }
            Section::Courses => {
                let $list = &mut $records.courses;
                $body
            }
            Section::AcademicProducts => {
                let $list = &mut $records.academic_products;
                $body
            }
            Section::WorkProducts => {
                let $list = &mut $records.work_products;
                $body
            }
            Section::MiscListings => {
                let $list = &mut $records.misc_listings;
                $body
            }
        }
    };
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn create_profile(&self, profile: NewProfile) -> Result<Profile, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let national_id = profile.national_id.trim().to_string();
        if inner
            .profiles
            .values()
            .any(|p| p.national_id == national_id)
        {
            return Err(AppError::Validation(vec![FieldError::new(
                "national_id",
                "this national id is already registered",
            )]));
        }
        if inner.profiles.values().any(|p| p.user_id == profile.user_id) {
            return Err(AppError::Validation(vec![FieldError::new(
                "user_id",
                "this user already has a profile",
            )]));
        }

        let now = inner.next_instant();
        let created = profile.into_profile(Uuid::new_v4(), &slug_suffix(), now);
        inner.records.insert(created.id, ProfileRecords::default());
        inner.profiles.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_profile(&self, profile_id: Uuid) -> Result<Option<Profile>, AppError> {
        Ok(self.inner.lock().unwrap().profiles.get(&profile_id).cloned())
    }

    async fn delete_profile(&self, profile_id: Uuid) -> Result<bool, AppError> {
        let mut inner = self.inner.lock().unwrap();
        inner.records.remove(&profile_id);
        Ok(inner.profiles.remove(&profile_id).is_some())
    }

    async fn update_sections(
        &self,
        profile_id: Uuid,
        sections: SectionToggles,
    ) -> Result<bool, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let now = inner.next_instant();
        match inner.profiles.get_mut(&profile_id) {
            Some(profile) => {
                profile.sections = sections;
                profile.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_record(
        &self,
        profile_id: Uuid,
        record: &NewRecord,
        today: NaiveDate,
    ) -> Result<Uuid, AppError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.profiles.contains_key(&profile_id) {
            return Err(AppError::NotFound(format!("Profile {profile_id} not found")));
        }
        let created_at = inner.next_instant();
        let stored = record.build(Uuid::new_v4(), profile_id, created_at, today);
        let id = stored.id();
        inner.records.entry(profile_id).or_default().push(stored);
        Ok(id)
    }

    async fn set_record_visibility(
        &self,
        profile_id: Uuid,
        section: Section,
        record_id: Uuid,
        visible: bool,
    ) -> Result<bool, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(records) = inner.records.get_mut(&profile_id) else {
            return Ok(false);
        };
        let found = with_section!(records, section, |list| {
            match list.iter_mut().find(|r| r.id == record_id) {
                Some(r) => {
                    r.visible = visible;
                    true
                }
                None => false,
            }
        });
        Ok(found)
    }

    async fn delete_record(
        &self,
        profile_id: Uuid,
        section: Section,
        record_id: Uuid,
    ) -> Result<bool, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(records) = inner.records.get_mut(&profile_id) else {
            return Ok(false);
        };
        let removed = with_section!(records, section, |list| {
            let before = list.len();
            list.retain(|r| r.id != record_id);
            list.len() != before
        });
        Ok(removed)
    }

    async fn load_records(
        &self,
        profile_id: Uuid,
        sections: &[Section],
    ) -> Result<ProfileRecords, AppError> {
        let inner = self.inner.lock().unwrap();
        let all = inner.records.get(&profile_id).cloned().unwrap_or_default();
        let mut out = ProfileRecords::default();
        for section in sections {
            match section {
                Section::Experience => out.experience = all.experience.clone(),
                Section::Awards => out.awards = all.awards.clone(),
                Section::Courses => out.courses = all.courses.clone(),
                Section::AcademicProducts => out.academic_products = all.academic_products.clone(),
                Section::WorkProducts => out.work_products = all.work_products.clone(),
                Section::MiscListings => out.misc_listings = all.misc_listings.clone(),
            }
        }
        Ok(out)
    }
}
