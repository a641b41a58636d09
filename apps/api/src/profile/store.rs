//! Profile store: repository seam over the relational store.
//!
//! `AppState` holds an `Arc<dyn ProfileRepository>`. Production wires in
//! `PgProfileRepository`; tests use the in-memory repository in `profile::memory`.
//! Child rows are owned by exactly one profile and go away with it through the
//! `ON DELETE CASCADE` foreign keys of the schema.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::{NewProfile, Profile};
use crate::models::records::{
    AcademicProduct, Award, Course, MiscListing, NewRecord, ProfileRecords, StoredRecord,
    WorkExperience, WorkProduct,
};
use crate::models::section::{Section, SectionToggles};
use crate::profile::validation::FieldError;

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn create_profile(&self, profile: NewProfile) -> Result<Profile, AppError>;

    async fn find_profile(&self, profile_id: Uuid) -> Result<Option<Profile>, AppError>;

    /// Returns false when no such profile exists.
    async fn delete_profile(&self, profile_id: Uuid) -> Result<bool, AppError>;

    async fn update_sections(
        &self,
        profile_id: Uuid,
        sections: SectionToggles,
    ) -> Result<bool, AppError>;

    /// Persists an already validated record and returns its id.
    async fn insert_record(
        &self,
        profile_id: Uuid,
        record: &NewRecord,
        today: NaiveDate,
    ) -> Result<Uuid, AppError>;

    async fn set_record_visibility(
        &self,
        profile_id: Uuid,
        section: Section,
        record_id: Uuid,
        visible: bool,
    ) -> Result<bool, AppError>;

    async fn delete_record(
        &self,
        profile_id: Uuid,
        section: Section,
        record_id: Uuid,
    ) -> Result<bool, AppError>;

    /// Loads every record (visible or not) of the requested sections in
    /// insertion order. Sections not requested stay empty.
    async fn load_records(
        &self,
        profile_id: Uuid,
        sections: &[Section],
    ) -> Result<ProfileRecords, AppError>;
}

/// Short random suffix that keeps profile slugs unique.
pub fn slug_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

// ────────────────────────────────────────────────────────────────────────────
// PostgreSQL implementation
// ────────────────────────────────────────────────────────────────────────────

pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        PgProfileRepository { pool }
    }
}

/// Maps unique-constraint violations on profiles to field errors.
fn map_profile_conflict(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some("23505") {
            let constraint = db.constraint().unwrap_or_default();
            let error = if constraint.contains("national_id") {
                FieldError::new("national_id", "this national id is already registered")
            } else if constraint.contains("user_id") {
                FieldError::new("user_id", "this user already has a profile")
            } else {
                FieldError::new("slug", "slug collision, retry the request")
            };
            return AppError::Validation(vec![error]);
        }
    }
    AppError::Database(err)
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn create_profile(&self, profile: NewProfile) -> Result<Profile, AppError> {
        let p = profile.into_profile(Uuid::new_v4(), &slug_suffix(), Utc::now());

        let created = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles
                (id, user_id, headline, first_names, last_names, nationality, birth_place,
                 birth_date, national_id, sex, civil_status, driving_license,
                 landline_phone, mobile_phone, work_address, home_address, website, photo, slug,
                 show_experience, show_awards, show_courses, show_academic_products,
                 show_work_products, show_misc_listings, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                    $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27)
            RETURNING *
            "#,
        )
        .bind(p.id)
        .bind(p.user_id)
        .bind(&p.headline)
        .bind(&p.first_names)
        .bind(&p.last_names)
        .bind(&p.nationality)
        .bind(&p.birth_place)
        .bind(p.birth_date)
        .bind(&p.national_id)
        .bind(p.sex.as_str())
        .bind(p.civil_status.as_str())
        .bind(p.driving_license.as_str())
        .bind(&p.landline_phone)
        .bind(&p.mobile_phone)
        .bind(&p.work_address)
        .bind(&p.home_address)
        .bind(&p.website)
        .bind(&p.photo)
        .bind(&p.slug)
        .bind(p.sections.experience)
        .bind(p.sections.awards)
        .bind(p.sections.courses)
        .bind(p.sections.academic_products)
        .bind(p.sections.work_products)
        .bind(p.sections.misc_listings)
        .bind(p.created_at)
        .bind(p.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_profile_conflict)?;

        info!(profile_id = %created.id, slug = %created.slug, "Created profile");
        Ok(created)
    }

    async fn find_profile(&self, profile_id: Uuid) -> Result<Option<Profile>, AppError> {
        Ok(
            sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
                .bind(profile_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn delete_profile(&self, profile_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(profile_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_sections(
        &self,
        profile_id: Uuid,
        sections: SectionToggles,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET show_experience = $1, show_awards = $2, show_courses = $3,
                show_academic_products = $4, show_work_products = $5,
                show_misc_listings = $6, updated_at = NOW()
            WHERE id = $7
            "#,
        )
        .bind(sections.experience)
        .bind(sections.awards)
        .bind(sections.courses)
        .bind(sections.academic_products)
        .bind(sections.work_products)
        .bind(sections.misc_listings)
        .bind(profile_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_record(
        &self,
        profile_id: Uuid,
        record: &NewRecord,
        today: NaiveDate,
    ) -> Result<Uuid, AppError> {
        let stored = record.build(Uuid::new_v4(), profile_id, Utc::now(), today);
        let id = stored.id();
        let section = stored.section();

        let query = match &stored {
            StoredRecord::Experience(r) => sqlx::query(
                r#"
                INSERT INTO work_experiences
                    (id, profile_id, position, company, location, company_email,
                     company_website, contact_name, contact_phone, start_date, end_date,
                     description, certificate, visible, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
                "#,
            )
            .bind(r.id)
            .bind(r.profile_id)
            .bind(&r.position)
            .bind(&r.company)
            .bind(&r.location)
            .bind(&r.company_email)
            .bind(&r.company_website)
            .bind(&r.contact_name)
            .bind(&r.contact_phone)
            .bind(r.start_date)
            .bind(r.end_date)
            .bind(&r.description)
            .bind(&r.certificate)
            .bind(r.visible)
            .bind(r.created_at),
            StoredRecord::Awards(r) => sqlx::query(
                r#"
                INSERT INTO awards
                    (id, profile_id, kind, awarded_on, description, sponsor, contact_name,
                     contact_phone, certificate, visible, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                "#,
            )
            .bind(r.id)
            .bind(r.profile_id)
            .bind(r.kind.as_str())
            .bind(r.awarded_on)
            .bind(&r.description)
            .bind(&r.sponsor)
            .bind(&r.contact_name)
            .bind(&r.contact_phone)
            .bind(&r.certificate)
            .bind(r.visible)
            .bind(r.created_at),
            StoredRecord::Courses(r) => sqlx::query(
                r#"
                INSERT INTO courses
                    (id, profile_id, name, start_date, end_date, total_hours, description,
                     sponsor, contact_name, contact_phone, sponsor_email, certificate,
                     visible, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
                "#,
            )
            .bind(r.id)
            .bind(r.profile_id)
            .bind(&r.name)
            .bind(r.start_date)
            .bind(r.end_date)
            .bind(r.total_hours)
            .bind(&r.description)
            .bind(&r.sponsor)
            .bind(&r.contact_name)
            .bind(&r.contact_phone)
            .bind(&r.sponsor_email)
            .bind(&r.certificate)
            .bind(r.visible)
            .bind(r.created_at),
            StoredRecord::AcademicProducts(r) => sqlx::query(
                r#"
                INSERT INTO academic_products
                    (id, profile_id, name, classifier, description, visible, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(r.id)
            .bind(r.profile_id)
            .bind(&r.name)
            .bind(&r.classifier)
            .bind(&r.description)
            .bind(r.visible)
            .bind(r.created_at),
            StoredRecord::WorkProducts(r) => sqlx::query(
                r#"
                INSERT INTO work_products
                    (id, profile_id, name, produced_on, description, visible, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(r.id)
            .bind(r.profile_id)
            .bind(&r.name)
            .bind(r.produced_on)
            .bind(&r.description)
            .bind(r.visible)
            .bind(r.created_at),
            StoredRecord::MiscListings(r) => sqlx::query(
                r#"
                INSERT INTO misc_listings
                    (id, profile_id, name, condition, description, price_cents,
                     published_on, image, visible, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                "#,
            )
            .bind(r.id)
            .bind(r.profile_id)
            .bind(&r.name)
            .bind(r.condition.as_str())
            .bind(&r.description)
            .bind(r.price_cents)
            .bind(r.published_on)
            .bind(&r.image)
            .bind(r.visible)
            .bind(r.created_at),
        };

        query.execute(&self.pool).await?;

        info!(%profile_id, record_id = %id, section = section.as_str(), "Inserted record");
        Ok(id)
    }

    async fn set_record_visibility(
        &self,
        profile_id: Uuid,
        section: Section,
        record_id: Uuid,
        visible: bool,
    ) -> Result<bool, AppError> {
        let sql = format!(
            "UPDATE {} SET visible = $1 WHERE id = $2 AND profile_id = $3",
            section.table()
        );
        let result = sqlx::query(&sql)
            .bind(visible)
            .bind(record_id)
            .bind(profile_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_record(
        &self,
        profile_id: Uuid,
        section: Section,
        record_id: Uuid,
    ) -> Result<bool, AppError> {
        let sql = format!(
            "DELETE FROM {} WHERE id = $1 AND profile_id = $2",
            section.table()
        );
        let result = sqlx::query(&sql)
            .bind(record_id)
            .bind(profile_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn load_records(
        &self,
        profile_id: Uuid,
        sections: &[Section],
    ) -> Result<ProfileRecords, AppError> {
        let mut records = ProfileRecords::default();
        for section in sections {
            let sql = format!(
                "SELECT * FROM {} WHERE profile_id = $1 ORDER BY created_at, id",
                section.table()
            );
            match section {
                Section::Experience => {
                    records.experience = sqlx::query_as::<_, WorkExperience>(&sql)
                        .bind(profile_id)
                        .fetch_all(&self.pool)
                        .await?;
                }
                Section::Awards => {
                    records.awards = sqlx::query_as::<_, Award>(&sql)
                        .bind(profile_id)
                        .fetch_all(&self.pool)
                        .await?;
                }
                Section::Courses => {
                    records.courses = sqlx::query_as::<_, Course>(&sql)
                        .bind(profile_id)
                        .fetch_all(&self.pool)
                        .await?;
                }
                Section::AcademicProducts => {
                    records.academic_products = sqlx::query_as::<_, AcademicProduct>(&sql)
                        .bind(profile_id)
                        .fetch_all(&self.pool)
                        .await?;
                }
                Section::WorkProducts => {
                    records.work_products = sqlx::query_as::<_, WorkProduct>(&sql)
                        .bind(profile_id)
                        .fetch_all(&self.pool)
                        .await?;
                }
                Section::MiscListings => {
                    records.misc_listings = sqlx::query_as::<_, MiscListing>(&sql)
                        .bind(profile_id)
                        .fetch_all(&self.pool)
                        .await?;
                }
            }
        }
        Ok(records)
    }
}
