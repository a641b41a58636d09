//! CV generation: orchestrates the full document pipeline.
//!
//! Flow: load profile → resolve section toggles → load records of enabled
//!       sections → assemble → layout + PDF encoding (blocking pool).

use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use crate::document::assembler::assemble;
use crate::document::font_metrics::PageConfig;
use crate::document::layout::layout_document;
use crate::document::pdf::{render_pdf, PdfError};
use crate::document::sections::VisibilityPolicy;
use crate::errors::AppError;
use crate::models::profile::Profile;
use crate::models::section::SectionSelection;
use crate::profile::store::ProfileRepository;

#[derive(Debug, Clone)]
pub struct GeneratedCv {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// Generates the CV of `profile_id` as PDF bytes.
///
/// Flags missing from `selection` fall back to the profile's stored toggles.
/// Fails with `NotFound` for an unknown profile and with `Assembly` when a
/// required field is missing; nothing is produced in either case.
pub async fn generate_cv(
    repo: &dyn ProfileRepository,
    profile_id: Uuid,
    selection: SectionSelection,
    page_config: &PageConfig,
    today: NaiveDate,
) -> Result<GeneratedCv, AppError> {
    let profile = repo
        .find_profile(profile_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {profile_id} not found")))?;

    let toggles = selection.resolve(profile.sections);
    let enabled = VisibilityPolicy::new(toggles).enabled_sections();
    let records = repo.load_records(profile_id, &enabled).await?;

    let document = assemble(&profile, &records, toggles, today)?;
    info!(
        "Assembled CV for profile {}: {} section(s)",
        profile_id,
        document.sections.len()
    );

    // Layout and encoding are CPU-bound.
    let config = page_config.clone();
    let (bytes, page_count) = tokio::task::spawn_blocking(move || {
        let pages = layout_document(&document, &config);
        let bytes = render_pdf(&pages, &config, &document.title)?;
        Ok::<_, PdfError>((bytes, pages.len()))
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("layout task failed: {e}")))?
    .map_err(|e| AppError::Pdf(e.to_string()))?;

    info!(
        "Rendered CV for profile {}: {} page(s), {} bytes",
        profile_id,
        page_count,
        bytes.len()
    );

    Ok(GeneratedCv {
        file_name: cv_file_name(&profile),
        bytes,
        page_count,
    })
}

/// `CV_{full name}.pdf`, restricted to ASCII letters, digits and `_`.
pub fn cv_file_name(profile: &Profile) -> String {
    let stem: String = format!("CV_{}", profile.full_name())
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{stem}.pdf")
}
