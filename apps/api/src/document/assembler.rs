//! Document assembler: turns a profile and its records into a `CvDocument`.
//!
//! The header is always first. Sections follow in the fixed order of
//! `Section::ALL`, each filtered and ordered by the `VisibilityPolicy`.
//! The first missing required field aborts assembly; nothing partial is returned.

use chrono::NaiveDate;
use thiserror::Error;

use crate::document::blocks::{
    CvDocument, EntryBlock, FooterBlock, HeaderBlock, HeaderField, SectionBlock,
};
use crate::document::sections::VisibilityPolicy;
use crate::models::profile::Profile;
use crate::models::records::{
    AcademicProduct, Award, Course, CvRecord, MiscListing, ProfileRecords, WorkExperience,
    WorkProduct,
};
use crate::models::section::{Section, SectionToggles};
use crate::profile::dates::{age_on, day_month_year, format_phone, month_year};

#[derive(Debug, Error, PartialEq)]
pub enum AssemblyError {
    #[error("required field '{0}' is missing")]
    MissingField(String),
}

/// Renders a stored record as a printable entry.
trait ToEntry {
    fn to_entry(&self) -> Result<EntryBlock, AssemblyError>;
}

pub fn assemble(
    profile: &Profile,
    records: &ProfileRecords,
    toggles: SectionToggles,
    today: NaiveDate,
) -> Result<CvDocument, AssemblyError> {
    let header = build_header(profile, today)?;
    let policy = VisibilityPolicy::new(toggles);

    let mut sections = Vec::new();
    for section in Section::ALL {
        let entries = match section {
            Section::Experience => entries_for(&policy, section, &records.experience)?,
            Section::Awards => entries_for(&policy, section, &records.awards)?,
            Section::Courses => entries_for(&policy, section, &records.courses)?,
            Section::AcademicProducts => {
                entries_for(&policy, section, &records.academic_products)?
            }
            Section::WorkProducts => entries_for(&policy, section, &records.work_products)?,
            Section::MiscListings => entries_for(&policy, section, &records.misc_listings)?,
        };
        if let Some(entries) = entries {
            sections.push(SectionBlock { section, entries });
        }
    }

    Ok(CvDocument {
        title: format!("CV_{}", profile.full_name()),
        header,
        sections,
        footer: FooterBlock {
            generated_on: today,
        },
    })
}

fn entries_for<R: CvRecord + ToEntry>(
    policy: &VisibilityPolicy,
    section: Section,
    records: &[R],
) -> Result<Option<Vec<EntryBlock>>, AssemblyError> {
    policy
        .select(section, records)
        .map(|selected| {
            selected
                .into_iter()
                .map(ToEntry::to_entry)
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()
}

fn build_header(profile: &Profile, today: NaiveDate) -> Result<HeaderBlock, AssemblyError> {
    let first = require("profile.first_names", &profile.first_names)?;
    let last = require("profile.last_names", &profile.last_names)?;
    let national_id = require("profile.national_id", &profile.national_id)?;
    let birth_date = profile
        .birth_date
        .ok_or_else(|| AssemblyError::MissingField("profile.birth_date".to_string()))?;

    let phone = if !profile.landline_phone.trim().is_empty() {
        format_phone(profile.landline_phone.trim())
    } else {
        format_phone(profile.mobile_phone.trim())
    };

    let mut fields = vec![
        HeaderField {
            label: "National ID",
            value: national_id.to_string(),
        },
        HeaderField {
            label: "Age",
            value: format!("{} years", age_on(birth_date, today)),
        },
        HeaderField {
            label: "Phone",
            value: phone,
        },
        HeaderField {
            label: "Civil status",
            value: profile.civil_status.label().to_string(),
        },
        HeaderField {
            label: "Address",
            value: profile.home_address.trim().to_string(),
        },
        HeaderField {
            label: "Nationality",
            value: profile.nationality.trim().to_string(),
        },
    ];

    if let Some(website) = &profile.website {
        fields.push(HeaderField {
            label: "Website",
            value: website.clone(),
        });
        fields.push(HeaderField {
            label: "Driving license",
            value: profile.driving_license.label(),
        });
    }

    Ok(HeaderBlock {
        full_name: format!("{first} {last}").to_uppercase(),
        headline: profile.headline.trim().to_string(),
        fields,
    })
}

fn require<'a>(field: &str, value: &'a str) -> Result<&'a str, AssemblyError> {
    let value = value.trim();
    if value.is_empty() {
        Err(AssemblyError::MissingField(field.to_string()))
    } else {
        Ok(value)
    }
}

fn description(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn format_price(cents: i64) -> String {
    format!("${}.{:02}", cents / 100, cents.rem_euclid(100))
}

impl ToEntry for WorkExperience {
    fn to_entry(&self) -> Result<EntryBlock, AssemblyError> {
        let position = require("work_experiences.position", &self.position)?;
        let company = require("work_experiences.company", &self.company)?;
        let end = self
            .end_date
            .map(month_year)
            .unwrap_or_else(|| "Present".to_string());
        let mut date_line = format!("{} - {}", month_year(self.start_date), end);
        if !self.location.trim().is_empty() {
            date_line.push_str(&format!(" | {}", self.location.trim()));
        }
        Ok(EntryBlock {
            title: format!("{position} - {company}"),
            date_line,
            description: description(&self.description),
        })
    }
}

impl ToEntry for Award {
    fn to_entry(&self) -> Result<EntryBlock, AssemblyError> {
        let sponsor = require("awards.sponsor", &self.sponsor)?;
        Ok(EntryBlock {
            title: format!("{} - {}", self.kind.label(), sponsor),
            date_line: month_year(self.awarded_on),
            description: description(&self.description),
        })
    }
}

impl ToEntry for Course {
    fn to_entry(&self) -> Result<EntryBlock, AssemblyError> {
        let name = require("courses.name", &self.name)?;
        let title = match self.sponsor.trim() {
            "" => name.to_string(),
            sponsor => format!("{name} - {sponsor}"),
        };
        Ok(EntryBlock {
            title,
            date_line: format!(
                "{} - {} | {} hours",
                month_year(self.start_date),
                month_year(self.end_date),
                self.total_hours
            ),
            description: description(&self.description),
        })
    }
}

impl ToEntry for AcademicProduct {
    fn to_entry(&self) -> Result<EntryBlock, AssemblyError> {
        let name = require("academic_products.name", &self.name)?;
        Ok(EntryBlock {
            title: name.to_string(),
            date_line: format!("Tags: {}", self.tags().join(", ")),
            description: description(&self.description),
        })
    }
}

impl ToEntry for WorkProduct {
    fn to_entry(&self) -> Result<EntryBlock, AssemblyError> {
        let name = require("work_products.name", &self.name)?;
        Ok(EntryBlock {
            title: name.to_string(),
            date_line: month_year(self.produced_on),
            description: description(&self.description),
        })
    }
}

impl ToEntry for MiscListing {
    fn to_entry(&self) -> Result<EntryBlock, AssemblyError> {
        let name = require("misc_listings.name", &self.name)?;
        Ok(EntryBlock {
            title: format!("{} - Condition: {}", name, self.condition.label()),
            date_line: format!(
                "Price: {} | Published: {}",
                format_price(self.price_cents),
                day_month_year(self.published_on)
            ),
            description: description(&self.description),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::profile::{CivilStatus, DrivingLicense, Sex};
    use crate::models::records::{
        AwardKind, ListingCondition, NewAcademicProduct, NewAward, NewCourse, NewMiscListing,
        NewRecord, NewWorkExperience,
    };
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    pub(crate) fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    pub(crate) fn today() -> NaiveDate {
        d(2024, 6, 15)
    }

    pub(crate) fn make_profile() -> Profile {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Profile {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            headline: "Backend developer".to_string(),
            first_names: "Ana".to_string(),
            last_names: "Perez".to_string(),
            nationality: "Ecuadorian".to_string(),
            birth_place: "Quito".to_string(),
            birth_date: Some(d(1990, 8, 20)),
            national_id: "1712345678".to_string(),
            sex: Sex::Female,
            civil_status: CivilStatus::Married,
            driving_license: DrivingLicense::B,
            landline_phone: String::new(),
            mobile_phone: "0991234567".to_string(),
            work_address: String::new(),
            home_address: "Av. Amazonas 123".to_string(),
            website: None,
            photo: None,
            slug: "ana-perez-1234abcd".to_string(),
            sections: SectionToggles::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn experience(
        position: &str,
        start: NaiveDate,
        end: Option<NaiveDate>,
        visible: bool,
    ) -> NewRecord {
        NewRecord::Experience(NewWorkExperience {
            position: position.to_string(),
            company: "Acme".to_string(),
            location: "Quito".to_string(),
            company_email: String::new(),
            company_website: None,
            contact_name: String::new(),
            contact_phone: String::new(),
            start_date: start,
            end_date: end,
            description: format!("Worked as {position}"),
            certificate: None,
            visible,
        })
    }

    pub(crate) fn records_from(new: Vec<NewRecord>) -> ProfileRecords {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut records = ProfileRecords::default();
        for (i, n) in new.into_iter().enumerate() {
            records.push(n.build(
                Uuid::new_v4(),
                Uuid::new_v4(),
                base + Duration::seconds(i as i64),
                today(),
            ));
        }
        records
    }

    fn award() -> NewRecord {
        NewRecord::Awards(NewAward {
            kind: AwardKind::Academic,
            awarded_on: d(2019, 11, 3),
            description: "Top of class".to_string(),
            sponsor: "University".to_string(),
            contact_name: String::new(),
            contact_phone: String::new(),
            certificate: None,
            visible: true,
        })
    }

    fn course() -> NewRecord {
        NewRecord::Courses(NewCourse {
            name: "Rust in Production".to_string(),
            start_date: d(2022, 2, 1),
            end_date: d(2022, 3, 15),
            total_hours: 40,
            description: String::new(),
            sponsor: "Ferrous".to_string(),
            contact_name: String::new(),
            contact_phone: String::new(),
            sponsor_email: String::new(),
            certificate: None,
            visible: true,
        })
    }

    fn listing() -> NewRecord {
        NewRecord::MiscListings(NewMiscListing {
            name: "Bicycle".to_string(),
            condition: ListingCondition::Good,
            description: "Road bike".to_string(),
            price_cents: 12_005,
            published_on: Some(d(2024, 5, 2)),
            image: None,
            visible: true,
        })
    }

    #[test]
    fn test_experience_newest_first_with_present() {
        let records = records_from(vec![
            experience("Junior", d(2020, 1, 1), Some(d(2022, 12, 31)), true),
            experience("Senior", d(2023, 2, 1), None, true),
        ]);
        let doc = assemble(&make_profile(), &records, SectionToggles::default(), today()).unwrap();

        assert_eq!(doc.section_order(), vec![Section::Experience]);
        let entries = &doc.sections[0].entries;
        assert_eq!(entries[0].title, "Senior - Acme");
        assert_eq!(entries[0].date_line, "02/2023 - Present | Quito");
        assert_eq!(entries[1].title, "Junior - Acme");
        assert_eq!(entries[1].date_line, "01/2020 - 12/2022 | Quito");
    }

    #[test]
    fn test_header_fields_and_age() {
        let doc = assemble(
            &make_profile(),
            &ProfileRecords::default(),
            SectionToggles::default(),
            today(),
        )
        .unwrap();
        assert_eq!(doc.header.full_name, "ANA PEREZ");
        assert_eq!(doc.title, "CV_Ana Perez");
        let age = doc.header.fields.iter().find(|f| f.label == "Age").unwrap();
        // Birthday (Aug 20) not yet reached on Jun 15.
        assert_eq!(age.value, "33 years");
        let phone = doc.header.fields.iter().find(|f| f.label == "Phone").unwrap();
        assert_eq!(phone.value, "(09) 9123-4567");
        assert!(doc.header.fields.iter().all(|f| f.label != "Website"));
    }

    #[test]
    fn test_website_adds_license_field() {
        let mut profile = make_profile();
        profile.website = Some("https://ana.dev".to_string());
        let doc = assemble(&profile, &ProfileRecords::default(), SectionToggles::default(), today())
            .unwrap();
        let labels: Vec<&str> = doc.header.fields.iter().map(|f| f.label).collect();
        assert!(labels.ends_with(&["Website", "Driving license"]));
    }

    #[test]
    fn test_missing_birth_date_fails() {
        let mut profile = make_profile();
        profile.birth_date = None;
        let err = assemble(&profile, &ProfileRecords::default(), SectionToggles::default(), today())
            .unwrap_err();
        assert_eq!(
            err,
            AssemblyError::MissingField("profile.birth_date".to_string())
        );
    }

    #[test]
    fn test_blank_record_title_fails() {
        let records = records_from(vec![experience("  ", d(2020, 1, 1), None, true)]);
        let err = assemble(&make_profile(), &records, SectionToggles::default(), today())
            .unwrap_err();
        assert_eq!(
            err,
            AssemblyError::MissingField("work_experiences.position".to_string())
        );
    }

    #[test]
    fn test_blank_title_in_disabled_section_is_ignored() {
        let records = records_from(vec![experience("  ", d(2020, 1, 1), None, true)]);
        let toggles = SectionToggles::default().with(Section::Experience, false);
        assert!(assemble(&make_profile(), &records, toggles, today()).is_ok());
    }

    #[test]
    fn test_sections_follow_fixed_order() {
        let records = records_from(vec![
            listing(),
            course(),
            award(),
            experience("Dev", d(2021, 1, 1), None, true),
        ]);
        let doc = assemble(&make_profile(), &records, SectionToggles::default(), today()).unwrap();
        assert_eq!(
            doc.section_order(),
            vec![
                Section::Experience,
                Section::Awards,
                Section::Courses,
                Section::MiscListings
            ]
        );
    }

    #[test]
    fn test_disabled_toggle_omits_section() {
        let records = records_from(vec![award(), experience("Dev", d(2021, 1, 1), None, true)]);
        let toggles = SectionToggles::default().with(Section::Awards, false);
        let doc = assemble(&make_profile(), &records, toggles, today()).unwrap();
        assert_eq!(doc.section_order(), vec![Section::Experience]);
    }

    #[test]
    fn test_hidden_records_omitted_even_when_enabled() {
        let records = records_from(vec![
            experience("Hidden", d(2024, 1, 1), None, false),
            experience("Shown", d(2018, 1, 1), Some(d(2019, 1, 1)), true),
        ]);
        let doc = assemble(&make_profile(), &records, SectionToggles::default(), today()).unwrap();
        let titles: Vec<&str> = doc.sections[0]
            .entries
            .iter()
            .map(|e| e.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Shown - Acme"]);
    }

    #[test]
    fn test_entry_formats() {
        let records = records_from(vec![award(), course(), listing()]);
        let doc = assemble(&make_profile(), &records, SectionToggles::default(), today()).unwrap();

        let award = &doc.sections[0].entries[0];
        assert_eq!(award.title, "Academic - University");
        assert_eq!(award.date_line, "11/2019");

        let course = &doc.sections[1].entries[0];
        assert_eq!(course.title, "Rust in Production - Ferrous");
        assert_eq!(course.date_line, "02/2022 - 03/2022 | 40 hours");
        assert!(course.description.is_none());

        let listing = &doc.sections[2].entries[0];
        assert_eq!(listing.title, "Bicycle - Condition: Good");
        assert_eq!(listing.date_line, "Price: $120.05 | Published: 02/05/2024");
    }

    #[test]
    fn test_same_day_academic_products_newest_first() {
        let product = |name: &str| {
            NewRecord::AcademicProducts(NewAcademicProduct {
                name: name.to_string(),
                classifier: "rust, parsing".to_string(),
                description: String::new(),
                visible: true,
            })
        };
        // Inserted one second apart on the same day.
        let records = records_from(vec![product("Created first"), product("Created second")]);
        let doc = assemble(&make_profile(), &records, SectionToggles::default(), today()).unwrap();

        assert_eq!(doc.section_order(), vec![Section::AcademicProducts]);
        let titles: Vec<&str> = doc.sections[0]
            .entries
            .iter()
            .map(|e| e.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Created second", "Created first"]);
        assert_eq!(doc.sections[0].entries[0].date_line, "Tags: rust, parsing");
    }

    #[test]
    fn test_footer_text() {
        let footer = FooterBlock {
            generated_on: d(2024, 6, 5),
        };
        assert_eq!(footer.text(), "CV generated on 05/06/2024");
    }
}
