use chrono::NaiveDate;
use serde::Serialize;

use crate::models::section::Section;

/// An assembled CV, independent of page geometry.
#[derive(Debug, Clone, Serialize)]
pub struct CvDocument {
    /// PDF metadata title.
    pub title: String,
    pub header: HeaderBlock,
    pub sections: Vec<SectionBlock>,
    pub footer: FooterBlock,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeaderBlock {
    /// Already uppercased.
    pub full_name: String,
    pub headline: String,
    pub fields: Vec<HeaderField>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeaderField {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionBlock {
    pub section: Section,
    pub entries: Vec<EntryBlock>,
}

/// One record: printed as a unit that never straddles a page break.
#[derive(Debug, Clone, Serialize)]
pub struct EntryBlock {
    pub title: String,
    pub date_line: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FooterBlock {
    pub generated_on: NaiveDate,
}

impl FooterBlock {
    pub fn text(&self) -> String {
        format!(
            "CV generated on {}",
            crate::profile::dates::day_month_year(self.generated_on)
        )
    }
}

impl CvDocument {
    pub fn section_order(&self) -> Vec<Section> {
        self.sections.iter().map(|s| s.section).collect()
    }
}
