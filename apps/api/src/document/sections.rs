//! Visibility policy: the one place that decides which sections and which
//! records are eligible for a generated document.
//!
//! A section is printed only when its toggle is on AND it holds at least one
//! visible record. Records are printed newest sort key first; equal keys keep
//! insertion order.

use std::cmp::Ordering;

use crate::models::records::CvRecord;
use crate::models::section::{Section, SectionToggles};

#[derive(Debug, Clone, Copy)]
pub struct VisibilityPolicy {
    toggles: SectionToggles,
}

impl VisibilityPolicy {
    pub fn new(toggles: SectionToggles) -> Self {
        VisibilityPolicy { toggles }
    }

    /// Enabled sections in print order. Only these need to be queried.
    pub fn enabled_sections(&self) -> Vec<Section> {
        Section::ALL
            .into_iter()
            .filter(|s| self.toggles.is_enabled(*s))
            .collect()
    }

    /// Returns the records to print for `section`, in display order, or
    /// `None` when the section must be omitted.
    pub fn select<'a, R: CvRecord>(&self, section: Section, records: &'a [R]) -> Option<Vec<&'a R>> {
        if !self.toggles.is_enabled(section) {
            return None;
        }

        let mut visible: Vec<&R> = records.iter().filter(|r| r.is_visible()).collect();
        if visible.is_empty() {
            return None;
        }

        visible.sort_by(|a, b| display_order(*a, *b));
        Some(visible)
    }
}

fn display_order<R: CvRecord>(a: &R, b: &R) -> Ordering {
    b.sort_key()
        .cmp(&a.sort_key())
        .then_with(|| a.created_at().cmp(&b.created_at()))
        .then_with(|| a.id().cmp(&b.id()))
}
