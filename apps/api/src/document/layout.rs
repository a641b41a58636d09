//! Layout: word-wraps an assembled `CvDocument` and paginates it onto pages.
//!
//! # Pagination rules
//! - Every record is one keep-together group; a section heading rides with
//!   its section's first record.
//! - A group that does not fit the space left on the page starts a new page.
//! - A group taller than a whole page is placed line by line across pages.
//!
//! Coordinates in `Placed` are PDF user space: origin bottom-left, points.

use serde::Serialize;

use crate::document::blocks::CvDocument;
use crate::document::font_metrics::{get_metrics, FontFace, FontMetricTable, PageConfig};

// ────────────────────────────────────────────────────────────────────────────
// Styles
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgb(pub f32, pub f32, pub f32);

pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);
pub const GREY: Rgb = Rgb(0.38, 0.38, 0.38);
/// #2E7D32
pub const GREEN: Rgb = Rgb(0.180, 0.490, 0.196);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TextStyle {
    pub face: FontFace,
    pub size_pt: f32,
    pub color: Rgb,
    pub align: Align,
    /// Extra gap above the line; dropped at the top of a page.
    pub space_before: f32,
}

impl TextStyle {
    pub fn leading(&self) -> f32 {
        self.size_pt * 1.2
    }

    fn continuation(self) -> Self {
        TextStyle {
            space_before: 0.0,
            ..self
        }
    }
}

pub const NAME: TextStyle = TextStyle {
    face: FontFace::Bold,
    size_pt: 24.0,
    color: GREEN,
    align: Align::Center,
    space_before: 0.0,
};

pub const HEADLINE: TextStyle = TextStyle {
    face: FontFace::Oblique,
    size_pt: 11.0,
    color: GREY,
    align: Align::Center,
    space_before: 2.0,
};

pub const HEADER_FIELD: TextStyle = TextStyle {
    face: FontFace::Regular,
    size_pt: 10.0,
    color: BLACK,
    align: Align::Left,
    space_before: 0.0,
};

pub const SECTION_HEADING: TextStyle = TextStyle {
    face: FontFace::Bold,
    size_pt: 14.0,
    color: GREEN,
    align: Align::Left,
    space_before: 14.0,
};

pub const RECORD_TITLE: TextStyle = TextStyle {
    face: FontFace::Bold,
    size_pt: 10.0,
    color: BLACK,
    align: Align::Left,
    space_before: 6.0,
};

pub const DATE_LINE: TextStyle = TextStyle {
    face: FontFace::Oblique,
    size_pt: 9.0,
    color: GREY,
    align: Align::Left,
    space_before: 0.0,
};

pub const BODY: TextStyle = TextStyle {
    face: FontFace::Regular,
    size_pt: 10.0,
    color: BLACK,
    align: Align::Left,
    space_before: 1.0,
};

pub const FOOTER: TextStyle = TextStyle {
    face: FontFace::Regular,
    size_pt: 8.0,
    color: GREY,
    align: Align::Center,
    space_before: 0.0,
};

const RULE_SPACE_BEFORE: f32 = 6.0;
const RULE_HEIGHT: f32 = 4.0;
const RULE_WIDTH: f32 = 1.0;

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Placed {
    Text {
        text: String,
        x: f32,
        /// Baseline.
        y: f32,
        face: FontFace,
        size_pt: f32,
        color: Rgb,
    },
    Rule {
        x1: f32,
        x2: f32,
        y: f32,
        width: f32,
        color: Rgb,
    },
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Page {
    pub items: Vec<Placed>,
}

impl Page {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(|item| match item {
            Placed::Text { text, .. } => Some(text.as_str()),
            Placed::Rule { .. } => None,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Word wrap
// ────────────────────────────────────────────────────────────────────────────

/// Greedy word wrap at `max_width` points. Words wider than a full line are
/// hard-broken between characters. Blank input yields no lines.
pub fn wrap_text(text: &str, face: FontFace, size_pt: f32, max_width: f32) -> Vec<String> {
    let metrics = get_metrics(face);
    let space_w = metrics.width_pt(" ", size_pt);

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0_f32;

    for word in text.split_whitespace() {
        let word_w = metrics.width_pt(word, size_pt);

        if word_w > max_width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let mut pieces = hard_break(word, metrics, size_pt, max_width);
            current = pieces.pop().unwrap_or_default();
            current_width = metrics.width_pt(&current, size_pt);
            lines.extend(pieces);
            continue;
        }

        if current.is_empty() {
            current.push_str(word);
            current_width = word_w;
        } else if current_width + space_w + word_w > max_width {
            lines.push(std::mem::replace(&mut current, word.to_string()));
            current_width = word_w;
        } else {
            current.push(' ');
            current.push_str(word);
            current_width += space_w + word_w;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn hard_break(word: &str, metrics: &FontMetricTable, size_pt: f32, max_width: f32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut width = 0.0_f32;
    for c in word.chars() {
        let w = metrics.char_width(c) as f32 * size_pt / 1000.0;
        if !piece.is_empty() && width + w > max_width {
            pieces.push(std::mem::take(&mut piece));
            width = 0.0;
        }
        piece.push(c);
        width += w;
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

// ────────────────────────────────────────────────────────────────────────────
// Groups
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Block {
    Line { text: String, style: TextStyle },
    Rule,
}

impl Block {
    fn space_before(&self) -> f32 {
        match self {
            Block::Line { style, .. } => style.space_before,
            Block::Rule => RULE_SPACE_BEFORE,
        }
    }

    fn height(&self, at_top: bool) -> f32 {
        let gap = if at_top { 0.0 } else { self.space_before() };
        match self {
            Block::Line { style, .. } => gap + style.leading(),
            Block::Rule => gap + RULE_HEIGHT,
        }
    }
}

/// Blocks that must land on the same page when possible.
#[derive(Debug, Clone, Default)]
struct Group {
    blocks: Vec<Block>,
}

impl Group {
    fn height(&self, at_top: bool) -> f32 {
        self.blocks
            .iter()
            .enumerate()
            .map(|(i, b)| b.height(at_top && i == 0))
            .sum()
    }

    /// Wraps `text` and appends its lines; only the first keeps `space_before`.
    fn push_text(&mut self, text: &str, style: TextStyle, max_width: f32) {
        let lines = wrap_text(text, style.face, style.size_pt, max_width);
        for (i, line) in lines.into_iter().enumerate() {
            let style = if i == 0 { style } else { style.continuation() };
            self.blocks.push(Block::Line { text: line, style });
        }
    }

    /// Like `push_text`, preserving explicit line breaks as separate paragraphs.
    fn push_paragraphs(&mut self, text: &str, style: TextStyle, max_width: f32) {
        for paragraph in text.lines().filter(|p| !p.trim().is_empty()) {
            self.push_text(paragraph, style, max_width);
        }
    }
}

fn build_groups(doc: &CvDocument, config: &PageConfig) -> Vec<Group> {
    let width = config.text_width();
    let mut groups = Vec::new();

    let mut header = Group::default();
    header.push_text(&doc.header.full_name, NAME, width);
    header.push_text(&doc.header.headline, HEADLINE, width);
    let mut first_field = true;
    for field in &doc.header.fields {
        let style = if first_field {
            TextStyle {
                space_before: 10.0,
                ..HEADER_FIELD
            }
        } else {
            HEADER_FIELD
        };
        header.push_text(&format!("{}: {}", field.label, field.value), style, width);
        first_field = false;
    }
    header.blocks.push(Block::Rule);
    groups.push(header);

    for section in &doc.sections {
        for (i, entry) in section.entries.iter().enumerate() {
            let mut group = Group::default();
            if i == 0 {
                group.push_text(section.section.heading(), SECTION_HEADING, width);
            }
            group.push_text(&entry.title, RECORD_TITLE, width);
            group.push_text(&entry.date_line, DATE_LINE, width);
            if let Some(description) = &entry.description {
                group.push_paragraphs(description, BODY, width);
            }
            groups.push(group);
        }
    }

    let mut footer = Group::default();
    footer.push_text(
        &doc.footer.text(),
        TextStyle {
            space_before: config.footer_gap_pt,
            ..FOOTER
        },
        width,
    );
    groups.push(footer);

    groups
}

// ────────────────────────────────────────────────────────────────────────────
// Pagination
// ────────────────────────────────────────────────────────────────────────────

struct Cursor<'a> {
    config: &'a PageConfig,
    pages: Vec<Page>,
    current: Page,
    /// Height consumed from the top of the text area.
    used: f32,
}

impl<'a> Cursor<'a> {
    fn new(config: &'a PageConfig) -> Self {
        Cursor {
            config,
            pages: Vec::new(),
            current: Page::default(),
            used: 0.0,
        }
    }

    fn at_top(&self) -> bool {
        self.current.items.is_empty()
    }

    fn remaining(&self) -> f32 {
        self.config.text_height() - self.used
    }

    fn new_page(&mut self) {
        let finished = std::mem::take(&mut self.current);
        self.pages.push(finished);
        self.used = 0.0;
    }

    fn place(&mut self, block: &Block) {
        let gap = if self.at_top() {
            0.0
        } else {
            block.space_before()
        };
        let top = self.config.height_pt - self.config.margin_pt;
        let left = self.config.margin_pt;

        match block {
            Block::Line { text, style } => {
                let baseline = self.used + gap + style.size_pt;
                let x = match style.align {
                    Align::Left => left,
                    Align::Center => {
                        let w = get_metrics(style.face).width_pt(text, style.size_pt);
                        left + ((self.config.text_width() - w) / 2.0).max(0.0)
                    }
                };
                self.current.items.push(Placed::Text {
                    text: text.clone(),
                    x,
                    y: top - baseline,
                    face: style.face,
                    size_pt: style.size_pt,
                    color: style.color,
                });
                self.used += gap + style.leading();
            }
            Block::Rule => {
                let y = top - (self.used + gap + RULE_HEIGHT / 2.0);
                self.current.items.push(Placed::Rule {
                    x1: left,
                    x2: left + self.config.text_width(),
                    y,
                    width: RULE_WIDTH,
                    color: GREEN,
                });
                self.used += gap + RULE_HEIGHT;
            }
        }
    }

    fn finish(mut self) -> Vec<Page> {
        if !self.current.items.is_empty() || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}

fn paginate(groups: &[Group], config: &PageConfig) -> Vec<Page> {
    let mut cursor = Cursor::new(config);

    for group in groups {
        if group.blocks.is_empty() {
            continue;
        }

        if group.height(cursor.at_top()) <= cursor.remaining() {
            group.blocks.iter().for_each(|b| cursor.place(b));
        } else if group.height(true) <= config.text_height() {
            cursor.new_page();
            group.blocks.iter().for_each(|b| cursor.place(b));
        } else {
            // Taller than a page: flow line by line.
            for block in &group.blocks {
                if !cursor.at_top() && block.height(false) > cursor.remaining() {
                    cursor.new_page();
                }
                cursor.place(block);
            }
        }
    }

    cursor.finish()
}

/// Wraps and paginates a document. Always returns at least one page.
pub fn layout_document(doc: &CvDocument, config: &PageConfig) -> Vec<Page> {
    paginate(&build_groups(doc, config), config)
}
