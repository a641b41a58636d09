//! PDF writer: encodes laid-out pages with `lopdf` using the standard
//! Helvetica Type1 fonts, so no font program is embedded.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use thiserror::Error;

use crate::document::font_metrics::{FontFace, PageConfig};
use crate::document::layout::{Page, Placed, Rgb};

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("pdf encoding failed: {0}")]
    Encode(#[from] lopdf::Error),
    #[error("pdf write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Maps text to WinAnsiEncoding bytes. Characters with no WinAnsi code
/// become `?`.
pub fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7E => c as u8,
            0xA0..=0xFF => c as u8,
            0x20AC => 0x80,
            0x2018 => 0x91,
            0x2019 => 0x92,
            0x201C => 0x93,
            0x201D => 0x94,
            0x2022 => 0x95,
            0x2013 => 0x96,
            0x2014 => 0x97,
            _ => b'?',
        })
        .collect()
}

fn set_fill(ops: &mut Vec<Operation>, color: Rgb) {
    ops.push(Operation::new(
        "rg",
        vec![color.0.into(), color.1.into(), color.2.into()],
    ));
}

fn page_operations(page: &Page) -> Vec<Operation> {
    let mut ops = Vec::new();
    for item in &page.items {
        match item {
            Placed::Text {
                text,
                x,
                y,
                face,
                size_pt,
                color,
            } => {
                set_fill(&mut ops, *color);
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new(
                    "Tf",
                    vec![face.resource_name().into(), (*size_pt).into()],
                ));
                ops.push(Operation::new("Td", vec![(*x).into(), (*y).into()]));
                ops.push(Operation::new(
                    "Tj",
                    vec![Object::String(win_ansi(text), StringFormat::Literal)],
                ));
                ops.push(Operation::new("ET", vec![]));
            }
            Placed::Rule {
                x1,
                x2,
                y,
                width,
                color,
            } => {
                ops.push(Operation::new(
                    "RG",
                    vec![color.0.into(), color.1.into(), color.2.into()],
                ));
                ops.push(Operation::new("w", vec![(*width).into()]));
                ops.push(Operation::new("m", vec![(*x1).into(), (*y).into()]));
                ops.push(Operation::new("l", vec![(*x2).into(), (*y).into()]));
                ops.push(Operation::new("S", vec![]));
            }
        }
    }
    ops
}

fn font_resources(doc: &mut Document) -> ObjectId {
    let mut fonts = Dictionary::new();
    for face in FontFace::ALL {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => face.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(face.resource_name(), font_id);
    }
    doc.add_object(dictionary! {
        "Font" => fonts,
    })
}

/// Encodes `pages` into a complete PDF file. `title` goes into the
/// document information dictionary.
pub fn render_pdf(pages: &[Page], config: &PageConfig, title: &str) -> Result<Vec<u8>, PdfError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let resources_id = font_resources(&mut doc);

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in pages {
        let content = Content {
            operations: page_operations(page),
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    let media_box: Vec<Object> = vec![
        Object::Integer(0),
        Object::Integer(0),
        config.width_pt.into(),
        config.height_pt.into(),
    ];
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => media_box,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let info_id = doc.add_object(dictionary! {
        "Title" => Object::String(win_ansi(title), StringFormat::Literal),
        "Producer" => Object::string_literal("curriculum-api"),
    });
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}
