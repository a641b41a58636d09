//! Static font-metric tables for the PDF standard Helvetica faces.
//!
//! Widths are the Adobe AFM advance widths in 1/1000 em, so a string's
//! rendered width in points is `sum(widths) * size / 1000`.
//! Tables cover ASCII 0x20..=0x7E (index = code - 32), Latin-1 0xA0..=0xFF
//! (index = code - 0xA0) and the few WinAnsi punctuation marks above U+00FF.
//! Anything else is printed as `?` and measured as one.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Font faces
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFace {
    Regular,
    Bold,
    /// Same advance widths as `Regular`.
    Oblique,
}

impl FontFace {
    /// Resource name used inside page content streams.
    pub fn resource_name(&self) -> &'static str {
        match self {
            FontFace::Regular => "F1",
            FontFace::Bold => "F2",
            FontFace::Oblique => "F3",
        }
    }

    /// PostScript name of the standard Type1 font.
    pub fn base_font(&self) -> &'static str {
        match self {
            FontFace::Regular => "Helvetica",
            FontFace::Bold => "Helvetica-Bold",
            FontFace::Oblique => "Helvetica-Oblique",
        }
    }

    pub const ALL: [FontFace; 3] = [FontFace::Regular, FontFace::Bold, FontFace::Oblique];
}

// ────────────────────────────────────────────────────────────────────────────
// Page configuration
// ────────────────────────────────────────────────────────────────────────────

/// Physical page geometry, all in PDF points (1/72 inch).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    pub width_pt: f32,
    pub height_pt: f32,
    pub margin_pt: f32,
    /// Vertical gap inserted above the footer line.
    pub footer_gap_pt: f32,
}

impl PageConfig {
    pub fn text_width(&self) -> f32 {
        self.width_pt - 2.0 * self.margin_pt
    }

    pub fn text_height(&self) -> f32 {
        self.height_pt - 2.0 * self.margin_pt
    }
}

const CM: f32 = 72.0 / 2.54;

/// A4 portrait with 2 cm margins on every side.
pub fn default_page_config() -> PageConfig {
    PageConfig {
        width_pt: 595.28,
        height_pt: 841.89,
        margin_pt: 2.0 * CM,
        footer_gap_pt: CM,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// ASCII slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
pub struct FontMetricTable {
    ascii: [u16; 95],
    latin1: [u16; 96],
    /// Widths of `WIN_ANSI_EXTRAS`, same order.
    extras: [u16; 8],
}

/// Characters outside Latin-1 that WinAnsiEncoding still carries.
const WIN_ANSI_EXTRAS: [char; 8] = [
    '\u{20AC}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
];

impl FontMetricTable {
    pub fn char_width(&self, c: char) -> u16 {
        let code = c as usize;
        match code {
            0x20..=0x7E => self.ascii[code - 0x20],
            0xA0..=0xFF => self.latin1[code - 0xA0],
            _ => WIN_ANSI_EXTRAS
                .iter()
                .position(|&e| e == c)
                .map_or(self.ascii[usize::from(b'?') - 0x20], |i| self.extras[i]),
        }
    }

    /// Rendered width of `s` in points at `size_pt`.
    pub fn width_pt(&self, s: &str, size_pt: f32) -> f32 {
        let units: u32 = s.chars().map(|c| self.char_width(c) as u32).sum();
        units as f32 * size_pt / 1000.0
    }
}

static HELVETICA: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    ascii: [
        // sp   !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
        // 0    1    2    3    4    5    6    7    8    9
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        // :    ;    <    =    >    ?    @
        278, 278, 584, 584, 584, 556, 1015,
        // A    B    C    D    E    F    G    H    I    J    K    L    M
        667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
        // N    O    P    Q    R    S    T    U    V    W    X    Y    Z
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        // [    \    ]    ^    _    `
        278, 278, 278, 469, 556, 333,
        // a    b    c    d    e    f    g    h    i    j    k    l    m
        556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
        // n    o    p    q    r    s    t    u    v    w    x    y    z
        556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
        // {    |    }    ~
        334, 260, 334, 584,
    ],
    #[rustfmt::skip]
    latin1: [
        // nbsp ¡    ¢    £    ¤    ¥    ¦    §    ¨    ©    ª    «    ¬    shy  ®    ¯
        278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333,
        // °    ±    ²    ³    ´    µ    ¶    ·    ¸    ¹    º    »    ¼    ½    ¾    ¿
        400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611,
        // À    Á    Â    Ã    Ä    Å    Æ    Ç    È    É    Ê    Ë    Ì    Í    Î    Ï
        667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
        // Ð    Ñ    Ò    Ó    Ô    Õ    Ö    ×    Ø    Ù    Ú    Û    Ü    Ý    Þ    ß
        722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
        // à    á    â    ã    ä    å    æ    ç    è    é    ê    ë    ì    í    î    ï
        556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278,
        // ð    ñ    ò    ó    ô    õ    ö    ÷    ø    ù    ú    û    ü    ý    þ    ÿ
        556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500,
    ],
    // €    ‘    ’    “    ”    •    en   em
    extras: [556, 222, 222, 333, 333, 350, 556, 1000],
};

static HELVETICA_BOLD: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    ascii: [
        // sp   !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
        278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
        // 0    1    2    3    4    5    6    7    8    9
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        // :    ;    <    =    >    ?    @
        333, 333, 584, 584, 584, 611, 975,
        // A    B    C    D    E    F    G    H    I    J    K    L    M
        722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
        // N    O    P    Q    R    S    T    U    V    W    X    Y    Z
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        // [    \    ]    ^    _    `
        333, 278, 333, 584, 556, 333,
        // a    b    c    d    e    f    g    h    i    j    k    l    m
        556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
        // n    o    p    q    r    s    t    u    v    w    x    y    z
        611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
        // {    |    }    ~
        389, 280, 389, 584,
    ],
    #[rustfmt::skip]
    latin1: [
        // nbsp ¡    ¢    £    ¤    ¥    ¦    §    ¨    ©    ª    «    ¬    shy  ®    ¯
        278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333,
        // °    ±    ²    ³    ´    µ    ¶    ·    ¸    ¹    º    »    ¼    ½    ¾    ¿
        400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611,
        // À    Á    Â    Ã    Ä    Å    Æ    Ç    È    É    Ê    Ë    Ì    Í    Î    Ï
        722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
        // Ð    Ñ    Ò    Ó    Ô    Õ    Ö    ×    Ø    Ù    Ú    Û    Ü    Ý    Þ    ß
        722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
        // à    á    â    ã    ä    å    æ    ç    è    é    ê    ë    ì    í    î    ï
        556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278,
        // ð    ñ    ò    ó    ô    õ    ö    ÷    ø    ù    ú    û    ü    ý    þ    ÿ
        611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556,
    ],
    // €    ‘    ’    “    ”    •    en   em
    extras: [556, 278, 278, 500, 500, 350, 556, 1000],
};

pub fn get_metrics(face: FontFace) -> &'static FontMetricTable {
    match face {
        FontFace::Regular | FontFace::Oblique => &HELVETICA,
        FontFace::Bold => &HELVETICA_BOLD,
    }
}
