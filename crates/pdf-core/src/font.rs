//! Font handling for PDF documents

use crate::document::deflate;
use crate::{PdfError, Result};
use lopdf::{Dictionary, Object, Stream};
use std::collections::HashSet;

/// Font weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

/// Standard 14 fonts usable without embedding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinFont {
    Helvetica,
    HelveticaBold,
}

/// Advance widths (1/1000 em) for ASCII 0x20..=0x7E, from the Adobe AFM files
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // space - /
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0 - 9
    278, 278, 584, 584, 584, 556, 1015, // : - @
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A - M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N - Z
    278, 278, 278, 469, 556, 333, // [ - `
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a - m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n - z
    334, 260, 334, 584, // { - ~
];

const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // space - /
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0 - 9
    333, 333, 584, 584, 584, 611, 975, // : - @
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // A - M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N - Z
    333, 278, 333, 584, 556, 333, // [ - `
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // a - m
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // n - z
    389, 280, 389, 584, // { - ~
];

impl BuiltinFont {
    /// PostScript name used as /BaseFont
    pub fn base_font_name(&self) -> &'static str {
        match self {
            BuiltinFont::Helvetica => "Helvetica",
            BuiltinFont::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Advance width of a character in 1/1000 em
    ///
    /// Characters outside printable ASCII use the width of a lowercase
    /// letter, which is what most accented Latin-1 letters measure.
    pub fn char_width(&self, c: char) -> u16 {
        let table = match self {
            BuiltinFont::Helvetica => &HELVETICA_WIDTHS,
            BuiltinFont::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        };
        match c as u32 {
            code @ 0x20..=0x7E => table[(code - 0x20) as usize],
            _ => match self {
                BuiltinFont::Helvetica => 556,
                BuiltinFont::HelveticaBold => 611,
            },
        }
    }
}

/// Where the glyph data of a font comes from
#[derive(Debug, Clone)]
enum FontSource {
    /// Embedded TrueType program
    TrueType {
        ttf_data: &'static [u8],
        face: ttf_parser::Face<'static>,
    },
    /// Standard 14 font, referenced by name only
    Builtin(BuiltinFont),
}

/// Font data structure for a registered font
#[derive(Debug, Clone)]
pub struct FontData {
    /// Font name/identifier, unique within a document
    pub name: String,
    /// Characters used (the ToUnicode CMap and /W array only cover these)
    pub used_chars: HashSet<char>,
    source: FontSource,
}

/// PDF objects generated for font embedding
pub(crate) enum FontObjects {
    /// Single Type1 dictionary for a built-in font
    Simple(Dictionary),
    /// Type0 font with its descendant CIDFont
    Composite {
        /// Type0 font dictionary
        type0_font: Dictionary,
        /// CIDFont Type2 dictionary
        cid_font: Dictionary,
        /// Font descriptor dictionary
        font_descriptor: Dictionary,
        /// Font file stream (compressed TTF data)
        font_file_stream: Stream,
        /// ToUnicode CMap stream
        tounicode_stream: Stream,
    },
}

/// Font family with a regular and an optional bold variant
#[derive(Debug, Clone)]
pub struct FontFamily {
    /// Regular variant (required)
    pub regular: FontData,
    /// Bold variant
    pub bold: Option<FontData>,
}

impl FontFamily {
    /// Create a family from its variants
    pub fn new(regular: FontData, bold: Option<FontData>) -> Self {
        Self { regular, bold }
    }

    /// The built-in Helvetica / Helvetica-Bold pair
    pub fn builtin_helvetica() -> Self {
        Self {
            regular: FontData::builtin(BuiltinFont::Helvetica),
            bold: Some(FontData::builtin(BuiltinFont::HelveticaBold)),
        }
    }

    /// Get the font data for the specified weight
    /// Falls back to regular if the bold variant is not available
    pub fn get_variant(&self, weight: FontWeight) -> &FontData {
        match weight {
            FontWeight::Bold => self.bold.as_ref().unwrap_or(&self.regular),
            FontWeight::Regular => &self.regular,
        }
    }

    /// All distinct variants of the family
    pub fn variants(&self) -> impl Iterator<Item = &FontData> {
        std::iter::once(&self.regular).chain(self.bold.iter())
    }

    pub(crate) fn variants_mut(&mut self) -> impl Iterator<Item = &mut FontData> {
        std::iter::once(&mut self.regular).chain(self.bold.iter_mut())
    }
}

impl FontData {
    /// Create font data from TTF bytes
    ///
    /// # Arguments
    /// * `name` - Font identifier
    /// * `ttf_data` - TrueType font file bytes
    pub fn from_ttf(name: &str, ttf_data: &[u8]) -> Result<Self> {
        // The face borrows the data for 'static; fonts are loaded once per process
        let static_data: &'static [u8] = Box::leak(ttf_data.to_vec().into_boxed_slice());

        let face = ttf_parser::Face::parse(static_data, 0)
            .map_err(|e| PdfError::FontParseError(format!("{name}: {e:?}")))?;

        Ok(Self {
            name: name.to_string(),
            used_chars: HashSet::new(),
            source: FontSource::TrueType {
                ttf_data: static_data,
                face,
            },
        })
    }

    /// Create font data for a built-in standard font
    pub fn builtin(font: BuiltinFont) -> Self {
        Self {
            name: font.base_font_name().to_string(),
            used_chars: HashSet::new(),
            source: FontSource::Builtin(font),
        }
    }

    /// Whether this font is a standard font that is not embedded
    pub fn is_builtin(&self) -> bool {
        matches!(self.source, FontSource::Builtin(_))
    }

    /// Add characters to the used set
    pub fn add_chars(&mut self, text: &str) {
        for c in text.chars() {
            self.used_chars.insert(c);
        }
    }

    /// Get glyph ID for a character (TrueType fonts only)
    pub fn glyph_id(&self, c: char) -> Option<u16> {
        match &self.source {
            FontSource::TrueType { face, .. } => face.glyph_index(c).map(|id| id.0),
            FontSource::Builtin(_) => None,
        }
    }

    /// Check if font has a glyph for the given character
    pub fn has_glyph(&self, c: char) -> bool {
        match &self.source {
            FontSource::TrueType { .. } => self.glyph_id(c).map(|id| id != 0).unwrap_or(false),
            FontSource::Builtin(_) => winansi_byte(c).is_some(),
        }
    }

    /// Get glyph advance width in font units
    pub fn glyph_advance(&self, c: char) -> Option<u16> {
        match &self.source {
            FontSource::TrueType { face, .. } => {
                let glyph_id = face.glyph_index(c)?;
                face.glyph_hor_advance(glyph_id)
            }
            FontSource::Builtin(font) => Some(font.char_width(c)),
        }
    }

    /// Get font units per em
    pub fn units_per_em(&self) -> u16 {
        match &self.source {
            FontSource::TrueType { face, .. } => face.units_per_em(),
            FontSource::Builtin(_) => 1000,
        }
    }

    /// Get font ascender
    pub fn ascender(&self) -> i16 {
        match &self.source {
            FontSource::TrueType { face, .. } => face.ascender(),
            FontSource::Builtin(_) => 718,
        }
    }

    /// Get font descender
    pub fn descender(&self) -> i16 {
        match &self.source {
            FontSource::TrueType { face, .. } => face.descender(),
            FontSource::Builtin(_) => -207,
        }
    }

    /// Calculate text width in font units
    pub fn text_width(&self, text: &str) -> u32 {
        text.chars()
            .filter_map(|c| self.glyph_advance(c))
            .map(|w| w as u32)
            .sum()
    }

    /// Calculate text width in points for a given font size
    pub fn text_width_points(&self, text: &str, font_size: f32) -> f32 {
        let width = self.text_width(text);
        let units_per_em = self.units_per_em() as f32;
        (width as f32 / units_per_em) * font_size
    }

    /// Encode text as hex string for PDF Tj operator
    ///
    /// TrueType fonts use 2-byte glyph IDs (Identity-H), built-in fonts
    /// use single WinAnsi bytes.
    pub fn encode_text_hex(&self, text: &str) -> String {
        let mut result = String::new();
        match &self.source {
            FontSource::TrueType { .. } => {
                for c in text.chars() {
                    let gid = self.glyph_id(c).unwrap_or(0);
                    result.push_str(&format!("{gid:04X}"));
                }
            }
            FontSource::Builtin(_) => {
                for c in text.chars() {
                    let byte = winansi_byte(c).unwrap_or(b'?');
                    result.push_str(&format!("{byte:02X}"));
                }
            }
        }
        format!("<{result}>")
    }

    /// Generate all PDF objects needed to reference this font
    pub(crate) fn to_pdf_objects(&self) -> Result<FontObjects> {
        let ttf_data = match &self.source {
            FontSource::Builtin(font) => {
                return Ok(FontObjects::Simple(Dictionary::from_iter(vec![
                    ("Type", "Font".into()),
                    ("Subtype", "Type1".into()),
                    ("BaseFont", font.base_font_name().into()),
                    ("Encoding", "WinAnsiEncoding".into()),
                ])));
            }
            FontSource::TrueType { ttf_data, .. } => *ttf_data,
        };

        let font_name = Object::Name(self.name.clone().into());

        // Generate ToUnicode CMap
        let tounicode_content = self.generate_tounicode_cmap();
        let tounicode_stream = Stream::new(
            Dictionary::from_iter(vec![("Type", "CMap".into())]),
            tounicode_content.into_bytes(),
        );

        // Font program, Flate-compressed
        let compressed = deflate(ttf_data)?;
        let font_file_stream = Stream::new(
            Dictionary::from_iter(vec![
                ("Length1", (ttf_data.len() as i64).into()),
                ("Filter", "FlateDecode".into()),
            ]),
            compressed,
        );

        let units_per_em = self.units_per_em() as i64;
        let ascender = self.ascender() as i64;
        let descender = self.descender() as i64;

        // Bounding box from font metrics, scaled to 1000 units
        let scale = |v: i64| v * 1000 / units_per_em.max(1);
        let font_bbox: Vec<Object> = vec![
            0.into(),
            scale(descender).into(),
            1000.into(),
            scale(ascender).into(),
        ];

        let font_descriptor = Dictionary::from_iter(vec![
            ("Type", "FontDescriptor".into()),
            ("FontName", font_name.clone()),
            ("Flags", 32.into()), // Nonsymbolic
            ("FontBBox", font_bbox.into()),
            ("ItalicAngle", 0.into()),
            ("Ascent", scale(ascender).into()),
            ("Descent", scale(descender).into()),
            ("CapHeight", scale(ascender).into()),
            ("StemV", 80.into()),
        ]);

        let cid_system_info = Dictionary::from_iter(vec![
            ("Registry", Object::string_literal("Adobe")),
            ("Ordering", Object::string_literal("Identity")),
            ("Supplement", 0.into()),
        ]);

        // References are filled in when the document embeds the font
        let cid_font = Dictionary::from_iter(vec![
            ("Type", "Font".into()),
            ("Subtype", "CIDFontType2".into()),
            ("BaseFont", font_name.clone()),
            ("CIDSystemInfo", cid_system_info.into()),
            ("CIDToGIDMap", "Identity".into()),
            ("W", self.generate_widths_array().into()),
            ("DW", 1000.into()),
        ]);

        let type0_font = Dictionary::from_iter(vec![
            ("Type", "Font".into()),
            ("Subtype", "Type0".into()),
            ("BaseFont", font_name),
            ("Encoding", "Identity-H".into()),
        ]);

        Ok(FontObjects::Composite {
            type0_font,
            cid_font,
            font_descriptor,
            font_file_stream,
            tounicode_stream,
        })
    }

    /// Generate /W array for glyph widths, in 1000 units per em
    fn generate_widths_array(&self) -> Vec<Object> {
        let mut widths = Vec::new();

        let mut gids: Vec<(u16, char)> = self
            .used_chars
            .iter()
            .filter_map(|&c| self.glyph_id(c).map(|gid| (gid, c)))
            .collect();
        gids.sort();
        gids.dedup_by_key(|(gid, _)| *gid);

        let units_per_em = self.units_per_em().max(1) as u32;
        for (gid, c) in gids {
            let advance = self.glyph_advance(c).unwrap_or(0) as u32;
            let scaled = (advance * 1000 / units_per_em) as i64;
            widths.push((gid as i64).into());
            widths.push(vec![scaled.into()].into());
        }

        widths
    }

    /// Generate ToUnicode CMap stream content
    fn generate_tounicode_cmap(&self) -> String {
        let mut cmap = String::new();

        cmap.push_str("/CIDInit /ProcSet findresource begin\n");
        cmap.push_str("12 dict begin\n");
        cmap.push_str("begincmap\n");
        cmap.push_str("/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
        cmap.push_str("/CMapName /Adobe-Identity-UCS def\n");
        cmap.push_str("/CMapType 2 def\n");
        cmap.push_str("1 begincodespacerange\n");
        cmap.push_str("<0000> <FFFF>\n");
        cmap.push_str("endcodespacerange\n");

        let mut char_list: Vec<char> = self.used_chars.iter().copied().collect();
        char_list.sort_by_key(|c| *c as u32);

        // bfchar sections are limited to 100 entries
        for chunk in char_list.chunks(100) {
            cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
            for c in chunk {
                let gid = self.glyph_id(*c).unwrap_or(0);
                let mut utf16 = [0u16; 2];
                let unicode: String = c
                    .encode_utf16(&mut utf16)
                    .iter()
                    .map(|unit| format!("{unit:04X}"))
                    .collect();
                cmap.push_str(&format!("<{gid:04X}> <{unicode}>\n"));
            }
            cmap.push_str("endbfchar\n");
        }

        cmap.push_str("endcmap\n");
        cmap.push_str("CMapName currentdict /CMap defineresource pop\n");
        cmap.push_str("end\n");
        cmap.push_str("end\n");

        cmap
    }
}

/// Map a character to its WinAnsiEncoding byte
fn winansi_byte(c: char) -> Option<u8> {
    match c as u32 {
        code @ (0x20..=0x7E | 0xA0..=0xFF) => Some(code as u8),
        _ => match c {
            '€' => Some(0x80),
            '‚' => Some(0x82),
            '„' => Some(0x84),
            '…' => Some(0x85),
            '‘' => Some(0x91),
            '’' => Some(0x92),
            '“' => Some(0x93),
            '”' => Some(0x94),
            '•' => Some(0x95),
            '–' => Some(0x96),
            '—' => Some(0x97),
            '™' => Some(0x99),
            _ => None,
        },
    }
}
