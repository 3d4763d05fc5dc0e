//! Font handling for PDF documents

use crate::{PdfError, Result};
use lopdf::{dictionary, Dictionary, Object, Stream};
use std::collections::BTreeSet;
use std::fmt::Write as _;
use unicode_normalization::UnicodeNormalization;

/// One of the standard 14 PDF fonts, used without embedding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StandardFont {
    #[default]
    HelveticaBold,
}

/// Helvetica-Bold advance widths (1/1000 em) for WinAnsi codes 32..=255.
/// Zero marks codes WinAnsi leaves undefined.
#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 224] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, 0,
    556, 0, 278, 556, 500, 1000, 556, 556, 333, 1000, 667, 333, 1000, 0, 611, 0,
    0, 278, 278, 500, 500, 350, 556, 1000, 333, 1000, 556, 333, 944, 0, 500, 667,
    278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278,
    611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556,
];

impl StandardFont {
    /// PostScript name used as `/BaseFont`
    pub fn base_font(self) -> &'static str {
        match self {
            StandardFont::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Advance width of a WinAnsi code in 1/1000 em
    pub fn code_width(self, code: u8) -> u16 {
        match self {
            StandardFont::HelveticaBold => {
                if code < 32 {
                    0
                } else {
                    HELVETICA_BOLD_WIDTHS[usize::from(code - 32)]
                }
            }
        }
    }

    /// Calculate text width in points for a given font size
    pub fn text_width_points(self, text: &str, font_size: f32) -> f32 {
        let units: u32 = encode_winansi(text)
            .bytes
            .iter()
            .map(|&code| u32::from(self.code_width(code)))
            .sum();
        units as f32 / 1000.0 * font_size
    }

    /// Encode text as a hex string for the Tj operator
    pub fn encode_text_hex(self, text: &str) -> String {
        let encoded = encode_winansi(text);
        let mut hex = String::with_capacity(encoded.bytes.len() * 2 + 2);
        hex.push('<');
        for byte in encoded.bytes {
            let _ = write!(hex, "{byte:02X}");
        }
        hex.push('>');
        hex
    }

    /// Font dictionary for the page resources
    pub fn to_pdf_dictionary(self) -> Dictionary {
        dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => self.base_font(),
            "Encoding" => "WinAnsiEncoding",
        }
    }
}

/// Text encoded for a WinAnsi (cp1252) simple font
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinAnsiText {
    pub bytes: Vec<u8>,
    /// Characters that could not be represented and became `?`
    pub replaced: usize,
}

/// Encode text as WinAnsi bytes
///
/// Characters outside cp1252 are decomposed and their base letter is
/// used when that one is representable (e.g. `ă` becomes `a`).
/// Anything else becomes `?`.
pub fn encode_winansi(text: &str) -> WinAnsiText {
    let mut bytes = Vec::with_capacity(text.len());
    let mut replaced = 0;

    for c in text.chars() {
        let code = winansi_code(c).or_else(|| c.to_string().nfd().next().and_then(winansi_code));
        match code {
            Some(code) => bytes.push(code),
            None => {
                replaced += 1;
                bytes.push(b'?');
            }
        }
    }

    WinAnsiText { bytes, replaced }
}

fn winansi_code(c: char) -> Option<u8> {
    let code = match c {
        '\u{0020}'..='\u{007E}' | '\u{00A0}'..='\u{00FF}' => c as u8,
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        _ => return None,
    };
    Some(code)
}

/// Embedded TrueType font
///
/// The raw bytes are kept and the face is re-parsed on demand, so the
/// type owns its data without any `'static` tricks.
#[derive(Debug, Clone)]
pub struct FontData {
    /// Font identifier (also the `/BaseFont` name)
    pub name: String,
    ttf_data: Vec<u8>,
    /// Characters drawn with this font, for the widths and ToUnicode tables
    used_chars: BTreeSet<char>,
    units_per_em: u16,
    ascender: i16,
    descender: i16,
    cap_height: i16,
    bbox: [i16; 4],
}

/// PDF objects generated for font embedding
pub struct FontObjects {
    /// Type0 font dictionary
    pub type0_font: Dictionary,
    /// CIDFont Type2 dictionary
    pub cid_font: Dictionary,
    /// Font descriptor dictionary
    pub font_descriptor: Dictionary,
    /// Font file stream (TTF data)
    pub font_file_stream: Stream,
    /// ToUnicode CMap stream
    pub tounicode_stream: Stream,
}

impl FontData {
    /// Create font data from TTF bytes
    ///
    /// # Arguments
    /// * `name` - Font identifier
    /// * `ttf_data` - TrueType font file bytes
    pub fn from_ttf(name: &str, ttf_data: &[u8]) -> Result<Self> {
        let face = ttf_parser::Face::parse(ttf_data, 0)
            .map_err(|e| PdfError::FontParseError(format!("{name}: {e}")))?;

        let rect = face.global_bounding_box();
        let ascender = face.ascender();

        Ok(Self {
            name: sanitize_font_name(name),
            units_per_em: face.units_per_em(),
            ascender,
            descender: face.descender(),
            cap_height: face.capital_height().unwrap_or(ascender),
            bbox: [rect.x_min, rect.y_min, rect.x_max, rect.y_max],
            ttf_data: ttf_data.to_vec(),
            used_chars: BTreeSet::new(),
        })
    }

    fn face(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.ttf_data, 0).ok()
    }

    /// Record characters drawn with this font
    pub fn add_chars(&mut self, text: &str) {
        self.used_chars.extend(text.chars());
    }

    /// Number of characters in `text` the font has no glyph for
    pub fn missing_glyphs(&self, text: &str) -> usize {
        let Some(face) = self.face() else {
            return text.chars().count();
        };
        text.chars()
            .filter(|&c| face.glyph_index(c).map_or(true, |id| id.0 == 0))
            .count()
    }

    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    /// Calculate text width in points for a given font size
    pub fn text_width_points(&self, text: &str, font_size: f32) -> f32 {
        let Some(face) = self.face() else {
            return 0.0;
        };
        let units: u32 = text
            .chars()
            .filter_map(|c| face.glyph_index(c))
            .filter_map(|id| face.glyph_hor_advance(id))
            .map(u32::from)
            .sum();
        units as f32 / f32::from(self.units_per_em) * font_size
    }

    /// Encode text as glyph IDs in a hex string for the Tj operator
    pub fn encode_text_hex(&self, text: &str) -> String {
        let face = self.face();
        let mut hex = String::with_capacity(text.len() * 4 + 2);
        hex.push('<');
        for c in text.chars() {
            let gid = face
                .as_ref()
                .and_then(|face| face.glyph_index(c))
                .map_or(0, |id| id.0);
            let _ = write!(hex, "{gid:04X}");
        }
        hex.push('>');
        hex
    }

    /// Generate all PDF objects needed to embed this font
    ///
    /// Reference entries are left for the document to fill in once the
    /// objects have ids.
    pub fn to_pdf_objects(&self) -> Result<FontObjects> {
        let font_name = Object::Name(self.name.clone().into_bytes());
        let scale = |v: i16| i64::from(v) * 1000 / i64::from(self.units_per_em.max(1));

        let mut tounicode_stream = Stream::new(
            Dictionary::new(),
            crate::deflate(self.generate_tounicode_cmap().as_bytes())?,
        );
        tounicode_stream.dict.set("Filter", "FlateDecode");

        let mut font_file_stream = Stream::new(
            dictionary! { "Length1" => self.ttf_data.len() as i64 },
            crate::deflate(&self.ttf_data)?,
        );
        font_file_stream.dict.set("Filter", "FlateDecode");

        let font_descriptor = dictionary! {
            "Type" => "FontDescriptor",
            "FontName" => font_name.clone(),
            "Flags" => 4,
            "FontBBox" => self.bbox.iter().map(|&v| Object::Integer(scale(v))).collect::<Vec<_>>(),
            "ItalicAngle" => 0,
            "Ascent" => scale(self.ascender),
            "Descent" => scale(self.descender),
            "CapHeight" => scale(self.cap_height),
            "StemV" => 80,
        };

        let cid_font = dictionary! {
            "Type" => "Font",
            "Subtype" => "CIDFontType2",
            "BaseFont" => font_name.clone(),
            "CIDSystemInfo" => dictionary! {
                "Registry" => Object::string_literal("Adobe"),
                "Ordering" => Object::string_literal("Identity"),
                "Supplement" => 0,
            },
            "CIDToGIDMap" => "Identity",
            "W" => self.generate_widths_array(),
            "DW" => 1000,
        };

        let type0_font = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => font_name,
            "Encoding" => "Identity-H",
        };

        Ok(FontObjects {
            type0_font,
            cid_font,
            font_descriptor,
            font_file_stream,
            tounicode_stream,
        })
    }

    /// `/W` array in `gid [width]` form, widths in 1/1000 em
    fn generate_widths_array(&self) -> Vec<Object> {
        let Some(face) = self.face() else {
            return Vec::new();
        };

        let mut gids: Vec<u16> = self
            .used_chars
            .iter()
            .filter_map(|&c| face.glyph_index(c))
            .map(|id| id.0)
            .collect();
        gids.sort_unstable();
        gids.dedup();

        let upem = u32::from(self.units_per_em.max(1));
        gids.into_iter()
            .flat_map(|gid| {
                let advance = face
                    .glyph_hor_advance(ttf_parser::GlyphId(gid))
                    .map_or(1000, |a| u32::from(a) * 1000 / upem);
                [
                    Object::Integer(i64::from(gid)),
                    Object::Array(vec![Object::Integer(i64::from(advance))]),
                ]
            })
            .collect()
    }

    /// ToUnicode CMap mapping glyph IDs back to the characters drawn
    fn generate_tounicode_cmap(&self) -> String {
        let face = self.face();
        let mut cmap = String::from(
            "/CIDInit /ProcSet findresource begin\n\
             12 dict begin\n\
             begincmap\n\
             /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
             /CMapName /Adobe-Identity-UCS def\n\
             /CMapType 2 def\n\
             1 begincodespacerange\n\
             <0000> <FFFF>\n\
             endcodespacerange\n",
        );

        let mappings: Vec<(u16, char)> = self
            .used_chars
            .iter()
            .filter_map(|&c| {
                let gid = face.as_ref()?.glyph_index(c)?.0;
                Some((gid, c))
            })
            .collect();

        // bfchar sections hold at most 100 entries
        for chunk in mappings.chunks(100) {
            let _ = writeln!(cmap, "{} beginbfchar", chunk.len());
            for (gid, c) in chunk {
                let mut units = [0u16; 2];
                let utf16: String = c
                    .encode_utf16(&mut units)
                    .iter()
                    .map(|u| format!("{u:04X}"))
                    .collect();
                let _ = writeln!(cmap, "<{gid:04X}> <{utf16}>");
            }
            cmap.push_str("endbfchar\n");
        }

        cmap.push_str(
            "endcmap\n\
             CMapName currentdict /CMap defineresource pop\n\
             end\n\
             end\n",
        );
        cmap
    }
}

/// PDF names cannot hold whitespace or delimiters
fn sanitize_font_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_ascii_graphic() && !"()<>[]{}/%#".contains(*c))
        .collect();
    if cleaned.is_empty() {
        "EmbeddedFont".to_string()
    } else {
        cleaned
    }
}
