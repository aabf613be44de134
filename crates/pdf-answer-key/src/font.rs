//! Fonts for generated pages
//!
//! Two kinds of font are supported:
//! - the built-in Type1 Helvetica faces, measured with their AFM widths and
//!   written as WinAnsi literal strings
//! - an embedded TrueType font (e.g. a Gujarati face), written as a Type0 /
//!   CIDFontType2 font with Identity-H encoding so any character the font
//!   covers can be drawn

use crate::types::{AnswerKeyError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use crate::shaping::{ShapedGlyph, clusters, shape_text, shaped_width};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::Write;
use std::sync::{Arc, Mutex, PoisonError};

// =============================================================================
// Built-in fonts
// =============================================================================

/// Standard Type1 faces used by generated pages and the watermark
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinFont {
    Helvetica,
    HelveticaBold,
}

/// Helvetica advance widths for ASCII 32..=126, in 1/1000 em
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

/// Helvetica-Bold advance widths for ASCII 32..=126, in 1/1000 em
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // '0'..'?'
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 'P'..'_'
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // '`'..'o'
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 'p'..'~'
];

/// Width used for characters outside the ASCII tables
const BUILTIN_FALLBACK_WIDTH: u16 = 556;

impl BuiltinFont {
    pub fn base_font(self) -> &'static str {
        match self {
            BuiltinFont::Helvetica => "Helvetica",
            BuiltinFont::HelveticaBold => "Helvetica-Bold",
        }
    }

    fn widths(self) -> &'static [u16; 95] {
        match self {
            BuiltinFont::Helvetica => &HELVETICA_WIDTHS,
            BuiltinFont::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        }
    }

    fn char_width(self, byte: u8) -> u16 {
        match byte {
            32..=126 => self.widths()[(byte - 32) as usize],
            _ => BUILTIN_FALLBACK_WIDTH,
        }
    }

    /// Width of `text` in points at `size`
    pub fn text_width(self, text: &str, size: f32) -> f32 {
        let units: u32 = encode_win_ansi(text)
            .into_iter()
            .map(|b| self.char_width(b) as u32)
            .sum();
        units as f32 * size / 1000.0
    }

    /// Type1 font dictionary for this face
    pub fn font_dictionary(self) -> Dictionary {
        let mut font_dict = Dictionary::new();
        font_dict.set("Type", Object::Name(b"Font".to_vec()));
        font_dict.set("Subtype", Object::Name(b"Type1".to_vec()));
        font_dict.set("BaseFont", Object::Name(self.base_font().as_bytes().to_vec()));
        font_dict.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
        font_dict
    }
}

/// Map text to WinAnsi bytes. Latin-1 characters map directly; anything
/// else becomes `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7E | 0xA0..=0xFF => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}

/// Serialize bytes as a PDF literal string operand, e.g. `(a\(b\))`
pub fn literal_string(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 2);
    out.push('(');
    for &b in bytes {
        match b {
            b'(' | b')' | b'\\' => {
                out.push('\\');
                out.push(b as char);
            }
            0x20..=0x7E => out.push(b as char),
            _ => {
                let _ = write!(out, "\\{:03o}", b);
            }
        }
    }
    out.push(')');
    out
}

// =============================================================================
// Embedded TrueType fonts
// =============================================================================

/// A parsed TrueType font ready to be embedded in a PDF.
///
/// Text is shaped with the font's OpenType tables before it is measured or
/// drawn, so conjuncts and reordered vowel signs come out the way the font
/// designer intended.
#[derive(Debug)]
pub struct EmbeddedFont {
    name: String,
    data: Vec<u8>,
    units_per_em: u16,
    ascender: i16,
    descender: i16,
    cap_height: i16,
    bbox: [i16; 4],
    char_to_gid: HashMap<char, u16>,
    nominal_gids: HashSet<u16>,
    /// Horizontal advance of every glyph, indexed by glyph id
    advances: Vec<u16>,
    default_advance: u16,
    /// Text behind glyphs the character map can't name (conjuncts,
    /// contextual forms), collected as they are drawn
    shaped_unicode: Mutex<BTreeMap<u16, String>>,
}

/// Objects written for one embedded font
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddedFontObjects {
    pub font: ObjectId,
    pub to_unicode: ObjectId,
}

impl EmbeddedFont {
    /// Parse font bytes. `family` names the font inside the PDF.
    pub fn from_bytes(data: Vec<u8>, family: &str) -> Result<Self> {
        let face = ttf_parser::Face::parse(&data, 0)
            .map_err(|e| AnswerKeyError::Font(format!("Failed to parse font '{}': {}", family, e)))?;

        let units_per_em = face.units_per_em();
        let ascender = face.ascender();
        let descender = face.descender();
        let cap_height = face.capital_height().unwrap_or(ascender);
        let bbox = face.global_bounding_box();

        let advances: Vec<u16> = (0..face.number_of_glyphs())
            .map(|gid| face.glyph_hor_advance(ttf_parser::GlyphId(gid)).unwrap_or(0))
            .collect();

        let mut char_to_gid = HashMap::new();
        for code in 32u32..=0xFFFF {
            if let Some(ch) = char::from_u32(code) {
                if let Some(glyph_id) = face.glyph_index(ch) {
                    char_to_gid.insert(ch, glyph_id.0);
                }
            }
        }

        if char_to_gid.is_empty() {
            return Err(AnswerKeyError::Font(format!(
                "Font '{}' has no usable Unicode character map",
                family
            )));
        }

        let nominal_gids = char_to_gid.values().copied().collect();

        let default_advance = face
            .glyph_index(' ')
            .and_then(|gid| face.glyph_hor_advance(gid))
            .filter(|&adv| adv > 0)
            .unwrap_or(units_per_em / 2);

        Ok(Self {
            name: sanitize_font_name(family),
            units_per_em,
            ascender,
            descender,
            cap_height,
            bbox: [bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max],
            char_to_gid,
            nominal_gids,
            advances,
            default_advance,
            shaped_unicode: Mutex::new(BTreeMap::new()),
            data,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    fn advance(&self, gid: u16) -> u16 {
        self.advances
            .get(gid as usize)
            .copied()
            .unwrap_or(self.default_advance)
    }

    fn to_pdf_units(&self, value: i32) -> i64 {
        (value as f64 * 1000.0 / self.units_per_em as f64).round() as i64
    }

    /// Shape `text` into glyphs. Control characters are dropped first.
    pub fn shape(&self, text: &str) -> Vec<ShapedGlyph> {
        let text: String = text.chars().filter(|c| !c.is_control()).collect();
        shape_text(&text, &self.data).unwrap_or_else(|| self.nominal_glyphs(&text))
    }

    /// One glyph per character straight from the character map
    fn nominal_glyphs(&self, text: &str) -> Vec<ShapedGlyph> {
        text.char_indices()
            .map(|(offset, ch)| {
                let glyph_id = self.char_to_gid.get(&ch).copied().unwrap_or(0);
                ShapedGlyph {
                    glyph_id,
                    cluster: offset as u32,
                    x_advance: self.advance(glyph_id) as i32,
                    x_offset: 0,
                    y_offset: 0,
                }
            })
            .collect()
    }

    /// Width of the shaped `text` in points at `size`
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        shaped_width(&self.shape(text), self.units_per_em, size)
    }

    /// Operators drawing the shaped `text` at `size` inside a text object.
    ///
    /// Glyph ids go out as 2-byte codes in `TJ` arrays. The numbers between
    /// them move each glyph from its `/W` advance to the shaped position, and
    /// vertical mark offsets become `Ts` rises.
    pub fn show_text(&self, text: &str, size: f32) -> String {
        let clean: String = text.chars().filter(|c| !c.is_control()).collect();
        let glyphs = self.shape(&clean);
        if glyphs.is_empty() {
            return "<> Tj".to_string();
        }
        self.record_clusters(&clean, &glyphs);

        let mut ops = String::new();
        let mut array = String::new();
        let mut rise = 0;
        let mut carry = 0i64;

        for glyph in &glyphs {
            if glyph.y_offset != rise {
                push_adjustment(&mut array, carry);
                carry = 0;
                flush_array(&mut ops, &mut array);
                let points = glyph.y_offset as f32 * size / self.units_per_em as f32;
                let _ = write!(ops, "{:.2} Ts ", points);
                rise = glyph.y_offset;
            }

            let offset = self.to_pdf_units(glyph.x_offset);
            push_adjustment(&mut array, carry - offset);
            let _ = write!(array, "<{:04X}>", glyph.glyph_id);

            let nominal = self.to_pdf_units(self.advance(glyph.glyph_id) as i32);
            carry = offset + nominal - self.to_pdf_units(glyph.x_advance);
        }
        flush_array(&mut ops, &mut array);
        if rise != 0 {
            ops.push_str("0 Ts ");
        }

        ops.truncate(ops.trim_end().len());
        ops
    }

    /// Remember which text each unmapped glyph stands for. Characters whose
    /// own glyph is drawn in the same cluster are left out.
    fn record_clusters(&self, text: &str, glyphs: &[ShapedGlyph]) {
        let mut shaped = self
            .shaped_unicode
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        for cluster in clusters(text, glyphs) {
            let Some(&gid) = cluster
                .glyphs
                .iter()
                .find(|&&g| g != 0 && !self.nominal_gids.contains(&g))
            else {
                continue;
            };

            let unicode: String = cluster
                .text
                .chars()
                .filter(|c| {
                    self.char_to_gid
                        .get(c)
                        .is_none_or(|g| !cluster.glyphs.contains(g))
                })
                .collect();
            if !unicode.is_empty() {
                shaped.entry(gid).or_insert(unicode);
            }
        }
    }

    /// Write FontFile2, FontDescriptor, CIDFont, ToUnicode and the Type0
    /// root into `doc`
    pub fn add_to_document(&self, doc: &mut Document) -> Result<EmbeddedFontObjects> {
        // 1. FontFile2
        let mut file_dict = Dictionary::new();
        file_dict.set("Length1", Object::Integer(self.data.len() as i64));
        let mut font_file = Stream::new(file_dict, self.data.clone());
        font_file.compress()?;
        let font_file_id = doc.add_object(font_file);

        // 2. FontDescriptor
        let mut descriptor = Dictionary::new();
        descriptor.set("Type", Object::Name(b"FontDescriptor".to_vec()));
        descriptor.set("FontName", Object::Name(self.name.as_bytes().to_vec()));
        descriptor.set("Flags", Object::Integer(4));
        descriptor.set(
            "FontBBox",
            Object::Array(
                self.bbox
                    .iter()
                    .map(|&v| Object::Integer(self.to_pdf_units(v as i32)))
                    .collect(),
            ),
        );
        descriptor.set("ItalicAngle", Object::Integer(0));
        descriptor.set("Ascent", Object::Integer(self.to_pdf_units(self.ascender as i32)));
        descriptor.set("Descent", Object::Integer(self.to_pdf_units(self.descender as i32)));
        descriptor.set("CapHeight", Object::Integer(self.to_pdf_units(self.cap_height as i32)));
        descriptor.set("StemV", Object::Integer(80));
        descriptor.set("FontFile2", Object::Reference(font_file_id));
        let descriptor_id = doc.add_object(descriptor);

        // 3. CIDFont
        let mut system_info = Dictionary::new();
        system_info.set("Registry", Object::String(b"Adobe".to_vec(), StringFormat::Literal));
        system_info.set("Ordering", Object::String(b"Identity".to_vec(), StringFormat::Literal));
        system_info.set("Supplement", Object::Integer(0));

        let mut cid_font = Dictionary::new();
        cid_font.set("Type", Object::Name(b"Font".to_vec()));
        cid_font.set("Subtype", Object::Name(b"CIDFontType2".to_vec()));
        cid_font.set("BaseFont", Object::Name(self.name.as_bytes().to_vec()));
        cid_font.set("CIDSystemInfo", Object::Dictionary(system_info));
        cid_font.set("FontDescriptor", Object::Reference(descriptor_id));
        cid_font.set("DW", Object::Integer(self.to_pdf_units(self.default_advance as i32)));
        cid_font.set("W", Object::Array(self.width_array()));
        cid_font.set("CIDToGIDMap", Object::Name(b"Identity".to_vec()));
        let cid_font_id = doc.add_object(cid_font);

        // 4. ToUnicode, rewritten once text has been drawn
        let to_unicode_id = doc.add_object(self.to_unicode_stream()?);

        // 5. Type0 root
        let mut type0 = Dictionary::new();
        type0.set("Type", Object::Name(b"Font".to_vec()));
        type0.set("Subtype", Object::Name(b"Type0".to_vec()));
        type0.set("BaseFont", Object::Name(self.name.as_bytes().to_vec()));
        type0.set("Encoding", Object::Name(b"Identity-H".to_vec()));
        type0.set(
            "DescendantFonts",
            Object::Array(vec![Object::Reference(cid_font_id)]),
        );
        type0.set("ToUnicode", Object::Reference(to_unicode_id));

        Ok(EmbeddedFontObjects {
            font: doc.add_object(type0),
            to_unicode: to_unicode_id,
        })
    }

    /// `/W` as one run of widths starting at glyph 0
    fn width_array(&self) -> Vec<Object> {
        let widths = self
            .advances
            .iter()
            .map(|&advance| Object::Integer(self.to_pdf_units(advance as i32)))
            .collect();
        vec![Object::Integer(0), Object::Array(widths)]
    }

    /// ToUnicode CMap covering the character map plus every shaped glyph
    /// drawn so far
    pub fn to_unicode_stream(&self) -> Result<Stream> {
        let mut stream = Stream::new(Dictionary::new(), self.to_unicode_cmap().into_bytes());
        stream.compress()?;
        Ok(stream)
    }

    fn to_unicode_cmap(&self) -> String {
        // First character wins when several map to one glyph
        let mut gid_to_unicode: BTreeMap<u16, String> = BTreeMap::new();
        let mut chars: Vec<(&char, &u16)> = self.char_to_gid.iter().collect();
        chars.sort();
        for (&ch, &gid) in chars {
            gid_to_unicode.entry(gid).or_insert_with(|| ch.to_string());
        }
        {
            let shaped = self
                .shaped_unicode
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            for (&gid, text) in shaped.iter() {
                gid_to_unicode.entry(gid).or_insert_with(|| text.clone());
            }
        }
        let pairs: Vec<(u16, String)> = gid_to_unicode.into_iter().collect();

        let mut cmap = String::new();
        cmap.push_str("/CIDInit /ProcSet findresource begin\n12 dict begin\nbegincmap\n");
        cmap.push_str("/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
        let _ = writeln!(cmap, "/CMapName /{}-UTF16 def", self.name);
        cmap.push_str("/CMapType 2 def\n1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n");

        for chunk in pairs.chunks(100) {
            let _ = writeln!(cmap, "{} beginbfchar", chunk.len());
            for (gid, text) in chunk {
                let _ = write!(cmap, "<{:04X}> <", gid);
                for unit in text.encode_utf16() {
                    let _ = write!(cmap, "{:04X}", unit);
                }
                cmap.push_str(">\n");
            }
            cmap.push_str("endbfchar\n");
        }

        cmap.push_str("endcmap\nCMapName currentdict /CMap defineresource pop\nend\nend\n");
        cmap
    }
}

/// Append a `TJ` adjustment (thousandths of text space, positive moves left)
fn push_adjustment(array: &mut String, amount: i64) {
    if amount != 0 {
        let _ = write!(array, " {} ", amount);
    }
}

fn flush_array(ops: &mut String, array: &mut String) {
    let body = array.trim();
    if !body.is_empty() {
        let _ = write!(ops, "[{}] TJ ", body);
    }
    array.clear();
}

fn sanitize_font_name(family: &str) -> String {
    let name: String = family
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if name.is_empty() {
        "EmbeddedFont".to_string()
    } else {
        name
    }
}

// =============================================================================
// Font faces and sets
// =============================================================================

/// A font that generated pages can measure and draw with
#[derive(Debug, Clone)]
pub enum FontFace {
    Builtin(BuiltinFont),
    Embedded(Arc<EmbeddedFont>),
}

impl FontFace {
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        match self {
            FontFace::Builtin(font) => font.text_width(text, size),
            FontFace::Embedded(font) => font.text_width(text, size),
        }
    }

    /// Text-showing operators for `text` at `size`
    pub fn show(&self, text: &str, size: f32) -> String {
        match self {
            FontFace::Builtin(_) => format!("{} Tj", literal_string(&encode_win_ansi(text))),
            FontFace::Embedded(font) => font.show_text(text, size),
        }
    }

    pub fn add_to_document(&self, doc: &mut Document) -> Result<ObjectId> {
        match self {
            FontFace::Builtin(font) => Ok(doc.add_object(font.font_dictionary())),
            FontFace::Embedded(font) => Ok(font.add_to_document(doc)?.font),
        }
    }
}

/// Regular and bold faces used together on generated pages
#[derive(Debug, Clone)]
pub struct FontSet {
    pub regular: FontFace,
    pub bold: FontFace,
}

impl FontSet {
    /// Helvetica and Helvetica-Bold
    pub fn builtin() -> Self {
        Self {
            regular: FontFace::Builtin(BuiltinFont::Helvetica),
            bold: FontFace::Builtin(BuiltinFont::HelveticaBold),
        }
    }

    /// One embedded face for both roles
    pub fn embedded(font: EmbeddedFont) -> Self {
        let face = FontFace::Embedded(Arc::new(font));
        Self {
            regular: face.clone(),
            bold: face,
        }
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self.regular, FontFace::Embedded(_))
    }
}
