//! Watermark overlay
//!
//! The watermark is a Form XObject holding translucent, rotated text
//! centred on a `width x height` box with its origin at (0, 0). Callers
//! translate it onto pages whose MediaBox does not start at the origin.

use crate::constants::{
    DEFAULT_WATERMARK_TEXT, WATERMARK_FONT_SIZE, WATERMARK_GRAY,
    WATERMARK_OPACITY, WATERMARK_ROTATION_DEGREES,
};
use crate::font::{BuiltinFont, FontFace};
use crate::types::Result;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

/// Appearance of the watermark text
#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkStyle {
    pub text: String,
    pub font_size: f32,
    /// Fill and stroke alpha, 0..=1
    pub opacity: f32,
    /// Counter-clockwise rotation in degrees
    pub rotation_degrees: f32,
    /// Grey level of the fill, 0 = black
    pub gray: f32,
}

impl Default for WatermarkStyle {
    fn default() -> Self {
        Self::new(DEFAULT_WATERMARK_TEXT)
    }
}

impl WatermarkStyle {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_size: WATERMARK_FONT_SIZE,
            opacity: WATERMARK_OPACITY,
            rotation_degrees: WATERMARK_ROTATION_DEGREES,
            gray: WATERMARK_GRAY,
        }
    }

    /// Content stream drawing the text centred on a `width x height` box
    pub fn content(&self, width: f32, height: f32) -> String {
        let face = FontFace::Builtin(BuiltinFont::HelveticaBold);
        let text_width = face.text_width(&self.text, self.font_size);
        let (sin, cos) = self.rotation_degrees.to_radians().sin_cos();

        format!(
            "q\n/GS1 gs\n{g:.3} g\n{cos:.5} {sin:.5} {nsin:.5} {cos:.5} {cx:.2} {cy:.2} cm\n\
             BT /F1 {size} Tf {x:.2} {y:.2} Td {text} ET\nQ\n",
            g = self.gray,
            cos = cos,
            sin = sin,
            nsin = -sin,
            cx = width / 2.0,
            cy = height / 2.0,
            size = self.font_size,
            x = -text_width / 2.0,
            y = 0.0,
            text = face.show(&self.text, self.font_size),
        )
    }
}

/// Add a watermark Form XObject sized `width x height` to `doc`
pub fn create_watermark_overlay(
    doc: &mut Document,
    style: &WatermarkStyle,
    width: f32,
    height: f32,
) -> Result<ObjectId> {
    let font_id = doc.add_object(BuiltinFont::HelveticaBold.font_dictionary());

    let gs = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"ExtGState".to_vec())),
        ("ca", Object::Real(style.opacity)),
        ("CA", Object::Real(style.opacity)),
    ]);

    let resources = Dictionary::from_iter(vec![
        (
            "Font",
            Object::Dictionary(Dictionary::from_iter(vec![("F1", Object::Reference(font_id))])),
        ),
        (
            "ExtGState",
            Object::Dictionary(Dictionary::from_iter(vec![("GS1", Object::Dictionary(gs))])),
        ),
    ]);

    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Form".to_vec()));
    dict.set("FormType", Object::Integer(1));
    dict.set(
        "BBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(width),
            Object::Real(height),
        ]),
    );
    dict.set("Resources", Object::Dictionary(resources));

    let mut stream = Stream::new(dict, style.content(width, height).into_bytes());
    stream.compress()?;
    Ok(doc.add_object(stream))
}

/// One overlay per distinct page size, created on first use
#[derive(Debug)]
pub struct WatermarkOverlays {
    style: WatermarkStyle,
    by_size: HashMap<(u32, u32), ObjectId>,
}

impl WatermarkOverlays {
    pub fn new(style: WatermarkStyle) -> Self {
        Self {
            style,
            by_size: HashMap::new(),
        }
    }

    pub fn style(&self) -> &WatermarkStyle {
        &self.style
    }

    /// Overlay for a page of the given size, shared between equal sizes
    pub fn overlay_for(&mut self, doc: &mut Document, width: f32, height: f32) -> Result<ObjectId> {
        let key = (width.to_bits(), height.to_bits());
        if let Some(&id) = self.by_size.get(&key) {
            return Ok(id);
        }

        let id = create_watermark_overlay(doc, &self.style, width, height)?;
        log::debug!("Created watermark overlay for {:.1}x{:.1}pt pages", width, height);
        self.by_size.insert(key, id);
        Ok(id)
    }

    /// Number of distinct overlays created so far
    pub fn len(&self) -> usize {
        self.by_size.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_size.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_is_centered_and_rotated() {
        let style = WatermarkStyle::new("TEST");
        let content = style.content(200.0, 100.0);

        assert!(content.contains("/GS1 gs"));
        assert!(content.contains("100.00 50.00 cm"));
        assert!(content.contains("0.70711 0.70711 -0.70711 0.70711"));
        assert!(content.contains("(TEST) Tj"));
        // Centred horizontally, baseline through the middle of the page
        assert!(content.contains("-76.68 0.00 Td"));
    }

    #[test]
    fn test_overlays_shared_by_size() {
        let mut doc = Document::with_version("1.7");
        let mut overlays = WatermarkOverlays::new(WatermarkStyle::default());

        let a = overlays.overlay_for(&mut doc, 595.0, 842.0).unwrap();
        let b = overlays.overlay_for(&mut doc, 595.0, 842.0).unwrap();
        let c = overlays.overlay_for(&mut doc, 612.0, 792.0).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(overlays.len(), 2);
    }

    #[test]
    fn test_overlay_has_transparency() {
        let mut doc = Document::with_version("1.7");
        let id = create_watermark_overlay(&mut doc, &WatermarkStyle::default(), 100.0, 100.0)
            .unwrap();

        let stream = doc.get_object(id).unwrap().as_stream().unwrap();
        let resources = stream.dict.get(b"Resources").unwrap().as_dict().unwrap();
        let gs = resources
            .get(b"ExtGState")
            .unwrap()
            .as_dict()
            .unwrap()
            .get(b"GS1")
            .unwrap()
            .as_dict()
            .unwrap();
        assert_eq!(gs.get(b"ca").unwrap().as_float().unwrap(), WATERMARK_OPACITY);
    }
}
