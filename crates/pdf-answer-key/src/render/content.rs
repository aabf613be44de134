//! Content stream fragments
//!
//! Small builders for the PDF operators the page renderers use. Every
//! function returns a self-contained string ending in a newline.

use crate::font::FontFace;

/// An RGB colour with components in 0..=1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// From a `0xRRGGBB` literal
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >> 8) & 0xFF) as f32 / 255.0,
            b: (hex & 0xFF) as f32 / 255.0,
        }
    }

    fn components(&self) -> String {
        format!("{:.3} {:.3} {:.3}", self.r, self.g, self.b)
    }
}

/// Filled rectangle with its lower-left corner at (x, y)
pub fn fill_rect(x: f32, y: f32, width: f32, height: f32, color: Color) -> String {
    format!(
        "{} rg {:.2} {:.2} {:.2} {:.2} re f\n",
        color.components(),
        x,
        y,
        width,
        height
    )
}

/// Stroked straight line
pub fn line(x1: f32, y1: f32, x2: f32, y2: f32) -> String {
    format!("{:.2} {:.2} m {:.2} {:.2} l S\n", x1, y1, x2, y2)
}

/// Stroke colour and width for subsequent lines
pub fn stroke_style(color: Color, width: f32) -> String {
    format!("{} RG {} w\n", color.components(), width)
}

/// One line of text with its baseline starting at (x, y)
pub fn text(
    resource: &str,
    face: &FontFace,
    size: f32,
    x: f32,
    y: f32,
    color: Color,
    value: &str,
) -> String {
    format!(
        "BT {} rg /{} {} Tf {:.2} {:.2} Td {} ET\n",
        color.components(),
        resource,
        size,
        x,
        y,
        face.show(value, size)
    )
}

/// Draw a named XObject scaled to `width` × `height` at (x, y)
pub fn place_xobject(name: &str, x: f32, y: f32, width: f32, height: f32) -> String {
    format!(
        "q {:.4} 0 0 {:.4} {:.4} {:.4} cm /{} Do Q\n",
        width, height, x, y, name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::BuiltinFont;

    #[test]
    fn test_from_hex() {
        let c = Color::from_hex(0x003366);
        assert_eq!(c.r, 0.0);
        assert!((c.g - 0.2).abs() < 1e-6);
        assert!((c.b - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_text_operator() {
        let face = FontFace::Builtin(BuiltinFont::Helvetica);
        let ops = text("F1", &face, 10.0, 5.0, 6.0, Color::BLACK, "A(1)");
        assert_eq!(
            ops,
            "BT 0.000 0.000 0.000 rg /F1 10 Tf 5.00 6.00 Td (A\\(1\\)) Tj ET\n"
        );
    }
}
