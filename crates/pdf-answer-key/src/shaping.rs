//! OpenType shaping for embedded fonts
//!
//! Scripts such as Gujarati need GSUB/GPOS processing: conjuncts replace
//! consonant + virama + consonant sequences and some vowel signs are
//! reordered in front of their consonant. rustybuzz turns a string into
//! the glyphs the font actually wants drawn. The built-in Helvetica faces
//! bypass this and stay on WinAnsi.

/// A glyph produced by shaping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapedGlyph {
    pub glyph_id: u16,
    /// Byte offset of the first character of the source text this glyph
    /// belongs to
    pub cluster: u32,
    /// Advances and offsets in font units
    pub x_advance: i32,
    pub x_offset: i32,
    pub y_offset: i32,
}

/// Shape `text` with the font in `font_data`.
///
/// Returns `None` when the font can't be parsed.
pub fn shape_text(text: &str, font_data: &[u8]) -> Option<Vec<ShapedGlyph>> {
    let face = rustybuzz::Face::from_slice(font_data, 0)?;
    let mut buffer = rustybuzz::UnicodeBuffer::new();
    buffer.push_str(text);
    buffer.guess_segment_properties();

    let output = rustybuzz::shape(&face, &[], buffer);
    let glyphs = output
        .glyph_infos()
        .iter()
        .zip(output.glyph_positions())
        .map(|(info, pos)| ShapedGlyph {
            glyph_id: info.glyph_id as u16,
            cluster: info.cluster,
            x_advance: pos.x_advance,
            x_offset: pos.x_offset,
            y_offset: pos.y_offset,
        })
        .collect();

    Some(glyphs)
}

/// Total advance of `glyphs` in points
pub fn shaped_width(glyphs: &[ShapedGlyph], units_per_em: u16, font_size: f32) -> f32 {
    let units: i64 = glyphs.iter().map(|g| g.x_advance as i64).sum();
    units as f32 * font_size / units_per_em as f32
}

/// Glyphs that together draw one run of source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster<'a> {
    pub text: &'a str,
    pub glyphs: Vec<u16>,
}

/// Group shaped glyphs by cluster, in first-appearance order. Clusters are
/// byte offsets, so a cluster's text runs up to the next larger offset.
pub fn clusters<'a>(text: &'a str, glyphs: &[ShapedGlyph]) -> Vec<Cluster<'a>> {
    let mut starts: Vec<usize> = glyphs.iter().map(|g| g.cluster as usize).collect();
    starts.sort_unstable();
    starts.dedup();

    let mut order: Vec<usize> = Vec::with_capacity(starts.len());
    let mut out: Vec<Cluster<'a>> = Vec::with_capacity(starts.len());
    for glyph in glyphs {
        let start = glyph.cluster as usize;
        if let Some(index) = order.iter().position(|&s| s == start) {
            out[index].glyphs.push(glyph.glyph_id);
            continue;
        }

        let end = starts
            .iter()
            .copied()
            .find(|&s| s > start)
            .unwrap_or(text.len());
        order.push(start);
        out.push(Cluster {
            text: text.get(start..end).unwrap_or_default(),
            glyphs: vec![glyph.glyph_id],
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph(glyph_id: u16, cluster: u32, x_advance: i32) -> ShapedGlyph {
        ShapedGlyph {
            glyph_id,
            cluster,
            x_advance,
            x_offset: 0,
            y_offset: 0,
        }
    }

    #[test]
    fn test_shape_text_invalid_font() {
        assert!(shape_text("Hello", &[0, 1, 2, 3]).is_none());
    }

    #[test]
    fn test_shaped_width() {
        let glyphs = [glyph(1, 0, 500), glyph(2, 1, 250)];
        assert!((shaped_width(&glyphs, 1000, 10.0) - 7.5).abs() < 1e-5);
        assert_eq!(shaped_width(&[], 1000, 10.0), 0.0);
    }

    #[test]
    fn test_clusters_for_conjunct() {
        // "પ્ર" is three characters of three bytes each, drawn as one glyph
        let text = "પ્રખ";
        let glyphs = [glyph(40, 0, 700), glyph(12, 9, 600)];
        assert_eq!(
            clusters(text, &glyphs),
            vec![
                Cluster { text: "પ્ર", glyphs: vec![40] },
                Cluster { text: "ખ", glyphs: vec![12] },
            ]
        );
    }

    #[test]
    fn test_clusters_reordered_matra() {
        // "કિ": the i-matra glyph is drawn first but shares the cluster
        let glyphs = [glyph(77, 0, 300), glyph(20, 0, 600)];
        assert_eq!(
            clusters("કિ", &glyphs),
            vec![Cluster { text: "કિ", glyphs: vec![77, 20] }]
        );
    }
}
