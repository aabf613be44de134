//! Page template: full-bleed background image plus two link regions

use crate::options::{GenerationOptions, PageGeometry};
use crate::render::content::place_xobject;
use crate::render::page::{GeneratedPages, PageBuilder};
use crate::types::Result;
use lopdf::{Dictionary, Object, ObjectId, Stream};

const BACKGROUND_NAME: &str = "Bg";

/// Decode a PNG/JPEG background and add it to `pages` as an image XObject.
///
/// Transparency is dropped; the image is stored as flate-compressed RGB.
pub fn embed_background(pages: &mut GeneratedPages, image_bytes: &[u8]) -> Result<ObjectId> {
    let rgb = image::load_from_memory(image_bytes)?.to_rgb8();
    let (width, height) = rgb.dimensions();

    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", Object::Integer(width as i64));
    dict.set("Height", Object::Integer(height as i64));
    dict.set("ColorSpace", Object::Name(b"DeviceRGB".to_vec()));
    dict.set("BitsPerComponent", Object::Integer(8));

    let mut stream = Stream::new(dict, rgb.into_raw());
    stream.compress()?;

    log::debug!("Embedded {}x{} background image", width, height);
    Ok(pages.document_mut().add_object(stream))
}

/// Background and links drawn first on every generated page
#[derive(Debug, Clone)]
pub struct PageTemplate {
    background: ObjectId,
    page_width_pt: f32,
    page_height_pt: f32,
    links: [([f32; 4], String); 2],
}

impl PageTemplate {
    pub fn new(background: ObjectId, geometry: &PageGeometry, options: &GenerationOptions) -> Self {
        let (page_width_pt, page_height_pt) = geometry.page_size_pt();
        Self {
            background,
            page_width_pt,
            page_height_pt,
            links: [
                (geometry.telegram_region.to_pt(), options.telegram_link.clone()),
                (geometry.instagram_region.to_pt(), options.instagram_link.clone()),
            ],
        }
    }

    /// Start a page with the background stretched over it and the link
    /// annotations attached. Links with an empty URL are skipped.
    pub fn begin_page(&self) -> PageBuilder {
        let mut page = PageBuilder::new();
        page.use_xobject(BACKGROUND_NAME, self.background);
        page.push(&place_xobject(
            BACKGROUND_NAME,
            0.0,
            0.0,
            self.page_width_pt,
            self.page_height_pt,
        ));

        for (rect, url) in &self.links {
            if !url.trim().is_empty() {
                page.add_link(*rect, url);
            }
        }

        page
    }
}
