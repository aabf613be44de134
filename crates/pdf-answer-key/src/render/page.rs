//! Generated page assembly
//!
//! Generated pages are built into their own lopdf document. Shared
//! resources (fonts, the background image) are added to that document
//! once and referenced from every page.

use crate::font::{EmbeddedFont, FontFace, FontSet};
use crate::types::Result;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::sync::Arc;

/// A font added to the generated document under a resource name
#[derive(Debug, Clone)]
pub struct RegisteredFont {
    pub resource: &'static str,
    pub id: ObjectId,
    pub face: FontFace,
}

/// Regular and bold fonts available to every generated page
#[derive(Debug, Clone)]
pub struct PageFonts {
    pub regular: RegisteredFont,
    pub bold: RegisteredFont,
}

impl PageFonts {
    /// Add `fonts` to `pages`. An embedded face shared by both roles is
    /// written once.
    pub fn register(pages: &mut GeneratedPages, fonts: &FontSet) -> Result<Self> {
        let regular_id = match &fonts.regular {
            FontFace::Embedded(font) => pages.add_embedded_font(font)?,
            face => face.add_to_document(&mut pages.doc)?,
        };
        let bold_id = if fonts.is_embedded() {
            regular_id
        } else {
            fonts.bold.add_to_document(&mut pages.doc)?
        };

        Ok(Self {
            regular: RegisteredFont {
                resource: "F1",
                id: regular_id,
                face: fonts.regular.clone(),
            },
            bold: RegisteredFont {
                resource: "F2",
                id: bold_id,
                face: fonts.bold.clone(),
            },
        })
    }
}

/// Content and resources of one page under construction
#[derive(Debug, Default)]
pub struct PageBuilder {
    content: String,
    fonts: Dictionary,
    xobjects: Dictionary,
    links: Vec<([f32; 4], String)>,
}

impl PageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, ops: &str) {
        self.content.push_str(ops);
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn use_font(&mut self, font: &RegisteredFont) {
        self.fonts
            .set(font.resource.as_bytes(), Object::Reference(font.id));
    }

    pub fn use_xobject(&mut self, name: &str, id: ObjectId) {
        self.xobjects.set(name.as_bytes(), Object::Reference(id));
    }

    /// Invisible link annotation over `rect` (`[llx, lly, urx, ury]` in points)
    pub fn add_link(&mut self, rect: [f32; 4], url: &str) {
        self.links.push((rect, url.to_string()));
    }
}

/// Pages generated during one run, in order
#[derive(Debug)]
pub struct GeneratedPages {
    doc: Document,
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
    /// ToUnicode streams to rebuild as shaped text is drawn
    unicode_maps: Vec<(ObjectId, Arc<EmbeddedFont>)>,
    width_pt: f32,
    height_pt: f32,
}

impl GeneratedPages {
    pub fn new(width_pt: f32, height_pt: f32) -> Self {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            page_ids: Vec::new(),
            unicode_maps: Vec::new(),
            width_pt,
            height_pt,
        }
    }

    pub fn page_size(&self) -> (f32, f32) {
        (self.width_pt, self.height_pt)
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn page_ids(&self) -> &[ObjectId] {
        &self.page_ids
    }

    pub fn len(&self) -> usize {
        self.page_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.page_ids.is_empty()
    }

    /// Write `font` into the document and keep its ToUnicode map current
    pub fn add_embedded_font(&mut self, font: &Arc<EmbeddedFont>) -> Result<ObjectId> {
        let objects = font.add_to_document(&mut self.doc)?;
        self.unicode_maps.push((objects.to_unicode, Arc::clone(font)));
        Ok(objects.font)
    }

    fn refresh_unicode_maps(&mut self) -> Result<()> {
        for (id, font) in &self.unicode_maps {
            self.doc
                .objects
                .insert(*id, Object::Stream(font.to_unicode_stream()?));
        }
        Ok(())
    }

    /// Finish `page` and append it. Returns the new page id.
    pub fn add_page(&mut self, page: PageBuilder) -> Result<ObjectId> {
        let PageBuilder {
            content,
            fonts,
            xobjects,
            links,
        } = page;

        let mut annots = Vec::with_capacity(links.len());
        for (rect, url) in links {
            annots.push(Object::Reference(self.doc.add_object(link_annotation(rect, &url))));
        }

        let mut resources = Dictionary::new();
        if !fonts.is_empty() {
            resources.set("Font", Object::Dictionary(fonts));
        }
        if !xobjects.is_empty() {
            resources.set("XObject", Object::Dictionary(xobjects));
        }

        let mut stream = Stream::new(Dictionary::new(), content.into_bytes());
        stream.compress()?;
        let content_id = self.doc.add_object(stream);

        let mut page_dict = Dictionary::new();
        page_dict.set("Type", Object::Name(b"Page".to_vec()));
        page_dict.set("Parent", Object::Reference(self.pages_id));
        page_dict.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(self.width_pt),
                Object::Real(self.height_pt),
            ]),
        );
        page_dict.set("Resources", Object::Dictionary(resources));
        page_dict.set("Contents", Object::Reference(content_id));
        if !annots.is_empty() {
            page_dict.set("Annots", Object::Array(annots));
        }

        let page_id = self.doc.add_object(page_dict);
        self.page_ids.push(page_id);
        self.refresh_unicode_maps()?;
        Ok(page_id)
    }

    /// Close the page tree and return a standalone document
    pub fn into_document(mut self) -> Document {
        let kids = self
            .page_ids
            .iter()
            .map(|&id| Object::Reference(id))
            .collect();
        let pages_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(kids)),
            ("Count", Object::Integer(self.page_ids.len() as i64)),
        ]);
        self.doc
            .objects
            .insert(self.pages_id, Object::Dictionary(pages_dict));

        let catalog_id = self.doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(self.pages_id)),
        ]));
        self.doc.trailer.set("Root", catalog_id);

        self.doc
    }
}

/// URI link annotation without a visible border
fn link_annotation(rect: [f32; 4], url: &str) -> Dictionary {
    let mut action = Dictionary::new();
    action.set("Type", Object::Name(b"Action".to_vec()));
    action.set("S", Object::Name(b"URI".to_vec()));
    action.set(
        "URI",
        Object::String(url.as_bytes().to_vec(), StringFormat::Literal),
    );

    let mut annot = Dictionary::new();
    annot.set("Type", Object::Name(b"Annot".to_vec()));
    annot.set("Subtype", Object::Name(b"Link".to_vec()));
    annot.set(
        "Rect",
        Object::Array(rect.iter().map(|&v| Object::Real(v)).collect()),
    );
    annot.set(
        "Border",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(0),
        ]),
    );
    annot.set("A", Object::Dictionary(action));
    annot
}
