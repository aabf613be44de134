//! Watermarking the question paper and appending generated pages
//!
//! Source pages are modified in place: their original content is wrapped in
//! `q ... Q` and followed by a stream that draws the watermark overlay. The
//! generated pages are deep-copied into the source document after its last
//! page, so the source page order is never disturbed.

use crate::constants::DEFAULT_PAGE_DIMENSIONS;
use crate::render::{GeneratedPages, WatermarkOverlays, WatermarkStyle};
use crate::types::{AnswerKeyError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

/// Resource name the watermark overlay is registered under on each page
const WATERMARK_RESOURCE: &str = "AkWatermark";

/// How far up the page tree inherited attributes are looked for
const MAX_INHERIT_DEPTH: usize = 10;

/// Watermark every page of `source`, then append `generated` after them.
///
/// Fails with [`AnswerKeyError::NoPages`] before touching anything when the
/// source has no pages.
pub fn merge_documents(
    mut source: Document,
    generated: &GeneratedPages,
    style: &WatermarkStyle,
) -> Result<Document> {
    if source.get_pages().is_empty() {
        return Err(AnswerKeyError::NoPages);
    }

    let stamped = apply_watermark(&mut source, style)?;
    let appended = append_generated_pages(&mut source, generated)?;
    log::info!(
        "Merged {} watermarked pages with {} generated pages",
        stamped,
        appended
    );

    Ok(source)
}

/// Draw the watermark over every page of `doc`. Returns the number of pages
/// stamped.
pub fn apply_watermark(doc: &mut Document, style: &WatermarkStyle) -> Result<usize> {
    let page_ids: Vec<ObjectId> = doc.get_pages().values().copied().collect();
    let mut overlays = WatermarkOverlays::new(style.clone());

    for &page_id in &page_ids {
        let media_box = page_media_box(doc, page_id);
        let width = media_box[2] - media_box[0];
        let height = media_box[3] - media_box[1];
        let overlay_id = overlays.overlay_for(doc, width, height)?;
        stamp_page(doc, page_id, overlay_id, media_box[0], media_box[1])?;
    }

    require_transparency(doc);

    log::debug!(
        "Watermarked {} pages using {} overlay(s)",
        page_ids.len(),
        overlays.len()
    );
    Ok(page_ids.len())
}

/// Constant alpha in an ExtGState needs PDF 1.4
fn require_transparency(doc: &mut Document) {
    let older = doc
        .version
        .parse::<f32>()
        .map(|version| version < 1.4)
        .unwrap_or(false);
    if older {
        log::debug!("Raising PDF version from {} to 1.4", doc.version);
        doc.version = "1.4".to_string();
    }
}

/// Copy the generated pages into `doc` after its existing pages. Returns the
/// number of pages appended.
pub fn append_generated_pages(doc: &mut Document, generated: &GeneratedPages) -> Result<usize> {
    let pages_root = doc.catalog()?.get(b"Pages")?.as_reference()?;
    let source = generated.document();
    let mut cache = HashMap::new();
    let mut kids = Vec::with_capacity(generated.len());

    for &page_id in generated.page_ids() {
        let mut page = source.get_dictionary(page_id)?.clone();
        // Parent points at the generated page tree; re-parented below
        page.remove(b"Parent");

        let mut copied = copy_object_deep(doc, source, &Object::Dictionary(page), &mut cache)?;
        if let Object::Dictionary(dict) = &mut copied {
            dict.set("Parent", Object::Reference(pages_root));
        }
        kids.push(Object::Reference(doc.add_object(copied)));
    }

    let appended = kids.len();
    let kids_ref = match doc.get_dictionary(pages_root)?.get(b"Kids")? {
        Object::Reference(id) => Some(*id),
        _ => None,
    };
    match kids_ref {
        Some(id) => doc.get_object_mut(id)?.as_array_mut()?.extend(kids),
        None => doc
            .get_object_mut(pages_root)?
            .as_dict_mut()?
            .get_mut(b"Kids")?
            .as_array_mut()?
            .extend(kids),
    }

    let root = doc.get_object_mut(pages_root)?.as_dict_mut()?;
    let count = root.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
    root.set("Count", Object::Integer(count + appended as i64));

    Ok(appended)
}

/// Effective MediaBox of a page, looked up through the page tree.
///
/// Falls back to US Letter when nothing usable is found.
pub fn page_media_box(doc: &Document, page_id: ObjectId) -> [f32; 4] {
    let fallback = [0.0, 0.0, DEFAULT_PAGE_DIMENSIONS.0, DEFAULT_PAGE_DIMENSIONS.1];

    let Some(Object::Array(values)) = inherited_attribute(doc, page_id, b"MediaBox") else {
        return fallback;
    };
    let numbers: Vec<f32> = values
        .iter()
        .filter_map(|v| resolve(doc, v).and_then(|v| v.as_float().ok()))
        .collect();
    if numbers.len() != 4 {
        return fallback;
    }

    // Normalise so that [0..2] is the lower-left corner
    [
        numbers[0].min(numbers[2]),
        numbers[1].min(numbers[3]),
        numbers[0].max(numbers[2]),
        numbers[1].max(numbers[3]),
    ]
}

/// Value of an inheritable page attribute, with references resolved
fn inherited_attribute<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_INHERIT_DEPTH {
        if let Ok(value) = node.get(key) {
            return resolve(doc, value);
        }
        let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Resource name not already used in `xobjects`
fn unused_resource_name(xobjects: &Dictionary) -> String {
    let mut name = WATERMARK_RESOURCE.to_string();
    let mut n = 1;
    while xobjects.has(name.as_bytes()) {
        n += 1;
        name = format!("{}{}", WATERMARK_RESOURCE, n);
    }
    name
}

/// Wrap the page's content in `q ... Q` and draw the overlay after it
fn stamp_page(
    doc: &mut Document,
    page_id: ObjectId,
    overlay_id: ObjectId,
    origin_x: f32,
    origin_y: f32,
) -> Result<()> {
    // Resources are written back inline on the page so that shared or
    // inherited dictionaries stay untouched
    let mut resources = match inherited_attribute(doc, page_id, b"Resources") {
        Some(Object::Dictionary(dict)) => dict.clone(),
        _ => Dictionary::new(),
    };
    let mut xobjects = match resources.get(b"XObject").ok().and_then(|v| resolve(&*doc, v)) {
        Some(Object::Dictionary(dict)) => dict.clone(),
        _ => Dictionary::new(),
    };
    let name = unused_resource_name(&xobjects);
    xobjects.set(name.as_bytes(), Object::Reference(overlay_id));
    resources.set("XObject", Object::Dictionary(xobjects));

    let existing: Vec<Object> = {
        let page = doc.get_dictionary(page_id)?;
        match page.get(b"Contents") {
            Ok(Object::Reference(id)) => match doc.get_object(*id) {
                Ok(Object::Array(items)) => items.clone(),
                _ => vec![Object::Reference(*id)],
            },
            Ok(Object::Array(items)) => items.clone(),
            _ => Vec::new(),
        }
    };

    let open_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let overlay_ops = format!(
        "Q\nq 1 0 0 1 {:.2} {:.2} cm /{} Do Q\n",
        origin_x, origin_y, name
    );
    let close_id = doc.add_object(Stream::new(Dictionary::new(), overlay_ops.into_bytes()));

    let mut contents = Vec::with_capacity(existing.len() + 2);
    contents.push(Object::Reference(open_id));
    contents.extend(existing);
    contents.push(Object::Reference(close_id));

    let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
    page.set("Contents", Object::Array(contents));
    page.set("Resources", Object::Dictionary(resources));
    Ok(())
}

/// Deep copy an object from `source` into `output`, following references.
///
/// Uses a cache so that shared objects (fonts, the background image) are
/// copied once.
fn copy_object_deep(
    output: &mut Document,
    source: &Document,
    obj: &Object,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Object> {
    match obj {
        Object::Reference(id) => {
            if let Some(&new_id) = cache.get(id) {
                return Ok(Object::Reference(new_id));
            }

            // Reserve the id first so self-references terminate
            let new_id = output.new_object_id();
            cache.insert(*id, new_id);

            let referenced = source.get_object(*id)?;
            let copied = copy_object_deep(output, source, referenced, cache)?;
            output.objects.insert(new_id, copied);

            Ok(Object::Reference(new_id))
        }
        Object::Dictionary(dict) => {
            let mut new_dict = Dictionary::new();
            for (key, value) in dict.iter() {
                new_dict.set(key.clone(), copy_object_deep(output, source, value, cache)?);
            }
            Ok(Object::Dictionary(new_dict))
        }
        Object::Array(arr) => {
            let new_arr: Result<Vec<_>> = arr
                .iter()
                .map(|item| copy_object_deep(output, source, item, cache))
                .collect();
            Ok(Object::Array(new_arr?))
        }
        Object::Stream(stream) => {
            let mut new_dict = Dictionary::new();
            for (key, value) in stream.dict.iter() {
                new_dict.set(key.clone(), copy_object_deep(output, source, value, cache)?);
            }
            Ok(Object::Stream(Stream {
                dict: new_dict,
                content: stream.content.clone(),
                allows_compression: stream.allows_compression,
                start_position: None,
            }))
        }
        _ => Ok(obj.clone()),
    }
}
