//! Lossless embedding of uploaded vector PDFs
//!
//! CMYK fidelity requires carrying the source PDF's drawing instructions and
//! color operators into the output byte-for-byte, with no recompression and
//! no color conversion. The output document is assembled with `pdf-writer`;
//! each embedded source page becomes a Form XObject whose object id is
//! reserved during assembly and filled in afterwards by copying the source
//! document's object graph into the finished file with `lopdf`.

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use log::warn;

use crate::error::{EngineError, EngineResult};
use crate::types::Rect;

/// A reserved Form XObject slot waiting for its source document
pub struct PendingEmbed {
    /// Object id reserved in the pdf-writer ref sequence
    pub object_id: i32,
    pub source: Document,
    /// First-page media box of the source, in the source's point space
    pub bbox: Rect,
}

/// Parse an uploaded PDF and extract its first-page bounding box. The
/// returned document is retained for the merge pass.
pub fn parse_source(data: &[u8]) -> EngineResult<(Document, Rect)> {
    let doc = Document::load_mem(data)?;
    let page_id = first_page(&doc)?;
    let bbox = inherited_media_box(&doc, page_id)?;
    Ok((doc, bbox))
}

/// Copy every pending source document into the finished output bytes,
/// materializing each reserved object id as a Form XObject.
///
/// A source that fails to attach is replaced by an empty form with the same
/// bounding box so the document stays structurally valid; only that element
/// renders blank.
pub fn merge_embedded(bytes: Vec<u8>, pending: Vec<PendingEmbed>) -> EngineResult<Vec<u8>> {
    if pending.is_empty() {
        return Ok(bytes);
    }

    let mut target = Document::load_mem(&bytes)?;
    // Reserved ids may sit past the last object pdf-writer actually wrote
    let max_reserved = pending.iter().map(|p| p.object_id as u32).max().unwrap_or(0);
    target.max_id = target.max_id.max(max_reserved);

    for embed in pending {
        let object_id = embed.object_id as u32;
        let bbox = embed.bbox;
        if let Err(err) = attach(&mut target, embed) {
            warn!("failed to attach embedded PDF at object {object_id}: {err}");
            target.objects.insert(
                (object_id, 0),
                Object::Stream(Stream::new(form_dict(bbox, None), Vec::new())),
            );
        }
    }

    let mut out = Vec::new();
    target
        .save_to(&mut out)
        .map_err(|e| EngineError::PdfParse(e.to_string()))?;
    Ok(out)
}

fn attach(target: &mut Document, embed: PendingEmbed) -> EngineResult<()> {
    let PendingEmbed {
        object_id,
        mut source,
        bbox,
    } = embed;

    // Renumber the whole source graph past the target's id space, then read
    // page structure back out of the renumbered document.
    source.renumber_objects_with(target.max_id + 1);
    let page_id = first_page(&source)?;
    let content = page_content(&source, page_id)?;
    let resources = merged_resources(&source, page_id)?;

    target.max_id = target.max_id.max(source.max_id);
    let objects = std::mem::take(&mut source.objects);
    target.objects.extend(objects);

    target.objects.insert(
        (object_id as u32, 0),
        Object::Stream(Stream::new(form_dict(bbox, Some(resources)), content)),
    );
    Ok(())
}

fn form_dict(bbox: Rect, resources: Option<Dictionary>) -> Dictionary {
    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Form",
        "BBox" => vec![
            bbox.x.into(),
            bbox.y.into(),
            (bbox.x + bbox.width).into(),
            (bbox.y + bbox.height).into(),
        ],
    };
    if let Some(resources) = resources {
        dict.set("Resources", Object::Dictionary(resources));
    }
    dict
}

fn first_page(doc: &Document) -> EngineResult<ObjectId> {
    doc.get_pages()
        .into_values()
        .next()
        .ok_or_else(|| EngineError::PdfParse("embedded PDF has no pages".to_string()))
}

/// Concatenated, decompressed content of the page's content streams. A
/// filtered stream that cannot be decoded is an error; copying its raw
/// bytes into the unfiltered form stream would yield garbage operators.
fn page_content(doc: &Document, page_id: ObjectId) -> EngineResult<Vec<u8>> {
    let mut out = Vec::new();
    for content_id in doc.get_page_contents(page_id) {
        let stream = doc.get_object(content_id)?.as_stream()?;
        if stream.dict.has(b"Filter") {
            let data = stream.decompressed_content().map_err(|e| {
                EngineError::PdfParse(format!("undecodable content stream: {e}"))
            })?;
            out.extend_from_slice(&data);
        } else {
            out.extend_from_slice(&stream.content);
        }
        out.push(b'\n');
    }
    Ok(out)
}

/// Fold the page's resource dictionaries (inherited ancestors first, direct
/// dictionary last) into one owned dictionary.
fn merged_resources(doc: &Document, page_id: ObjectId) -> EngineResult<Dictionary> {
    let (direct, inherited_ids) = doc.get_page_resources(page_id);
    let mut merged = Dictionary::new();
    for id in inherited_ids {
        if let Ok(dict) = doc.get_object(id).and_then(|obj| obj.as_dict()) {
            for (key, value) in dict.iter() {
                merged.set(key.clone(), value.clone());
            }
        }
    }
    if let Some(dict) = direct {
        for (key, value) in dict.iter() {
            merged.set(key.clone(), value.clone());
        }
    }
    Ok(merged)
}

/// Media box of a page, following the Parent chain when inherited.
fn inherited_media_box(doc: &Document, page_id: ObjectId) -> EngineResult<Rect> {
    let mut current = page_id;
    loop {
        let dict = doc.get_object(current)?.as_dict()?;
        if let Ok(value) = dict.get(b"MediaBox") {
            let (_, resolved) = doc.dereference(value)?;
            let array = resolved.as_array()?;
            let nums: Vec<f64> = array.iter().filter_map(number).collect();
            if nums.len() == 4 {
                return Ok(Rect::new(
                    nums[0],
                    nums[1],
                    nums[2] - nums[0],
                    nums[3] - nums[1],
                ));
            }
            return Err(EngineError::PdfParse("malformed MediaBox".to_string()));
        }
        match dict.get(b"Parent") {
            Ok(Object::Reference(parent)) => current = *parent,
            _ => return Err(EngineError::PdfParse("embedded PDF has no MediaBox".to_string())),
        }
    }
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(f) => Some(*f as f64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal one-page PDF built with lopdf, standing in for an uploaded
    /// vector logo.
    fn sample_pdf(width: f64, height: f64) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let content = lopdf::content::Content {
            operations: vec![
                lopdf::content::Operation::new("re", vec![0.into(), 0.into(), width.into(), height.into()]),
                lopdf::content::Operation::new("f", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    #[test]
    fn test_parse_source_media_box() {
        let bytes = sample_pdf(200.0, 100.0);
        let (_, bbox) = parse_source(&bytes).unwrap();
        assert_eq!(bbox, Rect::new(0.0, 0.0, 200.0, 100.0));
    }

    #[test]
    fn test_parse_source_rejects_garbage() {
        assert!(parse_source(b"not a pdf at all").is_err());
    }

    #[test]
    fn test_merge_attaches_form_object() {
        // Host document: one empty page
        let host = sample_pdf(595.0, 842.0);
        let (source, bbox) = parse_source(&sample_pdf(50.0, 50.0)).unwrap();

        let host_doc = Document::load_mem(&host).unwrap();
        let reserved = host_doc.max_id as i32 + 7;

        let merged = merge_embedded(
            host,
            vec![PendingEmbed {
                object_id: reserved,
                source,
                bbox,
            }],
        )
        .unwrap();

        let doc = Document::load_mem(&merged).unwrap();
        let form = doc
            .get_object((reserved as u32, 0))
            .and_then(|obj| obj.as_stream())
            .unwrap();
        assert_eq!(
            form.dict.get(b"Subtype").and_then(|o| o.as_name()).unwrap(),
            &b"Form"[..]
        );
        assert!(!form.content.is_empty());
    }

    #[test]
    fn test_merge_survives_bad_source() {
        let host = sample_pdf(595.0, 842.0);
        // A source whose page tree is empty cannot attach
        let mut broken = Document::with_version("1.5");
        let catalog_id = broken.add_object(dictionary! { "Type" => "Catalog" });
        broken.trailer.set("Root", catalog_id);

        let merged = merge_embedded(
            host,
            vec![PendingEmbed {
                object_id: 50,
                source: broken,
                bbox: Rect::new(0.0, 0.0, 10.0, 10.0),
            }],
        )
        .unwrap();

        // The reserved slot is filled with a blank form, keeping refs valid
        let doc = Document::load_mem(&merged).unwrap();
        let form = doc
            .get_object((50, 0))
            .and_then(|obj| obj.as_stream())
            .unwrap();
        assert!(form.content.is_empty());
    }

    #[test]
    fn test_undecodable_content_stream_falls_back_to_blank_form() {
        // Source page whose content stream declares a filter lopdf cannot
        // decode; its raw bytes must not leak into the form stream
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let content_id = doc.add_object(Stream::new(
            dictionary! { "Filter" => Object::Name(b"JPXDecode".to_vec()) },
            vec![0xde, 0xad, 0xbe, 0xef],
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "MediaBox" => vec![0.into(), 0.into(), 80.into(), 80.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();

        let host = sample_pdf(595.0, 842.0);
        let (source, bbox) = parse_source(&bytes).unwrap();
        let merged = merge_embedded(
            host,
            vec![PendingEmbed {
                object_id: 60,
                source,
                bbox,
            }],
        )
        .unwrap();

        let doc = Document::load_mem(&merged).unwrap();
        let form = doc
            .get_object((60, 0))
            .and_then(|obj| obj.as_stream())
            .unwrap();
        assert!(form.content.is_empty());
    }
}
