//! Registry of XObjects shared across pages
//!
//! A logo placed several times (imposition, or once per page) must embed its
//! pixel data or form stream exactly once; every placement then references
//! the same XObject by resource name.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use pdf_writer::{Name, Pdf, Ref};

use crate::error::EngineResult;
use crate::image_utils;
use crate::pdf_embed::PendingEmbed;
use crate::types::Rect;

pub enum XObjectKind {
    Image,
    /// Form XObject reserved for a vector PDF, filled in after assembly
    Form { bbox: Rect },
}

pub struct XObjectEntry {
    pub id: Ref,
    pub name: String,
    pub kind: XObjectKind,
}

/// logo id → XObject, with resource names minted from the ref id
pub struct XObjectRegistry {
    entries: HashMap<String, XObjectEntry>,
}

impl XObjectRegistry {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&XObjectEntry> {
        self.entries.get(key)
    }

    /// Decode raster bytes and write them as an Image XObject. A key already
    /// registered is returned unchanged without re-embedding the data.
    pub fn register_image(
        &mut self,
        pdf: &mut Pdf,
        key: &str,
        data: &[u8],
        next_ref_id: &mut i32,
    ) -> EngineResult<&XObjectEntry> {
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(slot) => {
                let image = image_utils::decode_raster(data)?;
                let id = Ref::new(*next_ref_id);
                *next_ref_id += 1;
                image_utils::write_image_xobject(pdf, &image, id, next_ref_id);
                Ok(slot.insert(XObjectEntry {
                    id,
                    name: format!("I{}", id.get()),
                    kind: XObjectKind::Image,
                }))
            }
        }
    }

    /// Reserve a ref for a Form XObject whose stream is attached after the
    /// document is assembled.
    pub fn register_form(
        &mut self,
        key: &str,
        source: lopdf::Document,
        bbox: Rect,
        next_ref_id: &mut i32,
        pending: &mut Vec<PendingEmbed>,
    ) -> &XObjectEntry {
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(slot) => {
                let id = Ref::new(*next_ref_id);
                *next_ref_id += 1;
                pending.push(PendingEmbed {
                    object_id: id.get(),
                    source,
                    bbox,
                });
                slot.insert(XObjectEntry {
                    id,
                    name: format!("P{}", id.get()),
                    kind: XObjectKind::Form { bbox },
                })
            }
        }
    }

    /// Pair every registered XObject used on a page into its Resources dict.
    pub fn write_resources(&self, resources: &mut pdf_writer::writers::Resources, used: &[String]) {
        let mut dict = resources.x_objects();
        for key in used {
            if let Some(entry) = self.entries.get(key) {
                dict.pair(Name(entry.name.as_bytes()), entry.id);
            }
        }
    }
}
