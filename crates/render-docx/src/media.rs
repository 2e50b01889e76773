use crate::package::{REL_IMAGE, Relationships};
use folio_ast::ImageData;
use folio_layout::ImageBox;
use folio_traits::ImageKind;
use md5::{Digest, Md5};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct MediaItem {
    pub part_name: String,
    pub rel_id: String,
    pub kind: ImageKind,
    pub data: ImageData,
}

/// Images stored under `word/media`, one part per distinct content.
#[derive(Debug, Default)]
pub struct MediaRegistry {
    by_hash: HashMap<[u8; 16], usize>,
    items: Vec<MediaItem>,
}

impl MediaRegistry {
    /// Returns the relationship id of the image, adding the part on first use.
    pub fn register(&mut self, image: &ImageBox, rels: &mut Relationships) -> &MediaItem {
        let hash: [u8; 16] = Md5::digest(image.data.as_bytes()).into();
        let index = match self.by_hash.get(&hash) {
            Some(index) => *index,
            None => {
                let file = format!("image{}.{}", self.items.len() + 1, image.kind.extension());
                let rel_id = rels.add(REL_IMAGE, format!("media/{}", file));
                self.items.push(MediaItem {
                    part_name: format!("word/media/{}", file),
                    rel_id,
                    kind: image.kind,
                    data: image.data.clone(),
                });
                self.by_hash.insert(hash, self.items.len() - 1);
                self.items.len() - 1
            }
        };
        &self.items[index]
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }
}
