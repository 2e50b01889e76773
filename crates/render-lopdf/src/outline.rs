use crate::fonts::text_string;
use crate::writer::PdfWriter;
use folio_layout::OutlineEntry;
use folio_render_core::utils::flip_y;
use lopdf::{Object, ObjectId, dictionary};
use std::io::{Seek, Write};

struct OutlineItem {
    id: ObjectId,
    title: String,
    dest: Vec<Object>,
    children: Vec<OutlineItem>,
}

/// Creates the document outline (bookmarks) from the heading entries.
///
/// # Returns
/// The `ObjectId` of the root `Outlines` dictionary if any entries were created, otherwise `None`.
pub fn build_outlines<W: Write + Seek>(
    writer: &mut PdfWriter<W>,
    entries: &[OutlineEntry],
    page_ids: &[ObjectId],
    page_height: f32,
) -> Option<ObjectId> {
    // (level, item) pairs still open for children, outermost first.
    let mut open: Vec<(u8, OutlineItem)> = Vec::new();
    let mut roots: Vec<OutlineItem> = Vec::new();

    for entry in entries {
        let Some(page_id) = page_ids.get(entry.page_index) else {
            continue;
        };
        let dest = vec![
            Object::Reference(*page_id),
            "FitH".into(),
            flip_y(entry.y, page_height).into(),
        ];
        while open.last().is_some_and(|(level, _)| *level >= entry.level) {
            close_last(&mut open, &mut roots);
        }
        let item = OutlineItem {
            id: writer.new_object_id(),
            title: entry.title.clone(),
            dest,
            children: Vec::new(),
        };
        open.push((entry.level, item));
    }
    while !open.is_empty() {
        close_last(&mut open, &mut roots);
    }

    let (first, last) = (roots.first()?.id, roots.last()?.id);
    let outline_root_id = writer.new_object_id();
    writer.buffer_object_at_id(
        outline_root_id,
        dictionary! {
            "Type" => "Outlines", "First" => first, "Last" => last, "Count" => roots.len() as i64,
        }
        .into(),
    );
    buffer_outline_level(&roots, outline_root_id, writer);
    Some(outline_root_id)
}

fn close_last(open: &mut Vec<(u8, OutlineItem)>, roots: &mut Vec<OutlineItem>) {
    if let Some((_, item)) = open.pop() {
        match open.last_mut() {
            Some((_, parent)) => parent.children.push(item),
            None => roots.push(item),
        }
    }
}

fn buffer_outline_level<W: Write + Seek>(
    items: &[OutlineItem],
    parent_id: ObjectId,
    writer: &mut PdfWriter<W>,
) {
    for (i, item) in items.iter().enumerate() {
        let mut dict = dictionary! {
            "Title" => text_string(&item.title),
            "Parent" => parent_id,
            "Dest" => item.dest.clone(),
        };
        if i > 0 {
            dict.set("Prev", items[i - 1].id);
        }
        if let Some(next) = items.get(i + 1) {
            dict.set("Next", next.id);
        }
        if let (Some(first), Some(last)) = (item.children.first(), item.children.last()) {
            dict.set("First", first.id);
            dict.set("Last", last.id);
            dict.set("Count", -(item.children.len() as i64));
            buffer_outline_level(&item.children, item.id, writer);
        }
        writer.buffer_object_at_id(item.id, dict.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn entry(level: u8, title: &str) -> OutlineEntry {
        OutlineEntry {
            level,
            title: title.to_string(),
            page_index: 0,
            y: 100.0,
        }
    }

    #[test]
    fn nests_by_level() {
        let mut writer = PdfWriter::new(Cursor::new(Vec::new()), "1.7").unwrap();
        let page = writer.new_object_id();
        let entries = [entry(1, "A"), entry(2, "A.1"), entry(2, "A.2"), entry(1, "B")];
        let root = build_outlines(&mut writer, &entries, &[page], 800.0);
        assert!(root.is_some());
    }

    #[test]
    fn no_entries_means_no_outline() {
        let mut writer = PdfWriter::new(Cursor::new(Vec::new()), "1.7").unwrap();
        assert!(build_outlines(&mut writer, &[], &[], 800.0).is_none());
    }
}
