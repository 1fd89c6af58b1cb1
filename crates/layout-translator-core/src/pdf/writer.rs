//! PDF output for composed page plans.
//!
//! # Coordinate System
//!
//! Page plans use a **top-left origin** with y growing downward, measured
//! the way MuPDF reports a page: from the top-left corner of the visible
//! box (MediaBox intersected with CropBox) as displayed after /Rotate.
//! PDF content streams use a **bottom-left origin** in unrotated user
//! space. The overlay therefore starts with a `cm` taking upright page
//! space into user space (see [`PageFrame`]) and then draws at:
//! ```text
//! x' = x
//! y' = frame.height - y
//! ```
//!
//! # Output strategies
//!
//! - Plans without a background: a fresh document, one page per plan.
//! - Plans with a background: the source document is reused. Each kept
//!   page's existing content is wrapped in `q ... Q` so its graphics state
//!   cannot leak, the overlay stream is appended, and source pages no plan
//!   refers to are deleted.
//!
//! Text is set in the base-14 Helvetica face with WinAnsi encoding, so no
//! font program is embedded.

use std::collections::BTreeSet;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tracing::{debug, warn};
use unicode_normalization::UnicodeNormalization;

use crate::compose::{DrawOp, PagePlan};
use crate::config::TextColor;
use crate::error::{Error, Result};
use super::page_index::PageIndex;

/// Resource name of the overlay font on every page we touch.
const FONT_RESOURCE: &str = "FHelv";

/// Depth limit when walking the page tree for inherited attributes.
const MAX_TREE_DEPTH: usize = 10;

/// Writes page plans to PDF bytes.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter {
    /// Fill color for translated text
    pub text_color: TextColor,
}

impl PdfWriter {
    pub const fn new(text_color: TextColor) -> Self {
        Self { text_color }
    }

    /// Produce a PDF from `plans`. Plans that reference a background page
    /// need the `original` document bytes.
    pub fn write(&self, plans: &[PagePlan], original: Option<&[u8]>) -> Result<Vec<u8>> {
        if plans.is_empty() {
            return Err(Error::LayoutEmpty);
        }

        let with_background = plans.iter().filter(|p| p.background.is_some()).count();
        match (with_background, original) {
            (0, _) => self.write_fresh(plans),
            (n, Some(bytes)) if n == plans.len() => self.write_over_original(plans, bytes),
            (n, Some(_)) => Err(Error::PdfExport(format!(
                "{n} of {} pages have a background; cannot mix page kinds",
                plans.len()
            ))),
            (_, None) => Err(Error::PdfExport(
                "background rendering needs the original PDF".to_string(),
            )),
        }
    }

    /// One new page per plan.
    fn write_fresh(&self, plans: &[PagePlan]) -> Result<Vec<u8>> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = add_helvetica(&mut doc);

        let mut kids = Vec::with_capacity(plans.len());
        for plan in plans {
            let media_box = [0.0, 0.0, plan.width, plan.height];
            let content = self.overlay_content(plan, &PageFrame::new(media_box, 0))?;
            let content_id = doc.add_object(Stream::new(Dictionary::new(), content));

            let resources = Dictionary::from_iter([(
                "Font",
                Object::Dictionary(Dictionary::from_iter([(FONT_RESOURCE, Object::Reference(font_id))])),
            )]);

            let page_id = doc.add_object(Dictionary::from_iter([
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(pages_id)),
                ("MediaBox", Object::Array(media_box.iter().map(|&v| Object::Real(v)).collect())),
                ("Resources", Object::Dictionary(resources)),
                ("Contents", Object::Reference(content_id)),
            ]));
            kids.push(Object::Reference(page_id));
        }

        let count = i64::try_from(kids.len()).unwrap_or(i64::MAX);
        let pages = Dictionary::from_iter([
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(kids)),
            ("Count", Object::Integer(count)),
        ]);
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        doc.trailer.set("Root", Object::Reference(catalog_id));

        save(&mut doc)
    }

    /// Draw each plan over its source page; drop source pages no plan uses.
    fn write_over_original(&self, plans: &[PagePlan], original: &[u8]) -> Result<Vec<u8>> {
        let mut doc = Document::load_mem(original)
            .map_err(|e| Error::Lopdf(format!("Failed to load PDF: {e}")))?;

        let pages = doc.get_pages();
        let font_id = add_helvetica(&mut doc);
        let mut kept = BTreeSet::new();

        for plan in plans {
            let Some(index) = plan.background else { continue };
            let Some((page_number, page_id)) = PageIndex::try_from_page_num(index, pages.len())
                .ok()
                .map(PageIndex::as_lopdf_page_number)
                .and_then(|n| pages.get(&n).map(|&id| (n, id)))
            else {
                warn!("Layout page {} has no source page ({} pages), dropped", index, pages.len());
                continue;
            };
            if !kept.insert(page_number) {
                warn!("Source page {} referenced twice, later plan ignored", index);
                continue;
            }

            let frame = PageFrame::for_page(&doc, page_id);
            let overlay = self.overlay_content(plan, &frame)?;
            add_font_to_page(&mut doc, page_id, font_id)?;
            wrap_and_append(&mut doc, page_id, overlay)?;
        }

        if kept.is_empty() {
            return Err(Error::PdfExport("no layout page matches a source page".to_string()));
        }

        let unused: Vec<u32> = pages.keys().copied().filter(|n| !kept.contains(n)).collect();
        if !unused.is_empty() {
            debug!("Removing {} unused source pages", unused.len());
            doc.delete_pages(&unused);
            doc.prune_objects();
        }

        save(&mut doc)
    }

    /// Content stream drawing one plan onto a page described by `frame`.
    fn overlay_content(&self, plan: &PagePlan, frame: &PageFrame) -> Result<Vec<u8>> {
        let TextColor { r, g, b } = self.text_color;

        let mut operations = vec![
            Operation::new("q", vec![]),
            // Fill mode; scanned documents often leave invisible OCR text (mode 3) set
            Operation::new("Tr", vec![0.into()]),
        ];
        if !frame.is_identity() {
            operations.push(Operation::new(
                "cm",
                frame.matrix.iter().map(|&v| Object::Real(v)).collect(),
            ));
        }

        // Plan order: each mask directly precedes its block's lines
        for op in &plan.ops {
            match op {
                DrawOp::Mask(bbox) => {
                    operations.push(Operation::new("rg", vec![1.0_f32.into(), 1.0_f32.into(), 1.0_f32.into()]));
                    operations.push(Operation::new(
                        "re",
                        vec![
                            bbox.x0.into(),
                            frame.flip(bbox.y1).into(),
                            bbox.width().into(),
                            bbox.height().into(),
                        ],
                    ));
                    operations.push(Operation::new("f", vec![]));
                }
                DrawOp::Text { x, baseline, font_size, text } => {
                    operations.push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));
                    operations.push(Operation::new("BT", vec![]));
                    operations.push(Operation::new("Tf", vec![FONT_RESOURCE.into(), (*font_size).into()]));
                    operations.push(Operation::new("Td", vec![(*x).into(), frame.flip(*baseline).into()]));
                    operations.push(Operation::new(
                        "Tj",
                        vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
                    ));
                    operations.push(Operation::new("ET", vec![]));
                }
            }
        }

        operations.push(Operation::new("Q", vec![]));

        Content { operations }
            .encode()
            .map_err(|e| Error::PdfExport(format!("Failed to encode content stream: {e}")))
    }
}

fn save(doc: &mut Document) -> Result<Vec<u8>> {
    doc.compress();
    let mut output = Vec::new();
    doc.save_to(&mut output)
        .map_err(|e| Error::PdfSave(format!("Failed to save PDF: {e}")))?;
    Ok(output)
}

fn add_helvetica(doc: &mut Document) -> ObjectId {
    doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
        ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
    ]))
}

/// Make the page's contents `[q, <existing...>, Q, overlay]`.
fn wrap_and_append(doc: &mut Document, page_id: ObjectId, overlay: Vec<u8>) -> Result<()> {
    let save_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let restore_id = doc.add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));
    let overlay_id = doc.add_object(Stream::new(Dictionary::new(), overlay));

    let page = doc
        .get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| Error::Lopdf(format!("Failed to get page: {e}")))?;

    let mut contents = vec![Object::Reference(save_id)];
    match page.get(b"Contents").ok().cloned() {
        Some(Object::Array(existing)) => contents.extend(existing),
        Some(existing @ Object::Reference(_)) => contents.push(existing),
        _ => {}
    }
    contents.push(Object::Reference(restore_id));
    contents.push(Object::Reference(overlay_id));

    page.set("Contents", Object::Array(contents));
    Ok(())
}

/// Register the overlay font in the page's (possibly inherited or
/// indirect) Resources, writing the result back inline on the page.
fn add_font_to_page(doc: &mut Document, page_id: ObjectId, font_id: ObjectId) -> Result<()> {
    let mut resources = resolve_resources(doc, page_id)?;

    let mut fonts = resources
        .get(b"Font")
        .ok()
        .and_then(|obj| resolve_dict_object(doc, obj))
        .unwrap_or_default();

    fonts.set(FONT_RESOURCE, Object::Reference(font_id));
    resources.set("Font", Object::Dictionary(fonts));

    let page = doc
        .get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| Error::Lopdf(format!("Failed to get page: {e}")))?;
    page.set("Resources", Object::Dictionary(resources));

    Ok(())
}

fn resolve_resources(doc: &Document, page_id: ObjectId) -> Result<Dictionary> {
    let page = doc
        .get_dictionary(page_id)
        .map_err(|e| Error::Lopdf(format!("Failed to get page: {e}")))?;

    Ok(find_inherited(doc, page, b"Resources", MAX_TREE_DEPTH)
        .and_then(|obj| resolve_dict_object(doc, obj))
        .unwrap_or_default())
}

fn resolve_dict_object(doc: &Document, obj: &Object) -> Option<Dictionary> {
    match obj {
        Object::Dictionary(d) => Some(d.clone()),
        Object::Reference(id) => doc.get_dictionary(*id).ok().cloned(),
        _ => None,
    }
}

/// Look up `key` on a page node, then on its ancestors.
fn find_inherited<'a>(doc: &'a Document, node: &'a Dictionary, key: &[u8], depth: usize) -> Option<&'a Object> {
    if let Ok(value) = node.get(key) {
        return Some(value);
    }
    if depth == 0 {
        return None;
    }

    let parent_id = node.get(b"Parent").and_then(Object::as_reference).ok()?;
    let parent = doc.get_dictionary(parent_id).ok()?;
    find_inherited(doc, parent, key, depth - 1)
}

/// Maps upright page space (bottom-left origin of the page as displayed)
/// into PDF user space.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PageFrame {
    /// `cm` operands
    matrix: [f32; 6],
    /// Displayed page height
    height: f32,
}

impl PageFrame {
    const IDENTITY: [f32; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

    /// Frame for a page whose visible box is `visible` and whose /Rotate,
    /// already snapped to a quarter turn, is `rotate`.
    fn new(visible: [f32; 4], rotate: u16) -> Self {
        let [x0, y0, x1, y1] = visible;
        let (matrix, height) = match rotate {
            90 => ([0.0, 1.0, -1.0, 0.0, x1, y0], x1 - x0),
            180 => ([-1.0, 0.0, 0.0, -1.0, x1, y1], y1 - y0),
            270 => ([0.0, -1.0, 1.0, 0.0, x0, y1], x1 - x0),
            _ => ([1.0, 0.0, 0.0, 1.0, x0, y0], y1 - y0),
        };
        Self { matrix, height }
    }

    fn for_page(doc: &Document, page_id: ObjectId) -> Self {
        match doc.get_dictionary(page_id) {
            Ok(page) => Self::new(visible_box(doc, page), page_rotation(doc, page)),
            Err(_) => Self::new(US_LETTER, 0),
        }
    }

    #[allow(clippy::float_cmp)]
    fn is_identity(&self) -> bool {
        self.matrix == Self::IDENTITY
    }

    /// Top-left y to upright bottom-left y.
    fn flip(&self, y: f32) -> f32 {
        self.height - y
    }
}

const US_LETTER: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// MediaBox (US Letter when absent) clipped to the CropBox, if any.
fn visible_box(doc: &Document, page: &Dictionary) -> [f32; 4] {
    let media_box = inherited_rect(doc, page, b"MediaBox").unwrap_or(US_LETTER);
    let Some(crop_box) = inherited_rect(doc, page, b"CropBox") else {
        return media_box;
    };

    let clipped = [
        media_box[0].max(crop_box[0]),
        media_box[1].max(crop_box[1]),
        media_box[2].min(crop_box[2]),
        media_box[3].min(crop_box[3]),
    ];
    if clipped[2] - clipped[0] < 1.0 || clipped[3] - clipped[1] < 1.0 {
        return media_box;
    }
    clipped
}

/// /Rotate (own or inherited) snapped to 0, 90, 180 or 270.
fn page_rotation(doc: &Document, page: &Dictionary) -> u16 {
    let degrees = find_inherited(doc, page, b"Rotate", MAX_TREE_DEPTH)
        .and_then(|obj| resolve_object(doc, obj))
        .and_then(|obj| obj.as_i64().ok())
        .unwrap_or(0);

    let quarter_turns = (degrees.rem_euclid(360) + 45) / 90 % 4;
    u16::try_from(quarter_turns * 90).unwrap_or(0)
}

/// A rectangle attribute (own or inherited), normalized to x0 <= x1, y0 <= y1.
fn inherited_rect(doc: &Document, page: &Dictionary, key: &[u8]) -> Option<[f32; 4]> {
    let values: Vec<f32> = find_inherited(doc, page, key, MAX_TREE_DEPTH)
        .and_then(|obj| resolve_object(doc, obj))
        .and_then(|obj| obj.as_array().ok())?
        .iter()
        .filter_map(|o| match resolve_object(doc, o)? {
            #[allow(clippy::cast_precision_loss)]
            Object::Integer(i) => Some(*i as f32),
            Object::Real(r) => Some(*r),
            _ => None,
        })
        .collect();

    match values.as_slice() {
        &[x0, y0, x1, y1] => Some([x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)]),
        _ => None,
    }
}

fn resolve_object<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Encode text for a WinAnsiEncoding simple font.
///
/// Latin-1 maps directly, typographic punctuation goes to its 0x80-0x9F
/// slot, other letters fall back to their unaccented base letter, and
/// anything else becomes `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi_byte).collect()
}

fn win_ansi_byte(c: char) -> u8 {
    let code = u32::from(c);
    if (0x20..=0x7e).contains(&code) || (0xa0..=0xff).contains(&code) {
        return u8::try_from(code).unwrap_or(b'?');
    }

    match c {
        '\u{20ac}' => 0x80,
        '\u{201a}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201e}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02c6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8a,
        '\u{2039}' => 0x8b,
        '\u{0152}' => 0x8c,
        '\u{017d}' => 0x8e,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201c}' => 0x93,
        '\u{201d}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02dc}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9a,
        '\u{203a}' => 0x9b,
        '\u{0153}' => 0x9c,
        '\u{017e}' => 0x9e,
        '\u{0178}' => 0x9f,
        '\t' => b' ',
        _ => c
            .nfd()
            .next()
            .filter(char::is_ascii_graphic)
            .and_then(|base| u8::try_from(u32::from(base)).ok())
            .unwrap_or(b'?'),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::layout::BoundingBox;

    fn text_op(x: f32, baseline: f32, text: &str) -> DrawOp {
        DrawOp::Text {
            x,
            baseline,
            font_size: 9.0,
            text: text.to_string(),
        }
    }

    fn plan(background: Option<usize>, ops: Vec<DrawOp>) -> PagePlan {
        PagePlan {
            width: 300.0,
            height: 400.0,
            background,
            ops,
        }
    }

    /// Source PDF with `n` pages, each showing "Original N".
    fn source_pdf(n: usize) -> Vec<u8> {
        let plans: Vec<_> = (0..n)
            .map(|i| plan(None, vec![text_op(50.0, 100.0, &format!("Original {i}"))]))
            .collect();
        PdfWriter::default().write(&plans, None).unwrap()
    }

    fn page_text(bytes: &[u8], page_number: u32) -> Vec<u8> {
        let doc = Document::load_mem(bytes).unwrap();
        let page_id = doc.get_pages()[&page_number];
        doc.get_page_content(page_id).unwrap()
    }

    #[test]
    fn test_fresh_document_has_one_page_per_plan() {
        let bytes = source_pdf(3);
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
        let page = doc.get_dictionary(doc.get_pages()[&1]).unwrap();
        assert_eq!(visible_box(&doc, page), [0.0, 0.0, 300.0, 400.0]);
    }

    #[test]
    fn test_text_is_flipped_into_pdf_space() {
        let writer = PdfWriter::default();
        let content = writer
            .overlay_content(&plan(None, vec![text_op(10.0, 30.0, "Hi")]), &upright())
            .unwrap();
        let ops = Content::decode(&content).unwrap().operations;

        let td = ops.iter().find(|op| op.operator == "Td").unwrap();
        assert_eq!(td.operands[0].as_float().unwrap(), 10.0);
        assert_eq!(td.operands[1].as_float().unwrap(), 370.0);
    }

    #[test]
    fn test_mask_rectangle_covers_bbox() {
        let writer = PdfWriter::default();
        let content = writer
            .overlay_content(
                &plan(Some(0), vec![DrawOp::Mask(BoundingBox::new(10.0, 20.0, 110.0, 60.0))]),
                &upright(),
            )
            .unwrap();
        let ops = Content::decode(&content).unwrap().operations;

        let re = ops.iter().find(|op| op.operator == "re").unwrap();
        let values: Vec<f32> = re.operands.iter().map(|o| o.as_float().unwrap()).collect();
        assert_eq!(values, vec![10.0, 340.0, 100.0, 40.0]);
        assert!(ops.iter().any(|op| op.operator == "f"));
        assert!(!ops.iter().any(|op| op.operator == "cm"));
    }

    fn upright() -> PageFrame {
        PageFrame::new([0.0, 0.0, 300.0, 400.0], 0)
    }

    /// Plan coordinates (top-left) to PDF user space through `frame`.
    fn to_user(frame: &PageFrame, x: f32, y: f32) -> (f32, f32) {
        let [a, b, c, d, e, f] = frame.matrix;
        let y = frame.flip(y);
        (a * x + c * y + e, b * x + d * y + f)
    }

    fn page_with(entries: Vec<(&str, Object)>) -> (Document, ObjectId) {
        let mut doc = Document::with_version("1.5");
        let mut page = Dictionary::from_iter([
            ("Type", Object::Name(b"Page".to_vec())),
            ("MediaBox", Object::Array(vec![0.into(), 0.into(), 612.into(), 792.into()])),
        ]);
        for (key, value) in entries {
            page.set(key, value);
        }
        let id = doc.add_object(page);
        (doc, id)
    }

    #[test]
    fn test_crop_box_shifts_origin() {
        let crop = Object::Array(vec![50.into(), 50.into(), 562.into(), 742.into()]);
        let (doc, id) = page_with(vec![("CropBox", crop)]);
        let frame = PageFrame::for_page(&doc, id);

        assert!((frame.height - 692.0).abs() < f32::EPSILON);
        // MuPDF reports PDF (100, 600) at (50, 142) on this page
        assert_eq!(to_user(&frame, 50.0, 142.0), (100.0, 600.0));
    }

    #[test]
    fn test_rotated_pages_map_back_to_user_space() {
        // Where MuPDF reports PDF (100, 600) on a US Letter page per rotation
        let cases = [(90, (600.0, 100.0)), (180, (512.0, 600.0)), (270, (192.0, 512.0))];
        for (rotate, (x, y)) in cases {
            let (doc, id) = page_with(vec![("Rotate", Object::Integer(rotate))]);
            let frame = PageFrame::for_page(&doc, id);
            assert_eq!(to_user(&frame, x, y), (100.0, 600.0), "rotate {rotate}");
        }
    }

    #[test]
    fn test_rotation_is_snapped_and_inherited() {
        let (mut doc, id) = page_with(vec![]);
        let parent = doc.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Rotate", Object::Integer(-90)),
        ]));
        doc.get_object_mut(id)
            .and_then(Object::as_dict_mut)
            .unwrap()
            .set("Parent", Object::Reference(parent));

        let page = doc.get_dictionary(id).unwrap();
        assert_eq!(page_rotation(&doc, page), 270);

        let (doc, id) = page_with(vec![("Rotate", Object::Integer(440))]);
        assert_eq!(page_rotation(&doc, doc.get_dictionary(id).unwrap()), 90);
    }

    #[test]
    fn test_rotated_overlay_starts_with_cm() {
        let frame = PageFrame::new([0.0, 0.0, 612.0, 792.0], 90);
        let content = PdfWriter::default()
            .overlay_content(&plan(Some(0), vec![text_op(10.0, 30.0, "Hi")]), &frame)
            .unwrap();
        let ops = Content::decode(&content).unwrap().operations;

        let cm = ops.iter().find(|op| op.operator == "cm").unwrap();
        let values: Vec<f32> = cm.operands.iter().map(|o| o.as_float().unwrap()).collect();
        assert_eq!(values, vec![0.0, 1.0, -1.0, 0.0, 612.0, 0.0]);
        let td = ops.iter().find(|op| op.operator == "Td").unwrap();
        assert_eq!(td.operands[1].as_float().unwrap(), 612.0 - 30.0);
    }

    #[test]
    fn test_background_keeps_only_planned_pages() {
        let original = source_pdf(3);
        let plans = vec![
            plan(Some(0), vec![text_op(20.0, 40.0, "Translated 0")]),
            plan(Some(1), vec![text_op(20.0, 40.0, "Translated 1")]),
        ];

        let bytes = PdfWriter::default().write(&plans, Some(&original)).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);

        let content = String::from_utf8_lossy(&page_text(&bytes, 2)).to_string();
        assert!(content.contains("Original 1"));
        assert!(content.contains("Translated 1"));
    }

    #[test]
    fn test_background_without_original_fails() {
        let err = PdfWriter::default().write(&[plan(Some(0), vec![])], None).unwrap_err();
        assert!(matches!(err, Error::PdfExport(_)));
    }

    #[test]
    fn test_layout_longer_than_source_is_clamped() {
        let original = source_pdf(1);
        let plans = vec![plan(Some(0), vec![]), plan(Some(1), vec![])];
        let bytes = PdfWriter::default().write(&plans, Some(&original)).unwrap();
        assert_eq!(Document::load_mem(&bytes).unwrap().get_pages().len(), 1);
    }

    #[test]
    fn test_empty_plan_list_is_an_error() {
        assert!(matches!(PdfWriter::default().write(&[], None), Err(Error::LayoutEmpty)));
    }

    #[test]
    fn test_win_ansi_encoding() {
        assert_eq!(encode_win_ansi("Año €1"), vec![b'A', 0xf1, b'o', b' ', 0x80, b'1']);
        assert_eq!(encode_win_ansi("“ok”"), vec![0x93, b'o', b'k', 0x94]);
        // No decomposition for Ł; ź decomposes to z
        assert_eq!(encode_win_ansi("Łódź"), vec![b'?', 0xf3, b'd', b'z']);
        assert_eq!(encode_win_ansi("中"), vec![b'?']);
    }
}
