//! PDF Document wrapper

use crate::font::{encode_winansi, FontData, StandardFont};
use crate::image::{calculate_scaled_dimensions, generate_image_operators, ImageScaleMode, ImageXObject};
use crate::text::{generate_text_operators, TextRenderContext};
use crate::{deflate, Align, PdfError, Result};
use chrono::{DateTime, FixedOffset};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::{Hash, Hasher};

/// A4 portrait size in points
pub const A4: (f64, f64) = (595.28, 841.89);

/// Page attributes a page may inherit from its ancestors
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against cyclic or absurdly deep page trees
const MAX_TREE_DEPTH: usize = 32;

/// RGB Color (values 0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Create a new RGB color (values 0.0 - 1.0)
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create color from RGB values (0-255)
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: f32::from(r) / 255.0,
            g: f32::from(g) / 255.0,
            b: f32::from(b) / 255.0,
        }
    }

    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }

    pub fn white() -> Self {
        Self::rgb(1.0, 1.0, 1.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// Entries for the document information dictionary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<DateTime<FixedOffset>>,
}

/// An image embedded once and drawable on any page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHandle {
    id: ObjectId,
    index: u32,
    width: u32,
    height: u32,
}

impl ImageHandle {
    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    fn resource_name(&self) -> String {
        format!("CmIm{}", self.index)
    }
}

#[derive(Debug, Clone)]
enum LoadedFont {
    Standard(StandardFont),
    Embedded(FontData),
}

#[derive(Debug, Clone)]
struct RegisteredFont {
    font: LoadedFont,
    /// Resource name used in content streams (e.g. "CmF1")
    resource: String,
}

/// PDF Document wrapper providing high-level operations
pub struct PdfDocument {
    /// The underlying lopdf document
    inner: Document,
    /// Root of the page tree; new pages are appended here
    pages_id: ObjectId,
    /// Page object IDs in document order
    page_ids: Vec<ObjectId>,
    /// Registered fonts by name
    fonts: BTreeMap<String, RegisteredFont>,
    current_font: Option<String>,
    current_font_size: f32,
    current_text_color: Color,
    /// Fonts drawn on each page (page number -> font names)
    page_fonts: BTreeMap<usize, BTreeSet<String>>,
    /// Embedded images (data hash -> handle)
    embedded_images: HashMap<u64, ImageHandle>,
    next_image_resource: u32,
    /// Buffered content operators per page, written at save time
    page_content_buffer: BTreeMap<usize, Vec<u8>>,
    /// Shared `q` stream that isolates existing page content
    save_state_stream: Option<ObjectId>,
    info: Option<DocumentInfo>,
}

impl PdfDocument {
    /// Create an empty document with no pages
    pub fn new() -> Self {
        let mut inner = Document::with_version("1.7");
        let pages_id = inner.new_object_id();
        inner.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => Vec::<Object>::new(),
                "Count" => 0,
            }),
        );
        let catalog_id = inner.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        inner.trailer.set("Root", catalog_id);

        Self::with_page_tree(inner, pages_id, Vec::new())
    }

    /// Open a PDF document from bytes
    pub fn open_from_bytes(data: &[u8]) -> Result<Self> {
        let inner = Document::load_mem(data).map_err(|e| PdfError::OpenError(e.to_string()))?;
        Self::from_document(inner)
    }

    fn from_document(inner: Document) -> Result<Self> {
        if inner.is_encrypted() {
            return Err(PdfError::OpenError(
                "encrypted documents are not supported".to_string(),
            ));
        }

        let pages_id = inner
            .catalog()
            .and_then(|catalog| catalog.get(b"Pages"))
            .and_then(Object::as_reference)
            .map_err(|_| PdfError::OpenError("Catalog has no page tree".to_string()))?;
        let page_ids = inner.get_pages().into_values().collect();

        Ok(Self::with_page_tree(inner, pages_id, page_ids))
    }

    fn with_page_tree(inner: Document, pages_id: ObjectId, page_ids: Vec<ObjectId>) -> Self {
        Self {
            inner,
            pages_id,
            page_ids,
            fonts: BTreeMap::new(),
            current_font: None,
            current_font_size: 12.0,
            current_text_color: Color::default(),
            page_fonts: BTreeMap::new(),
            embedded_images: HashMap::new(),
            next_image_resource: 0,
            page_content_buffer: BTreeMap::new(),
            save_state_stream: None,
            info: None,
        }
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn page_id(&self, page: usize) -> Result<ObjectId> {
        page.checked_sub(1)
            .and_then(|index| self.page_ids.get(index))
            .copied()
            .ok_or(PdfError::InvalidPage(page, self.page_ids.len()))
    }

    /// Width and height of the visible page area in points
    ///
    /// This is the CropBox when the page has one, otherwise the MediaBox.
    pub fn page_size(&self, page: usize) -> Result<(f64, f64)> {
        let [x1, y1, x2, y2] = self.visible_box(self.page_id(page)?)?;
        Ok((x2 - x1, y2 - y1))
    }

    /// Page rotation in degrees, normalized to 0, 90, 180 or 270
    pub fn page_rotation(&self, page: usize) -> Result<i64> {
        let rotate = self.inherited(self.page_id(page)?, b"Rotate")?;
        let degrees = match rotate {
            Some(Object::Integer(value)) => value,
            Some(Object::Reference(id)) => self.inner.get_object(id)?.as_i64().unwrap_or(0),
            _ => 0,
        };
        Ok(degrees.rem_euclid(360) / 90 * 90)
    }

    /// Keep only the first `keep` pages
    pub fn truncate_pages(&mut self, keep: usize) -> Result<()> {
        let count = self.page_count();
        if keep >= count {
            return Ok(());
        }
        if keep == 0 {
            return Err(PdfError::InvalidPage(0, count));
        }

        let doomed: Vec<u32> = ((keep + 1)..=count).map(|p| p as u32).collect();
        self.inner.delete_pages(&doomed);
        self.inner.prune_objects();
        self.page_ids.truncate(keep);
        self.page_content_buffer.retain(|&page, _| page <= keep);
        self.page_fonts.retain(|&page, _| page <= keep);

        log::debug!("Dropped {} page(s), {} left", count - keep, keep);
        Ok(())
    }

    /// Add a blank page at the end of the document
    ///
    /// # Returns
    /// New page number (1-indexed)
    pub fn add_blank_page(&mut self, width: f64, height: f64) -> Result<usize> {
        if !(width > 0.0 && height > 0.0) {
            return Err(PdfError::ParseError(format!(
                "Invalid page size: {width} x {height}"
            )));
        }

        let page_id = self.inner.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), Object::Real(width as f32), Object::Real(height as f32)],
            "Resources" => Dictionary::new(),
        });
        self.append_to_page_tree(page_id)?;

        Ok(self.page_count())
    }

    /// Duplicate a page at the end of the document
    ///
    /// The copy shares the source's content streams and gets its own
    /// resolved copy of every inherited attribute. Content buffered for the
    /// source page so far is copied as well.
    ///
    /// # Returns
    /// New page number (1-indexed)
    pub fn duplicate_page(&mut self, page: usize) -> Result<usize> {
        let source_id = self.page_id(page)?;
        let mut page_dict = self.inner.get_dictionary(source_id)?.clone();

        for key in INHERITABLE {
            if !page_dict.has(key) {
                if let Some(value) = self.inherited(source_id, key)? {
                    page_dict.set(key, value);
                }
            }
        }
        page_dict.set("Parent", self.pages_id);

        let new_id = self.inner.add_object(page_dict);
        self.append_to_page_tree(new_id)?;
        let new_page = self.page_count();

        if let Some(content) = self.page_content_buffer.get(&page).cloned() {
            self.page_content_buffer.insert(new_page, content);
        }
        if let Some(fonts) = self.page_fonts.get(&page).cloned() {
            self.page_fonts.insert(new_page, fonts);
        }

        Ok(new_page)
    }

    /// Append a page object to the root `Kids` array
    fn append_to_page_tree(&mut self, page_id: ObjectId) -> Result<()> {
        let pages = self.inner.get_object_mut(self.pages_id)?.as_dict_mut()?;
        let count = pages.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
        match pages.get_mut(b"Kids") {
            Ok(Object::Array(kids)) => kids.push(Object::Reference(page_id)),
            _ => pages.set("Kids", vec![Object::Reference(page_id)]),
        }
        pages.set("Count", count + 1);

        self.page_ids.push(page_id);
        Ok(())
    }

    /// Look up a page attribute, following the `Parent` chain
    fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Result<Option<Object>> {
        let mut current = page_id;
        for _ in 0..MAX_TREE_DEPTH {
            let dict = self.inner.get_dictionary(current)?;
            if let Ok(value) = dict.get(key) {
                return Ok(Some(value.clone()));
            }
            match dict.get(b"Parent") {
                Ok(Object::Reference(parent)) => current = *parent,
                _ => return Ok(None),
            }
        }
        Ok(None)
    }

    /// MediaBox as `[x1, y1, x2, y2]`, A4 when missing
    fn media_box(&self, page_id: ObjectId) -> Result<[f64; 4]> {
        Ok(self
            .page_box(page_id, b"MediaBox")?
            .unwrap_or([0.0, 0.0, A4.0, A4.1]))
    }

    /// CropBox clipped to the MediaBox, or the MediaBox itself
    ///
    /// A CropBox that does not overlap the MediaBox is ignored.
    fn visible_box(&self, page_id: ObjectId) -> Result<[f64; 4]> {
        let media = self.media_box(page_id)?;
        let Some(crop) = self.page_box(page_id, b"CropBox")? else {
            return Ok(media);
        };

        let clipped = [
            crop[0].max(media[0]),
            crop[1].max(media[1]),
            crop[2].min(media[2]),
            crop[3].min(media[3]),
        ];
        if clipped[0] < clipped[2] && clipped[1] < clipped[3] {
            Ok(clipped)
        } else {
            log::debug!("Ignoring a CropBox outside the MediaBox");
            Ok(media)
        }
    }

    /// A page rectangle attribute as normalized `[x1, y1, x2, y2]`
    fn page_box(&self, page_id: ObjectId, key: &[u8]) -> Result<Option<[f64; 4]>> {
        let name = String::from_utf8_lossy(key);
        let Some(value) = self.inherited(page_id, key)? else {
            return Ok(None);
        };
        let array = match value {
            Object::Array(array) => array,
            Object::Reference(id) => self.inner.get_object(id)?.as_array()?.clone(),
            _ => return Err(PdfError::ParseError(format!("{name} is not an array"))),
        };

        let numbers: Vec<f64> = array.iter().filter_map(number).collect();
        let [x1, y1, x2, y2] = numbers[..] else {
            return Err(PdfError::ParseError(format!("Invalid {name} format")));
        };
        Ok(Some([x1.min(x2), y1.min(y2), x1.max(x2), y1.max(y2)]))
    }

    /// Page resources with references resolved, as an owned copy
    fn page_resources(&self, page_id: ObjectId) -> Result<Dictionary> {
        Ok(match self.inherited(page_id, b"Resources")? {
            Some(Object::Dictionary(dict)) => dict,
            Some(Object::Reference(id)) => self.inner.get_dictionary(id)?.clone(),
            _ => Dictionary::new(),
        })
    }

    /// Add one named entry to a resource category (`Font`, `XObject`) of a page
    fn add_page_resource(
        &mut self,
        page: usize,
        category: &[u8],
        name: &str,
        value: Object,
    ) -> Result<()> {
        let page_id = self.page_id(page)?;
        let mut resources = self.page_resources(page_id)?;

        let mut entries = match resources.get(category) {
            Ok(Object::Dictionary(dict)) => dict.clone(),
            Ok(Object::Reference(id)) => self.inner.get_dictionary(*id)?.clone(),
            _ => Dictionary::new(),
        };
        entries.set(name, value);
        resources.set(category, entries);

        self.inner
            .get_object_mut(page_id)?
            .as_dict_mut()?
            .set("Resources", resources);
        Ok(())
    }

    /// Register a TrueType font under `name`
    pub fn add_font(&mut self, name: &str, ttf_data: &[u8]) -> Result<()> {
        let font = FontData::from_ttf(name, ttf_data)?;
        self.register_font(name, LoadedFont::Embedded(font))
    }

    /// Register one of the standard PDF fonts under `name`
    pub fn add_standard_font(&mut self, name: &str, font: StandardFont) -> Result<()> {
        self.register_font(name, LoadedFont::Standard(font))
    }

    fn register_font(&mut self, name: &str, font: LoadedFont) -> Result<()> {
        if self.fonts.contains_key(name) {
            return Err(PdfError::FontAlreadyExists(name.to_string()));
        }
        let resource = format!("CmF{}", self.fonts.len() + 1);
        self.fonts
            .insert(name.to_string(), RegisteredFont { font, resource });
        Ok(())
    }

    /// Set the current font and size
    pub fn set_font(&mut self, name: &str, size: f32) -> Result<()> {
        if !self.fonts.contains_key(name) {
            return Err(PdfError::FontNotFound(name.to_string()));
        }
        self.current_font = Some(name.to_string());
        self.current_font_size = size;
        Ok(())
    }

    /// Set the text color
    pub fn set_text_color(&mut self, color: Color) {
        self.current_text_color = color;
    }

    fn current_font(&self) -> Result<(&str, &RegisteredFont)> {
        let name = self
            .current_font
            .as_deref()
            .ok_or_else(|| PdfError::FontNotFound("No font set".to_string()))?;
        let font = self
            .fonts
            .get(name)
            .ok_or_else(|| PdfError::FontNotFound(name.to_string()))?;
        Ok((name, font))
    }

    /// Width of `text` in points with the current font and size
    pub fn text_width(&self, text: &str) -> Result<f64> {
        let (_, registered) = self.current_font()?;
        let size = self.current_font_size;
        let width = match &registered.font {
            LoadedFont::Standard(font) => font.text_width_points(text, size),
            LoadedFont::Embedded(font) => font.text_width_points(text, size),
        };
        Ok(f64::from(width))
    }

    /// Insert text at a specific position
    ///
    /// # Arguments
    /// * `text` - Text to insert
    /// * `page` - Page number (1-indexed)
    /// * `x` - Anchor X in points from the left edge
    /// * `y` - Baseline Y in points from the top edge
    /// * `align` - How the text sits relative to `x`
    pub fn insert_text(
        &mut self,
        text: &str,
        page: usize,
        x: f64,
        y: f64,
        align: Align,
    ) -> Result<()> {
        let page_id = self.page_id(page)?;
        if text.is_empty() {
            return Ok(());
        }

        let width = self.text_width(text)?;
        let size = self.current_font_size;
        let name = self.current_font()?.0.to_string();
        let registered = self
            .fonts
            .get_mut(&name)
            .ok_or_else(|| PdfError::FontNotFound(name.clone()))?;

        let text_hex = match &mut registered.font {
            LoadedFont::Standard(font) => {
                let replaced = encode_winansi(text).replaced;
                if replaced > 0 {
                    log::warn!(
                        "{replaced} character(s) of {text:?} are not available in {} and were replaced",
                        font.base_font()
                    );
                }
                font.encode_text_hex(text)
            }
            LoadedFont::Embedded(font) => {
                let missing = font.missing_glyphs(text);
                if missing > 0 {
                    log::warn!("{missing} character(s) of {text:?} have no glyph in {}", font.name);
                }
                font.add_chars(text);
                font.encode_text_hex(text)
            }
        };
        let ctx = TextRenderContext {
            font_resource: registered.resource.clone(),
            font_size: size,
            color: self.current_text_color,
        };

        let [left, _, _, top] = self.visible_box(page_id)?;
        let start_x = match align {
            Align::Left => x,
            Align::Center => x - width / 2.0,
            Align::Right => x - width,
        };

        let operators = generate_text_operators(&text_hex, left + start_x, top - y, &ctx);
        self.buffer_content(page, &operators);
        self.page_fonts.entry(page).or_default().insert(name);

        Ok(())
    }

    /// Embed an image once and return a handle for drawing it
    ///
    /// Images are deduplicated by a hash of their bytes.
    pub fn embed_image(&mut self, data: &[u8]) -> Result<ImageHandle> {
        let mut hasher = DefaultHasher::new();
        data.hash(&mut hasher);
        let data_hash = hasher.finish();

        if let Some(handle) = self.embedded_images.get(&data_hash) {
            return Ok(*handle);
        }

        let xobject = ImageXObject::from_bytes(data)?;
        let id = self.inner.add_object(xobject.to_pdf_stream());
        self.next_image_resource += 1;
        let handle = ImageHandle {
            id,
            index: self.next_image_resource,
            width: xobject.width,
            height: xobject.height,
        };
        self.embedded_images.insert(data_hash, handle);

        log::debug!(
            "Embedded {}x{} {} image as object {:?}",
            handle.width,
            handle.height,
            xobject.color_space,
            id
        );
        Ok(handle)
    }

    /// Draw an embedded image
    ///
    /// # Arguments
    /// * `image` - Handle from [`PdfDocument::embed_image`]
    /// * `page` - Page number (1-indexed)
    /// * `x` - X coordinate in points from the left edge
    /// * `y` - Y coordinate of the image top in points from the top edge
    /// * `width` - Target width in points
    /// * `height` - Target height in points
    /// * `mode` - Scaling mode
    #[allow(clippy::too_many_arguments)]
    pub fn draw_image(
        &mut self,
        image: &ImageHandle,
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        mode: ImageScaleMode,
    ) -> Result<()> {
        let page_id = self.page_id(page)?;
        let (actual_width, actual_height) =
            calculate_scaled_dimensions(image.width, image.height, width, height, mode);

        let resource_name = image.resource_name();
        self.add_page_resource(page, b"XObject", &resource_name, Object::Reference(image.id))?;

        let [left, _, _, top] = self.visible_box(page_id)?;
        let operators = generate_image_operators(
            &resource_name,
            left + x,
            top - y - actual_height,
            actual_width,
            actual_height,
        );
        self.buffer_content(page, &operators);

        Ok(())
    }

    /// Insert an image with scaling mode
    ///
    /// Shorthand for [`PdfDocument::embed_image`] followed by
    /// [`PdfDocument::draw_image`].
    #[allow(clippy::too_many_arguments)]
    pub fn insert_image_scaled(
        &mut self,
        data: &[u8],
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        mode: ImageScaleMode,
    ) -> Result<()> {
        self.page_id(page)?;
        let handle = self.embed_image(data)?;
        self.draw_image(&handle, page, x, y, width, height, mode)
    }

    /// Set the document information dictionary written on save
    pub fn set_info(&mut self, info: DocumentInfo) {
        self.info = Some(info);
    }

    /// Save the document to bytes
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.finalize()?;
        let mut buffer = Vec::new();
        self.inner
            .save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;
        Ok(buffer)
    }

    /// Write fonts, buffered content and metadata into the document
    fn finalize(&mut self) -> Result<()> {
        log::debug!(
            "Finalizing PDF: {} page(s), {} font(s), {} image(s)",
            self.page_count(),
            self.fonts.len(),
            self.embedded_images.len()
        );

        self.embed_fonts()?;
        self.flush_content_buffers()?;
        self.write_info();
        Ok(())
    }

    /// Embed every font that was drawn and link it from the pages using it
    fn embed_fonts(&mut self) -> Result<()> {
        let page_fonts = std::mem::take(&mut self.page_fonts);
        let used: BTreeSet<&String> = page_fonts.values().flatten().collect();

        let mut font_ids: HashMap<String, (String, ObjectId)> = HashMap::new();
        for name in used {
            let registered = self
                .fonts
                .get(name)
                .ok_or_else(|| PdfError::FontNotFound(name.clone()))?
                .clone();
            let id = match &registered.font {
                LoadedFont::Standard(font) => self.inner.add_object(font.to_pdf_dictionary()),
                LoadedFont::Embedded(font) => self.embed_truetype(font)?,
            };
            font_ids.insert(name.clone(), (registered.resource, id));
        }

        for (page, names) in &page_fonts {
            for name in names {
                let (resource, id) = &font_ids[name];
                self.add_page_resource(*page, b"Font", resource, Object::Reference(*id))?;
            }
        }

        Ok(())
    }

    /// Add the Type0 object graph of a TrueType font
    fn embed_truetype(&mut self, font: &FontData) -> Result<ObjectId> {
        let objects = font.to_pdf_objects()?;

        let font_file_id = self.inner.add_object(objects.font_file_stream);
        let mut descriptor = objects.font_descriptor;
        descriptor.set("FontFile2", font_file_id);
        let descriptor_id = self.inner.add_object(descriptor);

        let mut cid_font = objects.cid_font;
        cid_font.set("FontDescriptor", descriptor_id);
        let cid_font_id = self.inner.add_object(cid_font);

        let tounicode_id = self.inner.add_object(objects.tounicode_stream);
        let mut type0 = objects.type0_font;
        type0.set("DescendantFonts", vec![Object::Reference(cid_font_id)]);
        type0.set("ToUnicode", tounicode_id);

        Ok(self.inner.add_object(type0))
    }

    /// Buffer content operators for a page (written at save time)
    fn buffer_content(&mut self, page: usize, content: &[u8]) {
        self.page_content_buffer
            .entry(page)
            .or_default()
            .extend_from_slice(content);
    }

    /// Flush all buffered content to page streams
    fn flush_content_buffers(&mut self) -> Result<()> {
        let buffers = std::mem::take(&mut self.page_content_buffer);
        for (page, content) in buffers {
            if !content.is_empty() {
                self.append_to_content_stream(page, &content)?;
            }
        }
        Ok(())
    }

    /// Append content to a page's content stream
    ///
    /// Existing content is left untouched and wrapped in `q`/`Q` so its
    /// graphics state cannot leak into the appended operators. Pages that
    /// share content streams keep sharing them.
    fn append_to_content_stream(&mut self, page: usize, content: &[u8]) -> Result<()> {
        let page_id = self.page_id(page)?;
        let existing = self.content_references(page_id)?;

        let mut data = Vec::with_capacity(content.len() + 2);
        if !existing.is_empty() {
            data.extend_from_slice(b"Q\n");
        }
        data.extend_from_slice(content);

        let mut stream = Stream::new(Dictionary::new(), deflate(&data)?);
        stream.dict.set("Filter", "FlateDecode");
        let stream_id = self.inner.add_object(stream);

        let contents = if existing.is_empty() {
            Object::Reference(stream_id)
        } else {
            let save_state = self.save_state_stream();
            let mut refs = Vec::with_capacity(existing.len() + 2);
            refs.push(Object::Reference(save_state));
            refs.extend(existing);
            refs.push(Object::Reference(stream_id));
            Object::Array(refs)
        };

        self.inner
            .get_object_mut(page_id)?
            .as_dict_mut()?
            .set("Contents", contents);
        Ok(())
    }

    /// References to a page's content streams, moving inline streams into objects
    fn content_references(&mut self, page_id: ObjectId) -> Result<Vec<Object>> {
        let contents = self.inner.get_dictionary(page_id)?.get(b"Contents").ok().cloned();

        let items = match contents {
            None => return Ok(Vec::new()),
            Some(Object::Reference(id)) => match self.inner.get_object(id)? {
                Object::Array(array) => array.clone(),
                _ => vec![Object::Reference(id)],
            },
            Some(Object::Array(array)) => array,
            Some(other) => vec![other],
        };

        Ok(items
            .into_iter()
            .filter_map(|item| match item {
                Object::Reference(id) => Some(Object::Reference(id)),
                Object::Stream(stream) => Some(Object::Reference(self.inner.add_object(stream))),
                _ => None,
            })
            .collect())
    }

    fn save_state_stream(&mut self) -> ObjectId {
        if let Some(id) = self.save_state_stream {
            return id;
        }
        let id = self
            .inner
            .add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        self.save_state_stream = Some(id);
        id
    }

    fn write_info(&mut self) {
        let Some(info) = self.info.take() else {
            return;
        };

        let mut dict = Dictionary::new();
        let entries = [
            ("Title", info.title),
            ("Creator", info.creator),
            ("Producer", info.producer),
        ];
        for (key, value) in entries {
            if let Some(value) = value {
                dict.set(key, text_string(&value));
            }
        }
        if let Some(date) = info.creation_date {
            dict.set("CreationDate", Object::string_literal(pdf_date(&date)));
        }

        let info_id = self.inner.add_object(dict);
        self.inner.trailer.set("Info", info_id);
    }
}

impl Default for PdfDocument {
    fn default() -> Self {
        Self::new()
    }
}

fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(value) => Some(*value as f64),
        Object::Real(value) => Some(f64::from(*value)),
        _ => None,
    }
}

/// PDF text string: literal for ASCII, UTF-16BE with BOM otherwise
fn text_string(value: &str) -> Object {
    if value.is_ascii() {
        return Object::string_literal(value);
    }
    let mut bytes = vec![0xFE, 0xFF];
    bytes.extend(value.encode_utf16().flat_map(u16::to_be_bytes));
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Format a timestamp as a PDF date string (`D:YYYYMMDDHHmmSS+HH'mm'`)
fn pdf_date(date: &DateTime<FixedOffset>) -> String {
    let offset = date.offset().local_minus_utc();
    let zone = if offset == 0 {
        "Z".to_string()
    } else {
        let sign = if offset < 0 { '-' } else { '+' };
        let minutes = offset.abs() / 60;
        format!("{sign}{:02}'{:02}'", minutes / 60, minutes % 60)
    };
    format!("{}{zone}", date.format("D:%Y%m%d%H%M%S"))
}
