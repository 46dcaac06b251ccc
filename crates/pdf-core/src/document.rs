//! PDF Document wrapper

use crate::barcode::{BarcodeSize, Code128, LinearBarcode};
use crate::font::FontObjects;
use crate::graphics::{fill_rects_operators, stroke_rect_operators, PdfRect};
use crate::text::{generate_text_operators, TextRenderContext};
use crate::{Align, FontData, FontFamily, FontWeight, PdfError, Result};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

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

    /// Black color
    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// Page dimensions in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    /// ISO A4 portrait
    pub const A4: PageSize = PageSize {
        width: 595.28,
        height: 841.89,
    };
}

/// PDF Document wrapper providing high-level drawing operations
///
/// Every page has the same size. Drawing calls take coordinates with the
/// origin at the top-left corner and buffer their operators; fonts are
/// embedded and content streams written when the document is saved.
pub struct PdfDocument {
    /// The underlying lopdf document
    inner: Document,
    /// Size of every page
    page_size: PageSize,
    /// Root page tree node
    pages_id: ObjectId,
    /// Registered font families
    font_families: HashMap<String, FontFamily>,
    /// Current font family name
    current_family: Option<String>,
    /// Current font weight
    current_weight: FontWeight,
    /// Current font size
    current_font_size: f32,
    /// Current text color
    current_text_color: Color,
    /// Current stroke width for outlines
    current_line_width: f64,
    /// Embedded fonts (font name -> PDF object ID)
    embedded_fonts: HashMap<String, ObjectId>,
    /// Every object written for the embedded fonts, replaced on each save
    font_objects: Vec<ObjectId>,
    /// Page font resources (page number -> font name -> resource name)
    page_font_resources: HashMap<usize, HashMap<String, String>>,
    /// Next font resource number
    next_font_resource: u32,
    /// Buffered content operators per page (page number -> operators)
    page_content_buffer: HashMap<usize, Vec<u8>>,
}

impl PdfDocument {
    /// Create a document with a single blank page
    ///
    /// # Example
    /// ```ignore
    /// let doc = PdfDocument::new(PageSize::A4)?;
    /// assert_eq!(doc.page_count(), 1);
    /// ```
    pub fn new(page_size: PageSize) -> Result<Self> {
        let mut inner = Document::with_version("1.5");

        let pages_id = inner.new_object_id();
        inner.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => Object::Array(Vec::new()),
                "Count" => 0,
            }),
        );

        let catalog_id = inner.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        inner.trailer.set("Root", catalog_id);

        let mut doc = Self {
            inner,
            page_size,
            pages_id,
            font_families: HashMap::new(),
            current_family: None,
            current_weight: FontWeight::default(),
            current_font_size: 12.0,
            current_text_color: Color::default(),
            current_line_width: 1.0,
            embedded_fonts: HashMap::new(),
            font_objects: Vec::new(),
            page_font_resources: HashMap::new(),
            next_font_resource: 1,
            page_content_buffer: HashMap::new(),
        };
        doc.add_blank_page()?;

        Ok(doc)
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> usize {
        self.inner.get_pages().len()
    }

    /// Size shared by all pages
    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    /// Add a blank page to the end of the document
    ///
    /// # Returns
    /// New page number (1-indexed)
    pub fn add_blank_page(&mut self) -> Result<usize> {
        let contents_id = self
            .inner
            .add_object(Stream::new(Dictionary::new(), Vec::new()));

        let page_id = self.inner.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                self.page_size.width.into(),
                self.page_size.height.into(),
            ],
            "Resources" => Dictionary::new(),
            "Contents" => contents_id,
        });

        let pages_dict = self.inner.get_object_mut(self.pages_id)?.as_dict_mut()?;
        let kids = pages_dict.get_mut(b"Kids")?.as_array_mut()?;
        kids.push(Object::Reference(page_id));
        let count = kids.len() as i64;
        pages_dict.set("Count", count);

        Ok(count as usize)
    }

    /// Register a font family with its variants
    ///
    /// # Arguments
    /// * `name` - Font family name used with `set_font`
    /// * `family` - Regular and optional bold variant
    pub fn register_font_family(&mut self, name: &str, family: FontFamily) -> Result<()> {
        if self.font_families.contains_key(name) {
            return Err(PdfError::FontAlreadyExists(name.to_string()));
        }

        self.font_families.insert(name.to_string(), family);
        Ok(())
    }

    /// Set current font family and size
    pub fn set_font(&mut self, family: &str, size: f32) -> Result<()> {
        if !self.font_families.contains_key(family) {
            return Err(PdfError::FontNotFound(family.to_string()));
        }

        self.current_family = Some(family.to_string());
        self.current_font_size = size;
        Ok(())
    }

    /// Set current font size, keeping the family
    pub fn set_font_size(&mut self, size: f32) {
        self.current_font_size = size;
    }

    /// Set current font weight
    pub fn set_font_weight(&mut self, weight: FontWeight) {
        self.current_weight = weight;
    }

    /// Set text color for subsequent text
    pub fn set_text_color(&mut self, color: Color) {
        self.current_text_color = color;
    }

    /// Set stroke width for subsequent outlines
    pub fn set_line_width(&mut self, width: f64) {
        self.current_line_width = width;
    }

    /// Get current font's text width for a string, in points
    ///
    /// # Example
    /// ```ignore
    /// doc.set_font("label", 12.0)?;
    /// let width = doc.get_text_width("Hello")?;
    /// ```
    pub fn get_text_width(&self, text: &str) -> Result<f64> {
        let font_name = self.current_font_name()?;
        let font_data = self.font_data(&font_name)?;

        Ok(font_data.text_width_points(text, self.current_font_size) as f64)
    }

    /// Insert text at a specific position
    ///
    /// # Arguments
    /// * `text` - Text to insert
    /// * `page` - Page number (1-indexed)
    /// * `x` - X coordinate in points
    /// * `y` - Baseline Y coordinate in points (from top)
    /// * `align` - Which point of the text `x` refers to
    pub fn insert_text(
        &mut self,
        text: &str,
        page: usize,
        x: f64,
        y: f64,
        align: Align,
    ) -> Result<()> {
        self.check_page(page)?;

        if text.is_empty() {
            return Ok(());
        }

        let font_name = self.current_font_name()?;
        let font_size = self.current_font_size;

        let (text_hex, text_width) = {
            let font_data = self.font_data_mut(&font_name)?;
            font_data.add_chars(text);
            (
                font_data.encode_text_hex(text),
                font_data.text_width_points(text, font_size) as f64,
            )
        };

        let font_resource_name = self.get_or_create_font_ref(&font_name, page);

        let ctx = TextRenderContext {
            font_name: font_resource_name,
            font_size,
            text_width,
            color: self.current_text_color,
        };

        let pdf_y = self.page_size.height - y;
        let operators = generate_text_operators(&text_hex, x, pdf_y, align, &ctx);
        self.buffer_content(page, &operators);

        Ok(())
    }

    /// Stroke a rectangle outline with the current line width
    ///
    /// # Arguments
    /// * `page` - Page number (1-indexed)
    /// * `x` - Left edge in points
    /// * `y` - Top edge in points (from top)
    /// * `width` - Width in points
    /// * `height` - Height in points
    pub fn stroke_rect(
        &mut self,
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<()> {
        self.check_page(page)?;

        let rect = PdfRect {
            x,
            y: self.page_size.height - y - height,
            width,
            height,
        };
        let operators = stroke_rect_operators(rect, self.current_line_width, Color::black());
        self.buffer_content(page, &operators);

        Ok(())
    }

    /// Draw a Code128 barcode
    ///
    /// The left quiet zone starts at `x`; bars span from `y` down to
    /// `y + bar_height`.
    ///
    /// # Returns
    /// The rendered bounding box, quiet zones included
    pub fn draw_barcode(
        &mut self,
        barcode: &Code128,
        page: usize,
        x: f64,
        y: f64,
        module_width: f64,
        bar_height: f64,
    ) -> Result<BarcodeSize> {
        self.check_page(page)?;

        let bottom = self.page_size.height - y - bar_height;
        let rects: Vec<PdfRect> = barcode
            .bars()
            .into_iter()
            .map(|(offset, width)| PdfRect {
                x: x + offset as f64 * module_width,
                y: bottom,
                width: width as f64 * module_width,
                height: bar_height,
            })
            .collect();

        let operators = fill_rects_operators(&rects, Color::black());
        self.buffer_content(page, &operators);

        Ok(barcode.bounds(module_width, bar_height))
    }

    /// Save the document to a file
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.finalize()?;

        self.inner
            .save(path)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;
        Ok(())
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

    /// Write buffered content and font objects into the document
    fn finalize(&mut self) -> Result<()> {
        self.flush_content_buffers()?;
        self.embed_fonts()
    }

    fn check_page(&self, page: usize) -> Result<()> {
        let page_count = self.page_count();
        if page == 0 || page > page_count {
            return Err(PdfError::InvalidPage(page, page_count));
        }
        Ok(())
    }

    fn page_id(&self, page: usize) -> Result<ObjectId> {
        let pages = self.inner.get_pages();
        pages
            .get(&(page as u32))
            .copied()
            .ok_or(PdfError::InvalidPage(page, pages.len()))
    }

    /// Get the current active font variant name
    fn current_font_name(&self) -> Result<String> {
        let family_name = self
            .current_family
            .as_ref()
            .ok_or_else(|| PdfError::FontNotFound("No font family set".to_string()))?;

        let family = self
            .font_families
            .get(family_name)
            .ok_or_else(|| PdfError::FontNotFound(family_name.clone()))?;

        Ok(family.get_variant(self.current_weight).name.clone())
    }

    /// Get font data by variant name
    fn font_data(&self, name: &str) -> Result<&FontData> {
        self.font_families
            .values()
            .flat_map(|family| family.variants())
            .find(|variant| variant.name == name)
            .ok_or_else(|| PdfError::FontNotFound(name.to_string()))
    }

    /// Get mutable font data by variant name
    fn font_data_mut(&mut self, name: &str) -> Result<&mut FontData> {
        self.font_families
            .values_mut()
            .flat_map(|family| family.variants_mut())
            .find(|variant| variant.name == name)
            .ok_or_else(|| PdfError::FontNotFound(name.to_string()))
    }

    /// Get or create the resource name (e.g. "F1") of a font on a page
    ///
    /// The font itself is embedded at save time, once all used characters
    /// are known.
    fn get_or_create_font_ref(&mut self, font_name: &str, page: usize) -> String {
        let page_resources = self.page_font_resources.entry(page).or_default();

        if let Some(resource_name) = page_resources.get(font_name) {
            return resource_name.clone();
        }

        let resource_name = format!("F{}", self.next_font_resource);
        self.next_font_resource += 1;
        page_resources.insert(font_name.to_string(), resource_name.clone());

        resource_name
    }

    /// Embed every used font and attach font resources to the pages
    ///
    /// Objects from an earlier save are dropped first, since the set of used
    /// characters (and so /W and ToUnicode) may have grown since.
    fn embed_fonts(&mut self) -> Result<()> {
        self.embedded_fonts.clear();
        for object_id in self.font_objects.drain(..) {
            self.inner.objects.remove(&object_id);
        }

        let mut used_fonts: Vec<FontData> = self
            .font_families
            .values()
            .flat_map(|family| family.variants())
            .filter(|font| !font.used_chars.is_empty())
            .cloned()
            .collect();
        used_fonts.sort_by(|a, b| a.name.cmp(&b.name));
        used_fonts.dedup_by(|a, b| a.name == b.name);

        for font in &used_fonts {
            let object_id = self.embed_font_object(font)?;
            self.embedded_fonts.insert(font.name.clone(), object_id);
        }

        self.finalize_page_font_resources()
    }

    /// Embed a single font and return the ID of its top-level dictionary
    fn embed_font_object(&mut self, font: &FontData) -> Result<ObjectId> {
        match font.to_pdf_objects()? {
            FontObjects::Simple(dict) => Ok(self.add_font_object(dict)),
            FontObjects::Composite {
                mut type0_font,
                mut cid_font,
                mut font_descriptor,
                font_file_stream,
                tounicode_stream,
            } => {
                let font_file_id = self.add_font_object(font_file_stream);
                font_descriptor.set("FontFile2", Object::Reference(font_file_id));
                let font_descriptor_id = self.add_font_object(font_descriptor);

                cid_font.set("FontDescriptor", Object::Reference(font_descriptor_id));
                let cid_font_id = self.add_font_object(cid_font);

                let tounicode_id = self.add_font_object(tounicode_stream);
                type0_font.set(
                    "DescendantFonts",
                    Object::Array(vec![Object::Reference(cid_font_id)]),
                );
                type0_font.set("ToUnicode", Object::Reference(tounicode_id));

                Ok(self.add_font_object(type0_font))
            }
        }
    }

    fn add_font_object<T: Into<Object>>(&mut self, object: T) -> ObjectId {
        let object_id = self.inner.add_object(object);
        self.font_objects.push(object_id);
        object_id
    }

    /// Add font references to each page's Resources dictionary
    fn finalize_page_font_resources(&mut self) -> Result<()> {
        let mut pages: Vec<usize> = self.page_font_resources.keys().copied().collect();
        pages.sort_unstable();

        for page in pages {
            let mut font_dict = Dictionary::new();
            for (font_name, resource_name) in &self.page_font_resources[&page] {
                let font_ref = self
                    .embedded_fonts
                    .get(font_name)
                    .ok_or_else(|| PdfError::FontNotFound(font_name.clone()))?;
                font_dict.set(resource_name.as_bytes(), Object::Reference(*font_ref));
            }

            let page_id = self.page_id(page)?;
            let page_dict = self.inner.get_object_mut(page_id)?.as_dict_mut()?;
            let mut resources = page_dict
                .get(b"Resources")
                .and_then(Object::as_dict)
                .cloned()
                .unwrap_or_else(|_| Dictionary::new());
            resources.set("Font", font_dict);
            page_dict.set("Resources", resources);
        }

        Ok(())
    }

    /// Buffer content operators for a page (written at save time)
    fn buffer_content(&mut self, page: usize, content: &[u8]) {
        self.page_content_buffer
            .entry(page)
            .or_default()
            .extend_from_slice(content);
    }

    /// Append all buffered operators to the page content streams
    fn flush_content_buffers(&mut self) -> Result<()> {
        let mut buffers: Vec<(usize, Vec<u8>)> = self.page_content_buffer.drain().collect();
        buffers.sort_by_key(|(page, _)| *page);

        for (page, content) in buffers {
            if !content.is_empty() {
                self.append_to_content_stream(page, &content)?;
            }
        }

        Ok(())
    }

    /// Replace a page's content stream with its existing content plus `content`
    fn append_to_content_stream(&mut self, page: usize, content: &[u8]) -> Result<()> {
        let page_id = self.page_id(page)?;

        let existing_content = {
            let page_dict = self.inner.get_object(page_id)?.as_dict()?;
            match page_dict.get(b"Contents") {
                Ok(Object::Reference(ref_id)) => match self.inner.get_object(*ref_id) {
                    Ok(Object::Stream(stream)) => stream
                        .decompressed_content()
                        .unwrap_or_else(|_| stream.content.clone()),
                    _ => Vec::new(),
                },
                _ => Vec::new(),
            }
        };

        let mut new_content = existing_content;
        new_content.extend_from_slice(content);

        let stream = Stream::new(
            dictionary! { "Filter" => "FlateDecode" },
            deflate(&new_content)?,
        );
        let stream_id = self.inner.add_object(stream);

        let page_dict = self.inner.get_object_mut(page_id)?.as_dict_mut()?;
        page_dict.set("Contents", Object::Reference(stream_id));

        Ok(())
    }
}

/// Compress data with zlib for a FlateDecode stream
pub(crate) fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}
