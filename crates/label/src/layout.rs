//! Label layout
//!
//! One label is one A4 page: a thick outer frame and seven rows drawn top to
//! bottom (company header, article, quantity, barcode, order index, order
//! number, box number). Every row and column split is outlined, whatever the
//! content.

use crate::fit::{fit_barcode, shrink_to_fit};
use crate::geometry::{LayoutGeometry, Row};
use crate::{BarcodePayload, LabelFonts, LabelRecord, Result};
use pdf_core::{Align, Code128, FontData, FontWeight, PdfDocument};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Font family name inside each label document
const FAMILY: &str = "label";

/// Labels are single-page documents
const PAGE: usize = 1;

/// Renders label records to PDF
#[derive(Debug, Clone)]
pub struct LabelRenderer {
    geometry: LayoutGeometry,
    fonts: LabelFonts,
}

impl LabelRenderer {
    pub fn new(geometry: LayoutGeometry, fonts: LabelFonts) -> Self {
        Self { geometry, fonts }
    }

    pub fn geometry(&self) -> &LayoutGeometry {
        &self.geometry
    }

    /// Render a label to PDF bytes
    pub fn render(&self, record: &LabelRecord) -> Result<Vec<u8>> {
        let mut doc = self.draw(record)?;
        Ok(doc.to_bytes()?)
    }

    /// Render a label into `dir`, named after the record
    ///
    /// An existing file with the same name is overwritten.
    pub fn write_to<P: AsRef<Path>>(&self, dir: P, record: &LabelRecord) -> Result<PathBuf> {
        let path = dir.as_ref().join(record.file_name());
        let bytes = self.render(record)?;
        std::fs::write(&path, bytes)?;

        info!(path = %path.display(), "label written");
        Ok(path)
    }

    /// Lay out a label on a new document
    pub fn draw(&self, record: &LabelRecord) -> Result<PdfDocument> {
        let mut doc = PdfDocument::new(self.geometry.page)?;
        doc.register_font_family(FAMILY, self.fonts.family().clone())?;
        doc.set_font(FAMILY, self.geometry.value_font.max)?;

        let mut page = LabelPage {
            doc: &mut doc,
            geometry: &self.geometry,
            bold: self.fonts.family().get_variant(FontWeight::Bold),
        };

        page.frame()?;
        for (row, top) in Row::ALL.into_iter().zip(self.geometry.row_tops()) {
            match row {
                Row::Header => page.header(top, &record.company)?,
                Row::Barcode => page.barcode(top, &record.barcode_payload())?,
                _ => page.two_column(row, top, &row_value(record, row))?,
            }
        }

        Ok(doc)
    }
}

/// Value shown in the right-hand column of a two-column row
fn row_value(record: &LabelRecord, row: Row) -> String {
    match row {
        Row::Article => record.article.clone(),
        Row::Quantity => record.quantity_display(),
        Row::OrderIndex => record.batch.clone(),
        Row::OrderNumber => record.order.clone(),
        Row::BoxNumber => record.carton_index.to_string(),
        Row::Header => record.company.clone(),
        Row::Barcode => record.barcode_payload().to_string(),
    }
}

/// Drawing state for one label page
struct LabelPage<'a> {
    doc: &'a mut PdfDocument,
    geometry: &'a LayoutGeometry,
    /// Font used to measure shrinkable text
    bold: &'a FontData,
}

impl LabelPage<'_> {
    fn frame(&mut self) -> Result<()> {
        let frame = self.geometry.frame();
        self.doc.set_line_width(self.geometry.outer_border);
        self.doc
            .stroke_rect(PAGE, frame.x, frame.y, frame.width, frame.height)?;
        self.doc.set_line_width(self.geometry.inner_border);
        Ok(())
    }

    /// Company name, centred and shrunk to the frame width
    fn header(&mut self, top: f64, company: &str) -> Result<()> {
        let geometry = self.geometry;
        let frame = geometry.frame();
        let height = geometry.row_height(Row::Header);

        self.doc
            .stroke_rect(PAGE, frame.x, top, frame.width, height)?;

        let available = frame.width - geometry.header_side_slack;
        let size = shrink_to_fit(company, self.bold, geometry.header_font, available);
        debug!(size, "header font size");

        let baseline = top + height / 2.0 + size as f64 * geometry.header_baseline_factor;
        self.text(
            company,
            FontWeight::Bold,
            size,
            frame.x + frame.width / 2.0,
            baseline,
            Align::Center,
        )
    }

    /// Caption column on the left, value column on the right
    fn two_column(&mut self, row: Row, top: f64, value: &str) -> Result<()> {
        let geometry = self.geometry;
        let frame = geometry.frame();
        let height = geometry.row_height(row);
        let label_width = geometry.label_column_width();
        let value_width = geometry.value_column_width();

        self.doc
            .stroke_rect(PAGE, frame.x, top, label_width, height)?;
        self.doc
            .stroke_rect(PAGE, frame.x + label_width, top, value_width, height)?;

        let (caption, sub_caption) = row.captions().unwrap_or_default();
        let caption_x = frame.x + geometry.caption_inset;
        self.text(
            caption,
            FontWeight::Bold,
            geometry.caption_size,
            caption_x,
            top + geometry.caption_baseline,
            Align::Left,
        )?;
        self.text(
            sub_caption,
            FontWeight::Bold,
            geometry.sub_caption_size,
            caption_x,
            top + geometry.sub_caption_baseline,
            Align::Left,
        )?;

        let size = if row.shrinks_value() {
            let available = value_width - geometry.value_side_slack;
            shrink_to_fit(value, self.bold, geometry.value_font, available)
        } else {
            geometry.value_font.max
        };
        if size < geometry.value_font.max {
            debug!(?row, size, "value shrunk");
        }

        let baseline = top + height / 2.0 + size as f64 * geometry.value_baseline_factor;
        self.text(
            value,
            FontWeight::Bold,
            size,
            frame.x + label_width + geometry.value_inset,
            baseline,
            Align::Left,
        )
    }

    /// Full-width Code128 barcode with its payload printed underneath
    fn barcode(&mut self, top: f64, payload: &BarcodePayload) -> Result<()> {
        let geometry = self.geometry;
        let params = &geometry.barcode;
        let frame = geometry.frame();
        let height = geometry.row_height(Row::Barcode);
        let bottom = top + height;

        self.doc
            .stroke_rect(PAGE, frame.x, top, frame.width, height)?;

        let barcode = Code128::encode(payload.as_str())?;
        let (target_width, target_height) = geometry.barcode_target();
        let fit = fit_barcode(&barcode, target_width, target_height, params);
        debug!(
            %payload,
            module_width = fit.module_width,
            bar_height = fit.bar_height,
            floored = fit.floored,
            "barcode fitted"
        );

        let bars_bottom =
            bottom - params.top_pad - (target_height - fit.size.height) / 2.0 - params.lift;
        let x = frame.x + (frame.width - fit.size.width) / 2.0;
        self.doc.draw_barcode(
            &barcode,
            PAGE,
            x,
            bars_bottom - fit.size.height,
            fit.module_width,
            fit.bar_height,
        )?;

        self.text(
            payload.as_str(),
            FontWeight::Regular,
            params.caption_size,
            frame.x + frame.width / 2.0,
            bottom - params.caption_bottom_pad,
            Align::Center,
        )
    }

    fn text(
        &mut self,
        text: &str,
        weight: FontWeight,
        size: f32,
        x: f64,
        y: f64,
        align: Align,
    ) -> Result<()> {
        self.doc.set_font_weight(weight);
        self.doc.set_font_size(size);
        self.doc.insert_text(text, PAGE, x, y, align)?;
        Ok(())
    }
}
