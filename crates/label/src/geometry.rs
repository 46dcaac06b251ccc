//! Label geometry
//!
//! Fixed page layout constants in points. Vertical positions are measured
//! from the top of the page.

use pdf_core::PageSize;

/// Font size range for shrink-to-fit text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontRange {
    /// Starting size
    pub max: f32,
    /// Smallest size text is shrunk to
    pub min: f32,
}

/// Rectangle in top-origin page coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// The seven label rows, top to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Row {
    Header,
    Article,
    Quantity,
    Barcode,
    OrderIndex,
    OrderNumber,
    BoxNumber,
}

impl Row {
    pub const ALL: [Row; 7] = [
        Row::Header,
        Row::Article,
        Row::Quantity,
        Row::Barcode,
        Row::OrderIndex,
        Row::OrderNumber,
        Row::BoxNumber,
    ];

    /// Main and sub caption of a two-column row
    pub fn captions(&self) -> Option<(&'static str, &'static str)> {
        match self {
            Row::Article => Some(("Article No.", "(SKU)")),
            Row::Quantity => Some(("Quantity", "(Per box)")),
            Row::OrderIndex => Some(("Order Index", "(Nth item in your order)")),
            Row::OrderNumber => Some(("Order No.", "(Your order number)")),
            Row::BoxNumber => Some(("Box No.", "(Nth box for this Article No.)")),
            Row::Header | Row::Barcode => None,
        }
    }

    /// Whether the row's value shrinks to fit the value column
    pub fn shrinks_value(&self) -> bool {
        matches!(self, Row::Article | Row::OrderIndex | Row::OrderNumber)
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// Barcode row parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarcodeGeometry {
    /// Size of the payload caption under the bars
    pub caption_size: f32,
    /// Caption baseline distance from the row bottom
    pub caption_bottom_pad: f64,
    /// Height reserved for the caption text
    pub caption_area: f64,
    /// Space kept free above the fitted box
    pub top_pad: f64,
    /// Lower bound on the target height
    pub min_target_height: f64,
    /// Horizontal space not available to the bars
    pub side_slack: f64,
    /// Bars are raised by this much above the centred position
    pub lift: f64,
    /// Measurement render parameters
    pub baseline_module_width: f64,
    pub baseline_bar_height: f64,
    /// Narrowest module width still reliably scanned
    pub min_module_width: f64,
}

/// Complete label layout
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutGeometry {
    pub page: PageSize,
    /// Left and right page margin
    pub margin_x: f64,
    /// Page height not covered by the frame, split evenly above and below
    pub vertical_slack: f64,
    pub outer_border: f64,
    pub inner_border: f64,
    /// Row heights in `Row::ALL` order
    pub row_heights: [f64; 7],
    /// Label column share of the frame width
    pub label_column_ratio: f64,

    pub header_font: FontRange,
    /// Horizontal space not available to the company name
    pub header_side_slack: f64,
    /// Header baseline offset below the row middle, per point of font size
    pub header_baseline_factor: f64,

    pub caption_size: f32,
    pub caption_baseline: f64,
    pub sub_caption_size: f32,
    pub sub_caption_baseline: f64,
    /// Caption distance from the frame's left edge
    pub caption_inset: f64,

    pub value_font: FontRange,
    /// Horizontal space in the value column not available to the value
    pub value_side_slack: f64,
    /// Value distance from the column split
    pub value_inset: f64,
    pub value_baseline_factor: f64,

    pub barcode: BarcodeGeometry,
}

impl LayoutGeometry {
    /// A4 portrait layout
    pub fn a4() -> Self {
        Self {
            page: PageSize::A4,
            margin_x: 36.0,
            vertical_slack: 140.0,
            outer_border: 3.0,
            inner_border: 1.5,
            row_heights: [90.0, 70.0, 70.0, 150.0, 70.0, 70.0, 70.0],
            label_column_ratio: 0.45,

            header_font: FontRange { max: 42.0, min: 12.0 },
            header_side_slack: 24.0,
            header_baseline_factor: 0.33,

            caption_size: 36.0,
            caption_baseline: 30.0,
            sub_caption_size: 18.0,
            sub_caption_baseline: 54.0,
            caption_inset: 12.0,

            value_font: FontRange { max: 36.0, min: 8.0 },
            value_side_slack: 20.0,
            value_inset: 10.0,
            value_baseline_factor: 0.35,

            barcode: BarcodeGeometry {
                caption_size: 12.0,
                caption_bottom_pad: 16.0,
                caption_area: 18.0,
                top_pad: 16.0,
                min_target_height: 30.0,
                side_slack: 60.0,
                lift: 15.0,
                baseline_module_width: 1.2,
                baseline_bar_height: 40.0,
                min_module_width: 0.2,
            },
        }
    }

    /// Outer label frame, full width between the margins and centred vertically
    pub fn frame(&self) -> Frame {
        let height = self.page.height - self.vertical_slack;
        Frame {
            x: self.margin_x,
            y: (self.page.height - height) / 2.0,
            width: self.page.width - 2.0 * self.margin_x,
            height,
        }
    }

    pub fn row_height(&self, row: Row) -> f64 {
        self.row_heights[row.index()]
    }

    /// Width of the caption column of two-column rows
    pub fn label_column_width(&self) -> f64 {
        self.frame().width * self.label_column_ratio
    }

    /// Width of the value column of two-column rows
    pub fn value_column_width(&self) -> f64 {
        self.frame().width - self.label_column_width()
    }

    /// Top edge of each row, in `Row::ALL` order
    pub fn row_tops(&self) -> [f64; 7] {
        let mut tops = [0.0; 7];
        let mut cursor = self.frame().y;
        for (top, height) in tops.iter_mut().zip(self.row_heights) {
            *top = cursor;
            cursor += height;
        }
        tops
    }

    /// Area the fitted barcode must stay within, as (width, height)
    pub fn barcode_target(&self) -> (f64, f64) {
        let barcode = &self.barcode;
        let reserved = barcode.top_pad + barcode.caption_area + barcode.caption_bottom_pad;
        let height = (self.row_height(Row::Barcode) - reserved).max(barcode.min_target_height);
        let width = self.frame().width - barcode.side_slack;
        (width, height)
    }
}

impl Default for LayoutGeometry {
    fn default() -> Self {
        Self::a4()
    }
}
