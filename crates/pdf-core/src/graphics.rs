//! Path operators for borders and barcode bars

use crate::document::Color;

/// Axis-aligned rectangle in PDF coordinates (origin bottom-left)
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PdfRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Generate operators stroking a rectangle outline
///
/// The graphics state is saved and restored so the line width does not
/// leak into later operators.
pub(crate) fn stroke_rect_operators(rect: PdfRect, line_width: f64, color: Color) -> Vec<u8> {
    let mut ops = String::new();
    ops.push_str("q\n");
    ops.push_str(&format!("{} {} {} RG\n", color.r, color.g, color.b));
    ops.push_str(&format!("{line_width:.2} w\n"));
    ops.push_str(&format!(
        "{:.2} {:.2} {:.2} {:.2} re\n",
        rect.x, rect.y, rect.width, rect.height
    ));
    ops.push_str("S\n");
    ops.push_str("Q\n");
    ops.into_bytes()
}

/// Generate operators filling a set of rectangles as one path
pub(crate) fn fill_rects_operators(rects: &[PdfRect], color: Color) -> Vec<u8> {
    if rects.is_empty() {
        return Vec::new();
    }

    let mut ops = String::new();
    ops.push_str("q\n");
    ops.push_str(&format!("{} {} {} rg\n", color.r, color.g, color.b));
    for rect in rects {
        ops.push_str(&format!(
            "{:.4} {:.4} {:.4} {:.4} re\n",
            rect.x, rect.y, rect.width, rect.height
        ));
    }
    ops.push_str("f\n");
    ops.push_str("Q\n");
    ops.into_bytes()
}
