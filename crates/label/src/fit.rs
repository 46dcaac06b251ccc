//! Fitting text and barcodes into label cells

use crate::geometry::{BarcodeGeometry, FontRange};
use pdf_core::{BarcodeSize, FontData, LinearBarcode};

/// Largest size in `range`, stepping down one point at a time, at which
/// `text` is no wider than `available`
///
/// Stops at `range.min` even if the text still overflows there.
pub fn shrink_to_fit(text: &str, font: &FontData, range: FontRange, available: f64) -> f32 {
    let mut size = range.max;
    while size > range.min && font.text_width_points(text, size) as f64 > available {
        size -= 1.0;
    }
    size
}

/// Rendering parameters chosen for a barcode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarcodeFit {
    pub module_width: f64,
    pub bar_height: f64,
    /// Bounds of the barcode rendered with these parameters
    pub size: BarcodeSize,
    /// The module width was raised to the legibility floor
    pub floored: bool,
}

/// Measurement renders use this many units per unit of target width
const BASELINE_SCALE: f64 = 100.0;

/// Fit a barcode into a `target_width` x `target_height` box
///
/// The barcode is measured once at the baseline module width and bar
/// height. Width is then scaled toward the target and clamped, first to the
/// target width and then to the target height, always shrinking width and
/// height together so the measured aspect ratio is kept. The module width
/// follows from the linear width/module relation and never drops below the
/// configured floor; a floored barcode may overflow the box.
pub fn fit_barcode<B: LinearBarcode>(
    barcode: &B,
    target_width: f64,
    target_height: f64,
    geometry: &BarcodeGeometry,
) -> BarcodeFit {
    let natural = barcode.bounds(geometry.baseline_module_width, geometry.baseline_bar_height);

    let mut width = natural.width / BASELINE_SCALE * target_width;
    let mut height = natural.height * width / natural.width;

    if width > target_width {
        let scale = target_width / width;
        width *= scale;
        height *= scale;
    }

    if height > target_height {
        let scale = target_height / height;
        width *= scale;
        height *= scale;
    }

    let mut module_width = geometry.baseline_module_width * width / natural.width;
    let floored = module_width < geometry.min_module_width;
    if floored {
        module_width = geometry.min_module_width;
    }

    BarcodeFit {
        module_width,
        bar_height: height,
        size: barcode.bounds(module_width, height),
        floored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LayoutGeometry;
    use pdf_core::{BuiltinFont, Code128};
    use pretty_assertions::assert_eq;

    /// Renderer with a fixed module count, for exact arithmetic
    struct Modules(u32);

    impl LinearBarcode for Modules {
        fn bounds(&self, module_width: f64, bar_height: f64) -> BarcodeSize {
            BarcodeSize {
                width: self.0 as f64 * module_width,
                height: bar_height,
            }
        }
    }

    fn geometry() -> BarcodeGeometry {
        LayoutGeometry::a4().barcode
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn test_shrink_to_fit_keeps_max_when_fitting() {
        let font = FontData::builtin(BuiltinFont::HelveticaBold);
        let range = FontRange { max: 36.0, min: 8.0 };
        assert_eq!(shrink_to_fit("SKU1", &font, range, 500.0), 36.0);
        assert_eq!(shrink_to_fit("", &font, range, 0.0), 36.0);
    }

    #[test]
    fn test_shrink_to_fit_finds_largest_fitting_size() {
        let font = FontData::builtin(BuiltinFont::HelveticaBold);
        let range = FontRange { max: 36.0, min: 8.0 };
        // "0" is 556 units wide: 10 digits measure 5.56 pt per point of size
        let text = "0123456789";
        let size = shrink_to_fit(text, &font, range, 100.0);

        assert_eq!(size, 17.0);
        assert!(font.text_width_points(text, size) as f64 <= 100.0);
        assert!(font.text_width_points(text, size + 1.0) as f64 > 100.0);
    }

    #[test]
    fn test_shrink_to_fit_stops_at_floor() {
        let font = FontData::builtin(BuiltinFont::HelveticaBold);
        let range = FontRange { max: 42.0, min: 12.0 };
        let text = "W".repeat(200);
        assert_eq!(shrink_to_fit(&text, &font, range, 100.0), 12.0);
    }

    #[test]
    fn test_fit_preserves_aspect_ratio() {
        let geometry = geometry();
        let barcode = Modules(200);
        let natural = barcode.bounds(geometry.baseline_module_width, geometry.baseline_bar_height);
        let fit = fit_barcode(&barcode, 463.28, 100.0, &geometry);

        assert!(!fit.floored);
        assert_close(
            fit.size.width / fit.size.height,
            natural.width / natural.height,
        );
        assert!(fit.size.width <= 463.28 + 1e-9);
        assert!(fit.size.height <= 100.0 + 1e-9);
    }

    #[test]
    fn test_fit_width_bound() {
        let geometry = geometry();
        // Natural 240 x 40: width is the binding constraint
        let fit = fit_barcode(&Modules(200), 400.0, 100.0, &geometry);

        assert_close(fit.size.width, 400.0);
        assert_close(fit.size.height, 400.0 * 40.0 / 240.0);
        assert_close(fit.module_width, 2.0);
        assert_close(fit.bar_height, fit.size.height);
    }

    #[test]
    fn test_fit_height_bound() {
        let geometry = geometry();
        // Natural 120 x 40 in a wide, short box: height binds
        let fit = fit_barcode(&Modules(100), 600.0, 50.0, &geometry);

        assert_close(fit.size.height, 50.0);
        assert_close(fit.size.width, 150.0);
        assert_close(fit.module_width, 1.5);
    }

    #[test]
    fn test_fit_small_natural_width_is_scaled_up() {
        let geometry = geometry();
        // Natural width below the baseline scale leaves the candidate inside the box
        let fit = fit_barcode(&Modules(50), 400.0, 100.0, &geometry);

        // 60 / 100 * 400 = 240 wide, 40 * 240 / 60 = 160 tall, then height clamp
        assert_close(fit.size.height, 100.0);
        assert_close(fit.size.width, 150.0);
    }

    #[test]
    fn test_fit_module_floor() {
        let geometry = geometry();
        // 5000 modules cannot fit 463 pt at 0.2 pt per module
        let fit = fit_barcode(&Modules(5000), 463.28, 100.0, &geometry);

        assert!(fit.floored);
        assert_eq!(fit.module_width, 0.2);
        assert_close(fit.size.width, 1000.0);
        assert!(fit.size.width > 463.28);
    }

    #[test]
    fn test_fit_code128_payload() {
        let geometry = geometry();
        let barcode = Code128::encode("SKU123|045|7|1").unwrap();
        let fit = fit_barcode(&barcode, 463.28, 100.0, &geometry);

        assert!(!fit.floored);
        assert!(fit.size.width <= 463.28 + 1e-9);
        assert!(fit.size.height <= 100.0 + 1e-9);
        assert_eq!(fit.size, barcode.bounds(fit.module_width, fit.bar_height));
    }
}
