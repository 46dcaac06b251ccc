//! Code128 barcode symbology
//!
//! Encodes ASCII and Latin-1 payloads into Code128 symbol values, choosing
//! between code sets A, B and C so that runs of digits are packed two per
//! symbol. The
//! result is a sequence of bar/space widths in modules; the document draws
//! the bars.

use crate::{PdfError, Result};

/// Quiet zone on each side of the symbol, in modules
pub const QUIET_ZONE_MODULES: u32 = 10;

/// Bar/space widths (in modules) for symbol values 0..=105, bars first
const PATTERNS: [&[u8; 6]; 106] = [
    b"212222", b"222122", b"222221", b"121223", b"121322", b"131222", b"122213", b"122312",
    b"132212", b"221213", b"221312", b"231212", b"112232", b"122132", b"122231", b"113222",
    b"123122", b"123221", b"223211", b"221132", b"221231", b"213212", b"223112", b"312131",
    b"311222", b"321122", b"321221", b"312212", b"322112", b"322211", b"212123", b"212321",
    b"232121", b"111323", b"131123", b"131321", b"112313", b"132113", b"132311", b"211313",
    b"231113", b"231311", b"112133", b"112331", b"132131", b"113123", b"113321", b"133121",
    b"313121", b"211331", b"231131", b"213113", b"213311", b"213131", b"311123", b"311321",
    b"331121", b"312113", b"312311", b"332111", b"314111", b"221411", b"431111", b"111224",
    b"111422", b"121124", b"121421", b"141122", b"141221", b"112214", b"112412", b"122114",
    b"122411", b"142112", b"142211", b"241211", b"221114", b"413111", b"241112", b"134111",
    b"111242", b"121142", b"121241", b"114212", b"124112", b"124211", b"411212", b"421112",
    b"421211", b"212141", b"214121", b"412121", b"111143", b"111341", b"131141", b"114113",
    b"114311", b"411113", b"411311", b"113141", b"114131", b"311141", b"411131", b"211412",
    b"211214", b"211232",
];

/// Stop pattern including the final termination bar
const STOP_PATTERN: &[u8; 7] = b"2331112";

const START_A: u8 = 103;
const START_B: u8 = 104;
const START_C: u8 = 105;
const SWITCH_C: u8 = 99;
const SWITCH_B: u8 = 100;
const SWITCH_A: u8 = 101;
/// FNC4 shares its value with the switch to the other of sets A and B
const FNC4_A: u8 = 101;
const FNC4_B: u8 = 100;

/// Digit runs at least this long are packed with code set C
const MIN_CODE_C_RUN: usize = 4;

/// Rendered bounding box of a barcode, in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarcodeSize {
    pub width: f64,
    pub height: f64,
}

/// A one-dimensional symbology whose rendered size follows from the
/// module width and the bar height alone
pub trait LinearBarcode {
    /// Bounding box of the symbol rendered with the given parameters
    fn bounds(&self, module_width: f64, bar_height: f64) -> BarcodeSize;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CodeSet {
    A,
    B,
    C,
}

/// An encoded Code128 symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code128 {
    payload: String,
    /// Symbol values from the start code through the checksum
    values: Vec<u8>,
}

impl Code128 {
    /// Encode a payload
    ///
    /// Latin-1 characters above U+007F are written as FNC4 followed by the
    /// character's low seven bits. Anything beyond U+00FF is an error.
    pub fn encode(payload: &str) -> Result<Self> {
        let bytes = payload
            .chars()
            .map(|c| {
                u8::try_from(u32::from(c)).map_err(|_| {
                    PdfError::Barcode(format!("character {c:?} cannot be encoded in Code128"))
                })
            })
            .collect::<Result<Vec<u8>>>()?;
        let bytes = bytes.as_slice();
        let mut values = Vec::with_capacity(bytes.len() * 2 + 3);

        let leading_digits = digit_run(bytes, 0);
        let mut set = if (leading_digits >= MIN_CODE_C_RUN && leading_digits % 2 == 0)
            || (leading_digits == 2 && bytes.len() == 2)
        {
            values.push(START_C);
            CodeSet::C
        } else if bytes.first().is_some_and(|&b| b & 0x7F < 0x20) {
            values.push(START_A);
            CodeSet::A
        } else {
            values.push(START_B);
            CodeSet::B
        };

        let mut i = 0;
        while i < bytes.len() {
            let run = digit_run(bytes, i);

            if set == CodeSet::C {
                if run >= 2 {
                    values.push((bytes[i] - b'0') * 10 + (bytes[i + 1] - b'0'));
                    i += 2;
                    continue;
                }
                set = if bytes[i] & 0x7F < 0x20 {
                    values.push(SWITCH_A);
                    CodeSet::A
                } else {
                    values.push(SWITCH_B);
                    CodeSet::B
                };
                continue;
            }

            if run >= MIN_CODE_C_RUN {
                // Odd runs keep their first digit in the current set
                if run % 2 == 1 {
                    values.push(value_in_set(bytes[i], set));
                    i += 1;
                }
                values.push(SWITCH_C);
                set = CodeSet::C;
                continue;
            }

            let b = bytes[i];
            let low = b & 0x7F;
            match set {
                CodeSet::B if low < 0x20 => {
                    values.push(SWITCH_A);
                    set = CodeSet::A;
                }
                CodeSet::A if low >= 0x60 => {
                    values.push(SWITCH_B);
                    set = CodeSet::B;
                }
                _ => {}
            }
            if b >= 0x80 {
                values.push(if set == CodeSet::A { FNC4_A } else { FNC4_B });
            }
            values.push(value_in_set(low, set));
            i += 1;
        }

        values.push(checksum(&values));

        Ok(Self {
            payload: payload.to_string(),
            values,
        })
    }

    /// The encoded text
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Symbol values from the start code through the checksum
    pub fn values(&self) -> &[u8] {
        &self.values
    }

    /// Bar and space widths in modules, alternating and starting with a bar
    pub fn element_widths(&self) -> Vec<u8> {
        self.values
            .iter()
            .flat_map(|&v| PATTERNS[v as usize].iter())
            .chain(STOP_PATTERN.iter())
            .map(|digit| digit - b'0')
            .collect()
    }

    /// Total symbol width in modules, excluding quiet zones
    pub fn module_count(&self) -> u32 {
        self.values.len() as u32 * 11 + 13
    }

    /// Bars as (offset, width) pairs in modules, measured from the start of
    /// the left quiet zone
    pub fn bars(&self) -> Vec<(u32, u32)> {
        let mut bars = Vec::new();
        let mut offset = QUIET_ZONE_MODULES;
        for (index, width) in self.element_widths().into_iter().enumerate() {
            let width = width as u32;
            if index % 2 == 0 {
                bars.push((offset, width));
            }
            offset += width;
        }
        bars
    }
}

impl LinearBarcode for Code128 {
    fn bounds(&self, module_width: f64, bar_height: f64) -> BarcodeSize {
        let modules = self.module_count() + 2 * QUIET_ZONE_MODULES;
        BarcodeSize {
            width: modules as f64 * module_width,
            height: bar_height,
        }
    }
}

/// Number of consecutive ASCII digits starting at `start`
fn digit_run(bytes: &[u8], start: usize) -> usize {
    bytes[start.min(bytes.len())..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count()
}

fn value_in_set(b: u8, set: CodeSet) -> u8 {
    match set {
        CodeSet::A if b < 0x20 => b + 64,
        _ => b - 0x20,
    }
}

/// Modulo-103 checksum: the start value plus each data value weighted by position
fn checksum(values: &[u8]) -> u8 {
    let sum: u32 = values
        .iter()
        .enumerate()
        .map(|(position, &v)| position.max(1) as u32 * v as u32)
        .sum();
    (sum % 103) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_patterns_are_eleven_modules() {
        for (value, pattern) in PATTERNS.iter().enumerate() {
            let total: u32 = pattern.iter().map(|d| (d - b'0') as u32).sum();
            assert_eq!(total, 11, "pattern for value {value}");
        }
        let stop: u32 = STOP_PATTERN.iter().map(|d| (d - b'0') as u32).sum();
        assert_eq!(stop, 13);
    }

    #[test]
    fn test_encode_code_b() {
        // Classic reference: "PJJ123C" in set B
        let code = Code128::encode("PJJ123C").unwrap();
        let values = code.values();
        assert_eq!(values[0], START_B);
        assert_eq!(&values[1..8], &[48, 42, 42, 17, 18, 19, 35]);
        // 104 + 48 + 84 + 126 + 68 + 90 + 114 + 245 = 879; 879 % 103 = 55
        assert_eq!(values[8], 55);
    }

    #[test]
    fn test_encode_all_digits_uses_code_c() {
        let code = Code128::encode("123456").unwrap();
        assert_eq!(code.values()[0], START_C);
        assert_eq!(&code.values()[1..4], &[12, 34, 56]);
        // 105 + 12*1 + 34*2 + 56*3 = 353; 353 % 103 = 44
        assert_eq!(code.values()[4], 44);
    }

    #[test]
    fn test_encode_switches_to_c_for_long_runs() {
        let code = Code128::encode("AB12345").unwrap();
        let values = code.values();
        // A, B, odd run keeps "1" in set B, then C packs "23" and "45"
        assert_eq!(values[0], START_B);
        assert_eq!(&values[1..4], &[33, 34, 17]);
        assert_eq!(values[4], SWITCH_C);
        assert_eq!(&values[5..7], &[23, 45]);
        assert_eq!(values.len(), 8);
    }

    #[test]
    fn test_encode_switches_back_from_c() {
        let code = Code128::encode("1234|X").unwrap();
        let values = code.values();
        assert_eq!(values[0], START_C);
        assert_eq!(&values[1..3], &[12, 34]);
        assert_eq!(values[3], SWITCH_B);
        assert_eq!(values[4], b'|' - 0x20);
        assert_eq!(values[5], b'X' - 0x20);
    }

    #[test]
    fn test_encode_short_digit_runs_stay_in_b() {
        let code = Code128::encode("SKU123|045|7|1").unwrap();
        assert_eq!(code.values()[0], START_B);
        assert!(!code.values()[1..].contains(&SWITCH_C));
        // start + 14 data + checksum
        assert_eq!(code.values().len(), 16);
    }

    #[test]
    fn test_encode_control_characters_use_code_a() {
        let code = Code128::encode("\tA").unwrap();
        assert_eq!(code.values()[0], START_A);
        assert_eq!(code.values()[1], b'\t' + 64);
    }

    #[test]
    fn test_encode_latin1_uses_fnc4() {
        let code = Code128::encode("Mü").unwrap();
        let values = code.values();
        assert_eq!(values[0], START_B);
        assert_eq!(values[1], b'M' - 0x20);
        // U+00FC is FNC4 followed by U+007C
        assert_eq!(values[2], FNC4_B);
        assert_eq!(values[3], b'|' - 0x20);
        // 104 + 45*1 + 100*2 + 92*3 = 625; 625 % 103 = 7
        assert_eq!(values[4], 7);
        assert_eq!(values.len(), 5);
    }

    #[test]
    fn test_encode_latin1_control_range_uses_code_a() {
        // U+0085 maps to the control character U+0005
        let code = Code128::encode("A\u{85}").unwrap();
        let values = code.values();
        assert_eq!(values[0], START_B);
        assert_eq!(&values[1..5], &[33, SWITCH_A, FNC4_A, 5 + 64]);
    }

    #[test]
    fn test_encode_latin1_after_digits_leaves_code_c() {
        let code = Code128::encode("1234é").unwrap();
        let values = code.values();
        assert_eq!(values[0], START_C);
        assert_eq!(&values[1..3], &[12, 34]);
        // U+00E9 is FNC4 followed by 'i'
        assert_eq!(&values[3..6], &[SWITCH_B, FNC4_B, b'i' - 0x20]);
    }

    #[test]
    fn test_encode_rejects_beyond_latin1() {
        let result = Code128::encode("Ωmega");
        assert!(matches!(result, Err(PdfError::Barcode(_))));
        assert!(Code128::encode("€").is_err());
    }

    #[test]
    fn test_module_count_matches_elements() {
        let code = Code128::encode("SKU123|045|7|1").unwrap();
        let total: u32 = code.element_widths().iter().map(|&w| w as u32).sum();
        assert_eq!(total, code.module_count());
        // Odd element count: bars at both ends
        assert_eq!(code.element_widths().len() % 2, 1);
    }

    #[test]
    fn test_bounds_linear_in_module_width() {
        let code = Code128::encode("ABC").unwrap();
        let one = code.bounds(1.0, 40.0);
        let two = code.bounds(2.0, 40.0);
        assert_eq!(two.width, one.width * 2.0);
        assert_eq!(one.height, 40.0);
        assert_eq!(
            one.width,
            (code.module_count() + 2 * QUIET_ZONE_MODULES) as f64
        );
    }

    #[test]
    fn test_bars_start_after_quiet_zone() {
        let code = Code128::encode("A").unwrap();
        let bars = code.bars();
        assert_eq!(bars[0], (QUIET_ZONE_MODULES, 2));
        let (last_offset, last_width) = *bars.last().unwrap();
        assert_eq!(
            last_offset + last_width,
            QUIET_ZONE_MODULES + code.module_count()
        );
    }

    #[test]
    fn test_empty_payload() {
        let code = Code128::encode("").unwrap();
        assert_eq!(code.values(), &[START_B, START_B % 103]);
    }
}
