//! CSV batch driver
//!
//! Input is semicolon separated with `"` quotes. Rows whose cells are all
//! blank are ignored; the first remaining row is the header and the rest are
//! data rows. Each data row expands into one label record per carton.

use crate::{LabelRecord, Result};
use label_text::{sanitize_numeric_keep_zeros, ColumnMap, Field};
use std::io::Read;
use std::path::Path;
use tracing::debug;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parsed CSV input
#[derive(Debug, Clone, Default)]
pub struct LabelBatch {
    header: Option<Vec<String>>,
    columns: ColumnMap,
    rows: Vec<Vec<String>>,
}

/// Counts of a finished batch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Data rows processed
    pub rows: usize,
    /// Labels produced
    pub labels: usize,
}

/// Number of cartons in a raw carton cell
///
/// Non-digits are dropped; anything that does not give a number of at least
/// one counts as a single carton.
pub fn carton_total(raw: &str) -> u32 {
    sanitize_numeric_keep_zeros(Some(raw), Field::Carton.default_value())
        .parse::<u32>()
        .map_or(1, |total| total.max(1))
}

impl LabelBatch {
    /// Parse CSV from a reader
    ///
    /// A leading UTF-8 byte order mark is skipped and invalid UTF-8 is
    /// replaced rather than rejected.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        let data = data.strip_prefix(UTF8_BOM).unwrap_or(&data);

        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .quote(b'"')
            .has_headers(false)
            .flexible(true)
            .from_reader(data);

        let mut batch = Self::default();
        for record in csv_reader.byte_records() {
            let record = record?;
            let cells: Vec<String> = record
                .iter()
                .map(|cell| String::from_utf8_lossy(cell).into_owned())
                .collect();

            if cells.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }

            if batch.header.is_none() {
                batch.columns = ColumnMap::from_header(&cells);
                debug!(header = ?cells, columns = ?batch.columns, "header resolved");
                batch.header = Some(cells);
            } else {
                batch.rows.push(cells);
            }
        }

        Ok(batch)
    }

    /// Parse a CSV file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// The header row, if the input had any non-blank row
    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    /// Data rows, blank rows excluded
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Hand every carton of every data row to `sink`, in input order and
    /// ascending carton number
    ///
    /// The first error from `sink` stops the run.
    pub fn run<F>(&self, mut sink: F) -> Result<BatchSummary>
    where
        F: FnMut(&LabelRecord) -> Result<()>,
    {
        let mut summary = BatchSummary::default();

        for row in &self.rows {
            let total = carton_total(self.columns.get(row, Field::Carton));
            debug!(row = summary.rows + 1, cartons = total, "expanding row");

            for carton_index in 1..=total {
                let record = LabelRecord::from_row(&self.columns, row, carton_index);
                sink(&record)?;
                summary.labels += 1;
            }
            summary.rows += 1;
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HEADER: &str = "Company;Artikel;Quantity;Chargen;Bestell;Karton\n";

    fn collect(batch: &LabelBatch) -> Vec<LabelRecord> {
        let mut records = Vec::new();
        batch
            .run(|record| {
                records.push(record.clone());
                Ok(())
            })
            .unwrap();
        records
    }

    #[test]
    fn test_carton_total() {
        assert_eq!(carton_total("3"), 3);
        assert_eq!(carton_total("003"), 3);
        assert_eq!(carton_total(" 2 boxes"), 2);
        assert_eq!(carton_total("abc"), 1);
        assert_eq!(carton_total("0"), 1);
        assert_eq!(carton_total(""), 1);
        assert_eq!(carton_total("99999999999999"), 1);
    }

    #[test]
    fn test_carton_expansion() {
        let csv = format!("{HEADER}Acme;SKU1;10;B1;PO-1;3\n");
        let batch = LabelBatch::from_reader(csv.as_bytes()).unwrap();
        let records = collect(&batch);

        let indices: Vec<u32> = records.iter().map(|r| r.carton_index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
        for record in &records {
            assert_eq!(
                LabelRecord {
                    carton_index: 1,
                    ..record.clone()
                },
                records[0]
            );
        }
    }

    #[test]
    fn test_invalid_carton_counts_yield_one_label() {
        for carton in ["abc", "0", ""] {
            let csv = format!("{HEADER}Acme;SKU1;10;B1;PO-1;{carton}\n");
            let batch = LabelBatch::from_reader(csv.as_bytes()).unwrap();
            let records = collect(&batch);
            assert_eq!(records.len(), 1, "carton {carton:?}");
            assert_eq!(records[0].carton_index, 1);
        }
    }

    #[test]
    fn test_blank_rows_skipped() {
        let csv = format!("\n ; ;\n{HEADER}\n;;;;;\n\"  \";\"\"\nAcme;SKU1;10;B1;PO-1;1\n\n");
        let batch = LabelBatch::from_reader(csv.as_bytes()).unwrap();

        assert_eq!(batch.header().unwrap()[0], "Company");
        assert_eq!(batch.rows().len(), 1);

        let summary = batch.run(|_| Ok(())).unwrap();
        assert_eq!(summary, BatchSummary { rows: 1, labels: 1 });
    }

    #[test]
    fn test_first_row_is_header_whatever_its_content() {
        let csv = "Acme;SKU1;10\nAcme;SKU2;20\n";
        let batch = LabelBatch::from_reader(csv.as_bytes()).unwrap();

        assert_eq!(batch.header().unwrap(), &["Acme", "SKU1", "10"]);
        assert_eq!(batch.rows().len(), 1);
    }

    #[test]
    fn test_bom_and_quotes() {
        let csv = "\u{FEFF}Company;Artikel;Quantity\n\"Acme; Inc\";\"SKU \"\"X\"\"\";5\n";
        let batch = LabelBatch::from_reader(csv.as_bytes()).unwrap();

        assert_eq!(batch.columns().index(Field::Company), Some(0));
        let records = collect(&batch);
        assert_eq!(records[0].company, "Acme; Inc");
        assert_eq!(records[0].article, "SKU \"X\"");
        assert_eq!(records[0].quantity, "5");
    }

    #[test]
    fn test_short_rows_use_defaults() {
        let csv = format!("{HEADER}Acme;SKU1\n");
        let batch = LabelBatch::from_reader(csv.as_bytes()).unwrap();
        let records = collect(&batch);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].quantity, "0");
        assert_eq!(records[0].batch, "1");
        assert_eq!(records[0].order, "");
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut csv = HEADER.as_bytes().to_vec();
        csv.extend_from_slice(b"Acme;SKU\xFF;1;1;;1\n");
        let batch = LabelBatch::from_reader(csv.as_slice()).unwrap();
        let records = collect(&batch);
        assert_eq!(records[0].article, "SKU\u{FFFD}");
    }

    #[test]
    fn test_empty_input() {
        let batch = LabelBatch::from_reader("".as_bytes()).unwrap();
        assert!(batch.header().is_none());
        assert_eq!(batch.run(|_| Ok(())).unwrap(), BatchSummary::default());
    }

    #[test]
    fn test_sink_error_stops_run() {
        let csv = format!("{HEADER}Acme;SKU1;10;B1;PO-1;3\n");
        let batch = LabelBatch::from_reader(csv.as_bytes()).unwrap();

        let mut calls = 0;
        let result = batch.run(|_| {
            calls += 1;
            Err(std::io::Error::other("disk full").into())
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }
}
