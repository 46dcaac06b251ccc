//! End-to-end tests: CSV in, one PDF per carton out

use label::{BatchSummary, LabelBatch, LabelFonts, LabelRecord, LabelRenderer, LayoutGeometry};
use pretty_assertions::assert_eq;
use std::path::Path;

const FIXTURE_TTF: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../pdf-core/tests/fixtures/DejaVuSans.ttf"
);

fn renderer() -> LabelRenderer {
    LabelRenderer::new(LayoutGeometry::a4(), LabelFonts::builtin())
}

/// Install the fixture font as `Fonts/<file>` under `dir`
fn install_font(dir: &Path, file: &str) {
    let font_dir = dir.join(label::FONT_DIR);
    std::fs::create_dir_all(&font_dir).unwrap();
    std::fs::copy(FIXTURE_TTF, font_dir.join(file)).unwrap();
}

/// (BaseFont, Subtype) of every font resource on the single page
fn page_fonts(pdf: &[u8]) -> Vec<(String, String)> {
    let doc = lopdf::Document::load_mem(pdf).expect("Failed to load label");
    let page_id = doc.get_pages()[&1];
    let fonts = doc
        .get_dictionary(page_id)
        .and_then(|page| page.get(b"Resources"))
        .and_then(|resources| resources.as_dict())
        .and_then(|resources| resources.get(b"Font"))
        .and_then(|fonts| fonts.as_dict())
        .expect("page font resources");

    let name = |font: &lopdf::Dictionary, key: &[u8]| {
        String::from_utf8_lossy(font.get(key).unwrap().as_name().unwrap()).into_owned()
    };
    let mut fonts: Vec<(String, String)> = fonts
        .iter()
        .map(|(_, font)| doc.get_dictionary(font.as_reference().unwrap()).unwrap())
        .map(|font| (name(font, b"BaseFont"), name(font, b"Subtype")))
        .collect();
    fonts.sort();
    fonts
}

fn sample_record() -> LabelRecord {
    LabelRecord {
        company: "Acme".to_string(),
        article: "SKU123".to_string(),
        quantity: "045".to_string(),
        batch: "7".to_string(),
        order: "PO-9".to_string(),
        carton_index: 1,
    }
}

fn hex(text: &str) -> String {
    let digits: String = text.chars().map(|c| format!("{:02X}", c as u32)).collect();
    format!("<{digits}>")
}

fn page_content(path: &Path) -> String {
    let doc = lopdf::Document::load(path).expect("Failed to load label");
    let pages = doc.get_pages();
    assert_eq!(pages.len(), 1);
    let content = doc.get_page_content(pages[&1]).expect("page content");
    String::from_utf8_lossy(&content).into_owned()
}

fn generate(csv: &str, out: &Path) -> BatchSummary {
    let renderer = renderer();
    let batch = LabelBatch::from_reader(csv.as_bytes()).expect("Failed to parse CSV");
    batch
        .run(|record| renderer.write_to(out, record).map(|_| ()))
        .expect("Failed to generate labels")
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_two_cartons_from_one_row() {
    let out = tempfile::tempdir().unwrap();
    let csv = "Company;Artikel;Quantity;Chargen;Bestell;Karton\nAcme;SKU123;045;7;PO-9;2\n";

    let summary = generate(csv, out.path());
    assert_eq!(summary, BatchSummary { rows: 1, labels: 2 });

    assert_eq!(
        file_names(out.path()),
        vec![
            "Acme - Order PO-9, Batch 7, Box 1.pdf",
            "Acme - Order PO-9, Batch 7, Box 2.pdf",
        ]
    );

    for carton in [1, 2] {
        let path = out
            .path()
            .join(format!("Acme - Order PO-9, Batch 7, Box {carton}.pdf"));
        let content = page_content(&path);

        let payload = format!("SKU123|045|7|{carton}");
        assert!(content.contains(&format!("{} Tj", hex(&payload))));
        assert!(content.contains(&format!("{} Tj", hex("45"))));
        assert!(content.contains(&format!("{} Tj", hex(&carton.to_string()))));
    }
}

#[test]
fn test_blank_rows_and_aliases() {
    let out = tempfile::tempdir().unwrap();
    let csv = "\n;;\nFirma;Artikel-Nr;Stückzahl;Chargen-Nr;Bestell-Nr;Karton-Nr\n \n\
               Acme;A-1;12;B;;1\n;;;;;\nAcme;A-2;003;B;;abc\n";

    let summary = generate(csv, out.path());
    assert_eq!(summary, BatchSummary { rows: 2, labels: 2 });

    // Both rows share company, order and batch: the later label overwrites
    assert_eq!(
        file_names(out.path()),
        vec!["Acme - Order NoOrderNo, Batch B, Box 1.pdf"]
    );
    let content = page_content(&out.path().join("Acme - Order NoOrderNo, Batch B, Box 1.pdf"));
    assert!(content.contains(&format!("{} Tj", hex("A-2|003|B|1"))));
    assert!(content.contains(&format!("{} Tj", hex("3"))));
}

#[test]
fn test_latin1_article_does_not_stop_the_batch() {
    let out = tempfile::tempdir().unwrap();
    let csv = "Company;Artikel;Stückzahl;Chargen;Bestell;Karton\n\
               Acme;SKU1;1;1;PO;1\nAcme;Müsli;2;2;PO;1\nAcme;SKU3;3;3;PO;1\n";

    let summary = generate(csv, out.path());
    assert_eq!(summary, BatchSummary { rows: 3, labels: 3 });
    assert_eq!(
        file_names(out.path()),
        vec![
            "Acme - Order PO, Batch 1, Box 1.pdf",
            "Acme - Order PO, Batch 2, Box 1.pdf",
            "Acme - Order PO, Batch 3, Box 1.pdf",
        ]
    );

    let content = page_content(&out.path().join("Acme - Order PO, Batch 2, Box 1.pdf"));
    assert!(content.contains(&format!("{} Tj", hex("Müsli|2|2|1"))));
}

#[test]
fn test_header_only_file() {
    let out = tempfile::tempdir().unwrap();
    let summary = generate("Company;Artikel\n\n", out.path());

    assert_eq!(summary, BatchSummary::default());
    assert!(file_names(out.path()).is_empty());
}

#[test]
fn test_missing_columns_use_defaults() {
    let out = tempfile::tempdir().unwrap();
    let summary = generate("Artikel\nSKU9\n", out.path());
    assert_eq!(summary.labels, 1);

    let path = out
        .path()
        .join("COMPANY_NAME - Order NoOrderNo, Batch 1, Box 1.pdf");
    let content = page_content(&path);
    assert!(content.contains(&format!("{} Tj", hex("COMPANY_NAME"))));
    assert!(content.contains(&format!("{} Tj", hex("SKU9|0|1|1"))));
}

#[test]
fn test_from_path() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("input.csv");
    std::fs::write(&csv_path, "Artikel;Karton\nSKU1;2\n").unwrap();

    let batch = LabelBatch::from_path(&csv_path).unwrap();
    assert_eq!(batch.rows().len(), 1);
    assert_eq!(batch.run(|_| Ok(())).unwrap().labels, 2);
}

#[test]
fn test_custom_regular_font_serves_both_weights() {
    let dir = tempfile::tempdir().unwrap();
    install_font(dir.path(), "Helvetica.ttf");

    let fonts = LabelFonts::load(dir.path()).unwrap().expect("custom fonts");
    assert!(fonts.is_custom());

    let renderer = LabelRenderer::new(LayoutGeometry::a4(), fonts);
    let pdf = renderer.render(&sample_record()).unwrap();
    assert_eq!(
        page_fonts(&pdf),
        vec![("HelveticaCustom".to_string(), "Type0".to_string())]
    );
}

#[test]
fn test_custom_bold_font_pairs_with_builtin_regular() {
    let dir = tempfile::tempdir().unwrap();
    install_font(dir.path(), "Helvetica-Bold.ttf");

    let fonts = LabelFonts::resolve(dir.path());
    assert!(fonts.is_custom());

    let renderer = LabelRenderer::new(LayoutGeometry::a4(), fonts);
    let pdf = renderer.render(&sample_record()).unwrap();
    assert_eq!(
        page_fonts(&pdf),
        vec![
            ("Helvetica".to_string(), "Type1".to_string()),
            ("HelveticaCustom-Bold".to_string(), "Type0".to_string()),
        ]
    );
}

#[test]
fn test_custom_fonts_found_in_second_search_directory() {
    let empty = tempfile::tempdir().unwrap();
    let with_fonts = tempfile::tempdir().unwrap();
    install_font(with_fonts.path(), "Helvetica.ttf");
    install_font(with_fonts.path(), "Helvetica-Bold.ttf");

    let fonts = LabelFonts::resolve_from(&[
        empty.path().to_path_buf(),
        with_fonts.path().to_path_buf(),
    ]);

    let renderer = LabelRenderer::new(LayoutGeometry::a4(), fonts);
    let pdf = renderer.render(&sample_record()).unwrap();
    assert_eq!(
        page_fonts(&pdf),
        vec![
            ("HelveticaCustom".to_string(), "Type0".to_string()),
            ("HelveticaCustom-Bold".to_string(), "Type0".to_string()),
        ]
    );
}
