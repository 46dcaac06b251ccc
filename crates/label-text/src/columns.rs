//! Header matching
//!
//! Maps CSV header cells onto the fixed set of label fields. Each field has an
//! ordered list of patterns that are tested against every normalized header
//! cell, in header order; the first matching cell wins.

use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Logical label field read from a CSV row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Company,
    Article,
    Quantity,
    Batch,
    Order,
    Carton,
}

impl Field {
    /// All fields, in resolution order
    pub const ALL: [Field; 6] = [
        Field::Company,
        Field::Article,
        Field::Quantity,
        Field::Batch,
        Field::Order,
        Field::Carton,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Field::Company => "company",
            Field::Article => "article",
            Field::Quantity => "quantity",
            Field::Batch => "batch",
            Field::Order => "order",
            Field::Carton => "carton",
        }
    }

    /// Raw value used when the column is missing from the file
    pub fn default_value(&self) -> &'static str {
        match self {
            Field::Company => "COMPANY_NAME",
            Field::Article => "",
            Field::Quantity => "0",
            Field::Batch => "1",
            Field::Order => "",
            Field::Carton => "1",
        }
    }

    /// Header patterns, matched against normalized header text
    fn patterns(&self) -> &'static [&'static str] {
        match self {
            Field::Company => &[r"\bcompany\b", r"\bfirma\b", r"\bunternehmen\b"],
            Field::Article => &[
                r"artikel",
                r"item\s*no",
                r"article\s*no",
                r"\bsku\b",
                r"\bitem\b",
                r"\barticle\b",
            ],
            Field::Quantity => &[r"stuckzahl", r"stueckzahl", r"quantity", r"qty", r"menge"],
            Field::Batch => &[r"chargen", r"batch"],
            Field::Order => &[r"bestell", r"order"],
            Field::Carton => &[r"karton", r"carton"],
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// Compiled patterns for every field, indexed like `Field::ALL`
fn field_patterns() -> &'static [Vec<Regex>] {
    static PATTERNS: OnceLock<Vec<Vec<Regex>>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        Field::ALL
            .iter()
            .map(|field| {
                field
                    .patterns()
                    .iter()
                    .map(|p| Regex::new(p).unwrap())
                    .collect()
            })
            .collect()
    })
}

/// Lowercase, decompose (NFKD) and drop combining marks
///
/// "Stückzahl" and "STÜCKZAHL" both become "stuckzahl".
pub fn normalize_for_match(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// Column position of each label field, resolved once from the header row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnMap {
    indices: [Option<usize>; 6],
}

impl ColumnMap {
    /// Resolve field columns from a header row
    pub fn from_header<S: AsRef<str>>(header: &[S]) -> Self {
        let normalized: Vec<String> = header
            .iter()
            .map(|cell| normalize_for_match(cell.as_ref()))
            .collect();

        let mut indices = [None; 6];
        for (field, patterns) in Field::ALL.iter().zip(field_patterns()) {
            indices[field.index()] = normalized
                .iter()
                .position(|cell| patterns.iter().any(|p| p.is_match(cell)));
        }

        Self { indices }
    }

    /// Column index of a field, if the header has one
    pub fn index(&self, field: Field) -> Option<usize> {
        self.indices[field.index()]
    }

    /// Raw cell for a field, or the field's default when the column is
    /// missing or the row is too short
    pub fn get<'a, S: AsRef<str>>(&self, row: &'a [S], field: Field) -> &'a str {
        self.index(field)
            .and_then(|i| row.get(i))
            .map(|cell| cell.as_ref())
            .unwrap_or(field.default_value())
    }
}
