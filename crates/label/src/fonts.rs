//! Label font resolution
//!
//! Custom TrueType fonts are looked up under `Fonts/` next to the program.
//! Whatever is missing falls back to the built-in Helvetica pair; a font that
//! is present but unreadable downgrades both weights to the built-ins.

use crate::{LabelError, Result};
use pdf_core::{BuiltinFont, FontData, FontFamily};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Directory holding custom fonts, relative to a search directory
pub const FONT_DIR: &str = "Fonts";
const REGULAR_FILE: &str = "Helvetica.ttf";
const BOLD_FILE: &str = "Helvetica-Bold.ttf";

/// Names custom fonts are registered under
const CUSTOM_REGULAR: &str = "HelveticaCustom";
const CUSTOM_BOLD: &str = "HelveticaCustom-Bold";

/// Regular and bold fonts used for every label of a run
#[derive(Debug, Clone)]
pub struct LabelFonts {
    family: FontFamily,
}

impl LabelFonts {
    /// The built-in Helvetica / Helvetica-Bold pair
    pub fn builtin() -> Self {
        Self {
            family: FontFamily::builtin_helvetica(),
        }
    }

    /// Load custom fonts from `<dir>/Fonts`
    ///
    /// Returns `None` when neither font file exists. A custom regular font
    /// without a custom bold is used for both weights.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Option<Self>> {
        let font_dir = dir.as_ref().join(FONT_DIR);
        let regular_path = font_dir.join(REGULAR_FILE);
        let bold_path = font_dir.join(BOLD_FILE);

        if !regular_path.is_file() && !bold_path.is_file() {
            return Ok(None);
        }

        let regular = if regular_path.is_file() {
            Some(load_ttf(CUSTOM_REGULAR, &regular_path)?)
        } else {
            None
        };
        let bold = if bold_path.is_file() {
            Some(load_ttf(CUSTOM_BOLD, &bold_path)?)
        } else {
            None
        };

        let family = match (regular, bold) {
            (Some(regular), bold) => FontFamily::new(regular, bold),
            (None, bold) => FontFamily::new(FontData::builtin(BuiltinFont::Helvetica), bold),
        };

        Ok(Some(Self { family }))
    }

    /// Fonts from the first directory that has any, else the built-ins
    ///
    /// Load failures are logged and fall back to the built-ins.
    pub fn resolve_from(dirs: &[PathBuf]) -> Self {
        for dir in dirs {
            match Self::load(dir) {
                Ok(Some(fonts)) => {
                    debug!(dir = %dir.display(), "using custom fonts");
                    return fonts;
                }
                Ok(None) => continue,
                Err(e) => {
                    warn!(dir = %dir.display(), "{e}; falling back to built-in Helvetica");
                    return Self::builtin();
                }
            }
        }

        debug!("no custom fonts found, using built-in Helvetica");
        Self::builtin()
    }

    /// [`LabelFonts::resolve_from`] for a single directory
    pub fn resolve<P: AsRef<Path>>(dir: P) -> Self {
        Self::resolve_from(&[dir.as_ref().to_path_buf()])
    }

    pub fn family(&self) -> &FontFamily {
        &self.family
    }

    /// Whether any custom font is in use
    pub fn is_custom(&self) -> bool {
        self.family.variants().any(|font| !font.is_builtin())
    }
}

impl Default for LabelFonts {
    fn default() -> Self {
        Self::builtin()
    }
}

fn load_ttf(name: &str, path: &Path) -> Result<FontData> {
    let data = std::fs::read(path).map_err(|e| {
        LabelError::FontError(format!("Failed to read font {}: {}", path.display(), e))
    })?;
    Ok(FontData::from_ttf(name, &data)?)
}
