//! Per-pass crawl behavior

use std::fmt;
use std::path::{Path, PathBuf};

/// Font forced onto code blocks when the PDF renderer needs it
const PDF_CODE_FONT: &str = "Liberation Mono";

/// Which output a crawl pass produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Linked offline HTML tree
    Html,
    /// Print-oriented pages handed to the PDF renderer
    Pdf,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Html => write!(f, "html"),
            Self::Pdf => write!(f, "pdf"),
        }
    }
}

/// Behavior switches of one crawl pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlPolicy {
    pub mode: Mode,
    /// Directory receiving pages, `imgs/` and `styles/`
    pub output_dir: PathBuf,
    /// Every link becomes absolute; nothing is rewritten to a local file
    pub absolutize_links: bool,
    /// Discovered manual pages are scheduled
    pub follow_links: bool,
    /// Configured excluded pages are never fetched in this pass
    pub honor_exclusions: bool,
    /// Tables are replaced by their cell contents
    pub flatten_tables: bool,
    /// Math SVGs are converted to PNG
    pub rasterize_math: bool,
    /// `tocnumber` spans are unwrapped
    pub unwrap_toc_numbers: bool,
    /// The printable variant is saved under the manual root's name
    pub rename_printable: bool,
    /// Font family forced onto `pre` blocks
    pub code_font: Option<String>,
}

impl CrawlPolicy {
    /// Policy for the linked offline HTML tree
    pub fn html(output_dir: PathBuf) -> Self {
        Self {
            mode: Mode::Html,
            output_dir,
            absolutize_links: false,
            follow_links: true,
            honor_exclusions: true,
            flatten_tables: false,
            rasterize_math: false,
            unwrap_toc_numbers: false,
            rename_printable: false,
            code_font: None,
        }
    }

    /// Policy for the PDF staging tree
    ///
    /// Seeds are fetched even when the HTML tree excludes them, since the
    /// printable variant is usually both.
    ///
    /// `renderer_workarounds` enables the fixes for renderers that draw SVG
    /// and default monospace fonts badly: math is rasterized and code blocks
    /// get an explicit font.
    pub fn pdf(output_dir: PathBuf, renderer_workarounds: bool) -> Self {
        Self {
            mode: Mode::Pdf,
            output_dir,
            absolutize_links: true,
            follow_links: false,
            honor_exclusions: false,
            flatten_tables: true,
            rasterize_math: renderer_workarounds,
            unwrap_toc_numbers: true,
            rename_printable: true,
            code_font: renderer_workarounds.then(|| PDF_CODE_FONT.to_string()),
        }
    }

    pub fn images_dir(&self) -> PathBuf {
        self.output_dir.join("imgs")
    }

    pub fn maths_dir(&self) -> PathBuf {
        self.output_dir.join("imgs").join("maths")
    }

    pub fn styles_dir(&self) -> PathBuf {
        self.output_dir.join("styles")
    }

    /// Path of the shared stylesheet inside this pass's tree
    pub fn stylesheet_path(&self) -> PathBuf {
        self.styles_dir().join("style.css")
    }

    /// Where a page file named `file_name` is written
    pub fn page_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }

    /// Resolves a path relative to the output directory
    pub fn resolve(&self, relative: &Path) -> PathBuf {
        self.output_dir.join(relative)
    }
}
