//! Adapter for the external HTML-to-PDF renderer

use crate::MirrorError;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Renders staged HTML files through an external program
///
/// The program is called as `<program> [--key [value]]... <input> <output>`,
/// the calling convention of `wkhtmltopdf`.
#[derive(Debug, Clone)]
pub struct PdfRenderer {
    program: String,
    options: BTreeMap<String, String>,
}

impl PdfRenderer {
    pub fn new(program: impl Into<String>, options: BTreeMap<String, String>) -> Self {
        Self {
            program: program.into(),
            options,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Command-line arguments for one conversion
    ///
    /// Options come first in key order; an empty value yields a bare flag.
    pub fn build_args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        let mut args = Vec::with_capacity(self.options.len() * 2 + 2);

        for (key, value) in &self.options {
            args.push(OsString::from(format!("--{}", key)));
            if !value.is_empty() {
                args.push(OsString::from(value));
            }
        }

        args.push(input.as_os_str().to_os_string());
        args.push(output.as_os_str().to_os_string());
        args
    }

    /// Renders one HTML file to PDF
    pub async fn render(&self, input: &Path, output: &Path) -> Result<(), MirrorError> {
        let render_error = |message: String| MirrorError::Render {
            file: input.to_path_buf(),
            message,
        };

        let result = Command::new(&self.program)
            .args(self.build_args(input, output))
            .output()
            .await
            .map_err(|e| render_error(format!("failed to execute {}: {}", self.program, e)))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let code = result
                .status
                .code()
                .map_or_else(|| "signal".to_string(), |c| c.to_string());
            return Err(render_error(format!(
                "{} exited with {}: {}",
                self.program,
                code,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

/// Outcome of rendering a staging directory
#[derive(Debug, Default, Clone)]
pub struct RenderReport {
    pub rendered: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

/// Renders every `*.html` file directly inside `staging_dir` into `pdf_dir`
///
/// Files are processed in name order. A failing file is logged and recorded;
/// the remaining files are still rendered.
pub async fn render_directory(
    renderer: &PdfRenderer,
    staging_dir: &Path,
    pdf_dir: &Path,
) -> Result<RenderReport, MirrorError> {
    tokio::fs::create_dir_all(pdf_dir).await?;

    let mut inputs = Vec::new();
    let mut entries = tokio::fs::read_dir(staging_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if entry.file_type().await?.is_file()
            && path.extension().and_then(|ext| ext.to_str()) == Some("html")
        {
            inputs.push(path);
        }
    }
    inputs.sort();

    let mut report = RenderReport::default();
    for input in inputs {
        let output = pdf_dir.join(input.with_extension("pdf").file_name().unwrap_or_default());

        match renderer.render(&input, &output).await {
            Ok(()) => {
                tracing::info!("Rendered {}", output.display());
                report.rendered.push(output);
            }
            Err(e) => {
                tracing::error!("{}", e);
                report.failed.push(input);
            }
        }
    }

    Ok(report)
}
