use crate::error::FolioError;
use crate::options::RenderOptions;
use folio_ast::Node;
use folio_layout::{Diagnostics, LayoutEngine, LayoutTree};
use folio_render_core::{OutputFormat, Renderer};
use folio_render_docx::DocxRenderer;
use folio_render_html::HtmlRenderer;
use folio_render_lopdf::LopdfRenderer;
use folio_traits::{MeasurementProvider, StandardFontMetrics};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Bytes of a finished document plus the warnings raised while producing them.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub format: OutputFormat,
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub diagnostics: Diagnostics,
}

/// A builder for creating a [`Pipeline`].
#[derive(Debug, Default)]
pub struct PipelineBuilder {
    options: RenderOptions,
    provider: Option<Arc<dyn MeasurementProvider>>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Parses options from JSON, e.g. `{"pageSize": "Letter", "margins": "1in"}`.
    pub fn with_options_json(mut self, json: &str) -> Result<Self, FolioError> {
        self.options = serde_json::from_str(json)?;
        Ok(self)
    }

    /// Replaces the built-in base-14 metrics, e.g. with a `TrueTypeMetrics` holding
    /// caller-supplied fonts.
    pub fn with_measurement_provider(mut self, provider: Arc<dyn MeasurementProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Validates the options and creates the `Pipeline`.
    pub fn build(self) -> Result<Pipeline, FolioError> {
        let provider = self
            .provider
            .unwrap_or_else(|| Arc::new(StandardFontMetrics) as Arc<dyn MeasurementProvider>);
        let engine = LayoutEngine::new(self.options.to_layout_config(), provider)?;
        Ok(Pipeline {
            options: self.options,
            engine,
            pdf: LopdfRenderer::new(),
            docx: DocxRenderer::new(),
            html: HtmlRenderer::new(),
        })
    }
}

/// Lays out node trees and hands the result to the backend of the requested format.
///
/// A pipeline holds no per-document state: one instance can render any number of documents,
/// from any number of threads.
#[derive(Debug, Clone)]
pub struct Pipeline {
    options: RenderOptions,
    engine: LayoutEngine,
    pdf: LopdfRenderer,
    docx: DocxRenderer,
    html: HtmlRenderer,
}

impl Pipeline {
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn renderer(&self, format: OutputFormat) -> &dyn Renderer {
        match format {
            OutputFormat::Pdf => &self.pdf,
            OutputFormat::Docx => &self.docx,
            OutputFormat::Html => &self.html,
        }
    }

    pub fn layout(&self, root: &Node) -> Result<LayoutTree, FolioError> {
        Ok(self.engine.layout_document(root)?)
    }

    pub fn render(&self, root: &Node, format: OutputFormat) -> Result<RenderOutput, FolioError> {
        let tree = self.layout(root)?;
        log::debug!(
            "Laid out {} pages with {} warnings, rendering {}",
            tree.page_count(),
            tree.diagnostics.len(),
            format
        );
        let renderer = self.renderer(format);
        debug_assert_eq!(renderer.format(), format);
        let bytes = renderer.render(&tree)?;
        Ok(RenderOutput {
            format,
            bytes,
            page_count: tree.page_count(),
            diagnostics: tree.diagnostics,
        })
    }

    /// Renders into `path`, choosing the format from its extension. The file is only
    /// written once rendering has succeeded.
    pub fn render_to_file<P: AsRef<Path>>(&self, root: &Node, path: P) -> Result<RenderOutput, FolioError> {
        let path = path.as_ref();
        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");
        let format = OutputFormat::from_extension(extension)
            .ok_or_else(|| FolioError::UnsupportedFormat(path.display().to_string()))?;
        let output = self.render(root, format)?;
        fs::write(path, &output.bytes)?;
        Ok(output)
    }

    /// Renders independent documents in parallel. Results keep the input order.
    #[cfg(feature = "rayon")]
    pub fn render_many(&self, roots: &[Node], format: OutputFormat) -> Vec<Result<RenderOutput, FolioError>> {
        use rayon::prelude::*;
        roots.par_iter().map(|root| self.render(root, format)).collect()
    }
}
