use folio::{FolioError, Node, PipelineBuilder, RenderOptions};
use std::env;
use std::fs;

/// Renders a JSON node tree to PDF or DOCX.
fn main() -> Result<(), FolioError> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if !(3..=4).contains(&args.len()) {
        eprintln!("Renders a JSON document tree to PDF or DOCX.");
        eprintln!();
        eprintln!("Usage: {} <path/to/document.json> <path/to/output.pdf|docx|html> [page-size]", args[0]);
        eprintln!();
        eprintln!("  page-size: A3, A4, A5, Letter, Legal or explicit dimensions like \"210mm 297mm\"");
        std::process::exit(2);
    }

    let input_path = &args[1];
    let output_path = &args[2];
    let mut options = RenderOptions::default();
    if let Some(page_size) = args.get(3) {
        options = options.with_page_size(page_size.parse()?);
    }

    log::info!("Loading document from {}", input_path);
    let source = fs::read_to_string(input_path)?;
    let root: Node = serde_json::from_str(&source)?;

    let pipeline = PipelineBuilder::new().with_options(options).build()?;
    let output = pipeline.render_to_file(&root, output_path)?;

    for warning in output.diagnostics.warnings() {
        eprintln!("warning: {}", warning);
    }
    println!(
        "Wrote {} ({} pages, {} bytes) to {}",
        output.format,
        output.page_count,
        output.bytes.len(),
        output_path
    );
    Ok(())
}
