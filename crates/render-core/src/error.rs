use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF generation error: {0}")]
    Pdf(String),
    #[error("XML writing error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("Zip packaging error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Object {from} references object {target}, which was never written")]
    DanglingReference { from: u32, target: u32 },
    #[error("Package integrity error: {0}")]
    PackagingIntegrity(String),
}

impl From<lopdf::Error> for RenderError {
    fn from(err: lopdf::Error) -> Self {
        RenderError::Pdf(err.to_string())
    }
}
