use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The formats the pipeline can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pdf,
    Docx,
    Html,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Docx => "docx",
            OutputFormat::Html => "html",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Pdf => "application/pdf",
            OutputFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            OutputFormat::Html => "text/html",
        }
    }

    /// Matches a file extension case-insensitively, with or without the leading dot.
    pub fn from_extension(ext: &str) -> Option<OutputFormat> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "pdf" => Some(OutputFormat::Pdf),
            "docx" => Some(OutputFormat::Docx),
            "html" | "htm" => Some(OutputFormat::Html),
            _ => None,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Pdf => "PDF",
            OutputFormat::Docx => "DOCX",
            OutputFormat::Html => "HTML",
        })
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OutputFormat::from_extension(s).ok_or_else(|| format!("unknown output format '{}'", s))
    }
}
