//! Non-fatal conditions recorded during layout.

use folio_types::NodeId;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// A font could not be measured; `fallback` was used instead.
    MeasurementUnavailable {
        node_id: NodeId,
        family: String,
        fallback: String,
    },
    /// An unbreakable box is taller than the page content area and was placed anyway.
    OversizedContent {
        node_id: NodeId,
        page_index: usize,
        height: f32,
        available: f32,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MeasurementUnavailable {
                node_id,
                family,
                fallback,
            } => write!(
                f,
                "node '{}': font '{}' unavailable, measured with '{}'",
                node_id, family, fallback
            ),
            Warning::OversizedContent {
                node_id,
                page_index,
                height,
                available,
            } => write!(
                f,
                "node '{}': content of height {:.2} exceeds the page content height {:.2} (page {})",
                node_id,
                height,
                available,
                page_index + 1
            ),
        }
    }
}

/// Warnings in the order they were raised.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, warning: Warning) {
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}
