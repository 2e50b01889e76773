pub mod measure;
pub mod wrapper;

pub use measure::{Measured, Measurer};
pub use wrapper::{InlineRun, LineLayout, break_lines};
