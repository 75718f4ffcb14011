//! Workbook input and template output.

pub mod loader;
pub mod template;

pub use loader::{load_weight_table, WorkbookLoader};
pub use template::{write_templates, TemplateSpec};
