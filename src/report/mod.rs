//! Report rendering.

pub mod generator;

pub use generator::{
    generate_json_ranking, generate_json_report, generate_markdown_ranking,
    generate_markdown_report, RenderOptions,
};
