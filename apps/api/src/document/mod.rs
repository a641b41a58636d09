// Document pipeline: profile + records → assembled blocks → pages → PDF bytes.
// Layout and PDF encoding are CPU-bound and run inside tokio::task::spawn_blocking.

pub mod assembler;
pub mod blocks;
pub mod font_metrics;
pub mod generator;
pub mod handlers;
pub mod layout;
pub mod pdf;
pub mod sections;

pub use font_metrics::{default_page_config, PageConfig};
