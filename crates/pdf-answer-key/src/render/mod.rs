//! Page rendering
//!
//! Generated pages are drawn with raw content-stream operators into a
//! [`GeneratedPages`] document; the watermark is a Form XObject added to the
//! source document.

pub mod answer_page;
pub mod content;
pub mod page;
pub mod solutions;
pub mod table;
pub mod template;
pub mod watermark;

pub use answer_page::build_answer_key_page;
pub use content::Color;
pub use page::{GeneratedPages, PageBuilder, PageFonts, RegisteredFont};
pub use solutions::{build_solution_pages, layout_solutions};
pub use template::{PageTemplate, embed_background};
pub use watermark::{WatermarkOverlays, WatermarkStyle, create_watermark_overlay};
