pub mod assets;
pub mod constants;
pub mod font;
pub mod io;
pub mod layout;
pub mod merge;
mod options;
pub mod parse;
pub mod pipeline;
pub mod render;
pub mod shaping;
mod stats;
mod types;

pub use assets::{AssetFetcher, FontCache, HttpFetcher, drive_download_url};
pub use font::{EmbeddedFont, FontSet};
pub use io::{load_pdf, save_pdf};
pub use layout::GridLayout;
pub use merge::merge_documents;
pub use options::*;
pub use parse::{load_answer_table, parse_answer_table, parse_solution_list};
pub use pipeline::{AnswerKeyGenerator, GenerationOutput, GenerationRequest};
pub use render::WatermarkStyle;
pub use stats::calculate_statistics;
pub use types::*;
