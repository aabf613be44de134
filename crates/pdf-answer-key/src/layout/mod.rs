//! Layout calculation
//!
//! Pure geometry, no PDF objects:
//! - `grid`: column-major answer grid
//! - `wrap`: greedy word wrapping against font metrics
//! - `pagination`: row placement and page breaks for detailed solutions

mod grid;
mod pagination;
mod wrap;

pub use grid::{GridCell, GridLayout};
pub use pagination::{
    PaginationConfig, PlacedRow, SolutionPage, WrappedCells, paginate, wrap_entries,
};
pub use wrap::wrap_text;
