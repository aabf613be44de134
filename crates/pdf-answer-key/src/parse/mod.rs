//! Input parsers: the answer table (CSV) and the solutions text block.

mod answers;
mod solutions;

pub use answers::{load_answer_table, parse_answer_table, question_number_for_column};
pub use solutions::{parse_solution_line, parse_solution_list};
