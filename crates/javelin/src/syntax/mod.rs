//! Source positions.

pub mod line_col;
pub mod text;

pub use line_col::{LineCol, LineIndex};
pub use text::{TextRange, TextSize};
