pub mod arith;
pub mod tokenize;
pub mod types;

pub use arith::{Caret, Evaluator, ExprError, Number};
pub use tokenize::{TokenizeError, dequote, parse, split_stages, split_words, strip_quotes};
pub use types::{Mode, ParsedPipeline, Stage};
