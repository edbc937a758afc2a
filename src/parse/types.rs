//! Types produced by the tokenizer and consumed by the engine.

/// How a region's transformed body is written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// The transformed body replaces the region.
    #[default]
    Replace,
    /// `+expr`: the region becomes `original + "\n\n" + transformed`.
    Append,
}

impl Mode {
    /// Separator placed between original and transformed text in append mode.
    pub const APPEND_SEPARATOR: &'static str = "\n\n";

    /// Combine an original region text with its transformed body.
    pub fn finish(self, original: &str, transformed: String) -> String {
        match self {
            Mode::Replace => transformed,
            Mode::Append => format!("{original}{}{transformed}", Self::APPEND_SEPARATOR),
        }
    }
}

/// One pipe-delimited segment of an expression.
///
/// `words` are still quoted: de-quoting (and backtick evaluation) happens
/// when the stage runs, so a bad parameter fails only its own region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    /// Trimmed stage text, e.g. `swap "a|b" x`.
    pub text: String,
    /// Whitespace-split tokens, quotes intact.
    pub words: Vec<String>,
}

/// A fully split expression: mode plus stages in application order.
///
/// For `rev | dupl -c` there are two stages; for `+rev` there is one stage
/// and the mode is [`Mode::Append`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPipeline {
    /// The raw user input, including any leading `+`.
    pub source: String,
    pub mode: Mode,
    pub stages: Vec<Stage>,
}
