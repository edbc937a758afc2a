use crate::commands::external::{HttpClient, MarkdownRenderer, PulldownRenderer, ReqwestClient};
use crate::commands::options::{OptionSpec, ParsedOptions, getopt};
use crate::config::Config;
use crate::error::TransmuteError;
use crate::host::ErrorSink;
use crate::parse::Evaluator;

/// Shared, read-only facilities handed to every command.
pub struct Services {
    pub evaluator: Evaluator,
    pub http: Box<dyn HttpClient>,
    pub markdown: Box<dyn MarkdownRenderer>,
    /// Indent per nesting level used by `markdown` when none is given.
    pub markdown_indent: usize,
}

impl Services {
    /// Real collaborators configured from `config`.
    pub fn from_config(config: &Config) -> Self {
        Self {
            evaluator: Evaluator::new(config.settings.caret),
            http: Box::new(ReqwestClient::from_config(&config.http)),
            markdown: Box::new(PulldownRenderer),
            markdown_indent: config.markdown.indent,
        }
    }
}

/// Everything one command invocation sees.
pub struct CommandContext<'a> {
    /// Command name as typed, after de-quoting.
    pub name: &'a str,
    /// Current body, as left by the previous stage.
    pub body: &'a str,
    /// De-quoted, backtick-evaluated parameters.
    pub params: &'a [String],
    /// File extension of the host buffer, if the host knows it.
    pub syntax: Option<&'a str>,
    pub services: &'a Services,
    sink: &'a mut dyn ErrorSink,
}

impl<'a> CommandContext<'a> {
    pub fn new(
        name: &'a str,
        body: &'a str,
        params: &'a [String],
        services: &'a Services,
        sink: &'a mut dyn ErrorSink,
    ) -> Self {
        Self {
            name,
            body,
            params,
            syntax: None,
            services,
            sink,
        }
    }

    pub fn with_syntax(mut self, syntax: Option<&'a str>) -> Self {
        self.syntax = syntax;
        self
    }

    /// Report a non-fatal problem; the pipeline keeps going.
    pub fn report(&mut self, message: &str) {
        log::warn!("{}: {message}", self.name);
        self.sink.display_error(message);
    }

    /// Parse this command's flags.
    ///
    /// A grammar violation is reported through the sink and yields `None`;
    /// the caller then hands the body through unchanged.
    pub fn options(&mut self, spec: &OptionSpec) -> Option<ParsedOptions> {
        match getopt(self.params, spec) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                let message = format!("Transmutation Error: {e} for {}", self.name);
                self.report(&message);
                None
            }
        }
    }

    /// A [`TransmuteError::Rejected`] naming this command.
    pub fn reject(&self, reason: impl Into<String>) -> TransmuteError {
        TransmuteError::rejected(self.name, reason)
    }

    /// The body, untouched.
    pub fn unchanged(&self) -> String {
        self.body.to_string()
    }
}
