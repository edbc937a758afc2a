use crate::config::{Alias, Config};
use crate::engine::context::{CommandContext, Services};
use crate::engine::CommandRegistry;
use crate::error::TransmuteError;
use crate::host::{ErrorSink, Host, HostSink, Region};
use crate::logging;
use crate::parse::{self, ParsedPipeline, dequote};
use crate::session::Session;

/// Caption shown when asking the user for an expression.
pub const PROMPT_CAPTION: &str = "Transmute Selection";

/// A region whose pipeline stopped early. The region was left untouched.
#[derive(Debug)]
pub struct RegionFailure {
    /// Position of the region in the host's selection.
    pub index: usize,
    pub error: TransmuteError,
}

/// Outcome of running one expression over every selected region.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Regions whose text was replaced.
    pub applied: usize,
    pub aborted: Vec<RegionFailure>,
}

impl RunReport {
    pub fn is_complete(&self) -> bool {
        self.aborted.is_empty()
    }
}

/// Runs pipelines against a host's selection.
pub struct Executor {
    registry: CommandRegistry,
    services: Services,
    aliases: Vec<Alias>,
}

impl Executor {
    pub fn new(registry: CommandRegistry, services: Services) -> Self {
        Self {
            registry,
            services,
            aliases: Vec::new(),
        }
    }

    /// Builtin commands, real collaborators and the configured aliases.
    pub fn from_config(config: &Config) -> Self {
        Self::new(CommandRegistry::with_builtins(), Services::from_config(config))
            .with_aliases(config.aliases.entries.clone())
    }

    pub fn with_aliases(mut self, aliases: Vec<Alias>) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut CommandRegistry {
        &mut self.registry
    }

    pub fn aliases(&self) -> &[Alias] {
        &self.aliases
    }

    /// Run every stage of `pipeline` over `body` and apply the pipeline's
    /// mode.
    ///
    /// Stops at the first failing stage. Non-fatal notices from commands go
    /// to `sink`; the returned error is not displayed here.
    pub fn apply(
        &self,
        pipeline: &ParsedPipeline,
        body: &str,
        syntax: Option<&str>,
        sink: &mut dyn ErrorSink,
    ) -> Result<String, TransmuteError> {
        let mut current = body.to_string();
        for stage in &pipeline.stages {
            let Some((first, rest)) = stage.words.split_first() else {
                continue;
            };
            let unknown = || TransmuteError::UnknownCommand(stage.text.clone());
            // resolve before any parameter is evaluated
            let name = dequote(first, &self.services.evaluator).map_err(|_| unknown())?;
            let mut command = self.registry.resolve(&name).ok_or_else(unknown)?;
            let params = rest
                .iter()
                .map(|token| {
                    dequote(token, &self.services.evaluator).map_err(|source| {
                        TransmuteError::Parameter {
                            token: token.clone(),
                            source,
                        }
                    })
                })
                .collect::<Result<Vec<String>, TransmuteError>>()?;
            let mut ctx = CommandContext::new(&name, &current, &params, &self.services, &mut *sink)
                .with_syntax(syntax);
            let next = command.transmute(&mut ctx)?;
            log::debug!("stage '{}': {} -> {} chars", stage.text, current.len(), next.len());
            current = next;
        }
        Ok(pipeline.mode.finish(body, current))
    }

    /// Tokenize `expression` and apply it to one body.
    pub fn transmute(
        &self,
        body: &str,
        expression: &str,
        sink: &mut dyn ErrorSink,
    ) -> Result<String, TransmuteError> {
        let pipeline = parse::parse(expression)?;
        self.apply(&pipeline, body, None, sink)
    }

    /// Apply `expression` to every region the host has selected.
    ///
    /// A tokenize failure is shown and returned before any region is read.
    /// A failing region is shown once, recorded in the report and left as it
    /// was; the other regions are still replaced. History is only updated
    /// (and the draft cleared) when every region succeeded.
    pub fn run(
        &self,
        host: &mut dyn Host,
        session: &mut Session,
        expression: &str,
    ) -> Result<RunReport, TransmuteError> {
        let pipeline = match parse::parse(expression) {
            Ok(pipeline) => pipeline,
            Err(e) => {
                let err = TransmuteError::from(e);
                host.show_error(&err.to_string());
                return Err(err);
            }
        };

        let syntax = host.syntax();
        let regions = host.selected_regions();
        let mut report = RunReport::default();
        let mut replacements: Vec<Region> = Vec::with_capacity(regions.len());

        for (index, region) in regions.into_iter().enumerate() {
            let result = {
                let mut sink = HostSink(&mut *host);
                self.apply(&pipeline, &region.text, syntax.as_deref(), &mut sink)
            };
            match result {
                Ok(text) => replacements.push(Region::new(region.start, region.end, text)),
                Err(error) => {
                    log::warn!("region {index} aborted: {error}");
                    host.show_error(&error.to_string());
                    report.aborted.push(RegionFailure { index, error });
                }
            }
        }

        // Back to front, so earlier offsets stay valid.
        replacements.sort_by(|a, b| b.start.cmp(&a.start));
        for region in &replacements {
            host.replace_region(region.start, region.end, &region.text);
        }
        report.applied = replacements.len();

        if report.is_complete() {
            session.push_history(expression);
            session.reset_draft();
        }
        logging::log_run(expression, &report);
        Ok(report)
    }

    /// Prompt for an expression prefilled with the draft, then run it.
    ///
    /// Returns `Ok(None)` when the prompt is cancelled, which also discards
    /// the draft.
    pub fn prompt_and_run(
        &self,
        host: &mut dyn Host,
        session: &mut Session,
    ) -> Result<Option<RunReport>, TransmuteError> {
        let Some(expression) = host.prompt_for_input(PROMPT_CAPTION, session.draft()) else {
            session.reset_draft();
            return Ok(None);
        };
        session.set_draft(expression.clone());
        self.run(host, session, &expression).map(Some)
    }

    /// Re-run history entry `index` (oldest is 0). `Ok(None)` if there is no
    /// such entry.
    pub fn run_history(
        &self,
        host: &mut dyn Host,
        session: &mut Session,
        index: usize,
    ) -> Result<Option<RunReport>, TransmuteError> {
        let Some(expression) = session.history_entry(index).map(str::to_string) else {
            return Ok(None);
        };
        self.run(host, session, &expression).map(Some)
    }

    /// Run the configured alias called `name` (case-insensitive).
    pub fn run_alias(
        &self,
        host: &mut dyn Host,
        session: &mut Session,
        name: &str,
    ) -> Result<RunReport, TransmuteError> {
        let Some(alias) = self.aliases.iter().find(|a| a.name.eq_ignore_ascii_case(name)) else {
            let err = TransmuteError::UnknownCommand(name.to_string());
            host.show_error(&err.to_string());
            return Err(err);
        };
        log::debug!("alias '{}': {}", alias.name, alias.expression);
        self.run(host, session, &alias.expression)
    }
}
