//! text-transmute: command-line host for the transmutation engine.
//!
//! Default mode reads a JSON request from stdin and writes the replacements
//! as JSON to stdout:
//!
//! ```text
//! {"expression": "rev | dupl -c", "regions": [{"start": 0, "end": 2, "text": "ab"}], "syntax": "py"}
//! {"replacements": [{"start": 0, "end": 2, "text": "baba"}], "errors": []}
//! ```
//!
//! Other modes:
//!   - `-e EXPR`        transmute all of stdin as one region, print the result
//!   - `--alias NAME`   like the default mode, running a configured alias
//!   - `--replay N`     like the default mode, re-running history entry N
//!   - `--list`         available commands and aliases
//!   - `--history`      stored expressions, oldest first
//!   - `--dump-config`  merged configuration as TOML

use std::io::Read;

use clap::{ArgGroup, Parser};
use serde::{Deserialize, Serialize};

use text_transmute::config::Config;
use text_transmute::engine::{Executor, RunReport};
use text_transmute::host::{Host, Region};
use text_transmute::logging;
use text_transmute::session::Session;
use text_transmute::TransmuteError;

#[derive(Debug, Deserialize)]
struct Request {
    /// Answer to the expression prompt. Missing means the prompt is cancelled.
    expression: Option<String>,
    #[serde(default)]
    regions: Vec<Region>,
    syntax: Option<String>,
}

#[derive(Debug, Serialize, Default)]
struct Response {
    replacements: Vec<Region>,
    errors: Vec<String>,
}

/// Host over a JSON request: replacements and errors are collected for the
/// response instead of being applied to a live buffer.
struct JsonHost {
    regions: Vec<Region>,
    syntax: Option<String>,
    answer: Option<String>,
    response: Response,
}

impl JsonHost {
    fn new(request: Request) -> Self {
        Self {
            regions: request.regions,
            syntax: request.syntax,
            answer: request.expression,
            response: Response::default(),
        }
    }
}

impl Host for JsonHost {
    fn selected_regions(&self) -> Vec<Region> {
        self.regions.clone()
    }

    fn replace_region(&mut self, start: usize, end: usize, text: &str) {
        self.response.replacements.push(Region::new(start, end, text));
    }

    fn prompt_for_input(&mut self, _caption: &str, _default_text: &str) -> Option<String> {
        self.answer.take()
    }

    fn show_error(&mut self, message: &str) {
        self.response.errors.push(message.to_string());
    }

    fn syntax(&self) -> Option<String> {
        self.syntax.clone()
    }
}

/// Apply pipeline expressions to text regions.
///
/// With no options, reads a JSON request from stdin and prints the
/// replacements as JSON.
#[derive(Parser, Debug)]
#[command(name = "text-transmute", version)]
#[command(group(ArgGroup::new("mode").multiple(false)))]
struct Cli {
    /// Transmute all of stdin as one region and print the result
    #[arg(short = 'e', long = "expression", value_name = "EXPR", group = "mode")]
    expression: Option<String>,

    /// Run a configured alias against the JSON request
    #[arg(long, value_name = "NAME", group = "mode")]
    alias: Option<String>,

    /// Re-run history entry N against the JSON request
    #[arg(long, value_name = "N", group = "mode")]
    replay: Option<usize>,

    /// List available commands and aliases
    #[arg(long, group = "mode")]
    list: bool,

    /// Print stored expressions, oldest first
    #[arg(long, group = "mode")]
    history: bool,

    /// Print the merged configuration as TOML
    #[arg(long, group = "mode")]
    dump_config: bool,
}

#[derive(Debug, PartialEq)]
enum Mode {
    Json,
    Expression(String),
    Alias(String),
    Replay(usize),
    List,
    History,
    DumpConfig,
}

impl Cli {
    fn mode(self) -> Mode {
        if let Some(expr) = self.expression {
            Mode::Expression(expr)
        } else if let Some(name) = self.alias {
            Mode::Alias(name)
        } else if let Some(index) = self.replay {
            Mode::Replay(index)
        } else if self.list {
            Mode::List
        } else if self.history {
            Mode::History
        } else if self.dump_config {
            Mode::DumpConfig
        } else {
            Mode::Json
        }
    }
}

fn read_stdin() -> String {
    let mut input = String::new();
    if std::io::stdin().read_to_string(&mut input).is_err() {
        eprintln!("failed to read stdin");
        std::process::exit(1);
    }
    input
}

fn read_request() -> Request {
    match serde_json::from_str(&read_stdin()) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("JSON parse error: {e}");
            std::process::exit(1);
        }
    }
}

fn load_session(config: &Config) -> Session {
    let dir = config.settings.data_dir();
    match Session::load(&dir, config.settings.history_limit) {
        Ok(session) => session,
        Err(e) => {
            log::warn!("session: cannot load from {}: {e}", dir.display());
            Session::new(config.settings.history_limit)
        }
    }
}

fn save_session(config: &Config, session: &Session) {
    let dir = config.settings.data_dir();
    if let Err(e) = session.save(&dir) {
        log::warn!("session: cannot save to {}: {e}", dir.display());
    }
}

/// Run a JSON-request mode and print the response.
fn serve<F>(config: &Config, executor: &Executor, run: F)
where
    F: FnOnce(&Executor, &mut JsonHost, &mut Session) -> Result<Option<RunReport>, TransmuteError>,
{
    let mut host = JsonHost::new(read_request());
    let mut session = load_session(config);
    // Failures were already shown to the host and are in `response.errors`.
    let _ = run(executor, &mut host, &mut session);
    save_session(config, &session);
    match serde_json::to_string(&host.response) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("JSON encode error: {e}");
            std::process::exit(1);
        }
    }
}

fn main() {
    let mode = Cli::parse().mode();

    let config = Config::load();
    logging::init(config.settings.log_level(), &config.settings.data_dir());
    let executor = Executor::from_config(&config);

    match mode {
        Mode::Json => serve(&config, &executor, |exec, host, session| {
            exec.prompt_and_run(host, session)
        }),
        Mode::Alias(name) => serve(&config, &executor, |exec, host, session| {
            exec.run_alias(host, session, &name).map(Some)
        }),
        Mode::Replay(index) => serve(&config, &executor, |exec, host, session| {
            let report = exec.run_history(host, session, index)?;
            if report.is_none() {
                host.show_error(&format!("no history entry {index}"));
            }
            Ok(report)
        }),
        Mode::Expression(expr) => {
            let body = read_stdin();
            match text_transmute::transmute(&body, &expr) {
                Ok(out) => print!("{out}"),
                Err(e) => {
                    eprintln!("{e}");
                    std::process::exit(1);
                }
            }
        }
        Mode::List => {
            for (name, summary) in executor.registry().available() {
                println!("{name:<10} {summary}");
            }
            for alias in executor.aliases() {
                println!("@{:<9} {} ({})", alias.name, alias.caption, alias.expression);
            }
        }
        Mode::History => {
            for (i, expr) in load_session(&config).history().enumerate() {
                println!("{i:>3}  {expr}");
            }
        }
        Mode::DumpConfig => match config.dump() {
            Ok(text) => print!("{text}"),
            Err(e) => {
                eprintln!("text-transmute: cannot serialize config: {e}");
                std::process::exit(1);
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mode(args: &[&str]) -> Result<Mode, clap::Error> {
        let argv = std::iter::once("text-transmute").chain(args.iter().copied());
        Cli::try_parse_from(argv).map(Cli::mode)
    }

    #[test]
    fn parses_modes() {
        assert_eq!(mode(&[]).unwrap(), Mode::Json);
        assert_eq!(mode(&["--list"]).unwrap(), Mode::List);
        assert_eq!(mode(&["--history"]).unwrap(), Mode::History);
        assert_eq!(mode(&["--dump-config"]).unwrap(), Mode::DumpConfig);
        assert_eq!(mode(&["-e", "rev"]).unwrap(), Mode::Expression("rev".into()));
        assert_eq!(mode(&["--expression=rev | dupl"]).unwrap(), Mode::Expression("rev | dupl".into()));
        assert_eq!(mode(&["--alias", "upper"]).unwrap(), Mode::Alias("upper".into()));
        assert_eq!(mode(&["--replay", "3"]).unwrap(), Mode::Replay(3));
    }

    #[test]
    fn rejects_bad_arguments() {
        use clap::error::ErrorKind;

        assert_eq!(mode(&["--replay", "x"]).unwrap_err().kind(), ErrorKind::ValueValidation);
        assert_eq!(mode(&["--bogus"]).unwrap_err().kind(), ErrorKind::UnknownArgument);
        assert!(mode(&["-e"]).is_err());
        assert_eq!(
            mode(&["--list", "--history"]).unwrap_err().kind(),
            ErrorKind::ArgumentConflict
        );
        assert_eq!(
            mode(&["-e", "rev", "--replay", "1"]).unwrap_err().kind(),
            ErrorKind::ArgumentConflict
        );
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn json_host_runs_request() {
        let request: Request = serde_json::from_str(
            r#"{"expression": "rev", "regions": [{"start": 0, "end": 2, "text": "ab"}, {"start": 5, "end": 7, "text": "cd"}]}"#,
        )
        .unwrap();
        let mut host = JsonHost::new(request);
        let executor = Executor::from_config(&Config::default_config());
        let mut session = Session::default();
        executor.prompt_and_run(&mut host, &mut session).unwrap();
        assert_eq!(
            host.response.replacements,
            vec![Region::new(5, 7, "dc"), Region::new(0, 2, "ba")]
        );
        assert!(host.response.errors.is_empty());
        assert_eq!(session.history().collect::<Vec<_>>(), vec!["rev"]);
    }

    #[test]
    fn json_host_collects_errors() {
        let request: Request = serde_json::from_str(
            r#"{"expression": "frobnicate", "regions": [{"start": 0, "end": 1, "text": "a"}]}"#,
        )
        .unwrap();
        let mut host = JsonHost::new(request);
        let executor = Executor::from_config(&Config::default_config());
        executor.prompt_and_run(&mut host, &mut Session::default()).unwrap();
        assert!(host.response.replacements.is_empty());
        assert_eq!(host.response.errors, vec!["'frobnicate' is not a command"]);
    }
}
