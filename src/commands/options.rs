//! Per-command flag grammar.
//!
//! POSIX `getopt` rules: options come before positionals, parsing stops at
//! the first non-option word (so `gen 5 -1` keeps `-1` as a positional),
//! `--` ends options, a lone `-` is a positional. Short flags cluster
//! (`-lw`) and take their value attached or as the next word (`-sx`,
//! `-s x`). Long flags accept `--place=x` or `--place x` and may be
//! abbreviated to any unique prefix.

use thiserror::Error;

/// The flags one command understands.
#[derive(Debug, Clone, Copy)]
pub struct OptionSpec {
    /// getopt-style short flags: `"cs:"` means `-c` switch, `-s VALUE`.
    pub short: &'static str,
    /// Long flag names; a trailing `=` marks a flag that takes a value.
    pub long: &'static [&'static str],
}

impl OptionSpec {
    /// No flags at all: any `-x` word is rejected.
    pub const NONE: OptionSpec = OptionSpec {
        short: "",
        long: &[],
    };

    fn short_takes_value(&self, flag: char) -> Option<bool> {
        let mut chars = self.short.chars().peekable();
        while let Some(c) = chars.next() {
            let takes = chars.peek() == Some(&':');
            if takes {
                chars.next();
            }
            if c == flag {
                return Some(takes);
            }
        }
        None
    }

    /// Resolve a (possibly abbreviated) long name to `(full name, takes value)`.
    fn long_flag(&self, name: &str) -> Result<(&'static str, bool), OptionError> {
        let mut found = None;
        for &decl in self.long {
            let (full, takes) = match decl.strip_suffix('=') {
                Some(full) => (full, true),
                None => (decl, false),
            };
            if full == name {
                return Ok((full, takes));
            }
            if full.starts_with(name) {
                if found.is_some() {
                    return Err(OptionError::Ambiguous(name.to_string()));
                }
                found = Some((full, takes));
            }
        }
        found.ok_or_else(|| OptionError::NotRecognized(format!("--{name}")))
    }
}

/// A flag grammar violation. Messages follow the classic getopt wording.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    #[error("option {0} not recognized")]
    NotRecognized(String),
    #[error("option {0} requires argument")]
    RequiresArgument(String),
    #[error("option {0} must not have an argument")]
    UnexpectedArgument(String),
    #[error("option --{0} not a unique prefix")]
    Ambiguous(String),
}

/// Flags (in the order given) and the remaining positionals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedOptions {
    /// `("-s", "value")`, `("--close", "")`, ...
    pub opts: Vec<(String, String)>,
    pub args: Vec<String>,
}

impl ParsedOptions {
    /// True if any of `names` was given.
    pub fn has(&self, names: &[&str]) -> bool {
        self.opts.iter().any(|(o, _)| names.contains(&o.as_str()))
    }

    /// Value of the last occurrence of any of `names`.
    pub fn value(&self, names: &[&str]) -> Option<&str> {
        self.opts
            .iter()
            .rev()
            .find(|(o, _)| names.contains(&o.as_str()))
            .map(|(_, v)| v.as_str())
    }

    /// Positional at `index`, if present.
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }
}

/// Split `params` into flags and positionals according to `spec`.
pub fn getopt(params: &[String], spec: &OptionSpec) -> Result<ParsedOptions, OptionError> {
    let mut parsed = ParsedOptions::default();
    let mut i = 0;

    while i < params.len() {
        let word = params[i].as_str();
        if word == "--" {
            i += 1;
            break;
        }
        if !word.starts_with('-') || word == "-" {
            break;
        }

        if let Some(long) = word.strip_prefix("--") {
            let (name, inline) = match long.split_once('=') {
                Some((n, v)) => (n, Some(v)),
                None => (long, None),
            };
            let (full, takes) = spec.long_flag(name)?;
            let flag = format!("--{full}");
            let value = match (takes, inline) {
                (true, Some(v)) => v.to_string(),
                (true, None) => {
                    i += 1;
                    params
                        .get(i)
                        .cloned()
                        .ok_or_else(|| OptionError::RequiresArgument(flag.clone()))?
                }
                (false, Some(_)) => return Err(OptionError::UnexpectedArgument(flag)),
                (false, None) => String::new(),
            };
            parsed.opts.push((flag, value));
            i += 1;
            continue;
        }

        let cluster = &word[1..];
        for (offset, flag) in cluster.char_indices() {
            let name = format!("-{flag}");
            match spec.short_takes_value(flag) {
                None => return Err(OptionError::NotRecognized(name)),
                Some(false) => parsed.opts.push((name, String::new())),
                Some(true) => {
                    let rest = &cluster[offset + flag.len_utf8()..];
                    let value = if rest.is_empty() {
                        i += 1;
                        params
                            .get(i)
                            .cloned()
                            .ok_or_else(|| OptionError::RequiresArgument(name.clone()))?
                    } else {
                        rest.to_string()
                    };
                    parsed.opts.push((name, value));
                    break;
                }
            }
        }
        i += 1;
    }

    parsed.args = params[i.min(params.len())..].to_vec();
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const COUNT: OptionSpec = OptionSpec {
        short: "lws:",
        long: &[],
    };
    const GEN: OptionSpec = OptionSpec {
        short: "cp:",
        long: &["close", "place="],
    };

    fn words(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn switches_and_values() {
        let p = getopt(&words("-l -s foo bar"), &COUNT).unwrap();
        assert!(p.has(&["-l"]));
        assert_eq!(p.value(&["-s"]), Some("foo"));
        assert_eq!(p.args, vec!["bar"]);
    }

    #[test]
    fn clustered_and_attached() {
        let p = getopt(&words("-lwsfoo"), &COUNT).unwrap();
        assert_eq!(
            p.opts,
            vec![
                ("-l".into(), String::new()),
                ("-w".into(), String::new()),
                ("-s".into(), "foo".into())
            ]
        );
    }

    #[test]
    fn stops_at_first_positional() {
        let p = getopt(&words("5 -1"), &GEN).unwrap();
        assert!(p.opts.is_empty());
        assert_eq!(p.args, vec!["5", "-1"]);
    }

    #[test]
    fn double_dash_ends_options() {
        let p = getopt(&words("-c -- -p x"), &GEN).unwrap();
        assert!(p.has(&["-c"]));
        assert_eq!(p.args, vec!["-p", "x"]);
    }

    #[test]
    fn lone_dash_is_positional() {
        let p = getopt(&words("- +"), &OptionSpec::NONE).unwrap();
        assert_eq!(p.args, vec!["-", "+"]);
    }

    #[test]
    fn long_forms() {
        let p = getopt(&words("--close --place=x{$} 1 3"), &GEN).unwrap();
        assert!(p.has(&["-c", "--close"]));
        assert_eq!(p.value(&["-p", "--place"]), Some("x{$}"));
        assert_eq!(p.args, vec!["1", "3"]);

        let p = getopt(&words("--pl y 1"), &GEN).unwrap();
        assert_eq!(p.value(&["--place"]), Some("y"));
    }

    #[test]
    fn errors() {
        assert_eq!(
            getopt(&words("-x"), &COUNT),
            Err(OptionError::NotRecognized("-x".into()))
        );
        assert_eq!(
            getopt(&words("-s"), &COUNT),
            Err(OptionError::RequiresArgument("-s".into()))
        );
        assert_eq!(
            getopt(&words("--close=1"), &GEN),
            Err(OptionError::UnexpectedArgument("--close".into()))
        );
        assert_eq!(
            getopt(&words("--bogus"), &GEN),
            Err(OptionError::NotRecognized("--bogus".into()))
        );
        assert_eq!(
            getopt(&words("-x"), &COUNT).unwrap_err().to_string(),
            "option -x not recognized"
        );
    }
}
