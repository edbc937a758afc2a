use crate::commands::Transmutation;
use crate::commands::options::OptionSpec;
use crate::engine::CommandContext;
use crate::error::TransmuteError;

const FLAGS: OptionSpec = OptionSpec {
    short: "cp:",
    long: &["close", "place="],
};

/// Largest range `gen` will produce.
const MAX_ITEMS: u128 = 1_000_000;

/// Marker replaced by each generated value in a placement template.
pub const PLACEHOLDER: &str = "{$}";

/// `gen [-c] [-p TEMPLATE] START END [STEP]` (also `mklist`).
///
/// Inclusive range, counting down when START > END. Bounds that are not
/// integers but single characters give an alphabetic range by code point.
/// The body is ignored.
pub struct Gen {
    separator: &'static str,
    placement: String,
}

impl Default for Gen {
    fn default() -> Self {
        Self {
            separator: "\n",
            placement: PLACEHOLDER.to_string(),
        }
    }
}

enum Bounds {
    Numeric(i64, i64),
    Alphabetic(u32, u32),
}

impl Gen {
    fn place(&self, value: &str) -> String {
        self.placement.replace(PLACEHOLDER, value)
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// Inclusive walk from `start` to `end` in steps of `step` (a magnitude).
fn walk(start: i64, end: i64, step: u64) -> Vec<i64> {
    let mut out = Vec::new();
    let mut current = start;
    if start <= end {
        while current <= end {
            out.push(current);
            match current.checked_add_unsigned(step) {
                Some(next) => current = next,
                None => break,
            }
        }
    } else {
        while current >= end {
            out.push(current);
            match current.checked_sub_unsigned(step) {
                Some(next) => current = next,
                None => break,
            }
        }
    }
    out
}

impl Transmutation for Gen {
    fn transmute(&mut self, ctx: &mut CommandContext) -> Result<String, TransmuteError> {
        let Some(opts) = ctx.options(&FLAGS) else {
            return Ok(ctx.unchanged());
        };
        for (flag, value) in &opts.opts {
            match flag.as_str() {
                "-c" | "--close" => self.separator = "",
                _ => {
                    self.placement = value.clone();
                    if !self.placement.contains(PLACEHOLDER) {
                        self.placement.push_str(PLACEHOLDER);
                    }
                }
            }
        }

        let (Some(start), Some(end)) = (opts.arg(0), opts.arg(1)) else {
            return Err(ctx.reject("command needs arguments: START END [STEP]"));
        };

        let bounds = match (start.parse::<i64>(), end.parse::<i64>()) {
            (Ok(s), Ok(e)) => Bounds::Numeric(s, e),
            _ => match (single_char(start), single_char(end)) {
                (Some(s), Some(e)) => Bounds::Alphabetic(s as u32, e as u32),
                _ => {
                    return Err(ctx.reject(format!(
                        "bounds must be integers or single characters, got {start:?} and {end:?}"
                    )));
                }
            },
        };

        let step = match opts.arg(2) {
            None => 1,
            Some(s) => match s.parse::<i64>() {
                Ok(0) | Err(_) => {
                    return Err(ctx.reject(format!("step must be a non-zero integer, got {s:?}")));
                }
                Ok(n) => n.unsigned_abs(),
            },
        };

        let (lo, hi) = match bounds {
            Bounds::Numeric(s, e) => (i128::from(s), i128::from(e)),
            Bounds::Alphabetic(s, e) => (i128::from(s), i128::from(e)),
        };
        if (hi - lo).unsigned_abs() / u128::from(step) >= MAX_ITEMS {
            return Err(ctx.reject(format!("range too large (limit {MAX_ITEMS} items)")));
        }

        let items: Vec<String> = match bounds {
            Bounds::Numeric(s, e) => walk(s, e, step)
                .into_iter()
                .map(|n| self.place(&n.to_string()))
                .collect(),
            Bounds::Alphabetic(s, e) => walk(s.into(), e.into(), step)
                .into_iter()
                .filter_map(|code| u32::try_from(code).ok().and_then(char::from_u32))
                .map(|c| self.place(c.encode_utf8(&mut [0; 4])))
                .collect(),
        };
        log::debug!("{}: generated {} items", ctx.name, items.len());
        Ok(items.join(self.separator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::context::testing::{run, run_with};

    fn generate(params: &[&str]) -> String {
        run(Gen::default(), "gen", "", params)
    }

    #[test]
    fn numeric_range() {
        assert_eq!(generate(&["1", "5"]), "1\n2\n3\n4\n5");
        assert_eq!(generate(&["3", "3"]), "3");
        assert_eq!(generate(&["0", "2"]), "0\n1\n2");
    }

    #[test]
    fn descending_range() {
        assert_eq!(generate(&["5", "1"]), "5\n4\n3\n2\n1");
        assert_eq!(generate(&["4", "3"]), "4\n3");
    }

    #[test]
    fn step() {
        assert_eq!(generate(&["1", "10", "3"]), "1\n4\n7\n10");
        assert_eq!(generate(&["10", "1", "4"]), "10\n6\n2");
        assert_eq!(generate(&["1", "5", "-2"]), "1\n3\n5");
    }

    #[test]
    fn alphabetic_range() {
        assert_eq!(generate(&["a", "d"]), "a\nb\nc\nd");
        assert_eq!(generate(&["d", "a"]), "d\nc\nb\na");
        assert_eq!(generate(&["-c", "A", "E", "2"]), "ACE");
    }

    #[test]
    fn close_and_place() {
        assert_eq!(generate(&["-c", "1", "5"]), "12345");
        assert_eq!(generate(&["-p", "{$}.", "1", "3"]), "1.\n2.\n3.");
        assert_eq!(generate(&["--place", "item ", "1", "2"]), "item 1\nitem 2");
        assert_eq!(generate(&["-c", "-p", "<{$}>", "1", "2"]), "<1><2>");
    }

    #[test]
    fn missing_arguments_rejected() {
        let (result, _) = run_with(Gen::default(), "gen", "", &["1"], None);
        assert!(matches!(result, Err(TransmuteError::Rejected { .. })));
    }

    #[test]
    fn oversized_range_rejected() {
        assert!(run_with(Gen::default(), "gen", "", &["1", "99999999999"], None).0.is_err());
        assert_eq!(generate(&["1", "99999999999", "99999999998"]), "1\n99999999999");
    }

    #[test]
    fn bad_bounds_and_step_rejected() {
        assert!(run_with(Gen::default(), "gen", "", &["ab", "cd"], None).0.is_err());
        assert!(run_with(Gen::default(), "gen", "", &["1", "5", "0"], None).0.is_err());
        assert!(run_with(Gen::default(), "gen", "", &["1", "5", "x"], None).0.is_err());
    }
}
