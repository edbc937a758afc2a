use crate::commands::Transmutation;
use crate::commands::options::OptionSpec;
use crate::engine::CommandContext;
use crate::error::TransmuteError;

const FLAGS: OptionSpec = OptionSpec {
    short: "lws:",
    long: &["lines", "words", "string="],
};

/// `count [-l | -w | -s STR]`
///
/// Only the first flag given is honoured; with none, counts characters.
pub struct Count;

impl Transmutation for Count {
    fn transmute(&mut self, ctx: &mut CommandContext) -> Result<String, TransmuteError> {
        let Some(opts) = ctx.options(&FLAGS) else {
            return Ok(ctx.unchanged());
        };
        let body = ctx.body;
        let n = match opts.opts.first() {
            Some((flag, _)) if flag == "-l" || flag == "--lines" => body.matches('\n').count() + 1,
            Some((flag, _)) if flag == "-w" || flag == "--words" => body.split_whitespace().count(),
            Some((_, needle)) => body.matches(needle.as_str()).count(),
            None => body.chars().count(),
        };
        Ok(n.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::context::testing::{run, run_with};

    fn count(body: &str, params: &[&str]) -> usize {
        run(Count, "count", body, params).parse().unwrap()
    }

    #[test]
    fn characters() {
        assert_eq!(count("", &[]), 0);
        assert_eq!(count("a", &[]), 1);
        assert_eq!(count("a#1", &[]), 3);
        assert_eq!(count(" ", &[]), 1);
        assert_eq!(count("\n", &[]), 1);
        assert_eq!(count("a b", &[]), 3);
        assert_eq!(count("a\nb", &[]), 3);
        assert_eq!(count("日本", &[]), 2);
    }

    #[test]
    fn lines() {
        assert_eq!(count("", &["-l"]), 1);
        assert_eq!(count("\n", &["-l"]), 2);
        assert_eq!(count("\n\n", &["-l"]), 3);
        assert_eq!(count("a\nb", &["--lines"]), 2);
    }

    #[test]
    fn words() {
        assert_eq!(count("", &["-w"]), 0);
        assert_eq!(count("foo", &["-w"]), 1);
        assert_eq!(count("foo bar", &["-w"]), 2);
        assert_eq!(count("  foo \n\t bar  ", &["-w"]), 2);
    }

    #[test]
    fn substrings() {
        assert_eq!(count("", &["-s", "a"]), 0);
        assert_eq!(count("a", &["-s", "a"]), 1);
        assert_eq!(count("foo", &["-s", "foo"]), 1);
        assert_eq!(count("a aa", &["-s", "a"]), 3);
        assert_eq!(count("foo foofoo", &["-s", "foo"]), 3);
        assert_eq!(count("aaaa", &["-s", "aa"]), 2);
    }

    #[test]
    fn first_flag_wins() {
        assert_eq!(count("a b\nc", &["-w", "-l"]), 3);
        assert_eq!(count("a b\nc", &["-l", "-w"]), 2);
    }

    #[test]
    fn bad_flag_keeps_body() {
        let (result, messages) = run_with(Count, "count", "abc", &["-q"], None);
        assert_eq!(result.unwrap(), "abc");
        assert_eq!(messages.len(), 1);
    }
}
