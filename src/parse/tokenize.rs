use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use super::arith::{Evaluator, ExprError};
use super::types::{Mode, ParsedPipeline, Stage};

/// A run of non-pipe characters, with quoted spans kept whole.
static STAGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:[^|"'`]|"[^"]*"|'[^']*'|`[^`]*`)+"#).expect("stage pattern must compile")
});

/// A run of non-whitespace characters, with quoted spans kept whole.
static WORD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:[^\s"'`]|"[^"]*"|'[^']*'|`[^`]*`)+"#).expect("word pattern must compile")
});

const QUOTES: [char; 3] = ['"', '\'', '`'];

/// Expression-level failure: nothing has been applied yet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizeError {
    #[error("empty expression")]
    Empty,
    #[error("unterminated {quote} quote starting at column {position}")]
    Unterminated { quote: char, position: usize },
    #[error("expression contains no commands")]
    NoStages,
}

/// Reject input with an unclosed `"`, `'` or `` ` ``.
///
/// The split patterns silently skip a lone quote character, so this runs
/// first to turn that into an error instead of a mangled pipeline.
pub fn check_quotes(input: &str) -> Result<(), TokenizeError> {
    let mut open: Option<(char, usize)> = None;
    for (position, c) in input.chars().enumerate() {
        match open {
            Some((q, _)) if c == q => open = None,
            Some(_) => {}
            None if QUOTES.contains(&c) => open = Some((c, position)),
            None => {}
        }
    }
    match open {
        Some((quote, position)) => Err(TokenizeError::Unterminated { quote, position }),
        None => Ok(()),
    }
}

/// Split an expression into trimmed stage strings at unquoted `|`.
///
/// Precondition: `input` is non-empty. Empty input is reported as
/// [`TokenizeError::Empty`] rather than producing a no-op pipeline.
pub fn split_stages(input: &str) -> Result<Vec<String>, TokenizeError> {
    if input.trim().is_empty() {
        return Err(TokenizeError::Empty);
    }
    check_quotes(input)?;
    let stages: Vec<String> = STAGE_PATTERN
        .find_iter(input)
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if stages.is_empty() {
        return Err(TokenizeError::NoStages);
    }
    Ok(stages)
}

/// Split one stage into tokens at unquoted whitespace. Quotes are kept.
pub fn split_words(stage: &str) -> Vec<String> {
    WORD_PATTERN
        .find_iter(stage)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Strip one pair of matching `"` or `'` around a token.
pub fn strip_quotes(token: &str) -> &str {
    let mut chars = token.chars();
    match (chars.next(), chars.next_back()) {
        (Some(first), Some(last)) if first == last && (first == '"' || first == '\'') => {
            &token[1..token.len() - 1]
        }
        _ => token,
    }
}

/// De-quote a token; a backtick-wrapped token is replaced by its evaluated value.
///
/// Quote stripping happens before backtick detection, so `` "`1+1`" `` is `2`.
pub fn dequote(token: &str, evaluator: &Evaluator) -> Result<String, ExprError> {
    let stripped = strip_quotes(token);
    if stripped.len() >= 2 && stripped.starts_with('`') && stripped.ends_with('`') {
        let inner = &stripped[1..stripped.len() - 1];
        return evaluator.evaluate(inner).map(|n| n.to_string());
    }
    Ok(stripped.to_string())
}

/// Split a full expression into a [`ParsedPipeline`].
///
/// A leading `+` selects [`Mode::Append`] and is not part of the first stage.
pub fn parse(input: &str) -> Result<ParsedPipeline, TokenizeError> {
    if input.is_empty() {
        return Err(TokenizeError::Empty);
    }
    let (mode, body) = match input.strip_prefix('+') {
        Some(rest) => (Mode::Append, rest),
        None => (Mode::Replace, input),
    };
    let stages = split_stages(body)?
        .into_iter()
        .map(|text| {
            let words = split_words(&text);
            Stage { text, words }
        })
        .collect();
    Ok(ParsedPipeline {
        source: input.to_string(),
        mode,
        stages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_single_stage() {
        assert_eq!(split_stages("rev").unwrap(), vec!["rev"]);
    }

    #[test]
    fn split_pipe() {
        assert_eq!(
            split_stages("rev | dupl -c").unwrap(),
            vec!["rev", "dupl -c"]
        );
    }

    #[test]
    fn split_quoted_pipe() {
        assert_eq!(
            split_stages(r#"swap "a|b" x | rev"#).unwrap(),
            vec![r#"swap "a|b" x"#, "rev"]
        );
        assert_eq!(
            split_stages("swap 'x | y' z").unwrap(),
            vec!["swap 'x | y' z"]
        );
        assert_eq!(
            split_stages("gen 1 `2|3`").unwrap(),
            vec!["gen 1 `2|3`"]
        );
    }

    #[test]
    fn split_drops_empty_segments() {
        assert_eq!(split_stages("rev || rev |").unwrap(), vec!["rev", "rev"]);
    }

    #[test]
    fn split_rejoin_preserves_boundaries() {
        let input = r#"swap "a|b" 'c|d' | count -s "|" | rev"#;
        let stages = split_stages(input).unwrap();
        assert_eq!(stages.len(), 3);
        assert_eq!(stages.join(" | "), input);
    }

    #[test]
    fn split_empty_is_error() {
        assert_eq!(split_stages(""), Err(TokenizeError::Empty));
        assert_eq!(split_stages("   "), Err(TokenizeError::Empty));
        assert_eq!(split_stages(" | | "), Err(TokenizeError::NoStages));
    }

    #[test]
    fn unterminated_quote() {
        assert_eq!(
            split_stages(r#"swap "abc x"#),
            Err(TokenizeError::Unterminated {
                quote: '"',
                position: 5
            })
        );
        assert!(check_quotes("gen 1 `2").is_err());
        assert!(check_quotes(r#"swap "it's" x"#).is_ok());
    }

    #[test]
    fn words_whitespace() {
        assert_eq!(split_words("dupl  -c\t3"), vec!["dupl", "-c", "3"]);
    }

    #[test]
    fn words_keep_quotes() {
        assert_eq!(
            split_words(r#"swap "a b" 'c d' `1 + 2`"#),
            vec!["swap", r#""a b""#, "'c d'", "`1 + 2`"]
        );
    }

    #[test]
    fn dequote_plain_is_identity() {
        let ev = Evaluator::default();
        for token in ["rev", "-c", "{$}.", "a\"b"] {
            assert_eq!(dequote(token, &ev).unwrap(), token);
        }
    }

    #[test]
    fn dequote_quotes() {
        let ev = Evaluator::default();
        assert_eq!(dequote(r#""a b""#, &ev).unwrap(), "a b");
        assert_eq!(dequote("'a b'", &ev).unwrap(), "a b");
        assert_eq!(dequote(r#""'""#, &ev).unwrap(), "'");
        assert_eq!(dequote(r#""""#, &ev).unwrap(), "");
    }

    #[test]
    fn dequote_backtick_evaluates() {
        let ev = Evaluator::default();
        assert_eq!(dequote("`2 * 3`", &ev).unwrap(), "6");
        assert_eq!(dequote("`1/2`", &ev).unwrap(), "0.5");
        assert_eq!(dequote("\"`1+1`\"", &ev).unwrap(), "2");
        assert!(dequote("`oops`", &ev).is_err());
    }

    #[test]
    fn parse_append_mode() {
        let p = parse("+rev").unwrap();
        assert_eq!(p.mode, Mode::Append);
        assert_eq!(p.source, "+rev");
        assert_eq!(p.stages.len(), 1);
        assert_eq!(p.stages[0].words, vec!["rev"]);
    }

    #[test]
    fn parse_replace_mode() {
        let p = parse("rev | dupl -c").unwrap();
        assert_eq!(p.mode, Mode::Replace);
        assert_eq!(p.stages[1].text, "dupl -c");
        assert_eq!(p.stages[1].words, vec!["dupl", "-c"]);
    }

    #[test]
    fn parse_lone_plus_is_empty() {
        assert_eq!(parse("+"), Err(TokenizeError::Empty));
        assert_eq!(parse(""), Err(TokenizeError::Empty));
    }
}
