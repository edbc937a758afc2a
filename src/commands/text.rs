use crate::commands::{MAX_OUTPUT_LEN, Transmutation};
use crate::commands::options::OptionSpec;
use crate::engine::CommandContext;
use crate::error::TransmuteError;

/// Reverse the body, character by character. Takes no arguments.
pub struct Rev;

impl Transmutation for Rev {
    fn transmute(&mut self, ctx: &mut CommandContext) -> Result<String, TransmuteError> {
        Ok(ctx.body.chars().rev().collect())
    }
}

/// `swap OLD NEW`
pub struct Swap;

impl Transmutation for Swap {
    fn transmute(&mut self, ctx: &mut CommandContext) -> Result<String, TransmuteError> {
        let Some(opts) = ctx.options(&OptionSpec::NONE) else {
            return Ok(ctx.unchanged());
        };
        match (opts.arg(0), opts.arg(1)) {
            (Some(old), Some(new)) => Ok(ctx.body.replace(old, new)),
            _ => Err(ctx.reject("command needs arguments: swap OLD NEW")),
        }
    }
}

/// Apply `f` to each line and rejoin, dropping trailing newlines.
fn map_lines<'b>(body: &'b str, f: impl FnMut(&'b str) -> Option<String>) -> String {
    let joined: Vec<String> = body.split('\n').filter_map(f).collect();
    joined.join("\n").trim_end_matches('\n').to_string()
}

fn required_pattern(ctx: &mut CommandContext, usage: &str) -> Result<Option<String>, TransmuteError> {
    let Some(opts) = ctx.options(&OptionSpec::NONE) else {
        return Ok(None);
    };
    match opts.arg(0) {
        Some(pattern) => Ok(Some(pattern.to_string())),
        None => Err(ctx.reject(format!("command needs a pattern: {usage}"))),
    }
}

/// `strip PATTERN`: remove every occurrence of PATTERN from each line.
pub struct Strip;

impl Transmutation for Strip {
    fn transmute(&mut self, ctx: &mut CommandContext) -> Result<String, TransmuteError> {
        let Some(pattern) = required_pattern(ctx, "strip PATTERN")? else {
            return Ok(ctx.unchanged());
        };
        Ok(map_lines(ctx.body, |line| Some(line.replace(&pattern, ""))))
    }
}

/// `filter PATTERN`: keep the lines containing PATTERN (case-sensitive).
pub struct Filter;

impl Transmutation for Filter {
    fn transmute(&mut self, ctx: &mut CommandContext) -> Result<String, TransmuteError> {
        let Some(pattern) = required_pattern(ctx, "filter PATTERN")? else {
            return Ok(ctx.unchanged());
        };
        Ok(map_lines(ctx.body, |line| {
            line.contains(pattern.as_str()).then(|| line.to_string())
        }))
    }
}

/// `expand [N]`: follow every line with N blank lines (default 1).
pub struct Expand;

impl Transmutation for Expand {
    fn transmute(&mut self, ctx: &mut CommandContext) -> Result<String, TransmuteError> {
        let Some(opts) = ctx.options(&OptionSpec::NONE) else {
            return Ok(ctx.unchanged());
        };
        let blank_lines = match opts.arg(0) {
            None => 1,
            Some(n) => n
                .parse::<usize>()
                .map_err(|_| ctx.reject(format!("multiplier must be a whole number, got {n:?}")))?,
        };
        let line_count = ctx.body.matches('\n').count() + 1;
        let too_large = || ctx.reject(format!("multiplier {blank_lines} is too large"));
        let gap_len = blank_lines.checked_add(1).ok_or_else(too_large)?;
        let total = gap_len
            .checked_mul(line_count)
            .and_then(|gaps| gaps.checked_add(ctx.body.len()))
            .ok_or_else(too_large)?;
        if total > MAX_OUTPUT_LEN {
            return Err(too_large());
        }
        let gap = "\n".repeat(gap_len);
        let mut out = String::with_capacity(total);
        for line in ctx.body.split('\n') {
            out.push_str(line);
            out.push_str(&gap);
        }
        Ok(out.trim_end_matches('\n').to_string())
    }
}

/// Join all non-blank lines with single spaces.
pub struct Compress;

impl Transmutation for Compress {
    fn transmute(&mut self, ctx: &mut CommandContext) -> Result<String, TransmuteError> {
        let lines: Vec<&str> = ctx
            .body
            .split('\n')
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .collect();
        Ok(lines.join(" ").trim_end().to_string())
    }
}
