use crate::commands::{MAX_OUTPUT_LEN, Transmutation};
use crate::commands::options::OptionSpec;
use crate::engine::CommandContext;
use crate::error::TransmuteError;

const FLAGS: OptionSpec = OptionSpec {
    short: "c",
    long: &["close"],
};

/// `dupl [-c] [N]`: `(body + separator)` repeated N times.
///
/// The separator is a newline unless `-c`/`--close` is given. N defaults to
/// 2 and must be a non-negative integer; output over [`MAX_OUTPUT_LEN`]
/// bytes is rejected.
pub struct Dupl {
    separator: &'static str,
    multiplier: usize,
}

impl Default for Dupl {
    fn default() -> Self {
        Self {
            separator: "\n",
            multiplier: 2,
        }
    }
}

impl Transmutation for Dupl {
    fn transmute(&mut self, ctx: &mut CommandContext) -> Result<String, TransmuteError> {
        let Some(opts) = ctx.options(&FLAGS) else {
            return Ok(ctx.unchanged());
        };
        if opts.has(&["-c", "--close"]) {
            self.separator = "";
        }
        if let Some(n) = opts.arg(0) {
            self.multiplier = n.parse().map_err(|_| {
                ctx.reject(format!("multiplier must be a non-negative integer, got {n:?}"))
            })?;
        }
        let unit = format!("{}{}", ctx.body, self.separator);
        match unit.len().checked_mul(self.multiplier) {
            Some(total) if total <= MAX_OUTPUT_LEN => Ok(unit.repeat(self.multiplier)),
            _ => Err(ctx.reject(format!(
                "multiplier {} is too large (limit {MAX_OUTPUT_LEN} bytes of output)",
                self.multiplier
            ))),
        }
    }
}
