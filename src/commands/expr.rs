use crate::commands::Transmutation;
use crate::commands::options::OptionSpec;
use crate::engine::CommandContext;
use crate::error::TransmuteError;

/// Evaluate the body as arithmetic. Text that does not evaluate is left
/// alone, with a notice through the sink.
pub struct Expr;

impl Transmutation for Expr {
    fn transmute(&mut self, ctx: &mut CommandContext) -> Result<String, TransmuteError> {
        if ctx.options(&OptionSpec::NONE).is_none() {
            return Ok(ctx.unchanged());
        }
        match ctx.services.evaluator.evaluate(ctx.body) {
            Ok(n) => Ok(n.to_string()),
            Err(e) => {
                ctx.report(&format!("Transmutation Error: {e} for {}", ctx.name));
                Ok(ctx.unchanged())
            }
        }
    }
}
