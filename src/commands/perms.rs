use itertools::Itertools;

use crate::commands::Transmutation;
use crate::engine::CommandContext;
use crate::error::TransmuteError;

/// Longest body `perms` accepts (7! lines is already unreadable).
pub const MAX_LEN: usize = 6;

/// Every distinct ordering of the body's characters, one per line.
pub struct Perms;

impl Transmutation for Perms {
    fn transmute(&mut self, ctx: &mut CommandContext) -> Result<String, TransmuteError> {
        let chars: Vec<char> = ctx.body.chars().collect();
        if chars.len() > MAX_LEN {
            return Err(ctx.reject(format!(
                "input too big: {} characters (limit {MAX_LEN})",
                chars.len()
            )));
        }
        Ok(chars
            .iter()
            .permutations(chars.len())
            .map(|p| p.into_iter().collect::<String>())
            .unique()
            .join("\n"))
    }
}
