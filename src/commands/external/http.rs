use crate::commands::Transmutation;
use crate::commands::external::HttpMethod;
use crate::commands::options::OptionSpec;
use crate::engine::CommandContext;
use crate::error::TransmuteError;

/// Pair up `key value key value ...`; a dangling key gets an empty value.
fn pairs(words: &[String]) -> Vec<(String, String)> {
    words
        .chunks(2)
        .map(|c| (c[0].clone(), c.get(1).cloned().unwrap_or_default()))
        .collect()
}

/// `http METHOD [URL KEY VALUE ...]`
///
/// Without a URL argument the body supplies the request: its first
/// shell-style word is the URL, the remaining words are parameters.
pub struct Http;

impl Transmutation for Http {
    fn transmute(&mut self, ctx: &mut CommandContext) -> Result<String, TransmuteError> {
        let Some(opts) = ctx.options(&OptionSpec::NONE) else {
            return Ok(ctx.unchanged());
        };
        let Some(method_word) = opts.arg(0) else {
            return Err(ctx.reject("needs a method: http get|post [URL KEY VALUE ...]"));
        };
        let Some(method) = HttpMethod::parse(method_word) else {
            return Err(ctx.reject(format!("does not support method {method_word:?}")));
        };

        let (url, params) = if opts.args.len() > 1 {
            (opts.args[1].clone(), pairs(&opts.args[2..]))
        } else {
            let words = shlex::split(ctx.body)
                .ok_or_else(|| ctx.reject("could not split the selection into words"))?;
            let Some((url, rest)) = words.split_first() else {
                return Err(ctx.reject("needs a URL in the arguments or the selection"));
            };
            (url.clone(), pairs(rest))
        };

        ctx.services
            .http
            .request(method, &url, &params)
            .map_err(|source| TransmuteError::Collaborator {
                command: ctx.name.to_string(),
                source,
            })
    }
}
