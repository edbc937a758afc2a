//! Mutation commands: one type per command, each parsing its own flags.
//!
//! Builtins are a closed set ([`Builtin`]); user commands implement the same
//! [`Transmutation`] trait and are added through
//! [`CommandRegistry::register`](crate::engine::CommandRegistry::register).

/// `count`: characters, lines, words or substring occurrences.
pub mod count;
/// `dupl`: repeat the body.
pub mod dupl;
/// `expr`: evaluate the body as arithmetic.
pub mod expr;
/// Commands backed by outside collaborators (`http`, `markdown`).
pub mod external;
/// `gen` / `mklist`: numeric and alphabetic ranges.
pub mod generate;
/// `map`: key/value words to a dictionary literal.
pub mod map;
/// getopt-style flag parsing shared by all commands.
pub mod options;
/// `perms`: distinct character permutations.
pub mod perms;
/// Line and substring edits: `rev`, `swap`, `strip`, `expand`, `compress`, `filter`.
pub mod text;

use crate::engine::CommandContext;
use crate::error::TransmuteError;

/// Largest body, in bytes, that `dupl` and `expand` will build.
pub const MAX_OUTPUT_LEN: usize = 64 << 20;

/// A text transformation.
///
/// A fresh instance is built for every stage, so flag state parsed into
/// `self` never leaks from one invocation into the next.
pub trait Transmutation {
    /// Produce the new body from `ctx.body` and `ctx.params`.
    fn transmute(&mut self, ctx: &mut CommandContext) -> Result<String, TransmuteError>;
}

/// Every built-in command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Rev,
    Expr,
    Swap,
    Count,
    Dupl,
    Gen,
    Mklist,
    Strip,
    Expand,
    Compress,
    Filter,
    Perms,
    Map,
    Http,
    Markdown,
}

impl Builtin {
    /// Registration order.
    pub const ALL: [Builtin; 15] = [
        Builtin::Rev,
        Builtin::Expr,
        Builtin::Swap,
        Builtin::Count,
        Builtin::Dupl,
        Builtin::Gen,
        Builtin::Mklist,
        Builtin::Strip,
        Builtin::Expand,
        Builtin::Compress,
        Builtin::Filter,
        Builtin::Perms,
        Builtin::Map,
        Builtin::Http,
        Builtin::Markdown,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Rev => "rev",
            Builtin::Expr => "expr",
            Builtin::Swap => "swap",
            Builtin::Count => "count",
            Builtin::Dupl => "dupl",
            Builtin::Gen => "gen",
            Builtin::Mklist => "mklist",
            Builtin::Strip => "strip",
            Builtin::Expand => "expand",
            Builtin::Compress => "compress",
            Builtin::Filter => "filter",
            Builtin::Perms => "perms",
            Builtin::Map => "map",
            Builtin::Http => "http",
            Builtin::Markdown => "markdown",
        }
    }

    /// One-line description for command menus.
    pub fn summary(self) -> &'static str {
        match self {
            Builtin::Rev => "Reverse the selection",
            Builtin::Expr => "Evaluate the selection as arithmetic",
            Builtin::Swap => "swap OLD NEW: replace every OLD with NEW",
            Builtin::Count => "Count characters; -l lines, -w words, -s STR occurrences",
            Builtin::Dupl => "dupl [N]: repeat N times (default 2); -c without newlines",
            Builtin::Gen | Builtin::Mklist => {
                "START END [STEP]: generate a range; -c close up, -p TEMPLATE with {$}"
            }
            Builtin::Strip => "strip PATTERN: remove PATTERN from every line",
            Builtin::Expand => "expand [N]: add N blank lines after every line",
            Builtin::Compress => "Join all lines with single spaces",
            Builtin::Filter => "filter PATTERN: keep lines containing PATTERN",
            Builtin::Perms => "List distinct permutations of a short selection",
            Builtin::Map => "map [EXT]: turn `name key value ...` into a map literal",
            Builtin::Http => "http METHOD [URL KEY VALUE ...]: fetch a response body",
            Builtin::Markdown => "markdown [INDENT]: render Markdown to indented HTML",
        }
    }

    /// A fresh command instance.
    pub fn instantiate(self) -> Box<dyn Transmutation> {
        match self {
            Builtin::Rev => Box::new(text::Rev),
            Builtin::Expr => Box::new(expr::Expr),
            Builtin::Swap => Box::new(text::Swap),
            Builtin::Count => Box::new(count::Count),
            Builtin::Dupl => Box::new(dupl::Dupl::default()),
            Builtin::Gen | Builtin::Mklist => Box::new(generate::Gen::default()),
            Builtin::Strip => Box::new(text::Strip),
            Builtin::Expand => Box::new(text::Expand),
            Builtin::Compress => Box::new(text::Compress),
            Builtin::Filter => Box::new(text::Filter),
            Builtin::Perms => Box::new(perms::Perms),
            Builtin::Map => Box::new(map::MapLiteral),
            Builtin::Http => Box::new(external::http::Http),
            Builtin::Markdown => Box::new(external::markdown::Markdown),
        }
    }
}
