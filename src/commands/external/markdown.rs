use crate::commands::Transmutation;
use crate::commands::options::OptionSpec;
use crate::engine::CommandContext;
use crate::error::TransmuteError;

/// Widest indent step `markdown` accepts.
pub const MAX_INDENT: usize = 64;

const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

enum Piece<'h> {
    Open(&'h str),
    Close(&'h str),
    /// Void element, self-closing tag, comment or doctype.
    Standalone(&'h str),
    /// `<pre>...</pre>`, kept byte for byte.
    Verbatim(&'h str),
    Text(&'h str),
}

fn tag_name(tag: &str) -> String {
    tag.trim_start_matches(['<', '/'])
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

fn pieces(html: &str) -> Vec<Piece<'_>> {
    let mut out = Vec::new();
    let mut rest = html;
    while !rest.is_empty() {
        let Some(lt) = rest.find('<') else {
            out.push(Piece::Text(rest));
            break;
        };
        if lt > 0 {
            out.push(Piece::Text(&rest[..lt]));
            rest = &rest[lt..];
            continue;
        }
        let Some(gt) = rest.find('>') else {
            out.push(Piece::Text(rest));
            break;
        };
        let tag = &rest[..=gt];
        let name = tag_name(tag);
        if name == "pre" && !tag.starts_with("</") {
            let end = rest.find("</pre>").map_or(rest.len(), |i| i + "</pre>".len());
            out.push(Piece::Verbatim(&rest[..end]));
            rest = &rest[end..];
            continue;
        }
        let piece = if tag.starts_with("</") {
            Piece::Close(tag)
        } else if tag.starts_with("<!") || tag.ends_with("/>") || VOID_ELEMENTS.contains(&name.as_str()) {
            Piece::Standalone(tag)
        } else {
            Piece::Open(tag)
        };
        out.push(piece);
        rest = &rest[gt + 1..];
    }
    out
}

/// Put every tag and text run on its own line, indented `indent` spaces
/// per nesting level. `indent` is clamped to [`MAX_INDENT`].
pub fn reindent(html: &str, indent: usize) -> String {
    let indent = indent.min(MAX_INDENT);
    let mut lines = Vec::new();
    let mut depth = 0usize;
    let pad = |depth: usize| " ".repeat(depth.saturating_mul(indent));
    for piece in pieces(html) {
        match piece {
            Piece::Open(tag) => {
                lines.push(format!("{}{tag}", pad(depth)));
                depth += 1;
            }
            Piece::Close(tag) => {
                depth = depth.saturating_sub(1);
                lines.push(format!("{}{tag}", pad(depth)));
            }
            Piece::Standalone(tag) => lines.push(format!("{}{tag}", pad(depth))),
            Piece::Verbatim(block) => lines.push(format!("{}{}", pad(depth), block.trim_end())),
            Piece::Text(text) => {
                for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
                    lines.push(format!("{}{line}", pad(depth)));
                }
            }
        }
    }
    lines.join("\n")
}

/// `markdown [INDENT]`: render the body as HTML and reindent it.
pub struct Markdown;

impl Transmutation for Markdown {
    fn transmute(&mut self, ctx: &mut CommandContext) -> Result<String, TransmuteError> {
        let Some(opts) = ctx.options(&OptionSpec::NONE) else {
            return Ok(ctx.unchanged());
        };
        let indent = match opts.arg(0) {
            None => ctx.services.markdown_indent,
            Some(s) if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) => s
                .parse::<usize>()
                .ok()
                .filter(|&n| n <= MAX_INDENT)
                .ok_or_else(|| ctx.reject(format!("indent {s:?} is too large (limit {MAX_INDENT})")))?,
            Some(s) => return Err(ctx.reject(format!("indent must be digits only, got {s:?}"))),
        };
        let html = ctx
            .services
            .markdown
            .render(ctx.body)
            .map_err(|source| TransmuteError::Collaborator {
                command: ctx.name.to_string(),
                source,
            })?;
        Ok(reindent(&html, indent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::context::testing::run_with;

    #[test]
    fn reindent_nesting() {
        assert_eq!(
            reindent("<ul>\n<li>a</li>\n<li>b <em>c</em></li>\n</ul>\n", 2),
            "<ul>\n  <li>\n    a\n  </li>\n  <li>\n    b\n    <em>\n      c\n    </em>\n  </li>\n</ul>"
        );
    }

    #[test]
    fn reindent_void_and_pre() {
        assert_eq!(
            reindent("<p>a<br />b</p>\n<hr />\n<pre><code>x\n  y\n</code></pre>\n", 4),
            "<p>\n    a\n    <br />\n    b\n</p>\n<hr />\n<pre><code>x\n  y\n</code></pre>"
        );
    }

    #[test]
    fn renders_and_indents() {
        let (result, _) = run_with(Markdown, "markdown", "# Hi\n\nsome *text*", &["3"], None);
        assert_eq!(
            result.unwrap(),
            "<h1>\n   Hi\n</h1>\n<p>\n   some\n   <em>\n      text\n   </em>\n</p>"
        );
    }

    #[test]
    fn default_indent() {
        let (result, _) = run_with(Markdown, "markdown", "para", &[], None);
        assert_eq!(result.unwrap(), "<p>\n  para\n</p>");
    }

    #[test]
    fn non_numeric_indent_rejected() {
        let (result, _) = run_with(Markdown, "markdown", "para", &["two"], None);
        assert!(matches!(result, Err(TransmuteError::Rejected { .. })));
    }

    #[test]
    fn oversized_indent_rejected() {
        for indent in ["65", "18446744073709551615", "99999999999999999999999"] {
            let (result, _) = run_with(Markdown, "markdown", "- a\n  - b", &[indent], None);
            assert!(
                matches!(&result, Err(TransmuteError::Rejected { reason, .. }) if reason.contains("too large")),
                "{indent}: {result:?}"
            );
        }
        let (result, _) = run_with(Markdown, "markdown", "para", &["64"], None);
        assert_eq!(result.unwrap(), format!("<p>\n{}para\n</p>", " ".repeat(64)));
    }

    #[test]
    fn reindent_clamps_indent() {
        assert_eq!(reindent("<p>a</p>", usize::MAX), reindent("<p>a</p>", MAX_INDENT));
    }
}
