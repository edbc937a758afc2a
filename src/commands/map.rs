use crate::commands::Transmutation;
use crate::commands::options::OptionSpec;
use crate::engine::CommandContext;
use crate::error::TransmuteError;
use crate::parse::{split_words, strip_quotes};

/// Target syntax for a generated map literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Python,
    JavaScript,
    Clojure,
}

impl Dialect {
    /// Match a file extension (with or without the dot, any case).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "py" | "python" | "pyw" => Some(Dialect::Python),
            "js" | "javascript" | "jsx" | "mjs" | "ts" | "tsx" => Some(Dialect::JavaScript),
            "clj" | "cljs" | "cljc" | "edn" | "clojure" => Some(Dialect::Clojure),
            _ => None,
        }
    }

    fn render(self, indent: &str, name: &str, pairs: &[(String, String)]) -> String {
        match self {
            Dialect::Python => {
                let entries: Vec<String> = pairs.iter().map(|(k, v)| format!("\"{k}\": {v}")).collect();
                format!("{indent}{name} = {{{}}}", entries.join(", "))
            }
            Dialect::JavaScript => {
                let entries: Vec<String> = pairs.iter().map(|(k, v)| format!("\"{k}\": {v}")).collect();
                format!("{indent}const {name} = {{{}}};", entries.join(", "))
            }
            Dialect::Clojure => {
                let entries: Vec<String> = pairs.iter().map(|(k, v)| format!("\"{k}\" {v}")).collect();
                format!("{indent}(def {name} {{{}}})", entries.join(" "))
            }
        }
    }
}

/// Convert one `name key value key value ...` line.
fn convert_line(line: &str, dialect: Dialect) -> String {
    let indent_len = line.len() - line.trim_start().len();
    let (indent, rest) = line.split_at(indent_len);
    let words = split_words(rest);
    let Some((name, tail)) = words.split_first() else {
        return line.to_string();
    };
    let pairs: Vec<(String, String)> = tail
        .chunks(2)
        .map(|pair| {
            let key = strip_quotes(&pair[0]).to_string();
            let value = pair.get(1).cloned().unwrap_or_else(|| "\"\"".to_string());
            (key, value)
        })
        .collect();
    dialect.render(indent, name, &pairs)
}

/// `map [EXT]`: each non-blank `name key value ...` line becomes a map
/// literal in the language of EXT (or the host buffer's extension).
///
/// Keys are quoted, values are copied verbatim, and a dangling key gets `""`.
pub struct MapLiteral;

impl Transmutation for MapLiteral {
    fn transmute(&mut self, ctx: &mut CommandContext) -> Result<String, TransmuteError> {
        let Some(opts) = ctx.options(&OptionSpec::NONE) else {
            return Ok(ctx.unchanged());
        };
        let Some(ext) = opts.arg(0).or(ctx.syntax) else {
            return Err(ctx.reject("needs a target extension: map py|js|clj"));
        };
        let Some(dialect) = Dialect::from_extension(ext) else {
            return Err(ctx.reject(format!("does not support extension {ext:?}")));
        };
        let lines: Vec<String> = ctx
            .body
            .split('\n')
            .map(|line| {
                if line.trim().is_empty() {
                    line.to_string()
                } else {
                    convert_line(line, dialect)
                }
            })
            .collect();
        Ok(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::context::testing::run_with;

    fn map(body: &str, params: &[&str]) -> String {
        run_with(MapLiteral, "map", body, params, None).0.unwrap()
    }

    #[test]
    fn python() {
        assert_eq!(
            map(r#"user name "bob" age 3"#, &["py"]),
            r#"user = {"name": "bob", "age": 3}"#
        );
    }

    #[test]
    fn javascript() {
        assert_eq!(
            map(r#"user name "bob" age 3"#, &["js"]),
            r#"const user = {"name": "bob", "age": 3};"#
        );
    }

    #[test]
    fn clojure() {
        assert_eq!(
            map(r#"user name "bob" age 3"#, &["clj"]),
            r#"(def user {"name" "bob" "age" 3})"#
        );
    }

    #[test]
    fn dangling_key_and_indent() {
        assert_eq!(
            map(r#"    cfg "debug" true verbose"#, &["py"]),
            r#"    cfg = {"debug": true, "verbose": ""}"#
        );
        assert_eq!(map("empty", &["py"]), "empty = {}");
    }

    #[test]
    fn extension_from_host() {
        let (result, _) = run_with(MapLiteral, "map", "m a 1", &[], Some("tsx"));
        assert_eq!(result.unwrap(), r#"const m = {"a": 1};"#);
    }

    #[test]
    fn unsupported_or_missing_extension() {
        assert!(run_with(MapLiteral, "map", "m a 1", &["rb"], None).0.is_err());
        assert!(run_with(MapLiteral, "map", "m a 1", &[], None).0.is_err());
    }

    #[test]
    fn multiple_lines() {
        assert_eq!(
            map("a x 1\n\nb y 2", &["py"]),
            "a = {\"x\": 1}\n\nb = {\"y\": 2}"
        );
    }
}
