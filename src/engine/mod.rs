pub mod context;
pub mod executor;

pub use context::{CommandContext, Services};
pub use executor::{Executor, RunReport};

use std::collections::HashMap;

use crate::commands::{Builtin, Transmutation};

/// Builds a fresh command instance for one stage.
pub type Factory = Box<dyn Fn() -> Box<dyn Transmutation>>;

enum Entry {
    Builtin(Builtin),
    Custom(Factory),
}

impl Entry {
    fn instantiate(&self) -> Box<dyn Transmutation> {
        match self {
            Entry::Builtin(b) => b.instantiate(),
            Entry::Custom(factory) => factory(),
        }
    }
}

struct Registered {
    name: String,
    summary: String,
    entry: Entry,
}

/// `rev`, `REV` and `Rev` all name the same command.
fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Every command a pipeline stage can name, in registration order.
pub struct CommandRegistry {
    commands: Vec<Registered>,
    index: HashMap<String, usize>,
}

impl CommandRegistry {
    /// An empty registry. Most callers want [`CommandRegistry::with_builtins`].
    pub fn empty() -> Self {
        Self {
            commands: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Registry holding every [`Builtin`].
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for builtin in Builtin::ALL {
            registry.insert(builtin.name(), builtin.summary(), Entry::Builtin(builtin));
        }
        registry
    }

    fn insert(&mut self, name: &str, summary: &str, entry: Entry) -> bool {
        let key = capitalize(name);
        if self.index.contains_key(&key) {
            log::warn!("registry: '{name}' is already registered, keeping the first");
            return false;
        }
        self.index.insert(key, self.commands.len());
        self.commands.push(Registered {
            name: name.to_ascii_lowercase(),
            summary: summary.to_string(),
            entry,
        });
        true
    }

    /// Add a user command. The first registrant of a name wins, so a custom
    /// command cannot shadow a builtin. Returns whether it was added.
    pub fn register<F>(&mut self, name: &str, summary: &str, factory: F) -> bool
    where
        F: Fn() -> Box<dyn Transmutation> + 'static,
    {
        self.insert(name, summary, Entry::Custom(Box::new(factory)))
    }

    /// Case-insensitive lookup; builds a new instance on every hit.
    pub fn resolve(&self, name: &str) -> Option<Box<dyn Transmutation>> {
        let slot = *self.index.get(&capitalize(name))?;
        Some(self.commands[slot].entry.instantiate())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&capitalize(name))
    }

    /// `(name, summary)` for every command, builtins first.
    pub fn available(&self) -> Vec<(String, &str)> {
        self.commands
            .iter()
            .map(|r| (r.name.clone(), r.summary.as_str()))
            .collect()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::context::testing::run;
    use crate::error::TransmuteError;

    struct Shout;

    impl Transmutation for Shout {
        fn transmute(&mut self, ctx: &mut CommandContext) -> Result<String, TransmuteError> {
            Ok(ctx.body.to_uppercase())
        }
    }

    #[test]
    fn capitalize_names() {
        assert_eq!(capitalize("rev"), "Rev");
        assert_eq!(capitalize("MKLIST"), "Mklist");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn resolve_is_case_insensitive() {
        let registry = CommandRegistry::with_builtins();
        assert!(registry.resolve("rev").is_some());
        assert!(registry.resolve("REV").is_some());
        assert!(registry.resolve("Markdown").is_some());
        assert!(registry.resolve("frobnicate").is_none());
    }

    #[test]
    fn builtins_listed_first_in_order() {
        let mut registry = CommandRegistry::with_builtins();
        assert!(registry.register("shout", "Uppercase", || Box::new(Shout)));
        let names: Vec<String> = registry.available().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names[0], "rev");
        assert_eq!(names.len(), Builtin::ALL.len() + 1);
        assert_eq!(names.last().map(String::as_str), Some("shout"));
    }

    #[test]
    fn first_registrant_wins() {
        let mut registry = CommandRegistry::with_builtins();
        assert!(!registry.register("Rev", "not rev", || Box::new(Shout)));
        let Some(rev) = registry.resolve("rev") else {
            panic!("rev missing");
        };
        assert_eq!(run_boxed(rev, "ab"), "ba");
    }

    #[test]
    fn custom_command_resolves() {
        let mut registry = CommandRegistry::empty();
        registry.register("shout", "Uppercase", || Box::new(Shout));
        assert!(registry.contains("SHOUT"));
        let Some(shout) = registry.resolve("shout") else {
            panic!("shout missing");
        };
        assert_eq!(run_boxed(shout, "hey"), "HEY");
    }

    fn run_boxed(command: Box<dyn Transmutation>, body: &str) -> String {
        struct Boxed(Box<dyn Transmutation>);
        impl Transmutation for Boxed {
            fn transmute(&mut self, ctx: &mut CommandContext) -> Result<String, TransmuteError> {
                self.0.transmute(ctx)
            }
        }
        run(Boxed(command), "cmd", body, &[])
    }
}
