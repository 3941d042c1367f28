use super::CommandSender;
use rustc_hash::FxHashMap;
use std::any::Any;
use std::sync::Arc;

/// The value produced by a successful parse. Executors recover the
/// concrete type through the typed getters on `ExecutionContext`.
pub type ParsedValue = Box<dyn Any + Send + Sync>;

/// Parsing and completion behavior for one semantic type tag.
///
/// `parse` returning `None` is a non-match signal, not a terminal
/// failure: the tree walk moves on to the next sibling. Parsers must not
/// mutate shared state; sender-scoped lookups (resolving a name to a
/// connected player) are the only permitted side channel.
pub trait ArgumentParser: Send + Sync {
    fn parse(&self, sender: &dyn CommandSender, raw: &str) -> Option<ParsedValue>;

    /// Candidate completions for a partial token. Candidates are not
    /// validated values; the tree applies its own prefix filter.
    fn suggest(&self, _sender: &dyn CommandSender, _partial: &str) -> Vec<String> {
        Vec::new()
    }
}

struct FnParser<F>(F);

impl<F> ArgumentParser for FnParser<F>
where
    F: Fn(&dyn CommandSender, &str) -> Option<ParsedValue> + Send + Sync,
{
    fn parse(&self, sender: &dyn CommandSender, raw: &str) -> Option<ParsedValue> {
        (self.0)(sender, raw)
    }
}

/// Maps semantic type tags to their parsers.
///
/// One registry instance is shared by every node of a dispatcher,
/// injected at construction so tests and plugins can hold isolated
/// registries. Re-registering a tag overwrites the previous parser;
/// last write wins.
pub struct ParserRegistry {
    parsers: FxHashMap<String, Arc<dyn ArgumentParser>>,
}

impl ParserRegistry {
    /// A registry preloaded with the built-in `string`, `integer`,
    /// `float`, and `boolean` tags.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register("string", StringParser);
        registry.register("integer", IntegerParser);
        registry.register("float", FloatParser);
        registry.register("boolean", BooleanParser);
        registry
    }

    pub fn empty() -> Self {
        Self {
            parsers: FxHashMap::default(),
        }
    }

    pub fn register(&mut self, tag: impl Into<String>, parser: impl ArgumentParser + 'static) {
        self.parsers.insert(tag.into(), Arc::new(parser));
    }

    /// Registers a parser from a bare parse function, with no completion
    /// candidates of its own.
    pub fn register_fn<F>(&mut self, tag: impl Into<String>, parse: F)
    where
        F: Fn(&dyn CommandSender, &str) -> Option<ParsedValue> + Send + Sync + 'static,
    {
        self.register(tag, FnParser(parse));
    }

    pub fn get(&self, tag: &str) -> Option<Arc<dyn ArgumentParser>> {
        self.parsers.get(tag).cloned()
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

struct StringParser;

impl ArgumentParser for StringParser {
    fn parse(&self, _sender: &dyn CommandSender, raw: &str) -> Option<ParsedValue> {
        Some(Box::new(raw.to_string()))
    }
}

struct IntegerParser;

impl ArgumentParser for IntegerParser {
    fn parse(&self, _sender: &dyn CommandSender, raw: &str) -> Option<ParsedValue> {
        raw.parse::<i32>().ok().map(|n| Box::new(n) as ParsedValue)
    }
}

struct FloatParser;

impl ArgumentParser for FloatParser {
    fn parse(&self, _sender: &dyn CommandSender, raw: &str) -> Option<ParsedValue> {
        raw.parse::<f64>().ok().map(|f| Box::new(f) as ParsedValue)
    }
}

struct BooleanParser;

impl ArgumentParser for BooleanParser {
    fn parse(&self, _sender: &dyn CommandSender, raw: &str) -> Option<ParsedValue> {
        if raw.eq_ignore_ascii_case("true") {
            Some(Box::new(true))
        } else if raw.eq_ignore_ascii_case("false") {
            Some(Box::new(false))
        } else {
            None
        }
    }

    fn suggest(&self, _sender: &dyn CommandSender, _partial: &str) -> Vec<String> {
        vec!["true".to_string(), "false".to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoSender;

    impl CommandSender for NoSender {
        fn name(&self) -> &str {
            "test"
        }
        fn has_permission(&self, _permission: &str) -> bool {
            true
        }
        fn send_message(&self, _message: &str) {}
    }

    fn parse(tag: &str, raw: &str) -> Option<ParsedValue> {
        ParserRegistry::new().get(tag).unwrap().parse(&NoSender, raw)
    }

    #[test]
    fn integer_accepts_base_10_only() {
        assert_eq!(
            parse("integer", "42").unwrap().downcast_ref::<i32>(),
            Some(&42)
        );
        assert!(parse("integer", "-7").is_some());
        assert!(parse("integer", "4.2").is_none());
        assert!(parse("integer", "fortytwo").is_none());
    }

    #[test]
    fn boolean_is_case_insensitive() {
        assert_eq!(
            parse("boolean", "TRUE").unwrap().downcast_ref::<bool>(),
            Some(&true)
        );
        assert_eq!(
            parse("boolean", "False").unwrap().downcast_ref::<bool>(),
            Some(&false)
        );
        assert!(parse("boolean", "yes").is_none());
    }

    #[test]
    fn float_rejects_non_numeric() {
        assert_eq!(
            parse("float", "1.5").unwrap().downcast_ref::<f64>(),
            Some(&1.5)
        );
        assert!(parse("float", "one").is_none());
    }

    #[test]
    fn last_registration_wins() {
        let mut registry = ParserRegistry::new();
        registry.register_fn("integer", |_: &dyn CommandSender, _: &str| {
            Some(Box::new(99i32) as ParsedValue)
        });
        let parser = registry.get("integer").unwrap();
        assert_eq!(
            parser.parse(&NoSender, "anything").unwrap().downcast_ref::<i32>(),
            Some(&99)
        );
    }

    #[test]
    fn unknown_tag_is_none() {
        assert!(ParserRegistry::new().get("pattern").is_none());
    }
}
