use super::context::ExecutionContext;
use super::error::CommandError;
use super::node::{CommandNode, NodeKind};
use super::parser::ParserRegistry;
use super::CommandSender;
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tracing::error;

/// Translates tree-walk failures into messages for the sender.
pub trait ExceptionHandler: Send + Sync {
    fn handle(&self, sender: &dyn CommandSender, error: &CommandError);
}

/// Sends the failure's own message to the sender. Unexpected and
/// internal failures are additionally logged for operators; the sender
/// only ever sees the generic text.
pub struct DefaultExceptionHandler;

impl ExceptionHandler for DefaultExceptionHandler {
    fn handle(&self, sender: &dyn CommandSender, error: &CommandError) {
        match error {
            CommandError::Unexpected(cause) => {
                error!("unexpected failure in command executor: {cause:#}");
            }
            internal if internal.is_internal() => {
                error!("command registration bug: {internal}");
            }
            _ => {}
        }
        sender.send_message(&error.to_string());
    }
}

/// Owns every registered root command and drives dispatch.
///
/// Registration happens during plugin startup, strictly before the
/// first dispatch; the tree is effectively immutable afterwards and
/// needs no locking on the host's command thread.
pub struct CommandDispatcher {
    roots: FxHashMap<String, CommandNode>,
    registry: Arc<ParserRegistry>,
    exception_handler: Box<dyn ExceptionHandler>,
}

impl CommandDispatcher {
    /// A dispatcher over the built-in parser set.
    pub fn new() -> Self {
        Self::with_registry(Arc::new(ParserRegistry::new()))
    }

    /// A dispatcher over a caller-supplied registry. Custom tags must be
    /// registered before the nodes that reference them are built.
    pub fn with_registry(registry: Arc<ParserRegistry>) -> Self {
        Self {
            roots: FxHashMap::default(),
            registry,
            exception_handler: Box::new(DefaultExceptionHandler),
        }
    }

    pub fn set_exception_handler(&mut self, handler: impl ExceptionHandler + 'static) {
        self.exception_handler = Box::new(handler);
    }

    /// Registers a new root command and returns its node for fluent
    /// configuration. Re-registering a name replaces the earlier tree.
    pub fn register(&mut self, name: &str) -> &mut CommandNode {
        let key = name.to_lowercase();
        let node = CommandNode::root(&key, self.registry.clone());
        match self.roots.entry(key) {
            Entry::Occupied(mut occupied) => {
                occupied.insert(node);
                occupied.into_mut()
            }
            Entry::Vacant(vacant) => vacant.insert(node),
        }
    }

    /// Name and description of every registered command, for building
    /// help screens.
    pub fn commands(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.roots.values().filter_map(|root| match &root.kind {
            NodeKind::Root {
                name, description, ..
            } => Some((name.as_str(), description.as_str())),
            _ => None,
        })
    }

    fn resolve(&self, label: &str) -> Option<&CommandNode> {
        let key = label.to_lowercase();
        self.roots
            .get(&key)
            .or_else(|| self.roots.values().find(|root| root.matches_alias(&key)))
    }

    /// Fully handles one command invocation. Every failure is routed
    /// through the exception policy, so the sender always receives a
    /// response; returns `false` only when no such command exists.
    pub fn dispatch(&self, sender: &dyn CommandSender, label: &str, args: &[&str]) -> bool {
        let Some(root) = self.resolve(label) else {
            return false;
        };
        let mut ctx = ExecutionContext::new(sender, label, args);
        if let Err(err) = root.execute(&mut ctx) {
            self.exception_handler.handle(sender, &err);
        }
        true
    }

    /// Answers one tab-completion request. Malformed requests, unknown
    /// commands, and unreachable branches all yield an empty vector;
    /// completion never disrupts the sender's typing.
    pub fn suggest(&self, sender: &dyn CommandSender, label: &str, args: &[&str]) -> Vec<String> {
        match self.resolve(label) {
            Some(root) => root.suggest(sender, args),
            None => Vec::new(),
        }
    }
}

impl Default for CommandDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
