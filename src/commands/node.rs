use super::context::ExecutionContext;
use super::error::{CommandError, CommandResult};
use super::parser::{ArgumentParser, ParsedValue, ParserRegistry};
use super::usage;
use super::CommandSender;
use std::sync::Arc;
use tracing::warn;

const DEFAULT_PERMISSION_MESSAGE: &str = "You do not have permission to use this command.";

/// The action attached to a terminal node.
pub trait CommandExecutor: Send + Sync {
    fn execute(&self, ctx: &ExecutionContext<'_>) -> CommandResult<()>;
}

impl<F> CommandExecutor for F
where
    F: Fn(&ExecutionContext<'_>) -> CommandResult<()> + Send + Sync,
{
    fn execute(&self, ctx: &ExecutionContext<'_>) -> CommandResult<()> {
        self(ctx)
    }
}

/// Overrides the parser-supplied completion candidates for one node.
pub trait SuggestionProvider: Send + Sync {
    fn suggestions(&self, sender: &dyn CommandSender, partial: &str) -> Vec<String>;
}

impl<F> SuggestionProvider for F
where
    F: Fn(&dyn CommandSender, &str) -> Vec<String> + Send + Sync,
{
    fn suggestions(&self, sender: &dyn CommandSender, partial: &str) -> Vec<String> {
        self(sender, partial)
    }
}

pub(super) enum NodeKind {
    Root {
        name: String,
        aliases: Vec<String>,
        description: String,
        usage: String,
    },
    Literal {
        text: String,
    },
    Argument {
        name: String,
        tag: String,
        parser: Option<Arc<dyn ArgumentParser>>,
    },
}

struct Requirement {
    predicate: Box<dyn Fn(&dyn CommandSender) -> bool + Send + Sync>,
    fail_message: String,
}

/// One unit of the command tree: the root of a registered command, a
/// literal token, or a typed argument.
///
/// Nodes are built once at registration time through the fluent methods
/// below and never mutated during dispatch. Children are tried in
/// declaration order, so an ambiguous token (a literal whose text a
/// sibling's parser also accepts) goes to whichever child was declared
/// first.
pub struct CommandNode {
    pub(super) kind: NodeKind,
    pub(super) children: Vec<CommandNode>,
    executor: Option<Box<dyn CommandExecutor>>,
    permission: Option<String>,
    permission_message: String,
    requirements: Vec<Requirement>,
    suggestion_override: Option<Box<dyn SuggestionProvider>>,
    registry: Arc<ParserRegistry>,
}

impl CommandNode {
    fn new(kind: NodeKind, registry: Arc<ParserRegistry>) -> Self {
        Self {
            kind,
            children: Vec::new(),
            executor: None,
            permission: None,
            permission_message: DEFAULT_PERMISSION_MESSAGE.to_string(),
            requirements: Vec::new(),
            suggestion_override: None,
            registry,
        }
    }

    pub(super) fn root(name: &str, registry: Arc<ParserRegistry>) -> Self {
        Self::new(
            NodeKind::Root {
                name: name.to_string(),
                aliases: Vec::new(),
                description: String::new(),
                usage: String::new(),
            },
            registry,
        )
    }

    /// Appends a literal child matching `text` case-insensitively.
    pub fn literal(&mut self, text: &str, configure: impl FnOnce(&mut CommandNode)) -> &mut Self {
        let mut child = Self::new(
            NodeKind::Literal {
                text: text.to_string(),
            },
            self.registry.clone(),
        );
        configure(&mut child);
        self.add_child(child);
        self
    }

    /// Appends a typed argument child. The parser for `tag` is resolved
    /// from the registry now; an unregistered tag leaves the child
    /// matching nothing.
    pub fn argument(
        &mut self,
        name: &str,
        tag: &str,
        configure: impl FnOnce(&mut CommandNode),
    ) -> &mut Self {
        let parser = self.registry.get(tag);
        if parser.is_none() {
            warn!("no parser registered for tag '{tag}'; argument '{name}' will never match");
        }
        let mut child = Self::new(
            NodeKind::Argument {
                name: name.to_string(),
                tag: tag.to_string(),
                parser,
            },
            self.registry.clone(),
        );
        configure(&mut child);
        self.add_child(child);
        self
    }

    /// Marks this node as a valid termination point.
    pub fn executes(&mut self, executor: impl CommandExecutor + 'static) -> &mut Self {
        self.executor = Some(Box::new(executor));
        self
    }

    /// Requires `permission` to pass through this node or any of its
    /// descendants. Checked at every visited node along the path.
    pub fn requires_permission(&mut self, permission: &str) -> &mut Self {
        self.permission = Some(permission.to_string());
        self
    }

    /// Replaces the message sent when the permission gate fails.
    pub fn permission_message(&mut self, message: &str) -> &mut Self {
        self.permission_message = message.to_string();
        self
    }

    /// Adds a custom requirement, evaluated in declaration order after
    /// the permission gate. The first failing predicate ends the
    /// dispatch with its message.
    pub fn requires(
        &mut self,
        predicate: impl Fn(&dyn CommandSender) -> bool + Send + Sync + 'static,
        fail_message: &str,
    ) -> &mut Self {
        self.requirements.push(Requirement {
            predicate: Box::new(predicate),
            fail_message: fail_message.to_string(),
        });
        self
    }

    /// Requires the sender to be an in-game player.
    pub fn player_only(&mut self) -> &mut Self {
        self.requires(
            |sender| sender.is_player(),
            "This command can only be run by a player.",
        )
    }

    /// Overrides the completion candidates for this node.
    pub fn suggests(&mut self, provider: impl SuggestionProvider + 'static) -> &mut Self {
        self.suggestion_override = Some(Box::new(provider));
        self
    }

    /// Adds a root alias. Only meaningful on a root node; may be called
    /// any number of times before the first dispatch.
    pub fn alias(&mut self, alias: &str) -> &mut Self {
        match &mut self.kind {
            NodeKind::Root { aliases, .. } => aliases.push(alias.to_lowercase()),
            _ => warn!("alias '{alias}' ignored on a non-root command node"),
        }
        self
    }

    /// Sets the command description. Only meaningful on a root node.
    pub fn description(&mut self, text: &str) -> &mut Self {
        if let NodeKind::Root { description, .. } = &mut self.kind {
            *description = text.to_string();
        }
        self
    }

    /// Sets an explicit usage line, overriding the generated one. Only
    /// meaningful on a root node.
    pub fn usage(&mut self, text: &str) -> &mut Self {
        if let NodeKind::Root { usage, .. } = &mut self.kind {
            *usage = text.to_string();
        }
        self
    }

    fn add_child(&mut self, child: CommandNode) {
        if matches!(child.kind, NodeKind::Literal { .. }) {
            let shadowed_by = self.children.iter().find_map(|sibling| match &sibling.kind {
                NodeKind::Argument { name, tag, .. } => Some((name.clone(), tag.clone())),
                _ => None,
            });
            if let Some((name, tag)) = shadowed_by {
                warn!(
                    "literal '{}' declared after argument '{name}' ({tag}); it is unreachable \
                     whenever that parser accepts its text",
                    child.key()
                );
            }
        }

        let key = child.key().to_lowercase();
        if let Some(existing) = self
            .children
            .iter_mut()
            .find(|sibling| sibling.key().to_lowercase() == key)
        {
            warn!("child '{key}' registered twice; replacing the earlier node");
            *existing = child;
        } else {
            self.children.push(child);
        }
    }

    /// The key a child occupies in its parent: the literal text, the
    /// argument name, or the command name for roots.
    pub(super) fn key(&self) -> &str {
        match &self.kind {
            NodeKind::Root { name, .. } => name,
            NodeKind::Literal { text } => text,
            NodeKind::Argument { name, .. } => name,
        }
    }

    pub(super) fn matches_alias(&self, lower: &str) -> bool {
        match &self.kind {
            NodeKind::Root { aliases, .. } => aliases.iter().any(|alias| alias == lower),
            _ => false,
        }
    }

    pub(super) fn has_executor(&self) -> bool {
        self.executor.is_some()
    }

    /// Whether this node accepts `token`, and the value it parses into.
    ///
    /// Literals accept case-insensitive equality and canonicalize to the
    /// declared text; typed arguments delegate to their parser. `None`
    /// means "try the next sibling", never a terminal failure.
    fn parse_value(&self, sender: &dyn CommandSender, token: &str) -> Option<ParsedValue> {
        match &self.kind {
            NodeKind::Root { .. } => None,
            NodeKind::Literal { text } => token
                .eq_ignore_ascii_case(text)
                .then(|| Box::new(text.clone()) as ParsedValue),
            NodeKind::Argument { parser, .. } => parser.as_ref()?.parse(sender, token),
        }
    }

    fn passes_permission(&self, sender: &dyn CommandSender) -> bool {
        match &self.permission {
            Some(permission) => sender.has_permission(permission),
            None => true,
        }
    }

    fn check_requirements(&self, sender: &dyn CommandSender) -> CommandResult<()> {
        if !self.passes_permission(sender) {
            return Err(CommandError::PermissionDenied {
                message: self.permission_message.clone(),
            });
        }
        for requirement in &self.requirements {
            if !(requirement.predicate)(sender) {
                return Err(CommandError::RequirementFailed {
                    message: requirement.fail_message.clone(),
                });
            }
        }
        Ok(())
    }

    pub(super) fn execute(&self, ctx: &mut ExecutionContext<'_>) -> CommandResult<()> {
        let mut path = vec![self];
        self.execute_recursive(ctx, 0, &mut path)
    }

    /// The matching walk. Requirements gate every visited node; at the
    /// end of input the node must carry an executor; otherwise the first
    /// child whose parser accepts the current token owns the rest of the
    /// walk, with no backtracking.
    fn execute_recursive<'a>(
        &'a self,
        ctx: &mut ExecutionContext<'_>,
        index: usize,
        path: &mut Vec<&'a CommandNode>,
    ) -> CommandResult<()> {
        self.check_requirements(ctx.sender())?;

        let Some(&token) = ctx.raw_args().get(index) else {
            return match &self.executor {
                Some(executor) => executor.execute(ctx),
                None => Err(CommandError::IncompleteCommand {
                    usage: usage::generate(ctx.label(), path),
                }),
            };
        };

        for child in &self.children {
            if let Some(value) = child.parse_value(ctx.sender(), token) {
                ctx.insert_argument(child.key(), value);
                path.push(child);
                return child.execute_recursive(ctx, index + 1, path);
            }
        }

        Err(CommandError::InvalidArgument {
            token: token.to_string(),
        })
    }

    pub(super) fn suggest(&self, sender: &dyn CommandSender, args: &[&str]) -> Vec<String> {
        self.suggest_recursive(sender, args, 0)
    }

    /// The completion walk. Mirrors `execute_recursive` while descending
    /// (single accepting child, same order), then at the last token
    /// collects candidates from every reachable child and filters by
    /// case-insensitive prefix, preserving emission order.
    fn suggest_recursive(&self, sender: &dyn CommandSender, args: &[&str], index: usize) -> Vec<String> {
        if !self.passes_permission(sender) {
            return Vec::new();
        }
        let Some(&current) = args.get(index) else {
            return Vec::new();
        };

        if index == args.len() - 1 {
            let prefix = current.to_lowercase();
            return self
                .children
                .iter()
                .filter(|child| child.passes_permission(sender))
                .flat_map(|child| child.suggestions(sender, current))
                .filter(|candidate| candidate.to_lowercase().starts_with(&prefix))
                .collect();
        }

        for child in &self.children {
            if child.parse_value(sender, current).is_some() {
                return child.suggest_recursive(sender, args, index + 1);
            }
        }
        Vec::new()
    }

    fn suggestions(&self, sender: &dyn CommandSender, partial: &str) -> Vec<String> {
        if let Some(provider) = &self.suggestion_override {
            return provider.suggestions(sender, partial);
        }
        match &self.kind {
            NodeKind::Literal { text } => vec![text.clone()],
            NodeKind::Argument {
                parser: Some(parser),
                ..
            } => parser.suggest(sender, partial),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Console;

    impl CommandSender for Console {
        fn name(&self) -> &str {
            "console"
        }
        fn has_permission(&self, _permission: &str) -> bool {
            true
        }
        fn send_message(&self, _message: &str) {}
    }

    fn registry() -> Arc<ParserRegistry> {
        Arc::new(ParserRegistry::new())
    }

    #[test]
    fn literal_matches_case_insensitively_and_canonicalizes() {
        let mut root = CommandNode::root("test", registry());
        root.literal("Create", |_| {});
        let child = &root.children[0];

        let value = child.parse_value(&Console, "cReAtE").unwrap();
        assert_eq!(value.downcast_ref::<String>().unwrap(), "Create");
        assert!(child.parse_value(&Console, "created").is_none());
    }

    #[test]
    fn typed_node_accepts_iff_parser_accepts() {
        let mut root = CommandNode::root("test", registry());
        root.argument("count", "integer", |_| {});
        let child = &root.children[0];

        assert!(child.parse_value(&Console, "15").is_some());
        assert!(child.parse_value(&Console, "many").is_none());
    }

    #[test]
    fn unregistered_tag_never_matches() {
        let mut root = CommandNode::root("test", registry());
        root.argument("target", "entity", |_| {});
        assert!(root.children[0].parse_value(&Console, "anything").is_none());
    }

    #[test]
    fn duplicate_child_key_replaces_in_place() {
        let mut root = CommandNode::root("test", registry());
        root.literal("list", |_| {});
        root.literal("other", |_| {});
        root.literal("LIST", |node| {
            node.executes(|_ctx: &ExecutionContext<'_>| Ok(()));
        });

        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].key(), "LIST");
        assert!(root.children[0].has_executor());
    }

    #[test]
    fn root_never_accepts_tokens() {
        let root = CommandNode::root("test", registry());
        assert!(root.parse_value(&Console, "test").is_none());
    }
}
