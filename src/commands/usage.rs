use super::node::{CommandNode, NodeKind};
use itertools::Itertools;

/// Renders a usage line for the partial path a failed walk reached.
/// An explicit usage string on the root wins over the generated form.
pub(super) fn generate(label: &str, path: &[&CommandNode]) -> String {
    if let Some(root) = path.first() {
        if let NodeKind::Root { usage, .. } = &root.kind {
            if !usage.is_empty() {
                return usage.clone();
            }
        }
    }

    let mut parts = vec![format!("/{label}")];
    parts.extend(path.iter().skip(1).map(|node| display_name(node)));
    if let Some(last) = path.last() {
        let tail = continuation(last);
        if !tail.is_empty() {
            parts.push(tail);
        }
    }
    parts.join(" ")
}

/// What can follow a node: a single child renders inline, alternatives
/// render as `(a | b | <c>)`. The whole tail is bracketed when the node
/// itself is executable, since everything after it is optional.
fn continuation(node: &CommandNode) -> String {
    let rendered = match node.children.as_slice() {
        [] => return String::new(),
        [only] => {
            let deeper = continuation(only);
            if deeper.is_empty() {
                display_name(only)
            } else {
                format!("{} {}", display_name(only), deeper)
            }
        }
        children => {
            let alternatives = children.iter().map(display_name).join(" | ");
            if node.has_executor() {
                alternatives
            } else {
                return format!("({alternatives})");
            }
        }
    };
    if node.has_executor() {
        format!("[{rendered}]")
    } else {
        rendered
    }
}

fn display_name(node: &CommandNode) -> String {
    match &node.kind {
        NodeKind::Root { name, .. } => format!("/{name}"),
        NodeKind::Literal { text } => text.clone(),
        NodeKind::Argument { name, .. } => format!("<{name}>"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::ParserRegistry;
    use std::sync::Arc;

    #[test]
    fn renders_path_and_continuation() {
        let mut root = CommandNode::root("team", Arc::new(ParserRegistry::new()));
        root.literal("create", |create| {
            create.argument("name", "string", |_| {});
        });
        root.literal("list", |_| {});

        let create = &root.children[0];
        let path = vec![&root, create];
        assert_eq!(generate("team", &path), "/team create <name>");

        let path = vec![&root];
        assert_eq!(generate("team", &path), "/team (create | list)");
    }

    #[test]
    fn executable_nodes_render_optional_tails() {
        use crate::commands::ExecutionContext;

        let mut root = CommandNode::root("speed", Arc::new(ParserRegistry::new()));
        root.argument("value", "float", |value| {
            value
                .executes(|_ctx: &ExecutionContext<'_>| Ok(()))
                .argument("notify", "boolean", |_| {});
        });

        let value = &root.children[0];
        let path = vec![&root, value];
        assert_eq!(generate("speed", &path), "/speed <value> [<notify>]");
    }

    #[test]
    fn explicit_usage_wins() {
        let mut root = CommandNode::root("team", Arc::new(ParserRegistry::new()));
        root.usage("/team create <name>");
        let path = vec![&root];
        assert_eq!(generate("team", &path), "/team create <name>");
    }
}
