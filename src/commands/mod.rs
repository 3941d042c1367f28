mod context;
mod dispatch;
mod error;
mod node;
mod parser;
mod usage;

pub use context::ExecutionContext;
pub use dispatch::{CommandDispatcher, DefaultExceptionHandler, ExceptionHandler};
pub use error::{CommandError, CommandResult};
pub use node::{CommandExecutor, CommandNode, SuggestionProvider};
pub use parser::{ArgumentParser, ParsedValue, ParserRegistry};

/// The originator of a command invocation, supplied by the host platform.
///
/// The core threads this through as an opaque capability: it only needs
/// permission checks and a message sink. Argument parsers that resolve
/// live state (a connected player, a loaded world) receive the same
/// handle and must answer synchronously.
pub trait CommandSender: Send + Sync {
    /// Display name of the sender, used in messages and logs.
    fn name(&self) -> &str;

    /// Whether the sender holds the given permission node.
    fn has_permission(&self, permission: &str) -> bool;

    /// Writes one message back to the sender.
    fn send_message(&self, message: &str);

    /// Whether the sender is an in-game player rather than the console.
    fn is_player(&self) -> bool {
        false
    }
}
