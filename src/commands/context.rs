use super::error::{CommandError, CommandResult};
use super::parser::ParsedValue;
use super::CommandSender;
use rustc_hash::FxHashMap;

/// Everything an executor may inspect about one dispatch: the sender,
/// the label the command was invoked under, the raw token vector, and
/// the arguments parsed along the matched path.
///
/// Built fresh per dispatch and populated monotonically as the walk
/// descends; argument names are stored lowercased, so access is
/// case-insensitive. Reusing one argument name in nested scopes is a
/// registration error: the inner write overwrites the outer one.
pub struct ExecutionContext<'a> {
    sender: &'a dyn CommandSender,
    label: &'a str,
    raw_args: &'a [&'a str],
    arguments: FxHashMap<String, ParsedValue>,
}

impl<'a> ExecutionContext<'a> {
    pub(super) fn new(sender: &'a dyn CommandSender, label: &'a str, raw_args: &'a [&'a str]) -> Self {
        Self {
            sender,
            label,
            raw_args,
            arguments: FxHashMap::default(),
        }
    }

    pub fn sender(&self) -> &'a dyn CommandSender {
        self.sender
    }

    pub fn label(&self) -> &'a str {
        self.label
    }

    pub fn raw_args(&self) -> &'a [&'a str] {
        self.raw_args
    }

    pub(super) fn insert_argument(&mut self, name: &str, value: ParsedValue) {
        self.arguments.insert(name.to_lowercase(), value);
    }

    /// Retrieves a parsed argument by name. Missing names and type
    /// mismatches are registration bugs, reported as internal errors.
    pub fn get<T: 'static>(&self, name: &str) -> CommandResult<&T> {
        let value = self
            .arguments
            .get(&name.to_lowercase())
            .ok_or_else(|| CommandError::MissingArgument {
                name: name.to_string(),
            })?;
        value
            .downcast_ref::<T>()
            .ok_or_else(|| CommandError::WrongArgumentType {
                name: name.to_string(),
            })
    }

    /// Like [`get`](Self::get), but falls back to `default` when the
    /// argument was not populated (an optional branch was not taken).
    pub fn get_or<T: Clone + 'static>(&self, name: &str, default: T) -> T {
        match self.get::<T>(name) {
            Ok(value) => value.clone(),
            Err(_) => default,
        }
    }

    pub fn get_string(&self, name: &str) -> CommandResult<String> {
        Ok(self.get::<String>(name)?.clone())
    }

    pub fn get_integer(&self, name: &str) -> CommandResult<i32> {
        Ok(*self.get::<i32>(name)?)
    }

    pub fn get_float(&self, name: &str) -> CommandResult<f64> {
        Ok(*self.get::<f64>(name)?)
    }

    pub fn get_boolean(&self, name: &str) -> CommandResult<bool> {
        Ok(*self.get::<bool>(name)?)
    }

    /// Writes one message back to the sender.
    pub fn reply(&self, message: &str) {
        self.sender.send_message(message);
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

    #[test]
    fn argument_access_is_case_insensitive() {
        let args = ["Phoenix"];
        let mut ctx = ExecutionContext::new(&Console, "team", &args);
        ctx.insert_argument("Name", Box::new("Phoenix".to_string()));

        assert_eq!(ctx.get_string("name").unwrap(), "Phoenix");
        assert_eq!(ctx.get_string("NAME").unwrap(), "Phoenix");
    }

    #[test]
    fn missing_and_mistyped_arguments_are_internal_errors() {
        let args: [&str; 0] = [];
        let mut ctx = ExecutionContext::new(&Console, "team", &args);
        ctx.insert_argument("count", Box::new(3i32));

        assert!(matches!(
            ctx.get_string("absent"),
            Err(CommandError::MissingArgument { .. })
        ));
        assert!(matches!(
            ctx.get_string("count"),
            Err(CommandError::WrongArgumentType { .. })
        ));
        assert_eq!(ctx.get_integer("count").unwrap(), 3);
    }

    #[test]
    fn get_or_falls_back_to_default() {
        let args: [&str; 0] = [];
        let ctx = ExecutionContext::new(&Console, "page", &args);
        assert_eq!(ctx.get_or("page", 1i32), 1);
    }
}
