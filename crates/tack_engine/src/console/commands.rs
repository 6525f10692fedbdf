//! Console command table
//!
//! Commands are registered explicitly at startup under a dotted call string
//! (`renderer.setVSync`). A submitted line is split on whitespace, token 0 is
//! matched case-sensitively and the handler receives every token, including
//! the call string itself.

use super::ConsoleError;
use std::collections::BTreeMap;

/// Command handler, called with the full token list
pub type CommandHandler<C> = fn(&mut C, &[String]);

/// Help text for one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSummary {
    /// Call string
    pub call: String,
    /// Accepted argument forms; the first is the no-argument form
    pub signatures: Vec<String>,
    /// One-line description
    pub description: String,
}

impl CommandSummary {
    /// `call sig1 | call sig2` form used by `help`
    pub fn usage(&self) -> String {
        if self.signatures.is_empty() {
            return self.call.clone();
        }
        self.signatures
            .iter()
            .map(|signature| {
                if signature.is_empty() {
                    self.call.clone()
                } else {
                    format!("{} {}", self.call, signature)
                }
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

struct RegisteredCommand<C> {
    handler: CommandHandler<C>,
    summary: CommandSummary,
}

/// Mapping from call string to handler
pub struct CommandRegistry<C> {
    commands: BTreeMap<String, RegisteredCommand<C>>,
}

impl<C> Default for CommandRegistry<C> {
    fn default() -> Self {
        Self {
            commands: BTreeMap::new(),
        }
    }
}

impl<C> CommandRegistry<C> {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command
    ///
    /// A call string that is already taken is rejected and the first
    /// registration stays in place.
    pub fn register(
        &mut self,
        call: &str,
        signatures: &[&str],
        description: &str,
        handler: CommandHandler<C>,
    ) -> Result<(), ConsoleError> {
        if call.is_empty() || call.chars().any(char::is_whitespace) {
            log::error!("Invalid console command name '{}'", call);
            return Err(ConsoleError::InvalidCommandName(call.to_string()));
        }
        if self.commands.contains_key(call) {
            log::warn!("Console command '{}' is already registered", call);
            return Err(ConsoleError::DuplicateCommand(call.to_string()));
        }

        self.commands.insert(
            call.to_string(),
            RegisteredCommand {
                handler,
                summary: CommandSummary {
                    call: call.to_string(),
                    signatures: signatures.iter().map(ToString::to_string).collect(),
                    description: description.to_string(),
                },
            },
        );
        log::debug!("Registered console command '{}'", call);
        Ok(())
    }

    /// Run a submitted line against `context`
    pub fn dispatch(&self, context: &mut C, line: &str) -> Result<(), ConsoleError> {
        let tokens: Vec<String> = line.split_whitespace().map(ToString::to_string).collect();
        let Some(call) = tokens.first() else {
            return Err(ConsoleError::EmptyCommand);
        };

        match self.commands.get(call.as_str()) {
            Some(command) => {
                (command.handler)(context, &tokens);
                Ok(())
            }
            None => {
                log::error!("Unknown command '{}', type 'help' for a list", call);
                Err(ConsoleError::UnknownCommand(call.clone()))
            }
        }
    }

    /// Whether `call` is registered
    pub fn contains(&self, call: &str) -> bool {
        self.commands.contains_key(call)
    }

    /// Number of registered commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Help entries sorted by call string
    pub fn summaries(&self) -> Vec<CommandSummary> {
        self.commands.values().map(|command| command.summary.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Vec<String>>,
        vsync: Option<bool>,
    }

    fn help(ctx: &mut Recorder, args: &[String]) {
        ctx.calls.push(args.to_vec());
    }

    fn set_vsync(ctx: &mut Recorder, args: &[String]) {
        ctx.calls.push(args.to_vec());
        ctx.vsync = args.get(1).and_then(|value| value.parse().ok());
    }

    fn registry() -> CommandRegistry<Recorder> {
        let mut registry = CommandRegistry::new();
        registry.register("help", &[""], "List commands", help).unwrap();
        registry
            .register("renderer.setVSync", &["", "<true|false>"], "Toggle vsync", set_vsync)
            .unwrap();
        registry
    }

    #[test]
    fn test_dispatch_passes_all_tokens() {
        let registry = registry();
        let mut recorder = Recorder::default();

        registry.dispatch(&mut recorder, "renderer.setVSync   true").unwrap();
        assert_eq!(recorder.calls, vec![vec!["renderer.setVSync".to_string(), "true".to_string()]]);
        assert_eq!(recorder.vsync, Some(true));
    }

    #[test]
    fn test_unknown_and_case_mismatch() {
        let registry = registry();
        let mut recorder = Recorder::default();

        assert_eq!(
            registry.dispatch(&mut recorder, "doesnotexist"),
            Err(ConsoleError::UnknownCommand("doesnotexist".to_string()))
        );
        assert!(registry.dispatch(&mut recorder, "Help").is_err());
        assert_eq!(registry.dispatch(&mut recorder, "   "), Err(ConsoleError::EmptyCommand));
        assert!(recorder.calls.is_empty());
    }

    #[test]
    fn test_duplicate_registration_keeps_first() {
        let mut registry = registry();
        let result = registry.register("help", &[], "Replacement", set_vsync);
        assert_eq!(result, Err(ConsoleError::DuplicateCommand("help".to_string())));

        let mut recorder = Recorder::default();
        registry.dispatch(&mut recorder, "help true").unwrap();
        assert_eq!(recorder.vsync, None);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_invalid_names_rejected() {
        let mut registry: CommandRegistry<Recorder> = CommandRegistry::new();
        assert!(registry.register("", &[], "", help).is_err());
        assert!(registry.register("two words", &[], "", help).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_summaries_are_sorted_with_usage() {
        let summaries = registry().summaries();
        let calls: Vec<&str> = summaries.iter().map(|s| s.call.as_str()).collect();
        assert_eq!(calls, vec!["help", "renderer.setVSync"]);
        assert_eq!(summaries[1].usage(), "renderer.setVSync | renderer.setVSync <true|false>");
    }
}
