use std::{collections::HashMap, fmt::Debug, sync::Arc};

use tracing::{debug, warn};
#[cfg(feature = "builder")]
use twilight_model::application::command::Command;

use crate::commands::ApplicationCommand;
use crate::context::{CommandKind, InteractionContext};
use crate::errors::CommandError;
use crate::platform::Platform;

type CommandKey = (CommandKind, String);

/// Top-level commands of a bot, keyed by command type and name.
pub struct CommandExecutor<P: Platform> {
    commands: HashMap<CommandKey, Box<dyn ApplicationCommand<P>>>,
}

impl<P: Platform> CommandExecutor<P> {
    pub fn new() -> Self {
        CommandExecutor {
            commands: HashMap::new(),
        }
    }

    /// Registers a command, replacing any command of the same type and name.
    pub fn register<C>(&mut self, command: C)
    where
        C: ApplicationCommand<P> + 'static,
    {
        let key = (command.kind(), command.name().to_string());
        if self.commands.contains_key(&key) {
            warn!(command = %key.1, "replacing an already registered application command");
        }
        self.commands.insert(key, Box::new(command));
    }

    pub fn get(&self, kind: CommandKind, name: &str) -> Option<&dyn ApplicationCommand<P>> {
        self.commands
            .get(&(kind, name.to_string()))
            .map(|command| &**command)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Runs the command the interaction names.
    ///
    /// Returns `None` when no such command is registered. A failed
    /// invocation is handed to the command's error handlers; the result is
    /// an error only when one of those handlers failed itself.
    pub async fn execute(
        &self,
        ctx: Arc<InteractionContext<P>>,
    ) -> Option<Result<(), CommandError>> {
        let data = ctx.interaction().data();
        let Some(command) = self.get(data.kind, &data.name) else {
            debug!(command = %data.name, kind = ?data.kind, "no application command registered");
            return None;
        };

        let result = match command.invoke(Arc::clone(&ctx)).await {
            Ok(()) => Ok(()),
            Err(error) => command.dispatch_error(&ctx, error).await,
        };
        Some(result)
    }

    /// Registration payloads of every command, ordered by type and name.
    pub fn build_commands(&self) -> Vec<serde_json::Value> {
        self.sorted().map(|command| command.to_dict()).collect()
    }

    /// Realizes the commands for registration through a twilight client.
    #[cfg(feature = "builder")]
    pub fn to_commands(&self) -> Vec<Command> {
        self.sorted().map(|command| command.to_command()).collect()
    }

    fn sorted(&self) -> impl Iterator<Item = &dyn ApplicationCommand<P>> {
        let mut entries: Vec<_> = self.commands.iter().collect();
        entries.sort_by(|(a, _), (b, _)| (u8::from(a.0), &a.1).cmp(&(u8::from(b.0), &b.1)));
        entries.into_iter().map(|(_, command)| &**command)
    }
}

#[cfg(feature = "builder")]
impl<P: Platform> From<&CommandExecutor<P>> for Vec<Command> {
    fn from(executor: &CommandExecutor<P>) -> Self {
        executor.to_commands()
    }
}

impl<P: Platform> Default for CommandExecutor<P> {
    fn default() -> Self {
        CommandExecutor::new()
    }
}

impl<P: Platform> Debug for CommandExecutor<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.commands.keys().map(|(_, name)| name.as_str()).collect();
        f.debug_struct("CommandExecutor")
            .field("commands", &names)
            .finish()
    }
}
