use std::sync::{
    Arc, PoisonError, RwLock,
    atomic::{AtomicBool, Ordering},
};

use serde::{Deserialize, Serialize};
use twilight_model::id::{Id, marker::GuildMarker};

use crate::platform::{ConnectionState, Platform};

/// Application command type as carried by the interaction payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "u8", into = "u8")]
pub enum CommandKind {
    #[default]
    ChatInput,
    User,
    Message,
    Unknown(u8),
}

impl From<u8> for CommandKind {
    fn from(value: u8) -> Self {
        match value {
            1 => CommandKind::ChatInput,
            2 => CommandKind::User,
            3 => CommandKind::Message,
            other => CommandKind::Unknown(other),
        }
    }
}

impl From<CommandKind> for u8 {
    fn from(kind: CommandKind) -> Self {
        match kind {
            CommandKind::ChatInput => 1,
            CommandKind::User => 2,
            CommandKind::Message => 3,
            CommandKind::Unknown(other) => other,
        }
    }
}

/// The `data` block of an application command interaction.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct InteractionData {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: CommandKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<DataOption>,
    #[serde(default)]
    pub resolved: ResolvedData,
}

impl InteractionData {
    pub fn new(name: &str) -> Self {
        InteractionData {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn kind(mut self, kind: CommandKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn option(mut self, option: DataOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn resolved(mut self, resolved: ResolvedData) -> Self {
        self.resolved = resolved;
        self
    }

    /// The payload as seen by the subcommand that `option` selects.
    pub fn scoped(&self, option: &DataOption) -> InteractionData {
        InteractionData {
            name: option.name.clone(),
            kind: self.kind,
            target_id: None,
            options: option.options.clone(),
            resolved: self.resolved.clone(),
        }
    }
}

/// A `{name, value}` argument, or a `{name, options}` subcommand selection.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DataOption {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<DataOption>,
}

impl DataOption {
    pub fn new(name: &str, value: impl Into<serde_json::Value>) -> Self {
        DataOption {
            name: name.to_string(),
            value: Some(value.into()),
            options: Vec::new(),
        }
    }

    pub fn subcommand(name: &str, options: Vec<DataOption>) -> Self {
        DataOption {
            name: name.to_string(),
            value: None,
            options,
        }
    }
}

/// Entities the platform resolved for the interaction, keyed by snowflake.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ResolvedData {
    #[serde(default)]
    pub users: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub members: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub roles: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub channels: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub messages: serde_json::Map<String, serde_json::Value>,
}

pub struct Interaction<P: Platform> {
    guild_id: Option<Id<GuildMarker>>,
    data: RwLock<Arc<InteractionData>>,
    state: Arc<P::State>,
}

impl<P: Platform> Interaction<P> {
    pub fn new(data: InteractionData, state: Arc<P::State>) -> Self {
        Interaction {
            guild_id: None,
            data: RwLock::new(Arc::new(data)),
            state,
        }
    }

    pub fn guild_id(mut self, guild_id: Id<GuildMarker>) -> Self {
        self.guild_id = Some(guild_id);
        self
    }

    pub fn get_guild_id(&self) -> Option<Id<GuildMarker>> {
        self.guild_id
    }

    /// The command data currently in scope. Subcommand groups narrow it to
    /// the selected child before dispatching.
    pub fn data(&self) -> Arc<InteractionData> {
        Arc::clone(&self.data.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub(crate) fn set_data(&self, data: InteractionData) {
        *self.data.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(data);
    }

    pub fn state(&self) -> &Arc<P::State> {
        &self.state
    }
}

/// Everything a command sees about the interaction it is handling.
///
/// Owned by the single task processing the interaction; commands record
/// themselves and their failure state on it.
pub struct InteractionContext<P: Platform> {
    bot: Arc<P::Bot>,
    guild: Option<Arc<P::Guild>>,
    interaction: Interaction<P>,
    command: RwLock<Option<String>>,
    command_failed: AtomicBool,
}

impl<P: Platform> InteractionContext<P> {
    pub fn new(bot: Arc<P::Bot>, interaction: Interaction<P>) -> Self {
        let guild = interaction
            .guild_id
            .and_then(|guild_id| interaction.state.get_guild(guild_id));
        InteractionContext {
            bot,
            guild,
            interaction,
            command: RwLock::new(None),
            command_failed: AtomicBool::new(false),
        }
    }

    pub fn bot(&self) -> &Arc<P::Bot> {
        &self.bot
    }

    pub fn guild(&self) -> Option<&Arc<P::Guild>> {
        self.guild.as_ref()
    }

    pub fn interaction(&self) -> &Interaction<P> {
        &self.interaction
    }

    /// Name of the command most recently bound to this context.
    pub fn command(&self) -> Option<String> {
        self.command
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn command_failed(&self) -> bool {
        self.command_failed.load(Ordering::Acquire)
    }

    pub(crate) fn set_command(&self, name: &str) {
        *self.command.write().unwrap_or_else(PoisonError::into_inner) = Some(name.to_string());
    }

    pub(crate) fn mark_failed(&self) {
        self.command_failed.store(true, Ordering::Release);
    }
}
