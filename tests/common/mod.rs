#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Context, anyhow};
use app_commands::context::{Interaction, InteractionContext, InteractionData};
use app_commands::errors::CommandError;
use app_commands::platform::{
    Client, Cog, ConnectionState, Entity, EntityKind, Event, FetchError, GuildLookup, Platform,
};
use async_trait::async_trait;
use serde_json::json;
use twilight_model::id::{
    Id,
    marker::{ChannelMarker, GenericMarker, GuildMarker, UserMarker},
};

pub const GUILD_ID: u64 = 1000;

/// In-memory platform used by the integration tests.
pub struct Mock;

impl Platform for Mock {
    type User = User;
    type Member = Member;
    type Role = Role;
    type Channel = Channel;
    type Message = Message;

    type Bot = Bot;
    type Guild = Guild;
    type State = State;
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub id: u64,
    pub nick: Option<String>,
    pub user: Option<User>,
    pub guild_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Role {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub id: u64,
    pub private: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: u64,
    pub content: String,
    pub channel: Channel,
}

/// Ordered record of everything the hooks, handlers and callbacks did.
#[derive(Debug, Clone, Default)]
pub struct Log(Arc<Mutex<Vec<String>>>);

impl Log {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.entries().iter().filter(|e| e.as_str() == entry).count()
    }
}

pub struct Bot {
    pub log: Log,
    pub allow: bool,
}

impl Bot {
    pub fn new(log: &Log) -> Arc<Self> {
        Arc::new(Bot {
            log: log.clone(),
            allow: true,
        })
    }

    pub fn rejecting(log: &Log) -> Arc<Self> {
        Arc::new(Bot {
            log: log.clone(),
            allow: false,
        })
    }
}

#[async_trait]
impl Client<Mock> for Bot {
    async fn can_run(&self, _ctx: &InteractionContext<Mock>) -> anyhow::Result<bool> {
        self.log.push("bot_check");
        Ok(self.allow)
    }

    async fn before_invoke(&self, _ctx: &InteractionContext<Mock>) -> anyhow::Result<()> {
        self.log.push("bot_before");
        Ok(())
    }

    async fn after_invoke(&self, _ctx: &InteractionContext<Mock>) -> anyhow::Result<()> {
        self.log.push("bot_after");
        Ok(())
    }

    fn dispatch(&self, event: Event<'_, Mock>) {
        let name = event.name();
        match event {
            Event::ApplicationCommandError { ctx, error } => {
                assert!(ctx.command_failed());
                self.log.push(format!("{name}: {error}"));
            }
            _ => self.log.push(format!("unexpected {name}")),
        }
    }
}

#[derive(Default)]
pub struct Guild {
    pub id: u64,
    pub members: HashMap<u64, Member>,
    pub roles: HashMap<u64, Role>,
    pub channels: HashMap<u64, Channel>,
}

impl Guild {
    pub fn new(id: u64) -> Self {
        Guild {
            id,
            ..Default::default()
        }
    }

    pub fn member(mut self, id: u64, nick: &str) -> Self {
        self.members.insert(
            id,
            Member {
                id,
                nick: Some(nick.to_string()),
                user: None,
                guild_id: Some(self.id),
            },
        );
        self
    }

    pub fn role(mut self, id: u64, name: &str) -> Self {
        self.roles.insert(
            id,
            Role {
                id,
                name: name.to_string(),
            },
        );
        self
    }

    pub fn channel(mut self, id: u64) -> Self {
        self.channels.insert(id, Channel { id, private: false });
        self
    }
}

#[async_trait]
impl GuildLookup<Mock> for Guild {
    async fn get_or_fetch(
        &self,
        kind: EntityKind,
        id: Id<GenericMarker>,
    ) -> Result<Entity<Mock>, FetchError> {
        let entity = match kind {
            EntityKind::Member => self.members.get(&id.get()).cloned().map(Entity::Member),
            EntityKind::Channel => self.channels.get(&id.get()).cloned().map(Entity::Channel),
            EntityKind::Role => self.roles.get(&id.get()).cloned().map(Entity::Role),
        };
        entity.ok_or(FetchError::NotFound { kind, id })
    }
}

#[derive(Default)]
pub struct State {
    pub guilds: HashMap<u64, Arc<Guild>>,
    pub channels: HashMap<u64, Channel>,
    pub private_messages: Mutex<Vec<u64>>,
}

impl State {
    pub fn new() -> Self {
        State::default()
    }

    pub fn guild(mut self, guild: Guild) -> Self {
        self.guilds.insert(guild.id, Arc::new(guild));
        self
    }

    pub fn channel(mut self, id: u64) -> Self {
        self.channels.insert(id, Channel { id, private: false });
        self
    }
}

fn id_of(data: &serde_json::Value) -> anyhow::Result<u64> {
    match &data["id"] {
        serde_json::Value::Number(id) => id.as_u64().context("id out of range"),
        serde_json::Value::String(id) => Ok(id.parse()?),
        other => Err(anyhow!("invalid id {other}")),
    }
}

#[async_trait]
impl ConnectionState<Mock> for State {
    fn get_guild(&self, guild_id: Id<GuildMarker>) -> Option<Arc<Guild>> {
        self.guilds.get(&guild_id.get()).cloned()
    }

    fn get_channel(&self, channel_id: Id<ChannelMarker>) -> Option<Channel> {
        self.channels.get(&channel_id.get()).cloned()
    }

    fn add_dm_channel(&self, data: serde_json::Value) -> anyhow::Result<Channel> {
        Ok(Channel {
            id: id_of(&data)?,
            private: true,
        })
    }

    async fn start_private_message(
        &self,
        recipient: Id<UserMarker>,
    ) -> anyhow::Result<serde_json::Value> {
        self.private_messages.lock().unwrap().push(recipient.get());
        Ok(json!({ "id": "777", "recipients": [{ "id": recipient.to_string() }] }))
    }

    fn user_from_data(&self, data: serde_json::Value) -> anyhow::Result<User> {
        Ok(User {
            id: id_of(&data)?,
            name: data["username"]
                .as_str()
                .context("user without username")?
                .to_string(),
        })
    }

    fn member_from_data(
        &self,
        guild: Option<Arc<Guild>>,
        data: serde_json::Value,
    ) -> anyhow::Result<Member> {
        Ok(Member {
            id: id_of(&data)?,
            nick: data["nick"].as_str().map(str::to_string),
            user: Some(self.user_from_data(data["user"].clone())?),
            guild_id: guild.map(|guild| guild.id),
        })
    }

    fn message_from_data(&self, channel: Channel, data: serde_json::Value) -> anyhow::Result<Message> {
        Ok(Message {
            id: id_of(&data)?,
            content: data["content"].as_str().unwrap_or_default().to_string(),
            channel,
        })
    }
}

pub struct TestCog {
    pub log: Log,
    pub fail_error_handler: bool,
}

impl TestCog {
    pub fn new(log: &Log) -> Arc<Self> {
        Arc::new(TestCog {
            log: log.clone(),
            fail_error_handler: false,
        })
    }
}

#[async_trait]
impl Cog<Mock> for TestCog {
    async fn cog_before_invoke(&self, _ctx: &InteractionContext<Mock>) -> anyhow::Result<()> {
        self.log.push("cog_before");
        Ok(())
    }

    async fn cog_after_invoke(&self, _ctx: &InteractionContext<Mock>) -> anyhow::Result<()> {
        self.log.push("cog_after");
        Ok(())
    }

    async fn cog_command_error(
        &self,
        _ctx: &InteractionContext<Mock>,
        _error: &CommandError,
    ) -> anyhow::Result<()> {
        self.log.push("cog_error");
        if self.fail_error_handler {
            return Err(anyhow!("cog handler broke"));
        }
        Ok(())
    }
}

/// A context for `data`, inside the test guild when one is registered.
pub fn context(
    bot: &Arc<Bot>,
    state: State,
    data: InteractionData,
    guild: Option<u64>,
) -> Arc<InteractionContext<Mock>> {
    let mut interaction = Interaction::new(data, Arc::new(state));
    if let Some(guild) = guild {
        interaction = interaction.guild_id(Id::new(guild));
    }
    Arc::new(InteractionContext::new(Arc::clone(bot), interaction))
}
