//! Interfaces to the parts of the bot that live outside this crate.
//!
//! The gateway client, entity models and bot-level registries are supplied by
//! the caller through a [`Platform`] implementation. This crate only drives
//! them.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use twilight_model::id::{
    Id,
    marker::{ChannelMarker, GenericMarker, GuildMarker, UserMarker},
};

use crate::context::InteractionContext;
use crate::errors::CommandError;

/// Entity types and collaborator handles of the hosting client.
pub trait Platform: Send + Sync + Sized + 'static {
    type User: Send + Sync + 'static;
    type Member: Send + Sync + 'static;
    type Role: Send + Sync + 'static;
    type Channel: Send + Sync + 'static;
    type Message: Send + Sync + 'static;

    type Bot: Client<Self>;
    type Guild: GuildLookup<Self>;
    type State: ConnectionState<Self>;
}

/// Bot-level hooks and event sink.
///
/// Every hook defaults to a no-op so that clients only override the slots they
/// actually fill.
#[async_trait]
pub trait Client<P: Platform>: Send + Sync + 'static {
    /// Global check applied before every command's own checks.
    async fn can_run(&self, _ctx: &InteractionContext<P>) -> anyhow::Result<bool> {
        Ok(true)
    }

    async fn before_invoke(&self, _ctx: &InteractionContext<P>) -> anyhow::Result<()> {
        Ok(())
    }

    async fn after_invoke(&self, _ctx: &InteractionContext<P>) -> anyhow::Result<()> {
        Ok(())
    }

    fn dispatch(&self, event: Event<'_, P>);
}

/// Events raised towards the bot's listeners.
#[non_exhaustive]
pub enum Event<'a, P: Platform> {
    /// Raised once for every failed invocation, after the local and cog
    /// error handlers had their turn.
    ApplicationCommandError {
        ctx: &'a Arc<InteractionContext<P>>,
        error: &'a Arc<CommandError>,
    },
}

impl<P: Platform> Event<'_, P> {
    pub fn name(&self) -> &'static str {
        match self {
            Event::ApplicationCommandError { .. } => "application_command_error",
        }
    }
}

/// Entity kinds a guild can look up by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Member,
    Channel,
    Role,
}

impl EntityKind {
    /// Accessor name used for the cache-or-fetch lookup.
    pub const fn as_str(self) -> &'static str {
        match self {
            EntityKind::Member => "member",
            EntityKind::Channel => "channel",
            EntityKind::Role => "role",
        }
    }
}

/// A guild entity returned by [`GuildLookup::get_or_fetch`].
pub enum Entity<P: Platform> {
    Member(P::Member),
    Channel(P::Channel),
    Role(P::Role),
}

impl<P: Platform> Entity<P> {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Member(_) => EntityKind::Member,
            Entity::Channel(_) => EntityKind::Channel,
            Entity::Role(_) => EntityKind::Role,
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Unknown {} {id}", .kind.as_str())]
    NotFound { kind: EntityKind, id: Id<GenericMarker> },
    #[error(transparent)]
    Http(#[from] anyhow::Error),
}

/// Guild-scoped entity lookups.
#[async_trait]
pub trait GuildLookup<P: Platform>: Send + Sync + 'static {
    /// Returns the entity from the local cache, fetching it if absent.
    async fn get_or_fetch(
        &self,
        kind: EntityKind,
        id: Id<GenericMarker>,
    ) -> Result<Entity<P>, FetchError>;
}

/// The client's connection state: caches, entity construction and the HTTP
/// calls context-menu resolution needs.
#[async_trait]
pub trait ConnectionState<P: Platform>: Send + Sync + 'static {
    fn get_guild(&self, guild_id: Id<GuildMarker>) -> Option<Arc<P::Guild>>;

    fn get_channel(&self, channel_id: Id<ChannelMarker>) -> Option<P::Channel>;

    /// Caches a direct-message channel created from `data` and returns it.
    fn add_dm_channel(&self, data: serde_json::Value) -> anyhow::Result<P::Channel>;

    /// Opens a direct-message channel with `recipient`, returning the raw
    /// channel payload.
    async fn start_private_message(
        &self,
        recipient: Id<UserMarker>,
    ) -> anyhow::Result<serde_json::Value>;

    fn user_from_data(&self, data: serde_json::Value) -> anyhow::Result<P::User>;

    fn member_from_data(
        &self,
        guild: Option<Arc<P::Guild>>,
        data: serde_json::Value,
    ) -> anyhow::Result<P::Member>;

    fn message_from_data(
        &self,
        channel: P::Channel,
        data: serde_json::Value,
    ) -> anyhow::Result<P::Message>;
}

/// A stateful group of commands supplying its own hooks.
#[async_trait]
pub trait Cog<P: Platform>: Send + Sync + 'static {
    async fn cog_before_invoke(&self, _ctx: &InteractionContext<P>) -> anyhow::Result<()> {
        Ok(())
    }

    async fn cog_after_invoke(&self, _ctx: &InteractionContext<P>) -> anyhow::Result<()> {
        Ok(())
    }

    async fn cog_command_error(
        &self,
        _ctx: &InteractionContext<P>,
        _error: &CommandError,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}
