use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;
use serde_json::{Map, Value as Json, json};
#[cfg(feature = "builder")]
use twilight_model::application::command::{Command, CommandType};
use twilight_model::id::marker::{ChannelMarker, GenericMarker, UserMarker};

#[cfg(feature = "builder")]
use super::command_builder;
use super::{ApplicationCommand, BoxFuture, CommandAttrs, CommandBase};
use crate::arguments::{ArgumentError, parse_snowflake};
use crate::context::{CommandKind, InteractionContext};
use crate::errors::ConfigError;
use crate::platform::{ConnectionState, Platform};
use crate::signature::Signature;

type TargetCallback<P, T> =
    Box<dyn Fn(Arc<InteractionContext<P>>, T) -> BoxFuture<anyhow::Result<()>> + Send + Sync>;

/// Checks that the callback takes exactly one parameter after the owner and
/// context, and builds the shared command state.
///
/// Context-menu names are not subject to the chat input rules and their
/// description is always empty.
fn context_menu_base<P: Platform>(
    attrs: CommandAttrs<P>,
    signature: &Signature,
    target: &'static str,
) -> Result<CommandBase<P>, ConfigError> {
    let parameters = signature.explicit_parameters(&attrs.name, attrs.is_cog_bound())?;
    match parameters.len() {
        0 => Err(ConfigError::MissingParameter {
            command: attrs.name,
            parameter: target,
        }),
        1 => Ok(CommandBase::new(attrs, String::new())),
        _ => Err(ConfigError::TooManyParameters {
            command: attrs.name,
        }),
    }
}

/// Picks the resolved entry for the interaction's target and injects its
/// snowflake as the `id` field.
///
/// Falls back to the first entry when the payload carries no target id.
fn resolved_entry(
    entries: &Map<String, Json>,
    target_id: Option<&str>,
    kind: &'static str,
) -> Result<Json, ArgumentError> {
    let (key, entry) = target_id
        .and_then(|id| entries.get(id).map(|entry| (id, entry)))
        .or_else(|| entries.iter().next().map(|(key, entry)| (key.as_str(), entry)))
        .ok_or(ArgumentError::MissingResolved(kind))?;

    let id = parse_snowflake::<GenericMarker>(&Json::from(key))?;
    let mut entry = entry.clone();
    if let Json::Object(fields) = &mut entry {
        fields.insert("id".to_string(), json!(id.get()));
    }
    Ok(entry)
}

/// The target of a user command: a guild member when the interaction
/// carries member data, the bare user otherwise.
pub enum UserTarget<P: Platform> {
    User(P::User),
    Member(P::Member),
}

/// A command shown in the context menu of a user.
pub struct UserCommand<P: Platform> {
    base: CommandBase<P>,
    callback: TargetCallback<P, UserTarget<P>>,
}

impl<P: Platform> UserCommand<P> {
    pub fn new<F, Fut>(
        attrs: CommandAttrs<P>,
        signature: Signature,
        callback: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(Arc<InteractionContext<P>>, UserTarget<P>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Ok(UserCommand {
            base: context_menu_base(attrs, &signature, "user")?,
            callback: Box::new(move |ctx, target| {
                Box::pin(callback(ctx, target)) as BoxFuture<anyhow::Result<()>>
            }),
        })
    }

    fn resolve_target(&self, ctx: &InteractionContext<P>) -> anyhow::Result<UserTarget<P>> {
        let data = ctx.interaction().data();
        let state = ctx.interaction().state();
        let target_id = data.target_id.as_deref();
        let resolved = &data.resolved;

        let user = resolved_entry(&resolved.users, target_id, "users")?;
        if resolved.members.is_empty() {
            return Ok(UserTarget::User(state.user_from_data(user)?));
        }

        let mut member = resolved_entry(&resolved.members, target_id, "members")?;
        if let Json::Object(fields) = &mut member {
            fields.insert("user".to_string(), user);
        }
        let guild = ctx
            .interaction()
            .get_guild_id()
            .and_then(|guild_id| state.get_guild(guild_id));
        Ok(UserTarget::Member(state.member_from_data(guild, member)?))
    }
}

#[async_trait]
impl<P: Platform> ApplicationCommand<P> for UserCommand<P> {
    fn base(&self) -> &CommandBase<P> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CommandBase<P> {
        &mut self.base
    }

    fn kind(&self) -> CommandKind {
        CommandKind::User
    }

    async fn invoke_callback(&self, ctx: Arc<InteractionContext<P>>) -> anyhow::Result<()> {
        let target = self.resolve_target(&ctx)?;
        (self.callback)(ctx, target).await
    }

    fn to_dict(&self) -> serde_json::Value {
        json!({
            "name": self.name(),
            "description": self.description(),
            "type": u8::from(self.kind()),
        })
    }

    #[cfg(feature = "builder")]
    fn to_command(&self) -> Command {
        command_builder(self.name(), "", CommandType::User).build()
    }
}

/// A command shown in the context menu of a message.
pub struct MessageCommand<P: Platform> {
    base: CommandBase<P>,
    callback: TargetCallback<P, P::Message>,
}

impl<P: Platform> MessageCommand<P> {
    pub fn new<F, Fut>(
        attrs: CommandAttrs<P>,
        signature: Signature,
        callback: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(Arc<InteractionContext<P>>, P::Message) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Ok(MessageCommand {
            base: context_menu_base(attrs, &signature, "message")?,
            callback: Box::new(move |ctx, message| {
                Box::pin(callback(ctx, message)) as BoxFuture<anyhow::Result<()>>
            }),
        })
    }

    async fn resolve_target(&self, ctx: &InteractionContext<P>) -> anyhow::Result<P::Message> {
        let data = ctx.interaction().data();
        let state = ctx.interaction().state();
        let message = resolved_entry(
            &data.resolved.messages,
            data.target_id.as_deref(),
            "messages",
        )?;

        let channel_id = parse_snowflake::<ChannelMarker>(&message["channel_id"])?;
        let channel = match state.get_channel(channel_id) {
            Some(channel) => channel,
            None => {
                let author = parse_snowflake::<UserMarker>(&message["author"]["id"])?;
                let dm = state.start_private_message(author).await?;
                state.add_dm_channel(dm)?
            }
        };
        state.message_from_data(channel, message)
    }
}

#[async_trait]
impl<P: Platform> ApplicationCommand<P> for MessageCommand<P> {
    fn base(&self) -> &CommandBase<P> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CommandBase<P> {
        &mut self.base
    }

    fn kind(&self) -> CommandKind {
        CommandKind::Message
    }

    async fn invoke_callback(&self, ctx: Arc<InteractionContext<P>>) -> anyhow::Result<()> {
        let target = self.resolve_target(&ctx).await?;
        (self.callback)(ctx, target).await
    }

    fn to_dict(&self) -> serde_json::Value {
        json!({
            "name": self.name(),
            "description": self.description(),
            "type": u8::from(self.kind()),
        })
    }

    #[cfg(feature = "builder")]
    fn to_command(&self) -> Command {
        command_builder(self.name(), "", CommandType::Message).build()
    }
}

impl<P: Platform> Debug for UserCommand<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserCommand")
            .field("name", &self.name())
            .finish()
    }
}

impl<P: Platform> Debug for MessageCommand<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageCommand")
            .field("name", &self.name())
            .finish()
    }
}
