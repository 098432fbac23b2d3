//! Factory functions turning callbacks into commands.
//!
//! [`application_command`] picks the command type from the [`Callback`]
//! variant; the typed shortcuts build the matching command directly.

use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;

use crate::arguments::Arguments;
use crate::commands::context_menu::{MessageCommand, UserCommand, UserTarget};
use crate::commands::slash::SlashCommand;
use crate::commands::{ApplicationCommand, BoxFuture, CommandAttrs, CommandBase};
use crate::context::{CommandKind, InteractionContext};
use crate::errors::ConfigError;
use crate::platform::Platform;
use crate::signature::Signature;

type Boxed<P, T> =
    Box<dyn Fn(Arc<InteractionContext<P>>, T) -> BoxFuture<anyhow::Result<()>> + Send + Sync>;

/// A callback tagged with the kind of command it implements.
pub enum Callback<P: Platform> {
    Slash(Boxed<P, Arguments<P>>),
    User(Boxed<P, UserTarget<P>>),
    Message(Boxed<P, P::Message>),
}

impl<P: Platform> Callback<P> {
    pub fn slash<F, Fut>(callback: F) -> Self
    where
        F: Fn(Arc<InteractionContext<P>>, Arguments<P>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Callback::Slash(boxed(callback))
    }

    pub fn user<F, Fut>(callback: F) -> Self
    where
        F: Fn(Arc<InteractionContext<P>>, UserTarget<P>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Callback::User(boxed(callback))
    }

    pub fn message<F, Fut>(callback: F) -> Self
    where
        F: Fn(Arc<InteractionContext<P>>, P::Message) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Callback::Message(boxed(callback))
    }
}

fn boxed<P, T, F, Fut>(callback: F) -> Boxed<P, T>
where
    P: Platform,
    F: Fn(Arc<InteractionContext<P>>, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Box::new(move |ctx, value| Box::pin(callback(ctx, value)) as BoxFuture<anyhow::Result<()>>)
}

/// Any of the three command types, as produced by [`application_command`].
pub enum AnyCommand<P: Platform> {
    Slash(SlashCommand<P>),
    User(UserCommand<P>),
    Message(MessageCommand<P>),
}

impl<P: Platform> AnyCommand<P> {
    fn inner(&self) -> &dyn ApplicationCommand<P> {
        match self {
            AnyCommand::Slash(command) => command,
            AnyCommand::User(command) => command,
            AnyCommand::Message(command) => command,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn ApplicationCommand<P> {
        match self {
            AnyCommand::Slash(command) => command,
            AnyCommand::User(command) => command,
            AnyCommand::Message(command) => command,
        }
    }
}

#[async_trait]
impl<P: Platform> ApplicationCommand<P> for AnyCommand<P> {
    fn base(&self) -> &CommandBase<P> {
        self.inner().base()
    }

    fn base_mut(&mut self) -> &mut CommandBase<P> {
        self.inner_mut().base_mut()
    }

    fn kind(&self) -> CommandKind {
        self.inner().kind()
    }

    async fn invoke_callback(&self, ctx: Arc<InteractionContext<P>>) -> anyhow::Result<()> {
        self.inner().invoke_callback(ctx).await
    }

    fn to_dict(&self) -> serde_json::Value {
        self.inner().to_dict()
    }

    #[cfg(feature = "builder")]
    fn to_command(&self) -> twilight_model::application::command::Command {
        self.inner().to_command()
    }
}

impl<P: Platform> Debug for AnyCommand<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnyCommand::Slash(command) => command.fmt(f),
            AnyCommand::User(command) => command.fmt(f),
            AnyCommand::Message(command) => command.fmt(f),
        }
    }
}

/// Builds the command matching the callback's variant.
pub fn application_command<P: Platform>(
    attrs: CommandAttrs<P>,
    signature: Signature,
    callback: Callback<P>,
) -> Result<AnyCommand<P>, ConfigError> {
    Ok(match callback {
        Callback::Slash(callback) => {
            AnyCommand::Slash(SlashCommand::new(attrs, signature, callback)?)
        }
        Callback::User(callback) => AnyCommand::User(UserCommand::new(attrs, signature, callback)?),
        Callback::Message(callback) => {
            AnyCommand::Message(MessageCommand::new(attrs, signature, callback)?)
        }
    })
}

/// Alias of [`application_command`].
pub fn command<P: Platform>(
    attrs: CommandAttrs<P>,
    signature: Signature,
    callback: Callback<P>,
) -> Result<AnyCommand<P>, ConfigError> {
    application_command(attrs, signature, callback)
}

pub fn slash_command<P, F, Fut>(
    attrs: CommandAttrs<P>,
    signature: Signature,
    callback: F,
) -> Result<SlashCommand<P>, ConfigError>
where
    P: Platform,
    F: Fn(Arc<InteractionContext<P>>, Arguments<P>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    SlashCommand::new(attrs, signature, callback)
}

pub fn user_command<P, F, Fut>(
    attrs: CommandAttrs<P>,
    signature: Signature,
    callback: F,
) -> Result<UserCommand<P>, ConfigError>
where
    P: Platform,
    F: Fn(Arc<InteractionContext<P>>, UserTarget<P>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    UserCommand::new(attrs, signature, callback)
}

pub fn message_command<P, F, Fut>(
    attrs: CommandAttrs<P>,
    signature: Signature,
    callback: F,
) -> Result<MessageCommand<P>, ConfigError>
where
    P: Platform,
    F: Fn(Arc<InteractionContext<P>>, P::Message) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    MessageCommand::new(attrs, signature, callback)
}
