//! The invocation pipeline shared by every application command type.
//!
//! `invoke` drives a command through preparation (checks and before-hooks),
//! the type-specific callback step and the after-hooks. Failures are routed
//! through `dispatch_error` by the caller.

use std::{
    pin::Pin,
    sync::{Arc, Weak},
};

use async_trait::async_trait;
use tracing::{debug, error, warn};
use twilight_model::id::{Id, marker::GuildMarker};

use crate::context::{CommandKind, InteractionContext};
use crate::errors::{Cancelled, CommandError};
use crate::platform::{Client, Cog, Event, Platform};

pub mod context_menu;
pub mod group;
pub mod slash;

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// A predicate deciding whether a command may run.
pub type Check<P> =
    Arc<dyn Fn(Arc<InteractionContext<P>>) -> BoxFuture<anyhow::Result<bool>> + Send + Sync>;

/// A before- or after-invoke hook.
pub type Hook<P> =
    Arc<dyn Fn(Arc<InteractionContext<P>>) -> BoxFuture<anyhow::Result<()>> + Send + Sync>;

pub type ErrorHandler<P> = Arc<
    dyn Fn(Arc<InteractionContext<P>>, Arc<CommandError>) -> BoxFuture<anyhow::Result<()>>
        + Send
        + Sync,
>;

pub fn check<P, F, Fut>(predicate: F) -> Check<P>
where
    P: Platform,
    F: Fn(Arc<InteractionContext<P>>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<bool>> + Send + 'static,
{
    Arc::new(move |ctx| Box::pin(predicate(ctx)) as BoxFuture<anyhow::Result<bool>>)
}

fn hook<P, F, Fut>(hook: F) -> Hook<P>
where
    P: Platform,
    F: Fn(Arc<InteractionContext<P>>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(move |ctx| Box::pin(hook(ctx)) as BoxFuture<anyhow::Result<()>>)
}

/// Converts the result of user code into the command's outcome: command
/// errors pass through, cancellation ends the invocation silently and any
/// other fault becomes [`CommandError::Invoke`].
pub(crate) fn protect(result: anyhow::Result<()>) -> Result<(), CommandError> {
    let Err(error) = result else {
        return Ok(());
    };
    match error.downcast::<CommandError>() {
        Ok(error) => Err(error),
        Err(error) if error.is::<Cancelled>() => {
            debug!("application command invocation cancelled");
            Ok(())
        }
        Err(error) => Err(CommandError::Invoke(error)),
    }
}

/// Starts the registration payload of a top-level command, usable in guilds
/// and private channels alike.
#[cfg(feature = "builder")]
pub(crate) fn command_builder(
    name: &str,
    description: &str,
    kind: twilight_model::application::command::CommandType,
) -> twilight_util::builder::command::CommandBuilder {
    use twilight_model::application::interaction::InteractionContextType;

    twilight_util::builder::command::CommandBuilder::new(name, description, kind).contexts(vec![
        InteractionContextType::Guild,
        InteractionContextType::BotDm,
        InteractionContextType::PrivateChannel,
    ])
}

fn is_cancellation(error: &CommandError) -> bool {
    error
        .original()
        .is_some_and(|error| error.is::<Cancelled>())
}

/// Settings shared by every command constructor.
pub struct CommandAttrs<P: Platform> {
    pub name: String,
    pub description: Option<String>,
    pub guild_ids: Option<Vec<Id<GuildMarker>>>,
    pub checks: Vec<Check<P>>,
    pub cog: Option<Weak<dyn Cog<P>>>,
}

impl<P: Platform> CommandAttrs<P> {
    pub fn new(name: &str) -> Self {
        CommandAttrs {
            name: name.to_string(),
            description: None,
            guild_ids: None,
            checks: Vec::new(),
            cog: None,
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn guild_ids(mut self, guild_ids: impl IntoIterator<Item = Id<GuildMarker>>) -> Self {
        self.guild_ids = Some(guild_ids.into_iter().collect());
        self
    }

    pub fn check<F, Fut>(mut self, predicate: F) -> Self
    where
        F: Fn(Arc<InteractionContext<P>>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<bool>> + Send + 'static,
    {
        self.checks.push(check(predicate));
        self
    }

    /// Binds the command to `cog`. The callback then declares the cog as
    /// its first parameter.
    pub fn cog<C: Cog<P>>(mut self, cog: &Arc<C>) -> Self {
        let cog: Weak<C> = Arc::downgrade(cog);
        self.cog = Some(cog);
        self
    }

    pub(crate) fn is_cog_bound(&self) -> bool {
        self.cog.is_some()
    }
}

/// State every command type carries: identity, checks, hook slots and the
/// back reference to its cog.
pub struct CommandBase<P: Platform> {
    name: String,
    description: String,
    guild_ids: Option<Vec<Id<GuildMarker>>>,
    cog: Option<Weak<dyn Cog<P>>>,
    checks: Vec<Check<P>>,
    before_invoke: Option<Hook<P>>,
    after_invoke: Option<Hook<P>>,
    on_error: Option<ErrorHandler<P>>,
}

impl<P: Platform> CommandBase<P> {
    pub(crate) fn new(attrs: CommandAttrs<P>, description: String) -> Self {
        CommandBase {
            name: attrs.name,
            description,
            guild_ids: attrs.guild_ids,
            cog: attrs.cog,
            checks: attrs.checks,
            before_invoke: None,
            after_invoke: None,
            on_error: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn guild_ids(&self) -> Option<&[Id<GuildMarker>]> {
        self.guild_ids.as_deref()
    }

    /// The owning cog, if the command has one and it is still alive.
    pub fn cog(&self) -> Option<Arc<dyn Cog<P>>> {
        self.cog.as_ref().and_then(Weak::upgrade)
    }

    pub(crate) fn set_guild_ids(&mut self, guild_ids: Vec<Id<GuildMarker>>) {
        self.guild_ids = Some(guild_ids);
    }

    pub fn checks(&self) -> &[Check<P>] {
        &self.checks
    }

    pub fn add_check(&mut self, check: Check<P>) {
        self.checks.push(check);
    }

    pub fn has_error_handler(&self) -> bool {
        self.on_error.is_some()
    }

    async fn can_run(&self, ctx: &Arc<InteractionContext<P>>) -> Result<bool, CommandError> {
        let global = ctx
            .bot()
            .can_run(ctx)
            .await
            .map_err(|error| self.check_error(error))?;
        if !global {
            return Err(CommandError::check_failure(format!(
                "The global check functions for command {} failed.",
                self.name
            )));
        }

        // no checks means the command can always run
        if self.checks.is_empty() {
            return Ok(true);
        }

        for predicate in &self.checks {
            let passed = predicate(Arc::clone(ctx))
                .await
                .map_err(|error| self.check_error(error))?;
            if !passed {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn check_error(&self, error: anyhow::Error) -> CommandError {
        match error.downcast::<CommandError>() {
            Ok(error) => error,
            Err(source) => CommandError::CheckFailure {
                message: format!("A check for the command {} raised an error", self.name),
                source: Some(source),
            },
        }
    }

    async fn prepare(&self, ctx: &Arc<InteractionContext<P>>) -> Result<(), CommandError> {
        ctx.set_command(&self.name);

        // TODO: cooldowns belong between the checks and the before-hooks once
        // the bot exposes a bucket registry
        let result = match self.can_run(ctx).await {
            Ok(true) => self.call_before_hooks(ctx).await.map_err(|error| {
                match error.downcast::<CommandError>() {
                    Ok(error) => error,
                    Err(error) => CommandError::Invoke(error),
                }
            }),
            Ok(false) => Err(CommandError::check_failure(format!(
                "The check functions for the command {} failed",
                self.name
            ))),
            Err(error) => Err(error),
        };

        if let Err(error) = &result
            && !is_cancellation(error)
        {
            warn!(command = %self.name, %error, "application command failed to prepare");
            ctx.mark_failed();
        }
        result
    }

    async fn call_before_hooks(&self, ctx: &Arc<InteractionContext<P>>) -> anyhow::Result<()> {
        if let Some(hook) = &self.before_invoke {
            hook(Arc::clone(ctx)).await?;
        }
        if let Some(cog) = self.cog() {
            cog.cog_before_invoke(ctx).await?;
        }
        ctx.bot().before_invoke(ctx).await
    }

    async fn call_after_hooks(&self, ctx: &Arc<InteractionContext<P>>) -> anyhow::Result<()> {
        if let Some(hook) = &self.after_invoke {
            hook(Arc::clone(ctx)).await?;
        }
        if let Some(cog) = self.cog() {
            cog.cog_after_invoke(ctx).await?;
        }
        ctx.bot().after_invoke(ctx).await
    }

    async fn dispatch_error(
        &self,
        ctx: &Arc<InteractionContext<P>>,
        error: CommandError,
    ) -> Result<(), CommandError> {
        ctx.mark_failed();
        let error = Arc::new(error);
        let mut failure = None;

        if let Some(handler) = &self.on_error {
            if let Err(handler_error) = protect(handler(Arc::clone(ctx), Arc::clone(&error)).await) {
                failure = Some(handler_error);
            }
        }

        if let Some(cog) = self.cog() {
            if let Err(handler_error) = protect(cog.cog_command_error(ctx, &error).await) {
                if failure.is_some() {
                    error!(command = %self.name, error = %handler_error, "cog error handler failed");
                } else {
                    failure = Some(handler_error);
                }
            }
        }

        ctx.bot().dispatch(Event::ApplicationCommandError {
            ctx,
            error: &error,
        });

        match failure {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }
}

/// An invokable, registrable application command.
///
/// Implementors supply the final callback step; preparation, hooks and error
/// dispatch are shared.
#[async_trait]
pub trait ApplicationCommand<P: Platform>: Send + Sync {
    fn base(&self) -> &CommandBase<P>;

    fn base_mut(&mut self) -> &mut CommandBase<P>;

    fn kind(&self) -> CommandKind;

    /// Resolves the interaction payload and runs the callback.
    async fn invoke_callback(&self, ctx: Arc<InteractionContext<P>>) -> anyhow::Result<()>;

    /// Registration payload for the platform.
    fn to_dict(&self) -> serde_json::Value;

    #[cfg(feature = "builder")]
    fn to_command(&self) -> twilight_model::application::command::Command;

    fn name(&self) -> &str {
        self.base().name()
    }

    fn description(&self) -> &str {
        self.base().description()
    }

    fn has_error_handler(&self) -> bool {
        self.base().has_error_handler()
    }

    /// Registers a local error handler, run before the cog handler and the
    /// bot-wide error event.
    fn error<F, Fut>(&mut self, handler: F)
    where
        Self: Sized,
        F: Fn(Arc<InteractionContext<P>>, Arc<CommandError>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.base_mut().on_error = Some(Arc::new(move |ctx, error| {
            Box::pin(handler(ctx, error)) as BoxFuture<anyhow::Result<()>>
        }));
    }

    /// Registers a hook run right before the callback.
    fn before_invoke<F, Fut>(&mut self, before: F)
    where
        Self: Sized,
        F: Fn(Arc<InteractionContext<P>>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.base_mut().before_invoke = Some(hook(before));
    }

    /// Registers a hook run after the callback, whether or not it succeeded.
    fn after_invoke<F, Fut>(&mut self, after: F)
    where
        Self: Sized,
        F: Fn(Arc<InteractionContext<P>>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.base_mut().after_invoke = Some(hook(after));
    }

    async fn can_run(&self, ctx: &Arc<InteractionContext<P>>) -> Result<bool, CommandError> {
        self.base().can_run(ctx).await
    }

    async fn prepare(&self, ctx: &Arc<InteractionContext<P>>) -> Result<(), CommandError> {
        self.base().prepare(ctx).await
    }

    async fn invoke(&self, ctx: Arc<InteractionContext<P>>) -> Result<(), CommandError> {
        debug!(command = %self.name(), "invoking application command");
        if let Err(error) = self.prepare(&ctx).await {
            if is_cancellation(&error) {
                return Ok(());
            }
            return Err(error);
        }

        let result = protect(self.invoke_callback(Arc::clone(&ctx)).await);
        let cleanup = self.base().call_after_hooks(&ctx).await;

        match (result, cleanup) {
            (Err(error), Err(hook_error)) => {
                error!(command = %self.name(), error = %hook_error, "after-invoke hook failed");
                Err(error)
            }
            (Err(error), Ok(())) => Err(error),
            (Ok(()), cleanup) => protect(cleanup),
        }
    }

    async fn dispatch_error(
        &self,
        ctx: &Arc<InteractionContext<P>>,
        error: CommandError,
    ) -> Result<(), CommandError> {
        self.base().dispatch_error(ctx, error).await
    }
}
