use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;
use serde_json::json;
#[cfg(feature = "builder")]
use twilight_model::application::command::{Command, CommandType};
#[cfg(feature = "builder")]
use twilight_util::builder::command::SubCommandBuilder;

#[cfg(feature = "builder")]
use super::command_builder;
use super::{ApplicationCommand, BoxFuture, CommandAttrs, CommandBase};
use crate::arguments::{
    Argument, ArgumentError, Arguments, FromArguments, Parameters, parse_snowflake,
};
use crate::context::{CommandKind, DataOption, InteractionContext};
use crate::errors::ConfigError;
use crate::options::{CommandOption, DEFAULT_DESCRIPTION, OptionType, Optionable};
use crate::platform::{EntityKind, FetchError, GuildLookup, Platform};
use crate::signature::Signature;
use crate::validation::{validate_description, validate_name};

type SlashCallback<P> = Box<
    dyn Fn(Arc<InteractionContext<P>>, Arguments<P>) -> BoxFuture<anyhow::Result<()>> + Send + Sync,
>;

/// A chat input command.
///
/// The callback receives the context and the resolved options keyed by name.
pub struct SlashCommand<P: Platform> {
    base: CommandBase<P>,
    options: Vec<CommandOption>,
    is_subcommand: bool,
    callback: SlashCallback<P>,
}

impl<P: Platform> SlashCommand<P> {
    pub fn new<F, Fut>(
        attrs: CommandAttrs<P>,
        signature: Signature,
        callback: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(Arc<InteractionContext<P>>, Arguments<P>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        validate_name(&attrs.name)?;
        let description = attrs
            .description
            .clone()
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());
        validate_description(&description)?;

        let options = signature.build_options(&attrs.name, attrs.is_cog_bound())?;
        let callback: SlashCallback<P> = Box::new(move |ctx, arguments| {
            Box::pin(callback(ctx, arguments)) as BoxFuture<anyhow::Result<()>>
        });

        Ok(SlashCommand {
            base: CommandBase::new(attrs, description),
            options,
            is_subcommand: false,
            callback,
        })
    }

    /// Builds the command from a [`Parameters`] type, parsing the keyword
    /// arguments into it before every call.
    pub fn typed<T, F, Fut>(attrs: CommandAttrs<P>, callback: F) -> Result<Self, ConfigError>
    where
        T: Parameters + FromArguments<P> + 'static,
        F: Fn(Arc<InteractionContext<P>>, T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let signature = Signature::of::<T>(attrs.is_cog_bound());
        SlashCommand::new(attrs, signature, move |ctx, arguments| {
            let invocation = T::from_arguments(arguments).map(|parsed| callback(ctx, parsed));
            async move {
                let future = invocation?;
                future.await
            }
        })
    }

    pub fn options(&self) -> &[CommandOption] {
        &self.options
    }

    pub fn is_subcommand(&self) -> bool {
        self.is_subcommand
    }

    pub(crate) fn set_subcommand(&mut self) {
        self.is_subcommand = true;
    }

    #[cfg(feature = "builder")]
    pub(crate) fn to_subcommand(&self) -> SubCommandBuilder {
        let mut subcommand = SubCommandBuilder::new(self.name(), self.description());
        for option in &self.options {
            subcommand = subcommand.option(option.clone());
        }
        subcommand
    }

    fn find_option(&self, name: &str) -> Result<&CommandOption, ArgumentError> {
        self.options
            .iter()
            .find(|option| option.option_name() == Some(name))
            .ok_or_else(|| ArgumentError::UnknownOption {
                command: self.name().to_string(),
                option: name.to_string(),
            })
    }
}

/// Resolves one `{name, value}` pair according to the declared option type.
async fn resolve_argument<P: Platform>(
    ctx: &InteractionContext<P>,
    declared: &CommandOption,
    option: &DataOption,
) -> anyhow::Result<Argument<P>> {
    let value = match &option.value {
        None | Some(serde_json::Value::Null) => return Ok(Argument::Null),
        Some(value) => value,
    };

    let kind = declared.input_type;
    if !kind.is_guild_entity() && kind != OptionType::Mentionable {
        return Ok(coerce(kind, value).map_err(|source| ArgumentError::Option {
            name: option.name.clone(),
            source: Box::new(source),
        })?);
    }

    let id = parse_snowflake(value)?;
    let guild = ctx
        .guild()
        .ok_or_else(|| ArgumentError::GuildRequired(option.name.clone()))?;

    let entity = match kind {
        OptionType::User => guild.get_or_fetch(EntityKind::Member, id).await?,
        OptionType::Channel => guild.get_or_fetch(EntityKind::Channel, id).await?,
        OptionType::Role => guild.get_or_fetch(EntityKind::Role, id).await?,
        _ => match guild.get_or_fetch(EntityKind::Member, id).await {
            Err(FetchError::NotFound { .. }) => guild.get_or_fetch(EntityKind::Role, id).await?,
            member => member?,
        },
    };
    Ok(entity.into())
}

fn coerce<P: Platform>(
    kind: OptionType,
    value: &serde_json::Value,
) -> Result<Argument<P>, ArgumentError> {
    use serde_json::Value as Json;

    let mismatch = || ArgumentError::InvalidType {
        expected: kind.name(),
        found: match value {
            Json::Null => "null",
            Json::Bool(_) => "boolean",
            Json::Number(_) => "number",
            Json::String(_) => "string",
            Json::Array(_) => "array",
            Json::Object(_) => "object",
        },
    };

    match (kind, value) {
        (OptionType::String, Json::String(value)) => Ok(Argument::String(value.clone())),
        (OptionType::Integer, Json::Number(value)) => {
            value.as_i64().map(Argument::Integer).ok_or_else(mismatch)
        }
        (OptionType::Integer, Json::String(value)) => {
            value.parse().map(Argument::Integer).map_err(|_| mismatch())
        }
        (OptionType::Number, Json::Number(value)) => {
            value.as_f64().map(Argument::Number).ok_or_else(mismatch)
        }
        (OptionType::Boolean, Json::Bool(value)) => Ok(Argument::Boolean(*value)),
        _ => Err(mismatch()),
    }
}

#[async_trait]
impl<P: Platform> ApplicationCommand<P> for SlashCommand<P> {
    fn base(&self) -> &CommandBase<P> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CommandBase<P> {
        &mut self.base
    }

    fn kind(&self) -> CommandKind {
        CommandKind::ChatInput
    }

    async fn invoke_callback(&self, ctx: Arc<InteractionContext<P>>) -> anyhow::Result<()> {
        let data = ctx.interaction().data();
        let mut arguments = Arguments::new();

        for option in &data.options {
            let declared = self.find_option(&option.name)?;
            let argument = resolve_argument(&ctx, declared, option).await?;
            arguments.insert(&option.name, argument);
        }

        for declared in &self.options {
            if let Some(name) = declared.option_name()
                && !arguments.contains(name)
            {
                let default = declared.default.clone().map_or(Argument::Null, Argument::from);
                arguments.insert(name, default);
            }
        }

        (self.callback)(ctx, arguments).await
    }

    fn to_dict(&self) -> serde_json::Value {
        let mut dict = json!({
            "name": self.name(),
            "description": self.description(),
            "options": self.options.iter().map(CommandOption::to_dict).collect::<Vec<_>>(),
        });
        if self.is_subcommand {
            dict["type"] = json!(OptionType::SubCommand.value());
        }
        dict
    }

    #[cfg(feature = "builder")]
    fn to_command(&self) -> Command {
        let mut command = command_builder(self.name(), self.description(), CommandType::ChatInput);
        for option in &self.options {
            command = command.option(option.clone());
        }
        command.build()
    }
}

impl<P: Platform> Optionable for SlashCommand<P> {
    fn option_name(&self) -> Option<&str> {
        Some(self.name())
    }

    fn input_type(&self) -> OptionType {
        OptionType::SubCommand
    }
}

impl<P: Platform> PartialEq for SlashCommand<P> {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name() && self.description() == other.description()
    }
}

impl<P: Platform> Debug for SlashCommand<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlashCommand")
            .field("name", &self.name())
            .field("options", &self.options)
            .field("is_subcommand", &self.is_subcommand)
            .finish()
    }
}
