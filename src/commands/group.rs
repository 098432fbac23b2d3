use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;
#[cfg(feature = "builder")]
use twilight_model::application::command::{Command, CommandType};
use twilight_model::id::{Id, marker::GuildMarker};
#[cfg(feature = "builder")]
use twilight_util::builder::command::SubCommandGroupBuilder;

use super::slash::SlashCommand;
#[cfg(feature = "builder")]
use super::command_builder;
use super::{ApplicationCommand, CommandAttrs, CommandBase};
use crate::arguments::{ArgumentError, Arguments, FromArguments, Parameters};
use crate::context::{CommandKind, InteractionContext};
use crate::errors::{CommandError, ConfigError};
use crate::options::{OptionType, Optionable};
use crate::platform::Platform;
use crate::signature::Signature;
use crate::validation::{validate_description, validate_name};

/// A child of a [`SubCommandGroup`], borrowed from it.
pub enum SubCommand<'a, P: Platform> {
    Command(&'a SlashCommand<P>),
    Group(&'a SubCommandGroup<P>),
}

impl<P: Platform> SubCommand<'_, P> {
    pub fn name(&self) -> &str {
        match self {
            SubCommand::Command(command) => command.name(),
            SubCommand::Group(group) => group.name(),
        }
    }

    pub fn to_dict(&self) -> serde_json::Value {
        match self {
            SubCommand::Command(command) => command.to_dict(),
            SubCommand::Group(group) => group.to_dict(),
        }
    }

    async fn invoke(&self, ctx: Arc<InteractionContext<P>>) -> Result<(), CommandError> {
        match self {
            SubCommand::Command(command) => command.invoke(ctx).await,
            SubCommand::Group(group) => group.invoke(ctx).await,
        }
    }
}

impl<P: Platform> Optionable for SubCommand<'_, P> {
    fn option_name(&self) -> Option<&str> {
        Some(self.name())
    }

    fn input_type(&self) -> OptionType {
        match self {
            SubCommand::Command(command) => command.input_type(),
            SubCommand::Group(group) => group.input_type(),
        }
    }
}

/// Position of a child in its typed list.
#[derive(Debug, Clone, Copy)]
enum Child {
    Command(usize),
    Group(usize),
}

/// A command that only routes to its children.
///
/// Groups nest at most once: a group created through
/// [`SubCommandGroup::command_group`] cannot hold further groups.
pub struct SubCommandGroup<P: Platform> {
    base: CommandBase<P>,
    commands: Vec<SlashCommand<P>>,
    groups: Vec<SubCommandGroup<P>>,
    /// Children in the order they were added.
    order: Vec<Child>,
    parent_group: Option<String>,
}

impl<P: Platform> SubCommandGroup<P> {
    pub fn new(name: &str, description: &str) -> Result<Self, ConfigError> {
        validate_name(name)?;
        validate_description(description)?;
        Ok(SubCommandGroup {
            base: CommandBase::new(CommandAttrs::new(name), description.to_string()),
            commands: Vec::new(),
            groups: Vec::new(),
            order: Vec::new(),
            parent_group: None,
        })
    }

    /// Restricts registration of the group to the given guilds.
    pub fn guild_ids(mut self, guild_ids: impl IntoIterator<Item = Id<GuildMarker>>) -> Self {
        self.base.set_guild_ids(guild_ids.into_iter().collect());
        self
    }

    /// Children in the order they were added.
    pub fn subcommands(&self) -> Vec<SubCommand<'_, P>> {
        self.order
            .iter()
            .map(|child| match *child {
                Child::Command(index) => SubCommand::Command(&self.commands[index]),
                Child::Group(index) => SubCommand::Group(&self.groups[index]),
            })
            .collect()
    }

    /// Name of the enclosing group, when this group is nested.
    pub fn parent_group(&self) -> Option<&str> {
        self.parent_group.as_deref()
    }

    /// Adds a slash subcommand and returns it for further configuration.
    pub fn command<F, Fut>(
        &mut self,
        attrs: CommandAttrs<P>,
        signature: Signature,
        callback: F,
    ) -> Result<&mut SlashCommand<P>, ConfigError>
    where
        F: Fn(Arc<InteractionContext<P>>, Arguments<P>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let command = SlashCommand::new(attrs, signature, callback)?;
        Ok(self.push_command(command))
    }

    /// Like [`SubCommandGroup::command`], with the options taken from a
    /// [`Parameters`] type.
    pub fn typed_command<T, F, Fut>(
        &mut self,
        attrs: CommandAttrs<P>,
        callback: F,
    ) -> Result<&mut SlashCommand<P>, ConfigError>
    where
        T: Parameters + FromArguments<P> + 'static,
        F: Fn(Arc<InteractionContext<P>>, T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let command = SlashCommand::typed(attrs, callback)?;
        Ok(self.push_command(command))
    }

    /// Adds a nested group. Fails if this group is itself nested.
    pub fn command_group(
        &mut self,
        name: &str,
        description: &str,
    ) -> Result<&mut SubCommandGroup<P>, ConfigError> {
        if self.parent_group.is_some() {
            return Err(ConfigError::NestingTooDeep {
                group: self.name().to_string(),
            });
        }

        let mut group = SubCommandGroup::new(name, description)?;
        group.parent_group = Some(self.name().to_string());
        let index = self.groups.len();
        self.groups.push(group);
        self.order.push(Child::Group(index));
        Ok(&mut self.groups[index])
    }

    fn push_command(&mut self, mut command: SlashCommand<P>) -> &mut SlashCommand<P> {
        command.set_subcommand();
        let index = self.commands.len();
        self.commands.push(command);
        self.order.push(Child::Command(index));
        &mut self.commands[index]
    }

    fn find_subcommand(&self, name: &str) -> Result<SubCommand<'_, P>, ArgumentError> {
        self.subcommands()
            .into_iter()
            .find(|subcommand| subcommand.name() == name)
            .ok_or_else(|| ArgumentError::UnknownSubcommand {
                group: self.name().to_string(),
                name: name.to_string(),
            })
    }

    #[cfg(feature = "builder")]
    fn to_group_builder(&self) -> SubCommandGroupBuilder {
        let subcommands = self.commands.iter().map(SlashCommand::to_subcommand);
        SubCommandGroupBuilder::new(self.name(), self.description()).subcommands(subcommands)
    }
}

#[async_trait]
impl<P: Platform> ApplicationCommand<P> for SubCommandGroup<P> {
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
        let option = data
            .options
            .first()
            .ok_or_else(|| ArgumentError::MissingSubcommand {
                group: self.name().to_string(),
            })?;
        let subcommand = self.find_subcommand(&option.name)?;

        debug!(group = %self.name(), subcommand = %option.name, "dispatching to subcommand");
        ctx.interaction().set_data(data.scoped(option));
        subcommand.invoke(ctx).await?;
        Ok(())
    }

    fn to_dict(&self) -> serde_json::Value {
        let mut dict = json!({
            "name": self.name(),
            "description": self.description(),
            "options": self
                .subcommands()
                .iter()
                .map(SubCommand::to_dict)
                .collect::<Vec<_>>(),
        });
        if self.parent_group.is_some() {
            dict["type"] = json!(self.input_type().value());
        }
        dict
    }

    #[cfg(feature = "builder")]
    fn to_command(&self) -> Command {
        let mut command = command_builder(self.name(), self.description(), CommandType::ChatInput);
        for subcommand in self.subcommands() {
            command = match subcommand {
                SubCommand::Command(child) => command.option(child.to_subcommand().build()),
                SubCommand::Group(child) => command.option(child.to_group_builder().build()),
            };
        }
        command.build()
    }
}

impl<P: Platform> Optionable for SubCommandGroup<P> {
    fn option_name(&self) -> Option<&str> {
        Some(self.name())
    }

    fn input_type(&self) -> OptionType {
        OptionType::SubCommandGroup
    }
}

impl<P: Platform> Debug for SubCommandGroup<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let subcommands = self.subcommands();
        let names: Vec<&str> = subcommands.iter().map(SubCommand::name).collect();
        f.debug_struct("SubCommandGroup")
            .field("name", &self.name())
            .field("subcommands", &names)
            .field("parent_group", &self.parent_group)
            .finish()
    }
}
