// Lets the derive output's `::app_commands` paths resolve inside this crate.
extern crate self as app_commands;

pub mod argument_converters;
pub mod arguments;
pub mod commands;
pub mod context;
pub mod decorators;
pub mod errors;
pub mod executor;
pub mod options;
pub mod platform;
pub mod signature;
pub mod validation;

pub use arguments::{
    Annotated, Argument, ArgumentError, Arguments, Choices, FromArgument, FromArguments,
    Mentionable, Parameters, ResolvedChannel, ResolvedMember, ResolvedRole,
};
pub use commands::context_menu::{MessageCommand, UserCommand, UserTarget};
pub use commands::group::{SubCommand, SubCommandGroup};
pub use commands::slash::SlashCommand;
pub use commands::{ApplicationCommand, CommandAttrs};
pub use context::{Interaction, InteractionContext, InteractionData};
pub use decorators::{
    AnyCommand, Callback, application_command, message_command, slash_command, user_command,
};
pub use errors::{Cancelled, CommandError, ConfigError, ValidationError};
pub use executor::CommandExecutor;
pub use options::{CommandOption, OptionChoice, OptionType, Value};
pub use signature::{Annotation, Parameter, Signature};

// Re-export macros
#[cfg(feature = "derive")]
pub use app_commands_derive::{Choices, Parameters};
