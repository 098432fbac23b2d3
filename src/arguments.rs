use std::collections::HashMap;

use thiserror::Error;
use twilight_model::id::Id;

use crate::options::{OptionChoice, Value};
use crate::platform::{Entity, Platform};
use crate::signature::{Annotation, Parameter};

/// A resolved option value, as handed to a slash command callback.
pub enum Argument<P: Platform> {
    Null,
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    Member(P::Member),
    Channel(P::Channel),
    Role(P::Role),
}

impl<P: Platform> Argument<P> {
    pub fn kind(&self) -> &'static str {
        match self {
            Argument::Null => "null",
            Argument::String(_) => "string",
            Argument::Integer(_) => "integer",
            Argument::Number(_) => "number",
            Argument::Boolean(_) => "boolean",
            Argument::Member(_) => "member",
            Argument::Channel(_) => "channel",
            Argument::Role(_) => "role",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Argument::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Argument::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Argument::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Argument::Number(value) => Some(*value),
            Argument::Integer(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Argument::Boolean(value) => Some(*value),
            _ => None,
        }
    }
}

impl<P: Platform> From<Value> for Argument<P> {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Argument::Null,
            Value::String(value) => Argument::String(value),
            Value::Integer(value) => Argument::Integer(value),
            Value::Number(value) => Argument::Number(value),
            Value::Boolean(value) => Argument::Boolean(value),
        }
    }
}

impl<P: Platform> From<Entity<P>> for Argument<P> {
    fn from(entity: Entity<P>) -> Self {
        match entity {
            Entity::Member(member) => Argument::Member(member),
            Entity::Channel(channel) => Argument::Channel(channel),
            Entity::Role(role) => Argument::Role(role),
        }
    }
}

/// Keyword arguments of a slash command invocation, keyed by option name.
pub struct Arguments<P: Platform> {
    values: HashMap<String, Argument<P>>,
}

impl<P: Platform> Arguments<P> {
    pub fn new() -> Self {
        Arguments {
            values: HashMap::new(),
        }
    }

    pub fn insert(&mut self, name: &str, argument: Argument<P>) {
        self.values.insert(name.to_string(), argument);
    }

    pub fn get(&self, name: &str) -> Option<&Argument<P>> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Removes `name` and converts it. An absent name converts from `Null`.
    pub fn take<T: FromArgument<P>>(&mut self, name: &str) -> Result<T, ArgumentError> {
        let argument = self.values.remove(name).unwrap_or(Argument::Null);
        T::from_argument(argument).map_err(|source| ArgumentError::Option {
            name: name.to_string(),
            source: Box::new(source),
        })
    }
}

impl<P: Platform> Default for Arguments<P> {
    fn default() -> Self {
        Arguments::new()
    }
}

#[derive(Debug, Error)]
pub enum ArgumentError {
    #[error("Invalid type for command argument: expected {expected}, found {found}")]
    InvalidType {
        expected: &'static str,
        found: &'static str,
    },
    #[error("Missing value for required argument")]
    Missing,
    #[error("Value {value} is out of range for {expected}")]
    OutOfRange { value: i64, expected: &'static str },
    #[error("{value:?} is not one of the declared choices")]
    InvalidChoice { value: String },
    #[error("Invalid snowflake {0}")]
    InvalidSnowflake(String),
    #[error("Command {command} has no option named {option}")]
    UnknownOption { command: String, option: String },
    #[error("Group {group} has no subcommand named {name}")]
    UnknownSubcommand { group: String, name: String },
    #[error("Group {group} was invoked without selecting a subcommand")]
    MissingSubcommand { group: String },
    #[error("Interaction payload has no resolved {0}")]
    MissingResolved(&'static str),
    #[error("Option {0} can only be resolved inside a guild")]
    GuildRequired(String),
    #[error("Failed to parse argument {name}: {source}")]
    Option {
        name: String,
        #[source]
        source: Box<ArgumentError>,
    },
}

/// Maps a native Rust type to the option annotation it declares.
pub trait Annotated {
    fn annotation() -> Annotation;
}

/// Converts a resolved argument into a native value.
pub trait FromArgument<P: Platform>: Sized {
    fn from_argument(argument: Argument<P>) -> Result<Self, ArgumentError>;
}

/// A type whose fields describe a slash command's parameters.
///
/// Usually derived with `#[derive(Parameters)]`.
pub trait Parameters {
    /// Parameters in declaration order, without the owner and context.
    fn parameters() -> Vec<Parameter>;
}

/// Builds a [`Parameters`] type from the keyword arguments of an invocation.
pub trait FromArguments<P: Platform>: Sized {
    fn from_arguments(arguments: Arguments<P>) -> Result<Self, ArgumentError>;
}

/// A unit enum offered to the user as a fixed list of string choices.
///
/// Usually derived with `#[derive(Choices)]`.
pub trait Choices {
    fn choices() -> Vec<OptionChoice>;
}

/// A `user` option, resolved to a guild member.
pub struct ResolvedMember<P: Platform>(pub P::Member);

pub struct ResolvedChannel<P: Platform>(pub P::Channel);

pub struct ResolvedRole<P: Platform>(pub P::Role);

/// A `mentionable` option: a member when one exists for the id, a role
/// otherwise.
pub enum Mentionable<P: Platform> {
    Member(P::Member),
    Role(P::Role),
}

/// Parses a snowflake sent either as a numeric string or as a number.
pub(crate) fn parse_snowflake<T>(value: &serde_json::Value) -> Result<Id<T>, ArgumentError> {
    let raw = match value {
        serde_json::Value::String(value) => value.parse::<u64>().ok(),
        serde_json::Value::Number(value) => value.as_u64(),
        _ => None,
    };
    raw.and_then(Id::<T>::new_checked)
        .ok_or_else(|| ArgumentError::InvalidSnowflake(value.to_string()))
}
