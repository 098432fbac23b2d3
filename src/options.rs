use serde_json::json;
use twilight_model::application::command::{
    CommandOptionChoice, CommandOptionChoiceValue, CommandOptionType,
};

pub const DEFAULT_DESCRIPTION: &str = "No description provided";

/// Wire type tag of an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OptionType {
    SubCommand = 1,
    SubCommandGroup = 2,
    String = 3,
    Integer = 4,
    Boolean = 5,
    User = 6,
    Channel = 7,
    Role = 8,
    Mentionable = 9,
    Number = 10,
}

impl OptionType {
    /// Numeric value sent to the platform.
    pub const fn value(self) -> u8 {
        self as u8
    }

    pub const fn name(self) -> &'static str {
        match self {
            OptionType::SubCommand => "sub_command",
            OptionType::SubCommandGroup => "sub_command_group",
            OptionType::String => "string",
            OptionType::Integer => "integer",
            OptionType::Boolean => "boolean",
            OptionType::User => "user",
            OptionType::Channel => "channel",
            OptionType::Role => "role",
            OptionType::Mentionable => "mentionable",
            OptionType::Number => "number",
        }
    }

    /// User, channel and role options: a snowflake looked up on the guild.
    pub fn is_guild_entity(self) -> bool {
        (OptionType::User.value()..=OptionType::Role.value()).contains(&self.value())
    }
}

impl From<OptionType> for CommandOptionType {
    fn from(kind: OptionType) -> Self {
        match kind {
            OptionType::SubCommand => CommandOptionType::SubCommand,
            OptionType::SubCommandGroup => CommandOptionType::SubCommandGroup,
            OptionType::String => CommandOptionType::String,
            OptionType::Integer => CommandOptionType::Integer,
            OptionType::Boolean => CommandOptionType::Boolean,
            OptionType::User => CommandOptionType::User,
            OptionType::Channel => CommandOptionType::Channel,
            OptionType::Role => CommandOptionType::Role,
            OptionType::Mentionable => CommandOptionType::Mentionable,
            OptionType::Number => CommandOptionType::Number,
        }
    }
}

/// A declared default value. `Null` is an explicit "defaults to nothing".
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChoiceValue {
    String(String),
    Integer(i64),
    Number(f64),
}

impl ChoiceValue {
    fn to_json(&self) -> serde_json::Value {
        match self {
            ChoiceValue::String(value) => json!(value),
            ChoiceValue::Integer(value) => json!(value),
            ChoiceValue::Number(value) => json!(value),
        }
    }
}

impl From<&str> for ChoiceValue {
    fn from(value: &str) -> Self {
        ChoiceValue::String(value.to_string())
    }
}

impl From<String> for ChoiceValue {
    fn from(value: String) -> Self {
        ChoiceValue::String(value)
    }
}

impl From<i64> for ChoiceValue {
    fn from(value: i64) -> Self {
        ChoiceValue::Integer(value)
    }
}

impl From<f64> for ChoiceValue {
    fn from(value: f64) -> Self {
        ChoiceValue::Number(value)
    }
}

/// One selectable value of an option. The value defaults to the name.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionChoice {
    pub name: String,
    pub value: ChoiceValue,
}

impl OptionChoice {
    pub fn new(name: &str) -> Self {
        OptionChoice {
            name: name.to_string(),
            value: ChoiceValue::String(name.to_string()),
        }
    }

    pub fn value(mut self, value: impl Into<ChoiceValue>) -> Self {
        self.value = value.into();
        self
    }

    pub fn to_dict(&self) -> serde_json::Value {
        json!({
            "name": self.name,
            "value": self.value.to_json(),
        })
    }
}

impl From<OptionChoice> for CommandOptionChoice {
    fn from(choice: OptionChoice) -> Self {
        let value = match choice.value {
            ChoiceValue::String(value) => CommandOptionChoiceValue::String(value),
            ChoiceValue::Integer(value) => CommandOptionChoiceValue::Integer(value),
            ChoiceValue::Number(value) => CommandOptionChoiceValue::Number(value),
        };
        CommandOptionChoice {
            name: choice.name,
            name_localizations: None,
            value,
        }
    }
}

/// Something that occupies a named slot in an option list: a plain option,
/// a subcommand, or a nested subcommand group.
pub trait Optionable {
    fn option_name(&self) -> Option<&str>;
    fn input_type(&self) -> OptionType;
}

/// Schema of one slash command parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOption {
    /// Filled from the parameter name when the schema is built.
    pub name: Option<String>,
    pub description: String,
    pub input_type: OptionType,
    pub required: bool,
    pub choices: Vec<OptionChoice>,
    pub default: Option<Value>,
}

impl CommandOption {
    pub fn new(input_type: OptionType) -> Self {
        CommandOption {
            name: None,
            description: DEFAULT_DESCRIPTION.to_string(),
            input_type,
            required: true,
            choices: Vec::new(),
            default: None,
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn choices(mut self, choices: Vec<OptionChoice>) -> Self {
        self.choices = choices;
        self
    }

    pub fn choice(mut self, choice: OptionChoice) -> Self {
        self.choices.push(choice);
        self
    }

    pub fn default(mut self, default: impl Into<Value>) -> Self {
        let default = default.into();
        self.default = (!default.is_null()).then_some(default);
        self
    }

    pub fn to_dict(&self) -> serde_json::Value {
        json!({
            "name": self.name,
            "description": self.description,
            "type": self.input_type.value(),
            "required": self.required,
            "choices": self.choices.iter().map(OptionChoice::to_dict).collect::<Vec<_>>(),
        })
    }
}

impl Optionable for CommandOption {
    fn option_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn input_type(&self) -> OptionType {
        self.input_type
    }
}

impl From<CommandOption> for twilight_model::application::command::CommandOption {
    fn from(option: CommandOption) -> Self {
        let choices = (!option.choices.is_empty()).then(|| {
            option
                .choices
                .into_iter()
                .map(CommandOptionChoice::from)
                .collect()
        });
        twilight_model::application::command::CommandOption {
            autocomplete: None,
            channel_types: None,
            choices,
            name: option.name.unwrap_or_default(),
            description: option.description,
            kind: option.input_type.into(),
            max_length: None,
            max_value: None,
            min_length: None,
            min_value: None,
            required: Some(option.required),
            description_localizations: None,
            name_localizations: None,
            options: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guild_entity_range_covers_user_through_role() {
        assert!(OptionType::User.is_guild_entity());
        assert!(OptionType::Channel.is_guild_entity());
        assert!(OptionType::Role.is_guild_entity());
        assert!(!OptionType::Mentionable.is_guild_entity());
        assert!(!OptionType::String.is_guild_entity());
        assert!(!OptionType::Number.is_guild_entity());
    }

    #[test]
    fn choice_value_defaults_to_name() {
        let choice = OptionChoice::new("red");
        assert_eq!(choice.value, ChoiceValue::String("red".to_string()));
        let choice = OptionChoice::new("one").value(1_i64);
        assert_eq!(choice.to_dict(), json!({"name": "one", "value": 1}));
    }

    #[test]
    fn option_dict_shape() {
        let option = CommandOption::new(OptionType::Integer)
            .name("amount")
            .description("How many")
            .required(false)
            .choice(OptionChoice::new("one").value(1_i64))
            .choice(OptionChoice::new("two").value(2_i64));

        assert_eq!(
            option.to_dict(),
            json!({
                "name": "amount",
                "description": "How many",
                "type": 4,
                "required": false,
                "choices": [
                    {"name": "one", "value": 1},
                    {"name": "two", "value": 2},
                ],
            })
        );
    }

    #[test]
    fn null_default_is_unset() {
        let option = CommandOption::new(OptionType::String).default(Value::Null);
        assert_eq!(option.default, None);
        let option = CommandOption::new(OptionType::String).default("x");
        assert_eq!(option.default, Some(Value::String("x".to_string())));
    }

    #[test]
    fn converts_to_twilight_option() {
        let option = CommandOption::new(OptionType::Boolean).name("flag");
        let converted = twilight_model::application::command::CommandOption::from(option);
        assert_eq!(converted.name, "flag");
        assert_eq!(converted.kind, CommandOptionType::Boolean);
        assert_eq!(converted.required, Some(true));
        assert!(converted.choices.is_none());
    }
}
