//! Callback parameter lists and the option schema derived from them.

use crate::arguments::{Annotated, Parameters};
use crate::errors::ConfigError;
use crate::options::{CommandOption, OptionType, Value};

/// The declared type of a callback parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    /// No type given. Treated as a string option.
    Missing,
    Type(OptionType),
    /// A value that may be omitted by the user.
    Optional(Box<Annotation>),
    /// A fully specified option.
    Option(CommandOption),
    /// A type with no option mapping. Rejected when the schema is built.
    Unrecognized(String),
}

impl Annotation {
    pub fn of<T: Annotated>() -> Self {
        T::annotation()
    }

    pub fn optional(self) -> Self {
        Annotation::Optional(Box::new(self))
    }

    /// Attaches a description, promoting plain types to explicit options.
    pub fn described(self, description: &str) -> Self {
        match self {
            Annotation::Missing => {
                Annotation::Option(CommandOption::new(OptionType::String).description(description))
            }
            Annotation::Type(kind) => {
                Annotation::Option(CommandOption::new(kind).description(description))
            }
            Annotation::Optional(inner) => Annotation::Optional(Box::new(inner.described(description))),
            Annotation::Option(option) => Annotation::Option(option.description(description)),
            Annotation::Unrecognized(name) => Annotation::Unrecognized(name),
        }
    }

    /// Returns the option this annotation describes and whether it was
    /// explicit (an `Option` or an `Optional` wrapper) rather than a bare type.
    fn to_option(&self, command: &str, parameter: &str) -> Result<(CommandOption, bool), ConfigError> {
        match self {
            Annotation::Missing => Ok((CommandOption::new(OptionType::String), false)),
            Annotation::Type(kind) => Ok((CommandOption::new(*kind), false)),
            Annotation::Optional(inner) => {
                let (option, _) = inner.to_option(command, parameter)?;
                Ok((option.required(false), true))
            }
            Annotation::Option(option) => Ok((option.clone(), true)),
            Annotation::Unrecognized(annotation) => Err(ConfigError::UnsupportedAnnotation {
                command: command.to_string(),
                parameter: parameter.to_string(),
                annotation: annotation.clone(),
            }),
        }
    }
}

impl From<OptionType> for Annotation {
    fn from(kind: OptionType) -> Self {
        Annotation::Type(kind)
    }
}

impl From<CommandOption> for Annotation {
    fn from(option: CommandOption) -> Self {
        Annotation::Option(option)
    }
}

/// One declared callback parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub annotation: Annotation,
    /// `None` when the parameter declares no default at all.
    pub default: Option<Value>,
}

impl Parameter {
    pub fn new(name: &str) -> Self {
        Parameter {
            name: name.to_string(),
            annotation: Annotation::Missing,
            default: None,
        }
    }

    pub fn of<T: Annotated>(name: &str) -> Self {
        Parameter::new(name).annotation(T::annotation())
    }

    pub fn annotation(mut self, annotation: Annotation) -> Self {
        self.annotation = annotation;
        self
    }

    pub fn default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    fn to_option(&self, command: &str) -> Result<CommandOption, ConfigError> {
        let (mut option, explicit) = self.annotation.to_option(command, &self.name)?;
        if !explicit && self.default.is_some() {
            option.required = false;
        }
        if option.default.is_none() {
            option.default = self.default.clone().filter(|default| !default.is_null());
        }
        if option.name.is_none() {
            option.name = Some(self.name.clone());
        }
        Ok(option)
    }
}

/// The ordered parameter list of a callback, including the owner (for cog
/// commands) and the invocation context.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signature {
    parameters: Vec<Parameter>,
}

impl Signature {
    pub fn new() -> Self {
        Signature::default()
    }

    /// Signature of a callback taking `(self?, ctx, ..T's fields)`.
    pub fn of<T: Parameters>(cog: bool) -> Self {
        let mut signature = Signature::new();
        if cog {
            signature = signature.receiver();
        }
        let mut signature = signature.context();
        signature.parameters.extend(T::parameters());
        signature
    }

    pub fn param(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Appends the owning cog's receiver.
    pub fn receiver(self) -> Self {
        self.param(Parameter::new("self"))
    }

    /// Appends the invocation context.
    pub fn context(self) -> Self {
        self.param(Parameter::new("ctx"))
    }

    /// Declares `name` through an explicit option instead of its type.
    pub fn option(mut self, name: &str, option: CommandOption) -> Self {
        if let Some(parameter) = self.parameters.iter_mut().find(|p| p.name == name) {
            parameter.annotation = Annotation::Option(option);
        }
        self
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Parameters after the owner and context.
    pub(crate) fn explicit_parameters(
        &self,
        command: &str,
        cog: bool,
    ) -> Result<&[Parameter], ConfigError> {
        let missing = |parameter| ConfigError::MissingParameter {
            command: command.to_string(),
            parameter,
        };

        let mut rest = self.parameters.as_slice();
        if cog {
            rest = rest.split_first().ok_or_else(|| missing("self"))?.1;
        }
        rest = rest.split_first().ok_or_else(|| missing("ctx"))?.1;
        Ok(rest)
    }

    /// Derives the option schema of a slash command, in declaration order.
    pub fn build_options(&self, command: &str, cog: bool) -> Result<Vec<CommandOption>, ConfigError> {
        self.explicit_parameters(command, cog)?
            .iter()
            .map(|parameter| parameter.to_option(command))
            .collect()
    }
}
