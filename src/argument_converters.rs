use crate::arguments::{
    Annotated, Argument, ArgumentError, FromArgument, Mentionable, ResolvedChannel, ResolvedMember,
    ResolvedRole,
};
use crate::options::OptionType;
use crate::platform::Platform;
use crate::signature::Annotation;

fn invalid_type<P: Platform>(expected: &'static str, argument: &Argument<P>) -> ArgumentError {
    if argument.is_null() {
        ArgumentError::Missing
    } else {
        ArgumentError::InvalidType {
            expected,
            found: argument.kind(),
        }
    }
}

impl<P: Platform> FromArgument<P> for Argument<P> {
    fn from_argument(argument: Argument<P>) -> Result<Self, ArgumentError> {
        Ok(argument)
    }
}

impl<P: Platform> FromArgument<P> for String {
    fn from_argument(argument: Argument<P>) -> Result<Self, ArgumentError> {
        match argument {
            Argument::String(value) => Ok(value),
            other => Err(invalid_type("string", &other)),
        }
    }
}

impl Annotated for String {
    fn annotation() -> Annotation {
        Annotation::Type(OptionType::String)
    }
}

// --- Numeric Types ---
macro_rules! integer_converter {
    ($($ty:ty),*) => {
        $(
            impl<P: Platform> FromArgument<P> for $ty {
                fn from_argument(argument: Argument<P>) -> Result<Self, ArgumentError> {
                    match argument {
                        Argument::Integer(value) => <$ty>::try_from(value).map_err(|_| {
                            ArgumentError::OutOfRange {
                                value,
                                expected: stringify!($ty),
                            }
                        }),
                        other => Err(invalid_type("integer", &other)),
                    }
                }
            }

            impl Annotated for $ty {
                fn annotation() -> Annotation {
                    Annotation::Type(OptionType::Integer)
                }
            }
        )*
    };
}

macro_rules! float_converter {
    ($($ty:ty),*) => {
        $(
            impl<P: Platform> FromArgument<P> for $ty {
                fn from_argument(argument: Argument<P>) -> Result<Self, ArgumentError> {
                    match argument {
                        Argument::Number(value) => Ok(value as $ty),
                        Argument::Integer(value) => Ok(value as $ty),
                        other => Err(invalid_type("number", &other)),
                    }
                }
            }

            impl Annotated for $ty {
                fn annotation() -> Annotation {
                    Annotation::Type(OptionType::Number)
                }
            }
        )*
    };
}

integer_converter!(i8, i16, i32, i64, i128, isize);
integer_converter!(u8, u16, u32, u64, u128, usize);
float_converter!(f32, f64);

// --- Boolean Type ---
impl<P: Platform> FromArgument<P> for bool {
    fn from_argument(argument: Argument<P>) -> Result<Self, ArgumentError> {
        match argument {
            Argument::Boolean(value) => Ok(value),
            other => Err(invalid_type("boolean", &other)),
        }
    }
}

impl Annotated for bool {
    fn annotation() -> Annotation {
        Annotation::Type(OptionType::Boolean)
    }
}

// --- Optional values ---
impl<P: Platform, T: FromArgument<P>> FromArgument<P> for Option<T> {
    fn from_argument(argument: Argument<P>) -> Result<Self, ArgumentError> {
        match argument {
            Argument::Null => Ok(None),
            other => T::from_argument(other).map(Some),
        }
    }
}

impl<T: Annotated> Annotated for Option<T> {
    fn annotation() -> Annotation {
        Annotation::Optional(Box::new(T::annotation()))
    }
}

// --- Guild entities ---
impl<P: Platform> FromArgument<P> for ResolvedMember<P> {
    fn from_argument(argument: Argument<P>) -> Result<Self, ArgumentError> {
        match argument {
            Argument::Member(member) => Ok(ResolvedMember(member)),
            other => Err(invalid_type("member", &other)),
        }
    }
}

impl<P: Platform> Annotated for ResolvedMember<P> {
    fn annotation() -> Annotation {
        Annotation::Type(OptionType::User)
    }
}

impl<P: Platform> FromArgument<P> for ResolvedChannel<P> {
    fn from_argument(argument: Argument<P>) -> Result<Self, ArgumentError> {
        match argument {
            Argument::Channel(channel) => Ok(ResolvedChannel(channel)),
            other => Err(invalid_type("channel", &other)),
        }
    }
}

impl<P: Platform> Annotated for ResolvedChannel<P> {
    fn annotation() -> Annotation {
        Annotation::Type(OptionType::Channel)
    }
}

impl<P: Platform> FromArgument<P> for ResolvedRole<P> {
    fn from_argument(argument: Argument<P>) -> Result<Self, ArgumentError> {
        match argument {
            Argument::Role(role) => Ok(ResolvedRole(role)),
            other => Err(invalid_type("role", &other)),
        }
    }
}

impl<P: Platform> Annotated for ResolvedRole<P> {
    fn annotation() -> Annotation {
        Annotation::Type(OptionType::Role)
    }
}

impl<P: Platform> FromArgument<P> for Mentionable<P> {
    fn from_argument(argument: Argument<P>) -> Result<Self, ArgumentError> {
        match argument {
            Argument::Member(member) => Ok(Mentionable::Member(member)),
            Argument::Role(role) => Ok(Mentionable::Role(role)),
            other => Err(invalid_type("mentionable", &other)),
        }
    }
}

impl<P: Platform> Annotated for Mentionable<P> {
    // NOTE: Mentionable can be either a member or a role
    fn annotation() -> Annotation {
        Annotation::Type(OptionType::Mentionable)
    }
}
