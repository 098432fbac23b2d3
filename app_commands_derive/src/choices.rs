use std::collections::HashSet;

use darling::ast::Data;
use darling::{FromDeriveInput, FromVariant};
use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, Ident, parse_macro_input};

/// The platform caps an option at this many choices.
const MAX_CHOICES: usize = 25;

#[derive(FromDeriveInput)]
#[darling(attributes(choice), supports(enum_unit))]
struct ChoicesEnumReceiver {
    ident: Ident,
    data: Data<ChoiceVariant, ()>,
}

#[derive(FromVariant)]
#[darling(attributes(choice))]
struct ChoiceVariant {
    ident: Ident,
    /// Label shown to the user
    #[darling(default)]
    name: Option<String>,
    /// Value sent back by the platform
    #[darling(default)]
    value: Option<String>,
}

struct Choice {
    ident: Ident,
    name: String,
    value: String,
}

pub fn derive(tokens: TokenStream) -> TokenStream {
    let input = parse_macro_input!(tokens as DeriveInput);

    let receiver = match ChoicesEnumReceiver::from_derive_input(&input) {
        Ok(val) => val,
        Err(err) => return TokenStream::from(err.write_errors()),
    };

    let enum_name = &receiver.ident;
    let variants = match receiver.data.take_enum() {
        Some(variants) => variants,
        None => return darling::Error::unsupported_shape("struct").write_errors().into(),
    };

    if variants.len() > MAX_CHOICES {
        return TokenStream::from(
            darling::Error::custom(format!(
                "Enums with more than {MAX_CHOICES} variants are not supported"
            ))
            .write_errors(),
        );
    }

    // Choices default to the variant name for both label and value; the label
    // defaults to the value when only the value is given.
    let choices = variants
        .into_iter()
        .map(|variant| {
            let value = variant
                .value
                .unwrap_or_else(|| variant.ident.to_string());
            Choice {
                name: variant.name.unwrap_or_else(|| value.clone()),
                ident: variant.ident,
                value,
            }
        })
        .collect::<Vec<_>>();

    let mut seen_values = HashSet::new();
    for choice in &choices {
        if !seen_values.insert(&choice.value) {
            return TokenStream::from(
                darling::Error::custom(format!("Duplicate choice value found: {}", choice.value))
                    .write_errors(),
            );
        }
    }

    let option_choices = choices.iter().map(|Choice { name, value, .. }| {
        quote! {
            ::app_commands::options::OptionChoice::new(#name).value(#value)
        }
    });

    let value_matches = choices.iter().map(|Choice { ident, value, .. }| {
        quote! {
            #value => Ok(#enum_name::#ident)
        }
    });

    quote! {
        #[automatically_derived]
        impl ::app_commands::arguments::Choices for #enum_name {
            fn choices() -> Vec<::app_commands::options::OptionChoice> {
                vec![
                    #(#option_choices),*
                ]
            }
        }

        #[automatically_derived]
        impl ::app_commands::arguments::Annotated for #enum_name {
            fn annotation() -> ::app_commands::signature::Annotation {
                ::app_commands::signature::Annotation::Option(
                    ::app_commands::options::CommandOption::new(
                        ::app_commands::options::OptionType::String
                    ).choices(<Self as ::app_commands::arguments::Choices>::choices())
                )
            }
        }

        #[automatically_derived]
        impl<__P: ::app_commands::platform::Platform> ::app_commands::arguments::FromArgument<__P> for #enum_name {
            fn from_argument(
                argument: ::app_commands::arguments::Argument<__P>,
            ) -> ::std::result::Result<Self, ::app_commands::arguments::ArgumentError> {
                match argument {
                    ::app_commands::arguments::Argument::String(value) => match value.as_str() {
                        #(#value_matches,)*
                        other => Err(::app_commands::arguments::ArgumentError::InvalidChoice {
                            value: other.to_string(),
                        }),
                    },
                    ::app_commands::arguments::Argument::Null => {
                        Err(::app_commands::arguments::ArgumentError::Missing)
                    }
                    other => Err(::app_commands::arguments::ArgumentError::InvalidType {
                        expected: "string",
                        found: other.kind(),
                    }),
                }
            }
        }
    }
    .into()
}
