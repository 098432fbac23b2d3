use anyhow::Result;
use darling::FromField;
use darling::{FromDeriveInput, ast::Data};
use proc_macro::TokenStream;
use proc_macro2::Ident;
use quote::{format_ident, quote};
use syn::{GenericParam, Lit, parse_macro_input};
use thiserror::Error;

#[derive(Debug, FromDeriveInput)]
#[darling(supports(struct_named, struct_unit))]
struct ParametersReceiver {
    ident: syn::Ident,
    generics: syn::Generics,
    data: Data<(), ParamReceiver>,
}

#[derive(Debug, FromField)]
#[darling(attributes(param))]
struct ParamReceiver {
    ident: Option<syn::Ident>,
    ty: syn::Type,
    /// Override the name of the option
    #[darling(default)]
    name: Option<String>,
    /// Set the description of the option
    #[darling(default)]
    description: Option<String>,
    /// Value used when the user leaves the option out
    #[darling(default)]
    default: Option<Lit>,
}

#[derive(Error, Debug)]
enum ParamError {
    #[error("Field is missing an identifier")]
    MissingIdent,
    #[error("Defaults must be string, integer, float or boolean literals")]
    UnsupportedDefault,
    #[error("Invalid default: {0}")]
    InvalidDefault(#[from] syn::Error),
}

pub fn derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as syn::DeriveInput);
    let receiver = match ParametersReceiver::from_derive_input(&input) {
        Ok(r) => r,
        Err(e) => return e.write_errors().into(),
    };

    let fields = match receiver.data.take_struct() {
        Some(fields) => fields.fields,
        None => return darling::Error::unsupported_shape("enum").write_errors().into(),
    };

    let parameters: Result<Vec<proc_macro2::TokenStream>> =
        fields.iter().map(field_parameter).collect();
    let parameters = match parameters {
        Ok(parameters) => parameters,
        Err(e) => return darling::Error::custom(e.to_string()).write_errors().into(),
    };

    let field_names: Result<Vec<(String, Ident)>> = fields.iter().map(field_name).collect();
    let field_names = match field_names {
        Ok(names) => names,
        Err(e) => return darling::Error::custom(e.to_string()).write_errors().into(),
    };

    let ident = &receiver.ident;
    let (impl_generics, ty_generics, where_clause) = receiver.generics.split_for_impl();

    let struct_fields = field_names.iter().map(|(name, field_ident)| {
        quote! {
            #field_ident: arguments.take(#name)?
        }
    });

    // A generic struct is parameterized by its platform; anything else
    // converts for every platform.
    let platform = receiver.generics.params.iter().find_map(|param| match param {
        GenericParam::Type(param) => Some(param.ident.clone()),
        _ => None,
    });
    let from_arguments_impl = match platform {
        Some(platform) => quote! {
            #[automatically_derived]
            impl #impl_generics ::app_commands::arguments::FromArguments<#platform> for #ident #ty_generics #where_clause {
                fn from_arguments(
                    #[allow(unused_mut)] mut arguments: ::app_commands::arguments::Arguments<#platform>,
                ) -> ::std::result::Result<Self, ::app_commands::arguments::ArgumentError> {
                    Ok(Self {
                        #(#struct_fields,)*
                    })
                }
            }
        },
        None => {
            let platform = format_ident!("__P");
            quote! {
                #[automatically_derived]
                impl<#platform: ::app_commands::platform::Platform> ::app_commands::arguments::FromArguments<#platform> for #ident {
                    fn from_arguments(
                        #[allow(unused_mut)] mut arguments: ::app_commands::arguments::Arguments<#platform>,
                    ) -> ::std::result::Result<Self, ::app_commands::arguments::ArgumentError> {
                        Ok(Self {
                            #(#struct_fields,)*
                        })
                    }
                }
            }
        }
    };

    quote! {
        #[automatically_derived]
        impl #impl_generics ::app_commands::arguments::Parameters for #ident #ty_generics #where_clause {
            fn parameters() -> Vec<::app_commands::signature::Parameter> {
                vec![
                    #(#parameters),*
                ]
            }
        }

        #from_arguments_impl
    }
    .into()
}

fn field_parameter(field: &ParamReceiver) -> Result<proc_macro2::TokenStream> {
    let (name, _) = field_name(field)?;
    let ty = &field.ty;

    let mut annotation = quote! {
        <#ty as ::app_commands::arguments::Annotated>::annotation()
    };
    if let Some(description) = &field.description {
        annotation = quote! { #annotation.described(#description) };
    }

    let mut parameter = quote! {
        ::app_commands::signature::Parameter::new(#name).annotation(#annotation)
    };
    if let Some(default) = &field.default {
        let value = default_value(default)?;
        parameter = quote! { #parameter.default(#value) };
    }
    Ok(parameter)
}

/// Maps a default literal onto the matching `Value` variant.
fn default_value(literal: &Lit) -> Result<proc_macro2::TokenStream, ParamError> {
    let value = match literal {
        Lit::Str(value) => {
            let value = value.value();
            quote! { ::app_commands::options::Value::String(#value.to_string()) }
        }
        Lit::Int(value) => {
            let value: i64 = value.base10_parse()?;
            quote! { ::app_commands::options::Value::Integer(#value) }
        }
        Lit::Float(value) => {
            let value: f64 = value.base10_parse()?;
            quote! { ::app_commands::options::Value::Number(#value) }
        }
        Lit::Bool(value) => {
            let value = value.value;
            quote! { ::app_commands::options::Value::Boolean(#value) }
        }
        _ => return Err(ParamError::UnsupportedDefault),
    };
    Ok(value)
}

fn field_name(field: &ParamReceiver) -> Result<(String, Ident)> {
    let ident = field.ident.as_ref().ok_or(ParamError::MissingIdent)?.clone();
    let name = field.name.clone().unwrap_or_else(|| ident.to_string());
    Ok((name, ident))
}
