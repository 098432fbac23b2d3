use proc_macro::TokenStream;

mod choices;
mod parameters;

/// Derives `Parameters` and `FromArguments` for a struct whose fields are the
/// options of a slash command.
#[proc_macro_derive(Parameters, attributes(param))]
pub fn parameters_derive(input: TokenStream) -> TokenStream {
    parameters::derive(input)
}

#[proc_macro_derive(Choices, attributes(choice))]
pub fn enum_choices_derive(input: TokenStream) -> TokenStream {
    choices::derive(input)
}
