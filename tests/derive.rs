mod common;

use std::sync::{Arc, Mutex};

use app_commands::arguments::ArgumentError;
use app_commands::commands::{ApplicationCommand, CommandAttrs};
use app_commands::context::{DataOption, InteractionData};
use app_commands::options::{CommandOption, OptionChoice, OptionType, Value};
use app_commands::platform::Platform;
use app_commands::signature::{Annotation, Parameter};
use app_commands::{Choices, Parameters, ResolvedMember, SlashCommand, SubCommandGroup};
use common::{Bot, GUILD_ID, Guild, Log, Mock, State};

#[derive(Debug, Clone, Copy, PartialEq, Choices)]
enum Flavor {
    Vanilla,
    #[choice(name = "Chocolate Chip", value = "choc")]
    Chocolate,
}

#[derive(Debug, PartialEq, Parameters)]
struct Order {
    #[param(description = "What to scoop")]
    flavor: Flavor,
    #[param(default = 1)]
    scoops: i64,
    #[param(name = "to", description = "Who it is for")]
    recipient: Option<String>,
}

#[derive(Parameters)]
struct Kick<P: Platform> {
    member: ResolvedMember<P>,
    reason: Option<String>,
}

#[test]
fn choices_derive_lists_every_variant() {
    assert_eq!(
        <Flavor as app_commands::Choices>::choices(),
        vec![
            OptionChoice::new("Vanilla"),
            OptionChoice::new("Chocolate Chip").value("choc"),
        ]
    );
}

#[test]
fn parameters_derive_describes_every_field() {
    let parameters = <Order as app_commands::Parameters>::parameters();

    assert_eq!(
        parameters,
        vec![
            Parameter::new("flavor").annotation(Annotation::Option(
                CommandOption::new(OptionType::String)
                    .choices(<Flavor as app_commands::Choices>::choices())
                    .description("What to scoop"),
            )),
            Parameter::new("scoops")
                .annotation(Annotation::Type(OptionType::Integer))
                .default(Value::Integer(1)),
            Parameter::new("to").annotation(
                Annotation::Optional(Box::new(Annotation::Type(OptionType::String)))
                    .described("Who it is for"),
            ),
        ]
    );
}

#[test]
fn typed_commands_build_their_options_from_the_struct() {
    let command = SlashCommand::<Mock>::typed::<Order, _, _>(CommandAttrs::new("order"), |_ctx, _order| async {
        Ok(())
    })
    .unwrap();

    let options = command.options();
    assert_eq!(options.len(), 3);
    assert_eq!(options[0].choices.len(), 2);
    assert!(options[0].required);
    assert!(!options[1].required);
    assert_eq!(options[1].default, Some(Value::Integer(1)));
    assert_eq!(options[2].name.as_deref(), Some("to"));
    assert!(!options[2].required);
}

fn ordering(seen: &Arc<Mutex<Option<Order>>>) -> SlashCommand<Mock> {
    let seen = Arc::clone(seen);
    SlashCommand::typed(CommandAttrs::new("order"), move |_ctx, order: Order| {
        *seen.lock().unwrap() = Some(order);
        async { Ok(()) }
    })
    .unwrap()
}

#[tokio::test]
async fn typed_commands_parse_their_arguments() {
    let seen = Arc::new(Mutex::new(None));
    let data = InteractionData::new("order")
        .option(DataOption::new("flavor", "choc"))
        .option(DataOption::new("to", "Ada"));
    let ctx = common::context(&Bot::new(&Log::default()), State::new(), data, None);

    ordering(&seen).invoke(ctx).await.unwrap();

    assert_eq!(
        seen.lock().unwrap().take(),
        Some(Order {
            flavor: Flavor::Chocolate,
            scoops: 1,
            recipient: Some("Ada".to_string()),
        })
    );
}

#[tokio::test]
async fn typed_commands_reject_unknown_choices() {
    let seen = Arc::new(Mutex::new(None));
    let data = InteractionData::new("order").option(DataOption::new("flavor", "mint"));
    let ctx = common::context(&Bot::new(&Log::default()), State::new(), data, None);

    let error = ordering(&seen).invoke(ctx).await.unwrap_err();

    let cause = error.original().unwrap().downcast_ref::<ArgumentError>();
    match cause {
        Some(ArgumentError::Option { name, source }) => {
            assert_eq!(name, "flavor");
            assert!(matches!(**source, ArgumentError::InvalidChoice { ref value } if value == "mint"));
        }
        _ => panic!("unexpected error: {error}"),
    }
    assert!(seen.lock().unwrap().is_none());
}

#[tokio::test]
async fn generic_parameters_resolve_platform_entities() {
    let seen = Arc::new(Mutex::new(None));
    let recorded = Arc::clone(&seen);
    let mut group = SubCommandGroup::<Mock>::new("mod", "Moderation").unwrap();
    group
        .typed_command(CommandAttrs::new("kick"), move |_ctx, kick: Kick<Mock>| {
            *recorded.lock().unwrap() = Some((kick.member.0.id, kick.reason));
            async { Ok(()) }
        })
        .unwrap();

    let data = InteractionData::new("mod").option(DataOption::subcommand(
        "kick",
        vec![DataOption::new("member", "10")],
    ));
    let ctx = common::context(
        &Bot::new(&Log::default()),
        State::new().guild(Guild::new(GUILD_ID).member(10, "ada")),
        data,
        Some(GUILD_ID),
    );

    group.invoke(ctx).await.unwrap();

    assert_eq!(seen.lock().unwrap().take(), Some((10, None)));
}
