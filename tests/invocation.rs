mod common;

use std::sync::Arc;

use anyhow::anyhow;
use app_commands::commands::{ApplicationCommand, CommandAttrs};
use app_commands::context::{DataOption, InteractionData};
use app_commands::errors::{Cancelled, CommandError};
use app_commands::executor::CommandExecutor;
use app_commands::signature::{Parameter, Signature};
use app_commands::{Arguments, SlashCommand};
use common::{Bot, Log, Mock, State, TestCog};

fn logging_command(log: &Log, attrs: CommandAttrs<Mock>, signature: Signature) -> SlashCommand<Mock> {
    let callback_log = log.clone();
    let mut command = SlashCommand::new(attrs, signature, move |_ctx, _arguments: Arguments<Mock>| {
        let log = callback_log.clone();
        async move {
            log.push("callback");
            Ok(())
        }
    })
    .unwrap();
    install_hooks(&mut command, log.clone());
    command
}

fn install_hooks(command: &mut SlashCommand<Mock>, log: Log) {
    let before = log.clone();
    command.before_invoke(move |_ctx| {
        let log = before.clone();
        async move {
            log.push("local_before");
            Ok(())
        }
    });
    let after = log;
    command.after_invoke(move |_ctx| {
        let log = after.clone();
        async move {
            log.push("local_after");
            Ok(())
        }
    });
}

fn data() -> InteractionData {
    InteractionData::new("ping")
}

#[tokio::test]
async fn hooks_run_in_order_around_the_callback() {
    let log = Log::default();
    let cog = TestCog::new(&log);
    let command = logging_command(
        &log,
        CommandAttrs::new("ping").cog(&cog),
        Signature::new().receiver().context(),
    );
    let ctx = common::context(&Bot::new(&log), State::new(), data(), None);

    command.invoke(Arc::clone(&ctx)).await.unwrap();

    assert_eq!(
        log.entries(),
        vec![
            "bot_check",
            "local_before",
            "cog_before",
            "bot_before",
            "callback",
            "local_after",
            "cog_after",
            "bot_after",
        ]
    );
    assert_eq!(ctx.command().as_deref(), Some("ping"));
    assert!(!ctx.command_failed());
}

#[tokio::test]
async fn cancellation_is_silent_and_still_cleans_up() {
    let log = Log::default();
    let mut command = SlashCommand::new(
        CommandAttrs::new("ping"),
        Signature::new().context(),
        |_ctx, _arguments| async { Err(Cancelled.into()) },
    )
    .unwrap();
    install_hooks(&mut command, log.clone());
    let ctx = common::context(&Bot::new(&log), State::new(), data(), None);

    let result = command.invoke(Arc::clone(&ctx)).await;

    assert!(result.is_ok());
    assert_eq!(log.count("local_after"), 1);
    assert_eq!(log.count("bot_after"), 1);
    assert!(!ctx.command_failed());
}

#[tokio::test]
async fn cancelled_before_hook_skips_the_callback() {
    let log = Log::default();
    let mut command = logging_command(&log, CommandAttrs::new("ping"), Signature::new().context());
    command.before_invoke(|_ctx| async { Err(Cancelled.into()) });
    let ctx = common::context(&Bot::new(&log), State::new(), data(), None);

    command.invoke(ctx).await.unwrap();

    assert_eq!(log.count("callback"), 0);
    assert_eq!(log.count("local_after"), 0);
}

#[tokio::test]
async fn callback_faults_are_wrapped_with_their_cause() {
    let log = Log::default();
    let mut command = SlashCommand::new(
        CommandAttrs::new("ping"),
        Signature::new().context(),
        |_ctx, _arguments| async { Err(anyhow!("boom")) },
    )
    .unwrap();
    install_hooks(&mut command, log.clone());
    let ctx = common::context(&Bot::new(&log), State::new(), data(), None);

    let error = command.invoke(ctx).await.unwrap_err();

    assert!(matches!(error, CommandError::Invoke(_)));
    assert_eq!(error.original().unwrap().to_string(), "boom");
    assert_eq!(log.count("local_after"), 1);
}

#[tokio::test]
async fn command_errors_pass_through_unchanged() {
    let command = SlashCommand::<Mock>::new(
        CommandAttrs::new("ping"),
        Signature::new().context(),
        |_ctx, _arguments| async { Err(CommandError::check_failure("not today").into()) },
    )
    .unwrap();
    let ctx = common::context(&Bot::new(&Log::default()), State::new(), data(), None);

    let error = command.invoke(ctx).await.unwrap_err();

    assert!(matches!(error, CommandError::CheckFailure { ref message, .. } if message == "not today"));
}

#[tokio::test]
async fn failing_check_stops_the_invocation() {
    let log = Log::default();
    let checks = log.clone();
    let second = log.clone();
    let command = logging_command(
        &log,
        CommandAttrs::new("ping")
            .check(move |_ctx| {
                let log = checks.clone();
                async move {
                    log.push("check_one");
                    Ok(false)
                }
            })
            .check(move |_ctx| {
                let log = second.clone();
                async move {
                    log.push("check_two");
                    Ok(true)
                }
            }),
        Signature::new().context(),
    );
    let ctx = common::context(&Bot::new(&log), State::new(), data(), None);

    let error = command.invoke(Arc::clone(&ctx)).await.unwrap_err();

    assert_eq!(
        error.to_string(),
        "The check functions for the command ping failed"
    );
    assert_eq!(log.entries(), vec!["bot_check", "check_one"]);
    assert!(ctx.command_failed());
}

#[tokio::test]
async fn erroring_check_is_a_check_failure() {
    let command = SlashCommand::<Mock>::new(
        CommandAttrs::new("ping").check(|_ctx| async { Err(anyhow!("lookup failed")) }),
        Signature::new().context(),
        |_ctx, _arguments| async { Ok(()) },
    )
    .unwrap();
    let ctx = common::context(&Bot::new(&Log::default()), State::new(), data(), None);

    let error = command.invoke(ctx).await.unwrap_err();

    assert!(matches!(error, CommandError::CheckFailure { source: Some(_), .. }));
}

#[tokio::test]
async fn global_check_runs_first() {
    let log = Log::default();
    let command = logging_command(&log, CommandAttrs::new("ping"), Signature::new().context());
    let ctx = common::context(&Bot::rejecting(&log), State::new(), data(), None);

    let error = command.invoke(ctx).await.unwrap_err();

    assert_eq!(
        error.to_string(),
        "The global check functions for command ping failed."
    );
    assert_eq!(log.entries(), vec!["bot_check"]);
}

#[tokio::test]
async fn dispatch_error_runs_every_handler_in_order() {
    let log = Log::default();
    let cog = TestCog::new(&log);
    let handler_log = log.clone();
    let mut command = SlashCommand::new(
        CommandAttrs::new("ping").cog(&cog),
        Signature::new().receiver().context(),
        |_ctx, _arguments: Arguments<Mock>| async { Err(anyhow!("boom")) },
    )
    .unwrap();
    command.error(move |_ctx, error| {
        let log = handler_log.clone();
        async move {
            log.push(format!("local_error: {}", error.original().unwrap()));
            Ok(())
        }
    });
    assert!(command.has_error_handler());
    let ctx = common::context(&Bot::new(&log), State::new(), data(), None);

    let error = command.invoke(Arc::clone(&ctx)).await.unwrap_err();
    command.dispatch_error(&ctx, error).await.unwrap();

    let entries = log.entries();
    let tail = &entries[entries.len() - 3..];
    assert_eq!(
        tail,
        [
            "local_error: boom",
            "cog_error",
            "application_command_error: Application command raised an exception: boom",
        ]
    );
    assert!(ctx.command_failed());
}

#[tokio::test]
async fn error_event_is_raised_even_when_handlers_fail() {
    let log = Log::default();
    let cog = Arc::new(TestCog {
        log: log.clone(),
        fail_error_handler: true,
    });
    let mut command = SlashCommand::new(
        CommandAttrs::new("ping").cog(&cog),
        Signature::new().receiver().context(),
        |_ctx, _arguments: Arguments<Mock>| async { Ok(()) },
    )
    .unwrap();
    command.error(|_ctx, _error| async { Err(anyhow!("local handler broke")) });
    let ctx = common::context(&Bot::new(&log), State::new(), data(), None);

    let failure = command
        .dispatch_error(&ctx, CommandError::check_failure("nope"))
        .await
        .unwrap_err();

    assert_eq!(failure.original().unwrap().to_string(), "local handler broke");
    assert_eq!(log.count("cog_error"), 1);
    assert_eq!(log.count("application_command_error: nope"), 1);
}

#[tokio::test]
async fn executor_routes_failures_through_dispatch_error() {
    let log = Log::default();
    let mut executor = CommandExecutor::<Mock>::new();
    executor.register(
        SlashCommand::new(
            CommandAttrs::new("echo"),
            Signature::new().context().param(Parameter::of::<String>("text")),
            |_ctx, mut arguments: Arguments<Mock>| async move {
                let text: String = arguments.take("text")?;
                if text.is_empty() {
                    return Err(anyhow!("nothing to echo"));
                }
                Ok(())
            },
        )
        .unwrap(),
    );

    let ok = InteractionData::new("echo").option(DataOption::new("text", "hi"));
    let ctx = common::context(&Bot::new(&log), State::new(), ok, None);
    assert!(matches!(executor.execute(ctx).await, Some(Ok(()))));

    let empty = InteractionData::new("echo").option(DataOption::new("text", ""));
    let ctx = common::context(&Bot::new(&log), State::new(), empty, None);
    assert!(matches!(executor.execute(Arc::clone(&ctx)).await, Some(Ok(()))));
    assert!(ctx.command_failed());
    assert_eq!(
        log.count("application_command_error: Application command raised an exception: nothing to echo"),
        1
    );

    let unknown = common::context(&Bot::new(&log), State::new(), InteractionData::new("nope"), None);
    assert!(executor.execute(unknown).await.is_none());
}
