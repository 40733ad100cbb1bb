//! Interactive terminal front end for the robot task manager.
//!
//! Reads one command per line from stdin, sends the matching action to the
//! store and prints the resulting notification and task listing. Logs go to
//! stderr; set `RUST_LOG` or `ROBOTASK_LOG_LEVEL` to see them.

use anyhow::Context;
use robotask::cli::{self, Command, HELP};
use robotask::{
    AppAction, AppEnvironment, AppReducer, AppState, Config, HtmlListing, NotificationAction,
    NotificationKind, TextListing,
};
use robotask_core::environment::{Clock, SystemClock};
use robotask_runtime::{Store, error::StoreError};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type AppStore = Store<AppState, AppAction, AppEnvironment, AppReducer>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    tracing::info!(?config, "Starting robot task manager");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let env = AppEnvironment::new(Arc::clone(&clock), config.notification_timeout());
    let store = Store::new(AppState::new(), AppReducer::new(), env);

    println!("🤖 ROBOT CONTROL SYSTEM");
    println!("Type 'help' for commands.\n");

    store
        .send(AppAction::Notification(NotificationAction::Notify {
            message: "Robot Control System v2.0 Online!".to_string(),
            kind: NotificationKind::Success,
        }))
        .await?;
    print_screen(&store).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = prompt(&mut lines, "robotask> ").await? {
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(cli::CommandError::Blank) => continue,
            Err(error) => {
                println!("🚫 {error}");
                continue;
            },
        };

        match command {
            Command::Quit => break,
            Command::Help => println!("{HELP}"),
            Command::List => print_screen(&store).await,
            Command::Html => {
                let html = store.state(|s| HtmlListing::of(&s.tasks).to_string()).await;
                print!("{html}");
            },
            Command::Time => {
                let now = clock.now().with_timezone(&chrono::Local);
                println!("🕒 SYSTEM TIME {}", now.format("%Y-%m-%d %H:%M:%S"));
            },
            command => {
                let question = store.state(|s| cli::confirmation_prompt(&command, s)).await;
                if let Some(question) = question {
                    if !config.assume_yes && !confirm(&mut lines, &question).await? {
                        println!("Cancelled.");
                        continue;
                    }
                }

                if let Some(action) = command.into_action() {
                    store.send(action).await?;
                }
                print_screen(&store).await;
            },
        }
    }

    println!("🤖 Shutting down. Goodbye, agent.");
    match store.shutdown(config.shutdown_timeout()).await {
        Ok(()) => {},
        Err(StoreError::ShutdownTimeout(pending)) => {
            tracing::debug!(pending, "Dropping pending notification timers");
        },
        Err(error) => return Err(error.into()),
    }

    Ok(())
}

/// Prints `text` and reads the next line, `None` at end of input
async fn prompt(lines: &mut Lines<BufReader<Stdin>>, text: &str) -> anyhow::Result<Option<String>> {
    print!("{text}");
    std::io::stdout().flush()?;
    Ok(lines.next_line().await?)
}

/// Asks a yes/no question; end of input counts as no
async fn confirm(lines: &mut Lines<BufReader<Stdin>>, question: &str) -> anyhow::Result<bool> {
    println!("⚠️  {question}");
    let reply = prompt(lines, "[y/N] ").await?;
    Ok(reply.as_deref().is_some_and(cli::is_yes))
}

/// Prints the current notification followed by the task listing
async fn print_screen(store: &AppStore) {
    let (notification, listing) = store
        .state(|s| {
            (
                s.notification.current().map(ToString::to_string),
                TextListing::of(&s.tasks).to_string(),
            )
        })
        .await;

    if let Some(notification) = notification {
        println!("{notification}\n");
    }
    print!("{listing}");
}
