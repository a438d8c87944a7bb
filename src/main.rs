use std::sync::Arc;

use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::prelude::*;

use gistrelay::command::{Command, CommandParser, ParsedCommand};
use gistrelay::config::Config;
use gistrelay::gist::GistClient;
use gistrelay::handlers;

struct BotState {
    config: Config,
    parser: CommandParser,
    gist: GistClient,
}

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "gistrelay.json".to_string());
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    // Setup logging: stdout plus an append-only file under data_dir/logs.
    let log_dir = config.data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).ok();
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("gistrelay.log"))
        .expect("Failed to open log file");
    let (non_blocking, _guard) = tracing_appender::non_blocking(log_file);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .init();

    info!("Starting gistrelay (config: {config_path})");

    let bot = Bot::new(config.telegram_bot_token.clone());

    // Bad credentials abort before any traffic is served.
    let me = match bot.get_me().await {
        Ok(me) => me,
        Err(e) => {
            eprintln!("failed to authenticate with Telegram: {e}");
            std::process::exit(1);
        }
    };
    info!("Authorized as @{}", me.username());

    let parser = CommandParser::new(me.username(), &config.command_prefixes);
    let mut gist = GistClient::new(
        config.gist_token.clone(),
        me.username(),
        config.public_gists,
    );
    if let Some(title) = config.gist_title.clone() {
        gist = gist.with_title(title);
    }
    if let Some(description) = config.gist_description.clone() {
        gist = gist.with_description(description);
    }

    let state = Arc::new(BotState { config, parser, gist });

    // Only fresh messages are dispatched; edited messages never reach a handler.
    let handler = dptree::entry().branch(Update::filter_message().endpoint(handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

async fn handle_message(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let Some(text) = msg.text().or_else(|| msg.caption()) else {
        return Ok(());
    };
    let Some(ParsedCommand { command, alias }) = state.parser.parse(text) else {
        return Ok(());
    };

    match command {
        Command::Start => handlers::handle_start(&bot, &msg).await,
        Command::Create { inline } => {
            handlers::handle_create(&bot, &msg, &alias, inline, &state.gist).await
        }
        Command::Delete { id } => {
            // Privileged command: everyone but the operator is silently ignored.
            let authorized = msg
                .from
                .as_ref()
                .is_some_and(|user| state.config.is_owner(user.id));
            if !authorized {
                info!("ignoring {alias} from unauthorized sender in chat {}", msg.chat.id);
                return Ok(());
            }
            handlers::handle_delete(&bot, &msg, &alias, id, &state.gist).await
        }
    }
}
