//! # emotify-cli
//!
//! Command-line control surface: parses the run parameters, connects a
//! session, starts one run and prints its events until it ends. Ctrl-C
//! stops the run at its next checkpoint.

use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use emotify_common::AppConfig;
use emotify_core::{DiscordApi, Direction, NoticeKind, RunEnd, RunEvent, Snowflake};
use emotify_rest::{RestClient, RestClientConfig};
use emotify_service::{EngineSettings, ReactionEngine, RunRequest};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "emotify", version)]
#[command(about = "Apply or clear reactions across a channel's message history")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// React to every message in a channel or DM thread
    React(ReactArgs),
    /// Verify the token and list the guilds it belongs to
    Guilds,
}

#[derive(Args, Debug)]
pub struct ReactArgs {
    /// Channel or DM thread id
    #[arg(long)]
    pub channel: Snowflake,

    /// Guild whose custom emoji are preferred for :shortcodes:
    #[arg(long)]
    pub guild: Option<Snowflake>,

    /// Emoji tokens: unicode, :shortcode: or name:id (comma or space separated)
    #[arg(long, short = 'e', required = true, num_args = 1..)]
    pub emoji: Vec<String>,

    /// Traversal order: newest-first or oldest-first
    #[arg(long, default_value_t = Direction::NewestFirst)]
    pub direction: Direction,

    /// Remove the reactions instead of adding them
    #[arg(long)]
    pub clear: bool,

    /// Reaction calls per second
    #[arg(long, default_value_t = 3)]
    pub rate: u32,

    /// Stop after this many messages (0 = whole history)
    #[arg(long, default_value_t = 0)]
    pub max_messages: u64,

    /// Print events as JSON lines
    #[arg(long)]
    pub json: bool,
}

impl ReactArgs {
    pub fn to_request(&self) -> RunRequest {
        RunRequest {
            channel_id: Some(self.channel),
            guild_id: self.guild,
            emoji: self.emoji.join(" "),
            direction: self.direction,
            clear: self.clear,
            rate_per_second: self.rate,
            max_messages: self.max_messages,
        }
    }
}

/// Connect a session and execute the command
pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    let client = RestClient::new(RestClientConfig::from(&config.discord))?;
    let api: Arc<dyn DiscordApi> = Arc::new(client);
    let mut engine = ReactionEngine::connect(api, EngineSettings::from(&config.worker)).await?;

    match cli.command {
        Command::Guilds => {
            for guild in engine.guilds() {
                println!("{}\t{}", guild.id, guild.name);
            }
            Ok(())
        }
        Command::React(args) => react(&mut engine, &args).await,
    }
}

async fn react(engine: &mut ReactionEngine, args: &ReactArgs) -> anyhow::Result<()> {
    let mut handle = engine.start(args.to_request()).await?;

    let cancel = handle.cancel_flag();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, stopping run");
            cancel.cancel();
        }
    });

    while let Some(event) = handle.events.recv().await {
        println!("{}", render(&event, args.json)?);
    }
    interrupt.abort();

    let outcome = handle.join().await?;
    if let RunEnd::Fatal { reason } = outcome.end {
        anyhow::bail!("run aborted: {}", reason.notice_kind());
    }
    Ok(())
}

/// Format one event for the terminal
pub fn render(event: &RunEvent, json: bool) -> anyhow::Result<String> {
    if json {
        return Ok(serde_json::to_string(event)?);
    }
    let line = match event {
        RunEvent::Status(text) => text.clone(),
        RunEvent::Running(true) => "Running".to_string(),
        RunEvent::Running(false) => "Stopped".to_string(),
        RunEvent::Progress(progress) => format!("{progress}…"),
        RunEvent::Notice(notice) => {
            let label = match notice.kind {
                kind if kind.is_fatal() => "Error",
                NoticeKind::ReactionFailed | NoticeKind::HistoryUnavailable => "Warning",
                _ => "Note",
            };
            format!("{label}: {notice}")
        }
    };
    Ok(line)
}
