#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

mod application;
mod configuration;
mod domain;
mod infrastructure;

use std::env;
use std::process;

use anyhow::anyhow;
use anyhow::Error;
use anyhow::Result;
use tracing_subscriber::EnvFilter;
use yansi::Paint;

use crate::application::cli;
use crate::application::cli::Launch;
use crate::application::repl;
use crate::application::server;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::TransportName;
use crate::domain::services::ChatSession;
use crate::domain::services::CompletionClient;
use crate::domain::services::ConversationStore;
use crate::infrastructure::transports::TransportManager;

fn handle_error(err: Error) {
    eprintln!(
        "{}",
        Paint::red(format!(
            "Oh no! PocketChat has failed with the following app version and error.\n\nVersion: {}\nError: {}",
            env!("CARGO_PKG_VERSION"),
            err
        ))
    );

    let backtrace = err.backtrace();
    if backtrace.to_string() == "disabled backtrace" {
        let args = env::args().collect::<Vec<String>>().join(" ");
        eprintln!("\nRunning the following can help explain further what the issue is:");
        eprintln!("\nRUST_BACKTRACE=1 {args}");
    } else {
        eprintln!("\n{}", backtrace);
    }

    process::exit(1);
}

async fn start_chat() -> Result<()> {
    let transport_name = Config::get(ConfigKey::Transport);
    let transport = match TransportName::parse(transport_name.to_string()) {
        Some(transport) => transport,
        None => return Err(anyhow!("Unknown transport: {transport_name}")),
    };

    let client = CompletionClient::new(TransportManager::get(transport)?);
    let session = ChatSession::hydrate(ConversationStore::default(), client).await;

    return repl::start(session).await;
}

async fn start_server() -> Result<()> {
    let port = Config::get(ConfigKey::Port)
        .parse::<u16>()
        .map_err(|err| return anyhow!("Invalid port: {err}"))?;

    return server::serve(port).await;
}

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));

    let launch = match cli::parse().await {
        Ok(launch) => launch,
        Err(err) => {
            handle_error(err);
            return;
        }
    };

    let file_appender = tracing_appender::rolling::never(cli::debug_log_dir(), "debug.log");
    let (writer, _guard) = tracing_appender::non_blocking(file_appender);
    if launch == Launch::Serve {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| return EnvFilter::new("pocketchat=info,tower_http=info"));
        tracing_subscriber::fmt().with_env_filter(filter).init();
    } else if env::var("RUST_LOG")
        .unwrap_or_else(|_| return "".to_string())
        .contains("pocketchat")
    {
        tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(writer)
            .init();
    }

    let res = match launch {
        Launch::Chat => start_chat().await,
        Launch::Serve => start_server().await,
        Launch::Exit => Ok(()),
    };

    if let Err(err) = res {
        handle_error(err);
    }

    process::exit(0);
}
