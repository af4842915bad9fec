#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

use std::env;
use std::io;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use yansi::Paint;

use crate::application::repl::format_message;
use crate::application::repl::help_text;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::TransportName;
use crate::domain::services::ConversationStore;
use crate::domain::services::IdentityService;

/// What `main` should do once the command line has been handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Launch {
    Chat,
    Serve,
    Exit,
}

/// Decided from the parsed subcommand only, so flag values such as
/// `--model serve` never switch modes.
pub fn launch_for(matches: &ArgMatches) -> Launch {
    match matches.subcommand_name() {
        None | Some("chat") => return Launch::Chat,
        Some("serve") => return Launch::Serve,
        Some(_) => return Launch::Exit,
    }
}

pub fn debug_log_dir() -> path::PathBuf {
    if let Ok(dir) = env::var("POCKETCHAT_LOG_DIR") {
        return path::PathBuf::from(dir);
    }

    return dirs::cache_dir()
        .unwrap_or_else(env::temp_dir)
        .join("pocketchat");
}

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

async fn print_history() -> Result<()> {
    let log = ConversationStore::default().load().await;
    if log.is_empty() {
        println!("There is no conversation yet. Start one with `pocketchat chat`!");
        return Ok(());
    }

    let lines = log
        .messages()
        .iter()
        .map(|message| {
            return format_message(message);
        })
        .collect::<Vec<String>>();

    println!("{}", lines.join("\n\n"));
    return Ok(());
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = fs::File::create(&config_file_path).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

async fn run_user_command(user_matches: &ArgMatches) -> Result<()> {
    let identity = IdentityService::default();

    match user_matches.subcommand() {
        Some(("get", get_matches)) => {
            let email = get_matches
                .get_one::<String>("email")
                .map(|e| return e.to_string())
                .unwrap_or_default();
            let phone = get_matches
                .get_one::<String>("phone")
                .map(|e| return e.to_string())
                .unwrap_or_default();

            let user = identity.get_user(&email, &phone).await?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
        Some(("validate", validate_matches)) => {
            let user_id = match validate_matches.get_one::<String>("user-id") {
                Some(user_id) => user_id.to_string(),
                None => bail!("A user ID is required"),
            };

            let validated = identity.validate_user(&user_id).await?;
            println!("{}", serde_json::to_string_pretty(&validated)?);
        }
        _ => {
            subcommand_user().print_long_help()?;
        }
    }

    return Ok(());
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_debug() -> Command {
    return Command::new("debug")
        .about("Debug helpers for PocketChat")
        .hide(true)
        .subcommand(
            Command::new("log-path").about("Output path to debug log file generated when running PocketChat with environment variable RUST_LOG=pocketchat")
        )
        .subcommand(
            Command::new("enum-config").about("List all config keys as strings.")
        );
}

fn subcommand_user() -> Command {
    return Command::new("user")
        .about("Look up users through the identity functions.")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("get")
                .about("Fetch a user by email and phone, creating them if they don't exist.")
                .arg(
                    clap::Arg::new("email")
                        .long("email")
                        .help("Email address")
                        .num_args(1)
                        .required(true),
                )
                .arg(
                    clap::Arg::new("phone")
                        .long("phone")
                        .help("Phone number")
                        .num_args(1)
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("validate")
                .about("Check that a user ID is known to the backend.")
                .arg(
                    clap::Arg::new("user-id")
                        .short('i')
                        .long("id")
                        .help("User ID")
                        .num_args(1)
                        .required(true),
                ),
        );
}

fn arg_config_file() -> Arg {
    return Arg::new(ConfigKey::ConfigFile.to_string())
        .short('c')
        .long(ConfigKey::ConfigFile.to_string())
        .env("POCKETCHAT_CONFIG_FILE")
        .num_args(1)
        .help(format!(
            "Path to configuration file [default: {}]",
            Config::default(ConfigKey::ConfigFile)
        ))
        .global(true);
}

fn arg_data_dir() -> Arg {
    return Arg::new(ConfigKey::DataDir.to_string())
        .long(ConfigKey::DataDir.to_string())
        .env("POCKETCHAT_DATA_DIR")
        .num_args(1)
        .help(format!(
            "Directory the conversation log is stored in. [default: {}]",
            Config::default(ConfigKey::DataDir)
        ))
        .global(true);
}

fn arg_transport() -> Arg {
    return Arg::new(ConfigKey::Transport.to_string())
        .short('t')
        .long(ConfigKey::Transport.to_string())
        .env("POCKETCHAT_TRANSPORT")
        .num_args(1)
        .help(format!(
            "How completions are reached: the pocketchat proxy server or a managed function. [default: {}]",
            Config::default(ConfigKey::Transport)
        ))
        .value_parser(PossibleValuesParser::new(TransportName::VARIANTS))
        .global(true);
}

fn arg_proxy_url() -> Arg {
    return Arg::new(ConfigKey::ProxyURL.to_string())
        .short('p')
        .long(ConfigKey::ProxyURL.to_string())
        .env("POCKETCHAT_PROXY_URL")
        .num_args(1)
        .help(format!(
            "Base URL of the proxy server when using the proxy transport. [default: {}]",
            Config::default(ConfigKey::ProxyURL)
        ))
        .global(true);
}

fn arg_functions_url() -> Arg {
    return Arg::new(ConfigKey::FunctionsURL.to_string())
        .long(ConfigKey::FunctionsURL.to_string())
        .env("POCKETCHAT_FUNCTIONS_URL")
        .num_args(1)
        .help("Base URL of the backend hosting managed functions. Used by the function transport and the user commands.")
        .global(true);
}

fn arg_functions_key() -> Arg {
    return Arg::new(ConfigKey::FunctionsKey.to_string())
        .long(ConfigKey::FunctionsKey.to_string())
        .env("POCKETCHAT_FUNCTIONS_KEY")
        .num_args(1)
        .help("API key sent with every managed function invocation.")
        .global(true);
}

fn arg_function_name() -> Arg {
    return Arg::new(ConfigKey::FunctionName.to_string())
        .long(ConfigKey::FunctionName.to_string())
        .env("POCKETCHAT_FUNCTION_NAME")
        .num_args(1)
        .help(format!(
            "Managed function answering chat messages when using the function transport. [default: {}]",
            Config::default(ConfigKey::FunctionName)
        ))
        .global(true);
}

fn arg_request_timeout() -> Arg {
    return Arg::new(ConfigKey::RequestTimeout.to_string())
        .long(ConfigKey::RequestTimeout.to_string())
        .env("POCKETCHAT_REQUEST_TIMEOUT")
        .num_args(1)
        .help(format!(
            "Time to wait in milliseconds before giving up on a request. [default: {}]",
            Config::default(ConfigKey::RequestTimeout)
        ))
        .global(true);
}

fn arg_port() -> Arg {
    return Arg::new(ConfigKey::Port.to_string())
        .long(ConfigKey::Port.to_string())
        .env("POCKETCHAT_PORT")
        .num_args(1)
        .help(format!(
            "Port the proxy server listens on. [default: {}]",
            Config::default(ConfigKey::Port)
        ))
        .global(true);
}

fn arg_openai_url() -> Arg {
    return Arg::new(ConfigKey::OpenAiURL.to_string())
        .long(ConfigKey::OpenAiURL.to_string())
        .env("POCKETCHAT_OPENAI_URL")
        .num_args(1)
        .help(format!(
            "OpenAI API URL used by the proxy server. Can be swapped to a compatible proxy. [default: {}]",
            Config::default(ConfigKey::OpenAiURL)
        ))
        .global(true);
}

fn arg_openai_token() -> Arg {
    return Arg::new(ConfigKey::OpenAiToken.to_string())
        .long(ConfigKey::OpenAiToken.to_string())
        .env("POCKETCHAT_OPENAI_TOKEN")
        .num_args(1)
        .help("OpenAI API token used by the proxy server.")
        .global(true);
}

fn arg_model() -> Arg {
    return Arg::new(ConfigKey::Model.to_string())
        .short('m')
        .long(ConfigKey::Model.to_string())
        .env("POCKETCHAT_MODEL")
        .num_args(1)
        .help(format!(
            "Model requested by the proxy server. [default: {}]",
            Config::default(ConfigKey::Model)
        ))
        .global(true);
}

pub fn build() -> Command {
    let commands_text = help_text()
        .split('\n')
        .map(|line| {
            if line.starts_with('-') {
                return format!("  {line}");
            }
            if line.starts_with("COMMANDS:") {
                return Paint::new(format!("CHAT {line}"))
                    .underline()
                    .bold()
                    .to_string();
            }
            return line.to_string();
        })
        .collect::<Vec<String>>()
        .join("\n");

    let about = format!(
        "{}\n\nVersion: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
    );

    return Command::new("pocketchat")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(commands_text)
        .arg_required_else_help(false)
        .subcommand(Command::new("chat").about("Start chatting. This is the default when no subcommand is given."))
        .subcommand(Command::new("serve").about("Run the proxy server forwarding chat requests to the language model."))
        .subcommand(Command::new("history").about("Print the stored conversation."))
        .subcommand(Command::new("clear").about("Delete the stored conversation."))
        .subcommand(subcommand_user())
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_debug())
        .arg(arg_config_file())
        .arg(arg_data_dir())
        .arg(arg_transport())
        .arg(arg_proxy_url())
        .arg(arg_functions_url())
        .arg(arg_functions_key())
        .arg(arg_function_name())
        .arg(arg_request_timeout())
        .arg(arg_port())
        .arg(arg_openai_url())
        .arg(arg_openai_token())
        .arg(arg_model());
}

pub async fn parse() -> Result<Launch> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("debug", debug_matches)) => {
            match debug_matches.subcommand() {
                Some(("log-path", _)) => {
                    let log_path = debug_log_dir().join("debug.log");
                    println!("{}", log_path.to_string_lossy());
                }
                Some(("enum-config", _)) => {
                    let res = ConfigKey::VARIANTS.join("\n");
                    println!("{}", res);
                }
                _ => {
                    subcommand_debug().print_long_help()?;
                }
            }

            return Ok(Launch::Exit);
        }
        Some(("chat", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
        }
        Some(("serve", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
        }
        Some(("history", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            print_history().await?;
            return Ok(Launch::Exit);
        }
        Some(("clear", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            ConversationStore::default().clear().await?;
            println!("Cleared the stored conversation");
            return Ok(Launch::Exit);
        }
        Some(("user", subcmd_matches)) => {
            let mut arg_matches = vec![&matches, subcmd_matches];
            if let Some((_, user_matches)) = subcmd_matches.subcommand() {
                arg_matches.push(user_matches);
            }
            Config::load(build(), arg_matches).await?;
            run_user_command(subcmd_matches).await?;
            return Ok(Launch::Exit);
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
            return Ok(Launch::Exit);
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(Launch::Exit);
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
                return Ok(Launch::Exit);
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
                return Ok(Launch::Exit);
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(Launch::Exit);
            }
        },
        _ => {
            Config::load(build(), vec![&matches]).await?;
        }
    }

    return Ok(launch_for(&matches));
}
