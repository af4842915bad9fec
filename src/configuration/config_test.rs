use std::time::Duration;

use anyhow::Result;

use super::Config;
use super::ConfigKey;
use crate::application::cli;

#[test]
fn it_serializes_to_valid_toml() {
    let res = Config::serialize_default(cli::build());
    let toml_res = res.parse::<toml_edit::Document>();
    assert!(toml_res.is_ok());

    assert!(res.contains("transport = \"proxy\""));
    assert!(res.contains("[possible values: proxy, function]"));
    assert!(res.contains("request-timeout = 60000"));
    assert!(res.contains("# functions-url = \"\""));
    assert!(!res.contains("config-file"));
}

#[test]
fn it_documents_every_key_but_the_config_file() {
    let res = Config::serialize_default(cli::build());
    for key in [
        ConfigKey::DataDir,
        ConfigKey::FunctionName,
        ConfigKey::FunctionsKey,
        ConfigKey::FunctionsURL,
        ConfigKey::Model,
        ConfigKey::OpenAiToken,
        ConfigKey::OpenAiURL,
        ConfigKey::Port,
        ConfigKey::ProxyURL,
        ConfigKey::RequestTimeout,
        ConfigKey::Transport,
    ] {
        assert!(
            res.contains(&format!("{key} =")),
            "missing {key} in default config"
        );
    }
}

#[test]
fn it_uses_kebab_case_keys() {
    assert_eq!(ConfigKey::OpenAiURL.to_string(), "openai-url");
    assert_eq!(ConfigKey::FunctionsURL.to_string(), "functions-url");
    assert_eq!(ConfigKey::RequestTimeout.to_string(), "request-timeout");
    assert_eq!(ConfigKey::ConfigFile.to_string(), "config-file");
}

// Config is process wide, so every load assertion lives in a single test.
#[tokio::test]
async fn it_loads_config_from_file() -> Result<()> {
    let matches = cli::build().try_get_matches_from(vec![
        "pocketchat",
        "chat",
        "--config-file",
        "./config.example.toml",
        "--proxy-url",
        "http://10.0.2.2:8000",
    ])?;
    let (_, chat_matches) = matches.subcommand().unwrap();
    Config::load(cli::build(), vec![&matches, chat_matches]).await?;

    assert_eq!(Config::get(ConfigKey::Transport), "function");
    assert_eq!(
        Config::get(ConfigKey::FunctionsURL),
        "https://example.supabase.co"
    );
    assert_eq!(Config::get(ConfigKey::RequestTimeout), "30000");
    assert_eq!(Config::request_timeout(), Duration::from_millis(30000));
    // Flags win over the file.
    assert_eq!(Config::get(ConfigKey::ProxyURL), "http://10.0.2.2:8000");
    // Untouched keys keep their defaults.
    assert_eq!(Config::get(ConfigKey::Model), "gpt-4o");

    let matches = cli::build().try_get_matches_from(vec![
        "pocketchat",
        "--config-file",
        "./test/bad-config.toml",
    ])?;
    let res = Config::load(cli::build(), vec![&matches]).await;
    assert!(res.is_err());

    return Ok(());
}
