#[cfg(test)]
#[path = "functions_test.rs"]
mod tests;

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::payload::error_message;
use super::payload::Payload;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::ChatError;

/// Invokes managed functions hosted on the backend-as-a-service, at
/// `{url}/functions/v1/{name}`.
pub struct Functions {
    url: String,
    key: String,
    timeout: Duration,
}

impl Default for Functions {
    fn default() -> Functions {
        return Functions {
            url: Config::get(ConfigKey::FunctionsURL),
            key: Config::get(ConfigKey::FunctionsKey),
            timeout: Config::request_timeout(),
        };
    }
}

impl Functions {
    pub fn new(url: &str, key: &str, timeout: Duration) -> Functions {
        return Functions {
            url: url.trim_end_matches('/').to_string(),
            key: key.to_string(),
            timeout,
        };
    }

    pub fn is_configured(&self) -> bool {
        return !self.url.is_empty();
    }

    pub async fn invoke<B, R>(&self, name: &str, body: &B) -> Result<R, ChatError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        if !self.is_configured() {
            return Err(ChatError::Network(
                "functions URL is not configured".to_string(),
            ));
        }

        let url = format!("{}/functions/v1/{name}", self.url.trim_end_matches('/'));
        let mut req = reqwest::Client::new()
            .post(&url)
            .timeout(self.timeout)
            .json(body);

        if !self.key.is_empty() {
            req = req
                .header("Authorization", format!("Bearer {}", self.key))
                .header("apikey", &self.key);
        }

        let res = req.send().await.map_err(|err| {
            tracing::error!(error = ?err, function = name, "Failed to invoke function");
            return ChatError::Network(err.to_string());
        })?;

        let status = res.status().as_u16();
        let text = res.text().await.map_err(|err| {
            return ChatError::Network(err.to_string());
        })?;

        if !(200..300).contains(&status) {
            tracing::error!(status = status, function = name, "Function returned an error");
            return Err(ChatError::Server {
                status,
                message: error_message(status, &text),
            });
        }

        return Payload::<R>::parse(&text);
    }
}
