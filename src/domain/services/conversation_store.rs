#[cfg(test)]
#[path = "conversation_store_test.rs"]
mod tests;

use std::path;

use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::ChatError;
use crate::domain::models::ConversationLog;

/// Fixed key the conversation log is stored under.
pub const STORAGE_KEY: &str = "chat_messages";

/// Key-value persistence of the conversation log: one JSON file per key
/// inside `data_dir`.
pub struct ConversationStore {
    pub data_dir: path::PathBuf,
    key: String,
}

impl Default for ConversationStore {
    fn default() -> ConversationStore {
        let data_dir = path::PathBuf::from(Config::get(ConfigKey::DataDir));

        return ConversationStore::new(data_dir);
    }
}

impl ConversationStore {
    pub fn new(data_dir: path::PathBuf) -> ConversationStore {
        return ConversationStore::with_key(data_dir, STORAGE_KEY);
    }

    pub fn with_key(data_dir: path::PathBuf, key: &str) -> ConversationStore {
        return ConversationStore {
            data_dir,
            key: key.to_string(),
        };
    }

    pub fn file_path(&self) -> path::PathBuf {
        return self.data_dir.join(format!("{}.json", self.key));
    }

    fn temp_file_path(&self) -> path::PathBuf {
        return self.data_dir.join(format!("{}.json.tmp", self.key));
    }

    /// Never fails. Missing or malformed data yields an empty log.
    pub async fn load(&self) -> ConversationLog {
        let file_path = self.file_path();
        if !file_path.exists() {
            return ConversationLog::default();
        }

        let payload = match fs::read_to_string(&file_path).await {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(error = ?err, path = %file_path.display(), "Failed to read conversation log");
                return ConversationLog::default();
            }
        };

        match serde_json::from_str::<ConversationLog>(&payload) {
            Ok(log) => {
                tracing::debug!(messages = log.len(), "Loaded conversation log");
                return log;
            }
            Err(err) => {
                tracing::warn!(error = ?err, path = %file_path.display(), "Discarding malformed conversation log");
                return ConversationLog::default();
            }
        }
    }

    /// Replaces the stored log. The new content is written next to the old
    /// one and renamed over it, so a concurrent `load` sees either version in
    /// full.
    pub async fn save(&self, log: &ConversationLog) -> Result<(), ChatError> {
        let payload = serde_json::to_string(&log.without_system())
            .map_err(|err| return ChatError::Persistence(err.to_string()))?;

        if !self.data_dir.exists() {
            fs::create_dir_all(&self.data_dir)
                .await
                .map_err(|err| return persistence_err("create data dir", err))?;
        }

        let temp_path = self.temp_file_path();
        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|err| return persistence_err("create temp file", err))?;
        file.write_all(payload.as_bytes())
            .await
            .map_err(|err| return persistence_err("write temp file", err))?;
        file.sync_all()
            .await
            .map_err(|err| return persistence_err("sync temp file", err))?;
        drop(file);

        fs::rename(&temp_path, self.file_path())
            .await
            .map_err(|err| return persistence_err("replace conversation log", err))?;

        tracing::debug!(messages = log.len(), "Saved conversation log");
        return Ok(());
    }

    /// Removes everything stored under the key. Clearing an already empty
    /// store is a no-op.
    pub async fn clear(&self) -> Result<(), ChatError> {
        for file_path in [self.file_path(), self.temp_file_path()] {
            if !file_path.exists() {
                continue;
            }

            fs::remove_file(&file_path)
                .await
                .map_err(|err| return persistence_err("remove conversation log", err))?;
        }

        return Ok(());
    }
}

fn persistence_err(action: &str, err: std::io::Error) -> ChatError {
    return ChatError::Persistence(format!("failed to {action}: {err}"));
}
