#[cfg(test)]
#[path = "transport_test.rs"]
mod tests;

use anyhow::Result;
use async_trait::async_trait;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;

use super::ChatError;
use super::CompletionRequest;
use super::CompletionResult;

/// Deployment shapes a completion can be reached through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum TransportName {
    /// Direct HTTP call to the `pocketchat serve` proxy.
    Proxy,
    /// Managed function invocation on the backend-as-a-service.
    Function,
}

impl TransportName {
    pub fn parse(text: String) -> Option<TransportName> {
        return TransportName::iter().find(|e| return e.to_string() == text);
    }
}

#[async_trait]
pub trait Transport {
    fn name(&self) -> TransportName;

    /// Used at startup to verify the transport is configured and reachable.
    async fn health_check(&self) -> Result<()>;

    /// Sends one completion request and normalizes whatever the remote end
    /// answers with. Implementations never retry.
    async fn send(&self, request: CompletionRequest) -> Result<CompletionResult, ChatError>;
}

pub type TransportBox = Box<dyn Transport + Send + Sync>;
