mod chat_session;
mod completion_client;
mod conversation_store;
mod identity;
mod prompt;
mod stocks;

pub use chat_session::*;
pub use completion_client::*;
pub use conversation_store::*;
pub use identity::*;
pub use prompt::*;
pub use stocks::*;
