mod completion;
mod conversation;
mod error;
mod identity;
mod image;
mod message;
mod provider;
mod role;
mod slash_commands;
mod stock;
mod transport;

pub use completion::*;
pub use conversation::*;
pub use error::*;
pub use identity::*;
pub use image::*;
pub use message::*;
pub use provider::*;
pub use role::*;
pub use slash_commands::*;
pub use stock::*;
pub use transport::*;
