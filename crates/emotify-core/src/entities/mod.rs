//! Domain entities - remote objects as this crate consumes them

mod guild;
mod message;

pub use guild::{Guild, GuildEmoji};
pub use message::Message;
