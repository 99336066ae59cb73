//! Channels and acknowledgements shared by every producer thread.

mod ack;
mod channel;
mod notification;

pub use ack::{ack_pair, AckError, AckHandle, AckWaiter};
pub use channel::{ChannelError, EventChannel, EventSender};
pub use notification::Notification;
