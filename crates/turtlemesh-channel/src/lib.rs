//! Stop-and-wait reliability wrapper over an unreliable UDP datagram
//! socket. Single-threaded per endpoint: at most one outstanding
//! `send_reliable` call at a time, no concurrent in-flight requests.

mod channel;
mod error;
mod retry;

pub use channel::ReliableChannel;
pub use error::ChannelError;
pub use retry::RetryPolicy;
