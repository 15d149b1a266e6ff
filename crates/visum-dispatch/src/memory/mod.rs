//! In-memory dispatch channel.

pub mod channel;

pub use channel::MemoryDispatchChannel;
