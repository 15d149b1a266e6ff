//! Redis Streams dispatch channel.

pub mod channel;

pub use channel::RedisStreamChannel;
