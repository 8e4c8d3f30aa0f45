use crate::protocol::Message;

/// Message pipe to one peer.
///
/// `recv` must be cancel-safe: dropping a pending `recv` future never loses
/// part of a message, so it can sit in a `tokio::select!` loop.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&mut self, msg: Message) -> anyhow::Result<()>;
    async fn recv(&mut self) -> anyhow::Result<Message>;
}

pub mod in_memory;
pub mod tcp;
