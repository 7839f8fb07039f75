use std::sync::Arc;

use tokio::sync::mpsc::{Receiver, Sender, channel};

use crate::{Emission, Result};

/// Boundary to the real-time transport.
///
/// Implement this over your socket server's send-to-room-or-broadcast primitive.
/// `emit` is synchronous: the event helpers never await, so an implementation
/// that needs to do async I/O should hand the emission off (see
/// [`ChannelTransport`]) rather than block.
pub trait Transport: Send + Sync {
    fn emit(&self, emission: Emission) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn emit(&self, emission: Emission) -> Result<()> {
        (**self).emit(emission)
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn emit(&self, emission: Emission) -> Result<()> {
        (**self).emit(emission)
    }
}

/// Forwards emissions into a bounded tokio channel.
///
/// The receiving half is typically drained by the task that owns the socket
/// connections. Emitting never waits: a full channel is reported as
/// [`Error::ChannelIsFull`](crate::Error::ChannelIsFull), a dropped receiver as
/// [`Error::SendError`](crate::Error::SendError).
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    sender: Sender<Arc<Emission>>,
}

impl ChannelTransport {
    /// Creates a transport and the receiver its emissions arrive at.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> (Self, Receiver<Arc<Emission>>) {
        let (sender, receiver) = channel(capacity);
        (Self { sender }, receiver)
    }

    pub fn from_sender(sender: Sender<Arc<Emission>>) -> Self {
        Self { sender }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl Transport for ChannelTransport {
    fn emit(&self, emission: Emission) -> Result<()> {
        self.sender.try_send(Arc::new(emission))?;
        Ok(())
    }
}
