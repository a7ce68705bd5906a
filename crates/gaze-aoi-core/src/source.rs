//! Gaze message sources
//!
//! The network side runs on its own task and only ever keeps the most recent
//! datagram. The pipeline takes that message at most once per tick; older
//! messages that arrived in between are dropped.

use std::net::{Ipv4Addr, SocketAddr};

use tokio::net::UdpSocket;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::error::{GazeError, Result};

/// Anything that can hand the pipeline its next raw message.
pub trait GazeSource {
    /// Most recent unconsumed message, if one arrived since the last call.
    fn latest_message(&mut self) -> Option<Vec<u8>>;

    /// Stop receiving. Further calls to `latest_message` return `None`
    /// once the last unconsumed message has been taken.
    fn shutdown(&mut self);
}

/// Create a single-slot mailbox.
pub fn mailbox() -> (MailboxSender, GazeMailbox) {
    let (tx, rx) = watch::channel(None);
    (MailboxSender { tx }, GazeMailbox { rx })
}

/// Writing half of the mailbox; each publish replaces the previous message.
#[derive(Debug)]
pub struct MailboxSender {
    tx: watch::Sender<Option<Vec<u8>>>,
}

impl MailboxSender {
    pub fn publish(&self, message: Vec<u8>) {
        self.tx.send_replace(Some(message));
    }
}

/// Reading half of the mailbox.
#[derive(Debug)]
pub struct GazeMailbox {
    rx: watch::Receiver<Option<Vec<u8>>>,
}

impl GazeMailbox {
    /// Take the latest message without blocking. Each message is returned once.
    pub fn take(&mut self) -> Option<Vec<u8>> {
        let latest = self.rx.borrow_and_update();
        if latest.has_changed() {
            latest.clone()
        } else {
            None
        }
    }
}

impl GazeSource for GazeMailbox {
    fn latest_message(&mut self) -> Option<Vec<u8>> {
        self.take()
    }

    fn shutdown(&mut self) {}
}

/// UDP receiver feeding a [`GazeMailbox`].
#[derive(Debug)]
pub struct UdpGazeSource {
    local_addr: SocketAddr,
    mailbox: GazeMailbox,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl UdpGazeSource {
    /// Listen on every interface at `port`.
    pub async fn bind(port: u16, packet_size: usize) -> Result<Self> {
        Self::bind_addr(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)), packet_size).await
    }

    pub async fn bind_addr(addr: SocketAddr, packet_size: usize) -> Result<Self> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| GazeError::Bind { addr, source })?;
        let local_addr = socket
            .local_addr()
            .map_err(|source| GazeError::Bind { addr, source })?;

        let (sender, mailbox) = mailbox();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(receive_loop(socket, packet_size, sender, shutdown_rx));

        info!("Listening for gaze packets on {}", local_addr);
        Ok(Self {
            local_addr,
            mailbox,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop the receive task and wait for it to exit.
    pub async fn close(mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!("Gaze receive task ended abnormally: {}", e);
            }
        }
    }
}

impl GazeSource for UdpGazeSource {
    fn latest_message(&mut self) -> Option<Vec<u8>> {
        self.mailbox.take()
    }

    fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            // Receiver is gone if the task already exited
            let _ = tx.send(());
            debug!("Gaze source on {} shutting down", self.local_addr);
        }
    }
}

impl Drop for UdpGazeSource {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn receive_loop(
    socket: UdpSocket,
    packet_size: usize,
    sender: MailboxSender,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let mut buf = vec![0u8; packet_size];
    loop {
        tokio::select! {
            _ = &mut shutdown_rx => break,
            received = socket.recv_from(&mut buf) => match received {
                Ok((len, peer)) => {
                    trace!("Received {} bytes from {}", len, peer);
                    sender.publish(buf[..len].to_vec());
                }
                Err(e) => warn!("Gaze socket receive failed: {}", e),
            },
        }
    }
    debug!("Gaze receive loop stopped");
}
