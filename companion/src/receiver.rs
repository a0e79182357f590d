use crossbeam_channel::Sender;
use log::{debug, info, warn};
use market_common::net::MAX_DATAGRAM;
use market_common::{Frame, Result, WatchError};
use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;

/// Socket read timeout, so the loop notices a shutdown.
const READ_TIMEOUT: Duration = Duration::from_secs(1);

/// UDP frame receiver for the companion.
///
/// Reads datagrams from the shared socket, decodes each into a `Frame` and forwards
/// it, together with the sender's address, into a channel consumed by the main loop.
/// Datagrams that fail to decode are logged and skipped; they never stop the loop.
pub struct FrameReceiver {
    /// The underlying UDP socket, shared with the sending side.
    pub(crate) socket: Arc<UdpSocket>,
}

impl FrameReceiver {
    /// Wrap `socket`, setting its read timeout.
    pub fn new(socket: Arc<UdpSocket>) -> Result<Self, WatchError> {
        socket.set_read_timeout(Some(READ_TIMEOUT))?;
        Ok(Self { socket })
    }

    /// Blocking loop that forwards decoded frames to `tx` until `shutdown` is set or the
    /// channel closes.
    pub(crate) fn receive_loop_with_channel(
        self,
        tx: Sender<(Frame, SocketAddr)>,
        shutdown: Arc<AtomicBool>,
    ) -> Result<(), WatchError> {
        info!("Companion receiver started on {}", self.socket.local_addr()?);
        let mut buf = [0u8; MAX_DATAGRAM];

        while !shutdown.load(Ordering::Relaxed) {
            match self.socket.recv_from(&mut buf) {
                Ok((size, from)) => match Frame::from_bytes(&buf[..size]) {
                    Ok(frame) => {
                        debug!("Received {:?} from {}", frame, from);
                        tx.send((frame, from))?;
                    }
                    Err(e) => warn!("Dropping {} byte datagram from {}: {}", size, from, e),
                },
                Err(e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut => {
                    continue;
                }
                Err(e) if e.kind() == ErrorKind::ConnectionReset => {
                    debug!("Watch port unreachable");
                    continue;
                }
                Err(e) => return Err(WatchError::Io(e)),
            }
        }
        info!("Companion receiver stopping...");
        Ok(())
    }
}
