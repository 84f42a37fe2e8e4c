//! Channel-backed observer using crossbeam-channel.
//!
//! Decouples progress consumers from the notifying thread: the observer
//! callback only enqueues a [`ProgressUpdate`], and a UI thread drains the
//! receiver at its own pace.

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::{ProgressObserver, ProgressUpdate};

/// An observer that forwards every progress change over a channel.
///
/// If the receiving side has been dropped, updates are silently discarded
/// so progress reporting stays optional.
pub struct ChannelObserver {
    sender: Sender<ProgressUpdate>,
}

impl ChannelObserver {
    /// Create a channel observer together with its receiving half.
    pub fn new() -> (Self, ProgressReceiver) {
        let (sender, receiver) = unbounded();
        (Self { sender }, ProgressReceiver { inner: receiver })
    }
}

impl ProgressObserver for ChannelObserver {
    fn on_progress(&self, processed: usize, total: usize) {
        let _ = self.sender.send(ProgressUpdate { processed, total });
    }
}

/// Receives progress updates forwarded by a [`ChannelObserver`].
pub struct ProgressReceiver {
    inner: Receiver<ProgressUpdate>,
}

impl ProgressReceiver {
    /// Block until the next update is received
    pub fn recv(&self) -> Option<ProgressUpdate> {
        self.inner.recv().ok()
    }

    /// Try to receive an update without blocking
    pub fn try_recv(&self) -> Option<ProgressUpdate> {
        self.inner.try_recv().ok()
    }

    /// Returns an iterator over received updates
    pub fn iter(&self) -> impl Iterator<Item = ProgressUpdate> + '_ {
        self.inner.iter()
    }
}
