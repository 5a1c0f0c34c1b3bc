// ── Profile snapshot streams ──
//
// Readers never touch the repository. They hold immutable snapshots that the
// service republishes after every mutating command.

mod filter;

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::model::NetworkProfile;

pub use filter::ProfileFilter;

/// One published view of the profile set.
pub type ProfileSnapshot = Arc<Vec<Arc<NetworkProfile>>>;

/// A subscription to the masked profile set.
///
/// Provides both point-in-time snapshot access and change notification via
/// `changed()` or by converting into a `Stream`.
pub struct ProfileStream {
    current: ProfileSnapshot,
    receiver: watch::Receiver<ProfileSnapshot>,
}

impl ProfileStream {
    pub(crate) fn new(mut receiver: watch::Receiver<ProfileSnapshot>) -> Self {
        let current = receiver.borrow_and_update().clone();
        Self { current, receiver }
    }

    /// The snapshot captured at creation or at the last `changed()`.
    pub fn current(&self) -> &ProfileSnapshot {
        &self.current
    }

    /// The newest published snapshot.
    pub fn latest(&self) -> ProfileSnapshot {
        self.receiver.borrow().clone()
    }

    /// Profiles of the current snapshot that pass `filter`.
    pub fn filtered(&self, filter: &ProfileFilter) -> Vec<Arc<NetworkProfile>> {
        self.current
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect()
    }

    /// Wait for the next publication. `None` once the service is gone.
    pub async fn changed(&mut self) -> Option<ProfileSnapshot> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    pub fn into_stream(self) -> ProfileWatchStream {
        ProfileWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter yielding each published snapshot.
pub struct ProfileWatchStream {
    inner: WatchStream<ProfileSnapshot>,
}

impl Stream for ProfileWatchStream {
    type Item = ProfileSnapshot;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
