use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use strata_core::StreamEvent;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::{CancellationToken, DropGuard};

/// Events of one running generation.
///
/// Holds the run's cancellation token; dropping the stream cancels the run
/// and releases any in-flight provider connection.
pub struct EventStream {
    inner: ReceiverStream<StreamEvent>,
    _guard: DropGuard,
}

impl EventStream {
    pub(crate) fn new(rx: mpsc::Receiver<StreamEvent>, cancel: CancellationToken) -> Self {
        Self { inner: ReceiverStream::new(rx), _guard: cancel.drop_guard() }
    }
}

impl Stream for EventStream {
    type Item = StreamEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
