//! Rate limiting for notification streams

use futures::{Stream, ready};
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior, interval};

/// Extension trait to add throttling to any Stream
pub trait ThrottleExt: Stream {
    /// Emit at most once per `duration`, keeping only the latest item.
    ///
    /// The timer starts on first poll, so the stream can be built outside a runtime.
    fn throttle(self, duration: Duration) -> Throttle<Self>
    where
        Self: Sized,
    {
        Throttle::new(self, duration)
    }
}

impl<T: Stream> ThrottleExt for T {}

pin_project! {
    /// Latest-wins throttle.
    ///
    /// Quiet periods do not end the stream: it yields again as soon as a new item
    /// arrives and the interval allows, and ends only after the inner stream ends and
    /// any held item has been delivered.
    pub struct Throttle<S: Stream> {
        #[pin]
        stream: S,
        period: Duration,
        interval: Option<Interval>,
        pending: Option<S::Item>,
        exhausted: bool,
    }
}

impl<S: Stream> Throttle<S> {
    pub fn new(stream: S, duration: Duration) -> Self {
        Self { stream, period: duration, interval: None, pending: None, exhausted: false }
    }
}

impl<S: Stream> Stream for Throttle<S> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        while !*this.exhausted {
            match this.stream.as_mut().poll_next(cx) {
                Poll::Ready(Some(item)) => *this.pending = Some(item),
                Poll::Ready(None) => *this.exhausted = true,
                Poll::Pending => break,
            }
        }

        if this.pending.is_some() {
            let period = *this.period;
            let ticker = this.interval.get_or_insert_with(|| {
                let mut ticker = interval(period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                ticker
            });
            ready!(ticker.poll_tick(cx));
            return Poll::Ready(this.pending.take());
        }
        if *this.exhausted {
            return Poll::Ready(None);
        }
        Poll::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use tokio::sync::mpsc;
    use tokio_stream::wrappers::UnboundedReceiverStream;

    #[tokio::test(start_paused = true)]
    async fn keeps_latest_item_per_interval() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut throttled =
            Box::pin(UnboundedReceiverStream::new(rx).throttle(Duration::from_millis(100)));

        tx.send(1).unwrap();
        assert_eq!(throttled.next().await, Some(1));

        for i in 2..=5 {
            tx.send(i).unwrap();
        }
        assert_eq!(throttled.next().await, Some(5));
    }

    #[tokio::test(start_paused = true)]
    async fn quiet_period_does_not_end_stream() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut throttled =
            Box::pin(UnboundedReceiverStream::new(rx).throttle(Duration::from_millis(50)));

        tx.send("a").unwrap();
        assert_eq!(throttled.next().await, Some("a"));

        tokio::time::sleep(Duration::from_millis(500)).await;
        tx.send("b").unwrap();
        drop(tx);
        assert_eq!(throttled.next().await, Some("b"));
        assert_eq!(throttled.next().await, None);
    }

    #[test]
    fn builds_outside_runtime() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut throttled =
            Box::pin(UnboundedReceiverStream::new(rx).throttle(Duration::from_millis(20)));
        tx.send(7).unwrap();

        let runtime = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();
        assert_eq!(runtime.block_on(throttled.next()), Some(7));
    }
}
