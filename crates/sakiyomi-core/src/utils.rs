//! Utility streams for timing.
//!
//! Why: keep time-based behavior explicit and under our control instead of
//! tying the core to a specific runtime's timers.
use futures::Stream;
use pin_project_lite::pin_project;

pin_project! {
    /// Fixed-period stream used to drive the feeder's demand polling.
    ///
    /// The delay is reset on ready to reduce drift when the consumer stalls
    /// briefly.
    pub struct Ticker {
        #[pin]
        inner: futures_timer::Delay,
        period: std::time::Duration,
    }
}

impl Ticker {
    pub fn new(period: std::time::Duration) -> Self {
        Self {
            inner: futures_timer::Delay::new(period),
            period,
        }
    }
}

impl Stream for Ticker {
    type Item = ();

    fn poll_next(
        self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        let mut this = self.project();
        let poll = this.inner.as_mut().poll(cx);
        if poll.is_ready() {
            this.inner.reset(*this.period);
        }
        poll.map(Some)
    }
}
