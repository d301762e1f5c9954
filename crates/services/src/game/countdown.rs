use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Interval between countdown ticks.
pub(crate) const TICK: Duration = Duration::from_secs(1);

/// Handle to the countdown armed for one question.
#[derive(Debug)]
pub(crate) struct Countdown {
    generation: u64,
    token: CancellationToken,
}

impl Countdown {
    pub fn new(generation: u64) -> Self {
        Self {
            generation,
            token: CancellationToken::new(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }
}

/// Call `on_tick` once per `TICK` until it returns `false` or `token` is cancelled.
pub(crate) async fn run<F>(token: CancellationToken, mut on_tick: F)
where
    F: FnMut() -> bool + Send,
{
    loop {
        tokio::select! {
            () = token.cancelled() => break,
            () = tokio::time::sleep(TICK) => {}
        }
        if token.is_cancelled() || !on_tick() {
            break;
        }
    }
}
