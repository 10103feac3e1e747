use std::{future::Future, time::Duration};

/// Something that can wait for a while.
///
/// Every pause the wiper takes goes through here, so tests can record
/// the requested durations instead of actually sleeping.
pub trait Sleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()>;
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> {
        tokio::time::sleep(duration)
    }
}

#[cfg(test)]
pub use recording::RecordingSleeper;

#[cfg(test)]
mod recording {
    use super::Sleeper;
    use std::{
        future::{ready, Future},
        sync::{Arc, Mutex},
        time::Duration,
    };

    /// Returns immediately, remembering every duration it was asked to wait.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingSleeper {
        waits: Arc<Mutex<Vec<Duration>>>,
    }

    impl RecordingSleeper {
        pub fn waits(&self) -> Vec<Duration> {
            self.waits.lock().expect("lock should not be poisoned").clone()
        }
    }

    impl Sleeper for RecordingSleeper {
        fn sleep(&self, duration: Duration) -> impl Future<Output = ()> {
            self.waits
                .lock()
                .expect("lock should not be poisoned")
                .push(duration);
            ready(())
        }
    }
}
