use core::time::Duration;

use log::trace;

use crate::Osal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// The next poll is attempt number `attempt`, counting from 1.
    Polling { attempt: u32 },
    Up { attempts: u32 },
    TimedOut { attempts: u32 },
}

impl LinkState {
    /// Polls made so far.
    pub const fn attempts(&self) -> u32 {
        match *self {
            Self::Polling { attempt } => attempt.saturating_sub(1),
            Self::Up { attempts } | Self::TimedOut { attempts } => attempts,
        }
    }
}

/// Bounded wait for link training.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkWait {
    pub max_attempts: u32,
    /// Delay after each poll that found the link down.
    pub interval: Duration,
}

impl LinkWait {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(90);

    pub const fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    pub const fn start(&self) -> LinkState {
        if self.max_attempts == 0 {
            LinkState::TimedOut { attempts: 0 }
        } else {
            LinkState::Polling { attempt: 1 }
        }
    }

    /// Moves on after the poll of the current attempt saw `link_up`.
    pub const fn advance(&self, state: LinkState, link_up: bool) -> LinkState {
        match state {
            LinkState::Polling { attempt } => {
                if link_up {
                    LinkState::Up { attempts: attempt }
                } else if attempt >= self.max_attempts {
                    LinkState::TimedOut { attempts: attempt }
                } else {
                    LinkState::Polling {
                        attempt: attempt + 1,
                    }
                }
            }
            done => done,
        }
    }

    /// Polls `is_up` until the link is reported up or attempts run out.
    ///
    /// Returns either [`LinkState::Up`] or [`LinkState::TimedOut`].
    pub fn wait(&self, osal: &(impl Osal + ?Sized), mut is_up: impl FnMut() -> bool) -> LinkState {
        let mut state = self.start();
        while let LinkState::Polling { attempt } = state {
            let up = is_up();
            if !up {
                trace!("link down, attempt {attempt}/{}", self.max_attempts);
                osal.delay(self.interval);
            }
            state = self.advance(state, up);
        }
        state
    }
}

impl Default for LinkWait {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ATTEMPTS, Self::DEFAULT_INTERVAL)
    }
}
