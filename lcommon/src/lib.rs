//! Shared utilities and small common values for workspace crates.
//!
//! ```rust
//! use lcommon::{Clock, FixedClock};
//!
//! let clock = FixedClock::new("2026-01-01T00:00:00+00:00");
//! assert_eq!(clock.now_rfc3339(), "2026-01-01T00:00:00+00:00");
//! ```

pub mod future {
    //! Shared async future aliases.
    //!
    //! ```rust
    //! use lcommon::BoxFuture;
    //!
    //! fn str_len<'a>(value: &'a str) -> BoxFuture<'a, usize> {
    //!     Box::pin(async move { value.len() })
    //! }
    //!
    //! let _future = str_len("hello");
    //! ```

    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
}

pub mod clock {
    //! Wall-clock source used to timestamp turns and replies.
    //!
    //! ```rust
    //! use lcommon::{Clock, SystemClock};
    //!
    //! let stamp = SystemClock.now_rfc3339();
    //! assert!(stamp.contains('T'));
    //! ```

    use std::fmt::Debug;

    use chrono::{SecondsFormat, Utc};

    pub trait Clock: Send + Sync + Debug {
        /// Current time as an RFC 3339 string.
        fn now_rfc3339(&self) -> String;
    }

    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now_rfc3339(&self) -> String {
            Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)
        }
    }

    /// Clock that always reports the same instant.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct FixedClock {
        stamp: String,
    }

    impl FixedClock {
        pub fn new(stamp: impl Into<String>) -> Self {
            Self {
                stamp: stamp.into(),
            }
        }
    }

    impl Clock for FixedClock {
        fn now_rfc3339(&self) -> String {
            self.stamp.clone()
        }
    }
}

pub use clock::{Clock, FixedClock, SystemClock};
pub use future::BoxFuture;
