use std::fmt;

/// Shape of a typing test, fixed for its lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TestMode {
    /// Countdown from `secs` over a pool of random words.
    Timed { secs: u32 },
    /// A curated passage of roughly `n` words.
    WordCount(usize),
}

impl TestMode {
    pub fn is_timed(self) -> bool {
        matches!(self, TestMode::Timed { .. })
    }

    pub fn label(self) -> String {
        match self {
            TestMode::Timed { secs } => format!("{secs}s"),
            TestMode::WordCount(n) => format!("{n}w"),
        }
    }
}

impl fmt::Display for TestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestMode::Timed { secs } => write!(f, "timed {secs}s"),
            TestMode::WordCount(n) => write!(f, "{n} words"),
        }
    }
}
