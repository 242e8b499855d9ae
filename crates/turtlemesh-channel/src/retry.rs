use std::time::Duration;

/// How long to wait for a reply and how many times to retransmit
/// before giving up. The reference gives low-latency peers ~200ms/5
/// retries and slow embedded peers several seconds and up to 30
/// retries; callers pick whichever fits their deployment.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub timeout: Duration,
    pub retries: u32,
}

impl RetryPolicy {
    pub const fn new(timeout: Duration, retries: u32) -> Self {
        Self { timeout, retries }
    }

    /// Reference default for low-latency peers on the same host/LAN.
    pub const fn fast() -> Self {
        Self::new(Duration::from_millis(200), 5)
    }

    /// Reference default for slow/embedded peers.
    pub const fn slow() -> Self {
        Self::new(Duration::from_secs(2), 20)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fast()
    }
}
