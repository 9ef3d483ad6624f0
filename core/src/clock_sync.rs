//! Best-effort network time sync, run off the main loop.
//!
//! The task owns its network link for its whole lifetime and reports a
//! single [`ClockSyncOutcome`] through a one-slot [`ClockSyncChannel`].

use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};
use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::config::Config;

pub const MAX_CONNECT_ATTEMPTS: u32 = 100;
pub const MAX_TIME_ATTEMPTS: u32 = 10;

const CONNECT_POLL_MS: u32 = 10;
const CONNECT_ERROR_BACKOFF_MS: u32 = 1000;
const TIME_RETRY_MS: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetError {
    Connect,
    Timeout,
    BadResponse,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockSyncOutcome {
    /// UTC unix seconds.
    Synced(u64),
    Failed,
    Skipped,
}

pub type ClockSyncChannel = Signal<CriticalSectionRawMutex, ClockSyncOutcome>;

pub trait NetworkLink {
    fn is_connected(&mut self) -> bool;
    /// Starts joining the network. Completion shows up in `is_connected`.
    fn connect(&mut self, ssid: &str, password: &str) -> Result<(), NetError>;
    /// Current UTC time in unix seconds.
    fn fetch_time(&mut self) -> Result<u64, NetError>;
    fn disconnect(&mut self);
}

/// Whether a sync attempt makes sense for this configuration.
pub fn should_sync(config: &Config, clock_set: bool) -> bool {
    config.sync_clock && !config.wifi_ssid.is_empty() && !clock_set
}

/// Connects, asks for the time and disconnects, with bounded retries.
pub fn sync_clock<N, D>(link: &mut N, delay: &mut D, ssid: &str, password: &str) -> ClockSyncOutcome
where
    N: NetworkLink,
    D: DelayNs,
{
    let mut attempts = 0;
    while !link.is_connected() {
        if let Err(err) = link.connect(ssid, password) {
            warn!("Could not connect to {}: {:?}", ssid, err);
            delay.delay_ms(CONNECT_ERROR_BACKOFF_MS);
        }
        attempts += 1;
        if attempts >= MAX_CONNECT_ATTEMPTS {
            break;
        }
        delay.delay_ms(CONNECT_POLL_MS);
    }

    let mut outcome = ClockSyncOutcome::Failed;
    if link.is_connected() {
        for attempt in 1..=MAX_TIME_ATTEMPTS {
            match link.fetch_time() {
                Ok(secs) => {
                    outcome = ClockSyncOutcome::Synced(secs);
                    break;
                }
                Err(err) => warn!("Time request {} failed: {:?}", attempt, err),
            }
            delay.delay_ms(TIME_RETRY_MS);
        }
    } else {
        warn!("Gave up joining {} after {} attempts", ssid, attempts);
    }
    link.disconnect();
    outcome
}

/// Task body: syncs when configured to and always reports back once.
pub fn run<N, D>(link: &mut N, delay: &mut D, config: &Config, clock_set: bool, channel: &ClockSyncChannel)
where
    N: NetworkLink,
    D: DelayNs,
{
    let outcome = if should_sync(config, clock_set) {
        sync_clock(link, delay, &config.wifi_ssid, &config.wifi_pass)
    } else {
        ClockSyncOutcome::Skipped
    };
    info!("Clock sync finished: {:?}", outcome);
    channel.signal(outcome);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeLink {
        connect_after: Option<u32>,
        connect_calls: u32,
        connected: bool,
        time_after: Option<u32>,
        time_calls: u32,
        disconnects: u32,
    }

    impl NetworkLink for FakeLink {
        fn is_connected(&mut self) -> bool {
            self.connected
        }

        fn connect(&mut self, _ssid: &str, _password: &str) -> Result<(), NetError> {
            self.connect_calls += 1;
            match self.connect_after {
                Some(n) if self.connect_calls >= n => {
                    self.connected = true;
                    Ok(())
                }
                _ => Err(NetError::Connect),
            }
        }

        fn fetch_time(&mut self) -> Result<u64, NetError> {
            self.time_calls += 1;
            match self.time_after {
                Some(n) if self.time_calls >= n => Ok(1_700_000_000),
                _ => Err(NetError::Timeout),
            }
        }

        fn disconnect(&mut self) {
            self.connected = false;
            self.disconnects += 1;
        }
    }

    #[derive(Default)]
    struct CountingDelay {
        total_ms: u64,
    }

    impl DelayNs for CountingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ms += u64::from(ns) / 1_000_000;
        }

        fn delay_ms(&mut self, ms: u32) {
            self.total_ms += u64::from(ms);
        }
    }

    fn configured() -> Config {
        Config {
            wifi_ssid: String::from("home"),
            ..Config::default()
        }
    }

    #[test]
    fn test_sync_succeeds_and_disconnects() {
        let mut link = FakeLink {
            connect_after: Some(3),
            time_after: Some(2),
            ..FakeLink::default()
        };
        let mut delay = CountingDelay::default();
        let outcome = sync_clock(&mut link, &mut delay, "home", "pw");
        assert_eq!(outcome, ClockSyncOutcome::Synced(1_700_000_000));
        assert_eq!(link.disconnects, 1);
        assert!(!link.connected);
    }

    #[test]
    fn test_connect_attempts_are_bounded() {
        let mut link = FakeLink::default();
        let mut delay = CountingDelay::default();
        assert_eq!(sync_clock(&mut link, &mut delay, "home", ""), ClockSyncOutcome::Failed);
        assert_eq!(link.connect_calls, MAX_CONNECT_ATTEMPTS);
        assert_eq!(link.time_calls, 0);
        assert_eq!(link.disconnects, 1);
    }

    #[test]
    fn test_time_attempts_are_bounded() {
        let mut link = FakeLink {
            connect_after: Some(1),
            ..FakeLink::default()
        };
        let mut delay = CountingDelay::default();
        assert_eq!(sync_clock(&mut link, &mut delay, "home", ""), ClockSyncOutcome::Failed);
        assert_eq!(link.time_calls, MAX_TIME_ATTEMPTS);
        assert_eq!(delay.total_ms, u64::from(CONNECT_POLL_MS + MAX_TIME_ATTEMPTS * TIME_RETRY_MS));
        assert_eq!(link.disconnects, 1);
    }

    #[test]
    fn test_skipped_without_ssid_or_when_set() {
        let channel = ClockSyncChannel::new();
        let mut link = FakeLink::default();
        let mut delay = CountingDelay::default();

        run(&mut link, &mut delay, &Config::default(), false, &channel);
        assert_eq!(channel.try_take(), Some(ClockSyncOutcome::Skipped));

        run(&mut link, &mut delay, &configured(), true, &channel);
        assert_eq!(channel.try_take(), Some(ClockSyncOutcome::Skipped));
        assert_eq!(link.connect_calls, 0);
    }

    #[test]
    fn test_run_reports_once() {
        let channel = ClockSyncChannel::new();
        let mut link = FakeLink {
            connect_after: Some(1),
            time_after: Some(1),
            ..FakeLink::default()
        };
        let mut delay = CountingDelay::default();
        run(&mut link, &mut delay, &configured(), false, &channel);
        assert_eq!(channel.try_take(), Some(ClockSyncOutcome::Synced(1_700_000_000)));
        assert_eq!(channel.try_take(), None);
    }
}
