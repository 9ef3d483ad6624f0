//! Wall-clock time and battery level for the status bar.

use core::fmt::Write;

use heapless::String;

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Battery thresholds in microvolts at the ADC (1/2 divider), lowest first.
pub const BATTERY_THRESHOLDS_UV: [u32; 3] = [1_575_000, 1_750_000, 1_925_000];

/// Approximate charge level, 0 (empty) to 3 (full).
pub fn battery_level(microvolts: u32) -> u8 {
    BATTERY_THRESHOLDS_UV
        .iter()
        .position(|threshold| microvolts < *threshold)
        .unwrap_or(BATTERY_THRESHOLDS_UV.len()) as u8
}

/// Formats a 24-hour time as `h:mm` and its `am`/`pm` suffix.
pub fn time_24_to_12(hour: u8, minute: u8) -> (String<8>, &'static str) {
    let suffix = if hour >= 12 { "pm" } else { "am" };
    let hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    let mut text = String::new();
    let _ = write!(text, "{}:{:02}", hour, minute);
    (text, suffix)
}

/// Real-time clock that keeps counting across a device reset. It loses its
/// value on power loss.
pub trait Rtc {
    /// Current UTC unix seconds, or `None` while the RTC was never set.
    fn now_unix_secs(&mut self) -> Option<u64>;
    fn set_unix_secs(&mut self, unix_secs: u64);
}

/// Local time derived from uptime plus the last RTC reading or network
/// sync, if any.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WallClock {
    /// Unix seconds and the uptime at which they were captured.
    synced: Option<(u64, u64)>,
}

impl WallClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self) -> bool {
        self.synced.is_some()
    }

    pub fn set(&mut self, unix_secs: u64, uptime_ms: u64) {
        self.synced = Some((unix_secs, uptime_ms));
    }

    /// Hour and minute of the local day. An unset clock starts at 00:00 at
    /// boot and ignores the timezone.
    pub fn local_time(&self, uptime_ms: u64, timezone: i8) -> (u8, u8) {
        let secs = match self.synced {
            Some((unix, at)) => {
                let now = unix + uptime_ms.saturating_sub(at) / 1000;
                let offset = i64::from(timezone) * 3600;
                (now as i64 + offset).rem_euclid(SECS_PER_DAY as i64) as u64
            }
            None => uptime_ms / 1000,
        };
        let day_secs = secs % SECS_PER_DAY;
        ((day_secs / 3600) as u8, (day_secs / 60 % 60) as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_24_to_12() {
        assert_eq!(time_24_to_12(0, 5), (String::try_from("12:05").unwrap(), "am"));
        assert_eq!(time_24_to_12(12, 0), (String::try_from("12:00").unwrap(), "pm"));
        assert_eq!(time_24_to_12(23, 59), (String::try_from("11:59").unwrap(), "pm"));
        assert_eq!(time_24_to_12(9, 30).1, "am");
    }

    #[test]
    fn test_battery_levels() {
        assert_eq!(battery_level(0), 0);
        assert_eq!(battery_level(1_574_999), 0);
        assert_eq!(battery_level(1_575_000), 1);
        assert_eq!(battery_level(1_800_000), 2);
        assert_eq!(battery_level(1_925_000), 3);
        assert_eq!(battery_level(2_100_000), 3);
    }

    #[test]
    fn test_unset_clock_counts_from_boot() {
        let clock = WallClock::new();
        assert!(!clock.is_set());
        assert_eq!(clock.local_time(0, 5), (0, 0));
        assert_eq!(clock.local_time(61 * 60 * 1000, 5), (1, 1));
    }

    #[test]
    fn test_synced_clock_applies_timezone() {
        let mut clock = WallClock::new();
        // 2024-01-01 23:30:00 UTC, captured 10 s after boot.
        clock.set(1_704_151_800, 10_000);
        assert_eq!(clock.local_time(10_000, 0), (23, 30));
        assert_eq!(clock.local_time(10_000, 2), (1, 30));
        assert_eq!(clock.local_time(10_000 + 45 * 60 * 1000, -5), (19, 15));
    }
}
