// src/utils/time.rs - Cross-platform time utilities

use chrono::{DateTime, Utc};

/// Cross-platform time utilities that work on both native and WASM
pub struct Time;

impl Time {
    /// Get current UTC time - works on both native and WASM
    pub fn now() -> DateTime<Utc> {
        #[cfg(not(target_arch = "wasm32"))]
        {
            Utc::now()
        }

        #[cfg(target_arch = "wasm32")]
        {
            Self::from_millis(js_sys::Date::now() as i64)
        }
    }

    /// Get current timestamp as milliseconds since epoch
    pub fn now_millis() -> u64 {
        #[cfg(not(target_arch = "wasm32"))]
        {
            Utc::now().timestamp_millis().max(0) as u64
        }

        #[cfg(target_arch = "wasm32")]
        {
            js_sys::Date::now() as u64
        }
    }

    /// Create a DateTime from milliseconds since epoch, clamping to the epoch
    pub fn from_millis(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis).unwrap_or(DateTime::UNIX_EPOCH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_millis_tracks_now() {
        let before = Time::now().timestamp_millis() as u64;
        let millis = Time::now_millis();
        assert!(millis >= before);
    }

    #[test]
    fn test_from_millis() {
        let dt = Time::from_millis(1_700_000_000_000);
        assert_eq!(dt.timestamp(), 1_700_000_000);
    }
}
