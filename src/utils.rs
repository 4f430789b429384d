// src/utils.rs

//! Small helpers shared across the crate

pub mod time;

pub use time::Time;

/// Integer division rounding up; `0` when the divisor is zero.
pub fn div_ceil(value: u64, divisor: u64) -> u64 {
    if divisor == 0 {
        0
    } else {
        value.div_ceil(divisor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_div_ceil() {
        assert_eq!(div_ceil(45, 20), 3);
        assert_eq!(div_ceil(40, 20), 2);
        assert_eq!(div_ceil(0, 20), 0);
        assert_eq!(div_ceil(7, 0), 0);
    }
}
