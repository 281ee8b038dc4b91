//! Duration clamping and display formatting shared by the engine, presets and stats.

/// Shortest accepted session, in seconds.
pub const MIN_DURATION_SECS: u32 = 1;
/// Longest accepted session: 59:59.
pub const MAX_DURATION_SECS: u32 = 59 * 60 + 59;

/// Clamp a raw duration into `[1, 3599]` seconds.
pub fn clamp_duration(secs: i64) -> u32 {
    secs.clamp(MIN_DURATION_SECS as i64, MAX_DURATION_SECS as i64) as u32
}

/// Build a duration from form fields. Each field is clamped to `[0, 59]`
/// before the total is clamped to `[1, 3599]`.
pub fn duration_from_parts(minutes: i64, seconds: i64) -> u32 {
    let mm = minutes.clamp(0, 59);
    let ss = seconds.clamp(0, 59);
    clamp_duration(mm * 60 + ss)
}

fn whole_secs(secs: f64) -> u64 {
    if secs.is_finite() && secs > 0.0 {
        secs.round() as u64
    } else {
        0
    }
}

/// `MM:SS`, rounded to the nearest second and floored at zero.
///
/// This is also the key used for the timer-duration counter.
pub fn format_clock(secs: f64) -> String {
    let secs = whole_secs(secs);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// `M:SS`, or `Ns` below one minute.
pub fn format_short(secs: f64) -> String {
    let secs = whole_secs(secs);
    let (m, s) = (secs / 60, secs % 60);
    if m > 0 {
        format!("{m}:{s:02}")
    } else {
        format!("{s}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_duration_bounds() {
        assert_eq!(clamp_duration(0), 1);
        assert_eq!(clamp_duration(-40), 1);
        assert_eq!(clamp_duration(90), 90);
        assert_eq!(clamp_duration(10_000), 3599);
    }

    #[test]
    fn parts_are_clamped_individually() {
        assert_eq!(duration_from_parts(1, 30), 90);
        assert_eq!(duration_from_parts(0, 0), 1);
        assert_eq!(duration_from_parts(99, 99), 3599);
        assert_eq!(duration_from_parts(-3, 75), 59);
    }

    #[test]
    fn clock_format() {
        assert_eq!(format_clock(60.0), "01:00");
        assert_eq!(format_clock(95.0), "01:35");
        assert_eq!(format_clock(29.6), "00:30");
        assert_eq!(format_clock(-4.0), "00:00");
        assert_eq!(format_clock(3599.0), "59:59");
    }

    #[test]
    fn short_format() {
        assert_eq!(format_short(30.0), "30s");
        assert_eq!(format_short(75.0), "1:15");
        assert_eq!(format_short(0.2), "0s");
    }
}
