use std::ops::Add;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid timecode {0:?}: expected mm:ss.fff or hh:mm:ss.fff")]
pub struct TimecodeParseError(pub String);

/// A subtitle timestamp with millisecond precision.
///
/// Stored as total milliseconds; the component accessors derive hours,
/// minutes, seconds and milliseconds on demand, so a timecode is always
/// normalized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timecode {
    millis: u64,
}

impl Timecode {
    pub fn from_millis(millis: u64) -> Self {
        Timecode { millis }
    }

    pub fn total_millis(&self) -> u64 {
        self.millis
    }

    /// Hours are unbounded; everything below rolls over.
    pub fn hours(&self) -> u64 {
        self.millis / 3_600_000
    }

    pub fn minutes(&self) -> u64 {
        self.millis / 60_000 % 60
    }

    pub fn seconds(&self) -> u64 {
        self.millis / 1000 % 60
    }

    pub fn subsec_millis(&self) -> u64 {
        self.millis % 1000
    }

    /// `self - other`, or `None` when the result would be negative.
    pub fn checked_sub(&self, other: Timecode) -> Option<Timecode> {
        self.millis
            .checked_sub(other.millis)
            .map(Timecode::from_millis)
    }

    /// Split into `count` equal parts, truncated to whole milliseconds.
    /// `None` when `count` is zero.
    pub fn div(&self, count: u64) -> Option<Timecode> {
        if count == 0 {
            None
        } else {
            Some(Timecode::from_millis(self.millis / count))
        }
    }

    /// Render as `mm:ss.fff`, or `hh:mm:ss.fff` when `show_hours` is set.
    /// Without hours the minute field carries the full count, so nothing is
    /// silently dropped for times past an hour.
    pub fn format(&self, show_hours: bool) -> String {
        if show_hours {
            format!(
                "{:02}:{:02}:{:02}.{:03}",
                self.hours(),
                self.minutes(),
                self.seconds(),
                self.subsec_millis()
            )
        } else {
            format!(
                "{:02}:{:02}.{:03}",
                self.millis / 60_000,
                self.seconds(),
                self.subsec_millis()
            )
        }
    }
}

impl Add for Timecode {
    type Output = Timecode;

    fn add(self, other: Timecode) -> Timecode {
        Timecode::from_millis(self.millis + other.millis)
    }
}

impl FromStr for Timecode {
    type Err = TimecodeParseError;

    /// Parse `hh:mm:ss.fff` or `mm:ss.fff`.
    ///
    /// Component parsing is lenient the way the source sheets are sloppy:
    /// each field takes its leading digits and anything else counts as zero.
    /// Only the overall `:` shape is enforced. The fraction is read as a
    /// plain millisecond count, not as a decimal fraction.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 2 && parts.len() != 3 {
            return Err(TimecodeParseError(s.to_string()));
        }

        let (hours, minutes) = if parts.len() == 3 {
            (leading_number(parts[0]), leading_number(parts[1]))
        } else {
            (0, leading_number(parts[0]))
        };

        let (sec_token, ms_token) = match parts[parts.len() - 1].split_once('.') {
            Some((sec, ms)) => (sec, ms),
            None => (parts[parts.len() - 1], ""),
        };
        let seconds = leading_number(sec_token);
        let millis = leading_number(ms_token);

        // saturate rather than overflow on absurd component values
        Ok(Timecode::from_millis(
            hours
                .saturating_mul(3_600_000)
                .saturating_add(minutes.saturating_mul(60_000))
                .saturating_add(seconds.saturating_mul(1000))
                .saturating_add(millis),
        ))
    }
}

/// The leading decimal digits of `s` after whitespace, or zero.
fn leading_number(s: &str) -> u64 {
    let s = s.trim_start();
    let end = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    s[..end].parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Timecode {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_with_hours() {
        assert_eq!(parse("01:02:03.456").total_millis(), 3_723_456);
    }

    #[test]
    fn test_parse_without_hours() {
        assert_eq!(parse("02:03.456").total_millis(), 123_456);
    }

    #[test]
    fn test_parse_without_fraction() {
        assert_eq!(parse("1:30").total_millis(), 90_000);
    }

    #[test]
    fn test_fraction_is_a_millisecond_count() {
        // ".5" means 5 milliseconds, not half a second
        assert_eq!(parse("0:1.5").total_millis(), 1_005);
    }

    #[test]
    fn test_wrong_shape_is_rejected() {
        assert!("5".parse::<Timecode>().is_err());
        assert!("1:2:3:4".parse::<Timecode>().is_err());
        assert!("".parse::<Timecode>().is_err());
    }

    #[test]
    fn test_sloppy_fields_take_leading_digits() {
        assert_eq!(parse("12min:34.56x").total_millis(), 12 * 60_000 + 34_056);
        assert_eq!(parse(" 1: 2.3").total_millis(), 62_003);
        assert_eq!(parse("x:y.z").total_millis(), 0);
        assert_eq!(parse("5:").total_millis(), 300_000);
        assert_eq!(parse(":30").total_millis(), 30_000);
    }

    #[test]
    fn test_huge_components_saturate() {
        let max = u64::MAX.to_string();
        assert_eq!(
            parse(&format!("{}:00:00.0", max)).total_millis(),
            u64::MAX
        );
        assert_eq!(
            parse(&format!("{}:{}.{}", max, max, max)).total_millis(),
            u64::MAX
        );
    }

    #[test]
    fn test_components() {
        let tc = Timecode::from_millis(3_723_456);
        assert_eq!(tc.hours(), 1);
        assert_eq!(tc.minutes(), 2);
        assert_eq!(tc.seconds(), 3);
        assert_eq!(tc.subsec_millis(), 456);
    }

    #[test]
    fn test_hours_are_unbounded() {
        let tc = Timecode::from_millis(100 * 3_600_000);
        assert_eq!(tc.hours(), 100);
        assert_eq!(tc.format(true), "100:00:00.000");
    }

    #[test]
    fn test_format() {
        let tc = parse("01:02:03.456");
        assert_eq!(tc.format(true), "01:02:03.456");
        assert_eq!(tc.format(false), "62:03.456");
        assert_eq!(Timecode::from_millis(0).format(true), "00:00:00.000");
        assert_eq!(Timecode::from_millis(0).format(false), "00:00.000");
    }

    #[test]
    fn test_format_parse_round_trip() {
        let tc = Timecode::from_millis(5_400_000);
        assert_eq!(tc.format(false), "90:00.000");
        assert_eq!(parse(&tc.format(false)), tc);
        assert_eq!(parse(&tc.format(true)), tc);
    }

    #[test]
    fn test_add() {
        assert_eq!(
            parse("0:59.500") + parse("0:0.500"),
            Timecode::from_millis(60_000)
        );
    }

    #[test]
    fn test_checked_sub() {
        let a = parse("0:02.000");
        let b = parse("0:01.000");
        assert_eq!(a.checked_sub(b), Some(Timecode::from_millis(1_000)));
        assert_eq!(b.checked_sub(a), None);
    }

    #[test]
    fn test_div() {
        let tc = Timecode::from_millis(1_001);
        assert_eq!(tc.div(2), Some(Timecode::from_millis(500)));
        assert_eq!(tc.div(0), None);
    }

    #[test]
    fn test_ordering() {
        assert!(parse("0:01.000") < parse("0:02.000"));
        assert!(parse("1:00:00.000") > parse("59:59.999"));
    }
}
