//! Video durations
//!
//! YouTube reports no duration (or `P0D`) for broadcasts that are live or
//! upcoming. [`VideoDuration`] keeps "not reported" distinct from an explicit
//! value, and [`VideoDuration::is_open_ended`] is the one place where a zero
//! length is treated the same as an unknown one.

use chrono::TimeDelta;

use crate::error::{CoreError, CoreResult};

/// Duration of a video as reported upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoDuration {
    /// Runtime reported by the platform (may be zero)
    Known(TimeDelta),
    /// No runtime reported yet
    Unknown,
}

impl VideoDuration {
    /// Parse an optional ISO-8601 duration such as `PT1H23M45S`
    ///
    /// `None` maps to [`VideoDuration::Unknown`]. A malformed string is an
    /// error; it is never coerced to zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use shinju_core::duration::VideoDuration;
    ///
    /// let d = VideoDuration::parse(Some("PT1H23M45S")).unwrap();
    /// assert!(!d.is_open_ended());
    /// assert!(VideoDuration::parse(None).unwrap().is_open_ended());
    /// ```
    pub fn parse(value: Option<&str>) -> CoreResult<Self> {
        let Some(value) = value else {
            return Ok(Self::Unknown);
        };

        let parsed = parse_complete(value)?;
        let std_duration: std::time::Duration = parsed.into();
        let delta = TimeDelta::from_std(std_duration)
            .map_err(|e| CoreError::InvalidDuration(format!("{}: {}", value, e)))?;

        Ok(Self::Known(delta))
    }

    /// Whether the real end of the video is unknown
    ///
    /// True for a missing duration and for a zero-length one.
    pub fn is_open_ended(&self) -> bool {
        match self {
            Self::Known(delta) => *delta <= TimeDelta::zero(),
            Self::Unknown => true,
        }
    }

    /// The reported runtime when it is nonzero
    pub fn nonzero(&self) -> Option<TimeDelta> {
        match self {
            Self::Known(delta) if *delta > TimeDelta::zero() => Some(*delta),
            _ => None,
        }
    }

    /// Render as an ISO-8601 duration (`P1DT2H3M4S`, `PT45S`, `P0D`)
    pub fn to_iso8601(&self) -> Option<String> {
        let Self::Known(delta) = self else {
            return None;
        };

        let total = delta.num_seconds().max(0);
        if total == 0 {
            return Some("P0D".to_string());
        }

        let days = total / 86_400;
        let hours = (total % 86_400) / 3_600;
        let minutes = (total % 3_600) / 60;
        let seconds = total % 60;

        let mut out = String::from("P");
        if days > 0 {
            out.push_str(&format!("{}D", days));
        }
        if hours > 0 || minutes > 0 || seconds > 0 {
            out.push('T');
            if hours > 0 {
                out.push_str(&format!("{}H", hours));
            }
            if minutes > 0 {
                out.push_str(&format!("{}M", minutes));
            }
            if seconds > 0 {
                out.push_str(&format!("{}S", seconds));
            }
        }

        Some(out)
    }

    /// Render as `HH:MM:SS` for video cards; `None` while open-ended
    pub fn format_hms(&self) -> Option<String> {
        let delta = self.nonzero()?;
        let total = delta.num_seconds();

        Some(format!(
            "{:02}:{:02}:{:02}",
            total / 3_600,
            (total % 3_600) / 60,
            total % 60
        ))
    }
}

/// Run the ISO-8601 duration parser over the whole input
///
/// The parser stops at the first byte it does not understand, so leftover
/// input means the value is malformed. A `T` designator with no time
/// components (`PT`, `P1DT`) is accepted by the parser and rejected here.
fn parse_complete(value: &str) -> CoreResult<iso8601::Duration> {
    let malformed = || CoreError::InvalidDuration(value.to_string());

    match iso8601::parsers::parse_duration(value.as_bytes()) {
        Ok((rest, _)) if !rest.is_empty() => Err(malformed()),
        Ok(_) if value.ends_with('T') => Err(malformed()),
        Ok((_, parsed)) => Ok(parsed),
        Err(_) => Err(malformed()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_missing_is_unknown() {
        assert_eq!(VideoDuration::parse(None).unwrap(), VideoDuration::Unknown);
    }

    #[test]
    fn test_parse_full_duration() {
        let d = VideoDuration::parse(Some("PT1H23M45S")).unwrap();
        assert_eq!(
            d,
            VideoDuration::Known(TimeDelta::seconds(3_600 + 23 * 60 + 45))
        );
    }

    #[test]
    fn test_zero_duration_is_open_ended() {
        for raw in ["P0D", "PT0S"] {
            let d = VideoDuration::parse(Some(raw)).unwrap();
            assert_eq!(d, VideoDuration::Known(TimeDelta::zero()));
            assert!(d.is_open_ended(), "{} should be open-ended", raw);
            assert_eq!(d.nonzero(), None);
        }
    }

    #[test]
    fn test_parse_malformed_is_error() {
        let result = VideoDuration::parse(Some("one hour"));
        assert!(matches!(result, Err(CoreError::InvalidDuration(_))));
    }

    #[test]
    fn test_parse_trailing_garbage_is_error() {
        for raw in ["PT1H garbage", "PT10Mx", "P1D "] {
            let result = VideoDuration::parse(Some(raw));
            assert!(
                matches!(result, Err(CoreError::InvalidDuration(ref v)) if v == raw),
                "{} should be rejected, got {:?}",
                raw,
                result
            );
        }
    }

    #[test]
    fn test_parse_empty_designators_is_error() {
        for raw in ["", "P", "PT", "P1DT"] {
            let result = VideoDuration::parse(Some(raw));
            assert!(
                matches!(result, Err(CoreError::InvalidDuration(_))),
                "{:?} should be rejected, got {:?}",
                raw,
                result
            );
        }
    }

    #[test]
    fn test_to_iso8601() {
        let d = VideoDuration::Known(TimeDelta::seconds(3_600 + 23 * 60 + 45));
        assert_eq!(d.to_iso8601().as_deref(), Some("PT1H23M45S"));

        let d = VideoDuration::Known(TimeDelta::seconds(86_400 + 4));
        assert_eq!(d.to_iso8601().as_deref(), Some("P1DT4S"));

        let d = VideoDuration::Known(TimeDelta::zero());
        assert_eq!(d.to_iso8601().as_deref(), Some("P0D"));

        assert_eq!(VideoDuration::Unknown.to_iso8601(), None);
    }

    #[test]
    fn test_format_hms() {
        let d = VideoDuration::parse(Some("PT1H2M3S")).unwrap();
        assert_eq!(d.format_hms().as_deref(), Some("01:02:03"));

        let d = VideoDuration::parse(Some("P1DT1H")).unwrap();
        assert_eq!(d.format_hms().as_deref(), Some("25:00:00"));

        assert_eq!(VideoDuration::Unknown.format_hms(), None);
    }
}
