use super::Object;
use chrono::prelude::*;

/// Modification time of an embedded file, kept in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModDate(DateTime<Utc>);

impl ModDate {
    pub fn new(date: DateTime<Utc>) -> Self {
        ModDate(date)
    }

    pub fn as_utc(&self) -> DateTime<Utc> {
        self.0
    }

    /// `D:YYYYMMDDHHMMSS`, always expressed in UTC.
    pub fn to_pdf_string(&self) -> String {
        self.0.format("D:%Y%m%d%H%M%S").to_string()
    }
}

impl From<DateTime<Utc>> for ModDate {
    fn from(date: DateTime<Utc>) -> Self {
        ModDate(date)
    }
}

impl From<DateTime<Local>> for ModDate {
    fn from(date: DateTime<Local>) -> Self {
        ModDate(date.with_timezone(&Utc))
    }
}

impl From<DateTime<FixedOffset>> for ModDate {
    fn from(date: DateTime<FixedOffset>) -> Self {
        ModDate(date.with_timezone(&Utc))
    }
}

impl From<ModDate> for Object {
    fn from(date: ModDate) -> Self {
        Object::string_literal(date.to_pdf_string())
    }
}

#[cfg(any(feature = "jiff", feature = "time"))]
fn from_unix(seconds: i64, nanos: u32) -> crate::Result<ModDate> {
    DateTime::from_timestamp(seconds, nanos)
        .map(ModDate)
        .ok_or(crate::Error::DateOutOfRange)
}

#[cfg(feature = "jiff")]
mod jiff_impl {
    use super::{ModDate, from_unix};
    use jiff::{Timestamp, Zoned};

    impl TryFrom<Timestamp> for ModDate {
        type Error = crate::Error;

        fn try_from(date: Timestamp) -> crate::Result<Self> {
            let nanos = u32::try_from(date.subsec_nanosecond()).unwrap_or(0);
            from_unix(date.as_second(), nanos)
        }
    }

    impl TryFrom<Zoned> for ModDate {
        type Error = crate::Error;

        fn try_from(date: Zoned) -> crate::Result<Self> {
            ModDate::try_from(date.timestamp())
        }
    }
}

#[cfg(feature = "time")]
mod time_impl {
    use super::{ModDate, from_unix};
    use time::OffsetDateTime;

    impl TryFrom<OffsetDateTime> for ModDate {
        type Error = crate::Error;

        fn try_from(date: OffsetDateTime) -> crate::Result<Self> {
            from_unix(date.unix_timestamp(), date.nanosecond())
        }
    }
}

#[test]
fn formats_in_utc_without_offset() {
    let date = Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap();
    assert_eq!(ModDate::from(date).to_pdf_string(), "D:20210304050607");
}

#[test]
fn fixed_offset_is_converted_to_utc() {
    let offset = FixedOffset::east_opt(2 * 3600).unwrap();
    let date = offset.with_ymd_and_hms(2021, 3, 4, 1, 0, 0).unwrap();
    assert_eq!(ModDate::from(date).to_pdf_string(), "D:20210303230000");
}

#[test]
fn object_is_a_literal_string() {
    let date = Utc.with_ymd_and_hms(1999, 12, 31, 23, 59, 59).unwrap();
    let object: Object = ModDate::from(date).into();
    assert_eq!(object, Object::string_literal("D:19991231235959"));
}

#[cfg(feature = "jiff")]
#[test]
fn jiff_timestamp_converts() {
    let timestamp = jiff::Timestamp::from_second(1_600_000_000).unwrap();
    let date = ModDate::try_from(timestamp).unwrap();
    assert_eq!(date.to_pdf_string(), "D:20200913122640");
}

#[cfg(feature = "time")]
#[test]
fn time_offset_date_time_converts() {
    let date = time::OffsetDateTime::from_unix_timestamp(1_600_000_000).unwrap();
    assert_eq!(ModDate::try_from(date).unwrap().to_pdf_string(), "D:20200913122640");
}
