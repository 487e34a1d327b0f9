use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use tracing::warn;

use crate::classifier::TimeParser;
use crate::model::{Language, TimeRange};

/// 后端接受的绝对时间戳格式（ISO-8601，无时区）。
const BACKEND_TIMESTAMP: &str = "%Y-%m-%dT%H:%M:%S";
/// 描述里使用的展示格式。
const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, Copy)]
enum Shape {
    DateTime,
    Date,
}

struct AbsoluteFormat {
    pattern: &'static str,
    shape: Shape,
    has_year: bool,
}

const fn fmt(pattern: &'static str, shape: Shape, has_year: bool) -> AbsoluteFormat {
    AbsoluteFormat { pattern, shape, has_year }
}

/// 依次尝试，第一个成功的格式生效。
const ABSOLUTE_FORMATS: &[AbsoluteFormat] = &[
    fmt("%Y-%m-%d %H:%M:%S", Shape::DateTime, true),
    fmt("%Y-%m-%d %H:%M", Shape::DateTime, true),
    fmt("%Y-%m-%d", Shape::Date, true),
    fmt("%Y/%m/%d %H:%M:%S", Shape::DateTime, true),
    fmt("%Y/%m/%d %H:%M", Shape::DateTime, true),
    fmt("%Y/%m/%d", Shape::Date, true),
    fmt("%m-%d %H:%M", Shape::DateTime, false),
    fmt("%m/%d %H:%M", Shape::DateTime, false),
    fmt("%m-%d", Shape::Date, false),
    fmt("%m/%d", Shape::Date, false),
];

/// 解析单个日期时间字符串。缺年份的格式补上 `current_year`。
pub fn parse_datetime(text: &str, current_year: i32) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let full_year = has_four_digit_year(text);
    ABSOLUTE_FORMATS.iter().find_map(|f| {
        if f.has_year {
            // chrono 的 %Y 接受任意位数和正负号，这里只认 4 位年份
            full_year.then(|| parse_with(text, f.pattern, f.shape)).flatten()
        } else {
            let with_year = format!("{current_year} {text}");
            let pattern = format!("%Y {}", f.pattern);
            parse_with(&with_year, &pattern, f.shape)
        }
    })
}

/// 开头必须是 4 位 ASCII 数字年份，后接 `-` 或 `/`。
fn has_four_digit_year(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() > 4 && bytes[..4].iter().all(u8::is_ascii_digit) && matches!(bytes[4], b'-' | b'/')
}

fn parse_with(text: &str, pattern: &str, shape: Shape) -> Option<NaiveDateTime> {
    match shape {
        Shape::DateTime => NaiveDateTime::parse_from_str(text, pattern).ok(),
        Shape::Date => NaiveDate::parse_from_str(text, pattern)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0)),
    }
}

/// 解析起止两个字符串为绝对区间，任一端失败则整体返回 `None`。
pub fn parse_absolute(start_text: &str, end_text: &str) -> Option<TimeRange> {
    parse_absolute_in(
        start_text,
        end_text,
        Local::now().year(),
        Language::TraditionalChinese,
    )
}

pub fn parse_absolute_in(
    start_text: &str,
    end_text: &str,
    current_year: i32,
    language: Language,
) -> Option<TimeRange> {
    let Some(start) = parse_datetime(start_text, current_year) else {
        warn!(input = start_text, "无法解析开始时间");
        return None;
    };
    let Some(end) = parse_datetime(end_text, current_year) else {
        warn!(input = end_text, "无法解析结束时间");
        return None;
    };

    let (from, to) = (start.format(DISPLAY_FORMAT), end.format(DISPLAY_FORMAT));
    let description = match language {
        Language::TraditionalChinese => format!("從 {from} 到 {to}"),
        Language::English => format!("from {from} to {to}"),
    };

    Some(TimeRange::new(
        start.format(BACKEND_TIMESTAMP).to_string(),
        end.format(BACKEND_TIMESTAMP).to_string(),
        description,
    ))
}

impl TimeParser {
    /// 按解析器的语言设置解析绝对区间；未固定语言时按两段文本判断。
    pub fn parse_absolute_time(&self, start_text: &str, end_text: &str) -> Option<TimeRange> {
        let language = self.language_for(&format!("{start_text} {end_text}"));
        parse_absolute_in(start_text, end_text, Local::now().year(), language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_every_format_family() {
        let cases = [
            ("2025-07-01 08:30:15", "2025-07-01T08:30:15"),
            ("2025-07-01 08:30", "2025-07-01T08:30:00"),
            ("2025-07-01", "2025-07-01T00:00:00"),
            ("2025/07/01 08:30:15", "2025-07-01T08:30:15"),
            ("2025/07/01 08:30", "2025-07-01T08:30:00"),
            ("2025/7/1", "2025-07-01T00:00:00"),
            ("07-01 08:30", "2024-07-01T08:30:00"),
            ("07/01 08:30", "2024-07-01T08:30:00"),
            ("07-01", "2024-07-01T00:00:00"),
            ("  07/01 ", "2024-07-01T00:00:00"),
        ];
        for (input, expected) in cases {
            let dt = parse_datetime(input, 2024).unwrap_or_else(|| panic!("failed on {input}"));
            assert_eq!(dt.format(BACKEND_TIMESTAMP).to_string(), expected);
        }
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(parse_datetime("2025-13-01", 2025).is_none());
        assert!(parse_datetime("2025-02-30", 2025).is_none());
        assert!(parse_datetime("07-01 25:00", 2025).is_none());
        assert!(parse_datetime("yesterday", 2025).is_none());
        assert!(parse_datetime("", 2025).is_none());
    }

    #[test]
    fn short_or_signed_years_are_rejected() {
        assert!(parse_datetime("25-07-01", 2025).is_none());
        assert!(parse_datetime("7/1/2", 2025).is_none());
        assert!(parse_datetime("+2025-07-01", 2025).is_none());
        assert!(parse_datetime("02025-07-01", 2025).is_none());
        assert!(parse_absolute_in("25-07-01", "25-07-10", 2025, Language::English).is_none());
    }

    #[test]
    fn yearless_leap_day_uses_current_year() {
        assert!(parse_datetime("02-29", 2024).is_some());
        assert!(parse_datetime("02-29", 2025).is_none());
    }

    #[test]
    fn full_range_and_description() {
        let range = parse_absolute_in("2025-07-01", "2025-07-10 18:00", 2025, Language::TraditionalChinese).unwrap();
        assert_eq!(range.lower_bound, "2025-07-01T00:00:00");
        assert_eq!(range.upper_bound, "2025-07-10T18:00:00");
        assert_eq!(range.description, "從 2025-07-01 00:00 到 2025-07-10 18:00");

        let en = parse_absolute_in("07/01", "07/10", 2025, Language::English).unwrap();
        assert_eq!(en.description, "from 2025-07-01 00:00 to 2025-07-10 00:00");
    }

    #[test]
    fn one_bad_bound_fails_whole_range() {
        assert!(parse_absolute_in("2025-13-01", "2025-07-10", 2025, Language::English).is_none());
        assert!(parse_absolute_in("2025-07-01", "later", 2025, Language::English).is_none());
    }
}
