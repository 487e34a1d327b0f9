use crate::classifier::TimeParser;
use crate::model::{Language, NamedPeriod, RelativeMatch, TimeRange, TimeUnit};

/// 数值相对时间 → 后端相对时间语法，描述默认繁体中文。
pub fn to_relative_range(quantity: u32, unit: TimeUnit) -> TimeRange {
    relative_range_in(quantity, unit, Language::TraditionalChinese)
}

/// 周按 7 天、月按 30 天折算，描述仍保留输入时的粒度（“過去2週”而不是“過去14天”）。
pub fn relative_range_in(quantity: u32, unit: TimeUnit, language: Language) -> TimeRange {
    let (factor, suffix) = unit.backend_factor();
    let amount = u64::from(quantity) * factor;
    TimeRange::new(
        format!("now-{amount}{suffix}"),
        "now",
        describe_quantity(quantity, unit, language),
    )
}

/// 固定时段查表。
pub fn named_period_range(period: NamedPeriod) -> TimeRange {
    named_period_range_in(period, Language::TraditionalChinese)
}

pub fn named_period_range_in(period: NamedPeriod, language: Language) -> TimeRange {
    let (lower, upper) = match period {
        NamedPeriod::Today => ("now/d", "now"),
        NamedPeriod::Yesterday => ("now-1d/d", "now-1d/d+1d"),
        NamedPeriod::LastWeek => ("now-7d", "now"),
        NamedPeriod::LastMonth => ("now-30d", "now"),
    };
    let description = match (period, language) {
        (NamedPeriod::Today, Language::TraditionalChinese) => "今天",
        (NamedPeriod::Yesterday, Language::TraditionalChinese) => "昨天",
        (NamedPeriod::LastWeek, Language::TraditionalChinese) => "過去一週",
        (NamedPeriod::LastMonth, Language::TraditionalChinese) => "過去一個月",
        (NamedPeriod::Today, Language::English) => "today",
        (NamedPeriod::Yesterday, Language::English) => "yesterday",
        (NamedPeriod::LastWeek, Language::English) => "past week",
        (NamedPeriod::LastMonth, Language::English) => "past month",
    };
    TimeRange::new(lower, upper, description)
}

fn describe_quantity(quantity: u32, unit: TimeUnit, language: Language) -> String {
    match language {
        Language::TraditionalChinese => {
            let label = match unit {
                TimeUnit::Hours => "小時",
                TimeUnit::Days => "天",
                TimeUnit::Weeks => "週",
                TimeUnit::Months => "個月",
            };
            format!("過去{quantity}{label}")
        }
        Language::English => {
            let label = match unit {
                TimeUnit::Hours => "hour",
                TimeUnit::Days => "day",
                TimeUnit::Weeks => "week",
                TimeUnit::Months => "month",
            };
            let plural = if quantity == 1 { "" } else { "s" };
            format!("past {quantity} {label}{plural}")
        }
    }
}

impl TimeParser {
    /// 识别并转换相对时间，未命中返回 `None`。
    pub fn parse_relative_time(&self, text: &str) -> Option<TimeRange> {
        let language = self.language_for(text);
        self.classify_relative(text)
            .map(|m| relative_match_range(m, language))
    }
}

pub(crate) fn relative_match_range(m: RelativeMatch, language: Language) -> TimeRange {
    match m {
        RelativeMatch::Quantity { quantity, unit } => relative_range_in(quantity, unit, language),
        RelativeMatch::Named(period) => named_period_range_in(period, language),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hours_and_days_pass_through() {
        for n in [0u32, 1, 24, 365] {
            let h = to_relative_range(n, TimeUnit::Hours);
            assert_eq!(h.lower_bound, format!("now-{n}h"));
            assert_eq!(h.upper_bound, "now");
            let d = to_relative_range(n, TimeUnit::Days);
            assert_eq!(d.lower_bound, format!("now-{n}d"));
            assert_eq!(d.upper_bound, "now");
        }
    }

    #[test]
    fn weeks_and_months_fold_into_days() {
        assert_eq!(to_relative_range(2, TimeUnit::Weeks).lower_bound, "now-14d");
        assert_eq!(to_relative_range(3, TimeUnit::Months).lower_bound, "now-90d");
        let big = to_relative_range(u32::MAX, TimeUnit::Months);
        assert_eq!(big.lower_bound, format!("now-{}d", u64::from(u32::MAX) * 30));
    }

    #[test]
    fn description_keeps_input_granularity() {
        assert_eq!(to_relative_range(2, TimeUnit::Weeks).description, "過去2週");
        assert_eq!(to_relative_range(3, TimeUnit::Months).description, "過去3個月");
        assert_eq!(
            relative_range_in(1, TimeUnit::Weeks, Language::English).description,
            "past 1 week"
        );
        assert_eq!(
            relative_range_in(24, TimeUnit::Hours, Language::English).description,
            "past 24 hours"
        );
    }

    #[test]
    fn named_period_table() {
        let y = named_period_range(NamedPeriod::Yesterday);
        assert_eq!((y.lower_bound.as_str(), y.upper_bound.as_str()), ("now-1d/d", "now-1d/d+1d"));
        let y_en = named_period_range_in(NamedPeriod::Yesterday, Language::English);
        assert_eq!((y_en.lower_bound.as_str(), y_en.upper_bound.as_str()), ("now-1d/d", "now-1d/d+1d"));

        assert_eq!(named_period_range(NamedPeriod::Today).lower_bound, "now/d");
        assert_eq!(named_period_range(NamedPeriod::LastWeek).lower_bound, "now-7d");
        assert_eq!(named_period_range(NamedPeriod::LastMonth).lower_bound, "now-30d");
        assert_eq!(named_period_range(NamedPeriod::LastMonth).description, "過去一個月");
    }

    #[test]
    fn parse_relative_time_uses_detected_language() {
        let p = TimeParser::new().unwrap();
        let zh = p.parse_relative_time("過去24小時").unwrap();
        assert_eq!(zh.lower_bound, "now-24h");
        assert_eq!(zh.description, "過去24小時");

        let en = p.parse_relative_time("past 7 days").unwrap();
        assert_eq!(en.lower_bound, "now-7d");
        assert_eq!(en.description, "past 7 days");

        assert!(p.parse_relative_time("hello world").is_none());
    }
}
