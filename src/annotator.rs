use chrono::{Datelike, Local};
use tracing::debug;

use crate::absolute::parse_absolute_in;
use crate::classifier::TimeParser;
use crate::model::{Language, QueryTimeAnalysis, TimeKind};
use crate::relative::relative_match_range;

fn absolute_hint(language: Language) -> String {
    match language {
        Language::TraditionalChinese => "檢測到日期格式，請提供完整的時間區間（開始時間和結束時間）",
        Language::English => "A date was detected; please provide a complete time range (start and end time)",
    }
    .to_string()
}

fn generic_hints(language: Language) -> Vec<String> {
    let hints: [&str; 2] = match language {
        Language::TraditionalChinese => [
            "可以使用相對時間：'過去24小時'、'過去7天'、'昨天'等",
            "或指定絕對時間區間：'2025-07-01 到 2025-07-10'",
        ],
        Language::English => [
            "Use a relative time such as 'past 24 hours', 'past 7 days' or 'yesterday'",
            "Or give an absolute range such as '2025-07-01 to 2025-07-10'",
        ],
    };
    hints.iter().map(|s| s.to_string()).collect()
}

impl TimeParser {
    /// 分析查询中的时间表达式。
    ///
    /// 相对时间优先；其次只要出现日期形状的片段就标记为 absolute 并提示补全区间
    /// （拆分起止由调用方负责，见 [`TimeParser::resolve`]）；都没有时给出两条通用提示。
    pub fn analyze_time_query(&self, query: &str) -> QueryTimeAnalysis {
        let language = self.language_for(query);

        if let Some(m) = self.classify_relative(query) {
            let range = relative_match_range(m, language);
            return QueryTimeAnalysis::with_range(range, TimeKind::Relative, language);
        }

        if self.has_absolute_indicator(query) {
            debug!(query, "absolute time hint without a full range");
            return QueryTimeAnalysis::without_range(
                TimeKind::Absolute,
                vec![absolute_hint(language)],
                language,
            );
        }

        QueryTimeAnalysis::without_range(TimeKind::None, generic_hints(language), language)
    }

    /// 完整的解析入口：能按“到”/“to”拆成两段且两段都是合法日期时返回绝对区间，
    /// 否则退回 [`TimeParser::analyze_time_query`]。
    pub fn resolve(&self, query: &str) -> QueryTimeAnalysis {
        let language = self.language_for(query);
        if let Some((start, end)) = self.split_range(query) {
            if let Some(range) = parse_absolute_in(&start, &end, Local::now().year(), language) {
                debug!(lower = %range.lower_bound, upper = %range.upper_bound, "absolute range resolved");
                return QueryTimeAnalysis::with_range(range, TimeKind::Absolute, language);
            }
        }
        self.analyze_time_query(query)
    }
}
