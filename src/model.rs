use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// 数值型相对时间的粒度。weeks/months 在后端语法里没有对应单位，会折算成天。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    Hours,
    Days,
    Weeks,
    Months,
}

impl TimeUnit {
    /// 折算到后端单位：(倍数, 单位后缀)。月按 30 天近似。
    pub fn backend_factor(self) -> (u64, char) {
        match self {
            TimeUnit::Hours => (1, 'h'),
            TimeUnit::Days => (1, 'd'),
            TimeUnit::Weeks => (7, 'd'),
            TimeUnit::Months => (30, 'd'),
        }
    }
}

/// 不带数量的固定时段。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedPeriod {
    Today,
    Yesterday,
    LastWeek,
    LastMonth,
}

/// 描述文字与建议使用的语言。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "zh_tw", alias = "zh-TW", alias = "zh")]
    TraditionalChinese,
    #[serde(rename = "en")]
    English,
}

impl Language {
    /// 只要出现 CJK 字符就视为中文查询，否则按英文处理。
    pub fn detect(text: &str) -> Self {
        let has_cjk = text.chars().any(|c| {
            matches!(c, '\u{3400}'..='\u{4DBF}' | '\u{4E00}'..='\u{9FFF}' | '\u{F900}'..='\u{FAFF}')
        });
        if has_cjk {
            Language::TraditionalChinese
        } else {
            Language::English
        }
    }
}

/// 分类器的命中结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeMatch {
    Quantity { quantity: u32, unit: TimeUnit },
    Named(NamedPeriod),
}

/// 时间范围。上下界既可以是相对表达式（`now-24h`），也可以是 ISO-8601 时间戳。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub lower_bound: String,
    pub upper_bound: String,
    pub description: String,
}

impl TimeRange {
    pub fn new(
        lower_bound: impl Into<String>,
        upper_bound: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            lower_bound: lower_bound.into(),
            upper_bound: upper_bound.into(),
            description: description.into(),
        }
    }

    /// 生成后端的 range 查询片段：`{"range": {field: {"gte": .., "lte": ..}}}`。
    pub fn range_clause(&self, field: &str) -> Value {
        json!({
            "range": {
                field: {
                    "gte": self.lower_bound,
                    "lte": self.upper_bound,
                }
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeKind {
    Relative,
    Absolute,
    None,
}

/// 单次查询的时间分析结果，用完即弃。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryTimeAnalysis {
    pub has_time: bool,
    pub time_range: Option<TimeRange>,
    #[serde(rename = "type")]
    pub kind: TimeKind,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub language: Language,
}

impl QueryTimeAnalysis {
    pub fn with_range(range: TimeRange, kind: TimeKind, language: Language) -> Self {
        Self {
            has_time: true,
            time_range: Some(range),
            kind,
            suggestions: Vec::new(),
            language,
        }
    }

    pub fn without_range(kind: TimeKind, suggestions: Vec<String>, language: Language) -> Self {
        Self {
            has_time: false,
            time_range: None,
            kind,
            suggestions,
            language,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_language_by_cjk() {
        assert_eq!(Language::detect("過去24小時"), Language::TraditionalChinese);
        assert_eq!(Language::detect("past 7 days"), Language::English);
        assert_eq!(Language::detect("3d 登入失敗"), Language::TraditionalChinese);
    }

    #[test]
    fn range_clause_uses_field_name() {
        let range = TimeRange::new("now-3d", "now", "過去3天");
        let clause = range.range_clause("@timestamp");
        assert_eq!(clause["range"]["@timestamp"]["gte"], "now-3d");
        assert_eq!(clause["range"]["@timestamp"]["lte"], "now");
    }

    #[test]
    fn analysis_serializes_kind_as_type() {
        let analysis = QueryTimeAnalysis::without_range(TimeKind::None, vec![], Language::English);
        let v = serde_json::to_value(&analysis).unwrap();
        assert_eq!(v["type"], "none");
        assert_eq!(v["language"], "en");
        assert!(v["time_range"].is_null());
    }
}
