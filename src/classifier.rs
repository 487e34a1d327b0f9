use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::error::{Result, TimeQueryError};
use crate::model::{Language, NamedPeriod, RelativeMatch, TimeUnit};

/// 固定时段关键词，先于数值扫描检查。
const NAMED_PATTERNS: &[(&str, NamedPeriod)] = &[
    (r"今天|today", NamedPeriod::Today),
    (r"昨天|yesterday", NamedPeriod::Yesterday),
    (r"上週|last week", NamedPeriod::LastWeek),
    (r"上月|last month", NamedPeriod::LastMonth),
];

/// 数值相对时间表。模式之间可能重叠，顺序即优先级，不要调整。
const RELATIVE_PATTERNS: &[(&str, TimeUnit)] = &[
    (r"過去\s*(\d+)\s*小時", TimeUnit::Hours),
    (r"最近\s*(\d+)\s*小時", TimeUnit::Hours),
    (r"(\d+)\s*小時內", TimeUnit::Hours),
    (r"(\d+)\s*h", TimeUnit::Hours),
    (r"(\d+)\s*hour[s]?", TimeUnit::Hours),
    (r"過去\s*(\d+)\s*天", TimeUnit::Days),
    (r"最近\s*(\d+)\s*天", TimeUnit::Days),
    (r"(\d+)\s*天內", TimeUnit::Days),
    (r"(\d+)\s*d", TimeUnit::Days),
    (r"(\d+)\s*day[s]?", TimeUnit::Days),
    (r"過去\s*(\d+)\s*週", TimeUnit::Weeks),
    (r"最近\s*(\d+)\s*週", TimeUnit::Weeks),
    (r"(\d+)\s*週內", TimeUnit::Weeks),
    (r"(\d+)\s*w", TimeUnit::Weeks),
    (r"(\d+)\s*week[s]?", TimeUnit::Weeks),
    (r"過去\s*(\d+)\s*月", TimeUnit::Months),
    (r"最近\s*(\d+)\s*月", TimeUnit::Months),
    (r"(\d+)\s*月內", TimeUnit::Months),
    (r"(\d+)\s*M", TimeUnit::Months),
    (r"(\d+)\s*month[s]?", TimeUnit::Months),
];

/// 绝对日期线索：只用于判断查询里是否出现了日期形状的片段。
const ABSOLUTE_INDICATORS: &[&str] = &[
    r"\d{4}-\d{2}-\d{2}",
    r"\d{4}/\d{2}/\d{2}",
    r"\d{2}-\d{2}",
    r"\d{2}/\d{2}",
];

/// 区间分隔符：中文“到”或独立的单词 to。
const RANGE_DELIMITER: &str = r"到|\bto\b";

/// 时间表达式解析器。
///
/// 构造后只持有不可变的模式表，可以放进 `Arc` 在多个请求之间共享，无需加锁。
#[derive(Debug, Clone)]
pub struct TimeParser {
    pub(crate) named_patterns: Vec<(Regex, NamedPeriod)>,
    pub(crate) relative_patterns: Vec<(Regex, TimeUnit)>,
    pub(crate) absolute_indicators: Vec<Regex>,
    pub(crate) range_delimiter: Regex,
    pub(crate) language: Option<Language>,
}

impl TimeParser {
    pub fn new() -> Result<Self> {
        Self::with_language(None)
    }

    /// `language` 为 `None` 时按查询内容自动判断描述语言。
    pub fn with_language(language: Option<Language>) -> Result<Self> {
        let named_patterns = NAMED_PATTERNS
            .iter()
            .map(|(p, period)| compile(p).map(|re| (re, *period)))
            .collect::<Result<Vec<_>>>()?;
        let relative_patterns = RELATIVE_PATTERNS
            .iter()
            .map(|(p, unit)| compile(p).map(|re| (re, *unit)))
            .collect::<Result<Vec<_>>>()?;
        let absolute_indicators = ABSOLUTE_INDICATORS
            .iter()
            .map(|p| compile(p))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            named_patterns,
            relative_patterns,
            absolute_indicators,
            range_delimiter: compile(RANGE_DELIMITER)?,
            language,
        })
    }

    /// 识别相对时间表达式。
    ///
    /// 固定时段优先；否则按表顺序扫描数值模式，返回第一个能取出整数的命中。
    /// 数字无法解析（例如超出范围）时跳过该模式继续扫描。
    pub fn classify_relative(&self, text: &str) -> Option<RelativeMatch> {
        let text = text.trim();

        for (re, period) in &self.named_patterns {
            if re.is_match(text) {
                debug!(?period, "named period matched");
                return Some(RelativeMatch::Named(*period));
            }
        }

        for (re, unit) in &self.relative_patterns {
            let Some(caps) = re.captures(text) else {
                continue;
            };
            let Some(digits) = caps.get(1) else {
                continue;
            };
            match fold_digits(digits.as_str()).parse::<u32>() {
                Ok(quantity) => {
                    debug!(quantity, ?unit, pattern = re.as_str(), "relative time matched");
                    return Some(RelativeMatch::Quantity { quantity, unit: *unit });
                }
                Err(e) => {
                    debug!(digits = digits.as_str(), error = %e, "quantity not usable, trying next pattern");
                }
            }
        }

        None
    }

    /// 查询中是否含有日期形状的片段（`2025-07-01`、`07/01` 之类）。
    pub fn has_absolute_indicator(&self, text: &str) -> bool {
        self.absolute_indicators.iter().any(|re| re.is_match(text))
    }

    /// 按“到”/“to”把查询拆成起止两段，恰好两段且都非空时才返回。
    pub fn split_range(&self, query: &str) -> Option<(String, String)> {
        let parts: Vec<&str> = self.range_delimiter.split(query).collect();
        match parts.as_slice() {
            [start, end] => {
                let (start, end) = (start.trim(), end.trim());
                if start.is_empty() || end.is_empty() {
                    None
                } else {
                    Some((start.to_string(), end.to_string()))
                }
            }
            _ => None,
        }
    }

    pub(crate) fn language_for(&self, text: &str) -> Language {
        self.language.unwrap_or_else(|| Language::detect(text))
    }
}

/// 全角数字（输入法常见）折成 ASCII，其余字符原样保留。
fn fold_digits(digits: &str) -> String {
    digits
        .chars()
        .map(|c| match c {
            '\u{FF10}'..='\u{FF19}' => char::from(b'0' + (c as u32 - 0xFF10) as u8),
            _ => c,
        })
        .collect()
}

fn compile(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| TimeQueryError::RegexError {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}
