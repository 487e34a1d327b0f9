use crate::model::{Language, QueryTimeAnalysis};

/// 把时间分析结果渲染成一段可以插进 LLM 指令里的文字，不做任何解析。
pub fn create_time_aware_prompt(query: &str, analysis: &QueryTimeAnalysis) -> String {
    let zh = analysis.language == Language::TraditionalChinese;
    let mut out = if zh {
        format!("用戶查詢: {query}\n\n")
    } else {
        format!("User query: {query}\n\n")
    };

    match (&analysis.time_range, analysis.has_time) {
        (Some(range), true) => {
            let syntax = format!(
                "{{'gte': '{}', 'lte': '{}'}}",
                range.lower_bound, range.upper_bound
            );
            let block = if zh {
                format!(
                    "檢測到時間範圍: {}\nOpenSearch時間格式: {syntax}\n\n請使用上述時間範圍構建OpenSearch查詢。\n",
                    range.description
                )
            } else {
                format!(
                    "Detected time range: {}\nOpenSearch time syntax: {syntax}\n\nUse the time range above when building the OpenSearch query.\n",
                    range.description
                )
            };
            out.push_str(&block);
        }
        _ if !analysis.suggestions.is_empty() => {
            out.push_str(if zh { "時間處理建議:\n" } else { "Time handling suggestions:\n" });
            for suggestion in &analysis.suggestions {
                out.push_str(&format!("- {suggestion}\n"));
            }
            out.push('\n');
        }
        _ => {}
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::TimeParser;

    #[test]
    fn prompt_with_detected_range() {
        let parser = TimeParser::new().unwrap();
        let analysis = parser.analyze_time_query("過去24小時 登入失敗");
        let prompt = create_time_aware_prompt("過去24小時 登入失敗", &analysis);
        assert!(prompt.starts_with("用戶查詢: 過去24小時 登入失敗\n\n"));
        assert!(prompt.contains("檢測到時間範圍: 過去24小時\n"));
        assert!(prompt.contains("{'gte': 'now-24h', 'lte': 'now'}"));
        assert!(prompt.ends_with("請使用上述時間範圍構建OpenSearch查詢。\n"));
    }

    #[test]
    fn prompt_with_suggestions() {
        let parser = TimeParser::new().unwrap();
        let analysis = parser.analyze_time_query("show failed logins");
        let prompt = create_time_aware_prompt("show failed logins", &analysis);
        assert!(prompt.contains("Time handling suggestions:\n"));
        assert_eq!(prompt.matches("\n- ").count(), 2);
        assert!(!prompt.contains("OpenSearch time syntax"));
        assert!(prompt.ends_with("'2025-07-01 to 2025-07-10'\n\n"));
    }

    #[test]
    fn english_prompt_layout() {
        let parser = TimeParser::new().unwrap();
        let analysis = parser.analyze_time_query("errors in the past 2 weeks");
        let prompt = create_time_aware_prompt("errors in the past 2 weeks", &analysis);
        assert_eq!(
            prompt,
            "User query: errors in the past 2 weeks\n\n\
             Detected time range: past 2 weeks\n\
             OpenSearch time syntax: {'gte': 'now-14d', 'lte': 'now'}\n\n\
             Use the time range above when building the OpenSearch query.\n"
        );
    }
}
