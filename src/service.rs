use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::classifier::TimeParser;
use crate::config::TimeConfig;
use crate::error::Result;
use crate::model::{QueryTimeAnalysis, TimeRange};
use crate::prompt::create_time_aware_prompt;

/// 对外服务层：包装解析器，并把结果补上后端 range 子句。MCP 与 HTTP 共用。
#[derive(Debug, Clone)]
pub struct TimeService {
    parser: TimeParser,
    timestamp_field: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    #[serde(flatten)]
    pub analysis: QueryTimeAnalysis,
    pub range_clause: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbsoluteResponse {
    pub time_range: Option<TimeRange>,
    pub range_clause: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptResponse {
    pub prompt: String,
    pub analysis: QueryTimeAnalysis,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryParams {
    pub query: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AbsoluteParams {
    #[serde(alias = "start_time", alias = "startTime")]
    pub start: String,
    #[serde(alias = "end_time", alias = "endTime")]
    pub end: String,
}

impl TimeService {
    pub fn new(config: &TimeConfig) -> Result<Self> {
        let parser = TimeParser::with_language(config.language)?;
        info!(field = %config.timestamp_field, language = ?config.language, "time parser ready");
        Ok(Self {
            parser,
            timestamp_field: config.timestamp_field.clone(),
        })
    }

    pub fn parser(&self) -> &TimeParser {
        &self.parser
    }

    pub fn analyze(&self, query: &str) -> AnalysisResponse {
        self.with_clause(self.parser.analyze_time_query(query))
    }

    pub fn resolve(&self, query: &str) -> AnalysisResponse {
        self.with_clause(self.parser.resolve(query))
    }

    pub fn absolute(&self, start: &str, end: &str) -> AbsoluteResponse {
        let time_range = self.parser.parse_absolute_time(start, end);
        let range_clause = time_range
            .as_ref()
            .map(|r| r.range_clause(&self.timestamp_field));
        AbsoluteResponse { time_range, range_clause }
    }

    pub fn prompt(&self, query: &str) -> PromptResponse {
        let analysis = self.parser.analyze_time_query(query);
        PromptResponse {
            prompt: create_time_aware_prompt(query, &analysis),
            analysis,
        }
    }

    fn with_clause(&self, analysis: QueryTimeAnalysis) -> AnalysisResponse {
        let range_clause = analysis
            .time_range
            .as_ref()
            .map(|r| r.range_clause(&self.timestamp_field));
        AnalysisResponse { analysis, range_clause }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TimeKind;

    #[test]
    fn analysis_carries_range_clause_for_configured_field() {
        let cfg = TimeConfig {
            timestamp_field: "event.created".to_string(),
            language: None,
        };
        let svc = TimeService::new(&cfg).unwrap();
        let resp = svc.analyze("過去24小時");
        let clause = resp.range_clause.unwrap();
        assert_eq!(clause["range"]["event.created"]["gte"], "now-24h");

        let json = serde_json::to_value(svc.analyze("hello")).unwrap();
        assert_eq!(json["type"], "none");
        assert!(json["range_clause"].is_null());
    }

    #[test]
    fn absolute_without_result_is_empty_not_error() {
        let svc = TimeService::new(&TimeConfig::default()).unwrap();
        let resp = svc.absolute("2025-13-01", "2025-07-10");
        assert!(resp.time_range.is_none());
        assert!(resp.range_clause.is_none());

        let ok = svc.absolute("2025-07-01", "2025-07-10");
        assert_eq!(ok.time_range.unwrap().lower_bound, "2025-07-01T00:00:00");
    }

    #[test]
    fn resolve_reports_absolute_kind() {
        let svc = TimeService::new(&TimeConfig::default()).unwrap();
        let resp = svc.resolve("2025/07/01 to 2025/07/02");
        assert_eq!(resp.analysis.kind, TimeKind::Absolute);
        assert!(resp.range_clause.is_some());
    }
}
