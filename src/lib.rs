//! 查询时间表达式解析核心库
//! 把自然语言（繁体中文/英文）查询里的时间描述转换成搜索后端的时间范围语法。

pub mod config;
pub mod error;
pub mod model;
pub mod classifier;
pub mod relative;
pub mod absolute;
pub mod annotator;
pub mod prompt;
pub mod service;
pub mod http;
pub mod mcp;

pub use absolute::{parse_absolute, parse_absolute_in, parse_datetime};
pub use classifier::TimeParser;
pub use model::{
    Language, NamedPeriod, QueryTimeAnalysis, RelativeMatch, TimeKind, TimeRange, TimeUnit,
};
pub use prompt::create_time_aware_prompt;
pub use relative::{named_period_range, named_period_range_in, relative_range_in, to_relative_range};
