use serde::Deserialize;
use ts_rs::TS;

// 提交审核决定请求
//
// decision 保持原始字符串，由审核引擎区分 InvalidArgument 与 ValidationError；
// score 使用 JSON 值，以便非整数分数也能得到明确的校验错误。
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/review.ts")]
pub struct ReviewRequest {
    pub decision: String,
    #[serde(flatten)]
    pub payload: ReviewPayload,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/review.ts")]
pub struct ReviewPayload {
    #[serde(default)]
    pub score: Option<serde_json::Value>,
    #[serde(default)]
    pub reject_reason: Option<String>,
}

impl ReviewPayload {
    pub fn approve(score: i64) -> Self {
        Self {
            score: Some(serde_json::Value::from(score)),
            reject_reason: None,
        }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            score: None,
            reject_reason: Some(reason.into()),
        }
    }
}
