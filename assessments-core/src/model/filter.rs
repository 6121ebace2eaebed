//! List filter accepted by the list operation

use serde::{Deserialize, Serialize};

/// Allowed list filters. Unknown keys fail deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListFilter {
    pub course_id: Option<String>,
    pub year: Option<i32>,
    /// 1-12, only meaningful together with `year`
    pub month: Option<u32>,
}

/// Body of a list request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListAssessmentsRequest {
    #[serde(default)]
    pub filters: ListFilter,
}
