//! ListSQLScriptRuns.

use serde::Serialize;
use serde_json::Value;

use super::DataResponse;
use crate::client::WeDataClient;
use crate::error::ProviderError;

/// Filters of ListSQLScriptRuns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListSqlScriptRunsRequest {
    pub project_id: String,
    pub script_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_word: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execute_user_uin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

impl WeDataClient {
    /// List the runs of one SQL script. The reply is a plain array.
    pub async fn list_sql_script_runs(
        &self,
        filters: &ListSqlScriptRunsRequest,
    ) -> Result<Vec<Value>, ProviderError> {
        let response: DataResponse<Vec<Value>> = self.request("ListSQLScriptRuns", filters).await?;
        Ok(response.data.unwrap_or_default())
    }
}
