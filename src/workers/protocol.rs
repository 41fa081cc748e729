//! Worker message protocol
//!
//! Requests travel as `{taskId, type, payload}` and answers as
//! `{taskId, result}` or `{taskId, error}`. Inside the crate the `type`
//! string never escapes: it selects a [`Task`] variant at the boundary and
//! each variant carries its own typed payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::workers::analytics::{
    calculate_analytics, calculate_earnings, calculate_revenue, AnalyticsResult, AnalyticsTask,
    EarningsResult,
};
use crate::workers::data_filter::{filter_data, search_items, sort_data, DataFilterTask, SearchTask, SortTask};
use crate::workers::hotel_search::{filter_hotels, HotelFilterResult, HotelFilterTask};
use crate::workers::stats::{calculate_stats, DashboardStats, StatsTask};

/// Identifier correlating a response with its request.
pub type TaskId = String;

pub fn new_task_id() -> TaskId {
    Uuid::new_v4().to_string()
}

// == Task ==
/// One unit of offloaded work.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum Task {
    /// Hotel search filter (text, price, stars, amenities, availability)
    Filter(HotelFilterTask),
    /// Generic search/filter/sort over arbitrary JSON records
    FilterData(DataFilterTask),
    Sort(SortTask),
    Search(SearchTask),
    Analytics(AnalyticsTask),
    Earnings(AnalyticsTask),
    Revenue(AnalyticsTask),
    /// Dashboard overview numbers
    Stats(StatsTask),
}

impl Task {
    pub fn kind(&self) -> &'static str {
        match self {
            Task::Filter(_) => "filter",
            Task::FilterData(_) => "filter-data",
            Task::Sort(_) => "sort",
            Task::Search(_) => "search",
            Task::Analytics(_) => "analytics",
            Task::Earnings(_) => "earnings",
            Task::Revenue(_) => "revenue",
            Task::Stats(_) => "stats",
        }
    }

    /// Runs the computation. Time-dependent tasks read the clock here.
    pub fn execute(self) -> TaskOutput {
        match self {
            Task::Filter(task) => TaskOutput::Hotels(filter_hotels(task)),
            Task::FilterData(task) => TaskOutput::Items(filter_data(task)),
            Task::Sort(task) => TaskOutput::Items(sort_data(task)),
            Task::Search(task) => TaskOutput::Items(search_items(task)),
            Task::Analytics(task) => TaskOutput::Analytics(calculate_analytics(task)),
            Task::Earnings(task) => TaskOutput::Earnings(calculate_earnings(task)),
            Task::Revenue(task) => TaskOutput::Revenue(calculate_revenue(task)),
            Task::Stats(task) => {
                TaskOutput::Stats(calculate_stats(task, chrono::Utc::now().naive_utc()))
            }
        }
    }
}

// == Task Output ==
/// Result of a task; the variant follows from the task kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TaskOutput {
    Hotels(HotelFilterResult),
    Items(Vec<Value>),
    Analytics(AnalyticsResult),
    Earnings(EarningsResult),
    Revenue(f64),
    Stats(DashboardStats),
}

impl TaskOutput {
    pub fn kind(&self) -> &'static str {
        match self {
            TaskOutput::Hotels(_) => "hotels",
            TaskOutput::Items(_) => "items",
            TaskOutput::Analytics(_) => "analytics",
            TaskOutput::Earnings(_) => "earnings",
            TaskOutput::Revenue(_) => "revenue",
            TaskOutput::Stats(_) => "stats",
        }
    }
}

// == Request ==
/// A task tagged with the id its response will carry.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "TaskEnvelope")]
pub struct TaskRequest {
    pub task_id: TaskId,
    pub task: Task,
}

impl TaskRequest {
    /// Wraps a task under a freshly generated id.
    pub fn new(task: Task) -> Self {
        Self {
            task_id: new_task_id(),
            task,
        }
    }

    pub fn with_id(task_id: impl Into<TaskId>, task: Task) -> Self {
        Self {
            task_id: task_id.into(),
            task,
        }
    }
}

/// Wire shape of a request before its `type` tag is resolved.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskEnvelope {
    #[serde(default)]
    pub task_id: Option<TaskId>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
}

impl TaskEnvelope {
    /// Resolves the task, generating an id when none was sent. A task that
    /// cannot be decoded becomes a failed response under that same id.
    pub fn into_request(self) -> std::result::Result<TaskRequest, TaskResponse> {
        let task_id = self.task_id.unwrap_or_else(new_task_id);
        match decode_task(&self.kind, self.payload) {
            Ok(task) => Ok(TaskRequest { task_id, task }),
            Err(e) => Err(TaskResponse::failed(task_id, e.to_string())),
        }
    }
}

impl TryFrom<TaskEnvelope> for TaskRequest {
    type Error = String;

    fn try_from(envelope: TaskEnvelope) -> std::result::Result<Self, Self::Error> {
        envelope.into_request().map_err(|response| match response.outcome {
            TaskOutcome::Error(message) => message,
            TaskOutcome::Result(_) => "Invalid task".to_string(),
        })
    }
}

/// Resolves a `type` tag and payload into a typed task.
pub fn decode_task(kind: &str, payload: Value) -> Result<Task> {
    serde_json::from_value(serde_json::json!({ "type": kind, "payload": payload })).map_err(|e| {
        Error::InvalidRequest(format!("Invalid '{}' task: {}", kind, e))
    })
}

impl Serialize for TaskRequest {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Wire<'a> {
            task_id: &'a str,
            #[serde(flatten)]
            task: &'a Task,
        }

        Wire {
            task_id: &self.task_id,
            task: &self.task,
        }
        .serialize(serializer)
    }
}

// == Response ==
/// A worker's answer, correlated by `task_id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub task_id: TaskId,
    #[serde(flatten)]
    pub outcome: TaskOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskOutcome {
    Result(TaskOutput),
    Error(String),
}

impl TaskResponse {
    pub fn ok(task_id: TaskId, output: TaskOutput) -> Self {
        Self {
            task_id,
            outcome: TaskOutcome::Result(output),
        }
    }

    pub fn failed(task_id: TaskId, message: impl Into<String>) -> Self {
        Self {
            task_id,
            outcome: TaskOutcome::Error(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, TaskOutcome::Error(_))
    }

    /// Converts a failure into [`Error::Task`] carrying the task id.
    pub fn into_result(self) -> Result<TaskOutput> {
        match self.outcome {
            TaskOutcome::Result(output) => Ok(output),
            TaskOutcome::Error(message) => Err(Error::Task {
                task_id: self.task_id,
                message,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_decodes_type_and_payload() {
        let request: TaskRequest = serde_json::from_value(json!({
            "taskId": "t-1",
            "type": "revenue",
            "payload": {"bookings": []}
        }))
        .unwrap();

        assert_eq!(request.task_id, "t-1");
        assert_eq!(request.task.kind(), "revenue");
    }

    #[test]
    fn test_request_without_id_gets_one() {
        let request: TaskRequest = serde_json::from_value(json!({
            "type": "sort",
            "payload": {"data": [], "sortBy": "name"}
        }))
        .unwrap();

        assert!(!request.task_id.is_empty());
    }

    #[test]
    fn test_filter_task_with_string_prices_decodes() {
        let task = decode_task(
            "filter",
            json!({
                "hotels": [{"id": 1, "minPrice": "120.00"}, {"id": 2, "minPrice": 300}],
                "filters": {"maxPrice": 150}
            }),
        )
        .unwrap();

        match task.execute() {
            TaskOutput::Hotels(result) => {
                assert_eq!(result.count, 1);
                assert_eq!(result.hotels[0].id, Some(1));
            }
            other => panic!("unexpected output: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_task_type_is_rejected() {
        let result = serde_json::from_value::<TaskRequest>(json!({
            "taskId": "t-2",
            "type": "compress",
            "payload": {}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_undecodable_envelope_fails_under_its_id() {
        let envelope: TaskEnvelope = serde_json::from_value(json!({
            "taskId": "t-7",
            "type": "compress",
            "payload": {}
        }))
        .unwrap();

        let response = envelope.into_request().unwrap_err();
        assert_eq!(response.task_id, "t-7");
        assert!(response.is_error());
    }

    #[test]
    fn test_request_serializes_to_wire_shape() {
        let request = TaskRequest::with_id(
            "t-3",
            Task::Revenue(crate::workers::analytics::AnalyticsTask::default()),
        );
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["taskId"], json!("t-3"));
        assert_eq!(value["type"], json!("revenue"));
        assert!(value["payload"].is_object());
    }

    #[test]
    fn test_response_wire_shapes() {
        let ok = TaskResponse::ok("a".to_string(), TaskOutput::Revenue(12.5));
        let failed = TaskResponse::failed("b".to_string(), "boom");

        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"taskId": "a", "result": 12.5})
        );
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({"taskId": "b", "error": "boom"})
        );
    }

    #[test]
    fn test_failed_response_into_result_keeps_task_id() {
        let err = TaskResponse::failed("b".to_string(), "boom")
            .into_result()
            .unwrap_err();
        assert!(matches!(err, Error::Task { ref task_id, .. } if task_id == "b"));
    }
}
