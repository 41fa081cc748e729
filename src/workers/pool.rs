//! Worker Pool
//!
//! A fixed set of workers fed from one shared queue. Every request is moved
//! into the queue together with a oneshot reply channel, so workers never
//! share state with callers or with each other. CPU-bound work runs on the
//! blocking thread pool.

use std::any::Any;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::{Booking, Hotel, PeriodFilters};
use crate::workers::analytics::{AnalyticsResult, AnalyticsTask, EarningsResult};
use crate::workers::data_filter::{DataFilterTask, FilterOptions, SearchTask, SortOrder, SortTask};
use crate::workers::hotel_search::{HotelFilterResult, HotelFilterTask, HotelFilters};
use crate::workers::protocol::{Task, TaskOutput, TaskRequest, TaskResponse};
use crate::workers::stats::{DashboardStats, StatsTask};

/// Upper bound on pool size.
pub const MAX_WORKERS: usize = 10;

struct Job {
    request: TaskRequest,
    reply: oneshot::Sender<TaskResponse>,
}

#[derive(Debug, Default)]
struct Counters {
    queued: AtomicUsize,
    active: AtomicUsize,
    terminated: AtomicBool,
}

/// Snapshot of pool occupancy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolStatus {
    pub total_workers: usize,
    pub available_workers: usize,
    pub active_tasks: usize,
    pub queued_tasks: usize,
}

// == Worker Pool ==
pub struct WorkerPool {
    name: String,
    size: usize,
    sender: mpsc::UnboundedSender<Job>,
    counters: Arc<Counters>,
    workers: Vec<JoinHandle<()>>,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("status", &self.status())
            .finish()
    }
}

impl WorkerPool {
    /// Spawns `size` workers, clamped to `1..=MAX_WORKERS`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(name: impl Into<String>, size: usize) -> Self {
        let name = name.into();
        let size = size.clamp(1, MAX_WORKERS);
        let (sender, receiver) = mpsc::unbounded_channel();
        let receiver = Arc::new(Mutex::new(receiver));
        let counters = Arc::new(Counters::default());

        let workers = (0..size)
            .map(|id| tokio::spawn(run_worker(id, receiver.clone(), counters.clone())))
            .collect();

        info!(pool = %name, size, "Worker pool started");

        Self {
            name,
            size,
            sender,
            counters,
            workers,
        }
    }

    // == Execute ==
    /// Runs one task and returns its output.
    pub async fn execute(&self, task: Task) -> Result<TaskOutput> {
        self.submit(TaskRequest::new(task)).await?.into_result()
    }

    /// Queues a request and waits for the correlated response.
    pub async fn submit(&self, request: TaskRequest) -> Result<TaskResponse> {
        if self.counters.terminated.load(Ordering::Acquire) {
            return Err(Error::PoolTerminated);
        }

        let (reply, response) = oneshot::channel();
        debug!(pool = %self.name, task_id = %request.task_id, kind = request.task.kind(), "Queueing task");

        self.counters.queued.fetch_add(1, Ordering::AcqRel);
        if self.sender.send(Job { request, reply }).is_err() {
            self.counters.queued.fetch_sub(1, Ordering::AcqRel);
            return Err(Error::PoolTerminated);
        }

        response.await.map_err(|_| Error::PoolTerminated)
    }

    /// Protocol entry point: always answers, with the request's task id.
    pub async fn handle_message(&self, request: TaskRequest) -> TaskResponse {
        let task_id = request.task_id.clone();
        match self.submit(request).await {
            Ok(response) => response,
            Err(e) => TaskResponse::failed(task_id, e.to_string()),
        }
    }

    /// Runs tasks in batches of `max_concurrent`.
    ///
    /// Successful outputs come back in submission order; failures are logged
    /// and dropped.
    pub async fn execute_parallel(&self, tasks: Vec<Task>, max_concurrent: usize) -> Vec<TaskOutput> {
        let batch_size = max_concurrent.max(1);
        let mut outputs = Vec::with_capacity(tasks.len());
        let mut failures = 0usize;

        let mut tasks = tasks.into_iter().peekable();
        while tasks.peek().is_some() {
            let batch: Vec<Task> = tasks.by_ref().take(batch_size).collect();
            for result in join_all(batch.into_iter().map(|task| self.execute(task))).await {
                match result {
                    Ok(output) => outputs.push(output),
                    Err(e) => {
                        failures += 1;
                        warn!(pool = %self.name, "Worker task failed: {}", e);
                    }
                }
            }
        }

        if failures > 0 {
            warn!(pool = %self.name, failures, "Some worker tasks failed");
        }
        outputs
    }

    // == Typed helpers ==
    pub async fn filter_and_sort(&self, data: Vec<Value>, options: FilterOptions) -> Result<Vec<Value>> {
        let task = Task::FilterData(DataFilterTask {
            data,
            filters: options,
        });
        match self.execute(task).await? {
            TaskOutput::Items(items) => Ok(items),
            other => Err(unexpected("filter-data", &other)),
        }
    }

    pub async fn sort_data(&self, data: Vec<Value>, sort_by: &str, sort_order: SortOrder) -> Result<Vec<Value>> {
        let task = Task::Sort(SortTask {
            data,
            sort_by: sort_by.to_string(),
            sort_order,
        });
        match self.execute(task).await? {
            TaskOutput::Items(items) => Ok(items),
            other => Err(unexpected("sort", &other)),
        }
    }

    pub async fn search_items(
        &self,
        items: Vec<Value>,
        search_term: &str,
        search_fields: Vec<String>,
    ) -> Result<Vec<Value>> {
        let task = Task::Search(SearchTask {
            items,
            search_term: search_term.to_string(),
            search_fields,
        });
        match self.execute(task).await? {
            TaskOutput::Items(items) => Ok(items),
            other => Err(unexpected("search", &other)),
        }
    }

    pub async fn filter_hotels(&self, hotels: Vec<Hotel>, filters: HotelFilters) -> Result<HotelFilterResult> {
        match self.execute(Task::Filter(HotelFilterTask { hotels, filters })).await? {
            TaskOutput::Hotels(result) => Ok(result),
            other => Err(unexpected("filter", &other)),
        }
    }

    pub async fn calculate_analytics(
        &self,
        bookings: Vec<Booking>,
        filters: Option<PeriodFilters>,
    ) -> Result<AnalyticsResult> {
        match self.execute(Task::Analytics(AnalyticsTask { bookings, filters })).await? {
            TaskOutput::Analytics(result) => Ok(result),
            other => Err(unexpected("analytics", &other)),
        }
    }

    pub async fn calculate_earnings(
        &self,
        bookings: Vec<Booking>,
        filters: Option<PeriodFilters>,
    ) -> Result<EarningsResult> {
        match self.execute(Task::Earnings(AnalyticsTask { bookings, filters })).await? {
            TaskOutput::Earnings(result) => Ok(result),
            other => Err(unexpected("earnings", &other)),
        }
    }

    pub async fn calculate_revenue(&self, bookings: Vec<Booking>, filters: Option<PeriodFilters>) -> Result<f64> {
        match self.execute(Task::Revenue(AnalyticsTask { bookings, filters })).await? {
            TaskOutput::Revenue(total) => Ok(total),
            other => Err(unexpected("revenue", &other)),
        }
    }

    pub async fn calculate_dashboard_stats(
        &self,
        hotels: Vec<Hotel>,
        bookings: Vec<Booking>,
    ) -> Result<DashboardStats> {
        match self.execute(Task::Stats(StatsTask { hotels, bookings })).await? {
            TaskOutput::Stats(stats) => Ok(stats),
            other => Err(unexpected("stats", &other)),
        }
    }

    // == Lifecycle ==
    /// Stops all workers. Queued and in-flight callers get `PoolTerminated`.
    pub fn terminate(&self) {
        if self.counters.terminated.swap(true, Ordering::AcqRel) {
            return;
        }
        for worker in &self.workers {
            worker.abort();
        }
        self.counters.queued.store(0, Ordering::Release);
        self.counters.active.store(0, Ordering::Release);
        info!(pool = %self.name, "Worker pool terminated");
    }

    pub fn is_terminated(&self) -> bool {
        self.counters.terminated.load(Ordering::Acquire)
    }

    pub fn status(&self) -> PoolStatus {
        if self.is_terminated() {
            return PoolStatus {
                total_workers: self.size,
                available_workers: 0,
                active_tasks: 0,
                queued_tasks: 0,
            };
        }
        let active = self.counters.active.load(Ordering::Acquire);
        PoolStatus {
            total_workers: self.size,
            available_workers: self.size.saturating_sub(active),
            active_tasks: active,
            queued_tasks: self.counters.queued.load(Ordering::Acquire),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.terminate();
    }
}

async fn run_worker(id: usize, receiver: Arc<Mutex<mpsc::UnboundedReceiver<Job>>>, counters: Arc<Counters>) {
    loop {
        let job = receiver.lock().await.recv().await;
        let Some(Job { request, reply }) = job else {
            debug!(worker = id, "Queue closed, worker exiting");
            break;
        };

        counters.queued.fetch_sub(1, Ordering::AcqRel);
        counters.active.fetch_add(1, Ordering::AcqRel);

        let TaskRequest { task_id, task } = request;
        let kind = task.kind();
        let response = match tokio::task::spawn_blocking(move || task.execute()).await {
            Ok(output) => TaskResponse::ok(task_id, output),
            Err(e) => {
                let message = if e.is_panic() {
                    panic_message(e.into_panic())
                } else {
                    "Task cancelled".to_string()
                };
                warn!(worker = id, task_id = %task_id, kind, "Worker task failed: {}", message);
                TaskResponse::failed(task_id, message)
            }
        };

        counters.active.fetch_sub(1, Ordering::AcqRel);
        // The caller may have stopped waiting; nothing to do then.
        let _ = reply.send(response);
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown error".to_string()
    }
}

fn unexpected(kind: &str, output: &TaskOutput) -> Error {
    Error::Internal(format!(
        "'{}' task produced a '{}' result",
        kind,
        output.kind()
    ))
}
