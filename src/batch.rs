//! JSON-lines batch mode: one request per input line, one response per output line.
//!
//! Requests run concurrently on the blocking pool; responses are written in
//! input order. A `reload` request waits for everything before it, so earlier
//! requests see the old snapshot and later ones the new.

use crate::engine::MatchingEngine;
use crate::error::Result;
use crate::processing::lexical::RecommendationQuery;
use crate::processing::semantic::HybridQuery;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::task::JoinHandle;

/// In-flight requests before the oldest is awaited
const MAX_IN_FLIGHT: usize = 64;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum BatchRequest {
    Recommend(RecommendationQuery),
    Preview(RecommendationQuery),
    Hybrid(HybridQuery),
    SkillGap {
        user_skills: Vec<String>,
        target_role: String,
    },
    Reload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResponse {
    pub line: usize,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchResponse {
    fn success(line: usize, result: Value) -> Self {
        Self {
            line,
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    fn failure(line: usize, error: String) -> Self {
        Self {
            line,
            ok: false,
            result: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub processed: usize,
    pub failed: usize,
}

enum Pending {
    Ready(BatchResponse),
    Running(usize, JoinHandle<Result<Value>>),
}

fn execute(engine: &MatchingEngine, request: BatchRequest) -> Result<Value> {
    let value = match request {
        BatchRequest::Recommend(query) => serde_json::to_value(engine.get_recommendations(&query))?,
        BatchRequest::Preview(query) => serde_json::to_value(engine.preview_schemes(&query))?,
        BatchRequest::Hybrid(query) => serde_json::to_value(engine.recommend(&query))?,
        BatchRequest::SkillGap {
            user_skills,
            target_role,
        } => serde_json::to_value(engine.analyze_skill_gap(&user_skills, &target_role))?,
        BatchRequest::Reload => {
            let snapshot = engine.reload();
            json!({
                "version": snapshot.version,
                "schemes": snapshot.schemes.len(),
                "jobs": snapshot.jobs.len(),
            })
        }
    };
    Ok(value)
}

async fn settle(pending: Pending) -> BatchResponse {
    match pending {
        Pending::Ready(response) => response,
        Pending::Running(line, handle) => match handle.await {
            Ok(Ok(value)) => BatchResponse::success(line, value),
            Ok(Err(e)) => BatchResponse::failure(line, e.to_string()),
            Err(e) => BatchResponse::failure(line, format!("request task failed: {}", e)),
        },
    }
}

async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &BatchResponse,
    summary: &mut BatchSummary,
) -> Result<()> {
    summary.processed += 1;
    if !response.ok {
        summary.failed += 1;
    }
    let mut encoded = serde_json::to_string(response)?;
    encoded.push('\n');
    writer.write_all(encoded.as_bytes()).await?;
    Ok(())
}

async fn drain<W: AsyncWrite + Unpin>(
    queue: &mut VecDeque<Pending>,
    writer: &mut W,
    summary: &mut BatchSummary,
) -> Result<()> {
    while let Some(pending) = queue.pop_front() {
        let response = settle(pending).await;
        write_response(writer, &response, summary).await?;
    }
    Ok(())
}

/// Process every line of `reader` and write responses to `writer`.
///
/// Blank lines are skipped; malformed lines produce an error response and do
/// not stop the batch. Only I/O failures on the streams abort.
pub async fn run_batch<R, W>(
    engine: Arc<MatchingEngine>,
    reader: R,
    mut writer: W,
) -> Result<BatchSummary>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut queue: VecDeque<Pending> = VecDeque::new();
    let mut summary = BatchSummary::default();
    let mut line_no = 0;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }

        let request: BatchRequest = match serde_json::from_str(&line) {
            Ok(request) => request,
            Err(e) => {
                warn!("Line {}: invalid request: {}", line_no, e);
                queue.push_back(Pending::Ready(BatchResponse::failure(
                    line_no,
                    format!("invalid request: {}", e),
                )));
                continue;
            }
        };

        let is_reload = matches!(request, BatchRequest::Reload);
        if is_reload {
            debug!("Line {}: reload, draining {} pending requests", line_no, queue.len());
            drain(&mut queue, &mut writer, &mut summary).await?;
        }

        let engine = Arc::clone(&engine);
        let handle = tokio::task::spawn_blocking(move || execute(&engine, request));

        // later requests must not start before the reload has swapped the snapshot
        if is_reload {
            let response = settle(Pending::Running(line_no, handle)).await;
            write_response(&mut writer, &response, &mut summary).await?;
            continue;
        }

        queue.push_back(Pending::Running(line_no, handle));
        if queue.len() >= MAX_IN_FLIGHT {
            if let Some(oldest) = queue.pop_front() {
                let response = settle(oldest).await;
                write_response(&mut writer, &response, &mut summary).await?;
            }
        }
    }

    drain(&mut queue, &mut writer, &mut summary).await?;
    writer.flush().await?;

    debug!("Batch finished: {:?}", summary);
    Ok(summary)
}
