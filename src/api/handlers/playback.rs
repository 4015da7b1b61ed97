use async_trait::async_trait;
use axum::{extract::State, Json};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::api::state::AppState;
use crate::error::Result;
use crate::models::{PlannedStep, PlaybackPlanRequest, PlaybackPlanResponse};
use crate::playback::{CommandExecutor, PlaybackRunner, ProjectStore, TestCase, TestCommand};

/// Executor that only writes down what it was asked to run
#[derive(Default)]
struct StepJournal {
    steps: Mutex<Vec<PlannedStep>>,
}

#[async_trait]
impl CommandExecutor for StepJournal {
    async fn execute(&self, test: &TestCase, index: usize, command: &TestCommand) -> anyhow::Result<()> {
        self.steps.lock().await.push(PlannedStep {
            test: test.name.clone(),
            index,
            command: command.command.clone(),
            target: command.target.clone(),
            value: command.value.clone(),
        });
        Ok(())
    }
}

/// Walk a project's test cases from `entry` and return the flattened command
/// sequence, entering `run` calls up to the configured depth
pub async fn plan_playback(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PlaybackPlanRequest>,
) -> Result<Json<PlaybackPlanResponse>> {
    let mut project = ProjectStore::new();
    for test in request.tests {
        project.add_test_case(test);
    }

    let journal = Arc::new(StepJournal::default());
    let mut runner = PlaybackRunner::new(
        Arc::new(project),
        journal.clone(),
        state.config.max_call_depth,
    );
    let summary = runner.run_by_name(&request.entry).await?;

    let steps = std::mem::take(&mut *journal.steps.lock().await);
    tracing::info!("Planned {} steps from {}", steps.len(), request.entry);

    Ok(Json(PlaybackPlanResponse {
        entry: request.entry,
        steps,
        max_depth: summary.max_depth,
    }))
}
