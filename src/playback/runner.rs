use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::broadcast;

use super::callstack::PlaybackState;
use super::test_case::{ProjectStore, TestCase, TestCommand, TestRef};
use crate::error::PlaybackError;

/// Command that enters another test case of the project, named by its target
pub const RUN_COMMAND: &str = "run";

/// Carries out a single non-control command during playback
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(&self, test: &TestCase, index: usize, command: &TestCommand) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Commands handed to the executor
    pub executed: usize,
    /// Deepest call nesting reached
    pub max_depth: usize,
}

/// Walks a test case's commands, entering and leaving called test cases
pub struct PlaybackRunner {
    project: Arc<ProjectStore>,
    executor: Arc<dyn CommandExecutor>,
    max_call_depth: usize,
    state: PlaybackState,
    cancel_sender: broadcast::Sender<()>,
}

impl PlaybackRunner {
    pub fn new(project: Arc<ProjectStore>, executor: Arc<dyn CommandExecutor>, max_call_depth: usize) -> Self {
        let (cancel_tx, _) = broadcast::channel(1);
        Self {
            project,
            executor,
            max_call_depth,
            state: PlaybackState::new(),
            cancel_sender: cancel_tx,
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// Stop a running playback before its next command
    pub fn cancel(&self) {
        let _ = self.cancel_sender.send(());
    }

    pub fn cancel_handle(&self) -> broadcast::Sender<()> {
        self.cancel_sender.clone()
    }

    pub async fn run(&mut self, test: TestRef) -> Result<RunSummary, PlaybackError> {
        tracing::info!("Starting playback of {} ({} commands)", test.name, test.commands.len());
        self.state.clear_stack();
        self.state.current_running_test = Some(test);
        self.state.current_playing_index = Some(0);

        let result = self.run_commands().await;

        self.state.clear_stack();
        self.state.current_running_test = None;
        self.state.current_playing_index = None;

        match &result {
            Ok(summary) => tracing::info!("Playback finished after {} commands", summary.executed),
            Err(e) => tracing::warn!("Playback stopped: {}", e),
        }
        result
    }

    pub async fn run_by_name(&mut self, name: &str) -> Result<RunSummary, PlaybackError> {
        let test = self
            .project
            .find_test_by_name(name)
            .ok_or_else(|| PlaybackError::TestNotFound(name.to_string()))?;
        self.run(test).await
    }

    async fn run_commands(&mut self) -> Result<RunSummary, PlaybackError> {
        let mut summary = RunSummary::default();
        let mut cancel_rx = self.cancel_sender.subscribe();

        loop {
            let test = self
                .state
                .current_running_test
                .clone()
                .ok_or(PlaybackError::NothingRunning)?;
            let index = self.state.current_playing_index.unwrap_or(0);

            let Some(command) = test.commands.get(index) else {
                if self.state.depth() == 0 {
                    return Ok(summary);
                }
                let frame = self.state.unwind_test_case()?;
                self.state.current_playing_index = Some(frame.position.map_or(0, |p| p + 1));
                continue;
            };

            if command.command == RUN_COMMAND {
                if self.state.depth() >= self.max_call_depth {
                    return Err(PlaybackError::CallDepthExceeded(self.max_call_depth));
                }
                self.state
                    .call_test_case_by_name(&self.project, &command.target, Some(index))?;
                self.state.current_playing_index = Some(0);
                summary.max_depth = summary.max_depth.max(self.state.depth());
                continue;
            }

            tokio::select! {
                biased;
                _ = cancel_rx.recv() => {
                    return Err(PlaybackError::Cancelled);
                }
                result = self.executor.execute(&test, index, command) => {
                    result.map_err(|source| PlaybackError::CommandFailed {
                        index,
                        command: command.command.clone(),
                        source,
                    })?;
                }
            }
            summary.executed += 1;
            self.state.current_playing_index = Some(index + 1);
        }
    }
}
