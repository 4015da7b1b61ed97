//! Playback of recorded test cases that call each other.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use command_recorder::error::PlaybackError;
use command_recorder::models::{CommandRecord, FrameLocation, Locator};
use command_recorder::playback::{
    CommandExecutor, PlaybackRunner, ProjectStore, TestCase, TestCommand,
};

#[derive(Default)]
struct Journal {
    steps: Mutex<Vec<String>>,
}

#[async_trait]
impl CommandExecutor for Journal {
    async fn execute(&self, test: &TestCase, _index: usize, command: &TestCommand) -> anyhow::Result<()> {
        self.steps
            .lock()
            .unwrap()
            .push(format!("{}:{} {}", test.name, command.command, command.target));
        Ok(())
    }
}

struct Stalls;

#[async_trait]
impl CommandExecutor for Stalls {
    async fn execute(&self, _test: &TestCase, _index: usize, _command: &TestCommand) -> anyhow::Result<()> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(())
    }
}

fn recorded(command: &str, target: &str, value: &str) -> CommandRecord {
    CommandRecord {
        command: command.to_string(),
        target: vec![
            Locator::new(target, "id"),
            Locator::new("xpath=/html/body/input", "xpath:position"),
        ],
        value: value.to_string(),
        insert_before_last_command: false,
        frame_location: FrameLocation::root(),
    }
}

#[tokio::test]
async fn test_nested_routines_run_in_order() {
    let mut project = ProjectStore::new();
    project.add_test_case(TestCase::with_commands(
        "checkout",
        vec![
            TestCommand::new("open", "/cart", ""),
            TestCommand::new("run", "login", ""),
            TestCommand::new("click", "id=pay", ""),
        ],
    ));
    project.add_test_case(TestCase::with_commands(
        "login",
        vec![
            TestCommand::new("run", "credentials", ""),
            TestCommand::new("click", "id=submit", ""),
        ],
    ));
    project.add_test_case(TestCase::with_commands(
        "credentials",
        vec![
            TestCommand::from_record(&recorded("type", "id=user", "ada")),
            TestCommand::from_record(&recorded("type", "id=pass", "secret")),
        ],
    ));

    let journal = Arc::new(Journal::default());
    let mut runner = PlaybackRunner::new(Arc::new(project), journal.clone(), 8);
    let summary = runner.run_by_name("checkout").await.unwrap();

    assert_eq!(summary.executed, 5);
    assert_eq!(summary.max_depth, 2);
    assert_eq!(
        *journal.steps.lock().unwrap(),
        vec![
            "checkout:open /cart",
            "credentials:type id=user",
            "credentials:type id=pass",
            "login:click id=submit",
            "checkout:click id=pay",
        ]
    );
    assert_eq!(runner.state().depth(), 0);
}

#[tokio::test]
async fn test_call_as_last_command_returns_cleanly() {
    let mut project = ProjectStore::new();
    project.add_test_case(TestCase::with_commands(
        "main",
        vec![TestCommand::new("run", "empty", "")],
    ));
    project.create_test_case("empty");

    let mut runner = PlaybackRunner::new(Arc::new(project), Arc::new(Journal::default()), 8);
    let summary = runner.run_by_name("main").await.unwrap();
    assert_eq!(summary.executed, 0);
    assert_eq!(summary.max_depth, 1);
}

#[tokio::test]
async fn test_unknown_test_case() {
    let mut runner = PlaybackRunner::new(
        Arc::new(ProjectStore::new()),
        Arc::new(Journal::default()),
        8,
    );
    let err = runner.run_by_name("missing").await.unwrap_err();
    assert!(matches!(err, PlaybackError::TestNotFound(name) if name == "missing"));
}

#[tokio::test]
async fn test_cancel_stops_running_command() {
    let mut project = ProjectStore::new();
    project.add_test_case(TestCase::with_commands(
        "slow",
        vec![
            TestCommand::new("pause", "", "60000"),
            TestCommand::new("click", "id=never", ""),
        ],
    ));
    let mut runner = PlaybackRunner::new(Arc::new(project), Arc::new(Stalls), 8);
    let cancel = runner.cancel_handle();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        let _ = cancel.send(());
    });

    let err = runner.run_by_name("slow").await.unwrap_err();
    assert!(matches!(err, PlaybackError::Cancelled));
    assert!(runner.state().current_running_test.is_none());
}
