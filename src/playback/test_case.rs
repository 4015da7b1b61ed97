use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::CommandRecord;

/// One step of a test case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCommand {
    pub command: String,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub value: String,
}

impl TestCommand {
    pub fn new(command: impl Into<String>, target: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            target: target.into(),
            value: value.into(),
        }
    }

    /// Step for a recorded command, targeting its best locator
    pub fn from_record(record: &CommandRecord) -> Self {
        Self::new(
            record.command.clone(),
            record.best_target().unwrap_or_default(),
            record.value.clone(),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    #[serde(default = "new_test_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub commands: Vec<TestCommand>,
}

fn new_test_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl TestCase {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_test_id(),
            name: name.into(),
            commands: Vec::new(),
        }
    }

    pub fn with_commands(name: impl Into<String>, commands: Vec<TestCommand>) -> Self {
        Self {
            commands,
            ..Self::new(name)
        }
    }
}

/// Shared handle to a test case; two refs are the same test when they point to the same allocation
pub type TestRef = Arc<TestCase>;

/// The test cases of one project
#[derive(Debug, Default)]
pub struct ProjectStore {
    tests: Vec<TestRef>,
}

impl ProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_test_case(&mut self, name: impl Into<String>) -> TestRef {
        self.add_test_case(TestCase::new(name))
    }

    pub fn add_test_case(&mut self, test: TestCase) -> TestRef {
        let test = Arc::new(test);
        self.tests.push(Arc::clone(&test));
        test
    }

    /// First test with this name
    pub fn find_test_by_name(&self, name: &str) -> Option<TestRef> {
        self.tests.iter().find(|t| t.name == name).cloned()
    }

    pub fn tests(&self) -> &[TestRef] {
        &self.tests
    }
}
