use std::sync::Arc;

use super::test_case::{ProjectStore, TestRef};
use crate::error::PlaybackError;

/// One nested invocation of a test case by another
#[derive(Debug, Clone)]
pub struct CallFrame {
    pub caller: Option<TestRef>,
    pub callee: TestRef,
    /// Index in the caller's commands to resume from; `None` when there was none
    pub position: Option<usize>,
}

impl CallFrame {
    /// Position with `-1` standing for "no caller position"
    pub fn position_or_sentinel(&self) -> i64 {
        self.position.map(|p| p as i64).unwrap_or(-1)
    }
}

/// Execution cursor of a playback plus its call stack
#[derive(Debug, Default)]
pub struct PlaybackState {
    callstack: Vec<CallFrame>,
    pub current_running_test: Option<TestRef>,
    pub current_playing_index: Option<usize>,
}

impl PlaybackState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn callstack(&self) -> &[CallFrame] {
        &self.callstack
    }

    /// Nesting depth of the running test case
    pub fn depth(&self) -> usize {
        self.callstack.len()
    }

    /// Enter `callee` as a subroutine of the running test case.
    ///
    /// The frame remembers `position`, or the current playing index when no
    /// position is given. The callee starts with no playing index, so a call
    /// made from it before it advances records no position.
    pub fn call_test_case(&mut self, callee: TestRef, position: Option<usize>) {
        let frame = CallFrame {
            caller: self.current_running_test.clone(),
            callee: Arc::clone(&callee),
            position: position.or(self.current_playing_index),
        };
        tracing::debug!(
            "Calling {} from {:?} at {}",
            callee.name,
            frame.caller.as_ref().map(|c| c.name.as_str()),
            frame.position_or_sentinel()
        );
        self.callstack.push(frame);
        self.current_running_test = Some(callee);
        self.current_playing_index = None;
    }

    pub fn call_test_case_by_name(
        &mut self,
        project: &ProjectStore,
        name: &str,
        position: Option<usize>,
    ) -> Result<(), PlaybackError> {
        let callee = project
            .find_test_by_name(name)
            .ok_or_else(|| PlaybackError::TestNotFound(name.to_string()))?;
        self.call_test_case(callee, position);
        Ok(())
    }

    /// Return from the innermost call, restoring its caller and position
    pub fn unwind_test_case(&mut self) -> Result<CallFrame, PlaybackError> {
        let frame = self.callstack.pop().ok_or(PlaybackError::EmptyStack)?;
        tracing::debug!(
            "Returning from {} to position {}",
            frame.callee.name,
            frame.position_or_sentinel()
        );
        self.current_running_test = frame.caller.clone();
        self.current_playing_index = frame.position;
        Ok(frame)
    }

    pub fn clear_stack(&mut self) {
        self.callstack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::test_case::TestCase;

    fn test(name: &str) -> TestRef {
        Arc::new(TestCase::new(name))
    }

    #[test]
    fn test_starts_empty() {
        let state = PlaybackState::new();
        assert_eq!(state.depth(), 0);
        assert!(state.current_running_test.is_none());
    }

    #[test]
    fn test_call_pushes_current_position() {
        let caller = test("caller");
        let pushed = test("pushed");
        let mut state = PlaybackState::new();
        state.current_running_test = Some(caller.clone());
        state.current_playing_index = Some(5);

        state.call_test_case(pushed.clone(), None);
        let frame = &state.callstack()[0];
        assert_eq!(frame.position, Some(5));
        assert!(Arc::ptr_eq(frame.caller.as_ref().unwrap(), &caller));
        assert!(Arc::ptr_eq(&frame.callee, &pushed));
        assert!(Arc::ptr_eq(state.current_running_test.as_ref().unwrap(), &pushed));
    }

    #[test]
    fn test_unwind_restores_caller_and_position() {
        let caller = test("caller");
        let pushed = test("pushed");
        let mut state = PlaybackState::new();
        state.current_running_test = Some(caller.clone());
        state.current_playing_index = Some(5);

        state.call_test_case(pushed.clone(), Some(5));
        let CallFrame {
            caller: returned_caller,
            callee,
            position,
        } = state.unwind_test_case().unwrap();
        assert!(Arc::ptr_eq(&callee, &pushed));
        assert!(Arc::ptr_eq(returned_caller.as_ref().unwrap(), &caller));
        assert_eq!(position, Some(5));
        assert!(Arc::ptr_eq(state.current_running_test.as_ref().unwrap(), &caller));
        assert_eq!(state.current_playing_index, Some(5));
        assert_eq!(state.depth(), 0);
    }

    #[test]
    fn test_nested_calls_chain_caller_and_callee() {
        let outer = test("test");
        let routine = test("routine");
        let final_routine = test("final");
        let mut state = PlaybackState::new();
        state.current_running_test = Some(outer.clone());
        state.current_playing_index = Some(5);

        state.call_test_case(routine.clone(), None);
        state.call_test_case(final_routine.clone(), None);

        let first = &state.callstack()[0];
        assert_eq!(first.position_or_sentinel(), 5);
        assert!(Arc::ptr_eq(first.caller.as_ref().unwrap(), &outer));
        assert!(Arc::ptr_eq(&first.callee, &routine));

        let second = &state.callstack()[1];
        assert_eq!(second.position_or_sentinel(), -1);
        assert!(Arc::ptr_eq(second.caller.as_ref().unwrap(), &routine));
        assert!(Arc::ptr_eq(&second.callee, &final_routine));
    }

    #[test]
    fn test_call_by_name_uses_project_instance() {
        let mut project = ProjectStore::new();
        let first = project.create_test_case("first");
        let second = project.create_test_case("second");
        let mut state = PlaybackState::new();
        state.current_running_test = Some(first);
        state.current_playing_index = Some(1);

        state.call_test_case_by_name(&project, "second", None).unwrap();
        assert!(Arc::ptr_eq(&state.callstack()[0].callee, &second));

        let err = state.call_test_case_by_name(&project, "third", None).unwrap_err();
        assert!(matches!(err, PlaybackError::TestNotFound(name) if name == "third"));
        assert_eq!(state.depth(), 1);
    }

    #[test]
    fn test_unwind_empty_stack() {
        let mut state = PlaybackState::new();
        assert!(matches!(state.unwind_test_case(), Err(PlaybackError::EmptyStack)));
    }

    #[test]
    fn test_clear_stack() {
        let mut state = PlaybackState::new();
        state.call_test_case(test("a"), None);
        state.call_test_case(test("b"), None);
        state.clear_stack();
        assert_eq!(state.depth(), 0);
    }
}
