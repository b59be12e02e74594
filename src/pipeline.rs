//! # Pipeline Module
//!
//! Per-route processing chain. Each stage receives the output of the previous
//! one and either continues with a (possibly rewritten) path or drops the event.
//!
//! ```text
//! path ─▶ [decode-uri] ─▶ strip-base ─▶ [strip-hash] ─▶ match-gate ─▶ Continue(path)
//!                                                          │
//!                                                          └─▶ Drop (no match)
//! ```
//!
//! A drop ends processing of that one event for that one route. It is not an
//! error and nobody downstream hears about it.

use crate::error::RouteError;
use std::fmt;

/// Outcome of one pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step<T> {
    /// Hand the value to the next stage
    Continue(T),
    /// Discard this event for this route
    Drop,
}

impl<T> Step<T> {
    #[must_use]
    pub fn is_drop(&self) -> bool {
        matches!(self, Step::Drop)
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Step<U> {
        match self {
            Step::Continue(value) => Step::Continue(f(value)),
            Step::Drop => Step::Drop,
        }
    }
}

type StageFn = Box<dyn Fn(String) -> Result<Step<String>, RouteError> + Send + Sync>;

/// Ordered list of named path stages.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<(&'static str, StageFn)>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

impl Pipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage.
    #[must_use]
    pub fn stage<F>(mut self, name: &'static str, f: F) -> Self
    where
        F: Fn(String) -> Result<Step<String>, RouteError> + Send + Sync + 'static,
    {
        self.stages.push((name, Box::new(f)));
        self
    }

    /// Append a stage that always continues.
    #[must_use]
    pub fn map<F>(self, name: &'static str, f: F) -> Self
    where
        F: Fn(String) -> String + Send + Sync + 'static,
    {
        self.stage(name, move |path| Ok(Step::Continue(f(path))))
    }

    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|(name, _)| *name).collect()
    }

    /// Run every stage in order, stopping at the first drop or error.
    pub fn run(&self, input: String) -> Result<Step<String>, RouteError> {
        let mut current = input;
        for (name, stage) in &self.stages {
            match stage(current)? {
                Step::Continue(next) => current = next,
                Step::Drop => {
                    tracing::trace!(stage = *name, "Pipeline dropped event");
                    return Ok(Step::Drop);
                }
            }
        }
        Ok(Step::Continue(current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stages_run_in_order() {
        let pipeline = Pipeline::new()
            .map("upper", |p| p.to_uppercase())
            .map("suffix", |p| format!("{p}!"));
        assert_eq!(pipeline.stage_names(), vec!["upper", "suffix"]);
        assert_eq!(
            pipeline.run("abc".into()).unwrap(),
            Step::Continue("ABC!".to_string())
        );
    }

    #[test]
    fn test_drop_short_circuits() {
        let pipeline = Pipeline::new()
            .stage("gate", |_| Ok(Step::Drop))
            .stage("never", |_| Err(RouteError::Config {
                message: "unreachable stage ran".into(),
            }));
        assert!(pipeline.run("x".into()).unwrap().is_drop());
    }

    #[test]
    fn test_error_propagates() {
        let pipeline = Pipeline::new().stage("fail", |p| {
            Err(RouteError::Decode {
                input: p,
                message: "bad".into(),
            })
        });
        assert!(pipeline.run("x".into()).is_err());
    }

    #[test]
    fn test_step_map() {
        assert_eq!(Step::Continue(2).map(|v| v * 2), Step::Continue(4));
        assert!(Step::<i32>::Drop.map(|v| v * 2).is_drop());
    }
}
