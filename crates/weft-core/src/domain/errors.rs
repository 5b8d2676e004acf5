//! Errors and their operational classification.
//!
//! Each concern has its own error enum; `EngineError` is what the API surface
//! returns and converts from all of them.

use thiserror::Error;

use super::event::Aggregate;

/// Operational classification of an error.
///
/// - Transient: may succeed when retried (a function runtime was down)
/// - Permanent: retrying the same request cannot help (invalid spec, conflict)
/// - Infrastructure: the event log itself failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transient,
    Permanent,
    Infrastructure,
}

/// Event log failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid aggregate: {0}")]
    InvalidAggregate(&'static str),

    #[error("event store backend failure: {0}")]
    Backend(String),
}

/// Failures while applying events to an aggregate.
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("failed to decode {event_type} payload for {aggregate}: {source}")]
    Decode {
        event_type: String,
        aggregate: Aggregate,
        #[source]
        source: serde_json::Error,
    },

    #[error("{event_type} cannot be applied to {aggregate} in state {state}")]
    InvalidTransition {
        event_type: String,
        aggregate: Aggregate,
        state: String,
    },

    #[error("event of {actual} cannot be applied to {expected}")]
    AggregateMismatch {
        expected: Aggregate,
        actual: Aggregate,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A spec failed structural or semantic checks. Collects every issue found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {subject}: {}", .issues.join("; "))]
pub struct ValidationError {
    pub subject: String,
    pub issues: Vec<String>,
}

/// Function reference resolution failures.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("unknown runtime '{0}'")]
    UnknownRuntime(String),

    #[error("function '{0}' not found in any runtime")]
    NotFound(String),

    #[error("runtime '{runtime}' failed to resolve '{target}': {reason}")]
    Runtime {
        runtime: String,
        target: String,
        reason: String,
    },

    #[error(transparent)]
    Replay(#[from] AggregateError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Typed value conversion failures.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("value cannot be represented: {0}")]
    Unsupported(String),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors returned by the workflow, invocation and dynamic APIs.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("{0} is required")]
    MissingId(&'static str),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("workflow {0} has been deleted")]
    Deleted(String),

    #[error("failed to encode payload: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("failed to resolve tasks in workflow: {0}")]
    Resolution(#[from] ResolveError),

    #[error("invocation rejected: {0}")]
    InvocationRejected(String),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Resolution(ResolveError::Store(_))
            | EngineError::Resolution(ResolveError::Replay(AggregateError::Store(_))) => {
                ErrorKind::Infrastructure
            }
            EngineError::Resolution(ResolveError::Runtime { .. }) => ErrorKind::Transient,
            EngineError::Resolution(
                ResolveError::UnknownRuntime(_) | ResolveError::NotFound(_) | ResolveError::Replay(_),
            ) => ErrorKind::Permanent,
            EngineError::Store(_) | EngineError::Aggregate(AggregateError::Store(_)) => {
                ErrorKind::Infrastructure
            }
            EngineError::Validation(_)
            | EngineError::AlreadyExists(_)
            | EngineError::MissingId(_)
            | EngineError::NotFound(_)
            | EngineError::Deleted(_)
            | EngineError::Encoding(_)
            | EngineError::InvocationRejected(_)
            | EngineError::Codec(_)
            | EngineError::Aggregate(_) => ErrorKind::Permanent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn validation_error_lists_all_issues() {
        let err = ValidationError {
            subject: "workflow".to_string(),
            issues: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(err.to_string(), "invalid workflow: a; b");
    }

    #[test]
    fn errors_are_classified() {
        assert_eq!(
            EngineError::AlreadyExists("wf-1".into()).kind(),
            ErrorKind::Permanent
        );
        assert_eq!(
            EngineError::Store(StoreError::Backend("down".into())).kind(),
            ErrorKind::Infrastructure
        );
    }

    #[rstest]
    #[case::missing_function(ResolveError::NotFound("f".into()), ErrorKind::Permanent)]
    #[case::unknown_runtime(ResolveError::UnknownRuntime("lambda".into()), ErrorKind::Permanent)]
    #[case::runtime_down(
        ResolveError::Runtime {
            runtime: "mock".into(),
            target: "f".into(),
            reason: "connection refused".into(),
        },
        ErrorKind::Transient
    )]
    #[case::log_down(ResolveError::Store(StoreError::Backend("down".into())), ErrorKind::Infrastructure)]
    #[case::log_down_during_replay(
        ResolveError::Replay(AggregateError::Store(StoreError::Backend("down".into()))),
        ErrorKind::Infrastructure
    )]
    fn resolution_errors_are_classified(#[case] err: ResolveError, #[case] expected: ErrorKind) {
        assert_eq!(EngineError::Resolution(err).kind(), expected);
    }
}
