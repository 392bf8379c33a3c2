//! Task-scoped correlation context for trace propagation.
//!
//! Each logical call owns exactly one [`CorrelationContext`]. The context is
//! installed with [`scope`], which binds it to a tokio task-local for the
//! duration of the wrapped future and detaches it on every exit path:
//! success, error, or panic unwind. Pooled executor threads therefore never
//! carry residual state into an unrelated call, and there is no manual
//! `release` to forget. Outside a scope the accessors return `None`.
use std::future::Future;

use uuid::Uuid;

tokio::task_local! {
    static CORRELATION: CorrelationContext;
}

/// Per-call correlation state: a trace id plus an optional bound subject
/// (caller/user identifier).
#[derive(Debug, Clone)]
pub struct CorrelationContext {
    trace_id: String,
    subject_id: Option<String>,
}

impl CorrelationContext {
    /// Build a context from a caller-supplied trace id, generating a UUID v4
    /// when none (or an empty string) is provided.
    pub fn bind(trace_id: Option<String>, subject_id: Option<String>) -> Self {
        let trace_id = trace_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        Self {
            trace_id,
            subject_id,
        }
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn subject_id(&self) -> Option<&str> {
        self.subject_id.as_deref()
    }
}

/// Run a future with the given context installed in task-local storage.
///
/// The binding is removed when the future completes, whatever the outcome.
pub async fn scope<F>(context: CorrelationContext, future: F) -> F::Output
where
    F: Future,
{
    CORRELATION.scope(context, future).await
}

/// Trace id of the current call, or `None` outside a correlation scope.
pub fn current_trace_id() -> Option<String> {
    CORRELATION
        .try_with(|context| context.trace_id.clone())
        .ok()
}

/// Subject id bound to the current call, if any.
pub fn current_subject_id() -> Option<String> {
    CORRELATION
        .try_with(|context| context.subject_id.clone())
        .ok()
        .flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_generates_trace_id_when_absent() {
        let context = CorrelationContext::bind(None, None);
        assert!(Uuid::parse_str(context.trace_id()).is_ok());

        let empty = CorrelationContext::bind(Some(String::new()), None);
        assert!(Uuid::parse_str(empty.trace_id()).is_ok());
    }

    #[test]
    fn test_bind_keeps_supplied_trace_id() {
        let context = CorrelationContext::bind(Some("trace-42".to_string()), None);
        assert_eq!(context.trace_id(), "trace-42");
    }

    #[tokio::test]
    async fn test_scope_exposes_and_detaches_context() {
        assert_eq!(current_trace_id(), None);

        let context =
            CorrelationContext::bind(Some("trace-a".to_string()), Some("user-1".to_string()));
        scope(context, async {
            assert_eq!(current_trace_id().as_deref(), Some("trace-a"));
            assert_eq!(current_subject_id().as_deref(), Some("user-1"));
        })
        .await;

        assert_eq!(current_trace_id(), None);
        assert_eq!(current_subject_id(), None);
    }

    #[tokio::test]
    async fn test_scope_detaches_on_error_path() {
        let context = CorrelationContext::bind(Some("trace-err".to_string()), None);
        let result: Result<(), &str> = scope(context, async { Err("boom") }).await;
        assert!(result.is_err());
        assert_eq!(current_trace_id(), None);
    }

    #[tokio::test]
    async fn test_nested_scopes_restore_outer_context() {
        let outer = CorrelationContext::bind(Some("outer".to_string()), None);
        scope(outer, async {
            let inner = CorrelationContext::bind(Some("inner".to_string()), None);
            scope(inner, async {
                assert_eq!(current_trace_id().as_deref(), Some("inner"));
            })
            .await;
            assert_eq!(current_trace_id().as_deref(), Some("outer"));
        })
        .await;
    }
}
