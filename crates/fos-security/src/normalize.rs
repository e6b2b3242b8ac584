//! Policy Answer Normalization
//!
//! Collaborators may answer right away or later, and with any value. The gate
//! only ever deals with one shape: a boxed future of a boolean.

use std::fmt;
use std::future::Future;

use serde_json::Value;
use smol::future::{self, Boxed, FutureExt};

/// A deferred boolean decision
pub type DeferredBool = Boxed<Result<bool, PolicyFault>>;

/// Failure raised by a policy collaborator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct PolicyFault {
    message: String,
}

impl PolicyFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// What a collaborator callback hands back
pub enum PolicyAnswer {
    /// Value available immediately
    Ready(Value),
    /// Value still being computed
    Pending(Boxed<Result<Value, PolicyFault>>),
}

impl PolicyAnswer {
    /// Immediate answer
    pub fn ready(value: impl Into<Value>) -> Self {
        Self::Ready(value.into())
    }

    /// Answer produced by a future
    pub fn pending<F, V>(answer: F) -> Self
    where
        F: Future<Output = Result<V, PolicyFault>> + Send + 'static,
        V: Into<Value> + 'static,
    {
        Self::Pending(async move { answer.await.map(|value| -> Value { value.into() }) }.boxed())
    }

    /// Deferred answer that is already settled
    pub fn resolved(value: impl Into<Value>) -> Self {
        Self::Pending(future::ready(Ok(value.into())).boxed())
    }

    /// Deferred answer that has already failed
    pub fn rejected(fault: PolicyFault) -> Self {
        Self::Pending(future::ready(Err(fault)).boxed())
    }
}

impl From<bool> for PolicyAnswer {
    fn from(allowed: bool) -> Self {
        Self::Ready(Value::Bool(allowed))
    }
}

impl From<Value> for PolicyAnswer {
    fn from(value: Value) -> Self {
        Self::Ready(value)
    }
}

impl fmt::Debug for PolicyAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// Ordinary boolean coercion of an answer value
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Fold every possible callback outcome into a single deferred boolean.
///
/// `None` is an absent callback and always denies.
pub fn normalize(answer: Option<Result<PolicyAnswer, PolicyFault>>) -> DeferredBool {
    match answer {
        None => future::ready(Ok(false)).boxed(),
        Some(Err(fault)) => future::ready(Err(fault)).boxed(),
        Some(Ok(PolicyAnswer::Ready(value))) => future::ready(Ok(is_truthy(&value))).boxed(),
        Some(Ok(PolicyAnswer::Pending(pending))) => {
            async move { pending.await.map(|value| is_truthy(&value)) }.boxed()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settle(answer: Option<Result<PolicyAnswer, PolicyFault>>) -> Result<bool, PolicyFault> {
        smol::block_on(normalize(answer))
    }

    #[test]
    fn test_absent_denies() {
        assert_eq!(settle(None), Ok(false));
    }

    #[test]
    fn test_immediate_and_deferred_agree() {
        assert_eq!(settle(Some(Ok(true.into()))), Ok(true));
        assert_eq!(settle(Some(Ok(false.into()))), Ok(false));
        assert_eq!(settle(Some(Ok(PolicyAnswer::resolved(true)))), Ok(true));
        assert_eq!(settle(Some(Ok(PolicyAnswer::resolved(false)))), Ok(false));
    }

    #[test]
    fn test_truthiness_coercion() {
        assert!(!is_truthy(&Value::Null));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!(-0.5)));
        assert!(is_truthy(&json!("false")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));

        assert_eq!(settle(Some(Ok(PolicyAnswer::ready("yes")))), Ok(true));
        assert_eq!(settle(Some(Ok(PolicyAnswer::resolved(Value::Null)))), Ok(false));
    }

    #[test]
    fn test_faults_propagate() {
        let fault = PolicyFault::new("policy exploded");
        assert_eq!(settle(Some(Err(fault.clone()))), Err(fault.clone()));
        assert_eq!(settle(Some(Ok(PolicyAnswer::rejected(fault.clone())))), Err(fault));
    }

    #[test]
    fn test_pending_future_is_awaited() {
        let answer = PolicyAnswer::pending(async {
            smol::Timer::after(std::time::Duration::from_millis(5)).await;
            Ok::<_, PolicyFault>(true)
        });
        assert_eq!(settle(Some(Ok(answer))), Ok(true));
    }
}
