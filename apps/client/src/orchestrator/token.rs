use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

/// Identifies one submission to an orchestrator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestToken(u64);

/// Hands out request tokens; only the most recently issued one is current.
#[derive(Debug, Default)]
pub struct RequestTokens {
    current: AtomicU64,
}

impl RequestTokens {
    pub fn issue(&self) -> RequestToken {
        RequestToken(self.current.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.current.load(Ordering::SeqCst) == token.0
    }

    /// Issues a token and publishes the pending state in one step, under the
    /// channel's write lock.
    pub fn begin<S>(&self, state: &watch::Sender<S>, pending: S) -> RequestToken {
        let mut token = RequestToken::default();
        state.send_modify(|current| {
            token = self.issue();
            *current = pending;
        });
        token
    }

    /// Publishes `outcome` only if `token` is still current. The check and the
    /// write happen under the same lock as `begin`.
    pub fn settle<S: Clone>(
        &self,
        state: &watch::Sender<S>,
        token: RequestToken,
        outcome: S,
    ) -> Completion<S> {
        let published = state.send_if_modified(|current| {
            if self.is_current(token) {
                *current = outcome.clone();
                true
            } else {
                false
            }
        });
        if published {
            Completion::Current(outcome)
        } else {
            Completion::Superseded
        }
    }
}

/// What a caller gets back from a submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion<T> {
    /// This request was still current; its outcome is now the published state.
    Current(T),
    /// A newer request was issued while this one was in flight. Its response was dropped.
    Superseded,
}

impl<T> Completion<T> {
    pub fn into_current(self) -> Option<T> {
        match self {
            Completion::Current(t) => Some(t),
            Completion::Superseded => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_token_is_current() {
        let tokens = RequestTokens::default();
        let first = tokens.issue();
        assert!(tokens.is_current(first));
        let second = tokens.issue();
        assert!(!tokens.is_current(first));
        assert!(tokens.is_current(second));
    }

    #[test]
    fn test_settle_drops_superseded_outcome() {
        let tokens = RequestTokens::default();
        let (state, rx) = watch::channel("idle");
        let first = tokens.begin(&state, "pending first");
        let second = tokens.begin(&state, "pending second");

        assert_eq!(tokens.settle(&state, second, "second"), Completion::Current("second"));
        assert_eq!(tokens.settle(&state, first, "first"), Completion::Superseded);
        assert_eq!(*rx.borrow(), "second");
    }

    #[test]
    fn test_default_token_is_never_current_after_issue() {
        let tokens = RequestTokens::default();
        tokens.issue();
        assert!(!tokens.is_current(RequestToken::default()));
    }
}
