// ── Confirmation strategy ──
//
// Whether to go ahead with a set of changes is a pluggable decision: the
// CLI asks on the terminal, `--yes` and tests approve without asking.

use std::future::Future;

use crate::error::CoreError;
use crate::model::Action;

pub trait Confirmer: Send + Sync {
    /// Return `Ok(true)` to apply `actions`, `Ok(false)` to cancel the run.
    fn confirm(&self, actions: &[Action]) -> impl Future<Output = Result<bool, CoreError>> + Send;
}

impl<T: Confirmer> Confirmer for &T {
    fn confirm(&self, actions: &[Action]) -> impl Future<Output = Result<bool, CoreError>> + Send {
        (**self).confirm(actions)
    }
}

/// Approves every plan without asking.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoApprove;

impl Confirmer for AutoApprove {
    async fn confirm(&self, _actions: &[Action]) -> Result<bool, CoreError> {
        Ok(true)
    }
}
