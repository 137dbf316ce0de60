//! Deferred navigation tied to the wizard's lifetime. Dropping the guard aborts
//! the pending task, so a torn-down wizard never navigates.

use crate::reset::navigator::{NavigationContext, Navigator, Route};
use std::{sync::Arc, time::Duration};
use tokio::{task::JoinHandle, time::sleep};
use tracing::{debug, info};

/// Delay between a successful reset and the redirect to login.
pub const DEFAULT_REDIRECT_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug)]
pub struct ScheduledRedirect {
    handle: JoinHandle<()>,
}

impl ScheduledRedirect {
    /// Spawns a task that navigates once after `delay`. Must be called from
    /// within a Tokio runtime.
    pub fn spawn<N>(
        navigator: Arc<N>,
        route: Route,
        context: NavigationContext,
        delay: Duration,
    ) -> Self
    where
        N: Navigator + ?Sized + 'static,
    {
        debug!(%route, delay_ms = delay.as_millis(), "scheduling redirect");

        let handle = tokio::spawn(async move {
            sleep(delay).await;
            info!(%route, "redirecting");
            navigator.navigate(route, context);
        });

        Self { handle }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn cancel(self) {
        if !self.handle.is_finished() {
            debug!("cancelling scheduled redirect");
        }
        // Drop aborts the task.
    }
}

impl Drop for ScheduledRedirect {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
