//! Bootstrap Sequencer
//!
//! ```text
//! current_session (retried) ──► profile ──► realtime feed ──► collections ──► first render
//! ```
//!
//! The feed belongs to the session, not to bootstrap: `App::establish` starts
//! it for every sign-in path and logout stops it.
//!
//! The first render always happens: a failed session lookup boots anonymous
//! and the auth gate shows the login view.

use tracing::{info, warn};

use crate::app::App;
use crate::error::Result;
use crate::retry::RetryPolicy;
use crate::state::{Notice, View};

/// What bootstrapping produced
pub struct Boot {
    /// View shown after the first render
    pub view: View,
    pub authenticated: bool,
}

/// Establish the session, load data, render the first frame
pub async fn boot(app: &App) -> Result<Boot> {
    boot_with(app, &RetryPolicy::with_defaults()).await
}

pub async fn boot_with(app: &App, retry: &RetryPolicy) -> Result<Boot> {
    let gateway = app.gateway().clone();
    let session = match retry.execute(|| gateway.current_session()).await {
        Ok(session) => session,
        Err(e) => {
            warn!(error = %e, "Session lookup failed, starting anonymous");
            app.store()
                .push_notice(Notice::warning(e.user_message()));
            None
        }
    };

    let Some(session) = session else {
        info!("No session, booting anonymous");
        let view = app.store().render();
        return Ok(Boot {
            view,
            authenticated: false,
        });
    };

    app.establish(session).await?;
    let view = app.store().render();
    info!(%view, "Bootstrap complete");

    Ok(Boot {
        view,
        authenticated: true,
    })
}
