//! Google OAuth bridge.
//!
//! Sign-in starts with a full navigation to the backend's `/google` entry
//! point and ends when the backend redirects back with `token` and `user`
//! query parameters, which [`CallbackLanding`] feeds into the session.

use std::time::Duration;

use crate::config::GoogleConfig;
use crate::session::AuthSession;

/// Set to skip opening the system browser (tests, headless machines).
pub const NO_BROWSER_ENV: &str = "CABINET_NO_BROWSER";

/// Where the user goes once the callback view is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    Login,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Dashboard => "/dashboard",
            Route::Login => "/login",
        }
    }
}

/// Opens the backend's OAuth entry point in the system browser.
///
/// Returns the URL so callers can show it when no browser could be opened.
pub fn redirect_to_google(session: &AuthSession) -> String {
    let url = session.api().google_auth_url();
    if let Err(e) = open_in_browser(&url) {
        tracing::warn!(error = %e, "could not open browser");
    }
    url
}

/// Opens `url` in the system browser unless [`NO_BROWSER_ENV`] is set.
///
/// # Errors
/// Returns the launcher's error if no browser could be started.
pub fn open_in_browser(url: &str) -> std::io::Result<()> {
    if std::env::var_os(NO_BROWSER_ENV).is_some() {
        return Ok(());
    }
    open::that(url)
}

/// Outcome of the callback landing view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Landing {
    pub authenticated: bool,
    pub route: Route,
    pub delay: Duration,
}

impl Landing {
    /// Waits out the confirmation delay and returns the route to navigate to.
    pub async fn navigate(self) -> Route {
        tokio::time::sleep(self.delay).await;
        self.route
    }
}

/// The view that receives the backend's redirect.
#[derive(Debug, Clone)]
pub struct CallbackLanding {
    success_delay: Duration,
    failure_delay: Duration,
}

impl CallbackLanding {
    pub fn new(success_delay: Duration, failure_delay: Duration) -> Self {
        Self {
            success_delay,
            failure_delay,
        }
    }

    pub fn from_config(config: &GoogleConfig) -> Self {
        Self::new(config.success_delay(), config.failure_delay())
    }

    /// Decides where to go without waiting.
    pub fn resolve(&self, session: &mut AuthSession, params: &str) -> Landing {
        if session.handle_google_callback(params) {
            Landing {
                authenticated: true,
                route: Route::Dashboard,
                delay: self.success_delay,
            }
        } else {
            Landing {
                authenticated: false,
                route: Route::Login,
                delay: self.failure_delay,
            }
        }
    }
}

impl Default for CallbackLanding {
    fn default() -> Self {
        Self::from_config(&GoogleConfig::default())
    }
}
