//! Client-side routes of the console.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The three views the console can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    /// Entry route, `/`: the sign-in form.
    SignIn,
    /// `/registration`: the sign-up form.
    Registration,
    /// `/privatePage`: the moderation view. Requires a session.
    PrivatePage,
}

impl Route {
    pub const ALL: [Route; 3] = [Route::SignIn, Route::Registration, Route::PrivatePage];

    pub fn path(&self) -> &'static str {
        match self {
            Route::SignIn => "/",
            Route::Registration => "/registration",
            Route::PrivatePage => "/privatePage",
        }
    }

    /// Resolves a path to a route.
    ///
    /// Matching is case-insensitive and tolerates a trailing slash, so
    /// `/privatepage` and `/privatePage/` both land on the moderation view.
    pub fn from_path(path: &str) -> Option<Route> {
        let trimmed = path.trim();
        let normalized = if trimmed.len() > 1 {
            trimmed.trim_end_matches('/')
        } else {
            trimmed
        };
        Self::ALL
            .into_iter()
            .find(|route| route.path().eq_ignore_ascii_case(normalized))
    }

    /// Whether the route may only render with a session present.
    pub fn is_protected(&self) -> bool {
        matches!(self, Route::PrivatePage)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
