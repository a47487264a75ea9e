//! Session gate: route protection driven by session presence.

use usergate_core::Route;
use usergate_core::session::{Identity, SessionStore, SessionSubscription};

/// What the router should do with a requested route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Show the requested route.
    Render(Route),
    /// Show this route instead.
    Redirect(Route),
}

impl GateDecision {
    /// The route that ends up on screen.
    pub fn route(&self) -> Route {
        match self {
            GateDecision::Render(route) | GateDecision::Redirect(route) => *route,
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, GateDecision::Redirect(_))
    }
}

/// Decides whether a route may render.
pub struct SessionGate;

impl SessionGate {
    /// Protected routes render only with a session; everything else always
    /// renders. Without a session the visitor is sent to the entry route.
    pub fn decide(session: Option<&Identity>, requested: Route) -> GateDecision {
        if requested.is_protected() && session.is_none() {
            GateDecision::Redirect(Route::SignIn)
        } else {
            GateDecision::Render(requested)
        }
    }

    /// Mounts a gate that tracks the session store.
    ///
    /// The returned value holds a subscription; dropping it unmounts the gate.
    pub fn mount(store: &SessionStore) -> MountedGate {
        MountedGate {
            subscription: store.subscribe(),
        }
    }
}

/// A gate bound to a live session subscription.
pub struct MountedGate {
    subscription: SessionSubscription,
}

impl MountedGate {
    /// Decision for `requested` under the latest identity.
    pub fn decision(&self, requested: Route) -> GateDecision {
        SessionGate::decide(self.subscription.current().as_ref(), requested)
    }

    /// Waits for the next identity change and re-decides.
    ///
    /// Returns `None` once the session store is gone.
    pub async fn next_decision(&mut self, requested: Route) -> Option<GateDecision> {
        let identity = self.subscription.changed().await?;
        Some(SessionGate::decide(identity.as_ref(), requested))
    }
}
