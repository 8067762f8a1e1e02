//! The dispensing gate: at most one successful disbursement per requester
//! identity per rolling window.
//!
//! A request calls [`RateLimiter::begin`] to obtain a [`Claim`], performs
//! the disbursement, and calls [`Claim::commit`] once the transfer is
//! confirmed. The claim reserves the identity while its disbursement is
//! in flight, so two concurrent requests for the same identity can never
//! both pass the gate, but the cooldown only starts at commit. Dropping
//! an uncommitted claim (validation failure, send failure, or a client
//! that disconnected mid-request) releases the reservation without
//! consuming the identity's quota.
//!
//! Entries are never evicted; the map grows with the number of distinct
//! identities seen since process start. That is an accepted property of
//! this design, not an oversight.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Outcome of a gate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The identity may receive a disbursement.
    Allowed,
    /// The identity is cooling down; retry after the given duration.
    Denied {
        /// Time remaining until the identity becomes eligible again.
        retry_after: Duration,
    },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed)
    }
}

/// Tracks last-disbursement timestamps per requester identity.
pub struct RateLimiter {
    window: Duration,
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    /// Identity -> instant of the last committed disbursement.
    last_grant: HashMap<String, Instant>,
    /// Identities with a disbursement currently executing.
    in_flight: HashSet<String>,
}

impl RateLimiter {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// The configured cooldown window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Whether `identity` is eligible at `now`. Never mutates, so
    /// repeated calls give the same answer.
    pub fn check(&self, identity: &str, now: Instant) -> Decision {
        self.decide(&self.inner.lock(), identity, now)
    }

    /// `check` plus an in-flight reservation held by the returned
    /// [`Claim`]. While a disbursement for `identity` is executing,
    /// further `begin` calls return the denial's retry-after duration.
    pub fn begin(
        gate: &Arc<RateLimiter>,
        identity: &str,
        now: Instant,
    ) -> Result<Claim, Duration> {
        let mut inner = gate.inner.lock();
        if inner.in_flight.contains(identity) {
            return Err(gate.window);
        }
        if let Decision::Denied { retry_after } = gate.decide(&inner, identity, now) {
            return Err(retry_after);
        }
        inner.in_flight.insert(identity.to_string());
        Ok(Claim {
            gate: gate.clone(),
            identity: identity.to_string(),
            granted_at: now,
            committed: false,
        })
    }

    fn decide(&self, inner: &Inner, identity: &str, now: Instant) -> Decision {
        match inner.last_grant.get(identity) {
            None => Decision::Allowed,
            Some(prior) => {
                let elapsed = now.saturating_duration_since(*prior);
                if elapsed >= self.window {
                    Decision::Allowed
                } else {
                    Decision::Denied {
                        retry_after: self.window - elapsed,
                    }
                }
            }
        }
    }

    fn commit(&self, identity: &str, at: Instant) {
        let mut inner = self.inner.lock();
        inner.last_grant.insert(identity.to_string(), at);
        inner.in_flight.remove(identity);
    }

    fn abort(&self, identity: &str) {
        self.inner.lock().in_flight.remove(identity);
    }
}

/// An in-flight reservation for one identity.
///
/// Commit after a confirmed disbursement; dropping without committing
/// releases the reservation and preserves the quota.
pub struct Claim {
    gate: Arc<RateLimiter>,
    identity: String,
    granted_at: Instant,
    committed: bool,
}

impl Claim {
    /// Record the disbursement, starting the cooldown from the instant
    /// the claim was granted.
    pub fn commit(mut self) {
        self.gate.commit(&self.identity, self.granted_at);
        self.committed = true;
    }
}

impl Drop for Claim {
    fn drop(&mut self) {
        if !self.committed {
            self.gate.abort(&self.identity);
        }
    }
}
