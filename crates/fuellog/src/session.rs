//! Conversational flow state, keyed by session.
//!
//! A session has at most one active flow. Starting a flow replaces whatever
//! was active before; the replaced flow is returned so callers can report
//! the cancellation.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, warn};

use crate::workflow::TripSession;

/// Identifies one conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Wrap an identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A multi-message interaction in progress.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    /// Waiting for `<number> <city> <highway> <district> <idle>`.
    RegisterVehicle,
    /// Waiting for the four new norms of a vehicle.
    EditNorms {
        /// Vehicle being edited.
        vehicle_id: String,
    },
    /// Collecting a trip.
    Trip(TripSession),
}

impl Flow {
    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::RegisterVehicle => "register_vehicle",
            Self::EditNorms { .. } => "edit_norms",
            Self::Trip(_) => "trip",
        }
    }
}

/// Active flows of every session.
#[derive(Debug, Default)]
pub struct Sessions {
    active: HashMap<SessionId, Flow>,
}

impl Sessions {
    /// No active flows.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `flow` the active flow of `session`, returning the one it replaces.
    pub fn begin(&mut self, session: &SessionId, flow: Flow) -> Option<Flow> {
        debug!("Session {} entering {}", session, flow.name());
        let previous = self.active.insert(session.clone(), flow);
        if let Some(old) = &previous {
            warn!("Session {} abandoned {} flow", session, old.name());
        }
        previous
    }

    /// End the active flow of `session`.
    pub fn end(&mut self, session: &SessionId) -> Option<Flow> {
        let ended = self.active.remove(session);
        if let Some(flow) = &ended {
            debug!("Session {} left {}", session, flow.name());
        }
        ended
    }

    /// The active flow of `session`.
    #[must_use]
    pub fn get(&self, session: &SessionId) -> Option<&Flow> {
        self.active.get(session)
    }

    /// The active flow of `session`, mutably.
    pub fn get_mut(&mut self, session: &SessionId) -> Option<&mut Flow> {
        self.active.get_mut(session)
    }

    /// Number of sessions with an active flow.
    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Whether no session has an active flow.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
