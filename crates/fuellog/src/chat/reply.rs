//! Structured outbound replies.

use crate::error::{Error, ErrorKind};
use crate::registry::Vehicle;
use crate::workflow::{TripStep, TripSummary};

use super::Action;

/// A button offered with a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    /// Text shown on the button.
    pub label: String,
    /// Action sent when pressed.
    pub action: Action,
}

/// Why a vehicle list is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPurpose {
    /// Plain listing.
    Browse,
    /// Picking a vehicle to view its norms.
    Norms,
    /// Picking a vehicle for a trip.
    Trip,
}

/// An answer the active flow is waiting for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    /// Plate number and four norms.
    VehicleData,
    /// Four new norms.
    Norms {
        /// Vehicle being edited.
        vehicle_id: String,
    },
    /// One trip step.
    Trip(TripStep),
}

/// What a reply says.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyBody {
    /// The main menu.
    MainMenu {
        /// An active flow was abandoned to get here.
        cancelled: bool,
    },
    /// Registered vehicles to choose from.
    VehicleList {
        /// What the choice is for.
        purpose: ListPurpose,
        /// Plate numbers.
        ids: Vec<String>,
    },
    /// Nothing registered yet.
    NoVehicles,
    /// One vehicle with its norms.
    VehicleCard(Vehicle),
    /// A question.
    Prompt(Prompt),
    /// A vehicle was registered.
    VehicleRegistered(Vehicle),
    /// Norms were replaced.
    NormsUpdated(Vehicle),
    /// Deletion needs confirmation.
    ConfirmDelete {
        /// Plate number.
        id: String,
    },
    /// A vehicle was deleted.
    VehicleDeleted {
        /// Plate number.
        id: String,
    },
    /// A trip session started.
    TripStarted {
        /// Plate number.
        vehicle_id: String,
    },
    /// A trip was finalized and logged.
    TripRecorded(Box<TripSummary>),
    /// The last event failed.
    Failed {
        /// Error class.
        kind: ErrorKind,
        /// Error description.
        message: String,
        /// The question asked again, if the flow continues.
        retry: Option<Prompt>,
    },
    /// Text arrived while no flow was waiting for it.
    NoActiveFlow,
}

/// A reply with its buttons.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    /// Content.
    pub body: ReplyBody,
    /// Buttons, in display order.
    pub buttons: Vec<Button>,
}

impl Reply {
    /// A reply without buttons.
    #[must_use]
    pub fn new(body: ReplyBody) -> Self {
        Self {
            body,
            buttons: Vec::new(),
        }
    }

    /// The main menu with its four entries.
    #[must_use]
    pub fn main_menu(cancelled: bool) -> Self {
        Self::new(ReplyBody::MainMenu { cancelled })
            .with_button("Add vehicle", Action::AddVehicle)
            .with_button("List vehicles", Action::ListVehicles)
            .with_button("View norms", Action::ViewNormsMenu)
            .with_button("Add trip", Action::AddTripMenu)
    }

    /// Ask a question.
    #[must_use]
    pub fn prompt(prompt: Prompt) -> Self {
        Self::new(ReplyBody::Prompt(prompt))
    }

    /// Report a failure.
    #[must_use]
    pub fn failed(err: &Error, retry: Option<Prompt>) -> Self {
        Self::new(ReplyBody::Failed {
            kind: err.kind(),
            message: err.to_string(),
            retry,
        })
    }

    /// Append a button.
    #[must_use]
    pub fn with_button(mut self, label: impl Into<String>, action: Action) -> Self {
        self.buttons.push(Button {
            label: label.into(),
            action,
        });
        self
    }

    /// Append the "Main menu" button.
    #[must_use]
    pub fn with_main_menu(self) -> Self {
        self.with_button("Main menu", Action::MainMenu)
    }

    /// The failure class, if this reply reports one.
    #[must_use]
    pub fn failure(&self) -> Option<ErrorKind> {
        match &self.body {
            ReplyBody::Failed { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
