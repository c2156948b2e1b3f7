//! Event handling for the conversation.

use tracing::{debug, error, warn};

use crate::config::WorkflowConfig;
use crate::error::{Error, ErrorKind};
use crate::registry::{self, Norms, VehicleRegistry};
use crate::session::{Flow, SessionId, Sessions};
use crate::storage::KeyValueStore;
use crate::trips::TripLog;
use crate::workflow::{self, Advance, TripSession, TripStep};

use super::{Action, ListPurpose, Prompt, Reply, ReplyBody};

/// Handles inbound actions, one at a time, against the stores.
#[derive(Debug)]
pub struct Assistant {
    store: Box<dyn KeyValueStore>,
    sessions: Sessions,
    tolerance: f64,
}

impl Assistant {
    /// Create an assistant over `store`.
    #[must_use]
    pub fn new(store: Box<dyn KeyValueStore>, workflow: &WorkflowConfig) -> Self {
        Self {
            store,
            sessions: Sessions::new(),
            tolerance: workflow.distribution_tolerance,
        }
    }

    /// Active flows.
    #[must_use]
    pub fn sessions(&self) -> &Sessions {
        &self.sessions
    }

    /// The backing store.
    #[must_use]
    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    /// Handle one action from `session`, recording trips under `user_id`.
    ///
    /// Never fails: every error becomes a [`ReplyBody::Failed`] reply.
    pub fn handle(&mut self, session: &SessionId, user_id: &str, action: Action) -> Reply {
        debug!("Session {} sent {:?}", session, action);

        match action {
            Action::Start | Action::MainMenu => {
                let cancelled = self.sessions.end(session).is_some();
                Reply::main_menu(cancelled)
            }
            Action::AddVehicle => {
                self.sessions.begin(session, Flow::RegisterVehicle);
                Reply::prompt(Prompt::VehicleData).with_main_menu()
            }
            Action::ListVehicles => self.vehicle_list(ListPurpose::Browse),
            Action::ViewNormsMenu => self.vehicle_list(ListPurpose::Norms),
            Action::AddTripMenu => self.vehicle_list(ListPurpose::Trip),
            Action::ViewVehicle { id } => self.view_vehicle(&id),
            Action::EditNorms { id } => self.start_edit(session, id),
            Action::ConfirmDelete { id } => self.confirm_delete(id),
            Action::DeleteVehicle { id } => self.delete_vehicle(id),
            Action::AddTrip { id } => self.start_trip(session, &id),
            Action::Text(text) => self.answer(session, user_id, &text),
        }
    }

    fn registry(&self) -> VehicleRegistry<'_> {
        VehicleRegistry::new(self.store.as_ref())
    }

    fn vehicle_list(&self, purpose: ListPurpose) -> Reply {
        let ids = match self.registry().list() {
            Ok(ids) => ids,
            Err(e) => return failure(&e, None).with_main_menu(),
        };

        if ids.is_empty() {
            return Reply::new(ReplyBody::NoVehicles).with_main_menu();
        }

        let mut reply = Reply::new(ReplyBody::VehicleList {
            purpose,
            ids: ids.clone(),
        });
        for id in ids {
            let action = match purpose {
                ListPurpose::Browse | ListPurpose::Norms => Action::ViewVehicle { id: id.clone() },
                ListPurpose::Trip => Action::AddTrip { id: id.clone() },
            };
            reply = reply.with_button(id, action);
        }
        reply.with_main_menu()
    }

    fn view_vehicle(&self, id: &str) -> Reply {
        match self.registry().get(id) {
            Ok(vehicle) => {
                let id = vehicle.id.clone();
                Reply::new(ReplyBody::VehicleCard(vehicle))
                    .with_button("Edit norms", Action::EditNorms { id: id.clone() })
                    .with_button("Delete", Action::ConfirmDelete { id })
                    .with_button("Back", Action::ViewNormsMenu)
            }
            Err(e) => failure(&e, None).with_button("Back", Action::ViewNormsMenu),
        }
    }

    fn start_edit(&mut self, session: &SessionId, id: String) -> Reply {
        let exists = self.registry().contains(&id);
        match exists {
            Ok(true) => {
                let prompt = Prompt::Norms {
                    vehicle_id: id.clone(),
                };
                self.sessions
                    .begin(session, Flow::EditNorms { vehicle_id: id });
                Reply::prompt(prompt).with_main_menu()
            }
            Ok(false) => failure(&Error::vehicle_not_found(id), None).with_main_menu(),
            Err(e) => failure(&e, None).with_main_menu(),
        }
    }

    fn confirm_delete(&self, id: String) -> Reply {
        match self.registry().contains(&id) {
            Ok(true) => Reply::new(ReplyBody::ConfirmDelete { id: id.clone() })
                .with_button("Yes, delete", Action::DeleteVehicle { id: id.clone() })
                .with_button("Cancel", Action::ViewVehicle { id }),
            Ok(false) => failure(&Error::vehicle_not_found(id), None).with_main_menu(),
            Err(e) => failure(&e, None).with_main_menu(),
        }
    }

    fn delete_vehicle(&self, id: String) -> Reply {
        match self.registry().delete(&id) {
            Ok(()) => Reply::new(ReplyBody::VehicleDeleted { id })
                .with_button("Back to list", Action::ViewNormsMenu)
                .with_main_menu(),
            Err(e) => failure(&e, None).with_main_menu(),
        }
    }

    fn start_trip(&mut self, session: &SessionId, id: &str) -> Reply {
        let started = workflow::begin(&self.registry(), id);
        match started {
            Ok(trip) => {
                let vehicle_id = trip.vehicle_id().to_string();
                self.sessions.begin(session, Flow::Trip(trip));
                Reply::new(ReplyBody::TripStarted { vehicle_id }).with_main_menu()
            }
            Err(e) => failure(&e, None).with_main_menu(),
        }
    }

    fn answer(&mut self, session: &SessionId, user_id: &str, text: &str) -> Reply {
        let store = self.store.as_ref();
        let Some(flow) = self.sessions.get_mut(session) else {
            return Reply::new(ReplyBody::NoActiveFlow).with_main_menu();
        };

        let (reply, finished) = match flow {
            Flow::RegisterVehicle => register(store, text),
            Flow::EditNorms { vehicle_id } => edit_norms(store, vehicle_id, text),
            Flow::Trip(trip) => trip_answer(store, trip, user_id, text, self.tolerance),
        };

        if finished {
            self.sessions.end(session);
        }
        reply
    }
}

/// Build a failure reply, logging by severity.
fn failure(err: &Error, retry: Option<Prompt>) -> Reply {
    match err.kind() {
        ErrorKind::Storage | ErrorKind::Internal | ErrorKind::Config => {
            error!("Operation failed: {}", err);
        }
        _ => warn!("Rejected: {}", err),
    }
    Reply::failed(err, retry)
}

fn register(store: &dyn KeyValueStore, text: &str) -> (Reply, bool) {
    let result = registry::parse_registration(text)
        .and_then(|v| VehicleRegistry::new(store).register(&v.id, v.norms));

    match result {
        Ok(vehicle) => {
            let id = vehicle.id.clone();
            let reply = Reply::new(ReplyBody::VehicleRegistered(vehicle))
                .with_button("Add trip", Action::AddTrip { id })
                .with_main_menu();
            (reply, true)
        }
        Err(e) => (
            failure(&e, Some(Prompt::VehicleData)).with_main_menu(),
            false,
        ),
    }
}

fn edit_norms(store: &dyn KeyValueStore, vehicle_id: &str, text: &str) -> (Reply, bool) {
    let result = Norms::parse_line(text)
        .and_then(|norms| VehicleRegistry::new(store).update(vehicle_id, norms));

    match result {
        Ok(vehicle) => {
            let id = vehicle.id.clone();
            let reply = Reply::new(ReplyBody::NormsUpdated(vehicle))
                .with_button("Add trip", Action::AddTrip { id: id.clone() })
                .with_button("Back to vehicle", Action::ViewVehicle { id })
                .with_main_menu();
            (reply, true)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => (failure(&e, None).with_main_menu(), true),
        Err(e) => {
            let retry = Prompt::Norms {
                vehicle_id: vehicle_id.to_string(),
            };
            (failure(&e, Some(retry)).with_main_menu(), false)
        }
    }
}

fn trip_answer(
    store: &dyn KeyValueStore,
    trip: &mut TripSession,
    user_id: &str,
    text: &str,
    tolerance: f64,
) -> (Reply, bool) {
    let input = match trip.advance(text, tolerance) {
        Ok(Advance::Next(step)) => {
            return (Reply::prompt(Prompt::Trip(step)).with_main_menu(), false);
        }
        Ok(Advance::Ready(input)) => input,
        Err(e) if e.is_input_error() => {
            let retry = Prompt::Trip(trip.step());
            return (failure(&e, Some(retry)).with_main_menu(), false);
        }
        Err(e) => return (failure(&e, None).with_main_menu(), true),
    };

    let registry = VehicleRegistry::new(store);
    match workflow::finalize(&input, &registry, &TripLog::new(store), user_id) {
        Ok(summary) => {
            let id = summary.vehicle.id.clone();
            let reply = Reply::new(ReplyBody::TripRecorded(Box::new(summary)))
                .with_button("Add another trip", Action::AddTrip { id })
                .with_main_menu();
            (reply, true)
        }
        // The log was not written; ask for the last answer again
        Err(e) if matches!(e.kind(), ErrorKind::Storage | ErrorKind::Internal) => (
            failure(&e, Some(Prompt::Trip(TripStep::Refuel))).with_main_menu(),
            false,
        ),
        Err(e) => (failure(&e, None).with_main_menu(), true),
    }
}
