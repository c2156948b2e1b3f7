//! Inbound actions and their callback encoding.

/// One inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Open the conversation.
    Start,
    /// Return to the main menu, abandoning any active flow.
    MainMenu,
    /// Begin vehicle registration.
    AddVehicle,
    /// List registered vehicles.
    ListVehicles,
    /// Choose a vehicle to view its norms.
    ViewNormsMenu,
    /// Show the norms of one vehicle.
    ViewVehicle {
        /// Plate number.
        id: String,
    },
    /// Begin editing the norms of a vehicle.
    EditNorms {
        /// Plate number.
        id: String,
    },
    /// Ask before deleting a vehicle.
    ConfirmDelete {
        /// Plate number.
        id: String,
    },
    /// Delete a vehicle.
    DeleteVehicle {
        /// Plate number.
        id: String,
    },
    /// Choose a vehicle for a new trip.
    AddTripMenu,
    /// Begin a trip for a vehicle.
    AddTrip {
        /// Plate number.
        id: String,
    },
    /// Free text answering the active flow.
    Text(String),
}

const ADD_CAR: &str = "add_car";
const LIST_CAR: &str = "list_car";
const VIEW_CAR_MENU: &str = "view_car_menu";
const ADD_TRIP_MENU: &str = "add_trip_menu";
const MAIN_MENU: &str = "main_menu";

const VIEW_CAR: &str = "view_car_";
const EDIT_NORMS: &str = "edit_norms_";
const CONFIRM_DELETE: &str = "confirm_delete_";
const DELETE_CAR: &str = "delete_car_";
const ADD_TRIP: &str = "add_trip_";

impl Action {
    /// Decode button callback data.
    ///
    /// Fixed callbacks are matched before prefixed ones, so `view_car_menu`
    /// is the menu and never a vehicle named `menu`. Prefixed callbacks need
    /// a non-empty identifier.
    #[must_use]
    pub fn from_callback(data: &str) -> Option<Self> {
        match data {
            ADD_CAR => return Some(Self::AddVehicle),
            LIST_CAR => return Some(Self::ListVehicles),
            VIEW_CAR_MENU => return Some(Self::ViewNormsMenu),
            ADD_TRIP_MENU => return Some(Self::AddTripMenu),
            MAIN_MENU => return Some(Self::MainMenu),
            _ => {}
        }

        let with_id = |prefix: &str| {
            data.strip_prefix(prefix)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
        };

        if let Some(id) = with_id(VIEW_CAR) {
            Some(Self::ViewVehicle { id })
        } else if let Some(id) = with_id(EDIT_NORMS) {
            Some(Self::EditNorms { id })
        } else if let Some(id) = with_id(CONFIRM_DELETE) {
            Some(Self::ConfirmDelete { id })
        } else if let Some(id) = with_id(DELETE_CAR) {
            Some(Self::DeleteVehicle { id })
        } else {
            with_id(ADD_TRIP).map(|id| Self::AddTrip { id })
        }
    }

    /// Encode as button callback data. `Start` and `Text` have none.
    #[must_use]
    pub fn callback(&self) -> Option<String> {
        let data = match self {
            Self::Start | Self::Text(_) => return None,
            Self::MainMenu => MAIN_MENU.to_string(),
            Self::AddVehicle => ADD_CAR.to_string(),
            Self::ListVehicles => LIST_CAR.to_string(),
            Self::ViewNormsMenu => VIEW_CAR_MENU.to_string(),
            Self::AddTripMenu => ADD_TRIP_MENU.to_string(),
            Self::ViewVehicle { id } => format!("{VIEW_CAR}{id}"),
            Self::EditNorms { id } => format!("{EDIT_NORMS}{id}"),
            Self::ConfirmDelete { id } => format!("{CONFIRM_DELETE}{id}"),
            Self::DeleteVehicle { id } => format!("{DELETE_CAR}{id}"),
            Self::AddTrip { id } => format!("{ADD_TRIP}{id}"),
        };
        Some(data)
    }
}
