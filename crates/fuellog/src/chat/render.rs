//! Plain-text rendering of replies.

use std::fmt::Write as _;

use crate::error::ErrorKind;
use crate::registry::{Vehicle, NORMS_FORMAT, VEHICLE_FORMAT};
use crate::workflow::{TripStep, TripSummary, DISTRIBUTION_FORMAT};

use super::{ListPurpose, Prompt, Reply, ReplyBody};

/// Render a reply, buttons included, as terminal text.
#[must_use]
pub fn render(reply: &Reply) -> String {
    let mut out = body_text(&reply.body);

    if !reply.buttons.is_empty() {
        out.push('\n');
        for button in &reply.buttons {
            if let Some(data) = button.action.callback() {
                let _ = write!(out, "\n  [{}] /{}", button.label, data);
            }
        }
    }
    out
}

/// The question text of a prompt.
#[must_use]
pub fn prompt_text(prompt: &Prompt) -> String {
    match prompt {
        Prompt::VehicleData => format!("Enter the vehicle number and its norms: {VEHICLE_FORMAT}"),
        Prompt::Norms { vehicle_id } => {
            format!("Enter new norms for {vehicle_id}: {NORMS_FORMAT}")
        }
        Prompt::Trip(step) => match step {
            TripStep::StartOdometer => "Odometer reading at departure:".to_string(),
            TripStep::Km => "Distance driven, km:".to_string(),
            TripStep::Distribution => format!("Distance breakdown: {DISTRIBUTION_FORMAT}"),
            TripStep::Idle => "Idle time, hours:".to_string(),
            TripStep::FuelStart => "Fuel in the tank at departure, l:".to_string(),
            TripStep::Refuel => "Fuel added, l:".to_string(),
        },
    }
}

fn body_text(body: &ReplyBody) -> String {
    match body {
        ReplyBody::MainMenu { cancelled } => {
            let head = if *cancelled { "Entry cancelled.\n" } else { "" };
            format!("{head}Main menu. Choose an action:")
        }
        ReplyBody::VehicleList { purpose, ids } => {
            let title = match purpose {
                ListPurpose::Browse => "Registered vehicles:",
                ListPurpose::Norms => "Choose a vehicle to view its norms:",
                ListPurpose::Trip => "Choose a vehicle for the trip:",
            };
            let mut out = title.to_string();
            for id in ids {
                let _ = write!(out, "\n  {id}");
            }
            out
        }
        ReplyBody::NoVehicles => "No vehicles registered yet.".to_string(),
        ReplyBody::VehicleCard(vehicle) => vehicle_card(vehicle),
        ReplyBody::Prompt(prompt) => prompt_text(prompt),
        ReplyBody::VehicleRegistered(vehicle) => {
            format!("Vehicle registered.\n{}", vehicle_card(vehicle))
        }
        ReplyBody::NormsUpdated(vehicle) => format!("Norms updated.\n{}", vehicle_card(vehicle)),
        ReplyBody::ConfirmDelete { id } => format!("Delete vehicle {id}?"),
        ReplyBody::VehicleDeleted { id } => format!("Vehicle {id} deleted."),
        ReplyBody::TripStarted { vehicle_id } => format!(
            "New trip for {vehicle_id}.\n{}",
            prompt_text(&Prompt::Trip(TripStep::StartOdometer))
        ),
        ReplyBody::TripRecorded(summary) => trip_summary(summary),
        ReplyBody::Failed {
            kind,
            message,
            retry,
        } => {
            let mut out = format!("{}: {message}", kind_label(*kind));
            if let Some(prompt) = retry {
                let _ = write!(out, "\n{}", prompt_text(prompt));
            }
            out
        }
        ReplyBody::NoActiveFlow => {
            "Nothing is waiting for input. Send /start to open the main menu.".to_string()
        }
    }
}

fn vehicle_card(vehicle: &Vehicle) -> String {
    let norms = &vehicle.norms;
    format!(
        "Vehicle {}\n  City:     {}\n  Highway:  {}\n  District: {}\n  Idle:     {}",
        vehicle.id, norms.city, norms.highway, norms.district, norms.idle
    )
}

fn trip_summary(summary: &TripSummary) -> String {
    let r = &summary.record;
    let norms = &summary.vehicle.norms;
    let fuel = &summary.fuel;
    format!(
        "Trip recorded for {}.\n\
         Odometer: {} -> {} ({} km)\n\
         Fuel used:\n  \
         City:     {} km x {} = {:.2}\n  \
         Highway:  {} km x {} = {:.2}\n  \
         District: {} km x {} = {:.2}\n  \
         Idle:     {} h x {} = {:.2}\n  \
         Total:    {:.2}\n\
         Fuel: {} at start + {} added - {:.2} used = {:.2} left\n\
         Trips logged: {}",
        r.car,
        r.start_odometer,
        r.end_odometer,
        r.km,
        r.city,
        norms.city,
        fuel.city,
        r.highway,
        norms.highway,
        fuel.highway,
        r.district,
        norms.district,
        fuel.district,
        r.idle,
        norms.idle,
        fuel.idle,
        r.total_fuel,
        r.fuel_start,
        r.refuel,
        r.total_fuel,
        r.fuel_end,
        summary.trip_count,
    )
}

fn kind_label(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::InvalidInput => "Invalid input",
        ErrorKind::Duplicate => "Already registered",
        ErrorKind::NotFound => "Not found",
        ErrorKind::Consistency => "Does not add up",
        ErrorKind::IncompleteSession => "Trip incomplete",
        ErrorKind::InvalidNorms => "Unusable norms",
        ErrorKind::Storage => "Could not save",
        ErrorKind::Config => "Configuration error",
        ErrorKind::Internal => "Internal error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Action;
    use crate::error::Error;
    use crate::registry::Norms;

    fn x001() -> Vehicle {
        Vehicle {
            id: "X001".into(),
            norms: Norms::parse("8.5", "6.2", "7.1", "1.0").unwrap(),
        }
    }

    #[test]
    fn test_render_main_menu_buttons() {
        let text = render(&Reply::main_menu(false));
        assert!(text.starts_with("Main menu"));
        assert!(text.contains("[Add vehicle] /add_car"));
        assert!(text.contains("[Add trip] /add_trip_menu"));
    }

    #[test]
    fn test_render_cancelled_menu() {
        assert!(render(&Reply::main_menu(true)).starts_with("Entry cancelled."));
    }

    #[test]
    fn test_render_vehicle_card() {
        let text = render(&Reply::new(ReplyBody::VehicleCard(x001())));
        assert!(text.contains("Vehicle X001"));
        assert!(text.contains("City:     8.5"));
        assert!(text.contains("Idle:     1.0"));
    }

    #[test]
    fn test_failure_names_expected_format() {
        let err = Error::invalid_input(NORMS_FORMAT, "9 7 8");
        let reply = Reply::failed(
            &err,
            Some(Prompt::Norms {
                vehicle_id: "X001".into(),
            }),
        );
        let text = render(&reply);
        assert!(text.starts_with("Invalid input:"));
        assert!(text.contains("Enter new norms for X001: <city> <highway> <district> <idle>"));
    }

    #[test]
    fn test_distribution_prompt() {
        let text = prompt_text(&Prompt::Trip(TripStep::Distribution));
        assert!(text.contains("<city_km> <highway_km> <district_km>"));
    }

    #[test]
    fn test_every_step_has_a_prompt() {
        for step in TripStep::ORDER {
            assert!(!prompt_text(&Prompt::Trip(step)).is_empty());
        }
    }

    #[test]
    fn test_vehicle_list() {
        let reply = Reply::new(ReplyBody::VehicleList {
            purpose: ListPurpose::Trip,
            ids: vec!["A1".into(), "B2".into()],
        })
        .with_button("A1", Action::AddTrip { id: "A1".into() });
        let text = render(&reply);
        assert!(text.starts_with("Choose a vehicle for the trip:"));
        assert!(text.contains("\n  B2"));
        assert!(text.contains("[A1] /add_trip_A1"));
    }
}
