//! `fuellog` - CLI for the fuel-norm and trip-log keeper
//!
//! This binary runs the terminal chat session and offers direct commands
//! for the vehicle registry, trip logs and configuration.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;
use tokio::io::BufReader;

use fuellog::chat::{run_session, Assistant, LineTransport};
use fuellog::cli::{
    ChatCommand, Cli, Command, ConfigCommand, StatusCommand, TripsCommand, VehicleCommand,
};
use fuellog::{init_logging, storage, Config, KeyValueStore, SessionId, StoreStats, TripLog};
use fuellog::{Vehicle, VehicleRegistry};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    // Execute the command
    match cli.command {
        Command::Chat(chat_cmd) => handle_chat(&config, &chat_cmd),
        Command::Vehicle(vehicle_cmd) => handle_vehicle(&config, vehicle_cmd),
        Command::Trips(trips_cmd) => handle_trips(&config, &trips_cmd),
        Command::Status(status_cmd) => handle_status(&config, &status_cmd),
        Command::Config(config_cmd) => handle_config(&config, cli.config, config_cmd),
    }
}

fn open_store(config: &Config) -> anyhow::Result<Box<dyn KeyValueStore>> {
    storage::open(config).context("failed to open storage")
}

fn handle_chat(config: &Config, cmd: &ChatCommand) -> anyhow::Result<()> {
    let user_id = cmd.user.clone().unwrap_or_else(|| config.chat.user_id.clone());
    let session = SessionId::new(format!("terminal-{}", std::process::id()));
    let mut assistant = Assistant::new(open_store(config)?, &config.workflow);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;

    runtime.block_on(async {
        let mut transport = LineTransport::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout());
        run_session(&mut transport, &mut assistant, &session, &user_id).await
    })?;
    Ok(())
}

fn print_vehicle(vehicle: &Vehicle) {
    println!("Vehicle {}", vehicle.id);
    println!("  City:     {}", vehicle.norms.city);
    println!("  Highway:  {}", vehicle.norms.highway);
    println!("  District: {}", vehicle.norms.district);
    println!("  Idle:     {}", vehicle.norms.idle);
}

fn handle_vehicle(config: &Config, cmd: VehicleCommand) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let registry = VehicleRegistry::new(store.as_ref());

    match cmd {
        VehicleCommand::Add { id, norms } => {
            let vehicle = registry.register(&id, norms.to_norms()?)?;
            println!("Registered.");
            print_vehicle(&vehicle);
        }
        VehicleCommand::List => {
            let ids = registry.list()?;
            if ids.is_empty() {
                println!("No vehicles registered yet.");
            }
            for id in ids {
                println!("{id}");
            }
        }
        VehicleCommand::Show { id } => print_vehicle(&registry.get(&id)?),
        VehicleCommand::Edit { id, norms } => {
            let vehicle = registry.update(&id, norms.to_norms()?)?;
            println!("Norms updated.");
            print_vehicle(&vehicle);
        }
        VehicleCommand::Delete { id, yes } => {
            if yes {
                registry.delete(&id)?;
                println!("Vehicle {id} deleted.");
            } else {
                // Surface NotFound before asking for confirmation
                registry.get(&id)?;
                println!("This will delete vehicle {id}.");
                println!("Use --yes to confirm.");
            }
        }
    }
    Ok(())
}

fn handle_trips(config: &Config, cmd: &TripsCommand) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let trips = TripLog::new(store.as_ref()).list(&cmd.user)?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&trips)?);
        return Ok(());
    }

    if trips.is_empty() {
        println!("No trips logged for {}.", cmd.user);
        return Ok(());
    }

    println!(
        "{:<4} {:<12} {:>10} {:>10} {:>8} {:>10} {:>10}",
        "#", "Vehicle", "Start", "End", "Km", "Fuel", "Fuel left"
    );
    for (n, trip) in trips.iter().enumerate() {
        println!(
            "{:<4} {:<12} {:>10} {:>10} {:>8} {:>10.2} {:>10.2}",
            n + 1,
            trip.car,
            trip.start_odometer,
            trip.end_odometer,
            trip.km,
            trip.total_fuel,
            trip.fuel_end
        );
    }
    Ok(())
}

fn handle_status(config: &Config, cmd: &StatusCommand) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let stats = StoreStats::collect(store.as_ref())?;

    let log = TripLog::new(store.as_ref());
    let mut trips = 0;
    for user in log.users()? {
        trips += log.list(&user)?.len();
    }

    if cmd.json {
        let status = serde_json::json!({
            "backend": config.storage.backend,
            "location": stats.location,
            "vehicles": stats.vehicles,
            "users": stats.users,
            "trips": trips,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("fuellog status");
        println!("--------------");
        println!("Backend:   {}", config.storage.backend);
        println!("Location:  {}", stats.location);
        println!("Vehicles:  {}", stats.vehicles);
        println!("Users:     {}", stats.users);
        println!("Trips:     {trips}");
    }
    Ok(())
}

fn handle_config(
    config: &Config,
    config_path: Option<std::path::PathBuf>,
    cmd: ConfigCommand,
) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Backend:            {}", config.storage.backend);
                println!("  Database path:      {}", config.database_path().display());
                println!("  Data directory:     {}", config.data_dir().display());
                println!();
                println!("[Workflow]");
                println!(
                    "  Distance tolerance: {} km",
                    config.workflow.distribution_tolerance
                );
                println!();
                println!("[Chat]");
                println!("  User id:            {}", config.chat.user_id);
            }
        }
        ConfigCommand::Path => {
            let path = config_path.unwrap_or_else(Config::default_config_path);
            println!("{}", path.display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
