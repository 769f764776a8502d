use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::{error, info};
use serde::Serialize;
use vms::configuration::Config;
use vms::controller::Controller;
use vms::error_handling::types::ControllerError;
use vms::reporting::ReportPeriod;
use vms::visitor_ledger::FormField;

#[derive(Parser)]
#[command(name = "vms")]
#[command(version)]
#[command(about = "Visitor management for the ministry reception desk")]
struct Args {
    /// TOML configuration file; built-in defaults are used when omitted
    #[arg(short, long, env = "VMS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the web interface
    Serve,
    /// Open a session for a front-desk account
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Close the current session
    Logout,
    /// Show the logged-in account
    Whoami,
    /// Register a visitor and print the issued record
    Register(RegisterArgs),
    /// Mark a visitor as checked out
    Checkout { code: String },
    /// List departments and their floors
    Departments,
    /// Show today's overview
    Dashboard,
    /// Print report data for a period
    Report {
        #[arg(short, long, default_value = "today")]
        period: ReportPeriod,
        /// Wrap the data with its generation time, as downloaded from the web interface
        #[arg(long)]
        export: bool,
    },
}

#[derive(clap::Args)]
struct RegisterArgs {
    #[arg(long)]
    full_name: String,
    #[arg(long)]
    id_number: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    department: String,
    #[arg(long)]
    purpose: String,
    #[arg(long)]
    person_to_visit: String,
    /// 30 minutes, 1 hour, 2 hours, Half day or Full day
    #[arg(long)]
    duration: String,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    company: Option<String>,
    #[arg(long)]
    items: Option<String>,
    #[arg(long)]
    vehicle_reg: Option<String>,
}

impl RegisterArgs {
    fn fields(&self) -> Vec<(FormField, String)> {
        let mut fields = vec![
            (FormField::FullName, self.full_name.clone()),
            (FormField::IdNumber, self.id_number.clone()),
            (FormField::PhoneNumber, self.phone.clone()),
            (FormField::Purpose, self.purpose.clone()),
            (FormField::PersonToVisit, self.person_to_visit.clone()),
            (FormField::ExpectedDuration, self.duration.clone()),
        ];
        let optional = [
            (FormField::Email, &self.email),
            (FormField::Company, &self.company),
            (FormField::Items, &self.items),
            (FormField::VehicleReg, &self.vehicle_reg),
        ];
        for (field, value) in optional {
            if let Some(value) = value {
                fields.push((field, value.clone()));
            }
        }
        fields
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), ControllerError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| ControllerError::InitializationFailed(e.to_string()))?;
    println!("{}", text);
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<Config, ControllerError> {
    let config = match path {
        Some(path) => Config::from_file(path)?,
        None => {
            info!("No configuration file given, using defaults");
            Config::from_toml_str("")?
        }
    };
    Ok(config)
}

fn run(args: Args) -> Result<(), ControllerError> {
    let config = load_config(args.config.as_ref())?;
    let controller = Controller::new(config)?;

    match args.command {
        Command::Serve => {
            // declared after the controller so it shuts down first
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .map_err(|e| ControllerError::InitializationFailed(e.to_string()))?;
            runtime.block_on(controller.serve())?;
        }
        Command::Login { username, password } => {
            let session = controller.login(&username, &password)?;
            print_json(&session)?;
        }
        Command::Logout => {
            controller.logout()?;
            println!("Logged out");
        }
        Command::Whoami => match controller.whoami()? {
            Some(session) => print_json(&session)?,
            None => println!("Not logged in"),
        },
        Command::Register(register) => {
            let record = controller.register(&register.fields(), &register.department)?;
            print_json(&record)?;
        }
        Command::Checkout { code } => {
            let record = controller.check_out(&code)?;
            print_json(&record)?;
        }
        Command::Departments => print_json(&controller.departments()?)?,
        Command::Dashboard => print_json(&controller.dashboard()?)?,
        Command::Report { period, export } => {
            if export {
                print_json(&controller.export_report(period)?)?;
            } else {
                print_json(&controller.report(period)?)?;
            }
        }
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_target(false)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        error!("{}", e);
        std::process::exit(1);
    }
}
