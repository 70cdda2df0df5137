mod config;
mod exit_codes;
mod render;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use entity::{NewEmployee, YesNo};
use platform_db::Store;
use platform_obs::{init_tracing, shutdown_tracing};
use products_hr::{HrError, HrModule, Notice, analytics::DepartmentFilter};
use tracing::error;

use crate::config::AppConfig;
use crate::exit_codes::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "hr-dashboard", version, about = "HR attrition dashboard over the employee store")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rebuild the employee table from the CSV export
    Ingest,
    /// Show KPIs, distributions and the employee table
    View(ViewCommand),
    /// List the department filter options
    Departments,
    /// Add a new employee (attrition starts as "No")
    AddEmployee(AddEmployeeCommand),
    /// Change an existing employee's monthly income
    UpdateIncome {
        #[arg(long)]
        employee_id: i64,
        #[arg(long)]
        monthly_income: i64,
    },
}

#[derive(Args, Debug)]
struct ViewCommand {
    /// Department to filter on; "All" shows everyone
    #[arg(long, default_value = DepartmentFilter::ALL_LABEL)]
    department: String,
    /// Emit the view as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct AddEmployeeCommand {
    /// Defaults to one past the current highest id
    #[arg(long)]
    employee_id: Option<i64>,
    #[arg(long)]
    department: String,
    #[arg(long)]
    job_role: String,
    #[arg(long, default_value_t = 3)]
    performance_rating: i64,
    #[arg(long, value_parser = parse_yes_no, default_value = "No")]
    over_time: YesNo,
    #[arg(long)]
    monthly_income: i64,
}

fn parse_yes_no(value: &str) -> Result<YesNo, String> {
    YesNo::parse(value).ok_or_else(|| format!("expected Yes or No, got {value:?}"))
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err:#}");
            return ExitCode::ConfigError.into();
        }
    };
    if let Err(err) = init_tracing(config.obs.clone()) {
        eprintln!("failed to initialise logging: {err:#}");
        return ExitCode::ConfigError.into();
    }

    let store = Store::new(config.database.clone());
    let code = match cli.command {
        Commands::Ingest => run_ingest(&config, &store).await,
        Commands::View(opts) => run_view(HrModule::new(store), opts).await,
        Commands::Departments => run_departments(HrModule::new(store)).await,
        Commands::AddEmployee(opts) => run_add_employee(HrModule::new(store), opts).await,
        Commands::UpdateIncome {
            employee_id,
            monthly_income,
        } => {
            let hr = HrModule::new(store);
            let result = hr.update_income(employee_id, monthly_income).await;
            let message = format!("Employee {employee_id} monthly income set to {monthly_income}");
            report(result, message)
        }
    };
    shutdown_tracing();
    code.into()
}

async fn run_ingest(config: &AppConfig, store: &Store) -> ExitCode {
    match ingest::ingest(&config.ingest, store).await {
        Ok(report) => {
            println!("{report}");
            ExitCode::Success
        }
        Err(err) => {
            error!(error = %err, "ingestion failed");
            err.kind().into()
        }
    }
}

async fn run_view(hr: HrModule, opts: ViewCommand) -> ExitCode {
    let filter = DepartmentFilter::parse(&opts.department);
    let view = match hr.view(filter).await {
        Ok(view) => view,
        Err(err) => return fail(&err),
    };
    if opts.json {
        match serde_json::to_string_pretty(&view).context("failed to encode view") {
            Ok(json) => println!("{json}"),
            Err(err) => {
                error!("{err:#}");
                return ExitCode::Failure;
            }
        }
    } else {
        print!("{}", render::Dashboard(&view));
    }
    ExitCode::Success
}

async fn run_departments(hr: HrModule) -> ExitCode {
    match hr.departments().await {
        Ok(options) => {
            println!("{}", render::departments(&options));
            ExitCode::Success
        }
        Err(err) => fail(&err),
    }
}

async fn run_add_employee(hr: HrModule, opts: AddEmployeeCommand) -> ExitCode {
    let employee_id = match opts.employee_id {
        Some(id) => id,
        None => match hr.form_options().await {
            Ok(options) => options.next_employee_id,
            Err(err) => return fail(&err),
        },
    };
    let employee = NewEmployee {
        employee_id,
        department: opts.department,
        job_role: opts.job_role,
        performance_rating: opts.performance_rating,
        over_time: opts.over_time,
        monthly_income: opts.monthly_income,
    };
    let result = hr.add_employee(&employee).await;
    report(result, format!("Employee {employee_id} added successfully"))
}

/// Prints the outcome of a write as a notice; a refused write is not fatal
/// to the session, only to the exit status.
fn report(result: Result<(), HrError>, success: String) -> ExitCode {
    let notice = Notice::from_result(&result, success);
    match &notice {
        Notice::Success(message) => println!("{message}"),
        Notice::Error(message) => eprintln!("{message}"),
    }
    match result {
        Ok(()) => ExitCode::Success,
        Err(err) => ExitCode::for_hr_error(&err),
    }
}

fn fail(err: &HrError) -> ExitCode {
    error!(error = %err, "dashboard query failed");
    ExitCode::for_hr_error(err)
}
