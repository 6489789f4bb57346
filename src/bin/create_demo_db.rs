use std::{error::Error, path::PathBuf, process::exit};

use clap::Parser;
use time::{Duration, PrimitiveDateTime, Time};

use pocket_planner::{
    Category, DEFAULT_PIN, Kind, NewTransaction, PocketPlanner, RecordStore, SettingsStore,
    get_local_offset, local_now, setup_logging,
};

/// A utility for creating a database filled with sample transactions.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: PathBuf,

    /// The timezone the sample transactions are dated in.
    #[arg(long, default_value = "Etc/UTC")]
    timezone: String,
}

/// (days ago, title, amount, kind, category), oldest first so that IDs
/// follow the dates.
const SAMPLES: [(i64, &str, f64, Kind, Category); 14] = [
    (100, "Freelance work", 12000.0, Kind::Income, Category::Other),
    (95, "Internet bill", 999.0, Kind::Expense, Category::Bills),
    (70, "Birthday present", 1500.0, Kind::Expense, Category::Gifts),
    (64, "Monthly salary", 55000.0, Kind::Income, Category::Salary),
    (62, "Online course", 3500.0, Kind::Expense, Category::Education),
    (45, "Pharmacy", 650.0, Kind::Expense, Category::Health),
    (40, "Running shoes", 4300.0, Kind::Expense, Category::Shopping),
    (33, "Monthly salary", 55000.0, Kind::Income, Category::Salary),
    (30, "Train tickets", 1200.0, Kind::Expense, Category::Travel),
    (9, "Movie night", 700.0, Kind::Expense, Category::Entertainment),
    (5, "Monthly salary", 55000.0, Kind::Income, Category::Salary),
    (3, "Electricity bill", 2400.0, Kind::Expense, Category::Bills),
    (1, "Coffee with friends", 320.0, Kind::Expense, Category::Food),
    (0, "Groceries", 1850.0, Kind::Expense, Category::Food),
];

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    setup_logging(None)?;
    let output_path = args.output_path.as_path();

    match output_path.extension() {
        Some(extension) if !extension.is_empty() => {}
        _ => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    let offset = get_local_offset(&args.timezone)?;

    println!("Creating database at {output_path:#?}");
    let mut planner = PocketPlanner::open(output_path, offset)?;

    println!("Adding sample transactions...");
    let today = local_now(offset).date();
    let noon = Time::from_hms(12, 0, 0)?;

    for (days_ago, title, amount, kind, category) in SAMPLES {
        let created_at = PrimitiveDateTime::new(today - Duration::days(days_ago), noon);
        let new = NewTransaction::new(title, amount, kind, category)?;
        planner.records_mut().add_at(new, created_at)?;
    }

    planner.settings_mut().set_budget(5000.0)?;

    println!("Success! Unlock it with the PIN {DEFAULT_PIN}.");

    Ok(())
}
