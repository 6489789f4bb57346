use std::{
    error::Error,
    io,
    path::{Path, PathBuf},
    process::exit,
};

use clap::Parser;
use time::UtcOffset;

use pocket_planner::{DEFAULT_PIN, PocketPlanner, SettingsStore, setup_logging};

/// The number of wrong answers allowed before giving up.
const MAX_ATTEMPTS: usize = 3;

/// A utility for resetting a forgotten PIN by answering the security question.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, env = "POCKET_PLANNER_DB", default_value = "pocket_planner.db")]
    db_path: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    setup_logging(None)?;
    validate_db_path(&args.db_path);

    // Timestamps are never written here, so the offset does not matter.
    let mut planner = PocketPlanner::open(&args.db_path, UtcOffset::UTC)?;
    let security_question = planner.settings().get_security_qa()?;

    println!("Security question: {}", security_question.question);

    for attempt in 1..=MAX_ATTEMPTS {
        let answer = match rpassword::prompt_password("Answer: ") {
            Ok(string) => string,
            Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => {
                return Ok(());
            }
            Err(error) => {
                print_error(format!("Could not read answer from stdin: {error}"));
                exit(1);
            }
        };

        if planner.settings_mut().verify_security_answer(&answer)? {
            println!("PIN reset to {DEFAULT_PIN}. Change it with `planner settings pin`.");
            return Ok(());
        }

        if attempt < MAX_ATTEMPTS {
            print_error("Incorrect answer, try again.");
        }
    }

    print_error("Incorrect answer. The PIN was not reset.");
    exit(1);
}

fn validate_db_path(db_path: &Path) {
    match db_path.extension() {
        Some(extension) if !extension.is_empty() => {}
        _ => {
            print_error("Database path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
    }

    if !db_path.is_file() {
        print_error(format!("File does not exist at {db_path:#?}!"));
        exit(1);
    }
}

fn print_error(error: impl ToString) {
    eprintln!(
        "\x1b[31;1m{}\x1b[0m",
        capitalise_first_char(&error.to_string())
    )
}

fn capitalise_first_char(string: &str) -> String {
    let mut chars = string.chars();
    let Some(first) = chars.next() else {
        return String::with_capacity(0);
    };
    first.to_uppercase().chain(chars).collect()
}
