use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Date, Duration, OffsetDateTime};

use finsight::{
    NewTransaction, PasswordHash, TransactionType, ValidatedPassword, create_transaction,
    create_user, initialize_db,
};

/// A utility for creating a test database for the REST API server of finsight.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// (description, amount, days before today, type, category)
const DEMO_TRANSACTIONS: [(&str, f64, i64, TransactionType, &str); 8] = [
    ("Grocery Shopping", 85.42, 0, TransactionType::Expense, "Food & Dining"),
    ("Salary Deposit", 4500.0, 1, TransactionType::Income, "Income"),
    ("Gas Station", 45.2, 2, TransactionType::Expense, "Transportation"),
    ("Netflix Subscription", 15.99, 3, TransactionType::Expense, "Entertainment"),
    ("Restaurant Dinner", 67.8, 9, TransactionType::Expense, "Food & Dining"),
    ("Electricity Bill", 120.5, 12, TransactionType::Expense, "Bills & Utilities"),
    ("Online Shopping", 156.78, 35, TransactionType::Expense, "Shopping"),
    ("Pharmacy", 32.1, 40, TransactionType::Expense, "Healthcare"),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

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

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user(
        "Demo",
        &"demo@example.com".parse()?,
        password_hash,
        &conn,
    )?;

    println!("Creating demo transactions...");

    let today = OffsetDateTime::now_utc().date();
    for (description, amount, days_ago, kind, category) in DEMO_TRANSACTIONS {
        let date: Date = today - Duration::days(days_ago);
        let transaction = NewTransaction::new(description, amount, date, kind, Some(category))?;
        create_transaction(user.id, transaction, &conn)?;
    }

    println!("Success! Log in with demo@example.com and the password 'test'.");

    Ok(())
}
