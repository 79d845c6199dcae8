use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use expense_tracker::{
    Amount, Category, ExpenseFields, PasswordHash, Username, ValidatedPassword, create_expense,
    create_user, initialize_db,
};

/// A utility for creating a test database for the expense tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Titles, amounts in cents and categories that repeat through the test data.
const SAMPLE_EXPENSES: [(&str, i64, Category); 8] = [
    ("Groceries", 245_050, Category::Food),
    ("Coffee with friends", 36_000, Category::Food),
    ("Train tickets", 120_000, Category::Travel),
    ("Taxi to the airport", 85_075, Category::Travel),
    ("New shoes", 299_900, Category::Shopping),
    ("Electricity bill", 180_000, Category::Bills),
    ("Internet", 99_900, Category::Bills),
    ("Cinema", 50_000, Category::Entertainment),
];

/// The number of expenses to create.
const EXPENSE_COUNT: i64 = 40;

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
    let user = create_user(Username::new_unchecked("test"), password_hash, &conn)?;

    println!("Creating {EXPENSE_COUNT} expenses...");

    let today = OffsetDateTime::now_utc().date();

    for i in 0..EXPENSE_COUNT {
        let (title, cents, category) = SAMPLE_EXPENSES[i as usize % SAMPLE_EXPENSES.len()];
        create_expense(
            user.id,
            &ExpenseFields {
                title: title.to_owned(),
                amount: Amount::from_cents(cents + i * 37),
                category,
                date: today - Duration::days(i * 3),
            },
            &conn,
        )?;
    }

    println!("Success! Log in with the username 'test' and password 'test'.");

    Ok(())
}
