use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime, macros::time};

use fuelbook::{
    LinkedFields, NewFuelRecord, NewTollRecord, PasswordHash, SubmissionPolicy, ValidatedPassword,
    YearMonth, create_fuel_record, create_toll_record, create_user, initialize_db, parse_email,
    resolve_submission, set_budget, set_memo,
};

/// A utility for creating a test database for the fuelbook server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Fill-ups as (days ago, price per litre, litres, km since the last fill-up).
const SAMPLE_FILL_UPS: [(i64, i64, f64, i64); 5] = [
    (40, 1_612, 42.0, 0),
    (26, 1_598, 38.5, 510),
    (14, 1_630, 40.0, 472),
    (6, 1_645, 35.25, 498),
    (1, 1_640, 20.0, 431),
];

/// Tolls as (days ago, section, amount).
const SAMPLE_TOLLS: [(i64, &str, i64); 3] = [
    (30, "Seoul - Suwon", 1_900),
    (14, "Seoul - Daejeon", 8_200),
    (2, "Incheon Bridge", 5_500),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let connection = Connection::open(output_path)?;

    initialize_db(&connection)?;

    println!("Creating test user test@example.com with the password 'test'...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user(parse_email("test@example.com")?, password_hash, &connection)?;

    println!("Creating sample fill-ups and tolls...");

    let today = OffsetDateTime::now_utc().date();

    for (days_ago, unit_price, volume, distance) in SAMPLE_FILL_UPS {
        let amounts = resolve_submission(
            LinkedFields {
                unit_price: Some(unit_price),
                volume: Some(volume),
                total_cost: None,
            },
            SubmissionPolicy::default(),
        )?;

        create_fuel_record(
            user.id,
            &NewFuelRecord {
                date: today - Duration::days(days_ago),
                time: Some(time!(08:30)),
                region: Some("Seoul".to_owned()),
                station: Some("Gangnam Self".to_owned()),
                amounts,
                distance,
            },
            &connection,
        )?;
    }

    for (days_ago, section, amount) in SAMPLE_TOLLS {
        create_toll_record(
            user.id,
            &NewTollRecord {
                date: today - Duration::days(days_ago),
                section: Some(section.to_owned()),
                amount,
            },
            &connection,
        )?;
    }

    let this_month = YearMonth::from_date(today);
    set_budget(user.id, this_month, 250_000, &connection)?;
    set_budget(user.id, this_month.previous(), 200_000, &connection)?;
    set_memo(user.id, "Engine oil change due at 60,000 km.", &connection)?;

    println!("Success!");

    Ok(())
}
