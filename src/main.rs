//! spendcache - an offline-first family expense tracker client.
//!
//! Budget and expense state lives in a durable local cache and is
//! reconciled with the remote Store in the background: every mutation
//! applies locally first, then forwards when online. The Store being
//! unreachable never blocks the user.

mod api;
mod auth;
mod cache;
mod config;
mod models;
mod summaries;
mod sync;
mod utils;

use std::io::{self, Write};

use anyhow::{bail, Result};
use chrono::{Local, NaiveDate};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use api::StoreClient;
use auth::PinGate;
use cache::LocalCache;
use config::Config;
use models::{BudgetDraft, Category, NewExpense};
use sync::{EngineOptions, SyncEngine};
use utils::format_amount;

/// Number of expenses shown by `status`
const STATUS_EXPENSE_ROWS: usize = 10;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn print_usage() {
    eprintln!("spendcache - offline-first family expense tracker");
    eprintln!();
    eprintln!("Usage: spendcache [--offline] <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  status                              Show budget, totals, and sync state");
    eprintln!("  sync                                Pull authoritative state from the store");
    eprintln!("  set-budget <amount> <days> [start]  Set the budget (start defaults to today)");
    eprintln!("  delete-budget                       Delete the budget (asks for confirmation)");
    eprintln!("  add <name> <amount> <category> [date]");
    eprintln!("                                      Record an expense (date defaults to today)");
    eprintln!("  delete <id>                         Delete an expense by id");
    eprintln!("  unlock <pin>                        Unlock the tracker");
    eprintln!("  lock                                Lock the tracker");
    eprintln!();
    eprintln!("Categories: groceries, kitchen, utilities, transportation,");
    eprintln!("            healthcare, entertainment, other");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    init_tracing();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let offline = args.iter().any(|a| a == "--offline");
    args.retain(|a| a != "--offline");

    if args.is_empty() {
        print_usage();
        return Ok(());
    }

    let config = Config::load()?;
    let cache_dir = config.cache_dir()?;
    let cache = LocalCache::new(cache_dir.clone())?;
    let store = StoreClient::new(config.api_base_url.clone())?;
    let gate = PinGate::new(cache_dir);
    let mut engine = SyncEngine::new(
        cache,
        store.clone(),
        EngineOptions {
            strict_expense_delete: config.strict_expense_delete,
            ..EngineOptions::default()
        },
    );
    if offline {
        engine.set_online(false);
    }

    let command = args[0].as_str();
    let rest = &args[1..];

    // The unlock command is the only one allowed through a locked gate
    if command == "unlock" {
        let pin = rest.first().map(String::as_str).unwrap_or_default();
        if pin.is_empty() {
            bail!("usage: spendcache unlock <pin>");
        }
        return if gate.unlock(&store, pin).await? {
            println!("Unlocked.");
            Ok(())
        } else {
            bail!("Invalid PIN")
        };
    }

    if !gate.is_unlocked() {
        bail!("Locked. Run `spendcache unlock <pin>` first.");
    }

    info!(command, offline, "spendcache starting");

    match command {
        "status" => {
            engine.pull_authoritative().await;
            print_status(&engine);
        }
        "sync" => {
            if engine.pull_authoritative().await {
                println!("Synced with store.");
            } else {
                println!("Sync failed; working from the local cache.");
            }
        }
        "set-budget" => {
            if rest.len() < 2 {
                bail!("usage: spendcache set-budget <amount> <days> [start]");
            }
            let draft = BudgetDraft {
                amount: parse_amount(&rest[0])?,
                days: rest[1]
                    .parse()
                    .map_err(|_| anyhow::anyhow!("invalid day count: {}", rest[1]))?,
                start_date: parse_date(rest.get(2))?,
            };
            engine.set_budget(draft).await?;
            if let Some(budget) = engine.budget() {
                println!(
                    "Budget set: {} over {} days ({} to {}).",
                    format_amount(budget.amount),
                    budget.days,
                    budget.start_date,
                    budget.end_date
                );
            }
            report_sync(&engine.budget_state());
        }
        "delete-budget" => {
            if engine.budget().is_none() {
                println!("No budget set.");
                return Ok(());
            }
            let confirmed = confirm("Delete the current budget? [y/N] ")?;
            if engine.delete_budget(confirmed).await? {
                println!("Budget deleted.");
            } else {
                println!("Cancelled.");
            }
        }
        "add" => {
            if rest.len() < 3 {
                bail!("usage: spendcache add <name> <amount> <category> [date]");
            }
            let expense = NewExpense {
                name: rest[0].clone(),
                amount: parse_amount(&rest[1])?,
                category: rest[2].parse::<Category>()?,
                date: parse_date(rest.get(3))?,
            };
            let id = engine.add_expense(expense).await?;
            let totals = engine.totals();
            println!(
                "Recorded expense #{}. Spent {} so far, {} remaining.",
                id,
                format_amount(totals.total_spent),
                format_amount(totals.remaining)
            );
            report_sync(&engine.expenses_state());
        }
        "delete" => {
            let id: i64 = rest
                .first()
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| anyhow::anyhow!("usage: spendcache delete <id>"))?;
            if engine.delete_expense(id).await? {
                println!("Expense #{} deleted.", id);
            } else {
                println!("No expense with id {}.", id);
            }
        }
        "lock" => {
            gate.lock()?;
            println!("Locked.");
        }
        _ => {
            print_usage();
            bail!("unknown command: {}", command);
        }
    }

    Ok(())
}

// Strict parse: coercion tolerance is for cache and Store data, not for
// arguments the user just typed
fn parse_amount(s: &str) -> Result<f64> {
    match s.trim().parse::<f64>() {
        Ok(amount) if amount.is_finite() => Ok(amount),
        _ => bail!("invalid amount: {}", s),
    }
}

fn parse_date(arg: Option<&String>) -> Result<NaiveDate> {
    match arg {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| anyhow::anyhow!("invalid date (expected YYYY-MM-DD): {}", s)),
        None => Ok(Local::now().date_naive()),
    }
}

/// Blocking yes/no prompt on stdin. Defaults to no.
fn confirm(prompt: &str) -> Result<bool> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    let answer = line.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

fn report_sync(state: &sync::SyncState) {
    match state {
        sync::SyncState::Synced => {}
        other => println!("({})", other.label()),
    }
}

fn print_status<S: api::Store>(engine: &SyncEngine<S>) {
    let connectivity = if !engine.is_online() {
        "offline"
    } else if engine.is_degraded() {
        "online (store unreachable, working from cache)"
    } else {
        "online"
    };
    println!("Connection: {}", connectivity);

    let ages = engine.cache().ages();
    println!(
        "Cache: budget {}, expenses {}",
        ages.budget_age(),
        ages.expenses_age()
    );
    println!();

    let totals = engine.totals();
    match engine.budget() {
        Some(budget) => {
            println!(
                "Budget: {} over {} days ({} to {}) [{}]",
                format_amount(budget.amount),
                budget.days,
                budget.start_date,
                budget.end_date,
                engine.budget_state().label()
            );
            println!(
                "Spent {} ({:.1}% used), {} remaining.",
                format_amount(totals.total_spent),
                totals.percent_used,
                if totals.remaining < 0.0 {
                    format!("{} over budget", format_amount(-totals.remaining))
                } else {
                    format_amount(totals.remaining)
                }
            );
        }
        None => println!("No budget set. Run `spendcache set-budget <amount> <days>`."),
    }

    let expenses = engine.expenses();
    if expenses.is_empty() {
        println!("No expenses recorded.");
        return;
    }
    println!();
    println!(
        "Recent expenses ({} total) [{}]:",
        expenses.len(),
        engine.expenses_state().label()
    );
    for expense in expenses.iter().take(STATUS_EXPENSE_ROWS) {
        println!(
            "  #{:<14} {}  {:<14} {:>12}  {}",
            expense.id,
            expense.date,
            expense.category.label(),
            format_amount(expense.amount),
            expense.name
        );
    }
    if expenses.len() > STATUS_EXPENSE_ROWS {
        println!("  ... and {} more", expenses.len() - STATUS_EXPENSE_ROWS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_accepts_plain_numbers() {
        assert_eq!(parse_amount("150000").unwrap(), 150000.0);
        assert_eq!(parse_amount("1234.56").unwrap(), 1234.56);
        assert_eq!(parse_amount(" 500 ").unwrap(), 500.0);
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("abc0").is_err());
        assert!(parse_amount("Rs 5,000").is_err());
        assert!(parse_amount("NaN").is_err());
        assert!(parse_amount("inf").is_err());
        assert!(parse_amount("").is_err());
    }

    #[test]
    fn test_parse_date_requires_iso_format() {
        assert!(parse_date(Some(&"2024-01-05".to_string())).is_ok());
        assert!(parse_date(Some(&"05/01/2024".to_string())).is_err());
        assert!(parse_date(None).is_ok());
    }
}
