//! Centime CLI - Local-first personal finance manager
//!
//! Usage:
//!   centime init                      Initialize database
//!   centime bank setup --app-id ...   Save Enable Banking credentials
//!   centime bank connect ...          Authorize a bank connection
//!   centime sync                      Import transactions from all accounts

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Status => commands::cmd_status(&cli.db, cli.no_encrypt),
        Commands::Accounts { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(AccountsAction::List) => commands::cmd_accounts_list(&db),
                Some(AccountsAction::Add {
                    name,
                    institution,
                    kind,
                }) => commands::cmd_accounts_add(&db, &name, &institution, kind.as_deref()),
                Some(AccountsAction::Remove { id }) => commands::cmd_accounts_remove(&db, id),
            }
        }
        Commands::Categories { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(CategoriesAction::List) => commands::cmd_categories_list(&db),
                Some(CategoriesAction::Add { name }) => commands::cmd_categories_add(&db, &name),
                Some(CategoriesAction::Remove { id }) => commands::cmd_categories_remove(&db, id),
            }
        }
        Commands::Tx { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_tx_list(&db, 20, None),
                Some(TxAction::List { limit, account }) => {
                    commands::cmd_tx_list(&db, limit, account)
                }
                Some(TxAction::Add {
                    label,
                    amount,
                    date,
                    account,
                    category,
                }) => commands::cmd_tx_add(
                    &db,
                    &label,
                    amount,
                    date.as_deref(),
                    account,
                    category.as_deref(),
                ),
                Some(TxAction::SetCategory { id, category }) => {
                    commands::cmd_tx_set_category(&db, id, &category)
                }
            }
        }
        Commands::Recurring { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_recurring_list(&db, false),
                Some(RecurringAction::List { all }) => commands::cmd_recurring_list(&db, all),
                Some(RecurringAction::Add {
                    label,
                    amount,
                    day,
                    category,
                    account,
                }) => commands::cmd_recurring_add(
                    &db,
                    &label,
                    amount,
                    day,
                    category.as_deref(),
                    account,
                ),
                Some(RecurringAction::Disable { id }) => {
                    commands::cmd_recurring_set_active(&db, id, false)
                }
                Some(RecurringAction::Enable { id }) => {
                    commands::cmd_recurring_set_active(&db, id, true)
                }
                Some(RecurringAction::Remove { id }) => commands::cmd_recurring_remove(&db, id),
                Some(RecurringAction::Generate { month }) => {
                    commands::cmd_recurring_generate(&db, month.as_deref())
                }
                Some(RecurringAction::CheckMissing { month }) => {
                    commands::cmd_recurring_check_missing(&db, month.as_deref())
                }
            }
        }
        Commands::Rules { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(RulesAction::List) => commands::cmd_rules_list(&db),
                Some(RulesAction::Add {
                    pattern,
                    category,
                    field,
                }) => commands::cmd_rules_add(&db, &pattern, &category, &field),
                Some(RulesAction::FromTx { id, category }) => {
                    commands::cmd_rules_from_tx(&db, id, &category)
                }
                Some(RulesAction::Remove { id }) => commands::cmd_rules_remove(&db, id),
                Some(RulesAction::Apply) => commands::cmd_rules_apply(&db),
            }
        }
        Commands::Bank { action } => match action {
            BankAction::Setup { app_id, key_file } => {
                commands::cmd_bank_setup(&app_id, &key_file)
            }
            BankAction::Reset => commands::cmd_bank_reset(),
            BankAction::Institutions { country } => {
                commands::cmd_bank_institutions(&country).await
            }
            BankAction::Connect {
                institution,
                country,
                redirect_url,
            } => commands::cmd_bank_connect(&institution, &country, &redirect_url).await,
            BankAction::Session { code, institution } => {
                let db = commands::open_db(&cli.db, cli.no_encrypt)?;
                commands::cmd_bank_session(&db, &code, &institution).await
            }
        },
        Commands::Sync => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_sync(&db).await
        }
        Commands::Export { output, account } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_export(&db, output.as_deref(), account)
        }
    }
}
