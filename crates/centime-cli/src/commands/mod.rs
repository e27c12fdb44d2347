//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Core commands (init, status) and shared utilities (open_db)
//! - `accounts` - Account management commands
//! - `categories` - Category management commands
//! - `transactions` - Transaction commands (list, add, set-category)
//! - `recurring` - Recurring definition commands (generate, check-missing)
//! - `rules` - Auto-categorization rule commands
//! - `bank` - Enable Banking credential and connection commands
//! - `sync` - Bank synchronization command
//! - `export` - CSV export command

pub mod accounts;
pub mod bank;
pub mod categories;
pub mod core;
pub mod export;
pub mod recurring;
pub mod rules;
pub mod sync;
pub mod transactions;

// Re-export command functions for main.rs
pub use accounts::*;
pub use bank::*;
pub use categories::*;
pub use core::*;
pub use export::*;
pub use recurring::*;
pub use rules::*;
pub use sync::*;
pub use transactions::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
