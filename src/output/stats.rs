//! Statistics from the record store
//!
//! This module provides functionality for extracting and displaying
//! record counts from the storage layer.

use crate::storage::RecordStore;
use crate::SitelintError;

/// Record store summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStatistics {
    /// Total number of link records
    pub total_links: u64,

    /// Total number of grammar error records
    pub total_errors: u64,

    /// Number of distinct jobs that wrote at least one record
    pub total_jobs: u64,
}

/// Loads statistics from storage
pub fn load_statistics(store: &dyn RecordStore) -> Result<StoreStatistics, SitelintError> {
    Ok(StoreStatistics {
        total_links: store.count_links()?,
        total_errors: store.count_errors()?,
        total_jobs: store.count_jobs()?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &StoreStatistics) {
    println!("=== Record Store Statistics ===\n");

    println!("Overview:");
    println!("  Jobs with records: {}", stats.total_jobs);
    println!("  Links extracted: {}", stats.total_links);
    println!("  Grammar errors found: {}", stats.total_errors);
    println!();

    let total = stats.total_links + stats.total_errors;
    if stats.total_jobs > 0 {
        println!(
            "Average records per job: {:.1}",
            total as f64 / stats.total_jobs as f64
        );
    }
}
