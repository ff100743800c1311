//! Robots.txt caching
//!
//! Entries expire after 24 hours so changes made by site owners are picked up.

use crate::robots::RobotRules;
use chrono::{DateTime, Duration, Utc};

/// Rules for one origin along with when they were fetched
#[derive(Debug, Clone)]
pub struct CachedRobots {
    pub rules: RobotRules,
    pub fetched_at: DateTime<Utc>,
}

impl CachedRobots {
    /// Wraps freshly fetched rules
    ///
    /// # Arguments
    ///
    /// * `rules` - Rules parsed from the origin's robots.txt
    ///
    /// # Returns
    ///
    /// An entry stamped with the current time
    pub fn new(rules: RobotRules) -> Self {
        Self {
            rules,
            fetched_at: Utc::now(),
        }
    }

    /// True once the entry is older than 24 hours
    pub fn is_stale(&self) -> bool {
        Utc::now() - self.fetched_at > Duration::hours(24)
    }
}
