//! Request-scoped entry point for dashboard and filter-option requests.
//!
//! The interface owns the shared storage handle and the configured limits.
//! Each call builds a fresh [`Aggregator`], so the time budget is counted
//! per request and nothing is cached between requests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::aggregate::{Aggregator, Limits};
use crate::dashboard::options::{filter_options, FilterOptions};
use crate::dashboard::{snapshot, Dashboard, Domain};
use crate::error::Result;
use crate::filter::FilterSet;
use crate::persist::Database;

pub struct DashboardInterface {
    db: Arc<Database>,
    limits: Limits,
}

impl DashboardInterface {
    pub fn new(db: Arc<Database>, limits: Limits) -> Self {
        Self { db, limits }
    }
    pub fn database(&self) -> &Database {
        &self.db
    }
    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Assemble one dashboard; `None` is a domain nobody serves.
    pub fn run(&self, domain: Option<Domain>, filters: &FilterSet) -> Result<Dashboard> {
        let started = Instant::now();
        let aggregator = Aggregator::with_limits(&self.db, self.limits);
        let dashboard = snapshot(&aggregator, domain, filters)?;
        info!(
            ?domain,
            ms = started.elapsed().as_secs_f64() * 1000.0,
            defaults = dashboard.defaults_used.len(),
            "dashboard assembled"
        );
        Ok(dashboard)
    }

    /// Same as [`run`](Self::run) for the flat string map of the HTTP body.
    pub fn run_params(&self, params: &HashMap<String, String>) -> Result<Dashboard> {
        let domain = Domain::parse(params.get("domain").map(String::as_str).unwrap_or(""));
        self.run(domain, &FilterSet::from_params(params))
    }

    pub fn filter_options(&self) -> Result<FilterOptions> {
        let started = Instant::now();
        let options = filter_options(&self.db)?;
        info!(ms = started.elapsed().as_secs_f64() * 1000.0, "filter options listed");
        Ok(options)
    }
}
