//! Statdash – a schema-agnostic aggregation engine behind a statistics dashboard.
//!
//! Statistical tables are uploaded from spreadsheets, so their names and
//! column layouts are not known in advance. Statdash answers questions such
//! as "how many people were employed in Harare in 2025" by discovering at
//! query time which tables might hold the answer and how each one lays it out:
//! * The [`catalog`] lists tables and columns afresh on every request.
//! * The [`matcher`] narrows tables by keywords in their names.
//! * The [`layout`] detector reads each candidate as *wide* (one column per
//!   category) or *long* (indicator and value columns).
//! * The [`filter`] compiler turns year, region and gender filters into SQL
//!   predicates that tolerate inconsistently typed columns.
//! * The [`aggregate`] module sums the indicator across every usable table and
//!   records, per table, whether it contributed or why it was skipped.
//!
//! The [`registry`] declares every indicator the dashboards use, and the
//! [`dashboard`] assemblers turn aggregations into KPI, chart and table
//! bundles, substituting documented defaults (tagged as such) for anything
//! not found.
//!
//! ## Quick Start
//! ```
//! use statdash::persist::{Database, PersistenceMode};
//! use statdash::aggregate::Aggregator;
//! use statdash::filter::FilterSet;
//! use statdash::registry::EMPLOYED;
//! let db = Database::new(PersistenceMode::InMemory).unwrap();
//! db.execute_batch(
//!     r#"create table employment_2025 ("Province" text, "Male" real, "Female" real, "Year" integer);
//!        insert into employment_2025 values ('Harare', 1000, 1500, 2025);"#,
//! ).unwrap();
//! let aggregator = Aggregator::new(&db);
//! let filters = FilterSet::new().with_year(2025).with_region("Harare");
//! let result = aggregator
//!     .aggregate(
//!         &EMPLOYED.keyword_groups(),
//!         &EMPLOYED.indicator_aliases(),
//!         &filters,
//!         EMPLOYED.mode,
//!     )
//!     .unwrap();
//! assert_eq!(result.total, Some(2500.0));
//! ```

pub mod aggregate;
pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod datatype;
pub mod error;
pub mod filter;
pub mod interface;
pub mod layout;
pub mod matcher;
pub mod persist;
pub mod registry;
pub mod server;

pub use error::{Result, StatdashError};
