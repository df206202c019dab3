//! Table matcher.
//!
//! Narrows the catalog to tables whose *names* mention a domain concept.
//! Uploaded tables are named after the spreadsheet they came from, so a
//! concept is matched through a fixed set of aliases ("employment" also
//! finds `labour_q1_province`).

use lazy_static::lazy_static;
use std::collections::HashMap;

use crate::catalog::list_tables;
use crate::error::Result;
use crate::persist::Database;

lazy_static! {
    // concept -> aliases; expansion is one-directional so that an alias used
    // as a keyword of its own ("import") does not drag in its siblings ("export")
    static ref KEYWORD_ALIASES: HashMap<&'static str, &'static [&'static str]> = {
        let mut aliases: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
        aliases.insert("employment", &["labour", "job", "empl"]);
        aliases.insert("gdp", &["economy", "provincial"]);
        aliases.insert("cpi", &["inflation", "price"]);
        aliases.insert("trade", &["export", "import"]);
        aliases
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// every keyword group must match the table name
    All,
    /// one matching keyword group is enough
    Any,
}

/// A concept plus the lower-cased spellings that count as mentioning it.
/// An excluding group rejects every table that mentions it, whatever the
/// match mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordGroup {
    concept: String,
    aliases: Vec<String>,
    excluded: bool,
}
impl KeywordGroup {
    /// Group for `concept`, expanded through the built-in alias table.
    pub fn new(concept: &str) -> Self {
        let concept = concept.trim().to_lowercase();
        let extra = KEYWORD_ALIASES.get(concept.as_str()).copied().unwrap_or(&[]);
        Self::with_aliases(&concept, extra)
    }
    pub fn with_aliases(concept: &str, aliases: &[&str]) -> Self {
        let concept = concept.trim().to_lowercase();
        let mut spellings = vec![concept.clone()];
        for alias in aliases {
            let alias = alias.trim().to_lowercase();
            if !alias.is_empty() && !spellings.contains(&alias) {
                spellings.push(alias);
            }
        }
        Self { concept, aliases: spellings, excluded: false }
    }
    /// Group rejecting tables that mention `concept`. Not alias-expanded.
    pub fn excluding(concept: &str) -> Self {
        Self { excluded: true, ..Self::with_aliases(concept, &[]) }
    }
    pub fn is_excluding(&self) -> bool {
        self.excluded
    }
    pub fn concept(&self) -> &str {
        &self.concept
    }
    /// All accepted spellings, the concept itself first.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }
    /// Case-insensitive substring test against a table name.
    pub fn matches(&self, table: &str) -> bool {
        let table = table.to_lowercase();
        self.aliases.iter().any(|alias| table.contains(alias.as_str()))
    }
}

/// Expand plain keywords into groups.
pub fn groups(keywords: &[&str]) -> Vec<KeywordGroup> {
    keywords.iter().map(|k| KeywordGroup::new(k)).collect()
}

/// Whether `table` qualifies under `mode`. Excluding groups veto first; of
/// the rest, an empty list matches every table under [`MatchMode::All`] and
/// none under [`MatchMode::Any`].
pub fn table_matches(groups: &[KeywordGroup], mode: MatchMode, table: &str) -> bool {
    let (excluding, required): (Vec<_>, Vec<_>) = groups.iter().partition(|g| g.excluded);
    if excluding.iter().any(|g| g.matches(table)) {
        return false;
    }
    match mode {
        MatchMode::All => required.iter().all(|g| g.matches(table)),
        MatchMode::Any => required.iter().any(|g| g.matches(table)),
    }
}

/// Candidate tables in catalog enumeration order. Callers must not rely on a
/// particular table winning ties; single-valued lookups take the first
/// structurally matching candidate.
pub fn find_tables(db: &Database, groups: &[KeywordGroup], mode: MatchMode) -> Result<Vec<String>> {
    Ok(list_tables(db)?
        .into_iter()
        .filter(|table| table_matches(groups, mode, table))
        .collect())
}
