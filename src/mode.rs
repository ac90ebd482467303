use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Retrieval strategy the backend should use when answering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    Naive,
    Local,
    Global,
    #[default]
    Hybrid,
}

impl QueryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryMode::Naive => "naive",
            QueryMode::Local => "local",
            QueryMode::Global => "global",
            QueryMode::Hybrid => "hybrid",
        }
    }

    pub fn all() -> Vec<QueryMode> {
        vec![
            QueryMode::Naive,
            QueryMode::Local,
            QueryMode::Global,
            QueryMode::Hybrid,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            QueryMode::Naive => "Naive",
            QueryMode::Local => "Local",
            QueryMode::Global => "Global",
            QueryMode::Hybrid => "Hybrid",
        }
    }

    /// Help text shown next to the mode selector. The backend decides what
    /// each mode actually does.
    pub fn description(&self) -> &'static str {
        match self {
            QueryMode::Naive => "no retrieval context, direct answer",
            QueryMode::Local => "grounded in a narrow, local document context",
            QueryMode::Global => "grounded across the full document corpus",
            QueryMode::Hybrid => "local and global context combined",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            QueryMode::Naive => QueryMode::Local,
            QueryMode::Local => QueryMode::Global,
            QueryMode::Global => QueryMode::Hybrid,
            QueryMode::Hybrid => QueryMode::Naive,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            QueryMode::Naive => QueryMode::Hybrid,
            QueryMode::Local => QueryMode::Naive,
            QueryMode::Global => QueryMode::Local,
            QueryMode::Hybrid => QueryMode::Global,
        }
    }
}

impl std::fmt::Display for QueryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive, surrounding whitespace ignored.
impl FromStr for QueryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "naive" => Ok(QueryMode::Naive),
            "local" => Ok(QueryMode::Local),
            "global" => Ok(QueryMode::Global),
            "hybrid" => Ok(QueryMode::Hybrid),
            other => Err(format!(
                "unknown mode '{}' (expected naive, local, global or hybrid)",
                other
            )),
        }
    }
}
