//! API endpoint classification
//!
//! Categories are checked in a fixed precedence order and the first one
//! whose keywords appear in the endpoint (case-insensitively) wins. An
//! endpoint matching no keyword lands in `Other`, so classification is total
//! and every endpoint belongs to exactly one bucket.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Endpoint category, declared in precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Login,
    Admin,
    User,
    Payment,
    Other,
}

/// Endpoints grouped by category; every category is present
pub type CategorizedEndpoints = BTreeMap<Category, BTreeSet<String>>;

impl Category {
    /// Every category, highest precedence first
    pub const ALL: [Category; 5] = [
        Category::Login,
        Category::Admin,
        Category::User,
        Category::Payment,
        Category::Other,
    ];

    /// Keywords that select this category
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::Login => &["login", "auth", "signin", "token"],
            Self::Admin => &["admin", "dashboard", "manage"],
            Self::User => &["user", "profile", "account"],
            Self::Payment => &["payment", "checkout", "billing", "transaction"],
            Self::Other => &[],
        }
    }

    /// Heading used in the endpoint file
    pub fn label(&self) -> &'static str {
        match self {
            Self::Login => "Login APIs",
            Self::Admin => "Admin APIs",
            Self::User => "User APIs",
            Self::Payment => "Payment APIs",
            Self::Other => "Other APIs",
        }
    }

    /// Classifies one endpoint
    ///
    /// ```
    /// use sumi_harvest::crawler::Category;
    ///
    /// assert_eq!(Category::of("https://a.com/api/login"), Category::Login);
    /// assert_eq!(Category::of("https://a.com/static/data"), Category::Other);
    /// ```
    pub fn of(endpoint: &str) -> Category {
        let lower = endpoint.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.keywords().iter().any(|kw| lower.contains(kw)))
            .unwrap_or(Category::Other)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Partitions endpoints into their categories
pub fn classify(endpoints: &BTreeSet<String>) -> CategorizedEndpoints {
    let mut buckets: CategorizedEndpoints = Category::ALL
        .into_iter()
        .map(|category| (category, BTreeSet::new()))
        .collect();

    for endpoint in endpoints {
        buckets
            .entry(Category::of(endpoint))
            .or_default()
            .insert(endpoint.clone());
    }

    buckets
}
