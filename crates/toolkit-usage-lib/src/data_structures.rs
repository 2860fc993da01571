use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Free,
    Pro,
}

impl Tier {
    pub fn name(&self) -> &'static str {
        match self {
            Tier::Free => "Free",
            Tier::Pro => "Pro",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Tier::Free => "Free (daily limit per tool)",
            Tier::Pro => "Pro (unlimited, all variants)",
        }
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self, Tier::Pro)
    }

    /// Whether a variant tagged with `access` is selectable on this tier.
    pub fn unlocks(&self, access: Access) -> bool {
        match access {
            Access::Free => true,
            Access::Pro => matches!(self, Tier::Pro),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Free,
    Pro,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Anonymous,
    Authenticated { user_id: String, name: String },
}

impl Identity {
    pub fn is_signed_in(&self) -> bool {
        matches!(self, Identity::Authenticated { .. })
    }

    pub fn user_id(&self) -> Option<&str> {
        match self {
            Identity::Anonymous => None,
            Identity::Authenticated { user_id, .. } => Some(user_id),
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Identity::Anonymous => "Guest",
            Identity::Authenticated { name, .. } => name,
        }
    }
}

/// Quota left for a tool today. Pro sessions never see a finite number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remaining {
    Limited(u32),
    Unlimited,
}

impl Remaining {
    pub fn is_unlimited(&self) -> bool {
        matches!(self, Remaining::Unlimited)
    }

    pub fn finite(&self) -> Option<u32> {
        match self {
            Remaining::Limited(n) => Some(*n),
            Remaining::Unlimited => None,
        }
    }
}

impl fmt::Display for Remaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Remaining::Limited(n) => f.pad(&n.to_string()),
            Remaining::Unlimited => f.pad("unlimited"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolVariant {
    id: String,
    access: Access,
}

impl ToolVariant {
    pub fn new(id: impl Into<String>, access: Access) -> Self {
        Self {
            id: id.into(),
            access,
        }
    }

    pub fn free(id: impl Into<String>) -> Self {
        Self::new(id, Access::Free)
    }

    pub fn pro(id: impl Into<String>) -> Self {
        Self::new(id, Access::Pro)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn access(&self) -> Access {
        self.access
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDescriptor {
    id: String,
    name: String,
    daily_limit: u32,
    variants: Vec<ToolVariant>,
}

impl ToolDescriptor {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        daily_limit: u32,
        variants: Vec<ToolVariant>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            daily_limit,
            variants,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn daily_limit(&self) -> u32 {
        self.daily_limit
    }

    pub fn variants(&self) -> &[ToolVariant] {
        &self.variants
    }

    pub fn variant(&self, variant_id: &str) -> Option<&ToolVariant> {
        self.variants.iter().find(|v| v.id == variant_id)
    }

    /// First variant, used when the caller does not pick one.
    pub fn default_variant(&self) -> Option<&ToolVariant> {
        self.variants.first()
    }

    pub(crate) fn set_daily_limit(&mut self, limit: u32) {
        self.daily_limit = limit;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEvent {
    timestamp: DateTime<Utc>,
    tool_id: String,
}

impl UsageEvent {
    pub fn new(timestamp: DateTime<Utc>, tool_id: impl Into<String>) -> Self {
        Self {
            timestamp,
            tool_id: tool_id.into(),
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn tool_id(&self) -> &str {
        &self.tool_id
    }

    pub fn day(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// Aggregate counters for the current calendar month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyUsage {
    year: i32,
    month: u32,
    total_uses: u64,
    tools_used: BTreeSet<String>,
}

impl MonthlyUsage {
    pub fn new(day: NaiveDate) -> Self {
        Self {
            year: day.year(),
            month: day.month(),
            total_uses: 0,
            tools_used: BTreeSet::new(),
        }
    }

    pub fn record(&mut self, tool_id: &str) {
        self.total_uses += 1;
        if !self.tools_used.contains(tool_id) {
            self.tools_used.insert(tool_id.to_string());
        }
    }

    pub fn covers(&self, day: NaiveDate) -> bool {
        self.year == day.year() && self.month == day.month()
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn total_uses(&self) -> u64 {
        self.total_uses
    }

    pub fn distinct_tools(&self) -> usize {
        self.tools_used.len()
    }

    pub fn tools_used(&self) -> impl Iterator<Item = &str> {
        self.tools_used.iter().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    name: String,
    tier: Tier,
    join_date: NaiveDate,
}

impl UserProfile {
    pub fn new(name: impl Into<String>, tier: Tier, join_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            tier,
            join_date,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn join_date(&self) -> NaiveDate {
        self.join_date
    }

    pub fn set_tier(&mut self, tier: Tier) {
        self.tier = tier;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_unlocks() {
        assert!(Tier::Free.unlocks(Access::Free));
        assert!(!Tier::Free.unlocks(Access::Pro));
        assert!(Tier::Pro.unlocks(Access::Pro));
    }

    #[test]
    fn test_tier_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Tier::Pro).unwrap(), "\"pro\"");
        assert_eq!(serde_json::from_str::<Tier>("\"free\"").unwrap(), Tier::Free);
    }

    #[test]
    fn test_remaining_display() {
        assert_eq!(Remaining::Limited(3).to_string(), "3");
        assert_eq!(Remaining::Unlimited.to_string(), "unlimited");
        assert_eq!(Remaining::Unlimited.finite(), None);
        assert_eq!(format!("{:>4}", Remaining::Limited(7)), "   7");
    }

    #[test]
    fn test_monthly_usage_counts_distinct_tools() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let mut monthly = MonthlyUsage::new(day);
        monthly.record("hash-generator");
        monthly.record("hash-generator");
        monthly.record("json-formatter");

        assert_eq!(monthly.total_uses(), 3);
        assert_eq!(monthly.distinct_tools(), 2);
        assert!(monthly.covers(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()));
        assert!(!monthly.covers(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()));
    }
}
