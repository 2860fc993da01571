use crate::data_structures::{MonthlyUsage, Remaining, Tier, UsageEvent};
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Per-tool daily usage counts for one user, plus the user's tier.
///
/// Reads take the current day and treat counts recorded on an earlier day
/// as zero, so they never mutate. Writes roll the ledger forward first.
#[derive(Debug, Clone)]
pub struct UsageLedger {
    tier: Tier,
    day: NaiveDate,
    usage_today: HashMap<String, u32>,
    monthly: MonthlyUsage,
}

impl UsageLedger {
    pub fn new(tier: Tier, today: NaiveDate) -> Self {
        Self {
            tier,
            day: today,
            usage_today: HashMap::new(),
            monthly: MonthlyUsage::new(today),
        }
    }

    /// Rebuilds a ledger from a usage log.
    ///
    /// Only events dated `today` count against daily limits; every event in
    /// the month of `today` feeds the monthly summary.
    pub fn replay(tier: Tier, events: &[UsageEvent], today: NaiveDate) -> Self {
        let mut ledger = Self::new(tier, today);

        for event in events {
            let day = event.day();
            if day > today {
                warn!(tool_id = event.tool_id(), %day, "Skipping usage event dated in the future");
                continue;
            }
            if ledger.monthly.covers(day) {
                ledger.monthly.record(event.tool_id());
            }
            if day == today {
                let count = ledger
                    .usage_today
                    .entry(event.tool_id().to_string())
                    .or_insert(0);
                *count = count.saturating_add(1);
            }
        }

        debug!(
            events = events.len(),
            tools_today = ledger.usage_today.len(),
            monthly_total = ledger.monthly.total_uses(),
            "Replayed usage log"
        );

        ledger
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn set_tier(&mut self, tier: Tier) {
        if self.tier != tier {
            info!(from = %self.tier, to = %tier, "Tier changed");
            self.tier = tier;
        }
    }

    pub fn day(&self) -> NaiveDate {
        self.day
    }

    pub fn usage_today(&self, tool_id: &str, today: NaiveDate) -> u32 {
        if self.day != today {
            return 0;
        }
        self.usage_today.get(tool_id).copied().unwrap_or(0)
    }

    pub fn can_use_tool(&self, tool_id: &str, free_limit: u32, today: NaiveDate) -> bool {
        if self.tier.is_unlimited() {
            return true;
        }
        self.usage_today(tool_id, today) < free_limit
    }

    pub fn remaining_usage(&self, tool_id: &str, free_limit: u32, today: NaiveDate) -> Remaining {
        if self.tier.is_unlimited() {
            return Remaining::Unlimited;
        }
        Remaining::Limited(free_limit.saturating_sub(self.usage_today(tool_id, today)))
    }

    /// Counts one use of `tool_id` and returns the new daily count.
    ///
    /// Does not consult the limit; gating is the caller's job.
    pub fn update_usage(&mut self, tool_id: &str, today: NaiveDate) -> u32 {
        self.roll_over(today);

        let count = self.usage_today.entry(tool_id.to_string()).or_insert(0);
        *count = count.saturating_add(1);
        let count = *count;
        self.monthly.record(tool_id);

        debug!(tool_id, count, tier = %self.tier, "Recorded tool usage");
        count
    }

    /// Moves the ledger to `today`, clearing daily counts when the day
    /// changed and the monthly summary when the month changed.
    ///
    /// Returns true if a reset happened.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if today == self.day {
            return false;
        }

        info!(
            old_day = %self.day,
            new_day = %today,
            tools = self.usage_today.len(),
            "Day boundary crossed, resetting daily usage"
        );
        self.day = today;
        self.usage_today.clear();

        if !self.monthly.covers(today) {
            info!(
                total_uses = self.monthly.total_uses(),
                "Month boundary crossed, resetting monthly summary"
            );
            self.monthly = MonthlyUsage::new(today);
        }

        true
    }

    /// This month's summary as of `today`; empty once the month has turned.
    pub fn monthly(&self, today: NaiveDate) -> MonthlyUsage {
        if self.monthly.covers(today) {
            self.monthly.clone()
        } else {
            MonthlyUsage::new(today)
        }
    }

    /// Today's non-zero counts, sorted by tool identifier.
    pub fn usage_breakdown(&self, today: NaiveDate) -> Vec<(String, u32)> {
        if self.day != today {
            return Vec::new();
        }
        let mut breakdown: Vec<_> = self
            .usage_today
            .iter()
            .map(|(tool_id, count)| (tool_id.clone(), *count))
            .collect();
        breakdown.sort();
        breakdown
    }

    pub fn total_today(&self, today: NaiveDate) -> u64 {
        if self.day != today {
            return 0;
        }
        self.usage_today.values().map(|count| *count as u64).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn ledger_with(tier: Tier, tool_id: &str, count: u32) -> UsageLedger {
        let mut ledger = UsageLedger::new(tier, day(1));
        for _ in 0..count {
            ledger.update_usage(tool_id, day(1));
        }
        ledger
    }

    #[test]
    fn test_free_gate_closes_at_limit() {
        for used in 0..20 {
            let ledger = ledger_with(Tier::Free, "json-formatter", used);
            assert_eq!(
                ledger.can_use_tool("json-formatter", 10, day(1)),
                used < 10,
                "used = {}",
                used
            );
        }
    }

    #[test]
    fn test_pro_gate_never_closes() {
        let ledger = ledger_with(Tier::Pro, "json-formatter", 999);
        assert!(ledger.can_use_tool("json-formatter", 20, day(1)));
        assert_eq!(
            ledger.remaining_usage("json-formatter", 20, day(1)),
            Remaining::Unlimited
        );
    }

    #[test]
    fn test_update_usage_is_additive() {
        let mut ledger = UsageLedger::new(Tier::Free, day(1));
        for n in 1..=7 {
            assert_eq!(ledger.update_usage("hash-generator", day(1)), n);
        }
        assert_eq!(ledger.usage_today("hash-generator", day(1)), 7);
        assert_eq!(ledger.usage_today("json-formatter", day(1)), 0);
    }

    #[test]
    fn test_remaining_plus_used_is_limit() {
        for used in 0..15 {
            let ledger = ledger_with(Tier::Free, "hash-generator", used);
            let remaining = ledger
                .remaining_usage("hash-generator", 15, day(1))
                .finite()
                .unwrap();
            assert_eq!(remaining + ledger.usage_today("hash-generator", day(1)), 15);
        }
    }

    #[test]
    fn test_remaining_never_negative() {
        let ledger = ledger_with(Tier::Free, "hash-generator", 20);
        assert_eq!(
            ledger.remaining_usage("hash-generator", 15, day(1)),
            Remaining::Limited(0)
        );
    }

    #[test]
    fn test_last_free_use() {
        let mut ledger = ledger_with(Tier::Free, "hash-generator", 14);
        assert!(ledger.can_use_tool("hash-generator", 15, day(1)));
        assert_eq!(
            ledger.remaining_usage("hash-generator", 15, day(1)),
            Remaining::Limited(1)
        );

        ledger.update_usage("hash-generator", day(1));
        assert!(!ledger.can_use_tool("hash-generator", 15, day(1)));
        assert_eq!(
            ledger.remaining_usage("hash-generator", 15, day(1)),
            Remaining::Limited(0)
        );
    }

    #[test]
    fn test_never_used_tool() {
        let ledger = UsageLedger::new(Tier::Free, day(1));
        assert!(ledger.can_use_tool("word-counter", 30, day(1)));
        assert_eq!(
            ledger.remaining_usage("word-counter", 30, day(1)),
            Remaining::Limited(30)
        );
    }

    #[test]
    fn test_stale_day_reads_as_zero() {
        let ledger = ledger_with(Tier::Free, "hash-generator", 15);
        assert!(!ledger.can_use_tool("hash-generator", 15, day(1)));
        assert!(ledger.can_use_tool("hash-generator", 15, day(2)));
        assert_eq!(ledger.usage_today("hash-generator", day(2)), 0);
        // reads do not roll the ledger
        assert_eq!(ledger.day(), day(1));
    }

    #[test]
    fn test_roll_over_preserves_tier_and_month() {
        let mut ledger = ledger_with(Tier::Free, "hash-generator", 5);
        ledger.update_usage("json-formatter", day(1));
        ledger.set_tier(Tier::Pro);

        assert!(ledger.roll_over(day(2)));
        assert!(!ledger.roll_over(day(2)));
        assert_eq!(ledger.usage_today("hash-generator", day(2)), 0);
        assert_eq!(ledger.usage_today("json-formatter", day(2)), 0);
        assert_eq!(ledger.tier(), Tier::Pro);
        assert_eq!(ledger.monthly(day(2)).total_uses(), 6);
        assert_eq!(ledger.monthly(day(2)).distinct_tools(), 2);
    }

    #[test]
    fn test_month_roll_over_resets_summary() {
        let mut ledger = ledger_with(Tier::Free, "hash-generator", 3);
        let february = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        ledger.roll_over(february);
        assert_eq!(ledger.monthly(february).total_uses(), 0);
        assert_eq!(ledger.monthly(february).month(), 2);
    }

    #[test]
    fn test_stale_month_reads_as_empty() {
        let ledger = ledger_with(Tier::Free, "hash-generator", 3);
        let february = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert_eq!(ledger.monthly(day(1)).total_uses(), 3);
        assert_eq!(ledger.monthly(february).total_uses(), 0);
        assert_eq!(ledger.monthly(february).month(), 2);
    }

    #[test]
    fn test_upgrade_reopens_gate() {
        let mut ledger = ledger_with(Tier::Free, "hash-generator", 15);
        assert!(!ledger.can_use_tool("hash-generator", 15, day(1)));
        ledger.set_tier(Tier::Pro);
        assert!(ledger.can_use_tool("hash-generator", 15, day(1)));
        ledger.set_tier(Tier::Free);
        assert!(!ledger.can_use_tool("hash-generator", 15, day(1)));
    }

    #[test]
    fn test_replay_splits_today_and_month() {
        let events = vec![
            UsageEvent::new(Utc.with_ymd_and_hms(2023, 12, 31, 23, 0, 0).unwrap(), "hash-generator"),
            UsageEvent::new(Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(), "hash-generator"),
            UsageEvent::new(Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap(), "hash-generator"),
            UsageEvent::new(Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap(), "json-formatter"),
            UsageEvent::new(Utc.with_ymd_and_hms(2024, 1, 3, 10, 0, 0).unwrap(), "json-formatter"),
        ];

        let ledger = UsageLedger::replay(Tier::Free, &events, day(2));
        assert_eq!(ledger.usage_today("hash-generator", day(2)), 1);
        assert_eq!(ledger.usage_today("json-formatter", day(2)), 1);
        assert_eq!(ledger.monthly(day(2)).total_uses(), 3);
        assert_eq!(ledger.total_today(day(2)), 2);
    }

    #[test]
    fn test_usage_breakdown_sorted() {
        let mut ledger = UsageLedger::new(Tier::Free, day(1));
        ledger.update_usage("word-counter", day(1));
        ledger.update_usage("case-converter", day(1));
        ledger.update_usage("case-converter", day(1));

        assert_eq!(
            ledger.usage_breakdown(day(1)),
            vec![
                ("case-converter".to_string(), 2),
                ("word-counter".to_string(), 1)
            ]
        );
        assert!(ledger.usage_breakdown(day(2)).is_empty());
    }
}
