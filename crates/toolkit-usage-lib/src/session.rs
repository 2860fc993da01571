use crate::catalog::ToolCatalog;
use crate::clock::{self, Clock};
use crate::data_structures::{
    Identity, MonthlyUsage, Remaining, Tier, ToolVariant, UsageEvent, UserProfile,
};
use crate::error::ToolError;
use crate::ledger::UsageLedger;
use crate::store::UsageStore;
use anyhow::Result;
use chrono::{Duration, NaiveDate};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The active user's session: identity, tier and the usage ledger.
///
/// Anonymous sessions live only in memory. Signed-in sessions append every
/// recorded use to the [`UsageStore`] and rebuild from it on sign-in.
pub struct Session {
    identity: Identity,
    join_date: NaiveDate,
    ledger: UsageLedger,
    catalog: ToolCatalog,
    clock: Arc<dyn Clock>,
    store: Option<UsageStore>,
}

impl Session {
    pub fn anonymous(catalog: ToolCatalog, clock: Arc<dyn Clock>) -> Self {
        let today = clock.today();
        Self {
            identity: Identity::Anonymous,
            join_date: today,
            ledger: UsageLedger::new(Tier::Free, today),
            catalog,
            clock,
            store: None,
        }
    }

    /// Opens a session for `user_id`, creating its profile with
    /// `default_tier` on first sign-in.
    pub fn sign_in(
        catalog: ToolCatalog,
        clock: Arc<dyn Clock>,
        store: UsageStore,
        user_id: &str,
        name: Option<&str>,
        default_tier: Tier,
    ) -> Result<Self> {
        let today = clock.today();

        let profile = match store.load_profile(user_id)? {
            Some(profile) => profile,
            None => {
                let profile = UserProfile::new(name.unwrap_or(user_id), default_tier, today);
                store.save_profile(user_id, &profile)?;
                info!(user_id, tier = %default_tier, "Created user profile");
                profile
            }
        };

        let events = store.load_events(user_id)?;
        let ledger = UsageLedger::replay(profile.tier(), &events, today);

        info!(user_id, tier = %profile.tier(), "Signed in");

        Ok(Self {
            identity: Identity::Authenticated {
                user_id: user_id.to_string(),
                name: profile.name().to_string(),
            },
            join_date: profile.join_date(),
            ledger,
            catalog,
            clock,
            store: Some(store),
        })
    }

    /// Ends the session and hands back a fresh anonymous one.
    pub fn sign_out(self) -> Session {
        if let Some(user_id) = self.identity.user_id() {
            info!(user_id, "Signed out");
        }
        Session::anonymous(self.catalog, self.clock)
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn is_signed_in(&self) -> bool {
        self.identity.is_signed_in()
    }

    pub fn name(&self) -> &str {
        self.identity.display_name()
    }

    pub fn tier(&self) -> Tier {
        self.ledger.tier()
    }

    pub fn join_date(&self) -> NaiveDate {
        self.join_date
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn can_use_tool(&self, tool_id: &str, free_limit: u32) -> bool {
        let allowed = self.ledger.can_use_tool(tool_id, free_limit, self.clock.today());
        debug!(tool_id, free_limit, allowed, "Checked tool gate");
        allowed
    }

    pub fn get_remaining_usage(&self, tool_id: &str, free_limit: u32) -> Remaining {
        self.ledger
            .remaining_usage(tool_id, free_limit, self.clock.today())
    }

    pub fn usage_today(&self, tool_id: &str) -> u32 {
        self.ledger.usage_today(tool_id, self.clock.today())
    }

    pub fn usage_breakdown(&self) -> Vec<(String, u32)> {
        self.ledger.usage_breakdown(self.clock.today())
    }

    /// Monthly summary as of the last recorded use or refresh.
    pub fn usage_this_month(&self) -> MonthlyUsage {
        self.ledger.monthly(self.clock.today())
    }

    pub fn time_until_reset(&self) -> Duration {
        clock::time_until_reset(self.clock.now())
    }

    /// Records one use of a catalog tool.
    ///
    /// Refuses with [`ToolError::QuotaExceeded`] when the gate is closed; the
    /// counter is left untouched in that case. A failed write to the usage
    /// log is logged and the in-memory count kept.
    pub fn update_usage(&mut self, tool_id: &str) -> Result<u32, ToolError> {
        let limit = self
            .catalog
            .daily_limit(tool_id)
            .ok_or_else(|| ToolError::UnknownTool(tool_id.to_string()))?;

        if !self.can_use_tool(tool_id, limit) {
            warn!(tool_id, limit, "Refusing usage update past the daily limit");
            return Err(self.quota_exceeded(tool_id, limit));
        }

        Ok(self.record(tool_id))
    }

    pub fn can_use_variant(&self, tool_id: &str, variant_id: &str) -> bool {
        self.catalog
            .get(tool_id)
            .and_then(|tool| tool.variant(variant_id))
            .map(|variant| self.tier().unlocks(variant.access()))
            .unwrap_or(false)
    }

    /// A tool's variants with an "unlocked" flag for the current tier.
    pub fn variants(&self, tool_id: &str) -> Option<Vec<(&ToolVariant, bool)>> {
        let tier = self.tier();
        self.catalog.get(tool_id).map(|tool| {
            tool.variants()
                .iter()
                .map(|variant| (variant, tier.unlocks(variant.access())))
                .collect()
        })
    }

    pub fn set_tier(&mut self, tier: Tier) -> Result<()> {
        if let (Some(store), Some(user_id)) = (&self.store, self.identity.user_id()) {
            let mut profile = store
                .load_profile(user_id)?
                .unwrap_or_else(|| UserProfile::new(self.identity.display_name(), tier, self.join_date));
            profile.set_tier(tier);
            store.save_profile(user_id, &profile)?;
        }
        self.ledger.set_tier(tier);
        Ok(())
    }

    pub fn upgrade(&mut self) -> Result<()> {
        self.set_tier(Tier::Pro)
    }

    pub fn downgrade(&mut self) -> Result<()> {
        self.set_tier(Tier::Free)
    }

    /// Re-reads the persisted ledger, picking up uses recorded by other
    /// processes. Anonymous sessions only roll over to the current day.
    pub fn refresh(&mut self) -> Result<()> {
        let today = self.clock.today();
        match (&self.store, self.identity.user_id()) {
            (Some(store), Some(user_id)) => {
                let tier = store
                    .load_profile(user_id)?
                    .map(|profile| profile.tier())
                    .unwrap_or_else(|| self.ledger.tier());
                let events = store.load_events(user_id)?;
                self.ledger = UsageLedger::replay(tier, &events, today);
            }
            _ => {
                self.ledger.roll_over(today);
            }
        }
        Ok(())
    }

    /// Runs one tool invocation through the gate.
    ///
    /// Quota is consumed only when `action` succeeds. Unknown tools, locked
    /// or unknown variants, a closed gate and invalid input all leave the
    /// counter untouched. `action` receives the resolved variant id.
    pub fn run_tool<T, F>(
        &mut self,
        tool_id: &str,
        variant: Option<&str>,
        action: F,
    ) -> Result<T, ToolError>
    where
        F: FnOnce(&str) -> Result<T, ToolError>,
    {
        let tool = self
            .catalog
            .get(tool_id)
            .ok_or_else(|| ToolError::UnknownTool(tool_id.to_string()))?;
        let limit = tool.daily_limit();

        let variant = match variant {
            Some(id) => tool.variant(id).ok_or_else(|| ToolError::UnknownVariant {
                tool_id: tool_id.to_string(),
                variant: id.to_string(),
            })?,
            None => tool
                .default_variant()
                .ok_or_else(|| ToolError::UnknownVariant {
                    tool_id: tool_id.to_string(),
                    variant: String::new(),
                })?,
        };

        if !self.tier().unlocks(variant.access()) {
            return Err(ToolError::VariantLocked {
                tool_id: tool_id.to_string(),
                variant: variant.id().to_string(),
            });
        }

        if !self.can_use_tool(tool_id, limit) {
            return Err(self.quota_exceeded(tool_id, limit));
        }

        let variant_id = variant.id().to_string();
        let output = action(&variant_id)?;

        let count = self.record(tool_id);
        debug!(tool_id, variant = %variant_id, count, "Tool invocation accepted");

        Ok(output)
    }

    /// Counts one use and appends it to the log of a signed-in user.
    fn record(&mut self, tool_id: &str) -> u32 {
        let count = self.ledger.update_usage(tool_id, self.clock.today());
        if let Err(e) = self.persist(tool_id) {
            // the use already happened; keep the in-memory count
            warn!(tool_id, error = %e, "Usage recorded in memory only");
        }
        count
    }

    fn persist(&self, tool_id: &str) -> Result<(), ToolError> {
        if let (Some(store), Some(user_id)) = (&self.store, self.identity.user_id()) {
            let event = UsageEvent::new(self.clock.now(), tool_id);
            store.append_event(user_id, &event)?;
        }
        Ok(())
    }

    fn quota_exceeded(&self, tool_id: &str, limit: u32) -> ToolError {
        ToolError::QuotaExceeded {
            tool_id: tool_id.to_string(),
            limit,
            resets_in: self.time_until_reset(),
        }
    }
}
