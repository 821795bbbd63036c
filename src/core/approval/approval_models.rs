// Approval domain models - the startup record and its lifecycle state.
//
// Only the fields the platform needs are modelled. Moderation is optional
// because records created before the moderation gate existed have none.

use crate::core::moderation::{passes_threshold, ModerationResult, StartupContent};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a startup listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartupStatus {
    Pending,
    Approved,
    Rejected,
}

impl StartupStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StartupStatus::Pending => "pending",
            StartupStatus::Approved => "approved",
            StartupStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for StartupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StartupStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(StartupStatus::Pending),
            "approved" => Ok(StartupStatus::Approved),
            "rejected" => Ok(StartupStatus::Rejected),
            other => Err(format!("unknown startup status '{}'", other)),
        }
    }
}

/// A persisted startup listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Startup {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub tagline: String,
    pub logo: String,
    pub industry: Option<String>,
    pub problem: Option<String>,
    pub solution: Option<String>,
    pub value_proposition: Option<String>,
    pub business_model: Option<String>,
    pub funding_goal: i64,
    pub funding_raised: i64,
    pub investor_count: i64,
    pub minimum_investment: i64,
    pub status: StartupStatus,
    /// `None` for legacy records that predate moderation.
    pub moderation: Option<ModerationResult>,
    pub created_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
impl Startup {
    pub fn moderation_score(&self) -> Option<u8> {
        self.moderation.as_ref().map(|m| m.score)
    }

    /// In-memory form of the predicate `StartupStore::approve_eligible`
    /// runs in storage.
    pub fn eligible_for_auto_approval(
        &self,
        created_before: DateTime<Utc>,
        min_score: u8,
    ) -> bool {
        self.status == StartupStatus::Pending
            && self.created_at <= created_before
            && self.moderation_score().map_or(true, |score| score >= min_score)
    }
}

/// Everything needed to insert a new listing.
#[derive(Debug, Clone)]
pub struct NewStartup {
    pub owner_id: i64,
    pub content: StartupContent,
    pub logo: String,
    pub funding_goal: i64,
    pub minimum_investment: i64,
    pub moderation: ModerationResult,
    pub created_at: DateTime<Utc>,
}

/// Rules for the automatic pending -> approved transition.
#[derive(Debug, Clone, Copy)]
pub struct SweepPolicy {
    /// How long a listing must wait before it can be auto-approved
    pub delay: chrono::Duration,
}

impl Default for SweepPolicy {
    fn default() -> Self {
        Self {
            delay: chrono::Duration::minutes(30),
        }
    }
}

impl SweepPolicy {
    pub fn with_delay_minutes(minutes: i64) -> Self {
        Self {
            delay: chrono::Duration::minutes(minutes),
        }
    }

    /// Listings created at or before this instant are old enough.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.delay
    }

    /// Legacy records without a score are treated as passing.
    pub fn score_allows_approval(score: Option<u8>) -> bool {
        score.map(passes_threshold).unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::moderation::APPROVAL_THRESHOLD;
    use chrono::Duration;

    fn startup(created_at: DateTime<Utc>, score: Option<u8>) -> Startup {
        Startup {
            id: 1,
            owner_id: 7,
            name: "Acme".to_string(),
            tagline: "Rockets".to_string(),
            logo: String::new(),
            industry: None,
            problem: None,
            solution: None,
            value_proposition: None,
            business_model: None,
            funding_goal: 0,
            funding_raised: 0,
            investor_count: 0,
            minimum_investment: 0,
            status: StartupStatus::Pending,
            moderation: score.map(|s| ModerationResult::from_score(s, String::new(), Vec::new())),
            created_at,
            approved_at: None,
        }
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [
            StartupStatus::Pending,
            StartupStatus::Approved,
            StartupStatus::Rejected,
        ] {
            assert_eq!(status.as_str().parse::<StartupStatus>().unwrap(), status);
        }
        assert!("archived".parse::<StartupStatus>().is_err());
    }

    #[test]
    fn test_eligibility_rules() {
        let now = Utc::now();
        let cutoff = SweepPolicy::default().cutoff(now);
        let eligible = |created_at, score| {
            startup(created_at, score).eligible_for_auto_approval(cutoff, APPROVAL_THRESHOLD)
        };

        assert!(eligible(now - Duration::minutes(31), Some(75)));
        assert!(eligible(now - Duration::minutes(30), Some(61)));
        assert!(eligible(now - Duration::minutes(40), None));
        assert!(!eligible(now - Duration::minutes(10), Some(90)));
        assert!(!eligible(now - Duration::minutes(31), Some(40)));
        assert!(!eligible(now - Duration::minutes(31), Some(60)));

        let mut approved = startup(now - Duration::hours(2), Some(99));
        approved.status = StartupStatus::Approved;
        assert!(!approved.eligible_for_auto_approval(cutoff, APPROVAL_THRESHOLD));

        // The threshold is a parameter, not baked in.
        let strict = startup(now - Duration::hours(1), Some(75));
        assert!(!strict.eligible_for_auto_approval(cutoff, 80));
    }

    #[test]
    fn test_missing_score_passes() {
        assert!(SweepPolicy::score_allows_approval(None));
        assert!(SweepPolicy::score_allows_approval(Some(61)));
        assert!(!SweepPolicy::score_allows_approval(Some(60)));
    }
}
