use std::time::Duration;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

use crate::validator::{EmailAddress, EmailError, ValidationMode};

/// Who the probe claims to be in `HELO` and `MAIL FROM`.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderIdentity {
    pub from_name: String,
    pub from_domain: String,
}

impl Default for SenderIdentity {
    fn default() -> Self {
        Self {
            from_name: "noreply".to_string(),
            from_domain: "localhost".to_string(),
        }
    }
}

impl SenderIdentity {
    pub fn new(from_name: impl Into<String>, from_domain: impl Into<String>) -> Self {
        Self {
            from_name: from_name.into(),
            from_domain: from_domain.into(),
        }
    }

    /// Builds the identity from a `name@domain` address, split on the first `@`.
    pub fn from_address(address: &str) -> Result<Self, EmailError> {
        let parsed = EmailAddress::parse(address)?;
        Ok(Self::new(parsed.local_part(), parsed.domain()))
    }

    pub fn address(&self) -> String {
        format!("{}@{}", self.from_name, self.from_domain)
    }

    pub(crate) fn helo_command(&self) -> String {
        format!("HELO {}", self.from_domain)
    }

    pub(crate) fn mail_from_command(&self) -> String {
        format!("MAIL FROM: <{}>", self.address())
    }
}

/// Time limits for one probe run.
///
/// `connection_budget_secs` is shared by all candidate hosts;
/// `per_read_timeout_secs` bounds every single reply read. A zero value
/// disables the corresponding deadline.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutBudget {
    pub connection_budget_secs: u64,
    pub per_read_timeout_secs: u64,
}

impl Default for TimeoutBudget {
    fn default() -> Self {
        Self {
            connection_budget_secs: 30,
            per_read_timeout_secs: 5,
        }
    }
}

impl TimeoutBudget {
    /// Ceiling share of the connection budget for one of `candidates` hosts.
    pub fn per_attempt_secs(&self, candidates: usize) -> u64 {
        let count = candidates.max(1) as u64;
        self.connection_budget_secs.div_ceil(count)
    }

    pub fn per_attempt_timeout(&self, candidates: usize) -> Option<Duration> {
        non_zero(self.per_attempt_secs(candidates))
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        non_zero(self.per_read_timeout_secs)
    }
}

fn non_zero(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Configuration knobs for [`Prober`](super::Prober), fixed before a run.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOptions {
    pub sender: SenderIdentity,
    pub port: u16,
    pub timeouts: TimeoutBudget,
    pub validation_mode: ValidationMode,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            sender: SenderIdentity::default(),
            port: 25,
            timeouts: TimeoutBudget::default(),
            validation_mode: ValidationMode::Strict,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn defaults() {
        let options = ProbeOptions::default();
        assert_eq!(options.sender.address(), "noreply@localhost");
        assert_eq!(options.port, 25);
        assert_eq!(options.timeouts.connection_budget_secs, 30);
        assert_eq!(options.timeouts.read_timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn commands_use_sender_identity() {
        let sender = SenderIdentity::from_address("probe@mail.example.net").unwrap();
        assert_eq!(sender.helo_command(), "HELO mail.example.net");
        assert_eq!(
            sender.mail_from_command(),
            "MAIL FROM: <probe@mail.example.net>"
        );
    }

    #[test]
    fn sender_from_address_requires_at() {
        assert!(SenderIdentity::from_address("probe").is_err());
    }

    #[test]
    fn single_candidate_gets_whole_budget() {
        let budget = TimeoutBudget::default();
        assert_eq!(budget.per_attempt_secs(1), 30);
        assert_eq!(budget.per_attempt_secs(0), 30);
    }

    #[test]
    fn budget_split_rounds_up() {
        let budget = TimeoutBudget::default();
        assert_eq!(budget.per_attempt_secs(4), 8);
        assert_eq!(budget.per_attempt_secs(7), 5);
        assert_eq!(budget.per_attempt_secs(60), 1);
    }

    #[test]
    fn zero_disables_deadlines() {
        let budget = TimeoutBudget {
            connection_budget_secs: 0,
            per_read_timeout_secs: 0,
        };
        assert_eq!(budget.per_attempt_timeout(3), None);
        assert_eq!(budget.read_timeout(), None);
    }

    proptest! {
        #[test]
        fn total_connect_time_is_bounded(budget in 1u64..10_000, hosts in 1usize..64) {
            let timeouts = TimeoutBudget {
                connection_budget_secs: budget,
                per_read_timeout_secs: 5,
            };
            let each = timeouts.per_attempt_secs(hosts);
            prop_assert_eq!(each, budget.div_ceil(hosts as u64));
            prop_assert!(each * hosts as u64 <= budget + hosts as u64 - 1);
        }
    }
}
