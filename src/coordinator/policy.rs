//! Acknowledgement policy for replicated writes
//!
//! A [`ConsistencyPolicy`] is fed one outcome per writer, in arrival order,
//! and decides the earliest point at which the write is settled:
//!
//! - counting (`one`, `quorum`, `all`): settled once `need` writers have
//!   succeeded, or as soon as enough writers have failed that `need`
//!   successes can no longer be reached;
//! - owner: settled by the designated owner's outcome alone;
//! - any: settled at dispatch, before any outcome arrives.
//!
//! One instance covers exactly one write and is owned by the collector loop.

use crate::common::{ConsistencyLevel, Error, Result};

/// Current decision of a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pending,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    Any,
    Count { need: usize },
    Owner { owner_id: usize },
}

#[derive(Debug)]
pub struct ConsistencyPolicy {
    rule: Rule,
    writers: usize,
    succeeded: usize,
    failed: usize,
    verdict: Verdict,
}

impl ConsistencyPolicy {
    /// Build the policy for `level` over `writers` dispatched writers.
    /// `owner_id` is only consulted for [`ConsistencyLevel::Owner`].
    pub fn for_level(level: ConsistencyLevel, writers: usize, owner_id: usize) -> Result<Self> {
        match level {
            ConsistencyLevel::Any => Ok(Self::any(writers)),
            ConsistencyLevel::Owner => Self::owner(owner_id, writers),
            ConsistencyLevel::One | ConsistencyLevel::Quorum | ConsistencyLevel::All => {
                if writers == 0 {
                    return Err(Error::InvalidConfig(format!(
                        "consistency level {} requires at least one writer",
                        level
                    )));
                }
                // required_acks is Some for every counting level
                let need = level.required_acks(writers).unwrap_or(writers);
                Self::counting(need, writers)
            }
        }
    }

    /// Succeed once `need` of `writers` acknowledge.
    ///
    /// `need` larger than `writers` is accepted. It settles as a failure on
    /// the first failed outcome, or once every writer has answered.
    pub fn counting(need: usize, writers: usize) -> Result<Self> {
        if need == 0 {
            return Err(Error::InvalidConfig(
                "required acknowledgements must be positive".into(),
            ));
        }
        Ok(Self::with_rule(Rule::Count { need }, writers))
    }

    /// Settle on the outcome of writer `owner_id`.
    pub fn owner(owner_id: usize, writers: usize) -> Result<Self> {
        if owner_id >= writers {
            return Err(Error::InvalidConfig(format!(
                "owner writer {} out of range for {} writers",
                owner_id, writers
            )));
        }
        Ok(Self::with_rule(Rule::Owner { owner_id }, writers))
    }

    /// Settled as soon as the write is handed off.
    pub fn any(writers: usize) -> Self {
        let mut policy = Self::with_rule(Rule::Any, writers);
        policy.verdict = Verdict::Succeeded;
        policy
    }

    fn with_rule(rule: Rule, writers: usize) -> Self {
        Self {
            rule,
            writers,
            succeeded: 0,
            failed: 0,
            verdict: Verdict::Pending,
        }
    }

    /// Record the outcome of `writer_id` and report whether the write is now
    /// settled. Once settled, further outcomes do not change the verdict.
    pub fn is_done(&mut self, writer_id: usize, result: &Result<()>) -> bool {
        if self.verdict != Verdict::Pending {
            return true;
        }

        let ok = result.is_ok();
        if ok {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }

        self.verdict = match self.rule {
            Rule::Any => Verdict::Succeeded,
            Rule::Owner { owner_id } if owner_id == writer_id => {
                if ok {
                    Verdict::Succeeded
                } else {
                    Verdict::Failed
                }
            }
            Rule::Owner { .. } => Verdict::Pending,
            Rule::Count { need } => {
                let reachable = self.writers.saturating_sub(self.failed);
                if self.succeeded >= need {
                    Verdict::Succeeded
                } else if (!ok && reachable < need) || self.observed() >= self.writers {
                    Verdict::Failed
                } else {
                    Verdict::Pending
                }
            }
        };

        self.verdict != Verdict::Pending
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    /// Acknowledgements required, for counting policies.
    pub fn need(&self) -> Option<usize> {
        match self.rule {
            Rule::Count { need } => Some(need),
            _ => None,
        }
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Outcomes consumed so far.
    pub fn observed(&self) -> usize {
        self.succeeded + self.failed
    }
}
