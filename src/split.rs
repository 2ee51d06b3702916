// Split computation and progress metric
// Everything here recomputes from the session state; there is no
// incremental bookkeeping to get out of sync.

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::normalize::round2;
use crate::session::{Assignment, SessionError, SplitSession};

// ============================================================================
// REPORT TYPES
// ============================================================================

/// How a share line was derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShareBasis {
    /// Equal fraction of a pool with this many members
    EqualSplit { among: usize },
    /// This many discrete units at the unit price
    UnitCount { units: usize },
}

/// One item's contribution to one participant's total
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareLine {
    pub item_name: String,
    pub amount: f64,
    pub basis: ShareBasis,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantShare {
    pub participant: String,
    pub total: f64,
    pub lines: Vec<ShareLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitReport {
    pub shares: Vec<ParticipantShare>,
    pub grand_total: f64,
    pub participant_count: usize,
    pub computed_at: DateTime<Utc>,
}

impl SplitReport {
    pub fn share_of(&self, name: &str) -> Option<&ParticipantShare> {
        self.shares.iter().find(|share| share.participant == name)
    }
}

// ============================================================================
// COMPUTATION
// ============================================================================

impl SplitSession {
    /// Compute what every participant owes.
    ///
    /// Refuses while any item still has nobody assigned; the error names
    /// them. Amounts use the effective (post-conversion when available)
    /// unit prices. Line amounts are shown rounded to cents; each
    /// participant total accumulates unrounded and is rounded once at the
    /// end, so pool fractions do not drift.
    pub fn calculate_split(&self) -> Result<SplitReport, SessionError> {
        if self.has_unassigned_items() {
            let names = self.unassigned_item_names();
            debug!("split: refused, {} items unassigned", names.len());
            return Err(SessionError::UnassignedItems(names));
        }

        let mut shares = Vec::with_capacity(self.participants.len());
        let mut grand_total = 0.0;

        for name in &self.participants {
            let mut lines = Vec::new();
            let mut total = 0.0;

            for entry in &self.items {
                let unit = entry.item.effective_unit_price();
                let (amount, basis) = match &entry.assignment {
                    Assignment::Shared { members } => {
                        if !members.iter().any(|member| member == name) {
                            continue;
                        }
                        // share_equally pools the whole quantity; a plain
                        // pooled item is a single unit
                        let pooled_units = if entry.item.share_equally {
                            entry.item.quantity as f64
                        } else {
                            1.0
                        };
                        (
                            unit * pooled_units / members.len() as f64,
                            ShareBasis::EqualSplit {
                                among: members.len(),
                            },
                        )
                    }
                    Assignment::Units { slots } => {
                        let held = slots
                            .iter()
                            .filter(|slot| slot.as_deref() == Some(name.as_str()))
                            .count();
                        if held == 0 {
                            continue;
                        }
                        (unit * held as f64, ShareBasis::UnitCount { units: held })
                    }
                };

                total += amount;
                lines.push(ShareLine {
                    item_name: entry.item.name.clone(),
                    amount: round2(amount),
                    basis,
                });
            }

            let total = round2(total);
            grand_total += total;
            shares.push(ParticipantShare {
                participant: name.clone(),
                total,
                lines,
            });
        }

        let report = SplitReport {
            shares,
            grand_total: round2(grand_total),
            participant_count: self.participants.len(),
            computed_at: Utc::now(),
        };
        info!(
            "split: {} participants, grand total {:.2}",
            report.participant_count, report.grand_total
        );
        Ok(report)
    }

    /// Whole-number percentage of units already handed out. A pooled item
    /// counts as one unit, a per-unit item as `quantity` units. 100 when
    /// there is nothing to assign.
    pub fn progress(&self) -> u8 {
        let total: usize = self
            .items
            .iter()
            .map(|entry| entry.assignment.total_units())
            .sum();
        if total == 0 {
            return 100;
        }

        let assigned: usize = self
            .items
            .iter()
            .map(|entry| entry.assignment.assigned_units())
            .sum();
        (100.0 * assigned as f64 / total as f64).round() as u8
    }
}

// ============================================================================
// TESTS
// ============================================================================
