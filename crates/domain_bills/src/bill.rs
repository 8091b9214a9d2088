//! Bill aggregate and lifecycle state machine
//!
//! A bill is a single netted debtor to creditor obligation. It is created
//! PENDING by a netting run and then carries the two-party settlement
//! protocol: the actual money moves outside the system, so the ledger only
//! settles when both parties have confirmed. Either party may instead raise
//! a dispute, which an organization admin resolves with an explicit outcome.
//!
//! # Invariants
//!
//! - `PENDING -> PAID` and `PENDING -> DISPUTED -> ADMIN_RESOLVED` are the
//!   only legal paths; PAID and ADMIN_RESOLVED are terminal
//! - Balances move exactly once, at the second acknowledgment or at admin
//!   resolution, never at bill creation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{Amount, BillId, OrgId, SettlementPeriod, UserId};
use domain_ledger::{LedgerEntry, TransactionType};
use domain_netting::ProposedBill;

use crate::error::BillError;
use crate::resolution::ResolutionOutcome;

/// Bill status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillStatus {
    /// Awaiting acknowledgment from both parties
    Pending,
    /// Both parties confirmed; settlement applied to the ledger
    Paid,
    /// One party contested the obligation
    Disputed,
    /// An organization admin ruled on the dispute
    AdminResolved,
}

impl BillStatus {
    /// Storage representation (text column on the bills table)
    pub fn as_str(&self) -> &'static str {
        match self {
            BillStatus::Pending => "pending",
            BillStatus::Paid => "paid",
            BillStatus::Disputed => "disputed",
            BillStatus::AdminResolved => "admin_resolved",
        }
    }

    /// Terminal statuses admit no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, BillStatus::Paid | BillStatus::AdminResolved)
    }

    /// A bill still awaiting settlement or resolution
    pub fn is_open(&self) -> bool {
        !self.is_terminal()
    }
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BillStatus {
    type Err = BillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BillStatus::Pending),
            "paid" => Ok(BillStatus::Paid),
            "disputed" => Ok(BillStatus::Disputed),
            "admin_resolved" => Ok(BillStatus::AdminResolved),
            other => Err(BillError::UnknownStatus(other.to_string())),
        }
    }
}

/// The side a member takes on a bill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillRole {
    Debtor,
    Creditor,
}

/// Result of recording an acknowledgment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcknowledgeEffect {
    /// First confirmation from this side was recorded; no balance change
    Recorded(BillRole),
    /// This side had already confirmed; nothing changed
    AlreadyRecorded(BillRole),
    /// Second confirmation arrived; the bill is now PAID and the caller
    /// must apply the settlement postings atomically with this transition
    Settled,
}

/// A netted debtor to creditor obligation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    /// Unique identifier
    pub id: BillId,
    /// Owning organization
    pub org_id: OrgId,
    /// Member who owes
    pub debtor_id: UserId,
    /// Member who is owed
    pub creditor_id: UserId,
    /// Obligation amount, always positive
    pub amount: Amount,
    /// Settlement period the bill was produced for
    pub period: SettlementPeriod,
    /// Current status
    pub status: BillStatus,
    /// When the debtor confirmed paying
    pub debtor_acknowledged_at: Option<DateTime<Utc>>,
    /// When the creditor confirmed receiving
    pub creditor_acknowledged_at: Option<DateTime<Utc>>,
    /// When the bill was disputed
    pub disputed_at: Option<DateTime<Utc>>,
    /// Who raised the dispute
    pub disputed_by: Option<UserId>,
    /// Why the bill was disputed
    pub dispute_reason: Option<String>,
    /// When an admin resolved the dispute
    pub resolved_at: Option<DateTime<Utc>>,
    /// The admin's ruling
    pub resolution_outcome: Option<ResolutionOutcome>,
    /// The admin's notes
    pub resolution_notes: Option<String>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Bill {
    /// Creates a new pending bill
    pub fn new(
        org_id: OrgId,
        debtor_id: UserId,
        creditor_id: UserId,
        amount: Amount,
        period: SettlementPeriod,
    ) -> Result<Self, BillError> {
        if !amount.is_positive() {
            return Err(BillError::NonPositiveAmount(amount));
        }
        if debtor_id == creditor_id {
            return Err(BillError::SamePartyBill(debtor_id));
        }
        let now = Utc::now();
        Ok(Self {
            id: BillId::new_v7(),
            org_id,
            debtor_id,
            creditor_id,
            amount,
            period,
            status: BillStatus::Pending,
            debtor_acknowledged_at: None,
            creditor_acknowledged_at: None,
            disputed_at: None,
            disputed_by: None,
            dispute_reason: None,
            resolved_at: None,
            resolution_outcome: None,
            resolution_notes: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Materializes a netting proposal into a pending bill
    pub fn from_proposal(org_id: OrgId, proposal: &ProposedBill) -> Result<Self, BillError> {
        Self::new(
            org_id,
            proposal.debtor_id,
            proposal.creditor_id,
            proposal.amount,
            proposal.period,
        )
    }

    /// The side `user_id` takes on this bill, if any
    pub fn role_of(&self, user_id: UserId) -> Option<BillRole> {
        if user_id == self.debtor_id {
            Some(BillRole::Debtor)
        } else if user_id == self.creditor_id {
            Some(BillRole::Creditor)
        } else {
            None
        }
    }

    /// True if `user_id` is the debtor or the creditor
    pub fn is_party(&self, user_id: UserId) -> bool {
        self.role_of(user_id).is_some()
    }

    /// Records an acknowledgment from one of the bill's parties
    ///
    /// The role is inferred from the actor's identity. Re-acknowledging the
    /// same side is a no-op success. When the second side confirms, the
    /// status moves to PAID and the caller must commit the settlement
    /// postings in the same atomic unit.
    pub fn acknowledge(
        &mut self,
        actor_id: UserId,
        at: DateTime<Utc>,
    ) -> Result<AcknowledgeEffect, BillError> {
        let role = self.role_of(actor_id).ok_or(BillError::NotAParty {
            user_id: actor_id,
            bill_id: self.id,
        })?;
        if self.status != BillStatus::Pending {
            return Err(BillError::InvalidTransition {
                from: self.status,
                action: "acknowledge",
            });
        }

        let slot = match role {
            BillRole::Debtor => &mut self.debtor_acknowledged_at,
            BillRole::Creditor => &mut self.creditor_acknowledged_at,
        };
        if slot.is_some() {
            return Ok(AcknowledgeEffect::AlreadyRecorded(role));
        }
        *slot = Some(at);
        self.updated_at = at;

        if self.debtor_acknowledged_at.is_some() && self.creditor_acknowledged_at.is_some() {
            self.status = BillStatus::Paid;
            Ok(AcknowledgeEffect::Settled)
        } else {
            Ok(AcknowledgeEffect::Recorded(role))
        }
    }

    /// Raises a dispute on a pending bill
    ///
    /// Either party may dispute. No balance change occurs; the bill waits
    /// for an admin ruling.
    pub fn dispute(
        &mut self,
        actor_id: UserId,
        reason: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Result<(), BillError> {
        if !self.is_party(actor_id) {
            return Err(BillError::NotAParty {
                user_id: actor_id,
                bill_id: self.id,
            });
        }
        if self.status != BillStatus::Pending {
            return Err(BillError::InvalidTransition {
                from: self.status,
                action: "dispute",
            });
        }
        let reason = reason.into();
        if reason.trim().is_empty() {
            return Err(BillError::BlankDisputeReason);
        }

        self.status = BillStatus::Disputed;
        self.disputed_at = Some(at);
        self.disputed_by = Some(actor_id);
        self.dispute_reason = Some(reason);
        self.updated_at = at;
        Ok(())
    }

    /// Applies an admin ruling to a disputed bill
    ///
    /// Admin role verification is the caller's responsibility; the state
    /// machine enforces only the status and the audit fields. The caller
    /// must commit the outcome's ledger adjustments in the same atomic unit.
    pub fn resolve(
        &mut self,
        outcome: ResolutionOutcome,
        notes: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Result<(), BillError> {
        if self.status != BillStatus::Disputed {
            return Err(BillError::InvalidTransition {
                from: self.status,
                action: "resolve",
            });
        }
        let notes = notes.into();
        if notes.trim().is_empty() {
            return Err(BillError::BlankResolutionNotes);
        }

        self.status = BillStatus::AdminResolved;
        self.resolved_at = Some(at);
        self.resolution_outcome = Some(outcome);
        self.resolution_notes = Some(notes);
        self.updated_at = at;
        Ok(())
    }

    /// The posting pair committed when the bill settles
    ///
    /// Debits the debtor and credits the creditor by the bill amount, both
    /// referencing this bill.
    pub fn settlement_postings(&self) -> Result<[LedgerEntry; 2], BillError> {
        let debit = LedgerEntry::new(
            self.org_id,
            self.debtor_id,
            -self.amount,
            TransactionType::SettlementDebit,
            format!("Bill settled for period {}", self.period),
        )?
        .with_reference(*self.id.as_uuid());
        let credit = LedgerEntry::new(
            self.org_id,
            self.creditor_id,
            self.amount,
            TransactionType::SettlementCredit,
            format!("Bill settled for period {}", self.period),
        )?
        .with_reference(*self.id.as_uuid());
        Ok([debit, credit])
    }
}
