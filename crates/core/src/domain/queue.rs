// Queue Aggregate

use crate::domain::actor::TeamId;
use crate::domain::error::{DomainError, Result};
use crate::domain::member::{MemberEntry, MemberStatus};
use crate::domain::ticket::{self, TicketNumber};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Queue identifier (UUID v4)
pub type QueueId = String;

/// Default minutes a mentor spends per student (ETA display only)
pub const DEFAULT_MINUTES_PER_MEMBER: u32 = 15;

/// Queue Status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueueStatus {
    Active,
    Paused,
    Closed,
}

impl QueueStatus {
    /// ACTIVE <-> PAUSED, anything -> CLOSED. CLOSED is final.
    pub fn can_transition_to(self, next: QueueStatus) -> bool {
        match (self, next) {
            (QueueStatus::Closed, _) => false,
            (_, QueueStatus::Closed) => true,
            (QueueStatus::Active, QueueStatus::Paused) | (QueueStatus::Paused, QueueStatus::Active) => {
                true
            }
            _ => false,
        }
    }
}

impl std::fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueStatus::Active => write!(f, "ACTIVE"),
            QueueStatus::Paused => write!(f, "PAUSED"),
            QueueStatus::Closed => write!(f, "CLOSED"),
        }
    }
}

impl std::str::FromStr for QueueStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(QueueStatus::Active),
            "PAUSED" => Ok(QueueStatus::Paused),
            "CLOSED" => Ok(QueueStatus::Closed),
            _ => Err(DomainError::InvalidStatus(s.to_string())),
        }
    }
}

/// Result of serving the next person
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advance {
    /// Ticket of the entry that moved CURRENT -> COMPLETED
    pub completed: Option<TicketNumber>,
    /// Entry that moved WAITING -> CURRENT
    pub served: Option<MemberEntry>,
}

impl Advance {
    pub fn changed(&self) -> bool {
        self.completed.is_some() || self.served.is_some()
    }
}

/// Queue snapshot: the unit of atomic read and write.
///
/// `members` is append-only and kept in arrival order. Display order and
/// positions are derived on read (see `position`), never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Queue {
    pub id: QueueId,
    pub team_id: TeamId,
    pub session_date: NaiveDate,
    pub status: QueueStatus,
    pub estimated_minutes_per_member: u32,

    /// Number of tickets issued so far (never decreases)
    pub tickets_issued: u64,
    pub members: Vec<MemberEntry>,

    /// Optimistic concurrency token, owned by the repository
    pub version: u64,
    pub created_at: i64, // epoch ms
}

impl Queue {
    /// Create an empty ACTIVE queue
    ///
    /// # Arguments
    ///
    /// * `id` - Queue ID (injected, not generated)
    /// * `team_id` - Owning team
    /// * `session_date` - Day this queue serves
    /// * `minutes_per_member` - ETA factor, must be positive
    /// * `created_at` - Creation timestamp in epoch ms (injected)
    pub fn new(
        id: impl Into<String>,
        team_id: impl Into<String>,
        session_date: NaiveDate,
        minutes_per_member: u32,
        created_at: i64,
    ) -> Result<Self> {
        if minutes_per_member == 0 {
            return Err(DomainError::Validation(
                "estimated minutes per member must be positive".to_string(),
            ));
        }

        Ok(Self {
            id: id.into(),
            team_id: team_id.into(),
            session_date,
            status: QueueStatus::Active,
            estimated_minutes_per_member: minutes_per_member,
            tickets_issued: 0,
            members: Vec::new(),
            version: 0,
            created_at,
        })
    }

    /// The user's PENDING, WAITING or CURRENT entry, if any
    pub fn live_entry(&self, user_id: &str) -> Option<&MemberEntry> {
        self.members
            .iter()
            .find(|m| m.user_id == user_id && m.status.is_live())
    }

    /// The user's most recent entry, whatever its status
    pub fn latest_entry(&self, user_id: &str) -> Option<&MemberEntry> {
        self.members
            .iter()
            .filter(|m| m.user_id == user_id)
            .max_by_key(|m| m.ticket_number)
    }

    pub fn current(&self) -> Option<&MemberEntry> {
        self.members
            .iter()
            .find(|m| m.status == MemberStatus::Current)
    }

    pub fn count(&self, status: MemberStatus) -> usize {
        self.members.iter().filter(|m| m.status == status).count()
    }

    /// Admit a user as PENDING and hand out the next ticket
    pub fn join(&mut self, user_id: &str, note: Option<String>, now_millis: i64) -> Result<TicketNumber> {
        if self.status != QueueStatus::Active {
            return Err(DomainError::QueueNotActive {
                queue_id: self.id.clone(),
                status: self.status.to_string(),
            });
        }
        if self.live_entry(user_id).is_some() {
            return Err(DomainError::AlreadyInQueue(user_id.to_string()));
        }

        let (ticket, issued) = ticket::allocate(self.tickets_issued);
        self.tickets_issued = issued;
        self.members
            .push(MemberEntry::new(user_id, ticket, now_millis, note));
        Ok(ticket)
    }

    /// PENDING -> WAITING for the user's request
    pub fn approve(&mut self, user_id: &str) -> Result<TicketNumber> {
        let entry = self.pending_entry_mut(user_id)?;
        entry.approve()?;
        Ok(entry.ticket_number)
    }

    /// PENDING -> REJECTED for the user's request
    pub fn reject(&mut self, user_id: &str, now_millis: i64) -> Result<TicketNumber> {
        let entry = self.pending_entry_mut(user_id)?;
        entry.reject(now_millis)?;
        Ok(entry.ticket_number)
    }

    /// Cancel the user's live entry. Returns the status it left.
    pub fn leave(&mut self, user_id: &str, now_millis: i64) -> Result<MemberStatus> {
        let entry = self
            .members
            .iter_mut()
            .find(|m| m.user_id == user_id && m.status.is_live())
            .ok_or_else(|| DomainError::NotInQueue(user_id.to_string()))?;

        let previous = entry.status;
        entry.cancel(now_millis)?;
        Ok(previous)
    }

    /// Complete the CURRENT entry (if any) and serve the lowest WAITING ticket.
    ///
    /// Never fails: with nobody waiting this only completes the current entry,
    /// and on a queue with neither it changes nothing.
    pub fn advance(&mut self, now_millis: i64) -> Result<Advance> {
        let mut completed = None;
        if let Some(current) = self
            .members
            .iter_mut()
            .find(|m| m.status == MemberStatus::Current)
        {
            current.complete(now_millis)?;
            completed = Some(current.ticket_number);
        }

        let next = self
            .members
            .iter_mut()
            .filter(|m| m.status == MemberStatus::Waiting)
            .min_by_key(|m| m.ticket_number);

        let served = match next {
            Some(entry) => {
                entry.serve(now_millis)?;
                Some(entry.clone())
            }
            None => None,
        };

        Ok(Advance { completed, served })
    }

    /// Change queue status. Returns false when already in that status.
    pub fn set_status(&mut self, next: QueueStatus) -> Result<bool> {
        if self.status == next {
            return Ok(false);
        }
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidStatus(format!(
                "cannot move queue from {} to {}",
                self.status, next
            )));
        }
        self.status = next;
        Ok(true)
    }

    /// Overwrite the mentor note on the user's most recent entry
    pub fn set_mentor_note(&mut self, user_id: &str, note: Option<String>) -> Result<TicketNumber> {
        let ticket = self
            .latest_entry(user_id)
            .map(|m| m.ticket_number)
            .ok_or_else(|| DomainError::MemberNotFound {
                queue_id: self.id.clone(),
                user_id: user_id.to_string(),
            })?;
        if let Some(entry) = self.members.iter_mut().find(|m| m.ticket_number == ticket) {
            entry.mentor_note = note;
        }
        Ok(ticket)
    }

    /// Copy for viewers who may not read mentor annotations
    pub fn without_mentor_notes(mut self) -> Self {
        for m in &mut self.members {
            m.mentor_note = None;
        }
        self
    }

    /// Describe every broken aggregate invariant (empty when healthy)
    pub fn invariant_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();

        let current = self.count(MemberStatus::Current);
        if current > 1 {
            violations.push(format!("{} CURRENT entries", current));
        }

        let mut live_users = HashSet::new();
        for m in self.members.iter().filter(|m| m.status.is_live()) {
            if !live_users.insert(m.user_id.as_str()) {
                violations.push(format!("user {} holds two live entries", m.user_id));
            }
        }

        for pair in self.members.windows(2) {
            if pair[1].ticket_number <= pair[0].ticket_number {
                violations.push(format!(
                    "ticket {} follows ticket {}",
                    pair[1].ticket_number, pair[0].ticket_number
                ));
            }
        }

        if let Some(last) = self.members.last() {
            if last.ticket_number > self.tickets_issued {
                violations.push(format!(
                    "ticket {} exceeds issued counter {}",
                    last.ticket_number, self.tickets_issued
                ));
            }
        }

        violations
    }

    fn pending_entry_mut(&mut self, user_id: &str) -> Result<&mut MemberEntry> {
        self.members
            .iter_mut()
            .find(|m| m.user_id == user_id && m.status == MemberStatus::Pending)
            .ok_or_else(|| DomainError::NoPendingRequest(user_id.to_string()))
    }
}
