// Member Entry Domain Model

use crate::domain::error::{DomainError, Result};
use crate::domain::ticket::TicketNumber;
use serde::{Deserialize, Serialize};

/// User identifier (supplied by the identity collaborator)
pub type UserId = String;

/// Member Status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberStatus {
    Pending,
    Waiting,
    Current,
    Completed,
    Cancelled,
    Rejected,
}

impl MemberStatus {
    /// Holds a slot in the queue (blocks a second join by the same user)
    pub fn is_live(self) -> bool {
        matches!(
            self,
            MemberStatus::Pending | MemberStatus::Waiting | MemberStatus::Current
        )
    }

    pub fn is_terminal(self) -> bool {
        !self.is_live()
    }
}

impl std::fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemberStatus::Pending => write!(f, "PENDING"),
            MemberStatus::Waiting => write!(f, "WAITING"),
            MemberStatus::Current => write!(f, "CURRENT"),
            MemberStatus::Completed => write!(f, "COMPLETED"),
            MemberStatus::Cancelled => write!(f, "CANCELLED"),
            MemberStatus::Rejected => write!(f, "REJECTED"),
        }
    }
}

/// One join attempt by one user into one queue.
///
/// Entries are never removed from a queue; they only move to a terminal
/// status. All transitions take an explicit timestamp so that callers stay
/// deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberEntry {
    pub user_id: UserId,
    pub ticket_number: TicketNumber,
    pub status: MemberStatus,
    pub joined_at: i64, // epoch ms

    /// Set when the entry becomes CURRENT
    #[serde(default)]
    pub served_at: Option<i64>,
    /// Set when the entry reaches a terminal status
    #[serde(default)]
    pub finished_at: Option<i64>,

    #[serde(default)]
    pub note: Option<String>,
    /// Mentor/admin annotation, independent of status
    #[serde(default)]
    pub mentor_note: Option<String>,
}

impl MemberEntry {
    /// Create a fresh PENDING entry
    pub fn new(
        user_id: impl Into<String>,
        ticket_number: TicketNumber,
        joined_at: i64,
        note: Option<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            ticket_number,
            status: MemberStatus::Pending,
            joined_at,
            served_at: None,
            finished_at: None,
            note,
            mentor_note: None,
        }
    }

    /// PENDING -> WAITING
    pub fn approve(&mut self) -> Result<()> {
        self.require(MemberStatus::Pending, MemberStatus::Waiting)?;
        self.status = MemberStatus::Waiting;
        Ok(())
    }

    /// PENDING -> REJECTED
    pub fn reject(&mut self, now_millis: i64) -> Result<()> {
        self.require(MemberStatus::Pending, MemberStatus::Rejected)?;
        self.status = MemberStatus::Rejected;
        self.finished_at = Some(now_millis);
        Ok(())
    }

    /// WAITING -> CURRENT
    pub fn serve(&mut self, now_millis: i64) -> Result<()> {
        self.require(MemberStatus::Waiting, MemberStatus::Current)?;
        self.status = MemberStatus::Current;
        self.served_at = Some(now_millis);
        Ok(())
    }

    /// CURRENT -> COMPLETED
    pub fn complete(&mut self, now_millis: i64) -> Result<()> {
        self.require(MemberStatus::Current, MemberStatus::Completed)?;
        self.status = MemberStatus::Completed;
        self.finished_at = Some(now_millis);
        Ok(())
    }

    /// PENDING | WAITING | CURRENT -> CANCELLED
    pub fn cancel(&mut self, now_millis: i64) -> Result<()> {
        if !self.status.is_live() {
            return Err(self.illegal(MemberStatus::Cancelled));
        }
        self.status = MemberStatus::Cancelled;
        self.finished_at = Some(now_millis);
        Ok(())
    }

    fn require(&self, from: MemberStatus, to: MemberStatus) -> Result<()> {
        if self.status != from {
            return Err(self.illegal(to));
        }
        Ok(())
    }

    fn illegal(&self, to: MemberStatus) -> DomainError {
        DomainError::InvalidTransition {
            from: self.status.to_string(),
            to: to.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> MemberEntry {
        MemberEntry::new("alice", 1, 1_000, Some("rust help".into()))
    }

    #[test]
    fn test_new_entry_is_pending() {
        let e = entry();
        assert_eq!(e.status, MemberStatus::Pending);
        assert!(e.status.is_live());
        assert_eq!(e.served_at, None);
    }

    #[test]
    fn test_happy_path_records_timestamps() {
        let mut e = entry();
        e.approve().unwrap();
        e.serve(2_000).unwrap();
        assert_eq!(e.served_at, Some(2_000));
        e.complete(3_000).unwrap();
        assert_eq!(e.status, MemberStatus::Completed);
        assert_eq!(e.finished_at, Some(3_000));
        assert!(e.status.is_terminal());
    }

    #[test]
    fn test_serve_requires_waiting() {
        let mut e = entry();
        let err = e.serve(2_000).unwrap_err();
        assert_eq!(
            err,
            DomainError::InvalidTransition {
                from: "PENDING".into(),
                to: "CURRENT".into(),
            }
        );
        assert_eq!(e.status, MemberStatus::Pending);
    }

    #[test]
    fn test_cancel_from_every_live_status() {
        for steps in 0..3 {
            let mut e = entry();
            if steps >= 1 {
                e.approve().unwrap();
            }
            if steps >= 2 {
                e.serve(1).unwrap();
            }
            e.cancel(5).unwrap();
            assert_eq!(e.status, MemberStatus::Cancelled);
        }
    }

    #[test]
    fn test_terminal_entries_cannot_move() {
        let mut e = entry();
        e.reject(10).unwrap();
        assert!(e.approve().is_err());
        assert!(e.cancel(11).is_err());
        assert_eq!(e.finished_at, Some(10));
    }

    #[test]
    fn test_status_serializes_screaming_case() {
        let json = serde_json::to_string(&MemberStatus::Waiting).unwrap();
        assert_eq!(json, "\"WAITING\"");
    }
}
