// Domain Layer - Pure business logic and entities

pub mod actor;
pub mod error;
pub mod member;
pub mod position;
pub mod queue;
pub mod ticket;

// Re-exports
pub use actor::{Actor, Role, Team, TeamId};
pub use error::DomainError;
pub use member::{MemberEntry, MemberStatus, UserId};
pub use position::{QueuePosition, QueueStats};
pub use queue::{Advance, Queue, QueueId, QueueStatus, DEFAULT_MINUTES_PER_MEMBER};
pub use ticket::TicketNumber;
