// Team Directory Port (Interface)

use crate::domain::{Team, TeamId};
use crate::error::Result;
use async_trait::async_trait;

/// Team directory: who owns which team.
///
/// Queues consult it for authorization; `register` is how teams get there.
#[async_trait]
pub trait TeamDirectory: Send + Sync {
    async fn find_team(&self, id: &TeamId) -> Result<Option<Team>>;

    /// Insert or replace a team record
    async fn register(&self, team: &Team) -> Result<()>;
}

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct InMemoryTeamDirectory {
        teams: Mutex<HashMap<TeamId, Team>>,
        fail_lookups: AtomicBool,
    }

    impl InMemoryTeamDirectory {
        pub fn with_teams(teams: impl IntoIterator<Item = Team>) -> Self {
            Self {
                teams: Mutex::new(teams.into_iter().map(|t| (t.id.clone(), t)).collect()),
                fail_lookups: AtomicBool::new(false),
            }
        }

        /// Make every `find_team` fail until switched back
        pub fn fail_lookups(&self, fail: bool) {
            self.fail_lookups.store(fail, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl TeamDirectory for InMemoryTeamDirectory {
        async fn find_team(&self, id: &TeamId) -> Result<Option<Team>> {
            if self.fail_lookups.load(Ordering::SeqCst) {
                return Err(AppError::Database("team lookup unavailable".to_string()));
            }
            Ok(self.teams.lock().unwrap().get(id).cloned())
        }

        async fn register(&self, team: &Team) -> Result<()> {
            self.teams
                .lock()
                .unwrap()
                .insert(team.id.clone(), team.clone());
            Ok(())
        }
    }
}
