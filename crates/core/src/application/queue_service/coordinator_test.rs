//! Coordinator tests against in-memory ports

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::domain::{MemberStatus, Team};
    use crate::error::ErrorKind;
    use crate::port::id_provider::mocks::SequentialIdProvider;
    use crate::port::notifier::mocks::RecordingNotifier;
    use crate::port::queue_repository::mocks::InMemoryQueueRepository;
    use crate::port::team_directory::mocks::InMemoryTeamDirectory;
    use crate::port::time_provider::mocks::ManualClock;
    use futures::future::join_all;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::BTreeSet;

    // 2026-10-19T09:00:00Z
    const START: i64 = 1_792_400_400_000;

    struct Harness {
        coord: Arc<QueueCoordinator>,
        repo: Arc<InMemoryQueueRepository>,
        teams: Arc<InMemoryTeamDirectory>,
        notifier: Arc<RecordingNotifier>,
        clock: Arc<ManualClock>,
    }

    fn harness() -> Harness {
        let mut inactive = Team::new("team-old", "Retired cohort", "mentor-1");
        inactive.is_active = false;
        let teams = Arc::new(InMemoryTeamDirectory::with_teams([
            Team::new("team-1", "Rust cohort", "mentor-1"),
            Team::new("team-2", "Go cohort", "mentor-2"),
            inactive,
        ]));

        let repo = Arc::new(InMemoryQueueRepository::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let clock = Arc::new(ManualClock::new(START));
        let coord = QueueCoordinator::new(
            repo.clone(),
            teams.clone(),
            notifier.clone(),
            Arc::new(SequentialIdProvider::default()),
            clock.clone(),
            CoordinatorConfig {
                max_swap_attempts: 5,
                swap_base_delay_ms: 1,
            },
        );

        Harness {
            coord: Arc::new(coord),
            repo,
            teams,
            notifier,
            clock,
        }
    }

    fn mentor() -> Actor {
        Actor::mentor("mentor-1")
    }

    async fn open_queue(h: &Harness) -> Queue {
        h.coord
            .create_queue(&mentor(), CreateQueueRequest::for_team("team-1"))
            .await
            .unwrap()
    }

    async fn admit(h: &Harness, queue_id: &str, user: &str) {
        h.coord
            .join(queue_id, &Actor::student(user), None)
            .await
            .unwrap();
        h.coord.approve(queue_id, &mentor(), user).await.unwrap();
    }

    #[tokio::test]
    async fn test_join_approve_serve_flow() {
        let h = harness();
        let q = open_queue(&h).await;
        assert_eq!(q.status, QueueStatus::Active);
        assert_eq!(q.session_date.to_string(), "2026-10-19");
        assert_eq!(q.estimated_minutes_per_member, 15);

        let after_a = h.coord.join(&q.id, &Actor::student("A"), None).await.unwrap();
        assert_eq!(after_a.members[0].ticket_number, 1);
        assert_eq!(after_a.members[0].status, MemberStatus::Pending);

        let after_b = h
            .coord
            .join(&q.id, &Actor::student("B"), Some("  borrowck  ".into()))
            .await
            .unwrap();
        assert_eq!(after_b.members[1].ticket_number, 2);
        assert_eq!(after_b.members[1].note.as_deref(), Some("borrowck"));

        h.coord.approve(&q.id, &mentor(), "A").await.unwrap();
        h.coord.approve(&q.id, &mentor(), "B").await.unwrap();

        let first = h.coord.advance(&q.id, &mentor()).await.unwrap();
        assert_eq!(first.served.as_ref().unwrap().user_id, "A");
        assert_eq!(first.completed, None);

        let pos = h.coord.position(&q.id, "B").await.unwrap().unwrap();
        assert_eq!(pos.position, 1);
        assert_eq!(pos.estimated_wait_minutes, 15);
        assert_eq!(h.coord.position(&q.id, "A").await.unwrap(), None);

        let second = h.coord.advance(&q.id, &mentor()).await.unwrap();
        assert_eq!(second.completed, Some(1));
        assert_eq!(second.served.unwrap().user_id, "B");
        assert_eq!(second.queue.members[0].status, MemberStatus::Completed);
        assert_eq!(second.queue.members[1].status, MemberStatus::Current);

        let changes: Vec<QueueChange> = h.notifier.events().into_iter().map(|e| e.change).collect();
        assert_eq!(changes.len(), 7);
        assert_eq!(changes[0], QueueChange::Created);
        assert_eq!(
            changes[1],
            QueueChange::Joined {
                user_id: "A".into(),
                ticket_number: 1
            }
        );
        assert_eq!(changes[6], QueueChange::Advanced { served: Some(2) });

        // Versions are strictly increasing
        let versions: Vec<u64> = h.notifier.events().iter().map(|e| e.version).collect();
        assert!(versions.windows(2).all(|w| w[1] > w[0]));
    }

    #[tokio::test]
    async fn test_concurrent_joins_get_distinct_tickets() {
        let h = harness();
        let q = open_queue(&h).await;

        let handles = (0..32).map(|i| {
            let coord = h.coord.clone();
            let queue_id = q.id.clone();
            tokio::spawn(async move {
                coord
                    .join(&queue_id, &Actor::student(format!("student-{}", i)), None)
                    .await
            })
        });
        for result in join_all(handles).await {
            result.unwrap().unwrap();
        }

        let stored = h.repo.stored(&q.id).unwrap();
        let tickets: BTreeSet<u64> = stored.members.iter().map(|m| m.ticket_number).collect();
        assert_eq!(tickets, (1..=32).collect::<BTreeSet<u64>>());
        assert_eq!(stored.tickets_issued, 32);
        assert!(stored.invariant_violations().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_join_admits_once() {
        let h = harness();
        let q = open_queue(&h).await;

        let student = Actor::student("A");
        let (first, second) = tokio::join!(
            h.coord.join(&q.id, &student, None),
            h.coord.join(&q.id, &student, None)
        );

        let failures: Vec<AppError> = [first, second].into_iter().filter_map(|r| r.err()).collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].kind(), ErrorKind::InvalidTransition);
        assert_eq!(h.repo.stored(&q.id).unwrap().members.len(), 1);
    }

    #[tokio::test]
    async fn test_lost_swaps_are_retried() {
        let h = harness();
        let q = open_queue(&h).await;

        h.repo.inject_conflicts(2);
        let calls_before = h.repo.swap_calls();
        let joined = h.coord.join(&q.id, &Actor::student("A"), None).await.unwrap();

        assert_eq!(h.repo.swap_calls() - calls_before, 3);
        assert_eq!(joined.members.len(), 1);
        assert_eq!(joined.members[0].ticket_number, 1);
        assert_eq!(h.repo.stored(&q.id).unwrap().version, joined.version);
    }

    #[tokio::test]
    async fn test_exhausted_retries_surface_conflict() {
        let h = harness();
        let q = open_queue(&h).await;
        let events_before = h.notifier.events().len();

        h.repo.inject_conflicts(100);
        let err = h
            .coord
            .join(&q.id, &Actor::student("A"), None)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(h.repo.stored(&q.id).unwrap().members.is_empty());
        assert_eq!(h.notifier.events().len(), events_before);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_queue_untouched() {
        let h = harness();
        let q = open_queue(&h).await;
        admit(&h, &q.id, "A").await;
        let before = h.repo.stored(&q.id).unwrap();
        let events_before = h.notifier.events().len();

        h.repo.fail_writes(true);
        let err = h.coord.advance(&q.id, &mentor()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);

        assert_eq!(h.repo.stored(&q.id).unwrap(), before);
        assert_eq!(h.notifier.events().len(), events_before);

        h.repo.fail_writes(false);
        let served = h.coord.advance(&q.id, &mentor()).await.unwrap();
        assert_eq!(served.served.unwrap().user_id, "A");
    }

    #[tokio::test]
    async fn test_team_lookup_failure_aborts_before_write() {
        let h = harness();
        let q = open_queue(&h).await;
        let events_before = h.notifier.events().len();

        h.teams.fail_lookups(true);
        let err = h.coord.join(&q.id, &mentor(), None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(h.repo.stored(&q.id).unwrap().members.is_empty());
        assert_eq!(h.notifier.events().len(), events_before);

        // Students and admins never need the directory
        let joined = h.coord.join(&q.id, &Actor::student("A"), None).await.unwrap();
        assert_eq!(joined.members.len(), 1);
        let left = h.coord.leave(&q.id, &Actor::admin("root"), "A").await.unwrap();
        assert_eq!(left.members[0].status, MemberStatus::Cancelled);

        h.teams.fail_lookups(false);
        let joined = h.coord.join(&q.id, &mentor(), None).await.unwrap();
        assert_eq!(joined.members.len(), 2);
        assert_eq!(h.repo.stored(&q.id).unwrap().members.len(), 2);
    }

    #[tokio::test]
    async fn test_management_requires_team_mentor_or_admin() {
        let h = harness();
        let q = open_queue(&h).await;
        h.coord.join(&q.id, &Actor::student("A"), None).await.unwrap();

        let err = h
            .coord
            .approve(&q.id, &Actor::student("B"), "A")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotAuthorized);

        let err = h
            .coord
            .advance(&q.id, &Actor::mentor("mentor-2"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotAuthorized);

        let err = h
            .coord
            .set_status(&q.id, &Actor::student("A"), QueueStatus::Closed)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotAuthorized);

        // Admin needs no team ownership
        h.coord
            .approve(&q.id, &Actor::admin("root"), "A")
            .await
            .unwrap();
        let stored = h.repo.stored(&q.id).unwrap();
        assert_eq!(stored.members[0].status, MemberStatus::Waiting);
    }

    #[tokio::test]
    async fn test_leave_self_or_manager() {
        let h = harness();
        let q = open_queue(&h).await;
        admit(&h, &q.id, "A").await;
        admit(&h, &q.id, "B").await;

        let err = h
            .coord
            .leave(&q.id, &Actor::student("B"), "A")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotAuthorized);

        h.coord.leave(&q.id, &Actor::student("A"), "A").await.unwrap();
        let after = h.coord.leave(&q.id, &mentor(), "B").await.unwrap();
        assert!(after
            .members
            .iter()
            .all(|m| m.status == MemberStatus::Cancelled));

        let err = h
            .coord
            .leave(&q.id, &Actor::student("A"), "A")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
    }

    #[tokio::test]
    async fn test_advance_on_empty_queue_writes_nothing() {
        let h = harness();
        let q = open_queue(&h).await;
        let calls_before = h.repo.swap_calls();
        let events_before = h.notifier.events().len();

        let result = h.coord.advance(&q.id, &mentor()).await.unwrap();
        assert!(result.served.is_none());
        assert!(result.completed.is_none());
        assert_eq!(result.queue.version, q.version);
        assert_eq!(h.repo.swap_calls(), calls_before);
        assert_eq!(h.notifier.events().len(), events_before);
    }

    #[tokio::test]
    async fn test_paused_queue_refuses_joins_but_still_advances() {
        let h = harness();
        let q = open_queue(&h).await;
        admit(&h, &q.id, "A").await;

        h.coord
            .set_status(&q.id, &mentor(), QueueStatus::Paused)
            .await
            .unwrap();
        let err = h
            .coord
            .join(&q.id, &Actor::student("B"), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::QueueNotActive);

        let result = h.coord.advance(&q.id, &mentor()).await.unwrap();
        assert_eq!(result.served.unwrap().user_id, "A");
    }

    #[tokio::test]
    async fn test_status_changes() {
        let h = harness();
        let q = open_queue(&h).await;
        let events_before = h.notifier.events().len();

        // Same status: no write, no announcement
        let same = h
            .coord
            .set_status(&q.id, &mentor(), QueueStatus::Active)
            .await
            .unwrap();
        assert_eq!(same.version, q.version);
        assert_eq!(h.notifier.events().len(), events_before);

        h.coord
            .set_status(&q.id, &mentor(), QueueStatus::Closed)
            .await
            .unwrap();
        let err = h
            .coord
            .set_status(&q.id, &mentor(), QueueStatus::Active)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidStatus);

        assert!(h.coord.list_active(&mentor()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mentor_note_hidden_from_students() {
        let h = harness();
        let q = open_queue(&h).await;
        admit(&h, &q.id, "A").await;

        h.coord
            .set_mentor_note(&q.id, &mentor(), "A", Some("needs help with async".into()))
            .await
            .unwrap();

        let seen_by_mentor = h.coord.snapshot(&q.id, &mentor()).await.unwrap();
        assert_eq!(
            seen_by_mentor.members[0].mentor_note.as_deref(),
            Some("needs help with async")
        );

        let seen_by_student = h.coord.snapshot(&q.id, &Actor::student("A")).await.unwrap();
        assert_eq!(seen_by_student.members[0].mentor_note, None);

        let err = h
            .coord
            .set_mentor_note(&q.id, &mentor(), "nobody", Some("x".into()))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_note_validation() {
        let h = harness();
        let q = open_queue(&h).await;

        let err = h
            .coord
            .join(&q.id, &Actor::student("A"), Some("x".repeat(501)))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(h.repo.stored(&q.id).unwrap().tickets_issued, 0);

        let joined = h
            .coord
            .join(&q.id, &Actor::student("A"), Some("   ".into()))
            .await
            .unwrap();
        assert_eq!(joined.members[0].note, None);
    }

    #[tokio::test]
    async fn test_create_queue_checks_team() {
        let h = harness();

        let err = h
            .coord
            .create_queue(&Actor::student("A"), CreateQueueRequest::for_team("team-1"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotAuthorized);

        let err = h
            .coord
            .create_queue(&mentor(), CreateQueueRequest::for_team("team-2"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotAuthorized);

        let err = h
            .coord
            .create_queue(&mentor(), CreateQueueRequest::for_team("team-x"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = h
            .coord
            .create_queue(&mentor(), CreateQueueRequest::for_team("team-old"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = h
            .coord
            .create_queue(
                &Actor::admin("root"),
                CreateQueueRequest {
                    team_id: "team-2".into(),
                    session_date: None,
                    estimated_minutes_per_member: Some(0),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_unknown_queue_is_not_found() {
        let h = harness();
        let err = h
            .coord
            .join("missing", &Actor::student("A"), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(h.coord.stats("missing").await.unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_stats_track_wait_time() {
        let h = harness();
        let q = open_queue(&h).await;
        admit(&h, &q.id, "A").await;
        admit(&h, &q.id, "B").await;
        h.coord.join(&q.id, &Actor::student("C"), None).await.unwrap();

        h.clock.advance_minutes(10);
        h.coord.advance(&q.id, &mentor()).await.unwrap();
        h.clock.advance_minutes(20);
        h.coord.advance(&q.id, &mentor()).await.unwrap();

        let stats = h.coord.stats(&q.id).await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.current, 1);
        assert_eq!(stats.waiting, 0);
        // A waited 10 minutes, B waited 30
        assert_eq!(stats.average_wait_minutes, Some(20));
    }

    #[tokio::test]
    async fn test_random_operations_keep_invariants() {
        let h = harness();
        let q = open_queue(&h).await;
        let mut rng = StdRng::seed_from_u64(7);
        let users: Vec<String> = (0..6).map(|i| format!("u{}", i)).collect();

        for _ in 0..300 {
            let user = &users[rng.gen_range(0..users.len())];
            // Domain refusals are expected here; only the invariants matter
            let _ = match rng.gen_range(0..6) {
                0 => h.coord.join(&q.id, &Actor::student(user.as_str()), None).await,
                1 => h.coord.approve(&q.id, &mentor(), user).await,
                2 => h.coord.reject(&q.id, &mentor(), user).await,
                3 => h.coord.leave(&q.id, &Actor::student(user.as_str()), user).await,
                4 => h.coord.advance(&q.id, &mentor()).await.map(|r| r.queue),
                _ => {
                    let status = if rng.gen_bool(0.5) {
                        QueueStatus::Active
                    } else {
                        QueueStatus::Paused
                    };
                    h.coord.set_status(&q.id, &mentor(), status).await
                }
            };

            let stored = h.repo.stored(&q.id).unwrap();
            assert!(
                stored.invariant_violations().is_empty(),
                "{:?}",
                stored.invariant_violations()
            );
        }
    }

    #[tokio::test]
    async fn test_register_team_is_admin_only() {
        let h = harness();
        let team = Team::new(" team-3 ", "Zig cohort", "mentor-3");

        let err = h
            .coord
            .register_team(&mentor(), team.clone())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotAuthorized);

        let saved = h
            .coord
            .register_team(&Actor::admin("root"), team)
            .await
            .unwrap();
        assert_eq!(saved.id, "team-3");

        let q = h
            .coord
            .create_queue(&Actor::mentor("mentor-3"), CreateQueueRequest::for_team("team-3"))
            .await
            .unwrap();
        assert_eq!(q.team_id, "team-3");

        let err = h
            .coord
            .register_team(&Actor::admin("root"), Team::new("t", " ", "m"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
