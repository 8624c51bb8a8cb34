//! Concurrent writers against one SQLite database

mod common;

use common::{coordinator, mentor, open_pool, TempDb, TEAM};
use futures::future::join_all;
use mentorq_core::application::CreateQueueRequest;
use mentorq_core::domain::{Actor, MemberStatus};
use mentorq_core::port::BroadcastNotifier;
use std::collections::BTreeSet;
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_joins_issue_each_ticket_once() {
    let db = TempDb::new("joins");
    let pool = open_pool(&db.url()).await;
    let coord = coordinator(&pool, Arc::new(BroadcastNotifier::new(256)), 5);
    let q = coord
        .create_queue(&mentor(), CreateQueueRequest::for_team(TEAM))
        .await
        .unwrap();

    let joins = (0..40).map(|i| {
        let coord = coord.clone();
        let queue_id = q.id.clone();
        tokio::spawn(async move {
            coord
                .join(&queue_id, &Actor::student(format!("s{}", i)), None)
                .await
        })
    });
    for result in join_all(joins).await {
        result.unwrap().unwrap();
    }

    let stored = coord.snapshot(&q.id, &mentor()).await.unwrap();
    let tickets: BTreeSet<u64> = stored.members.iter().map(|m| m.ticket_number).collect();
    assert_eq!(tickets, (1..=40).collect::<BTreeSet<u64>>());
    assert_eq!(stored.tickets_issued, 40);
    assert!(stored.invariant_violations().is_empty());
}

/// Two coordinators share nothing but the database file, like two daemon
/// processes. Only the versioned write keeps them apart.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_independent_coordinators_never_share_a_ticket() {
    let db = TempDb::new("two_writers");
    let pool_a = open_pool(&db.url()).await;
    let pool_b = open_pool(&db.url()).await;
    let coord_a = coordinator(&pool_a, Arc::new(BroadcastNotifier::new(64)), 16);
    let coord_b = coordinator(&pool_b, Arc::new(BroadcastNotifier::new(64)), 16);

    let q = coord_a
        .create_queue(&mentor(), CreateQueueRequest::for_team(TEAM))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..20 {
        let coord = if i % 2 == 0 {
            coord_a.clone()
        } else {
            coord_b.clone()
        };
        let queue_id = q.id.clone();
        handles.push(tokio::spawn(async move {
            coord
                .join(&queue_id, &Actor::student(format!("s{}", i)), None)
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let stored = coord_b.snapshot(&q.id, &mentor()).await.unwrap();
    let tickets: BTreeSet<u64> = stored.members.iter().map(|m| m.ticket_number).collect();
    assert_eq!(tickets.len(), 20);
    assert_eq!(tickets, (1..=20).collect::<BTreeSet<u64>>());
    assert!(stored.invariant_violations().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_advances_keep_one_current() {
    let db = TempDb::new("advance");
    let pool = open_pool(&db.url()).await;
    let coord = coordinator(&pool, Arc::new(BroadcastNotifier::new(256)), 5);
    let q = coord
        .create_queue(&mentor(), CreateQueueRequest::for_team(TEAM))
        .await
        .unwrap();

    for i in 0..10 {
        let user = format!("s{}", i);
        coord.join(&q.id, &Actor::student(user.as_str()), None).await.unwrap();
        coord.approve(&q.id, &mentor(), &user).await.unwrap();
    }

    let advances = (0..6).map(|_| {
        let coord = coord.clone();
        let queue_id = q.id.clone();
        tokio::spawn(async move { coord.advance(&queue_id, &mentor()).await })
    });
    let mut served = BTreeSet::new();
    for result in join_all(advances).await {
        let step = result.unwrap().unwrap();
        served.insert(step.served.unwrap().ticket_number);
    }

    // Six distinct people called, lowest tickets first
    assert_eq!(served, (1..=6).collect::<BTreeSet<u64>>());

    let stored = coord.snapshot(&q.id, &mentor()).await.unwrap();
    assert_eq!(stored.count(MemberStatus::Current), 1);
    assert_eq!(stored.count(MemberStatus::Completed), 5);
    assert_eq!(stored.count(MemberStatus::Waiting), 4);
}
