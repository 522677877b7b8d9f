use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use murmur_store::{NewMessage, Store, StoreConfig};

#[test]
fn concurrent_appends_keep_every_message() {
    let store = Arc::new(Store::new(StoreConfig {
        max_messages_per_channel: 1_000,
        ..Default::default()
    }));

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let store = store.clone();
            thread::spawn(move || {
                for i in 0..50 {
                    store
                        .post_message("general", NewMessage::text(format!("user{}", t), format!("{}-{}", t, i)))
                        .unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let msgs = store.messages("general");
    assert_eq!(msgs.len(), 400);

    let ids: HashSet<&str> = msgs.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids.len(), 400, "duplicate ids");

    // each poster's own messages stay in the order they were sent
    for t in 0..8 {
        let own: Vec<&str> = msgs
            .iter()
            .filter(|m| m.username == format!("user{}", t))
            .map(|m| m.content.as_str())
            .collect();
        let expected: Vec<String> = (0..50).map(|i| format!("{}-{}", t, i)).collect();
        assert_eq!(own, expected);
    }
}

#[test]
fn concurrent_appends_respect_cap() {
    let store = Arc::new(Store::default());

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let store = store.clone();
            thread::spawn(move || {
                for i in 0..100 {
                    store
                        .post_message("general", NewMessage::text("alice", format!("{}-{}", t, i)))
                        .unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(store.messages("general").len(), 100);
}

#[test]
fn concurrent_toggles_by_different_users_all_land() {
    let store = Arc::new(Store::default());
    let msg = store
        .post_message("general", NewMessage::text("alice", "react to me"))
        .unwrap();

    let handles: Vec<_> = (0..16)
        .map(|u| {
            let store = store.clone();
            let id = msg.id.clone();
            thread::spawn(move || {
                store
                    .toggle_reaction("general", &id, "👍", &format!("user{}", u))
                    .unwrap();
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let reactions = store.message("general", &msg.id).unwrap().reactions;
    let users: HashSet<&String> = reactions.get("👍").unwrap().iter().collect();
    assert_eq!(users.len(), 16);
}

#[test]
fn channels_do_not_share_state() {
    let store = Arc::new(Store::default());

    let handles: Vec<_> = ["general", "random", "dev"]
        .into_iter()
        .map(|channel| {
            let store = store.clone();
            thread::spawn(move || {
                for i in 0..30 {
                    store
                        .post_message(channel, NewMessage::text("bob", format!("{}", i)))
                        .unwrap();
                    store.heartbeat(channel, "bob", i % 2 == 0).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    for channel in ["general", "random", "dev"] {
        let msgs = store.messages(channel);
        assert_eq!(msgs.len(), 30);
        assert!(msgs.iter().all(|m| m.channel_id == channel));
        assert_eq!(store.roster(channel).len(), 1);
    }
}
