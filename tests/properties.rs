//! Property-based tests for batching, the difference view and ISON
//! reply attribution.

mod common;

use std::collections::BTreeSet;
use std::sync::Arc;

use common::{FakeServer, RecordingSink};
use proptest::prelude::*;
use slirc_presence::presence::batch::{batch_len, pack};
use slirc_presence::presence::{Difference, IrcStatus, NickSet, NickSource, PollSchedule, PollingWatcher};
use slirc_wire::irc_to_lower;

// =============================================================================
// STRATEGIES
// =============================================================================

fn nickname_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z\\[\\]\\\\^_`{|}][a-zA-Z0-9\\-\\[\\]\\\\^_`{|}]{0,15}")
        .expect("valid regex")
}

fn nick_list_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(nickname_strategy(), 0..80)
}

/// Distinct (case-insensitively) nicks, so each appears once in a snapshot.
fn distinct_nicks_strategy() -> impl Strategy<Value = Vec<String>> {
    nick_list_strategy().prop_map(|nicks| {
        let mut seen = BTreeSet::new();
        nicks
            .into_iter()
            .filter(|n| seen.insert(irc_to_lower(n)))
            .collect()
    })
}

// =============================================================================
// BATCHING
// =============================================================================

proptest! {
    #[test]
    fn pack_preserves_order_and_respects_budget(
        nicks in nick_list_strategy(),
        budget in 1usize..120,
        separator_len in 1usize..3,
    ) {
        let batches = pack(&nicks, budget, separator_len);

        let flattened: Vec<String> = batches.iter().flatten().cloned().collect();
        prop_assert_eq!(&flattened, &nicks);

        for (idx, batch) in batches.iter().enumerate() {
            prop_assert!(!batch.is_empty());
            let len = batch_len(batch, separator_len);
            prop_assert!(len <= budget || batch.len() == 1, "batch {} is {} bytes", idx, len);

            // Greedy: the next batch's first nick did not fit here.
            if let Some(next) = batches.get(idx + 1) {
                prop_assert!(len + separator_len + next[0].len() > budget);
            }
        }
    }

    #[test]
    fn difference_is_set_difference(
        all in distinct_nicks_strategy(),
        excluded in nick_list_strategy(),
    ) {
        let all_set = Arc::new(NickSet::from_nicks(all.iter().map(String::as_str)));
        let excluded_set = Arc::new(NickSet::from_nicks(excluded.iter().map(|n| n.to_uppercase())));
        let view = Difference::new(all_set.clone(), excluded_set.clone());

        let expected: Vec<String> = all_set
            .snapshot()
            .into_iter()
            .filter(|n| !excluded.iter().any(|e| irc_to_lower(e) == irc_to_lower(n)))
            .collect();
        prop_assert_eq!(view.snapshot(), expected.clone());

        for nick in &all {
            prop_assert_eq!(view.contains(nick), expected.contains(nick));
        }

        // Live: emptying the excluded set exposes everything.
        excluded_set.clear();
        prop_assert_eq!(view.snapshot(), all_set.snapshot());
    }

    #[test]
    fn every_queried_nick_is_reported_once(
        nicks in distinct_nicks_strategy(),
        online_mask in prop::collection::vec(any::<bool>(), 80),
    ) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime");
        let _guard = rt.enter();

        let server = FakeServer::new("me", &[]);
        server.conn.state().set_server_identity_once(FakeServer::HOST);
        let sink = Arc::new(RecordingSink::default());
        let poller = PollingWatcher::new(
            Arc::clone(&server.conn),
            sink.clone(),
            Arc::new(NickSet::from_nicks(nicks.iter().map(String::as_str))),
            PollSchedule::default(),
        );

        poller.poll_now();
        let sent = server.take_sent();
        prop_assert_eq!(poller.pending_queries(), sent.len());

        let mut idx = 0;
        for line in &sent {
            let batch: Vec<&str> = line.trim_start_matches("ISON ").split(' ').collect();
            let online: Vec<&str> = batch
                .iter()
                .copied()
                .filter(|_| {
                    idx += 1;
                    online_mask[(idx - 1) % online_mask.len()]
                })
                .collect();
            server.numeric(303, &format!(":{}", online.join(" ")));
        }
        prop_assert_eq!(poller.pending_queries(), 0);

        let updates = sink.take();
        prop_assert_eq!(updates.len(), nicks.len());
        let reported: BTreeSet<&str> = updates.iter().map(|(n, _)| n.as_str()).collect();
        prop_assert_eq!(reported.len(), nicks.len());

        let online_count = updates.iter().filter(|(_, s)| *s == IrcStatus::Online).count();
        let expected_online = (0..nicks.len()).filter(|i| online_mask[i % online_mask.len()]).count();
        prop_assert_eq!(online_count, expected_online);
    }
}
