mod common;

use common::strategies::*;
use common::*;
use proptest::prelude::*;
use std::sync::Arc;

use recognizer_bridge::sync::{Batch, BatchTransformer, Record};

proptest! {
    /// Property: any queue drains with ceil(M/P) commits and floor(M/P)+1 fetches
    #[test]
    fn queue_drains_with_bounded_round_trips((count, page_size) in queue_shape_strategy()) {
        let store = Arc::new(FakeStore::numbered(count));
        let driver = open_driver(store.clone(), Arc::new(FakeRecognizer::default()), page_size);

        let report = tokio_test::block_on(driver.execute(driver.prepare_unguarded()));

        prop_assert!(report.is_drained());
        prop_assert_eq!(store.fetches() as usize, count / page_size + 1);
        prop_assert_eq!(report.batches_committed as usize, count.div_ceil(page_size));
        prop_assert_eq!(report.records_committed, count);
        prop_assert!(store.pending_ids().is_empty());
    }

    /// Property: no commit ever carries more than one page of transcriptions
    #[test]
    fn commits_never_exceed_page_size((count, page_size) in queue_shape_strategy()) {
        let store = Arc::new(FakeStore::numbered(count));
        let driver = open_driver(store.clone(), Arc::new(FakeRecognizer::default()), page_size);

        tokio_test::block_on(driver.execute(driver.prepare_unguarded()));

        for commit in store.commits() {
            prop_assert!(!commit.transcriptions.is_empty());
            prop_assert!(commit.transcriptions.len() <= page_size);
        }
    }

    /// Property: a failing commit never loses or duplicates an earlier batch
    #[test]
    fn failed_commit_keeps_prior_batches(count in 1usize..40, page_size in 1usize..8, fail_on in 1u32..6) {
        let store = Arc::new(FakeStore::numbered(count).fail_commit_on(fail_on));
        let driver = open_driver(store.clone(), Arc::new(FakeRecognizer::default()), page_size);

        let report = tokio_test::block_on(driver.execute(driver.prepare_unguarded()));

        let committed = store.committed_ids();
        prop_assert_eq!(committed.len() + store.pending_ids().len(), count);
        prop_assert_eq!(committed.len(), report.records_committed);
        if report.is_drained() {
            prop_assert!(store.pending_ids().is_empty());
        } else {
            prop_assert_eq!(report.batches_committed, fail_on - 1);
        }
    }

    /// Property: a recognizer omitting any subset never keeps a run going
    /// for more turns than there are records
    #[test]
    fn omissions_never_prevent_termination(
        (count, page_size) in queue_shape_strategy(),
        omitted in proptest::collection::vec(0usize..60, 0..20),
    ) {
        let ids: Vec<String> = omitted.iter().map(|n| format!("img-{n:04}")).collect();
        let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let store = Arc::new(FakeStore::numbered(count));
        let recognizer = Arc::new(FakeRecognizer::omitting(&refs));
        let driver = open_driver(store.clone(), recognizer, page_size);

        let report = tokio_test::block_on(driver.execute(driver.prepare_unguarded()));

        prop_assert!(report.is_drained());
        prop_assert!(store.fetches() as usize <= count + 1);
        prop_assert!(report.warnings.len() <= count + 1);
    }

    /// Property: every resolved URL is absolute and keeps the original path
    #[test]
    fn resolved_urls_are_absolute(path in image_path_strategy(), trailing in any::<bool>()) {
        let base = if trailing { "https://inky.local:9501/" } else { "https://inky.local:9501" };
        let transformer = BatchTransformer::new(base);

        let batch = Batch::new(vec![Record::new("A", path.clone())], 1);
        let request = transformer.transform(&batch);
        let url = &request.items[0].url;

        prop_assert!(url.starts_with("https://"));
        prop_assert!(url.ends_with(path.trim_start_matches('/')));
        prop_assert!(!url.contains("9501//"));
    }
}
