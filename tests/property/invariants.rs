//! Property-based tests for latest/published flag invariants
//!
//! Random sequences of lifecycle operations, each in its own session, must
//! leave every logical item with at most one latest row, at most one published
//! row and version numbers running 1..=n.

use folio::definition::MemoryDefinitionStore;
use folio::ids::SequentialIdAllocator;
use folio::store::MemoryContentStore;
use folio::types::LogicalId;
use folio::{ContentRuntime, VersionOptions};
use proptest::prelude::*;
use std::sync::Arc;

const SLOTS: usize = 3;

#[derive(Debug, Clone, Copy)]
enum Op {
    Create { slot: usize, draft: bool },
    DraftRequired { slot: usize },
    PublishLatest { slot: usize },
    Unpublish { slot: usize },
    Remove { slot: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let slot = 0..SLOTS;
    prop_oneof![
        (slot.clone(), any::<bool>()).prop_map(|(slot, draft)| Op::Create { slot, draft }),
        slot.clone().prop_map(|slot| Op::DraftRequired { slot }),
        slot.clone().prop_map(|slot| Op::PublishLatest { slot }),
        slot.clone().prop_map(|slot| Op::Unpublish { slot }),
        slot.prop_map(|slot| Op::Remove { slot }),
    ]
}

async fn apply(runtime: &ContentRuntime, slots: &mut [Option<LogicalId>], op: Op) {
    let mut manager = runtime.session();
    match op {
        Op::Create { slot, draft } => {
            if slots[slot].is_some() {
                return;
            }
            let item = manager.new_item("Page").unwrap();
            let options = if draft {
                VersionOptions::Draft
            } else {
                VersionOptions::Published
            };
            manager.create(&item, options).await.unwrap();
            slots[slot] = Some(item.logical_id());
        }
        Op::DraftRequired { slot } => {
            if let Some(logical_id) = slots[slot] {
                manager
                    .get(logical_id, VersionOptions::DraftRequired)
                    .await
                    .unwrap();
            }
        }
        Op::PublishLatest { slot } => {
            if let Some(logical_id) = slots[slot] {
                if let Some(latest) = manager.get(logical_id, VersionOptions::Latest).await.unwrap() {
                    manager.publish(&latest).await.unwrap();
                }
            }
        }
        Op::Unpublish { slot } => {
            if let Some(logical_id) = slots[slot] {
                if let Some(latest) = manager.get(logical_id, VersionOptions::Latest).await.unwrap() {
                    manager.unpublish(&latest).await.unwrap();
                }
            }
        }
        Op::Remove { slot } => {
            if let Some(logical_id) = slots[slot] {
                if let Some(latest) = manager.get(logical_id, VersionOptions::Latest).await.unwrap() {
                    manager.remove(&latest).await.unwrap();
                }
            }
        }
    }
}

/// Flag invariants hold after any sequence of operations
#[test]
fn test_flag_invariants_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&prop::collection::vec(op_strategy(), 1..40), |ops| {
            let rt = tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap();
            let store = Arc::new(MemoryContentStore::new());
            let runtime = ContentRuntime::new(
                store.clone(),
                Arc::new(MemoryDefinitionStore::new()),
                Arc::new(SequentialIdAllocator::new()),
            );

            let mut slots = [None; SLOTS];
            rt.block_on(async {
                for op in &ops {
                    apply(&runtime, &mut slots, *op).await;
                }
            });

            for logical_id in slots.iter().flatten() {
                let rows = store.rows_for(*logical_id);
                prop_assert!(rows.iter().filter(|r| r.latest).count() <= 1);
                prop_assert!(rows.iter().filter(|r| r.published).count() <= 1);

                let numbers: Vec<u32> = rows.iter().map(|r| r.number).collect();
                let expected: Vec<u32> = (1..=rows.len() as u32).collect();
                prop_assert_eq!(numbers, expected);
            }

            Ok(())
        })
        .unwrap();
}

/// The latest row, when one exists, carries the highest version number
#[test]
fn test_latest_is_highest_number_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&prop::collection::vec(op_strategy(), 1..40), |ops| {
            let rt = tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap();
            let store = Arc::new(MemoryContentStore::new());
            let runtime = ContentRuntime::new(
                store.clone(),
                Arc::new(MemoryDefinitionStore::new()),
                Arc::new(SequentialIdAllocator::new()),
            );

            let mut slots = [None; SLOTS];
            rt.block_on(async {
                for op in &ops {
                    apply(&runtime, &mut slots, *op).await;
                }
            });

            for logical_id in slots.iter().flatten() {
                let rows = store.rows_for(*logical_id);
                let max = rows.iter().map(|r| r.number).max();
                if let Some(latest) = rows.iter().find(|r| r.latest) {
                    prop_assert_eq!(Some(latest.number), max);
                }
            }

            Ok(())
        })
        .unwrap();
}
