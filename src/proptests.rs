use std::collections::BTreeSet;

use proptest::prelude::*;
use proptest_derive::Arbitrary;

use crate::{ArtTree, U64KeyLoader};

/// Actions to run against both the tree and the model.
#[derive(Arbitrary, Debug, Clone)]
enum Action {
    Insert(TupleId),
    Erase(TupleId),
    Lookup(TupleId),
    Minimum,
    Maximum,
}

/// Wrapper for tuple-id generation with a custom strategy.
#[derive(Debug, Clone, Copy)]
struct TupleId(u64);

impl Arbitrary for TupleId {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        prop_oneof![
            // Dense low ids: a deep shared prefix with wide final fanout.
            0u64..512,
            // Ids differing only in their first byte: wide root fanout.
            (0u64..256).prop_map(|b| b << 56),
            // Small clusters sharing their first six bytes: Node4 splits
            // and collapses.
            (0u64..4, 0u64..64).prop_map(|(hi, lo)| 0x4152_5400u64 << 32 | hi << 8 | lo),
            // Anything.
            any::<u64>(),
        ]
        .prop_map(TupleId)
        .boxed()
    }
}

/// Test harness that executes actions on the tree and a BTreeSet model.
///
/// With [`U64KeyLoader`], the stored identifier is the key itself, so the
/// inserted set is the whole state.
#[derive(Default)]
struct Harness {
    tree: ArtTree<U64KeyLoader, 8>,
    model: BTreeSet<u64>,
}

impl Harness {
    fn execute(&mut self, action: Action) {
        match action {
            Action::Insert(TupleId(id)) => {
                let replaced = self.tree.insert(&id.to_be_bytes(), id);
                let expected = if self.model.insert(id) { None } else { Some(id) };
                assert_eq!(replaced, expected, "insert mismatch for {id:#018x}");
            }
            Action::Erase(TupleId(id)) => {
                let removed = self.tree.erase(&id.to_be_bytes());
                let expected = if self.model.remove(&id) { Some(id) } else { None };
                assert_eq!(removed, expected, "erase mismatch for {id:#018x}");
            }
            Action::Lookup(TupleId(id)) => {
                let key = id.to_be_bytes();
                let optimistic = self.tree.lookup(&key);
                let pessimistic = self.tree.lookup_pessimistic(&key);
                assert_eq!(
                    optimistic, pessimistic,
                    "lookup variants disagree for {id:#018x}"
                );
                let expected = self.model.contains(&id).then_some(id);
                assert_eq!(optimistic, expected, "lookup mismatch for {id:#018x}");
            }
            Action::Minimum => {
                assert_eq!(self.tree.minimum(), self.model.first().copied());
            }
            Action::Maximum => {
                assert_eq!(self.tree.maximum(), self.model.last().copied());
            }
        }
        assert_eq!(self.tree.len(), self.model.len(), "length mismatch");
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn matches_btreeset_model(actions in prop::collection::vec(any::<Action>(), 1..128)) {
        let mut harness = Harness::default();
        for action in actions {
            harness.execute(action);
        }
        let issues = harness.tree.verify_integrity();
        prop_assert!(issues.is_empty(), "integrity violations: {issues:?}");
        for &id in &harness.model {
            prop_assert_eq!(harness.tree.lookup(&id.to_be_bytes()), Some(id));
            prop_assert_eq!(harness.tree.lookup_pessimistic(&id.to_be_bytes()), Some(id));
        }
    }
}
