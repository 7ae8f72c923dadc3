//! Property tests for the two "for any X" laws named in SPEC_FULL.md's testable-properties
//! section: reset idempotence, and save/rollback round-tripping. Fixed-input scenario tests live
//! in `scenarios.rs`; these instead range over randomly generated small trees and argvs.

use proptest::prelude::*;

use patterncli::argv::Argv;
use patterncli::node::{ArgumentAtom, ArgumentValue, CommandAtom, CommandValue, Group, Node};
use patterncli::registry::{OptionAtom, OptionValueState, OptionsTable};
use patterncli::saver::{self, Saver};

/// A tiny tree generator: a `Required` group of 1-4 `Argument`/`Command` leaves (no `Option`/
/// `Either`/nested groups), enough to range over reset/save/rollback without needing a shared
/// `OptionsTable` to be threaded through the strategy.
fn leaf_strategy() -> impl Strategy<Value = Node> {
    prop_oneof![
        "[a-z]{1,6}".prop_map(|n| Node::Command(CommandAtom { names: vec![n], value: CommandValue::Unmatched })),
        "[a-z]{1,6}".prop_map(|n| Node::Argument(ArgumentAtom { names: vec![n], value: ArgumentValue::Unmatched })),
    ]
}

fn tree_strategy() -> impl Strategy<Value = Node> {
    prop::collection::vec(leaf_strategy(), 1..5)
        .prop_map(|children| Node::Required(Group::new(children, false)))
}

proptest! {
    #[test]
    fn reset_is_idempotent(mut tree in tree_strategy()) {
        let mut table = OptionsTable::new();
        patterncli::matcher::reset(&mut tree, &mut table);
        let once = format!("{:?}", tree);
        patterncli::matcher::reset(&mut tree, &mut table);
        let twice = format!("{:?}", tree);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn save_rollback_restores_value_and_argv(mut tree in tree_strategy(), tokens in prop::collection::vec("[a-z]{1,6}", 0..4)) {
        let table = OptionsTable::new();
        let mut argv = Argv::new(tokens, true);
        let before_tree = format!("{:?}", tree);
        let before_argv_len = argv.len();

        let mut saver = Saver::new();
        saver.save(&tree, &table, &argv);

        // Mutate both the node and the argv so rollback has something real to undo.
        if let Node::Required(g) = &mut tree {
            if let Some(Node::Argument(a)) = g.children.get_mut(0) {
                a.value = ArgumentValue::Scalar("mutated".to_string());
            }
        }
        if !argv.is_empty() {
            argv.next(0);
        }

        let snap = saver.rollback(&tree, &mut argv);
        let mut table = table;
        if let Some(snap) = snap {
            saver::load(&mut tree, &mut table, snap);
        }

        prop_assert_eq!(format!("{:?}", tree), before_tree);
        prop_assert_eq!(argv.len(), before_argv_len);
    }
}
