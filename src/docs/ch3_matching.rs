//! Documentation: Matching, backtracking, and values
//!
//! # Backtracking without exceptions
//!
//! The reference implementation's matcher raises and catches exceptions to unwind a failed trial.
//! This crate instead threads an explicit [`Saver`][saver_doc]: before a node risks consuming
//! input, [`Saver::save`][save_doc] pushes its current value and the argv position; on failure,
//! [`Saver::rollback`][rollback_doc] pops entries in LIFO order until it finds the one belonging
//! to the failed node, restoring both the node's value and the argv cursor to that point.
//!
//! # Repetition
//!
//! A `Required`/`Optional` group marked with `...` is matched by
//! [`matcher::match_repeat`][repeat_doc]: each iteration resets the group's children, runs one
//! full [`matcher::match_oneline`][oneline_doc] sweep, and — as long as that sweep succeeds and
//! argv keeps advancing — records a snapshot of the resulting values. Once iteration stops, those
//! per-iteration snapshots are merged back into the tree (counts sum, argument values flatten
//! into a list, and so on — see [`extract::merge_snapshots`][merge_doc]).
//!
//! ```rust
//! use patterncli::argv::{Argv, MatchConfig};
//! use patterncli::node::{Group, Node};
//! use patterncli::registry::{OptionAtom, OptionValueState, OptionsTable};
//! use patterncli::saver::Saver;
//!
//! // Usage: prog -v...
//! let mut table = OptionsTable::new();
//! let id = table.push(OptionAtom {
//!     names: vec!["-v".to_string()],
//!     default: None,
//!     value: OptionValueState::Unset,
//!     ref_pattern: None,
//! });
//! let mut tree = Node::Required(Group::new(vec![Node::OptionRef(id)], true));
//! let mut argv = Argv::new(vec!["-v".into(), "-v".into(), "-v".into()], true);
//! let mut saver = Saver::new();
//! patterncli::matcher::match_node(&mut tree, &mut table, &mut argv, &mut saver, false, MatchConfig::default()).unwrap();
//! assert_eq!(table.get(id).value, OptionValueState::Count(3));
//! ```
//!
//! # `Either` commits once
//!
//! The first branch of an `Either` to match a trial argv commits — its index is latched into
//! [`EitherNode::matched_branch`][either_doc] and is never reconsidered for the rest of that
//! top-level match attempt, even if a later backtrack unwinds values within the committed branch.
//! This mirrors the reference implementation, which never re-trials an `Either` once one branch
//! has returned success.
//!
//! # Values
//!
//! Once a tree is fully matched, [`extract::get_value`][get_value_doc] walks it into a
//! [`ValueMap`][value_doc]: a flag that never matched reports `false` (or `[]` under repeat), an
//! argument that never matched reports `null` (or `[]` under repeat), and an `Either`'s unmatched
//! branches contribute their own such defaults so every name the usage line could have bound is
//! present in the result, whether or not this particular argv bound it.
//!
//! [saver_doc]: ../../saver/struct.Saver.html
//! [save_doc]: ../../saver/struct.Saver.html#method.save
//! [rollback_doc]: ../../saver/struct.Saver.html#method.rollback
//! [repeat_doc]: ../../matcher/fn.match_repeat.html
//! [oneline_doc]: ../../matcher/fn.match_oneline.html
//! [merge_doc]: ../../extract/fn.merge_snapshots.html
//! [either_doc]: ../../node/struct.EitherNode.html
//! [get_value_doc]: ../../extract/fn.get_value.html
//! [value_doc]: ../../value/struct.ValueMap.html
