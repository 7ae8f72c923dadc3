//! Documentation: The pattern tree
//!
//! # Node kinds
//!
//! [`Node`][node_doc] has seven variants:
//!
//!  - [`OptionRef`][node_doc] — a reference to a shared [`OptionAtom`][atom_doc] living in an
//!    [`OptionsTable`][table_doc]. The same option can be referenced from more than one place in
//!    a tree (most commonly, once from wherever `[options]` expands to, and once from any usage
//!    line that names it explicitly) — every reference shares the *same* match state, because
//!    they all index into the same table slot. See [`OptionId`][id_doc].
//!  - [`Command`][node_doc] — a literal word, e.g. `mv` in `Usage: prog mv <src> <dst>`.
//!  - [`Argument`][node_doc] — a positional, e.g. `<file>` or `FILE`.
//!  - [`Required`][node_doc] / [`Optional`][node_doc] — an ordered sequence of children
//!    ([`Group`][group_doc]), with an ellipsis (`repeat`) flag.
//!  - [`Either`][node_doc] — an ordered set of alternatives (`a|b|c`), exactly one of which is
//!    selected during a match attempt.
//!  - [`OptionsShortcut`][node_doc] — the `[options]` placeholder, which expands at match time to
//!    every option not already named explicitly elsewhere in the usage line (its hide-set).
//!
//! # Why an arena instead of `Rc<RefCell<_>>`
//!
//! A shared, mutable `Option` atom is the one place in this tree where two tree positions must
//! observe the same state. Rather than reach for `Rc<RefCell<_>>` (which would also force every
//! other node to be `Clone`-on-write or similarly wrapped, just to keep the tree's ownership
//! uniform), every usage-tree occurrence holds only an [`OptionId`][id_doc] — a small `Copy`
//! index into an [`OptionsTable`][table_doc] arena, which is the sole owner of the mutable state.
//! This keeps `Node` itself a plain, `Clone`-able value type.
//!
//! ```rust
//! use patterncli::node::Node;
//! use patterncli::registry::{OptionAtom, OptionValueState, OptionsTable};
//!
//! let mut table = OptionsTable::new();
//! let id = table.push(OptionAtom {
//!     names: vec!["-v".to_string(), "--verbose".to_string()],
//!     default: None,
//!     value: OptionValueState::Unset,
//!     ref_pattern: None,
//! });
//!
//! // Both of these refer to the *same* option slot.
//! let shortcut_occurrence = Node::OptionRef(id);
//! let explicit_occurrence = Node::OptionRef(id);
//! # let _ = (shortcut_occurrence, explicit_occurrence);
//! ```
//!
//! # Fixing a freshly parsed tree up
//!
//! A tree handed to this crate straight out of a usage-line parser is not yet ready to match:
//! empty composites, redundant nesting, and single-branch `Either`s can all arise naturally from
//! a line-by-line parse. [`fixup::build`][build_doc] runs the fix-up passes documented in that
//! module, in order, and returns the tree ready for [`matcher::match_node`][match_doc].
//!
//! [node_doc]: ../../node/enum.Node.html
//! [group_doc]: ../../node/struct.Group.html
//! [atom_doc]: ../../registry/struct.OptionAtom.html
//! [table_doc]: ../../registry/struct.OptionsTable.html
//! [id_doc]: ../../registry/struct.OptionId.html
//! [build_doc]: ../../fixup/fn.build.html
//! [match_doc]: ../../matcher/fn.match_node.html
