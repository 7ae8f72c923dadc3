//! Documentation: Overview
//!
//! This crate is the matching half of a docopt-style command-line parser: given a usage grammar
//! that has already been parsed into a [`Node`][node_doc] tree (and an [`OptionsTable`][table_doc]
//! holding the shared state of every `[options]`-style flag), it will:
//!
//! 1. Fix the tree up into matching-ready shape ([`fixup`][fixup_doc]).
//! 2. Backtrack a process's argument vector through that tree ([`matcher`][matcher_doc]).
//! 3. Extract the bound names into a [`ValueMap`][value_doc] ([`extract`][extract_doc]).
//!
//! Parsing the textual usage description itself (`Usage: prog [-v] <file>...`) into a tree is
//! **not** this crate's job; see the [`node`][node_doc] chapter for the shape it expects to
//! receive instead.
//!
//! # Why a tagged union instead of a class hierarchy
//!
//! The reference implementation this crate's matching semantics are drawn from represents the
//! tree with a small class hierarchy (`Atom` → `Option`/`Command`/`Argument`; `Unit` →
//! `Required`/`Optional`; plus standalone `Either` and `OptionsShortcut` classes) and dispatches
//! through virtual `match`/`fix`/`get_value` methods. Rust has no equivalently cheap dynamic
//! dispatch for a hierarchy this shallow and closed, so [`Node`][node_doc] is a sum type instead,
//! and matching/fix-up/extraction are free functions that pattern-match on it.
//!
//! # A minimal end-to-end example
//!
//! ```rust
//! use patterncli::argv::{Argv, MatchConfig};
//! use patterncli::node::{ArgumentAtom, ArgumentValue, CommandAtom, CommandValue, Group, Node};
//! use patterncli::registry::OptionsTable;
//! use patterncli::saver::Saver;
//!
//! // Usage: prog mv <src> <dst>
//! let mut table = OptionsTable::new();
//! let mut tree = Node::Required(Group::new(
//!     vec![
//!         Node::Command(CommandAtom { names: vec!["mv".to_string()], value: CommandValue::Unmatched }),
//!         Node::Argument(ArgumentAtom { names: vec!["<src>".to_string()], value: ArgumentValue::Unmatched }),
//!         Node::Argument(ArgumentAtom { names: vec!["<dst>".to_string()], value: ArgumentValue::Unmatched }),
//!     ],
//!     false,
//! ));
//!
//! let mut argv = Argv::new(vec!["mv".into(), "a.txt".into(), "b.txt".into()], true);
//! let mut saver = Saver::new();
//! let matched = patterncli::matcher::match_node(
//!     &mut tree, &mut table, &mut argv, &mut saver, false, MatchConfig::default(),
//! ).unwrap();
//! assert!(matched && argv.is_empty());
//!
//! let values = patterncli::extract::get_value(&tree, &table, false);
//! assert_eq!(values.get("<dst>").unwrap().to_string(), "b.txt");
//! ```
//!
//! [node_doc]: ../../node/index.html
//! [table_doc]: ../../registry/struct.OptionsTable.html
//! [fixup_doc]: ../../fixup/index.html
//! [matcher_doc]: ../../matcher/index.html
//! [extract_doc]: ../../extract/index.html
//! [value_doc]: ../../value/struct.ValueMap.html
