//! A backtracking pattern tree and matcher for usage-description driven command line argument
//! parsing — the engine half of a docopt-style tool: given a usage grammar already parsed into a
//! [`node::Node`] tree and an [`registry::OptionsTable`], match it against a process's argument
//! vector and extract a [`value::ValueMap`] of bound names.
//!
//! Parsing a usage string into that tree is out of scope here (see `docs` for the expected
//! division of labour); this crate picks up once a tree exists and needs to be matched,
//! backtracked, and have its values read out.
//!
//! ```
//! use patterncli::argv::{Argv, MatchConfig};
//! use patterncli::node::{ArgumentAtom, ArgumentValue, CommandAtom, CommandValue, Group, Node};
//! use patterncli::registry::OptionsTable;
//! use patterncli::saver::Saver;
//!
//! let mut table = OptionsTable::new();
//! let mut tree = Node::Required(Group::new(
//!     vec![
//!         Node::Command(CommandAtom { names: vec!["mv".to_string()], value: CommandValue::Unmatched }),
//!         Node::Argument(ArgumentAtom { names: vec!["<src>".to_string()], value: ArgumentValue::Unmatched }),
//!         Node::Argument(ArgumentAtom { names: vec!["<dst>".to_string()], value: ArgumentValue::Unmatched }),
//!     ],
//!     false,
//! ));
//! let mut argv = Argv::new(vec!["mv".into(), "a.txt".into(), "b.txt".into()], true);
//! let mut saver = Saver::new();
//! let matched = patterncli::matcher::match_node(
//!     &mut tree, &mut table, &mut argv, &mut saver, false, MatchConfig::default(),
//! ).unwrap();
//! assert!(matched);
//! let values = patterncli::extract::get_value(&tree, &table, false);
//! assert_eq!(values.get("<src>").unwrap().to_string(), "a.txt");
//! ```

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod argv;
pub mod docs;
pub mod error;
pub mod extract;
pub mod fixup;
pub mod matcher;
pub mod node;
pub mod registry;
pub mod saver;
pub mod value;

#[cfg(feature = "serialize")]
pub mod codec;

pub use error::{Error, Result};
pub use value::{Value, ValueMap};

/// Build, match, and extract in one call: the common case for a caller who already has a fixed-up
/// tree and table and just wants the resulting bindings (or a `UsageExit` if an option's attached
/// value didn't fully parse).
pub fn run(
    root: &mut node::Node,
    table: &mut registry::OptionsTable,
    argv: Vec<String>,
    config: argv::MatchConfig,
) -> error::Result<Option<value::ValueMap>> {
    let mut argv = argv::Argv::new(argv, config.auto_dashes);
    let mut saver = saver::Saver::new();
    let matched = matcher::match_node(root, table, &mut argv, &mut saver, false, config)?;
    if matched && argv.is_empty() {
        Ok(Some(extract::get_value(root, table, false)))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{ArgumentAtom, ArgumentValue, Group, Node};
    use crate::registry::OptionsTable;

    #[test]
    fn run_reports_leftover_argv_as_no_match() {
        let mut table = OptionsTable::new();
        let mut root = Node::Required(Group::new(
            vec![Node::Argument(ArgumentAtom { names: vec!["<a>".to_string()], value: ArgumentValue::Unmatched })],
            false,
        ));
        let result = run(&mut root, &mut table, vec!["x".into(), "y".into()], argv::MatchConfig::default()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn run_extracts_values_on_full_match() {
        let mut table = OptionsTable::new();
        let mut root = Node::Required(Group::new(
            vec![Node::Argument(ArgumentAtom { names: vec!["<a>".to_string()], value: ArgumentValue::Unmatched })],
            false,
        ));
        let result = run(&mut root, &mut table, vec!["x".into()], argv::MatchConfig::default()).unwrap();
        assert_eq!(result.unwrap().get("<a>").unwrap().to_string(), "x");
    }
}
