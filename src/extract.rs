//! Value extraction: turning a matched tree into the final name -> value mapping, and the
//! per-iteration snapshot merging `matcher::match_repeat` needs when a group repeats.
//!
//! Grounded on `original_source/docpie/element.py`'s `get_value`/`get_sys_default_value` methods
//! and the various `merge_value` methods (`Option.merge_value`, `Command.merge_value`,
//! `Argument.merge_value`, `Unit.merge_value`, `Either.merge_value`).

use crate::node::{ArgumentValue, CommandValue, EitherNode, Group, Node};
use crate::registry::{OptionAtom, OptionId, OptionValueState, OptionsTable};
use crate::saver::{dump, Snapshot};
use crate::value::{Value, ValueMap};

/// Extract the final name -> value mapping for a matched (or partially matched) subtree.
/// `in_repeat` is true when `node` sits under a `repeat` scope, which changes scalar atoms into
/// their plural shape (a count instead of a bool, a list instead of a scalar).
pub fn get_value(node: &Node, table: &OptionsTable, in_repeat: bool) -> ValueMap {
    let mut out = ValueMap::new();
    match node {
        Node::OptionRef(id) => option_value(table.get(*id), table, in_repeat, &mut out),
        Node::Command(cmd) => {
            let value = if in_repeat {
                Value::Int(match cmd.value {
                    CommandValue::Unmatched => 0,
                    CommandValue::Matched => 1,
                    CommandValue::Count(n) => n,
                })
            } else {
                Value::Bool(cmd.value.is_truthy())
            };
            for name in &cmd.names {
                out.insert(name.clone(), value.clone());
            }
        }
        Node::Argument(arg) => {
            let value = match (&arg.value, in_repeat) {
                (ArgumentValue::Unmatched, true) => Value::List(Vec::new()),
                (ArgumentValue::Unmatched, false) => Value::Null,
                (ArgumentValue::Scalar(s), true) => Value::List(vec![s.clone()]),
                (ArgumentValue::Scalar(s), false) => Value::Str(s.clone()),
                (ArgumentValue::List(items), _) => Value::List(items.clone()),
            };
            for name in &arg.names {
                out.insert(name.clone(), value.clone());
            }
        }
        Node::Required(g) | Node::Optional(g) => {
            let scope_repeat = in_repeat || g.repeat;
            for child in &g.children {
                out.merge_in(get_value(child, table, scope_repeat));
            }
        }
        Node::Either(e) => return either_value(e, table, in_repeat),
        Node::OptionsShortcut(hide) => {
            for id in table.ids() {
                let atom = table.get(id);
                if atom.names.iter().any(|n| hide.contains(n)) {
                    continue;
                }
                out.merge_in(get_value(&Node::OptionRef(id), table, in_repeat));
            }
        }
    }
    out
}

fn option_value(atom: &OptionAtom, table: &OptionsTable, in_repeat: bool, out: &mut ValueMap) {
    let has_ref = atom.ref_pattern.is_some();
    let ref_is_multi = atom
        .ref_pattern
        .as_ref()
        .map(|r| crate::fixup::arg_range(r, table).iter().any(|v| matches!(v, crate::fixup::RangeVal::N(n) if *n > 1) || matches!(v, crate::fixup::RangeVal::Inf)))
        .unwrap_or(false);

    let value = if atom.value.is_truthy() || matches!(atom.value, OptionValueState::Count(_)) {
        if let Some(ref_node) = &atom.ref_pattern {
            let ref_values = get_value(ref_node, table, in_repeat);
            flatten_ref_values(&ref_values, ref_is_multi || in_repeat)
        } else if in_repeat {
            Value::Int(match atom.value {
                OptionValueState::Count(n) => n,
                OptionValueState::Flag(true) => 1,
                _ => 0,
            })
        } else {
            match atom.value {
                OptionValueState::Count(n) => Value::Int(n),
                OptionValueState::Flag(b) => Value::Bool(b),
                OptionValueState::Unset => Value::Bool(false),
            }
        }
    } else {
        crate::node::sys_default_for_option(in_repeat, has_ref, ref_is_multi)
    };

    for name in &atom.names {
        out.insert(name.clone(), value.clone());
    }
}

fn flatten_ref_values(map: &ValueMap, as_list: bool) -> Value {
    let mut flat = Vec::new();
    for (_, v) in map.iter() {
        match v {
            Value::Str(s) => flat.push(s.clone()),
            Value::List(items) => flat.extend(items.iter().cloned()),
            Value::Null => {}
            other => flat.push(other.to_string()),
        }
    }
    if as_list {
        Value::List(flat)
    } else if flat.len() == 1 {
        Value::Str(flat.into_iter().next().unwrap())
    } else if flat.is_empty() {
        Value::Null
    } else {
        Value::List(flat)
    }
}

fn either_value(either: &EitherNode, table: &OptionsTable, in_repeat: bool) -> ValueMap {
    let mut out = ValueMap::new();
    match either.matched() {
        Some(idx) => {
            out.merge_in(get_value(&either.branches[idx], table, in_repeat));
            for (i, branch) in either.branches.iter().enumerate() {
                if i == idx {
                    continue;
                }
                out.merge_in(sys_default(branch, table, in_repeat));
            }
        }
        None => {
            for branch in &either.branches {
                out.merge_in(sys_default(branch, table, in_repeat));
            }
        }
    }
    out
}

/// The "never matched" default values for a node, used to fill in the names an `Either`'s
/// unmatched branches would have bound (docpie's `get_sys_default_value`).
pub fn sys_default(node: &Node, table: &OptionsTable, in_repeat: bool) -> ValueMap {
    let mut out = ValueMap::new();
    match node {
        Node::OptionRef(id) => {
            let atom = table.get(*id);
            let has_ref = atom.ref_pattern.is_some();
            let ref_is_multi = atom
                .ref_pattern
                .as_ref()
                .map(|r| crate::fixup::arg_range(r, table).iter().any(|v| matches!(v, crate::fixup::RangeVal::Inf)))
                .unwrap_or(false);
            let value = crate::node::sys_default_for_option(in_repeat, has_ref, ref_is_multi);
            for name in &atom.names {
                out.insert(name.clone(), value.clone());
            }
        }
        Node::Command(cmd) => {
            let value = crate::node::sys_default_for_command(in_repeat);
            for name in &cmd.names {
                out.insert(name.clone(), value.clone());
            }
        }
        Node::Argument(arg) => {
            let value = crate::node::sys_default_for_argument(in_repeat);
            for name in &arg.names {
                out.insert(name.clone(), value.clone());
            }
        }
        Node::Required(g) | Node::Optional(g) => {
            let scope_repeat = in_repeat || g.repeat;
            for child in &g.children {
                out.merge_in(sys_default(child, table, scope_repeat));
            }
        }
        Node::Either(e) => {
            for branch in &e.branches {
                out.merge_in(sys_default(branch, table, in_repeat));
            }
        }
        Node::OptionsShortcut(hide) => {
            for id in table.ids() {
                let atom = table.get(id);
                if atom.names.iter().any(|n| hide.contains(n)) {
                    continue;
                }
                out.merge_in(sys_default(&Node::OptionRef(id), table, in_repeat));
            }
        }
    }
    out
}

/// Merge per-iteration snapshots captured by `matcher::match_repeat`, producing the combined
/// snapshot to load back into `node`. Ported from docpie's various `merge_value` methods, which
/// operate directly on the dumped-value shapes rather than on final extracted values.
pub fn merge_snapshots(node: &Node, table: &OptionsTable, snaps: Vec<Snapshot>) -> Snapshot {
    match node {
        Node::OptionRef(id) => merge_option_snapshots(*id, table, snaps),
        Node::Command(_) => merge_command_snapshots(snaps),
        Node::Argument(_) => merge_argument_snapshots(snaps),
        Node::Required(g) | Node::Optional(g) => merge_group_snapshots(g, table, snaps),
        Node::Either(e) => merge_either_snapshots(e, table, snaps),
        Node::OptionsShortcut(_) => Snapshot::Group(Vec::new()),
    }
}

fn merge_option_snapshots(id: OptionId, table: &OptionsTable, snaps: Vec<Snapshot>) -> Snapshot {
    if snaps.len() == 1 {
        return snaps.into_iter().next().unwrap();
    }
    let mut total = 0i64;
    let mut ref_snaps = Vec::new();
    for s in snaps {
        if let Snapshot::Option { value, ref_snapshot } = s {
            total += match value {
                OptionValueState::Count(n) => n,
                OptionValueState::Flag(true) => 1,
                _ => 0,
            };
            if let Some(rs) = ref_snapshot {
                ref_snaps.push(*rs);
            }
        }
    }
    let merged_ref = if ref_snaps.is_empty() {
        None
    } else {
        table.get(id).ref_pattern.as_ref().map(|r| Box::new(merge_snapshots(r, table, ref_snaps)))
    };
    Snapshot::Option { value: OptionValueState::Count(total), ref_snapshot: merged_ref }
}

fn merge_command_snapshots(snaps: Vec<Snapshot>) -> Snapshot {
    if snaps.len() == 1 {
        return snaps.into_iter().next().unwrap();
    }
    let mut total = 0i64;
    for s in snaps {
        if let Snapshot::Command(v) = s {
            total += match v {
                CommandValue::Count(n) => n,
                CommandValue::Matched => 1,
                CommandValue::Unmatched => 0,
            };
        }
    }
    Snapshot::Command(CommandValue::Count(total))
}

fn merge_argument_snapshots(snaps: Vec<Snapshot>) -> Snapshot {
    if snaps.len() == 1 {
        return snaps.into_iter().next().unwrap();
    }
    let mut flat = Vec::new();
    for s in snaps {
        if let Snapshot::Argument(v) = s {
            match v {
                ArgumentValue::Unmatched => {}
                ArgumentValue::Scalar(s) => flat.push(s),
                ArgumentValue::List(items) => flat.extend(items),
            }
        }
    }
    Snapshot::Argument(ArgumentValue::List(flat))
}

fn merge_group_snapshots(group: &Group, table: &OptionsTable, snaps: Vec<Snapshot>) -> Snapshot {
    let mut per_child: Vec<Vec<Snapshot>> = group.children.iter().map(|_| Vec::new()).collect();
    for snap in snaps {
        if let Snapshot::Group(items) = snap {
            for (i, item) in items.into_iter().enumerate() {
                per_child[i].push(item);
            }
        }
    }
    let merged = group
        .children
        .iter()
        .zip(per_child)
        .map(|(child, snaps)| merge_snapshots(child, table, snaps))
        .collect();
    Snapshot::Group(merged)
}

fn merge_either_snapshots(either: &EitherNode, table: &OptionsTable, snaps: Vec<Snapshot>) -> Snapshot {
    let idx = either
        .matched()
        .unwrap_or_else(|| crate::error::bug("merging snapshots for an Either with no matched branch"));
    let branch_snaps: Vec<Snapshot> = snaps
        .into_iter()
        .filter_map(|s| match s {
            Snapshot::Either { branch, .. } => branch.map(|b| *b),
            other => Some(other),
        })
        .collect();
    let merged_branch = if branch_snaps.is_empty() {
        dump(&either.branches[idx], table)
    } else {
        merge_snapshots(&either.branches[idx], table, branch_snaps)
    };
    Snapshot::Either { index: idx as i32, branch: Some(Box::new(merged_branch)) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::ArgumentAtom;

    #[test]
    fn argument_scalar_extracts_as_string() {
        let table = OptionsTable::new();
        let node = Node::Argument(ArgumentAtom {
            names: vec!["<file>".to_string()],
            value: ArgumentValue::Scalar("a.txt".to_string()),
        });
        let map = get_value(&node, &table, false);
        assert_eq!(map.get("<file>"), Some(&Value::Str("a.txt".to_string())));
    }

    #[test]
    fn argument_list_extracts_as_list() {
        let table = OptionsTable::new();
        let node = Node::Argument(ArgumentAtom {
            names: vec!["<file>".to_string()],
            value: ArgumentValue::List(vec!["a".to_string(), "b".to_string()]),
        });
        let map = get_value(&node, &table, false);
        assert_eq!(map.get("<file>"), Some(&Value::List(vec!["a".to_string(), "b".to_string()])));
    }

    #[test]
    fn unmatched_option_defaults_to_false() {
        let mut table = OptionsTable::new();
        let id = table.push(OptionAtom {
            names: vec!["-v".to_string()],
            default: None,
            value: OptionValueState::Unset,
            ref_pattern: None,
        });
        let map = get_value(&Node::OptionRef(id), &table, false);
        assert_eq!(map.get("-v"), Some(&Value::Bool(false)));
    }
}
