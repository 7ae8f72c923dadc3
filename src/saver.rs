//! Transactional snapshot/rollback stack for backtracking.
//!
//! Matching is depth-first with explicit backtracking: before a node risks consuming input, its
//! current value (and the argv position) is pushed here; on failure, `rollback` restores the node
//! *and every node saved after it*, in LIFO order, exactly as docpie's `Saver` class does for
//! `Unit.match_oneline`/`match_repeat`.

use log::trace;

use crate::argv::Argv;
use crate::node::{ArgumentValue, CommandValue, Group, Node};
use crate::registry::{OptionId, OptionValueState, OptionsTable};

/// Identifies a node for the purposes of the Saver's LIFO key.
///
/// Shared `Option` atoms are keyed by their stable `OptionId`. Every other tree-owned node
/// (`Command`, `Argument`, `Group`, `Either`) is keyed by the address of its backing value —
/// stable for the duration of a match attempt because the tree's `Vec`s are never resized while
/// matching is in progress, only their contents are mutated in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaverKey {
    Option(OptionId),
    Addr(usize),
}

impl SaverKey {
    pub fn of(node: &Node) -> SaverKey {
        match node {
            Node::OptionRef(id) => SaverKey::Option(*id),
            other => SaverKey::Addr(other as *const Node as usize),
        }
    }
}

/// A node-kind-specific value snapshot, mirroring docpie's `dump_value`/`load_value` pair.
#[derive(Debug, Clone)]
pub enum Snapshot {
    Option { value: OptionValueState, ref_snapshot: Option<Box<Snapshot>> },
    Command(CommandValue),
    Argument(ArgumentValue),
    Group(Vec<Snapshot>),
    /// The committed branch index, plus (once a branch has committed) that branch's own
    /// snapshot — needed so a repeating enclosing group can merge the committed branch's
    /// per-iteration value the same way it merges any other child (see `extract::merge_snapshots`).
    Either { index: i32, branch: Option<Box<Snapshot>> },
}

/// Capture the current value of a node (and, recursively, its children).
pub fn dump(node: &Node, table: &OptionsTable) -> Snapshot {
    match node {
        Node::OptionRef(id) => {
            let atom = table.get(*id);
            let ref_snapshot = atom.ref_pattern.as_ref().map(|r| Box::new(dump(r, table)));
            Snapshot::Option { value: atom.value, ref_snapshot }
        }
        Node::Command(cmd) => Snapshot::Command(cmd.value),
        Node::Argument(arg) => Snapshot::Argument(arg.value.clone()),
        Node::Required(g) | Node::Optional(g) => Snapshot::Group(dump_group(g, table)),
        Node::Either(e) => {
            let branch = e.matched().map(|idx| Box::new(dump(&e.branches[idx], table)));
            Snapshot::Either { index: e.matched_branch, branch }
        }
        Node::OptionsShortcut(_) => Snapshot::Group(Vec::new()),
    }
}

fn dump_group(group: &Group, table: &OptionsTable) -> Vec<Snapshot> {
    group.children.iter().map(|c| dump(c, table)).collect()
}

/// Restore a node's value (and, recursively, its children) from a previously captured snapshot.
pub fn load(node: &mut Node, table: &mut OptionsTable, snapshot: Snapshot) {
    match (node, snapshot) {
        (Node::OptionRef(id), Snapshot::Option { value, ref_snapshot }) => {
            let id = *id;
            table.get_mut(id).value = value;
            if let Some(snap) = ref_snapshot {
                // Take the ref node out (preserving its identity/address) rather than cloning,
                // so any SaverKey::Addr entries referring to it stay valid after it's put back.
                let mut ref_node = table
                    .get_mut(id)
                    .ref_pattern
                    .take()
                    .unwrap_or_else(|| crate::error::bug("option has a ref snapshot but no ref"));
                load(&mut ref_node, table, *snap);
                table.get_mut(id).ref_pattern = Some(ref_node);
            }
        }
        (Node::Command(cmd), Snapshot::Command(v)) => cmd.value = v,
        (Node::Argument(arg), Snapshot::Argument(v)) => arg.value = v,
        (Node::Required(g), Snapshot::Group(items)) | (Node::Optional(g), Snapshot::Group(items)) => {
            load_group(g, table, items)
        }
        (Node::Either(e), Snapshot::Either { index, branch }) => {
            e.matched_branch = index;
            if let Some(b) = branch {
                let idx = e
                    .matched()
                    .unwrap_or_else(|| crate::error::bug("either snapshot carries a branch but no committed index"));
                load(&mut e.branches[idx], table, *b);
            }
        }
        (Node::OptionsShortcut(_), Snapshot::Group(_)) => {}
        _ => crate::error::bug("snapshot kind did not match node kind"),
    }
}

fn load_group(group: &mut Group, table: &mut OptionsTable, snapshots: Vec<Snapshot>) {
    for (child, snap) in group.children.iter_mut().zip(snapshots) {
        load(child, table, snap);
    }
}

struct Entry {
    key: SaverKey,
    snapshot: Snapshot,
    argv: Argv,
}

/// LIFO stack of saved node states, each paired with the argv state at the time of saving.
#[derive(Default)]
pub struct Saver {
    stack: Vec<Entry>,
}

impl Saver {
    pub fn new() -> Self {
        Saver { stack: Vec::new() }
    }

    pub fn save(&mut self, node: &Node, table: &OptionsTable, argv: &Argv) {
        let key = SaverKey::of(node);
        trace!("saving state for {:?}", key);
        self.stack.push(Entry { key, snapshot: dump(node, table), argv: argv.clone() });
    }

    /// Restore `node` and every node saved after it, in LIFO order, discarding their snapshots.
    /// The caller is responsible for applying the returned snapshot to `node` itself via
    /// [`load`]; snapshots for nodes saved after `node` are discarded since those nodes are
    /// expected to be re-derived from `node`'s subtree (docpie's `Saver.rollback` semantics).
    pub fn rollback(&mut self, node: &Node, argv: &mut Argv) -> Option<Snapshot> {
        let key = SaverKey::of(node);
        let mut found = None;
        while let Some(entry) = self.stack.pop() {
            let is_target = entry.key == key;
            if is_target {
                *argv = entry.argv;
                found = Some(entry.snapshot);
                break;
            }
        }
        trace!("rolled back to state for {:?}, found = {}", key, found.is_some());
        found
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::ArgumentAtom;

    #[test]
    fn save_and_rollback_restores_value_and_argv() {
        let table = OptionsTable::new();
        let mut node = Node::Argument(ArgumentAtom {
            names: vec!["<file>".to_string()],
            value: ArgumentValue::Unmatched,
        });
        let mut argv = Argv::new(vec!["a".to_string(), "b".to_string()], true);
        let mut saver = Saver::new();
        saver.save(&node, &table, &argv);

        argv.next(0);
        if let Node::Argument(a) = &mut node {
            a.value = ArgumentValue::Scalar("a".to_string());
        }

        let snap = saver.rollback(&node, &mut argv).unwrap();
        let mut table = table;
        load(&mut node, &mut table, snap);

        assert_eq!(argv.current(0), Some("a"));
        match &node {
            Node::Argument(a) => assert_eq!(a.value, ArgumentValue::Unmatched),
            _ => panic!("wrong node kind"),
        }
    }
}
