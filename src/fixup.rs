//! Post-parse tree fix-up: the passes that turn a freshly parsed usage tree into one ready for
//! matching.
//!
//! Three passes, run in order by [`build`]:
//! 1. [`fix`] — prune empty composites, flatten same-kind nesting, collapse single-branch
//!    `Either`s and same-kind single-`Argument` `Either` branches.
//! 2. [`fix_optional`] — bind each `Option`'s `ref` to its inline value sub-pattern.
//! 3. [`arg_range`] — compute a composite's possible child-count set.
//!
//! Grounded on `original_source/docpie/element.py`'s `Unit.fix`/`_fix_single_element`/
//! `_fix_multi_element`/`fix_nest`, `Either.fix`/`fix_argument_only`, `Option.fix_optional`, and
//! `Unit.arg_range`/`Either.arg_range`/`Optional.arg_range`.

use std::collections::BTreeSet;

use log::debug;

use crate::error::{Error, Result};
use crate::node::{ArgumentAtom, ArgumentValue, EitherNode, Group, Node};
use crate::registry::OptionsTable;

/// Run the full fix-up pipeline: `fix`, then `fix_optional`. Returns the new root (which may
/// differ in shape, and even in node-kind, from the root passed in — an empty tree collapses to
/// an empty `Optional`, which is what `build` guarantees callers always get back for the root).
pub fn build(root: Node, table: &mut OptionsTable) -> Result<Node> {
    let fixed = fix(root).unwrap_or_else(|| Node::Optional(Group::default()));
    fix_optional(fixed, table)
}

/// Pass 1: structural pruning/flattening/collapsing. Returns `None` when the whole node collapses
/// to nothing (an empty composite), so callers filter it from their own children.
pub fn fix(node: Node) -> Option<Node> {
    match node {
        Node::Required(g) => fix_group(true, g),
        Node::Optional(g) => fix_group(false, g),
        Node::Either(e) => fix_either(e),
        atom @ (Node::OptionRef(_) | Node::Command(_) | Node::Argument(_) | Node::OptionsShortcut(_)) => {
            Some(atom)
        }
    }
}

fn wrap(is_required: bool, group: Group) -> Node {
    if is_required {
        Node::Required(group)
    } else {
        Node::Optional(group)
    }
}

fn fix_group(is_required: bool, mut group: Group) -> Option<Node> {
    if group.children.is_empty() {
        return None;
    }
    if group.children.len() == 1 {
        let only = group.children.pop().unwrap();
        return fix_single(is_required, only, group.repeat);
    }

    let mut fixed_children = Vec::with_capacity(group.children.len());
    for child in group.children {
        if let Some(f) = fix(child) {
            fixed_children.push(f);
        }
    }
    if fixed_children.is_empty() {
        return None;
    }
    if fixed_children.len() == 1 {
        let only = fixed_children.pop().unwrap();
        return fix_single(is_required, only, group.repeat);
    }
    Some(wrap(is_required, Group::new(fixed_children, group.repeat)))
}

fn fix_single(is_required: bool, child: Node, outer_repeat: bool) -> Option<Node> {
    let fixed_child = fix(child)?;
    match fixed_child {
        Node::Required(inner) => Some(fix_nest(is_required, true, inner, outer_repeat)),
        Node::Optional(inner) => Some(fix_nest(is_required, false, inner, outer_repeat)),
        other => Some(wrap(is_required, Group::new(vec![other], outer_repeat))),
    }
}

fn fix_nest(outer_is_required: bool, inner_is_required: bool, inner: Group, outer_repeat: bool) -> Node {
    let repeat = outer_repeat || inner.repeat;
    let merged = Group::new(inner.children, repeat);
    let result_kind = if outer_is_required == inner_is_required { outer_is_required } else { false };
    // Same-kind nesting flattens and is re-fixed; different-kind nesting always becomes Optional.
    fix_group(result_kind, merged).unwrap_or_else(|| Node::Optional(Group::default()))
}

fn fix_either(either: EitherNode) -> Option<Node> {
    let mut fixed = Vec::with_capacity(either.branches.len());
    for branch in either.branches {
        if let Some(f) = fix(branch) {
            fixed.push(f);
        }
    }
    if fixed.is_empty() {
        return None;
    }
    if fixed.len() == 1 {
        return Some(fixed.pop().unwrap());
    }
    if let Some(merged) = merge_argument_only_branches(&fixed) {
        debug!("either collapsed to single argument with aliases");
        return Some(merged);
    }
    Some(Node::Either(EitherNode::new(fixed)))
}

/// `<a> | ARG | <b>` -> one `Argument` carrying all three as aliases, wrapped in whichever
/// composite kind every branch agreed on.
fn merge_argument_only_branches(branches: &[Node]) -> Option<Node> {
    let is_required = match branches.first()? {
        Node::Required(_) => true,
        Node::Optional(_) => false,
        _ => return None,
    };
    let mut names = Vec::new();
    for branch in branches {
        let group = match (is_required, branch) {
            (true, Node::Required(g)) => g,
            (false, Node::Optional(g)) => g,
            _ => return None,
        };
        if group.children.len() != 1 {
            return None;
        }
        match &group.children[0] {
            Node::Argument(a) => names.extend(a.names.iter().cloned()),
            _ => return None,
        }
    }
    let mut seen = BTreeSet::new();
    let mut deduped = Vec::new();
    for n in names {
        if seen.insert(n.clone()) {
            deduped.push(n);
        }
    }
    let merged_argument = Node::Argument(ArgumentAtom { names: deduped, value: ArgumentValue::Unmatched });
    Some(wrap(is_required, Group::new(vec![merged_argument], false)))
}

/// Pass 2: bind each `Option`'s `ref` to the inline value sub-pattern that follows it in the
/// usage line, validating arity against whatever shape the options-description section already
/// declared for it (if any).
pub fn fix_optional(node: Node, table: &mut OptionsTable) -> Result<Node> {
    match node {
        Node::Required(g) => Ok(Node::Required(fix_optional_group(g, table)?)),
        Node::Optional(g) => Ok(Node::Optional(fix_optional_group(g, table)?)),
        Node::Either(mut e) => {
            let mut branches = Vec::with_capacity(e.branches.len());
            for branch in e.branches.drain(..) {
                branches.push(fix_optional(branch, table)?);
            }
            e.branches = branches;
            Ok(Node::Either(e))
        }
        other => Ok(other),
    }
}

fn fix_optional_group(mut group: Group, table: &mut OptionsTable) -> Result<Group> {
    let mut result = Vec::with_capacity(group.children.len());
    let mut idx = 0;
    while idx < group.children.len() {
        let child = group.children[idx].clone();
        match child {
            Node::OptionRef(id) => {
                let declared_arity = table
                    .get(id)
                    .ref_pattern
                    .as_ref()
                    .map(|r| arg_range(r, table).iter().next_back().copied());
                match declared_arity.flatten() {
                    Some(RangeVal::N(n)) if n > 0 => {
                        let n = n as usize;
                        if idx + n >= group.children.len() {
                            return Err(Error::usage_grammar(format!(
                                "option at position {} declares {} value position(s) but the usage line doesn't supply them",
                                idx, n
                            )));
                        }
                        let inline: Vec<Node> =
                            group.children.drain(idx + 1..=idx + n).map(|c| fix_optional(c, table)).collect::<Result<_>>()?;
                        let inline_ref = Node::Required(Group::new(inline, false));
                        table.get_mut(id).ref_pattern = Some(Box::new(inline_ref));
                        result.push(Node::OptionRef(id));
                    }
                    _ => result.push(Node::OptionRef(id)),
                }
            }
            other => result.push(fix_optional(other, table)?),
        }
        idx += 1;
    }
    group.children = result;
    Ok(group)
}

/// A possible child count: a finite number, or "unbounded" for a repeating group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RangeVal {
    N(u32),
    Inf,
}

/// Pass 3 (computed on demand, not stored): the set of child counts a node could match.
/// `Optional` always includes `0`; a `repeat` group always includes `Inf`.
pub fn arg_range(node: &Node, table: &OptionsTable) -> BTreeSet<RangeVal> {
    match node {
        Node::OptionRef(_) | Node::Command(_) | Node::Argument(_) => {
            BTreeSet::from([RangeVal::N(1)])
        }
        Node::OptionsShortcut(_) => BTreeSet::from([RangeVal::N(0)]),
        Node::Required(g) => group_range(g, table, false),
        Node::Optional(g) => group_range(g, table, true),
        Node::Either(e) => {
            let mut out = BTreeSet::new();
            for branch in &e.branches {
                out.extend(arg_range(branch, table));
            }
            out
        }
    }
}

fn group_range(group: &Group, table: &OptionsTable, force_zero: bool) -> BTreeSet<RangeVal> {
    let mut sums: BTreeSet<RangeVal> = BTreeSet::from([RangeVal::N(0)]);
    for child in &group.children {
        let child_range = arg_range(child, table);
        let mut next = BTreeSet::new();
        for a in &sums {
            for b in &child_range {
                next.insert(add_range(*a, *b));
            }
        }
        sums = next;
    }
    if group.repeat {
        sums.insert(RangeVal::Inf);
    }
    if force_zero {
        sums.insert(RangeVal::N(0));
    }
    sums
}

fn add_range(a: RangeVal, b: RangeVal) -> RangeVal {
    match (a, b) {
        (RangeVal::N(x), RangeVal::N(y)) => RangeVal::N(x + y),
        _ => RangeVal::Inf,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{ArgumentAtom, ArgumentValue, CommandAtom, CommandValue};

    fn arg(name: &str) -> Node {
        Node::Argument(ArgumentAtom { names: vec![name.to_string()], value: ArgumentValue::Unmatched })
    }

    fn cmd(name: &str) -> Node {
        Node::Command(CommandAtom { names: vec![name.to_string()], value: CommandValue::Unmatched })
    }

    #[test]
    fn empty_group_fixes_to_none() {
        assert!(fix(Node::Required(Group::default())).is_none());
    }

    #[test]
    fn single_child_required_wrapping_argument_is_kept() {
        let node = Node::Required(Group::new(vec![arg("<file>")], false));
        let fixed = fix(node).unwrap();
        match fixed {
            Node::Required(g) => assert_eq!(g.children.len(), 1),
            _ => panic!("expected Required"),
        }
    }

    #[test]
    fn nested_same_kind_flattens() {
        let inner = Node::Required(Group::new(vec![arg("<a>"), arg("<b>")], false));
        let outer = Node::Required(Group::new(vec![inner], true));
        let fixed = fix(outer).unwrap();
        match fixed {
            Node::Required(g) => {
                assert_eq!(g.children.len(), 2);
                assert!(g.repeat);
            }
            _ => panic!("expected flattened Required"),
        }
    }

    #[test]
    fn nested_different_kind_becomes_optional() {
        let inner = Node::Optional(Group::new(vec![arg("<a>")], false));
        let outer = Node::Required(Group::new(vec![inner], false));
        let fixed = fix(outer).unwrap();
        assert!(matches!(fixed, Node::Optional(_)));
    }

    #[test]
    fn either_with_one_branch_collapses() {
        let either = Node::Either(EitherNode::new(vec![cmd("mv")]));
        let fixed = fix(either).unwrap();
        assert!(matches!(fixed, Node::Command(_)));
    }

    #[test]
    fn either_of_single_arguments_merges_aliases() {
        let branch_a = Node::Required(Group::new(vec![arg("<a>")], false));
        let branch_b = Node::Required(Group::new(vec![arg("A")], false));
        let either = Node::Either(EitherNode::new(vec![branch_a, branch_b]));
        let fixed = fix(either).unwrap();
        match fixed {
            Node::Required(g) => match &g.children[0] {
                Node::Argument(a) => assert_eq!(a.names, vec!["<a>".to_string(), "A".to_string()]),
                _ => panic!("expected merged Argument"),
            },
            _ => panic!("expected Required wrapping merged Argument"),
        }
    }

    #[test]
    fn arg_range_optional_includes_zero() {
        let table = OptionsTable::new();
        let node = Node::Optional(Group::new(vec![arg("<a>"), arg("<b>")], false));
        let range = arg_range(&node, &table);
        assert!(range.contains(&RangeVal::N(0)));
        assert!(range.contains(&RangeVal::N(2)));
    }

    #[test]
    fn arg_range_repeat_includes_inf() {
        let table = OptionsTable::new();
        let node = Node::Required(Group::new(vec![arg("<a>")], true));
        let range = arg_range(&node, &table);
        assert!(range.contains(&RangeVal::Inf));
    }
}
