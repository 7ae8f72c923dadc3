//! The recursive backtracking matcher.
//!
//! Grounded on `original_source/docpie/element.py`'s per-class `match` methods
//! (`Option.match`, `Command.match`, `Argument.match`, `Unit.match_oneline`/`match_repeat`,
//! `Required.match`/`Optional.match`, `Either.match_oneline`/`match_repeat`,
//! `OptionsShortcut.match`), translated from exception-free boolean returns into this crate's
//! `Result<bool>` so a `UsageExit` (an option's ref failing to fully consume an attached value)
//! can still propagate out of a deeply nested match.

use log::{debug, trace};

pub use crate::argv::MatchConfig;
use crate::argv::{Argv, OptionBreak};
use crate::error::{Error, Result};
use crate::node::{ArgumentValue, CommandValue, Group, Node};
use crate::registry::{OptionId, OptionValueState, OptionsTable};
use crate::saver::{self, Saver};

/// Reset every value in the subtree rooted at `node` to its unmatched state. Does not clear an
/// `Either`'s committed branch — see SPEC_FULL.md §9, Either commitment.
pub fn reset(node: &mut Node, table: &mut OptionsTable) {
    match node {
        Node::OptionRef(id) => {
            let id = *id;
            {
                let atom = table.get_mut(id);
                atom.value = match atom.value {
                    OptionValueState::Unset => OptionValueState::Unset,
                    OptionValueState::Flag(_) => OptionValueState::Flag(false),
                    OptionValueState::Count(_) => OptionValueState::Count(0),
                };
            }
            if let Some(mut r) = table.get_mut(id).ref_pattern.take() {
                reset(&mut r, table);
                table.get_mut(id).ref_pattern = Some(r);
            }
        }
        Node::Command(c) => c.value = CommandValue::Unmatched,
        Node::Argument(a) => {
            a.value = if a.value.is_list() { ArgumentValue::List(Vec::new()) } else { ArgumentValue::Unmatched };
        }
        Node::Required(g) | Node::Optional(g) => {
            for child in &mut g.children {
                reset(child, table);
            }
        }
        Node::Either(e) => {
            for branch in &mut e.branches {
                reset(branch, table);
            }
        }
        Node::OptionsShortcut(_) => {}
    }
}

/// Match `node` against `argv`. `repeat_match` is true when the *enclosing* scope is iterating
/// (so a flag should accumulate a count rather than latch a boolean).
pub fn match_node(
    node: &mut Node,
    table: &mut OptionsTable,
    argv: &mut Argv,
    saver: &mut Saver,
    repeat_match: bool,
    config: MatchConfig,
) -> Result<bool> {
    match node {
        Node::OptionRef(id) => match_option(*id, table, argv, saver, repeat_match, config),
        Node::Command(_) => match_command(node, table, argv, saver, repeat_match),
        Node::Argument(_) => match_argument(node, table, argv, saver, repeat_match),
        Node::Required(_) => match_required(node, table, argv, saver, repeat_match, config),
        Node::Optional(_) => match_optional(node, table, argv, saver, repeat_match, config),
        Node::Either(_) => match_either(node, table, argv, saver, repeat_match, config),
        Node::OptionsShortcut(_) => match_options_shortcut(node, table, argv, saver, repeat_match, config),
    }
}

fn match_option(
    id: OptionId,
    table: &mut OptionsTable,
    argv: &mut Argv,
    saver: &mut Saver,
    repeat_match: bool,
    config: MatchConfig,
) -> Result<bool> {
    if argv.is_empty() {
        trace!("no argv left to match option against");
        return Ok(false);
    }
    if !repeat_match && table.get(id).value.is_truthy() {
        debug!("option {:?} already has a value", id);
        return Ok(true);
    }

    let saved = Node::OptionRef(id);
    saver.save(&saved, table, argv);

    let names = table.get(id).names.clone();

    if names.iter().any(|n| n == "-") && argv.current(0) == Some("-") && !(config.auto_dashes && argv.dashes) {
        bump(table, id, repeat_match);
        argv.next(0);
        argv.dash = true;
        return Ok(true);
    }
    if names.iter().any(|n| n == "--") && argv.current(0) == Some("--") && !config.auto_dashes {
        bump(table, id, repeat_match);
        argv.next(0);
        argv.dashes = true;
        return Ok(true);
    }

    let found = argv.break_for_option(&names, config.stdopt);
    let (matched, leftover) = match found {
        OptionBreak::NotFound => {
            debug!("option {:?} not found in argv", id);
            rollback_option(id, table, &saved, argv, saver);
            return Ok(false);
        }
        OptionBreak::Found => (true, None),
        OptionBreak::FoundWithClusterRemainder(rest) => (true, Some((rest, true))),
        OptionBreak::FoundWithAttachedValue(val) => (true, Some((val, false))),
    };
    debug_assert!(matched);

    bump(table, id, repeat_match);

    let has_ref = table.get(id).ref_pattern.is_some();
    match (has_ref, leftover) {
        (false, None) => Ok(true),
        (false, Some((rest, is_cluster))) => {
            if is_cluster && config.stdopt && config.attachopt {
                trace!("splicing cluster remainder -{} back onto argv", rest);
                argv.splice_front(vec![format!("-{}", rest)]);
                Ok(true)
            } else {
                rollback_option(id, table, &saved, argv, saver);
                Ok(false)
            }
        }
        (true, leftover) => {
            if let Some((_, true)) = &leftover {
                // A short-cluster remainder only counts as this option's attached value when
                // `attachvalue` allows it; otherwise it is not this option's to consume.
                if !config.attachvalue {
                    rollback_option(id, table, &saved, argv, saver);
                    return Ok(false);
                }
            }
            let mut ref_node = table.get_mut(id).ref_pattern.take().expect("checked has_ref");
            let result = match &leftover {
                None => match_node(&mut ref_node, table, argv, saver, repeat_match, config),
                Some((value, _)) => {
                    let mut sub_argv = Argv::new(vec![value.clone()], config.auto_dashes);
                    let r = match_node(&mut ref_node, table, &mut sub_argv, saver, repeat_match, config);
                    match r {
                        Ok(true) if !sub_argv.is_empty() => {
                            table.get_mut(id).ref_pattern = Some(ref_node);
                            return Err(Error::usage_exit(format!(
                                "option {:?}'s value-ref did not fully consume its attached value",
                                id
                            )));
                        }
                        other => other,
                    }
                }
            };
            table.get_mut(id).ref_pattern = Some(ref_node);
            match result {
                Ok(true) => Ok(true),
                Ok(false) => {
                    rollback_option(id, table, &saved, argv, saver);
                    Ok(false)
                }
                Err(e) => Err(e),
            }
        }
    }
}

fn bump(table: &mut OptionsTable, id: OptionId, repeat_match: bool) {
    let atom = table.get_mut(id);
    atom.value = if repeat_match {
        match atom.value {
            OptionValueState::Count(n) => OptionValueState::Count(n + 1),
            _ => OptionValueState::Count(1),
        }
    } else {
        OptionValueState::Flag(true)
    };
}

fn rollback_option(id: OptionId, table: &mut OptionsTable, saved: &Node, argv: &mut Argv, saver: &mut Saver) {
    if let Some(snap) = saver.rollback(saved, argv) {
        saver::load(&mut Node::OptionRef(id), table, snap);
    }
}

/// Restore `node` (and its whole subtree) plus `argv` to the state captured by the most recent
/// `saver.save(node, ...)`, discarding any entries saved after it. Used by `match_oneline`/
/// `match_repeat` to undo a failed group attempt in one step, the way `element.py`'s
/// `Unit.match_oneline`/`match_repeat` wrap themselves in `saver.save`/`saver.rollback`.
fn rollback_node(node: &mut Node, table: &mut OptionsTable, argv: &mut Argv, saver: &mut Saver) {
    if let Some(snap) = saver.rollback(node, argv) {
        saver::load(node, table, snap);
    }
}

fn match_command(
    node: &mut Node,
    table: &mut OptionsTable,
    argv: &mut Argv,
    saver: &mut Saver,
    repeat_match: bool,
) -> Result<bool> {
    let Node::Command(cmd) = node else { unreachable!() };
    let current = argv.current(0);
    if matches!(current, None | Some("-")) {
        return Ok(false);
    }
    if !repeat_match && cmd.value.is_truthy() {
        return Ok(true);
    }

    let mut skip = 0;
    let mut check = current;
    if current == Some("--") {
        if argv.auto_dashes && argv.dashes {
            check = argv.current(1);
            skip = 1;
        } else {
            return Ok(false);
        }
    }
    let Some(check) = check else { return Ok(false) };
    if !cmd.names.iter().any(|n| n == check) || looks_like_option(check) {
        return Ok(false);
    }

    cmd.value = if repeat_match {
        match cmd.value {
            CommandValue::Count(n) => CommandValue::Count(n + 1),
            _ => CommandValue::Count(1),
        }
    } else {
        CommandValue::Matched
    };
    saver.save(node, table, argv);
    argv.next(skip);
    Ok(true)
}

fn match_argument(
    node: &mut Node,
    table: &mut OptionsTable,
    argv: &mut Argv,
    saver: &mut Saver,
    repeat_match: bool,
) -> Result<bool> {
    let Node::Argument(arg) = node else { unreachable!() };
    let current = argv.current(0);
    if matches!(current, None | Some("-")) {
        return Ok(false);
    }
    if !repeat_match && !matches!(arg.value, ArgumentValue::Unmatched | ArgumentValue::List(ref v) if v.is_empty()) {
        return Ok(true);
    }

    if current == Some("--") {
        if argv.auto_dashes && argv.dashes {
            let Some(forced) = argv.current(1) else { return Ok(false) };
            let forced = forced.to_string();
            push_argument_value(arg, repeat_match, forced);
            saver.save(node, table, argv);
            argv.next(1);
            return Ok(true);
        } else {
            return Ok(false);
        }
    }

    if looks_like_option(current.unwrap()) {
        return Ok(false);
    }

    let value = current.unwrap().to_string();
    push_argument_value(arg, repeat_match, value);
    saver.save(node, table, argv);
    argv.next(0);
    Ok(true)
}

fn push_argument_value(arg: &mut crate::node::ArgumentAtom, repeat_match: bool, value: String) {
    if repeat_match {
        match &mut arg.value {
            ArgumentValue::List(items) => items.push(value),
            _ => arg.value = ArgumentValue::List(vec![value]),
        }
    } else {
        arg.value = ArgumentValue::Scalar(value);
    }
}

/// Classify a token the way docpie's `Atom.get_class` does for the purposes of deciding whether a
/// `Command`/`Argument` may consume it: a token is "option-shaped" if it starts with one or two
/// dashes and isn't exactly `-`.
fn looks_like_option(tok: &str) -> bool {
    if tok == "-" || tok == "--" {
        return false;
    }
    if let Some(rest) = tok.strip_prefix("--") {
        let name = rest.split('=').next().unwrap_or(rest);
        !name.is_empty() && name.chars().next().map_or(false, |c| c.is_ascii_alphanumeric() || c == '_')
    } else if let Some(rest) = tok.strip_prefix('-') {
        !rest.is_empty()
    } else {
        false
    }
}

fn match_required(
    node: &mut Node,
    table: &mut OptionsTable,
    argv: &mut Argv,
    saver: &mut Saver,
    repeat_match: bool,
    config: MatchConfig,
) -> Result<bool> {
    let repeat = repeat_match || matches!(node, Node::Required(g) if g.repeat);
    if !repeat {
        match_oneline(node, table, argv, saver, config)
    } else {
        Ok(match_repeat(node, table, argv, saver, config)? > 0)
    }
}

fn match_optional(
    node: &mut Node,
    table: &mut OptionsTable,
    argv: &mut Argv,
    saver: &mut Saver,
    repeat_match: bool,
    config: MatchConfig,
) -> Result<bool> {
    let repeat = repeat_match || matches!(node, Node::Optional(g) if g.repeat);
    if repeat {
        match_repeat(node, table, argv, saver, config)?;
    } else {
        match_oneline(node, table, argv, saver, config)?;
    }
    Ok(true)
}

/// One sweep (or several, while progress is made) through a group's children in declaration
/// order, allowing already-optional children to start "satisfied". Saves `node` itself on entry
/// and rolls it (and the argv cursor) all the way back on failure, so a partially-advanced sweep
/// never leaks a mutation into the caller — mirrors `element.py`'s `Unit.match_oneline`, which
/// wraps its whole body in `saver.save(self, argv)` / `saver.rollback(self, argv)`.
pub fn match_oneline(
    node: &mut Node,
    table: &mut OptionsTable,
    argv: &mut Argv,
    saver: &mut Saver,
    config: MatchConfig,
) -> Result<bool> {
    saver.save(node, table, argv);
    let group = match node {
        Node::Required(g) | Node::Optional(g) => g,
        _ => unreachable!(),
    };
    let mut matched_status: Vec<bool> = group.children.iter().map(Node::starts_satisfied).collect();

    let mut old_status = None;
    let mut new_status = argv.status();
    while Some(new_status) != old_status && !argv.is_empty() {
        old_status = Some(new_status);
        for (index, child) in group.children.iter_mut().enumerate() {
            if argv.is_empty() {
                break;
            }
            saver.save(child, table, argv);
            let result = match_node(child, table, argv, saver, false, config)?;
            if result {
                matched_status[index] = true;
            }
        }
        new_status = argv.status();
    }
    let all_matched = matched_status.iter().all(|b| *b);

    if all_matched {
        Ok(true)
    } else {
        debug!("group failed to match, status {:?}", matched_status);
        rollback_node(node, table, argv, saver);
        Ok(false)
    }
}

/// Repeatedly match one full sweep of the group, merging per-iteration values, while the argv
/// cursor keeps advancing. Returns the number of successful iterations (`0` means failure).
/// Saves `node` on entry; if no iteration succeeds, rolls back to that entry state, matching
/// `element.py`'s `Unit.match_repeat` zero-iteration wrapper. Ported from docpie's
/// `Unit.match_repeat`.
pub fn match_repeat(
    node: &mut Node,
    table: &mut OptionsTable,
    argv: &mut Argv,
    saver: &mut Saver,
    config: MatchConfig,
) -> Result<usize> {
    saver.save(node, table, argv);
    let mut full_match_count = 0usize;
    let mut history: Vec<Vec<saver::Snapshot>> = Vec::new();

    let mut old_status = None;
    let mut new_status = argv.status();
    while Some(new_status) != old_status && !argv.is_empty() {
        old_status = Some(new_status);
        {
            let group = match node {
                Node::Required(g) | Node::Optional(g) => g,
                _ => unreachable!(),
            };
            for child in &mut group.children {
                reset(child, table);
            }
        }
        let result = match_oneline(node, table, argv, saver, config)?;
        if !result {
            break;
        }
        full_match_count += 1;
        let group = match node {
            Node::Required(g) | Node::Optional(g) => g,
            _ => unreachable!(),
        };
        history.push(group.children.iter().map(|c| saver::dump(c, table)).collect());
        new_status = argv.status();
    }

    if full_match_count > 0 {
        let group = match node {
            Node::Required(g) | Node::Optional(g) => g,
            _ => unreachable!(),
        };
        merge_history_into(group, table, history);
    } else {
        rollback_node(node, table, argv, saver);
    }
    Ok(full_match_count)
}

fn merge_history_into(group: &mut Group, table: &mut OptionsTable, history: Vec<Vec<saver::Snapshot>>) {
    for (index, child) in group.children.iter_mut().enumerate() {
        let per_child: Vec<saver::Snapshot> = history.iter().map(|iter| iter[index].clone()).collect();
        let merged = crate::extract::merge_snapshots(child, table, per_child);
        saver::load(child, table, merged);
    }
}

fn match_either(
    node: &mut Node,
    table: &mut OptionsTable,
    argv: &mut Argv,
    saver: &mut Saver,
    repeat_match: bool,
    config: MatchConfig,
) -> Result<bool> {
    if !repeat_match {
        match_either_oneline(node, table, argv, saver, config)
    } else {
        match_either_repeat(node, table, argv, saver, config)
    }
}

fn match_either_oneline(
    node: &mut Node,
    table: &mut OptionsTable,
    argv: &mut Argv,
    saver: &mut Saver,
    config: MatchConfig,
) -> Result<bool> {
    let Node::Either(either) = node else { unreachable!() };
    if let Some(idx) = either.matched() {
        return match_node(&mut either.branches[idx], table, argv, saver, false, config);
    }

    for index in 0..either.branches.len() {
        let mut trial_argv = argv.clone_for_trial();
        let mut trial_saver = Saver::new();
        let result = match_node(&mut either.branches[index], table, &mut trial_argv, &mut trial_saver, false, config)?;
        if result {
            either.matched_branch = index as i32;
            argv.set_by(trial_argv);
            return Ok(true);
        }
        reset(&mut either.branches[index], table);
    }
    Ok(false)
}

fn match_either_repeat(
    node: &mut Node,
    table: &mut OptionsTable,
    argv: &mut Argv,
    saver: &mut Saver,
    config: MatchConfig,
) -> Result<bool> {
    let Node::Either(either) = node else { unreachable!() };
    let mut at_least_once = false;
    if either.matched().is_none() {
        if !match_either_oneline(node, table, argv, saver, config)? {
            return Ok(false);
        }
        at_least_once = true;
    }
    let Node::Either(either) = node else { unreachable!() };
    let idx = either.matched().expect("just committed a branch");
    let further = match_node(&mut either.branches[idx], table, argv, saver, true, config)?;
    Ok(further || at_least_once)
}

fn match_options_shortcut(
    node: &mut Node,
    table: &mut OptionsTable,
    argv: &mut Argv,
    saver: &mut Saver,
    repeat_match: bool,
    config: MatchConfig,
) -> Result<bool> {
    let Node::OptionsShortcut(hide) = node else { unreachable!() };
    let hide = hide.clone();
    for id in table.ids() {
        if argv.is_empty() {
            break;
        }
        let names_hidden = table.get(id).names.iter().any(|n| hide.contains(n));
        if names_hidden {
            continue;
        }
        let mut option_node = Node::OptionRef(id);
        // Non-fatal: an [options] candidate that fails to match simply leaves argv untouched.
        let _ = match_node(&mut option_node, table, argv, saver, repeat_match, config);
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{ArgumentAtom, CommandAtom};
    use crate::registry::OptionAtom;

    fn argv(tokens: &[&str]) -> Argv {
        Argv::new(tokens.iter().map(|s| s.to_string()).collect(), true)
    }

    #[test]
    fn flag_option_matches_and_counts_under_repeat() {
        let mut table = OptionsTable::new();
        let id = table.push(OptionAtom {
            names: vec!["-v".to_string()],
            default: None,
            value: OptionValueState::Unset,
            ref_pattern: None,
        });
        let mut node = Node::OptionRef(id);
        let mut argv = argv(&["-v", "-v", "-v"]);
        let mut saver = Saver::new();
        let config = MatchConfig::default();
        let mut count = 0;
        loop {
            reset_flag_for_repeat(&mut table, id);
            if !match_node(&mut node, &mut table, &mut argv, &mut saver, true, config).unwrap() {
                break;
            }
            count += 1;
            if argv.is_empty() {
                break;
            }
        }
        assert_eq!(count, 3);
        assert_eq!(table.get(id).value, OptionValueState::Count(3));
    }

    // `-v` latches once it has a truthy value unless we're in a repeat-match loop; this harness
    // drives the loop directly (bypassing `match_repeat`'s reset-per-iteration) so we avoid
    // resetting the accumulated count itself.
    fn reset_flag_for_repeat(_table: &mut OptionsTable, _id: OptionId) {}

    #[test]
    fn required_group_matches_command_and_two_arguments() {
        let mut table = OptionsTable::new();
        let mut node = Node::Required(Group::new(
            vec![
                Node::Command(CommandAtom { names: vec!["mv".to_string()], value: CommandValue::Unmatched }),
                Node::Argument(ArgumentAtom { names: vec!["<src>".to_string()], value: ArgumentValue::Unmatched }),
                Node::Argument(ArgumentAtom { names: vec!["<dst>".to_string()], value: ArgumentValue::Unmatched }),
            ],
            false,
        ));
        let mut argv = argv(&["mv", "a", "b"]);
        let mut saver = Saver::new();
        let ok = match_node(&mut node, &mut table, &mut argv, &mut saver, false, MatchConfig::default()).unwrap();
        assert!(ok);
        assert!(argv.is_empty());
    }

    #[test]
    fn either_commits_first_successful_branch() {
        let mut table = OptionsTable::new();
        let id_a = table.push(OptionAtom {
            names: vec!["-a".to_string()],
            default: None,
            value: OptionValueState::Unset,
            ref_pattern: None,
        });
        let id_b = table.push(OptionAtom {
            names: vec!["-b".to_string()],
            default: None,
            value: OptionValueState::Unset,
            ref_pattern: None,
        });
        let mut node = Node::Either(crate::node::EitherNode::new(vec![
            Node::Required(Group::new(vec![Node::OptionRef(id_a)], false)),
            Node::Required(Group::new(vec![Node::OptionRef(id_b)], false)),
        ]));
        let mut argv = argv(&["-b"]);
        let mut saver = Saver::new();
        let ok = match_node(&mut node, &mut table, &mut argv, &mut saver, false, MatchConfig::default()).unwrap();
        assert!(ok);
        if let Node::Either(e) = &node {
            assert_eq!(e.matched(), Some(1));
        }
        assert_eq!(table.get(id_b).value, OptionValueState::Flag(true));
    }
}
