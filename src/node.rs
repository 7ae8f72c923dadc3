//! The pattern tree's node taxonomy.
//!
//! Docpie's class hierarchy (`Atom` → `Option`/`Command`/`Argument`; `Unit` → `Required`/
//! `Optional`; plus the standalone `Either` and `OptionsShortcut` classes) becomes one sum type
//! here. Matching, value extraction, reset, and fix-up are free functions over `&mut Node` in
//! `matcher`/`extract`/`fixup` rather than virtual methods, since Rust has no cheap equivalent of
//! Python's dynamic dispatch across a hierarchy this shallow.

use std::collections::BTreeSet;

use crate::registry::OptionId;
use crate::value::Value;

/// The set of option aliases an `OptionsShortcut` must *not* expand, because the enclosing usage
/// line already names them directly.
pub type HideSet = BTreeSet<String>;

/// One node of the pattern tree.
#[derive(Debug, Clone)]
pub enum Node {
    /// A reference to a shared `Option` atom living in the `OptionsTable` arena.
    OptionRef(OptionId),
    Command(CommandAtom),
    Argument(ArgumentAtom),
    Required(Group),
    Optional(Group),
    Either(EitherNode),
    OptionsShortcut(HideSet),
}

impl Node {
    pub fn is_options_shortcut(&self) -> bool {
        matches!(self, Node::OptionsShortcut(_))
    }

    /// True for nodes that always succeed on their own (`Optional` groups, `OptionsShortcut`) —
    /// used by `match_oneline`'s initial "already matched" bookkeeping (docpie:
    /// `matched_status = [isinstance(x, (Optional, OptionsShortcut)) for x in self]`).
    pub fn starts_satisfied(&self) -> bool {
        matches!(self, Node::Optional(_) | Node::OptionsShortcut(_))
    }
}

/// A literal command word, e.g. `mv` in `Usage: prog mv <src> <dst>`.
#[derive(Debug, Clone)]
pub struct CommandAtom {
    pub names: Vec<String>,
    pub value: CommandValue,
}

/// A command's match state: unmatched, matched once, or (under repetition) a count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandValue {
    Unmatched,
    Matched,
    Count(i64),
}

impl CommandValue {
    pub fn is_truthy(&self) -> bool {
        !matches!(self, CommandValue::Unmatched)
    }
}

/// A positional argument, e.g. `<file>` or `FILE`.
#[derive(Debug, Clone)]
pub struct ArgumentAtom {
    pub names: Vec<String>,
    pub value: ArgumentValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentValue {
    Unmatched,
    Scalar(String),
    List(Vec<String>),
}

impl ArgumentValue {
    pub fn is_list(&self) -> bool {
        matches!(self, ArgumentValue::List(_))
    }
}

/// A `Required`/`Optional` composite: an ordered sequence of children, with an ellipsis flag.
#[derive(Debug, Clone, Default)]
pub struct Group {
    pub children: Vec<Node>,
    pub repeat: bool,
}

impl Group {
    pub fn new(children: Vec<Node>, repeat: bool) -> Self {
        Group { children, repeat }
    }
}

/// An ordered set of alternatives, exactly one of which may be selected during a match attempt.
#[derive(Debug, Clone)]
pub struct EitherNode {
    pub branches: Vec<Node>,
    /// `-1` until a branch has committed; thereafter the index of the committed branch.
    /// Not cleared by `reset` within a repeat-match sequence (see SPEC_FULL.md §9, Either
    /// commitment).
    pub matched_branch: i32,
}

impl EitherNode {
    pub fn new(branches: Vec<Node>) -> Self {
        EitherNode { branches, matched_branch: -1 }
    }

    pub fn matched(&self) -> Option<usize> {
        if self.matched_branch < 0 {
            None
        } else {
            Some(self.matched_branch as usize)
        }
    }
}

/// The default value a kind of atom reports when it has never matched, given whether it sits
/// under a repeating scope. Mirrors docpie's per-class `get_sys_default_value`.
pub fn sys_default_for_option(in_repeat: bool, has_ref: bool, ref_is_multi: bool) -> Value {
    if in_repeat {
        Value::List(Vec::new())
    } else if has_ref {
        if ref_is_multi {
            Value::List(Vec::new())
        } else {
            Value::Null
        }
    } else {
        Value::Bool(false)
    }
}

pub fn sys_default_for_command(in_repeat: bool) -> Value {
    if in_repeat {
        Value::List(Vec::new())
    } else {
        Value::Bool(false)
    }
}

pub fn sys_default_for_argument(in_repeat: bool) -> Value {
    if in_repeat {
        Value::List(Vec::new())
    } else {
        Value::Null
    }
}
