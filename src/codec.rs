//! `serialize`-feature tree codec: a plain serde-derived DTO mirroring [`Node`], for callers that
//! want to ship a built pattern tree (or its matched values) across a process boundary.
//!
//! Uses a hand-written shadow enum rather than deriving `Serialize`/`Deserialize` directly on the
//! matcher's own types, since `Node`'s `OptionRef` indices are meaningless outside the
//! `OptionsTable` they were allocated from.

use serde::{Deserialize, Serialize};

use crate::node::{ArgumentAtom, ArgumentValue, CommandAtom, CommandValue, EitherNode, Group, HideSet, Node};
use crate::registry::{OptionAtom, OptionValueState, OptionsTable};

/// A self-contained, index-free mirror of a built [`Node`] tree plus the [`OptionsTable`] it
/// references, suitable for `serde_json`/`bincode`/etc.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeDto {
    pub root: NodeDto,
    pub options: Vec<OptionDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NodeDto {
    OptionRef(u32),
    Command { names: Vec<String>, value: CommandValueDto },
    Argument { names: Vec<String>, value: ArgumentValueDto },
    Required(GroupDto),
    Optional(GroupDto),
    Either { branches: Vec<NodeDto>, matched_branch: i32 },
    OptionsShortcut(Vec<String>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDto {
    pub children: Vec<NodeDto>,
    pub repeat: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum CommandValueDto {
    Unmatched,
    Matched,
    Count(i64),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ArgumentValueDto {
    Unmatched,
    Scalar(String),
    List(Vec<String>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionDto {
    pub names: Vec<String>,
    pub value: OptionValueDto,
    pub ref_pattern: Option<Box<NodeDto>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OptionValueDto {
    Unset,
    Flag(bool),
    Count(i64),
}

/// Flatten a built tree plus its backing table into a [`TreeDto`].
pub fn to_dto(root: &Node, table: &OptionsTable) -> TreeDto {
    TreeDto { root: node_to_dto(root), options: table.ids().map(|id| option_to_dto(table.get(id))).collect() }
}

fn node_to_dto(node: &Node) -> NodeDto {
    match node {
        Node::OptionRef(id) => NodeDto::OptionRef(id.0),
        Node::Command(CommandAtom { names, value }) => {
            NodeDto::Command { names: names.clone(), value: command_value_to_dto(*value) }
        }
        Node::Argument(ArgumentAtom { names, value }) => {
            NodeDto::Argument { names: names.clone(), value: argument_value_to_dto(value) }
        }
        Node::Required(g) => NodeDto::Required(group_to_dto(g)),
        Node::Optional(g) => NodeDto::Optional(group_to_dto(g)),
        Node::Either(EitherNode { branches, matched_branch }) => NodeDto::Either {
            branches: branches.iter().map(node_to_dto).collect(),
            matched_branch: *matched_branch,
        },
        Node::OptionsShortcut(hide) => NodeDto::OptionsShortcut(hide.iter().cloned().collect()),
    }
}

fn group_to_dto(group: &Group) -> GroupDto {
    GroupDto { children: group.children.iter().map(node_to_dto).collect(), repeat: group.repeat }
}

fn command_value_to_dto(v: CommandValue) -> CommandValueDto {
    match v {
        CommandValue::Unmatched => CommandValueDto::Unmatched,
        CommandValue::Matched => CommandValueDto::Matched,
        CommandValue::Count(n) => CommandValueDto::Count(n),
    }
}

fn argument_value_to_dto(v: &ArgumentValue) -> ArgumentValueDto {
    match v {
        ArgumentValue::Unmatched => ArgumentValueDto::Unmatched,
        ArgumentValue::Scalar(s) => ArgumentValueDto::Scalar(s.clone()),
        ArgumentValue::List(items) => ArgumentValueDto::List(items.clone()),
    }
}

fn option_to_dto(atom: &OptionAtom) -> OptionDto {
    OptionDto {
        names: atom.names.clone(),
        value: option_value_to_dto(atom.value),
        ref_pattern: atom.ref_pattern.as_deref().map(node_to_dto).map(Box::new),
    }
}

fn option_value_to_dto(v: OptionValueState) -> OptionValueDto {
    match v {
        OptionValueState::Unset => OptionValueDto::Unset,
        OptionValueState::Flag(b) => OptionValueDto::Flag(b),
        OptionValueState::Count(n) => OptionValueDto::Count(n),
    }
}

/// Rebuild a `(Node, OptionsTable)` pair from a [`TreeDto`]. `OptionRef` indices are trusted to
/// have come from a `TreeDto` produced by [`to_dto`] for a table of the same shape; an
/// out-of-range index is a caller bug, not a data error, and panics rather than returning `Result`.
pub fn from_dto(dto: TreeDto) -> (Node, OptionsTable) {
    let mut table = OptionsTable::new();
    for option in dto.options {
        table.push(option_from_dto(option));
    }
    (node_from_dto(dto.root), table)
}

fn option_from_dto(dto: OptionDto) -> OptionAtom {
    OptionAtom {
        names: dto.names,
        default: None,
        value: option_value_from_dto(dto.value),
        ref_pattern: dto.ref_pattern.map(|n| Box::new(node_from_dto(*n))),
    }
}

fn option_value_from_dto(v: OptionValueDto) -> OptionValueState {
    match v {
        OptionValueDto::Unset => OptionValueState::Unset,
        OptionValueDto::Flag(b) => OptionValueState::Flag(b),
        OptionValueDto::Count(n) => OptionValueState::Count(n),
    }
}

fn node_from_dto(dto: NodeDto) -> Node {
    match dto {
        NodeDto::OptionRef(id) => Node::OptionRef(crate::registry::OptionId(id)),
        NodeDto::Command { names, value } => {
            Node::Command(CommandAtom { names, value: command_value_from_dto(value) })
        }
        NodeDto::Argument { names, value } => {
            Node::Argument(ArgumentAtom { names, value: argument_value_from_dto(value) })
        }
        NodeDto::Required(g) => Node::Required(group_from_dto(g)),
        NodeDto::Optional(g) => Node::Optional(group_from_dto(g)),
        NodeDto::Either { branches, matched_branch } => {
            let mut e = EitherNode::new(branches.into_iter().map(node_from_dto).collect());
            e.matched_branch = matched_branch;
            Node::Either(e)
        }
        NodeDto::OptionsShortcut(names) => {
            let hide: HideSet = names.into_iter().collect();
            Node::OptionsShortcut(hide)
        }
    }
}

fn group_from_dto(dto: GroupDto) -> Group {
    Group::new(dto.children.into_iter().map(node_from_dto).collect(), dto.repeat)
}

fn command_value_from_dto(v: CommandValueDto) -> CommandValue {
    match v {
        CommandValueDto::Unmatched => CommandValue::Unmatched,
        CommandValueDto::Matched => CommandValue::Matched,
        CommandValueDto::Count(n) => CommandValue::Count(n),
    }
}

fn argument_value_from_dto(v: ArgumentValueDto) -> ArgumentValue {
    match v {
        ArgumentValueDto::Unmatched => ArgumentValue::Unmatched,
        ArgumentValueDto::Scalar(s) => ArgumentValue::Scalar(s),
        ArgumentValueDto::List(items) => ArgumentValue::List(items),
    }
}
