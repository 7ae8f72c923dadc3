//! End-to-end scenarios: build a small tree and table by hand (standing in for whatever a usage
//! description parser would hand this crate), match it against an argv, and check the resulting
//! bindings. Mirrors the concrete scenarios in `original_source/docpie/element.py`'s own test
//! suite (repeat counting, `Either` alternation, repeating positionals, attached option values,
//! short-option clustering, command + positional matching).

use patterncli::argv::MatchConfig;
use patterncli::node::{ArgumentAtom, ArgumentValue, CommandAtom, CommandValue, EitherNode, Group, Node};
use patterncli::registry::{OptionAtom, OptionValueState, OptionsTable};
use patterncli::value::Value;

fn run(mut root: Node, mut table: OptionsTable, argv: Vec<&str>, config: MatchConfig) -> Option<patterncli::ValueMap> {
    let _ = env_logger::try_init();
    let argv: Vec<String> = argv.into_iter().map(str::to_string).collect();
    patterncli::run(&mut root, &mut table, argv, config).unwrap()
}

fn option(names: &[&str]) -> (OptionAtom, Vec<String>) {
    let names: Vec<String> = names.iter().map(|s| s.to_string()).collect();
    (OptionAtom { names: names.clone(), default: None, value: OptionValueState::Unset, ref_pattern: None }, names)
}

#[test]
fn repeat_flag_counts_matches() {
    // Usage: prog [-v]...
    let mut table = OptionsTable::new();
    let (atom, _) = option(&["-v"]);
    let id = table.push(atom);
    let root = Node::Required(Group::new(vec![Node::OptionRef(id)], true));

    let values = run(root, table, vec!["-v", "-v", "-v"], MatchConfig::default()).expect("should match");
    assert_eq!(values.get("-v"), Some(&Value::Int(3)));
}

#[test]
fn either_alternation_binds_both_names() {
    // Usage: prog (-a | -b)
    let mut table = OptionsTable::new();
    let (atom_a, _) = option(&["-a"]);
    let (atom_b, _) = option(&["-b"]);
    let id_a = table.push(atom_a);
    let id_b = table.push(atom_b);
    let root = Node::Either(EitherNode::new(vec![
        Node::Required(Group::new(vec![Node::OptionRef(id_a)], false)),
        Node::Required(Group::new(vec![Node::OptionRef(id_b)], false)),
    ]));

    let values = run(root.clone(), table.clone(), vec!["-b"], MatchConfig::default()).expect("should match");
    assert_eq!(values.get("-a"), Some(&Value::Bool(false)));
    assert_eq!(values.get("-b"), Some(&Value::Bool(true)));

    assert!(run(root, table, vec![], MatchConfig::default()).is_none());
}

#[test]
fn repeating_argument_collects_a_list() {
    // Usage: prog <file>...
    let table = OptionsTable::new();
    let root = Node::Required(Group::new(
        vec![Node::Argument(ArgumentAtom { names: vec!["<file>".to_string()], value: ArgumentValue::Unmatched })],
        true,
    ));

    let values = run(root.clone(), table.clone(), vec!["a", "b", "c"], MatchConfig::default()).expect("should match");
    assert_eq!(
        values.get("<file>"),
        Some(&Value::List(vec!["a".to_string(), "b".to_string(), "c".to_string()]))
    );

    assert!(run(root, table, vec![], MatchConfig::default()).is_none());
}

#[test]
fn attached_option_value_must_be_fully_consumed() {
    // Usage: prog --opt=<v>
    let mut table = OptionsTable::new();
    let (mut atom, _) = option(&["--opt"]);
    atom.ref_pattern =
        Some(Box::new(Node::Argument(ArgumentAtom { names: vec!["<v>".to_string()], value: ArgumentValue::Unmatched })));
    let id = table.push(atom);
    let root = Node::Required(Group::new(vec![Node::OptionRef(id)], false));

    let values = run(root.clone(), table.clone(), vec!["--opt=x"], MatchConfig::default()).expect("should match");
    assert_eq!(values.get("--opt"), Some(&Value::Str("x".to_string())));

    // The attached value is a single token; a second, unrelated token is left over and the
    // overall match fails (nothing in this tiny tree can consume it).
    assert!(run(root, table, vec!["--opt=x", "y"], MatchConfig::default()).is_none());
}

#[test]
fn short_option_cluster_splits_with_attachopt() {
    // Usage: prog -rf, options -r, -f
    let mut table = OptionsTable::new();
    let (atom_r, _) = option(&["-r"]);
    let (atom_f, _) = option(&["-f"]);
    let id_r = table.push(atom_r);
    let id_f = table.push(atom_f);
    let root = Node::Required(Group::new(vec![Node::OptionRef(id_r), Node::OptionRef(id_f)], false));

    let values = run(root.clone(), table.clone(), vec!["-rf"], MatchConfig::default()).expect("should match");
    assert_eq!(values.get("-r"), Some(&Value::Bool(true)));
    assert_eq!(values.get("-f"), Some(&Value::Bool(true)));

    let no_cluster = MatchConfig { attachopt: false, ..MatchConfig::default() };
    assert!(run(root, table, vec!["-rf"], no_cluster).is_none());
}

#[test]
fn command_and_two_positionals_match_in_order() {
    // Usage: prog mv <src> <dst>
    let table = OptionsTable::new();
    let root = Node::Required(Group::new(
        vec![
            Node::Command(CommandAtom { names: vec!["mv".to_string()], value: CommandValue::Unmatched }),
            Node::Argument(ArgumentAtom { names: vec!["<src>".to_string()], value: ArgumentValue::Unmatched }),
            Node::Argument(ArgumentAtom { names: vec!["<dst>".to_string()], value: ArgumentValue::Unmatched }),
        ],
        false,
    ));

    let values = run(root.clone(), table.clone(), vec!["mv", "a", "b"], MatchConfig::default()).expect("should match");
    assert_eq!(values.get("mv"), Some(&Value::Bool(true)));
    assert_eq!(values.get("<src>"), Some(&Value::Str("a".to_string())));
    assert_eq!(values.get("<dst>"), Some(&Value::Str("b".to_string())));

    assert!(run(root, table, vec!["cp", "a", "b"], MatchConfig::default()).is_none());
}

#[test]
fn repeating_pair_group_leaves_an_odd_trailing_token_unconsumed() {
    // Usage: prog (<a> <b>)...
    let table = OptionsTable::new();
    let root = Node::Required(Group::new(
        vec![
            Node::Argument(ArgumentAtom { names: vec!["<a>".to_string()], value: ArgumentValue::Unmatched }),
            Node::Argument(ArgumentAtom { names: vec!["<b>".to_string()], value: ArgumentValue::Unmatched }),
        ],
        true,
    ));

    // A failed second iteration (no partner for "z") must fully unwind the partial sweep,
    // leaving "z" unconsumed rather than silently binding it to <a>.
    assert!(run(root, table, vec!["x", "y", "z"], MatchConfig::default()).is_none());
}
