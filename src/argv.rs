//! The consumable argument vector the matcher advances over.
//!
//! Tokens are removed from the front as they're matched; `status()` gives multi-pass matchers
//! (`matcher::match_oneline`) a cheap way to detect "no progress was made this sweep" without
//! comparing the whole vector. Grounded on docpie's `Argv` class (referenced throughout
//! `original_source/docpie/element.py`'s `Atom.match`/`Unit.match_oneline` methods) and on the
//! short-option splitting idiom of `has_prefix`/`split_long_components`-style prefix helpers.

use log::trace;

/// Knobs controlling how options are recognised in the argument stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchConfig {
    /// Long options must start with `--`; if false, a single `-` also introduces a long option.
    pub stdopt: bool,
    /// Short options may cluster, e.g. `-rf` standing for `-r -f`.
    pub attachopt: bool,
    /// A short option's value may be attached in the same token, e.g. `-xvalue`. Gated in
    /// `matcher::match_option`: a short-cluster remainder is only consumed as an attached value
    /// when this is set; `--long=value`'s attached value is unconditional.
    pub attachvalue: bool,
    /// Whether a `--` separator forces everything after it to be treated as a positional.
    pub auto_dashes: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig { stdopt: true, attachopt: true, attachvalue: true, auto_dashes: true }
    }
}

/// The argument vector under match, with lookahead and in-place consumption.
#[derive(Debug, Clone)]
pub struct Argv {
    tokens: Vec<String>,
    /// Bumped on every mutation; used as the multi-pass "did anything change" token.
    generation: u64,
    pub dash: bool,
    pub dashes: bool,
    pub auto_dashes: bool,
}

/// Opaque progress token. Two `Status` values compare equal iff nothing was consumed between
/// their capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status(u64, usize);

impl Argv {
    pub fn new(tokens: Vec<String>, auto_dashes: bool) -> Self {
        Argv { tokens, generation: 0, dash: false, dashes: false, auto_dashes }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn current(&self, offset: usize) -> Option<&str> {
        self.tokens.get(offset).map(String::as_str)
    }

    pub fn status(&self) -> Status {
        Status(self.generation, self.tokens.len())
    }

    /// Drop `1 + skip` tokens from the front.
    pub fn next(&mut self, skip: usize) {
        let n = (1 + skip).min(self.tokens.len());
        self.tokens.drain(0..n);
        self.generation += 1;
        trace!("argv advanced by {}, {} token(s) remain", n, self.tokens.len());
    }

    pub fn index_of(&self, tok: &str) -> Option<usize> {
        self.tokens.iter().position(|t| t == tok)
    }

    /// Remove the first occurrence of `tok`, returning whether one was found.
    pub fn pop(&mut self, tok: &str) -> bool {
        if let Some(idx) = self.index_of(tok) {
            self.tokens.remove(idx);
            self.generation += 1;
            true
        } else {
            false
        }
    }

    /// Splice tokens onto the front (used to put a short-cluster remainder, e.g. `-f` left over
    /// from matching `-r` inside `-rf`, back for the next atom to consume).
    pub fn splice_front(&mut self, tokens: Vec<String>) {
        if tokens.is_empty() {
            return;
        }
        let mut new_tokens = tokens;
        new_tokens.extend(self.tokens.drain(..));
        self.tokens = new_tokens;
        self.generation += 1;
    }

    pub fn clone_for_trial(&self) -> Argv {
        self.clone()
    }

    pub fn set_by(&mut self, other: Argv) {
        *self = other;
    }

    /// Locate an occurrence of any of `names` in the remaining stream, removing it.
    ///
    /// Distinguishes *why* there's leftover text, since a short-cluster remainder (`-rf` minus
    /// `-r` leaves `f`, meant to be re-spliced as `-f`) and a long option's attached value
    /// (`--opt=v` leaves `v`, meant to feed the option's ref) are handled differently by the
    /// caller (`matcher::match_option`). The split itself is mechanical and doesn't depend on
    /// `attachvalue`; whether a cluster remainder is then treated as this option's attached value
    /// is a decision the caller makes with `MatchConfig::attachvalue` in hand.
    pub fn break_for_option(&mut self, names: &[String], stdopt: bool) -> OptionBreak {
        let long_prefix = if stdopt { "--" } else { "-" };

        for idx in 0..self.tokens.len() {
            let tok = self.tokens[idx].clone();
            if tok == "-" || tok == "--" {
                continue;
            }
            if self.auto_dashes && self.dashes {
                break;
            }

            if tok.starts_with(long_prefix) && tok.len() > long_prefix.len() {
                let (name_part, attached) = match tok.find('=') {
                    Some(eq) => (&tok[..eq], Some(tok[eq + 1..].to_string())),
                    None => (tok.as_str(), None),
                };
                if names.iter().any(|n| n == name_part) {
                    self.tokens.remove(idx);
                    self.generation += 1;
                    trace!("matched long option {} at position {}", name_part, idx);
                    return match attached {
                        Some(v) => OptionBreak::FoundWithAttachedValue(v),
                        None => OptionBreak::Found,
                    };
                }
            }

            if !tok.starts_with("--") && tok.starts_with('-') && tok.len() > 1 {
                // Only the cluster's leading character is eligible: `-rf` is `-r` followed by a
                // re-spliced `-f`, never a search for `-f` anywhere inside the cluster.
                let rest: Vec<char> = tok[1..].chars().collect();
                let short = format!("-{}", rest[0]);
                if names.iter().any(|n| n == &short) {
                    self.tokens.remove(idx);
                    self.generation += 1;
                    let leftover: String = rest[1..].iter().collect();
                    if leftover.is_empty() {
                        trace!("matched short option {} at position {}", short, idx);
                        return OptionBreak::Found;
                    }
                    trace!("matched short option {} with cluster remainder {}", short, leftover);
                    return OptionBreak::FoundWithClusterRemainder(leftover);
                }
            }
        }
        OptionBreak::NotFound
    }
}

/// Outcome of [`Argv::break_for_option`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionBreak {
    NotFound,
    Found,
    /// Short-cluster leftover, e.g. the `f` left over matching `-r` out of `-rf`.
    FoundWithClusterRemainder(String),
    /// A long option's `=`-attached value, e.g. the `v` in `--opt=v`.
    FoundWithAttachedValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(tokens: &[&str]) -> Argv {
        Argv::new(tokens.iter().map(|s| s.to_string()).collect(), true)
    }

    #[test]
    fn next_drops_front_tokens() {
        let mut a = argv(&["a", "b", "c"]);
        a.next(0);
        assert_eq!(a.current(0), Some("b"));
        a.next(1);
        assert!(a.is_empty());
    }

    #[test]
    fn status_changes_on_mutation() {
        let mut a = argv(&["a", "b"]);
        let s1 = a.status();
        a.next(0);
        let s2 = a.status();
        assert_ne!(s1, s2);
    }

    #[test]
    fn break_for_option_finds_long_option() {
        let mut a = argv(&["--verbose", "x"]);
        let result = a.break_for_option(&["--verbose".to_string()], true);
        assert_eq!(result, OptionBreak::Found);
        assert_eq!(a.current(0), Some("x"));
    }

    #[test]
    fn break_for_option_splits_short_cluster() {
        let mut a = argv(&["-rf"]);
        let result = a.break_for_option(&["-r".to_string()], true);
        assert_eq!(result, OptionBreak::FoundWithClusterRemainder("f".to_string()));
    }

    #[test]
    fn break_for_option_splits_attached_long_value() {
        let mut a = argv(&["--opt=x"]);
        let result = a.break_for_option(&["--opt".to_string()], true);
        assert_eq!(result, OptionBreak::FoundWithAttachedValue("x".to_string()));
    }
}
