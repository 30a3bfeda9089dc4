//! Morphological compatibility rules
//!
//! A rule file lists which category at one word position may co-occur with
//! which category at another. Positions are A (prefix), B (stem) and C
//! (suffix). The file is a rule count followed by that many
//! `position1 category1 position2 category2` tuples, whitespace separated.
//!
//! The dictionary is read-only once built and is shared between analyses
//! as `Arc<RuleDictionary>`.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use crate::capacity::Capacities;
use crate::error::{MorphError, Result};
use crate::symbol::Symbol;

/// Slot of a word a category occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Position {
    /// Prefix
    A,
    /// Stem
    B,
    /// Suffix
    C,
}

impl FromStr for Position {
    type Err = MorphError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "A" | "a" | "1" => Ok(Position::A),
            "B" | "b" | "2" => Ok(Position::B),
            "C" | "c" | "3" => Ok(Position::C),
            other => Err(MorphError::MalformedInput(format!(
                "unknown rule position '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Position::A => "A",
            Position::B => "B",
            Position::C => "C",
        };
        f.write_str(s)
    }
}

/// The three position pairs a rule can relate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PairKind {
    AB,
    BC,
    AC,
}

impl PairKind {
    const ALL: [PairKind; 3] = [PairKind::AB, PairKind::BC, PairKind::AC];

    fn index(self) -> usize {
        match self {
            PairKind::AB => 0,
            PairKind::BC => 1,
            PairKind::AC => 2,
        }
    }

    /// Pair kind for two positions, plus whether the operands must be swapped
    pub fn of(p1: Position, p2: Position) -> Option<(PairKind, bool)> {
        match (p1, p2) {
            (Position::A, Position::B) => Some((PairKind::AB, false)),
            (Position::B, Position::A) => Some((PairKind::AB, true)),
            (Position::B, Position::C) => Some((PairKind::BC, false)),
            (Position::C, Position::B) => Some((PairKind::BC, true)),
            (Position::A, Position::C) => Some((PairKind::AC, false)),
            (Position::C, Position::A) => Some((PairKind::AC, true)),
            _ => None,
        }
    }

    /// Positions in canonical order
    pub fn positions(self) -> (Position, Position) {
        match self {
            PairKind::AB => (Position::A, Position::B),
            PairKind::BC => (Position::B, Position::C),
            PairKind::AC => (Position::A, Position::C),
        }
    }
}

type PairTable = HashMap<Symbol, HashSet<Symbol>>;

/// Compatibility tables between morphological categories
#[derive(Debug, Clone)]
pub struct RuleDictionary {
    permitted: [PairTable; 3],
    following: HashMap<(Position, Symbol), Vec<(Position, Symbol)>>,
    rule_count: usize,
    max_rules: usize,
    max_following: usize,
}

impl Default for RuleDictionary {
    fn default() -> Self {
        Self::new(&Capacities::default())
    }
}

impl RuleDictionary {
    /// Create an empty dictionary bounded by `caps`
    pub fn new(caps: &Capacities) -> Self {
        Self {
            permitted: Default::default(),
            following: HashMap::new(),
            rule_count: 0,
            max_rules: caps.max_rules,
            max_following: caps.max_following,
        }
    }

    /// Load a rule file
    pub fn from_file(path: impl AsRef<Path>, caps: &Capacities) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::parse(&text, caps)
    }

    /// Load rules from any reader
    pub fn from_reader<R: Read>(mut reader: R, caps: &Capacities) -> Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Self::parse(&text, caps)
    }

    /// Parse rule text
    pub fn parse(text: &str, caps: &Capacities) -> Result<Self> {
        let mut tokens = text.split_whitespace();
        let declared: usize = tokens
            .next()
            .ok_or_else(|| MorphError::MalformedInput("empty rule file".to_string()))?
            .parse()
            .map_err(|e| MorphError::MalformedInput(format!("bad rule count: {e}")))?;

        let mut dict = Self::new(caps);
        for n in 0..declared {
            let mut field = || {
                tokens.next().ok_or_else(|| {
                    MorphError::MalformedInput(format!(
                        "rule file declares {declared} rules but ends inside rule {}",
                        n + 1
                    ))
                })
            };
            let p1: Position = field()?.parse()?;
            let c1 = field()?;
            let p2: Position = field()?.parse()?;
            let c2 = field()?;
            dict.insert(p1, c1, p2, c2)?;
        }

        let trailing = tokens.count();
        if trailing > 0 {
            log::warn!("ignoring {trailing} tokens after the {declared} declared rules");
        }
        log::debug!("loaded {} rules", dict.rule_count);
        Ok(dict)
    }

    /// Permit `c1` at `p1` together with `c2` at `p2`
    ///
    /// Re-inserting an existing rule is a no-op.
    pub fn insert(&mut self, p1: Position, c1: &str, p2: Position, c2: &str) -> Result<()> {
        let (kind, swapped) = PairKind::of(p1, p2).ok_or_else(|| {
            MorphError::MalformedInput(format!("rule relates {p1} to itself ({c1}, {c2})"))
        })?;
        let (p1, c1, p2, c2) = if swapped {
            (p2, c2, p1, c1)
        } else {
            (p1, c1, p2, c2)
        };

        if self.is_permitted(kind, c1, c2) {
            return Ok(());
        }
        if self.rule_count >= self.max_rules {
            return Err(MorphError::capacity("rule dictionary rules", self.max_rules));
        }

        let c1 = Symbol::new(c1);
        let c2 = Symbol::new(c2);

        let following = self.following.entry((p1, c1.clone())).or_default();
        if !following.iter().any(|(p, c)| *p == p2 && *c == c2) {
            if following.len() >= self.max_following {
                return Err(MorphError::capacity(
                    "following possibilities per category",
                    self.max_following,
                ));
            }
            following.push((p2, c2.clone()));
        }

        self.permitted[kind.index()]
            .entry(c1)
            .or_default()
            .insert(c2);
        self.rule_count += 1;
        Ok(())
    }

    /// Is `c1` (earlier position of `kind`) compatible with `c2`?
    pub fn is_permitted(&self, kind: PairKind, c1: &str, c2: &str) -> bool {
        self.permitted[kind.index()]
            .get(c1)
            .is_some_and(|set| set.contains(c2))
    }

    /// Prefix/stem compatibility
    pub fn is_ab_permitted(&self, prefix: &str, stem: &str) -> bool {
        self.is_permitted(PairKind::AB, prefix, stem)
    }

    /// Stem/suffix compatibility
    pub fn is_bc_permitted(&self, stem: &str, suffix: &str) -> bool {
        self.is_permitted(PairKind::BC, stem, suffix)
    }

    /// Prefix/suffix compatibility
    pub fn is_ac_permitted(&self, prefix: &str, suffix: &str) -> bool {
        self.is_permitted(PairKind::AC, prefix, suffix)
    }

    /// Categories recorded as able to follow `category` at `position`
    pub fn following_possibilities(&self, position: Position, category: &str) -> &[(Position, Symbol)] {
        self.following
            .get(&(position, Symbol::new(category)))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of distinct rules
    pub fn len(&self) -> usize {
        self.rule_count
    }

    /// True if no rule was loaded
    pub fn is_empty(&self) -> bool {
        self.rule_count == 0
    }

    /// Number of rules of one pair kind
    pub fn count_of(&self, kind: PairKind) -> usize {
        self.permitted[kind.index()].values().map(HashSet::len).sum()
    }

    /// Per-kind rule counts, for diagnostics
    pub fn summary(&self) -> String {
        PairKind::ALL
            .iter()
            .map(|k| {
                let (p1, p2) = k.positions();
                format!("{p1}-{p2}: {}", self.count_of(*k))
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}
