//! Guards: boolean conditions over the variables of a colored function.
//!
//! A [`Guard`] restricts when a tuple (or any guarded value) applies. The
//! absence of a guard means "always true"; that convention is handled by
//! [`GuardedExpr`][crate::guarded::GuardedExpr] only, everything else works
//! with explicit [`Guard::True`].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use log::debug;

use crate::error::{Error, Result};
use crate::graph::IndexGraph;
use crate::types::{Index, Sort};

/// An atomic condition on variables of one sort.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Predicate {
    /// `X_left = !^succ X_right`
    Eq {
        sort: Sort,
        left: Index,
        right: Index,
        succ: i32,
    },
    /// `X_left != !^succ X_right`
    Neq {
        sort: Sort,
        left: Index,
        right: Index,
        succ: i32,
    },
    /// `X_index ∈ S_subclass`
    In {
        sort: Sort,
        index: Index,
        subclass: u32,
    },
}

impl Predicate {
    pub fn eq(sort: Sort, left: u32, right: u32) -> Self {
        Predicate::Eq {
            sort,
            left: Index::new(left),
            right: Index::new(right),
            succ: 0,
        }
    }

    pub fn neq(sort: Sort, left: u32, right: u32) -> Self {
        Predicate::Neq {
            sort,
            left: Index::new(left),
            right: Index::new(right),
            succ: 0,
        }
    }

    pub fn member(sort: Sort, index: u32, subclass: u32) -> Self {
        Predicate::In {
            sort,
            index: Index::new(index),
            subclass,
        }
    }

    pub fn sort(&self) -> Sort {
        match *self {
            Predicate::Eq { sort, .. } | Predicate::Neq { sort, .. } | Predicate::In { sort, .. } => {
                sort
            }
        }
    }

    /// Indices mentioned by the predicate.
    pub fn indices(&self) -> Vec<Index> {
        match *self {
            Predicate::Eq { left, right, .. } | Predicate::Neq { left, right, .. } => {
                vec![left, right]
            }
            Predicate::In { index, .. } => vec![index],
        }
    }

    /// The predicate with the opposite truth value, if it is expressible.
    pub fn negated(&self) -> Option<Predicate> {
        match *self {
            Predicate::Eq {
                sort,
                left,
                right,
                succ,
            } => Some(Predicate::Neq {
                sort,
                left,
                right,
                succ,
            }),
            Predicate::Neq {
                sort,
                left,
                right,
                succ,
            } => Some(Predicate::Eq {
                sort,
                left,
                right,
                succ,
            }),
            Predicate::In { .. } => None,
        }
    }

    /// Truth value decidable from syntax alone (`X1 = X1`, `X1 != X1`).
    fn constant_value(&self) -> Option<bool> {
        match *self {
            Predicate::Eq {
                left, right, succ, ..
            } if left == right && succ == 0 => Some(true),
            Predicate::Neq {
                left, right, succ, ..
            } if left == right && succ == 0 => Some(false),
            _ => None,
        }
    }

    fn renamed(&self, on: Sort, split: &BTreeMap<Index, Index>) -> Self {
        if self.sort() != on {
            return *self;
        }
        let rename = |i: Index| split.get(&i).copied().unwrap_or(i);
        match *self {
            Predicate::Eq {
                sort,
                left,
                right,
                succ,
            } => Predicate::Eq {
                sort,
                left: rename(left),
                right: rename(right),
                succ,
            },
            Predicate::Neq {
                sort,
                left,
                right,
                succ,
            } => Predicate::Neq {
                sort,
                left: rename(left),
                right: rename(right),
                succ,
            },
            Predicate::In {
                sort,
                index,
                subclass,
            } => Predicate::In {
                sort,
                index: rename(index),
                subclass,
            },
        }
    }
}

fn write_succ(f: &mut fmt::Formatter<'_>, succ: i32, index: Index) -> fmt::Result {
    match succ {
        0 => write!(f, "{}", index),
        1 => write!(f, "!{}", index),
        -1 => write!(f, "^{}", index),
        k => write!(f, "!{{{}}}{}", k, index),
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Predicate::Eq {
                left, right, succ, ..
            } => {
                write!(f, "{} = ", left)?;
                write_succ(f, succ, right)
            }
            Predicate::Neq {
                left, right, succ, ..
            } => {
                write!(f, "{} != ", left)?;
                write_succ(f, succ, right)
            }
            Predicate::In {
                index, subclass, ..
            } => write!(f, "{} in S{}", index, subclass),
        }
    }
}

/// A boolean condition over predicates.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Guard {
    True,
    False,
    Pred(Predicate),
    Not(Box<Guard>),
    And(Vec<Guard>),
    Or(Vec<Guard>),
}

impl From<Predicate> for Guard {
    fn from(p: Predicate) -> Self {
        Guard::Pred(p)
    }
}

impl Guard {
    pub fn and(self, other: Guard) -> Guard {
        Guard::And(vec![self, other])
    }

    pub fn or(self, other: Guard) -> Guard {
        Guard::Or(vec![self, other])
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Guard {
        Guard::Not(Box::new(self))
    }

    /// Returns `true` if the guard is syntactically always true.
    pub fn is_trivial(&self) -> bool {
        matches!(self, Guard::True)
    }

    /// Returns `true` if the guard is syntactically always false.
    pub fn is_false(&self) -> bool {
        matches!(self, Guard::False)
    }

    /// Returns `true` for `True`, literals, and conjunctions of literals.
    pub fn is_and_form(&self) -> bool {
        fn is_literal(g: &Guard) -> bool {
            match g {
                Guard::Pred(_) => true,
                Guard::Not(inner) => matches!(**inner, Guard::Pred(_)),
                _ => false,
            }
        }
        match self {
            Guard::True => true,
            Guard::And(args) => args.iter().all(is_literal),
            g => is_literal(g),
        }
    }

    /// Sorts referenced by the guard.
    pub fn sorts(&self) -> BTreeSet<Sort> {
        let mut sorts = BTreeSet::new();
        self.visit_predicates(&mut |p| {
            sorts.insert(p.sort());
        });
        sorts
    }

    /// Atomic predicates of the guard, in syntactic order.
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut preds = Vec::new();
        self.visit_predicates(&mut |p| preds.push(*p));
        preds
    }

    fn visit_predicates(&self, visit: &mut impl FnMut(&Predicate)) {
        match self {
            Guard::True | Guard::False => {}
            Guard::Pred(p) => visit(p),
            Guard::Not(inner) => inner.visit_predicates(visit),
            Guard::And(args) | Guard::Or(args) => {
                for arg in args {
                    arg.visit_predicates(visit);
                }
            }
        }
    }

    /// Renames the indices of `sort` (domain-splitting clone).
    pub fn clone_split(&self, sort: Sort, split: &BTreeMap<Index, Index>) -> Guard {
        match self {
            Guard::True => Guard::True,
            Guard::False => Guard::False,
            Guard::Pred(p) => Guard::Pred(p.renamed(sort, split)),
            Guard::Not(inner) => Guard::Not(Box::new(inner.clone_split(sort, split))),
            Guard::And(args) => Guard::And(args.iter().map(|g| g.clone_split(sort, split)).collect()),
            Guard::Or(args) => Guard::Or(args.iter().map(|g| g.clone_split(sort, split)).collect()),
        }
    }

    /// Rewrites the guard into a simpler equivalent one.
    ///
    /// Folds constants, flattens nested connectives, removes duplicates,
    /// evaluates reflexive predicates and detects complementary literals.
    /// The result is `True`/`False` whenever these rules decide it.
    pub fn normalize(&self) -> Guard {
        match self {
            Guard::True | Guard::False => self.clone(),
            Guard::Pred(p) => match p.constant_value() {
                Some(true) => Guard::True,
                Some(false) => Guard::False,
                None => self.clone(),
            },
            Guard::Not(inner) => match inner.normalize() {
                Guard::True => Guard::False,
                Guard::False => Guard::True,
                Guard::Not(g) => *g,
                Guard::Pred(p) => match p.negated() {
                    Some(q) => Guard::Pred(q),
                    None => Guard::Not(Box::new(Guard::Pred(p))),
                },
                g => Guard::Not(Box::new(g)),
            },
            Guard::And(args) => Self::normalize_junction(args, true),
            Guard::Or(args) => Self::normalize_junction(args, false),
        }
    }

    fn normalize_junction(args: &[Guard], conjunction: bool) -> Guard {
        let (identity, zero) = if conjunction {
            (Guard::True, Guard::False)
        } else {
            (Guard::False, Guard::True)
        };

        let mut flat: Vec<Guard> = Vec::new();
        for arg in args {
            let g = arg.normalize();
            let nested = match (&g, conjunction) {
                (Guard::And(inner), true) | (Guard::Or(inner), false) => Some(inner.clone()),
                _ => None,
            };
            for g in nested.unwrap_or_else(|| vec![g]) {
                if g == zero {
                    debug!("guard: absorbing element found");
                    return zero;
                }
                if g != identity && !flat.contains(&g) {
                    flat.push(g);
                }
            }
        }

        if Self::has_complementary_pair(&flat) {
            debug!("guard: complementary literals");
            return zero;
        }

        match flat.len() {
            0 => identity,
            1 => flat.remove(0),
            _ if conjunction => Guard::And(flat),
            _ => Guard::Or(flat),
        }
    }

    fn has_complementary_pair(args: &[Guard]) -> bool {
        args.iter().enumerate().any(|(i, a)| {
            args[i + 1..].iter().any(|b| match (a, b) {
                (Guard::Not(x), y) | (y, Guard::Not(x)) => **x == *y,
                (Guard::Pred(p), Guard::Pred(q)) => p.negated() == Some(*q),
                _ => false,
            })
        })
    }

    /// Index dependency graph of a conjunctive guard.
    ///
    /// Every predicate connects the indices it mentions.
    pub fn dependency_graph(&self) -> Result<IndexGraph> {
        if !self.is_and_form() {
            return Err(Error::precondition(format!(
                "dependency graph requires a conjunctive guard, got {}",
                self
            )));
        }
        let mut graph = IndexGraph::new();
        self.visit_predicates(&mut |p| graph.connect_all(p.sort(), p.indices()));
        Ok(graph)
    }
}

impl fmt::Display for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |f: &mut fmt::Formatter<'_>, args: &[Guard], sep: &str| -> fmt::Result {
            write!(f, "(")?;
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    write!(f, " {} ", sep)?;
                }
                write!(f, "{}", arg)?;
            }
            write!(f, ")")
        };
        match self {
            Guard::True => write!(f, "True"),
            Guard::False => write!(f, "False"),
            Guard::Pred(p) => write!(f, "{}", p),
            Guard::Not(inner) => write!(f, "!{}", inner),
            Guard::And(args) => join(f, args, "&&"),
            Guard::Or(args) => join(f, args, "||"),
        }
    }
}
