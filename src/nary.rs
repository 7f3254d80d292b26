//! N-ary conjunction and disjunction.
//!
//! Simplification of an `And`/`Or` node runs in two stages. The generic
//! stage is shared by both operators:
//!
//! ```text
//! op(.., op(a, b), ..)  =>  op(.., a, b, ..)     flattening
//! op(.., ide, ..)       =>  op(.., ..)           identity removal
//! op(.., a, .., a, ..)  =>  op(.., a, .., ..)    duplicate removal
//! op()                  =>  ide
//! op(a)                 =>  a
//! ```
//!
//! The refinement stage then applies (shown for `And`, `Or` is dual):
//!
//! ```text
//! a * F * b             =>  F
//! a * !a * b            =>  F                    boolean operands only
//! (a + b) * c * d       =>  a*c*d + b*c*d
//! ```
//!
//! Only conjunctions are distributed, which steers normalization towards a
//! disjunction of conjunctions and keeps the rewriting terminating.

use log::debug;

use crate::expr::{Atom, LogicalExpr};
use crate::types::ElementKind;

/// The two n-ary boolean operators.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum OpKind {
    And,
    Or,
}

impl OpKind {
    /// The identity element: `True` for `And`, `False` for `Or`.
    pub fn identity<A>(self) -> LogicalExpr<A> {
        match self {
            OpKind::And => LogicalExpr::True,
            OpKind::Or => LogicalExpr::False,
        }
    }

    /// The absorbing element: `False` for `And`, `True` for `Or`.
    pub fn zero<A>(self) -> LogicalExpr<A> {
        match self {
            OpKind::And => LogicalExpr::False,
            OpKind::Or => LogicalExpr::True,
        }
    }

    pub fn dual(self) -> OpKind {
        match self {
            OpKind::And => OpKind::Or,
            OpKind::Or => OpKind::And,
        }
    }

    /// Returns `true` if `self` distributes over `other`.
    pub fn is_distributive(self, other: OpKind) -> bool {
        self == other.dual()
    }

    pub fn build<A>(self, args: Vec<LogicalExpr<A>>) -> LogicalExpr<A> {
        match self {
            OpKind::And => LogicalExpr::And(args),
            OpKind::Or => LogicalExpr::Or(args),
        }
    }

    fn name(self) -> &'static str {
        match self {
            OpKind::And => "and",
            OpKind::Or => "or",
        }
    }
}

/// Returns `true` if two operands are recognized as mutual negations.
///
/// The test is syntactic and conservative: `x` against `!x`, and atoms for
/// which [`Atom::is_complement`] holds.
pub fn has_complementary_pair<A: Atom>(args: &[LogicalExpr<A>]) -> bool {
    args.iter().enumerate().any(|(i, a)| {
        args[i + 1..].iter().any(|b| match (a, b) {
            (LogicalExpr::Not(x), y) | (y, LogicalExpr::Not(x)) => **x == *y,
            (LogicalExpr::Term(x), LogicalExpr::Term(y)) => x.is_complement(y),
            _ => false,
        })
    })
}

/// Kind-agnostic stage: flattening, identity and duplicate removal.
///
/// The result is semantically equivalent to `op(args)` and degrades to a
/// non-`op` node when at most one operand is left.
pub(crate) fn generic_simplify<A: Atom>(op: OpKind, args: &[LogicalExpr<A>]) -> LogicalExpr<A> {
    let identity = op.identity::<A>();
    let mut flat: Vec<LogicalExpr<A>> = Vec::with_capacity(args.len());

    let mut push = |e: &LogicalExpr<A>| {
        if *e != identity && !flat.contains(e) {
            flat.push(e.clone());
        }
    };
    for arg in args {
        match (op, arg) {
            (OpKind::And, LogicalExpr::And(inner)) | (OpKind::Or, LogicalExpr::Or(inner)) => {
                inner.iter().for_each(&mut push)
            }
            _ => push(arg),
        }
    }

    match flat.len() {
        0 => {
            debug!("{}() => ide", op.name());
            identity
        }
        1 => {
            debug!("{}(a) => a", op.name());
            flat.remove(0)
        }
        _ => op.build(flat),
    }
}

/// Simplifies an `And`/`Or` node whose operands are already simplified.
pub(crate) fn simplify<A: Atom>(op: OpKind, args: &[LogicalExpr<A>]) -> LogicalExpr<A> {
    let res = generic_simplify(op, args);
    if res.op_kind() != Some(op) {
        return res;
    }
    let args = res.args().unwrap_or_default();

    let zero = op.zero::<A>();
    if args.contains(&zero) {
        debug!("{}(.., zero, ..) => zero", op.name());
        return zero;
    }

    if A::ELEMENT != ElementKind::TupleFunction && has_complementary_pair(args) {
        debug!("{}(.., a, .., !a, ..) => zero", op.name());
        return zero;
    }

    if op == OpKind::And {
        if let Some(res) = distribute(args) {
            return res;
        }
    }

    res
}

/// Distributes a conjunction over its first disjunctive operand.
///
/// ```text
/// e1 * (a + b + ..) * e3  =>  e1*a*e3 + e1*b*e3 + ..
/// ```
fn distribute<A: Atom>(args: &[LogicalExpr<A>]) -> Option<LogicalExpr<A>> {
    let (pos, alternatives) = args.iter().enumerate().find_map(|(i, e)| match e {
        LogicalExpr::Or(alts) => Some((i, alts)),
        _ => None,
    })?;
    debug!(
        "and: distributing over or #{} with {} alternatives",
        pos,
        alternatives.len()
    );

    let terms = alternatives
        .iter()
        .map(|alt| {
            let mut conj = args.to_vec();
            conj[pos] = alt.clone();
            LogicalExpr::And(conj)
        })
        .collect();
    Some(LogicalExpr::Or(terms))
}
