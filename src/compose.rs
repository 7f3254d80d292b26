//! Sequential composition of boolean-valued functions.
//!
//! Rules applied to `left ∘ right`, in order:
//!
//! ```text
//! id ∘ x          =>  x
//! x ∘ id          =>  x
//! F ∘ x, x ∘ F    =>  F
//! k ∘ x           =>  k'              k constant, x provably non-zero,
//!                                     k' is k over the codomain of x
//! (a + b) ∘ c     =>  a∘c + b∘c
//! c ∘ (a + b)     =>  c∘a + c∘b
//! ```

use log::debug;

use crate::expr::{Atom, LogicalExpr};

/// Generic stage: identity atoms on either side are dropped.
fn generic_simplify<A: Atom>(left: &LogicalExpr<A>, right: &LogicalExpr<A>) -> Option<LogicalExpr<A>> {
    if let LogicalExpr::Term(a) = left {
        if a.is_identity() {
            debug!("id . x => x");
            return Some(right.clone());
        }
    }
    if let LogicalExpr::Term(b) = right {
        if b.is_identity() {
            debug!("x . id => x");
            return Some(left.clone());
        }
    }
    None
}

/// Returns `true` if `e` is known not to be the zero function.
fn is_nonzero<A: Atom>(e: &LogicalExpr<A>) -> bool {
    match e {
        LogicalExpr::Term(a) => a.is_nonzero(),
        e => e.is_true(),
    }
}

/// Simplifies `left ∘ right`, whose operands are already simplified.
pub(crate) fn simplify<A: Atom>(left: &LogicalExpr<A>, right: &LogicalExpr<A>) -> LogicalExpr<A> {
    if let Some(res) = generic_simplify(left, right) {
        return res;
    }

    if left.is_false() || right.is_false() {
        debug!("F . x => F");
        return LogicalExpr::False;
    }

    if let LogicalExpr::Term(k) = left {
        if k.is_constant() && is_nonzero(right) {
            debug!("k . x => k");
            return match right.codomain() {
                Some(codomain) => LogicalExpr::Term(k.rebind(&codomain)),
                None => left.clone(),
            };
        }
    }

    if let LogicalExpr::Or(alts) = left {
        debug!("(a + b) . c => a.c + b.c");
        return LogicalExpr::Or(
            alts.iter()
                .map(|a| LogicalExpr::compose(a.clone(), right.clone()))
                .collect(),
        );
    }
    if let LogicalExpr::Or(alts) = right {
        debug!("c . (a + b) => c.a + c.b");
        return LogicalExpr::Or(
            alts.iter()
                .map(|b| LogicalExpr::compose(left.clone(), b.clone()))
                .collect(),
        );
    }

    LogicalExpr::compose(left.clone(), right.clone())
}
