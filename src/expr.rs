//! Boolean-valued expression trees and their normalization.
//!
//! A [`LogicalExpr`] is a closed tree over atoms of some type `A`: the two
//! constants, n-ary conjunction and disjunction, negation, sequential
//! composition, and guarded wrappers. Simplification is purely functional:
//! [`LogicalExpr::gen_simplify`] rewrites the root once, assuming the
//! operands are already simplified, and [`LogicalExpr::normalize`] applies it
//! bottom-up until a fixpoint is reached.
//!
//! # Example
//!
//! ```
//! use wn_algebra::expr::LogicalExpr;
//! use wn_algebra::types::Lit;
//!
//! let a = LogicalExpr::term(Lit::pos(1));
//! let b = LogicalExpr::term(Lit::pos(2));
//! let c = LogicalExpr::term(Lit::pos(3));
//!
//! // (a + b) * c  ==>  a*c + b*c
//! let e = LogicalExpr::and([LogicalExpr::or([a.clone(), b.clone()]), c.clone()]);
//! let expected = LogicalExpr::or([
//!     LogicalExpr::and([a, c.clone()]),
//!     LogicalExpr::and([b, c]),
//! ]);
//! assert_eq!(e.normalize(), expected);
//! ```

use std::fmt;

use log::debug;

use crate::compose;
use crate::config::Config;
use crate::error::Result;
use crate::guard::Guard;
use crate::guarded::{GuardTarget, GuardedExpr, Reduced};
use crate::nary::{self, OpKind};
use crate::types::ElementKind;

/// Leaf values of a [`LogicalExpr`].
///
/// Besides identity, atoms answer the few semantic questions the rewrite
/// rules need. All of them default to the conservative answer.
pub trait Atom: Clone + Eq + fmt::Debug + fmt::Display {
    /// Color structure an atom maps into.
    type Domain: Clone + Eq + fmt::Debug;

    /// Kind of the values this atom denotes.
    const ELEMENT: ElementKind = ElementKind::Boolean;

    /// Returns `true` if `self` and `other` are known to be mutual negations.
    fn is_complement(&self, _other: &Self) -> bool {
        false
    }

    /// Returns `true` for the neutral element of composition.
    fn is_identity(&self) -> bool {
        false
    }

    /// Returns `true` if the atom does not depend on its domain.
    fn is_constant(&self) -> bool {
        false
    }

    /// Returns `true` if the atom is provably different from the zero function.
    fn is_nonzero(&self) -> bool {
        false
    }

    /// Returns `true` if the atom is known to denote the zero function.
    fn is_false(&self) -> bool {
        false
    }

    /// Checks that `guard` only mentions variables the atom is defined over.
    fn check_guard(&self, _guard: &Guard) -> Result<()> {
        Ok(())
    }

    fn codomain(&self) -> Self::Domain;

    /// Re-expresses a constant atom over another color structure.
    ///
    /// Used by the `k ∘ x => k` shortcut with the codomain of `x`: the
    /// constant is rebound to what `x` produces, which becomes its input
    /// structure. Its own values are left untouched.
    fn rebind(&self, codomain: &Self::Domain) -> Self;
}

/// Values that can be simplified and carry a false element.
///
/// Implemented by [`LogicalExpr`] and by [`Bag`][crate::bag::Bag], which lets
/// [`GuardedExpr`] reduce either.
pub trait Simplify: Clone + PartialEq {
    /// One rewrite step at the root, assuming operands are already simplified.
    fn gen_simplify(&self) -> Self;

    /// Full normalization.
    fn normalize(&self) -> Self {
        self.gen_simplify()
    }

    /// Sufficient syntactic condition for being always true.
    fn is_true(&self) -> bool;

    /// Sufficient syntactic condition for being always false.
    fn is_false(&self) -> bool;

    /// The false element of this value's own type.
    fn false_value(&self) -> Self;
}

/// A boolean-valued expression over atoms of type `A`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogicalExpr<A> {
    True,
    False,
    Term(A),
    Not(Box<LogicalExpr<A>>),
    And(Vec<LogicalExpr<A>>),
    Or(Vec<LogicalExpr<A>>),
    /// `left ∘ right`: `right` is applied first.
    Compose(Box<LogicalExpr<A>>, Box<LogicalExpr<A>>),
    Guarded(GuardedExpr<LogicalExpr<A>>),
}

impl<A> LogicalExpr<A> {
    pub fn term(atom: A) -> Self {
        LogicalExpr::Term(atom)
    }

    pub fn and(args: impl IntoIterator<Item = Self>) -> Self {
        LogicalExpr::And(args.into_iter().collect())
    }

    pub fn or(args: impl IntoIterator<Item = Self>) -> Self {
        LogicalExpr::Or(args.into_iter().collect())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(expr: Self) -> Self {
        LogicalExpr::Not(Box::new(expr))
    }

    pub fn compose(left: Self, right: Self) -> Self {
        LogicalExpr::Compose(Box::new(left), Box::new(right))
    }

    pub fn is_constant_true(&self) -> bool {
        matches!(self, LogicalExpr::True)
    }

    pub fn is_constant_false(&self) -> bool {
        matches!(self, LogicalExpr::False)
    }

    /// Operator kind of an `And`/`Or` node.
    pub fn op_kind(&self) -> Option<OpKind> {
        match self {
            LogicalExpr::And(_) => Some(OpKind::And),
            LogicalExpr::Or(_) => Some(OpKind::Or),
            _ => None,
        }
    }

    /// Operands of an `And`/`Or` node.
    pub fn args(&self) -> Option<&[LogicalExpr<A>]> {
        match self {
            LogicalExpr::And(args) | LogicalExpr::Or(args) => Some(args),
            _ => None,
        }
    }

    /// Returns `true` for conjunctions.
    pub fn is_and_form(&self) -> bool {
        matches!(self, LogicalExpr::And(_))
    }

    /// Returns `true` for a conjunction of atoms only.
    pub fn is_normal_and_form(&self) -> bool {
        match self {
            LogicalExpr::And(args) => args.iter().all(|e| matches!(e, LogicalExpr::Term(_))),
            _ => false,
        }
    }
}

impl<A: Atom> LogicalExpr<A> {
    /// Wraps `expr` with a guard; `None` means "always true".
    pub fn guarded(expr: Self, guard: Option<Guard>) -> Result<Self> {
        Ok(LogicalExpr::Guarded(GuardedExpr::build(expr, guard)?))
    }

    pub fn element_kind(&self) -> ElementKind {
        A::ELEMENT
    }

    /// Codomain of the expression, `None` for constants.
    pub fn codomain(&self) -> Option<A::Domain> {
        match self {
            LogicalExpr::True | LogicalExpr::False => None,
            LogicalExpr::Term(a) => Some(a.codomain()),
            LogicalExpr::Not(e) => e.codomain(),
            LogicalExpr::And(args) | LogicalExpr::Or(args) => args.iter().find_map(|e| e.codomain()),
            LogicalExpr::Compose(left, _) => left.codomain(),
            LogicalExpr::Guarded(g) => g.expr().codomain(),
        }
    }

    /// Sufficient syntactic condition for being always true.
    ///
    /// A conjunction is true iff every operand is the `True` constant.
    pub fn is_true(&self) -> bool {
        match self {
            LogicalExpr::True => true,
            LogicalExpr::False | LogicalExpr::Term(_) | LogicalExpr::Compose(..) => false,
            LogicalExpr::Not(e) => e.is_false(),
            LogicalExpr::And(args) => args.iter().all(|e| e.is_constant_true()),
            LogicalExpr::Or(args) => args.iter().any(|e| e.is_constant_true()),
            LogicalExpr::Guarded(g) => g.is_unconditional() && g.expr().is_true(),
        }
    }

    /// Sufficient syntactic condition for being always false.
    ///
    /// A conjunction is false if it contains the `False` constant.
    pub fn is_false(&self) -> bool {
        match self {
            LogicalExpr::False => true,
            LogicalExpr::True => false,
            LogicalExpr::Term(a) => a.is_false(),
            LogicalExpr::Not(e) => e.is_true(),
            LogicalExpr::And(args) => args.iter().any(|e| e.is_constant_false()),
            LogicalExpr::Or(args) => args.iter().all(|e| e.is_constant_false()),
            LogicalExpr::Compose(left, right) => left.is_false() || right.is_false(),
            LogicalExpr::Guarded(g) => g.is_void() || g.expr().is_false(),
        }
    }

    /// One rewrite step at the root.
    ///
    /// Operands are assumed to be simplified already. The result may be of a
    /// different variant than `self` (e.g. an `And` collapsing to `False`).
    pub fn gen_simplify(&self) -> Self {
        match self {
            LogicalExpr::Term(a) if a.is_false() => {
                debug!("{} => F", a);
                LogicalExpr::False
            }
            LogicalExpr::True | LogicalExpr::False | LogicalExpr::Term(_) => self.clone(),
            LogicalExpr::Not(e) => simplify_not(e),
            LogicalExpr::And(args) => nary::simplify(OpKind::And, args),
            LogicalExpr::Or(args) => nary::simplify(OpKind::Or, args),
            LogicalExpr::Compose(left, right) => compose::simplify(left, right),
            LogicalExpr::Guarded(g) => match g.reduce() {
                Reduced::Expr(e) => e,
                Reduced::Guarded(g) => LogicalExpr::Guarded(g),
            },
        }
    }

    /// Simplifies the operands, then the root, once.
    fn simplify_bottom_up(&self) -> Self {
        let rebuilt = match self {
            LogicalExpr::True | LogicalExpr::False | LogicalExpr::Term(_) => return self.gen_simplify(),
            LogicalExpr::Not(e) => LogicalExpr::not(e.simplify_bottom_up()),
            LogicalExpr::And(args) => LogicalExpr::And(args.iter().map(|e| e.simplify_bottom_up()).collect()),
            LogicalExpr::Or(args) => LogicalExpr::Or(args.iter().map(|e| e.simplify_bottom_up()).collect()),
            LogicalExpr::Compose(left, right) => {
                LogicalExpr::compose(left.simplify_bottom_up(), right.simplify_bottom_up())
            }
            LogicalExpr::Guarded(g) => LogicalExpr::Guarded(g.map_expr(|e| e.simplify_bottom_up())),
        };
        rebuilt.gen_simplify()
    }

    /// Normalizes the expression with the default [`Config`].
    pub fn normalize(&self) -> Self {
        self.normalize_with(&Config::default())
    }

    /// Applies bottom-up simplification until nothing changes.
    ///
    /// Stops after `config.max_rounds` passes.
    pub fn normalize_with(&self, config: &Config) -> Self {
        let mut current = self.clone();
        for round in 0..config.max_rounds {
            let next = current.simplify_bottom_up();
            if next == current {
                debug!("normalize: fixpoint after {} rounds", round);
                return current;
            }
            current = next;
        }
        debug!("normalize: stopped after {} rounds", config.max_rounds);
        current
    }
}

fn simplify_not<A: Atom>(e: &LogicalExpr<A>) -> LogicalExpr<A> {
    match e {
        LogicalExpr::True => {
            debug!("!T => F");
            LogicalExpr::False
        }
        LogicalExpr::False => {
            debug!("!F => T");
            LogicalExpr::True
        }
        LogicalExpr::Not(inner) => {
            debug!("!!x => x");
            (**inner).clone()
        }
        _ => LogicalExpr::not(e.clone()),
    }
}

impl<A: Atom> Simplify for LogicalExpr<A> {
    fn gen_simplify(&self) -> Self {
        LogicalExpr::gen_simplify(self)
    }

    fn normalize(&self) -> Self {
        LogicalExpr::normalize(self)
    }

    fn is_true(&self) -> bool {
        LogicalExpr::is_true(self)
    }

    fn is_false(&self) -> bool {
        LogicalExpr::is_false(self)
    }

    fn false_value(&self) -> Self {
        LogicalExpr::False
    }
}

impl<A: Atom> GuardTarget for LogicalExpr<A> {
    /// Every atom the guard can see must accept it. The right operand of a
    /// composition is applied first, so only its atoms are checked.
    fn check_guard(&self, guard: &Guard) -> Result<()> {
        match self {
            LogicalExpr::True | LogicalExpr::False => Ok(()),
            LogicalExpr::Term(a) => a.check_guard(guard),
            LogicalExpr::Not(e) => e.check_guard(guard),
            LogicalExpr::And(args) | LogicalExpr::Or(args) => args.iter().try_for_each(|e| e.check_guard(guard)),
            LogicalExpr::Compose(_, right) => right.check_guard(guard),
            LogicalExpr::Guarded(g) => g.expr().check_guard(guard),
        }
    }
}

impl<A: fmt::Display> fmt::Display for LogicalExpr<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |f: &mut fmt::Formatter<'_>, args: &[LogicalExpr<A>], sep: &str| -> fmt::Result {
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
            LogicalExpr::True => write!(f, "T"),
            LogicalExpr::False => write!(f, "F"),
            LogicalExpr::Term(a) => write!(f, "{}", a),
            LogicalExpr::Not(e) => write!(f, "!{}", e),
            LogicalExpr::And(args) => join(f, args, "*"),
            LogicalExpr::Or(args) => join(f, args, "+"),
            LogicalExpr::Compose(left, right) => write!(f, "({} . {})", left, right),
            LogicalExpr::Guarded(g) => write!(f, "{}", g),
        }
    }
}
