//! Guarded values: an expression paired with the condition it applies under.
//!
//! Reduction collapses the pair as soon as the guard's truth value is
//! known syntactically:
//!
//! ```text
//! [T] e  =>  e
//! [F] e  =>  F
//! [g] F  =>  F
//! [g] e  =>  [g'] e'     (g', e' normalized)
//! ```

use std::fmt;

use log::debug;

use crate::error::Result;
use crate::expr::Simplify;
use crate::guard::Guard;

/// Values that accept a guard.
pub trait GuardTarget: Simplify {
    /// Checks that `guard` can restrict `self`.
    ///
    /// The default accepts every guard.
    fn check_guard(&self, _guard: &Guard) -> Result<()> {
        Ok(())
    }
}

/// A value of type `E` restricted by an optional guard.
///
/// A missing guard means "always true".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardedExpr<E> {
    expr: Box<E>,
    guard: Option<Guard>,
}

/// Outcome of [`GuardedExpr::reduce`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reduced<E> {
    /// The guard vanished; only the expression remains.
    Expr(E),
    /// The guard is still needed.
    Guarded(GuardedExpr<E>),
}

impl<E> GuardedExpr<E> {
    pub fn expr(&self) -> &E {
        &self.expr
    }

    pub fn guard(&self) -> Option<&Guard> {
        self.guard.as_ref()
    }

    /// Returns `true` if the guard is missing or trivially true.
    pub fn is_unconditional(&self) -> bool {
        match &self.guard {
            None => true,
            Some(g) => g.normalize().is_trivial(),
        }
    }

    /// Returns `true` if the guard is trivially false.
    pub fn is_void(&self) -> bool {
        self.guard.as_ref().is_some_and(|g| g.normalize().is_false())
    }

    /// Rebuilds the wrapper around a transformed expression, keeping the guard.
    pub(crate) fn map_expr(&self, f: impl FnOnce(&E) -> E) -> Self {
        Self {
            expr: Box::new(f(&self.expr)),
            guard: self.guard.clone(),
        }
    }
}

impl<E: GuardTarget> GuardedExpr<E> {
    /// Pairs `expr` with `guard`.
    ///
    /// Fails with [`Error::TypeMismatch`][crate::error::Error::TypeMismatch]
    /// if the guard cannot restrict this kind of expression.
    pub fn build(expr: E, guard: Option<Guard>) -> Result<Self> {
        if let Some(g) = &guard {
            expr.check_guard(g)?;
        }
        Ok(Self {
            expr: Box::new(expr),
            guard,
        })
    }
}

impl<E: Simplify> GuardedExpr<E> {
    /// Collapses the pair according to the guard's and the expression's
    /// truth values.
    ///
    /// The guard is inspected first, so that a false guard skips the
    /// normalization of the expression.
    pub fn reduce(&self) -> Reduced<E> {
        let guard = match &self.guard {
            None => {
                debug!("[_] e => e");
                return Reduced::Expr((*self.expr).clone());
            }
            Some(g) => g.normalize(),
        };

        if guard.is_trivial() {
            debug!("[T] e => e");
            return Reduced::Expr((*self.expr).clone());
        }
        if guard.is_false() {
            debug!("[F] e => F");
            return Reduced::Expr(self.expr.false_value());
        }

        let expr = self.expr.normalize();
        if expr.is_false() {
            debug!("[g] F => F");
            return Reduced::Expr(expr);
        }

        Reduced::Guarded(Self {
            expr: Box::new(expr),
            guard: Some(guard),
        })
    }
}

impl<E: fmt::Display> fmt::Display for GuardedExpr<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.guard {
            None => write!(f, "{}", self.expr),
            Some(g) => write!(f, "[{}] {}", g, self.expr),
        }
    }
}
