//! # wn-algebra: symbolic algebra for colored net arc functions
//!
//! **`wn-algebra`** simplifies the symbolic expressions that label the arcs of
//! colored (well-formed) Petri nets: boolean expressions, guarded values,
//! tuples of class functions and bags of tuples.
//!
//! ## What is an arc function?
//!
//! An arc function maps a binding of typed variables (`X1`, `X2`, .. of some
//! color sort) to a multiset of colored tokens. It is written as a weighted
//! sum of guarded tuples, e.g. `2*[X1 != X2] <X1, S> + <X2, X2>`. Analysis
//! algorithms need such expressions in a normal form, which this library
//! computes by rewriting.
//!
//! ## Key Features
//!
//! - **Closed expression type**: [`LogicalExpr`][crate::expr::LogicalExpr] covers constants, `And`, `Or`, `Not`, composition and guarded values, generic over the atom type.
//! - **Purely functional**: every rewrite builds a new value; nothing is mutated in place.
//! - **Deterministic**: all collections are ordered, so normal forms are reproducible.
//! - **Explicit failures**: type mismatches, unsupported operations and violated preconditions are reported through [`Error`][crate::error::Error].
//! - **Tuple decomposition**: single-index splitting and guard-driven partitioning of tuple positions.
//!
//! ## Basic Usage
//!
//! ```rust
//! use wn_algebra::expr::LogicalExpr;
//! use wn_algebra::types::Lit;
//!
//! let a = LogicalExpr::term(Lit::pos(1));
//! let b = LogicalExpr::term(Lit::pos(2));
//!
//! // False absorbs a conjunction
//! let e = LogicalExpr::and([LogicalExpr::False, LogicalExpr::True, a.clone()]);
//! assert_eq!(e.normalize(), LogicalExpr::False);
//!
//! // Complementary literals cancel out
//! let e = LogicalExpr::or([a.clone(), b, LogicalExpr::term(Lit::neg(1))]);
//! assert!(e.normalize().is_true());
//! ```
//!
//! Tuples are built over a color domain:
//!
//! ```rust
//! use wn_algebra::domain::Domain;
//! use wn_algebra::func::{ElementaryFn, LinearComb};
//! use wn_algebra::tuple::WnTuple;
//! use wn_algebra::types::Sort;
//!
//! let c = Sort::new(0);
//! // <X1 + X2, S>
//! let first = LinearComb::projection(c, 1).with(ElementaryFn::projection(2), 1);
//! let t = WnTuple::simple(Domain::single(c, 2), vec![first, LinearComb::all(c)]).unwrap();
//!
//! // <X1, S> + <X2, S>
//! let split = t.single_index_components_tuples().unwrap();
//! assert_eq!(split.len(), 2);
//! ```
//!
//! ## Core Components
//!
//! - **[`expr`]**: The expression type and its normalization.
//! - **[`nary`]**, **[`compose`]**, **[`guarded`]**: The rewrite rules per node kind.
//! - **[`tuple`]**: Tuples of linear combinations and their decompositions.
//! - **[`bag`]**: Weighted sums of tuples and filtering.
//! - **[`guard`]**: Guards and their dependency graphs.

pub mod bag;
pub mod compose;
pub mod config;
pub mod domain;
pub mod error;
pub mod expr;
pub mod func;
pub mod graph;
pub mod guard;
pub mod guarded;
pub mod nary;
pub mod tuple;
pub mod types;
