//! Tuning knobs for normalization and tuple expansion.

/// Bounds applied by [`LogicalExpr::normalize_with`][crate::expr::LogicalExpr::normalize_with]
/// and [`WnTuple::single_index_components_tuples_with`][crate::tuple::WnTuple::single_index_components_tuples_with].
///
/// # Examples
///
/// ```
/// use wn_algebra::config::Config;
///
/// let config = Config {
///     max_expansion: 16,
///     ..Config::default()
/// };
/// assert_eq!(config.max_rounds, 64);
/// ```
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Config {
    /// Maximum number of bottom-up rewrite passes before normalization stops
    /// (default: 64). Every pass that does not reach the fixpoint makes
    /// progress, so this only guards against pathological inputs.
    pub max_rounds: usize,
    /// Maximum number of tuples a cartesian expansion may produce
    /// (default: 4096).
    pub max_expansion: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_rounds: 64,
            max_expansion: 4096,
        }
    }
}
