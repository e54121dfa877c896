//! Named fallback chains.
//!
//! Every "try this, then that" decision in the engine (which role a record
//! has, which rate applies, which time fields give the pay window) is an
//! ordered list of [`Strategy`] values. The name of the strategy that
//! produced a value travels with it, so a result can always say where it
//! came from.

/// One step of a fallback chain.
pub struct Strategy<C: ?Sized, T> {
    /// Stable name reported alongside the resolved value.
    pub name: &'static str,
    /// Produces a value, or `None` to defer to the next strategy.
    pub resolve: fn(&C) -> Option<T>,
}

impl<C: ?Sized, T> Clone for Strategy<C, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: ?Sized, T> Copy for Strategy<C, T> {}

impl<C: ?Sized, T> std::fmt::Debug for Strategy<C, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Strategy").field("name", &self.name).finish()
    }
}

/// A value together with the strategy that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution<T> {
    /// The resolved value.
    pub value: T,
    /// Name of the strategy that produced it.
    pub strategy: &'static str,
}

/// Runs the chain in order and returns the first value produced.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{Strategy, resolve_first};
///
/// let chain: [Strategy<i32, &str>; 2] = [
///     Strategy { name: "negative", resolve: |n| (*n < 0).then_some("neg") },
///     Strategy { name: "any", resolve: |_| Some("other") },
/// ];
///
/// let resolution = resolve_first(&chain, &5).unwrap();
/// assert_eq!(resolution.value, "other");
/// assert_eq!(resolution.strategy, "any");
/// ```
pub fn resolve_first<C: ?Sized, T>(chain: &[Strategy<C, T>], context: &C) -> Option<Resolution<T>> {
    chain.iter().find_map(|strategy| {
        (strategy.resolve)(context).map(|value| Resolution {
            value,
            strategy: strategy.name,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> [Strategy<str, usize>; 3] {
        [
            Strategy {
                name: "empty",
                resolve: |s: &str| s.is_empty().then_some(0),
            },
            Strategy {
                name: "short",
                resolve: |s: &str| (s.len() < 4).then_some(s.len()),
            },
            Strategy {
                name: "long",
                resolve: |s: &str| Some(s.len() * 10),
            },
        ]
    }

    #[test]
    fn test_first_matching_strategy_wins() {
        let resolution = resolve_first(&chain(), "ab").unwrap();
        assert_eq!(resolution, Resolution { value: 2, strategy: "short" });
    }

    #[test]
    fn test_falls_through_to_last() {
        let resolution = resolve_first(&chain(), "abcdef").unwrap();
        assert_eq!(resolution.strategy, "long");
        assert_eq!(resolution.value, 60);
    }

    #[test]
    fn test_empty_chain_resolves_nothing() {
        let chain: [Strategy<str, usize>; 0] = [];
        assert!(resolve_first(&chain, "x").is_none());
    }
}
