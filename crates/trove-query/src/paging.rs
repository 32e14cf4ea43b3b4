//! Paging Policy
//!
//! Bounds an ordered sequence from caller-supplied `limit`/`offset` and
//! the resolver's `(default_limit, max_limit)` pair:
//!
//! - `offset` is 1-based; `offset > 1` skips `offset - 1` elements.
//! - `limit > 0` caps the page, but `limit > max_limit` is an error and
//!   is never clamped.
//! - an absent or non-positive `limit` falls back to `default_limit`.
//! - an offset past the end yields an empty page.
//!
//! Errors already in the sequence are passed through and do not count
//! towards the skip or the page size.

use crate::args::Arguments;
use crate::error::{QueryError, QueryResult};
use crate::pipeline::QuadStream;
use trove_config::PagingConfig;

/// Caller's raw paging arguments
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PageRequest {
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self { limit, offset }
    }

    /// Read the `limit` and `offset` arguments
    pub fn from_arguments(args: &Arguments) -> QueryResult<Self> {
        Ok(Self {
            limit: args.optional_int("limit")?,
            offset: args.optional_int("offset")?,
        })
    }
}

/// Resolver-declared page size bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Limits {
    pub const fn new(default_limit: usize, max_limit: usize) -> Self {
        Self {
            default_limit,
            max_limit,
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        PagingConfig::default().into()
    }
}

impl From<PagingConfig> for Limits {
    fn from(config: PagingConfig) -> Self {
        Self::new(config.default_limit, config.max_limit)
    }
}

/// Effective slice of a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagingPolicy {
    Window { skip: usize, take: usize },
    /// Counting and full-facet resolvers consume everything
    Unbounded,
}

impl PagingPolicy {
    /// Compute the window for `request` under `limits`.
    pub fn resolve(request: PageRequest, limits: Limits) -> QueryResult<Self> {
        let take = match request.limit {
            Some(limit) if limit > 0 => {
                let limit = usize::try_from(limit).unwrap_or(usize::MAX);
                if limit > limits.max_limit {
                    return Err(QueryError::invalid_argument(
                        "limit",
                        format!(
                            "requested limit exceeds the maximum limit ({} > {})",
                            limit, limits.max_limit
                        ),
                    ));
                }
                limit
            }
            _ => limits.default_limit,
        };

        let skip = match request.offset {
            Some(offset) if offset > 1 => usize::try_from(offset - 1).unwrap_or(usize::MAX),
            _ => 0,
        };

        Ok(Self::Window { skip, take })
    }

    /// Page size, `None` when unbounded
    pub fn take(&self) -> Option<usize> {
        match self {
            Self::Window { take, .. } => Some(*take),
            Self::Unbounded => None,
        }
    }

    /// Page an arbitrary fallible sequence
    pub fn page<I, T, E>(self, sequence: I) -> Paged<I>
    where
        I: Iterator<Item = Result<T, E>>,
    {
        match self {
            Self::Window { skip, take } => Paged {
                inner: sequence,
                skip,
                remaining: Some(take),
            },
            Self::Unbounded => Paged {
                inner: sequence,
                skip: 0,
                remaining: None,
            },
        }
    }

    /// Page a quad stream
    pub fn apply(self, stream: QuadStream<'_>) -> QuadStream<'_> {
        match self {
            Self::Unbounded => stream,
            window => Box::new(window.page(stream)),
        }
    }
}

/// Iterator adapter produced by [`PagingPolicy::page`]
#[derive(Debug)]
pub struct Paged<I> {
    inner: I,
    skip: usize,
    remaining: Option<usize>,
}

impl<I, T, E> Iterator for Paged<I>
where
    I: Iterator<Item = Result<T, E>>,
{
    type Item = Result<T, E>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == Some(0) {
            return None;
        }
        loop {
            match self.inner.next()? {
                Err(e) => return Some(Err(e)),
                Ok(_) if self.skip > 0 => self.skip -= 1,
                Ok(item) => {
                    if let Some(remaining) = self.remaining.as_mut() {
                        *remaining -= 1;
                    }
                    return Some(Ok(item));
                }
            }
        }
    }
}

/// Page `sequence` in one call.
pub fn apply_paging<I, T, E>(
    sequence: I,
    limit: Option<i64>,
    offset: Option<i64>,
    default_limit: usize,
    max_limit: usize,
) -> QueryResult<Paged<I>>
where
    I: Iterator<Item = Result<T, E>>,
{
    let policy = PagingPolicy::resolve(
        PageRequest::new(limit, offset),
        Limits::new(default_limit, max_limit),
    )?;
    Ok(policy.page(sequence))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use test_case::test_case;

    fn thousand() -> impl Iterator<Item = Result<u32, Infallible>> + std::fmt::Debug {
        (1..=1000).map(Ok)
    }

    fn collect(paged: Paged<impl Iterator<Item = Result<u32, Infallible>>>) -> Vec<u32> {
        paged.map(|r| r.unwrap()).collect()
    }

    #[test]
    fn test_defaults_apply_without_arguments() {
        let page = collect(apply_paging(thousand(), None, None, 10, 100).unwrap());
        assert_eq!(page, (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn test_last_full_page() {
        let page = collect(apply_paging(thousand(), Some(100), Some(991), 10, 100).unwrap());
        assert_eq!(page, (991..=1000).collect::<Vec<_>>());
    }

    #[test]
    fn test_limit_above_max_is_rejected() {
        let err = apply_paging(thousand(), Some(101), None, 10, 100).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(err
            .to_string()
            .contains("requested limit exceeds the maximum limit"));
    }

    #[test]
    fn test_offset_past_end_is_empty() {
        let page = collect(apply_paging(thousand(), None, Some(1001), 10, 100).unwrap());
        assert!(page.is_empty());
    }

    #[test_case(None, 10 ; "absent")]
    #[test_case(Some(0), 10 ; "zero")]
    #[test_case(Some(-5), 10 ; "negative")]
    #[test_case(Some(1), 1 ; "one")]
    #[test_case(Some(100), 100 ; "max")]
    fn test_effective_limit(limit: Option<i64>, expected: usize) {
        let policy = PagingPolicy::resolve(PageRequest::new(limit, None), Limits::new(10, 100));
        assert_eq!(
            policy.unwrap(),
            PagingPolicy::Window {
                skip: 0,
                take: expected
            }
        );
    }

    #[test_case(None, 0 ; "absent")]
    #[test_case(Some(0), 0 ; "zero")]
    #[test_case(Some(1), 0 ; "first element")]
    #[test_case(Some(2), 1 ; "second element")]
    fn test_offset_is_one_based(offset: Option<i64>, skip: usize) {
        let policy = PagingPolicy::resolve(PageRequest::new(None, offset), Limits::new(10, 100));
        assert_eq!(policy.unwrap(), PagingPolicy::Window { skip, take: 10 });
    }

    #[test]
    fn test_errors_do_not_consume_budget() {
        let items: Vec<Result<u32, &str>> = vec![Ok(1), Err("a"), Ok(2), Ok(3), Err("b"), Ok(4)];
        let policy = PagingPolicy::Window { skip: 1, take: 2 };

        let out: Vec<_> = policy.page(items.into_iter()).collect();
        assert_eq!(out, vec![Err("a"), Ok(2), Ok(3)]);
    }

    #[test]
    fn test_unbounded_passes_everything() {
        let out = PagingPolicy::Unbounded.page(thousand()).count();
        assert_eq!(out, 1000);
    }

    #[test]
    fn test_request_from_arguments_rejects_strings() {
        let args = Arguments::new().with("limit", "10");
        assert!(PageRequest::from_arguments(&args)
            .unwrap_err()
            .is_invalid_argument());

        let args = Arguments::new().with("limit", 5).with("offset", 3);
        assert_eq!(
            PageRequest::from_arguments(&args).unwrap(),
            PageRequest::new(Some(5), Some(3))
        );
    }
}
