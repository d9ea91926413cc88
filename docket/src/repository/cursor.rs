use futures::stream::BoxStream;
use futures::{Stream, StreamExt, TryStreamExt};
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::errors::DocketResult;

/// A lazy stream of typed results.
///
/// Nothing is sent to the store until the stream is first polled. Each call
/// to `stream()` on a repository or query issues the query anew, so a
/// stream is consumed once and re-created to enumerate again. Dropping the
/// stream releases the underlying cursor.
///
/// # Examples
///
/// ```rust,ignore
/// let mut people = repository.query().filter(field("age").gt(30)).stream();
/// while let Some(person) = people.try_next().await? {
///     println!("{}", person.name);
/// }
/// ```
pub struct EntityStream<T> {
    inner: BoxStream<'static, DocketResult<T>>,
}

impl<T> EntityStream<T> {
    pub(crate) fn new(inner: BoxStream<'static, DocketResult<T>>) -> Self {
        EntityStream { inner }
    }

    /// Collects the remaining items, stopping at the first error.
    pub async fn to_vec(self) -> DocketResult<Vec<T>> {
        self.inner.try_collect().await
    }

    /// Returns the next item, if any.
    pub async fn first(mut self) -> DocketResult<Option<T>> {
        self.inner.try_next().await
    }
}

impl<T> Stream for EntityStream<T> {
    type Item = DocketResult<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
