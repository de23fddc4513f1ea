//! Lazy page-token pagination.
//!
//! Meet list endpoints return a batch of items plus an optional
//! `nextPageToken`. [`paginate`] turns a page fetcher into a flat stream of
//! items. The next page is requested only when the consumer has drained the
//! current one, so stopping early never fetches pages that are not needed.

use std::future::Future;

use futures::stream::{self, Stream, TryStreamExt};

/// One page of a list response.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_page_token: Option<String>) -> Self {
        Self {
            items,
            next_page_token,
        }
    }
}

enum Cursor {
    First,
    Next(String),
    Exhausted,
}

/// Flatten successive pages into a stream of items.
///
/// `fetch` receives `None` for the first page and the previous page's token
/// afterwards. An empty or absent token ends the sequence; an error from
/// `fetch` is yielded once and ends it too.
pub fn paginate<T, E, F, Fut>(fetch: F) -> impl Stream<Item = Result<T, E>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, E>>,
{
    stream::try_unfold((fetch, Cursor::First), |(mut fetch, cursor)| async move {
        let token = match cursor {
            Cursor::First => None,
            Cursor::Next(token) => Some(token),
            Cursor::Exhausted => return Ok::<_, E>(None),
        };

        let page = fetch(token).await?;
        let next = match page.next_page_token {
            Some(token) if !token.is_empty() => Cursor::Next(token),
            _ => Cursor::Exhausted,
        };

        let items = stream::iter(page.items.into_iter().map(Ok::<T, E>));
        Ok(Some((items, (fetch, next))))
    })
    .try_flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use futures::{pin_mut, TryStreamExt};

    /// Serve canned pages, chaining them with tokens "1", "2", ...
    fn canned(
        pages: Vec<Vec<u32>>,
        calls: Arc<AtomicUsize>,
    ) -> impl FnMut(Option<String>) -> futures::future::Ready<Result<Page<u32>, String>> {
        move |token| {
            calls.fetch_add(1, Ordering::SeqCst);
            let index: usize = token.map(|t| t.parse().unwrap()).unwrap_or(0);
            let next = (index + 1 < pages.len()).then(|| (index + 1).to_string());
            futures::future::ready(Ok(Page::new(pages[index].clone(), next)))
        }
    }

    #[tokio::test]
    async fn test_drains_every_page() {
        let calls = Arc::new(AtomicUsize::new(0));
        let items: Vec<u32> = paginate(canned(vec![vec![1, 2], vec![], vec![3]], calls.clone()))
            .try_collect()
            .await
            .unwrap();

        assert_eq!(items, vec![1, 2, 3]);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_stops_fetching_when_consumer_stops() {
        let calls = Arc::new(AtomicUsize::new(0));
        let stream = paginate(canned(vec![vec![1], vec![2], vec![3]], calls.clone()));
        pin_mut!(stream);

        assert_eq!(stream.try_next().await.unwrap(), Some(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(stream.try_next().await.unwrap(), Some(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_error_ends_stream() {
        let mut served = 0;
        let stream = paginate(move |_token: Option<String>| {
            served += 1;
            let result = if served == 1 {
                Ok(Page::new(vec![1u32], Some("next".to_string())))
            } else {
                Err("boom".to_string())
            };
            futures::future::ready(result)
        });
        pin_mut!(stream);

        assert_eq!(stream.try_next().await, Ok(Some(1)));
        assert_eq!(stream.try_next().await, Err("boom".to_string()));
    }

    #[tokio::test]
    async fn test_empty_token_is_last_page() {
        let stream = paginate(|_token: Option<String>| {
            futures::future::ready(Ok::<_, String>(Page::new(vec![7u32], Some(String::new()))))
        });
        let items: Vec<u32> = stream.try_collect().await.unwrap();
        assert_eq!(items, vec![7]);
    }
}
