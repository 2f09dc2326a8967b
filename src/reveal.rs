//! Progressive reveal of reply text.
//!
//! A reply arrives in one piece, but is shown word by word.  [`Reveal`] is the
//! lazy sequence of growing prefixes; [`Reveal::stream`] paces it for display.
//! Neither touches the network, so a front-end can consume the chunks on its
//! own schedule or drop them to cancel.

use std::time::Duration;

use futures::Stream;
use futures::stream;

use crate::observability::REVEAL_CHUNKS;

/// Pause between revealed chunks.
pub const DEFAULT_CHUNK_DELAY: Duration = Duration::from_millis(30);

/// Marker renderers append to a chunk that is not the last one.
pub const CURSOR: &str = "▌";

/// Joins the whitespace-separated words of `text` with single spaces.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lazy sequence of progressively longer prefixes of a reply.
///
/// For `"Great  job\n- keep"` the chunks are `"Great"`, `"Great job"`,
/// `"Great job -"`, `"Great job - keep"`.  Text without words yields a single
/// empty chunk, so the last chunk always equals [`Reveal::full_text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reveal {
    full: String,
    boundaries: Vec<usize>,
    emitted: usize,
}

impl Reveal {
    /// Creates the reveal sequence for `text`.
    pub fn new(text: &str) -> Self {
        let full = normalize_whitespace(text);
        let mut boundaries: Vec<usize> = full
            .char_indices()
            .filter(|(_, c)| *c == ' ')
            .map(|(idx, _)| idx)
            .collect();
        boundaries.push(full.len());
        Self {
            full,
            boundaries,
            emitted: 0,
        }
    }

    /// The whitespace-normalized text the sequence ends with.
    pub fn full_text(&self) -> &str {
        &self.full
    }

    /// Total number of chunks, including ones already yielded.
    pub fn chunk_count(&self) -> usize {
        self.boundaries.len()
    }

    /// Paces the remaining chunks, sleeping `delay` before every chunk but
    /// the first.
    ///
    /// Each item is `(prefix, is_final)`.
    pub fn stream(self, delay: Duration) -> impl Stream<Item = (String, bool)> {
        stream::unfold((self, true), move |(mut reveal, first)| async move {
            if reveal.emitted >= reveal.boundaries.len() {
                return None;
            }
            if !first && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let is_final = reveal.emitted + 1 == reveal.boundaries.len();
            let chunk = reveal.next()?;
            Some(((chunk, is_final), (reveal, false)))
        })
    }
}

impl Iterator for Reveal {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let end = *self.boundaries.get(self.emitted)?;
        self.emitted += 1;
        REVEAL_CHUNKS.click();
        Some(self.full[..end].to_string())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.boundaries.len() - self.emitted;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Reveal {}
