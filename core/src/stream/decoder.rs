use crate::telemetry::log::LogManager;

const TERMINATOR: u8 = b'\n';

/// Reassembles newline-terminated records from arbitrarily split byte chunks.
///
/// Bytes are buffered undecoded, so a multi-byte UTF-8 sequence split across two
/// chunks is reassembled before it is turned into text.
pub struct FrameLineDecoder {
    carry: Vec<u8>,
    consumed: usize,
    logger: LogManager,
}

impl FrameLineDecoder {
    pub fn new() -> Self {
        Self {
            carry: Vec::new(),
            consumed: 0,
            logger: LogManager::new("decoder"),
        }
    }

    /// Appends a chunk and returns the lines it completed, in arrival order.
    ///
    /// Lines are extracted lazily; anything the iterator does not yield stays buffered
    /// and is returned by the next call.
    pub fn push<'a>(&'a mut self, chunk: &[u8]) -> DecodedLines<'a> {
        self.compact();
        self.carry.extend_from_slice(chunk);
        DecodedLines { decoder: self }
    }

    /// Bytes of the trailing, not yet terminated fragment. Complete lines still
    /// waiting to be yielded are not counted.
    pub fn pending(&self) -> usize {
        let remaining = &self.carry[self.consumed..];
        match remaining.iter().rposition(|&byte| byte == TERMINATOR) {
            Some(last) => remaining.len() - last - 1,
            None => remaining.len(),
        }
    }

    /// Ends the stream. Complete lines that were buffered but not yet yielded are
    /// drained and returned; only the partial final record is dropped.
    pub fn finish(&mut self) -> StreamTail {
        let discarded_bytes = self.pending();
        let lines: Vec<String> = DecodedLines { decoder: self }.collect();
        if discarded_bytes > 0 {
            self.logger.diagnostic(&format!(
                "discarding {} byte unterminated fragment at end of stream",
                discarded_bytes
            ));
        }
        self.reset();
        StreamTail {
            lines,
            discarded_bytes,
        }
    }

    pub fn reset(&mut self) {
        self.carry.clear();
        self.consumed = 0;
    }

    fn next_line(&mut self) -> Option<String> {
        loop {
            let remaining = &self.carry[self.consumed..];
            let offset = remaining.iter().position(|&byte| byte == TERMINATOR)?;
            let raw = &remaining[..offset];
            self.consumed += offset + 1;

            let text = String::from_utf8_lossy(raw);
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }

    fn compact(&mut self) {
        if self.consumed > 0 {
            self.carry.drain(..self.consumed);
            self.consumed = 0;
        }
    }
}

impl Default for FrameLineDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// What was left in a [`FrameLineDecoder`] when its stream ended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamTail {
    pub lines: Vec<String>,
    pub discarded_bytes: usize,
}

/// Lazy iterator over the complete lines currently buffered in a [`FrameLineDecoder`].
pub struct DecodedLines<'a> {
    decoder: &'a mut FrameLineDecoder,
}

impl Iterator for DecodedLines<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        self.decoder.next_line()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn decode_all(chunks: &[&[u8]]) -> Vec<String> {
        let mut decoder = FrameLineDecoder::new();
        let mut lines = Vec::new();
        for chunk in chunks {
            lines.extend(decoder.push(chunk));
        }
        lines
    }

    #[test]
    fn single_chunk_with_many_lines() {
        let lines = decode_all(&[b"{\"a\":1}\n{\"b\":2}\n{\"c\":3}\n"]);
        assert_eq!(lines, vec!["{\"a\":1}", "{\"b\":2}", "{\"c\":3}"]);
    }

    #[test]
    fn chunk_without_terminator_yields_nothing() {
        let mut decoder = FrameLineDecoder::new();
        assert_eq!(decoder.push(b"{\"status\":").count(), 0);
        assert_eq!(decoder.pending(), 10);
        let lines: Vec<_> = decoder.push(b"\"ok\"}\n").collect();
        assert_eq!(lines, vec!["{\"status\":\"ok\"}"]);
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn terminator_on_chunk_boundary() {
        let lines = decode_all(&[b"first", b"\n", b"second\n", b"\nthird", b"\n"]);
        assert_eq!(lines, vec!["first", "second", "third"]);
    }

    #[test]
    fn empty_lines_and_carriage_returns_are_suppressed() {
        let lines = decode_all(&[b"\n\n  \r\nalpha\r\n\n\nbeta\n"]);
        assert_eq!(lines, vec!["alpha", "beta"]);
    }

    #[test]
    fn unterminated_tail_is_never_emitted() {
        let mut decoder = FrameLineDecoder::new();
        let lines: Vec<_> = decoder.push(b"complete\npartial").collect();
        assert_eq!(lines, vec!["complete"]);
        assert_eq!(
            decoder.finish(),
            StreamTail {
                lines: Vec::new(),
                discarded_bytes: 7
            }
        );
        assert_eq!(decoder.pending(), 0);
        assert_eq!(decoder.push(b"\n").count(), 0);
    }

    #[test]
    fn multibyte_character_split_across_chunks() {
        let text = "{\"status\":\"Ωmega\"}\n".as_bytes();
        let split = text.iter().position(|&b| b >= 0x80).unwrap() + 1;
        let lines = decode_all(&[&text[..split], &text[split..]]);
        assert_eq!(lines, vec!["{\"status\":\"Ωmega\"}"]);
    }

    #[test]
    fn unconsumed_lines_survive_until_next_push() {
        let mut decoder = FrameLineDecoder::new();
        let first = decoder.push(b"one\ntwo\n").next();
        assert_eq!(first.as_deref(), Some("one"));
        let rest: Vec<_> = decoder.push(b"three\n").collect();
        assert_eq!(rest, vec!["two", "three"]);
    }

    #[test]
    fn arbitrary_chunking_preserves_records() {
        let records: Vec<String> = (0..40)
            .map(|i| format!("{{\"objects\":[[[{i},0,0],[0,{i},0]]],\"object_count\":1}}"))
            .collect();
        let stream: Vec<u8> = records
            .iter()
            .flat_map(|record| record.bytes().chain(std::iter::once(b'\n')))
            .collect();

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let mut decoder = FrameLineDecoder::new();
            let mut lines = Vec::new();
            let mut offset = 0;
            while offset < stream.len() {
                let size = rng.gen_range(1..=32).min(stream.len() - offset);
                lines.extend(decoder.push(&stream[offset..offset + size]));
                offset += size;
            }
            assert_eq!(lines, records);
            assert_eq!(decoder.finish(), StreamTail::default());
        }
    }

    #[test]
    fn finish_drains_complete_lines_left_unread() {
        let mut decoder = FrameLineDecoder::new();
        let first: Vec<_> = decoder.push(b"one\ntwo\npartial").take(1).collect();
        assert_eq!(first, vec!["one"]);
        assert_eq!(decoder.pending(), 7);

        let tail = decoder.finish();
        assert_eq!(tail.lines, vec!["two"]);
        assert_eq!(tail.discarded_bytes, 7);
        assert_eq!(decoder.pending(), 0);
    }
}
