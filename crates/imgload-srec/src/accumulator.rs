//! Coalescing of contiguous data records into segments.

/// A completed run of contiguous data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlushedSegment {
    pub start: u64,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
enum State {
    #[default]
    Idle,
    Accumulating {
        start: u64,
        next: u64,
        bytes: Vec<u8>,
    },
}

/// State machine that joins data records while their addresses line up.
///
/// A record whose address differs from where the previous one ended closes
/// the open segment and starts a new one. Scoped to a single load.
#[derive(Debug, Default)]
pub struct SegmentAccumulator {
    state: State,
}

impl SegmentAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self.state, State::Idle)
    }

    /// Start address of the open segment.
    #[must_use]
    pub const fn start(&self) -> Option<u64> {
        match self.state {
            State::Idle => None,
            State::Accumulating { start, .. } => Some(start),
        }
    }

    /// Address the next record must have to extend the open segment.
    #[must_use]
    pub const fn expected_next(&self) -> Option<u64> {
        match self.state {
            State::Idle => None,
            State::Accumulating { next, .. } => Some(next),
        }
    }

    /// Append `data` found at `address`.
    ///
    /// Returns the previous segment if `address` is not contiguous with it.
    pub fn push(&mut self, address: u64, data: &[u8]) -> Option<FlushedSegment> {
        let flushed = match self.expected_next() {
            Some(next) if next != address => self.flush(),
            _ => None,
        };

        let end = address.wrapping_add(data.len() as u64);
        if let State::Accumulating { next, bytes, .. } = &mut self.state {
            bytes.extend_from_slice(data);
            *next = end;
        } else {
            self.state = State::Accumulating {
                start: address,
                next: end,
                bytes: data.to_vec(),
            };
        }

        flushed
    }

    /// Close the open segment, if any, and return to idle.
    pub fn flush(&mut self) -> Option<FlushedSegment> {
        match std::mem::take(&mut self.state) {
            State::Idle => None,
            State::Accumulating { start, bytes, .. } => Some(FlushedSegment { start, bytes }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contiguous_records_coalesce() {
        let mut acc = SegmentAccumulator::new();
        assert!(acc.is_idle());
        assert_eq!(acc.push(0x1000, &[1, 2, 3, 4]), None);
        assert_eq!(acc.push(0x1004, &[5, 6]), None);
        assert_eq!(acc.start(), Some(0x1000));
        assert_eq!(acc.expected_next(), Some(0x1006));

        let seg = acc.flush().unwrap();
        assert_eq!(seg.start, 0x1000);
        assert_eq!(seg.bytes, [1, 2, 3, 4, 5, 6]);
        assert!(acc.is_idle());
        assert_eq!(acc.flush(), None);
    }

    #[test]
    fn test_gap_flushes_previous() {
        let mut acc = SegmentAccumulator::new();
        assert_eq!(acc.push(0x1000, &[1, 2, 3, 4]), None);
        let flushed = acc.push(0x1100, &[5, 6, 7, 8]).unwrap();
        assert_eq!(flushed.start, 0x1000);
        assert_eq!(flushed.bytes, [1, 2, 3, 4]);
        assert_eq!(acc.start(), Some(0x1100));

        let last = acc.flush().unwrap();
        assert_eq!(last.start, 0x1100);
        assert_eq!(last.bytes, [5, 6, 7, 8]);
    }

    #[test]
    fn test_backwards_address_is_a_gap() {
        let mut acc = SegmentAccumulator::new();
        acc.push(0x2000, &[0xAA; 4]);
        let flushed = acc.push(0x1FFC, &[0xBB; 4]);
        assert_eq!(flushed.map(|s| s.start), Some(0x2000));
    }

    #[test]
    fn test_empty_record_opens_segment() {
        let mut acc = SegmentAccumulator::new();
        assert_eq!(acc.push(0x3000, &[]), None);
        assert!(!acc.is_idle());
        assert_eq!(acc.expected_next(), Some(0x3000));
        // Still contiguous: the next record lands at the same address.
        assert_eq!(acc.push(0x3000, &[9]), None);
        let seg = acc.flush().unwrap();
        assert_eq!((seg.start, seg.bytes), (0x3000, vec![9]));
    }
}
