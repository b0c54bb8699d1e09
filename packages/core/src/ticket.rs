//! Ticket identifiers and their allocation.

use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Ticket number handed to a submitter; unique for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(pub u64);

impl TicketId {
    /// Parse a ticket ID from a string.
    pub fn parse(s: &str) -> Result<Self, std::num::ParseIntError> {
        Ok(Self(s.trim().parse()?))
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl FromStr for TicketId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for TicketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// First ticket handed out in sequential mode.
pub const DEFAULT_TICKET_BASE: u64 = 1001;

/// Bounds of the legacy random mode (four-digit tickets).
pub const DEFAULT_RANDOM_MIN: u64 = 1000;
pub const DEFAULT_RANDOM_MAX: u64 = 9999;

/// Random draws attempted before falling back to probing for a free ticket.
const MAX_RANDOM_DRAWS: usize = 64;

/// How tickets are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TicketMode {
    /// Strictly increasing counter starting at `base`.
    Sequential { base: u64 },
    /// Random draw from `min..=max`, re-drawn when the ticket was already issued.
    ///
    /// Kept for compatibility with deployments that printed short random tickets.
    /// The range is finite, so the allocator eventually reports exhaustion.
    Random { min: u64, max: u64 },
}

impl Default for TicketMode {
    fn default() -> Self {
        Self::Sequential {
            base: DEFAULT_TICKET_BASE,
        }
    }
}

impl TicketMode {
    pub fn random() -> Self {
        Self::Random {
            min: DEFAULT_RANDOM_MIN,
            max: DEFAULT_RANDOM_MAX,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TicketError {
    #[error("no free tickets left in {min}..={max}")]
    Exhausted { min: u64, max: u64 },

    #[error("invalid ticket range {min}..={max}")]
    InvalidRange { min: u64, max: u64 },

    #[error("random source failed: {0}")]
    Entropy(String),
}

/// Hands out ticket ids, never repeating one.
#[derive(Debug)]
pub struct TicketAllocator {
    mode: TicketMode,
    next: u64,
    count: usize,
    /// Ids drawn in random mode; sequential ids never repeat on their own.
    drawn: HashSet<u64>,
}

impl TicketAllocator {
    pub fn new(mode: TicketMode) -> Result<Self, TicketError> {
        let next = match mode {
            TicketMode::Sequential { base } => base,
            TicketMode::Random { min, max } => {
                if min > max {
                    return Err(TicketError::InvalidRange { min, max });
                }
                min
            }
        };

        Ok(Self {
            mode,
            next,
            count: 0,
            drawn: HashSet::new(),
        })
    }

    pub fn sequential() -> Self {
        Self {
            mode: TicketMode::default(),
            next: DEFAULT_TICKET_BASE,
            count: 0,
            drawn: HashSet::new(),
        }
    }

    pub fn mode(&self) -> TicketMode {
        self.mode
    }

    /// Number of tickets handed out so far.
    pub fn issued(&self) -> usize {
        self.count
    }

    /// Produce the next ticket.
    pub fn next(&mut self) -> Result<TicketId, TicketError> {
        let value = match self.mode {
            TicketMode::Sequential { base } => {
                let value = self.next;
                self.next = value.checked_add(1).ok_or(TicketError::Exhausted {
                    min: base,
                    max: u64::MAX,
                })?;
                value
            }
            TicketMode::Random { min, max } => {
                let value = self.draw_unique(min, max)?;
                self.drawn.insert(value);
                value
            }
        };

        self.count += 1;
        Ok(TicketId(value))
    }

    fn draw_unique(&self, min: u64, max: u64) -> Result<u64, TicketError> {
        let span = (max - min).saturating_add(1);
        if self.drawn.len() as u64 >= span {
            return Err(TicketError::Exhausted { min, max });
        }

        let mut candidate = min;
        for _ in 0..MAX_RANDOM_DRAWS {
            candidate = min + random_u64()? % span;
            if !self.drawn.contains(&candidate) {
                return Ok(candidate);
            }
        }

        // Dense range: walk forward from the last draw to the next free slot.
        for offset in 0..span {
            let slot = min + (candidate - min + offset) % span;
            if !self.drawn.contains(&slot) {
                return Ok(slot);
            }
        }

        Err(TicketError::Exhausted { min, max })
    }
}

impl Default for TicketAllocator {
    fn default() -> Self {
        Self::sequential()
    }
}

fn random_u64() -> Result<u64, TicketError> {
    let mut buf = [0u8; 8];
    getrandom::fill(&mut buf).map_err(|e| TicketError::Entropy(e.to_string()))?;
    Ok(u64::from_le_bytes(buf))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::disallowed_methods)]

    use super::*;

    #[test]
    fn sequential_starts_at_base_and_increments() -> Result<(), TicketError> {
        let mut tickets = TicketAllocator::sequential();
        assert_eq!(tickets.next()?, TicketId(1001));
        assert_eq!(tickets.next()?, TicketId(1002));
        assert_eq!(tickets.issued(), 2);
        Ok(())
    }

    #[test]
    fn sequential_mode_keeps_no_per_ticket_state() -> Result<(), TicketError> {
        let mut tickets = TicketAllocator::sequential();
        for _ in 0..10_000 {
            tickets.next()?;
        }
        assert_eq!(tickets.issued(), 10_000);
        assert!(tickets.drawn.is_empty());
        assert_eq!(tickets.next()?, TicketId(11_001));
        Ok(())
    }

    #[test]
    fn random_mode_never_repeats_and_reports_exhaustion() -> Result<(), TicketError> {
        let mut tickets = TicketAllocator::new(TicketMode::Random { min: 10, max: 19 })?;
        let mut seen = HashSet::new();
        for _ in 0..10 {
            let id = tickets.next()?;
            assert!((10..=19).contains(&id.value()));
            assert!(seen.insert(id));
        }

        assert_eq!(
            tickets.next(),
            Err(TicketError::Exhausted { min: 10, max: 19 })
        );
        Ok(())
    }

    #[test]
    fn random_mode_rejects_inverted_range() {
        let err = TicketAllocator::new(TicketMode::Random { min: 5, max: 4 }).unwrap_err();
        assert_eq!(err, TicketError::InvalidRange { min: 5, max: 4 });
    }

    #[test]
    fn ticket_id_parses_from_path_segment() {
        assert_eq!("1001".parse::<TicketId>().ok(), Some(TicketId(1001)));
        assert!(TicketId::parse("abc").is_err());
    }
}
