use chrono::{DateTime, TimeDelta, Utc};
use uuid::Uuid;

/// Supplies fresh identifiers on demand.
///
/// Uniqueness is practical, not proven: random generators rely on a large id
/// space, `SequentialIds` on a counter.
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SHORT_ID_LEN: usize = 9;

/// Nine character base36 ids for tables, columns and relationships.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShortIds;

impl IdGenerator for ShortIds {
    fn next_id(&mut self) -> String {
        let mut bits = random_u128();
        (0..SHORT_ID_LEN)
            .map(|_| {
                let c = BASE36[(bits % 36) as usize] as char;
                bits /= 36;
                c
            })
            .collect()
    }
}

/// Hyphenated v4 UUIDs, used for glossary terms and SQL patterns.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic `<prefix>1`, `<prefix>2`, ... ids.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> String {
        let id = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

/// Supplies timestamps for glossary create/update events.
pub trait Clock {
    fn now(&mut self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&mut self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Returns `start`, then advances by `step` on every call. A negative step
/// simulates a clock that jumps backwards.
#[derive(Debug, Clone)]
pub struct SteppingClock {
    next: DateTime<Utc>,
    step: TimeDelta,
}

impl SteppingClock {
    pub fn new(start: DateTime<Utc>, step: TimeDelta) -> Self {
        Self { next: start, step }
    }
}

impl Clock for SteppingClock {
    fn now(&mut self) -> DateTime<Utc> {
        let now = self.next;
        self.next = self.next + self.step;
        now
    }
}

fn random_u128() -> u128 {
    Uuid::new_v4().as_u128()
}

/// Uniform value in `[0, 1)` drawn from the low 53 random bits of a v4 UUID.
pub(crate) fn random_unit() -> f64 {
    const MANTISSA: u32 = 53;
    let bits = (random_u128() as u64) & ((1u64 << MANTISSA) - 1);
    bits as f64 / (1u64 << MANTISSA) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_short_ids_shape() {
        let mut ids = ShortIds;
        let id = ids.next_id();
        assert_eq!(id.len(), 9);
        assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_short_ids_do_not_repeat() {
        let mut ids = ShortIds;
        let seen: HashSet<String> = (0..1000).map(|_| ids.next_id()).collect();
        assert_eq!(seen.len(), 1000);
    }

    #[test]
    fn test_uuid_ids_parse() {
        let id = UuidIds.next_id();
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn test_sequential_ids() {
        let mut ids = SequentialIds::new("t");
        assert_eq!(ids.next_id(), "t1");
        assert_eq!(ids.next_id(), "t2");
    }

    #[test]
    fn test_stepping_clock() {
        let start = DateTime::<Utc>::UNIX_EPOCH;
        let mut clock = SteppingClock::new(start, TimeDelta::seconds(5));
        assert_eq!(clock.now(), start);
        assert_eq!(clock.now(), start + TimeDelta::seconds(5));
    }

    #[test]
    fn test_random_unit_range() {
        for _ in 0..1000 {
            let v = random_unit();
            assert!((0.0..1.0).contains(&v));
        }
    }
}
