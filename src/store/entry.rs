//! Store Entry Module
//!
//! Defines the structure for individual store entries with TTL support.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::store::RawValue;

// == Value ==
/// What a key holds: a single encoded scalar or a list of strings.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(RawValue),
    List(Vec<String>),
}

// == Entry ==
/// A single store entry with value and metadata.
#[derive(Debug, Clone)]
pub struct Entry {
    /// The stored value
    pub value: Value,
    /// Time of the last write that reset the entry
    pub created_at: DateTime<Utc>,
    /// Expiration instant, None = no expiration
    pub expires_at: Option<DateTime<Utc>>,
}

impl Entry {
    // == Constructor ==
    /// Creates a new entry written at `now` with an optional lifetime.
    pub fn new(value: Value, now: DateTime<Utc>, ttl: Option<chrono::TimeDelta>) -> Self {
        Self {
            value,
            created_at: now,
            expires_at: ttl.and_then(|ttl| now.checked_add_signed(ttl)),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// An entry is expired once `now >= expires_at`: the moment the TTL has
    /// fully elapsed the key reads as absent.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns remaining lifetime, or None if no expiration is set.
    ///
    /// Returns `Some(Duration::ZERO)` once the entry has expired.
    pub fn ttl_remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.expires_at
            .map(|expires| (expires - now).to_std().unwrap_or(Duration::ZERO))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Scalar;
    use chrono::TimeDelta;

    fn scalar(s: &str) -> Value {
        Value::Scalar(Scalar::from(s).encode())
    }

    #[test]
    fn test_entry_creation_no_ttl() {
        let now = Utc::now();
        let entry = Entry::new(scalar("test_value"), now, None);

        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired(now + TimeDelta::days(365)));
        assert!(entry.ttl_remaining(now).is_none());
    }

    #[test]
    fn test_entry_expiration() {
        let now = Utc::now();
        let entry = Entry::new(scalar("test_value"), now, Some(TimeDelta::seconds(10)));

        assert!(!entry.is_expired(now + TimeDelta::seconds(9)));
        assert!(entry.is_expired(now + TimeDelta::seconds(11)));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = Utc::now();
        let entry = Entry::new(scalar("test"), now, Some(TimeDelta::seconds(10)));

        // Entry should be expired when current time >= expires_at
        assert!(entry.is_expired(now + TimeDelta::seconds(10)));
    }

    #[test]
    fn test_ttl_remaining() {
        let now = Utc::now();
        let entry = Entry::new(scalar("test"), now, Some(TimeDelta::seconds(10)));

        assert_eq!(
            entry.ttl_remaining(now + TimeDelta::seconds(4)),
            Some(Duration::from_secs(6))
        );
        assert_eq!(
            entry.ttl_remaining(now + TimeDelta::seconds(30)),
            Some(Duration::ZERO)
        );
    }
}
