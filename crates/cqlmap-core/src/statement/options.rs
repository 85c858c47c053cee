use crate::error::{ErrorOrigin, InternalError};
use std::fmt::{self, Write as _};

/// Largest TTL the store accepts (20 years, in seconds).
pub const MAX_TTL: u32 = 630_720_000;

///
/// Consistency
/// Consistency level a session applies when executing a write.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Consistency {
    Any,
    One,
    Two,
    Three,
    Quorum,
    All,
    LocalOne,
    LocalQuorum,
    EachQuorum,
    Serial,
    LocalSerial,
}

impl Consistency {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Any => "ANY",
            Self::One => "ONE",
            Self::Two => "TWO",
            Self::Three => "THREE",
            Self::Quorum => "QUORUM",
            Self::All => "ALL",
            Self::LocalOne => "LOCAL_ONE",
            Self::LocalQuorum => "LOCAL_QUORUM",
            Self::EachQuorum => "EACH_QUORUM",
            Self::Serial => "SERIAL",
            Self::LocalSerial => "LOCAL_SERIAL",
        }
    }
}

impl fmt::Display for Consistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// WriteOptions
///
/// Per-write settings for inserts and updates. `ttl` and `timestamp`
/// render as a `USING` clause; `if_not_exists` makes an insert
/// conditional; `consistency` is handed to the session untouched.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct WriteOptions {
    pub ttl: Option<u32>,
    /// Write timestamp in microseconds since the Unix epoch.
    pub timestamp: Option<i64>,
    pub if_not_exists: bool,
    pub consistency: Option<Consistency>,
}

impl WriteOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ttl: None,
            timestamp: None,
            if_not_exists: false,
            consistency: None,
        }
    }

    #[must_use]
    pub const fn ttl(mut self, seconds: u32) -> Self {
        self.ttl = Some(seconds);
        self
    }

    #[must_use]
    pub const fn timestamp(mut self, micros: i64) -> Self {
        self.timestamp = Some(micros);
        self
    }

    #[must_use]
    pub const fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    #[must_use]
    pub const fn consistency(mut self, level: Consistency) -> Self {
        self.consistency = Some(level);
        self
    }

    pub(crate) fn validate(&self) -> Result<(), InternalError> {
        match self.ttl {
            Some(ttl) if ttl > MAX_TTL => Err(InternalError::invalid_argument(
                ErrorOrigin::Statement,
                format!("ttl {ttl} exceeds the maximum of {MAX_TTL} seconds"),
            )),
            _ => Ok(()),
        }
    }

    /// ` USING TTL n AND TIMESTAMP t`, or nothing when neither is set.
    pub(crate) fn write_using(&self, out: &mut String) {
        let mut parts = Vec::with_capacity(2);
        if let Some(ttl) = self.ttl {
            parts.push(format!("TTL {ttl}"));
        }
        if let Some(timestamp) = self.timestamp {
            parts.push(format!("TIMESTAMP {timestamp}"));
        }

        if !parts.is_empty() {
            let _ = write!(out, " USING {}", parts.join(" AND "));
        }
    }
}
