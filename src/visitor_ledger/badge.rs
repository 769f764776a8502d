use chrono::{DateTime, Utc};
use log::debug;
use regex::Regex;
use std::sync::Mutex;

const SUFFIX_MODULUS: i64 = 1_000_000;

/// Issues registration codes: the configured prefix followed by the last six
/// digits of the Unix time in milliseconds, e.g. `REG482913`.
///
/// Codes from one generator are strictly increasing in their underlying
/// millisecond value, so two registrations in the same millisecond still get
/// distinct codes.
pub struct BadgeGenerator {
    prefix: String,
    format: Regex,
    last_millis: Mutex<Option<i64>>,
}

impl BadgeGenerator {
    pub fn new<S: Into<String>>(prefix: S) -> Self {
        let prefix = prefix.into();
        let format = Regex::new(&format!(r"^{}\d{{6}}$", regex::escape(&prefix)))
            .expect("escaped prefix is a valid pattern");
        Self {
            prefix,
            format,
            last_millis: Mutex::new(None),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Code for a registration made at `at`.
    pub fn next_code(&self, at: DateTime<Utc>) -> String {
        let mut millis = at.timestamp_millis();
        match self.last_millis.lock() {
            Ok(mut last) => {
                if let Some(prev) = *last {
                    if millis <= prev {
                        millis = prev + 1;
                    }
                }
                *last = Some(millis);
            }
            Err(_) => debug!("Badge generator state poisoned, using raw timestamp"),
        }
        format!("{}{:06}", self.prefix, millis.rem_euclid(SUFFIX_MODULUS))
    }

    /// Like [`next_code`](Self::next_code), but skips codes for which
    /// `is_taken` returns true.
    ///
    /// The six-digit suffix repeats every 10^6 ms, so a code issued about
    /// 16.7 minutes earlier can come round again. Returns `None` only when
    /// every suffix is taken.
    pub fn next_unused_code<F>(&self, at: DateTime<Utc>, is_taken: F) -> Option<String>
    where
        F: Fn(&str) -> bool,
    {
        for _ in 0..SUFFIX_MODULUS {
            let code = self.next_code(at);
            if !is_taken(&code) {
                return Some(code);
            }
            debug!("Registration code {} already issued, advancing", code);
        }
        None
    }

    /// Whether `code` has this generator's shape.
    pub fn is_valid(&self, code: &str) -> bool {
        self.format.is_match(code)
    }
}
