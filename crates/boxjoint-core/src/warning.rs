//! Design-rule findings.
//!
//! Every feasibility check reports through the same record shape:
//! `{severity, code, message, fix}`. Checks are pure functions returning a
//! [`Warnings`] value; results from several checks are combined with
//! [`Warnings::concat`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a finding is.
///
/// `Error` means the caller should block export. `Warn` and `Info` are
/// advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warn,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
        }
    }

    pub fn is_blocking(&self) -> bool {
        matches!(self, Severity::Error)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One finding with a machine-checkable code and a suggested fix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub severity: Severity,
    pub code: String,
    pub message: String,
    pub fix: String,
}

impl Warning {
    pub fn new(
        severity: Severity,
        code: impl Into<String>,
        message: impl Into<String>,
        fix: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            code: code.into(),
            message: message.into(),
            fix: fix.into(),
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>, fix: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message, fix)
    }

    pub fn warn(code: impl Into<String>, message: impl Into<String>, fix: impl Into<String>) -> Self {
        Self::new(Severity::Warn, code, message, fix)
    }

    pub fn info(code: impl Into<String>, message: impl Into<String>, fix: impl Into<String>) -> Self {
        Self::new(Severity::Info, code, message, fix)
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} (fix: {})",
            self.severity, self.code, self.message, self.fix
        )
    }
}

/// Immutable, ordered collection of findings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Warnings(Vec<Warning>);

impl Warnings {
    pub fn none() -> Self {
        Self(Vec::new())
    }

    pub fn one(warning: Warning) -> Self {
        Self(vec![warning])
    }

    /// `Warnings::one(w)` when `condition` holds, otherwise empty.
    pub fn when(condition: bool, warning: impl FnOnce() -> Warning) -> Self {
        if condition {
            Self::one(warning())
        } else {
            Self::none()
        }
    }

    /// Appends `other` after `self`, preserving order.
    #[must_use]
    pub fn concat(self, other: Warnings) -> Warnings {
        let mut items = self.0;
        items.extend(other.0);
        Self(items)
    }

    /// Drops repeated findings, keeping the first occurrence of each.
    #[must_use]
    pub fn dedup(self) -> Warnings {
        let mut items: Vec<Warning> = Vec::with_capacity(self.0.len());
        for w in self.0 {
            if !items.contains(&w) {
                items.push(w);
            }
        }
        Self(items)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Warning> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.0.iter().any(|w| w.severity.is_blocking())
    }

    pub fn errors(&self) -> impl Iterator<Item = &Warning> {
        self.0.iter().filter(|w| w.severity.is_blocking())
    }

    pub fn contains_code(&self, code: &str) -> bool {
        self.0.iter().any(|w| w.code == code)
    }

    pub fn as_slice(&self) -> &[Warning] {
        &self.0
    }
}

impl From<Vec<Warning>> for Warnings {
    fn from(items: Vec<Warning>) -> Self {
        Self(items)
    }
}

impl FromIterator<Warning> for Warnings {
    fn from_iter<I: IntoIterator<Item = Warning>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl FromIterator<Warnings> for Warnings {
    fn from_iter<I: IntoIterator<Item = Warnings>>(iter: I) -> Self {
        iter.into_iter().fold(Warnings::none(), Warnings::concat)
    }
}

impl IntoIterator for Warnings {
    type Item = Warning;
    type IntoIter = std::vec::IntoIter<Warning>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Warnings {
    type Item = &'a Warning;
    type IntoIter = std::slice::Iter<'a, Warning>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
