//! Build matrix types

use std::fmt;

/// One axis value the build is repeated over
///
/// Platforms without parametrization produce a single baseline entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatrixEntry(Option<String>);

impl MatrixEntry {
    /// The "no variation" sentinel
    pub fn baseline() -> Self {
        Self(None)
    }

    pub fn value(value: impl Into<String>) -> Self {
        Self(Some(value.into()))
    }

    pub fn as_value(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl fmt::Display for MatrixEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_value().unwrap_or("default"))
    }
}
