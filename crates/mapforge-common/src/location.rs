//! Locations of user declarations.
//!
//! The engine never sees syntax. Hosts hand it a `SymbolLocation` for every
//! declaration (mapper method, parameter, configured member) and diagnostics
//! are attached to the location of the declaration that triggered them.

use serde::Serialize;

/// Byte span within a file.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct SourceSpan {
    pub start: u32,
    pub length: u32,
}

impl SourceSpan {
    pub const fn new(start: u32, length: u32) -> Self {
        Self { start, length }
    }
}

/// A user declaration that diagnostics can point at.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct SymbolLocation {
    /// Display name of the symbol, e.g. `CarMapper.MapToDto`.
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<SourceSpan>,
}

impl SymbolLocation {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            file: None,
            span: None,
        }
    }

    #[must_use]
    pub fn with_file(mut self, file: impl Into<String>, span: SourceSpan) -> Self {
        self.file = Some(file.into());
        self.span = Some(span);
        self
    }

    /// Location of a nested declaration, e.g. a parameter of a method.
    #[must_use]
    pub fn child(&self, name: &str) -> Self {
        Self {
            symbol: format!("{}.{}", self.symbol, name),
            file: self.file.clone(),
            span: self.span,
        }
    }
}
