use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_SYMBOL_LEN: usize = 12;

/// Normalized stock ticker symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Parse and normalize a ticker to uppercase ASCII.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized = input.trim().to_ascii_uppercase();
        if normalized.is_empty() {
            return Err(ValidationError::EmptySymbol);
        }

        let len = normalized.chars().count();
        if len > MAX_SYMBOL_LEN {
            return Err(ValidationError::SymbolTooLong {
                len,
                max: MAX_SYMBOL_LEN,
            });
        }

        for (index, ch) in normalized.chars().enumerate() {
            if index == 0 && !ch.is_ascii_alphabetic() {
                return Err(ValidationError::SymbolInvalidStart { ch });
            }
            if !(ch.is_ascii_alphanumeric() || ch == '.' || ch == '-') {
                return Err(ValidationError::SymbolInvalidChar { ch, index });
            }
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Symbol {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Symbol {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        let symbol = Symbol::parse("  brk.b ").expect("should parse");
        assert_eq!(symbol.as_str(), "BRK.B");
    }

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(
            Symbol::parse("   "),
            Err(ValidationError::EmptySymbol)
        ));
    }

    #[test]
    fn rejects_leading_digit() {
        assert!(matches!(
            Symbol::parse("3M"),
            Err(ValidationError::SymbolInvalidStart { ch: '3' })
        ));
    }

    #[test]
    fn rejects_embedded_punctuation() {
        let err = Symbol::parse("AA/PL").expect_err("must fail");
        assert!(matches!(err, ValidationError::SymbolInvalidChar { ch: '/', index: 2 }));
    }

    #[test]
    fn rejects_overlong_symbol() {
        let err = Symbol::parse("ABCDEFGHIJKLM").expect_err("must fail");
        assert!(matches!(err, ValidationError::SymbolTooLong { len: 13, max: 12 }));
    }
}
