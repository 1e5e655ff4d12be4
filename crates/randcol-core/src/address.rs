//! A1-style cell references, as used in worksheet XML

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::fmt;
use std::str::FromStr;

/// Zero-based position of a worksheet cell.
///
/// Parses from and prints as A1 notation. `$` markers are accepted and
/// dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellAddress {
    pub row: u32,
    pub col: u16,
}

impl CellAddress {
    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// Parse an A1 reference such as `B2` or `$C$10`
    ///
    /// ```
    /// use randcol_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("$C$10").unwrap();
    /// assert_eq!((addr.row, addr.col), (9, 2));
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = |why: &str| Error::InvalidAddress(format!("{} in '{}'", why, s));

        let text = s.trim().replace('$', "");
        let split = text
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(text.len());
        let (letters, digits) = text.split_at(split);

        if letters.is_empty() {
            return Err(invalid("missing column letters"));
        }
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("missing or malformed row number"));
        }

        let row: u32 = digits.parse().map_err(|_| invalid("row number too large"))?;
        if row == 0 || row > MAX_ROWS {
            return Err(invalid("row number out of range"));
        }

        Ok(Self {
            row: row - 1,
            col: letters_to_column(letters).ok_or_else(|| invalid("column out of range"))?,
        })
    }

    pub fn to_a1_string(&self) -> String {
        format!("{}{}", column_to_letters(self.col), self.row + 1)
    }
}

/// `0 -> A`, `25 -> Z`, `26 -> AA`
pub fn column_to_letters(col: u16) -> String {
    let mut letters = Vec::with_capacity(3);
    let mut n = u32::from(col) + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.iter().rev().map(|&b| b as char).collect()
}

/// Inverse of [`column_to_letters`], case-insensitive; `None` past `XFD`
pub fn letters_to_column(letters: &str) -> Option<u16> {
    if letters.is_empty() || letters.len() > 3 {
        return None;
    }
    let number = letters.bytes().try_fold(0u32, |acc, b| {
        b.is_ascii_alphabetic()
            .then(|| acc * 26 + u32::from(b.to_ascii_uppercase() - b'A') + 1)
    })?;
    u16::try_from(number - 1).ok().filter(|&col| col < MAX_COLS)
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1_string())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
