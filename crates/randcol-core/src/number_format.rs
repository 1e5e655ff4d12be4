//! Number formats carried through from the source workbook

/// Display format of a numeric cell
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum NumberFormat {
    #[default]
    General,
    /// Format predefined by the spreadsheet application, by id
    BuiltIn(u32),
    /// Format given by its code, such as `dd.mm.yyyy`
    Custom(String),
}

impl NumberFormat {
    /// 14 - mm-dd-yy
    pub const ID_DATE_SHORT: u32 = 14;

    /// First id available to custom formats
    pub const FIRST_CUSTOM_ID: u32 = 164;

    /// Resolve a `numFmtId` as found on a style record.
    ///
    /// Ids below [`Self::FIRST_CUSTOM_ID`] are built in; anything else needs
    /// its code from the workbook's format table.
    pub fn from_id(id: u32, custom_code: Option<&str>) -> Self {
        match (id, custom_code) {
            (0, None) => NumberFormat::General,
            (_, Some(code)) => NumberFormat::Custom(code.to_string()),
            (id, None) if id < Self::FIRST_CUSTOM_ID => NumberFormat::BuiltIn(id),
            _ => NumberFormat::General,
        }
    }

    pub fn is_general(&self) -> bool {
        matches!(self, NumberFormat::General)
    }

    /// Whether cells in this format hold date or time serials.
    ///
    /// Built-in ids cover the date/time slots of the default and East Asian
    /// tables. Custom codes count when a date or time token appears outside
    /// quoted text, escapes and bracketed sections (`[Red]`, `[$-419]`).
    pub fn is_date_format(&self) -> bool {
        match self {
            NumberFormat::General => false,
            NumberFormat::BuiltIn(id) => {
                matches!(id, 14..=22 | 27..=36 | 45..=47 | 50..=58)
            }
            NumberFormat::Custom(code) => code_has_date_tokens(code),
        }
    }
}

fn code_has_date_tokens(code: &str) -> bool {
    // Only the first section decides how positive numbers look
    let mut chars = code.chars();
    let mut in_quotes = false;

    while let Some(c) = chars.next() {
        match c {
            '"' => in_quotes = !in_quotes,
            _ if in_quotes => {}
            '\\' | '_' | '*' => {
                chars.next();
            }
            '[' => {
                // [h], [mm] and [ss] are elapsed-time tokens
                let section: String = chars.by_ref().take_while(|&c| c != ']').collect();
                let lower = section.to_ascii_lowercase();
                if !lower.is_empty() && lower.chars().all(|c| matches!(c, 'h' | 'm' | 's')) {
                    return true;
                }
            }
            ';' => return false,
            c if matches!(c.to_ascii_lowercase(), 'y' | 'm' | 'd' | 'h' | 's') => {
                return true;
            }
            _ => {}
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_id() {
        assert_eq!(NumberFormat::from_id(0, None), NumberFormat::General);
        assert_eq!(NumberFormat::from_id(14, None), NumberFormat::BuiltIn(14));
        assert_eq!(
            NumberFormat::from_id(164, Some("dd.mm.yyyy")),
            NumberFormat::Custom("dd.mm.yyyy".into())
        );
        assert_eq!(NumberFormat::from_id(170, None), NumberFormat::General);
    }

    #[test]
    fn test_builtin_date_ids() {
        for id in [14, 17, 22, 27, 36, 45, 47, 50, 58] {
            assert!(NumberFormat::BuiltIn(id).is_date_format(), "{}", id);
        }
        for id in [0, 1, 2, 10, 23, 37, 44, 49, 59] {
            assert!(!NumberFormat::BuiltIn(id).is_date_format(), "{}", id);
        }
    }

    #[test]
    fn test_custom_date_codes() {
        for code in ["dd.mm.yyyy", "yyyy-mm-dd hh:mm", "[$-419]d mmm yy", "[h]:mm", "mm:ss.0"] {
            assert!(NumberFormat::Custom(code.into()).is_date_format(), "{}", code);
        }
        for code in ["0.00", "#,##0.0\" Нм\"", "[Red]0.0", "0.0\\m", "General", "0.00_);(0.00)"] {
            assert!(!NumberFormat::Custom(code.into()).is_date_format(), "{}", code);
        }
    }
}
