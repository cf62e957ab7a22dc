//! `?ordering=` query parameter: a field name with an optional `-` for descending.

use std::str::FromStr;

use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ordering<F> {
    pub field: F,
    pub descending: bool,
}

impl<F: FromStr> Ordering<F> {
    /// Parse `name` or `-name`; unknown fields are a validation error.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let (descending, name) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        let field = name
            .parse()
            .map_err(|_| AppError::validation(format!("Cannot order by '{}'", name)))?;
        Ok(Self { field, descending })
    }

    /// Parse an optional parameter, falling back to `default`.
    pub fn parse_or(raw: Option<&str>, default: Self) -> AppResult<Self> {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Self::parse(raw),
            None => Ok(default),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    enum Field {
        Name,
    }

    impl FromStr for Field {
        type Err = ();
        fn from_str(s: &str) -> Result<Self, ()> {
            match s {
                "name" => Ok(Field::Name),
                _ => Err(()),
            }
        }
    }

    #[test]
    fn test_parse_direction() {
        let asc = Ordering::<Field>::parse("name").unwrap();
        assert!(!asc.descending);
        let desc = Ordering::<Field>::parse("-name").unwrap();
        assert!(desc.descending);
        assert_eq!(desc.field, Field::Name);
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(matches!(
            Ordering::<Field>::parse("password"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_default_when_blank() {
        let default = Ordering { field: Field::Name, descending: true };
        assert!(Ordering::parse_or(Some("  "), default).unwrap().descending);
    }
}
