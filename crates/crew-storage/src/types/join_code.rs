//! Join code type.

/// Number of characters in a join code.
pub const JOIN_CODE_LEN: usize = 8;

/// A project's shareable join code: 8 uppercase alphanumeric characters.
///
/// Codes are globally unique for the lifetime of the system; the store
/// keeps a code reserved even after its project is deleted, so stale
/// links stay inert.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct JoinCode(pub String);

impl std::fmt::Display for JoinCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for JoinCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != JOIN_CODE_LEN {
            return Err(format!("join code must be {} characters", JOIN_CODE_LEN));
        }
        if !s
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        {
            return Err("join code must be uppercase alphanumeric".to_string());
        }
        Ok(JoinCode(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_valid_codes() {
        let code: JoinCode = "A1B2C3D4".parse().unwrap();
        assert_eq!(code.to_string(), "A1B2C3D4");
    }

    #[test]
    fn parse_rejects_wrong_length() {
        assert!("A1B2C3".parse::<JoinCode>().is_err());
        assert!("A1B2C3D4E".parse::<JoinCode>().is_err());
        assert!("".parse::<JoinCode>().is_err());
    }

    #[test]
    fn parse_rejects_lowercase_and_symbols() {
        assert!("a1b2c3d4".parse::<JoinCode>().is_err());
        assert!("A1B2C3D!".parse::<JoinCode>().is_err());
        assert!("A1B2 3D4".parse::<JoinCode>().is_err());
    }
}
