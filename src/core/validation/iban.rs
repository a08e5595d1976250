//! IBAN checksum validation

/// Capability that decides whether an IBAN is acceptable
///
/// Returns a human readable reason when it is not.
pub trait IbanCheck: Send + Sync {
    fn check(&self, iban: &str) -> Result<(), String>;
}

/// ISO 13616 structure plus ISO 7064 mod-97-10 checksum
///
/// Expects the electronic format: no spaces, two uppercase country letters,
/// two check digits, then 11 to 30 alphanumerics.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mod97IbanCheck;

impl IbanCheck for Mod97IbanCheck {
    fn check(&self, iban: &str) -> Result<(), String> {
        let bytes = iban.as_bytes();
        if !(15..=34).contains(&bytes.len()) {
            return Err(format!("{iban} has an invalid length"));
        }
        if !bytes[..2].iter().all(u8::is_ascii_uppercase) || !bytes[2..4].iter().all(u8::is_ascii_digit) {
            return Err(format!("{iban} does not start with a country code and check digits"));
        }
        if !bytes.iter().all(u8::is_ascii_alphanumeric) {
            return Err(format!("{iban} contains invalid characters"));
        }

        // Move the first four characters to the end and fold the number mod 97
        let mut remainder: u32 = 0;
        for b in bytes[4..].iter().chain(&bytes[..4]) {
            let value = match b {
                b'0'..=b'9' => u32::from(b - b'0'),
                _ => u32::from(b.to_ascii_uppercase() - b'A') + 10,
            };
            remainder = if value >= 10 {
                (remainder * 100 + value) % 97
            } else {
                (remainder * 10 + value) % 97
            };
        }

        if remainder == 1 {
            Ok(())
        } else {
            Err(format!("{iban} has an invalid checksum"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("NL91ABNA0417164300")]
    #[test_case("DE89370400440532013000")]
    #[test_case("GB29NWBK60161331926819")]
    #[test_case("BE68539007547034")]
    fn test_valid_ibans(iban: &str) {
        assert!(Mod97IbanCheck.check(iban).is_ok());
    }

    #[test]
    fn test_single_digit_change_fails() {
        let err = Mod97IbanCheck.check("NL91ABNA0417164301").unwrap_err();
        assert!(err.contains("checksum"));
    }

    #[test_case("NL91 ABNA 0417 1643 00"; "spaces")]
    #[test_case("nl91ABNA0417164300"; "lowercase country")]
    #[test_case("NL91"; "too short")]
    #[test_case("NL9XABNA0417164300"; "letter in check digits")]
    fn test_malformed_ibans(iban: &str) {
        assert!(Mod97IbanCheck.check(iban).is_err());
    }
}
