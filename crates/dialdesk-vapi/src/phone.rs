/// Normalize a dialable number to E.164 with a US bias: bare 10-digit numbers
/// get a +1 country code, 11 digits starting with 1 get a plus, and anything
/// longer is assumed to already carry a country code. A heuristic, not
/// validation; the provider rejects numbers it cannot dial.
pub fn format_to_e164(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() == 11 && digits.starts_with('1') {
        return format!("+{}", digits);
    }

    if digits.len() == 10 {
        return format!("+1{}", digits);
    }

    if digits.len() > 10 {
        return format!("+{}", digits);
    }

    format!("+1{}", digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_us_number_gets_country_code() {
        assert_eq!(format_to_e164("5551234567"), "+15551234567");
    }

    #[test]
    fn eleven_digit_us_number_gets_plus() {
        assert_eq!(format_to_e164("15551234567"), "+15551234567");
    }

    #[test]
    fn punctuation_is_stripped() {
        assert_eq!(format_to_e164("(555) 123-4567"), "+15551234567");
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = format_to_e164("+15551234567");
        assert_eq!(once, "+15551234567");
        assert_eq!(format_to_e164(&once), once);
    }

    #[test]
    fn international_number_keeps_country_code() {
        assert_eq!(format_to_e164("+44 20 7946 0958"), "+442079460958");
    }

    #[test]
    fn short_number_defaults_to_us() {
        assert_eq!(format_to_e164("12345"), "+112345");
    }
}
