use std::cmp::Ordering;
use std::fmt;

/// GPIO pin number. The ESP8266 exposes GPIO0..GPIO16.
pub type Pin = u8;

/// Name of a GPIO field as sent by a client.
///
/// Any non-empty run of ASCII digits is a pin name, e.g. `"4"`, `"05"` or
/// `"300"`. The text is kept as received so it can be echoed back verbatim.
/// Names order by numeric value, ties (`"5"`, `"05"`) by their text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PinName(String);

impl PinName {
    /// Parse a JSON field name, `None` if it is not all digits
    /// (`"type"`, `""`, `"+4"`, `"4.0"`, `" 4"`).
    pub fn parse(name: &str) -> Option<Self> {
        if name.is_empty() || !name.bytes().all(|c| c.is_ascii_digit()) {
            return None;
        }
        Some(PinName(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Digits without leading zeros, `""` for zero
    fn significant(&self) -> &str {
        self.0.trim_start_matches('0')
    }
}

impl From<Pin> for PinName {
    fn from(pin: Pin) -> Self {
        PinName(pin.to_string())
    }
}

impl fmt::Display for PinName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Ord for PinName {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b) = (self.significant(), other.significant());
        a.len()
            .cmp(&b.len())
            .then_with(|| a.cmp(b))
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for PinName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::PinName;

    #[test]
    fn digit_names_are_pins() {
        for name in ["4", "16", "05", "300", "0", "99999999999999999999"] {
            assert_eq!(PinName::parse(name).unwrap().as_str(), name);
        }
    }

    #[test]
    fn other_names_are_not() {
        for name in ["type", "", " 4", "4 ", "+4", "-1", "4.0", "0x4", "1e1"] {
            assert_eq!(PinName::parse(name), None, "{name:?}");
        }
    }

    #[test]
    fn numeric_order() {
        let mut names: Vec<PinName> = ["300", "9", "05", "10", "5", "0"]
            .into_iter()
            .filter_map(PinName::parse)
            .collect();
        names.sort();
        let names: Vec<&str> = names.iter().map(PinName::as_str).collect();
        assert_eq!(names, ["0", "05", "5", "9", "10", "300"]);
    }

    #[test]
    fn from_pin() {
        assert_eq!(PinName::from(5u8), PinName::parse("5").unwrap());
        assert_ne!(PinName::from(5u8), PinName::parse("05").unwrap());
    }
}
