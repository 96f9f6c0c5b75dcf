// HEX parsing and quick-input splitting

/// A search-box entry interpreted as an immediate fill request
/// rather than a catalog match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuickInput {
    /// Single color fill
    Solid(String),
    /// Two-stop left-to-right gradient
    Gradient(String, String),
}

impl QuickInput {
    /// Primary hex value
    pub fn hex(&self) -> &str {
        match self {
            QuickInput::Solid(hex) => hex,
            QuickInput::Gradient(hex, _) => hex,
        }
    }

    /// Secondary hex value, if this is a gradient
    pub fn hex2(&self) -> Option<&str> {
        match self {
            QuickInput::Solid(_) => None,
            QuickInput::Gradient(_, hex2) => Some(hex2),
        }
    }
}

/// Normalize a user-entered HEX string to canonical form.
///
/// Accepts 3/4/6/8 hex digits with an optional `#` or `0x` prefix and
/// mixed case. Shorthand forms expand by doubling each nibble. Output
/// is uppercase and `#`-prefixed: `#RRGGBB` or `#RRGGBBAA`. Returns
/// `None` for anything else (wrong length, non-hex characters).
///
/// Idempotent: feeding a canonical value back in returns it unchanged.
pub fn normalize(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix('#')
        .or_else(|| trimmed.strip_prefix("0x"))
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let expanded: String = match digits.len() {
        // #abc / #abcf shorthand: each nibble doubles
        3 | 4 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 | 8 => digits.to_string(),
        _ => return None,
    };

    Some(format!("#{}", expanded.to_ascii_uppercase()))
}

/// Decode the RGB channels of a canonical hex string for preview
/// rendering. Alpha digits, if present, are ignored.
pub fn rgb_of(canonical: &str) -> Option<(u8, u8, u8)> {
    let digits = canonical.strip_prefix('#')?;
    if digits.len() != 6 && digits.len() != 8 {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Parse quick-entry input: one HEX token is a solid fill request, two
/// tokens (comma- or whitespace-separated, full-width commas included)
/// are a gradient request. Anything else offers no quick suggestion.
pub fn parse_quick(input: &str) -> Option<QuickInput> {
    let tokens: Vec<&str> = input
        .trim()
        .split(|c: char| c == ',' || c == '，' || c == '、' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();

    match tokens.as_slice() {
        [one] => normalize(one).map(QuickInput::Solid),
        [one, two] => {
            let first = normalize(one)?;
            let second = normalize(two)?;
            Some(QuickInput::Gradient(first, second))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_forms() {
        assert_eq!(normalize("#ff4757").as_deref(), Some("#FF4757"));
        assert_eq!(normalize("ff4757").as_deref(), Some("#FF4757"));
        assert_eq!(normalize("0xff4757").as_deref(), Some("#FF4757"));
        assert_eq!(normalize("0Xff4757").as_deref(), Some("#FF4757"));
        assert_eq!(normalize("#abc").as_deref(), Some("#AABBCC"));
        assert_eq!(normalize("f0f").as_deref(), Some("#FF00FF"));
        assert_eq!(normalize("#abcd").as_deref(), Some("#AABBCCDD"));
        assert_eq!(normalize("#11223344").as_deref(), Some("#11223344"));
        assert_eq!(normalize("  #66d4cf  ").as_deref(), Some("#66D4CF"));
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert_eq!(normalize(""), None);
        assert_eq!(normalize("#"), None);
        assert_eq!(normalize("0x"), None);
        assert_eq!(normalize("#gg0000"), None);
        assert_eq!(normalize("#ff475"), None); // 5 digits
        assert_eq!(normalize("#ff47577"), None); // 7 digits
        assert_eq!(normalize("#ff4757ff00"), None); // 10 digits
        assert_eq!(normalize("red"), None);
        assert_eq!(normalize("# ff4757"), None);
    }

    #[test]
    fn test_normalize_idempotent() {
        for raw in ["#abc", "0xDEADBE", "ff4757", "#AbCdEf12"] {
            let once = normalize(raw).unwrap();
            assert_eq!(normalize(&once).as_deref(), Some(once.as_str()));
        }
    }

    #[test]
    fn test_rgb_of() {
        assert_eq!(rgb_of("#FF4757"), Some((0xFF, 0x47, 0x57)));
        assert_eq!(rgb_of("#66D4CF"), Some((0x66, 0xD4, 0xCF)));
        assert_eq!(rgb_of("#11223344"), Some((0x11, 0x22, 0x33)));
        assert_eq!(rgb_of("FF4757"), None);
    }

    #[test]
    fn test_parse_quick_solid() {
        assert_eq!(
            parse_quick("#ff4757"),
            Some(QuickInput::Solid("#FF4757".into()))
        );
        assert_eq!(parse_quick("zz"), None);
        assert_eq!(parse_quick(""), None);
        assert_eq!(parse_quick("   "), None);
    }

    #[test]
    fn test_parse_quick_gradient() {
        let expected = QuickInput::Gradient("#FF4757".into(), "#1E90FF".into());
        assert_eq!(parse_quick("#ff4757,#1e90ff"), Some(expected.clone()));
        assert_eq!(parse_quick("#ff4757 #1e90ff"), Some(expected.clone()));
        assert_eq!(parse_quick("#ff4757，#1e90ff"), Some(expected.clone()));
        assert_eq!(parse_quick("#ff4757, #1e90ff"), Some(expected));

        // both tokens must parse
        assert_eq!(parse_quick("#ff4757,zz"), None);
        assert_eq!(parse_quick("zz,#1e90ff"), None);
    }

    #[test]
    fn test_parse_quick_too_many_tokens() {
        assert_eq!(parse_quick("#f00 #0f0 #00f"), None);
        assert_eq!(parse_quick("#f00,#0f0,#00f"), None);
    }
}
