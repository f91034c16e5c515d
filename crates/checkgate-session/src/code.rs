//! Access code generation.

use rand::Rng;

/// The shape of generated codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodeFormat {
    /// Six decimal digits, uniform over `100000..=999999`.
    #[default]
    Digits,
    /// Lowercase hex of the given length.
    Hex { len: usize },
}

impl CodeFormat {
    /// Shortest hex code we hand out.
    pub const MIN_HEX_LEN: usize = 4;
    /// Hex length used when none is configured (128 bits).
    pub const DEFAULT_HEX_LEN: usize = 32;
    /// Longest hex code handed out (512 bits).
    pub const MAX_HEX_LEN: usize = 128;
}

/// Produces fresh codes. Stateless; copies are interchangeable.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeGenerator {
    format: CodeFormat,
}

impl CodeGenerator {
    /// Creates a generator. Hex lengths outside
    /// [`CodeFormat::MIN_HEX_LEN`]..=[`CodeFormat::MAX_HEX_LEN`] are clamped
    /// into that range.
    pub fn new(format: CodeFormat) -> Self {
        let format = match format {
            CodeFormat::Hex { len } if len < CodeFormat::MIN_HEX_LEN => {
                tracing::warn!(len, min = CodeFormat::MIN_HEX_LEN, "hex code too short, raising");
                CodeFormat::Hex {
                    len: CodeFormat::MIN_HEX_LEN,
                }
            }
            CodeFormat::Hex { len } if len > CodeFormat::MAX_HEX_LEN => {
                tracing::warn!(len, max = CodeFormat::MAX_HEX_LEN, "hex code too long, capping");
                CodeFormat::Hex {
                    len: CodeFormat::MAX_HEX_LEN,
                }
            }
            other => other,
        };
        Self { format }
    }

    /// The effective format.
    pub fn format(&self) -> CodeFormat {
        self.format
    }

    /// Generates a new code.
    ///
    /// Different sessions may receive the same code; codes are looked up by
    /// session key, never globally.
    pub fn generate(&self) -> String {
        let mut rng = rand::rng();
        match self.format {
            CodeFormat::Digits => rng.random_range(100_000..=999_999u32).to_string(),
            CodeFormat::Hex { len } => {
                // `rand::rng()` is a CSPRNG seeded from the OS. Two hex
                // characters per byte, trimmed for odd lengths.
                let mut code: String = (0..len.div_ceil(2))
                    .map(|_| format!("{:02x}", rng.random::<u8>()))
                    .collect();
                code.truncate(len);
                code
            }
        }
    }

    /// Generates a code guaranteed to differ from `previous`.
    ///
    /// Used for rotation, so that a rotation is always visible to readers.
    pub fn generate_distinct(&self, previous: Option<&str>) -> String {
        loop {
            let code = self.generate();
            if previous != Some(code.as_str()) {
                return code;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_digits_is_six_digit_number_in_range() {
        let generator = CodeGenerator::new(CodeFormat::Digits);

        for _ in 0..1_000 {
            let code = generator.generate();
            assert_eq!(code.len(), 6, "code {code} should be 6 chars");
            let n: u32 = code.parse().expect("digits only");
            assert!((100_000..=999_999).contains(&n));
        }
    }

    #[test]
    fn test_generate_hex_has_requested_length() {
        for len in [4, 7, 32] {
            let code = CodeGenerator::new(CodeFormat::Hex { len }).generate();
            assert_eq!(code.len(), len);
            assert!(code.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn test_new_raises_short_hex_length() {
        let generator = CodeGenerator::new(CodeFormat::Hex { len: 0 });

        assert_eq!(
            generator.format(),
            CodeFormat::Hex {
                len: CodeFormat::MIN_HEX_LEN
            }
        );
        assert_eq!(generator.generate().len(), CodeFormat::MIN_HEX_LEN);
    }

    #[test]
    fn test_new_caps_long_hex_length() {
        let generator = CodeGenerator::new(CodeFormat::Hex { len: 1 << 20 });

        assert_eq!(
            generator.format(),
            CodeFormat::Hex {
                len: CodeFormat::MAX_HEX_LEN
            }
        );
        assert_eq!(generator.generate().len(), CodeFormat::MAX_HEX_LEN);
    }

    #[test]
    fn test_default_format_is_digits() {
        assert_eq!(CodeGenerator::default().format(), CodeFormat::Digits);
    }

    #[test]
    fn test_generate_distinct_never_repeats_previous() {
        let generator = CodeGenerator::new(CodeFormat::Hex { len: 4 });
        let mut previous = generator.generate();

        for _ in 0..1_000 {
            let next = generator.generate_distinct(Some(&previous));
            assert_ne!(next, previous);
            previous = next;
        }
    }

    #[test]
    fn test_generate_distinct_without_previous_returns_code() {
        let code = CodeGenerator::default().generate_distinct(None);
        assert_eq!(code.len(), 6);
    }
}
