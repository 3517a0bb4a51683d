//! Human-readable byte sizes, for display only.

const JEDEC_BYTES: [&str; 9] = ["B", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];
const JEDEC_BITS: [&str; 9] = ["b", "Kb", "Mb", "Gb", "Tb", "Pb", "Eb", "Zb", "Yb"];
const SI_BYTES: [&str; 9] = ["B", "kB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];
const SI_BITS: [&str; 9] = ["b", "kb", "Mb", "Gb", "Tb", "Pb", "Eb", "Zb", "Yb"];

const MAX_EXPONENT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Base {
    /// Powers of 1024 with JEDEC symbols (KB, MB, ...).
    #[default]
    Binary,
    /// Powers of 1000 with SI symbols (kB, MB, ...).
    Decimal,
}

impl Base {
    fn factor(self) -> f64 {
        match self {
            Base::Binary => 1024.0,
            Base::Decimal => 1000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoundingMethod {
    #[default]
    Round,
    Floor,
    Ceil,
}

#[derive(Debug, Clone)]
pub struct SizeFormatOptions {
    pub base: Base,
    /// Report bits instead of bytes.
    pub bits: bool,
    /// Force a unit (0 = B, 1 = KB, ...) instead of picking the largest
    /// one that keeps the value at or above 1.
    pub exponent: Option<usize>,
    /// Decimal places kept; trailing zeros are dropped.
    pub round: u32,
    pub rounding: RoundingMethod,
    /// Between the number and the unit.
    pub spacer: String,
}

impl Default for SizeFormatOptions {
    fn default() -> Self {
        Self {
            base: Base::Binary,
            bits: false,
            exponent: None,
            round: 2,
            rounding: RoundingMethod::Round,
            spacer: " ".to_string(),
        }
    }
}

/// Format a byte count, e.g. `1536` as `"1.5 KB"`.
pub fn format_size(bytes: u64, options: &SizeFormatOptions) -> String {
    let base = options.base.factor();
    let symbols = match (options.base, options.bits) {
        (Base::Binary, false) => &JEDEC_BYTES,
        (Base::Binary, true) => &JEDEC_BITS,
        (Base::Decimal, false) => &SI_BYTES,
        (Base::Decimal, true) => &SI_BITS,
    };

    let mut amount = bytes as f64;
    if options.bits {
        amount *= 8.0;
    }
    if amount == 0.0 {
        return format!("0{}{}", options.spacer, symbols[0]);
    }

    let mut exponent = options
        .exponent
        .unwrap_or_else(|| (amount.ln() / base.ln()).floor() as usize)
        .min(MAX_EXPONENT);
    let mut value = amount / base.powi(exponent as i32);
    if options.exponent.is_none() && value >= base && exponent < MAX_EXPONENT {
        value /= base;
        exponent += 1;
    }

    let scale = 10f64.powi(options.round as i32);
    value = match options.rounding {
        RoundingMethod::Round => (value * scale).round(),
        RoundingMethod::Floor => (value * scale).floor(),
        RoundingMethod::Ceil => (value * scale).ceil(),
    } / scale;

    // Rounding can carry into the next unit, e.g. 1023.999 KB -> 1 MB.
    if options.exponent.is_none() && value >= base && exponent < MAX_EXPONENT {
        value /= base;
        exponent += 1;
    }

    format!(
        "{}{}{}",
        trim_decimal(format!("{:.*}", options.round as usize, value)),
        options.spacer,
        symbols[exponent]
    )
}

fn trim_decimal(mut number: String) -> String {
    if number.contains('.') {
        let trimmed = number.trim_end_matches('0').trim_end_matches('.').len();
        number.truncate(trimmed);
    }
    number
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(bytes: u64) -> String {
        format_size(bytes, &SizeFormatOptions::default())
    }

    #[test]
    fn test_binary_defaults() {
        assert_eq!(fmt(0), "0 B");
        assert_eq!(fmt(500), "500 B");
        assert_eq!(fmt(1024), "1 KB");
        assert_eq!(fmt(1536), "1.5 KB");
        assert_eq!(fmt(1_048_576), "1 MB");
        assert_eq!(fmt(265_318), "259.1 KB");
    }

    #[test]
    fn test_decimal_base() {
        let options = SizeFormatOptions {
            base: Base::Decimal,
            ..Default::default()
        };
        assert_eq!(format_size(1000, &options), "1 kB");
        assert_eq!(format_size(265_318, &options), "265.32 kB");
        assert_eq!(format_size(2_500_000, &options), "2.5 MB");
    }

    #[test]
    fn test_bits() {
        let options = SizeFormatOptions {
            bits: true,
            ..Default::default()
        };
        assert_eq!(format_size(1, &options), "8 b");
        assert_eq!(format_size(128, &options), "1 Kb");
    }

    #[test]
    fn test_rounding_and_spacer() {
        let options = SizeFormatOptions {
            round: 0,
            spacer: String::new(),
            ..Default::default()
        };
        assert_eq!(format_size(1536, &options), "2KB");

        let floor = SizeFormatOptions {
            round: 1,
            rounding: RoundingMethod::Floor,
            ..Default::default()
        };
        assert_eq!(format_size(1599, &floor), "1.5 KB");

        let ceil = SizeFormatOptions {
            round: 1,
            rounding: RoundingMethod::Ceil,
            ..Default::default()
        };
        assert_eq!(format_size(1025, &ceil), "1.1 KB");
    }

    #[test]
    fn test_rounding_carries_into_next_unit() {
        assert_eq!(fmt(1_048_575), "1 MB");
    }

    #[test]
    fn test_forced_exponent() {
        let options = SizeFormatOptions {
            exponent: Some(0),
            ..Default::default()
        };
        assert_eq!(format_size(1_048_576, &options), "1048576 B");

        let options = SizeFormatOptions {
            exponent: Some(2),
            ..Default::default()
        };
        assert_eq!(format_size(524_288, &options), "0.5 MB");
    }

    #[test]
    fn test_largest_unit() {
        assert_eq!(fmt(u64::MAX), "16 EB");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: Output is always a number, the spacer and a known unit.
        #[test]
        fn prop_format_shape(bytes in any::<u64>()) {
            let out = format_size(bytes, &SizeFormatOptions::default());
            let (number, unit) = out.split_once(' ').unwrap();

            prop_assert!(number.parse::<f64>().is_ok());
            prop_assert!(JEDEC_BYTES.contains(&unit));
            prop_assert!(!number.ends_with('.'));
        }

        /// Property: Auto-selected values stay below the base.
        #[test]
        fn prop_value_below_base(bytes in 1u64..u64::MAX) {
            let out = format_size(bytes, &SizeFormatOptions::default());
            let value: f64 = out.split_once(' ').unwrap().0.parse().unwrap();
            prop_assert!(value < 1024.0);
        }
    }
}
