/// Upper bound on fractional digits, matching `Intl.NumberFormat`.
pub const MAX_FRACTION_DIGITS: usize = 20;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DigitGrouping {
    /// `12,34,567`: last three digits, then pairs.
    Indian,
    /// `1,234,567`: groups of three.
    Western,
}

/// Currency display settings. Rounding is half away from zero.
#[derive(Clone, Debug, PartialEq)]
pub struct CurrencyFormat {
    pub symbol: String,
    pub grouping: DigitGrouping,
    pub fraction_digits: usize,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self::en_in()
    }
}

impl CurrencyFormat {
    pub fn en_in() -> Self {
        Self {
            symbol: "₹".into(),
            grouping: DigitGrouping::Indian,
            fraction_digits: 0,
        }
    }

    pub fn en_us() -> Self {
        Self {
            symbol: "$".into(),
            grouping: DigitGrouping::Western,
            fraction_digits: 0,
        }
    }

    pub fn with_fraction_digits(mut self, fraction_digits: usize) -> Self {
        self.fraction_digits = fraction_digits.min(MAX_FRACTION_DIGITS);
        self
    }

    /// Missing and non-finite amounts render as zero.
    pub fn format(&self, amount: Option<f64>) -> String {
        let body = format_number(amount.unwrap_or(0.0), self.grouping, self.fraction_digits);
        match body.strip_prefix('-') {
            Some(digits) => format!("-{}{}", self.symbol, digits),
            None => format!("{}{}", self.symbol, body),
        }
    }

    pub fn format_value(&self, amount: f64) -> String {
        self.format(Some(amount))
    }
}

pub fn format_inr(amount: f64, fraction_digits: usize) -> String {
    CurrencyFormat::en_in()
        .with_fraction_digits(fraction_digits)
        .format_value(amount)
}

/// Grouped decimal text without a currency symbol.
pub fn format_number(value: f64, grouping: DigitGrouping, fraction_digits: usize) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let digits = fraction_digits.min(MAX_FRACTION_DIGITS);
    let (int_part, frac_part) = round_decimal(&value.abs().to_string(), digits);

    let mut body = group_digits(&int_part, grouping);
    if !frac_part.is_empty() {
        body.push('.');
        body.push_str(&frac_part);
    }
    let nonzero = int_part.chars().chain(frac_part.chars()).any(|c| c != '0');
    if value < 0.0 && nonzero {
        body.insert(0, '-');
    }
    body
}

/// Rounds plain decimal text (the shortest round-trip form of an `f64`) at
/// `digits` fractional places, half away from zero.
fn round_decimal(text: &str, digits: usize) -> (String, String) {
    let (int_text, frac_text) = text.split_once('.').unwrap_or((text, ""));
    let mut kept: Vec<u8> = int_text.bytes().collect();
    kept.extend(frac_text.bytes().chain(std::iter::repeat(b'0')).take(digits));

    if frac_text.as_bytes().get(digits).is_some_and(|&b| b >= b'5') {
        let mut carry = true;
        for b in kept.iter_mut().rev() {
            if *b == b'9' {
                *b = b'0';
            } else {
                *b += 1;
                carry = false;
                break;
            }
        }
        if carry {
            kept.insert(0, b'1');
        }
    }

    let split = kept.len() - digits;
    let to_text = |bytes: &[u8]| bytes.iter().copied().map(char::from).collect::<String>();
    (to_text(&kept[..split]), to_text(&kept[split..]))
}

/// Inflation index display: four decimals, ungrouped.
pub fn format_index(value: f64) -> String {
    format_number(value, DigitGrouping::Western, 4).replace(',', "")
}

fn group_digits(digits: &str, grouping: DigitGrouping) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let width = match grouping {
        DigitGrouping::Indian => 2,
        DigitGrouping::Western => 3,
    };

    let mut groups = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(width);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    groups.push(tail);
    groups.join(",")
}
