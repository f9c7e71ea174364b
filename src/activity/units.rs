use ethers_core::types::U256;

/// Decimals of the chain's native asset.
pub const NATIVE_DECIMALS: u32 = 18;

/// Parses a base-unit integer written either as `0x` hex (JSON-RPC quantity)
/// or as a plain decimal string.
pub fn parse_base_units(raw: &str) -> Option<U256> {
    let raw = raw.trim();
    if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        if hex.is_empty() {
            return None;
        }
        return U256::from_str_radix(hex, 16).ok();
    }
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    U256::from_dec_str(raw).ok()
}

/// Converts an amount in whole units (`"1.5"`, `"2e-9"`, `"12"`) into base
/// units using exact decimal arithmetic. Digits below one base unit are
/// truncated. Negative or non-numeric input yields `None`.
pub fn whole_units_to_base(raw: &str, decimals: u32) -> Option<U256> {
    let raw = raw.trim();
    let raw = raw.strip_prefix('+').unwrap_or(raw);
    if raw.starts_with('-') {
        return None;
    }

    let (mantissa, exponent) = match raw.find(|c: char| c == 'e' || c == 'E') {
        Some(idx) => (&raw[..idx], raw[idx + 1..].parse::<i64>().ok()?),
        None => (raw, 0),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let digits: String = format!("{int_part}{frac_part}");
    let point = i64::try_from(int_part.len())
        .ok()?
        .checked_add(exponent)?
        .checked_add(i64::from(decimals))?;
    if point <= 0 {
        return Some(U256::zero());
    }
    // U256 tops out at 78 decimal digits.
    if point > digits.len() as i64 + 80 {
        return None;
    }

    let point = point as usize;
    let integral = if point >= digits.len() {
        format!("{digits}{}", "0".repeat(point - digits.len()))
    } else {
        digits[..point].to_string()
    };

    let trimmed = integral.trim_start_matches('0');
    if trimmed.is_empty() {
        return Some(U256::zero());
    }
    U256::from_dec_str(trimmed).ok()
}
