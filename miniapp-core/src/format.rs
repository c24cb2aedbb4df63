pub fn truncate_address(address: &str, length: usize) -> String {
    if address.is_empty() {
        return String::new();
    }
    let chars: Vec<char> = address.chars().collect();
    let head: String = chars.iter().take(length).collect();
    let tail: String = chars[chars.len().saturating_sub(length)..].iter().collect();
    format!("{head}...{tail}")
}

/// `0x1234...abcd`, the compact form shown next to a miniapp user's name.
pub fn short_address(address: &str) -> String {
    if address.is_empty() {
        return String::new();
    }
    let chars: Vec<char> = address.chars().collect();
    let head: String = chars.iter().take(6).collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("{head}...{tail}")
}

/// Renders a base-unit integer amount with `decimals` fractional digits,
/// trimming trailing zeros.
pub fn format_balance(balance: u128, decimals: u32) -> String {
    let Some(divisor) = 10u128.checked_pow(decimals) else {
        return format!("0.{balance:0>width$}", width = decimals as usize)
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string();
    };
    let whole = balance / divisor;
    let fraction = balance % divisor;
    if fraction == 0 {
        return whole.to_string();
    }

    let padded = format!("{fraction:0>width$}", width = decimals as usize);
    format!("{whole}.{}", padded.trim_end_matches('0'))
}
