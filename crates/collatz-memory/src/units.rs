pub const KB: u64 = 1024;
pub const MB: u64 = 1024 * KB;
pub const GB: u64 = 1024 * MB;

/// Parse a human-friendly byte size such as `512`, `400MB`, `1.5G` or `64 KiB`.
///
/// Units are binary (`1 MB == 1024 * 1024` bytes); a bare number is a byte count.
pub fn parse_byte_size(input: &str) -> Result<u64, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("byte size must not be empty".to_string());
    }

    let split = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);
    if number.is_empty() {
        return Err(format!("byte size `{trimmed}` has no numeric value"));
    }

    let multiplier = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "b" => 1,
        "k" | "kb" | "kib" => KB,
        "m" | "mb" | "mib" => MB,
        "g" | "gb" | "gib" => GB,
        other => return Err(format!("unknown byte size unit `{other}`")),
    };

    if let Ok(whole) = number.parse::<u64>() {
        return whole
            .checked_mul(multiplier)
            .ok_or_else(|| format!("byte size `{trimmed}` overflows u64"));
    }

    let value: f64 = number
        .parse()
        .map_err(|_| format!("invalid byte size number `{number}`"))?;
    let bytes = value * multiplier as f64;
    if !bytes.is_finite() || bytes < 0.0 || bytes >= u64::MAX as f64 {
        return Err(format!("byte size `{trimmed}` is out of range"));
    }
    Ok(bytes.round() as u64)
}
