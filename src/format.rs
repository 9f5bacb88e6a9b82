// Turns an f64 into the shortest string that reads back to the same value
fn format_f64(v: f64) -> String {
    if !v.is_finite() {
        return format!("{}", v);
    }
    let mut buf = dtoa::Buffer::new();
    buf.format(v).to_string()
}

/// Renders a value the way a calculator shows it: at most 15 significant
/// digits, float noise rounded away, no trailing `.0` on whole numbers.
pub fn format_result(v: f64) -> String {
    if !v.is_finite() {
        return format!("{}", v);
    }

    // rounding through exponent notation keeps 15 significant digits
    // regardless of the value magnitude; next to f64::MAX the rounded
    // text overflows the type, in which case the value stays as is
    let rounded: f64 = match format!("{:.14e}", v).parse::<f64>() {
        Ok(r) if r.is_finite() => r,
        _ => v,
    };

    let s = format_f64(rounded);
    match s.strip_suffix(".0") {
        Some(trimmed) => trimmed.to_string(),
        None => s,
    }
}
