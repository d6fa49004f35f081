//! Kubernetes resource-quantity parsing and rendering
//!
//! `k8s-openapi` exposes quantities as plain strings, so the arithmetic
//! the tool needs (millicores, bytes, scaled suggestion values) lives
//! here. Binary (Ki/Mi/...), decimal (k/M/...) and the milli suffix are
//! supported; that covers what the VPA recommender and kubectl emit.

/// Parse a CPU quantity into millicores. `"100m"` -> 100, `"1"` -> 1000,
/// `"1.5"` -> 1500. Returns `None` for an unparseable string.
pub fn cpu_millis(q: &str) -> Option<i64> {
    let (n, suffix) = split_quantity(q)?;
    let cores = apply_suffix(n, suffix)?;
    Some((cores * 1000.0).round() as i64)
}

/// Parse a memory quantity into bytes. `"128Mi"` -> 134217728,
/// `"1G"` -> 1000000000. Returns `None` for an unparseable string.
pub fn memory_bytes(q: &str) -> Option<i64> {
    let (n, suffix) = split_quantity(q)?;
    let bytes = apply_suffix(n, suffix)?;
    Some(bytes.round() as i64)
}

/// Parse a quantity into its base unit (cores or bytes) as a float.
pub fn value(q: &str) -> Option<f64> {
    let (n, suffix) = split_quantity(q)?;
    apply_suffix(n, suffix)
}

const MI: f64 = 1024.0 * 1024.0;

/// Scale a quantity and render it the way the suggestion output wants:
/// values below 10 (cores) become millicores with an `m` suffix, values
/// above one mebibyte become `Mi`, everything rounded to even.
pub fn scaled(q: &str, scale: f64) -> Option<String> {
    let mut n = value(q)? * scale;

    let suffix = if n < 10.0 {
        n *= 1000.0;
        "m"
    } else if n > MI {
        n /= MI;
        "Mi"
    } else {
        ""
    };

    Some(format!("{}{}", n.round_ties_even() as i64, suffix))
}

fn split_quantity(q: &str) -> Option<(f64, &str)> {
    let q = q.trim();
    if q.is_empty() {
        return None;
    }
    let split = q
        .find(|c: char| !c.is_ascii_digit() && c != '.' && c != '-' && c != '+')
        .unwrap_or(q.len());
    let n: f64 = q[..split].parse().ok()?;
    Some((n, &q[split..]))
}

fn apply_suffix(n: f64, suffix: &str) -> Option<f64> {
    let factor = match suffix {
        "" => 1.0,
        "m" => 1e-3,
        "k" => 1e3,
        "M" => 1e6,
        "G" => 1e9,
        "T" => 1e12,
        "P" => 1e15,
        "E" => 1e18,
        "Ki" => 1024.0,
        "Mi" => 1024.0 * 1024.0,
        "Gi" => 1024.0 * 1024.0 * 1024.0,
        "Ti" => 1024f64.powi(4),
        "Pi" => 1024f64.powi(5),
        "Ei" => 1024f64.powi(6),
        _ => return None,
    };
    Some(n * factor)
}
