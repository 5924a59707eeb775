/// Lossy numeric form of a version string.
///
/// `_` and `/` count as separators. The first component is kept, a single
/// `.` follows, and every later component is appended with its separator
/// dropped: `"4.0.4"` becomes `4.04` and `"18.0.1025.166"` becomes
/// `18.01025166`. Anything that still fails to parse gives `0.0`.
pub(crate) fn version_to_float(version: &str) -> f64 {
    let normalized = version.replace(['_', '/'], ".");
    let mut parts = normalized.split('.');
    let Some(major) = parts.next() else {
        return 0.0;
    };
    let rest: String = parts.collect();
    let joined = if rest.is_empty() {
        major.to_string()
    } else {
        format!("{}.{}", major, rest)
    };
    joined.parse::<f64>().unwrap_or(0.0)
}
