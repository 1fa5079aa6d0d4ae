//! Character similarity used to confirm catalog filename matches.

/// Percentage similarity of two strings, computed by recursively summing the longest
/// common substrings on each side of the best match.
///
/// Returns `0.0` when both strings are empty.
#[must_use]
pub fn similarity_percent(left: &str, right: &str) -> f64 {
    let total = left.len() + right.len();
    if total == 0 {
        return 0.0;
    }
    let common = common_chars(left.as_bytes(), right.as_bytes());
    ratio_percent(common * 2, total)
}

#[allow(clippy::cast_precision_loss)]
fn ratio_percent(part: usize, whole: usize) -> f64 {
    part as f64 * 100.0 / whole as f64
}

fn common_chars(left: &[u8], right: &[u8]) -> usize {
    let Some((left_pos, right_pos, len)) = longest_common(left, right) else {
        return 0;
    };
    len + common_chars(&left[..left_pos], &right[..right_pos])
        + common_chars(&left[left_pos + len..], &right[right_pos + len..])
}

/// First longest common run, scanning `left` then `right` positions in order.
fn longest_common(left: &[u8], right: &[u8]) -> Option<(usize, usize, usize)> {
    let mut best: Option<(usize, usize, usize)> = None;
    for left_pos in 0..left.len() {
        for right_pos in 0..right.len() {
            let len = left[left_pos..]
                .iter()
                .zip(&right[right_pos..])
                .take_while(|(a, b)| a == b)
                .count();
            if len > best.map_or(0, |(_, _, current)| current) {
                best = Some((left_pos, right_pos, len));
            }
        }
    }
    best
}
