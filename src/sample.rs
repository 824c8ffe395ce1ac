//! Evenly spread sequence numbers for spot checks.

/// `count` numbers spread evenly over `[from, to]`, both ends included.
///
/// ```
/// use seqforge::sample::pick_count;
///
/// assert_eq!(
///     pick_count(10, 1, 8760),
///     [1, 974, 1947, 2921, 3894, 4867, 5840, 6814, 7787, 8760]
/// );
/// ```
pub fn pick_count(count: u32, from: u32, to: u32) -> Vec<u32> {
    if to < from || count == 0 {
        return Vec::new();
    }
    if count == 1 || from == to {
        return vec![from];
    }
    let span = u64::from(to - from);
    let gaps = u64::from(count - 1);
    let mut out: Vec<u32> = (0..u64::from(count))
        .map(|k| from + round_half_even(k * span, gaps) as u32)
        .collect();
    out.dedup();
    out
}

/// `num / den` rounded to the nearest integer, ties to even.
fn round_half_even(num: u64, den: u64) -> u64 {
    let (q, r) = (num / den, num % den);
    match (2 * r).cmp(&den) {
        std::cmp::Ordering::Less => q,
        std::cmp::Ordering::Greater => q + 1,
        std::cmp::Ordering::Equal => q + (q & 1),
    }
}

/// Every `step`-th number from `from`, plus `to` if it was not hit.
///
/// `pick_step(1000, 1, 8760)` gives `1, 1001, …, 8001, 8760`.
pub fn pick_step(step: u32, from: u32, to: u32) -> Vec<u32> {
    if to < from || step == 0 {
        return Vec::new();
    }
    let mut out: Vec<u32> = (from..=to).step_by(step as usize).collect();
    if out.last() != Some(&to) {
        out.push(to);
    }
    out
}

/// Multiples of `step` between `from` and `to`, bracketed by both ends.
///
/// `pick_round(1000, 1, 8760)` gives `1, 1000, 2000, …, 8000, 8760`.
pub fn pick_round(step: u32, from: u32, to: u32) -> Vec<u32> {
    if to < from || step == 0 {
        return Vec::new();
    }
    let mut out = vec![from];
    let mut current = (from / step + 1).saturating_mul(step);
    while current <= to {
        out.push(current);
        match current.checked_add(step) {
            Some(next) => current = next,
            None => break,
        }
    }
    if out.last() != Some(&to) {
        out.push(to);
    }
    out
}

/// `1, 974, 1947`
pub fn format_numbers(nums: &[u32]) -> String {
    nums.iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_count() {
        assert_eq!(
            pick_count(10, 1, 8760),
            [1, 974, 1947, 2921, 3894, 4867, 5840, 6814, 7787, 8760]
        );
        assert_eq!(pick_count(3, 101, 200), [101, 151, 200]);
        assert_eq!(pick_count(3, 1, 30), [1, 15, 30]);
        assert_eq!(pick_count(3, 1, 4), [1, 3, 4]);
        assert_eq!(pick_count(1, 5, 9), [5]);
        assert_eq!(pick_count(5, 1, 3), [1, 2, 3]);
        assert!(pick_count(3, 9, 5).is_empty());
    }

    #[test]
    fn test_round_half_even() {
        assert_eq!(round_half_even(7, 2), 4);
        assert_eq!(round_half_even(5, 2), 2);
        assert_eq!(round_half_even(8759, 9), 973);
        assert_eq!(round_half_even(26277, 9), 2920);
        assert_eq!(round_half_even(6, 3), 2);
    }

    #[test]
    fn test_pick_step() {
        assert_eq!(
            pick_step(1000, 1, 8760),
            [1, 1001, 2001, 3001, 4001, 5001, 6001, 7001, 8001, 8760]
        );
        assert_eq!(pick_step(5, 1, 11), [1, 6, 11]);
    }

    #[test]
    fn test_pick_round() {
        assert_eq!(
            pick_round(1000, 1, 8760),
            [1, 1000, 2000, 3000, 4000, 5000, 6000, 7000, 8000, 8760]
        );
        assert_eq!(pick_round(100, 100, 300), [100, 200, 300]);
        assert_eq!(pick_round(1000, 5, 20), [5, 20]);
    }

    #[test]
    fn test_format_numbers() {
        assert_eq!(format_numbers(&[1, 974, 1947]), "1, 974, 1947");
    }
}
