//! Slack-variable weights for inequality encoding.

use super::config::SlackEncoding;

/// Number of slack bits [`slack_weights`] produces for `range`, computed
/// without allocating.
pub fn slack_bit_count(range: u64, encoding: SlackEncoding) -> u64 {
    match encoding {
        SlackEncoding::Unary => range,
        SlackEncoding::Binary => u64::from(u64::BITS - range.leading_zeros()),
    }
}

/// Weights of the slack bits spelling every integer in `[0, range]`.
///
/// Binary weights are `1, 2, ..., 2^(k-2)` followed by a truncated last
/// weight, so that the weights sum to exactly `range`.
pub fn slack_weights(range: u64, encoding: SlackEncoding) -> Vec<u64> {
    if range == 0 {
        return Vec::new();
    }
    match encoding {
        SlackEncoding::Unary => vec![1; range as usize],
        SlackEncoding::Binary => {
            let bits = u64::BITS - range.leading_zeros();
            let mut weights: Vec<u64> = (0..bits - 1).map(|p| 1u64 << p).collect();
            let powers: u64 = weights.iter().sum();
            weights.push(range - powers);
            weights
        }
    }
}

/// Bit values spelling `value` with `weights` (as built by
/// [`slack_weights`]); `value` is clamped to the weight sum.
pub fn spell(value: u64, weights: &[u64], encoding: SlackEncoding) -> Vec<bool> {
    let total: u64 = weights.iter().sum();
    let value = value.min(total);
    match encoding {
        SlackEncoding::Unary => (0..weights.len()).map(|k| (k as u64) < value).collect(),
        SlackEncoding::Binary => {
            let Some((&last, powers)) = weights.split_last() else {
                return Vec::new();
            };
            let use_last = value > total - last;
            let rest = if use_last { value - last } else { value };
            let mut bits: Vec<bool> = (0..powers.len()).map(|p| (rest >> p) & 1 == 1).collect();
            bits.push(use_last);
            bits
        }
    }
}
