use serde::{Deserialize, Serialize};

/// Percentage span one series occupies at one index of a 100% stack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StackSpan {
    pub start: f64,
    pub end: f64,
}

/// Stacks aligned Y arrays so each index sums to 100%.
///
/// Shares are taken against the sum of absolute values at that index. NaN
/// contributes nothing, and an index whose total is zero stacks to zero.
/// The result is indexed `[series][point]`; shorter arrays read as NaN past
/// their end.
#[must_use]
pub fn stack_percent(channels: &[&[f64]]) -> Vec<Vec<StackSpan>> {
    let len = channels.iter().map(|values| values.len()).max().unwrap_or(0);
    let mut stacked: Vec<Vec<StackSpan>> = channels
        .iter()
        .map(|_| Vec::with_capacity(len))
        .collect();

    for index in 0..len {
        let value_at = |values: &[f64]| values.get(index).copied().filter(|v| v.is_finite());
        let total: f64 = channels
            .iter()
            .filter_map(|values| value_at(values))
            .map(f64::abs)
            .sum();
        let mut cursor = 0.0;
        for (series, values) in channels.iter().enumerate() {
            let share = match value_at(values) {
                Some(value) if total > 0.0 => value / total * 100.0,
                _ => 0.0,
            };
            stacked[series].push(StackSpan {
                start: cursor,
                end: cursor + share,
            });
            cursor += share;
        }
    }
    stacked
}
