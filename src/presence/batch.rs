//! Greedy nick batching.
//!
//! Multi-target commands (ISON, MONITOR, WATCH) and their replies must fit in
//! one protocol line. [`pack`] splits a nick list into consecutive batches
//! whose serialized length, `sum(len) + separator_len * (n - 1)`, stays
//! within a budget.

/// Split `nicks` into order-preserving batches of at most `budget` bytes.
///
/// Concatenating the batches yields the input. A single nick longer than the
/// budget cannot be split and is emitted as a batch of its own.
pub fn pack<S: AsRef<str>>(nicks: &[S], budget: usize, separator_len: usize) -> Vec<Vec<String>> {
    let mut batches = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut used = 0usize;

    for nick in nicks.iter().map(AsRef::as_ref) {
        let cost = if current.is_empty() {
            nick.len()
        } else {
            separator_len + nick.len()
        };

        if !current.is_empty() && used + cost > budget {
            batches.push(std::mem::take(&mut current));
            used = nick.len();
        } else {
            used += cost;
        }
        current.push(nick.to_string());
    }

    if !current.is_empty() {
        batches.push(current);
    }
    batches
}

/// Serialized length of a batch.
pub fn batch_len<S: AsRef<str>>(batch: &[S], separator_len: usize) -> usize {
    let nicks: usize = batch.iter().map(|n| n.as_ref().len()).sum();
    nicks + separator_len * batch.len().saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_batches_greedily() {
        let batches = pack(&["aaa", "bbb", "ccc", "dd"], 7, 1);
        assert_eq!(
            batches,
            vec![vec!["aaa", "bbb"], vec!["ccc", "dd"]]
        );
    }

    #[test]
    fn exact_fit_stays_in_one_batch() {
        assert_eq!(pack(&["ab", "cd"], 5, 1), vec![vec!["ab", "cd"]]);
        assert_eq!(pack(&["ab", "cd"], 4, 1).len(), 2);
    }

    #[test]
    fn oversized_nick_goes_alone() {
        let batches = pack(&["a", "toolongnick", "b"], 5, 1);
        assert_eq!(batches, vec![vec!["a"], vec!["toolongnick"], vec!["b"]]);
    }

    #[test]
    fn empty_input_yields_no_batches() {
        assert!(pack::<&str>(&[], 100, 1).is_empty());
    }

    #[test]
    fn separator_length_counts() {
        let batches = pack(&["a", "b", "c"], 4, 2);
        assert_eq!(batches, vec![vec!["a", "b"], vec!["c"]]);
        assert_eq!(batch_len(&batches[0], 2), 4);
    }
}
