//! Tool-sequence alignment, one strategy per [`SequenceMode`].

use crate::config::SequenceMode;

/// Index-level alignment of golden tool names against actual tool names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Alignment {
    /// (golden index, actual index), ascending by golden index.
    pub matched: Vec<(usize, usize)>,
    pub removed: Vec<usize>,
    pub added: Vec<usize>,
    pub order_changed: bool,
}

pub(crate) fn align(mode: SequenceMode, golden: &[&str], actual: &[&str]) -> Alignment {
    match mode {
        SequenceMode::Exact => align_exact(golden, actual),
        SequenceMode::Subsequence => align_subsequence(golden, actual),
        SequenceMode::Unordered => align_unordered(golden, actual),
    }
}

fn align_exact(golden: &[&str], actual: &[&str]) -> Alignment {
    if golden == actual {
        return Alignment {
            matched: (0..golden.len()).map(|i| (i, i)).collect(),
            ..Alignment::default()
        };
    }

    let mut alignment = align_subsequence(golden, actual);
    alignment.order_changed = same_multiset(golden, actual);
    alignment
}

fn align_subsequence(golden: &[&str], actual: &[&str]) -> Alignment {
    let matched = lcs_pairs(golden, actual);
    let removed = unmatched(golden.len(), matched.iter().map(|(g, _)| *g));
    let added = unmatched(actual.len(), matched.iter().map(|(_, a)| *a));
    Alignment {
        matched,
        removed,
        added,
        order_changed: false,
    }
}

fn align_unordered(golden: &[&str], actual: &[&str]) -> Alignment {
    let mut used = vec![false; actual.len()];
    let mut matched = Vec::new();
    let mut removed = Vec::new();

    for (g, name) in golden.iter().enumerate() {
        let hit = actual
            .iter()
            .enumerate()
            .position(|(a, candidate)| !used[a] && candidate == name);
        match hit {
            Some(a) => {
                used[a] = true;
                matched.push((g, a));
            }
            None => removed.push(g),
        }
    }

    // Extra calls are not tracked when order is ignored.
    Alignment {
        matched,
        removed,
        added: Vec::new(),
        order_changed: false,
    }
}

/// Longest common subsequence as index pairs.
///
/// Equal heads are always taken; on ties the actual side is skipped first so
/// golden calls bind to the earliest matching actual call.
fn lcs_pairs(golden: &[&str], actual: &[&str]) -> Vec<(usize, usize)> {
    let (n, m) = (golden.len(), actual.len());
    // table[i][j] = LCS length of golden[i..] and actual[j..]
    let mut table = vec![vec![0u32; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[i][j] = if golden[i] == actual[j] {
                table[i + 1][j + 1] + 1
            } else {
                table[i + 1][j].max(table[i][j + 1])
            };
        }
    }

    let mut pairs = Vec::with_capacity(table[0][0] as usize);
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if golden[i] == actual[j] {
            pairs.push((i, j));
            i += 1;
            j += 1;
        } else if table[i][j + 1] >= table[i + 1][j] {
            j += 1;
        } else {
            i += 1;
        }
    }
    pairs
}

fn unmatched(len: usize, matched: impl Iterator<Item = usize>) -> Vec<usize> {
    let mut hit = vec![false; len];
    for idx in matched {
        hit[idx] = true;
    }
    (0..len).filter(|i| !hit[*i]).collect()
}

fn same_multiset(a: &[&str], b: &[&str]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut x = a.to_vec();
    let mut y = b.to_vec();
    x.sort_unstable();
    y.sort_unstable();
    x == y
}
