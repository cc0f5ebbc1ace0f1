use rand::seq::SliceRandom;

use crate::models::ScramblePart;

/// Positional score: `round(100 * matching positions / total)`.
///
/// A part that is merely shifted earns nothing for its position. Positions past
/// the end of `current` count as misses; an empty authoritative order scores 0.
pub fn score_order(authoritative: &[ScramblePart], current: &[ScramblePart]) -> u8 {
    let total = authoritative.len() as u64;
    if total == 0 {
        return 0;
    }

    let matches = authoritative
        .iter()
        .zip(current)
        .filter(|(expected, actual)| expected.id == actual.id)
        .count() as u64;

    // round half up, same as Math.round for non-negative values
    ((200 * matches + total) / (2 * total)) as u8
}

/// Random presentation order for the parts.
pub fn shuffle_parts(parts: &[ScramblePart]) -> Vec<ScramblePart> {
    let mut shuffled = parts.to_vec();
    shuffled.shuffle(&mut rand::rng());
    shuffled
}

/// Drag-and-drop reorder: takes the part at `from` out and reinserts it at `to`.
/// Returns false and leaves `items` untouched when either index is out of range.
pub fn move_part(items: &mut Vec<ScramblePart>, from: usize, to: usize) -> bool {
    if from >= items.len() || to >= items.len() {
        return false;
    }
    if from != to {
        let part = items.remove(from);
        items.insert(to, part);
    }
    true
}

/// Rebuilds an arrangement from 1-based positions into `items`, e.g. `[3, 1, 2]`.
/// `None` unless the positions are a permutation of `items`.
pub fn arrange_by_positions(items: &[ScramblePart], positions: &[usize]) -> Option<Vec<ScramblePart>> {
    if positions.len() != items.len() {
        return None;
    }
    let mut used = vec![false; items.len()];
    let mut arranged = Vec::with_capacity(items.len());
    for &position in positions {
        let index = position.checked_sub(1)?;
        if index >= items.len() || used[index] {
            return None;
        }
        used[index] = true;
        arranged.push(items[index].clone());
    }
    Some(arranged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ids::part_id;

    fn parts(n: usize) -> Vec<ScramblePart> {
        (0..n)
            .map(|i| ScramblePart {
                id: part_id(i),
                text: format!("chunk {}", i),
            })
            .collect()
    }

    #[test]
    fn identical_order_scores_100() {
        for n in 1..10 {
            let p = parts(n);
            assert_eq!(score_order(&p, &p), 100);
        }
    }

    #[test]
    fn single_adjacent_swap() {
        for n in 2..12usize {
            let p = parts(n);
            for i in 0..n - 1 {
                let mut swapped = p.clone();
                swapped.swap(i, i + 1);
                let expected = ((100.0 * (n - 2) as f64) / n as f64).round() as u8;
                assert_eq!(score_order(&p, &swapped), expected, "n={} i={}", n, i);
            }
        }
    }

    #[test]
    fn reversed_seven_parts_scores_14() {
        let p = parts(7);
        let reversed: Vec<_> = p.iter().rev().cloned().collect();
        assert_eq!(score_order(&p, &reversed), 14);
    }

    #[test]
    fn shifted_parts_earn_nothing() {
        let p = parts(4);
        let rotated = vec![p[3].clone(), p[0].clone(), p[1].clone(), p[2].clone()];
        assert_eq!(score_order(&p, &rotated), 0);
    }

    #[test]
    fn scoring_is_deterministic_and_handles_empty() {
        let p = parts(5);
        let shuffled = shuffle_parts(&p);
        assert_eq!(score_order(&p, &shuffled), score_order(&p, &shuffled));
        assert_eq!(score_order(&[], &[]), 0);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let p = parts(7);
        let mut shuffled = shuffle_parts(&p);
        assert_eq!(shuffled.len(), p.len());
        shuffled.sort_by(|a, b| a.id.cmp(&b.id));
        let mut sorted = p.clone();
        sorted.sort_by(|a, b| a.id.cmp(&b.id));
        assert_eq!(shuffled, sorted);
    }

    #[test]
    fn move_part_reinserts() {
        let mut items = parts(4);
        assert!(move_part(&mut items, 0, 2));
        let ids: Vec<&str> = items.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["part-1", "part-2", "part-0", "part-3"]);

        assert!(move_part(&mut items, 3, 0));
        assert_eq!(items[0].id, "part-3");
        assert!(!move_part(&mut items, 4, 0));
        assert_eq!(items.len(), 4);
    }

    #[test]
    fn arrange_by_positions_requires_permutation() {
        let p = parts(3);
        let arranged = arrange_by_positions(&p, &[3, 1, 2]).unwrap();
        assert_eq!(arranged[0].id, "part-2");
        assert!(arrange_by_positions(&p, &[1, 1, 2]).is_none());
        assert!(arrange_by_positions(&p, &[0, 1, 2]).is_none());
        assert!(arrange_by_positions(&p, &[1, 2]).is_none());
    }
}
