use rand::seq::SliceRandom;
use rand::Rng;

const MAX_RESHUFFLES: usize = 8;

/// Fisher-Yates shuffle that avoids handing back the original order when
/// any other order exists.
pub fn shuffle_away<T: Clone + PartialEq, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    let original = items.to_vec();
    for _ in 0..MAX_RESHUFFLES {
        items.shuffle(rng);
        if items.len() < 2 || items != original.as_slice() {
            return;
        }
    }
    // Every element compares equal or we were very unlucky; a rotation is
    // still a different order in the second case.
    items.rotate_left(1);
}

pub fn percent(part: usize, whole: usize) -> u16 {
    match whole {
        0 => 0,
        _ => ((part as f64 / whole as f64) * 100.0).round() as u16,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_shuffle_keeps_elements() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut items: Vec<u32> = (0..16).collect();
        shuffle_away(&mut items, &mut rng);

        let mut sorted = items.clone();
        sorted.sort();
        assert_eq!(sorted, (0..16).collect::<Vec<u32>>());
    }

    #[test]
    fn test_shuffle_never_returns_input_order() {
        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut items = vec!["cat", "feline", "dog"];
            shuffle_away(&mut items, &mut rng);
            assert_ne!(items, vec!["cat", "feline", "dog"]);
        }
    }

    #[test]
    fn test_shuffle_single_item() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut items = vec![1];
        shuffle_away(&mut items, &mut rng);
        assert_eq!(items, vec![1]);
    }

    #[test]
    fn test_shuffle_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut items: Vec<u8> = vec![];
        shuffle_away(&mut items, &mut rng);
        assert!(items.is_empty());
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(1, 4), 25);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(0, 0), 0);
    }
}
