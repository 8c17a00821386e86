use bst_maps::avl_tree::AvlMap;
use rand::{Rng, SeedableRng, XorShiftRng};
use simplelog::{Config, LevelFilter, SimpleLogger};
use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};

const NUM_OF_OPERATIONS: usize = 100_000;
const KEY_RANGE: i32 = 1_000;

fn max_height(len: usize) -> usize {
    (1.45 * ((len + 2) as f64).log2()) as usize
}

#[test]
fn int_test_avl_map() {
    let _ = SimpleLogger::init(LevelFilter::Info, Config::default());

    let mut rng: XorShiftRng = SeedableRng::from_seed([1, 1, 1, 1]);
    let mut map = AvlMap::new();
    let mut expected = BTreeMap::new();

    for _ in 0..NUM_OF_OPERATIONS {
        let key = rng.gen_range(0, KEY_RANGE);
        let value = rng.gen_range(0, KEY_RANGE).to_string();

        match rng.gen_range(0, 3) {
            0 => assert_eq!(map.insert(key, value.clone()), expected.insert(key, value)),
            1 => assert_eq!(map.remove(&key), expected.remove(&key)),
            _ => assert_eq!(map.get(&key), expected.get(&key)),
        }

        assert_eq!(map.len(), expected.len());
        assert!(map.height() <= max_height(map.len()));
    }

    assert_eq!(
        map.iter().collect::<Vec<(&i32, &String)>>(),
        expected.iter().collect::<Vec<(&i32, &String)>>(),
    );
}

#[test]
fn int_test_avl_map_navigation() {
    let mut rng: XorShiftRng = SeedableRng::from_seed([2, 2, 2, 2]);
    let mut map = AvlMap::new();
    let mut expected = BTreeMap::new();

    for _ in 0..KEY_RANGE {
        let key = rng.gen_range(0, KEY_RANGE * 4);
        map.insert(key, ());
        expected.insert(key, ());
    }

    assert_eq!(map.first_key().ok(), expected.keys().next());
    assert_eq!(map.last_key().ok(), expected.keys().next_back());

    for key in -1..KEY_RANGE * 4 + 1 {
        let lower = expected.range((Unbounded, Excluded(key))).next_back().map(|(key, _)| key);
        let floor = expected.range(..=key).next_back().map(|(key, _)| key);
        let ceiling = expected.range(key..).next().map(|(key, _)| key);
        let higher = expected.range((Excluded(key), Unbounded)).next().map(|(key, _)| key);

        assert_eq!(map.lower_key(&key), lower);
        assert_eq!(map.floor_key(&key), floor);
        assert_eq!(map.ceiling_key(&key), ceiling);
        assert_eq!(map.higher_key(&key), higher);

        if let Some(floor) = map.floor_key(&key) {
            assert!(map.first_key().map_or(false, |first| first <= floor));
            assert!(*floor <= key);
        }
        if let Some(ceiling) = map.ceiling_key(&key) {
            assert!(*ceiling >= key);
        }
    }
}

#[test]
fn int_test_avl_map_ranges() {
    let map: AvlMap<i32, i32> = (0..100).map(|key| (key * 2, key)).collect();

    for bound in -1..201 {
        let head = map.head_map(&bound);
        let tail = map.tail_map(&bound);

        assert!(head.iter().all(|(key, _)| *key < bound));
        assert!(tail.iter().all(|(key, _)| *key >= bound));
        assert_eq!(head.len() + tail.len(), map.len());
    }
}
