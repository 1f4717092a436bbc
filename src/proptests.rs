use super::*;

use proptest::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;

/// Test payload that remembers where it came from.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Probe {
    pub id: usize,
    pub key: String,
    pub distinct: String,
    pub score: f64,
}

impl Probe {
    pub(crate) fn item(id: usize, key: String, score: f64, distinct: Option<String>) -> Item<Probe> {
        let probe = Probe {
            id,
            key: key.clone(),
            distinct: distinct.clone().unwrap_or_else(|| key.clone()),
            score,
        };
        Item {
            key,
            score,
            value: probe,
            distinct,
        }
    }
}

/// Brute-force autocompleter: sort everything, then filter.
#[derive(Default)]
pub(crate) struct Model {
    items: Vec<Item<Probe>>,
}

impl Model {
    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn sample_key<R: Rng>(&self, rng: &mut R) -> Option<String> {
        self.items.choose(rng).map(|item| item.key.clone())
    }

    pub(crate) fn add(&mut self, item: Item<Probe>) {
        self.items.push(item);
    }

    pub(crate) fn remove(&mut self, key: &str, distinct: Option<&str>) -> usize {
        let distinct = distinct.unwrap_or(key);
        let before = self.items.len();
        self.items
            .retain(|item| item.key != key || item.distinct_key() != distinct);
        before - self.items.len()
    }

    fn search(&self, matches: impl Fn(&str) -> bool, options: SearchOptions) -> Vec<Probe> {
        let mut ranked: Vec<&Item<Probe>> = self.items.iter().filter(|item| matches(&item.key)).collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

        let mut seen = std::collections::HashSet::new();
        ranked
            .into_iter()
            .filter(|item| !options.unique || seen.insert(item.distinct_key()))
            .take(options.limit.unwrap_or(usize::MAX))
            .map(|item| item.value.clone())
            .collect()
    }

    pub(crate) fn prefix_search(&self, prefix: &str, options: SearchOptions) -> Vec<Probe> {
        self.search(|key| key.starts_with(prefix), options)
    }

    pub(crate) fn exact_search(&self, key: &str, options: SearchOptions) -> Vec<Probe> {
        self.search(|candidate| candidate == key, options)
    }
}

/// Compare search results where the order of equal scores is unspecified.
///
/// Score sequences must match exactly. Results scoring strictly above the
/// last returned score must be the same set; at that score the limit may cut
/// through ties differently. With `unique`, identities rather than items are
/// compared, since any item tied for an identity's best score may represent it.
pub(crate) fn assert_same_results(actual: &[&Probe], expected: &[Probe], options: SearchOptions) {
    let actual_scores: Vec<f64> = actual.iter().map(|p| p.score).collect();
    let expected_scores: Vec<f64> = expected.iter().map(|p| p.score).collect();
    assert_eq!(actual_scores, expected_scores, "score sequences differ");

    if options.unique {
        let mut identities: Vec<&str> = actual.iter().map(|p| p.distinct.as_str()).collect();
        identities.sort_unstable();
        identities.dedup();
        assert_eq!(identities.len(), actual.len(), "unique search repeated an identity");
    }

    let Some(&boundary) = expected_scores.last() else {
        return;
    };
    // Below the limit nothing was cut, so every result is settled.
    let floor = match options.limit {
        Some(limit) if expected.len() >= limit => Some(boundary),
        _ => None,
    };

    assert_eq!(
        settled(actual.iter().copied(), floor, options.unique),
        settled(expected.iter(), floor, options.unique),
        "result sets differ"
    );
}

fn settled<'p>(probes: impl Iterator<Item = &'p Probe>, floor: Option<f64>, unique: bool) -> Vec<String> {
    let mut labels: Vec<String> = probes
        .filter(|p| floor.map_or(true, |floor| p.score > floor))
        .map(|p| if unique { p.distinct.clone() } else { p.id.to_string() })
        .collect();
    labels.sort_unstable();
    labels
}

#[derive(Clone, Debug)]
enum Op {
    Add {
        key: String,
        distinct: Option<String>,
        score: u8,
    },
    Remove {
        key: String,
        distinct: Option<String>,
    },
    Prefix {
        prefix: String,
        options: SearchOptions,
    },
    Exact {
        key: String,
        options: SearchOptions,
    },
}

fn key_strategy() -> impl Strategy<Value = String> + Clone {
    // A tiny alphabet so prefixes collide, removals hit, and leaves split.
    "[abé]{0,5}"
}

fn distinct_strategy() -> impl Strategy<Value = Option<String>> + Clone {
    prop::option::of("[xy]")
}

fn options_strategy() -> impl Strategy<Value = SearchOptions> + Clone {
    (any::<bool>(), prop::option::of(0usize..12)).prop_map(|(unique, limit)| SearchOptions { unique, limit })
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        45 => (key_strategy(), distinct_strategy(), 0u8..8)
            .prop_map(|(key, distinct, score)| Op::Add { key, distinct, score }),
        15 => (key_strategy(), distinct_strategy())
            .prop_map(|(key, distinct)| Op::Remove { key, distinct }),
        30 => (key_strategy(), options_strategy())
            .prop_map(|(prefix, options)| Op::Prefix { prefix, options }),
        10 => (key_strategy(), options_strategy())
            .prop_map(|(key, options)| Op::Exact { key, options }),
    ];
    prop::collection::vec(op, 0..=300)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence_with_model(width in 1usize..6, ops in ops_strategy()) {
        let mut t: AutocompleteIndex<Probe> =
            AutocompleteIndex::with_options(IndexOptions::default().with_max_fanout_width(width));
        let mut m = Model::default();

        for (id, op) in ops.into_iter().enumerate() {
            match op {
                Op::Add { key, distinct, score } => {
                    let item = Probe::item(id, key, f64::from(score), distinct);
                    m.add(item.clone());
                    t.add(item);
                }
                Op::Remove { key, distinct } => {
                    let removed_t = t.remove(&key, distinct.as_deref());
                    let removed_m = m.remove(&key, distinct.as_deref());
                    prop_assert_eq!(removed_t, removed_m);
                }
                Op::Prefix { prefix, options } => {
                    let expected = m.prefix_search(&prefix, options);
                    let actual = t.prefix_search(&prefix, options);
                    prop_assert!(actual.iter().all(|p| p.key.starts_with(prefix.as_str())));
                    assert_same_results(&actual, &expected, options);
                }
                Op::Exact { key, options } => {
                    let expected = m.exact_search(&key, options);
                    let actual = t.exact_search(&key, options);
                    prop_assert!(actual.iter().all(|p| p.key == key));
                    assert_same_results(&actual, &expected, options);
                }
            }

            prop_assert_eq!(t.len(), m.len());
            prop_assert_eq!(t.validate_invariants(), Ok(()));
        }
    }

    #[test]
    fn prop_width_does_not_change_results(
        items in prop::collection::vec((key_strategy(), distinct_strategy(), 0u8..8), 0..=200),
        queries in prop::collection::vec((key_strategy(), options_strategy()), 1..=20),
    ) {
        let mut narrow: AutocompleteIndex<Probe> =
            AutocompleteIndex::with_options(IndexOptions::default().with_max_fanout_width(1));
        let mut wide: AutocompleteIndex<Probe> = AutocompleteIndex::new();

        for (id, (key, distinct, score)) in items.into_iter().enumerate() {
            let item = Probe::item(id, key, f64::from(score), distinct);
            narrow.add(item.clone());
            wide.add(item);
        }

        for (prefix, options) in queries {
            let expected: Vec<Probe> = wide.prefix_search(&prefix, options).into_iter().cloned().collect();
            let actual = narrow.prefix_search(&prefix, options);
            assert_same_results(&actual, &expected, options);
        }
        prop_assert_eq!(narrow.validate_invariants(), Ok(()));
        prop_assert_eq!(wide.validate_invariants(), Ok(()));
    }

    #[test]
    fn prop_repeated_query_is_identical(
        width in 1usize..4,
        items in prop::collection::vec((key_strategy(), 0u8..4), 0..=100),
        prefix in key_strategy(),
        options in options_strategy(),
    ) {
        let mut t: AutocompleteIndex<usize> =
            AutocompleteIndex::with_options(IndexOptions::default().with_max_fanout_width(width));
        for (id, (key, score)) in items.into_iter().enumerate() {
            t.add(Item::new(key, f64::from(score), id));
        }

        let first: Vec<usize> = t.prefix_search(&prefix, options).into_iter().copied().collect();
        let second: Vec<usize> = t.prefix_search(&prefix, options).into_iter().copied().collect();
        prop_assert_eq!(first, second);
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

const SMALL_SET: [(&str, f64); 6] = [
    ("a", 3.0),
    ("b", 1.0),
    ("c", 5.0),
    ("aa", 4.0),
    ("ab", 2.0),
    ("ba", 6.0),
];

const SMALL_PREFIXES: [&str; 7] = ["", "a", "b", "c", "aa", "ab", "ba"];

#[test]
fn exhaustive_insert_order_small_set() {
    for_each_permutation(&SMALL_SET, |perm| {
        let mut t: AutocompleteIndex<&str> =
            AutocompleteIndex::with_options(IndexOptions::default().with_max_fanout_width(1));
        for (key, score) in perm {
            t.add(Item::new(key, score, key));
        }
        assert_eq!(t.validate_invariants(), Ok(()));

        for prefix in SMALL_PREFIXES {
            let mut expected: Vec<(&str, f64)> = SMALL_SET
                .iter()
                .copied()
                .filter(|(key, _)| key.starts_with(prefix))
                .collect();
            expected.sort_by(|a, b| b.1.total_cmp(&a.1));
            let expected: Vec<&str> = expected.into_iter().map(|(key, _)| key).collect();

            let got: Vec<&str> = t.prefix_search(prefix, SearchOptions::new()).into_iter().copied().collect();
            assert_eq!(got, expected, "prefix {prefix:?}");
        }
    });
}

#[test]
fn exhaustive_remove_order_small_set() {
    let mut base: AutocompleteIndex<&str> =
        AutocompleteIndex::with_options(IndexOptions::default().with_max_fanout_width(1));
    for (key, score) in SMALL_SET {
        base.add(Item::new(key, score, key));
    }

    for_each_permutation(&SMALL_SET, |perm| {
        let mut t = base.clone();
        let mut remaining: Vec<(&str, f64)> = SMALL_SET.to_vec();

        for (key, _) in perm {
            assert_eq!(t.remove(key, None), 1);
            remaining.retain(|(k, _)| *k != key);
            assert_eq!(t.len(), remaining.len());
            assert_eq!(t.validate_invariants(), Ok(()));

            let best = remaining
                .iter()
                .max_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(k, _)| *k);
            let top: Vec<&str> = t
                .prefix_search("", SearchOptions::new().with_limit(1))
                .into_iter()
                .copied()
                .collect();
            assert_eq!(top.first().copied(), best);
        }
        assert!(t.is_empty());
    });
}
