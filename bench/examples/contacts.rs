//! Index a generated address book and run a few autocomplete queries.

use autocomplete_bench::sample::{contact_items, contacts};
use autocomplete_bench::FlatList;
use autocomplete_rs::{AutocompleteIndex, SearchOptions};

fn main() {
    let people = contacts(20_000, 7);
    let items = contact_items(&people);

    let mut index: AutocompleteIndex<_> = items.iter().cloned().collect();
    let mut list = FlatList::new();
    list.extend(items);
    list.sort();

    println!(
        "Indexed {} items for {} contacts (~{} KiB)\n",
        index.len(),
        people.len(),
        index.memory_usage() / 1024
    );

    for (prefix, limit) in [("t", 5), ("tee", 3), ("grace h", 4), ("ada.", 3)] {
        let options = SearchOptions::new().with_limit(limit).unique();

        println!("{prefix:?} (limit {limit}):");
        for contact in index.prefix_search(prefix, options) {
            println!("  {:>6.2}  {:<24} {}", contact.score, contact.name, contact.email);
        }

        let baseline = list
            .sorted_prefix_search(prefix, options)
            .map(|values| values.len())
            .unwrap_or(0);
        println!("  (flat list found {baseline})\n");
    }

    match index.validate_invariants() {
        Ok(()) => println!("Index invariants hold."),
        Err(err) => println!("Index invariant violated: {err}"),
    }
}
