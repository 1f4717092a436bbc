//! Deterministic sample data.

use autocomplete_rs::Item;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const FIRST_NAMES: &[&str] = &[
    "Ada", "Alan", "Barbara", "Claude", "Donald", "Edsger", "Frances", "Grace", "Hedy", "Ivan",
    "Jean", "Ken", "Katherine", "Leslie", "Margaret", "Niklaus", "Radia", "Shafi", "Tana", "Teemu",
    "Tim", "Tom", "Ursula", "Vint", "Whitfield", "Yukihiro", "Zachary",
];

const LAST_NAMES: &[&str] = &[
    "Allen", "Bates", "Cerf", "Diffie", "Dijkstra", "Goldwasser", "Hamilton", "Hoare", "Hopper",
    "Johnson", "Knuth", "Lamport", "Liskov", "Matsumoto", "Orr", "Ortiz", "Perlman", "Rios",
    "Ritchie", "Shannon", "Sutherland", "Teller", "Thompson", "Turing", "Wirth",
];

const DOMAINS: &[&str] = &[
    "example.com",
    "mail.org",
    "nunc.org",
    "cras.org",
    "duifusce.ca",
    "acrisus.co.uk",
];

/// One address book entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    pub name: String,
    pub email: String,
    pub score: f64,
}

impl Contact {
    /// Identity shared by both keys of this contact.
    pub fn distinct(&self) -> String {
        format!("{}{}", self.email, self.name.to_lowercase())
    }

    /// The two items a contact is indexed under: its email address and its
    /// lower-cased name, sharing one distinct identity.
    pub fn items(&self) -> [Item<Contact>; 2] {
        let distinct = self.distinct();
        [
            Item::new(self.email.clone(), self.score, self.clone()).with_distinct(distinct.clone()),
            Item::new(self.name.to_lowercase(), self.score, self.clone()).with_distinct(distinct),
        ]
    }
}

/// `n` pseudo-random contacts. The same `seed` always yields the same list.
pub fn contacts(n: usize, seed: u64) -> Vec<Contact> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let first = FIRST_NAMES.choose(&mut rng).copied().unwrap_or("Anon");
            let last = LAST_NAMES.choose(&mut rng).copied().unwrap_or("Anon");
            let domain = DOMAINS.choose(&mut rng).copied().unwrap_or("example.com");
            Contact {
                name: format!("{first} {last}"),
                email: format!("{}.{}{i}@{domain}", first.to_lowercase(), last.to_lowercase()),
                score: rng.gen_range(0.0..100.0),
            }
        })
        .collect()
}

/// Every item for `contacts`, two per contact.
pub fn contact_items(contacts: &[Contact]) -> Vec<Item<Contact>> {
    contacts.iter().flat_map(Contact::items).collect()
}
