#![allow(clippy::missing_docs_in_private_items)]
#![allow(clippy::arithmetic_side_effects)]
#![allow(clippy::print_stdout)]

use probing::{ProbingTable, SlotState, TableExtensions};
use rand::Rng;

// Requested size of the demo table
const DEMO_SIZE: usize = 50;
// Length of every generated key
const KEY_LENGTH: usize = 4;
const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

// Random lowercase key of KEY_LENGTH letters
fn random_string<R: Rng>(rng: &mut R) -> String {
    (0..KEY_LENGTH)
        .filter_map(|_| ALPHABET.get(rng.random_range(0..ALPHABET.len())))
        .map(|&letter| char::from(letter))
        .collect()
}

fn main() {
    env_logger::init();

    let mut rng = rand::rng();
    let mut table = ProbingTable::new(DEMO_SIZE);

    for _ in 0..=DEMO_SIZE {
        let value: f64 = rng.random_range(0.0..1_000_000.0);
        table.insert(random_string(&mut rng), value);
    }

    // Drop keys that start with a vowel to leave some tombstones behind
    let removed = table
        .keys()
        .into_iter()
        .filter(|key| key.starts_with(['a', 'e', 'i', 'o', 'u']))
        .filter(|key| table.remove(key.as_str()))
        .count();

    println!("Forwards:");
    for (key, value) in &table {
        println!("{key} | {value:.2}");
    }

    println!();
    println!("Backwards:");
    for (key, value) in table.iter().rev() {
        println!("{key} | {value:.2}");
    }

    println!();
    println!("{} entries in {} slots, {removed} removed", table.len(), table.capacity());

    let layout: String = table.slot_states().map(|state| state.to_string()).collect();
    let deleted = table.slot_states().filter(|&state| state == SlotState::Deleted).count();
    println!("Slots: {layout}");
    println!("Tombstones: {deleted}");
}
