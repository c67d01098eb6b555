//! Chat titles derived from the first user message.

use chrono::Timelike;
use rand::seq::SliceRandom;
use rand::Rng;

const MAX_TITLE_CHARS: usize = 60;
const MAX_WORDS: usize = 6;

const ADJECTIVES: &[&str] = &[
    "Creative",
    "Technical",
    "Product",
    "Business",
    "Content",
    "Research",
    "Learning",
    "Shared",
    "Experimental",
    "Curious",
];

const TOPICS: &[&str] = &[
    "Ideas",
    "Insights",
    "Explorations",
    "Analyses",
    "Findings",
    "Plans",
    "Solutions",
    "Concepts",
    "Strategies",
    "Notes",
];

/// Title for a chat whose first message is `seed`. Falls back to a
/// generated title when the message has nothing usable.
pub fn chat_title(seed: &str) -> String {
    title_from_seed(seed).unwrap_or_else(|| {
        generated_title(chrono::Local::now().hour(), &mut rand::thread_rng())
    })
}

/// Random adjective and topic followed by the part of the day, e.g.
/// "Research Plans This Evening".
pub fn generated_title<R: Rng + ?Sized>(hour: u32, rng: &mut R) -> String {
    let adjective = ADJECTIVES.choose(rng).copied().unwrap_or("New");
    let topic = TOPICS.choose(rng).copied().unwrap_or("Chat");
    format!("{adjective} {topic} {}", part_of_day(hour))
}

fn part_of_day(hour: u32) -> &'static str {
    match hour {
        5..=11 => "This Morning",
        12..=17 => "This Afternoon",
        _ => "This Evening",
    }
}

/// First sentence of `seed`, cut to six words and 60 characters, with
/// trailing punctuation removed and the first letter capitalized.
pub fn title_from_seed(seed: &str) -> Option<String> {
    let normalized = seed.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        return None;
    }

    let sentence = normalized
        .split(['.', '!', '?'])
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(&normalized);

    let excerpt: String = sentence
        .split_whitespace()
        .take(MAX_WORDS)
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(MAX_TITLE_CHARS)
        .collect();
    let excerpt = excerpt.trim_end_matches([' ', ',', ';', ':', '-']);

    let mut chars = excerpt.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}
