/// How the candidate answered "do you have any questions for me?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyIntent {
    Affirmative,
    Negative,
    Question,
    Unrecognized,
}

const REFUSALS: &[&str] = &[
    "no",
    "nope",
    "nothing",
    "that's all",
    "that's it",
    "i'm good",
    "im good",
    "not really",
    "no thanks",
    "no thank you",
    "none",
    "i don't",
    "i dont",
];

const QUESTION_WORDS: &[&str] = &[
    "what", "how", "why", "can", "could", "would", "is", "are", "do",
];

const AFFIRMATIVE_PREFIXES: &[&str] = &["yes", "yeah", "sure", "yep", "i do", "i have", "actually"];

/// Classifies a wrap-up reply. Negative wins over Question, Question over
/// Affirmative.
pub fn classify_reply(text: &str) -> ReplyIntent {
    let lowered = text.trim().to_lowercase();
    let bare = lowered.trim_end_matches(['.', '!']).trim_end();

    if REFUSALS.contains(&bare) {
        return ReplyIntent::Negative;
    }

    if lowered.contains('?') || QUESTION_WORDS.iter().any(|word| starts_with_word(bare, word)) {
        return ReplyIntent::Question;
    }

    if AFFIRMATIVE_PREFIXES
        .iter()
        .any(|prefix| starts_with_word(bare, prefix))
    {
        return ReplyIntent::Affirmative;
    }

    ReplyIntent::Unrecognized
}

/// `prefix` followed by the end of the text or a non-alphanumeric character.
fn starts_with_word(text: &str, prefix: &str) -> bool {
    match text.strip_prefix(prefix) {
        Some(rest) => rest
            .chars()
            .next()
            .map_or(true, |next| !next.is_alphanumeric() && next != '\''),
        None => false,
    }
}
