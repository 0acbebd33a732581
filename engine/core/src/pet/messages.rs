//! Speech Lines
//!
//! Static table of short lines keyed by personality, context and mood bucket.
//! Lookups never fail: unknown personalities read as [`Personality::Cheerful`],
//! unknown contexts as [`MessageContext::Greeting`], and every mood maps to one
//! of three buckets.

use rand::seq::SliceRandom;
use rand::Rng;

use super::Mood;

/// Line returned when a table cell is empty
pub const FALLBACK_LINE: &str = "Meow~";

/// Temperament that flavors every line
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Personality {
    /// Upbeat and chatty
    #[default]
    Cheerful,
    /// Quiet, trailing off
    Shy,
    /// Odd and theatrical
    Quirky,
}

impl Personality {
    /// Parse a personality key; unknown keys read as cheerful
    #[must_use]
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "shy" => Self::Shy,
            "quirky" => Self::Quirky,
            "cheerful" => Self::Cheerful,
            other => {
                tracing::debug!(personality = other, "Unknown personality, using cheerful");
                Self::Cheerful
            }
        }
    }
}

/// Situation the line is spoken in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MessageContext {
    /// Startup and hellos
    #[default]
    Greeting,
    /// While the user is working
    Encouragement,
    /// Nudges to take a break
    Rest,
}

impl MessageContext {
    /// Parse a context key; unknown keys read as greeting
    #[must_use]
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "encouragement" | "encourage" => Self::Encouragement,
            "rest" => Self::Rest,
            _ => Self::Greeting,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Bucket {
    Normal,
    Happy,
    Tired,
}

impl From<Mood> for Bucket {
    fn from(mood: Mood) -> Self {
        match mood {
            Mood::Happy | Mood::Excited | Mood::Playful => Self::Happy,
            Mood::Tired | Mood::Sleepy | Mood::Sad => Self::Tired,
            Mood::Normal | Mood::Relaxed => Self::Normal,
        }
    }
}

fn lines(personality: Personality, context: MessageContext, bucket: Bucket) -> &'static [&'static str] {
    use Bucket as B;
    use MessageContext as C;
    use Personality as P;

    match (personality, context, bucket) {
        (P::Cheerful, C::Greeting, B::Normal) => &[
            "Hi! What are we coding today?",
            "Hello there! Let's write some code!",
        ],
        (P::Cheerful, C::Greeting, B::Happy) => &[
            "What a great day for programming!",
            "So glad to see you! Time to code!",
        ],
        (P::Cheerful, C::Greeting, B::Tired) => &[
            "Hey... a bit sleepy, but happy you're here!",
            "Mmh... maybe a lighter coding day today?",
        ],
        (P::Cheerful, C::Encouragement, B::Normal) => {
            &["You're doing great, keep going!", "That code looks good!"]
        }
        (P::Cheerful, C::Encouragement, B::Happy) => &[
            "Wow, you're a programming wizard!",
            "Look at all that code, amazing!",
        ],
        (P::Cheerful, C::Encouragement, B::Tired) => &[
            "You've written a lot already... break soon?",
            "Still at it? You're so persistent!",
        ],
        (P::Cheerful, C::Rest, B::Normal) => &[
            "A short break keeps you sharp!",
            "Step away for a moment, then come back fresh!",
        ],
        (P::Cheerful, C::Rest, B::Happy) => &[
            "Break time! Let's relax together!",
            "Healthy programmers write healthy code. Rest up!",
        ],
        (P::Cheerful, C::Rest, B::Tired) => &["Finally... a rest...", "Need a break... eyes closing..."],

        (P::Shy, C::Greeting, B::Normal) => &["Hi... coding today?", "Hello..."],
        (P::Shy, C::Greeting, B::Happy) => &[
            "Oh, you're here! I was waiting for you...",
            "Today feels like a good day...",
        ],
        (P::Shy, C::Greeting, B::Tired) => &["Mm... you came...", "Not much energy today..."],
        (P::Shy, C::Encouragement, B::Normal) => &["Your code... looks nice...", "Keep going..."],
        (P::Shy, C::Encouragement, B::Happy) => &[
            "Wow... you're really good at this...",
            "I think... your code is lovely...",
        ],
        (P::Shy, C::Encouragement, B::Tired) => &["You've done so much...", "Maybe... a little break?"],
        (P::Shy, C::Rest, B::Normal) => &["Maybe we should rest...", "A short break helps..."],
        (P::Shy, C::Rest, B::Happy) => &["Break time... yay...", "Resting is good..."],
        (P::Shy, C::Rest, B::Tired) => &["Finally... rest...", "I need... to sleep..."],

        (P::Quirky, C::Greeting, B::Normal) => &[
            "Ha! Another coding adventure begins!",
            "The code sprite has arrived! Ready?",
        ],
        (P::Quirky, C::Greeting, B::Happy) => &[
            "Woohoo! It's raining code! Enter the matrix!",
            "Code, coffee and me. Perfect day!",
        ],
        (P::Quirky, C::Greeting, B::Tired) => &[
            "Mmf... code looks blurry... recharging...",
            "Low battery on the coding meter today...",
        ],
        (P::Quirky, C::Encouragement, B::Normal) => &[
            "Your keyboard is on fire! Metaphorically.",
            "Bugs flee before you!",
        ],
        (P::Quirky, C::Encouragement, B::Happy) => &[
            "Legendary commit incoming!",
            "Compilers everywhere salute you!",
        ],
        (P::Quirky, C::Encouragement, B::Tired) => &[
            "Brain.exe has stopped responding. Break?",
            "Even robots need to cool their CPUs...",
        ],
        (P::Quirky, C::Rest, B::Normal) => &[
            "Rest mode: activated!",
            "Time to defragment your brain!",
        ],
        (P::Quirky, C::Rest, B::Happy) => &[
            "Snack break! Snack break!",
            "Let's stare at the ceiling for science!",
        ],
        (P::Quirky, C::Rest, B::Tired) => &["Zzz... segfault... zzz...", "Entering hibernation..."],
    }
}

/// Pick a random line for `personality` in `context` and `mood`
pub fn message_for<R: Rng + ?Sized>(
    personality: &str,
    context: MessageContext,
    mood: Mood,
    rng: &mut R,
) -> &'static str {
    let candidates = lines(Personality::from_key(personality), context, Bucket::from(mood));
    candidates.choose(rng).copied().unwrap_or(FALLBACK_LINE)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_every_cell_has_lines() {
        for personality in [Personality::Cheerful, Personality::Shy, Personality::Quirky] {
            for context in [
                MessageContext::Greeting,
                MessageContext::Encouragement,
                MessageContext::Rest,
            ] {
                for bucket in [Bucket::Normal, Bucket::Happy, Bucket::Tired] {
                    assert!(!lines(personality, context, bucket).is_empty());
                }
            }
        }
    }

    #[test]
    fn test_unknown_personality_reads_as_cheerful() {
        assert_eq!(Personality::from_key("grumpy"), Personality::Cheerful);
        assert_eq!(Personality::from_key("Shy"), Personality::Shy);

        let mut rng = StdRng::seed_from_u64(7);
        let line = message_for("grumpy", MessageContext::Rest, Mood::Tired, &mut rng);
        assert!(lines(Personality::Cheerful, MessageContext::Rest, Bucket::Tired).contains(&line));
    }

    #[test]
    fn test_moods_map_to_buckets() {
        assert_eq!(Bucket::from(Mood::Excited), Bucket::Happy);
        assert_eq!(Bucket::from(Mood::Sleepy), Bucket::Tired);
        assert_eq!(Bucket::from(Mood::Relaxed), Bucket::Normal);
    }

    #[test]
    fn test_unknown_context_reads_as_greeting() {
        assert_eq!(MessageContext::from_key("farewell"), MessageContext::Greeting);
        assert_eq!(MessageContext::from_key("rest"), MessageContext::Rest);
    }
}
