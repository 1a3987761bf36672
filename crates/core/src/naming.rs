//! Random template name generation.

use rand::seq::IndexedRandom;
use rand::Rng;

/// Prefix of every generated template name.
pub const TEMPLATE_NAME_PREFIX: &str = "template_";

/// Number of random characters after the prefix.
pub const TEMPLATE_NAME_SUFFIX_LEN: usize = 8;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a template name such as `template_aK3xQ9bZ`.
///
/// The suffix draws distinct characters from the alphanumeric alphabet.
/// Names are not guaranteed unique and callers do not retry on collision.
pub fn random_template_name() -> String {
    random_template_name_with(&mut rand::rng())
}

/// Same as [`random_template_name`] with a caller-supplied RNG.
pub fn random_template_name_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    let suffix: String = ALPHABET
        .choose_multiple(rng, TEMPLATE_NAME_SUFFIX_LEN)
        .map(|&b| b as char)
        .collect();
    format!("{TEMPLATE_NAME_PREFIX}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn has_prefix_and_length() {
        let name = random_template_name();
        assert!(name.starts_with("template_"));
        assert_eq!(name.len(), TEMPLATE_NAME_PREFIX.len() + TEMPLATE_NAME_SUFFIX_LEN);
    }

    #[test]
    fn suffix_is_alphanumeric() {
        let name = random_template_name();
        let suffix = &name[TEMPLATE_NAME_PREFIX.len()..];
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn suffix_characters_are_distinct() {
        let name = random_template_name();
        let mut chars: Vec<char> = name[TEMPLATE_NAME_PREFIX.len()..].chars().collect();
        chars.sort_unstable();
        chars.dedup();
        assert_eq!(chars.len(), TEMPLATE_NAME_SUFFIX_LEN);
    }

    #[test]
    fn seeded_rng_is_deterministic() {
        let a = random_template_name_with(&mut StdRng::seed_from_u64(7));
        let b = random_template_name_with(&mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }
}
