use rand::Rng;

pub const NAME_PREFIXES: [&str; 20] = [
    "Kepler", "Gliese", "HD", "TOI", "K2", "TRAPPIST", "Proxima", "Wolf", "Ross", "LHS", "Alpha",
    "Beta", "Gamma", "Delta", "Epsilon", "Zeta", "Eta", "Theta", "Nova", "Stellar",
];

pub const NAME_SUFFIXES: [&str; 12] = [
    "b", "c", "d", "e", "f", "g", "h", "Prime", "Alpha", "Beta", "Major", "Minor",
];

/// Catalogue-style name such as `Kepler-4242b`.
pub fn random_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let prefix = NAME_PREFIXES[rng.random_range(0..NAME_PREFIXES.len())];
    let number: u32 = rng.random_range(100..9999);
    let suffix = NAME_SUFFIXES[rng.random_range(0..NAME_SUFFIXES.len())];
    format!("{prefix}-{number}{suffix}")
}

/// Name of the `index`-th member of a system; ordinals wrap around.
pub fn system_member_name(system: &str, index: usize) -> String {
    format!("{} {}", system, NAME_SUFFIXES[index % NAME_SUFFIXES.len()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_name_shape() {
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..200 {
            let name = random_name(&mut rng);
            let (prefix, rest) = name.split_once('-').unwrap();
            assert!(NAME_PREFIXES.contains(&prefix));
            let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
            let number: u32 = digits.parse().unwrap();
            assert!((100..9999).contains(&number));
            assert!(NAME_SUFFIXES.contains(&&rest[digits.len()..]));
        }
    }

    #[test]
    fn test_system_names_wrap() {
        assert_eq!(system_member_name("Sol", 0), "Sol b");
        assert_eq!(system_member_name("Sol", 7), "Sol Prime");
        assert_eq!(system_member_name("Sol", 12), "Sol b");
    }
}
