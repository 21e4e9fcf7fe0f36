use rand::{distr::Alphanumeric, Rng};

/// Lowercase, hyphen-separated form of a name.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut last_was_hyphen = true;

    for c in input.chars() {
        if c.is_alphanumeric() {
            for lower in c.to_lowercase() {
                slug.push(lower);
            }
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }

    slug.trim_end_matches('-').to_string()
}

/// Slug for a new product: `slugify(name)-{random5}`. Generated once at
/// creation and never regenerated on update.
pub fn generate_slug(name: &str) -> String {
    format!("{}-{}", slugify(name), random_alnum(5).to_lowercase())
}

pub fn random_alnum(len: usize) -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_lowercases_and_hyphenates() {
        assert_eq!(slugify("MacBook Pro 16"), "macbook-pro-16");
        assert_eq!(slugify("  Café -- au Lait!  "), "café-au-lait");
    }

    #[test]
    fn generated_slugs_carry_a_random_suffix() {
        let a = generate_slug("MacBook Pro 16");
        let b = generate_slug("MacBook Pro 16");
        assert!(a.starts_with("macbook-pro-16-"));
        assert_eq!(a.len(), "macbook-pro-16-".len() + 5);
        assert_ne!(a, b);
    }

    #[test]
    fn random_alnum_has_requested_length() {
        let s = random_alnum(8);
        assert_eq!(s.len(), 8);
        assert!(s.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
