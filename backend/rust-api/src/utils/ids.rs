use rand::Rng;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LEN: usize = 9;

/// Short random base-36 identifier for generated questions and passages.
/// Collisions are possible but negligible for a single user's session.
pub fn short_id() -> String {
    let mut rng = rand::rng();
    (0..ID_LEN)
        .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

pub fn part_id(index: usize) -> String {
    format!("part-{}", index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_id_is_nine_base36_chars() {
        let id = short_id();
        assert_eq!(id.len(), ID_LEN);
        assert!(id
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn part_ids_follow_position() {
        assert_eq!(part_id(0), "part-0");
        assert_eq!(part_id(6), "part-6");
    }
}
