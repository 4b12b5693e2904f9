use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};

/// Length of generated entity ids.
pub const ID_LEN: usize = 9;

/// Generate a short random id for a goal, tag, layout or widget.
///
/// Ids are lowercase alphanumeric so they stay readable in the snapshot file.
pub fn new_id() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LEN)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect()
}

/// Generate an id that is not contained in `taken`.
pub fn new_unique_id<'a>(taken: impl Iterator<Item = &'a str> + Clone) -> String {
    loop {
        let id = new_id();
        if !taken.clone().any(|t| t == id) {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_short_and_lowercase() {
        let id = new_id();
        assert_eq!(id.len(), ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn unique_id_skips_taken() {
        let taken = vec!["abc".to_string()];
        let id = new_unique_id(taken.iter().map(String::as_str));
        assert_ne!(id, "abc");
    }
}
