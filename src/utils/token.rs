use rand::{distributions::Alphanumeric, thread_rng, Rng};

pub fn generate_access_token(length: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_have_requested_length_and_differ() {
        let a = generate_access_token(32);
        let b = generate_access_token(32);
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }
}
