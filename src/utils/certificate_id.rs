use rand::{distributions::Alphanumeric, thread_rng, Rng};

/// Human-readable, globally unique certificate identifier:
/// `CERT-<unix millis>-<9 uppercase alphanumerics>`.
pub fn generate_certificate_id() -> String {
    let suffix: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(|c| (c as char).to_ascii_uppercase())
        .collect();
    format!("CERT-{}-{}", chrono::Utc::now().timestamp_millis(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_expected_shape() {
        let id = generate_certificate_id();
        let parts: Vec<&str> = id.splitn(3, '-').collect();
        assert_eq!(parts[0], "CERT");
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 9);
        assert!(parts[2].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn successive_ids_differ() {
        let a = generate_certificate_id();
        let b = generate_certificate_id();
        assert_ne!(a, b);
    }
}
