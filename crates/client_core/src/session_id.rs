use rand::Rng;
use shared::domain::SessionId;

pub const SESSION_ID_LEN: usize = 32;

/// Mints a fresh artifact-namespace id.
///
/// The first character is drawn uniformly from the 25 letters `A..=Y`. Every
/// following character comes from sampling an ASCII code point in `[48, 90)`
/// and rejecting the punctuation block `[58, 64]` between the digits and the
/// uppercase letters, until the id reaches 32 characters. Pure generator;
/// the caller stores the result as the new current id.
pub fn generate_session_id() -> SessionId {
    let mut rng = rand::thread_rng();
    let mut id = String::with_capacity(SESSION_ID_LEN);
    id.push((b'A' + rng.gen_range(0u8..25)) as char);
    while id.len() < SESSION_ID_LEN {
        let code = 48 + rng.gen_range(0u8..42);
        if (58..=64).contains(&code) {
            continue;
        }
        id.push(code as char);
    }
    SessionId(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_32_chars_with_a_leading_letter() {
        for _ in 0..200 {
            let id = generate_session_id();
            assert_eq!(id.0.len(), SESSION_ID_LEN);
            let first = id.0.as_bytes()[0];
            assert!((b'A'..=b'Y').contains(&first), "bad first char in {id}");
        }
    }

    #[test]
    fn generated_ids_never_contain_the_rejected_punctuation_block() {
        for _ in 0..200 {
            let id = generate_session_id();
            assert!(
                id.0.bytes().all(|b| !(58..=64).contains(&b)),
                "punctuation leaked into {id}"
            );
            assert!(id.0.bytes().all(|b| (48..90).contains(&b)));
        }
    }

    #[test]
    fn successive_ids_are_distinct() {
        let first = generate_session_id();
        let second = generate_session_id();
        assert_ne!(first, second);
    }
}
