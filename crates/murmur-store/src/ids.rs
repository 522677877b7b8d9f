use rand::Rng;

const SUFFIX_LEN: usize = 8;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// `"<epoch-ms>-<8 lowercase base36 chars>"`.
pub fn generate_message_id(now_ms: i64) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect();
    format!("{}-{}", now_ms, suffix)
}
