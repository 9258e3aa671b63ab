use rand::seq::IndexedRandom;

/// Room code alphabet. I, O, 0 and 1 are left out since they are easy to misread.
pub const ROOM_CODE_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const ROOM_CODE_LENGTH: usize = 6;

/// Random join code. Uniqueness is enforced by the store, not here.
pub fn generate_room_code() -> String {
    let mut rng = rand::rng();
    std::iter::repeat_with(|| ROOM_CODE_CHARSET.choose(&mut rng).copied())
        .take(ROOM_CODE_LENGTH)
        .flatten()
        .map(char::from)
        .collect()
}

/// Codes are matched case-insensitively; players often type them lowercase
pub fn normalize_room_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}
