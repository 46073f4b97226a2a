/// Expected EAN-13 check digit for a 12-digit payload.
///
/// Digits are weighted 3, 1, 3, ... starting from the rightmost payload
/// digit. Returns `None` unless `payload` is exactly 12 ASCII digits.
pub fn ean13_check_digit(payload: &str) -> Option<u8> {
    if payload.len() != 12 || !payload.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let sum: u32 = payload
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let digit = (b - b'0') as u32;
            if i % 2 == 0 { digit * 3 } else { digit }
        })
        .sum();

    Some(((10 - sum % 10) % 10) as u8)
}

/// Whether `code` is 13 digits with a correct EAN-13 check digit
pub fn verify_ean13(code: &str) -> bool {
    if code.len() != 13 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let (payload, check) = code.split_at(12);
    ean13_check_digit(payload) == Some(check.as_bytes()[0] - b'0')
}
