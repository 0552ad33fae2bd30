use chrono::Utc;
use rand::Rng;

const SUFFIX_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const SUFFIX_LEN: usize = 6;

fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    (0..SUFFIX_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..SUFFIX_CHARS.len());
            SUFFIX_CHARS[idx] as char
        })
        .collect()
}

/// Номер чека: `TXN-YYYYMMDD-XXXXXX`
pub fn transaction_number() -> String {
    format!("TXN-{}-{}", Utc::now().format("%Y%m%d"), random_suffix())
}

/// Номер корректировки остатка: `ADJ-YYYYMMDD-XXXXXX`
pub fn adjustment_number() -> String {
    format!("ADJ-{}-{}", Utc::now().format("%Y%m%d"), random_suffix())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_format() {
        let number = transaction_number();
        assert_eq!(number.len(), "TXN-20250101-XXXXXX".len());
        assert!(number.starts_with("TXN-"));

        let suffix = &number[number.len() - SUFFIX_LEN..];
        assert!(suffix
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));

        let date_part = &number[4..12];
        assert!(date_part.bytes().all(|b| b.is_ascii_digit()));

        assert!(adjustment_number().starts_with("ADJ-"));
    }

    #[test]
    fn test_numbers_are_not_constant() {
        assert_ne!(transaction_number(), transaction_number());
    }
}
