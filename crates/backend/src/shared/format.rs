/// Разделители триад для счётчиков в логах (1234567 -> "1.234.567")
pub fn format_number(n: usize) -> String {
    let digits = n.to_string();
    let offset = digits.len() % 3;
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (i + 3 - offset) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// Денежная сумма для описаний документов, два знака после точки
pub fn format_money(amount: f64) -> String {
    format!("{:.2}", amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(42), "42");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1.000");
        assert_eq!(format_number(12345), "12.345");
        assert_eq!(format_number(1234567), "1.234.567");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(0.0), "0.00");
        assert_eq!(format_money(4.5), "4.50");
        assert_eq!(format_money(1299.999), "1300.00");
    }
}
