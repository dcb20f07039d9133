use super::Val;

/// ## PRINT USING templates
///
/// The format mini-language: `#` digit positions with an optional `.`,
/// `$$` currency prefix, `**` asterisk fill, `+` and trailing `-` sign
/// control, `^^^^` exponential notation, `\ \` fixed-width string
/// fields, `!` first character, `&` whole string.

pub fn format_with(format: &str, val: &Val) -> String {
    if format.contains('#') {
        return format_numeric(format, val.number());
    }
    if format.len() >= 2 && format.starts_with('\\') && format.ends_with('\\') {
        let width = format.chars().count();
        let text = display(val);
        let mut out: String = text.chars().take(width).collect();
        while out.chars().count() < width {
            out.push(' ');
        }
        return out;
    }
    match format {
        "!" => match display(val).chars().next() {
            Some(ch) => ch.to_string(),
            None => " ".to_string(),
        },
        "&" => display(val),
        _ => display(val),
    }
}

fn display(val: &Val) -> String {
    val.to_string()
}

fn format_numeric(format: &str, value: f64) -> String {
    let dollar = format.contains('$');
    let asterisk = format.contains('*');
    let plus = format.contains('+');
    let minus = format.ends_with('-');
    let exponential = format.contains("^^^^");

    let cleaned: String = format
        .chars()
        .filter(|c| !matches!(c, '$' | '*' | '+' | '-' | '^'))
        .collect();
    let dec_pos = cleaned.find('.');
    let mut int_digits = cleaned.matches('#').count();
    let mut dec_digits = 0;
    if let Some(pos) = dec_pos {
        dec_digits = cleaned[pos..].matches('#').count();
        int_digits -= dec_digits;
    }

    let mut result = if exponential {
        format_exponential(value, dec_digits)
    } else if dec_pos.is_some() {
        format!(
            "{:>width$.prec$}",
            value,
            width = int_digits + dec_digits + 1,
            prec = dec_digits
        )
    } else {
        format!("{:>width$.0}", value, width = int_digits)
    };

    if plus && value >= 0.0 {
        result = format!("+{}", result);
    }
    if minus && value < 0.0 {
        result = format!("{}-", result.trim_start_matches('-'));
    }
    if dollar {
        result = format!("${}", result.trim_start());
    }
    if asterisk {
        result = result.replace(' ', "*");
    }
    result
}

/// `1234.5` with two digits becomes `1.23E+03`.
fn format_exponential(value: f64, dec_digits: usize) -> String {
    let s = format!("{:.*e}", dec_digits, value);
    match s.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            format!("{}E{:+03}", mantissa, exp)
        }
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_field() {
        assert_eq!(format_with("###.##", &Val::Double(3.14159)), "  3.14");
        assert_eq!(format_with("#####", &Val::Integer(42)), "   42");
    }

    #[test]
    fn test_currency_and_fill() {
        assert_eq!(format_with("$$###.##", &Val::Double(9.5)), "$9.50");
        assert_eq!(format_with("**###.##", &Val::Double(9.5)), "**9.50");
    }

    #[test]
    fn test_signs() {
        assert_eq!(format_with("+###", &Val::Integer(7)), "+  7");
        assert_eq!(format_with("###-", &Val::Integer(-7)), "  7-");
    }

    #[test]
    fn test_exponential() {
        assert_eq!(format_with("##.##^^^^", &Val::Double(1234.5)), "1.23E+03");
    }

    #[test]
    fn test_string_fields() {
        assert_eq!(format_with("!", &Val::String("HELLO".into())), "H");
        assert_eq!(format_with("&", &Val::String("HELLO".into())), "HELLO");
        assert_eq!(format_with("\\  \\", &Val::String("HELLO".into())), "HELL");
        assert_eq!(format_with("\\  \\", &Val::String("HI".into())), "HI  ");
    }
}
