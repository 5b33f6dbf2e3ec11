//! Condition checks and variable assignment for `@if` and `@set`.

use rustc_hash::FxHashMap;

use novella_script::ast::VARIABLE_SIGIL;

/// Variable store. Values are kept as text and coerced on use.
pub type Variables = FxHashMap<String, String>;

fn number(s: &str) -> Option<f64> {
    s.parse::<f64>().ok()
}

/// Whole results print without a fractional part, everything else in the
/// shortest decimal form.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        (value as i64).to_string()
    } else {
        value.to_string()
    }
}

/// Compares `name op value`. A `$name` reads the variable (empty when unset),
/// anything else is taken literally. Two numbers compare numerically under all
/// six operators; otherwise only `==` and `!=` hold, as string equality.
pub fn check_condition(name: &str, op: &str, value: &str, vars: &Variables) -> bool {
    let current = if name.starts_with(VARIABLE_SIGIL) {
        vars.get(name).map(String::as_str).unwrap_or("")
    } else {
        name
    };

    if let (Some(a), Some(b)) = (number(current), number(value)) {
        return match op {
            "==" => a == b,
            "!=" => a != b,
            ">" => a > b,
            "<" => a < b,
            ">=" => a >= b,
            "<=" => a <= b,
            _ => false,
        };
    }

    match op {
        "==" => current == value,
        "!=" => current != value,
        _ => false,
    }
}

/// Applies `name op value` where `op` is `=`, `+=` or `-=`. Names without the
/// sigil and unknown operators are ignored.
pub fn apply_assignment(vars: &mut Variables, name: &str, op: &str, value: &str) {
    if !name.starts_with(VARIABLE_SIGIL) {
        log::debug!("@set ignored: '{}' is not a variable", name);
        return;
    }
    let current = vars.get(name).map(String::as_str).unwrap_or("");
    let next = match op {
        "=" => value.to_string(),
        "+=" => match (number(current), number(value)) {
            (Some(a), Some(b)) => format_number(a + b),
            _ => format!("{current}{value}"),
        },
        "-=" => match (number(current), number(value)) {
            (Some(a), Some(b)) => format_number(a - b),
            _ => return,
        },
        _ => {
            log::warn!("@set: unknown operator '{}'", op);
            return;
        }
    };
    log::trace!("{} {} {} -> {}", name, op, value, next);
    vars.insert(name.to_string(), next);
}
