use novella_core::eval::{apply_assignment, check_condition, format_number, Variables};

#[test]
fn test_unset_variable_compares_as_empty() {
    let vars = Variables::default();
    assert!(!check_condition("$a", "==", "1", &vars));
    assert!(check_condition("$a", "!=", "1", &vars));
    assert!(check_condition("$a", "==", "", &vars));
}

#[test]
fn test_literal_left_operand() {
    let vars = Variables::default();
    assert!(check_condition("3", ">", "2", &vars));
    assert!(check_condition("abc", "==", "abc", &vars));
    assert!(!check_condition("a", "==", "1", &vars));
}

#[test]
fn test_numeric_and_string_operators() {
    let mut vars = Variables::default();
    vars.insert("$hp".into(), "10".into());
    vars.insert("$name".into(), "mio".into());

    assert!(check_condition("$hp", ">=", "10", &vars));
    assert!(check_condition("$hp", "<", "10.5", &vars));
    assert!(check_condition("$hp", "==", "10.0", &vars));
    assert!(!check_condition("$hp", "!=", "10", &vars));

    assert!(check_condition("$name", "==", "mio", &vars));
    assert!(!check_condition("$name", ">", "a", &vars));
    assert!(!check_condition("$name", "=~", "mio", &vars));
}

#[test]
fn test_arithmetic_sequence() {
    let mut vars = Variables::default();
    apply_assignment(&mut vars, "$n", "=", "5");
    apply_assignment(&mut vars, "$n", "+=", "2.5");
    assert_eq!(vars["$n"], "7.5");
    apply_assignment(&mut vars, "$n", "+=", "2");
    assert_eq!(vars["$n"], "9.5");
    apply_assignment(&mut vars, "$n", "-=", "10");
    assert_eq!(vars["$n"], "-0.5");
}

#[test]
fn test_string_fallbacks() {
    let mut vars = Variables::default();
    apply_assignment(&mut vars, "$s", "+=", "ab");
    assert_eq!(vars["$s"], "ab");
    apply_assignment(&mut vars, "$s", "+=", "1");
    assert_eq!(vars["$s"], "ab1");
    apply_assignment(&mut vars, "$s", "-=", "1");
    assert_eq!(vars["$s"], "ab1");
}

#[test]
fn test_ignored_assignments() {
    let mut vars = Variables::default();
    apply_assignment(&mut vars, "n", "=", "5");
    apply_assignment(&mut vars, "$n", "*=", "5");
    assert!(vars.is_empty());
}

#[test]
fn test_format_number() {
    assert_eq!(format_number(7.0), "7");
    assert_eq!(format_number(-0.5), "-0.5");
    assert_eq!(format_number(0.1 + 0.2), (0.1f64 + 0.2).to_string());
}
