use ruleform::{Engine, MemoryForm, Recording};

/// Validate a single text control holding `value` against `rules`.
fn check(value: &str, rules: &str) -> bool {
    let form = MemoryForm::new().text("field", value).rules(rules);
    Engine::default().validate_form(&form, &mut Recording::new())
}

#[test]
fn min_length() {
    assert!(!check("abc", r#"{"op":":minLength","arg":4}"#));
    assert!(check("abcd", r#"{"op":":minLength","arg":4}"#));
}

#[test]
fn max_length_counts_utf16_units() {
    assert!(check("žluť", r#"{"op":":maxLength","arg":4}"#));
    // one astral character is two UTF-16 code units
    assert!(!check("😀😀😀", r#"{"op":":maxLength","arg":5}"#));
}

#[test]
fn length_bounds() {
    assert!(check("abc", r#"{"op":":length","arg":[2,5]}"#));
    assert!(!check("abcdef", r#"{"op":":length","arg":[2,5]}"#));
    assert!(check("abcdef", r#"{"op":":length","arg":[2,null]}"#));
    assert!(check("abc", r#"{"op":":length","arg":3}"#));
}

#[test]
fn range() {
    assert!(check("5", r#"{"op":":range","arg":[1,10]}"#));
    assert!(!check("5", r#"{"op":":range","arg":[null,3]}"#));
    // null argument is not applicable, so nothing fails
    assert!(check("x", r#"{"op":":range","arg":null}"#));
    // browser parseFloat semantics: numeric prefix wins
    assert!(check("7kg", r#"{"op":":range","arg":[1,10]}"#));
    assert!(!check("kg", r#"{"op":":range","arg":[1,10]}"#));
}

#[test]
fn equal() {
    assert!(check("a", r#"{"op":":equal","arg":["a","b"]}"#));
    assert!(!check("c", r#"{"op":":equal","arg":["a","b"]}"#));
    assert!(check("a", r#"{"op":":equal"}"#));
    assert!(check("5", r#"{"op":":equal","arg":5}"#));
    assert!(check("5.0", r#"{"op":":equal","arg":5}"#));
}

#[test]
fn equal_against_other_control() {
    let engine = Engine::default();
    let rules = r#"{"op":":equal","arg":{"control":"password"},"msg":"Passwords differ"}"#;
    let form = MemoryForm::new()
        .password("password", "s3cret")
        .password("confirm", "s3cret")
        .rules(rules);
    assert!(engine.validate_form(&form, &mut Recording::new()));

    let mut form = form;
    form.set_value("confirm", "secret");
    let mut rec = Recording::new();
    assert!(!engine.validate_form(&form, &mut rec));
    assert_eq!(rec.messages, vec!["Passwords differ"]);
}

#[test]
fn reference_to_missing_control_is_not_applicable() {
    assert!(check("x", r#"{"op":":equal","arg":{"control":"nope"},"msg":"m"}"#));
}

#[test]
fn email_and_url() {
    assert!(check("ada@example.com", r#"{"op":":email"}"#));
    assert!(!check("ada@example", r#"{"op":":email"}"#));
    assert!(check("www.example.com", r#"{"op":":url"}"#));
    assert!(!check("example", r#"{"op":":url"}"#));
}

#[test]
fn integer_and_float() {
    assert!(check("-42", r#"{"op":":integer"}"#));
    assert!(!check("4.2", r#"{"op":":integer"}"#));
    assert!(check("4,2", r#"{"op":":float"}"#));
    assert!(check(".5", r#"{"op":":float"}"#));
    assert!(!check("1e3", r#"{"op":":float"}"#));
}

#[test]
fn regexp_literal() {
    assert!(check("ABC", r#"{"op":":regexp","arg":"/^[a-z]+$/i"}"#));
    assert!(!check("ABC", r#"{"op":":regexp","arg":"/^[a-z]+$/"}"#));
    // unparsable literal makes the rule inapplicable
    assert!(check("ABC", r#"{"op":":regexp","arg":"[a-z]+","msg":"m"}"#));
}

#[test]
fn pattern_is_anchored() {
    assert!(check("12345", r#"{"op":":pattern","arg":"[0-9]{5}"}"#));
    assert!(!check("123456", r#"{"op":":pattern","arg":"[0-9]{5}"}"#));
    assert!(check("anything", r#"{"op":":pattern","arg":"(","msg":"m"}"#));
}

#[test]
fn empty_value_sentinel_counts_as_empty() {
    let engine = Engine::default();
    let form = MemoryForm::new()
        .text("phone", "+420")
        .empty_value("+420")
        .rules(r#"{"op":":filled","msg":"Phone required"}"#);
    let mut rec = Recording::new();
    assert!(!engine.validate_form(&form, &mut rec));
    assert_eq!(rec.messages, vec!["Phone required"]);
}

#[test]
fn checkbox_filled_means_checked() {
    let engine = Engine::default();
    let rules = r#"{"op":":filled","msg":"You must agree"}"#;
    let unchecked = MemoryForm::new().checkbox("agree", false).rules(rules);
    let checked = MemoryForm::new().checkbox("agree", true).rules(rules);
    assert!(!engine.validate_form(&unchecked, &mut Recording::new()));
    assert!(engine.validate_form(&checked, &mut Recording::new()));
}

#[test]
fn radio_group_required() {
    let engine = Engine::default();
    let rules = r#"{"op":":filled","msg":"Pick one"}"#;
    let mut form = MemoryForm::new()
        .radio("pay", "card", false)
        .rules(rules)
        .radio("pay", "cash", false)
        .rules(rules);
    let mut rec = Recording::new();
    assert!(!engine.validate_form(&form, &mut rec));
    assert_eq!(rec.messages, vec!["Pick one"]);

    form.choose("pay", "cash");
    assert!(engine.validate_form(&form, &mut Recording::new()));
}

#[test]
fn submitted_operator() {
    let engine = Engine::default();
    let mut form = MemoryForm::new()
        .text("note", "")
        .rules(r#"{"op":":submitted","control":"save","rules":[{"op":":filled","msg":"Note required"}]}"#)
        .submit("save")
        .submit("draft");

    form.set_submitter(form.id_of("draft"));
    assert!(engine.validate_form(&form, &mut Recording::new()));

    form.set_submitter(form.id_of("save"));
    assert!(!engine.validate_form(&form, &mut Recording::new()));
}
