//! Validate a sign-up form the way a browser host would on submit.
//!
//! Run with `cargo run --example signup`.

use ruleform::{ElementId, Engine, Feedback, MemoryForm};

/// Feedback that prints instead of focusing widgets.
struct Console<'a> {
    form: &'a MemoryForm,
}

impl Feedback for Console<'_> {
    fn focus(&mut self, id: ElementId) {
        use ruleform::Form;
        if let Some(el) = self.form.element(id) {
            println!("  -> focus '{}'", el.name);
        }
    }

    fn show_message(&mut self, message: &str) {
        println!("  -> alert: {message}");
    }
}

fn main() {
    let engine = Engine::default();
    let mut form = MemoryForm::new()
        .text("email", "ada@example")
        .rules(
            r#"{"op":":filled","msg":"Enter your e-mail"},
               {"op":":email","msg":"'%value' is not a valid e-mail address"}"#,
        )
        .password("password", "hunter2")
        .rules(r#"{"op":":minLength","arg":8,"msg":"Use at least 8 characters"}"#)
        .password("confirm", "hunter2")
        .rules(r#"{"op":":equal","arg":{"control":"password"},"msg":"Passwords do not match"}"#)
        .checkbox("terms", false)
        .rules(r#"{"op":":filled","msg":"Accept the terms to continue"}"#)
        .submit("register");

    let attempts: [(&str, fn(&mut MemoryForm)); 4] = [
        ("as typed", |_| {}),
        ("fixed e-mail", |f| f.set_value("email", "ada@example.com")),
        ("longer password", |f| {
            f.set_value("password", "correct horse");
            f.set_value("confirm", "correct horse");
        }),
        ("accepted terms", |f| f.set_checked("terms", true)),
    ];

    for (label, change) in attempts {
        change(&mut form);
        println!("submit ({label}):");
        let passed = engine.validate_form(&form, &mut Console { form: &form });
        println!("  => {}", if passed { "sent" } else { "blocked" });
    }

    println!("\n{}", engine.validate_form_report(&form));
}
