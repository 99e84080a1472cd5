//! Registering an application-specific operator.
//!
//! Form renderers emit namespaced operator names such as `App\Rules::isbn`.
//! The engine normalizes them to `AppRules_isbn`, and registration accepts
//! the same spelling.
//!
//! Run with `cargo run --example custom_operator`.

use ruleform::{Engine, MemoryForm, Outcome, Recording};

/// ISBN-10 checksum.
fn isbn10(code: &str) -> bool {
    let digits: Vec<u32> = code
        .chars()
        .filter(|c| *c != '-')
        .enumerate()
        .filter_map(|(i, c)| match c {
            'X' | 'x' if i == 9 => Some(10),
            c => c.to_digit(10),
        })
        .collect();
    digits.len() == 10
        && digits
            .iter()
            .zip((1..=10).rev())
            .map(|(d, w)| d * w)
            .sum::<u32>()
            % 11
            == 0
}

fn main() {
    let engine = match Engine::builder()
        .operator(r"App\Rules::isbn", |input| {
            input
                .value
                .and_then(|v| v.as_text())
                .map_or(Outcome::NotApplicable, |code| isbn10(code).into())
        })
        .build()
    {
        Ok(engine) => engine,
        Err(err) => {
            eprintln!("bad configuration: {err}");
            return;
        }
    };
    println!("registered: {:?}", engine.custom_operators());

    for code in ["0-306-40615-2", "0-306-40615-3"] {
        let form = MemoryForm::new()
            .text("isbn", code)
            .rules(r#"{"op":"App\\Rules::isbn","msg":"%value is not a valid ISBN"}"#);
        let mut rec = Recording::new();
        let passed = engine.validate_form(&form, &mut rec);
        let verdict = if passed {
            "ok"
        } else {
            rec.messages.first().map_or("invalid", String::as_str)
        };
        println!("{code}: {verdict}");
    }
}
