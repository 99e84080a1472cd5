//! Conditional sections driven by a checkbox and a select.
//!
//! Run with `cargo run --example shipping`.

use ruleform::{Engine, MemoryForm, Visibility};

/// Prints every visibility change.
struct Page;

impl Visibility for Page {
    fn set_visible(&mut self, target: &str, visible: bool) {
        println!("  {target}: {}", if visible { "shown" } else { "hidden" });
    }
}

fn main() {
    let engine = Engine::default();
    let mut form = MemoryForm::new()
        .checkbox("other-address", false)
        .rules(r#"{"op":":filled","toggle":{"shipping-address":true}}"#)
        .select("country", "cz")
        .rules(r#"{"op":":equal","arg":["us","ca"],"toggle":{"state-row":true,"vat-row":false}}"#)
        .text("street", "")
        .rules(
            r#"{"op":":filled","control":"other-address","rules":[{"op":":filled","msg":"Enter the street"}]}"#,
        );

    println!("initial pass:");
    let mut attachment = engine.attach(&form, &mut Page);

    println!("tick 'ship elsewhere':");
    form.set_checked("other-address", true);
    if let Some(id) = form.id_of("other-address") {
        attachment.on_click(&form, id, &mut Page);
    }

    println!("pick 'us':");
    form.set_value("country", "us");
    if let Some(id) = form.id_of("country") {
        attachment.on_change(&form, id, &mut Page);
    }

    let report = engine.validate_form_report(&form);
    println!("submit: {report}");
    attachment.detach();
}
