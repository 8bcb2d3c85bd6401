mod support;

use std::cell::Cell;
use std::rc::Rc;

use dialkit::prelude::*;
use support::{Recorder, card_config};

fn approx(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}

#[test]
fn update_reaches_values_and_subscriber_once() {
    let store = DialStore::new();
    let schema = parse_from_json(
        r#"{ "opacity": [1, 0, 1, 0.01], "label": { "type": "text", "default": "hi" } }"#,
    )
    .unwrap();
    store.register_panel("p", "Panel", schema);

    let values = store.get_values("p").unwrap();
    assert_eq!(values["opacity"], ControlValue::Number(1.0));
    assert_eq!(values["label"], ControlValue::from("hi"));

    let recorder = Recorder::new();
    let sink = recorder.clone();
    let weak = store.downgrade();
    let _sub = store
        .subscribe("p", move |_| {
            let store = weak.upgrade().unwrap();
            sink.push(store.get_values("p").unwrap()["opacity"].clone());
        })
        .unwrap();

    store.update_value("p", "opacity", 0.37).unwrap();
    assert_eq!(
        store.get_values("p").unwrap()["opacity"],
        ControlValue::Number(0.37)
    );
    assert_eq!(recorder.items(), vec![ControlValue::Number(0.37)]);
}

#[test]
fn nested_paths_are_dotted() {
    let store = DialStore::new();
    let schema = parse_from_str("fx:\n  blur: [24, 0, 100]\n").unwrap();
    store.register_panel("p", "Panel", schema);

    let panel = store.get_panel("p").unwrap();
    assert_eq!(panel.controls[0].children()[0].path, "fx.blur");

    store.update_value("p", "fx.blur", 55.0).unwrap();
    assert_eq!(store.get_resolved_values("p").unwrap().float("fx.blur"), 55.0);
    assert!(matches!(
        store.update_value("p", "fx.nonexistent", 1.0),
        Err(DialError::InvalidPath { .. })
    ));
}

#[test]
fn spring_mode_round_trip() {
    let store = DialStore::new();
    let schema = parse_from_str(
        "motion: { type: spring, visualDuration: 0.3, bounce: 0.2 }",
    )
    .unwrap();
    store.register_panel("p", "Panel", schema);
    assert_eq!(
        store.get_spring_mode("p", "motion").unwrap(),
        SpringMode::Simple
    );

    store
        .update_spring_mode("p", "motion", SpringMode::Advanced)
        .unwrap();
    let spring = store.get_resolved_values("p").unwrap().spring("motion");
    assert_eq!(spring.mass, Some(1.0));
    assert!(approx(spring.stiffness.unwrap(), 438.6, 0.1));
    assert!(approx(spring.damping.unwrap(), 33.5, 0.1));

    store
        .update_spring_mode("p", "motion", SpringMode::Simple)
        .unwrap();
    let spring = store.get_resolved_values("p").unwrap().spring("motion");
    assert!(approx(spring.visual_duration.unwrap(), 0.3, 1e-6));
    assert!(approx(spring.bounce.unwrap(), 0.2, 1e-6));
}

#[test]
fn preset_overlay_ignores_stale_paths() {
    let store = DialStore::new();
    store.register_panel("p", "Card", card_config());
    store.update_value("p", "blur", 40.0).unwrap();
    store.update_value("p", "title", "Saved").unwrap();
    let preset = store.save_preset("p", "Version 2").unwrap();

    let trimmed = parse_from_str(
        "blur: [10, 0, 100]\ntitle: { type: color, default: '#123456' }\nextra: false\n",
    )
    .unwrap();
    store.register_panel("p", "Card", trimmed);
    store.update_value("p", "blur", 5.0).unwrap();
    store.update_value("p", "extra", true).unwrap();

    let events = Recorder::new();
    let sink = events.clone();
    let _sub = store.subscribe("p", move |e| sink.push(e.clone())).unwrap();
    store.load_preset("p", &preset.id).unwrap();

    let values = store.get_values("p").unwrap();
    assert_eq!(values["blur"], ControlValue::Number(40.0));
    // title was a text field when saved and is a color now; both are strings
    assert_eq!(values["title"], ControlValue::from("Saved"));
    assert_eq!(values["extra"], ControlValue::Bool(true));
    assert!(!values.contains_key("opacity"));
    assert_eq!(
        events.items(),
        vec![PanelEvent::PresetLoaded {
            preset_id: preset.id.clone()
        }]
    );
    assert_eq!(
        store.get_active_preset_id("p").unwrap(),
        Some(preset.id)
    );
}

#[test]
fn active_preset_clears_only_on_divergence() {
    let store = DialStore::new();
    store.register_panel("p", "Card", card_config());
    let preset = store.save_preset("p", "A").unwrap();

    // rounds to the stored 0.5
    store.update_value("p", "opacity", 0.51).unwrap();
    assert_eq!(
        store.get_active_preset_id("p").unwrap().as_deref(),
        Some(preset.id.as_str())
    );

    store.update_value("p", "visible", false).unwrap();
    assert_eq!(store.get_active_preset_id("p").unwrap(), None);
}

#[test]
fn listener_can_unsubscribe_during_delivery() {
    let store = DialStore::new();
    store.register_panel("p", "Card", card_config());

    let first_calls = Rc::new(Cell::new(0));
    let second_calls = Rc::new(Cell::new(0));

    let slot: Rc<std::cell::RefCell<Option<Subscription>>> =
        Rc::new(std::cell::RefCell::new(None));
    let own = slot.clone();
    let counter = first_calls.clone();
    let sub = store
        .subscribe("p", move |_| {
            counter.set(counter.get() + 1);
            if let Some(sub) = own.borrow().as_ref() {
                sub.unsubscribe();
            }
        })
        .unwrap();
    *slot.borrow_mut() = Some(sub);

    let counter = second_calls.clone();
    let _second = store
        .subscribe("p", move |_| counter.set(counter.get() + 1))
        .unwrap();

    store.update_value("p", "visible", false).unwrap();
    store.update_value("p", "visible", true).unwrap();

    assert_eq!(first_calls.get(), 1);
    assert_eq!(second_calls.get(), 2);
}

#[test]
fn listener_can_write_back_into_store() {
    let store = DialStore::new();
    store.register_panel("p", "Card", card_config());

    let weak = store.downgrade();
    let _sub = store
        .subscribe("p", move |event| {
            if let PanelEvent::ValueChanged { path } = event {
                if path == "blur" {
                    let store = weak.upgrade().unwrap();
                    store.update_value("p", "visible", false).unwrap();
                }
            }
        })
        .unwrap();

    store.update_value("p", "blur", 80.0).unwrap();
    let values = store.get_resolved_values("p").unwrap();
    assert_eq!(values.float("blur"), 80.0);
    assert!(!values.bool("visible"));
}

#[test]
fn get_panels_lists_registration_order() {
    let store = DialStore::new();
    let a = DialKit::create(&store, "A", card_config());
    let b = DialKit::create(&store, "B", card_config());
    let ids: Vec<String> =
        store.get_panels().into_iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![a.panel_id().to_string(), b.panel_id().to_string()]);

    a.destroy();
    assert_eq!(store.get_panels().len(), 1);
    assert!(store.subscribe(a.panel_id(), |_| {}).is_err());
}

#[test]
fn resolved_values_skip_actions_and_keep_constants() {
    let store = DialStore::new();
    let kit = DialKit::create(&store, "Card", card_config());
    let values = kit.values().unwrap();

    assert!(values.get("reset").is_none());
    assert_eq!(values.float("version"), 2.0);
    assert_eq!(values.string("mode"), "slow");
    assert_eq!(values.string("tint"), "#ff5500");
    assert_eq!(values.group("shadow").unwrap().float("offset"), 4.0);

    let json = values.to_json();
    assert_eq!(json["shadow"]["offset"], 4.0);
    assert_eq!(json["motion"]["type"], "spring");
}

#[test]
fn action_trigger_does_not_touch_values() {
    let store = DialStore::new();
    let kit = DialKit::create(&store, "Card", card_config());
    let before = store.get_values(kit.panel_id()).unwrap();

    let fired = Recorder::new();
    let sink = fired.clone();
    let _sub = kit.on_action(move |path| sink.push(path.to_string())).unwrap();
    store.trigger_action(kit.panel_id(), "reset").unwrap();
    store.trigger_action(kit.panel_id(), "reset").unwrap();

    assert_eq!(fired.len(), 2);
    assert_eq!(store.get_values(kit.panel_id()).unwrap(), before);
}
