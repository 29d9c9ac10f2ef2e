use agent::markers::RUNTIME_ID;
use agent::{Agent, AgentConfig, HostRequest, dispatch};
use bus::{Bus, drain};
use html::Document;
use serde_json::{Value, json};

fn setup() -> (Agent, Bus) {
    let mut doc = Document::new();
    let body = doc.body().unwrap();
    let card = doc.create_element("div");
    doc.set_attribute(card, RUNTIME_ID, "card").unwrap();
    doc.set_attribute(card, "style", "display: flex").unwrap();
    doc.append_child(body, card).unwrap();
    for id in ["x", "y"] {
        let item = doc.create_element("span");
        doc.set_attribute(item, RUNTIME_ID, id).unwrap();
        doc.set_attribute(item, "style", "display: block; width: 40px; height: 20px").unwrap();
        doc.append_child(card, item).unwrap();
    }
    doc.take_records();
    let bus = Bus::bounded(16);
    let agent = Agent::new(doc, AgentConfig::default(), bus.evt_tx.clone());
    (agent, bus)
}

fn call(agent: &mut Agent, request: Value) -> Value {
    let request: HostRequest = serde_json::from_value(request).unwrap();
    dispatch(agent, request)
}

#[test]
fn calls_before_frame_id_answer_null() {
    let (mut agent, _bus) = setup();
    let reply = call(&mut agent, json!({"method": "getElementById", "params": {"id": "x"}}));
    assert_eq!(reply, Value::Null);
    let reply = call(&mut agent, json!({"method": "setFrameId", "params": {"frameId": "f1"}}));
    assert_eq!(reply, json!(true));
    let reply = call(&mut agent, json!({"method": "getElementById", "params": {"id": "x"}}));
    assert_eq!(reply["domId"], "x");
}

#[test]
fn descriptor_json_is_camel_case() {
    let (mut agent, _bus) = setup();
    call(&mut agent, json!({"method": "setFrameId", "params": {"frameId": "f1"}}));
    let reply = call(
        &mut agent,
        json!({"method": "getElementById", "params": {"id": "y", "wantStyle": true}}),
    );
    assert_eq!(reply["tagName"], "span");
    assert_eq!(reply["frameId"], "f1");
    assert_eq!(reply["rect"]["x"].as_f64(), Some(40.0));
    assert_eq!(reply["rect"]["width"].as_f64(), Some(40.0));
    assert_eq!(reply["parent"]["domId"], "card");
    assert!(reply["parent"].get("parent").is_none());
    assert_eq!(reply["styles"]["defined"]["width"], "40px");
    assert_eq!(reply["styles"]["computed"]["display"], "block");

    let reply = call(&mut agent, json!({"method": "getElementById", "params": {"id": "x"}}));
    assert!(reply.get("styles").is_none());
}

#[test]
fn locations_and_counts_round_trip_through_json() {
    let (mut agent, _bus) = setup();
    call(&mut agent, json!({"method": "setFrameId", "params": {"frameId": "f1"}}));
    let reply = call(&mut agent, json!({"method": "getElementLocation", "params": {"id": "y"}}));
    assert_eq!(
        reply,
        json!({"type": "index", "targetId": "card", "index": 1, "originalIndex": 1})
    );
    let reply = call(&mut agent, json!({"method": "getChildCount", "params": {"id": "card"}}));
    assert_eq!(reply, json!(2));

    let reply = call(
        &mut agent,
        json!({"method": "removeElement", "params": {"location": {
            "type": "index", "targetId": "card", "index": 0, "originalIndex": 0
        }}}),
    );
    assert_eq!(reply["element"]["domId"], "x");
    assert!(reply["layerMap"]["card"].is_object());
    let reply = call(&mut agent, json!({"method": "commitRemovals"}));
    assert_eq!(reply, json!(1));
}

#[test]
fn process_dom_event_has_method_payload_shape() {
    let (mut agent, bus) = setup();
    call(&mut agent, json!({"method": "setFrameId", "params": {"frameId": "f1"}}));
    let reply = call(&mut agent, json!({"method": "processDom", "params": {}}));
    assert_eq!(reply, json!(true));

    let events = drain(&bus.evt_rx);
    assert_eq!(events.len(), 1);
    let event = serde_json::to_value(&events[0]).unwrap();
    assert_eq!(event["event"], "domProcessed");
    let payload = &event["payload"];
    assert_eq!(payload["frameId"], "f1");
    let root = payload["rootNode"].as_str().unwrap();
    assert_eq!(payload["layerMap"][root]["tagName"], "body");
    assert_eq!(payload["layerMap"]["card"]["children"], json!(["x", "y"]));
    assert_eq!(payload["layerMap"]["x"]["isVisible"], json!(true));
}

#[test]
fn theme_and_style_calls() {
    let (mut agent, _bus) = setup();
    call(&mut agent, json!({"method": "setFrameId", "params": {"frameId": "f1"}}));
    assert_eq!(call(&mut agent, json!({"method": "getTheme"})), json!("system"));
    call(&mut agent, json!({"method": "setTheme", "params": {"theme": "dark"}}));
    assert_eq!(call(&mut agent, json!({"method": "getTheme"})), json!("dark"));

    let reply = call(
        &mut agent,
        json!({"method": "updateStyle", "params": {
            "id": "x",
            "changes": {"backgroundColor": {"value": " blue "}}
        }}),
    );
    assert_eq!(reply["styles"]["defined"]["backgroundColor"], "blue");
    let reply = call(&mut agent, json!({"method": "getComputedStyle", "params": {"id": "x"}}));
    assert_eq!(reply["backgroundColor"], "blue");
    let reply = call(
        &mut agent,
        json!({"method": "getComputedStyle", "params": {"id": "missing"}}),
    );
    assert_eq!(reply, Value::Null);
}
