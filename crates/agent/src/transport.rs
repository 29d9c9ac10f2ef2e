//! Host-issued calls, as data.
//!
//! One variant per remote method. `dispatch` performs the call and serializes whatever it
//! returned; a failed call serializes as `null` or `false`, never as an error.

use crate::Agent;
use crate::agent::StyleChange;
use crate::location::{ActionLocation, ActionTarget};
use crate::template::{ActionElement, GroupContainer};
use core_types::Theme;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Instant;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(
    tag = "method",
    content = "params",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum HostRequest {
    SetFrameId {
        frame_id: String,
    },
    ProcessDom {
        #[serde(default)]
        root: Option<String>,
    },
    GetElementAtLocation {
        x: f32,
        y: f32,
        #[serde(default)]
        want_style: bool,
    },
    GetElementById {
        id: String,
        #[serde(default)]
        want_style: bool,
    },
    GetParent {
        id: String,
    },
    GetChildCount {
        id: String,
    },
    GetOffsetParent {
        id: String,
    },
    GetInsertLocation {
        x: f32,
        y: f32,
    },
    GetElementLocation {
        id: String,
    },
    InsertElement {
        element: ActionElement,
        location: ActionLocation,
    },
    RemoveElement {
        location: ActionLocation,
    },
    MoveElement {
        id: String,
        new_index: usize,
    },
    GroupElements {
        parent: ActionTarget,
        container: GroupContainer,
        children: Vec<ActionTarget>,
    },
    UngroupElements {
        parent: ActionTarget,
        container: ActionTarget,
    },
    StartDrag {
        id: String,
    },
    Drag {
        id: String,
        dx: f32,
        dy: f32,
        x: f32,
        y: f32,
    },
    DragAbsolute {
        id: String,
        x: f32,
        y: f32,
    },
    EndDrag {
        id: String,
    },
    EndAllDrag,
    StartEditingText {
        id: String,
    },
    EditText {
        id: String,
        content: String,
    },
    StopEditingText {
        id: String,
    },
    UpdateStyle {
        id: String,
        changes: BTreeMap<String, StyleChange>,
    },
    RemoveStyles {
        id: String,
        properties: Vec<String>,
    },
    GetComputedStyle {
        id: String,
    },
    SetBackgroundImage {
        id: String,
        url: String,
    },
    ClearBackgroundImage {
        id: String,
    },
    GetTheme,
    SetTheme {
        theme: Theme,
    },
    CommitRemovals,
    Resize {
        width: f32,
        height: f32,
    },
    NotifyNavigated {
        url: String,
    },
}

fn reply<T: Serialize>(value: T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|err| {
        log::warn!("cannot serialize reply: {err}");
        Value::Null
    })
}

pub fn dispatch(agent: &mut Agent, request: HostRequest) -> Value {
    use HostRequest::*;
    match request {
        SetFrameId { frame_id } => {
            agent.set_frame_id(frame_id);
            Value::Bool(true)
        }
        ProcessDom { root } => reply(agent.process_dom(root.as_deref())),
        GetElementAtLocation { x, y, want_style } => {
            reply(agent.get_element_at_location(x, y, want_style))
        }
        GetElementById { id, want_style } => reply(agent.get_element_by_id(&id, want_style)),
        GetParent { id } => reply(agent.get_parent(&id)),
        GetChildCount { id } => reply(agent.get_child_count(&id)),
        GetOffsetParent { id } => reply(agent.get_offset_parent(&id)),
        GetInsertLocation { x, y } => reply(agent.get_insert_location(x, y)),
        GetElementLocation { id } => reply(agent.get_element_location(&id)),
        InsertElement { element, location } => reply(agent.insert_element(&element, &location)),
        RemoveElement { location } => reply(agent.remove_element(&location)),
        MoveElement { id, new_index } => reply(agent.move_element(&id, new_index)),
        GroupElements {
            parent,
            container,
            children,
        } => reply(agent.group_elements(&parent, &container, &children)),
        UngroupElements { parent, container } => reply(agent.ungroup_elements(&parent, &container)),
        StartDrag { id } => reply(agent.start_drag(&id)),
        Drag { id, dx, dy, x, y } => reply(agent.drag(&id, dx, dy, x, y)),
        DragAbsolute { id, x, y } => reply(agent.drag_absolute(&id, x, y)),
        EndDrag { id } => reply(agent.end_drag(&id)),
        EndAllDrag => reply(agent.end_all_drag()),
        StartEditingText { id } => reply(agent.start_editing_text(&id)),
        EditText { id, content } => reply(agent.edit_text(&id, &content)),
        StopEditingText { id } => reply(agent.stop_editing_text(&id)),
        UpdateStyle { id, changes } => reply(agent.update_style(&id, &changes)),
        RemoveStyles { id, properties } => reply(agent.remove_styles(&id, &properties)),
        GetComputedStyle { id } => reply(agent.get_computed_style(&id)),
        SetBackgroundImage { id, url } => reply(agent.set_background_image(&id, &url)),
        ClearBackgroundImage { id } => reply(agent.clear_background_image(&id)),
        GetTheme => reply(agent.get_theme()),
        SetTheme { theme } => reply(agent.set_theme(theme)),
        CommitRemovals => reply(agent.commit_removals()),
        Resize { width, height } => reply(agent.resize(width, height)),
        NotifyNavigated { url } => reply(agent.notify_navigated(&url, Instant::now())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> HostRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn parses_method_and_params() {
        assert_eq!(
            parse(json!({"method": "moveElement", "params": {"id": "a", "newIndex": 2}})),
            HostRequest::MoveElement {
                id: "a".into(),
                new_index: 2
            }
        );
        assert_eq!(parse(json!({"method": "endAllDrag"})), HostRequest::EndAllDrag);
        assert_eq!(
            parse(json!({"method": "processDom", "params": {}})),
            HostRequest::ProcessDom { root: None }
        );
    }

    #[test]
    fn parses_nested_payloads() {
        let request = parse(json!({
            "method": "updateStyle",
            "params": {"id": "n1", "changes": {
                "opacity": {"value": "0.5"},
                "--gap": {"value": "4px", "kind": "custom"}
            }}
        }));
        let HostRequest::UpdateStyle { changes, .. } = request else {
            panic!("wrong variant");
        };
        assert_eq!(changes["opacity"], StyleChange::value("0.5"));
        assert_eq!(changes["--gap"].kind, crate::agent::StyleChangeKind::Custom);

        let request = parse(json!({
            "method": "insertElement",
            "params": {
                "element": {"tagName": "div"},
                "location": {"type": "index", "targetId": "p", "index": 1, "originalIndex": 1}
            }
        }));
        assert!(matches!(request, HostRequest::InsertElement { .. }));
    }

    #[test]
    fn unknown_method_is_rejected() {
        let result: Result<HostRequest, _> =
            serde_json::from_value(json!({"method": "eval", "params": {}}));
        assert!(result.is_err());
    }
}
