use boxscene_common::NodeId;
use boxscene_scene::{Node, Scene, SceneHandles};

/// Errors from reading or writing panel controls.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PanelError {
    #[error("control {label:?} targets missing node {id}")]
    TargetMissing { label: String, id: NodeId },
    #[error("control {label:?} cannot take a {given} value")]
    TypeMismatch { label: String, given: &'static str },
}

/// Optional limits for a numeric control.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NumberBounds {
    pub min: Option<f32>,
    pub max: Option<f32>,
    pub step: Option<f32>,
}

impl NumberBounds {
    pub fn new(min: f32, max: f32, step: f32) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            step: Some(step),
        }
    }

    /// Snap to the step grid (anchored at `min`, else `max`), then clamp.
    pub fn apply(&self, value: f32) -> f32 {
        let mut v = f64::from(value);
        if let Some(step) = self.step.filter(|s| *s > 0.0) {
            let step = f64::from(step);
            let offset = f64::from(self.min.or(self.max).unwrap_or(0.0));
            v = ((v - offset) / step).round() * step + offset;
        }
        let mut v = v as f32;
        if let Some(min) = self.min {
            v = v.max(min);
        }
        if let Some(max) = self.max {
            v = v.min(max);
        }
        v
    }
}

/// How a control reads and writes its node.
///
/// Plain function pointers: each binding is fixed when the panel is built.
#[derive(Debug, Clone, Copy)]
pub enum Binding {
    Number {
        get: fn(&Node) -> f32,
        set: fn(&mut Node, f32),
        bounds: NumberBounds,
    },
    Toggle {
        get: fn(&Node) -> bool,
        set: fn(&mut Node, bool),
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlValue {
    Number(f32),
    Bool(bool),
}

impl ControlValue {
    fn kind(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Bool(_) => "bool",
        }
    }
}

/// Accessors for the node properties the panel can bind.
pub mod fields {
    use boxscene_scene::Node;

    pub fn position_x(n: &Node) -> f32 {
        n.transform.position.x
    }
    pub fn set_position_x(n: &mut Node, v: f32) {
        n.transform.position.x = v;
    }
    pub fn position_y(n: &Node) -> f32 {
        n.transform.position.y
    }
    pub fn set_position_y(n: &mut Node, v: f32) {
        n.transform.position.y = v;
    }
    pub fn position_z(n: &Node) -> f32 {
        n.transform.position.z
    }
    pub fn set_position_z(n: &mut Node, v: f32) {
        n.transform.position.z = v;
    }
    pub fn visible(n: &Node) -> bool {
        n.visible
    }
    pub fn set_visible(n: &mut Node, v: bool) {
        n.visible = v;
    }
}

/// One widget bound to one property of one node.
#[derive(Debug, Clone)]
pub struct Control {
    pub label: String,
    pub target: NodeId,
    pub binding: Binding,
}

impl Control {
    /// Numeric control labelled with the property name until renamed.
    pub fn number(target: NodeId, property: &str, get: fn(&Node) -> f32, set: fn(&mut Node, f32)) -> Self {
        Self {
            label: property.to_string(),
            target,
            binding: Binding::Number {
                get,
                set,
                bounds: NumberBounds::default(),
            },
        }
    }

    /// Checkbox control labelled with the property name until renamed.
    pub fn toggle(target: NodeId, property: &str, get: fn(&Node) -> bool, set: fn(&mut Node, bool)) -> Self {
        Self {
            label: property.to_string(),
            target,
            binding: Binding::Toggle { get, set },
        }
    }

    pub fn name(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn min(self, min: f32) -> Self {
        self.with_bounds(|b| b.min = Some(min))
    }

    pub fn max(self, max: f32) -> Self {
        self.with_bounds(|b| b.max = Some(max))
    }

    pub fn step(self, step: f32) -> Self {
        self.with_bounds(|b| b.step = Some(step))
    }

    pub fn range(self, min: f32, max: f32, step: f32) -> Self {
        self.with_bounds(|b| *b = NumberBounds::new(min, max, step))
    }

    /// Bounds only mean something for numbers; toggles are left untouched.
    fn with_bounds(mut self, f: impl FnOnce(&mut NumberBounds)) -> Self {
        if let Binding::Number { bounds, .. } = &mut self.binding {
            f(bounds);
        }
        self
    }

    pub fn bounds(&self) -> Option<NumberBounds> {
        match self.binding {
            Binding::Number { bounds, .. } => Some(bounds),
            Binding::Toggle { .. } => None,
        }
    }

    fn missing(&self) -> PanelError {
        PanelError::TargetMissing {
            label: self.label.clone(),
            id: self.target,
        }
    }

    /// Current value of the bound property.
    pub fn read(&self, scene: &Scene) -> Result<ControlValue, PanelError> {
        let node = scene.get(self.target).ok_or_else(|| self.missing())?;
        Ok(match self.binding {
            Binding::Number { get, .. } => ControlValue::Number(get(node)),
            Binding::Toggle { get, .. } => ControlValue::Bool(get(node)),
        })
    }

    /// Write through to the node. Returns the value actually stored after
    /// bounds were applied.
    pub fn write(&self, scene: &mut Scene, value: ControlValue) -> Result<ControlValue, PanelError> {
        let node = scene.get_mut(self.target).ok_or_else(|| self.missing())?;
        let stored = match (self.binding, value) {
            (Binding::Number { set, bounds, .. }, ControlValue::Number(v)) => {
                let v = bounds.apply(v);
                set(node, v);
                ControlValue::Number(v)
            }
            (Binding::Toggle { set, .. }, ControlValue::Bool(v)) => {
                set(node, v);
                ControlValue::Bool(v)
            }
            (_, other) => {
                return Err(PanelError::TypeMismatch {
                    label: self.label.clone(),
                    given: other.kind(),
                });
            }
        };
        tracing::debug!(control = %self.label, node = %self.target, value = ?stored, "panel write");
        Ok(stored)
    }
}

/// A titled group of controls.
#[derive(Debug, Clone)]
pub struct Folder {
    pub title: String,
    pub controls: Vec<Control>,
    pub folders: Vec<Folder>,
}

impl Folder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            controls: Vec::new(),
            folders: Vec::new(),
        }
    }

    pub fn add(&mut self, control: Control) -> &mut Self {
        self.controls.push(control);
        self
    }

    pub fn add_folder(&mut self, title: impl Into<String>) -> &mut Folder {
        self.folders.push(Folder::new(title));
        let last = self.folders.len() - 1;
        &mut self.folders[last]
    }

    fn collect<'a>(&'a self, path: &mut Vec<&'a str>, out: &mut Vec<(String, &'a Control)>) {
        path.push(&self.title);
        let prefix = path.join("/");
        out.extend(self.controls.iter().map(|c| (prefix.clone(), c)));
        for folder in &self.folders {
            folder.collect(path, out);
        }
        path.pop();
    }
}

/// The debug control panel: root controls plus nested folders, built once at
/// startup.
#[derive(Debug, Clone)]
pub struct DebugPanel {
    root: Folder,
}

impl DebugPanel {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            root: Folder::new(title),
        }
    }

    pub fn title(&self) -> &str {
        &self.root.title
    }

    pub fn root(&self) -> &Folder {
        &self.root
    }

    pub fn add(&mut self, control: Control) -> &mut Self {
        self.root.add(control);
        self
    }

    pub fn add_folder(&mut self, title: impl Into<String>) -> &mut Folder {
        self.root.add_folder(title)
    }

    /// Every control with its folder path (`"Debug"`, `"Debug/Box2"`, ...),
    /// root controls first.
    pub fn controls(&self) -> Vec<(String, &Control)> {
        let mut out = Vec::new();
        self.root.collect(&mut Vec::new(), &mut out);
        out
    }

    /// First control with the given path and label.
    pub fn find(&self, path: &str, label: &str) -> Option<&Control> {
        self.controls()
            .into_iter()
            .find(|(p, c)| p == path && c.label == label)
            .map(|(_, c)| c)
    }

    /// Check every control targets a node that exists.
    pub fn validate(&self, scene: &Scene) -> Result<(), PanelError> {
        for (_, control) in self.controls() {
            control.read(scene)?;
        }
        Ok(())
    }
}

/// The demo's panel: box 1 height and visibility, box 2 position.
pub fn demo_panel(handles: &SceneHandles) -> DebugPanel {
    use fields::*;

    let mut panel = DebugPanel::new("Debug");
    panel
        .add(Control::number(handles.box1, "y", position_y, set_position_y).range(0.0, 3.0, 0.1))
        .add(
            Control::number(handles.box2, "x", position_x, set_position_x)
                .min(0.0)
                .max(3.0)
                .step(0.1)
                .name("x-axis"),
        )
        .add(Control::toggle(handles.box1, "visible", visible, set_visible).name("Toggle visibility."));

    panel
        .add_folder("Box2")
        .add(Control::number(handles.box2, "x", position_x, set_position_x).range(0.0, 3.0, 0.1).name("x-axis"))
        .add(Control::number(handles.box2, "y", position_y, set_position_y).range(0.0, 3.0, 0.1).name("y-axis"));

    panel
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxscene_scene::{SceneConfig, assemble};

    fn setup() -> (Scene, SceneHandles, DebugPanel) {
        let (scene, _, handles) = assemble(&SceneConfig::default());
        let panel = demo_panel(&handles);
        (scene, handles, panel)
    }

    #[test]
    fn bounds_snap_then_clamp() {
        let b = NumberBounds::new(0.0, 3.0, 0.1);
        assert!((b.apply(1.26) - 1.3).abs() < 1e-6);
        assert_eq!(b.apply(-4.0), 0.0);
        assert_eq!(b.apply(9.0), 3.0);
        assert!((b.apply(1.5) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn bounds_anchor_step_at_min() {
        let b = NumberBounds {
            min: Some(0.05),
            max: None,
            step: Some(0.1),
        };
        assert!((b.apply(0.0) - 0.05).abs() < 1e-6);
        assert!((b.apply(0.31) - 0.35).abs() < 1e-6);
    }

    #[test]
    fn unbounded_passes_through() {
        assert_eq!(NumberBounds::default().apply(-123.25), -123.25);
    }

    #[test]
    fn demo_panel_layout() {
        let (_, _, panel) = setup();
        let labels: Vec<(String, String)> = panel
            .controls()
            .into_iter()
            .map(|(p, c)| (p, c.label.clone()))
            .collect();
        let expected = [
            ("Debug", "y"),
            ("Debug", "x-axis"),
            ("Debug", "Toggle visibility."),
            ("Debug/Box2", "x-axis"),
            ("Debug/Box2", "y-axis"),
        ];
        assert_eq!(labels.len(), expected.len());
        for ((p, l), (ep, el)) in labels.iter().zip(expected) {
            assert_eq!((p.as_str(), l.as_str()), (ep, el));
        }
        assert_eq!(panel.title(), "Debug");
    }

    #[test]
    fn controls_read_live_values() {
        let (scene, _, panel) = setup();
        panel.validate(&scene).unwrap();
        let x = panel.find("Debug/Box2", "x-axis").unwrap();
        assert_eq!(x.read(&scene).unwrap(), ControlValue::Number(1.5));
        let toggle = panel.find("Debug", "Toggle visibility.").unwrap();
        assert_eq!(toggle.read(&scene).unwrap(), ControlValue::Bool(true));
    }

    #[test]
    fn writes_go_through_to_the_node() {
        let (mut scene, h, panel) = setup();
        let y = panel.find("Debug", "y").unwrap();
        let stored = y.write(&mut scene, ControlValue::Number(2.04)).unwrap();
        assert_eq!(stored, ControlValue::Number(2.0));
        assert_eq!(scene.get(h.box1).unwrap().transform.position.y, 2.0);

        let clamped = y.write(&mut scene, ControlValue::Number(7.0)).unwrap();
        assert_eq!(clamped, ControlValue::Number(3.0));
    }

    #[test]
    fn root_and_folder_controls_share_the_property() {
        let (mut scene, h, panel) = setup();
        let root_x = panel.find("Debug", "x-axis").unwrap();
        let folder_x = panel.find("Debug/Box2", "x-axis").unwrap();
        folder_x.write(&mut scene, ControlValue::Number(0.5)).unwrap();
        assert_eq!(root_x.read(&scene).unwrap(), ControlValue::Number(0.5));
        assert_eq!(scene.get(h.box2).unwrap().transform.position.x, 0.5);
    }

    #[test]
    fn toggling_visibility_hides_the_node() {
        let (mut scene, h, panel) = setup();
        let toggle = panel.find("Debug", "Toggle visibility.").unwrap();
        toggle.write(&mut scene, ControlValue::Bool(false)).unwrap();
        assert!(!scene.get(h.box1).unwrap().visible);
        assert!(scene.get(h.box2).unwrap().visible);
    }

    #[test]
    fn type_mismatch_is_rejected() {
        let (mut scene, _, panel) = setup();
        let toggle = panel.find("Debug", "Toggle visibility.").unwrap();
        let err = toggle.write(&mut scene, ControlValue::Number(1.0)).unwrap_err();
        assert!(matches!(err, PanelError::TypeMismatch { given: "number", .. }));
    }

    #[test]
    fn missing_target_is_reported() {
        let (scene, _, _) = setup();
        let orphan = Control::toggle(NodeId::new(), "visible", fields::visible, fields::set_visible);
        let mut panel = DebugPanel::new("Orphans");
        panel.add(orphan);
        assert!(matches!(panel.validate(&scene), Err(PanelError::TargetMissing { .. })));
    }

    #[test]
    fn bounds_ignored_on_toggles() {
        let c = Control::toggle(NodeId::new(), "visible", fields::visible, fields::set_visible).min(1.0);
        assert!(c.bounds().is_none());
        assert_eq!(c.label, "visible");
    }

    #[test]
    fn writes_never_change_membership() {
        let (mut scene, _, panel) = setup();
        let before = scene.ids();
        for (_, control) in panel.controls() {
            let value = match control.read(&scene).unwrap() {
                ControlValue::Number(v) => ControlValue::Number(v + 1.0),
                ControlValue::Bool(b) => ControlValue::Bool(!b),
            };
            control.write(&mut scene, value).unwrap();
        }
        assert_eq!(scene.ids(), before);
    }
}
