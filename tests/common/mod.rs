//! Shared fixtures for integration tests: recording widgets and a
//! frame-capturing sink.

#![allow(dead_code)]

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use cellscene::render::PresentSink;
use cellscene::selection::Selection;
use cellscene::{
    CellBuffer, Dimension, Engine, EngineOptions, KeyEvent, NodeId, NodeOptions, Offsets,
    PointerEvent, PointerKind, PositionMode, Propagation, Rect, SceneTree, Style, TaffyEngine,
    Widget,
};

/// One observed pointer delivery: widget name, event kind, drop source.
pub type PointerLog = Rc<RefCell<Vec<(&'static str, PointerKind, Option<NodeId>)>>>;

/// Observed key deliveries: widget name plus the event.
pub type KeyLog = Rc<RefCell<Vec<(&'static str, KeyEvent)>>>;

/// Widget that records every pointer and key event it receives.
pub struct Probe {
    pub name: &'static str,
    pub log: PointerLog,
    pub keys: KeyLog,
    pub stop: bool,
}

impl Probe {
    pub fn boxed(name: &'static str, log: &PointerLog, stop: bool) -> Box<Self> {
        Self::with_keys(name, log, &Rc::new(RefCell::new(Vec::new())), stop)
    }

    pub fn with_keys(name: &'static str, log: &PointerLog, keys: &KeyLog, stop: bool) -> Box<Self> {
        Box::new(Self {
            name,
            log: Rc::clone(log),
            keys: Rc::clone(keys),
            stop,
        })
    }
}

impl Widget for Probe {
    fn paint(&mut self, buffer: &mut CellBuffer, area: Rect) {
        buffer.draw_text(area.x.max(0) as u32, area.y.max(0) as u32, self.name, Style::NONE);
    }

    fn on_pointer(&mut self, event: &PointerEvent) -> Propagation {
        self.log
            .borrow_mut()
            .push((self.name, event.kind, event.source));
        if self.stop {
            Propagation::Stop
        } else {
            Propagation::Continue
        }
    }

    fn on_key(&mut self, event: &KeyEvent) -> Propagation {
        self.keys.borrow_mut().push((self.name, *event));
        if self.stop {
            Propagation::Stop
        } else {
            Propagation::Continue
        }
    }
}

/// Selectable text widget that tracks its highlight state.
pub struct SelectableText {
    pub text: &'static str,
    /// Most recent active flag delivered via selection notification.
    pub active: Rc<RefCell<bool>>,
}

impl SelectableText {
    pub fn boxed(text: &'static str) -> (Box<Self>, Rc<RefCell<bool>>) {
        let active = Rc::new(RefCell::new(false));
        (
            Box::new(Self {
                text,
                active: Rc::clone(&active),
            }),
            active,
        )
    }
}

impl Widget for SelectableText {
    fn paint(&mut self, buffer: &mut CellBuffer, area: Rect) {
        buffer.draw_text(area.x.max(0) as u32, area.y.max(0) as u32, self.text, Style::NONE);
    }

    fn should_start_selection(&self, _x: i32, _y: i32) -> bool {
        true
    }

    fn on_selection_changed(&mut self, selection: &Selection, _width: u32, _height: u32) -> bool {
        let changed = *self.active.borrow() != selection.active;
        *self.active.borrow_mut() = selection.active;
        changed
    }

    fn selected_text(&self) -> Option<String> {
        if *self.active.borrow() {
            Some(self.text.to_string())
        } else {
            None
        }
    }
}

/// Sink that captures presented frames as text and records reserved-row
/// clears.
#[derive(Clone, Default)]
pub struct CaptureSink {
    pub frames: Rc<RefCell<Vec<Vec<String>>>>,
    pub cleared: Rc<RefCell<Vec<(u32, u32)>>>,
}

impl PresentSink for CaptureSink {
    fn present(&mut self, buffer: &CellBuffer) -> io::Result<()> {
        self.frames.borrow_mut().push(buffer.to_text());
        Ok(())
    }

    fn clear_rows(&mut self, from: u32, to: u32) -> io::Result<()> {
        self.cleared.borrow_mut().push((from, to));
        Ok(())
    }
}

impl CaptureSink {
    /// The most recently presented frame, joined into one string.
    pub fn last_frame(&self) -> String {
        self.frames
            .borrow()
            .last()
            .map(|rows| rows.join("\n"))
            .unwrap_or_default()
    }
}

/// Engine over a capture sink at the given terminal size.
pub fn capture_engine(width: u32, height: u32) -> (Engine, CaptureSink) {
    let sink = CaptureSink::default();
    let tree = SceneTree::new(Box::new(TaffyEngine::new())).expect("scene tree");
    let engine = Engine::new(
        tree,
        Box::new(sink.clone()),
        EngineOptions {
            width,
            height,
            ..EngineOptions::default()
        },
    );
    (engine, sink)
}

/// Options for a fixed-size box placed at an absolute position.
pub fn abs_box(x: u32, y: u32, width: u32, height: u32) -> NodeOptions {
    NodeOptions {
        width: Dimension::Cells(width),
        height: Dimension::Cells(height),
        position: PositionMode::Absolute,
        offsets: Offsets {
            left: Some(Dimension::Cells(x)),
            top: Some(Dimension::Cells(y)),
            ..Offsets::default()
        },
        ..NodeOptions::default()
    }
}

/// SGR 1006 left-button press at a cell.
pub fn sgr_press(x: i32, y: i32) -> Vec<u8> {
    format!("\x1b[<0;{};{}M", x + 1, y + 1).into_bytes()
}

/// SGR 1006 motion with the left button held.
pub fn sgr_drag(x: i32, y: i32) -> Vec<u8> {
    format!("\x1b[<32;{};{}M", x + 1, y + 1).into_bytes()
}

/// SGR 1006 motion with no button held.
pub fn sgr_move(x: i32, y: i32) -> Vec<u8> {
    format!("\x1b[<35;{};{}M", x + 1, y + 1).into_bytes()
}

/// SGR 1006 left-button release at a cell.
pub fn sgr_release(x: i32, y: i32) -> Vec<u8> {
    format!("\x1b[<0;{};{}m", x + 1, y + 1).into_bytes()
}

/// SGR 1006 scroll-down at a cell.
pub fn sgr_scroll_down(x: i32, y: i32) -> Vec<u8> {
    format!("\x1b[<65;{};{}M", x + 1, y + 1).into_bytes()
}
