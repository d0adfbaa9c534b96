//! Render scheduler and engine composition root.
//!
//! The [`Engine`] owns the scene tree, viewport, routers, selection
//! engine, input decoder, and frame buffer, and drives them from a
//! single-threaded cooperative tick loop. Per tick: one-shot
//! animation-frame callbacks, per-tick callbacks, layout flush, the tree
//! render pass (which also rebuilds the hit grid), post-process hooks,
//! presentation, and a timing sample. Collaborator failures abort the
//! current tick only and are reported through the log callback.

use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::buffer::CellBuffer;
use crate::color::Rgba;
use crate::error::Result;
use crate::geometry::Rect;
use crate::hitgrid::HitGrid;
use crate::input::{InputEvent, InputParser, KeyEvent};
use crate::log::{LogLevel, emit_log};
use crate::router::{KeyRouter, PointerRouter};
use crate::scene::{NodeId, NodeOptions, SceneTree};
use crate::selection::SelectionEngine;
use crate::viewport::Viewport;

/// Terminal output seam. The engine hands over finished frames; ANSI
/// construction and diffing live behind this trait.
pub trait PresentSink {
    /// Write the finished frame to the terminal.
    fn present(&mut self, buffer: &CellBuffer) -> io::Result<()>;

    /// Explicitly clear absolute terminal rows `from..to` (used for
    /// rows that leave the managed viewport in split mode).
    fn clear_rows(&mut self, from: u32, to: u32) -> io::Result<()>;
}

/// Sink that discards all output, for headless use and tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl PresentSink for NullSink {
    fn present(&mut self, _buffer: &CellBuffer) -> io::Result<()> {
        Ok(())
    }

    fn clear_rows(&mut self, _from: u32, _to: u32) -> io::Result<()> {
        Ok(())
    }
}

/// Number of frame-timing samples kept in the rolling window.
pub const STATS_WINDOW: usize = 120;

/// Frame timing diagnostics over a bounded rolling window.
#[derive(Clone, Debug, Default)]
pub struct FrameStats {
    frames: u64,
    dropped: u64,
    last_frame: Duration,
    samples: VecDeque<Duration>,
}

impl FrameStats {
    fn record(&mut self, elapsed: Duration) {
        self.frames += 1;
        self.last_frame = elapsed;
        if self.samples.len() == STATS_WINDOW {
            self.samples.pop_front();
        }
        self.samples.push_back(elapsed);
    }

    fn record_dropped(&mut self) {
        self.dropped += 1;
    }

    /// Total completed frames.
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// Ticks skipped by the re-entrancy guard.
    #[must_use]
    pub const fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Duration of the most recent frame.
    #[must_use]
    pub const fn last_frame(&self) -> Duration {
        self.last_frame
    }

    /// Average frame duration over the rolling window.
    #[must_use]
    pub fn average(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = self.samples.iter().sum();
        total / self.samples.len() as u32
    }

    /// Frames per second implied by the rolling average.
    #[must_use]
    pub fn fps_estimate(&self) -> f64 {
        let avg = self.average().as_secs_f64();
        if avg > 0.0 { 1.0 / avg } else { 0.0 }
    }
}

/// The delay before the next tick for a given target interval and the
/// processing time of the tick that just ran. Sustained cadence tracks
/// the target instead of drifting by the per-frame cost.
#[must_use]
pub fn cadence_delay(target: Duration, elapsed: Duration) -> Duration {
    target.saturating_sub(elapsed).max(Duration::from_millis(1))
}

/// Engine construction options.
#[derive(Clone, Debug)]
pub struct EngineOptions {
    /// Initial terminal width in cells.
    pub width: u32,
    /// Initial terminal height in cells.
    pub height: u32,
    /// Target frames per second for the tick loop.
    pub target_fps: u32,
    /// Clear color for the frame buffer.
    pub background: Rgba,
    /// Record per-tick timing samples.
    pub collect_stats: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            width: 80,
            height: 24,
            target_fps: 30,
            background: Rgba::BLACK,
            collect_stats: true,
        }
    }
}

/// Handle for interrupting [`Engine::run`] from a callback or another
/// thread. Stopping never tears down an in-flight tick; the loop exits
/// before the next one starts.
#[derive(Clone, Debug, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    /// Request the run loop to exit.
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

type FrameCallback = Box<dyn FnOnce(Duration)>;
type TickCallback = Box<dyn FnMut(Duration)>;
type PostHook = Box<dyn FnMut(&mut CellBuffer)>;

/// The terminal UI engine: scene tree, input pipeline, and frame loop.
pub struct Engine {
    tree: SceneTree,
    viewport: Viewport,
    frame: CellBuffer,
    hit_grid: HitGrid,
    pointer: PointerRouter,
    keys: KeyRouter,
    selection: SelectionEngine,
    parser: InputParser,
    sink: Box<dyn PresentSink>,
    frame_callbacks: Vec<FrameCallback>,
    tick_callbacks: Vec<TickCallback>,
    post_hooks: Vec<PostHook>,
    stats: FrameStats,
    target_interval: Duration,
    background: Rgba,
    collect_stats: bool,
    in_tick: bool,
    stop: StopHandle,
    last_tick: Option<Instant>,
}

impl Engine {
    /// Create an engine over a scene tree and output sink.
    pub fn new(tree: SceneTree, sink: Box<dyn PresentSink>, options: EngineOptions) -> Self {
        let viewport = Viewport::new(options.width, options.height);
        let frame = CellBuffer::new(viewport.width(), viewport.viewport_height());
        let hit_grid = HitGrid::new(viewport.width(), viewport.viewport_height());
        Self {
            tree,
            viewport,
            frame,
            hit_grid,
            pointer: PointerRouter::new(),
            keys: KeyRouter::new(),
            selection: SelectionEngine::new(),
            parser: InputParser::new(),
            sink,
            frame_callbacks: Vec::new(),
            tick_callbacks: Vec::new(),
            post_hooks: Vec::new(),
            stats: FrameStats::default(),
            target_interval: Duration::from_secs(1) / options.target_fps.max(1),
            background: options.background,
            collect_stats: options.collect_stats,
            in_tick: false,
            stop: StopHandle::default(),
            last_tick: None,
        }
    }

    /// The scene tree.
    #[must_use]
    pub fn tree(&self) -> &SceneTree {
        &self.tree
    }

    /// The scene tree, mutably.
    pub fn tree_mut(&mut self) -> &mut SceneTree {
        &mut self.tree
    }

    /// Create a node (convenience passthrough).
    pub fn create_node(&mut self, options: NodeOptions) -> Result<NodeId> {
        self.tree.create(options)
    }

    /// Destroy a node and drop any router references to it. Capture,
    /// hover, and focus survive render failures but never a destroy.
    pub fn destroy_node(&mut self, id: NodeId) -> Result<()> {
        self.tree.destroy(id)?;
        self.pointer.forget(id);
        self.keys.forget(id);
        Ok(())
    }

    /// The viewport/resize manager.
    #[must_use]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// The viewport/resize manager, mutably.
    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// Frame timing diagnostics.
    #[must_use]
    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// The node currently under the pointer.
    #[must_use]
    pub fn hovered(&self) -> Option<NodeId> {
        self.pointer.hovered()
    }

    /// The node currently holding mouse capture.
    #[must_use]
    pub fn captured(&self) -> Option<NodeId> {
        self.pointer.captured()
    }

    /// Clear mouse capture regardless of gesture or render state.
    pub fn release_capture(&mut self) {
        self.pointer.release_capture();
    }

    /// Focus a node for keyboard input. Returns false if it is not
    /// focusable.
    pub fn focus(&mut self, id: NodeId) -> bool {
        self.keys.focus(&self.tree, id)
    }

    /// Clear keyboard focus.
    pub fn blur(&mut self) {
        self.keys.blur();
    }

    /// The focused node, if any.
    #[must_use]
    pub fn focused(&self) -> Option<NodeId> {
        self.keys.focused()
    }

    /// Clear any text selection, independent of render success.
    pub fn clear_selection(&mut self) {
        self.selection.clear(&mut self.tree);
    }

    /// Concatenated text of the current selection.
    #[must_use]
    pub fn selected_text(&self) -> String {
        self.selection.selected_text(&self.tree)
    }

    /// Register a one-shot callback invoked at the start of the next
    /// tick with the time since the previous tick.
    pub fn request_animation_frame<F>(&mut self, callback: F)
    where
        F: FnOnce(Duration) + 'static,
    {
        self.frame_callbacks.push(Box::new(callback));
    }

    /// Register a callback invoked every tick, after animation-frame
    /// callbacks and before the render pass.
    pub fn on_tick<F>(&mut self, callback: F)
    where
        F: FnMut(Duration) + 'static,
    {
        self.tick_callbacks.push(Box::new(callback));
    }

    /// Register a hook run against the finished frame buffer, after the
    /// render pass and before presentation.
    pub fn add_post_hook<F>(&mut self, hook: F)
    where
        F: FnMut(&mut CellBuffer) + 'static,
    {
        self.post_hooks.push(Box::new(hook));
    }

    /// Feed raw terminal bytes through the decoder and route the
    /// resulting events. Events are processed synchronously, in order.
    pub fn feed_input(&mut self, bytes: &[u8]) {
        for event in self.parser.feed(bytes) {
            self.route_event(event);
        }
    }

    /// Route one decoded input event.
    pub fn route_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::Mouse(mouse) => {
                self.pointer
                    .route(&mut self.tree, &mut self.selection, &self.hit_grid, mouse);
            }
            InputEvent::Key(key) => self.route_key(&key),
        }
    }

    /// Route a decoded key event.
    pub fn route_key(&mut self, event: &KeyEvent) {
        self.keys.route(&mut self.tree, event);
    }

    /// Record a terminal resize signal. Debounced unless split mode is
    /// active; the debounced apply happens at the start of a later tick.
    pub fn on_resize_signal(&mut self, width: u32, height: u32) {
        if let Some((width, height)) = self.viewport.on_resize_signal(width, height, Instant::now())
        {
            self.apply_resize(width, height);
        }
    }

    fn apply_resize(&mut self, _width: u32, height: u32) {
        let frame_width = self.viewport.width();
        let frame_height = self.viewport.viewport_height();
        self.frame.resize(frame_width, frame_height);
        self.hit_grid.resize(frame_width, frame_height);
        if self.viewport.is_split() {
            // Rows below the viewport may hold stale glyphs from before
            // the resize.
            if let Err(e) = self.sink.clear_rows(frame_height, height) {
                emit_log(LogLevel::Error, &format!("clear reserved rows failed: {e}"));
            }
        }
    }

    /// Run one tick. Returns true if a frame was produced.
    ///
    /// A tick that is already running causes the new one to be skipped
    /// entirely (counted as dropped), never queued.
    pub fn tick(&mut self) -> bool {
        if self.in_tick {
            self.stats.record_dropped();
            return false;
        }
        self.in_tick = true;
        let started = Instant::now();
        let delta = self
            .last_tick
            .map_or(Duration::ZERO, |last| started.duration_since(last));
        self.last_tick = Some(started);

        let produced = self.tick_inner(started, delta);

        if produced && self.collect_stats {
            self.stats.record(started.elapsed());
        }
        self.in_tick = false;
        produced
    }

    fn tick_inner(&mut self, now: Instant, delta: Duration) -> bool {
        if let Some((width, height)) = self.viewport.take_ready(now) {
            self.apply_resize(width, height);
        }

        for callback in self.frame_callbacks.drain(..).collect::<Vec<_>>() {
            callback(delta);
        }
        let mut tick_callbacks = std::mem::take(&mut self.tick_callbacks);
        for callback in &mut tick_callbacks {
            callback(delta);
        }
        self.tick_callbacks.splice(0..0, tick_callbacks);

        let width = self.viewport.width();
        let height = self.viewport.viewport_height();
        if self.frame.size() != (width, height) {
            self.frame.resize(width, height);
            self.hit_grid.resize(width, height);
        }
        if let Err(e) = self.tree.flush_layout(width, height) {
            emit_log(LogLevel::Error, &format!("tick aborted, layout: {e}"));
            return false;
        }

        self.render_pass();

        let mut post_hooks = std::mem::take(&mut self.post_hooks);
        for hook in &mut post_hooks {
            hook(&mut self.frame);
        }
        self.post_hooks.splice(0..0, post_hooks);

        if let Err(e) = self.sink.present(&self.frame) {
            emit_log(LogLevel::Error, &format!("tick aborted, present: {e}"));
            return false;
        }
        true
    }

    /// Depth-first paint of the visible tree into the frame buffer,
    /// rebuilding the hit grid along the way. The captured node is left
    /// out of the grid so hits fall through to what is beneath it.
    fn render_pass(&mut self) {
        self.frame.clear(self.background);
        self.hit_grid.clear();
        let captured = self.pointer.captured();

        // Stack of (node, parent absolute origin), pushed in reverse
        // z-order so pop yields back-to-front.
        let root = self.tree.root();
        let mut stack: Vec<(NodeId, i32, i32)> = vec![(root, 0, 0)];
        while let Some((id, origin_x, origin_y)) = stack.pop() {
            let Some(node) = self.tree.get(id) else {
                continue;
            };
            if !node.visible() {
                continue;
            }
            let local = node.computed();
            let abs = local.translated(origin_x, origin_y);

            self.paint_node(id, abs);
            if captured != Some(id) {
                self.hit_grid.fill_rect(abs, id);
            }

            let children = self.tree.sorted_children(id);
            for child in children.into_iter().rev() {
                stack.push((child, abs.x, abs.y));
            }
        }
    }

    fn paint_node(&mut self, id: NodeId, abs: Rect) {
        let Some(node) = self.tree.get_mut(id) else {
            return;
        };
        match (node.buffer.as_mut(), node.widget.as_deref_mut()) {
            (Some(buffer), Some(widget)) => {
                buffer.clear(Rgba::TRANSPARENT);
                let area = Rect::new(0, 0, abs.width, abs.height);
                widget.paint(buffer, area);
            }
            (None, Some(widget)) => {
                widget.paint(&mut self.frame, abs);
                return;
            }
            _ => return,
        }
        // Composite the off-screen buffer at the node's position.
        if let Some(buffer) = self.tree.get(id).and_then(|n| n.buffer.as_ref()) {
            self.frame.composite(buffer, abs.x, abs.y);
        }
    }

    /// A stop handle usable from callbacks or other threads.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Request the run loop to exit before its next tick.
    pub fn stop(&mut self) {
        self.stop.stop();
        self.viewport.cancel_pending();
    }

    /// Drive the tick loop at the target cadence until stopped.
    ///
    /// The delay before each next tick is the target interval minus the
    /// processing time of the tick that just ran, floored at one
    /// millisecond.
    pub fn run(&mut self) {
        self.stop = StopHandle::default();
        while !self.stop.is_stopped() {
            let started = Instant::now();
            self.tick();
            if self.stop.is_stopped() {
                break;
            }
            std::thread::sleep(cadence_delay(self.target_interval, started.elapsed()));
        }
    }
}
