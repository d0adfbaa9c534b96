//! Frame pipeline benchmarks: full ticks, layout flushes, hit-grid
//! rebuilds, and input decoding.

#![allow(clippy::semicolon_if_nothing_returned)]

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use cellscene::hitgrid::HitGrid;
use cellscene::{
    CellBuffer, Dimension, Engine, EngineOptions, InputParser, NodeId, NodeOptions, NullSink,
    Offsets, PositionMode, Rect, SceneTree, Style, TaffyEngine, Widget,
};

struct Fill {
    glyph: &'static str,
}

impl Widget for Fill {
    fn paint(&mut self, buffer: &mut CellBuffer, area: Rect) {
        for row in 0..area.height {
            buffer.draw_text(
                area.x.max(0) as u32,
                area.y.max(0) as u32 + row,
                self.glyph,
                Style::NONE,
            );
        }
    }
}

/// Engine with a grid of small widget nodes.
fn grid_engine(columns: u32, rows: u32) -> Engine {
    let tree = SceneTree::new(Box::new(TaffyEngine::new())).expect("scene tree");
    let mut engine = Engine::new(
        tree,
        Box::new(NullSink),
        EngineOptions {
            width: 200,
            height: 50,
            ..EngineOptions::default()
        },
    );
    let root = engine.tree().root();
    for row in 0..rows {
        for col in 0..columns {
            let id = engine
                .create_node(NodeOptions {
                    width: Dimension::Cells(8),
                    height: Dimension::Cells(2),
                    position: PositionMode::Absolute,
                    offsets: Offsets {
                        left: Some(Dimension::Cells(col * 10)),
                        top: Some(Dimension::Cells(row * 3)),
                        ..Offsets::default()
                    },
                    widget: Some(Box::new(Fill { glyph: "########" })),
                    ..NodeOptions::default()
                })
                .expect("create node");
            engine.tree_mut().attach(id, root, None).expect("attach");
        }
    }
    engine
}

fn tick_clean_layout(c: &mut Criterion) {
    let mut engine = grid_engine(10, 10);
    engine.tick();

    c.bench_function("tick_100_nodes_clean", |b| {
        b.iter(|| black_box(engine.tick()));
    });
}

fn tick_dirty_layout(c: &mut Criterion) {
    let mut engine = grid_engine(10, 10);
    engine.tick();
    let root = engine.tree().root();
    let first = engine.tree().get(root).unwrap().children()[0];

    c.bench_function("tick_100_nodes_dirty", |b| {
        let mut wide = false;
        b.iter(|| {
            wide = !wide;
            let width = if wide { 9 } else { 8 };
            engine
                .tree_mut()
                .set_width(first, Dimension::Cells(width))
                .expect("set width");
            black_box(engine.tick())
        });
    });
}

fn hit_grid_rebuild(c: &mut Criterion) {
    let rects: Vec<(Rect, NodeId)> = (0..100)
        .map(|i| {
            let col = i % 10;
            let row = i / 10;
            (
                Rect::new(col * 10, row * 3, 8, 2),
                NodeId::from_raw(i as u32 + 1),
            )
        })
        .collect();

    c.bench_function("hit_grid_fill_100_rects_200x50", |b| {
        let mut grid = HitGrid::new(200, 50);
        b.iter(|| {
            grid.clear();
            for (rect, id) in &rects {
                grid.fill_rect(*rect, *id);
            }
            black_box(grid.hit(105, 25))
        });
    });
}

fn input_decode(c: &mut Criterion) {
    // A motion burst, the dominant traffic during a drag.
    let mut bytes = Vec::new();
    for i in 0..100 {
        bytes.extend_from_slice(format!("\x1b[<32;{};{}M", i + 1, 10).as_bytes());
    }

    c.bench_function("decode_100_sgr_motion_events", |b| {
        let mut parser = InputParser::new();
        b.iter(|| black_box(parser.feed(&bytes)).len());
    });
}

criterion_group!(
    benches,
    tick_clean_layout,
    tick_dirty_layout,
    hit_grid_rebuild,
    input_decode
);
criterion_main!(benches);
