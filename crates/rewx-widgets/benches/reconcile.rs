use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rewx_core::{Element, MemoryHost, Root};
use rewx_widgets::prelude::*;

const SECTION_COUNT: usize = 4;
const ROW_SAMPLES: &[usize] = &[8, 32, 128];

fn sheet(sections: usize, rows_per_section: usize, generation: usize) -> Element {
    column((0..sections).map(|section| {
        column(
            std::iter::once(text(format!("Section {section}"))).chain((0..rows_per_section).map(
                move |row_index| {
                    row([
                        text(format!("Item {section}-{row_index}")),
                        text(format!("Revision {generation}")),
                    ])
                },
            )),
        )
    }))
}

fn host_object_count(sections: usize, rows_per_section: usize) -> usize {
    1 + sections * (2 + rows_per_section * 3)
}

fn bench_initial_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("initial_render");
    for &rows in ROW_SAMPLES {
        let tree = sheet(SECTION_COUNT, rows, 0);
        group.bench_with_input(
            BenchmarkId::new("host_objects", host_object_count(SECTION_COUNT, rows)),
            &tree,
            |b, tree| {
                b.iter(|| {
                    let root = Root::new(MemoryHost::new(standard_registry()));
                    black_box(root.render(tree).expect("render"));
                });
            },
        );
    }
    group.finish();
}

fn bench_rerender(c: &mut Criterion) {
    let mut group = c.benchmark_group("rerender");
    for &rows in ROW_SAMPLES {
        let root = Root::new(MemoryHost::new(standard_registry()));
        root.render(&sheet(SECTION_COUNT, rows, 0)).expect("render");
        let mut generation = 0;
        group.bench_function(
            BenchmarkId::new("host_objects", host_object_count(SECTION_COUNT, rows)),
            |b| {
                b.iter(|| {
                    generation += 1;
                    black_box(
                        root.render(&sheet(SECTION_COUNT, rows, generation))
                            .expect("re-render"),
                    );
                });
            },
        );
    }
    group.finish();
}

fn bench_counter_click(c: &mut Criterion) {
    let root = Root::new(MemoryHost::new(standard_registry()));
    let widget = root
        .render(&column([Element::component::<Counter>().prop("label", "Clicks")]))
        .expect("render");
    let plus = {
        let host = root.host();
        let counter = host.widget(widget).expect("column").children()[0];
        let buttons = host.widget(counter).expect("counter").children()[1];
        host.widget(buttons).expect("row").children()[1]
    };

    c.bench_function("counter_click", |b| {
        b.iter(|| {
            let handler = root.host().handler(plus, "on_click").expect("handler");
            handler.call(&());
        });
    });
}

criterion_group!(reconcile, bench_initial_render, bench_rerender, bench_counter_click);
criterion_main!(reconcile);
