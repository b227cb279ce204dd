// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use kurbo::Size;
use understory_virtual_list::{BufferSize, Cell, CellFactory, ListConfig, VirtualList};

#[derive(Clone)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u32(&mut self) -> u32 {
        // Numerical Recipes LCG parameters.
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 32) as u32
    }

    fn gen_range_usize(&mut self, upper_exclusive: usize) -> usize {
        if upper_exclusive == 0 {
            return 0;
        }
        (self.next_u32() as usize) % upper_exclusive
    }
}

/// A cell doing the minimum a real row would: remember what it shows.
struct Row {
    index: usize,
    item: u64,
}

impl Cell<u64> for Row {
    fn update_index(&mut self, index: usize) {
        self.index = index;
    }

    fn update_item(&mut self, item: &u64) {
        self.item = *item;
    }
}

fn build_list(len: u64, viewport_height: f64) -> VirtualList<u64, Row> {
    let config = ListConfig::default().with_buffer_size(BufferSize::Medium);
    let mut list = VirtualList::from_items(config, (0..len).collect());
    list.set_cell_factory(Some(CellFactory::new(|item: Option<&u64>| Row {
        index: 0,
        item: item.copied().unwrap_or_default(),
    })));
    list.set_viewport_size(Size::new(400.0, viewport_height));
    list
}

fn bench_scroll(c: &mut Criterion) {
    let mut group = c.benchmark_group("understory_virtual_list/scroll");
    group.sample_size(50);

    for &(len, height) in &[(10_000_u64, 480.0), (1_000_000_u64, 480.0), (1_000_000_u64, 2_160.0)] {
        group.bench_function(format!("small_steps(n={len},h={height})"), |b| {
            let mut list = build_list(len, height);
            b.iter(|| {
                for _ in 0..64 {
                    list.scroll_by(7.0);
                }
                list.scroll_to_first();
                black_box(list.range());
            });
        });

        group.bench_function(format!("random_jumps(n={len},h={height})"), |b| {
            let mut list = build_list(len, height);
            let mut rng = Lcg::new(0x5C20_11AA_0000_0001);
            b.iter(|| {
                for _ in 0..64 {
                    let index = rng.gen_range_usize(len as usize);
                    list.scroll_to_index(index);
                }
                black_box(list.range());
            });
        });
    }

    group.finish();
}

fn bench_items(c: &mut Criterion) {
    let mut group = c.benchmark_group("understory_virtual_list/items");
    group.sample_size(50);

    for &len in &[1_000_u64, 100_000_u64] {
        group.bench_function(format!("insert_remove_in_window(n={len})"), |b| {
            b.iter_batched(
                || build_list(len, 480.0),
                |mut list| {
                    for i in 0..32 {
                        list.insert(5, len + i);
                        list.remove(10);
                    }
                    black_box(list);
                },
                BatchSize::SmallInput,
            );
        });

        group.bench_function(format!("reverse(n={len})"), |b| {
            b.iter_batched(
                || build_list(len, 480.0),
                |mut list| {
                    list.sort_by(|x, y| y.cmp(x));
                    black_box(list);
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_geometry(c: &mut Criterion) {
    let mut group = c.benchmark_group("understory_virtual_list/geometry");
    group.sample_size(50);

    group.bench_function("resize_cycle(n=100000)", |b| {
        let mut list = build_list(100_000, 480.0);
        b.iter(|| {
            for height in [240.0, 480.0, 960.0, 480.0] {
                list.set_viewport_size(Size::new(400.0, height));
            }
            black_box(list.cache().len());
        });
    });

    group.bench_function("cell_size_cycle(n=100000)", |b| {
        let mut list = build_list(100_000, 480.0);
        list.scroll_to_index(50_000);
        b.iter(|| {
            for size in [24.0, 32.0, 48.0, 32.0] {
                list.set_cell_size(size);
            }
            black_box(list.range());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_scroll, bench_items, bench_geometry);
criterion_main!(benches);
