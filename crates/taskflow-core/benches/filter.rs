#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use taskflow_core::{CategoryId, DateBucket, FilterSpec, Priority, Task, TaskId, View, apply_at};
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

const NOW: OffsetDateTime = datetime!(2025-03-12 10:00 UTC);

fn build_tasks(count: u64) -> Vec<Task> {
    (1..=count)
        .map(|id| {
            let index = usize::try_from(id).unwrap_or(usize::MAX);
            let offset = i64::try_from(id % 30).unwrap_or(0) - 10;
            Task {
                id: TaskId(id),
                title: format!("task {id}"),
                description: String::new(),
                priority: Priority::ALL[index % Priority::ALL.len()],
                category_id: (id % 4 != 0).then_some(CategoryId(id % 5)),
                due_date: (id % 7 != 0).then(|| NOW + Duration::days(offset)),
                completed: id % 3 == 0,
                completed_at: None,
                created_at: NOW - Duration::days(30),
                order: u32::try_from(id).unwrap_or(u32::MAX),
                edit_history: Vec::new(),
            }
        })
        .collect()
}

fn filter_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_apply");
    let specs = [
        ("unconstrained", FilterSpec::default()),
        ("active_high", FilterSpec::home().with_priorities([Priority::High, Priority::Urgent])),
        (
            "dates",
            FilterSpec::default()
                .with_view(View::All)
                .with_date_filters([DateBucket::Overdue, DateBucket::ThisWeek, DateBucket::NoDate]),
        ),
    ];

    for size in [100_u64, 1_000, 10_000] {
        let tasks = build_tasks(size);
        for (name, spec) in &specs {
            group.bench_with_input(BenchmarkId::new(*name, size), &tasks, |b, tasks| {
                b.iter(|| apply_at(black_box(tasks), black_box(spec), NOW));
            });
        }
    }

    group.finish();
}

criterion_group!(benches, filter_benchmark);
criterion_main!(benches);
