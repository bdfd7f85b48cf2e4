use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rtss_shm::{
    apps::{AppEntry, AppEntryReader, AppFlags},
    layout::RtssVersion,
    memory::{InMemorySegment, SegmentImage},
    OsdPublisher,
};

fn benchmark_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("OsdPublisher");

    for occupied in [0u32, 16, 63].iter() {
        group.bench_with_input(
            BenchmarkId::new("update_cached_slot", occupied),
            occupied,
            |b, &occupied| {
                let image = SegmentImage::new(RtssVersion::new(2, 7)).with_osd_slots(64);
                let shm = InMemorySegment::new(&image).unwrap();
                for index in 1..occupied {
                    shm.set_osd_owner(index, &format!("other-{}", index));
                }
                let mut publisher = OsdPublisher::with_source("bench", shm).unwrap();

                b.iter(|| {
                    let _ = publisher.update("GPU 65C | 144 FPS").unwrap();
                });
            },
        );
    }

    group.bench_function("claim_and_dispose", |b| {
        let image = SegmentImage::new(RtssVersion::new(2, 7)).with_osd_slots(64);
        let shm = InMemorySegment::new(&image).unwrap();

        b.iter(|| {
            let mut publisher = OsdPublisher::with_source("bench", shm.clone()).unwrap();
            let _ = publisher.update("x").unwrap();
            publisher.dispose().unwrap();
        });
    });

    group.finish();
}

fn benchmark_app_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("AppEntryReader");

    for live in [1u32, 32, 256].iter() {
        group.bench_with_input(BenchmarkId::new("scan", live), live, |b, &live| {
            let image = SegmentImage::default().with_app_slots(256);
            let shm = InMemorySegment::new(&image).unwrap();
            for index in 0..live {
                shm.write_app_entry(
                    index,
                    &AppEntry {
                        process_id: 1000 + index,
                        name: format!("app{}.exe", index),
                        flags: AppFlags::DIRECT3D11,
                        instantaneous_time_start: 0,
                        instantaneous_time_end: 1000,
                        instantaneous_frames: 60,
                    },
                );
            }
            let reader = AppEntryReader::new(shm);

            b.iter(|| reader.scan().unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_update, benchmark_app_scan);
criterion_main!(benches);
