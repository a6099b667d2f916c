use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rust_qris::tools::{edit_all, validate_all};
use rust_qris::{Edit, EditorConfig, Editor, edit};

const SAMPLE: &str = "00020101021126680016ID.CO.TELKOM.WWW01189360000800000000010215ID10200000000010303UMI51440014ID.CO.QRIS.WWW0215ID10200000000010303UMI5204581253033605802ID5914TOKO MAJU JAYA6007BANDUNG61054011162070703A016304E35E";

fn bench_edit_city(c: &mut Criterion) {
    c.bench_function("edit_city", |b| {
        b.iter(|| edit(black_box(SAMPLE), [Edit::merchant_city("Jakarta")]))
    });
}

fn bench_edit_noop(c: &mut Criterion) {
    c.bench_function("edit_noop", |b| {
        b.iter(|| {
            let editor = Editor::open(black_box(SAMPLE)).unwrap();
            editor.finalize()
        })
    });
}

fn bench_batch_edit(c: &mut Criterion) {
    let payloads = vec![SAMPLE.to_string(); 1000];
    let edits = [
        Edit::merchant_name("WARUNG BARU"),
        Edit::merchant_city("Jakarta"),
    ];
    let config = EditorConfig::default();
    c.bench_function("edit_all_1000", |b| {
        b.iter(|| edit_all(black_box(&payloads), &edits, &config))
    });
}

fn bench_batch_validate(c: &mut Criterion) {
    let payloads = vec![SAMPLE.to_string(); 1000];
    let config = EditorConfig::default();
    c.bench_function("validate_all_1000", |b| {
        b.iter(|| validate_all(black_box(&payloads), &config))
    });
}

criterion_group!(
    benches,
    bench_edit_city,
    bench_edit_noop,
    bench_batch_edit,
    bench_batch_validate
);
criterion_main!(benches);
