use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use kanatype_engine::phrase::Phrase;
use kanatype_engine::predict::{next_keys, resolve, SpellingPreference};
use kanatype_engine::romaji::RomajiTable;

static INPUTS: &[(&str, &str, &str)] = &[
    ("short", "きょう", "ky"),
    ("medium", "しゃしんをとってください", "syasinnwoto"),
    (
        "long",
        "きょうはいいてんきだったのでちょっとさんぽにいってきました",
        "kyouhaiitenkidattanode",
    ),
];

fn bench_next_keys(c: &mut Criterion) {
    let table = RomajiTable::global();
    let mut group = c.benchmark_group("predict/next_keys");
    for &(label, kana, typed) in INPUTS {
        let phrase = Phrase::parse(kana, table);
        group.bench_with_input(BenchmarkId::new(label, phrase.len()), &typed, |b, &typed| {
            b.iter(|| next_keys(table, &phrase, typed));
        });
    }
    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let table = RomajiTable::global();
    let mut preference = SpellingPreference::new();
    preference.record("し", "si");
    preference.record("っ", "xtu");
    let mut group = c.benchmark_group("predict/resolve");
    for &(label, kana, typed) in INPUTS {
        let phrase = Phrase::parse(kana, table);
        group.bench_with_input(BenchmarkId::new(label, phrase.len()), &typed, |b, &typed| {
            b.iter(|| resolve(table, &preference, &phrase, typed));
        });
    }
    group.finish();
}

fn bench_from_scratch(c: &mut Criterion) {
    let table = RomajiTable::global();
    let preference = SpellingPreference::new();
    let (_, kana, _) = INPUTS[2];
    let phrase = Phrase::parse(kana, table);
    c.bench_function("predict/resolve_empty_long", |b| {
        b.iter(|| resolve(table, &preference, &phrase, ""));
    });
}

criterion_group!(benches, bench_next_keys, bench_resolve, bench_from_scratch);
criterion_main!(benches);
