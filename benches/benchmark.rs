//! パフォーマンスベンチマーク
//!
//! このモジュールは、合成データを使用して変換処理のスループットを測定します。
//!
//! 実装するベンチマーク:
//! - 1行1商品の変換（行数別）
//! - バリエーショングループ化を伴う変換
//! - CSVの読み込み

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sfcc_impex::{source, ConfigStore, ConverterBuilder, DataRow, RawValue, RowSet, Schema};

/// Typhoon形式の合成データを生成する（1マスターあたり`variants`行）
fn synthetic_rows(masters: usize, variants: usize) -> RowSet {
    let colors = ["Rojo", "Azul", "Negro", "Blanco"];
    let mut rows = Vec::with_capacity(masters * variants);
    for m in 0..masters {
        for v in 0..variants {
            let mut row = DataRow::new();
            let mut set = |k: &str, val: String| {
                row.insert(k.to_string(), RawValue::String(val));
            };
            set("SKU_ABUELO", format!("M-{:05}", m));
            set("SKU", format!("M-{:05}-{:02}", m, v));
            set("NOMBRE_PROD", format!("Producto {}", m));
            set("DESCRIPCION", "Descripción del producto con texto de ejemplo".to_string());
            set("MARCA", "Typhoon".to_string());
            set("DEPORTE", "Running".to_string());
            set("GENERO", if m % 2 == 0 { "M" } else { "F" }.to_string());
            set("COLOR", colors[v % colors.len()].to_string());
            set("TALLA", format!("{}", 36 + v / colors.len()));
            set("ACTIVO", "si".to_string());
            set("CATEGORIA", "calzado".to_string());
            set("EAN", format!("78{:011}", m * 100 + v));
            rows.push(row);
        }
    }
    RowSet::from_rows(rows)
}

fn to_csv(rows: &RowSet) -> String {
    let mut out = rows.headers.join(",");
    out.push('\n');
    for row in &rows.rows {
        let line: Vec<String> = row.values().map(|v| v.to_text()).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}

/// 1行1商品の変換
fn benchmark_flat_conversion(c: &mut Criterion) {
    let store = ConfigStore::bundled();
    let converter = ConverterBuilder::new()
        .with_mapping(store.load("Typhoon", Schema::Catalog).unwrap())
        .with_variation_grouping(false)
        .build()
        .unwrap();

    let mut group = c.benchmark_group("flat_conversion");
    for rows in [100usize, 1_000, 10_000] {
        let data = synthetic_rows(rows, 1);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &data, |b, data| {
            b.iter(|| black_box(converter.convert(black_box(data))));
        });
    }
    group.finish();
}

/// バリエーショングループ化を伴う変換
fn benchmark_grouped_conversion(c: &mut Criterion) {
    let store = ConfigStore::bundled();
    let converter = ConverterBuilder::new()
        .with_mapping(store.load("Typhoon", Schema::Catalog).unwrap())
        .build()
        .unwrap();

    let data = synthetic_rows(500, 12);
    let mut group = c.benchmark_group("grouped_conversion");
    group.throughput(Throughput::Elements(data.len() as u64));
    group.sample_size(20);
    group.bench_function("500_masters_x_12_variants", |b| {
        b.iter(|| black_box(converter.convert(black_box(&data))));
    });
    group.finish();
}

/// CSVの読み込み
fn benchmark_csv_source(c: &mut Criterion) {
    let csv = to_csv(&synthetic_rows(5_000, 1));

    let mut group = c.benchmark_group("csv_source");
    group.throughput(Throughput::Bytes(csv.len() as u64));
    group.bench_function("read_5000_rows", |b| {
        b.iter(|| black_box(source::read_csv(black_box(csv.as_bytes())).unwrap()));
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_flat_conversion,
    benchmark_grouped_conversion,
    benchmark_csv_source
);
criterion_main!(benches);
