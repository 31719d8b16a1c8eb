use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use toml_codec::{
    decode, encode, from_str, get, toml_record, Conversion, Decoder, DecoderBuilder, TomlValue,
};

toml_record! {
    #[derive(Clone)]
    struct Product {
        sku: String,
        name: String,
        price: f64,
        quantity: u32,
        tags: Vec<String>,
    }
}

toml_record! {
    #[derive(Clone)]
    struct Catalog {
        title: String,
        products: Vec<Product>,
    }
}

const SERVER: &str = r#"
# service configuration
name = "orders"
enabled = true
started = 2023-01-01T00:00:00Z

[http]
host = "0.0.0.0"
port = 8080
timeouts = { read = 30, write = 30 }

[database]
url = "postgres://localhost/orders"
pool.min = 2
pool.max = 16
replicas = ["r1", "r2", "r3"]
"#;

fn catalog_document(size: u32) -> String {
    let mut document = String::from("title = \"catalog\"\n");
    for i in 0..size {
        document.push_str(&format!(
            "\n[[products]]\nsku = \"SKU{i}\"\nname = \"Product {i}\"\nprice = {}\nquantity = {i}\ntags = [\"a\", \"b\"]\n",
            9.99 + f64::from(i)
        ));
    }
    document
}

fn benchmark_parse_config(c: &mut Criterion) {
    c.bench_function("parse_config", |b| b.iter(|| from_str(black_box(SERVER))));
}

fn benchmark_parse_array_of_tables(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_array_of_tables");

    for size in [10, 50, 100, 500].iter() {
        let document = catalog_document(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &document, |b, document| {
            b.iter(|| from_str(black_box(document)))
        });
    }
    group.finish();
}

fn benchmark_decode_records(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_records");

    for size in [10, 50, 100, 500].iter() {
        let tree = TomlValue::Table(from_str(&catalog_document(*size)).unwrap());
        group.bench_with_input(BenchmarkId::from_parameter(size), &tree, |b, tree| {
            b.iter(|| decode::<Catalog>(black_box(tree)))
        });
    }
    group.finish();
}

fn benchmark_encode_records(c: &mut Criterion) {
    let tree = TomlValue::Table(from_str(&catalog_document(100)).unwrap());
    let catalog: Catalog = decode(&tree).unwrap();

    c.bench_function("encode_records", |b| b.iter(|| encode(black_box(&catalog))));
}

fn benchmark_converter_chain(c: &mut Criterion) {
    let tree = TomlValue::Table(from_str(&catalog_document(100)).unwrap());
    let plain = Decoder::new();
    let chained = DecoderBuilder::new()
        .with_decoder::<u32, _>(|_, _, _| Ok(Conversion::Declined))
        .with_decoder::<u32, _>(|_, _, _| Ok(Conversion::Declined))
        .build();

    let mut group = c.benchmark_group("converter_chain");
    group.bench_function("structural_only", |b| {
        b.iter(|| plain.decode::<Catalog>(black_box(&tree)))
    });
    group.bench_function("two_declining_converters", |b| {
        b.iter(|| chained.decode::<Catalog>(black_box(&tree)))
    });
    group.finish();
}

fn benchmark_traversal(c: &mut Criterion) {
    let root = from_str(&catalog_document(500)).unwrap();

    let mut group = c.benchmark_group("traversal");
    group.bench_function("direct", |b| {
        b.iter(|| get::<String>(black_box(&root), &["title"]))
    });
    group.bench_function("fan_out", |b| {
        b.iter(|| get::<Vec<u32>>(black_box(&root), &["products", "quantity"]))
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_parse_config,
    benchmark_parse_array_of_tables,
    benchmark_decode_records,
    benchmark_encode_records,
    benchmark_converter_chain,
    benchmark_traversal
);
criterion_main!(benches);
