use byml_rs::{parse, write, FileKind, Node};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

/// A stage-archive shaped tree: a few hundred object dictionaries plus one
/// sizable binary payload and a float table.
fn sample_tree() -> Node {
    let mut rng = rand::rngs::StdRng::seed_from_u64(0x42);

    let mut objects = Vec::new();
    for i in 0..256 {
        let mut object = BTreeMap::new();
        object.insert("Id".to_string(), Node::Int(i));
        object.insert("Name".to_string(), Node::String(format!("object_{i:03}")));
        object.insert("Visible".to_string(), Node::Bool(i % 3 == 0));
        object.insert(
            "Position".to_string(),
            Node::FloatArray(vec![rng.gen(), rng.gen(), rng.gen()]),
        );
        objects.push(Node::Dictionary(object));
    }

    let mut blob = vec![0u8; 64 * 1024];
    rng.fill(blob.as_mut_slice());

    let mut root = BTreeMap::new();
    root.insert("Objects".to_string(), Node::Array(objects));
    root.insert("Mesh".to_string(), Node::Binary(blob));
    root.insert(
        "Heights".to_string(),
        Node::FloatArray((0..1024).map(|i| i as f32 * 0.25).collect()),
    );
    Node::Dictionary(root)
}

fn bench_write(c: &mut Criterion) {
    let tree = sample_tree();
    c.bench_function("write_crg1", |b| {
        b.iter(|| write(black_box(&tree), FileKind::Crg1).unwrap())
    });
}

fn bench_parse(c: &mut Criterion) {
    let tree = sample_tree();
    let bytes = write(&tree, FileKind::Crg1).unwrap();
    c.bench_function("parse_crg1", |b| {
        b.iter(|| parse(black_box(&bytes), FileKind::Crg1).unwrap())
    });
}

criterion_group!(benches, bench_write, bench_parse);
criterion_main!(benches);
