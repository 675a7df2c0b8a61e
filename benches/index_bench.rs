use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use quilldb::{execute_sql, Database, Value};
use std::hint::black_box;

fn setup_populated_db(n: usize) -> Database {
    let mut db = Database::new();
    execute_sql(&mut db, "CREATE TABLE users (id INT PRIMARY KEY, email TEXT UNIQUE, age INT)").unwrap();

    let table = db.get_table_mut("users").unwrap();
    let columns = ["id".to_string(), "email".to_string(), "age".to_string()];
    for i in 0..n {
        let row = vec![
            Value::Integer(i as i64),
            Value::Text(format!("user{}@example.com", i)),
            Value::Integer((i % 100) as i64),
        ];
        table.insert(&columns, row).unwrap();
    }
    db
}

fn bench_point_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("Where_Equality");

    for n in [1_000, 10_000] {
        let mut db = setup_populated_db(n);
        let target = n / 2;

        group.bench_with_input(BenchmarkId::new("indexed_primary_key", n), &n, |b, _| {
            let sql = format!("SELECT * FROM users WHERE id = {}", target);
            b.iter(|| black_box(execute_sql(&mut db, black_box(&sql)).unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("full_scan", n), &n, |b, _| {
            let sql = format!("SELECT * FROM users WHERE age = {}", target % 100);
            b.iter(|| black_box(execute_sql(&mut db, black_box(&sql)).unwrap()));
        });
    }
    group.finish();
}

fn bench_insert_sql(c: &mut Criterion) {
    let mut group = c.benchmark_group("Insert_SQL_Pipeline");
    group.bench_function("insert_with_two_indexes", |b| {
        let mut db = Database::new();
        execute_sql(&mut db, "CREATE TABLE t (id INT PRIMARY KEY, n TEXT UNIQUE)").unwrap();
        let mut next = 0i64;
        b.iter(|| {
            next += 1;
            let sql = format!("INSERT INTO t (id, n) VALUES ({}, 'v{}')", next, next);
            execute_sql(&mut db, black_box(&sql)).unwrap();
        });
    });
    group.finish();
}

fn bench_join(c: &mut Criterion) {
    let mut group = c.benchmark_group("Inner_Join");

    for indexed in [true, false] {
        let mut db = setup_populated_db(1_000);
        let user_id = if indexed { "user_id INT UNIQUE" } else { "user_id INT" };
        execute_sql(
            &mut db,
            &format!("CREATE TABLE orders (order_id INT PRIMARY KEY, {}, total INT)", user_id),
        )
        .unwrap();
        for i in 0..1_000 {
            let sql = format!("INSERT INTO orders (order_id, user_id, total) VALUES ({}, {}, {})", i, i, i * 3);
            execute_sql(&mut db, &sql).unwrap();
        }

        let label = if indexed { "indexed_right_side" } else { "nested_loop_scan" };
        group.bench_function(label, |b| {
            b.iter(|| {
                black_box(
                    execute_sql(
                        &mut db,
                        "SELECT users.email, orders.total FROM users INNER JOIN orders ON users.id = orders.user_id",
                    )
                    .unwrap(),
                )
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_point_lookup, bench_insert_sql, bench_join);
criterion_main!(benches);
