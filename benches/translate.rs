use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use myt::Translator;

const SELECT: &str = "SELECT u.id, CONCAT(u.first_name, ' ', u.last_name) AS name, IFNULL(o.total, 0) AS total, DATE_FORMAT(o.created_at, '%Y-%m-%d') AS day FROM users u LEFT OUTER JOIN orders o ON o.user_id = u.id WHERE o.created_at > DATE_SUB(NOW(), INTERVAL 30 DAY)";

const DEFINITION: &str = "CREATE TABLE `orders` (
  `id` bigint(20) unsigned NOT NULL AUTO_INCREMENT,
  `user_id` int(11) NOT NULL,
  `status` enum('new','paid','shipped') NOT NULL DEFAULT 'new',
  `total` decimal(12,2) DEFAULT NULL,
  `created_at` timestamp NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,
  PRIMARY KEY (`id`),
  UNIQUE KEY `uk_user` (`user_id`, `created_at`)
) ENGINE=InnoDB AUTO_INCREMENT=1000 DEFAULT CHARSET=utf8mb4 COMMENT='orders';";

const AGGREGATE: &str = "SELECT u.id,
  GROUP_CONCAT(DISTINCT r.name ORDER BY r.name SEPARATOR ', ') AS roles
FROM users u
JOIN roles r ON r.user_id = u.id
GROUP BY u.id WITH ROLLUP";

fn bench_statements(c: &mut Criterion) {
    let translator = Translator::default();
    let mut group = c.benchmark_group("translate");

    for (name, sql) in [("select", SELECT), ("definition", DEFINITION), ("aggregate", AGGREGATE)] {
        group.throughput(Throughput::Bytes(sql.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), sql, |b, sql| {
            b.iter(|| translator.translate(black_box(sql)))
        });
    }

    group.finish();
}

fn bench_script(c: &mut Criterion) {
    let translator = Translator::default();
    let mut group = c.benchmark_group("translate_script");

    for statements in [10usize, 100] {
        let script = [SELECT, DEFINITION, AGGREGATE]
            .iter()
            .cycle()
            .take(statements)
            .map(|sql| sql.trim_end_matches(';'))
            .collect::<Vec<_>>()
            .join(";\n");

        group.throughput(Throughput::Bytes(script.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(statements), &script, |b, script| {
            b.iter(|| translator.translate_script(black_box(script)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_statements, bench_script);
criterion_main!(benches);
