// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for PJL header extraction, metadata inference, and
// job content hashing in the jetspool-server crate.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use sha2::{Digest, Sha256};

use jetspool_server::pjl::{extract, extract_metadata};

// ---------------------------------------------------------------------------
// Helper: build a PJL-wrapped job (mirrors the test helper in server.rs)
// ---------------------------------------------------------------------------

/// Construct a PJL-wrapped PostScript job with the given directive lines
/// and document body.
fn pjl_job(directives: &[&str], body: &[u8]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"\x1b%-12345X@PJL\r\n");
    for line in directives {
        buf.extend_from_slice(line.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }
    buf.extend_from_slice(b"@PJL ENTER LANGUAGE=POSTSCRIPT\r\n");
    buf.extend_from_slice(b"%!PS-Adobe-3.0\r\n");
    buf.extend_from_slice(body);
    buf
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Benchmark header extraction from a typical spooler-submitted job.
fn bench_extract(c: &mut Criterion) {
    let job = pjl_job(
        &[
            r#"@PJL JOB NAME="Benchmark Print Job""#,
            r#"@PJL COMMENT "username: bench; app filename: report.doc""#,
        ],
        &vec![0x20u8; 4096], // 4 KiB fake page content
    );

    c.bench_function("pjl_extract (4 KiB document)", |b| {
        b.iter(|| {
            let (header, offset) = extract(black_box(&job));
            assert!(!header.is_empty());
            black_box(offset);
        });
    });

    // A bare binary document exercises the marker-miss path: the scan walks
    // the whole buffer before passing it through.
    let binary = vec![0xABu8; 64 * 1024];

    c.bench_function("pjl_extract (64 KiB no marker)", |b| {
        b.iter(|| {
            let (header, offset) = extract(black_box(&binary));
            assert!(header.is_empty());
            assert_eq!(offset, 0);
        });
    });
}

/// Benchmark full metadata inference including directive classification.
fn bench_extract_metadata(c: &mut Criterion) {
    let job = pjl_job(
        &[
            r#"@PJL JOB NAME="Quarterly Figures""#,
            r#"@PJL COMMENT "username: bench; app filename: figures.xls""#,
        ],
        b"showpage\r\n",
    );

    c.bench_function("pjl_extract_metadata", |b| {
        b.iter(|| {
            let (meta, _) = extract_metadata(black_box(&job));
            assert!(meta.title.is_some());
        });
    });
}

/// Benchmark SHA-256 hashing of a 1 MiB job (the content hash computed for
/// every received job).
fn bench_content_hash(c: &mut Criterion) {
    let data = vec![0x42u8; 1024 * 1024]; // 1 MiB

    c.bench_function("content_hash_sha256 (1 MiB)", |b| {
        b.iter(|| {
            let mut hasher = Sha256::new();
            hasher.update(black_box(&data));
            let result = hasher.finalize();
            black_box(result);
        });
    });
}

criterion_group!(
    benches,
    bench_extract,
    bench_extract_metadata,
    bench_content_hash,
);
criterion_main!(benches);
