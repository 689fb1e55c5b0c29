#![cfg(all(feature = "advanced-tests", loom))]
//! Concurrency tests for the shared buffer pool using loom.
//!
//! Streams of one connection acquire and release buffers from the same pool.
//! `loom` explores interleavings to ensure the accounting stays exact and a
//! retained buffer is never handed out again.

use h3pump::buffer::{BufferPool, DefaultBufferPool};
use loom::{model, sync::Arc, thread};

#[test]
fn concurrent_releases_respect_the_idle_bound() {
    model(|| {
        let pool = Arc::new(DefaultBufferPool::new(1));
        let first = pool.acquire(64, true);
        let second = pool.acquire(64, true);

        let p1 = Arc::clone(&pool);
        let p2 = Arc::clone(&pool);
        let t1 = thread::spawn(move || p1.release(first));
        let t2 = thread::spawn(move || p2.release(second));

        t1.join().expect("first release thread panicked");
        t2.join().expect("second release thread panicked");

        let stats = pool.stats();
        assert_eq!(stats.released, 2);
        assert_eq!(stats.outstanding(), 0);
        assert_eq!(stats.idle, 1, "the bucket keeps at most one idle buffer");
    });
}

#[test]
fn retained_buffer_is_not_recycled_under_contention() {
    model(|| {
        let pool = Arc::new(DefaultBufferPool::new(4));
        let mut retained = pool.acquire(64, false);
        retained.fill_from(b"body");
        let slice = retained.split_slice(4);

        let releaser = Arc::clone(&pool);
        let acquirer = Arc::clone(&pool);
        let t1 = thread::spawn(move || releaser.release(retained));
        let t2 = thread::spawn(move || {
            let fresh = acquirer.acquire(64, false);
            assert!(fresh.is_empty());
            assert!(!fresh.is_retained());
            acquirer.release(fresh);
        });

        t1.join().expect("release thread panicked");
        t2.join().expect("acquire thread panicked");

        let stats = pool.stats();
        assert_eq!(stats.acquired, 2);
        assert_eq!(stats.discarded, 1);
        assert_eq!(stats.idle, 1);
        assert_eq!(&slice[..], b"body");
    });
}
