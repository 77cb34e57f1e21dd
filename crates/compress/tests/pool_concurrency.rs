use pack_compress::{BrotliCompressor, BufferWriter, Pool, SegmentedWriter};
use std::collections::HashSet;
use std::io::Read;
use std::sync::{Arc, Barrier, Mutex};
use std::thread;

const THREADS: usize = 8;

#[test]
fn concurrent_renters_never_share_a_writer() {
    let pool = Arc::new(Pool::new(THREADS, || SegmentedWriter::with_segment_sizes(64, 64)));
    let barrier = Arc::new(Barrier::new(THREADS));
    let addresses = Arc::new(Mutex::new(HashSet::new()));

    let handles: Vec<_> = (0..THREADS)
        .map(|id| {
            let pool = Arc::clone(&pool);
            let barrier = Arc::clone(&barrier);
            let addresses = Arc::clone(&addresses);
            thread::spawn(move || {
                let mut writer = pool.rent();
                let marker = [u8::try_from(id).unwrap(); 8];
                writer.extend_from_slice(&marker);

                // the segment memory is owned by exactly one renter while all of them are held
                let address = writer.reserve(1).as_ptr() as usize;
                writer.commit(0);
                assert!(addresses.lock().unwrap().insert(address));

                barrier.wait();
                assert_eq!(writer.to_vec(), marker);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(pool.idle_count(), THREADS);

    // every writer comes back reset, whichever one a renter gets
    let rented: Vec<_> = (0..THREADS).map(|_| pool.rent()).collect();
    assert!(rented.iter().all(|writer| writer.is_empty() && writer.capacity() > 0));
    assert_eq!(pool.idle_count(), 0);
}

#[test]
fn concurrent_sessions_compress_independently() {
    let pool = Arc::new(Pool::new(2, SegmentedWriter::new));

    let handles: Vec<_> = (0..THREADS)
        .map(|id| {
            let pool = Arc::clone(&pool);
            thread::spawn(move || {
                let payload = format!("session {id} ").repeat(200).into_bytes();
                for _ in 0..10 {
                    let mut compressor = BrotliCompressor::builder().writer_pool(Arc::clone(&pool)).build().unwrap();
                    compressor.write(&payload).unwrap();

                    let compressed = compressor.to_vec().unwrap();
                    let mut decompressed = Vec::new();
                    brotli::Decompressor::new(&compressed[..], 4096).read_to_end(&mut decompressed).unwrap();
                    assert_eq!(decompressed, payload);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert!(pool.idle_count() <= pool.max_idle());
}
