use std::{
    sync::{Arc, Barrier, Mutex, mpsc},
    thread,
    time::Duration,
};

use wintab_bridge::{
    MessageEvents, endpoint, event_dispatcher::ContextKind, on_message_received, post_message,
    watch_message,
};

const TIMEOUT: Duration = Duration::from_secs(5);

/// Forwards ids in `wanted` received by the process-wide loop.
fn listen(wanted: &'static [u32]) -> mpsc::Receiver<(u32, usize)> {
    let (tx, rx) = mpsc::channel();
    let tx = Mutex::new(tx);
    on_message_received(move |event| {
        let message = event.message();
        if wanted.contains(&message.id) {
            let _ = tx.lock().unwrap().send((message.id, message.wparam));
        }
    })
    .unwrap();
    rx
}

#[test]
fn concurrent_first_use_starts_one_loop() {
    let barrier = Arc::new(Barrier::new(16));
    let workers: Vec<_> = (0..16)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let events = MessageEvents::global().unwrap();
                (
                    events as *const MessageEvents as usize,
                    events.endpoint(),
                    events.loop_thread(),
                )
            })
        })
        .collect();

    let seen: Vec<_> = workers.into_iter().map(|w| w.join().unwrap()).collect();
    assert!(seen.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(seen[0].1, endpoint().unwrap());
}

#[test]
fn context_without_runtime_is_dedicated_thread() {
    // 没有 tokio 运行时的调用方会得到一个专用分发线程
    let kind = thread::spawn(|| MessageEvents::global().unwrap().context().kind())
        .join()
        .unwrap();
    assert_eq!(kind, ContextKind::Thread);
}

#[test]
fn watched_message_reaches_subscriber() {
    let rx = listen(&[42]);
    watch_message(42).unwrap();

    post_message(endpoint().unwrap(), 42, 1, 0).unwrap();
    assert_eq!(rx.recv_timeout(TIMEOUT).unwrap(), (42, 1));
}

#[test]
fn unwatched_message_is_filtered() {
    let rx = listen(&[1000, 1001]);
    watch_message(1000).unwrap();

    let target = endpoint().unwrap();
    post_message(target, 1001, 0, 0).unwrap();
    post_message(target, 1000, 0, 0).unwrap();

    assert_eq!(rx.recv_timeout(TIMEOUT).unwrap().0, 1000);
    assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
}

#[test]
fn watching_twice_is_idempotent() {
    let rx = listen(&[2000]);
    watch_message(2000).unwrap();
    watch_message(2000).unwrap();
    assert!(MessageEvents::global().unwrap().registry().is_watched(2000));

    post_message(endpoint().unwrap(), 2000, 9, 0).unwrap();
    assert_eq!(rx.recv_timeout(TIMEOUT).unwrap(), (2000, 9));
    assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
}
